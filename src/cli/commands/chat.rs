//! Chat Command
//!
//! Interactive session: every line is a message, slash commands adjust
//! settings or regenerate the last reply. Failures are reported and the
//! session continues.

use console::style;
use std::io::{BufRead, Write};
use tokio::runtime::Runtime;

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, parse_tone};
use crate::interaction::GenerationSettings;
use crate::types::{EchoError, Result};

/// One line of user input
#[derive(Debug, Clone, PartialEq)]
pub enum ChatInput {
    Message(String),
    /// `/tone [TONE]`
    Retone(Option<String>),
    /// `/length N`
    Length(String),
    /// `/creativity F`
    Creativity(String),
    Settings,
    Help,
    Quit,
    Unknown(String),
}

impl ChatInput {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(command) = trimmed.strip_prefix('/') else {
            return Self::Message(line.to_string());
        };

        let (name, arg) = match command.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, Some(arg.trim().to_string())),
            None => (command, None),
        };
        let arg = arg.filter(|a| !a.is_empty());

        match (name.to_lowercase().as_str(), arg) {
            ("quit" | "exit" | "q", _) => Self::Quit,
            ("tone" | "retone", arg) => Self::Retone(arg),
            ("length", Some(arg)) => Self::Length(arg),
            ("creativity", Some(arg)) => Self::Creativity(arg),
            ("settings", _) => Self::Settings,
            ("help" | "?", _) => Self::Help,
            _ => Self::Unknown(trimmed.to_string()),
        }
    }
}

pub fn run(ctx: CommandContext, length: Option<u32>, creativity: Option<f64>) -> Result<()> {
    let mut settings = ctx.settings(length, creativity)?;
    let output = Output::new();
    let rt = Runtime::new()?;

    output.header("EchoMind");
    println!("Share your thoughts, everyone needs someone to hear them out.");
    println!(
        "{}",
        style("Type /help for commands, /quit to leave.").dim()
    );

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("\n{} ", style("you ›").cyan().bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        match ChatInput::parse(&line) {
            ChatInput::Quit => break,
            ChatInput::Help => print_help(),
            ChatInput::Settings => print_settings(&settings),
            ChatInput::Unknown(cmd) => {
                output.warning(&format!("Unknown command: {} (try /help)", cmd));
            }
            ChatInput::Length(value) => {
                match parse_length(&value).and_then(|l| settings.with_length(l)) {
                    Ok(updated) => {
                        settings = updated;
                        output.success(&format!("Length set to {} words", settings.length()));
                    }
                    Err(e) => output.failure(&e),
                }
            }
            ChatInput::Creativity(value) => {
                match parse_creativity(&value).and_then(|c| settings.with_creativity(c)) {
                    Ok(updated) => {
                        settings = updated;
                        output.success(&format!("Creativity set to {:.1}", settings.creativity()));
                    }
                    Err(e) => output.failure(&e),
                }
            }
            ChatInput::Retone(tone) => {
                let result = tone.as_deref().map(parse_tone).transpose().and_then(|tone| {
                    rt.block_on(ctx.orchestrator.regenerate(&ctx.session, tone))
                });
                match result {
                    Ok(regeneration) => output.regeneration(&regeneration),
                    Err(e) => output.failure(&e),
                }
            }
            ChatInput::Message(text) => {
                let result = rt.block_on(ctx.orchestrator.submit(&ctx.session, &text, settings));
                match result {
                    Ok(reply) => output.reply(&reply),
                    Err(e) => output.failure(&e),
                }
            }
        }
    }

    ctx.orchestrator.store().end_session(&ctx.session);
    println!("Take care!");
    Ok(())
}

fn parse_length(value: &str) -> Result<u32> {
    value.parse().map_err(|_| EchoError::InvalidSetting {
        name: "length",
        value: value.to_string(),
        expected: "a whole number of words".to_string(),
    })
}

fn parse_creativity(value: &str) -> Result<f64> {
    value.parse().map_err(|_| EchoError::InvalidSetting {
        name: "creativity",
        value: value.to_string(),
        expected: "a number such as 0.7".to_string(),
    })
}

fn print_help() {
    println!("  {}  regenerate the last reply (tone: positive, neutral, negative)", style("/tone [TONE]").bold());
    println!("  {}    response length in words (40-150)", style("/length N").bold());
    println!("  {} creativity (0.0-1.5)", style("/creativity F").bold());
    println!("  {}     show current settings", style("/settings").bold());
    println!("  {}         leave", style("/quit").bold());
}

fn print_settings(settings: &GenerationSettings) {
    println!(
        "  length: {} words, creativity: {:.1}",
        settings.length(),
        settings.creativity()
    );
}
