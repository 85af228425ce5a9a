use console::style;

use crate::ai::PreflightResult;
use crate::analyzer::display_language;
use crate::interaction::{Regeneration, Reply};
use crate::types::EchoError;

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    /// Sentiment line followed by the generated reply
    pub fn reply(&self, reply: &Reply) {
        let score = reply
            .score
            .map(|s| format!(" ({:.0}%)", s * 100.0))
            .unwrap_or_default();
        self.info(&format!(
            "Sentiment: {}{}  ·  Language: {}",
            style(reply.sentiment.label()).bold(),
            score,
            display_language(&reply.language)
        ));
        println!("\n{}\n", reply.text);
    }

    pub fn regeneration(&self, regeneration: &Regeneration) {
        self.success(&format!(
            "Regenerated with tone: {}",
            style(regeneration.tone.label()).bold()
        ));
        println!("\n{}\n", regeneration.text);
    }

    /// Warnings for things the user can fix, errors (with a hint) otherwise
    pub fn failure(&self, err: &EchoError) {
        if err.is_user_correctable() {
            self.warning(&err.to_string());
            return;
        }
        self.error(&err.to_string());
        if let Some(hint) = err.service_error().and_then(|e| e.category.hint()) {
            eprintln!("  {}", style(hint).dim());
        }
    }

    pub fn preflight(&self, result: &PreflightResult) {
        self.section("Service checks");
        for check in &result.checks {
            let line = format!("{} ({} ms)", check.message, check.duration_ms);
            if check.passed {
                self.success(&line);
            } else {
                self.error(&line);
            }
        }
        for warning in &result.warnings {
            self.warning(warning);
        }
        if !result.recommendations.is_empty() {
            self.section("Recommendations");
            for rec in &result.recommendations {
                println!("  • {}", rec);
            }
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
