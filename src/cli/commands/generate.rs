//! Generate Command
//!
//! One-shot reply for a single message, optionally followed by a
//! regeneration in another tone.
//!
//! Usage:
//!   echomind generate "I lost my job today" [--length 90] [--creativity 0.7] [--retone positive]

use tokio::runtime::Runtime;

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, parse_tone};
use crate::types::{EchoError, Result};

/// Options for a one-shot generation
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub text: String,
    pub length: Option<u32>,
    pub creativity: Option<f64>,
    /// Tone for a follow-up regeneration
    pub retone: Option<String>,
}

pub fn run(ctx: CommandContext, options: GenerateOptions) -> Result<()> {
    let output = Output::new();
    let result = execute(&ctx, options, &output);
    warn_if_correctable(&output, result)
}

fn execute(ctx: &CommandContext, options: GenerateOptions, output: &Output) -> Result<()> {
    // Validate everything the user typed before any service call
    let settings = ctx.settings(options.length, options.creativity)?;
    let retone = options.retone.as_deref().map(parse_tone).transpose()?;

    let rt = Runtime::new()?;

    rt.block_on(async {
        let reply = ctx
            .orchestrator
            .submit(&ctx.session, &options.text, settings)
            .await?;
        output.reply(&reply);

        if let Some(tone) = retone {
            let regeneration = ctx.orchestrator.regenerate(&ctx.session, Some(tone)).await?;
            output.regeneration(&regeneration);
        }

        Ok::<_, EchoError>(())
    })
}

/// Input mistakes are shown as warnings; everything else propagates
fn warn_if_correctable(output: &Output, result: Result<()>) -> Result<()> {
    match result {
        Err(e) if e.is_user_correctable() => {
            output.failure(&e);
            Ok(())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::types::{ErrorCategory, ServiceError};

    #[test]
    fn test_empty_text_is_a_warning_not_an_error() {
        let ctx = CommandContext::from_config(Config::default());
        let result = run(
            ctx,
            GenerateOptions {
                text: "   ".to_string(),
                ..Default::default()
            },
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_invalid_settings_are_warnings() {
        let ctx = CommandContext::from_config(Config::default());
        let result = run(
            ctx,
            GenerateOptions {
                text: "hello".to_string(),
                length: Some(5),
                ..Default::default()
            },
        );
        assert!(result.is_ok());

        let ctx = CommandContext::from_config(Config::default());
        let result = run(
            ctx,
            GenerateOptions {
                text: "hello".to_string(),
                retone: Some("furious".to_string()),
                ..Default::default()
            },
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_service_failures_still_propagate() {
        let output = Output::new();
        let err: EchoError = ServiceError::new(ErrorCategory::Unavailable, "model loading").into();
        assert!(warn_if_correctable(&output, Err(err)).is_err());
        assert!(warn_if_correctable(&output, Err(EchoError::EmptyInput)).is_ok());
    }
}
