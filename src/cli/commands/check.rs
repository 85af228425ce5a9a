//! Check Command
//!
//! Builds the configured services and verifies they respond.
//!
//! Usage:
//!   echomind check

use tokio::runtime::Runtime;

use crate::ai::PreflightCheck;
use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, build_detector};
use crate::types::{EchoError, Result};

pub fn run(ctx: CommandContext) -> Result<()> {
    let output = Output::new();
    let rt = Runtime::new()?;

    output.info(&format!(
        "Classifier: {} · Generator: {}",
        ctx.config.classifier.provider, ctx.config.generator.provider
    ));

    let result = rt.block_on(async {
        let pipelines = ctx.registry.get().await?;
        let detector = build_detector(&ctx.config.language);
        Ok::<_, EchoError>(
            PreflightCheck::new()
                .check_all(
                    pipelines.classifier.as_ref(),
                    pipelines.generator.as_ref(),
                    detector.as_deref(),
                )
                .await,
        )
    })?;

    output.preflight(&result);

    if result.passed {
        output.success("All services ready");
        Ok(())
    } else {
        Err(EchoError::Config(format!(
            "{} service check(s) failed",
            result.errors.len()
        )))
    }
}
