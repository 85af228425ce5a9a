use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use echomind::EchoError;
use echomind::cli::commands::generate::GenerateOptions;
use echomind::cli::{CommandContext, ServiceOverrides};

#[derive(Parser)]
#[command(name = "echomind")]
#[command(
    version,
    about = "Sentiment-aware conversational replies"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, global = true, help = "Use this config file instead of the standard chain")]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(clap::Args, Debug, Default)]
struct ServiceArgs {
    #[arg(long, help = "Generator provider (huggingface, ollama, openai)")]
    provider: Option<String>,
    #[arg(long, help = "Generator model")]
    model: Option<String>,
    #[arg(long, help = "Sentiment classifier model")]
    classifier_model: Option<String>,
}

impl From<ServiceArgs> for ServiceOverrides {
    fn from(args: ServiceArgs) -> Self {
        Self {
            classifier_model: args.classifier_model,
            generator_provider: args.provider,
            generator_model: args.model,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Reply to a single message
    Generate {
        #[arg(help = "What's on your mind")]
        text: String,
        #[arg(long, short, help = "Response length in words (40-150)")]
        length: Option<u32>,
        #[arg(long, help = "Creativity for regeneration (0.0-1.5)")]
        creativity: Option<f64>,
        #[arg(long, help = "Also regenerate in this tone (positive, neutral, negative)")]
        retone: Option<String>,
        #[command(flatten)]
        services: ServiceArgs,
    },

    /// Start an interactive session
    Chat {
        #[arg(long, short, help = "Starting response length in words (40-150)")]
        length: Option<u32>,
        #[arg(long, help = "Starting creativity (0.0-1.5)")]
        creativity: Option<f64>,
        #[command(flatten)]
        services: ServiceArgs,
    },

    /// Verify the configured services are reachable
    Check {
        #[command(flatten)]
        services: ServiceArgs,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "toml",
            help = "Output format: toml, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mEchoMind encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            if let Some(hint) = e
                .downcast_ref::<EchoError>()
                .and_then(|err| err.service_error())
                .and_then(|service| service.category.hint())
            {
                eprintln!("\x1b[90m  {}\x1b[0m", hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    // Logs go to stderr so replies on stdout stay clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Generate {
            text,
            length,
            creativity,
            retone,
            services,
        } => {
            let ctx = CommandContext::load(config_path, services.into())?;
            echomind::cli::commands::generate::run(
                ctx,
                GenerateOptions {
                    text,
                    length,
                    creativity,
                    retone,
                },
            )?;
        }
        Commands::Chat {
            length,
            creativity,
            services,
        } => {
            let ctx = CommandContext::load(config_path, services.into())?;
            echomind::cli::commands::chat::run(ctx, length, creativity)?;
        }
        Commands::Check { services } => {
            let ctx = CommandContext::load(config_path, services.into())?;
            echomind::cli::commands::check::run(ctx)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                echomind::cli::commands::config::show(config_path, &format)?;
            }
            ConfigAction::Path => {
                echomind::cli::commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                echomind::cli::commands::config::init(global, force)?;
            }
        },
    }

    Ok(())
}
