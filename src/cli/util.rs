//! CLI Common Utilities
//!
//! Shared initialization and context management for CLI commands.

use std::path::Path;
use std::sync::Arc;

use crate::ai::{ModelRegistry, SharedRegistry};
use crate::analyzer::{LanguageDetector, WhatlangDetector};
use crate::config::{Config, ConfigLoader, LanguageConfig};
use crate::interaction::{GenerationSettings, Orchestrator, SessionStore};
use crate::types::{EchoError, Result, Sentiment, SessionId};

/// Command-line overrides applied on top of the loaded configuration
#[derive(Debug, Clone, Default)]
pub struct ServiceOverrides {
    pub classifier_model: Option<String>,
    pub generator_provider: Option<String>,
    pub generator_model: Option<String>,
}

impl ServiceOverrides {
    fn apply(self, config: &mut Config) {
        if let Some(model) = self.classifier_model {
            config.classifier.model = Some(model);
        }
        if let Some(provider) = self.generator_provider {
            config.generator.provider = provider;
            // A model name from another provider would not make sense
            config.generator.model = None;
        }
        if let Some(model) = self.generator_model {
            config.generator.model = Some(model);
        }
    }
}

/// Command execution context
///
/// Everything a conversational command needs: the effective configuration,
/// an orchestrator wired to the shared registry, and a fresh session.
pub struct CommandContext {
    pub config: Config,
    pub registry: SharedRegistry,
    pub orchestrator: Orchestrator,
    pub session: SessionId,
}

impl CommandContext {
    /// Load configuration and wire up services
    ///
    /// Services are not contacted here; the registry builds them on first use.
    pub fn load(config_path: Option<&Path>, overrides: ServiceOverrides) -> Result<Self> {
        let mut config = load_config(config_path)?;
        overrides.apply(&mut config);
        config.validate()?;
        Ok(Self::from_config(config))
    }

    pub fn from_config(config: Config) -> Self {
        let registry: SharedRegistry = Arc::new(ModelRegistry::from_config(
            config.classifier.clone(),
            config.generator.clone(),
        ));
        let orchestrator = Orchestrator::new(
            Arc::clone(&registry),
            build_detector(&config.language),
            Arc::new(SessionStore::new()),
            config.generation.clone(),
        );

        Self {
            config,
            registry,
            orchestrator,
            session: SessionId::generate(),
        }
    }

    /// Settings from config defaults, overridden by whatever the user passed
    pub fn settings(&self, length: Option<u32>, creativity: Option<f64>) -> Result<GenerationSettings> {
        let mut settings = self.config.generation.default_settings()?;
        if let Some(length) = length {
            settings = settings.with_length(length)?;
        }
        if let Some(creativity) = creativity {
            settings = settings.with_creativity(creativity)?;
        }
        Ok(settings)
    }
}

/// Load configuration from an explicit file or the standard chain
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(path) if !path.exists() => Err(EchoError::Config(format!(
            "Config file not found: {}",
            path.display()
        ))),
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// Language detector for the configured settings, if enabled
pub fn build_detector(config: &LanguageConfig) -> Option<Arc<dyn LanguageDetector>> {
    config
        .enabled
        .then(|| Arc::new(WhatlangDetector::new(config.min_confidence)) as Arc<dyn LanguageDetector>)
}

/// Parse a tone name given on the command line
pub fn parse_tone(value: &str) -> Result<Sentiment> {
    value.parse().map_err(|_| EchoError::InvalidSetting {
        name: "tone",
        value: value.to_string(),
        expected: "positive, neutral, or negative".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tone() {
        assert_eq!(parse_tone("Positive").unwrap(), Sentiment::Positive);
        assert_eq!(parse_tone(" negative ").unwrap(), Sentiment::Negative);
        assert!(matches!(
            parse_tone("angry"),
            Err(EchoError::InvalidSetting { name: "tone", .. })
        ));
    }

    #[test]
    fn test_overrides_apply() {
        let mut config = Config::default();
        config.generator.model = Some("google/flan-t5-base".to_string());

        ServiceOverrides {
            generator_provider: Some("ollama".to_string()),
            ..Default::default()
        }
        .apply(&mut config);
        assert_eq!(config.generator.provider, "ollama");
        assert_eq!(config.generator.model, None);

        ServiceOverrides {
            generator_model: Some("mistral".to_string()),
            classifier_model: Some("distilbert".to_string()),
            ..Default::default()
        }
        .apply(&mut config);
        assert_eq!(config.generator.model.as_deref(), Some("mistral"));
        assert_eq!(config.classifier.model.as_deref(), Some("distilbert"));
    }

    #[test]
    fn test_settings_override_defaults() {
        let ctx = CommandContext::from_config(Config::default());
        let settings = ctx.settings(Some(120), None).unwrap();
        assert_eq!(settings.length(), 120);
        assert_eq!(settings.creativity(), 0.7);

        assert!(ctx.settings(Some(10), None).is_err());
        assert!(ctx.settings(None, Some(2.0)).is_err());
    }

    #[test]
    fn test_context_does_not_touch_services() {
        let ctx = CommandContext::from_config(Config::default());
        assert!(!ctx.registry.is_initialized());
    }

    #[test]
    fn test_detector_follows_config() {
        let disabled = LanguageConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(build_detector(&disabled).is_none());
        assert!(build_detector(&LanguageConfig::default()).is_some());
    }

    #[test]
    fn test_missing_config_file() {
        let err = load_config(Some(Path::new("/nonexistent/echomind.toml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
