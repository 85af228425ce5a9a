//! Process-Wide Model Registry
//!
//! Classifier and generator handles are expensive to set up (HTTP clients,
//! token lookup, and for hosted models a cold start on first call), so they are
//! built once per process and shared by every session. Initialization is lazy
//! and idempotent: concurrent first callers wait on the same construction, and
//! later callers get the cached handles. A failed construction is not cached;
//! the next caller tries again.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::OnceCell;
use tracing::info;

use super::provider::{
    ServiceConfig, SharedClassifier, SharedGenerator, create_classifier, create_generator,
};
use crate::types::{EchoError, Result};

/// The two service handles the interaction flow needs
#[derive(Clone)]
pub struct Pipelines {
    pub classifier: SharedClassifier,
    pub generator: SharedGenerator,
}

impl std::fmt::Debug for Pipelines {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipelines")
            .field(
                "classifier",
                &format_args!("{}/{}", self.classifier.name(), self.classifier.model()),
            )
            .field(
                "generator",
                &format_args!("{}/{}", self.generator.name(), self.generator.model()),
            )
            .finish()
    }
}

type PipelineFactory = Box<dyn Fn() -> Result<Pipelines> + Send + Sync>;

/// Lazily-initialized, shared pipeline handles
pub struct ModelRegistry {
    pipelines: OnceCell<Pipelines>,
    factory: Option<PipelineFactory>,
    init_count: AtomicUsize,
}

pub type SharedRegistry = Arc<ModelRegistry>;

impl ModelRegistry {
    /// Registry that builds its pipelines with `factory` on first use
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Pipelines> + Send + Sync + 'static,
    {
        Self {
            pipelines: OnceCell::new(),
            factory: Some(Box::new(factory)),
            init_count: AtomicUsize::new(0),
        }
    }

    /// Registry backed by the configured classifier and generator services
    pub fn from_config(classifier: ServiceConfig, generator: ServiceConfig) -> Self {
        Self::new(move || {
            Ok(Pipelines {
                classifier: create_classifier(&classifier)?,
                generator: create_generator(&generator)?,
            })
        })
    }

    /// Registry with pipelines already in place
    pub fn preloaded(pipelines: Pipelines) -> Self {
        Self {
            pipelines: OnceCell::new_with(Some(pipelines)),
            factory: None,
            init_count: AtomicUsize::new(0),
        }
    }

    /// Get the shared pipelines, constructing them on first call
    pub async fn get(&self) -> Result<&Pipelines> {
        self.pipelines
            .get_or_try_init(|| async {
                self.init_count.fetch_add(1, Ordering::SeqCst);
                let factory = self.factory.as_ref().ok_or_else(|| {
                    EchoError::Config("Model registry has no pipeline factory".to_string())
                })?;
                let pipelines = factory()?;
                info!(
                    "Model pipelines ready: classifier={}/{}, generator={}/{}",
                    pipelines.classifier.name(),
                    pipelines.classifier.model(),
                    pipelines.generator.name(),
                    pipelines.generator.model()
                );
                Ok(pipelines)
            })
            .await
    }

    pub fn is_initialized(&self) -> bool {
        self.pipelines.initialized()
    }

    /// Number of times construction has been attempted
    pub fn init_count(&self) -> usize {
        self.init_count.load(Ordering::SeqCst)
    }
}
