//! Engine loader for initializing backends from configuration

use super::registry::EngineRegistry;
use super::traits::Engine;
use super::{factbase, google_cse};
use crate::config::{EngineConfig, Settings};
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Loader for initializing engines from configuration
pub struct EngineLoader;

impl EngineLoader {
    /// Load all backends from settings.
    ///
    /// Engines that are disabled or fail validation are skipped with a
    /// warning; routing treats a missing backend as an empty result set.
    pub fn load(settings: &Settings) -> EngineRegistry {
        let mut registry = EngineRegistry::new();

        let enabled = settings.enabled_engines();
        let skipped = settings.search.engines.len() - enabled.len();
        if skipped > 0 {
            info!("Skipping {} disabled engines", skipped);
        }

        for config in enabled {
            match Self::create_engine(&config.engine, config) {
                Ok(engine) => {
                    info!(
                        "Loaded engine: {} ({}, {:?})",
                        config.name,
                        config.engine,
                        config.role.unwrap_or_else(|| engine.role())
                    );
                    registry.register(engine, config.clone());
                }
                Err(e) => {
                    warn!("Failed to load engine {}: {}", config.name, e);
                }
            }
        }

        info!("Loaded {} engines", registry.len());
        registry
    }

    /// Create an engine instance by type name
    fn create_engine(engine_type: &str, config: &EngineConfig) -> Result<Arc<dyn Engine>> {
        let mut engine: Box<dyn Engine> = match engine_type {
            "factbase" => Box::new(factbase::Factbase::new()),
            "google_cse" => Box::new(google_cse::GoogleCse::default()),
            _ => {
                return Err(anyhow::anyhow!(
                    "Unknown engine type: {} (available: {})",
                    engine_type,
                    Self::available_engines().join(", ")
                ));
            }
        };

        engine.init(config)?;
        engine.validate(config)?;

        Ok(Arc::from(engine))
    }

    /// Get list of available engine types
    pub fn available_engines() -> Vec<&'static str> {
        vec!["factbase", "google_cse"]
    }
}
