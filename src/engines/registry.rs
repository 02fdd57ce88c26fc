//! Engine registry keyed by name and routing role

use super::traits::Engine;
use crate::config::{EngineConfig, EngineRole};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of available search backends
pub struct EngineRegistry {
    /// Engines by name
    engines: HashMap<String, Arc<dyn Engine>>,
    /// Engine names by role, in registration order
    roles: HashMap<EngineRole, Vec<String>>,
    /// Engine configurations
    configs: HashMap<String, EngineConfig>,
}

impl EngineRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            engines: HashMap::new(),
            roles: HashMap::new(),
            configs: HashMap::new(),
        }
    }

    /// Register an engine under its configured name and role.
    ///
    /// Without a configured role the engine's own role is used.
    pub fn register(&mut self, engine: Arc<dyn Engine>, config: EngineConfig) {
        let name = if config.name.is_empty() {
            engine.name().to_string()
        } else {
            config.name.clone()
        };

        let role = config.role.unwrap_or_else(|| engine.role());
        self.roles.entry(role).or_default().push(name.clone());
        self.engines.insert(name.clone(), engine);
        self.configs.insert(name, config);
    }

    /// Get an engine by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Engine>> {
        self.engines.get(name)
    }

    /// Get engine config
    pub fn get_config(&self, name: &str) -> Option<&EngineConfig> {
        self.configs.get(name)
    }

    /// First registered engine for a role
    pub fn for_role(&self, role: EngineRole) -> Option<(&str, &Arc<dyn Engine>)> {
        self.roles
            .get(&role)?
            .iter()
            .find_map(|name| self.engines.get(name).map(|e| (name.as_str(), e)))
    }

    /// The specialized backend, if one is configured
    pub fn specialized(&self) -> Option<(&str, &Arc<dyn Engine>)> {
        self.for_role(EngineRole::Specialized)
    }

    /// The general backend, if one is configured
    pub fn general(&self) -> Option<(&str, &Arc<dyn Engine>)> {
        self.for_role(EngineRole::General)
    }

    /// Get all engine names
    pub fn names(&self) -> Vec<&str> {
        self.engines.keys().map(|s| s.as_str()).collect()
    }

    /// Get number of registered engines
    pub fn len(&self) -> usize {
        self.engines.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    /// Get effective timeout for an engine
    pub fn get_timeout(&self, name: &str, default: f64) -> f64 {
        self.get_config(name)
            .and_then(|c| c.timeout)
            .or_else(|| self.engines.get(name).map(|e| e.timeout()))
            .unwrap_or(default)
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::new()
    }
}
