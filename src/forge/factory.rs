//! Factory for creating the forge implementation from remote configuration.
use crate::{
    Result,
    forge::{
        config::RemoteConfig, github::Github, manager::ForgeManager,
        traits::Forge,
    },
};

/// Factory for creating forge implementations.
pub struct ForgeFactory;

impl ForgeFactory {
    /// Create a ForgeManager for the configured GitHub remote.
    pub fn create(config: &RemoteConfig) -> Result<ForgeManager> {
        let forge: Box<dyn Forge> = Box::new(Github::new(config.clone())?);
        Ok(ForgeManager::new(forge))
    }
}
