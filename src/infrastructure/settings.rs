use crate::domain::ports::SettingsProvider;
use crate::domain::settings::PenaltyConfiguration;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Settings collaborator backed by a value held in memory.
///
/// The configuration can be replaced at runtime; the ledger picks the change
/// up on its next call.
#[derive(Clone, Default)]
pub struct StaticSettings {
    config: Arc<RwLock<PenaltyConfiguration>>,
}

impl StaticSettings {
    pub fn new(config: PenaltyConfiguration) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
        }
    }

    /// Swaps in a new configuration.
    pub async fn update(&self, config: PenaltyConfiguration) {
        *self.config.write().await = config;
    }
}

#[async_trait]
impl SettingsProvider for StaticSettings {
    async fn penalty_configuration(&self) -> Result<PenaltyConfiguration> {
        Ok(self.config.read().await.clone())
    }
}
