use crate::domain::UserId;
use crate::error::{BoardError, Result};
use serde::{Deserialize, Serialize};

fn default_name() -> String {
    "Tickets".to_string()
}

/// Per-board settings supplied by the embedding application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default = "default_name")]
    pub name: String,
    /// User every status update is issued on behalf of
    pub acting_user_id: UserId,
}

impl BoardConfig {
    pub fn new(acting_user_id: UserId) -> Self {
        Self {
            name: default_name(),
            acting_user_id,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Parses and validates a JSON config
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.acting_user_id.0 <= 0 {
            return Err(BoardError::ConfigError(format!(
                "acting_user_id must be positive, got {}",
                self.acting_user_id
            )));
        }
        if self.name.trim().is_empty() {
            return Err(BoardError::ConfigError("board name is empty".to_string()));
        }
        Ok(())
    }
}
