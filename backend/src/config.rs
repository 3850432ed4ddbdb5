//! Redemption settings loaded via OrthoConfig.

use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{DEFAULT_MIN_INTERVAL_MINUTES, RedemptionPolicy, RedemptionPolicyError};

fn default_snapshot_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join("canteen.json")
}

/// Configuration values controlling redemption rules and the data snapshot.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "REDEMPTION")]
pub struct RedemptionSettings {
    /// Minimum minutes between two regular redemptions on the same day.
    #[ortho_config(default = 60)]
    pub min_interval_minutes: u32,
    /// Optional snapshot path override.
    pub snapshot_path: Option<PathBuf>,
}

impl RedemptionSettings {
    /// Return the configured snapshot path, falling back to the bundled
    /// fixture.
    pub fn snapshot_path(&self) -> PathBuf {
        self.snapshot_path
            .clone()
            .unwrap_or_else(default_snapshot_path)
    }

    /// Build the domain policy, validating the interval range.
    pub fn policy(&self) -> Result<RedemptionPolicy, RedemptionPolicyError> {
        RedemptionPolicy::try_from(self)
    }
}

impl Default for RedemptionSettings {
    fn default() -> Self {
        Self {
            min_interval_minutes: DEFAULT_MIN_INTERVAL_MINUTES,
            snapshot_path: None,
        }
    }
}

impl TryFrom<&RedemptionSettings> for RedemptionPolicy {
    type Error = RedemptionPolicyError;

    fn try_from(value: &RedemptionSettings) -> Result<Self, Self::Error> {
        Self::with_min_interval_minutes(value.min_interval_minutes)
    }
}
