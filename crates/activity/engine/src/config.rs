//! Configuration for the activity engine

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// How long vendors get to call back
    #[serde(default)]
    pub callbacks: CallbackConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Callback deadlines, in hours, per reference integration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackConfig {
    #[serde(default = "default_kyc_deadline")]
    pub kyc_deadline_hours: i64,

    #[serde(default = "default_contract_deadline")]
    pub contract_deadline_hours: i64,

    #[serde(default = "default_provisioning_deadline")]
    pub provisioning_deadline_hours: i64,
}

impl CallbackConfig {
    pub fn kyc_deadline(&self) -> Duration {
        Duration::hours(self.kyc_deadline_hours)
    }

    pub fn contract_deadline(&self) -> Duration {
        Duration::hours(self.contract_deadline_hours)
    }

    pub fn provisioning_deadline(&self) -> Duration {
        Duration::hours(self.provisioning_deadline_hours)
    }
}

impl Default for CallbackConfig {
    fn default() -> Self {
        Self {
            kyc_deadline_hours: default_kyc_deadline(),
            contract_deadline_hours: default_contract_deadline(),
            provisioning_deadline_hours: default_provisioning_deadline(),
        }
    }
}

// Default value helpers
fn default_log_level() -> String {
    "info".to_string()
}

fn default_kyc_deadline() -> i64 {
    24
}

fn default_contract_deadline() -> i64 {
    72
}

fn default_provisioning_deadline() -> i64 {
    1
}

impl EngineConfig {
    /// Load configuration from file
    ///
    /// Layers, lowest first: defaults, the optional file, then
    /// `ACTIVITY_*` environment variables (`__` separates sections, e.g.
    /// `ACTIVITY_CALLBACKS__KYC_DEADLINE_HOURS=48`).
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&EngineConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("ACTIVITY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}
