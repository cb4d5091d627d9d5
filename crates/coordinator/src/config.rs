//! Configuration for the coordinator.
//!
//! Every section has a default, so an empty TOML file (or no file at all)
//! yields a working rule-based pipeline over the bundled datasets.
//!
//! ```toml
//! [mode]
//! setting = "auto"
//!
//! [data]
//! services_path = "/etc/frontline/services.json"
//!
//! [booking]
//! high_offset_minutes = 20
//! ```

use crate::mode::ModeSetting;
use frontline_agents::booking::MAX_OFFSET_MINUTES;
use frontline_agents::{BookingConfig, GuidanceConfig, IntakeDefaults};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Main coordinator configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Enhanced vs degraded mode selection
    pub mode: ModeConfig,

    /// Reference dataset locations
    pub data: DataConfig,

    /// Defaults for missing request fields
    pub intake: IntakeDefaults,

    /// Appointment offsets per priority
    pub booking: BookingConfig,

    /// Service lookup settings
    pub guidance: GuidanceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeConfig {
    pub setting: ModeSetting,

    /// Environment variable that would hold an AI provider key.
    /// Only reported in the system status.
    pub api_key_env: String,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            setting: ModeSetting::Auto,
            api_key_env: "GEMINI_API_KEY".into(),
        }
    }
}

impl ModeConfig {
    /// Whether the configured key variable is set and non-empty.
    pub fn api_key_configured(&self) -> bool {
        std::env::var(&self.api_key_env)
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Dataset paths. `None` uses the copy compiled into the binary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services_path: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub locations_path: Option<PathBuf>,
}

impl CoordinatorConfig {
    /// Load configuration from a TOML file.
    ///
    /// The file must be a regular file and not world-writable on Unix,
    /// since it controls which datasets are loaded.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();

        #[cfg(unix)]
        validate_config_file_permissions(path)?;

        Self::from_file_unchecked(path)
    }

    /// Load configuration from a TOML file without permission checks.
    pub fn from_file_unchecked(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would break pipeline invariants.
    pub fn validate(&self) -> anyhow::Result<()> {
        let booking = &self.booking;
        for (name, minutes) in [
            ("high_offset_minutes", booking.high_offset_minutes),
            ("medium_offset_minutes", booking.medium_offset_minutes),
            ("low_offset_minutes", booking.low_offset_minutes),
        ] {
            if minutes <= 0 {
                anyhow::bail!("booking.{} must be positive, got {}", name, minutes);
            }
            if minutes > MAX_OFFSET_MINUTES {
                anyhow::bail!(
                    "booking.{} must be at most {} (one year), got {}",
                    name,
                    MAX_OFFSET_MINUTES,
                    minutes
                );
            }
        }

        if self.intake.location.trim().is_empty() {
            anyhow::bail!("intake.location must not be empty");
        }

        if self.guidance.urban_areas.is_empty() {
            warn!("No urban areas configured; every location uses rural response times");
        }

        Ok(())
    }
}

#[cfg(unix)]
fn validate_config_file_permissions(path: &Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = std::fs::metadata(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;

    if !metadata.is_file() {
        anyhow::bail!("Config path '{}' is not a regular file", path.display());
    }

    let permission_bits = metadata.permissions().mode() & 0o777;
    if permission_bits & 0o002 != 0 {
        anyhow::bail!(
            "Config file '{}' is world-writable (mode {:04o}). Fix with: chmod o-w {}",
            path.display(),
            permission_bits,
            path.display()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontline_common::{EmergencyType, Priority};
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = CoordinatorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.booking.high_offset_minutes, 30);
        assert_eq!(config.intake.location, "Unknown");
        assert_eq!(config.mode.setting, ModeSetting::Auto);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let file = write_config("");
        let config = CoordinatorConfig::from_file_unchecked(file.path()).unwrap();
        assert_eq!(config.intake.priority, Priority::Medium);
        assert!(config.data.services_path.is_none());
    }

    #[test]
    fn test_partial_sections() {
        let file = write_config(
            r#"
[mode]
setting = "degraded"

[intake]
emergency_type = "police"

[booking]
high_offset_minutes = 15

[guidance]
urban_areas = ["Multan"]
"#,
        );
        let config = CoordinatorConfig::from_file_unchecked(file.path()).unwrap();
        assert_eq!(config.mode.setting, ModeSetting::Degraded);
        assert_eq!(config.intake.emergency_type, EmergencyType::Police);
        assert_eq!(config.intake.location, "Unknown");
        assert_eq!(config.booking.high_offset_minutes, 15);
        assert_eq!(config.booking.medium_offset_minutes, 120);
        assert_eq!(config.guidance.urban_areas, vec!["Multan".to_string()]);
    }

    #[test]
    fn test_rejects_non_positive_offset() {
        let file = write_config("[booking]\nlow_offset_minutes = 0\n");
        let err = CoordinatorConfig::from_file_unchecked(file.path()).unwrap_err();
        assert!(err.to_string().contains("low_offset_minutes"));
    }

    #[test]
    fn test_rejects_offset_over_one_year() {
        let file = write_config(&format!("[booking]\nlow_offset_minutes = {}\n", i64::MAX / 2));
        let err = CoordinatorConfig::from_file_unchecked(file.path()).unwrap_err();
        assert!(err.to_string().contains("low_offset_minutes"));

        let file = write_config("[booking]\nlow_offset_minutes = 525600\n");
        assert!(CoordinatorConfig::from_file_unchecked(file.path()).is_ok());
    }

    #[test]
    fn test_rejects_bad_toml() {
        let file = write_config("[mode\nsetting = ");
        assert!(CoordinatorConfig::from_file_unchecked(file.path()).is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(CoordinatorConfig::from_file("/nonexistent/frontline.toml").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_rejects_world_writable() {
        use std::os::unix::fs::PermissionsExt;

        let file = write_config("");
        std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o666)).unwrap();
        let err = CoordinatorConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("world-writable"));
    }
}
