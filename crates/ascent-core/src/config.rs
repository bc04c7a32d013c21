use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::criteria::{CriteriaTable, StageCriteria};
use crate::error::{AscentError, Result};

pub const CONFIG_FILE: &str = "config.yaml";
pub const DATABASE_FILE: &str = "ascent.db";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ProgramConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// RateLimitConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Unlock attempts allowed per user per hour.
    #[serde(default = "default_unlock_per_hour")]
    pub unlock_per_hour: u32,
}

fn default_unlock_per_hour() -> u32 {
    10
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            unlock_per_hour: default_unlock_per_hour(),
        }
    }
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    4880
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// EngineConfig (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    pub program: ProgramConfig,
    /// Per-transition threshold overrides, keyed by the stage being left.
    /// Absent rows fall back to the built-in table.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub criteria: HashMap<u8, StageCriteria>,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default = "default_database")]
    pub database: String,
}

fn default_version() -> u32 {
    1
}

fn default_database() -> String {
    DATABASE_FILE.to_string()
}

impl EngineConfig {
    pub fn new(program_name: impl Into<String>) -> Self {
        Self {
            version: 1,
            program: ProgramConfig {
                name: program_name.into(),
                description: None,
            },
            criteria: HashMap::new(),
            rate_limit: RateLimitConfig::default(),
            server: ServerConfig::default(),
            database: default_database(),
        }
    }

    /// The effective thresholds: built-in table with config rows applied.
    pub fn criteria_table(&self) -> CriteriaTable {
        CriteriaTable::with_overrides(&self.criteria)
    }

    pub fn database_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.database)
    }

    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Err(AscentError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: EngineConfig = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        let path = dir.join(CONFIG_FILE);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        for (from, criteria) in &self.criteria {
            if !(1..=6).contains(from) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "criteria override for stage {from} ignored (transitions run 1 through 6)"
                    ),
                });
                continue;
            }
            if criteria.min_adherence > 100 {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!(
                        "criteria for stage {from}: min_adherence {} exceeds 100",
                        criteria.min_adherence
                    ),
                });
            }
            if criteria.min_average_delta < 0.0 {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "criteria for stage {from}: negative min_average_delta allows regression"
                    ),
                });
            }
        }

        if self.rate_limit.unlock_per_hour == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "rate_limit.unlock_per_hour must be at least 1".to_string(),
            });
        }

        if self.database.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "database file name is empty".to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Stage;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = EngineConfig::new("ascent");
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed: EngineConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.program.name, "ascent");
        assert_eq!(parsed.version, 1);
        assert_eq!(parsed.rate_limit.unlock_per_hour, 10);
        assert_eq!(parsed.database, DATABASE_FILE);
    }

    #[test]
    fn empty_criteria_not_serialized() {
        let cfg = EngineConfig::new("ascent");
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        assert!(!yaml.contains("criteria"));
    }

    #[test]
    fn minimal_yaml_gets_defaults() {
        let yaml = "version: 1\nprogram:\n  name: ascent\n";
        let cfg: EngineConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(cfg.criteria.is_empty());
        assert_eq!(cfg.server.port, 4880);
        assert_eq!(cfg.rate_limit.unlock_per_hour, 10);
    }

    #[test]
    fn criteria_overrides_parse_and_apply() {
        let yaml = r#"
version: 1
program:
  name: ascent
criteria:
  1:
    min_adherence: 50
    min_days_in_stage: 7
    min_average_delta: 0.1
"#;
        let cfg: EngineConfig = serde_yaml::from_str(yaml).unwrap();
        let table = cfg.criteria_table();
        let row = table.for_transition(Stage::MIN).unwrap();
        assert_eq!(row.min_adherence, 50);
        assert_eq!(row.min_days_in_stage, 7);
        // Rows without overrides keep built-in values.
        let row2 = table.for_transition(Stage::new(2).unwrap()).unwrap();
        assert_eq!(row2.min_adherence, 75);
    }

    #[test]
    fn load_missing_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            EngineConfig::load(dir.path()),
            Err(AscentError::NotInitialized)
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut cfg = EngineConfig::new("ascent");
        cfg.rate_limit.unlock_per_hour = 3;
        cfg.save(dir.path()).unwrap();

        let loaded = EngineConfig::load(dir.path()).unwrap();
        assert_eq!(loaded.rate_limit.unlock_per_hour, 3);
    }

    #[test]
    fn validate_clean_config() {
        let cfg = EngineConfig::new("ascent");
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn validate_flags_bad_override_key() {
        let mut cfg = EngineConfig::new("ascent");
        cfg.criteria.insert(
            7,
            StageCriteria {
                min_adherence: 90,
                min_days_in_stage: 30,
                min_average_delta: 0.5,
                manual_review: false,
            },
        );
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("stage 7") && w.level == WarnLevel::Warning));
    }

    #[test]
    fn validate_flags_impossible_adherence() {
        let mut cfg = EngineConfig::new("ascent");
        cfg.criteria.insert(
            2,
            StageCriteria {
                min_adherence: 120,
                min_days_in_stage: 14,
                min_average_delta: 0.3,
                manual_review: false,
            },
        );
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("exceeds 100")));
    }

    #[test]
    fn validate_flags_zero_rate_limit() {
        let mut cfg = EngineConfig::new("ascent");
        cfg.rate_limit.unlock_per_hour = 0;
        let warnings = cfg.validate();
        assert!(warnings.iter().any(|w| w.level == WarnLevel::Error));
    }
}
