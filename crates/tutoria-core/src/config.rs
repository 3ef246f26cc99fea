//! Marketplace configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::donation::FeeSchedule;
use crate::model::OrderBy;

/// Top-level tutoria configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutoriaConfig {
    /// Tutor share rate per reputation tier.
    #[serde(default)]
    pub fees: FeeSchedule,
    /// Listing order both directories start with.
    #[serde(default)]
    pub default_order: OrderBy,
    /// Where file-backed listings are saved.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./tutoria-data")
}

impl Default for TutoriaConfig {
    fn default() -> Self {
        Self {
            fees: FeeSchedule::default(),
            default_order: OrderBy::default(),
            data_dir: default_data_dir(),
        }
    }
}

impl TutoriaConfig {
    /// Parse a TOML document and validate the fee rates.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: TutoriaConfig = toml::from_str(content)?;
        config.fees.validate().context("invalid [fees] section")?;
        Ok(config)
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `tutoria.toml` in the current directory
/// 2. `~/.config/tutoria/config.toml`
///
/// Environment variable overrides: `TUTORIA_DATA_DIR`, `TUTORIA_DEFAULT_ORDER`.
pub fn load_config() -> Result<TutoriaConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<TutoriaConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("tutoria.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            TutoriaConfig::from_toml(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => TutoriaConfig::default(),
    };

    if let Ok(dir) = std::env::var("TUTORIA_DATA_DIR") {
        config.data_dir = PathBuf::from(dir);
    }
    if let Ok(order) = std::env::var("TUTORIA_DEFAULT_ORDER") {
        config.default_order = order
            .parse()
            .with_context(|| format!("invalid TUTORIA_DEFAULT_ORDER: {order}"))?;
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("tutoria"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = TutoriaConfig::default();
        assert_eq!(config.default_order, OrderBy::Name);
        assert_eq!(config.fees, FeeSchedule::default());
        assert_eq!(config.data_dir, PathBuf::from("./tutoria-data"));
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
default_order = "email"
data_dir = "/var/lib/tutoria"

[fees]
apprentice = 0.5
tutor = 0.75
top = 0.95
"#;
        let config = TutoriaConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.default_order, OrderBy::Email);
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/tutoria"));
        assert_eq!(config.fees.top, 0.95);
    }

    #[test]
    fn partial_fees_fall_back_to_defaults() {
        let config = TutoriaConfig::from_toml("[fees]\ntop = 0.99\n").unwrap();
        assert_eq!(config.fees.top, 0.99);
        assert_eq!(config.fees.apprentice, FeeSchedule::default().apprentice);
    }

    #[test]
    fn out_of_range_fee_is_rejected() {
        let err = TutoriaConfig::from_toml("[fees]\ntutor = 1.2\n").unwrap_err();
        assert!(format!("{err:#}").contains("tutor rate out of range"));
    }

    #[test]
    fn inverted_fee_schedule_is_rejected() {
        // A top tutor must never keep less than a plain tutor.
        let err = TutoriaConfig::from_toml("[fees]\ntop = 0.5\n").unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("invalid [fees] section"));
        assert!(message.contains("fee rates must not decrease with tier"));
    }

    #[test]
    fn unknown_order_is_rejected() {
        assert!(TutoriaConfig::from_toml("default_order = \"phone\"\n").is_err());
    }

    #[test]
    fn explicit_missing_path_fails() {
        let err = load_config_from(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn explicit_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tutoria.toml");
        std::fs::write(&path, "[fees]\napprentice = 0.3\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.fees.apprentice, 0.3);
    }
}
