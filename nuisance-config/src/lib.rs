//! # Nuisance Configuration System
//!
//! Layered configuration for the nuisance reporting workspace.
//!
//! ## Features
//! - **Unified Configuration**: one struct shared by the CLI and the core
//! - **Validation**: runtime validation of every loaded value
//! - **Environment Awareness**: per-environment YAML overrides and env variables

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod error;
mod notifier;
mod store;
mod validation;

pub use error::ConfigError;
pub use notifier::NotifierConfig;
pub use store::StoreConfig;

/// Plain variables understood for compatibility with existing `.env` files,
/// mapped to their nested key.
const PLAIN_ENV_KEYS: [(&str, &str); 6] = [
    ("smtp_server", "notifier.smtp_server"),
    ("smtp_port", "notifier.smtp_port"),
    ("sender_email", "notifier.sender_email"),
    ("sender_password", "notifier.sender_password"),
    ("security_email", "notifier.security_email"),
    ("reports_file", "store.path"),
];

/// Top-level configuration container.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone, PartialEq, Eq)]
pub struct NuisanceConfig {
    /// Record store location.
    #[validate(nested)]
    #[serde(default)]
    pub store: StoreConfig,

    /// Alert delivery settings.
    #[validate(nested)]
    #[serde(default)]
    pub notifier: NotifierConfig,
}

impl NuisanceConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default Values
    /// 2. `config/nuisance.yaml` - base settings. If missing, defaults are used.
    /// 3. `config/<environment>.yaml` - environment-specific overrides (`NUISANCE_ENV`).
    /// 4. Plain `SMTP_SERVER`, `SMTP_PORT`, `SENDER_EMAIL`, `SENDER_PASSWORD`,
    ///    `SECURITY_EMAIL` and `REPORTS_FILE` variables.
    /// 5. `NUISANCE_*` environment variables, `__` separating sections.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(NuisanceConfig::default()));

        if Path::new("config/nuisance.yaml").exists() {
            figment = figment.merge(Yaml::file("config/nuisance.yaml"));
        }

        let env = std::env::var("NUISANCE_ENV").unwrap_or_else(|_| "production".into());
        let env_file = format!("config/{}.yaml", env);
        if Path::new(&env_file).exists() {
            figment = figment.merge(Yaml::file(env_file));
        }

        Self::extract(figment)
    }

    /// Load configuration from a specific path, still honouring the environment.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        let figment = Figment::from(Serialized::defaults(NuisanceConfig::default()))
            .merge(Yaml::file(path));
        Self::extract(figment)
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        figment
            .merge(plain_env())
            .merge(Env::prefixed("NUISANCE_").ignore(&["env"]).split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}

fn plain_env() -> Env {
    let names: Vec<&str> = PLAIN_ENV_KEYS.iter().map(|(name, _)| *name).collect();
    Env::raw().only(&names).map(|key| {
        PLAIN_ENV_KEYS
            .iter()
            .find(|(name, _)| key == *name)
            .map(|(_, nested)| (*nested).into())
            .unwrap_or_else(|| key.as_str().into())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn full_config_validation() {
        let config = NuisanceConfig::default();
        config.validate().expect("Default config should validate");
        assert_eq!(config.store.path, PathBuf::from("reports.csv"));
        assert_eq!(config.notifier.smtp_port, 587);
    }

    #[test]
    fn yaml_file_and_environment_override() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file(
                "config/nuisance.yaml",
                "store:\n  path: data/reports.csv\nnotifier:\n  smtp_server: mail.cherrywood.example\n",
            )?;
            jail.set_env("NUISANCE_NOTIFIER__SMTP_PORT", "2525");

            let config = NuisanceConfig::load().expect("config should load");
            assert_eq!(config.store.path, PathBuf::from("data/reports.csv"));
            assert_eq!(config.notifier.smtp_server, "mail.cherrywood.example");
            assert_eq!(config.notifier.smtp_port, 2525);
            Ok(())
        });
    }

    #[test]
    fn plain_variables_are_honoured() {
        Jail::expect_with(|jail| {
            jail.set_env("SENDER_EMAIL", "alerts@cherrywood.example");
            jail.set_env("SENDER_PASSWORD", "hunter2");
            jail.set_env("SECURITY_EMAIL", "security@cherrywood.example");
            jail.set_env("REPORTS_FILE", "elsewhere.csv");

            let config = NuisanceConfig::load().expect("config should load");
            assert!(config.notifier.is_configured());
            assert_eq!(config.notifier.sender_password, "hunter2");
            assert_eq!(config.store.path, PathBuf::from("elsewhere.csv"));
            Ok(())
        });
    }

    #[test]
    fn prefixed_variables_win_over_plain_ones() {
        Jail::expect_with(|jail| {
            jail.set_env("SMTP_PORT", "25");
            jail.set_env("NUISANCE_NOTIFIER__SMTP_PORT", "465");

            let config = NuisanceConfig::load().expect("config should load");
            assert_eq!(config.notifier.smtp_port, 465);
            Ok(())
        });
    }

    #[test]
    fn missing_file_is_reported() {
        let err = NuisanceConfig::load_from_path("does/not/exist.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn invalid_values_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("bad.yaml", "notifier:\n  security_email: nobody\n")?;
            let err = NuisanceConfig::load_from_path("bad.yaml").unwrap_err();
            assert!(matches!(err, ConfigError::Validation(_)));
            assert!(err.to_string().contains("notifier.security_email"));
            Ok(())
        });
    }
}
