/// Settings loading
///
/// Priority: environment (`TABLEGATE__*`) > config file > defaults. The
/// file is `./tablegate.toml` when present, or the path given explicitly,
/// which must then exist.

use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::core::DataAccessError;
use crate::evaluator::Dialect;

const ENV_PREFIX: &str = "TABLEGATE";
const DEFAULT_FILE: &str = "tablegate";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file path, or `:memory:`.
    #[serde(default = "default_path")]
    pub path: String,
    /// Dialect used when printing statements.
    #[serde(default)]
    pub dialect: Dialect,
    #[serde(default = "default_create_if_missing")]
    pub create_if_missing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub database: DatabaseSettings,
    /// `tracing_subscriber::EnvFilter` directives; `RUST_LOG` wins when set.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_path() -> String { ":memory:".to_string() }
fn default_create_if_missing() -> bool { true }
fn default_log_filter() -> String { "warn".to_string() }

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: default_path(),
            dialect: Dialect::default(),
            create_if_missing: default_create_if_missing(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseSettings::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl Settings {
    /// Loads settings from the optional file and the process environment.
    pub fn load(file: Option<&Path>) -> Result<Self, DataAccessError> {
        Self::load_with(file, Environment::with_prefix(ENV_PREFIX))
    }

    /// Loads settings with an explicit environment source.
    pub fn load_with(
        file: Option<&Path>,
        environment: Environment,
    ) -> Result<Self, DataAccessError> {
        let mut builder = Config::builder();

        builder = match file {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_FILE).required(false)),
        };

        builder = builder.add_source(environment.separator("__").try_parsing(true));

        let settings = builder.build()?.try_deserialize::<Self>()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn no_env() -> Environment {
        Environment::with_prefix(ENV_PREFIX).source(Some(HashMap::new()))
    }

    #[test]
    fn test_defaults_without_sources() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.toml");
        std::fs::write(&path, "").unwrap();

        let settings = Settings::load_with(Some(&path), no_env()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.database.path, ":memory:");
        assert_eq!(settings.database.dialect, Dialect::Sqlite);
    }

    #[test]
    fn test_file_values() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "log_filter = \"tablegate=debug\"\n\n[database]\npath = \"/tmp/app.db\"\n\
             dialect = \"mariadb\"\ncreate_if_missing = false"
        )
        .unwrap();

        let settings = Settings::load_with(Some(file.path()), no_env()).unwrap();
        assert_eq!(settings.log_filter, "tablegate=debug");
        assert_eq!(settings.database.path, "/tmp/app.db");
        assert_eq!(settings.database.dialect, Dialect::MySql);
        assert!(!settings.database.create_if_missing);
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[database]\npath = \"from-file.db\"").unwrap();

        let env = HashMap::from([
            ("TABLEGATE__DATABASE__PATH".to_string(), "from-env.db".to_string()),
            ("TABLEGATE__DATABASE__CREATE_IF_MISSING".to_string(), "false".to_string()),
        ]);
        let environment = Environment::with_prefix(ENV_PREFIX).source(Some(env));

        let settings = Settings::load_with(Some(file.path()), environment).unwrap();
        assert_eq!(settings.database.path, "from-env.db");
        assert!(!settings.database.create_if_missing);
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load_with(Some(&dir.path().join("nope.toml")), no_env()).unwrap_err();
        assert!(matches!(err, DataAccessError::Config(_)));
    }

    #[test]
    fn test_unknown_dialect_fails() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[database]\ndialect = \"oracle\"").unwrap();
        assert!(Settings::load_with(Some(file.path()), no_env()).is_err());
    }
}
