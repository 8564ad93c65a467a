use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;
use zb_domain::config::DaemonConfig;

use crate::clock::Zone;

/// Prefix of environment overrides, e.g. `ZWEMBOT__SCHEDULE__MIN_INTERVAL_SECS`.
pub const ENV_PREFIX: &str = "ZWEMBOT";
/// Looked up (with any supported extension) when no explicit file is given.
pub const DEFAULT_CONFIG_FILE: &str = "zwembot";

#[zb_derive::zb_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },

    #[error("Invalid configuration{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Loads `T` from a config file overlaid with `ZWEMBOT__*` environment variables.
///
/// An explicit `path` must exist. Without one, `./zwembot.{toml,json,yaml}` is
/// used when present and skipped otherwise, so a bare environment is enough.
/// Nested keys use `__` (`ZWEMBOT__STORAGE__DATA_DIR` maps to `storage.data_dir`).
///
/// # Errors
/// Fails when an explicit file is missing, a source cannot be parsed, or the
/// merged values do not fit `T`.
///
/// # Example
/// ```rust
/// use zb_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    load_layers(path, None)
}

/// `env` replaces the process environment when set.
fn load_layers<T>(
    path: Option<impl AsRef<Path>>,
    env: Option<config::Map<String, String>>,
) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let (effective_path, required) = path.map_or_else(
        || (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        |p| (p.as_ref().to_path_buf(), true),
    );

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true).source(env),
        );

    info!(path = %effective_path.display(), required, "Loading config");

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

/// Cross-field checks that serde defaults cannot express.
///
/// # Errors
/// [`ConfigError::Validation`] naming the first offending setting.
pub fn validate(config: &DaemonConfig) -> Result<(), ConfigError> {
    let schedule = &config.schedule;
    if schedule.max_interval_secs == 0 {
        return Err(invalid("schedule.max_interval_secs must be greater than zero"));
    }
    if schedule.min_interval_secs > schedule.max_interval_secs {
        return Err(invalid(format!(
            "schedule.min_interval_secs ({}) exceeds schedule.max_interval_secs ({})",
            schedule.min_interval_secs, schedule.max_interval_secs
        )));
    }
    if config.upstream.timeout_secs == 0 {
        return Err(invalid("upstream.timeout_secs must be greater than zero"));
    }
    config
        .clock
        .timezone
        .parse::<Zone>()
        .map_err(|e| invalid(format!("clock.timezone: {e}")))?;
    Ok(())
}

fn invalid(message: impl Into<Cow<'static, str>>) -> ConfigError {
    ConfigError::Validation { message: message.into(), context: None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zwembot.toml");
        std::fs::write(&path, "[schedule]\nmin_interval_secs = 120\nmax_interval_secs = 240\n")
            .unwrap();

        let env = config::Map::from_iter([
            ("ZWEMBOT__SCHEDULE__MIN_INTERVAL_SECS".to_owned(), "200".to_owned()),
            ("ZWEMBOT__CLOCK__TIMEZONE".to_owned(), "+01:00".to_owned()),
            ("UNRELATED__SCHEDULE__SEED".to_owned(), "5".to_owned()),
        ]);
        let cfg: DaemonConfig = load_layers(Some(&path), Some(env)).unwrap();

        assert_eq!(cfg.schedule.min_interval_secs, 200);
        assert_eq!(cfg.schedule.max_interval_secs, 240);
        assert_eq!(cfg.schedule.seed, None);
        assert_eq!(cfg.clock.timezone, "+01:00");
    }

    #[test]
    fn defaults_are_valid() {
        validate(&DaemonConfig::default()).unwrap();
    }

    #[test]
    fn inverted_interval_is_rejected() {
        let mut cfg = DaemonConfig::default();
        cfg.schedule.min_interval_secs = 3000;
        let err = validate(&cfg).unwrap_err();
        assert!(err.to_string().contains("min_interval_secs"), "{err}");
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut cfg = DaemonConfig::default();
        cfg.schedule.min_interval_secs = 0;
        cfg.schedule.max_interval_secs = 0;
        assert!(matches!(validate(&cfg), Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let mut cfg = DaemonConfig::default();
        cfg.clock.timezone = "Mars/Olympus".to_owned();
        assert!(matches!(validate(&cfg), Err(ConfigError::Validation { .. })));
    }
}
