use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::AttributeFilter;
use crate::recommend::{
    BudgetQuery, RelaxationPolicy, DEFAULT_MARGIN_PCT, DEFAULT_MAX_RESULTS, DEFAULT_MIN_RESULTS,
    MAX_UPGRADE_COUNT,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub search: SearchConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

/// Defaults applied to searches that do not set their own values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SearchConfig {
    pub default_margin_pct: u32,
    pub margin_step_pct: u32,
    pub max_margin_pct: u32,
    pub min_results: usize,
    pub max_results: usize,
    pub upgrade_count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub default_margin_pct: Option<u32>,
    pub max_results: Option<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        let policy = RelaxationPolicy::default();
        Self {
            database: DatabaseConfig {
                url: "sqlite://trimscout.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            search: SearchConfig {
                default_margin_pct: DEFAULT_MARGIN_PCT,
                margin_step_pct: policy.step_pct,
                max_margin_pct: policy.max_margin_pct,
                min_results: DEFAULT_MIN_RESULTS,
                max_results: DEFAULT_MAX_RESULTS,
                upgrade_count: 2,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl SearchConfig {
    pub fn relaxation_policy(&self) -> RelaxationPolicy {
        RelaxationPolicy { step_pct: self.margin_step_pct, max_margin_pct: self.max_margin_pct }
    }

    /// A query for `budget` carrying the configured defaults.
    pub fn budget_query(&self, budget: i64) -> BudgetQuery {
        BudgetQuery {
            budget,
            margin_pct: self.default_margin_pct,
            make: None,
            model: None,
            min_results: self.min_results,
            max_results: self.max_results,
            attributes: AttributeFilter::default(),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("trimscout.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(search) = patch.search {
            if let Some(default_margin_pct) = search.default_margin_pct {
                self.search.default_margin_pct = default_margin_pct;
            }
            if let Some(margin_step_pct) = search.margin_step_pct {
                self.search.margin_step_pct = margin_step_pct;
            }
            if let Some(max_margin_pct) = search.max_margin_pct {
                self.search.max_margin_pct = max_margin_pct;
            }
            if let Some(min_results) = search.min_results {
                self.search.min_results = min_results;
            }
            if let Some(max_results) = search.max_results {
                self.search.max_results = max_results;
            }
            if let Some(upgrade_count) = search.upgrade_count {
                self.search.upgrade_count = upgrade_count;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("TRIMSCOUT_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("TRIMSCOUT_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_env("TRIMSCOUT_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("TRIMSCOUT_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_env("TRIMSCOUT_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("TRIMSCOUT_SEARCH_DEFAULT_MARGIN_PCT") {
            self.search.default_margin_pct =
                parse_env("TRIMSCOUT_SEARCH_DEFAULT_MARGIN_PCT", &value)?;
        }
        if let Some(value) = read_env("TRIMSCOUT_SEARCH_MARGIN_STEP_PCT") {
            self.search.margin_step_pct = parse_env("TRIMSCOUT_SEARCH_MARGIN_STEP_PCT", &value)?;
        }
        if let Some(value) = read_env("TRIMSCOUT_SEARCH_MAX_MARGIN_PCT") {
            self.search.max_margin_pct = parse_env("TRIMSCOUT_SEARCH_MAX_MARGIN_PCT", &value)?;
        }
        if let Some(value) = read_env("TRIMSCOUT_SEARCH_MIN_RESULTS") {
            self.search.min_results = parse_env("TRIMSCOUT_SEARCH_MIN_RESULTS", &value)?;
        }
        if let Some(value) = read_env("TRIMSCOUT_SEARCH_MAX_RESULTS") {
            self.search.max_results = parse_env("TRIMSCOUT_SEARCH_MAX_RESULTS", &value)?;
        }
        if let Some(value) = read_env("TRIMSCOUT_SEARCH_UPGRADE_COUNT") {
            self.search.upgrade_count = parse_env("TRIMSCOUT_SEARCH_UPGRADE_COUNT", &value)?;
        }

        let log_level =
            read_env("TRIMSCOUT_LOGGING_LEVEL").or_else(|| read_env("TRIMSCOUT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("TRIMSCOUT_LOGGING_FORMAT").or_else(|| read_env("TRIMSCOUT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(default_margin_pct) = overrides.default_margin_pct {
            self.search.default_margin_pct = default_margin_pct;
        }
        if let Some(max_results) = overrides.max_results {
            self.search.max_results = max_results;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_search(&self.search)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("trimscout.toml"), PathBuf::from("config/trimscout.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_search(search: &SearchConfig) -> Result<(), ConfigError> {
    if search.default_margin_pct > 100 {
        return Err(ConfigError::Validation(
            "search.default_margin_pct must be in range 0..=100".to_string(),
        ));
    }
    if search.margin_step_pct == 0 {
        return Err(ConfigError::Validation(
            "search.margin_step_pct must be greater than zero".to_string(),
        ));
    }
    if search.max_margin_pct > 100 {
        return Err(ConfigError::Validation(
            "search.max_margin_pct must be in range 0..=100".to_string(),
        ));
    }
    if search.min_results == 0 || search.min_results > search.max_results {
        return Err(ConfigError::Validation(
            "search.min_results must be at least 1 and not above search.max_results".to_string(),
        ));
    }
    if !(1..=MAX_UPGRADE_COUNT).contains(&search.upgrade_count) {
        return Err(ConfigError::Validation(format!(
            "search.upgrade_count must be in range 1..={MAX_UPGRADE_COUNT}"
        )));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    search: Option<SearchPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchPatch {
    default_margin_pct: Option<u32>,
    margin_step_pct: Option<u32>,
    max_margin_pct: Option<u32>,
    min_results: Option<usize>,
    max_results: Option<usize>,
    upgrade_count: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
