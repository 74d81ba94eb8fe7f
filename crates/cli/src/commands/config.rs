use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use toml::Value;
use trimscout_core::config::AppConfig;

pub fn run(config: &AppConfig, explicit_path: Option<&Path>) -> String {
    let config_file_path = detect_config_path(explicit_path);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let fields = [
        ("database.url", config.database.url.clone(), "TRIMSCOUT_DATABASE_URL"),
        (
            "database.max_connections",
            config.database.max_connections.to_string(),
            "TRIMSCOUT_DATABASE_MAX_CONNECTIONS",
        ),
        (
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            "TRIMSCOUT_DATABASE_TIMEOUT_SECS",
        ),
        (
            "search.default_margin_pct",
            config.search.default_margin_pct.to_string(),
            "TRIMSCOUT_SEARCH_DEFAULT_MARGIN_PCT",
        ),
        (
            "search.margin_step_pct",
            config.search.margin_step_pct.to_string(),
            "TRIMSCOUT_SEARCH_MARGIN_STEP_PCT",
        ),
        (
            "search.max_margin_pct",
            config.search.max_margin_pct.to_string(),
            "TRIMSCOUT_SEARCH_MAX_MARGIN_PCT",
        ),
        (
            "search.min_results",
            config.search.min_results.to_string(),
            "TRIMSCOUT_SEARCH_MIN_RESULTS",
        ),
        (
            "search.max_results",
            config.search.max_results.to_string(),
            "TRIMSCOUT_SEARCH_MAX_RESULTS",
        ),
        (
            "search.upgrade_count",
            config.search.upgrade_count.to_string(),
            "TRIMSCOUT_SEARCH_UPGRADE_COUNT",
        ),
        ("logging.level", config.logging.level.clone(), "TRIMSCOUT_LOGGING_LEVEL"),
        ("logging.format", format!("{:?}", config.logging.format), "TRIMSCOUT_LOGGING_FORMAT"),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key_path, value, env_key) in fields {
        let source = field_source(
            key_path,
            Some(env_key),
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(key_path, &value, source));
    }

    lines.join("\n")
}

fn detect_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then(|| path.to_path_buf());
    }

    [PathBuf::from("trimscout.toml"), PathBuf::from("config/trimscout.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: Option<&str>,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_key {
        if env::var_os(env_key).is_some() {
            return format!("env ({env_key})");
        }
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
