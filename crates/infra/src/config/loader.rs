//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `HOMEDASH_BIND_ADDR`: Listen address (optional)
//! - `HOMEDASH_DB_PATH`: Database file path (required)
//! - `HOMEDASH_DB_POOL_SIZE`: Connection pool size (optional)
//! - `HOMEDASH_GOOGLE_CLIENT_ID`: OAuth client id (required)
//! - `HOMEDASH_GOOGLE_CLIENT_SECRET`: OAuth client secret (required)
//! - `HOMEDASH_GOOGLE_REDIRECT_URI`: OAuth redirect URI (required)
//! - `HOMEDASH_DISCORD_WEBHOOK_URL`: Contact webhook (optional)
//! - `HOMEDASH_PROBE_URL`: Reachability probe URL (optional)
//! - `HOMEDASH_COOKIE_NAME`: Session cookie name (optional)

use std::path::{Path, PathBuf};

use homedash_domain::{
    AppConfig, ConnectivityConfig, DatabaseConfig, DiscordConfig, GoogleConfig, HomedashError,
    Result, ServerConfig, SessionConfig,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `HomedashError::Config` if configuration cannot be loaded from
/// either source.
pub fn load() -> Result<AppConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `HomedashError::Config` if required variables are missing or
/// have invalid values.
pub fn load_from_env() -> Result<AppConfig> {
    let mut google = GoogleConfig::with_credentials(
        env_var("HOMEDASH_GOOGLE_CLIENT_ID")?,
        env_var("HOMEDASH_GOOGLE_CLIENT_SECRET")?,
        env_var("HOMEDASH_GOOGLE_REDIRECT_URI")?,
    );
    if let Ok(endpoint) = std::env::var("HOMEDASH_GOOGLE_TOKEN_ENDPOINT") {
        google.token_endpoint = endpoint;
    }
    if let Ok(endpoint) = std::env::var("HOMEDASH_GOOGLE_AUTH_ENDPOINT") {
        google.auth_endpoint = endpoint;
    }
    if let Ok(endpoint) = std::env::var("HOMEDASH_GOOGLE_USERINFO_ENDPOINT") {
        google.userinfo_endpoint = endpoint;
    }
    if let Ok(endpoint) = std::env::var("HOMEDASH_GOOGLE_CALENDAR_ENDPOINT") {
        google.calendar_endpoint = endpoint;
    }

    let mut server = ServerConfig::default();
    if let Ok(addr) = std::env::var("HOMEDASH_BIND_ADDR") {
        server.bind_addr = addr;
    }

    let pool_size = match std::env::var("HOMEDASH_DB_POOL_SIZE") {
        Ok(s) => s
            .parse::<u32>()
            .map_err(|e| HomedashError::Config(format!("invalid pool size: {e}")))?,
        Err(_) => 8,
    };

    let mut connectivity = ConnectivityConfig::default();
    if let Ok(url) = std::env::var("HOMEDASH_PROBE_URL") {
        connectivity.probe_url = url;
    }

    let mut session = SessionConfig::default();
    if let Ok(name) = std::env::var("HOMEDASH_COOKIE_NAME") {
        session.cookie_name = name;
    }

    Ok(AppConfig {
        server,
        database: DatabaseConfig { path: env_var("HOMEDASH_DB_PATH")?, pool_size },
        google,
        discord: DiscordConfig { webhook_url: std::env::var("HOMEDASH_DISCORD_WEBHOOK_URL").ok() },
        connectivity,
        session,
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `HomedashError::Config` if no file is found or parsing fails.
pub fn load_from_file(path: Option<PathBuf>) -> Result<AppConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(HomedashError::Config(format!(
                    "config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            HomedashError::Config("no config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| HomedashError::Config(format!("failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, format detected by extension.
fn parse_config(contents: &str, path: &Path) -> Result<AppConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| HomedashError::Config(format!("invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| HomedashError::Config(format!("invalid JSON format: {e}"))),
        _ => Err(HomedashError::Config(format!("unsupported config format: {extension}"))),
    }
}

/// Probe standard locations for configuration files.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.toml"),
            cwd.join("config.json"),
            cwd.join("homedash.toml"),
            cwd.join("homedash.json"),
        ]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.toml"),
                exe_dir.join("config.json"),
                exe_dir.join("homedash.toml"),
                exe_dir.join("homedash.json"),
            ]);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| HomedashError::Config(format!("missing required environment variable: {key}")))
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ENV_KEYS: &[&str] = &[
        "HOMEDASH_BIND_ADDR",
        "HOMEDASH_DB_PATH",
        "HOMEDASH_DB_POOL_SIZE",
        "HOMEDASH_GOOGLE_CLIENT_ID",
        "HOMEDASH_GOOGLE_CLIENT_SECRET",
        "HOMEDASH_GOOGLE_REDIRECT_URI",
        "HOMEDASH_GOOGLE_TOKEN_ENDPOINT",
        "HOMEDASH_DISCORD_WEBHOOK_URL",
        "HOMEDASH_PROBE_URL",
        "HOMEDASH_COOKIE_NAME",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn loads_from_env_when_required_vars_are_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("HOMEDASH_DB_PATH", "/tmp/dash.db");
        std::env::set_var("HOMEDASH_DB_POOL_SIZE", "4");
        std::env::set_var("HOMEDASH_GOOGLE_CLIENT_ID", "cid");
        std::env::set_var("HOMEDASH_GOOGLE_CLIENT_SECRET", "secret");
        std::env::set_var("HOMEDASH_GOOGLE_REDIRECT_URI", "http://localhost:8787/auth/google");
        std::env::set_var("HOMEDASH_DISCORD_WEBHOOK_URL", "https://discord.test/hook");

        let config = load_from_env().unwrap();
        assert_eq!(config.database.path, "/tmp/dash.db");
        assert_eq!(config.database.pool_size, 4);
        assert_eq!(config.google.client_id, "cid");
        assert_eq!(config.google.token_endpoint, "https://oauth2.googleapis.com/token");
        assert_eq!(config.discord.webhook_url, Some("https://discord.test/hook".to_string()));
        assert_eq!(config.session.cookie_name, "homedash_session");

        clear_env();
    }

    #[test]
    fn missing_required_var_is_a_config_error() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let result = load_from_env();
        assert!(matches!(result, Err(HomedashError::Config(_))));
    }

    #[test]
    fn endpoint_overrides_are_honored() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("HOMEDASH_DB_PATH", "/tmp/dash.db");
        std::env::set_var("HOMEDASH_GOOGLE_CLIENT_ID", "cid");
        std::env::set_var("HOMEDASH_GOOGLE_CLIENT_SECRET", "secret");
        std::env::set_var("HOMEDASH_GOOGLE_REDIRECT_URI", "http://localhost/cb");
        std::env::set_var("HOMEDASH_GOOGLE_TOKEN_ENDPOINT", "http://localhost:9/token");

        let config = load_from_env().unwrap();
        assert_eq!(config.google.token_endpoint, "http://localhost:9/token");

        clear_env();
    }

    #[test]
    fn loads_from_toml_file() {
        let toml_content = r#"
[server]
bind_addr = "0.0.0.0:9000"

[database]
path = "dash.db"
pool_size = 6

[google]
client_id = "cid"
client_secret = "secret"
redirect_uri = "http://localhost:9000/auth/google"

[discord]
webhook_url = "https://discord.test/hook"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        let path = temp_file.path().with_extension("toml");
        std::fs::copy(temp_file.path(), &path).unwrap();

        let config = load_from_file(Some(path.clone())).unwrap();
        assert_eq!(config.server.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.database.pool_size, 6);
        assert!(config.google.scopes.iter().any(|s| s.contains("calendar")));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn file_not_found_is_a_config_error() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/config.json")));
        assert!(matches!(result, Err(HomedashError::Config(_))));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let result = parse_config("anything", &PathBuf::from("config.yaml"));
        assert!(matches!(result, Err(HomedashError::Config(_))));
    }
}
