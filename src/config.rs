use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

/// Environment-derived settings, constructed once at startup and passed
/// into the storage constructor. There is no ambient global.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database location. A plain path (optionally `file:`-prefixed) for
    /// the embedded engine, or a remote URL when a token is set.
    pub db_url: Option<String>,
    /// Access token for the remote authenticated endpoint. Its presence
    /// selects the remote backend.
    pub db_token: Option<String>,
    pub env: Environment,
}

/// Which backend the configuration selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Embedded database at a local file path.
    Local(PathBuf),
    /// Remote authenticated endpoint.
    Remote { url: String, token: String },
}

impl Config {
    /// Reads `DB_URL`, `DB_TOKEN` and `ENV`, loading a `.env` file first
    /// if one exists. Anything other than `ENV=production` means
    /// development.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env = match env::var("ENV").as_deref() {
            Ok("production") => Environment::Production,
            _ => Environment::Development,
        };

        Config {
            db_url: env::var("DB_URL").ok().filter(|s| !s.is_empty()),
            db_token: env::var("DB_TOKEN").ok().filter(|s| !s.is_empty()),
            env,
        }
    }

    pub fn is_development(&self) -> bool {
        self.env == Environment::Development
    }

    /// Selects the backend: a token means the remote authenticated
    /// endpoint; otherwise the embedded local file, defaulting to the
    /// platform data directory.
    pub fn connection_mode(&self) -> ConnectionMode {
        if let Some(token) = &self.db_token {
            return ConnectionMode::Remote {
                url: self.db_url.clone().unwrap_or_default(),
                token: token.clone(),
            };
        }
        let path = match &self.db_url {
            Some(url) => PathBuf::from(url.strip_prefix("file:").unwrap_or(url)),
            None => default_db_path(),
        };
        ConnectionMode::Local(path)
    }
}

/// `~/.local/share/nudge/nudge.db` on Linux, the platform equivalent
/// elsewhere, falling back to the working directory.
fn default_db_path() -> PathBuf {
    let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    p.push("nudge");
    p.push("nudge.db");
    p
}
