use std::path::{Path, PathBuf};

pub const REPLIT_DEFAULT_PORT: u16 = 8080;
pub const LOCAL_DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_HOST: &str = "0.0.0.0";

const REPLIT_DB_PATH: &str = ".data/todos.db";
const RENDER_DB_PATH: &str = "/tmp/todos.db";
const LOCAL_DB_PATH: &str = "./todos.db";

/// Deployment profile the server is running under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Local,
    Replit,
    Render,
}

impl Platform {
    /// Detects the platform from marker variables, Replit wins over Render
    pub fn detect<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if lookup("REPL_ID").is_some() {
            Platform::Replit
        } else if lookup("RENDER").is_some() {
            Platform::Render
        } else {
            Platform::Local
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Local => "Local",
            Platform::Replit => "Replit",
            Platform::Render => "Render",
        }
    }

    fn default_port(&self) -> u16 {
        match self {
            Platform::Replit => REPLIT_DEFAULT_PORT,
            Platform::Render | Platform::Local => LOCAL_DEFAULT_PORT,
        }
    }

    fn db_path(&self) -> &'static str {
        match self {
            Platform::Replit => REPLIT_DB_PATH,
            Platform::Render => RENDER_DB_PATH,
            Platform::Local => LOCAL_DB_PATH,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Resolved server configuration, read-only once the server starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub platform: Platform,
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
}

impl Config {
    /// Resolve from the process environment
    pub fn from_env() -> Self {
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Resolve from an arbitrary variable lookup.
    ///
    /// Never fails: an unset or unparsable `PORT` falls back to the
    /// platform default and an unknown environment is treated as local.
    pub fn resolve<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let platform = Platform::detect(&lookup);

        let port = lookup("PORT")
            .and_then(|value| value.trim().parse::<u16>().ok())
            .unwrap_or_else(|| platform.default_port());

        let host = lookup("HOST")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        Config {
            platform,
            host,
            port,
            db_path: PathBuf::from(platform.db_path()),
        }
    }

    /// Address the http server binds to
    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }

    pub fn db_path_display(&self) -> String {
        self.db_path.display().to_string()
    }

    /// Creates the directory holding the store file if it is missing
    pub fn prepare_store_dir(&self) -> std::io::Result<()> {
        match self.db_path.parent() {
            Some(dir) if dir != Path::new("") && !dir.exists() => {
                log::info!("Creating store directory {}", dir.display());
                std::fs::create_dir_all(dir)
            }
            _ => Ok(()),
        }
    }
}
