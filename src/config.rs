use anyhow::{Context, Result};
use std::{env, fmt, path::PathBuf};

pub const DEFAULT_TOP_250_URL: &str = "https://imdb-api.com/en/API/Top250Movies/";
pub const CACHE_FILE_NAME: &str = "Movies.json";
const DEFAULT_PORT: u16 = 3146;

#[derive(Clone)]
pub struct Settings {
    pub api_key: String,
    pub top_250_url: String,
    pub content_root: PathBuf,
    pub port: u16,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("API_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("Missing required environment variable: API_KEY"))?;
        let top_250_url = env::var("TOP_250_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TOP_250_URL.to_string());
        let content_root = env::var("CONTENT_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));
        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("PORT is not a valid port number: {}", raw))?,
            Err(_) => DEFAULT_PORT,
        };
        Ok(Self {
            api_key,
            top_250_url,
            content_root,
            port,
        })
    }

    pub fn cache_path(&self) -> PathBuf {
        self.content_root.join(CACHE_FILE_NAME)
    }
}

// The API key must never end up in logs.
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"<redacted>")
            .field("top_250_url", &self.top_250_url)
            .field("content_root", &self.content_root)
            .field("port", &self.port)
            .finish()
    }
}
