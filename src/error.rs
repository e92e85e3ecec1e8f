use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaylistError {
    #[error("Invalid server address: {0}")]
    InvalidUrl(String),

    #[error("Error connecting to Jellyfin: {0}")]
    Connectivity(#[from] reqwest::Error),

    #[error("Unexpected channel list from Jellyfin: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, PlaylistError>;
