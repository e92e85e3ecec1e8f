use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::error::{PlaylistError, Result};

pub const CHANNELS_PATH: &str = "/LiveTv/Channels";

#[derive(Debug, Default, Deserialize)]
pub struct ChannelList {
    #[serde(rename = "Items", default)]
    pub items: Vec<ChannelItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChannelItem {
    pub id: String,
    pub name: Option<String>,
    pub number: Option<Value>,
    pub channel_number: Option<Value>,
    pub image_tags: Option<HashMap<String, Value>>,
}

/// Checks that `address` is an absolute http(s) URL and strips surrounding
/// whitespace and trailing slashes so it can be used as an interpolation
/// prefix.
pub fn normalize_server(address: &str) -> Result<String> {
    let address = address.trim();
    let url = Url::parse(address).map_err(|_| PlaylistError::InvalidUrl(address.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(PlaylistError::InvalidUrl(address.to_string()));
    }
    Ok(address.trim_end_matches('/').to_string())
}

pub struct JellyfinClient {
    client: Client,
    server: String,
    api_key: String,
}

impl JellyfinClient {
    pub fn new(server: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let server = normalize_server(server)?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(JellyfinClient {
            client,
            server,
            api_key: api_key.to_string(),
        })
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    fn channels_url(&self) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.server, CHANNELS_PATH))?;
        url.query_pairs_mut().append_pair("api_key", &self.api_key);
        Ok(url)
    }

    #[instrument(skip(self), fields(server = %self.server))]
    pub async fn get_channels(&self) -> Result<ChannelList> {
        let response = self
            .client
            .get(self.channels_url()?)
            .send()
            .await?
            .error_for_status()?;

        let body = response.bytes().await?;
        let channels: ChannelList = serde_json::from_slice(&body)?;
        debug!("Received {} channels", channels.items.len());

        Ok(channels)
    }
}
