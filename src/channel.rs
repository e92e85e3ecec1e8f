use serde_json::Value;

use crate::jellyfin::ChannelItem;
use crate::m3u::{Attributes, ExtInf, Playlist, PlaylistEntry, PlaylistHeader};

pub const UNKNOWN_NAME: &str = "Unknown";

/// A channel normalized from the API, ready to be formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRecord {
    pub id: String,
    pub name: String,
    pub number: String,
    pub has_logo: bool,
}

/// Server address and key the emitted URLs point at.
#[derive(Debug, Clone, Copy)]
pub struct StreamTarget<'a> {
    pub server: &'a str,
    pub api_key: &'a str,
    pub group_title: &'a str,
}

impl StreamTarget<'_> {
    pub fn stream_url(&self, id: &str) -> String {
        format!(
            "{}/LiveTv/Channels/{}/stream.m3u8?api_key={}",
            self.server, id, self.api_key
        )
    }

    pub fn logo_url(&self, id: &str) -> String {
        format!(
            "{}/Items/{}/Images/Primary?api_key={}",
            self.server, id, self.api_key
        )
    }
}

// Empty strings, zero, false and null all count as absent.
fn present(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

impl From<&ChannelItem> for ChannelRecord {
    fn from(item: &ChannelItem) -> Self {
        let number = present(item.number.as_ref())
            .or_else(|| present(item.channel_number.as_ref()))
            .unwrap_or_default();

        let has_logo = present(
            item.image_tags
                .as_ref()
                .and_then(|tags| tags.get("Primary")),
        )
        .is_some();

        ChannelRecord {
            id: item.id.clone(),
            name: item.name.clone().unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            number,
            has_logo,
        }
    }
}

impl ChannelRecord {
    pub fn to_entry(&self, target: &StreamTarget<'_>) -> PlaylistEntry {
        let logo = if self.has_logo {
            target.logo_url(&self.id)
        } else {
            String::new()
        };

        let mut attributes = Attributes::new();
        attributes.push("tvg-id", self.id.as_str());
        attributes.push("tvg-chno", self.number.as_str());
        attributes.push("tvg-name", self.name.as_str());
        attributes.push("tvg-logo", logo);
        attributes.push("group-title", target.group_title);

        PlaylistEntry {
            info: ExtInf::new(attributes, self.name.as_str()),
            url: target.stream_url(&self.id),
        }
    }
}

pub fn build_playlist(
    records: &[ChannelRecord],
    target: &StreamTarget<'_>,
    epg_url: Option<&str>,
) -> Playlist {
    let mut playlist = Playlist::new(PlaylistHeader {
        epg_url: epg_url.map(str::to_string),
    });
    for record in records {
        playlist.push(record.to_entry(target));
    }
    playlist
}
