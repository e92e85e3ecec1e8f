use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::channel::{build_playlist, ChannelRecord, StreamTarget};
use crate::config::Config;
use crate::jellyfin::{normalize_server, JellyfinClient};

/// Which server the emitted URLs point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Local,
    Public,
}

impl Audience {
    pub fn label(self) -> &'static str {
        match self {
            Audience::Local => "local",
            Audience::Public => "public",
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputTarget {
    pub audience: Audience,
    pub server: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct GeneratedPlaylist {
    pub audience: Audience,
    pub path: PathBuf,
    pub channels: usize,
}

pub struct PlaylistGenerator {
    source: JellyfinClient,
    api_key: String,
    group_title: String,
    epg_url: Option<String>,
    outputs: Vec<OutputTarget>,
}

impl PlaylistGenerator {
    /// Fetches from the public server when `public` is set, the local one
    /// otherwise. Both playlists are written either way.
    pub fn new(config: &Config, public: bool) -> Result<Self> {
        let jellyfin = &config.jellyfin;
        let source_server = if public {
            &jellyfin.public_server
        } else {
            &jellyfin.local_server
        };

        let source = JellyfinClient::new(
            source_server,
            &jellyfin.api_key,
            Duration::from_secs(jellyfin.timeout_secs),
        )
        .context("Invalid source server")?;

        let outputs = vec![
            OutputTarget {
                audience: Audience::Local,
                server: normalize_server(&jellyfin.local_server)
                    .context("Invalid local server")?,
                path: config.generate.local_output.clone(),
            },
            OutputTarget {
                audience: Audience::Public,
                server: normalize_server(&jellyfin.public_server)
                    .context("Invalid public server")?,
                path: config.generate.public_output.clone(),
            },
        ];

        Ok(PlaylistGenerator {
            source,
            api_key: jellyfin.api_key.clone(),
            group_title: config.generate.group_title.clone(),
            epg_url: config.generate.epg_url.clone(),
            outputs,
        })
    }

    pub fn source_server(&self) -> &str {
        self.source.server()
    }

    async fn fetch_channels(&self) -> Result<Vec<ChannelRecord>> {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::with_template("{spinner:.green} Fetching channels: {msg}")?);
        pb.set_message(self.source.server().to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        let channels = match self.source.get_channels().await {
            Ok(channels) => channels,
            Err(err) => {
                pb.abandon_with_message(format!("✗ {}", self.source.server()));
                return Err(err.into());
            }
        };

        pb.finish_with_message(format!(
            "✓ Fetched {} channels from {}",
            channels.items.len(),
            self.source.server()
        ));
        Ok(channels.items.iter().map(ChannelRecord::from).collect())
    }

    pub async fn generate(&self) -> Result<Vec<GeneratedPlaylist>> {
        let records = self.fetch_channels().await?;
        let mut generated = Vec::with_capacity(self.outputs.len());

        for output in &self.outputs {
            let target = StreamTarget {
                server: &output.server,
                api_key: &self.api_key,
                group_title: &self.group_title,
            };
            let playlist = build_playlist(&records, &target, self.epg_url.as_deref());

            playlist
                .write_to(&output.path)
                .with_context(|| format!("Failed to write playlist: {}", output.path.display()))?;
            info!(
                "Wrote {} entries for {} to {}",
                playlist.len(),
                output.server,
                output.path.display()
            );

            generated.push(GeneratedPlaylist {
                audience: output.audience,
                path: output.path.clone(),
                channels: playlist.len(),
            });
        }

        Ok(generated)
    }
}
