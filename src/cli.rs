use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "jellym3u")]
#[command(about = "Build and renumber M3U playlists for Jellyfin Live TV")]
pub struct Args {
    #[arg(
        long,
        global = true,
        env = "JELLYM3U_CONFIG",
        default_value = "jellym3u.toml",
        help = "Config file"
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(about = "Write local and public playlists of direct stream URLs from Jellyfin")]
    Generate {
        #[arg(long, help = "Fetch the channel list from the public server")]
        public: bool,
    },
    #[command(about = "Renumber an existing playlist's channels sequentially")]
    Renumber {
        #[arg(long, help = "Playlist to read")]
        input: Option<PathBuf>,
        #[arg(long, help = "Playlist to write")]
        output: Option<PathBuf>,
        #[arg(long, help = "First channel number")]
        start: Option<u32>,
        #[arg(long, help = "Keep attributes other than the standard tvg-* and group-title")]
        keep_extra_attributes: bool,
    },
    #[command(about = "Generate a placeholder XMLTV guide from a playlist")]
    Epg {
        #[arg(long, help = "Playlist to read")]
        input: Option<PathBuf>,
        #[arg(long, help = "Guide to write")]
        output: Option<PathBuf>,
    },
}
