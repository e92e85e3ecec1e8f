pub mod channel;
pub mod cli;
pub mod config;
pub mod epg;
pub mod error;
pub mod generate;
pub mod jellyfin;
pub mod m3u;
pub mod renumber;

pub use cli::Args;
pub use config::Config;
pub use error::PlaylistError;
pub use generate::PlaylistGenerator;
pub use m3u::Playlist;
pub use renumber::{renumber, RenumberOptions};
