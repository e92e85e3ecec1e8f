use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::Result;
use crate::m3u::{Attributes, ExtInf, Playlist, PlaylistEntry, PlaylistHeader, EXTINF};

pub const DEFAULT_START: u32 = 100;
pub const DEFAULT_EPG_URL: &str =
    "https://raw.githubusercontent.com/BuddyChewChew/xumo-playlist-generator/main/playlists/xumo_epg.xml.gz";

const RECOGNISED: [&str; 5] = ["tvg-id", "tvg-chno", "tvg-name", "tvg-logo", "group-title"];

#[derive(Debug, Clone)]
pub struct RenumberOptions {
    pub start: u32,
    pub keep_extra_attributes: bool,
    pub epg_url: Option<String>,
}

impl Default for RenumberOptions {
    fn default() -> Self {
        Self {
            start: DEFAULT_START,
            keep_extra_attributes: false,
            epg_url: Some(DEFAULT_EPG_URL.to_string()),
        }
    }
}

struct ParsedChannel {
    tvg_id: String,
    tvg_name: String,
    tvg_logo: String,
    group_title: String,
    display_name: String,
    extra: Vec<(String, String)>,
}

impl ParsedChannel {
    fn from_info(info: &ExtInf) -> Option<Self> {
        if info.title.is_empty() {
            return None;
        }

        let extra = info
            .attributes
            .iter()
            .filter(|(key, _)| !RECOGNISED.iter().any(|r| r.eq_ignore_ascii_case(key)))
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();

        Some(Self {
            tvg_id: info.attributes.get("tvg-id")?.to_string(),
            tvg_name: info.attributes.get("tvg-name")?.to_string(),
            tvg_logo: info.attributes.get("tvg-logo")?.to_string(),
            group_title: info.attributes.get("group-title")?.to_string(),
            display_name: info.title.clone(),
            extra,
        })
    }

    fn into_entry(self, channel_number: u64, url: &str, keep_extra: bool) -> PlaylistEntry {
        let mut attributes = Attributes::new();
        attributes.push("tvg-id", self.tvg_id);
        attributes.push("tvg-chno", channel_number.to_string());
        attributes.push("tvg-name", self.tvg_name);
        attributes.push("tvg-logo", self.tvg_logo);
        attributes.push("group-title", self.group_title);
        if keep_extra {
            for (key, value) in self.extra {
                attributes.push(key, value);
            }
        }

        PlaylistEntry {
            info: ExtInf::new(attributes, self.display_name),
            url: url.to_string(),
        }
    }
}

/// Rebuilds `content` with channel numbers assigned sequentially from
/// `options.start`, in the original order.
///
/// The first line is treated as the header and skipped. An `#EXTINF` line
/// missing any of `tvg-id`, `tvg-name`, `tvg-logo`, `group-title` or a
/// display name is dropped. Option tags such as `#EXTVLCOPT` between the
/// metadata line and its URL are skipped and not re-emitted; an entry whose
/// URL is missing (blank line, next `#EXTINF` or end of input) is dropped.
pub fn renumber(content: &str, options: &RenumberOptions) -> Playlist {
    let lines: Vec<&str> = content.split('\n').collect();
    let mut playlist = Playlist::new(PlaylistHeader {
        epg_url: options.epg_url.clone(),
    });

    let mut channel_number = u64::from(options.start);
    let mut i = 1;
    while i < lines.len() {
        let line = lines[i].trim();
        if line.starts_with(EXTINF) {
            match ExtInf::parse(line).as_ref().and_then(ParsedChannel::from_info) {
                Some(channel) => {
                    let mut next = i + 1;
                    while lines
                        .get(next)
                        .map(|l| l.trim())
                        .is_some_and(|l| l.starts_with('#') && !l.starts_with(EXTINF))
                    {
                        next += 1;
                    }

                    match lines.get(next).map(|l| l.trim()) {
                        Some(url) if !url.is_empty() && !url.starts_with('#') => {
                            playlist.push(channel.into_entry(
                                channel_number,
                                url,
                                options.keep_extra_attributes,
                            ));
                            channel_number += 1;
                            i = next;
                        }
                        _ => debug!(line = i + 1, "Dropping entry without a stream URL"),
                    }
                }
                None => debug!(line = i + 1, "Skipping unrecognised EXTINF line"),
            }
        }
        i += 1;
    }

    playlist
}

pub fn renumber_file(input: &Path, output: &Path, options: &RenumberOptions) -> Result<usize> {
    let content = fs::read_to_string(input)?;
    let playlist = renumber(&content, options);
    playlist.write_to(output)?;
    Ok(playlist.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "#EXTM3U\n\
        #EXTINF:-1 tvg-id=\"a\" tvg-chno=\"7\" tvg-name=\"Alpha\" tvg-logo=\"http://l/a.png\" group-title=\"News\",Alpha\n\
        http://s/a.m3u8\n\
        #EXTINF:-1 tvg-id=\"b\" tvg-name=\"Bravo\" tvg-logo=\"\" group-title=\"Movies\",Bravo\n\
        http://s/b.m3u8\n\
        #EXTINF:-1 tvg-id=\"c\" tvg-name=\"Charlie\" tvg-logo=\"\" group-title=\"Kids\",Charlie\n\
        http://s/c.m3u8\n";

    fn numbers(playlist: &Playlist) -> Vec<String> {
        playlist
            .entries
            .iter()
            .map(|e| e.info.attributes.get("tvg-chno").unwrap().to_string())
            .collect()
    }

    #[test]
    fn numbers_from_start_in_order() {
        let playlist = renumber(SOURCE, &RenumberOptions::default());

        assert_eq!(numbers(&playlist), ["100", "101", "102"]);
        let names: Vec<_> = playlist.entries.iter().map(|e| e.info.title.as_str()).collect();
        assert_eq!(names, ["Alpha", "Bravo", "Charlie"]);
        assert_eq!(playlist.entries[2].url, "http://s/c.m3u8");
    }

    #[test]
    fn renders_expected_lines() {
        let options = RenumberOptions {
            start: 1,
            epg_url: None,
            ..Default::default()
        };
        let rendered = renumber(SOURCE, &options).render();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "#EXTM3U");
        assert_eq!(
            lines[1],
            "#EXTINF:-1 tvg-id=\"a\" tvg-chno=\"1\" tvg-name=\"Alpha\" tvg-logo=\"http://l/a.png\" group-title=\"News\",Alpha"
        );
        assert_eq!(lines[2], "http://s/a.m3u8");
    }

    #[test]
    fn default_header_points_at_epg() {
        let rendered = renumber(SOURCE, &RenumberOptions::default()).render();
        assert_eq!(
            rendered.lines().next().unwrap(),
            format!("#EXTM3U url-tvg=\"{DEFAULT_EPG_URL}\"")
        );
    }

    #[test]
    fn drops_line_missing_logo() {
        let content = SOURCE.replace(" tvg-logo=\"\" group-title=\"Movies\"", " group-title=\"Movies\"");
        let playlist = renumber(&content, &RenumberOptions::default());

        let ids: Vec<_> = playlist.entries.iter().map(|e| e.info.attributes.get("tvg-id").unwrap()).collect();
        assert_eq!(ids, ["a", "c"]);
        assert_eq!(numbers(&playlist), ["100", "101"]);
        assert_eq!(playlist.entries[1].url, "http://s/c.m3u8");
    }

    #[test]
    fn drops_line_without_display_name() {
        let content = "#EXTM3U\n#EXTINF:-1 tvg-id=\"a\" tvg-name=\"A\" tvg-logo=\"\" group-title=\"G\",\nhttp://s/a\n";
        assert!(renumber(content, &RenumberOptions::default()).is_empty());
    }

    #[test]
    fn accepts_attributes_in_any_order() {
        let content = "#EXTM3U\n\
            #EXTINF:-1 group-title=\"G\" tvg-logo=\"\" tvg-name=\"N\" tvg-id=\"x\",N\n\
            http://s/x\n";
        let playlist = renumber(content, &RenumberOptions::default());
        assert_eq!(
            playlist.entries[0].info.to_string(),
            "#EXTINF:-1 tvg-id=\"x\" tvg-chno=\"100\" tvg-name=\"N\" tvg-logo=\"\" group-title=\"G\",N"
        );
    }

    #[test]
    fn extra_attributes_are_optional() {
        let content = "#EXTM3U\n\
            #EXTINF:-1 tvg-id=\"x\" tvg-country=\"US\" tvg-name=\"N\" tvg-logo=\"\" group-title=\"G\" tvg-language=\"en\",N\n\
            http://s/x\n";

        let dropped = renumber(content, &RenumberOptions::default());
        assert_eq!(dropped.entries[0].info.attributes.len(), 5);

        let kept = renumber(
            content,
            &RenumberOptions {
                keep_extra_attributes: true,
                ..Default::default()
            },
        );
        assert!(kept.entries[0]
            .info
            .to_string()
            .ends_with("group-title=\"G\" tvg-country=\"US\" tvg-language=\"en\",N"));
    }

    #[test]
    fn drops_entry_without_url() {
        let content = "#EXTM3U\n\
            #EXTINF:-1 tvg-id=\"a\" tvg-name=\"A\" tvg-logo=\"\" group-title=\"G\",A\n\
            #EXTINF:-1 tvg-id=\"b\" tvg-name=\"B\" tvg-logo=\"\" group-title=\"G\",B\n\
            http://s/b\n\
            #EXTINF:-1 tvg-id=\"c\" tvg-name=\"C\" tvg-logo=\"\" group-title=\"G\",C\n\
            \n";
        let playlist = renumber(content, &RenumberOptions::default());

        assert_eq!(playlist.len(), 1);
        assert_eq!(playlist.entries[0].info.title, "B");
        assert_eq!(numbers(&playlist), ["100"]);
    }

    #[test]
    fn skips_option_tags_before_url() {
        let content = "#EXTM3U\n\
            #EXTINF:-1 tvg-id=\"a\" tvg-name=\"A\" tvg-logo=\"\" group-title=\"G\",A\n\
            #EXTVLCOPT:http-user-agent=Foo\n\
            #KODIPROP:inputstream=adaptive\n\
            http://s/a\n\
            #EXTINF:-1 tvg-id=\"b\" tvg-name=\"B\" tvg-logo=\"\" group-title=\"G\",B\n\
            http://s/b\n";
        let playlist = renumber(content, &RenumberOptions::default());

        assert_eq!(playlist.len(), 2);
        assert_eq!(playlist.entries[0].url, "http://s/a");
        assert_eq!(playlist.entries[1].url, "http://s/b");
        assert_eq!(numbers(&playlist), ["100", "101"]);
        assert!(!playlist.render().contains("EXTVLCOPT"));
    }

    #[test]
    fn option_tags_without_url_drop_the_entry() {
        let content = "#EXTM3U\n\
            #EXTINF:-1 tvg-id=\"a\" tvg-name=\"A\" tvg-logo=\"\" group-title=\"G\",A\n\
            #EXTVLCOPT:http-user-agent=Foo\n\
            #EXTINF:-1 tvg-id=\"b\" tvg-name=\"B\" tvg-logo=\"\" group-title=\"G\",B\n\
            http://s/b\n";
        let playlist = renumber(content, &RenumberOptions::default());

        assert_eq!(playlist.len(), 1);
        assert_eq!(playlist.entries[0].info.title, "B");
    }

    #[test]
    fn numbering_continues_past_u32_max() {
        let options = RenumberOptions {
            start: u32::MAX,
            ..Default::default()
        };
        let playlist = renumber(SOURCE, &options);
        assert_eq!(numbers(&playlist), ["4294967295", "4294967296", "4294967297"]);
    }

    #[test]
    fn first_line_is_always_skipped() {
        let content = "#EXTINF:-1 tvg-id=\"a\" tvg-name=\"A\" tvg-logo=\"\" group-title=\"G\",A\nhttp://s/a\n";
        assert!(renumber(content, &RenumberOptions::default()).is_empty());
    }

    #[test]
    fn handles_crlf_line_endings() {
        let content = SOURCE.replace('\n', "\r\n");
        let playlist = renumber(&content, &RenumberOptions::default());
        assert_eq!(playlist.len(), 3);
        assert_eq!(playlist.entries[0].url, "http://s/a.m3u8");
    }
}
