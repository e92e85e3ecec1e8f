use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::Result;

pub const EXTM3U: &str = "#EXTM3U";
pub const EXTINF: &str = "#EXTINF:";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    // case-insensitive, first occurrence wins
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtInf {
    pub duration: String,
    pub attributes: Attributes,
    pub title: String,
}

impl ExtInf {
    pub fn new(attributes: Attributes, title: impl Into<String>) -> Self {
        Self {
            duration: "-1".to_string(),
            attributes,
            title: title.into(),
        }
    }

    /// Tokenizes a metadata line into its duration, attributes and title.
    ///
    /// Attributes are whitespace separated `key="value"` or `key=value`
    /// tokens; a quoted value may contain spaces and commas. The title is
    /// everything after the first comma that is not inside a quoted value.
    /// Returns `None` when the line is not an `#EXTINF:` line or has no
    /// title separator.
    pub fn parse(line: &str) -> Option<Self> {
        let info = line.strip_prefix(EXTINF)?;
        let mut chars = info.char_indices().peekable();

        let mut duration = String::new();
        while let Some(&(_, c)) = chars.peek() {
            if c.is_whitespace() || c == ',' {
                break;
            }
            duration.push(c);
            chars.next();
        }

        let mut attributes = Attributes::new();
        loop {
            while chars.next_if(|&(_, c)| c.is_whitespace()).is_some() {}

            match chars.peek() {
                None => return None,
                Some(&(pos, ',')) => {
                    return Some(Self {
                        duration,
                        attributes,
                        title: info[pos + 1..].to_string(),
                    });
                }
                Some(_) => {}
            }

            let mut key = String::new();
            while let Some(&(_, c)) = chars.peek() {
                if c == '=' || c == ',' || c.is_whitespace() {
                    break;
                }
                key.push(c);
                chars.next();
            }

            // bare token without a value
            if chars.next_if(|&(_, c)| c == '=').is_none() {
                continue;
            }

            let mut value = String::new();
            if chars.next_if(|&(_, c)| c == '"').is_some() {
                for (_, c) in chars.by_ref() {
                    if c == '"' {
                        break;
                    }
                    value.push(c);
                }
            } else {
                while let Some(&(_, c)) = chars.peek() {
                    if c == ',' || c.is_whitespace() {
                        break;
                    }
                    value.push(c);
                    chars.next();
                }
            }

            if !key.is_empty() {
                attributes.push(key, value);
            }
        }
    }
}

impl fmt::Display for ExtInf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{EXTINF}{}", self.duration)?;
        for (key, value) in self.attributes.iter() {
            write!(f, " {key}=\"{value}\"")?;
        }
        write!(f, ",{}", self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    pub info: ExtInf,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistHeader {
    pub epg_url: Option<String>,
}

impl fmt::Display for PlaylistHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.epg_url {
            Some(url) => write!(f, "{EXTM3U} url-tvg=\"{url}\""),
            None => f.write_str(EXTM3U),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Playlist {
    pub header: PlaylistHeader,
    pub entries: Vec<PlaylistEntry>,
}

impl Playlist {
    pub fn new(header: PlaylistHeader) -> Self {
        Self {
            header,
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: PlaylistEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.entries.len() * 2 + 1);
        lines.push(self.header.to_string());
        for entry in &self.entries {
            lines.push(entry.info.to_string());
            lines.push(entry.url.clone());
        }
        lines
    }

    pub fn render(&self) -> String {
        let mut content = self.lines().join("\n");
        content.push('\n');
        content
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, self.render())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_attributes_in_order() {
        let info = ExtInf::parse(
            r#"#EXTINF:-1 tvg-id="abc" tvg-chno="7" tvg-name="News" tvg-logo="" group-title="Live TV",News"#,
        )
        .unwrap();

        assert_eq!(info.duration, "-1");
        assert_eq!(info.attributes.len(), 5);
        assert_eq!(info.attributes.get("tvg-id"), Some("abc"));
        assert_eq!(info.attributes.get("tvg-logo"), Some(""));
        assert_eq!(info.attributes.get("GROUP-TITLE"), Some("Live TV"));
        assert_eq!(info.title, "News");
    }

    #[test]
    fn quoted_values_keep_commas_and_spaces() {
        let info = ExtInf::parse(r#"#EXTINF:-1 tvg-name="News, Weather & More",News"#).unwrap();
        assert_eq!(info.attributes.get("tvg-name"), Some("News, Weather & More"));
        assert_eq!(info.title, "News");
    }

    #[test]
    fn unquoted_values_and_bare_tokens() {
        let info = ExtInf::parse(r#"#EXTINF:0 tvg-id=plain radio tvg-logo="x.png", Spaced Title"#).unwrap();
        assert_eq!(info.duration, "0");
        assert_eq!(info.attributes.get("tvg-id"), Some("plain"));
        assert_eq!(info.attributes.get("radio"), None);
        assert_eq!(info.title, " Spaced Title");
    }

    #[test]
    fn first_duplicate_wins() {
        let info = ExtInf::parse(r#"#EXTINF:-1 tvg-id="one" tvg-id="two",X"#).unwrap();
        assert_eq!(info.attributes.get("tvg-id"), Some("one"));
    }

    #[test]
    fn rejects_lines_without_title_separator() {
        assert!(ExtInf::parse(r#"#EXTINF:-1 tvg-id="abc""#).is_none());
        assert!(ExtInf::parse("#EXTVLCOPT:foo=bar").is_none());
    }

    #[test]
    fn renders_header_and_entries() {
        let mut attributes = Attributes::new();
        attributes.push("tvg-id", "abc");
        attributes.push("tvg-logo", "");

        let mut playlist = Playlist::new(PlaylistHeader {
            epg_url: Some("http://epg.example/guide.xml".to_string()),
        });
        playlist.push(PlaylistEntry {
            info: ExtInf::new(attributes, "Channel"),
            url: "http://stream.example/abc".to_string(),
        });

        assert_eq!(
            playlist.render(),
            "#EXTM3U url-tvg=\"http://epg.example/guide.xml\"\n\
             #EXTINF:-1 tvg-id=\"abc\" tvg-logo=\"\",Channel\n\
             http://stream.example/abc\n"
        );
    }

    #[test]
    fn empty_playlist_is_just_the_header() {
        assert_eq!(Playlist::default().render(), "#EXTM3U\n");
    }
}
