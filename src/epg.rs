//! Placeholder XMLTV guide built from a playlist's channels.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use quick_xml::escape::escape;
use regex::Regex;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::m3u::ExtInf;

pub const GUIDE_DAYS: i64 = 7;
pub const SLOT_HOURS: i64 = 2;

const XMLTV_TIME_FORMAT: &str = "%Y%m%d%H%M%S +0000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpgChannel {
    pub id: String,
    pub name: String,
    pub logo: String,
}

/// Collects every `#EXTINF` line with a display name. Channels without a
/// `tvg-id` get one made of the name's ASCII alphanumerics.
pub fn parse_channels(content: &str) -> Result<Vec<EpgChannel>> {
    let non_alnum = Regex::new(r"[^a-zA-Z0-9]")?;
    let mut channels = Vec::new();

    for line in content.lines() {
        let Some(info) = ExtInf::parse(line.trim()) else {
            continue;
        };

        let name = info.title.trim();
        if name.is_empty() {
            continue;
        }

        let id = match info.attributes.get("tvg-id") {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => non_alnum.replace_all(name, "").into_owned(),
        };

        channels.push(EpgChannel {
            id,
            name: name.to_string(),
            logo: info.attributes.get("tvg-logo").unwrap_or_default().to_string(),
        });
    }

    Ok(channels)
}

/// Renders the guide with `GUIDE_DAYS` days of `SLOT_HOURS`-hour slots per
/// channel, starting at midnight UTC of the day of `reference`.
pub fn generate_xmltv(channels: &[EpgChannel], reference: DateTime<Utc>) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<!DOCTYPE tv SYSTEM \"xmltv.dtd\">\n");
    xml.push_str(&format!(
        "<tv generator-info-name=\"{}\">\n\n",
        env!("CARGO_PKG_NAME")
    ));

    for channel in channels {
        xml.push_str(&format!("  <channel id=\"{}\">\n", escape(&channel.id)));
        xml.push_str(&format!(
            "    <display-name>{}</display-name>\n",
            escape(&channel.name)
        ));
        if !channel.logo.is_empty() {
            xml.push_str(&format!("    <icon src=\"{}\" />\n", escape(&channel.logo)));
        }
        xml.push_str("  </channel>\n");
    }

    xml.push('\n');

    let midnight = reference.date_naive().and_time(NaiveTime::MIN).and_utc();
    for channel in channels {
        let id = escape(&channel.id);
        let name = escape(&channel.name);
        for day in 0..GUIDE_DAYS {
            for hour in (0..24).step_by(SLOT_HOURS as usize) {
                let start = midnight + Duration::days(day) + Duration::hours(hour);
                let stop = start + Duration::hours(SLOT_HOURS);

                xml.push_str(&format!(
                    "  <programme start=\"{}\" stop=\"{}\" channel=\"{}\">\n",
                    start.format(XMLTV_TIME_FORMAT),
                    stop.format(XMLTV_TIME_FORMAT),
                    id
                ));
                xml.push_str(&format!("    <title>{name} Programming</title>\n"));
                xml.push_str(&format!("    <desc>Programming on {name}</desc>\n"));
                xml.push_str("  </programme>\n");
            }
        }
    }

    xml.push_str("</tv>\n");
    xml
}

/// Writes a guide for the playlist at `input` to `output`, returning the
/// channel count.
pub fn generate_file(input: &Path, output: &Path, reference: DateTime<Utc>) -> Result<usize> {
    let content = fs::read_to_string(input)?;
    let channels = parse_channels(&content)?;
    fs::write(output, generate_xmltv(&channels, reference))?;
    Ok(channels.len())
}
