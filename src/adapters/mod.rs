// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

//! Content sections. Each one plugs into [`crate::page::PageEngine`].

pub mod home;
pub mod search;
pub mod videos;

pub use home::HomeAdapter;
pub use search::SearchAdapter;
pub use videos::VideosAdapter;

use anyhow::Result;
use serde::{Deserialize, Deserializer};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::host::{Host, Playback};
use crate::nav::{NavParams, get_url};
use crate::page::MenuItem;
use crate::site::Site;

fn deserialize_number_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value: Value = Deserialize::deserialize(deserializer)?;

    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        _ => Err(D::Error::custom("Expected string or number")),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoRef {
    #[serde(default, deserialize_with = "deserialize_number_as_string")]
    pub id: String,
}

/// One element of the video feed or of search results
#[derive(Debug, Clone, Deserialize)]
pub struct VideoElement {
    #[serde(deserialize_with = "deserialize_number_as_string")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub image_squared: String,
    #[serde(default)]
    pub big_card_image: String,
    #[serde(default)]
    pub video: VideoRef,
}

impl VideoElement {
    /// `None` when the element has no usable id.
    pub fn from_value(element: &Value) -> Option<Self> {
        let parsed: Self = match serde_json::from_value(element.clone()) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!("Element does not match the video schema: {}", e);
                return None;
            }
        };
        (!parsed.id.is_empty()).then_some(parsed)
    }
}

/// Playable item for a feed element, dispatched back to `context`.
pub fn video_item(site: &Site, context: &str, element: &VideoElement) -> MenuItem {
    let title = clean_html(&element.title);
    let url = get_url(
        &site.base_url,
        &[
            ("action", "play"),
            ("context", context),
            ("spath", &element.video.id),
            ("id", &element.id),
            ("url", &site.base_url),
        ],
    );

    MenuItem::new(&element.id, &title, url)
        .playable()
        .info("mediatype", "movie")
        .info("plot", format!("{}\n\n{}", element.domain, title))
        .art("thumb", &element.image)
        .art("icon", &element.image_squared)
        .art("fanart", &element.big_card_image)
        .art("poster", &element.big_card_image)
}

/// Resolves `spath` through the host and records it in the play history.
pub fn play(site: &Site, params: &NavParams, host: &mut dyn Host) -> Result<()> {
    let Some(spath) = params.spath() else {
        anyhow::bail!("Nothing to play: the request has no spath");
    };

    if let Some(id) = params.id() {
        let record = json!({
            "id": id,
            "spath": spath,
            "context": params.context(),
            "played_at": chrono::Utc::now().to_rfc3339(),
        });
        if let Err(e) = site.history().save_brand(&record) {
            warn!("Failed to save play history: {:#}", e);
        }
    }

    host.resolve(Playback::new(spath, site.play_headers()))
}

/// Drops markup tags and decodes the common HTML entities.
pub fn clean_html(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    let mut in_tag = false;
    for c in raw.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    let decoded = text
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_html_strips_tags_and_entities() {
        assert_eq!(
            clean_html("<b>Cats</b> &amp; <i>dogs</i>&nbsp;&quot;live&quot;"),
            "Cats & dogs \"live\""
        );
        assert_eq!(clean_html("  plain   text "), "plain text");
        assert_eq!(clean_html("&lt;not a tag&gt;"), "<not a tag>");
    }

    #[test]
    fn element_schema_defaults_and_numeric_ids() {
        let element = VideoElement::from_value(&json!({"id": 42, "title": "A"})).unwrap();
        assert_eq!(element.id, "42");
        assert_eq!(element.video.id, "");
        assert_eq!(element.image, "");

        assert!(VideoElement::from_value(&json!({"title": "no id"})).is_none());
        assert!(VideoElement::from_value(&json!({"id": ""})).is_none());
        assert!(VideoElement::from_value(&json!({"id": {"nested": true}})).is_none());
    }
}
