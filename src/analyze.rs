use log::{error, info};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::process::Stdio;

use crate::error::{Error, Result};
use crate::new_command;

static BARE_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{8,}$").unwrap());

pub const TITLE_MAX_CHARS: usize = 70;

/// One resolved media item as shown in the playlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: Option<String>,
    pub title: Option<String>,
    pub duration: Option<f64>,
    pub duration_string: Option<String>,
    pub thumbnail: Option<String>,
    pub webpage_url: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub label: String,
}

/// String field of an info dict; numbers are accepted and rendered as text.
fn text_field(info: &Value, key: &str) -> Option<String> {
    match info.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Numeric field of an info dict; numeric strings are accepted too.
fn number_field(info: &Value, key: &str) -> Option<f64> {
    match info.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Flat playlist items carry no `thumbnail`, only a `thumbnails` list (best last).
fn thumbnail_field(info: &Value) -> Option<String> {
    text_field(info, "thumbnail").filter(|t| !t.is_empty()).or_else(|| {
        info.get("thumbnails")?
            .as_array()?
            .iter()
            .rev()
            .find_map(|t| t.get("url").and_then(|u| u.as_str()))
            .map(String::from)
    })
}

impl Entry {
    /// Builds an entry from one yt-dlp info dict, reading every field loosely.
    pub fn from_info(info: &Value) -> Self {
        let url = text_field(info, "url");
        let webpage_url = text_field(info, "webpage_url")
            .filter(|u| !u.is_empty())
            .or_else(|| url.as_ref().filter(|u| u.starts_with("http")).cloned());

        let mut entry = Entry {
            id: text_field(info, "id"),
            title: text_field(info, "title"),
            duration: number_field(info, "duration"),
            duration_string: text_field(info, "duration_string"),
            thumbnail: thumbnail_field(info),
            webpage_url,
            url,
            label: String::new(),
        };
        entry.label = entry.display_label();
        entry
    }

    pub fn duration_label(&self) -> String {
        if let Some(s) = self.duration_string.as_deref().filter(|s| !s.is_empty()) {
            return s.to_string();
        }
        match self.duration {
            Some(d) if d > 0.0 => format!("{}s", d.trunc() as i64),
            _ => "?".to_string(),
        }
    }

    pub fn display_label(&self) -> String {
        let title = self
            .title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or("Unknown");
        format!("{} [{}]", elide(title, TITLE_MAX_CHARS), self.duration_label())
    }
}

/// Shortens `text` to `max_chars` characters, ending with an ellipsis when cut.
pub fn elide(text: &str, max_chars: usize) -> String {
    let s = text.trim();
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let head: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", head.trim_end())
}

/// Flattens a yt-dlp info dict into list entries: a playlist's non-null items, or the
/// single video itself.
pub fn entries_from_info(info: Value) -> Vec<Entry> {
    let items = match info {
        Value::Object(mut map) => match map.remove("entries") {
            Some(Value::Array(entries)) if !entries.is_empty() => entries,
            _ => vec![Value::Object(map)],
        },
        other => vec![other],
    };

    items
        .into_iter()
        .filter(Value::is_object)
        .map(|v| Entry::from_info(&v))
        .collect()
}

/// URL handed to the downloader for a checked entry.
pub fn resolve_download_url(entry: &Entry, base_url: &str) -> String {
    if let Some(u) = entry.webpage_url.as_deref().filter(|u| u.starts_with("http")) {
        return u.to_string();
    }
    if let Some(u) = entry.url.as_deref() {
        if u.starts_with("http") {
            return u.to_string();
        }
        if BARE_ID_RE.is_match(u) {
            return format!("https://www.youtube.com/watch?v={}", u);
        }
    }
    base_url.trim().to_string()
}

pub fn validate_url(url: &str) -> bool {
    if let Ok(url_obj) = url::Url::parse(url) {
        url_obj.scheme() == "http" || url_obj.scheme() == "https"
    } else {
        false
    }
}

/// Last `ERROR:` line of the extractor's stderr, or all of it.
pub fn extractor_error(stderr: &str) -> String {
    stderr
        .lines()
        .rev()
        .find_map(|l| l.trim().strip_prefix("ERROR:").map(|m| m.trim().to_string()))
        .unwrap_or_else(|| stderr.trim().to_string())
}

/// Resolves `url` with yt-dlp in metadata-only mode. Playlists are listed flat unless
/// `disable_flat_playlist` is set.
pub async fn analyze(ytdlp: &Path, url: &str, disable_flat_playlist: bool) -> Result<Vec<Entry>> {
    let url = url.trim();
    if url.is_empty() {
        return Err(Error::EmptyUrl);
    }
    if !validate_url(url) {
        return Err(Error::InvalidUrl(url.to_string()));
    }

    let mut args = vec![
        "-J".to_string(),
        "--no-warnings".to_string(),
        "--no-color".to_string(),
    ];
    if !disable_flat_playlist {
        args.push("--flat-playlist".to_string());
    }
    args.push(url.to_string());

    info!("Running yt-dlp with args: {:?}", args);

    let output = new_command(&ytdlp.to_string_lossy())
        .args(&args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|source| Error::Spawn {
            program: ytdlp.to_string_lossy().to_string(),
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = extractor_error(&stderr);
        error!("yt-dlp metadata extraction failed: {}", message);
        return Err(Error::Extractor(if message.is_empty() {
            format!("yt-dlp exited with code {:?}", output.status.code())
        } else {
            message
        }));
    }

    let info: Value = serde_json::from_slice(&output.stdout)?;
    let entries = entries_from_info(info);
    info!("Resolved {} entries for {}", entries.len(), url);
    Ok(entries)
}
