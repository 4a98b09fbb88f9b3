use serde::{Serialize, Serializer};
use thiserror::Error;

/// Errors surfaced by the backend. Commands return these directly; the frontend
/// receives the display string.
#[derive(Debug, Error)]
pub enum Error {
    #[error("URL is empty")]
    EmptyUrl,

    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),

    #[error("No entries selected")]
    NothingSelected,

    #[error("Download folder does not exist: {0}")]
    InvalidFolder(String),

    #[error("A download is already running")]
    Busy,

    #[error("yt-dlp was not found on this system")]
    ExtractorMissing,

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Extractor(String),

    #[error("Failed to parse extractor output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Thumbnail error: {0}")]
    Thumbnail(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Serialize for Error {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_display_string() {
        let err = Error::Extractor("ERROR: Unsupported URL: https://example.com".into());
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, "\"ERROR: Unsupported URL: https://example.com\"");
    }

    #[test]
    fn test_spawn_message_names_program() {
        let err = Error::Spawn {
            program: "yt-dlp".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.to_string(), "Failed to run yt-dlp: not found");
    }
}
