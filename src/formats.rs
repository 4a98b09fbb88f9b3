//! Container/quality lookup table and its translation into yt-dlp arguments.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static FIRST_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)").unwrap());

pub const VIDEO_QUALITIES: &[&str] = &["2160p", "1440p", "1080p", "720p", "480p", "360p"];
pub const MP3_QUALITIES: &[&str] = &[
    "320 kbps", "256 kbps", "192 kbps", "160 kbps", "128 kbps", "96 kbps",
];
pub const FLAC_QUALITIES: &[&str] = &["Lossless (FLAC)"];
pub const WAV_QUALITIES: &[&str] = &["PCM (WAV)"];

const VIDEO_HEIGHTS: [&str; 6] = ["2160", "1440", "1080", "720", "480", "360"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Container {
    Mp3,
    Wav,
    Flac,
    #[default]
    Mp4,
    Webm,
}

impl Container {
    pub const ALL: [Container; 5] = [
        Container::Mp3,
        Container::Wav,
        Container::Flac,
        Container::Mp4,
        Container::Webm,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Container::Mp3 => "MP3",
            Container::Wav => "WAV",
            Container::Flac => "FLAC",
            Container::Mp4 => "MP4",
            Container::Webm => "WEBM",
        }
    }

    pub fn is_audio(self) -> bool {
        matches!(self, Container::Mp3 | Container::Wav | Container::Flac)
    }
}

/// Labels for the format combo box, in display order. Each one deserializes back
/// into its [`Container`].
pub fn container_labels() -> Vec<&'static str> {
    Container::ALL.iter().map(|c| c.label()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityOptions {
    /// i18n key for the quality row label.
    pub label_key: &'static str,
    pub options: &'static [&'static str],
    pub default: &'static str,
}

pub fn quality_options(container: Container) -> QualityOptions {
    match container {
        Container::Mp4 | Container::Webm => QualityOptions {
            label_key: "quality_lbl",
            options: VIDEO_QUALITIES,
            default: "1080p",
        },
        Container::Mp3 => QualityOptions {
            label_key: "audio_quality_lbl",
            options: MP3_QUALITIES,
            default: "320 kbps",
        },
        Container::Flac => QualityOptions {
            label_key: "audio_quality_lbl",
            options: FLAC_QUALITIES,
            default: FLAC_QUALITIES[0],
        },
        Container::Wav => QualityOptions {
            label_key: "audio_quality_lbl",
            options: WAV_QUALITIES,
            default: WAV_QUALITIES[0],
        },
    }
}

/// Keeps `previous` when the new container offers it, otherwise its default.
pub fn pick_quality(container: Container, previous: Option<&str>) -> &'static str {
    let opts = quality_options(container);
    previous
        .and_then(|prev| opts.options.iter().find(|o| **o == prev).copied())
        .unwrap_or(opts.default)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioExtract {
    pub codec: &'static str,
    pub quality: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPlan {
    pub format: String,
    pub audio: Option<AudioExtract>,
    pub merge_output_format: Option<&'static str>,
}

impl DownloadPlan {
    pub fn build(container: Container, quality: &str) -> Self {
        let quality = quality.trim();

        if container.is_audio() {
            let audio = match container {
                Container::Mp3 => AudioExtract {
                    codec: "mp3",
                    quality: FIRST_NUMBER
                        .captures(quality)
                        .and_then(|c| c.get(1))
                        .map(|m| m.as_str().to_string())
                        .unwrap_or_else(|| "320".to_string()),
                },
                Container::Wav => AudioExtract {
                    codec: "wav",
                    quality: "0".to_string(),
                },
                _ => AudioExtract {
                    codec: "flac",
                    quality: "0".to_string(),
                },
            };
            return Self {
                format: "bestaudio/best".to_string(),
                audio: Some(audio),
                merge_output_format: None,
            };
        }

        let format = VIDEO_HEIGHTS
            .iter()
            .find(|h| quality.contains(*h))
            .map(|h| format!("bestvideo[height<={}]+bestaudio/best", h))
            .unwrap_or_else(|| "bestvideo+bestaudio/best".to_string());

        let merge_output_format = match container {
            Container::Webm => "webm",
            _ => "mp4",
        };

        Self {
            format,
            audio: None,
            merge_output_format: Some(merge_output_format),
        }
    }

    /// Format selection and post-processing flags for the yt-dlp command line.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["-f".to_string(), self.format.clone()];

        if let Some(audio) = &self.audio {
            args.push("-x".to_string());
            args.push("--audio-format".to_string());
            args.push(audio.codec.to_string());
            args.push("--audio-quality".to_string());
            args.push(audio.quality.clone());
        }

        if let Some(merge) = self.merge_output_format {
            args.push("--merge-output-format".to_string());
            args.push(merge.to_string());
        }

        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_labels_feed_the_format_combo() {
        assert_eq!(container_labels(), ["MP3", "WAV", "FLAC", "MP4", "WEBM"]);
        for (label, container) in container_labels().into_iter().zip(Container::ALL) {
            let parsed: Container = serde_json::from_value(serde_json::json!(label)).unwrap();
            assert_eq!(parsed, container);
        }
        assert_eq!(Container::default(), Container::Mp4);
    }

    #[test]
    fn test_container_serde_uses_labels() {
        assert_eq!(serde_json::to_string(&Container::Flac).unwrap(), "\"FLAC\"");
        let c: Container = serde_json::from_str("\"WEBM\"").unwrap();
        assert_eq!(c, Container::Webm);
    }

    #[test]
    fn test_video_table() {
        let cases = [
            ("2160p", "bestvideo[height<=2160]+bestaudio/best"),
            ("1440p", "bestvideo[height<=1440]+bestaudio/best"),
            ("1080p", "bestvideo[height<=1080]+bestaudio/best"),
            ("720p", "bestvideo[height<=720]+bestaudio/best"),
            ("480p", "bestvideo[height<=480]+bestaudio/best"),
            ("360p", "bestvideo[height<=360]+bestaudio/best"),
            ("whatever", "bestvideo+bestaudio/best"),
        ];
        for (quality, expected) in cases {
            let plan = DownloadPlan::build(Container::Mp4, quality);
            assert_eq!(plan.format, expected, "quality {}", quality);
            assert_eq!(plan.audio, None);
            assert_eq!(plan.merge_output_format, Some("mp4"));
        }

        let webm = DownloadPlan::build(Container::Webm, "720p");
        assert_eq!(webm.merge_output_format, Some("webm"));
    }

    #[test]
    fn test_audio_table() {
        let mp3 = DownloadPlan::build(Container::Mp3, "192 kbps");
        assert_eq!(mp3.format, "bestaudio/best");
        assert_eq!(
            mp3.audio,
            Some(AudioExtract {
                codec: "mp3",
                quality: "192".into()
            })
        );
        assert_eq!(mp3.merge_output_format, None);

        let mp3_default = DownloadPlan::build(Container::Mp3, "best");
        assert_eq!(mp3_default.audio.unwrap().quality, "320");

        let wav = DownloadPlan::build(Container::Wav, "PCM (WAV)");
        assert_eq!(wav.audio.unwrap(), AudioExtract { codec: "wav", quality: "0".into() });

        let flac = DownloadPlan::build(Container::Flac, "Lossless (FLAC)");
        assert_eq!(flac.audio.unwrap(), AudioExtract { codec: "flac", quality: "0".into() });
    }

    #[test]
    fn test_plan_args() {
        let args = DownloadPlan::build(Container::Mp3, "128 kbps").to_args();
        assert_eq!(
            args,
            vec!["-f", "bestaudio/best", "-x", "--audio-format", "mp3", "--audio-quality", "128"]
        );

        let args = DownloadPlan::build(Container::Webm, "480p").to_args();
        assert_eq!(
            args,
            vec![
                "-f",
                "bestvideo[height<=480]+bestaudio/best",
                "--merge-output-format",
                "webm"
            ]
        );
    }

    #[test]
    fn test_quality_options_per_container() {
        assert_eq!(quality_options(Container::Webm).default, "1080p");
        assert_eq!(quality_options(Container::Mp3).label_key, "audio_quality_lbl");
        assert_eq!(quality_options(Container::Mp3).options.len(), 6);
        assert_eq!(quality_options(Container::Flac).options, &["Lossless (FLAC)"]);
        assert_eq!(quality_options(Container::Wav).default, "PCM (WAV)");
    }

    #[test]
    fn test_pick_quality_keeps_previous_when_offered() {
        assert_eq!(pick_quality(Container::Webm, Some("720p")), "720p");
        assert_eq!(pick_quality(Container::Mp3, Some("720p")), "320 kbps");
        assert_eq!(pick_quality(Container::Mp4, None), "1080p");
        assert_eq!(pick_quality(Container::Flac, Some("320 kbps")), "Lossless (FLAC)");
    }
}
