//! Normalises yt-dlp progress output into a percentage and a status line.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::i18n;

static ANSI_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[([^\]]+)\]").unwrap());

const MIB: f64 = 1024.0 * 1024.0;

/// Marks the lines produced by [`progress_template`].
pub const PROGRESS_PREFIX: &str = "[mdl-progress]";

/// Post-processors whose output means the transfer is over and conversion started.
const POSTPROCESS_TAGS: &[&str] = &[
    "Merger",
    "ExtractAudio",
    "VideoConvertor",
    "VideoRemuxer",
    "FixupM3u8",
    "FixupM4a",
];

/// Value for `--progress-template`: one pipe-separated record per progress callback.
pub fn progress_template() -> String {
    format!(
        "download:{}%(progress.status)s|%(progress._percent_str)s|%(progress.downloaded_bytes)s|%(progress.total_bytes)s|%(progress.total_bytes_estimate)s|%(progress.speed)s|%(progress.eta)s",
        PROGRESS_PREFIX
    )
}

pub fn strip_ansi(s: &str) -> String {
    ANSI_RE.replace_all(s, "").into_owned()
}

/// Parses strings like `" 42.7%"`, clamped to 0..=100. Garbage yields 0.
pub fn safe_percent(p: &str) -> u8 {
    parse_percent(p).unwrap_or(0)
}

fn parse_percent(p: &str) -> Option<u8> {
    let s = strip_ansi(p.trim());
    let s = s.replace('%', "");
    let v = s.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some(v.trunc().clamp(0.0, 100.0) as u8)
}

pub fn pct_from_bytes(done: u64, total: Option<u64>) -> Option<u8> {
    let total = total.filter(|t| *t > 0)?;
    let v = (done as f64 / total as f64 * 100.0).trunc();
    Some(v.clamp(0.0, 100.0) as u8)
}

pub fn human_mb(n: Option<u64>) -> String {
    match n {
        None | Some(0) => "0 MB".to_string(),
        Some(n) => format!("{:.1} MB", n as f64 / MIB),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadProgress {
    /// `None` when the size is unknown and the bar should be indeterminate.
    pub percent: Option<u8>,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressSample {
    pub status: Option<String>,
    pub percent_str: Option<String>,
    pub downloaded_bytes: Option<u64>,
    pub total_bytes: Option<u64>,
    pub total_bytes_estimate: Option<u64>,
    pub speed: Option<f64>,
    pub eta: Option<u64>,
}

fn field(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty() && *s != "NA" && *s != "None")
}

fn bytes_field(raw: Option<&str>) -> Option<u64> {
    field(raw)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v as u64)
}

impl ProgressSample {
    /// Parses a line printed through [`progress_template`].
    pub fn parse(line: &str) -> Option<Self> {
        let body = line.trim().strip_prefix(PROGRESS_PREFIX)?;
        let mut parts = body.split('|');

        Some(Self {
            status: field(parts.next()).map(String::from),
            percent_str: field(parts.next()).map(String::from),
            downloaded_bytes: bytes_field(parts.next()),
            total_bytes: bytes_field(parts.next()),
            total_bytes_estimate: bytes_field(parts.next()),
            speed: field(parts.next()).and_then(|s| s.parse::<f64>().ok()),
            eta: field(parts.next()).and_then(|s| s.parse::<u64>().ok()),
        })
    }

    pub fn to_progress(&self, lang: &str) -> Option<DownloadProgress> {
        match self.status.as_deref() {
            Some("downloading") => Some(self.downloading_progress()),
            Some("finished") => Some(converting(lang)),
            _ => None,
        }
    }

    fn downloading_progress(&self) -> DownloadProgress {
        let done = self.downloaded_bytes.unwrap_or(0);
        let total = self
            .total_bytes
            .filter(|t| *t > 0)
            .or(self.total_bytes_estimate);

        let percent = self
            .percent_str
            .as_deref()
            .and_then(parse_percent)
            .or_else(|| pct_from_bytes(done, total));

        let Some(percent) = percent else {
            return DownloadProgress {
                percent: None,
                text: format!("{} / ? | ETA: ?", human_mb(Some(done))),
            };
        };

        let speed = self
            .speed
            .filter(|s| *s > 0.0)
            .map(|s| format!("{:.2} MB/s", s / MIB))
            .unwrap_or_else(|| "?".to_string());
        let eta = self
            .eta
            .map(|e| format!("{}s", e))
            .unwrap_or_else(|| "?".to_string());

        DownloadProgress {
            percent: Some(percent),
            text: format!(
                "{} / {} | {} | ETA: {}",
                human_mb(Some(done)),
                human_mb(total),
                speed,
                eta
            ),
        }
    }
}

pub fn converting(lang: &str) -> DownloadProgress {
    DownloadProgress {
        percent: Some(100),
        text: i18n::tr(lang, "converting", &[]),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutputLine {
    Progress(ProgressSample),
    PostProcessing,
    Error(String),
    Other,
}

/// Sorts a line of yt-dlp output into the kinds the download worker reacts to.
pub fn classify_line(line: &str) -> OutputLine {
    let line = strip_ansi(line.trim());

    if let Some(sample) = ProgressSample::parse(&line) {
        return OutputLine::Progress(sample);
    }

    if let Some(msg) = line.strip_prefix("ERROR:") {
        return OutputLine::Error(msg.trim().to_string());
    }

    let is_postprocess = TAG_RE
        .captures(&line)
        .and_then(|c| c.get(1))
        .map(|tag| POSTPROCESS_TAGS.contains(&tag.as_str()))
        .unwrap_or(false);

    if is_postprocess {
        OutputLine::PostProcessing
    } else {
        OutputLine::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_percent() {
        assert_eq!(safe_percent(" 42.7%"), 42);
        assert_eq!(safe_percent("\x1b[0;94m 99.9%\x1b[0m"), 99);
        assert_eq!(safe_percent("150%"), 100);
        assert_eq!(safe_percent("-3"), 0);
        assert_eq!(safe_percent("garbage"), 0);
        assert_eq!(safe_percent(""), 0);
    }

    #[test]
    fn test_pct_from_bytes() {
        assert_eq!(pct_from_bytes(50, Some(200)), Some(25));
        assert_eq!(pct_from_bytes(500, Some(200)), Some(100));
        assert_eq!(pct_from_bytes(50, Some(0)), None);
        assert_eq!(pct_from_bytes(50, None), None);
    }

    #[test]
    fn test_human_mb() {
        assert_eq!(human_mb(None), "0 MB");
        assert_eq!(human_mb(Some(0)), "0 MB");
        assert_eq!(human_mb(Some(1_572_864)), "1.5 MB");
    }

    #[test]
    fn test_parse_sample_with_missing_fields() {
        let line = "[mdl-progress]downloading|  12.0%|1048576|NA|4194304.5|NA|NA";
        let sample = ProgressSample::parse(line).unwrap();
        assert_eq!(sample.status.as_deref(), Some("downloading"));
        assert_eq!(sample.percent_str.as_deref(), Some("12.0%"));
        assert_eq!(sample.downloaded_bytes, Some(1_048_576));
        assert_eq!(sample.total_bytes, None);
        assert_eq!(sample.total_bytes_estimate, Some(4_194_304));
        assert_eq!(sample.speed, None);
        assert_eq!(sample.eta, None);

        assert!(ProgressSample::parse("[download] 12.0% of 4MiB").is_none());
    }

    #[test]
    fn test_downloading_text() {
        let sample = ProgressSample {
            status: Some("downloading".into()),
            percent_str: Some(" 50.0%".into()),
            downloaded_bytes: Some(5 * 1024 * 1024),
            total_bytes: Some(10 * 1024 * 1024),
            speed: Some(2.5 * MIB),
            eta: Some(2),
            ..Default::default()
        };
        let progress = sample.to_progress("en").unwrap();
        assert_eq!(progress.percent, Some(50));
        assert_eq!(progress.text, "5.0 MB / 10.0 MB | 2.50 MB/s | ETA: 2s");
    }

    #[test]
    fn test_percent_falls_back_to_bytes() {
        let sample = ProgressSample {
            status: Some("downloading".into()),
            downloaded_bytes: Some(1024 * 1024),
            total_bytes_estimate: Some(4 * 1024 * 1024),
            ..Default::default()
        };
        let progress = sample.to_progress("en").unwrap();
        assert_eq!(progress.percent, Some(25));
        assert_eq!(progress.text, "1.0 MB / 4.0 MB | ? | ETA: ?");
    }

    #[test]
    fn test_unknown_size_is_indeterminate() {
        let sample = ProgressSample {
            status: Some("downloading".into()),
            percent_str: Some("Unknown".into()),
            downloaded_bytes: Some(3 * 1024 * 1024),
            ..Default::default()
        };
        let progress = sample.to_progress("en").unwrap();
        assert_eq!(progress.percent, None);
        assert_eq!(progress.text, "3.0 MB / ? | ETA: ?");
    }

    #[test]
    fn test_finished_reports_converting() {
        let sample = ProgressSample {
            status: Some("finished".into()),
            ..Default::default()
        };
        assert_eq!(
            sample.to_progress("de").unwrap(),
            DownloadProgress {
                percent: Some(100),
                text: i18n::tr("de", "converting", &[]),
            }
        );

        let other = ProgressSample {
            status: Some("error".into()),
            ..Default::default()
        };
        assert!(other.to_progress("en").is_none());
    }

    #[test]
    fn test_classify_line() {
        assert!(matches!(
            classify_line("[mdl-progress]finished|100%|10|10|NA|NA|NA"),
            OutputLine::Progress(_)
        ));
        assert_eq!(
            classify_line("[Merger] Merging formats into \"a.mp4\""),
            OutputLine::PostProcessing
        );
        assert_eq!(
            classify_line("[ExtractAudio] Destination: a.mp3"),
            OutputLine::PostProcessing
        );
        assert_eq!(
            classify_line("ERROR: [generic] Unsupported URL: https://example.com"),
            OutputLine::Error("[generic] Unsupported URL: https://example.com".into())
        );
        assert_eq!(classify_line("[youtube] abc: Downloading webpage"), OutputLine::Other);
    }

    #[test]
    fn test_template_uses_prefix() {
        let template = progress_template();
        assert!(template.starts_with("download:[mdl-progress]"));
        assert_eq!(template.matches('|').count(), 6);
    }
}
