use serde::Serialize;
use std::path::{Path, PathBuf};
use which::which;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    Pacman,
    Apt,
    Dnf,
    Zypper,
    Apk,
    Unknown,
}

impl PackageManager {
    const PROBE_ORDER: [PackageManager; 5] = [
        PackageManager::Pacman,
        PackageManager::Apt,
        PackageManager::Dnf,
        PackageManager::Zypper,
        PackageManager::Apk,
    ];

    pub fn binary(self) -> &'static str {
        match self {
            PackageManager::Pacman => "pacman",
            PackageManager::Apt => "apt",
            PackageManager::Dnf => "dnf",
            PackageManager::Zypper => "zypper",
            PackageManager::Apk => "apk",
            PackageManager::Unknown => "",
        }
    }
}

/// External programs the app shells out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Ffmpeg,
    YtDlp,
}

impl Tool {
    pub fn binary(self) -> &'static str {
        match self {
            Tool::Ffmpeg => "ffmpeg",
            Tool::YtDlp => "yt-dlp",
        }
    }

    /// Distribution package name; identical to the binary for every supported manager.
    pub fn package(self) -> &'static str {
        self.binary()
    }
}

pub fn detect_package_manager() -> PackageManager {
    PackageManager::PROBE_ORDER
        .into_iter()
        .find(|pm| which(pm.binary()).is_ok())
        .unwrap_or(PackageManager::Unknown)
}

fn bundled_binary(name: &str) -> Option<PathBuf> {
    let exe_path = std::env::current_exe().ok()?;
    let file_name = if cfg!(windows) {
        format!("{}.exe", name)
    } else {
        name.to_string()
    };
    let path = exe_path.parent()?.join("bin").join(file_name);
    path.exists().then_some(path)
}

/// Locates `tool`: an explicit override wins, then `bin/` next to the executable,
/// then `PATH`.
pub fn resolve_tool(tool: Tool, override_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = override_path.filter(|p| p.exists()) {
        return Some(path.to_path_buf());
    }
    bundled_binary(tool.binary()).or_else(|| which(tool.binary()).ok())
}

pub fn install_hint(pm: PackageManager, tools: &[Tool]) -> String {
    let packages = tools
        .iter()
        .map(|t| t.package())
        .collect::<Vec<_>>()
        .join(" ");

    match pm {
        PackageManager::Pacman => format!("sudo pacman -S --needed {}", packages),
        PackageManager::Apt => format!("sudo apt update && sudo apt install -y {}", packages),
        PackageManager::Dnf => format!("sudo dnf install -y {}", packages),
        PackageManager::Zypper => format!("sudo zypper install -y {}", packages),
        PackageManager::Apk => format!("sudo apk add {}", packages),
        PackageManager::Unknown => format!("Install {} (package manager unknown).", packages),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementsReport {
    pub ffmpeg: Option<String>,
    pub ytdlp: Option<String>,
    pub package_manager: PackageManager,
    pub missing: Vec<Tool>,
    pub install_command: Option<String>,
}

impl RequirementsReport {
    pub fn new(ffmpeg: Option<PathBuf>, ytdlp: Option<PathBuf>, pm: PackageManager) -> Self {
        let mut missing = Vec::new();
        if ffmpeg.is_none() {
            missing.push(Tool::Ffmpeg);
        }
        if ytdlp.is_none() {
            missing.push(Tool::YtDlp);
        }
        let install_command = (!missing.is_empty()).then(|| install_hint(pm, &missing));

        Self {
            ffmpeg: ffmpeg.map(|p| p.to_string_lossy().to_string()),
            ytdlp: ytdlp.map(|p| p.to_string_lossy().to_string()),
            package_manager: pm,
            missing,
            install_command,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

pub fn check_requirements(
    ffmpeg_override: Option<&Path>,
    ytdlp_override: Option<&Path>,
) -> RequirementsReport {
    RequirementsReport::new(
        resolve_tool(Tool::Ffmpeg, ffmpeg_override),
        resolve_tool(Tool::YtDlp, ytdlp_override),
        detect_package_manager(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ffmpeg_install_hints() {
        let ffmpeg = [Tool::Ffmpeg];
        assert_eq!(
            install_hint(PackageManager::Pacman, &ffmpeg),
            "sudo pacman -S --needed ffmpeg"
        );
        assert_eq!(
            install_hint(PackageManager::Apt, &ffmpeg),
            "sudo apt update && sudo apt install -y ffmpeg"
        );
        assert_eq!(install_hint(PackageManager::Dnf, &ffmpeg), "sudo dnf install -y ffmpeg");
        assert_eq!(
            install_hint(PackageManager::Zypper, &ffmpeg),
            "sudo zypper install -y ffmpeg"
        );
        assert_eq!(install_hint(PackageManager::Apk, &ffmpeg), "sudo apk add ffmpeg");
    }

    #[test]
    fn test_install_hint_lists_every_missing_tool() {
        assert_eq!(
            install_hint(PackageManager::Apk, &[Tool::Ffmpeg, Tool::YtDlp]),
            "sudo apk add ffmpeg yt-dlp"
        );
        assert!(install_hint(PackageManager::Unknown, &[Tool::YtDlp]).contains("yt-dlp"));
    }

    #[test]
    fn test_report_only_hints_missing_tools() {
        let report = RequirementsReport::new(
            Some(PathBuf::from("/usr/bin/ffmpeg")),
            None,
            PackageManager::Dnf,
        );
        assert_eq!(report.missing, vec![Tool::YtDlp]);
        assert_eq!(
            report.install_command.as_deref(),
            Some("sudo dnf install -y yt-dlp")
        );
        assert!(!report.is_complete());

        let complete = RequirementsReport::new(
            Some(PathBuf::from("/usr/bin/ffmpeg")),
            Some(PathBuf::from("/usr/bin/yt-dlp")),
            PackageManager::Unknown,
        );
        assert!(complete.is_complete());
        assert!(complete.install_command.is_none());
    }

    #[test]
    fn test_override_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("my-ffmpeg");
        std::fs::write(&fake, b"").unwrap();
        assert_eq!(resolve_tool(Tool::Ffmpeg, Some(&fake)), Some(fake.clone()));

        let missing = dir.path().join("nope");
        assert_ne!(resolve_tool(Tool::Ffmpeg, Some(&missing)), Some(missing));
    }
}
