use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tauri::{Emitter, Manager};
use tokio::process::Command;
use tokio::sync::Mutex;

pub mod analyze;
pub mod download;
pub mod error;
pub mod formats;
pub mod host;
pub mod i18n;
pub mod progress;
pub mod settings;
pub mod thumbnail;

use analyze::Entry;
use download::{DownloadControl, DownloadOutcome, DownloadRequest};
use error::{Error, Result};
use formats::Container;
use host::{RequirementsReport, Tool};
use settings::AppSettings;

pub(crate) fn new_command(program: &str) -> Command {
    let mut cmd = Command::new(program);
    #[cfg(target_os = "windows")]
    cmd.creation_flags(0x08000000);
    cmd
}

// ============================================================================
// Data Structures
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityChoice {
    pub label_key: &'static str,
    pub options: &'static [&'static str],
    pub selected: &'static str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartDownload {
    pub entries: Vec<Entry>,
    pub base_url: String,
    pub format: Container,
    pub quality: String,
    pub out_dir: PathBuf,
    pub lang: String,
    /// Chosen by the frontend; a stop for this id may arrive before the worker starts.
    pub download_id: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadErrorEvent {
    pub message: String,
}

// ============================================================================
// Global State
// ============================================================================

pub struct AppState {
    settings: Mutex<AppSettings>,
    downloads: DownloadControl,
}

impl AppState {
    pub fn new(settings: AppSettings) -> Self {
        Self {
            settings: Mutex::new(settings),
            downloads: DownloadControl::default(),
        }
    }

    async fn settings(&self) -> AppSettings {
        self.settings.lock().await.clone()
    }
}

// ============================================================================
// Settings & Language Commands
// ============================================================================

#[tauri::command]
async fn get_settings(state: tauri::State<'_, AppState>) -> Result<AppSettings> {
    info!("get_settings called");
    Ok(state.settings().await)
}

#[tauri::command]
async fn save_settings(
    state: tauri::State<'_, AppState>,
    settings: AppSettings,
) -> Result<AppSettings> {
    info!("save_settings called");
    let settings = settings.sanitized();
    settings.save()?;
    *state.settings.lock().await = settings.clone();
    Ok(settings)
}

#[tauri::command]
fn list_languages() -> Vec<i18n::LanguageOption> {
    i18n::LANGUAGES.to_vec()
}

#[tauri::command]
async fn detect_language(state: tauri::State<'_, AppState>) -> Result<String> {
    let saved = state.settings.lock().await.language.clone();
    let lang = match saved {
        Some(code) if i18n::is_supported(&i18n::norm_lang(&code)) => i18n::norm_lang(&code),
        _ => i18n::detect_lang_code(i18n::system_locale().as_deref()),
    };
    info!("detect_language -> {}", lang);
    Ok(lang)
}

#[tauri::command]
fn get_translations(lang: String) -> BTreeMap<&'static str, String> {
    i18n::translations(&lang)
}

#[tauri::command]
fn list_formats() -> Vec<&'static str> {
    formats::container_labels()
}

#[tauri::command]
fn get_quality_options(format: Container, previous: Option<String>) -> QualityChoice {
    let opts = formats::quality_options(format);
    QualityChoice {
        label_key: opts.label_key,
        options: opts.options,
        selected: formats::pick_quality(format, previous.as_deref()),
    }
}

#[tauri::command]
async fn get_app_version(app: tauri::AppHandle) -> Result<String> {
    Ok(app.package_info().version.to_string())
}

// ============================================================================
// Host Commands
// ============================================================================

#[tauri::command]
async fn check_requirements(state: tauri::State<'_, AppState>) -> Result<RequirementsReport> {
    info!("check_requirements called");
    let settings = state.settings().await;
    let report = host::check_requirements(
        settings.ffmpeg_path.as_deref(),
        settings.ytdlp_path.as_deref(),
    );
    if !report.is_complete() {
        warn!(
            "Missing tools: {:?} (package manager: {:?})",
            report.missing, report.package_manager
        );
    }
    Ok(report)
}

#[tauri::command]
async fn select_folder(app: tauri::AppHandle) -> Result<Option<String>> {
    info!("select_folder called");

    use tauri_plugin_dialog::DialogExt;

    let result = app.dialog().file().blocking_pick_folder();

    Ok(result.map(|p| p.to_string()))
}

#[tauri::command]
fn check_folder(folder_path: String) -> bool {
    let usable = download::output_dir_ok(std::path::Path::new(&folder_path));
    if !usable {
        warn!("Download folder is not usable: {}", folder_path);
    }
    usable
}

#[tauri::command]
async fn open_folder(folder_path: String) -> Result<()> {
    info!("open_folder called for: {}", folder_path);

    #[cfg(target_os = "windows")]
    let program = "explorer";
    #[cfg(target_os = "macos")]
    let program = "open";
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let program = "xdg-open";

    new_command(program)
        .arg(&folder_path)
        .spawn()
        .map_err(|source| Error::Spawn {
            program: program.to_string(),
            source,
        })?;

    Ok(())
}

// ============================================================================
// Analyze Commands
// ============================================================================

#[tauri::command]
async fn analyze_url(state: tauri::State<'_, AppState>, url: String) -> Result<Vec<Entry>> {
    info!("analyze_url called for: {}", url);

    let settings = state.settings().await;
    let ytdlp = host::resolve_tool(Tool::YtDlp, settings.ytdlp_path.as_deref())
        .ok_or(Error::ExtractorMissing)?;

    analyze::analyze(&ytdlp, &url, settings.disable_flat_playlist)
        .await
        .inspect_err(|e| error!("analyze_url failed: {}", e))
}

/// Thumbnail as a data URL; `None` when it cannot be fetched or decoded.
#[tauri::command]
async fn fetch_thumbnail(url: String) -> Result<Option<String>> {
    match thumbnail::fetch(&url).await {
        Ok(data) => Ok(Some(data)),
        Err(e) => {
            debug!("Thumbnail skipped for {}: {}", url, e);
            Ok(None)
        }
    }
}

// ============================================================================
// Download Commands (yt-dlp)
// ============================================================================

#[tauri::command]
async fn start_download(
    app: tauri::AppHandle,
    state: tauri::State<'_, AppState>,
    request: StartDownload,
) -> Result<()> {
    info!(
        "start_download called: {} entries as {:?} {}",
        request.entries.len(),
        request.format,
        request.quality
    );

    let guard = state.downloads.begin(request.download_id)?;
    let cancel = guard.cancel_handle();

    let settings = state.settings().await;
    let ytdlp = host::resolve_tool(Tool::YtDlp, settings.ytdlp_path.as_deref())
        .ok_or(Error::ExtractorMissing)?;
    let ffmpeg = host::resolve_tool(Tool::Ffmpeg, settings.ffmpeg_path.as_deref());
    if ffmpeg.is_none() {
        warn!("ffmpeg not found, merging and audio conversion will fail");
    }

    let req = DownloadRequest {
        urls: request
            .entries
            .iter()
            .map(|e| analyze::resolve_download_url(e, &request.base_url))
            .collect(),
        out_dir: request.out_dir,
        container: request.format,
        quality: request.quality,
        ffmpeg,
        lang: i18n::norm_lang(&request.lang),
    };
    req.validate()?;

    let app_handle = app.clone();
    let outcome = download::run_download(&ytdlp, &req, &cancel, move |p| {
        let _ = app_handle.emit("download-progress", &p);
    })
    .await;
    drop(guard);

    match outcome {
        Ok(DownloadOutcome::Completed) => {
            let _ = app.emit("download-complete", ());
        }
        Ok(DownloadOutcome::Cancelled) => {
            info!("Download stopped by user");
            let _ = app.emit("download-cancelled", ());
        }
        Err(e) => {
            error!("Download failed: {}", e);
            let _ = app.emit(
                "download-error",
                DownloadErrorEvent {
                    message: e.to_string(),
                },
            );
        }
    }

    Ok(())
}

#[tauri::command]
fn cancel_download(state: tauri::State<'_, AppState>, download_id: u64) -> bool {
    info!("cancel_download called for download {}", download_id);
    state.downloads.cancel(download_id)
}

// ============================================================================
// Application Entry Point
// ============================================================================

pub fn run() {
    tauri::Builder::default()
        .plugin(
            tauri_plugin_log::Builder::new()
                .level(log::LevelFilter::Info)
                .target(tauri_plugin_log::Target::new(
                    tauri_plugin_log::TargetKind::Stdout,
                ))
                .target(tauri_plugin_log::Target::new(
                    tauri_plugin_log::TargetKind::LogDir {
                        file_name: Some("media-downloader".into()),
                    },
                ))
                .build(),
        )
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_os::init())
        .setup(|app| {
            info!(
                "Media Downloader {} starting up...",
                app.package_info().version
            );
            let settings = AppSettings::load();
            if let Err(e) = settings.ensure_download_dir() {
                warn!("Could not create download folder {:?}: {}", settings.download_dir, e);
            }
            app.manage(AppState::new(settings));
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Settings & language
            get_settings,
            save_settings,
            list_languages,
            detect_language,
            get_translations,
            list_formats,
            get_quality_options,
            get_app_version,
            // Host
            check_requirements,
            select_folder,
            check_folder,
            open_folder,
            // Analyze
            analyze_url,
            fetch_thumbnail,
            // Download
            start_download,
            cancel_download,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
