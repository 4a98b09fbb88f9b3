use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Notify;

use crate::error::{Error, Result};
use crate::formats::{Container, DownloadPlan};
use crate::new_command;
use crate::progress::{self, DownloadProgress, OutputLine};

/// Output file naming: `<title>.<ext>` inside the chosen folder.
pub const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

// ============================================================================
// Cancellation
// ============================================================================

/// Cooperative stop flag shared between the UI command and the running worker.
#[derive(Debug, Default)]
pub struct CancelHandle {
    flag: AtomicBool,
    notify: Notify,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Allows one download at a time and owns its cancel handle.
///
/// Downloads are identified by a caller-chosen non-zero id so that a stop sent before
/// the worker reaches [`begin`](Self::begin) still applies to that download, and a
/// stop that arrives after a download ended does not leak into the next one.
#[derive(Debug, Default)]
pub struct DownloadControl {
    running: AtomicBool,
    current: AtomicU64,
    stop_requested: AtomicU64,
    cancel: Arc<CancelHandle>,
}

pub struct RunningGuard<'a> {
    control: &'a DownloadControl,
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.control.running.store(false, Ordering::SeqCst);
    }
}

impl RunningGuard<'_> {
    pub fn cancel_handle(&self) -> Arc<CancelHandle> {
        self.control.cancel.clone()
    }
}

impl DownloadControl {
    pub fn begin(&self, id: u64) -> Result<RunningGuard<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| Error::Busy)?;
        self.current.store(id, Ordering::SeqCst);
        self.cancel.reset();
        if self.stop_requested.load(Ordering::SeqCst) == id {
            info!("Download {} was stopped before it started", id);
            self.cancel.cancel();
        }
        Ok(RunningGuard { control: self })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Requests a stop of download `id`. Returns `true` when that download is running;
    /// otherwise the request is remembered until it begins.
    pub fn cancel(&self, id: u64) -> bool {
        self.stop_requested.store(id, Ordering::SeqCst);
        if self.is_running() && self.current.load(Ordering::SeqCst) == id {
            self.cancel.cancel();
            return true;
        }
        false
    }
}

// ============================================================================
// Worker
// ============================================================================

/// Whether `dir` can receive downloads: it must exist and be a directory.
pub fn output_dir_ok(dir: &Path) -> bool {
    dir.is_dir()
}

#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub urls: Vec<String>,
    pub out_dir: PathBuf,
    pub container: Container,
    pub quality: String,
    pub ffmpeg: Option<PathBuf>,
    pub lang: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    Completed,
    /// The user pressed stop; not an error.
    Cancelled,
}

impl DownloadRequest {
    pub fn validate(&self) -> Result<()> {
        if self.urls.is_empty() {
            return Err(Error::NothingSelected);
        }
        if !output_dir_ok(&self.out_dir) {
            return Err(Error::InvalidFolder(
                self.out_dir.to_string_lossy().to_string(),
            ));
        }
        Ok(())
    }

    pub fn build_args(&self) -> Vec<String> {
        let plan = DownloadPlan::build(self.container, &self.quality);
        let mut args = plan.to_args();

        args.push("-o".to_string());
        args.push(
            self.out_dir
                .join(OUTPUT_TEMPLATE)
                .to_string_lossy()
                .to_string(),
        );
        args.push("--yes-playlist".to_string());
        args.push("--newline".to_string());
        args.push("--progress".to_string());
        args.push("--no-warnings".to_string());
        args.push("--no-color".to_string());
        args.push("--progress-template".to_string());
        args.push(progress::progress_template());

        if let Some(ffmpeg) = &self.ffmpeg {
            args.push("--ffmpeg-location".to_string());
            args.push(ffmpeg.to_string_lossy().to_string());
        }

        args.push("--".to_string());
        args.extend(self.urls.iter().cloned());
        args
    }
}

/// Runs one yt-dlp process for every URL in `req`, reporting progress through
/// `on_progress` until it exits or `cancel` fires.
pub async fn run_download<F>(
    ytdlp: &Path,
    req: &DownloadRequest,
    cancel: &CancelHandle,
    on_progress: F,
) -> Result<DownloadOutcome>
where
    F: Fn(DownloadProgress) + Send + Sync + 'static,
{
    req.validate()?;
    if cancel.is_cancelled() {
        return Ok(DownloadOutcome::Cancelled);
    }
    let args = req.build_args();
    info!("Running yt-dlp with args: {:?}", args);

    let program = ytdlp.to_string_lossy().to_string();
    let mut child = new_command(&program)
        .args(&args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| Error::Spawn {
            program: program.clone(),
            source,
        })?;

    let on_progress = Arc::new(on_progress);

    let stdout_task = child.stdout.take().map(|stdout| {
        let lang = req.lang.clone();
        let on_progress = on_progress.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                match progress::classify_line(&line) {
                    OutputLine::Progress(sample) => {
                        if let Some(p) = sample.to_progress(&lang) {
                            on_progress(p);
                        }
                    }
                    OutputLine::PostProcessing => on_progress(progress::converting(&lang)),
                    OutputLine::Error(_) | OutputLine::Other => {}
                }
            }
        })
    });

    let stderr_task = child.stderr.take().map(|stderr| {
        tokio::spawn(async move {
            let mut last_error: Option<String> = None;
            let mut last_line: Option<String> = None;
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if let OutputLine::Error(msg) = progress::classify_line(line) {
                    error!("yt-dlp: {}", msg);
                    last_error = Some(msg);
                } else {
                    last_line = Some(line.to_string());
                }
            }
            last_error.or(last_line)
        })
    });

    let status = tokio::select! {
        status = child.wait() => status?,
        _ = cancel.cancelled() => {
            warn!("Download cancelled, stopping yt-dlp");
            if let Err(e) = child.start_kill() {
                warn!("Failed to kill yt-dlp: {}", e);
            }
            let _ = child.wait().await;
            return Ok(DownloadOutcome::Cancelled);
        }
    };

    if cancel.is_cancelled() {
        return Ok(DownloadOutcome::Cancelled);
    }

    if let Some(task) = stdout_task {
        let _ = task.await;
    }
    let stderr_message = match stderr_task {
        Some(task) => task.await.ok().flatten(),
        None => None,
    };

    if status.success() {
        info!("Download finished: {} item(s)", req.urls.len());
        Ok(DownloadOutcome::Completed)
    } else {
        Err(Error::Extractor(stderr_message.unwrap_or_else(|| {
            format!("Download failed with code {:?}", status.code())
        })))
    }
}
