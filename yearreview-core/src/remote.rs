//! Remote data mirroring.
//!
//! A remote (`user@host`) is mirrored with rsync into a private staging
//! directory, which is then parsed like any local tool root. A remote that
//! cannot be reached, times out, or has no data yields `None`; the run
//! carries on with the other sources.

use crate::config::RemoteConfig;
use crate::error::{Error, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Filesystem-safe directory name for a remote identifier.
pub fn staging_name(remote: &str) -> String {
    remote.replace('@', "_at_").replace(['.', ':'], "_")
}

/// Mirrors remote log directories into a staging area.
///
/// The staging area is deleted when the fetcher is dropped, so parse the
/// returned paths before letting it go.
pub struct RemoteFetcher {
    staging: TempDir,
    config: RemoteConfig,
}

impl RemoteFetcher {
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("yearreview-");
        let staging = match &config.staging_root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        Ok(Self { staging, config })
    }

    /// Root of the staging area.
    pub fn staging_dir(&self) -> &Path {
        self.staging.path()
    }

    /// Mirror a remote, or `None` if it is unavailable.
    pub fn fetch(&self, remote: &str) -> Option<PathBuf> {
        tracing::info!(remote, "Fetching remote data");
        match self.try_fetch(remote) {
            Ok(path) => {
                tracing::info!(remote, path = %path.display(), "Fetched remote data");
                Some(path)
            }
            Err(e) => {
                tracing::warn!(remote, error = %e, "Remote unavailable, skipping");
                None
            }
        }
    }

    /// Mirror a remote, reporting why it failed.
    pub fn try_fetch(&self, remote: &str) -> Result<PathBuf> {
        let target = self.staging.path().join(staging_name(remote));
        std::fs::create_dir_all(&target)?;

        let mut command = Command::new(&self.config.rsync_path);
        command
            .arg("-az")
            .arg(format!("{}:{}", remote, self.config.remote_dir))
            .arg(format!("{}/", target.display()));

        run_with_timeout(&mut command, self.config.timeout()).map_err(|message| Error::Remote {
            remote: remote.to_string(),
            message,
        })?;

        let has_files = std::fs::read_dir(&target)?.next().is_some();
        if !has_files {
            return Err(Error::Remote {
                remote: remote.to_string(),
                message: "no data found".to_string(),
            });
        }

        Ok(target)
    }
}

/// Run a command to completion within `timeout`, killing it otherwise.
///
/// Returns a short description of the failure on error.
fn run_with_timeout(command: &mut Command, timeout: Duration) -> std::result::Result<(), String> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("failed to start: {}", e))?;

    let stderr = child.stderr.take();
    let reader = std::thread::spawn(move || {
        let mut buf = String::new();
        if let Some(mut stderr) = stderr {
            let _ = stderr.read_to_string(&mut buf);
        }
        buf
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(format!("timed out after {}s", timeout.as_secs()));
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(e) => return Err(format!("failed to wait: {}", e)),
        }
    };

    let stderr = reader.join().unwrap_or_default();
    if status.success() {
        Ok(())
    } else {
        let detail: String = stderr.trim().chars().take(200).collect();
        Err(format!("{} {}", status, detail).trim().to_string())
    }
}
