// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! `yt-dlp` backed track downloads.

use std::{
    process::Command,
    sync::mpsc::Sender,
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::{
    cache::{DownloadHandle, DownloadRequest, Downloader},
    catalog::catalog_url,
    events::AppEvent,
    util::process::{self, ProcessError},
};

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Downloads the best available audio of a track with `yt-dlp`.
///
/// Each download runs on its own thread and reports back on the application
/// event channel. The handle is marked finished once the `yt-dlp` process and
/// anything it started have exited.
pub(crate) struct YtDlpDownloader {
    binary: String,
    event_tx: Sender<AppEvent>,
}

impl YtDlpDownloader {
    pub(crate) fn new(binary: &str, event_tx: Sender<AppEvent>) -> Self {
        Self {
            binary: binary.to_string(),
            event_tx,
        }
    }
}

impl Downloader for YtDlpDownloader {
    fn start(&self, request: DownloadRequest) -> Result<DownloadHandle> {
        let handle = DownloadHandle::new();
        let worker = handle.clone();

        let binary = self.binary.clone();
        let event_tx = self.event_tx.clone();

        thread::Builder::new()
            .name(format!("download-{}", request.track_id))
            .spawn(move || {
                let url = catalog_url(&request.track_id);
                let path = request.path.to_string_lossy().into_owned();

                let result = process::run(
                    Command::new(&binary).args([
                        "-f",
                        "bestaudio",
                        "--no-warnings",
                        "--quiet",
                        "--no-playlist",
                        "--no-part",
                        "-o",
                        &path,
                        &url,
                    ]),
                    DOWNLOAD_TIMEOUT,
                    Some(worker.cancel_flag()),
                );
                worker.finish();

                let success = match result {
                    Ok(output) if output.status.success() => true,
                    Ok(output) => {
                        warn!(track_id = %request.track_id, status = %output.status, stderr = %output.stderr.trim(), "download failed");
                        false
                    }
                    Err(ProcessError::Cancelled { .. }) => {
                        debug!(track_id = %request.track_id, "download cancelled");
                        false
                    }
                    Err(e) => {
                        warn!(track_id = %request.track_id, error = %e, "download failed");
                        false
                    }
                };

                let _ = event_tx.send(AppEvent::DownloadFinished {
                    track_id: request.track_id,
                    ticket: request.ticket,
                    success,
                });
            })
            .context("Failed to spawn download thread")?;

        Ok(handle)
    }
}
