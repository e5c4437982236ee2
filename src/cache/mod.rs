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

//! Predictive download cache for upcoming queue tracks.
//!
//! The cache keeps the first few tracks of the play queue (the window)
//! downloaded to local files, with a bounded number of downloads running at
//! the same time. Tracks leaving the window have their download cancelled and
//! their file deleted, so disk usage and the number of running downloader
//! processes stay bounded however large the queue grows.
//!
//! The cache is owned by the playback orchestrator and only ever mutated from
//! the main event loop. Downloads run elsewhere and report back with
//! [`AppEvent::DownloadFinished`](crate::events::AppEvent::DownloadFinished),
//! carrying the ticket they were started with. A result whose ticket no longer
//! belongs to a live entry is stale and is discarded.

mod download;

pub(crate) use download::YtDlpDownloader;

use std::{
    collections::{HashMap, HashSet, VecDeque},
    fs,
    io,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::model::Track;

/// How long [`PrefetchCache::cleanup`] waits for cancelled downloads to exit.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheStatus {
    Downloading,
    Ready,
    Error,
}

#[derive(Debug, Clone)]
pub(crate) struct CacheEntry {
    pub(crate) path: PathBuf,
    pub(crate) status: CacheStatus,
    ticket: u64,
}

/// A request for a single track download.
#[derive(Debug, Clone)]
pub(crate) struct DownloadRequest {
    pub(crate) track_id: String,
    pub(crate) ticket: u64,
    pub(crate) path: PathBuf,
}

/// Handle to a running download, shared between the cache and whatever runs
/// the download.
///
/// The cache raises the cancel flag, the runner raises the finished flag once
/// nothing it started is left running.
#[derive(Debug, Clone, Default)]
pub(crate) struct DownloadHandle {
    cancelled: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
}

impl DownloadHandle {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub(crate) fn cancel_flag(&self) -> &AtomicBool {
        &self.cancelled
    }

    pub(crate) fn finish(&self) {
        self.finished.store(true, Ordering::SeqCst);
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

/// Starts downloads in the background.
///
/// Implementations must eventually report every started download back to the
/// cache, via [`PrefetchCache::finish_download`], whether it succeeded, failed
/// or was cancelled.
pub(crate) trait Downloader {
    fn start(&self, request: DownloadRequest) -> Result<DownloadHandle>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CacheStats {
    pub(crate) total: usize,
    pub(crate) ready: usize,
    pub(crate) downloading: usize,
}

struct ActiveDownload {
    ticket: u64,
    handle: DownloadHandle,
}

pub(crate) struct PrefetchCache {
    dir: PathBuf,
    window_size: usize,
    max_concurrent: usize,
    downloader: Box<dyn Downloader>,

    entries: HashMap<String, CacheEntry>,
    active: HashMap<String, ActiveDownload>,
    pending: VecDeque<String>,
    window: HashSet<String>,
    next_ticket: u64,
}

impl PrefetchCache {
    /// Creates the cache, creating the cache directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache directory cannot be created.
    pub(crate) fn new(
        dir: &Path,
        window_size: usize,
        max_concurrent: usize,
        downloader: Box<dyn Downloader>,
    ) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create cache directory {}", dir.display()))?;

        Ok(Self {
            dir: dir.to_path_buf(),
            window_size,
            max_concurrent: max_concurrent.max(1),
            downloader,
            entries: HashMap::new(),
            active: HashMap::new(),
            pending: VecDeque::new(),
            window: HashSet::new(),
            next_ticket: 0,
        })
    }

    /// Slides the download window to the first tracks of `queue`.
    ///
    /// Entries that left the window are cancelled and deleted, tracks that
    /// entered it are queued for download, and the download queue is then
    /// drained up to the concurrency limit.
    pub(crate) fn update_window<'a>(&mut self, queue: impl IntoIterator<Item = &'a Track>) {
        let wanted: Vec<&Track> = queue.into_iter().take(self.window_size).collect();
        let window: HashSet<String> = wanted.iter().map(|t| t.id.clone()).collect();

        let stale: Vec<String> = self
            .entries
            .keys()
            .filter(|id| !window.contains(*id))
            .cloned()
            .collect();
        for track_id in stale {
            self.remove_entry(&track_id);
        }

        self.pending.retain(|id| window.contains(id));
        self.window = window;

        for track in wanted {
            if self.entries.contains_key(&track.id) {
                continue;
            }

            let ticket = self.next_ticket;
            self.next_ticket += 1;

            self.entries.insert(
                track.id.clone(),
                CacheEntry {
                    path: self.file_path(&track.id, ticket),
                    status: CacheStatus::Downloading,
                    ticket,
                },
            );
            self.pending.push_back(track.id.clone());
        }

        self.drain();
    }

    /// The local file for a track, only if it is fully downloaded and the file
    /// is still present.
    pub(crate) fn cached_path(&self, track_id: &str) -> Option<PathBuf> {
        self.entries
            .get(track_id)
            .filter(|entry| entry.status == CacheStatus::Ready && entry.path.exists())
            .map(|entry| entry.path.clone())
    }

    /// Whether a download for the track is currently running.
    pub(crate) fn is_caching(&self, track_id: &str) -> bool {
        self.active.contains_key(track_id)
    }

    #[cfg(test)]
    pub(crate) fn entry(&self, track_id: &str) -> Option<&CacheEntry> {
        self.entries.get(track_id)
    }

    #[cfg(test)]
    pub(crate) fn active_downloads(&self) -> usize {
        self.active.len()
    }

    /// Applies the result of a finished download.
    ///
    /// Results for a ticket that is no longer live, because the track left
    /// the window or was replaced by a newer download, never touch the cache
    /// entries, their file is simply deleted.
    pub(crate) fn finish_download(&mut self, track_id: &str, ticket: u64, success: bool) {
        if self.active.get(track_id).is_some_and(|a| a.ticket == ticket) {
            self.active.remove(track_id);
        }

        let live = self.window.contains(track_id)
            && self
                .entries
                .get(track_id)
                .is_some_and(|e| e.ticket == ticket && e.status == CacheStatus::Downloading);

        if !live {
            debug!(track_id, ticket, "discarding stale download result");
            remove_file(&self.file_path(track_id, ticket));
            self.drain();
            return;
        }

        if let Some(entry) = self.entries.get_mut(track_id) {
            if success && entry.path.exists() {
                info!(track_id, path = %entry.path.display(), "track cached");
                entry.status = CacheStatus::Ready;
            } else {
                warn!(track_id, "track download failed");
                entry.status = CacheStatus::Error;
                remove_file(&entry.path);
            }
        }

        self.drain();
    }

    /// Cancels every download and removes the whole cache directory.
    ///
    /// Blocks until the cancelled downloads have exited, for at most
    /// [`SHUTDOWN_GRACE`], so none of them writes into the directory after it
    /// was removed.
    pub(crate) fn cleanup(&mut self) {
        let downloads: Vec<DownloadHandle> =
            self.active.drain().map(|(_, download)| download.handle).collect();
        for handle in &downloads {
            handle.cancel();
        }
        wait_for_downloads(&downloads, SHUTDOWN_GRACE);

        self.pending.clear();
        self.entries.clear();
        self.window.clear();

        match fs::remove_dir_all(&self.dir) {
            Ok(()) => info!(dir = %self.dir.display(), "cache removed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(dir = %self.dir.display(), error = %e, "failed to remove cache"),
        }
    }

    pub(crate) fn stats(&self) -> CacheStats {
        let mut stats = CacheStats {
            total: self.entries.len(),
            ..CacheStats::default()
        };

        for entry in self.entries.values() {
            match entry.status {
                CacheStatus::Ready => stats.ready += 1,
                CacheStatus::Downloading => stats.downloading += 1,
                CacheStatus::Error => {}
            }
        }

        stats
    }

    // Starts pending downloads until the concurrency limit is reached.
    fn drain(&mut self) {
        while self.active.len() < self.max_concurrent {
            let Some(track_id) = self.pending.pop_front() else {
                break;
            };

            if !self.window.contains(&track_id) || self.active.contains_key(&track_id) {
                continue;
            }

            let Some(entry) = self.entries.get_mut(&track_id) else {
                continue;
            };
            if entry.status != CacheStatus::Downloading {
                continue;
            }

            let request = DownloadRequest {
                track_id: track_id.clone(),
                ticket: entry.ticket,
                path: entry.path.clone(),
            };

            match self.downloader.start(request) {
                Ok(handle) => {
                    debug!(track_id, ticket = entry.ticket, "download started");
                    self.active.insert(
                        track_id,
                        ActiveDownload {
                            ticket: entry.ticket,
                            handle,
                        },
                    );
                }
                Err(e) => {
                    warn!(track_id, error = %e, "failed to start download");
                    entry.status = CacheStatus::Error;
                }
            }
        }
    }

    fn remove_entry(&mut self, track_id: &str) {
        if let Some(download) = self.active.remove(track_id) {
            debug!(track_id, "cancelling download");
            download.handle.cancel();
        }

        if let Some(entry) = self.entries.remove(track_id) {
            remove_file(&entry.path);
        }
    }

    // Including the ticket keeps a discarded download from deleting the file
    // of a newer download of the same track.
    fn file_path(&self, track_id: &str, ticket: u64) -> PathBuf {
        let safe_id: String = track_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}-{}.audio", safe_id, ticket))
    }
}

fn wait_for_downloads(downloads: &[DownloadHandle], grace: Duration) {
    let deadline = Instant::now() + grace;

    while downloads.iter().any(|handle| !handle.is_finished()) {
        if Instant::now() >= deadline {
            let running = downloads.iter().filter(|h| !h.is_finished()).count();
            warn!(running, "downloads still running after cancellation");
            return;
        }
        thread::sleep(Duration::from_millis(20));
    }
}

fn remove_file(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to delete cache file"),
    }
}
