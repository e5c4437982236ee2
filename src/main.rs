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

//! # Cadenza.
//!
//! A terminal music player streaming from an online catalog.
//!
//! This application coordinates a TUI frontend built with `ratatui` and a
//! background processing layer.
//!
//! It uses an event-driven architecture where:
//!
//! * The **Main Thread** owns all application state, applies events to it and
//!   renders the UI.
//! * **Background Workers** handle catalog lookups, database access, the
//!   audio engine and track downloads, reporting back with events.
//! * **Event Loops** capture user input and system ticks to drive the UI
//!   state.
//!
//! ## Architecture
//!
//! The application follows a strict setup-run-teardown pattern to ensure the
//! terminal state is preserved even in the event of an error. Communication
//! between the UI and background workers is handled via `std::sync::mpsc`
//! channels.

mod adblock;
mod cache;
mod catalog;
mod commander;
mod components;
mod config;
mod db;
mod events;
mod logging;
mod model;
mod playback;
mod player;
mod render;
mod tasks;
mod theme;
mod util;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    io::{self},
    sync::{
        Arc,
        mpsc::{self, Receiver, Sender},
    },
    thread,
    time::Duration,
};
use tracing::{info, warn};

use crate::{
    cache::{PrefetchCache, YtDlpDownloader},
    catalog::{Catalog, YtDlp},
    commander::Commander,
    components::{HistoryView, PlaylistsView, QueueView, SearchView},
    config::AppConfig,
    events::{AppEvent, MainView, process_events},
    model::{Track, search::Search},
    playback::Playback,
    player::AudioPlayer,
    tasks::AppTask,
    theme::Theme,
};

const APP_TITLE: &str = "cadenza";

/// Application state.
pub(crate) struct App {
    pub(crate) config: AppConfig,

    pub(crate) theme: Theme,
    pub(crate) main_view: MainView,

    pub(crate) event_tx: Sender<AppEvent>,
    pub(crate) event_rx: Receiver<AppEvent>,

    pub(crate) task_tx: Sender<AppTask>,

    pub(crate) playback: Playback,
    pub(crate) search: Search,

    pub(crate) queue_view: QueueView,
    pub(crate) search_view: SearchView,
    pub(crate) playlists_view: PlaylistsView,
    pub(crate) history_view: HistoryView,

    pub(crate) commander: Commander,

    window_title: String,
}

impl App {
    /// Create a new instance of application state.
    pub(crate) fn new(
        config: AppConfig,
        playback: Playback,
        event_tx: Sender<AppEvent>,
        event_rx: Receiver<AppEvent>,
        task_tx: Sender<AppTask>,
    ) -> Self {
        Self {
            config,
            theme: Theme::default(),
            main_view: MainView::Queue,
            event_tx,
            event_rx,
            task_tx,
            playback,
            search: Search::new(),
            queue_view: QueueView::new(),
            search_view: SearchView::new(),
            playlists_view: PlaylistsView::new(),
            history_view: HistoryView::new(),
            commander: Commander::new(),
            window_title: String::new(),
        }
    }

    /// Copies the orchestrator's queue and history into their views, and
    /// names the terminal window after the current track.
    pub(crate) fn sync_views(&mut self) {
        let queue = self.playback.queue();
        self.queue_view.set_tracks(queue.tracks().cloned().collect());
        self.history_view.set_tracks(queue.history());

        let title = match &self.playback.state().current {
            Some(track) => format!("{} - {} | {}", track.title, track.artist, APP_TITLE),
            None => APP_TITLE.to_string(),
        };

        if title != self.window_title {
            util::term::set_window_title(&title);
            self.window_title = title;
        }
    }

    /// The marked tracks of the active view, or its current row.
    pub(crate) fn selected_tracks(&self) -> Vec<Track> {
        match self.main_view {
            MainView::Queue => self.queue_view.track_table.selected_tracks(),
            MainView::Search => self.search_view.track_table.selected_tracks(),
            MainView::Playlists => self.playlists_view.track_table.selected_tracks(),
            MainView::History => self.history_view.track_table.selected_tracks(),
        }
    }
}

/// The entry point of the application.
///
/// Sets up logging, storage, the background workers and the playback
/// orchestrator, manages the terminal lifecycle, and returns an error if any
/// part of the execution fails.
fn main() -> Result<()> {
    let config = config::load_config();

    if let Err(e) = logging::init_logging(&config.log_file()) {
        eprintln!("Logging disabled: {:#}", e);
    }
    info!(version = env!("CARGO_PKG_VERSION"), "starting");

    let (event_tx, event_rx) = mpsc::channel();
    let (task_tx, task_rx) = mpsc::channel();

    let conn = db::init_db(&config.database_file()).context("Failed to open the database")?;

    let catalog: Arc<dyn Catalog> = Arc::new(YtDlp::new(&config.ytdlp_binary));
    tasks::spawn_task_worker(conn, catalog, task_rx, event_tx.clone())
        .context("Failed to start the task worker")?;

    let downloader = YtDlpDownloader::new(&config.ytdlp_binary, event_tx.clone());
    let cache = PrefetchCache::new(
        &config.cache_dir(),
        config.cache_window,
        config.max_concurrent_downloads,
        Box::new(downloader),
    )
    .context("Failed to initialise the download cache")?;

    let engine = AudioPlayer::new(event_tx.clone(), config.volume);
    let playback = Playback::new(
        Box::new(engine),
        cache,
        &config,
        task_tx.clone(),
        event_tx.clone(),
    );

    let mut app = App::new(config, playback, event_tx, event_rx, task_tx);

    let mut terminal = setup_terminal(&app)?;
    let res = run(&mut terminal, &mut app);
    app.playback.shutdown();
    restore_terminal(&mut terminal);

    info!("stopped");

    res.context("Application error occurred")
}

/// Prepares the terminal for the TUI application.
///
/// This function performs the following side effects:
/// * Sets the terminal background color based on the provided theme.
/// * Enables raw mode to capture all keyboard input.
/// * Switches the terminal to the alternate screen buffer.
///
/// # Errors
///
/// Returns an error if raw mode cannot be enabled or if the alternate screen
/// cannot be entered.
fn setup_terminal(app: &App) -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    // Set the background of the entire terminal window, without this we'd get
    // a thin black outline
    if let Some(hex) = Theme::to_hex(app.theme.background_colour) {
        util::term::set_terminal_bg(&hex);
    }

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;

    Ok(terminal)
}

/// Restores the terminal to its original state.
///
/// This reverses the changes made by [`setup_terminal`], including disabling
/// raw mode, leaving the alternate screen, and resetting the background color.
/// It also ensures the cursor is made visible again.
///
/// This function is "best-effort" and does not return a result, as it is
/// called during cleanup.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) {
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    util::term::reset_terminal_bg();
    terminal.show_cursor().ok();
}

/// Starts the input and tick threads and enters the main event loop.
///
/// This function spawns several long-running background threads:
/// * An input thread to poll for terminal keyboard events.
/// * A tick thread to trigger periodic UI refreshes and notice expiry.
///
/// A termination signal handler is installed so that `SIGTERM` and `SIGHUP`
/// shut down cleanly, releasing the audio engine and the download cache.
///
/// # Errors
///
/// Returns an error if the event processing loop encounters an unrecoverable
/// application error.
fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let signal_tx = app.event_tx.clone();
    ctrlc::set_handler(move || {
        let _ = signal_tx.send(AppEvent::ExitApplication);
    })
    .context("Failed to install the signal handler")?;

    // Spawn a thread to translate raw terminal events to application events.
    let tx_keys = app.event_tx.clone();
    thread::Builder::new()
        .name("input".to_string())
        .spawn(move || {
            loop {
                let sent = match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        tx_keys.send(AppEvent::Key(key))
                    }
                    Ok(Event::Resize(_, _)) => tx_keys.send(AppEvent::Tick),
                    Ok(_) => Ok(()),
                    Err(e) => {
                        warn!(error = %e, "terminal input failed");
                        break;
                    }
                };

                if sent.is_err() {
                    break;
                }
            }
        })
        .context("Failed to start the input thread")?;

    // Spawn a thread to send a periodic tick application event, this is
    // effectively the minimum "frame rate" for rendering the TUI application.
    let tx_tick = app.event_tx.clone();
    thread::Builder::new()
        .name("tick".to_string())
        .spawn(move || {
            while tx_tick.send(AppEvent::Tick).is_ok() {
                thread::sleep(Duration::from_millis(250));
            }
        })
        .context("Failed to start the tick thread")?;

    // Initial requests to restore persisted state
    app.task_tx.send(AppTask::LoadHistory)?;
    app.task_tx.send(AppTask::LoadPlaylists)?;

    // Application event loop, process events until the user quits
    process_events(terminal, app)
}
