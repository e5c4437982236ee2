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

//! Command-line input logic and state management.
//!
//! This module implements the logic for the `:` command-line component,
//! handling a text input component, and dispatching a corresponding
//! application event when typing is finished and a command is submitted.
//!
//! # Commands
//!
//! | Command                  | Action                                   |
//! |--------------------------|------------------------------------------|
//! | `q`, `quit`              | Exit                                     |
//! | `s`, `search <query>`    | Search the catalog                       |
//! | `p`, `pause`             | Toggle pause                             |
//! | `n`, `next`              | Next track                               |
//! | `b`, `prev`              | Previous track                           |
//! | `stop`                   | Stop playback                            |
//! | `seek <+/-secs>`         | Seek relative to the current position    |
//! | `v`, `vol <0-100>`       | Set the volume                           |
//! | `m`, `mute`              | Toggle mute                              |
//! | `shuffle`                | Toggle shuffle                           |
//! | `repeat`                 | Cycle repeat off, all, one               |
//! | `autoplay`               | Toggle autoplay                          |
//! | `adblock [on/off]`       | Toggle or set ad blocking                |
//! | `cq`, `clear`            | Clear the queue                          |
//! | `pn <name>`              | New playlist                             |
//! | `pr <name>`              | Rename the selected playlist             |
//! | `pd`                     | Delete the selected playlist             |
//! | `pa <name>`              | Add the selected tracks to a playlist    |
//! | `import <url> [name]`    | Import a catalog playlist                |
//! | `1` to `4`               | Switch view                              |

use std::sync::mpsc::Sender;

use crossterm::event::{Event, KeyCode};
use thiserror::Error;
use tracing::debug;
use tui_input::{Input, backend::crossterm::EventHandler};

use crate::{
    catalog,
    events::{AppEvent, MainView, PlaybackCommand},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("{0} needs an argument")]
    MissingArgument(&'static str),

    #[error("Invalid argument for {command}: {value}")]
    InvalidArgument { command: &'static str, value: String },

    #[error("Invalid playlist URL")]
    InvalidPlaylistUrl,
}

pub(crate) struct Commander {
    active: bool,
    pub(crate) input: Input,
}

impl Commander {
    pub(crate) fn new() -> Self {
        Self {
            active: false,
            input: Input::default(),
        }
    }

    pub(crate) fn active(&self) -> bool {
        self.active
    }

    /// Opens the command line with some text already typed.
    pub(crate) fn open_with(&mut self, text: &str) {
        self.input = Input::new(text.to_string());
        self.active = true;
    }

    /// Handles a terminal event, returning `true` if the command line consumed
    /// it.
    pub(crate) fn handle_event(&mut self, event: &Event, event_tx: &Sender<AppEvent>) -> bool {
        let Event::Key(key_event) = event else {
            return false;
        };

        if !self.active {
            if key_event.code == KeyCode::Char(':') {
                self.active = true;
                return true;
            }
            return false;
        }

        match key_event.code {
            KeyCode::Esc => self.close(),

            KeyCode::Enter => {
                let buffer = self.input.value().trim().to_string();
                self.close();

                if !buffer.is_empty() {
                    let event = match parse_command(&buffer) {
                        Ok(event) => event,
                        Err(e) => AppEvent::Notice(e.to_string()),
                    };
                    debug!(command = %buffer, "running command");
                    let _ = event_tx.send(event);
                }
            }

            _ => {
                // Delegate all other key events to the managed input component.
                self.input.handle_event(event);
            }
        }

        true
    }

    fn close(&mut self) {
        self.active = false;
        self.input.reset();
    }
}

/// Parses a command line into the application event it stands for.
pub(crate) fn parse_command(buffer: &str) -> Result<AppEvent, CommandError> {
    let parts: Vec<&str> = buffer.split_whitespace().collect();
    let rest = |parts: &[&str]| parts.join(" ");

    let event = match parts.as_slice() {
        ["q" | "quit"] => AppEvent::ExitApplication,

        ["s" | "search"] => return Err(CommandError::MissingArgument("search")),
        ["s" | "search", query @ ..] => AppEvent::Search(rest(query)),

        ["p" | "pause"] => AppEvent::Playback(PlaybackCommand::TogglePause),
        ["n" | "next"] => AppEvent::Playback(PlaybackCommand::Next),
        ["b" | "prev"] => AppEvent::Playback(PlaybackCommand::Previous),
        ["stop"] => AppEvent::Playback(PlaybackCommand::Stop),

        ["seek"] => return Err(CommandError::MissingArgument("seek")),
        ["seek", delta] => {
            let delta = delta
                .parse::<f64>()
                .ok()
                .filter(|d| d.is_finite())
                .ok_or_else(|| CommandError::InvalidArgument {
                    command: "seek",
                    value: delta.to_string(),
                })?;
            AppEvent::Playback(PlaybackCommand::Seek(delta))
        }

        ["v" | "vol"] => return Err(CommandError::MissingArgument("vol")),
        ["v" | "vol", volume] => {
            let volume = volume
                .parse::<u8>()
                .ok()
                .filter(|v| *v <= 100)
                .ok_or_else(|| CommandError::InvalidArgument {
                    command: "vol",
                    value: volume.to_string(),
                })?;
            AppEvent::Playback(PlaybackCommand::SetVolume(volume))
        }

        ["m" | "mute"] => AppEvent::Playback(PlaybackCommand::ToggleMute),
        ["shuffle"] => AppEvent::Playback(PlaybackCommand::ToggleShuffle),
        ["repeat"] => AppEvent::Playback(PlaybackCommand::CycleRepeat),
        ["autoplay"] => AppEvent::Playback(PlaybackCommand::ToggleAutoplay),

        ["adblock"] => AppEvent::Playback(PlaybackCommand::SetAdBlock(None)),
        ["adblock", "on"] => AppEvent::Playback(PlaybackCommand::SetAdBlock(Some(true))),
        ["adblock", "off"] => AppEvent::Playback(PlaybackCommand::SetAdBlock(Some(false))),
        ["adblock", value, ..] => {
            return Err(CommandError::InvalidArgument {
                command: "adblock",
                value: value.to_string(),
            });
        }

        ["cq" | "clear"] => AppEvent::ClearQueue,

        ["pn"] => return Err(CommandError::MissingArgument("pn")),
        ["pn", name @ ..] => AppEvent::CreatePlaylist(rest(name)),
        ["pr"] => return Err(CommandError::MissingArgument("pr")),
        ["pr", name @ ..] => AppEvent::RenameSelectedPlaylist(rest(name)),
        ["pd"] => AppEvent::DeleteSelectedPlaylist,
        ["pa"] => return Err(CommandError::MissingArgument("pa")),
        ["pa", name @ ..] => AppEvent::AddSelectionToPlaylist(rest(name)),

        ["import"] => return Err(CommandError::MissingArgument("import")),
        ["import", url, name @ ..] => {
            let playlist_id = catalog::playlist_id(url).ok_or(CommandError::InvalidPlaylistUrl)?;
            AppEvent::ImportPlaylist {
                playlist_id: playlist_id.to_string(),
                name: Some(rest(name)).filter(|name| !name.is_empty()),
            }
        }

        ["1"] => AppEvent::SetMainView(MainView::Queue),
        ["2"] => AppEvent::SetMainView(MainView::Search),
        ["3"] => AppEvent::SetMainView(MainView::Playlists),
        ["4"] => AppEvent::SetMainView(MainView::History),

        [] => return Err(CommandError::Unknown(String::new())),
        [cmd, ..] => return Err(CommandError::Unknown(cmd.to_string())),
    };

    Ok(event)
}
