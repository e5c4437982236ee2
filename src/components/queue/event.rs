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

//! Event routing for the queue view.
//!
//! Queue specific editing keys are handled here, everything else is delegated
//! to the underlying track table.

use std::sync::mpsc::Sender;

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyModifiers};

use crate::{
    components::{QueueView, TrackTableAction},
    events::{AppEvent, AppEventProcessor},
};

impl AppEventProcessor for QueueView {
    fn process_event(&mut self, event: &Event, event_tx: &Sender<AppEvent>) -> Result<()> {
        if let Event::Key(key_event) = event
            && !key_event.modifiers.contains(KeyModifiers::CONTROL)
            && let Some(index) = self.track_table.selected_index()
        {
            let len = self.track_table.tracks().len();

            match key_event.code {
                KeyCode::Char('d') | KeyCode::Delete => {
                    event_tx.send(AppEvent::RemoveFromQueue(index))?;
                    return Ok(());
                }
                KeyCode::Char('J') => {
                    if index + 1 < len {
                        event_tx.send(AppEvent::MoveQueueItem {
                            from: index,
                            to: index + 1,
                        })?;
                    }
                    return Ok(());
                }
                KeyCode::Char('K') => {
                    if index > 0 {
                        event_tx.send(AppEvent::MoveQueueItem {
                            from: index,
                            to: index - 1,
                        })?;
                    }
                    return Ok(());
                }
                _ => {}
            }
        }

        if let Some(TrackTableAction::ActivateCurrent(index)) = self.track_table.process_event(event)
        {
            event_tx.send(AppEvent::PlayQueueItem(index))?;
        }

        Ok(())
    }
}
