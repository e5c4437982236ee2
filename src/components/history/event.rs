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

use std::sync::mpsc::Sender;

use anyhow::Result;
use crossterm::event::Event;

use crate::{
    components::{HistoryView, TrackTableAction},
    events::{AppEvent, AppEventProcessor},
};

impl AppEventProcessor for HistoryView {
    fn process_event(&mut self, event: &Event, event_tx: &Sender<AppEvent>) -> Result<()> {
        match self.track_table.process_event(event) {
            Some(TrackTableAction::ActivateCurrent(index)) => {
                if let Some(track) = self.track_table.tracks().get(index) {
                    event_tx.send(AppEvent::PlayTrack(track.clone()))?;
                }
            }

            Some(TrackTableAction::CommitSelection(tracks)) => {
                event_tx.send(AppEvent::AddTracksToQueue(tracks))?;
            }

            None => {}
        }

        Ok(())
    }
}
