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

//! Delayed delivery of application events.
//!
//! Timers carry a token inside the event they deliver, the receiver compares
//! that token with its current state and ignores timers that are no longer
//! relevant. Timers are therefore never cancelled.

use std::{sync::mpsc::Sender, thread, time::Duration};

use crate::events::AppEvent;

/// Sends `event` on `event_tx` once `delay` has elapsed.
pub(crate) fn send_after(event_tx: &Sender<AppEvent>, delay: Duration, event: AppEvent) {
    let event_tx = event_tx.clone();

    thread::spawn(move || {
        thread::sleep(delay);
        // The receiver is gone when the application is shutting down.
        let _ = event_tx.send(event);
    });
}
