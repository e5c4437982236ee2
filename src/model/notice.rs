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

//! Transient user facing messages.

use std::time::{Duration, Instant};

/// How long a notice stays visible.
pub(crate) const NOTICE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub(crate) struct Notice {
    pub(crate) message: String,
    raised_at: Instant,
}

impl Notice {
    pub(crate) fn new(message: impl Into<String>, now: Instant) -> Self {
        Self {
            message: message.into(),
            raised_at: now,
        }
    }

    pub(crate) fn expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) >= NOTICE_TTL
    }
}

/// Holds at most one notice, a newer notice replaces the older one.
#[derive(Debug, Default)]
pub(crate) struct Notices {
    current: Option<Notice>,
}

impl Notices {
    pub(crate) fn raise(&mut self, message: impl Into<String>) {
        self.raise_at(message, Instant::now());
    }

    pub(crate) fn raise_at(&mut self, message: impl Into<String>, now: Instant) {
        self.current = Some(Notice::new(message, now));
    }

    pub(crate) fn expire(&mut self, now: Instant) {
        if self.current.as_ref().is_some_and(|n| n.expired(now)) {
            self.current = None;
        }
    }

    pub(crate) fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }
}
