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

//! Database row mapping for domain models.
//!
//! This module provides the conversion logic between raw SQLite result rows
//! and the domain models. Track columns are always selected in the order of
//! [`TRACK_COLUMNS`], after any leading columns the query needs.

use rusqlite::Row;

use crate::model::Track;

/// Track columns shared by the history and playlist tables.
pub(super) const TRACK_COLUMNS: &str = "track_id, title, artist, album, duration, thumbnail";

impl Track {
    /// Maps an SQLite row to a [`Track`] instance, reading the track columns
    /// starting at column `offset`.
    ///
    /// # Errors
    ///
    /// Returns a [`rusqlite::Error`] if the row does not contain enough
    /// columns, or a column cannot be converted to the required Rust type.
    pub(crate) fn from_row(row: &Row, offset: usize) -> rusqlite::Result<Self> {
        let duration: i64 = row.get(offset + 4)?;

        Ok(Self {
            id: row.get(offset)?,
            title: row.get(offset + 1)?,
            artist: row.get(offset + 2)?,
            album: row.get(offset + 3)?,
            duration: duration.max(0) as u64,
            thumbnail: row.get(offset + 5)?,
        })
    }
}
