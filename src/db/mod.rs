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

//! Data access layer.
//!
//! This module handles all interactions with the SQLite database, including
//! schema creation, playlists and the play history. It uses cached statements
//! for the frequently executed queries.
//!
//! # Tables
//!
//! * `playlists` - User playlists, names and timestamps.
//! * `playlist_tracks` - Ordered playlist members, unique per playlist.
//! * `play_history` - The most recently played tracks, oldest first.

mod model;

use std::{
    path::Path,
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use xxhash_rust::xxh3::xxh3_64;

use crate::{
    db::model::TRACK_COLUMNS,
    model::{Playlist, Track, queue::HISTORY_LIMIT},
    util::unix_millis,
};

/// Opens a connection to the SQLite database and configures performance settings.
///
/// This function performs the following setup:
/// * **WAL Mode**: Enables Write-Ahead Logging.
/// * **Constraints**: Enforces foreign key integrity.
/// * **Schema**: Executes [`create_schema`] to ensure all tables exist.
///
/// # Errors
///
/// Returns an error if the database file cannot be opened, the PRAGMA
/// configuration fails, or the schema cannot be created.
pub(crate) fn init_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;

    let journal_mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |r| r.get(0))?;
    if journal_mode != "wal" {
        anyhow::bail!(
            "Failed to switch to WAL mode. Current mode: {}",
            journal_mode
        );
    }

    conn.execute_batch(
        "
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
    ",
    )?;

    create_schema(&conn)?;

    Ok(conn)
}

/// Create the database schema.
///
/// Wrapped in a single transaction so the schema is updated atomically.
///
/// # Errors
///
/// Returns an error if the transaction fails.
fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "BEGIN;

        CREATE TABLE IF NOT EXISTS playlists (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS playlist_tracks (
            playlist_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            track_id TEXT NOT NULL,
            title TEXT NOT NULL,
            artist TEXT NOT NULL,
            album TEXT,
            duration INTEGER NOT NULL,
            thumbnail TEXT,
            PRIMARY KEY (playlist_id, track_id),
            FOREIGN KEY (playlist_id) REFERENCES playlists (id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_playlist_tracks_position ON playlist_tracks (playlist_id, position);

        CREATE TABLE IF NOT EXISTS play_history (
            position INTEGER PRIMARY KEY,
            track_id TEXT NOT NULL,
            title TEXT NOT NULL,
            artist TEXT NOT NULL,
            album TEXT,
            duration INTEGER NOT NULL,
            thumbnail TEXT
        );

        COMMIT;",
    )
    .context("Failed to create schema")
}

/// Fetches the persisted play history, oldest entry first.
pub(crate) fn fetch_history(conn: &Connection) -> Result<Vec<Track>> {
    let sql = format!("SELECT {TRACK_COLUMNS} FROM play_history ORDER BY position");

    let mut stmt = conn.prepare_cached(&sql)?;
    let results = stmt
        .query_map([], |row| Track::from_row(row, 0))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(results)
}

/// Replaces the persisted play history, keeping only the most recent
/// [`HISTORY_LIMIT`] entries.
pub(crate) fn save_history(conn: &mut Connection, history: &[Track]) -> Result<()> {
    let skip = history.len().saturating_sub(HISTORY_LIMIT);

    let tx = conn.transaction()?;
    tx.execute("DELETE FROM play_history", [])?;
    {
        let sql = format!("INSERT INTO play_history (position, {TRACK_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)");
        let mut stmt = tx.prepare_cached(&sql)?;
        for (position, track) in history.iter().skip(skip).enumerate() {
            stmt.execute(params![
                position as i64,
                track.id,
                track.title,
                track.artist,
                track.album,
                track.duration as i64,
                track.thumbnail,
            ])?;
        }
    }
    tx.commit()?;

    Ok(())
}

/// Fetches all playlists with their tracks, oldest playlist first.
pub(crate) fn fetch_playlists(conn: &Connection) -> Result<Vec<Playlist>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, name, created_at, updated_at FROM playlists ORDER BY created_at, name",
    )?;

    let mut playlists = stmt
        .query_map([], |row| {
            Ok(Playlist {
                id: row.get(0)?,
                name: row.get(1)?,
                tracks: vec![],
                created_at: row.get(2)?,
                updated_at: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    for playlist in playlists.iter_mut() {
        playlist.tracks = fetch_playlist_tracks(conn, &playlist.id)?;
    }

    Ok(playlists)
}

fn fetch_playlist_tracks(conn: &Connection, playlist_id: &str) -> Result<Vec<Track>> {
    let sql = format!(
        "SELECT {TRACK_COLUMNS} FROM playlist_tracks WHERE playlist_id = ? ORDER BY position"
    );

    let mut stmt = conn.prepare_cached(&sql)?;
    let results = stmt
        .query_map([playlist_id], |row| Track::from_row(row, 0))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(results)
}

/// Creates a new, empty, playlist.
pub(crate) fn create_playlist(conn: &Connection, name: &str) -> Result<Playlist> {
    let now = unix_millis();
    let playlist = Playlist {
        id: new_playlist_id(name),
        name: name.to_string(),
        tracks: vec![],
        created_at: now,
        updated_at: now,
    };

    conn.prepare_cached(
        "INSERT INTO playlists (id, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
    )?
    .execute(params![playlist.id, playlist.name, now, now])?;

    Ok(playlist)
}

/// Creates a playlist holding `tracks`, in order, as a single transaction.
///
/// Repeated tracks are kept once, at their first position.
pub(crate) fn import_playlist(
    conn: &mut Connection,
    name: &str,
    tracks: &[Track],
) -> Result<Playlist> {
    let tx = conn.transaction()?;
    let mut playlist = create_playlist(&tx, name)?;
    for track in tracks {
        if add_track_to_playlist(&tx, &playlist.id, track)? {
            playlist.tracks.push(track.clone());
        }
    }
    tx.commit().context("Failed to import playlist")?;

    Ok(playlist)
}

/// Renames a playlist, returning `false` if it does not exist.
pub(crate) fn rename_playlist(conn: &Connection, playlist_id: &str, name: &str) -> Result<bool> {
    let changed = conn
        .prepare_cached("UPDATE playlists SET name = ?2, updated_at = ?3 WHERE id = ?1")?
        .execute(params![playlist_id, name, unix_millis()])?;

    Ok(changed > 0)
}

/// Deletes a playlist and its tracks, returning `false` if it does not exist.
pub(crate) fn delete_playlist(conn: &Connection, playlist_id: &str) -> Result<bool> {
    // Explicit, the cascade only applies when foreign keys are enabled.
    conn.prepare_cached("DELETE FROM playlist_tracks WHERE playlist_id = ?")?
        .execute([playlist_id])?;

    let changed = conn
        .prepare_cached("DELETE FROM playlists WHERE id = ?")?
        .execute([playlist_id])?;

    Ok(changed > 0)
}

/// Appends a track to a playlist.
///
/// Returns `false` if the playlist does not exist or already contains the
/// track.
pub(crate) fn add_track_to_playlist(
    conn: &Connection,
    playlist_id: &str,
    track: &Track,
) -> Result<bool> {
    let exists: Option<i64> = conn
        .prepare_cached("SELECT 1 FROM playlists WHERE id = ?")?
        .query_row([playlist_id], |r| r.get(0))
        .optional()?;
    if exists.is_none() {
        return Ok(false);
    }

    let sql = format!(
        "INSERT OR IGNORE INTO playlist_tracks (playlist_id, position, {TRACK_COLUMNS})
         VALUES (?1, (SELECT COALESCE(MAX(position), -1) + 1 FROM playlist_tracks WHERE playlist_id = ?1),
                 ?2, ?3, ?4, ?5, ?6, ?7)"
    );

    let inserted = conn.prepare_cached(&sql)?.execute(params![
        playlist_id,
        track.id,
        track.title,
        track.artist,
        track.album,
        track.duration as i64,
        track.thumbnail,
    ])?;

    if inserted > 0 {
        touch_playlist(conn, playlist_id)?;
    }

    Ok(inserted > 0)
}

/// Removes a track from a playlist, returning `false` if it was not there.
pub(crate) fn remove_track_from_playlist(
    conn: &Connection,
    playlist_id: &str,
    track_id: &str,
) -> Result<bool> {
    let removed = conn
        .prepare_cached("DELETE FROM playlist_tracks WHERE playlist_id = ?1 AND track_id = ?2")?
        .execute(params![playlist_id, track_id])?;

    if removed > 0 {
        touch_playlist(conn, playlist_id)?;
    }

    Ok(removed > 0)
}

fn touch_playlist(conn: &Connection, playlist_id: &str) -> Result<()> {
    conn.prepare_cached("UPDATE playlists SET updated_at = ?2 WHERE id = ?1")?
        .execute(params![playlist_id, unix_millis()])?;

    Ok(())
}

// Unique within the process thanks to the counter, and across runs thanks to
// the timestamp.
fn new_playlist_id(name: &str) -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);

    format!("{:016x}", xxh3_64(format!("{name}:{nanos}:{count}").as_bytes()))
}
