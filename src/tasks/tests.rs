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

use std::{sync::mpsc, time::Duration};

use tempfile::TempDir;

use super::*;
use crate::{
    catalog::{CatalogError, PlaylistListing, catalog_url},
    db,
    model::Playlist,
};

const WAIT: Duration = Duration::from_secs(5);

struct StubCatalog;

impl Catalog for StubCatalog {
    fn search(&self, query: &str, _limit: usize) -> Result<Vec<Track>, CatalogError> {
        if query == "fail" {
            return Err(CatalogError::Failed {
                status: "exit status: 1".to_string(),
                stderr: "offline".to_string(),
            });
        }
        Ok(vec![Track::new("s1", query, "Artist", 200)])
    }

    fn resolve_stream_url(&self, track_id: &str) -> Result<String, CatalogError> {
        match track_id {
            "good" => Ok("https://cdn.example/good".to_string()),
            _ => Err(CatalogError::NoStream(track_id.to_string())),
        }
    }

    fn mix(&self, seed_id: &str, _limit: usize) -> Result<Vec<Track>, CatalogError> {
        Ok(vec![
            Track::new(seed_id, "Seed", "Artist", 200),
            Track::new("m1", "Related", "Artist", 210),
        ])
    }

    fn playlist(&self, playlist_id: &str) -> Result<PlaylistListing, CatalogError> {
        match playlist_id {
            "PLfull" => Ok(PlaylistListing {
                title: Some("Road Trip".to_string()),
                tracks: vec![
                    Track::new("p1", "One", "Artist", 200),
                    Track::new("p2", "Two", "Artist", 210),
                ],
            }),
            "PLempty" => Ok(PlaylistListing::default()),
            _ => Err(CatalogError::Failed {
                status: "exit status: 1".to_string(),
                stderr: "not found".to_string(),
            }),
        }
    }
}

struct Fixture {
    _dir: TempDir,
    conn: Connection,
    catalog: Arc<dyn Catalog>,
    event_tx: Sender<AppEvent>,
    event_rx: Receiver<AppEvent>,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let conn = db::init_db(&dir.path().join("test.db")).unwrap();
        let (event_tx, event_rx) = mpsc::channel();

        Self {
            _dir: dir,
            conn,
            catalog: Arc::new(StubCatalog),
            event_tx,
            event_rx,
        }
    }

    fn run(&mut self, task: AppTask) {
        let mut ctx = TaskContext {
            catalog: &self.catalog,
            event_tx: &self.event_tx,
            conn: &mut self.conn,
        };
        handle_task(task, &mut ctx).unwrap();
    }

    fn next_event(&self) -> AppEvent {
        self.event_rx.recv_timeout(WAIT).unwrap()
    }

    // Skips notices, returning the next playlist listing.
    fn next_playlists(&self) -> Vec<Playlist> {
        loop {
            match self.next_event() {
                AppEvent::PlaylistsLoaded(playlists) => return playlists,
                AppEvent::Notice(_) => continue,
                other => panic!("unexpected event {:?}", other),
            }
        }
    }
}

#[test]
fn resolved_stream_is_returned_with_its_token() {
    let mut fx = Fixture::new();

    fx.run(AppTask::ResolveStream {
        token: 7,
        track_id: "good".to_string(),
    });

    match fx.next_event() {
        AppEvent::StreamResolved {
            token,
            track_id,
            source,
        } => {
            assert_eq!(token, 7);
            assert_eq!(track_id, "good");
            assert_eq!(source, "https://cdn.example/good");
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[test]
fn failed_resolution_falls_back_to_catalog_url() {
    let mut fx = Fixture::new();

    fx.run(AppTask::ResolveStream {
        token: 3,
        track_id: "bad".to_string(),
    });

    match fx.next_event() {
        AppEvent::StreamResolved { source, .. } => assert_eq!(source, catalog_url("bad")),
        other => panic!("unexpected event {:?}", other),
    }
}

#[test]
fn recommendations_carry_purpose_and_exclude_seed() {
    let mut fx = Fixture::new();

    fx.run(AppTask::FetchRecommendations {
        token: 11,
        seed_id: "seed".to_string(),
        limit: 5,
        purpose: RecommendationPurpose::Radio { advance: 2 },
    });

    match fx.next_event() {
        AppEvent::RecommendationsReady {
            token,
            seed_id,
            purpose,
            tracks,
        } => {
            assert_eq!(token, 11);
            assert_eq!(seed_id, "seed");
            assert_eq!(purpose, RecommendationPurpose::Radio { advance: 2 });
            let ids: Vec<&str> = tracks.iter().map(|t| t.id.as_str()).collect();
            assert_eq!(ids, ["m1"]);
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[test]
fn search_results_and_failures() {
    let mut fx = Fixture::new();

    fx.run(AppTask::Search {
        query: "jazz".to_string(),
        limit: 10,
    });
    match fx.next_event() {
        AppEvent::SearchResultsReady { query, tracks } => {
            assert_eq!(query, "jazz");
            assert_eq!(tracks.len(), 1);
        }
        other => panic!("unexpected event {:?}", other),
    }

    fx.run(AppTask::Search {
        query: "fail".to_string(),
        limit: 10,
    });
    match fx.next_event() {
        AppEvent::SearchFailed { query, message } => {
            assert_eq!(query, "fail");
            assert!(message.contains("offline"));
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[test]
fn history_is_saved_and_loaded() {
    let mut fx = Fixture::new();
    let history = vec![
        Track::new("a", "A", "Artist", 100),
        Track::new("b", "B", "Artist", 100),
    ];

    fx.run(AppTask::SaveHistory(history.clone()));
    fx.run(AppTask::LoadHistory);

    match fx.next_event() {
        AppEvent::HistoryLoaded(loaded) => assert_eq!(loaded, history),
        other => panic!("unexpected event {:?}", other),
    }
}

#[test]
fn playlist_tasks_reload_playlists() {
    let mut fx = Fixture::new();

    fx.run(AppTask::CreatePlaylist("Road trip".to_string()));
    let playlists = fx.next_playlists();
    assert_eq!(playlists.len(), 1);
    let playlist_id = playlists[0].id.clone();

    let tracks = vec![
        Track::new("a", "A", "Artist", 100),
        Track::new("b", "B", "Artist", 100),
    ];
    fx.run(AppTask::AddToPlaylist {
        playlist_id: playlist_id.clone(),
        tracks: tracks.clone(),
    });
    assert_eq!(fx.next_playlists()[0].tracks, tracks);

    // Adding the same tracks again changes nothing
    fx.run(AppTask::AddToPlaylist {
        playlist_id: playlist_id.clone(),
        tracks: tracks.clone(),
    });
    assert_eq!(fx.next_playlists()[0].tracks.len(), 2);

    fx.run(AppTask::RemoveFromPlaylist {
        playlist_id: playlist_id.clone(),
        track_id: "a".to_string(),
    });
    assert_eq!(fx.next_playlists()[0].tracks, tracks[1..]);

    fx.run(AppTask::RenamePlaylist {
        playlist_id: playlist_id.clone(),
        name: "Commute".to_string(),
    });
    assert_eq!(fx.next_playlists()[0].name, "Commute");

    fx.run(AppTask::DeletePlaylist(playlist_id));
    assert!(fx.next_playlists().is_empty());
}

#[test]
fn imported_playlist_is_fetched_then_saved() {
    let mut fx = Fixture::new();

    fx.run(AppTask::ImportPlaylist {
        playlist_id: "PLfull".to_string(),
        name: None,
    });
    let (name, tracks) = match fx.next_event() {
        AppEvent::PlaylistFetched { name, tracks } => (name, tracks),
        other => panic!("unexpected event {:?}", other),
    };
    assert_eq!(name, "Road Trip");
    assert_eq!(tracks.len(), 2);

    fx.run(AppTask::SaveImportedPlaylist { name, tracks });
    match fx.next_event() {
        AppEvent::Notice(message) => assert_eq!(message, "Imported 2 tracks into Road Trip"),
        other => panic!("unexpected event {:?}", other),
    }
    let playlists = fx.next_playlists();
    assert_eq!(playlists.len(), 1);
    assert_eq!(playlists[0].name, "Road Trip");
    let ids: Vec<&str> = playlists[0].tracks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["p1", "p2"]);
}

#[test]
fn import_name_overrides_catalog_title() {
    let mut fx = Fixture::new();

    fx.run(AppTask::ImportPlaylist {
        playlist_id: "PLfull".to_string(),
        name: Some("Mine".to_string()),
    });
    assert!(matches!(
        fx.next_event(),
        AppEvent::PlaylistFetched { name, .. } if name == "Mine"
    ));
}

#[test]
fn empty_or_failed_imports_only_notify() {
    let mut fx = Fixture::new();

    fx.run(AppTask::ImportPlaylist {
        playlist_id: "PLempty".to_string(),
        name: None,
    });
    match fx.next_event() {
        AppEvent::Notice(message) => {
            assert_eq!(message, "Could not fetch playlist or playlist is empty")
        }
        other => panic!("unexpected event {:?}", other),
    }

    fx.run(AppTask::ImportPlaylist {
        playlist_id: "PLgone".to_string(),
        name: None,
    });
    match fx.next_event() {
        AppEvent::Notice(message) => assert!(message.starts_with("Import failed:")),
        other => panic!("unexpected event {:?}", other),
    }

    assert!(db::fetch_playlists(&fx.conn).unwrap().is_empty());
}
