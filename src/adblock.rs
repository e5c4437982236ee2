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

//! Heuristic detection of ad-like tracks.
//!
//! A track is treated as an ad if it is very short (under six seconds), or if
//! it is short (under fifteen seconds) and its title contains an ad related
//! word. This is a heuristic only, legitimate very short tracks will be
//! flagged too.

use crate::model::Track;

const KEYWORD_MAX_DURATION: u64 = 15;
const ALWAYS_AD_DURATION: u64 = 6;

const AD_KEYWORDS: &[&str] = &[
    "ad",
    "ads",
    "advert",
    "advertisement",
    "commercial",
    "sponsored",
    "promo",
    "promotion",
];

#[derive(Debug, Clone, Copy)]
pub(crate) struct AdFilter {
    enabled: bool,
}

impl AdFilter {
    pub(crate) fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn is_ad(&self, track: &Track) -> bool {
        if !self.enabled {
            return false;
        }

        let duration = track.duration;

        if duration > 0 && duration < ALWAYS_AD_DURATION {
            return true;
        }

        duration < KEYWORD_MAX_DURATION && has_ad_keyword(&track.title)
    }

    /// Drops ad-like tracks from a result list.
    pub(crate) fn filter(&self, tracks: Vec<Track>) -> Vec<Track> {
        tracks.into_iter().filter(|t| !self.is_ad(t)).collect()
    }
}

// Whole word match, so "Adele" or "Road" do not count.
fn has_ad_keyword(title: &str) -> bool {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .any(|word| {
            let word = word.to_lowercase();
            AD_KEYWORDS.contains(&word.as_str())
        })
}
