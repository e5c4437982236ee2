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

//! UI rendering logic for the track table.
//!
//! This module handles the visual representation of track data, including
//! column layout, selection and cache markers, and theme application using
//! the Ratatui widget system.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::Line,
    widgets::{Block, Cell, Paragraph, Row, Table},
};

use crate::{
    components::TrackTable,
    render::{
        Render, RenderContext,
        icons::{ICON_CACHED, ICON_DOWNLOADING, ICON_PLAY},
    },
    util::format::format_duration,
};

impl Render for TrackTable {
    fn draw(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        if self.tracks.is_empty() {
            let placeholder = Paragraph::new(self.placeholder)
                .alignment(Alignment::Center)
                .fg(ctx.theme.border_colour);
            f.render_widget(placeholder, area);
            return;
        }

        // Header row plus its margin
        self.page_size = usize::from(area.height.saturating_sub(2)).max(1);

        self.draw_table(f, area, ctx);
    }
}

impl TrackTable {
    fn draw_table(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let theme = ctx.theme;
        let playback = ctx.playback;
        let current_id = playback.state().current.as_ref().map(|t| t.id.as_str());

        let rows = self.tracks.iter().map(|item| {
            let selection_indicator = if self.selection.contains(&item.id) {
                Line::from("+").style(Style::default().fg(Color::Black).bg(theme.accent_colour))
            } else {
                Line::from("")
            };

            let is_current = current_id == Some(item.id.as_str());
            let status = if is_current {
                Line::from(ICON_PLAY).fg(theme.accent_colour)
            } else if playback.is_cached(&item.id) {
                Line::from(ICON_CACHED).fg(theme.cached_colour)
            } else if playback.is_caching(&item.id) {
                Line::from(ICON_DOWNLOADING).fg(theme.table_time_fg)
            } else {
                Line::from("")
            };

            let title_style = if is_current {
                Style::default()
                    .fg(theme.accent_colour)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.table_track_fg)
            };

            Row::new(vec![
                Cell::from(selection_indicator),
                Cell::from(status),
                Cell::from(
                    Line::from(format_duration(item.duration))
                        .style(Style::default().fg(theme.table_time_fg))
                        .alignment(Alignment::Right),
                ),
                Cell::from(""),
                Cell::from(Line::from(item.title.as_str()).style(title_style)),
                Cell::from(
                    Line::from(item.artist.as_str()).style(Style::default().fg(theme.table_artist_fg)),
                ),
                Cell::from(
                    Line::from(item.album.as_deref().unwrap_or(""))
                        .style(Style::default().fg(theme.table_album_fg)),
                ),
            ])
        });

        let table = Table::new(
            rows,
            [
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Length(8),
                Constraint::Length(1),
                Constraint::Percentage(50),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
            ],
        )
        .header(
            Row::new(vec![
                Cell::from(""),
                Cell::from(""),
                Cell::from(Line::from("Time").alignment(Alignment::Right)),
                Cell::from(""),
                Cell::from("Title"),
                Cell::from("Artist"),
                Cell::from("Album"),
            ])
            .style(Style::default().bold().fg(theme.accent_colour))
            .bottom_margin(1),
        )
        .row_highlight_style(Style::default().bg(theme.highlight_bg).fg(Color::White))
        .block(Block::default());

        f.render_stateful_widget(table, area, &mut self.table_state);
    }
}
