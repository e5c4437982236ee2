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

//! Render the playlists view.
//!
//! This module renders the stored playlists on the left and the tracks of the
//! highlighted playlist on the right.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem},
};

use crate::{
    components::{PlaylistsView, playlists::PlaylistsPane},
    render::{Render, RenderContext},
    theme::Theme,
};

impl Render for PlaylistsView {
    fn draw(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
            .split(area);

        let current_playlist_id = ctx.playback.modes().current_playlist_id.as_deref();

        let playlist_items: Vec<ListItem> = self
            .playlists
            .iter()
            .map(|p| {
                let marker = if current_playlist_id == Some(p.id.as_str()) {
                    "* "
                } else {
                    "  "
                };
                ListItem::new(format!("{}{} ({})", marker, p.name, p.tracks.len()))
            })
            .collect();

        let list_block = pane_block(
            " Playlists ",
            self.active_pane == PlaylistsPane::Playlists,
            ctx.theme,
        );

        let list = List::new(playlist_items)
            .block(list_block)
            .highlight_style(Style::default().bg(ctx.theme.highlight_bg).fg(Color::White))
            .highlight_symbol(">> ");

        f.render_stateful_widget(list, chunks[0], &mut self.list_state);

        let tracks_block = pane_block(
            " Tracks ",
            self.active_pane == PlaylistsPane::Tracks,
            ctx.theme,
        );
        let tracks_area = tracks_block.inner(chunks[1]);
        f.render_widget(tracks_block, chunks[1]);

        self.track_table.draw(f, tracks_area, ctx);
    }
}

fn pane_block<'a>(title: &'a str, is_active: bool, theme: &Theme) -> Block<'a> {
    let style = if is_active {
        Style::default()
            .fg(theme.accent_colour)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.border_colour)
    };

    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(style)
}
