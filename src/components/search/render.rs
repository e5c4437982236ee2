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

//! UI rendering logic for the search view.

use std::fmt::Write;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    prelude::Rect,
    style::Style,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::{
    components::SearchView,
    render::{Render, RenderContext},
};

impl Render for SearchView {
    fn draw(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0)])
            .split(area);

        let header_block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(ctx.theme.border_colour))
            .padding(Padding::horizontal(1));

        let search = ctx.search;
        let mut header_text = if search.query().is_empty() {
            "Search".to_string()
        } else {
            format!("Search | {}", search.query())
        };

        if search.in_flight() {
            header_text.push_str(" | searching...");
        } else if !search.query().is_empty() {
            let _ = write!(header_text, " | {} results", self.track_table.tracks().len());
        }

        let selected_count = self.track_table.selected_count();
        if selected_count > 0 {
            let _ = write!(header_text, " | {} selected", selected_count);
        }

        let header = Paragraph::new(header_text).block(header_block);

        f.render_widget(header, chunks[0]);
        self.track_table.draw(f, chunks[1], ctx);
    }
}
