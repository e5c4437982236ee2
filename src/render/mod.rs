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

//! User interface rendering logic.
//!
//! This module handles the translation of the [`App`] state into visual
//! widgets using the `ratatui` framework. It is responsible for layout
//! management, widget styling, and terminal frame composition.
//!
//! # Rendering Pipeline
//!
//! The primary entry point is the [`draw`] function, which is called after
//! every processed event to provide a reactive user interface.

mod commander;
pub(crate) mod icons;
mod player;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Paragraph, Tabs},
};

use crate::{
    App,
    events::MainView,
    model::search::Search,
    playback::Playback,
    render::{commander::draw_commander, player::draw_player},
    theme::Theme,
};

const KEY_HINTS: &str =
    "1-4 views  / search  : command  space pause  n/b next/prev  a queue  x mark  q quit";

/// Read-only state shared by everything that renders.
pub(crate) struct RenderContext<'a> {
    pub(crate) theme: &'a Theme,
    pub(crate) playback: &'a Playback,
    pub(crate) search: &'a Search,
}

pub(crate) trait Render {
    fn draw(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext);
}

/// Renders the user interface to the terminal frame.
///
/// This function calculates the layout constraints and populates the frame
/// with widgets based on the current state of the [`App`].
///
/// It handles:
///
/// * **Layout**: Partitioning the screen into the view tabs, the active view,
///   the player and the footer.
/// * **State Mapping**: Converting application data (like the current queue)
///   into interactive widgets.
/// * **Styling**: Applying colors and borders defined in the application theme.
///
/// # Arguments
///
/// * `f` - The current terminal frame used for drawing.
/// * `app` - A mutable reference to the application state, allowing the UI
///   to reflect changes and update internal view state (like table scroll
///   positions).
pub(crate) fn draw(f: &mut Frame, app: &mut App) {
    let area = f.area();

    // Outer layout: tabs, main, player, footer
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(7),
            Constraint::Length(1),
        ])
        .split(area);

    draw_tabs(f, outer[0], app.main_view, &app.theme);

    let ctx = RenderContext {
        theme: &app.theme,
        playback: &app.playback,
        search: &app.search,
    };

    match app.main_view {
        MainView::Queue => app.queue_view.draw(f, outer[1], &ctx),
        MainView::Search => app.search_view.draw(f, outer[1], &ctx),
        MainView::Playlists => app.playlists_view.draw(f, outer[1], &ctx),
        MainView::History => app.history_view.draw(f, outer[1], &ctx),
    };

    draw_player(f, outer[2], &ctx);

    draw_footer(f, outer[3], app);
}

fn draw_tabs(f: &mut Frame, area: Rect, main_view: MainView, theme: &Theme) {
    let selected = match main_view {
        MainView::Queue => 0,
        MainView::Search => 1,
        MainView::Playlists => 2,
        MainView::History => 3,
    };

    let tabs = Tabs::new(["1 Queue", "2 Search", "3 Playlists", "4 History"])
        .style(Style::default().fg(theme.border_colour))
        .highlight_style(
            Style::default()
                .fg(theme.accent_colour)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);

    f.render_widget(tabs, area);
}

// The command line while typing, otherwise the latest notice or the key hints.
fn draw_footer(f: &mut Frame, area: Rect, app: &App) {
    if app.commander.active() {
        draw_commander(f, area, app);
        return;
    }

    let line = match app.playback.notices().current() {
        Some(notice) => Line::from(notice.message.as_str())
            .style(Style::default().fg(app.theme.notice_colour)),
        None => Line::from(KEY_HINTS).style(Style::default().fg(app.theme.border_colour)),
    };

    let footer = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1)])
        .horizontal_margin(1)
        .split(area);

    f.render_widget(Paragraph::new(line), footer[0]);
}
