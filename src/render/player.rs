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

//! Render the music player interface.
//!
//! This module renders the visual representation of the current track, the
//! playback modes, the volume and the progress bar.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Padding, Paragraph},
};

use crate::{
    model::RepeatMode,
    playback::PlaybackState,
    render::{
        RenderContext,
        icons::{
            ICON_LOADING, ICON_MUTED, ICON_PAUSE, ICON_PLAY, ICON_REPEAT, ICON_REPEAT_ONE,
            ICON_SHUFFLE, ICON_STOP, ICON_VOLUME_HIGH, ICON_VOLUME_LOW, ICON_VOLUME_MEDIUM,
        },
    },
    theme::Theme,
    util::format::format_time,
};

/// Renders the main player widget including track info and controls.
pub(crate) fn draw_player(f: &mut Frame, area: Rect, ctx: &RenderContext) {
    let theme = ctx.theme;
    let state = ctx.playback.state();

    let block = Block::default()
        .borders(Borders::TOP | Borders::BOTTOM)
        .border_style(Style::default().fg(theme.border_colour))
        .padding(Padding::horizontal(1));

    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner_area);

    let info_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(30)])
        .split(chunks[0]);

    let bold = Style::default().add_modifier(Modifier::BOLD);

    match &state.current {
        Some(track) => {
            let track_line = Line::from(vec![
                Span::styled(format!(" {} ", state_icon(state)), bold).fg(Color::White),
                Span::styled(&track.title, bold).fg(theme.accent_colour),
                Span::raw(" by "),
                Span::styled(&track.artist, bold).fg(theme.accent_colour),
            ]);
            f.render_widget(Paragraph::new(track_line), info_chunks[0]);

            let time = state.position.max(0.0) as u64;
            let duration = if state.duration > 0.0 {
                state.duration as u64
            } else {
                track.duration
            };
            let remaining = duration.saturating_sub(time);

            let time_line = Line::from(vec![
                Span::styled(format_time(time), bold).fg(theme.accent_colour),
                Span::styled(" / ", bold).fg(Color::White),
                Span::styled(format_time(duration), bold).fg(theme.accent_colour),
                Span::styled(" (-", bold).fg(Color::White),
                Span::styled(format_time(remaining), bold).fg(theme.accent_colour),
                Span::styled(")", bold).fg(Color::White),
            ]);
            f.render_widget(
                Paragraph::new(time_line).alignment(Alignment::Right),
                info_chunks[1],
            );

            let detail = if state.loading {
                "Loading...".to_string()
            } else {
                track.album.clone().unwrap_or_default()
            };
            f.render_widget(
                Paragraph::new(detail).fg(theme.table_album_fg),
                chunks[1],
            );
        }

        None => {
            let idle = Line::from(vec![
                Span::styled(format!(" {} ", ICON_STOP), bold).fg(Color::White),
                Span::raw("Nothing playing"),
            ]);
            f.render_widget(Paragraph::new(idle), info_chunks[0]);
        }
    }

    let control_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(28)])
        .split(chunks[2]);

    f.render_widget(Paragraph::new(modes_line(ctx)), control_chunks[0]);

    draw_volume(f, control_chunks[1], state, theme);

    let position = if state.duration > 0.0 {
        (state.position / state.duration).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let position_gauge = Gauge::default()
        .gauge_style(
            Style::default()
                .fg(theme.accent_colour)
                .bg(theme.gauge_track_colour),
        )
        .ratio(position)
        .label("")
        .use_unicode(true);

    f.render_widget(position_gauge, chunks[4]);
}

fn state_icon(state: &PlaybackState) -> &'static str {
    if state.loading || state.transitioning {
        ICON_LOADING
    } else if state.playing {
        ICON_PLAY
    } else {
        ICON_PAUSE
    }
}

// Mode flags, dimmed when off, followed by the prefetch cache counters.
fn modes_line<'a>(ctx: &RenderContext<'a>) -> Line<'a> {
    let theme = ctx.theme;
    let modes = ctx.playback.modes();

    let flag = |label: String, on: bool| {
        let colour = if on { theme.accent_colour } else { theme.border_colour };
        Span::styled(format!("{}  ", label), Style::default().fg(colour))
    };

    let repeat = match modes.repeat {
        RepeatMode::Off => format!("{} off", ICON_REPEAT),
        RepeatMode::All => format!("{} all", ICON_REPEAT),
        RepeatMode::One => format!("{} one", ICON_REPEAT_ONE),
    };

    let stats = ctx.playback.cache_stats();

    Line::from(vec![
        flag(format!("{} shuffle", ICON_SHUFFLE), modes.shuffle),
        flag(repeat, modes.repeat != RepeatMode::Off),
        flag("autoplay".to_string(), modes.autoplay),
        flag("radio".to_string(), modes.radio),
        flag("adblock".to_string(), ctx.playback.ad_block()),
        Span::styled(
            format!(
                "cache {}/{} ({} downloading)",
                stats.ready, stats.total, stats.downloading
            ),
            Style::default().fg(theme.table_time_fg),
        ),
    ])
}

fn draw_volume(f: &mut Frame, area: Rect, state: &PlaybackState, theme: &Theme) {
    let volume_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(6),
        ])
        .split(area);

    let icon = match state.volume {
        _ if state.muted => ICON_MUTED,
        0..=33 => ICON_VOLUME_LOW,
        34..=66 => ICON_VOLUME_MEDIUM,
        _ => ICON_VOLUME_HIGH,
    };
    f.render_widget(Paragraph::new(icon), volume_layout[0]);

    let vol_ratio = if state.muted {
        0.0
    } else {
        (f64::from(state.volume) / 100.0).clamp(0.0, 1.0)
    };

    let volume_gauge = Gauge::default()
        .gauge_style(
            Style::default()
                .fg(theme.accent_colour)
                .bg(theme.gauge_track_colour),
        )
        .ratio(vol_ratio)
        .label("")
        .use_unicode(true);
    f.render_widget(volume_gauge, volume_layout[1]);

    let volume_label = Paragraph::new(format!(" {}%", state.volume))
        .alignment(Alignment::Right)
        .fg(Color::White);
    f.render_widget(volume_label, volume_layout[2]);
}
