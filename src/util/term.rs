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

//! Terminal emulator control through OSC escape sequences.
//!
//! Used for the window background colour and for showing the current track in
//! the terminal window title. Terminals that do not understand a sequence
//! simply ignore it, so every function here is best effort.

use std::io::{self, Write};

fn write_osc(sequence: &str) {
    let mut stdout = io::stdout();
    let _ = write!(stdout, "\x1b]{}\x07", sequence);
    let _ = stdout.flush();
}

/// Sets the terminal background colour (OSC 11), e.g. `"#1e1e1e"`.
pub(crate) fn set_terminal_bg(hex_colour: &str) {
    write_osc(&format!("11;{}", hex_colour));
}

/// Reverts the background to the user's configured colour (OSC 111).
pub(crate) fn reset_terminal_bg() {
    write_osc("111");
}

/// Sets the terminal window title (OSC 2).
pub(crate) fn set_window_title(title: &str) {
    // Control characters would terminate the sequence early.
    let title: String = title.chars().filter(|c| !c.is_control()).collect();
    write_osc(&format!("2;{}", title));
}
