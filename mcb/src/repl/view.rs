//! Transcript rendering for the terminal

use std::io::{self, Write};

use chrono::Local;
use colored::Colorize;
use crossterm::cursor::MoveToColumn;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};

use crate::config::UiConfig;
use crate::transcript::{Role, Turn};

/// Render the app header: title, tagline, today's date and model
pub fn render_header(ui: &UiConfig, model: &str) -> String {
    let today = Local::now().format("%A, %d %B %Y");
    format!(
        "\n{}\n{}\n{}\n",
        ui.title.bright_cyan().bold(),
        ui.tagline,
        format!("{} · {}", today, model).dimmed()
    )
}

/// Render one turn as a role-tagged bubble
pub fn render_turn(turn: &Turn) -> String {
    let label = match turn.role {
        Role::User => "🧑 You".bright_green().bold(),
        Role::Model => "🤖 Bot".bright_blue().bold(),
    };

    let mut out = format!("{}\n", label);
    for line in turn.content.lines() {
        out.push_str("  ");
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Render a run of turns top-to-bottom
pub fn render_turns(turns: &[Turn]) -> String {
    turns.iter().map(render_turn).collect::<Vec<_>>().join("\n")
}

/// Wipe the line the cursor is on (used to remove the thinking indicator)
pub fn clear_current_line<W: Write>(out: &mut W) -> io::Result<()> {
    queue!(out, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
    out.flush()
}
