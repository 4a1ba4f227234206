//! Marquee palette and the styles screens share.

use ratatui::style::{Color, Modifier, Style};

// ── Palette ───────────────────────────────────────────────────────────

pub const MARQUEE_GOLD: Color = Color::Rgb(255, 196, 61); // #ffc43d
pub const NEON_CYAN: Color = Color::Rgb(128, 255, 234); // #80ffea
pub const VELVET_RED: Color = Color::Rgb(214, 64, 99); // #d64063
pub const SUCCESS_GREEN: Color = Color::Rgb(80, 250, 123); // #50fa7b
pub const ERROR_RED: Color = Color::Rgb(255, 99, 99); // #ff6363

pub const DIM_WHITE: Color = Color::Rgb(189, 193, 207); // #bdc1cf
pub const BORDER_GRAY: Color = Color::Rgb(98, 114, 164); // #6272a4
pub const BG_HIGHLIGHT: Color = Color::Rgb(40, 42, 54); // #282a36
pub const BG_DARK: Color = Color::Rgb(30, 31, 41); // #1e1f29

// ── Styles ────────────────────────────────────────────────────────────

pub fn title_style() -> Style {
    Style::default().fg(MARQUEE_GOLD).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(MARQUEE_GOLD)
}

pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

pub fn table_header() -> Style {
    Style::default()
        .fg(NEON_CYAN)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

pub fn table_row() -> Style {
    Style::default().fg(DIM_WHITE)
}

pub fn table_selected() -> Style {
    Style::default()
        .fg(MARQUEE_GOLD)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

/// Theater names heading each group in the grid.
pub fn theater_name() -> Style {
    Style::default().fg(VELVET_RED).add_modifier(Modifier::BOLD)
}

/// Rated movies in gold, unrated dimmed.
pub fn rating(rated: bool) -> Style {
    if rated {
        Style::default().fg(MARQUEE_GOLD)
    } else {
        Style::default().fg(BORDER_GRAY)
    }
}

pub fn error_text() -> Style {
    Style::default().fg(ERROR_RED)
}

pub fn key_hint() -> Style {
    Style::default().fg(BORDER_GRAY)
}

pub fn key_hint_key() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}
