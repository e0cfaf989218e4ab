use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::core::game_state::GameState;
use crate::ui::{owned_crates, UiState};

/// The crate stash: everything waiting to be opened, plus the free
/// crate queue.
pub fn draw(frame: &mut Frame, area: Rect, state: &GameState, ui: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    draw_stash(frame, chunks[0], state, ui);
    draw_free_queue(frame, chunks[1], state);
}

fn draw_stash(frame: &mut Frame, area: Rect, state: &GameState, ui: &UiState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Crates ");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let crates = owned_crates(state);
    let mut lines: Vec<Line> = Vec::new();

    if crates.is_empty() {
        lines.push(Line::from(Span::styled(
            "  The stash is empty. Buy crates in the shop or wait for a free one.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    for (i, crate_type) in crates.iter().enumerate() {
        let count = state.crate_count(*crate_type);
        let selected = i == ui.hoard_index;
        let marker = if selected { "▶ " } else { "  " };
        let style = if selected {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(Line::from(vec![
            Span::styled(marker, style),
            Span::styled(
                format!(
                    "{} {} x{}",
                    crate_type.emoji(),
                    crate_type.display_name(),
                    count
                ),
                style,
            ),
            Span::styled(
                format!("  (worth {} each)", crate_type.shop_value()),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_free_queue(frame: &mut Frame, area: Rect, state: &GameState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(" Free Crates ");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![Line::from(Span::styled(
        format!(
            "Next crate in {}s (delay {}s)",
            state.free_crate_timer.ceil() as i64,
            state.next_crate_delay as i64
        ),
        Style::default().fg(Color::Green),
    ))];

    if state.free_crates_to_claim.is_empty() {
        lines.push(Line::from(Span::styled(
            "Nothing waiting.",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            format!("{} waiting, [c] to claim:", state.free_crates_to_claim.len()),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )));
        let max = inner.height.saturating_sub(2) as usize;
        for crate_type in state.free_crates_to_claim.iter().take(max) {
            lines.push(Line::from(Span::styled(
                format!("  {} {}", crate_type.emoji(), crate_type.display_name()),
                Style::default().fg(Color::Gray),
            )));
        }
    }

    frame.render_widget(Paragraph::new(lines), inner);
}
