use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::core::game_state::{GameState, StakeKind};
use crate::items::catalog;
use crate::ui::{rarity_color, stakeable, UiState};

pub fn draw(frame: &mut Frame, area: Rect, state: &GameState, ui: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    draw_stakeable(frame, chunks[0], state, ui);
    draw_selection(frame, chunks[1], state);
}

fn draw_stakeable(frame: &mut Frame, area: Rect, state: &GameState, ui: &UiState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Your Things ");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let entries = stakeable(state);
    let mut lines: Vec<Line> = Vec::new();

    if entries.is_empty() {
        lines.push(Line::from(Span::styled(
            "  Nothing to stake but coins.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let max = inner.height as usize;
    for (i, (name, kind, count)) in entries.iter().enumerate() {
        if lines.len() >= max {
            break;
        }
        let selected = i == ui.gamble_index;
        let marker = if selected { "▶ " } else { "  " };
        let (color, value) = match kind {
            StakeKind::Item => (
                catalog::item_def(name)
                    .map(|d| rarity_color(d.rarity))
                    .unwrap_or(Color::Gray),
                catalog::item_sell_value(name),
            ),
            StakeKind::Potion => (
                catalog::potion_def(name)
                    .map(|d| rarity_color(d.rarity))
                    .unwrap_or(Color::Gray),
                catalog::potion_sell_value(name),
            ),
        };
        let style = if selected {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color)
        };
        lines.push(Line::from(vec![
            Span::styled(marker, style),
            Span::styled(format!("{name} x{count}"), style),
            Span::styled(
                format!("  (worth {value})"),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_selection(frame: &mut Frame, area: Rect, state: &GameState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(" On the Line ");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();
    let selection = &state.gamble;

    if selection.is_empty() {
        lines.push(Line::from(Span::styled(
            "  Nothing staked. Pick something, or go all in.",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        if selection.all_in {
            lines.push(Line::from(Span::styled(
                "  ALL IN! Triple or nothing, fair coin.",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )));
        }
        if selection.coins > 0 {
            lines.push(Line::from(Span::styled(
                format!("  {} coins", selection.coins),
                Style::default().fg(Color::Yellow),
            )));
        }
        for stake in &selection.stakes {
            lines.push(Line::from(Span::styled(
                format!("  {} x{}", stake.name, stake.amount),
                Style::default().fg(Color::Gray),
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  Total value: {} coins", selection.value()),
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        )));
    }

    lines.push(Line::from(""));
    if state.high_stakes().is_some() && !selection.all_in {
        lines.push(Line::from(Span::styled(
            "  High stakes brew active: bigger wins, double losses.",
            Style::default().fg(Color::Red),
        )));
    }
    if state.coin_flip_redos > 0 {
        lines.push(Line::from(Span::styled(
            format!("  Second chances left this life: {}", state.coin_flip_redos),
            Style::default().fg(Color::Green),
        )));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}
