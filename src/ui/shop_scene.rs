use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::core::game_state::GameState;
use crate::loot::open::crate_cost;
use crate::ui::{shop_listing, UiState};

pub fn draw(frame: &mut Frame, area: Rect, state: &GameState, ui: &UiState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Crate Shop ");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let listing = shop_listing(state);
    let mut lines: Vec<Line> = Vec::new();

    let discount = listing
        .first()
        .map(|ct| ct.shop_value() - crate_cost(state, *ct))
        .unwrap_or(0);
    if discount > 0 {
        lines.push(Line::from(Span::styled(
            "  Discounts active!",
            Style::default().fg(Color::Green),
        )));
    }

    for (i, crate_type) in listing.iter().enumerate() {
        let selected = i == ui.shop_index;
        let marker = if selected { "▶ " } else { "  " };
        let cost = crate_cost(state, *crate_type);
        let affordable = state.coins >= cost;
        let color = if !affordable {
            Color::DarkGray
        } else if selected {
            Color::Yellow
        } else {
            Color::Gray
        };
        let style = if selected {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color)
        };
        lines.push(Line::from(vec![
            Span::styled(marker, style),
            Span::styled(
                format!(
                    "{} {}  {} coins",
                    crate_type.emoji(),
                    crate_type.display_name(),
                    cost
                ),
                style,
            ),
            Span::styled(
                format!("  (owned: {})", state.crate_count(*crate_type)),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Pull a rarer crate from a lesser one to unlock new stock.",
        Style::default().fg(Color::DarkGray),
    )));

    frame.render_widget(Paragraph::new(lines), inner);
}
