use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::core::game_state::GameState;
use crate::items::catalog;
use crate::ui::{rarity_color, InventoryPane, UiState};

pub fn draw(frame: &mut Frame, area: Rect, state: &GameState, ui: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    draw_items(frame, chunks[0], state, ui);
    draw_potions(frame, chunks[1], state, ui);
}

/// Item names with at least one copy, in map order.
pub fn owned_items(state: &GameState) -> Vec<String> {
    state
        .inventory
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(name, _)| name.clone())
        .collect()
}

pub fn owned_potions(state: &GameState) -> Vec<String> {
    state
        .potions
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(name, _)| name.clone())
        .collect()
}

fn draw_items(frame: &mut Frame, area: Rect, state: &GameState, ui: &UiState) {
    let focused = ui.inventory_pane == InventoryPane::Items;
    let border = if focused { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(format!(" Items ({} discovered) ", state.discovered_items.len()));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let names = owned_items(state);
    let mut lines: Vec<Line> = Vec::new();

    if names.is_empty() {
        lines.push(Line::from(Span::styled(
            "  Nothing yet. Open some crates.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let max = inner.height as usize;
    for (i, name) in names.iter().enumerate() {
        if lines.len() >= max {
            break;
        }
        let selected = focused && i == ui.item_index;
        let marker = if selected { "▶ " } else { "  " };
        let def = catalog::item_def(name);
        let color = def.map(|d| rarity_color(d.rarity)).unwrap_or(Color::Gray);
        let emoji = def.map(|d| d.emoji).unwrap_or("❔");

        let mut tags = String::new();
        if state.equipped_weapon.as_deref() == Some(name.as_str()) {
            tags.push_str(" [weapon]");
        }
        if state.equipped_armor.as_deref() == Some(name.as_str()) {
            tags.push_str(" [armor]");
        }

        let style = if selected {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color)
        };
        lines.push(Line::from(vec![
            Span::styled(marker, style),
            Span::styled(
                format!("{emoji} {name} x{}", state.item_count(name)),
                style,
            ),
            Span::styled(tags, Style::default().fg(Color::Green)),
            Span::styled(
                format!("  sells {}", catalog::item_sell_value(name)),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_potions(frame: &mut Frame, area: Rect, state: &GameState, ui: &UiState) {
    let focused = ui.inventory_pane == InventoryPane::Potions;
    let border = if focused { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(format!(
            " Potions ({} discovered) ",
            state.discovered_potions.len()
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let names = owned_potions(state);
    let mut lines: Vec<Line> = Vec::new();

    if names.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No potions brewed or found.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let max = inner.height as usize;
    for (i, name) in names.iter().enumerate() {
        if lines.len() >= max {
            break;
        }
        let selected = focused && i == ui.potion_index;
        let marker = if selected { "▶ " } else { "  " };
        let def = catalog::potion_def(name);
        let color = def.map(|d| rarity_color(d.rarity)).unwrap_or(Color::Gray);
        let emoji = def.map(|d| d.emoji).unwrap_or("🧪");
        let brawl_tag = def
            .filter(|d| d.effect.is_brawl_only())
            .map(|_| " [brawl]")
            .unwrap_or("");

        let style = if selected {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color)
        };
        lines.push(Line::from(vec![
            Span::styled(marker, style),
            Span::styled(
                format!("{emoji} {name} x{}", state.potion_count(name)),
                style,
            ),
            Span::styled(brawl_tag, Style::default().fg(Color::Red)),
            Span::styled(
                format!("  sells {}", catalog::potion_sell_value(name)),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}
