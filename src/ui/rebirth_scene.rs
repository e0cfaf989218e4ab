use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::core::game_state::GameState;
use crate::rebirth::blackjack::Card;
use crate::rebirth::{potential_tokens, UpgradeId};
use crate::ui::UiState;

pub fn draw(frame: &mut Frame, area: Rect, state: &GameState, ui: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    draw_upgrades(frame, chunks[0], state, ui);
    match &ui.ceremony {
        Some(_) => draw_ceremony(frame, chunks[1], ui),
        None => draw_status(frame, chunks[1], state),
    }
}

fn draw_upgrades(frame: &mut Frame, area: Rect, state: &GameState, ui: &UiState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(format!(" Upgrades ({} tokens) ", state.rebirth_tokens));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();
    let max = inner.height as usize;

    for (i, id) in UpgradeId::all().iter().enumerate() {
        if lines.len() + 1 >= max {
            break;
        }
        let selected = i == ui.rebirth_index;
        let marker = if selected { "▶ " } else { "  " };
        let tier = state.upgrade_tier(*id);
        let cost = id.cost(tier);

        let (cost_text, color) = match cost {
            Some(c) if state.rebirth_tokens >= c => (format!("{c} tokens"), Color::Gray),
            Some(c) => (format!("{c} tokens"), Color::DarkGray),
            None => ("MAX".to_string(), Color::Green),
        };
        let style = if selected {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color)
        };

        lines.push(Line::from(vec![
            Span::styled(marker, style),
            Span::styled(
                format!("{} [{}/{}]  {}", id.name(), tier, id.max_tier(), cost_text),
                style,
            ),
        ]));
        lines.push(Line::from(Span::styled(
            format!("      {}", id.description(tier + 1)),
            Style::default().fg(Color::DarkGray),
        )));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_status(frame: &mut Frame, area: Rect, state: &GameState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(" Rebirth ");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let tokens = potential_tokens(state);
    let has_lebron = state.item_count("LeBron James") > 0;

    let mut lines = vec![
        Line::from(Span::styled(
            format!("  Net worth: {}", state.net_worth()),
            Style::default().fg(Color::Cyan),
        )),
        Line::from(Span::styled(
            format!("  Tokens on offer: {tokens}"),
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    if has_lebron {
        lines.push(Line::from(Span::styled(
            "  🏀 LeBron James is ready.",
            Style::default().fg(Color::Green),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "  You need LeBron James in your inventory to rebirth.",
            Style::default().fg(Color::Red),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Rebirthing resets your hoard but keeps tokens and upgrades.",
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(Span::styled(
        "  The dealer decides whether you keep the full award: [b] to sit down.",
        Style::default().fg(Color::DarkGray),
    )));

    frame.render_widget(Paragraph::new(lines), inner);
}

fn hand_line(label: &str, hand: &[Card], value: u32, color: Color) -> Line<'static> {
    let cards = hand
        .iter()
        .map(|c| format!("{}{}", c.rank.symbol(), c.suit.symbol()))
        .collect::<Vec<_>>()
        .join(" ");
    Line::from(vec![
        Span::styled(format!("  {label}: "), Style::default().fg(Color::Gray)),
        Span::styled(cards, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::styled(format!("  ({value})"), Style::default().fg(Color::DarkGray)),
    ])
}

fn draw_ceremony(frame: &mut Frame, area: Rect, ui: &UiState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" The Dealer's Table ");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let ceremony = match &ui.ceremony {
        Some(c) => c,
        None => return,
    };
    let game = &ceremony.game;

    let mut lines = vec![
        Line::from(Span::styled(
            format!("  Net worth at stake: {}", ceremony.net_worth_at_start),
            Style::default().fg(Color::Cyan),
        )),
        Line::from(""),
        hand_line("Dealer", &game.dealer, game.dealer_value(), Color::Red),
        hand_line("You", &game.player, game.player_value(), Color::Green),
        Line::from(""),
    ];

    match &ui.ceremony_result {
        Some((result, gained)) => {
            lines.push(Line::from(Span::styled(
                format!("  {}", result.message()),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                format!("  +{gained} rebirth tokens"),
                Style::default().fg(Color::Magenta),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "  [Enter] begin your next life",
                Style::default().fg(Color::Green),
            )));
        }
        None => {
            lines.push(Line::from(Span::styled(
                "  [h] hit   [s] stand",
                Style::default().fg(Color::Gray),
            )));
            lines.push(Line::from(Span::styled(
                "  Win for the full token award, anything else pays half.",
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    frame.render_widget(Paragraph::new(lines), inner);
}
