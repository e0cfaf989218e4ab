use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::brawl::logic::{cooldown_remaining_ms, max_starting_stage, tavern_unlocked};
use crate::brawl::types::{
    BrawlLogKind, BrawlOutcome, BrawlPhase, BrawlRarity, BrawlReward, BrawlState, EffectSet,
    TavernUnlock,
};
use crate::core::constants::TAVERN_FINAL_STAGE;
use crate::core::game_state::{GameState, StakeKind};
use crate::ui::{brawl_consumables, format_ms, UiState};

pub fn draw(frame: &mut Frame, area: Rect, state: &GameState, ui: &UiState) {
    match &state.active_brawl {
        Some(brawl) => draw_brawl(frame, area, state, brawl, ui),
        None => draw_select(frame, area, state, ui),
    }
}

fn draw_select(frame: &mut Frame, area: Rect, state: &GameState, ui: &UiState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Taverns ");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let now_ms = Utc::now().timestamp_millis();
    let mut lines: Vec<Line> = Vec::new();

    for (i, rarity) in BrawlRarity::all().iter().enumerate() {
        let selected = i == ui.tavern_index;
        let marker = if selected { "▶ " } else { "  " };
        let unlocked = tavern_unlocked(state, *rarity);
        let cooldown = cooldown_remaining_ms(state, *rarity, now_ms);
        let conquered = state.taverns_beaten.contains(rarity);
        let progress = state.brawl_progress.get(rarity).copied().unwrap_or(-1);

        let color = if !unlocked {
            Color::DarkGray
        } else if cooldown > 0 {
            Color::Red
        } else {
            Color::Gray
        };
        let style = if selected {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color)
        };

        let mut spans = vec![
            Span::styled(marker, style),
            Span::styled(
                format!("{} ({})", rarity.tavern_name(), rarity.label()),
                style,
            ),
        ];
        if conquered {
            spans.push(Span::styled(
                " 👑 conquered",
                Style::default().fg(Color::Yellow),
            ));
        }
        if !unlocked {
            let requirement = match rarity.unlock() {
                TavernUnlock::None => String::new(),
                TavernUnlock::NetWorth(n) => format!("  requires {n} net worth"),
                TavernUnlock::Rebirths(n) => format!("  requires {n} rebirth(s)"),
            };
            spans.push(Span::styled(requirement, Style::default().fg(Color::DarkGray)));
        } else if cooldown > 0 {
            spans.push(Span::styled(
                format!("  reopens in {}", format_ms(cooldown)),
                Style::default().fg(Color::Red),
            ));
        } else {
            spans.push(Span::styled(
                format!(
                    "  best stage {}/{}  (starts at {})",
                    progress + 1,
                    TAVERN_FINAL_STAGE,
                    max_starting_stage(state, *rarity) + 1
                ),
                Style::default().fg(Color::DarkGray),
            ));
        }
        lines.push(Line::from(spans));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(
        "  Clear all 30 stages to conquer a tavern. Losing hurts.",
        Style::default().fg(Color::DarkGray),
    )));

    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_brawl(frame: &mut Frame, area: Rect, state: &GameState, brawl: &BrawlState, ui: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8),  // Opponent
            Constraint::Length(9),  // Player
            Constraint::Min(0),     // Consumables
        ])
        .split(chunks[0]);

    draw_opponent(frame, left[0], brawl);
    draw_player(frame, left[1], brawl);
    draw_consumables(frame, left[2], state, ui);

    if let BrawlPhase::Settlement(outcome) = brawl.phase {
        draw_settlement(frame, chunks[1], brawl, outcome);
    } else {
        draw_log(frame, chunks[1], brawl);
    }
}

fn hp_gauge(frame: &mut Frame, area: Rect, label: String, current: i64, max: i64, color: Color) {
    let ratio = if max > 0 {
        (current.max(0) as f64 / max as f64).min(1.0)
    } else {
        0.0
    };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(color).bg(Color::Black))
        .ratio(ratio)
        .label(label);
    frame.render_widget(gauge, area);
}

fn effect_badges(effects: &EffectSet) -> Line<'static> {
    let mut spans = Vec::new();
    for active in effects.iter() {
        spans.push(Span::styled(
            format!("[{} {}] ", active.effect.label(), active.turns),
            Style::default().fg(Color::LightMagenta),
        ));
    }
    if spans.is_empty() {
        spans.push(Span::styled("-", Style::default().fg(Color::DarkGray)));
    }
    Line::from(spans)
}

fn draw_opponent(frame: &mut Frame, area: Rect, brawl: &BrawlState) {
    let title = format!(
        " {} {}{}  (stage {}/{}) ",
        brawl.opponent.emoji,
        brawl.opponent.name,
        if brawl.opponent.is_boss { " 💀" } else { "" },
        brawl.stage + 1,
        TAVERN_FINAL_STAGE
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(title);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    hp_gauge(
        frame,
        rows[0],
        format!("HP {}/{}", brawl.opponent_health, brawl.opponent.max_health),
        brawl.opponent_health,
        brawl.opponent.max_health,
        Color::Red,
    );
    if brawl.opponent_shield > 0 {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!("🛡 shield {}", brawl.opponent_shield),
                Style::default().fg(Color::Blue),
            ))),
            rows[1],
        );
    }
    frame.render_widget(Paragraph::new(effect_badges(&brawl.opponent_effects)), rows[2]);
}

fn draw_player(frame: &mut Frame, area: Rect, brawl: &BrawlState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(" You ");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    hp_gauge(
        frame,
        rows[0],
        format!("HP {}/{}", brawl.player_health, brawl.player_max_health),
        brawl.player_health,
        brawl.player_max_health,
        Color::Green,
    );
    hp_gauge(
        frame,
        rows[1],
        format!(
            "Stamina {}/{}",
            brawl.player_stamina, brawl.player_max_stamina
        ),
        brawl.player_stamina,
        brawl.player_max_stamina,
        Color::Cyan,
    );
    if brawl.player_shield > 0 {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!("🛡 shield {}", brawl.player_shield),
                Style::default().fg(Color::Blue),
            ))),
            rows[2],
        );
    }
    frame.render_widget(Paragraph::new(effect_badges(&brawl.player_effects)), rows[3]);
}

fn draw_consumables(frame: &mut Frame, area: Rect, state: &GameState, ui: &UiState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Belt ");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let entries = brawl_consumables(state);
    let mut lines: Vec<Line> = Vec::new();

    if entries.is_empty() {
        lines.push(Line::from(Span::styled(
            "  Nothing usable.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let max = inner.height as usize;
    for (i, (name, kind, count)) in entries.iter().enumerate() {
        if lines.len() >= max {
            break;
        }
        let selected = i == ui.consumable_index;
        let marker = if selected { "▶ " } else { "  " };
        let tag = match kind {
            StakeKind::Item => "",
            StakeKind::Potion => " 🧪",
        };
        let style = if selected {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(Line::from(Span::styled(
            format!("{marker}{name}{tag} x{count}"),
            style,
        )));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_log(frame: &mut Frame, area: Rect, brawl: &BrawlState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Brawl ");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let max_entries = inner.height as usize;
    let mut lines: Vec<Line> = Vec::new();
    for entry in brawl.log.iter().take(max_entries) {
        let style = match entry.kind {
            BrawlLogKind::Normal => Style::default().fg(Color::Gray),
            BrawlLogKind::Crit => Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            BrawlLogKind::Special => Style::default().fg(Color::Magenta),
            BrawlLogKind::Status => Style::default().fg(Color::Cyan),
        };
        lines.push(Line::from(Span::styled(entry.message.clone(), style)));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_settlement(frame: &mut Frame, area: Rect, brawl: &BrawlState, outcome: BrawlOutcome) {
    let (title, color) = match outcome {
        BrawlOutcome::StageClear => (" Stage Clear! ", Color::Green),
        BrawlOutcome::Conquered => (" Tavern Conquered! ", Color::Yellow),
        BrawlOutcome::Defeated => (" Knocked Out ", Color::Red),
        BrawlOutcome::Escaped => (" Got Away ", Color::Cyan),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();

    match outcome {
        BrawlOutcome::StageClear => {
            lines.push(Line::from(Span::styled(
                "  [Esc] pocket your winnings and leave",
                Style::default().fg(Color::Gray),
            )));
            lines.push(Line::from(Span::styled(
                "  [Enter] press on to the next stage",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )));
        }
        _ => {
            lines.push(Line::from(Span::styled(
                "  [Enter] or [Esc] to leave",
                Style::default().fg(Color::Gray),
            )));
        }
    }
    lines.push(Line::from(""));

    if let Some(penalty) = &brawl.penalty_summary {
        lines.push(Line::from(Span::styled(
            format!("  {penalty}"),
            Style::default().fg(Color::Red),
        )));
        lines.push(Line::from(""));
    }

    if brawl.rewards.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No winnings this time.",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "  Winnings so far:",
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        for reward in &brawl.rewards {
            let text = match reward {
                BrawlReward::Coins { amount } => format!("  💰 {amount} coins"),
                BrawlReward::Item { name, amount } => format!("  {name} x{amount}"),
                BrawlReward::Potion { name, amount } => format!("  🧪 {name} x{amount}"),
                BrawlReward::Crate { crate_type, amount } => {
                    format!("  {} {} x{amount}", crate_type.emoji(), crate_type.display_name())
                }
            };
            lines.push(Line::from(Span::styled(
                text,
                Style::default().fg(Color::Gray),
            )));
        }
    }

    frame.render_widget(Paragraph::new(lines), inner);
}
