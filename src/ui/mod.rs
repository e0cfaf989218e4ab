pub mod gamble_scene;
pub mod hoard_scene;
pub mod inventory_scene;
pub mod rebirth_scene;
pub mod shop_scene;
pub mod stats_scene;
pub mod tavern_scene;

use std::collections::VecDeque;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::core::constants::MAX_NOTIFICATIONS;
use crate::core::game_state::{GameState, Notification, NotificationKind, StakeKind};
use crate::items::catalog;
use crate::items::types::Rarity;
use crate::loot::types::CrateType;
use crate::rebirth::blackjack::BlackjackResult;
use crate::rebirth::RebirthCeremony;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Hoard,
    Inventory,
    Shop,
    Gamble,
    Tavern,
    Rebirth,
    Stats,
}

impl Tab {
    pub fn all() -> [Tab; 7] {
        [
            Tab::Hoard,
            Tab::Inventory,
            Tab::Shop,
            Tab::Gamble,
            Tab::Tavern,
            Tab::Rebirth,
            Tab::Stats,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Hoard => "Hoard",
            Tab::Inventory => "Inventory",
            Tab::Shop => "Shop",
            Tab::Gamble => "Gamble",
            Tab::Tavern => "Tavern",
            Tab::Rebirth => "Rebirth",
            Tab::Stats => "Stats",
        }
    }

    pub fn next(&self) -> Tab {
        let tabs = Tab::all();
        let idx = tabs.iter().position(|t| t == self).unwrap_or(0);
        tabs[(idx + 1) % tabs.len()]
    }
}

/// Which half of the inventory screen the cursor lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryPane {
    Items,
    Potions,
}

/// Screen-local state: cursors, the current tab, and anything that is
/// presentation rather than game. Never persisted.
pub struct UiState {
    pub tab: Tab,
    pub hoard_index: usize,
    pub inventory_pane: InventoryPane,
    pub item_index: usize,
    pub potion_index: usize,
    pub shop_index: usize,
    pub gamble_index: usize,
    pub tavern_index: usize,
    pub consumable_index: usize,
    pub rebirth_index: usize,
    pub ceremony: Option<RebirthCeremony>,
    pub ceremony_result: Option<(BlackjackResult, u32)>,
    /// Notifications drained from the game state, newest last.
    pub notices: VecDeque<Notification>,
}

impl UiState {
    pub fn new() -> Self {
        UiState {
            tab: Tab::Hoard,
            hoard_index: 0,
            inventory_pane: InventoryPane::Items,
            item_index: 0,
            potion_index: 0,
            shop_index: 0,
            gamble_index: 0,
            tavern_index: 0,
            consumable_index: 0,
            rebirth_index: 0,
            ceremony: None,
            ceremony_result: None,
            notices: VecDeque::new(),
        }
    }

    /// Drain pending notifications out of the game state into the
    /// display queue.
    pub fn absorb_notifications(&mut self, state: &mut GameState) {
        while let Some(notice) = state.notifications.pop_front() {
            self.notices.push_back(notice);
            while self.notices.len() > MAX_NOTIFICATIONS {
                self.notices.pop_front();
            }
        }
    }
}

/// Main UI drawing function. Header, tab bar, active scene, the notice
/// feed, and a footer of key hints.
pub fn draw_ui(frame: &mut Frame, state: &GameState, ui: &UiState) {
    let size = frame.size();

    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(1), // Tab bar
            Constraint::Min(0),    // Scene
            Constraint::Length(7), // Notices
            Constraint::Length(3), // Footer
        ])
        .split(size);

    draw_header(frame, v_chunks[0], state);
    draw_tab_bar(frame, v_chunks[1], ui.tab);

    match ui.tab {
        Tab::Hoard => hoard_scene::draw(frame, v_chunks[2], state, ui),
        Tab::Inventory => inventory_scene::draw(frame, v_chunks[2], state, ui),
        Tab::Shop => shop_scene::draw(frame, v_chunks[2], state, ui),
        Tab::Gamble => gamble_scene::draw(frame, v_chunks[2], state, ui),
        Tab::Tavern => tavern_scene::draw(frame, v_chunks[2], state, ui),
        Tab::Rebirth => rebirth_scene::draw(frame, v_chunks[2], state, ui),
        Tab::Stats => stats_scene::draw(frame, v_chunks[2], state),
    }

    draw_notices(frame, v_chunks[3], ui);
    draw_footer(frame, v_chunks[4], ui.tab);
}

fn draw_header(frame: &mut Frame, area: Rect, state: &GameState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Hoard ");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let coin_color = if state.coins < 0 {
        Color::Red
    } else {
        Color::Yellow
    };

    let mut spans = vec![
        Span::styled(
            format!(" 💰 {} coins", state.coins),
            Style::default().fg(coin_color).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("Net worth {}", state.net_worth()),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("  "),
        Span::styled(
            format!("🔮 {} tokens", state.rebirth_tokens),
            Style::default().fg(Color::Magenta),
        ),
        Span::raw("  "),
        Span::styled(
            format!(
                "📦 next free crate in {}s",
                state.free_crate_timer.ceil() as i64
            ),
            Style::default().fg(Color::Green),
        ),
    ];
    if !state.free_crates_to_claim.is_empty() {
        spans.push(Span::styled(
            format!(" ({} waiting, [c] to claim)", state.free_crates_to_claim.len()),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ));
    }
    for boost in state.active_boosts.values() {
        if boost.time_left == 0 {
            continue;
        }
        let suffix = if boost.stacks > 1 {
            format!(" x{}", boost.stacks)
        } else {
            String::new()
        };
        spans.push(Span::styled(
            format!(
                "  [{}{} {}]",
                boost.potion,
                suffix,
                format_seconds(boost.time_left)
            ),
            Style::default().fg(Color::LightBlue),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), inner);
}

fn draw_tab_bar(frame: &mut Frame, area: Rect, active: Tab) {
    let mut spans = Vec::new();
    for (i, tab) in Tab::all().iter().enumerate() {
        let style = if *tab == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {} {} ", i + 1, tab.label()), style));
        spans.push(Span::raw(" "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_notices(frame: &mut Frame, area: Rect, ui: &UiState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Log ");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let max_entries = inner.height as usize;
    let mut lines: Vec<Line> = ui
        .notices
        .iter()
        .rev()
        .take(max_entries)
        .map(|notice| {
            let color = match notice.kind {
                NotificationKind::Info => Color::Gray,
                NotificationKind::Success => Color::Green,
                NotificationKind::Error => Color::Red,
            };
            Line::from(Span::styled(
                notice.message.clone(),
                Style::default().fg(color),
            ))
        })
        .collect();
    while lines.len() < max_entries {
        lines.push(Line::from(""));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_footer(frame: &mut Frame, area: Rect, tab: Tab) {
    let hints = match tab {
        Tab::Hoard => "[↑↓] select  [Enter] open  [a] open all  [c] claim free crates",
        Tab::Inventory => {
            "[↑↓] select  [←→] switch pane  [e] equip  [u] unequip  [d] drink  [s] sell one  [x] sell everything"
        }
        Tab::Shop => "[↑↓] select  [Enter] buy",
        Tab::Gamble => {
            "[↑↓] select  [Enter] stake one  [+] stake 10 coins  [a] all in  [f] flip  [r] take back"
        }
        Tab::Tavern => {
            "[↑↓] select  [Enter] enter tavern | brawling: [a] attack  [s] shield  [f] flee  [Enter] use from belt"
        }
        Tab::Rebirth => "[↑↓] select  [Enter] buy upgrade  [b] begin rebirth  [h] hit  [s] stand",
        Tab::Stats => "",
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let line = Line::from(vec![
        Span::styled(
            "[1-7] tabs  [q] save & quit  ",
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(hints, Style::default().fg(Color::Gray)),
    ]);
    frame.render_widget(
        Paragraph::new(line).alignment(Alignment::Left),
        inner,
    );
}

/// Crate types present in the stash, in shop order.
pub fn owned_crates(state: &GameState) -> Vec<CrateType> {
    state
        .crate_counts
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(ct, _)| *ct)
        .collect()
}

/// Crate types purchasable right now.
pub fn shop_listing(state: &GameState) -> Vec<CrateType> {
    state.unlocked_crates.iter().copied().collect()
}

/// Everything that can be put on the coin flip: items first, then
/// potions, owned copies only.
pub fn stakeable(state: &GameState) -> Vec<(String, StakeKind, u32)> {
    let mut out = Vec::new();
    for (name, count) in &state.inventory {
        if *count > 0 {
            out.push((name.clone(), StakeKind::Item, *count));
        }
    }
    for (name, count) in &state.potions {
        if *count > 0 {
            out.push((name.clone(), StakeKind::Potion, *count));
        }
    }
    out
}

/// Consumables usable mid-brawl: throwable items and brawl potions.
pub fn brawl_consumables(state: &GameState) -> Vec<(String, StakeKind, u32)> {
    let mut out = Vec::new();
    for (name, count) in &state.inventory {
        if *count > 0 && catalog::brawl_item_effect(name).is_some() {
            out.push((name.clone(), StakeKind::Item, *count));
        }
    }
    for (name, count) in &state.potions {
        if *count == 0 {
            continue;
        }
        if let Some(def) = catalog::potion_def(name) {
            if def.effect.is_brawl_only() {
                out.push((name.clone(), StakeKind::Potion, *count));
            }
        }
    }
    out
}

pub fn rarity_color(rarity: Rarity) -> Color {
    match rarity {
        Rarity::Common => Color::Gray,
        Rarity::Rare => Color::Blue,
        Rarity::Epic => Color::Magenta,
        Rarity::Legendary => Color::Yellow,
        Rarity::Mythical => Color::Red,
        Rarity::Lebron => Color::Rgb(255, 165, 0),
    }
}

pub fn format_seconds(total: u32) -> String {
    format!("{}:{:02}", total / 60, total % 60)
}

pub fn format_ms(total_ms: i64) -> String {
    let secs = (total_ms.max(0) + 999) / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}
