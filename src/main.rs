mod brawl;
mod core;
mod gamble;
mod items;
mod loot;
mod rebirth;
mod ui;

use std::io;
use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::event::{self, Event, KeyCode};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::brawl::logic::{
    close_brawl, initiate_brawl, max_starting_stage, player_attack, player_run, player_shield,
    use_brawl_item, use_brawl_potion,
};
use crate::brawl::types::{BrawlOutcome, BrawlPhase, BrawlRarity};
use crate::core::constants::AUTOSAVE_INTERVAL_SECS;
use crate::core::game_state::{GameState, StakeKind};
use crate::core::save::SaveManager;
use crate::core::tick::tick;
use crate::items::catalog;
use crate::items::inventory::{
    equip_armor, equip_weapon, sell_all, sell_item, sell_potion, use_potion,
};
use crate::items::types::ItemCategory;
use crate::loot::open::{buy_crate, claim_free_crates, open_all_crates, open_crate};
use crate::rebirth::{buy_upgrade, finish_rebirth, start_rebirth, UpgradeId};
use crate::ui::{
    brawl_consumables, draw_ui, owned_crates, shop_listing, stakeable, InventoryPane, Tab, UiState,
};

const GAMBLE_COIN_STEP: i64 = 10;

fn main() -> io::Result<()> {
    let save_manager = SaveManager::new()?;

    let mut state = if save_manager.save_exists() {
        match save_manager.load() {
            Ok(state) => state,
            Err(e) => {
                eprintln!("Could not load save: {e}");
                eprintln!("Starting a fresh hoard. The old file will be overwritten on save.");
                GameState::new(Utc::now().timestamp())
            }
        }
    } else {
        GameState::new(Utc::now().timestamp())
    };
    let mut ui = UiState::new();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut last_tick = Instant::now();
    let mut last_autosave = Instant::now();

    loop {
        ui.absorb_notifications(&mut state);
        clamp_cursors(&state, &mut ui);
        terminal.draw(|frame| draw_ui(frame, &state, &ui))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key_event) = event::read()? {
                match key_event.code {
                    KeyCode::Char('q') | KeyCode::Char('Q') => {
                        state.last_save_time = Utc::now().timestamp();
                        save_manager.save(&state)?;
                        break;
                    }
                    KeyCode::Tab => {
                        ui.tab = ui.tab.next();
                    }
                    KeyCode::Char(c @ '1'..='7') => {
                        let idx = c as usize - '1' as usize;
                        ui.tab = Tab::all()[idx];
                    }
                    KeyCode::Char('c') | KeyCode::Char('C') => {
                        claim_free_crates(&mut state, &mut rand::thread_rng());
                    }
                    code => handle_tab_key(&mut state, &mut ui, code),
                }
            }
        }

        if last_tick.elapsed() >= Duration::from_secs(1) {
            tick(&mut state, &mut rand::thread_rng());
            last_tick = Instant::now();
        }

        if last_autosave.elapsed() >= Duration::from_secs(AUTOSAVE_INTERVAL_SECS) {
            state.last_save_time = Utc::now().timestamp();
            save_manager.save(&state)?;
            last_autosave = Instant::now();
        }
    }

    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;

    println!("Your hoard awaits your return.");

    Ok(())
}

/// Keep every cursor inside its list as counts change under it.
fn clamp_cursors(state: &GameState, ui: &mut UiState) {
    let clamp = |index: &mut usize, len: usize| {
        if len == 0 {
            *index = 0;
        } else if *index >= len {
            *index = len - 1;
        }
    };
    clamp(&mut ui.hoard_index, owned_crates(state).len());
    clamp(&mut ui.item_index, ui::inventory_scene::owned_items(state).len());
    clamp(
        &mut ui.potion_index,
        ui::inventory_scene::owned_potions(state).len(),
    );
    clamp(&mut ui.shop_index, shop_listing(state).len());
    clamp(&mut ui.gamble_index, stakeable(state).len());
    clamp(&mut ui.tavern_index, BrawlRarity::all().len());
    clamp(&mut ui.consumable_index, brawl_consumables(state).len());
    clamp(&mut ui.rebirth_index, UpgradeId::all().len());
}

fn move_cursor(index: &mut usize, len: usize, down: bool) {
    if len == 0 {
        return;
    }
    if down {
        if *index + 1 < len {
            *index += 1;
        }
    } else {
        *index = index.saturating_sub(1);
    }
}

fn handle_tab_key(state: &mut GameState, ui: &mut UiState, code: KeyCode) {
    match ui.tab {
        Tab::Hoard => handle_hoard_key(state, ui, code),
        Tab::Inventory => handle_inventory_key(state, ui, code),
        Tab::Shop => handle_shop_key(state, ui, code),
        Tab::Gamble => handle_gamble_key(state, ui, code),
        Tab::Tavern => handle_tavern_key(state, ui, code),
        Tab::Rebirth => handle_rebirth_key(state, ui, code),
        Tab::Stats => {}
    }
}

fn handle_hoard_key(state: &mut GameState, ui: &mut UiState, code: KeyCode) {
    let crates = owned_crates(state);
    match code {
        KeyCode::Up => move_cursor(&mut ui.hoard_index, crates.len(), false),
        KeyCode::Down => move_cursor(&mut ui.hoard_index, crates.len(), true),
        KeyCode::Enter => {
            if let Some(crate_type) = crates.get(ui.hoard_index) {
                open_crate(state, *crate_type, &mut rand::thread_rng());
            }
        }
        KeyCode::Char('a') | KeyCode::Char('A') => {
            if let Some(crate_type) = crates.get(ui.hoard_index) {
                open_all_crates(state, *crate_type, &mut rand::thread_rng());
            }
        }
        _ => {}
    }
}

fn handle_inventory_key(state: &mut GameState, ui: &mut UiState, code: KeyCode) {
    let items = ui::inventory_scene::owned_items(state);
    let potions = ui::inventory_scene::owned_potions(state);
    let (index, len) = match ui.inventory_pane {
        InventoryPane::Items => (&mut ui.item_index, items.len()),
        InventoryPane::Potions => (&mut ui.potion_index, potions.len()),
    };

    match code {
        KeyCode::Up => move_cursor(index, len, false),
        KeyCode::Down => move_cursor(index, len, true),
        KeyCode::Left => ui.inventory_pane = InventoryPane::Items,
        KeyCode::Right => ui.inventory_pane = InventoryPane::Potions,
        KeyCode::Char('e') | KeyCode::Char('E') => {
            if ui.inventory_pane == InventoryPane::Items {
                if let Some(name) = items.get(ui.item_index) {
                    match catalog::item_def(name).map(|d| d.category) {
                        Some(ItemCategory::Weapon) => equip_weapon(state, Some(name)),
                        Some(ItemCategory::Armor) => equip_armor(state, Some(name)),
                        _ => state.notify(
                            "You can't equip that.",
                            crate::core::game_state::NotificationKind::Error,
                        ),
                    }
                }
            }
        }
        KeyCode::Char('u') | KeyCode::Char('U') => {
            if let Some(name) = items.get(ui.item_index) {
                if state.equipped_weapon.as_deref() == Some(name.as_str()) {
                    equip_weapon(state, None);
                }
                if state.equipped_armor.as_deref() == Some(name.as_str()) {
                    equip_armor(state, None);
                }
            }
        }
        KeyCode::Char('d') | KeyCode::Char('D') => {
            if ui.inventory_pane == InventoryPane::Potions {
                if let Some(name) = potions.get(ui.potion_index) {
                    use_potion(state, name, &mut rand::thread_rng());
                }
            }
        }
        KeyCode::Char('s') | KeyCode::Char('S') => match ui.inventory_pane {
            InventoryPane::Items => {
                if let Some(name) = items.get(ui.item_index) {
                    sell_item(state, name, 1, &mut rand::thread_rng());
                }
            }
            InventoryPane::Potions => {
                if let Some(name) = potions.get(ui.potion_index) {
                    sell_potion(state, name, 1, &mut rand::thread_rng());
                }
            }
        },
        KeyCode::Char('x') | KeyCode::Char('X') => {
            sell_all(state, &mut rand::thread_rng());
        }
        _ => {}
    }
}

fn handle_shop_key(state: &mut GameState, ui: &mut UiState, code: KeyCode) {
    let listing = shop_listing(state);
    match code {
        KeyCode::Up => move_cursor(&mut ui.shop_index, listing.len(), false),
        KeyCode::Down => move_cursor(&mut ui.shop_index, listing.len(), true),
        KeyCode::Enter => {
            if let Some(crate_type) = listing.get(ui.shop_index) {
                buy_crate(state, *crate_type, &mut rand::thread_rng());
            }
        }
        _ => {}
    }
}

fn handle_gamble_key(state: &mut GameState, ui: &mut UiState, code: KeyCode) {
    let entries = stakeable(state);
    match code {
        KeyCode::Up => move_cursor(&mut ui.gamble_index, entries.len(), false),
        KeyCode::Down => move_cursor(&mut ui.gamble_index, entries.len(), true),
        KeyCode::Enter => {
            if let Some((name, kind, _)) = entries.get(ui.gamble_index) {
                gamble::stake(state, name, *kind, 1);
            }
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            gamble::stake_coins(state, GAMBLE_COIN_STEP);
        }
        KeyCode::Char('a') | KeyCode::Char('A') => {
            gamble::gamble_everything(state);
        }
        KeyCode::Char('f') | KeyCode::Char('F') => {
            gamble::coin_flip(state, &mut rand::thread_rng());
        }
        KeyCode::Char('r') | KeyCode::Char('R') => {
            gamble::restore_selection(state);
        }
        _ => {}
    }
}

fn handle_tavern_key(state: &mut GameState, ui: &mut UiState, code: KeyCode) {
    let now_ms = Utc::now().timestamp_millis();

    let phase = state.active_brawl.as_ref().map(|b| b.phase);
    match phase {
        None => match code {
            KeyCode::Up => move_cursor(&mut ui.tavern_index, BrawlRarity::all().len(), false),
            KeyCode::Down => move_cursor(&mut ui.tavern_index, BrawlRarity::all().len(), true),
            KeyCode::Enter => {
                let rarity = BrawlRarity::all()[ui.tavern_index];
                let stage = max_starting_stage(state, rarity);
                initiate_brawl(state, rarity, stage, now_ms);
            }
            _ => {}
        },
        Some(BrawlPhase::PlayerTurn) => {
            let consumables = brawl_consumables(state);
            match code {
                KeyCode::Up => move_cursor(&mut ui.consumable_index, consumables.len(), false),
                KeyCode::Down => move_cursor(&mut ui.consumable_index, consumables.len(), true),
                KeyCode::Char('a') | KeyCode::Char('A') => {
                    player_attack(state, now_ms, &mut rand::thread_rng());
                }
                KeyCode::Char('s') | KeyCode::Char('S') => {
                    player_shield(state, now_ms, &mut rand::thread_rng());
                }
                KeyCode::Char('f') | KeyCode::Char('F') => {
                    player_run(state, now_ms, &mut rand::thread_rng());
                }
                KeyCode::Enter => {
                    if let Some((name, kind, _)) = consumables.get(ui.consumable_index) {
                        match kind {
                            StakeKind::Item => {
                                use_brawl_item(state, name, now_ms, &mut rand::thread_rng())
                            }
                            StakeKind::Potion => {
                                use_brawl_potion(state, name, now_ms, &mut rand::thread_rng())
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        Some(BrawlPhase::Settlement(outcome)) => match code {
            KeyCode::Enter => close_brawl(state),
            KeyCode::Esc => {
                // Leaving after a stage clear banks the winnings; the
                // cooldown was already set by the victory.
                if outcome == BrawlOutcome::StageClear {
                    if let Some(brawl) = state.active_brawl.as_mut() {
                        brawl.phase = BrawlPhase::Settlement(BrawlOutcome::Escaped);
                    }
                }
                close_brawl(state);
            }
            _ => {}
        },
    }
}

fn handle_rebirth_key(state: &mut GameState, ui: &mut UiState, code: KeyCode) {
    if ui.ceremony.is_some() {
        handle_ceremony_key(state, ui, code);
        return;
    }

    let upgrades = UpgradeId::all();
    match code {
        KeyCode::Up => move_cursor(&mut ui.rebirth_index, upgrades.len(), false),
        KeyCode::Down => move_cursor(&mut ui.rebirth_index, upgrades.len(), true),
        KeyCode::Enter => {
            buy_upgrade(state, upgrades[ui.rebirth_index]);
        }
        KeyCode::Char('b') | KeyCode::Char('B') => {
            let mut rng = rand::thread_rng();
            if let Some(mut ceremony) = start_rebirth(state, &mut rng) {
                // A dealt 21 resolves immediately.
                if !ceremony.game.awaiting_player() {
                    if let Some(result) = ceremony.game.stand(&mut rng) {
                        let gained = rebirth::award_tokens(state, &ceremony, result);
                        ui.ceremony_result = Some((result, gained));
                    }
                }
                ui.ceremony = Some(ceremony);
            }
        }
        _ => {}
    }
}

fn handle_ceremony_key(state: &mut GameState, ui: &mut UiState, code: KeyCode) {
    if let Some((_, _)) = ui.ceremony_result {
        if code == KeyCode::Enter {
            finish_rebirth(state);
            ui.ceremony = None;
            ui.ceremony_result = None;
        }
        return;
    }

    let mut rng = rand::thread_rng();
    let ceremony = match ui.ceremony.as_mut() {
        Some(c) => c,
        None => return,
    };

    match code {
        KeyCode::Char('h') | KeyCode::Char('H') => {
            let mut result = ceremony.game.hit(&mut rng);
            // Landing exactly on 21 leaves nothing to decide.
            if result.is_none() && !ceremony.game.awaiting_player() {
                result = ceremony.game.stand(&mut rng);
            }
            if let Some(result) = result {
                let gained = rebirth::award_tokens(state, ceremony, result);
                ui.ceremony_result = Some((result, gained));
            }
        }
        KeyCode::Char('s') | KeyCode::Char('S') => {
            if let Some(result) = ceremony.game.stand(&mut rng) {
                let gained = rebirth::award_tokens(state, ceremony, result);
                ui.ceremony_result = Some((result, gained));
            }
        }
        _ => {}
    }
}
