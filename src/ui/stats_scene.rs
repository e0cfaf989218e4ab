use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::core::game_state::GameState;

pub fn draw(frame: &mut Frame, area: Rect, state: &GameState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Statistics ");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let stats = &state.stats;
    let hours = state.play_time_seconds / 3600;
    let minutes = (state.play_time_seconds % 3600) / 60;

    let rows: Vec<(&str, String)> = vec![
        ("Play time", format!("{hours}h {minutes}m")),
        ("Lifetime coins earned", stats.lifetime_coins.to_string()),
        ("Crates opened", stats.crates_opened.to_string()),
        ("Total crate value", stats.total_crate_value.to_string()),
        ("Total pull value", stats.total_pull_value.to_string()),
        ("Value gambled", stats.total_gambled_value.to_string()),
        ("Value won", stats.total_won_value.to_string()),
        ("Gambles won", stats.gambles_won.to_string()),
        ("Gambles lost", stats.gambles_lost.to_string()),
        ("Brawls won", stats.brawls_won.to_string()),
        ("Taverns conquered", state.taverns_beaten.len().to_string()),
        ("Rebirths", stats.rebirths.to_string()),
        ("Items discovered", state.discovered_items.len().to_string()),
        (
            "Potions discovered",
            state.discovered_potions.len().to_string(),
        ),
    ];

    let mut lines: Vec<Line> = Vec::new();
    for (label, value) in rows {
        lines.push(Line::from(vec![
            Span::styled(format!("  {label:<24}"), Style::default().fg(Color::Gray)),
            Span::styled(value, Style::default().fg(Color::Yellow)),
        ]));
    }

    // Average pull value per crate, the payout honesty check.
    if stats.crates_opened > 0 {
        let avg = stats.total_pull_value as f64 / stats.crates_opened as f64;
        let spent = stats.total_crate_value as f64 / stats.crates_opened as f64;
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  Average pull {avg:.1} against average crate cost {spent:.1}"),
            Style::default().fg(Color::DarkGray),
        )));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}
