use std::collections::BTreeMap;
use std::time::Duration;

use crate::game::game::Game;
use crate::types::Color;

#[derive(Debug, Default, Clone)]
pub struct GameStats {
    pub wins: BTreeMap<Color, u32>,
    pub results_by_player: BTreeMap<Color, Vec<u8>>,
    pub games: u32,
    pub capped_games: u32,
    pub total_ticks: u64,
    pub total_turns: u64,
    pub total_duration: Duration,
}

impl GameStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_game(&mut self, game: &Game, duration: Duration) {
        self.games += 1;
        self.total_duration += duration;
        self.total_turns += u64::from(game.state.turn);
        self.total_ticks += game.state.actions.len() as u64;

        match game.winning_color() {
            Some(winner) => *self.wins.entry(winner).or_insert(0) += 1,
            None => self.capped_games += 1,
        }

        for player in &game.state.players {
            self.results_by_player
                .entry(player.color)
                .or_default()
                .push(player.actual_victory_points);
        }
    }

    pub fn merge(&mut self, other: GameStats) {
        for (color, wins) in other.wins {
            *self.wins.entry(color).or_insert(0) += wins;
        }
        for (color, vps) in other.results_by_player {
            self.results_by_player.entry(color).or_default().extend(vps);
        }
        self.games += other.games;
        self.capped_games += other.capped_games;
        self.total_ticks += other.total_ticks;
        self.total_turns += other.total_turns;
        self.total_duration += other.total_duration;
    }

    pub fn win_rate(&self, color: Color) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        let wins = self.wins.get(&color).copied().unwrap_or(0);
        f64::from(wins) / f64::from(self.games) * 100.0
    }

    pub fn avg_victory_points(&self, color: Color) -> f64 {
        match self.results_by_player.get(&color) {
            Some(vps) if !vps.is_empty() => {
                vps.iter().map(|v| f64::from(*v)).sum::<f64>() / vps.len() as f64
            }
            _ => 0.0,
        }
    }

    pub fn avg_ticks(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_ticks as f64 / f64::from(self.games)
    }

    pub fn avg_turns(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_turns as f64 / f64::from(self.games)
    }

    pub fn avg_duration(&self) -> Duration {
        if self.games == 0 {
            return Duration::ZERO;
        }
        self.total_duration / self.games
    }
}
