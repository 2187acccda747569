use tracing::{debug, info};
use uuid::Uuid;

use crate::game::action::{ActionRecord, GameAction};
use crate::game::{GameConfig, GameError, GameState};
use crate::players::BasePlayer;
use crate::types::Color;

/// Drives one game: keeps the playable-action list in step with the state
/// and asks seats' decision-makers for their moves.
#[derive(Debug, Clone)]
pub struct Game {
    pub id: Uuid,
    pub state: GameState,
    playable_actions: Vec<GameAction>,
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        Ok(Self::from_state(GameState::new(config)?))
    }

    pub fn from_state(state: GameState) -> Self {
        let playable_actions = state.generate_playable_actions();
        Self {
            id: Uuid::new_v4(),
            state,
            playable_actions,
        }
    }

    pub fn playable_actions(&self) -> &[GameAction] {
        &self.playable_actions
    }

    /// Rejects kinds that are not currently playable, then hands the action
    /// to the reducer, which checks the payload itself.
    pub fn execute(&mut self, action: GameAction) -> Result<ActionRecord, GameError> {
        self.playable_actions = self.state.generate_playable_actions();
        if !self
            .playable_actions
            .iter()
            .any(|playable| playable.action_type == action.action_type)
        {
            return Err(GameError::ActionNotPlayable(action.action_type));
        }
        let record = self.state.apply(&action)?;
        self.playable_actions = self.state.generate_playable_actions();
        Ok(record)
    }

    pub fn play_tick<P: BasePlayer>(&mut self, players: &[P]) -> Result<Option<Color>, GameError> {
        let seat = self.state.current_player;
        let action = players
            .get(seat)
            .and_then(|player| player.decide(self, &self.playable_actions))
            .ok_or(GameError::NoDecision(seat))?;
        self.execute(action)?;
        Ok(self.winning_color())
    }

    /// First seat, in seat order, at the victory-point target or out of
    /// settlements and cities.
    pub fn winning_color(&self) -> Option<Color> {
        let target = self.state.config.vps_to_win;
        self.state
            .players
            .iter()
            .find(|p| p.actual_victory_points >= target || p.pieces_exhausted())
            .map(|p| p.color)
    }

    /// Plays until someone wins or the turn cap is reached; hitting the cap
    /// returns `Ok(None)`.
    pub fn play<P: BasePlayer>(&mut self, players: &[P]) -> Result<Option<Color>, GameError> {
        let limit = self.state.config.turns_limit;
        while self.winning_color().is_none() && self.state.turn < limit {
            self.play_tick(players)?;
        }
        let winner = self.winning_color();
        match winner {
            Some(color) => info!(game = %self.id, %color, turns = self.state.turn, "game won"),
            None => debug!(game = %self.id, turns = self.state.turn, "turn cap reached"),
        }
        Ok(winner)
    }

    /// Independent copy for look-ahead; shares only the map and seat list.
    pub fn copy(&self) -> Self {
        self.clone()
    }
}
