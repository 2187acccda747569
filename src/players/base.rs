use crate::game::{action::GameAction, game::Game};

/// A seat's decision-maker. It must return one of `actions` and may keep its
/// own state between calls, but never mutates the game.
pub trait BasePlayer {
    fn decide(&self, game: &Game, actions: &[GameAction]) -> Option<GameAction>;
}
