pub mod action;
pub mod config;
pub mod deck;
pub mod game;
pub mod movegen;
pub mod players;
pub mod reducer;
pub mod resources;
pub mod state;

pub use action::{ActionOutcome, ActionPayload, ActionRecord, GameAction};
pub use config::{ConfigError, GameConfig};
pub use deck::DevelopmentDeck;
pub use game::Game;
pub use players::{DevCardHolding, DevelopmentHand, PieceInventory, PlayerState};
pub use reducer::{LARGEST_ARMY_MIN, LONGEST_ROAD_MIN, resolve_bonus_holder};
pub use resources::{
    COST_CITY, COST_DEVELOPMENT, COST_ROAD, COST_SETTLEMENT, ResourceBundle, ResourceError,
};
pub use state::{ErrorKind, GameError, GamePhase, GameState, SetupState};
