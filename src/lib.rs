#![warn(clippy::all)]
#![deny(rust_2018_idioms)]

pub mod board;
pub mod cli;
pub mod coords;
pub mod game;
pub mod players;
pub mod types;

pub use board::{Board, CatanMap, EdgeId, MapType, NodeId, Tile, TileId};
pub use game::{ActionRecord, Game, GameAction, GameConfig, GameError, GameState};
pub use players::{BasePlayer, RandomPlayer};
pub use types::Color;
