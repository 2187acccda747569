pub mod base;
pub mod random;

pub use base::BasePlayer;
pub use random::RandomPlayer;
