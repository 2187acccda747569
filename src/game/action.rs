use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::board::{EdgeId, NodeId, TileId};
use crate::game::resources::ResourceBundle;
use crate::types::{ActionType, DevelopmentCard, Resource};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct GameAction {
    pub player_index: usize,
    pub action_type: ActionType,
    pub payload: ActionPayload,
}

impl GameAction {
    pub fn new(player_index: usize, action_type: ActionType) -> Self {
        Self {
            player_index,
            action_type,
            payload: ActionPayload::None,
        }
    }

    pub fn with_payload(mut self, payload: ActionPayload) -> Self {
        self.payload = payload;
        self
    }
}

/// Payload shape is fixed per action kind, but arrives unchecked; the
/// reducer validates it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ActionPayload {
    #[default]
    None,
    Node(NodeId),
    Edge(EdgeId),
    Tile(TileId),
    /// Scripted dice for a roll.
    Dice(u8, u8),
    /// One or two year-of-plenty selections, repetition allowed.
    Resources(SmallVec<[Resource; 2]>),
    Resource(Resource),
}

/// What an applied action revealed that the decision-maker could not know.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActionOutcome {
    #[default]
    None,
    Dice(u8, u8),
    DevelopmentCard(DevelopmentCard),
    Stolen { victim: usize, resource: Resource },
    /// The robber moved onto a tile with no opponent holding cards.
    NothingStolen,
    Discarded(ResourceBundle),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionRecord {
    pub action: GameAction,
    pub outcome: ActionOutcome,
}
