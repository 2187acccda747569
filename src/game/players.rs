use serde::{Deserialize, Serialize};

use crate::board::NodeId;
use crate::game::resources::ResourceBundle;
use crate::types::{Color, DevelopmentCard};

pub const MAX_ROADS: u8 = 15;
pub const MAX_SETTLEMENTS: u8 = 5;
pub const MAX_CITIES: u8 = 4;

/// Pieces a seat still has off the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceInventory {
    pub roads: u8,
    pub settlements: u8,
    pub cities: u8,
}

impl Default for PieceInventory {
    fn default() -> Self {
        Self {
            roads: MAX_ROADS,
            settlements: MAX_SETTLEMENTS,
            cities: MAX_CITIES,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevCardHolding {
    pub in_hand: u8,
    /// Set at the end of each turn; a card bought this turn cannot be played.
    pub owned_at_start: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevelopmentHand {
    holdings: [DevCardHolding; 5],
}

impl DevelopmentHand {
    pub fn get(&self, card: DevelopmentCard) -> &DevCardHolding {
        &self.holdings[card.index()]
    }

    pub fn get_mut(&mut self, card: DevelopmentCard) -> &mut DevCardHolding {
        &mut self.holdings[card.index()]
    }

    pub fn in_hand(&self, card: DevelopmentCard) -> u8 {
        self.get(card).in_hand
    }

    pub fn total_in_hand(&self) -> u32 {
        self.holdings.iter().map(|h| h.in_hand as u32).sum()
    }

    pub fn refresh_owned_at_start(&mut self) {
        for holding in &mut self.holdings {
            holding.owned_at_start = holding.in_hand > 0;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub color: Color,
    pub resources: ResourceBundle,
    pub pieces: PieceInventory,
    /// Points from buildings and bonuses.
    pub victory_points: u8,
    /// `victory_points` plus victory-point cards.
    pub actual_victory_points: u8,
    pub has_rolled: bool,
    pub has_played_development_card: bool,
    pub development_cards: DevelopmentHand,
    pub played_development_cards: [u8; 5],
    pub knights_played: u8,
    pub longest_road_length: usize,
    pub has_longest_road: bool,
    pub has_largest_army: bool,
    pub last_initial_settlement: Option<NodeId>,
}

impl PlayerState {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            resources: ResourceBundle::zero(),
            pieces: PieceInventory::default(),
            victory_points: 0,
            actual_victory_points: 0,
            has_rolled: false,
            has_played_development_card: false,
            development_cards: DevelopmentHand::default(),
            played_development_cards: [0; 5],
            knights_played: 0,
            longest_road_length: 0,
            has_longest_road: false,
            has_largest_army: false,
            last_initial_settlement: None,
        }
    }

    pub fn award_points(&mut self, amount: u8) {
        self.victory_points += amount;
        self.actual_victory_points += amount;
    }

    pub fn revoke_points(&mut self, amount: u8) {
        self.victory_points = self.victory_points.saturating_sub(amount);
        self.actual_victory_points = self.actual_victory_points.saturating_sub(amount);
    }

    pub fn receive_development_card(&mut self, card: DevelopmentCard) {
        self.development_cards.get_mut(card).in_hand += 1;
        if card == DevelopmentCard::VictoryPoint {
            self.actual_victory_points += 1;
        }
    }

    /// Owned before this turn, still in hand, and nothing played yet this turn.
    pub fn can_play(&self, card: DevelopmentCard) -> bool {
        let holding = self.development_cards.get(card);
        card.is_playable()
            && !self.has_played_development_card
            && holding.owned_at_start
            && holding.in_hand > 0
    }

    pub fn consume_development_card(&mut self, card: DevelopmentCard) {
        let holding = self.development_cards.get_mut(card);
        holding.in_hand = holding.in_hand.saturating_sub(1);
        self.played_development_cards[card.index()] += 1;
        self.has_played_development_card = true;
        if card == DevelopmentCard::Knight {
            self.knights_played += 1;
        }
    }

    pub fn end_turn(&mut self) {
        self.has_rolled = false;
        self.has_played_development_card = false;
        self.development_cards.refresh_owned_at_start();
    }

    /// Both settlement and city inventories are used up.
    pub fn pieces_exhausted(&self) -> bool {
        self.pieces.settlements == 0 && self.pieces.cities == 0
    }
}
