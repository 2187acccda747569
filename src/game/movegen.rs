use itertools::Itertools;
use smallvec::SmallVec;
use tracing::trace;

use crate::types::{ActionPrompt, ActionType, DevelopmentCard, Resource};

use super::{
    action::{ActionPayload, GameAction},
    resources::{COST_CITY, COST_DEVELOPMENT, COST_ROAD, COST_SETTLEMENT},
    state::GameState,
};

impl GameState {
    /// Every action the acting seat may take right now, in a stable order.
    pub fn generate_playable_actions(&self) -> Vec<GameAction> {
        let seat = self.current_player;
        let actions = match self.prompt {
            ActionPrompt::BuildInitialSettlement => self
                .board
                .buildable_node_ids(seat, true)
                .into_iter()
                .map(|node| {
                    GameAction::new(seat, ActionType::BuildSettlement)
                        .with_payload(ActionPayload::Node(node))
                })
                .collect(),
            ActionPrompt::BuildInitialRoad => self.initial_road_actions(seat),
            ActionPrompt::PlayTurn => self.play_turn_actions(seat),
            ActionPrompt::Discard => vec![GameAction::new(seat, ActionType::Discard)],
            ActionPrompt::MoveRobber => self
                .map()
                .land_tile_ids()
                .filter(|tile| *tile != self.robber_tile)
                .map(|tile| {
                    GameAction::new(seat, ActionType::MoveRobber)
                        .with_payload(ActionPayload::Tile(tile))
                })
                .collect(),
        };
        trace!(seat, prompt = %self.prompt, count = actions.len(), "generated actions");
        actions
    }

    fn initial_road_actions(&self, seat: usize) -> Vec<GameAction> {
        let Some(anchor) = self.players[seat].last_initial_settlement else {
            return Vec::new();
        };
        self.board
            .buildable_edges(seat)
            .into_iter()
            .filter(|edge| edge.touches(anchor))
            .map(|edge| {
                GameAction::new(seat, ActionType::BuildRoad).with_payload(ActionPayload::Edge(edge))
            })
            .collect()
    }

    fn play_turn_actions(&self, seat: usize) -> Vec<GameAction> {
        let player = &self.players[seat];
        if !player.has_rolled {
            return vec![GameAction::new(seat, ActionType::Roll)];
        }

        let mut actions = vec![GameAction::new(seat, ActionType::EndTurn)];
        let hand = &player.resources;

        if player.pieces.settlements > 0 && hand.can_afford(&COST_SETTLEMENT) {
            actions.extend(self.board.buildable_node_ids(seat, false).into_iter().map(
                |node| {
                    GameAction::new(seat, ActionType::BuildSettlement)
                        .with_payload(ActionPayload::Node(node))
                },
            ));
        }
        if player.pieces.cities > 0 && hand.can_afford(&COST_CITY) {
            actions.extend(self.board.owned_settlements(seat).map(|node| {
                GameAction::new(seat, ActionType::BuildCity).with_payload(ActionPayload::Node(node))
            }));
        }
        let free_road = self.is_road_building && self.free_roads_available > 0;
        if player.pieces.roads > 0 && (free_road || hand.can_afford(&COST_ROAD)) {
            actions.extend(self.board.buildable_edges(seat).into_iter().map(|edge| {
                GameAction::new(seat, ActionType::BuildRoad).with_payload(ActionPayload::Edge(edge))
            }));
        }
        if !self.development_deck.is_empty() && hand.can_afford(&COST_DEVELOPMENT) {
            actions.push(GameAction::new(seat, ActionType::BuyDevelopmentCard));
        }
        actions.extend(self.development_card_actions(seat));
        actions
    }

    fn development_card_actions(&self, seat: usize) -> Vec<GameAction> {
        let player = &self.players[seat];
        let mut actions = Vec::new();
        if player.can_play(DevelopmentCard::Knight) {
            actions.push(GameAction::new(seat, ActionType::PlayKnightCard));
        }
        if player.can_play(DevelopmentCard::YearOfPlenty) {
            let singles = Resource::ALL.into_iter().map(|r| SmallVec::from_slice(&[r]));
            let pairs = Resource::ALL
                .into_iter()
                .combinations_with_replacement(2)
                .map(SmallVec::from_vec);
            actions.extend(singles.chain(pairs).map(|picks| {
                GameAction::new(seat, ActionType::PlayYearOfPlenty)
                    .with_payload(ActionPayload::Resources(picks))
            }));
        }
        if player.can_play(DevelopmentCard::Monopoly) {
            actions.extend(Resource::ALL.into_iter().map(|resource| {
                GameAction::new(seat, ActionType::PlayMonopoly)
                    .with_payload(ActionPayload::Resource(resource))
            }));
        }
        if player.can_play(DevelopmentCard::RoadBuilding)
            && player.pieces.roads > 0
            && !self.board.buildable_edges(seat).is_empty()
        {
            actions.push(GameAction::new(seat, ActionType::PlayRoadBuilding));
        }
        actions
    }
}
