use rand::Rng;
use tracing::{debug, info};

use crate::board::{BoardError, EdgeId, NodeId, TileId};
use crate::types::{ActionPrompt, ActionType, BuildingKind, DevelopmentCard, Resource};

use super::{
    action::{ActionOutcome, ActionPayload, ActionRecord, GameAction},
    resources::{COST_CITY, COST_DEVELOPMENT, COST_ROAD, COST_SETTLEMENT, ResourceBundle},
    state::{GameError, GameState},
};

pub const LONGEST_ROAD_MIN: usize = 5;
pub const LARGEST_ARMY_MIN: usize = 3;
const BONUS_POINTS: u8 = 2;
const FREE_ROADS: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bonus {
    LongestRoad,
    LargestArmy,
}

/// Decides who holds a standing bonus. The incumbent keeps it while tied
/// for the lead; anyone else needs a unique lead at or above `threshold`.
pub fn resolve_bonus_holder(
    values: &[usize],
    threshold: usize,
    incumbent: Option<usize>,
) -> Option<usize> {
    let best = values.iter().copied().max().unwrap_or(0);
    if best < threshold {
        return None;
    }
    if let Some(holder) = incumbent {
        if values.get(holder) == Some(&best) {
            return Some(holder);
        }
    }
    let mut leaders = values
        .iter()
        .enumerate()
        .filter(|(_, value)| **value == best)
        .map(|(seat, _)| seat);
    match (leaders.next(), leaders.next()) {
        (Some(seat), None) => Some(seat),
        _ => None,
    }
}

fn prompt_allows(prompt: ActionPrompt, action: ActionType) -> bool {
    use ActionType::*;
    match prompt {
        ActionPrompt::BuildInitialSettlement => action == BuildSettlement,
        ActionPrompt::BuildInitialRoad => action == BuildRoad,
        ActionPrompt::Discard => action == Discard,
        ActionPrompt::MoveRobber => action == MoveRobber,
        ActionPrompt::PlayTurn => !matches!(action, Discard | MoveRobber),
    }
}

impl GameState {
    /// Validates `action` against the current state and applies it. A
    /// rejected action leaves the state exactly as it was.
    pub fn apply(&mut self, action: &GameAction) -> Result<ActionRecord, GameError> {
        let seat = action.player_index;
        if seat != self.current_player {
            return Err(GameError::ActionOutOfTurn {
                expected: self.current_player,
                actual: seat,
            });
        }
        if !prompt_allows(self.prompt, action.action_type) {
            return Err(GameError::InvalidPrompt {
                action: action.action_type,
                prompt: self.prompt,
            });
        }

        let payload = &action.payload;
        let outcome = match action.action_type {
            ActionType::Roll => self.roll(seat, payload)?,
            ActionType::Discard => self.discard(seat, payload)?,
            ActionType::MoveRobber => self.move_robber(seat, payload)?,
            ActionType::BuildSettlement => self.build_settlement(seat, payload)?,
            ActionType::BuildRoad => self.build_road(seat, payload)?,
            ActionType::BuildCity => self.build_city(seat, payload)?,
            ActionType::BuyDevelopmentCard => self.buy_development_card(seat, payload)?,
            ActionType::PlayKnightCard => self.play_knight(seat, payload)?,
            ActionType::PlayYearOfPlenty => self.play_year_of_plenty(seat, payload)?,
            ActionType::PlayMonopoly => self.play_monopoly(seat, payload)?,
            ActionType::PlayRoadBuilding => self.play_road_building(seat, payload)?,
            ActionType::EndTurn => self.end_turn(seat, payload)?,
        };

        debug!(
            seat,
            action = %action.action_type,
            outcome = ?outcome,
            prompt = %self.prompt,
            "applied action"
        );
        let record = ActionRecord {
            action: action.clone(),
            outcome,
        };
        self.actions.push(record.clone());
        Ok(record)
    }

    fn invalid_payload(action: ActionType, payload: &ActionPayload) -> GameError {
        GameError::InvalidPayload {
            action,
            payload: payload.clone(),
        }
    }

    fn expect_no_payload(action: ActionType, payload: &ActionPayload) -> Result<(), GameError> {
        match payload {
            ActionPayload::None => Ok(()),
            other => Err(Self::invalid_payload(action, other)),
        }
    }

    fn ensure_rolled(&self, seat: usize) -> Result<(), GameError> {
        if self.players[seat].has_rolled {
            Ok(())
        } else {
            Err(GameError::MustRollFirst)
        }
    }

    fn roll(&mut self, seat: usize, payload: &ActionPayload) -> Result<ActionOutcome, GameError> {
        if self.players[seat].has_rolled {
            return Err(GameError::AlreadyRolled);
        }
        let (a, b) = match payload {
            ActionPayload::None => (self.roll_die(), self.roll_die()),
            ActionPayload::Dice(a, b) if (1..=6).contains(a) && (1..=6).contains(b) => (*a, *b),
            other => return Err(Self::invalid_payload(ActionType::Roll, other)),
        };

        self.players[seat].has_rolled = true;
        self.last_roll = Some((a, b));
        let sum = a + b;
        if sum == 7 {
            match self.next_over_limit_seat() {
                Some(discarder) => {
                    self.prompt = ActionPrompt::Discard;
                    self.current_player = discarder;
                }
                None => self.prompt = ActionPrompt::MoveRobber,
            }
        } else {
            let payouts = self.yield_for_roll(sum);
            for (player, bundle) in self.players.iter_mut().zip(payouts.iter()) {
                player.resources.add_bundle(bundle);
            }
            self.prompt = ActionPrompt::PlayTurn;
        }
        Ok(ActionOutcome::Dice(a, b))
    }

    /// Trims the hand down to the discard limit, taking kinds in
    /// `Resource::ALL` order.
    fn discard(&mut self, seat: usize, payload: &ActionPayload) -> Result<ActionOutcome, GameError> {
        Self::expect_no_payload(ActionType::Discard, payload)?;
        let hand = self.players[seat].resources;
        let mut excess = hand.total().saturating_sub(self.discard_limit);
        let mut removed = ResourceBundle::zero();
        for (resource, count) in hand.iter() {
            let take = count.min(excess);
            removed.add(resource, take);
            excess -= take;
        }
        self.players[seat].resources.subtract_bundle(&removed)?;

        match self.next_over_limit_seat() {
            Some(next) => self.current_player = next,
            None => {
                self.prompt = ActionPrompt::MoveRobber;
                self.current_player = self.turn_owner;
            }
        }
        Ok(ActionOutcome::Discarded(removed))
    }

    fn move_robber(
        &mut self,
        seat: usize,
        payload: &ActionPayload,
    ) -> Result<ActionOutcome, GameError> {
        let tile_id: TileId = match payload {
            ActionPayload::Tile(tile) => *tile,
            other => return Err(Self::invalid_payload(ActionType::MoveRobber, other)),
        };
        let Some(tile) = self.map().tile(tile_id) else {
            return Err(GameError::IllegalTile(tile_id));
        };
        if tile_id == self.robber_tile {
            return Err(GameError::IllegalTile(tile_id));
        }

        let mut victims: Vec<usize> = tile
            .nodes
            .iter()
            .filter_map(|node| self.board.building_at(*node))
            .map(|building| building.owner)
            .filter(|owner| *owner != seat && !self.players[*owner].resources.is_empty())
            .collect();
        victims.sort_unstable();
        victims.dedup();

        self.robber_tile = tile_id;
        self.prompt = ActionPrompt::PlayTurn;
        self.current_player = self.turn_owner;

        if victims.is_empty() {
            return Ok(ActionOutcome::NothingStolen);
        }
        let victim = victims[self.rng.gen_range(0..victims.len())];
        let hand = self.players[victim].resources;
        let pick = self.rng.gen_range(0..hand.total());
        let Some(resource) = hand.nth_card(pick) else {
            return Ok(ActionOutcome::NothingStolen);
        };
        self.players[victim].resources.subtract(resource, 1)?;
        self.players[seat].resources.add(resource, 1);
        Ok(ActionOutcome::Stolen { victim, resource })
    }

    fn node_payload(action: ActionType, payload: &ActionPayload) -> Result<NodeId, GameError> {
        match payload {
            ActionPayload::Node(node) => Ok(*node),
            other => Err(Self::invalid_payload(action, other)),
        }
    }

    fn edge_payload(action: ActionType, payload: &ActionPayload) -> Result<EdgeId, GameError> {
        match payload {
            ActionPayload::Edge(edge) => Ok(*edge),
            other => Err(Self::invalid_payload(action, other)),
        }
    }

    fn build_settlement(
        &mut self,
        seat: usize,
        payload: &ActionPayload,
    ) -> Result<ActionOutcome, GameError> {
        let node = Self::node_payload(ActionType::BuildSettlement, payload)?;
        let initial = self.is_initial_build_phase();
        if !initial {
            self.ensure_rolled(seat)?;
        }
        if self.players[seat].pieces.settlements == 0 {
            return Err(GameError::PiecesExhausted {
                seat,
                piece: "settlement",
            });
        }
        if self.board.building_at(node).is_some() {
            return Err(BoardError::NodeOccupied(node).into());
        }
        if !self.board.buildable_node_ids(seat, initial).contains(&node) {
            return Err(GameError::IllegalNode(node));
        }
        if !initial {
            self.players[seat].resources.subtract_bundle(&COST_SETTLEMENT)?;
        }

        self.board.build_settlement(seat, node)?;
        let player = &mut self.players[seat];
        player.pieces.settlements -= 1;
        player.award_points(1);

        if initial {
            if self.is_second_round_settlement() {
                let mut starting = ResourceBundle::zero();
                for tile_id in self.map().adjacent_tiles(node) {
                    if let Some(resource) = self.map().tile_resource(*tile_id) {
                        starting.add(resource, 1);
                    }
                }
                self.players[seat].resources.add_bundle(&starting);
            }
            self.players[seat].last_initial_settlement = Some(node);
            self.update_longest_road();
            self.advance_setup();
        } else {
            self.update_longest_road();
            self.prompt = ActionPrompt::PlayTurn;
        }
        Ok(ActionOutcome::None)
    }

    fn build_road(&mut self, seat: usize, payload: &ActionPayload) -> Result<ActionOutcome, GameError> {
        let edge = Self::edge_payload(ActionType::BuildRoad, payload)?;
        let initial = self.is_initial_build_phase();
        if !initial {
            self.ensure_rolled(seat)?;
        }
        if self.players[seat].pieces.roads == 0 {
            return Err(GameError::PiecesExhausted { seat, piece: "road" });
        }
        if self.board.road_owner(edge).is_some() {
            return Err(BoardError::EdgeOccupied(edge).into());
        }
        if !self.board.buildable_edges(seat).contains(&edge) {
            return Err(GameError::IllegalEdge(edge));
        }

        let free = !initial && self.is_road_building && self.free_roads_available > 0;
        if initial {
            let anchor = self.players[seat].last_initial_settlement;
            if !anchor.is_some_and(|node| edge.touches(node)) {
                return Err(GameError::IllegalEdge(edge));
            }
        } else if !free {
            self.players[seat].resources.subtract_bundle(&COST_ROAD)?;
        }

        self.board.build_road(seat, edge)?;
        self.players[seat].pieces.roads -= 1;
        if free {
            self.free_roads_available -= 1;
            if self.free_roads_available == 0 {
                self.is_road_building = false;
            }
        }
        self.update_longest_road();

        if initial {
            self.advance_setup();
        } else {
            self.prompt = ActionPrompt::PlayTurn;
        }
        Ok(ActionOutcome::None)
    }

    fn build_city(&mut self, seat: usize, payload: &ActionPayload) -> Result<ActionOutcome, GameError> {
        let node = Self::node_payload(ActionType::BuildCity, payload)?;
        self.ensure_rolled(seat)?;
        if self.players[seat].pieces.cities == 0 {
            return Err(GameError::PiecesExhausted { seat, piece: "city" });
        }
        let owns_settlement = self
            .board
            .building_at(node)
            .is_some_and(|b| b.owner == seat && b.kind == BuildingKind::Settlement);
        if !owns_settlement {
            return Err(BoardError::NotASettlement { seat, node }.into());
        }
        self.players[seat].resources.subtract_bundle(&COST_CITY)?;

        self.board.build_city(seat, node)?;
        let player = &mut self.players[seat];
        player.pieces.settlements += 1;
        player.pieces.cities -= 1;
        player.award_points(1);
        self.update_longest_road();
        self.prompt = ActionPrompt::PlayTurn;
        Ok(ActionOutcome::None)
    }

    fn buy_development_card(
        &mut self,
        seat: usize,
        payload: &ActionPayload,
    ) -> Result<ActionOutcome, GameError> {
        Self::expect_no_payload(ActionType::BuyDevelopmentCard, payload)?;
        self.ensure_rolled(seat)?;
        if self.development_deck.is_empty() {
            return Err(GameError::DevelopmentDeckEmpty);
        }
        self.players[seat].resources.subtract_bundle(&COST_DEVELOPMENT)?;
        let card = self
            .development_deck
            .draw()
            .ok_or(GameError::DevelopmentDeckEmpty)?;
        self.players[seat].receive_development_card(card);
        Ok(ActionOutcome::DevelopmentCard(card))
    }

    fn ensure_can_play(&self, seat: usize, card: DevelopmentCard) -> Result<(), GameError> {
        self.ensure_rolled(seat)?;
        let player = &self.players[seat];
        if player.has_played_development_card {
            return Err(GameError::DevelopmentCardAlreadyPlayed);
        }
        if !player.can_play(card) {
            return Err(GameError::DevelopmentCardNotPlayable(card));
        }
        Ok(())
    }

    fn play_knight(&mut self, seat: usize, payload: &ActionPayload) -> Result<ActionOutcome, GameError> {
        Self::expect_no_payload(ActionType::PlayKnightCard, payload)?;
        self.ensure_can_play(seat, DevelopmentCard::Knight)?;
        self.players[seat].consume_development_card(DevelopmentCard::Knight);
        self.prompt = ActionPrompt::MoveRobber;
        self.update_largest_army();
        Ok(ActionOutcome::None)
    }

    fn play_year_of_plenty(
        &mut self,
        seat: usize,
        payload: &ActionPayload,
    ) -> Result<ActionOutcome, GameError> {
        let picks = match payload {
            ActionPayload::Resources(picks) if (1..=2).contains(&picks.len()) => picks.clone(),
            other => return Err(Self::invalid_payload(ActionType::PlayYearOfPlenty, other)),
        };
        self.ensure_can_play(seat, DevelopmentCard::YearOfPlenty)?;
        let player = &mut self.players[seat];
        player.consume_development_card(DevelopmentCard::YearOfPlenty);
        for resource in picks {
            player.resources.add(resource, 1);
        }
        Ok(ActionOutcome::None)
    }

    fn play_monopoly(&mut self, seat: usize, payload: &ActionPayload) -> Result<ActionOutcome, GameError> {
        let resource: Resource = match payload {
            ActionPayload::Resource(resource) => *resource,
            other => return Err(Self::invalid_payload(ActionType::PlayMonopoly, other)),
        };
        self.ensure_can_play(seat, DevelopmentCard::Monopoly)?;
        let mut collected = 0;
        for (other, player) in self.players.iter_mut().enumerate() {
            if other == seat {
                continue;
            }
            collected += player.resources.get(resource);
            player.resources.set(resource, 0);
        }
        let player = &mut self.players[seat];
        player.consume_development_card(DevelopmentCard::Monopoly);
        player.resources.add(resource, collected);
        Ok(ActionOutcome::None)
    }

    fn play_road_building(
        &mut self,
        seat: usize,
        payload: &ActionPayload,
    ) -> Result<ActionOutcome, GameError> {
        Self::expect_no_payload(ActionType::PlayRoadBuilding, payload)?;
        self.ensure_can_play(seat, DevelopmentCard::RoadBuilding)?;
        let pieces = self.players[seat].pieces.roads;
        if pieces == 0 || self.board.buildable_edges(seat).is_empty() {
            return Err(GameError::DevelopmentCardNotPlayable(
                DevelopmentCard::RoadBuilding,
            ));
        }
        self.players[seat].consume_development_card(DevelopmentCard::RoadBuilding);
        self.is_road_building = true;
        self.free_roads_available = FREE_ROADS.min(pieces);
        Ok(ActionOutcome::None)
    }

    fn end_turn(&mut self, seat: usize, payload: &ActionPayload) -> Result<ActionOutcome, GameError> {
        Self::expect_no_payload(ActionType::EndTurn, payload)?;
        self.ensure_rolled(seat)?;
        self.players[seat].end_turn();
        self.is_road_building = false;
        self.free_roads_available = 0;
        let next = (self.turn_owner + 1) % self.num_players();
        self.turn_owner = next;
        self.current_player = next;
        self.turn += 1;
        self.prompt = ActionPrompt::PlayTurn;
        Ok(ActionOutcome::None)
    }

    fn update_longest_road(&mut self) {
        let lengths: Vec<usize> = (0..self.num_players())
            .map(|seat| self.board.longest_road_length(seat))
            .collect();
        for (player, length) in self.players.iter_mut().zip(&lengths) {
            player.longest_road_length = *length;
        }
        let incumbent = self.players.iter().position(|p| p.has_longest_road);
        let holder = resolve_bonus_holder(&lengths, LONGEST_ROAD_MIN, incumbent);
        self.transfer_bonus(Bonus::LongestRoad, incumbent, holder);
    }

    fn update_largest_army(&mut self) {
        let knights: Vec<usize> = self
            .players
            .iter()
            .map(|p| p.knights_played as usize)
            .collect();
        let incumbent = self.players.iter().position(|p| p.has_largest_army);
        let holder = resolve_bonus_holder(&knights, LARGEST_ARMY_MIN, incumbent);
        self.transfer_bonus(Bonus::LargestArmy, incumbent, holder);
    }

    fn transfer_bonus(&mut self, bonus: Bonus, from: Option<usize>, to: Option<usize>) {
        if from == to {
            return;
        }
        let set_flag = |state: &mut GameState, seat: usize, value: bool| {
            let player = &mut state.players[seat];
            match bonus {
                Bonus::LongestRoad => player.has_longest_road = value,
                Bonus::LargestArmy => player.has_largest_army = value,
            }
        };
        if let Some(seat) = from {
            set_flag(self, seat, false);
            self.players[seat].revoke_points(BONUS_POINTS);
        }
        if let Some(seat) = to {
            set_flag(self, seat, true);
            self.players[seat].award_points(BONUS_POINTS);
        }
        info!(?bonus, ?from, ?to, "bonus holder changed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bonus_needs_threshold() {
        assert_eq!(resolve_bonus_holder(&[2, 1, 0], 3, None), None);
        assert_eq!(resolve_bonus_holder(&[3, 1, 0], 3, None), Some(0));
    }

    #[test]
    fn incumbent_keeps_bonus_on_tie() {
        assert_eq!(resolve_bonus_holder(&[3, 3], 3, Some(0)), Some(0));
        assert_eq!(resolve_bonus_holder(&[3, 4], 3, Some(0)), Some(1));
    }

    #[test]
    fn tied_challengers_without_incumbent_get_nothing() {
        assert_eq!(resolve_bonus_holder(&[5, 5, 2], 5, None), None);
        // Incumbent overtaken by two tied seats loses it to nobody.
        assert_eq!(resolve_bonus_holder(&[5, 7, 7], 5, Some(0)), None);
    }

    #[test]
    fn prompts_gate_action_kinds() {
        assert!(prompt_allows(ActionPrompt::PlayTurn, ActionType::Roll));
        assert!(!prompt_allows(ActionPrompt::PlayTurn, ActionType::Discard));
        assert!(prompt_allows(ActionPrompt::BuildInitialRoad, ActionType::BuildRoad));
        assert!(!prompt_allows(ActionPrompt::MoveRobber, ActionType::EndTurn));
    }
}
