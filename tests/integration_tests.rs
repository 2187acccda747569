use std::collections::BTreeSet;

use catanatron_engine::board::{EdgeId, LandTile, MapType, NodeId, TileId};
use catanatron_engine::game::{
    ActionOutcome, ActionPayload, COST_CITY, COST_DEVELOPMENT, COST_SETTLEMENT, ErrorKind, Game, GameAction,
    GameConfig, GameError, GameState, ResourceBundle,
};
use catanatron_engine::types::{
    ActionPrompt, ActionType, BuildingKind, DevelopmentCard, EdgeRef, NodeRef, Resource,
};
use pretty_assertions::assert_eq;
use smallvec::smallvec;

fn new_state(num_players: usize) -> GameState {
    GameState::new(GameConfig {
        num_players,
        map_type: MapType::Tournament,
        seed: 99,
        ..GameConfig::default()
    })
    .unwrap()
}

fn apply(state: &mut GameState, action_type: ActionType, payload: ActionPayload) -> ActionOutcome {
    let action = GameAction::new(state.current_player, action_type).with_payload(payload);
    state.apply(&action).unwrap().outcome
}

/// Places every initial settlement and road on the first legal option.
fn finish_setup(state: &mut GameState) {
    while state.is_initial_build_phase() {
        let action = state.generate_playable_actions().remove(0);
        state.apply(&action).unwrap();
    }
}

fn roll(state: &mut GameState, a: u8, b: u8) {
    apply(state, ActionType::Roll, ActionPayload::Dice(a, b));
}

/// A roll that pays nothing on the tournament map.
fn quiet_roll(state: &mut GameState) {
    assert!(state.map().tile_ids_by_number(12).len() <= 1);
    let before: Vec<_> = state.players.iter().map(|p| p.resources).collect();
    let saved = state.robber_tile;
    // Park the robber on the only 12 so the roll is a no-op.
    state.robber_tile = state.map().tile_ids_by_number(12)[0];
    roll(state, 6, 6);
    state.robber_tile = saved;
    let after: Vec<_> = state.players.iter().map(|p| p.resources).collect();
    assert_eq!(before, after);
}

fn give_playable(state: &mut GameState, seat: usize, card: DevelopmentCard, count: u8) {
    let holding = state.players[seat].development_cards.get_mut(card);
    holding.in_hand += count;
    holding.owned_at_start = true;
}

fn snapshot(state: &GameState) -> String {
    let buildings: Vec<_> = state.board.buildings().collect();
    let roads: Vec<_> = (0..state.num_players())
        .flat_map(|seat| state.board.roads_of(seat).map(move |edge| (seat, edge)))
        .collect();
    format!(
        "{:?}|{:?}|{:?}|{:?}|{}|{}|{}|{}",
        state.players,
        buildings,
        roads,
        state.prompt,
        state.current_player,
        state.robber_tile,
        state.development_deck.len(),
        state.actions.len()
    )
}

#[test]
fn setup_follows_snake_order_and_grants_starting_resources() {
    let mut state = new_state(2);
    let mut order = Vec::new();
    while state.is_initial_build_phase() {
        order.push((state.current_player, state.prompt));
        let action = state.generate_playable_actions().remove(0);
        state.apply(&action).unwrap();
    }
    let seats: Vec<usize> = order.iter().map(|(seat, _)| *seat).collect();
    assert_eq!(seats, vec![0, 0, 1, 1, 1, 1, 0, 0]);
    assert_eq!(state.prompt, ActionPrompt::PlayTurn);
    assert_eq!(state.current_player, 0);

    for (seat, player) in state.players.iter().enumerate() {
        assert_eq!(player.pieces.settlements, 3);
        assert_eq!(player.pieces.roads, 13);
        assert_eq!(player.victory_points, 2);
        let second = player.last_initial_settlement.unwrap();
        let expected: u32 = state
            .map()
            .adjacent_tiles(second)
            .iter()
            .filter(|tile| state.map().tile_resource(**tile).is_some())
            .count() as u32;
        assert_eq!(player.resources.total(), expected, "seat {seat}");
    }
}

#[test]
fn four_seat_distance_rule_excludes_neighbors() {
    let mut game = Game::new(GameConfig {
        num_players: 4,
        map_type: MapType::Tournament,
        ..GameConfig::default()
    })
    .unwrap();

    let node = game
        .playable_actions()
        .iter()
        .filter_map(|a| match a.payload {
            ActionPayload::Node(node) => Some(node),
            _ => None,
        })
        .min()
        .unwrap();
    game.execute(GameAction::new(0, ActionType::BuildSettlement).with_payload(ActionPayload::Node(node)))
        .unwrap();
    let road = game.playable_actions()[0].clone();
    match road.payload {
        ActionPayload::Edge(edge) => assert!(edge.touches(node)),
        ref other => panic!("expected an edge payload, got {other:?}"),
    }
    game.execute(road).unwrap();

    assert_eq!(game.state.current_player, 1);
    let buildable = game.state.board.buildable_node_ids(1, true);
    assert!(!buildable.contains(&node));
    for neighbor in game.state.map().neighbors(node) {
        assert!(!buildable.contains(&neighbor));
    }
    let offered: BTreeSet<NodeId> = game
        .playable_actions()
        .iter()
        .filter_map(|a| match a.payload {
            ActionPayload::Node(node) => Some(node),
            _ => None,
        })
        .collect();
    assert_eq!(offered, buildable);
}

#[test]
fn single_seat_yield_eight_and_robber() {
    let mut state = new_state(1);
    let map = state.board.shared_map();
    let eights = |node: NodeId| -> Vec<TileId> {
        map.adjacent_tiles(node)
            .iter()
            .copied()
            .filter(|tile| map.tile_number(*tile) == Some(8))
            .collect()
    };

    let eight_tile = map.tile_ids_by_number(8)[0];
    let node = map.tile_nodes(eight_tile).unwrap()[0];
    let contributing = eights(node);
    assert!(!contributing.is_empty());

    apply(&mut state, ActionType::BuildSettlement, ActionPayload::Node(node));
    let road = state.generate_playable_actions().remove(0);
    state.apply(&road).unwrap();

    let second = state
        .board
        .buildable_node_ids(0, true)
        .into_iter()
        .find(|candidate| eights(*candidate).is_empty())
        .unwrap();
    apply(&mut state, ActionType::BuildSettlement, ActionPayload::Node(second));
    let road = state.generate_playable_actions().remove(0);
    state.apply(&road).unwrap();
    assert_eq!(state.prompt, ActionPrompt::PlayTurn);

    let before = state.players[0].resources.total();
    roll(&mut state, 3, 5);
    let gained = state.players[0].resources.total() - before;
    assert_eq!(gained, contributing.len() as u32);

    apply(&mut state, ActionType::EndTurn, ActionPayload::None);
    roll(&mut state, 3, 4);
    assert_eq!(state.prompt, ActionPrompt::MoveRobber);
    let outcome = apply(&mut state, ActionType::MoveRobber, ActionPayload::Tile(contributing[0]));
    assert_eq!(outcome, ActionOutcome::NothingStolen);
    apply(&mut state, ActionType::EndTurn, ActionPayload::None);

    let before = state.players[0].resources.total();
    roll(&mut state, 3, 5);
    let gained_with_robber = state.players[0].resources.total() - before;
    assert_eq!(gained_with_robber, gained - 1);
}

#[test]
fn city_pays_double_and_scores() {
    let mut state = new_state(1);
    finish_setup(&mut state);
    quiet_roll(&mut state);

    let node = state.players[0].last_initial_settlement.unwrap();
    state.players[0].resources = COST_CITY;
    let points = state.players[0].victory_points;
    apply(&mut state, ActionType::BuildCity, ActionPayload::Node(node));

    let player = &state.players[0];
    assert!(player.resources.is_empty());
    assert_eq!(player.victory_points, points + 1);
    assert_eq!(player.pieces.cities, 3);
    assert_eq!(player.pieces.settlements, 4);
    assert_eq!(state.board.building_at(node).unwrap().kind, BuildingKind::City);

    let tile = state
        .map()
        .adjacent_tiles(node)
        .iter()
        .copied()
        .find(|t| *t != state.robber_tile && state.map().tile_number(*t).is_some())
        .unwrap();
    let number = state.map().tile_number(tile).unwrap();
    let payout = state.yield_for_roll(number);
    let resource = state.map().tile_resource(tile).unwrap();
    assert!(payout[0].get(resource) >= 2);
}

#[test]
fn year_of_plenty_grants_exactly_the_selection() {
    for (picks, expected) in [
        (
            smallvec![Resource::Wheat, Resource::Wheat],
            ResourceBundle::single(Resource::Wheat, 2),
        ),
        (
            smallvec![Resource::Wood, Resource::Brick],
            ResourceBundle::from_counts([1, 1, 0, 0, 0]),
        ),
    ] {
        let mut state = new_state(1);
        finish_setup(&mut state);
        give_playable(&mut state, 0, DevelopmentCard::YearOfPlenty, 1);
        quiet_roll(&mut state);

        let before = state.players[0].resources;
        apply(&mut state, ActionType::PlayYearOfPlenty, ActionPayload::Resources(picks));
        let after = state.players[0].resources;
        for resource in Resource::ALL {
            assert_eq!(after.get(resource) - before.get(resource), expected.get(resource));
        }
        assert!(state.players[0].has_played_development_card);
        assert_eq!(state.players[0].development_cards.in_hand(DevelopmentCard::YearOfPlenty), 0);
    }
}

#[test]
fn buying_with_exact_funds_draws_one_card() {
    let mut state = new_state(1);
    finish_setup(&mut state);
    quiet_roll(&mut state);
    state.players[0].resources = COST_DEVELOPMENT;
    let actual_before = state.players[0].actual_victory_points;
    let deck_before = state.development_deck.len();

    let outcome = apply(&mut state, ActionType::BuyDevelopmentCard, ActionPayload::None);
    let ActionOutcome::DevelopmentCard(card) = outcome else {
        panic!("expected a drawn card, got {outcome:?}");
    };

    let player = &state.players[0];
    assert!(player.resources.is_empty());
    assert_eq!(player.development_cards.total_in_hand(), 1);
    assert_eq!(player.development_cards.in_hand(card), 1);
    assert_eq!(state.development_deck.len(), deck_before - 1);
    let bonus = u8::from(card == DevelopmentCard::VictoryPoint);
    assert_eq!(player.actual_victory_points, actual_before + bonus);
}

#[test]
fn freshly_bought_card_waits_a_turn() {
    let mut state = new_state(1);
    finish_setup(&mut state);
    quiet_roll(&mut state);
    state.players[0].receive_development_card(DevelopmentCard::Monopoly);
    let err = state
        .apply(
            &GameAction::new(0, ActionType::PlayMonopoly)
                .with_payload(ActionPayload::Resource(Resource::Ore)),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        GameError::DevelopmentCardNotPlayable(DevelopmentCard::Monopoly)
    ));

    apply(&mut state, ActionType::EndTurn, ActionPayload::None);
    quiet_roll(&mut state);
    apply(&mut state, ActionType::PlayMonopoly, ActionPayload::Resource(Resource::Ore));
}

#[test]
fn second_development_card_in_a_turn_is_rejected() {
    let mut game = Game::from_state(new_state(1));
    finish_setup(&mut game.state);
    give_playable(&mut game.state, 0, DevelopmentCard::Monopoly, 1);
    give_playable(&mut game.state, 0, DevelopmentCard::Knight, 1);
    quiet_roll(&mut game.state);

    game.execute(
        GameAction::new(0, ActionType::PlayMonopoly).with_payload(ActionPayload::Resource(Resource::Wood)),
    )
    .unwrap();
    let knight = GameAction::new(0, ActionType::PlayKnightCard);
    let err = game.execute(knight.clone()).unwrap_err();
    assert!(matches!(err, GameError::ActionNotPlayable(ActionType::PlayKnightCard)));
    assert_eq!(err.kind(), ErrorKind::IllegalAction);

    let err = game.state.apply(&knight).unwrap_err();
    assert!(matches!(err, GameError::DevelopmentCardAlreadyPlayed));
    assert_eq!(err.kind(), ErrorKind::InvariantViolation);
    assert_eq!(game.state.players[0].knights_played, 0);
}

#[test]
fn monopoly_collects_every_opponent_holding() {
    let mut state = new_state(3);
    finish_setup(&mut state);
    give_playable(&mut state, 0, DevelopmentCard::Monopoly, 1);
    quiet_roll(&mut state);
    state.players[0].resources = ResourceBundle::from_counts([0, 0, 0, 1, 0]);
    state.players[1].resources = ResourceBundle::from_counts([2, 0, 0, 3, 0]);
    state.players[2].resources = ResourceBundle::from_counts([0, 1, 0, 4, 1]);

    apply(&mut state, ActionType::PlayMonopoly, ActionPayload::Resource(Resource::Wheat));

    assert_eq!(state.players[0].resources, ResourceBundle::from_counts([0, 0, 0, 8, 0]));
    assert_eq!(state.players[1].resources, ResourceBundle::from_counts([2, 0, 0, 0, 0]));
    assert_eq!(state.players[2].resources, ResourceBundle::from_counts([0, 1, 0, 0, 1]));
}

#[test]
fn largest_army_transfers_only_on_a_strict_lead() {
    let mut state = new_state(2);
    finish_setup(&mut state);
    let base: Vec<u8> = state.players.iter().map(|p| p.actual_victory_points).collect();
    give_playable(&mut state, 0, DevelopmentCard::Knight, 1);
    give_playable(&mut state, 1, DevelopmentCard::Knight, 2);
    state.players[0].knights_played = 2;
    state.players[1].knights_played = 2;

    let knight_turn = |state: &mut GameState| {
        quiet_roll(state);
        apply(state, ActionType::PlayKnightCard, ActionPayload::None);
        assert_eq!(state.prompt, ActionPrompt::MoveRobber);
        let target = state
            .map()
            .land_tile_ids()
            .find(|tile| *tile != state.robber_tile)
            .unwrap();
        apply(state, ActionType::MoveRobber, ActionPayload::Tile(target));
        assert_eq!(state.prompt, ActionPrompt::PlayTurn);
        apply(state, ActionType::EndTurn, ActionPayload::None);
    };

    // Seat 0 reaches three knights first.
    knight_turn(&mut state);
    assert!(state.players[0].has_largest_army);
    assert_eq!(state.players[0].actual_victory_points, base[0] + 2);

    // Seat 1 ties at three: no transfer.
    knight_turn(&mut state);
    assert!(state.players[0].has_largest_army);
    assert!(!state.players[1].has_largest_army);
    assert_eq!(state.players[1].actual_victory_points, base[1]);

    quiet_roll(&mut state);
    apply(&mut state, ActionType::EndTurn, ActionPayload::None);

    // Seat 1 pulls ahead with four.
    knight_turn(&mut state);
    assert!(!state.players[0].has_largest_army);
    assert!(state.players[1].has_largest_army);
    assert_eq!(state.players[0].actual_victory_points, base[0]);
    assert_eq!(state.players[1].actual_victory_points, base[1] + 2);
    assert_eq!(state.players[1].victory_points, base[1] + 2);
}

#[test]
fn road_building_places_two_free_roads() {
    let mut state = new_state(1);
    finish_setup(&mut state);
    give_playable(&mut state, 0, DevelopmentCard::RoadBuilding, 1);
    quiet_roll(&mut state);
    state.players[0].resources = ResourceBundle::zero();

    apply(&mut state, ActionType::PlayRoadBuilding, ActionPayload::None);
    assert!(state.is_road_building);
    assert_eq!(state.free_roads_available, 2);

    for remaining in [1, 0] {
        let road = state
            .generate_playable_actions()
            .into_iter()
            .find(|a| a.action_type == ActionType::BuildRoad)
            .unwrap();
        state.apply(&road).unwrap();
        assert_eq!(state.free_roads_available, remaining);
    }
    assert!(!state.is_road_building);
    assert_eq!(state.players[0].pieces.roads, 11);
    assert!(
        state
            .generate_playable_actions()
            .iter()
            .all(|a| a.action_type != ActionType::BuildRoad)
    );

    let edge = *state.board.buildable_edges(0).iter().next().unwrap();
    let err = state
        .apply(&GameAction::new(0, ActionType::BuildRoad).with_payload(ActionPayload::Edge(edge)))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unaffordable);
}

#[test]
fn longest_road_bonus_arrives_at_five() {
    let mut state = new_state(1);
    finish_setup(&mut state);
    quiet_roll(&mut state);

    let own_nodes: BTreeSet<NodeId> = state
        .board
        .roads_of(0)
        .flat_map(|edge| edge.nodes())
        .chain(state.board.owned_nodes(0))
        .collect();
    let ring = state
        .map()
        .tiles_by_id
        .values()
        .find(|tile| tile.nodes.iter().all(|node| !own_nodes.contains(node)))
        .unwrap()
        .clone();

    for slot in [EdgeRef::East, EdgeRef::SouthEast, EdgeRef::SouthWest, EdgeRef::West] {
        state.board.build_road(0, ring.edge(slot)).unwrap();
    }
    let points = state.players[0].victory_points;
    state.players[0].resources = ResourceBundle::from_counts([1, 1, 0, 0, 0]);
    apply(&mut state, ActionType::BuildRoad, ActionPayload::Edge(ring.edge(EdgeRef::NorthWest)));

    let player = &state.players[0];
    assert_eq!(player.longest_road_length, 5);
    assert!(player.has_longest_road);
    assert_eq!(player.victory_points, points + 2);
}

#[test]
fn seven_forces_discard_then_robber() {
    let mut state = new_state(2);
    finish_setup(&mut state);
    state.players[0].resources = ResourceBundle::zero();
    state.players[1].resources = ResourceBundle::from_counts([3, 3, 2, 2, 0]);

    roll(&mut state, 3, 4);
    assert_eq!(state.prompt, ActionPrompt::Discard);
    assert_eq!(state.current_player, 1);
    assert_eq!(state.generate_playable_actions(), vec![GameAction::new(1, ActionType::Discard)]);

    let outcome = apply(&mut state, ActionType::Discard, ActionPayload::None);
    assert_eq!(
        outcome,
        ActionOutcome::Discarded(ResourceBundle::from_counts([3, 0, 0, 0, 0]))
    );
    assert_eq!(state.players[1].resources, ResourceBundle::from_counts([0, 3, 2, 2, 0]));
    assert_eq!(state.prompt, ActionPrompt::MoveRobber);
    assert_eq!(state.current_player, 0);
}

#[test]
fn robber_steals_from_a_building_owner() {
    let mut state = new_state(2);
    finish_setup(&mut state);
    let victim_node = state.players[1].last_initial_settlement.unwrap();
    let target = state
        .map()
        .adjacent_tiles(victim_node)
        .iter()
        .copied()
        .find(|tile| *tile != state.robber_tile)
        .unwrap();
    state.players[0].resources = ResourceBundle::zero();
    state.players[1].resources = ResourceBundle::single(Resource::Ore, 1);

    roll(&mut state, 5, 2);
    assert_eq!(state.prompt, ActionPrompt::MoveRobber);
    let outcome = apply(&mut state, ActionType::MoveRobber, ActionPayload::Tile(target));
    assert_eq!(
        outcome,
        ActionOutcome::Stolen {
            victim: 1,
            resource: Resource::Ore
        }
    );
    assert_eq!(state.players[0].resources, ResourceBundle::single(Resource::Ore, 1));
    assert!(state.players[1].resources.is_empty());
    assert_eq!(state.robber_tile, target);

    let err = state
        .apply(&GameAction::new(0, ActionType::MoveRobber).with_payload(ActionPayload::Tile(target)))
        .unwrap_err();
    assert!(matches!(err, GameError::InvalidPrompt { .. }));
}

#[test]
fn rejected_actions_leave_state_untouched() {
    let mut state = new_state(2);
    finish_setup(&mut state);
    quiet_roll(&mut state);
    state.players[0].resources = ResourceBundle::zero();
    let before = snapshot(&state);

    let occupied = state.players[1].last_initial_settlement.unwrap();
    let attempts = [
        GameAction::new(1, ActionType::EndTurn),
        GameAction::new(0, ActionType::Roll),
        GameAction::new(0, ActionType::BuildCity).with_payload(ActionPayload::Node(occupied)),
        GameAction::new(0, ActionType::BuildSettlement).with_payload(ActionPayload::Node(occupied)),
        GameAction::new(0, ActionType::BuildRoad).with_payload(ActionPayload::Node(occupied)),
        GameAction::new(0, ActionType::MoveRobber).with_payload(ActionPayload::Tile(1)),
        GameAction::new(0, ActionType::PlayYearOfPlenty)
            .with_payload(ActionPayload::Resources(smallvec![])),
        GameAction::new(0, ActionType::BuyDevelopmentCard),
    ];
    for attempt in attempts {
        assert!(state.apply(&attempt).is_err(), "{attempt:?} should be rejected");
        assert_eq!(snapshot(&state), before);
    }

    let own = state.players[0].last_initial_settlement.unwrap();
    state.players[0].resources = ResourceBundle::from_counts([0, 0, 0, 2, 2]);
    let before = snapshot(&state);
    let err = state
        .apply(&GameAction::new(0, ActionType::BuildCity).with_payload(ActionPayload::Node(own)))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unaffordable);
    assert_eq!(snapshot(&state), before);
}

#[test]
fn end_turn_rotates_and_counts() {
    let mut state = new_state(3);
    finish_setup(&mut state);
    for expected in [1, 2, 0, 1] {
        quiet_roll(&mut state);
        apply(&mut state, ActionType::EndTurn, ActionPayload::None);
        assert_eq!(state.current_player, expected);
        assert_eq!(state.turn_owner, expected);
        assert!(!state.players[expected].has_rolled);
    }
    assert_eq!(state.turn, 4);
}

/// Land tiles whose corners carry no road, building or distance-rule block
/// and which share no corner with `avoid`.
fn untouched_tiles(state: &GameState, avoid: &BTreeSet<NodeId>) -> Vec<LandTile> {
    let mut touched: BTreeSet<NodeId> = avoid.clone();
    for seat in 0..state.num_players() {
        touched.extend(state.board.roads_of(seat).flat_map(|edge| edge.nodes()));
        touched.extend(state.board.owned_nodes(seat));
    }
    state
        .map()
        .tiles_by_id
        .values()
        .filter(|tile| {
            tile.nodes
                .iter()
                .all(|node| !touched.contains(node) && !state.board.is_blocked(*node))
        })
        .cloned()
        .collect()
}

/// Lays the first four edges of `tile` directly, then pays for the fifth.
fn five_road_chain(state: &mut GameState, seat: usize, tile: &LandTile) {
    for slot in [EdgeRef::East, EdgeRef::SouthEast, EdgeRef::SouthWest, EdgeRef::West] {
        state.board.build_road(seat, tile.edge(slot)).unwrap();
    }
    state.players[seat].resources = ResourceBundle::from_counts([1, 1, 0, 0, 0]);
    apply(state, ActionType::BuildRoad, ActionPayload::Edge(tile.edge(EdgeRef::NorthWest)));
    assert_eq!(state.players[seat].longest_road_length, 5);
}

fn points(state: &GameState, seat: usize) -> (u8, u8) {
    let player = &state.players[seat];
    (player.victory_points, player.actual_victory_points)
}

#[test]
fn settlement_cutting_the_chain_revokes_longest_road() {
    let mut state = new_state(2);
    finish_setup(&mut state);
    quiet_roll(&mut state);

    // A middle corner of the chain with a spur leading off the tile.
    let (tile, cut, spur) = untouched_tiles(&state, &BTreeSet::new())
        .into_iter()
        .find_map(|tile| {
            [NodeRef::South, NodeRef::SouthWest].into_iter().find_map(|corner| {
                let node = tile.node(corner);
                let spur: Option<EdgeId> = state
                    .map()
                    .edges_of(node)
                    .find(|edge| !tile.edges.contains(edge));
                spur.map(|spur| (tile.clone(), node, spur))
            })
        })
        .expect("an open inland tile");

    let before = points(&state, 0);
    five_road_chain(&mut state, 0, &tile);
    assert!(state.players[0].has_longest_road);
    assert_eq!(points(&state, 0), (before.0 + 2, before.1 + 2));
    apply(&mut state, ActionType::EndTurn, ActionPayload::None);

    quiet_roll(&mut state);
    state.board.build_road(1, spur).unwrap();
    state.players[1].resources = COST_SETTLEMENT;
    let rival_before = points(&state, 1);
    apply(&mut state, ActionType::BuildSettlement, ActionPayload::Node(cut));

    let holder = &state.players[0];
    assert_eq!(holder.longest_road_length, 3);
    assert!(!holder.has_longest_road);
    assert_eq!(points(&state, 0), before);
    assert!(!state.players[1].has_longest_road);
    assert_eq!(points(&state, 1), (rival_before.0 + 1, rival_before.1 + 1));
}

#[test]
fn longer_road_takes_the_bonus_but_a_tie_does_not() {
    let mut state = new_state(2);
    finish_setup(&mut state);
    quiet_roll(&mut state);

    let first = untouched_tiles(&state, &BTreeSet::new())
        .into_iter()
        .next()
        .expect("an open tile for seat 0");
    let second = untouched_tiles(&state, &first.nodes.iter().copied().collect())
        .into_iter()
        .next()
        .expect("a second open tile for seat 1");

    let base = [points(&state, 0), points(&state, 1)];
    five_road_chain(&mut state, 0, &first);
    assert!(state.players[0].has_longest_road);
    apply(&mut state, ActionType::EndTurn, ActionPayload::None);

    quiet_roll(&mut state);
    five_road_chain(&mut state, 1, &second);
    assert!(state.players[0].has_longest_road);
    assert!(!state.players[1].has_longest_road);
    assert_eq!(points(&state, 0), (base[0].0 + 2, base[0].1 + 2));
    assert_eq!(points(&state, 1), base[1]);

    state.players[1].resources = ResourceBundle::from_counts([1, 1, 0, 0, 0]);
    apply(&mut state, ActionType::BuildRoad, ActionPayload::Edge(second.edge(EdgeRef::NorthEast)));
    assert_eq!(state.players[1].longest_road_length, 6);
    assert!(!state.players[0].has_longest_road);
    assert!(state.players[1].has_longest_road);
    assert_eq!(points(&state, 0), base[0]);
    assert_eq!(points(&state, 1), (base[1].0 + 2, base[1].1 + 2));
}

#[test]
fn road_building_needs_road_pieces() {
    let mut state = new_state(1);
    finish_setup(&mut state);
    give_playable(&mut state, 0, DevelopmentCard::RoadBuilding, 1);
    quiet_roll(&mut state);

    state.players[0].pieces.roads = 0;
    assert!(
        state
            .generate_playable_actions()
            .iter()
            .all(|a| a.action_type != ActionType::PlayRoadBuilding)
    );
    let err = state
        .apply(&GameAction::new(0, ActionType::PlayRoadBuilding))
        .unwrap_err();
    assert!(matches!(
        err,
        GameError::DevelopmentCardNotPlayable(DevelopmentCard::RoadBuilding)
    ));
    assert_eq!(state.players[0].development_cards.in_hand(DevelopmentCard::RoadBuilding), 1);

    state.players[0].pieces.roads = 1;
    apply(&mut state, ActionType::PlayRoadBuilding, ActionPayload::None);
    assert_eq!(state.free_roads_available, 1);
}
