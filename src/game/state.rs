use std::sync::Arc;

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::board::{Board, BoardError, CatanMap, EdgeId, MapError, NodeId, TileId};
use crate::types::{ActionPrompt, ActionType, BuildingKind, Color, DevelopmentCard};

use super::{
    action::{ActionPayload, ActionRecord},
    config::{ConfigError, GameConfig},
    deck::DevelopmentDeck,
    players::PlayerState,
    resources::{ResourceBundle, ResourceError},
};

/// Broad classes of rejection, matching how a driver would react to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    IllegalAction,
    Unaffordable,
    InvariantViolation,
}

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("{0} is not currently playable")]
    ActionNotPlayable(ActionType),
    #[error("action by seat {actual} but seat {expected} is to act")]
    ActionOutOfTurn { expected: usize, actual: usize },
    #[error("{action} is invalid for prompt {prompt}")]
    InvalidPrompt {
        action: ActionType,
        prompt: ActionPrompt,
    },
    #[error("invalid payload for {action}: {payload:?}")]
    InvalidPayload {
        action: ActionType,
        payload: ActionPayload,
    },
    #[error("node {0} is not buildable")]
    IllegalNode(NodeId),
    #[error("edge {0} is not buildable")]
    IllegalEdge(EdgeId),
    #[error("tile {0} is not a valid robber target")]
    IllegalTile(TileId),
    #[error(transparent)]
    Unaffordable(#[from] ResourceError),
    #[error("seat {seat} has no {piece} pieces left")]
    PiecesExhausted { seat: usize, piece: &'static str },
    #[error("seat must roll before acting")]
    MustRollFirst,
    #[error("seat already rolled this turn")]
    AlreadyRolled,
    #[error("development deck is empty")]
    DevelopmentDeckEmpty,
    #[error("a development card was already played this turn")]
    DevelopmentCardAlreadyPlayed,
    #[error("{0} cannot be played now")]
    DevelopmentCardNotPlayable(DevelopmentCard),
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error(transparent)]
    Map(#[from] MapError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("seat {0} did not choose an action")]
    NoDecision(usize),
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::Unaffordable(_) => ErrorKind::Unaffordable,
            GameError::Board(_)
            | GameError::DevelopmentCardAlreadyPlayed
            | GameError::Map(_)
            | GameError::Config(_) => ErrorKind::InvariantViolation,
            _ => ErrorKind::IllegalAction,
        }
    }
}

#[derive(Debug, Clone)]
pub enum GamePhase {
    Setup(SetupState),
    Playing,
}

#[derive(Debug, Clone)]
pub struct GameState {
    pub config: GameConfig,
    pub board: Board,
    pub colors: Arc<[Color]>,
    pub players: Vec<PlayerState>,
    pub development_deck: DevelopmentDeck,
    pub phase: GamePhase,
    pub prompt: ActionPrompt,
    /// Seat expected to act next; differs from `turn_owner` while discarding.
    pub current_player: usize,
    pub turn_owner: usize,
    pub turn: u32,
    pub robber_tile: TileId,
    pub discard_limit: u32,
    pub is_road_building: bool,
    pub free_roads_available: u8,
    pub last_roll: Option<(u8, u8)>,
    pub actions: Vec<ActionRecord>,
    pub(super) rng: StdRng,
}

impl GameState {
    /// Seeds every random choice of the game (map shuffle, deck, dice,
    /// robber steals) from `config.seed`.
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        let rng = StdRng::seed_from_u64(config.seed);
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: GameConfig, mut rng: StdRng) -> Result<Self, GameError> {
        config.validate()?;
        let map = CatanMap::build(config.map_type, &mut rng)?;
        Self::with_map(config, Arc::new(map), rng)
    }

    /// Starts a game on an already-built map, which may be shared between games.
    pub fn with_map(
        config: GameConfig,
        map: Arc<CatanMap>,
        mut rng: StdRng,
    ) -> Result<Self, GameError> {
        config.validate()?;
        let num_players = config.num_players;
        let colors: Arc<[Color]> = Color::ORDERED[..num_players].into();
        let players = colors.iter().map(|color| PlayerState::new(*color)).collect();
        let robber_tile = map
            .desert_tile
            .or_else(|| map.land_tile_ids().next())
            .unwrap_or_default();
        let development_deck = DevelopmentDeck::standard(&mut rng);
        let setup = SetupState::new(num_players);
        let first = setup.current_player().unwrap_or(0);

        Ok(Self {
            discard_limit: config.discard_limit,
            config,
            board: Board::new(map),
            colors,
            players,
            development_deck,
            phase: GamePhase::Setup(setup),
            prompt: ActionPrompt::BuildInitialSettlement,
            current_player: first,
            turn_owner: first,
            turn: 0,
            robber_tile,
            is_road_building: false,
            free_roads_available: 0,
            last_roll: None,
            actions: Vec::new(),
            rng,
        })
    }

    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    pub fn map(&self) -> &CatanMap {
        self.board.map()
    }

    pub fn current_color(&self) -> Color {
        self.colors[self.current_player]
    }

    pub fn current(&self) -> &PlayerState {
        &self.players[self.current_player]
    }

    pub fn is_initial_build_phase(&self) -> bool {
        matches!(self.phase, GamePhase::Setup(_))
    }

    pub(super) fn is_second_round_settlement(&self) -> bool {
        match &self.phase {
            GamePhase::Setup(setup) => setup.is_second_settlement(),
            GamePhase::Playing => false,
        }
    }

    pub(super) fn roll_die(&mut self) -> u8 {
        self.rng.gen_range(1..=6)
    }

    /// What each seat would collect if `number` were rolled now.
    pub fn yield_for_roll(&self, number: u8) -> Vec<ResourceBundle> {
        let mut payouts = vec![ResourceBundle::zero(); self.num_players()];
        let map = self.map();
        for tile_id in map.tile_ids_by_number(number) {
            if *tile_id == self.robber_tile {
                continue;
            }
            let Some(tile) = map.tile(*tile_id) else {
                continue;
            };
            let Some(resource) = tile.resource else {
                continue;
            };
            for node in tile.nodes {
                if let Some(building) = self.board.building_at(node) {
                    let amount = match building.kind {
                        BuildingKind::Settlement => 1,
                        BuildingKind::City => 2,
                    };
                    payouts[building.owner].add(resource, amount);
                }
            }
        }
        payouts
    }

    /// First seat, scanning from the turn owner, holding more cards than the
    /// discard limit.
    pub fn next_over_limit_seat(&self) -> Option<usize> {
        let n = self.num_players();
        (0..n)
            .map(|offset| (self.turn_owner + offset) % n)
            .find(|seat| self.players[*seat].resources.total() > self.discard_limit)
    }

    /// Moves past the current setup step; leaves the setup phase once the
    /// last initial road is down.
    pub(super) fn advance_setup(&mut self) {
        let GamePhase::Setup(setup) = &mut self.phase else {
            return;
        };
        setup.advance();
        match (setup.current_prompt(), setup.current_player()) {
            (Some(prompt), Some(seat)) => {
                self.prompt = prompt;
                self.current_player = seat;
                self.turn_owner = seat;
            }
            _ => {
                self.phase = GamePhase::Playing;
                self.prompt = ActionPrompt::PlayTurn;
                self.current_player = 0;
                self.turn_owner = 0;
                info!("initial placement complete");
            }
        }
    }
}

/// Snake order: seats place forward, then in reverse, each placing a
/// settlement and then a road.
#[derive(Debug, Clone)]
pub struct SetupState {
    steps: Vec<SetupStep>,
    cursor: usize,
}

#[derive(Debug, Clone)]
struct SetupStep {
    player_index: usize,
    prompt: ActionPrompt,
    second_round: bool,
}

impl SetupState {
    fn new(num_players: usize) -> Self {
        let forward = (0..num_players).map(|seat| (seat, false));
        let backward = (0..num_players).rev().map(|seat| (seat, true));
        let steps = forward
            .chain(backward)
            .flat_map(|(player_index, second_round)| {
                [
                    ActionPrompt::BuildInitialSettlement,
                    ActionPrompt::BuildInitialRoad,
                ]
                .map(|prompt| SetupStep {
                    player_index,
                    prompt,
                    second_round,
                })
            })
            .collect();
        Self { steps, cursor: 0 }
    }

    pub fn current_prompt(&self) -> Option<ActionPrompt> {
        self.steps.get(self.cursor).map(|step| step.prompt)
    }

    pub fn current_player(&self) -> Option<usize> {
        self.steps.get(self.cursor).map(|step| step.player_index)
    }

    fn is_second_settlement(&self) -> bool {
        self.steps.get(self.cursor).is_some_and(|step| {
            step.second_round && step.prompt == ActionPrompt::BuildInitialSettlement
        })
    }

    fn advance(&mut self) {
        if self.cursor < self.steps.len() {
            self.cursor += 1;
        }
    }
}
