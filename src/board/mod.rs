use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use tracing::debug;

use crate::coords::{CubeCoord, Direction, InvalidCoordinate};
use crate::types::{EdgeRef, NodeRef, Resource};

pub mod placement;
mod templates;

pub use placement::{Board, BoardError, Building};

pub type NodeId = u16;
pub type TileId = u16;

/// An undirected edge between two nodes, always stored as `(min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "(NodeId, NodeId)", into = "(NodeId, NodeId)")]
pub struct EdgeId(NodeId, NodeId);

impl EdgeId {
    pub fn new(u: NodeId, v: NodeId) -> Self {
        if u <= v { EdgeId(u, v) } else { EdgeId(v, u) }
    }

    pub fn a(self) -> NodeId {
        self.0
    }

    pub fn b(self) -> NodeId {
        self.1
    }

    pub fn nodes(self) -> [NodeId; 2] {
        [self.0, self.1]
    }

    pub fn touches(self, node: NodeId) -> bool {
        self.0 == node || self.1 == node
    }

    /// The endpoint opposite `node`, if `node` is an endpoint at all.
    pub fn other(self, node: NodeId) -> Option<NodeId> {
        if self.0 == node {
            Some(self.1)
        } else if self.1 == node {
            Some(self.0)
        } else {
            None
        }
    }
}

impl From<(NodeId, NodeId)> for EdgeId {
    fn from((u, v): (NodeId, NodeId)) -> Self {
        EdgeId::new(u, v)
    }
}

impl From<EdgeId> for (NodeId, NodeId) {
    fn from(edge: EdgeId) -> Self {
        (edge.0, edge.1)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.0, self.1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandTile {
    pub id: TileId,
    pub resource: Option<Resource>,
    pub number: Option<u8>,
    pub nodes: [NodeId; 6],
    pub edges: [EdgeId; 6],
}

impl LandTile {
    pub fn is_desert(&self) -> bool {
        self.resource.is_none()
    }

    pub fn node(&self, slot: NodeRef) -> NodeId {
        self.nodes[slot.index()]
    }

    pub fn edge(&self, slot: EdgeRef) -> EdgeId {
        self.edges[slot.index()]
    }
}

/// Reserved: ports are laid out like water and carry no exchange semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub id: u16,
    pub resource: Option<Resource>,
    pub direction: Direction,
    pub nodes: [NodeId; 6],
    pub edges: [EdgeId; 6],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Water {
    pub nodes: [NodeId; 6],
    pub edges: [EdgeId; 6],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    Land(LandTile),
    Port(Port),
    Water(Water),
}

impl Tile {
    pub fn nodes(&self) -> &[NodeId; 6] {
        match self {
            Tile::Land(tile) => &tile.nodes,
            Tile::Port(port) => &port.nodes,
            Tile::Water(water) => &water.nodes,
        }
    }

    pub fn edges(&self) -> &[EdgeId; 6] {
        match self {
            Tile::Land(tile) => &tile.edges,
            Tile::Port(port) => &port.edges,
            Tile::Water(water) => &water.edges,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileTemplate {
    Land,
    Water,
    Port(Direction),
}

/// Order-sensitive description of a map. Land tiles consume `tile_resources`
/// and `numbers` in topology order, ports consume `port_resources`.
#[derive(Debug, Clone)]
pub struct MapTemplate {
    pub numbers: Vec<u8>,
    pub port_resources: Vec<Option<Resource>>,
    pub tile_resources: Vec<Option<Resource>>,
    pub topology: Vec<(CubeCoord, TileTemplate)>,
}

impl MapTemplate {
    pub fn base() -> &'static MapTemplate {
        &templates::BASE_TEMPLATE
    }

    pub fn tournament() -> &'static MapTemplate {
        &templates::TOURNAMENT_TEMPLATE
    }

    pub fn mini() -> &'static MapTemplate {
        &templates::MINI_TEMPLATE
    }

    pub fn land_count(&self) -> usize {
        self.topology
            .iter()
            .filter(|(_, kind)| matches!(kind, TileTemplate::Land))
            .count()
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MapType {
    /// Standard board, tile resources shuffled per game.
    #[default]
    Base,
    /// Standard board with a fixed layout.
    Tournament,
    /// Seven land tiles, tile resources shuffled per game.
    Mini,
}

impl MapType {
    pub fn template(self) -> &'static MapTemplate {
        match self {
            MapType::Base => MapTemplate::base(),
            MapType::Tournament => MapTemplate::tournament(),
            MapType::Mini => MapTemplate::mini(),
        }
    }

    pub fn shuffles_resources(self) -> bool {
        !matches!(self, MapType::Tournament)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    #[error(transparent)]
    InvalidCoordinate(#[from] InvalidCoordinate),
    #[error("two topology entries share coordinate {0}")]
    DuplicateCoordinate(CubeCoord),
    #[error("template has {available} tile resources for {required} land tiles")]
    NotEnoughResources { required: usize, available: usize },
    #[error("template has {available} numbers, need at least {required}")]
    NotEnoughNumbers { required: usize, available: usize },
    #[error("template has {available} port resources, need at least {required}")]
    NotEnoughPorts { required: usize, available: usize },
}

/// Which of my slots equal which of the neighbor's slots, per direction.
const SHARED_SLOTS: [(Direction, [(NodeRef, NodeRef); 2], (EdgeRef, EdgeRef)); 6] = [
    (
        Direction::East,
        [
            (NodeRef::NorthEast, NodeRef::NorthWest),
            (NodeRef::SouthEast, NodeRef::SouthWest),
        ],
        (EdgeRef::East, EdgeRef::West),
    ),
    (
        Direction::SouthEast,
        [
            (NodeRef::South, NodeRef::NorthWest),
            (NodeRef::SouthEast, NodeRef::North),
        ],
        (EdgeRef::SouthEast, EdgeRef::NorthWest),
    ),
    (
        Direction::SouthWest,
        [
            (NodeRef::South, NodeRef::NorthEast),
            (NodeRef::SouthWest, NodeRef::North),
        ],
        (EdgeRef::SouthWest, EdgeRef::NorthEast),
    ),
    (
        Direction::West,
        [
            (NodeRef::NorthWest, NodeRef::NorthEast),
            (NodeRef::SouthWest, NodeRef::SouthEast),
        ],
        (EdgeRef::West, EdgeRef::East),
    ),
    (
        Direction::NorthWest,
        [
            (NodeRef::North, NodeRef::SouthEast),
            (NodeRef::NorthWest, NodeRef::South),
        ],
        (EdgeRef::NorthWest, EdgeRef::SouthEast),
    ),
    (
        Direction::NorthEast,
        [
            (NodeRef::North, NodeRef::SouthWest),
            (NodeRef::NorthEast, NodeRef::South),
        ],
        (EdgeRef::NorthEast, EdgeRef::SouthWest),
    ),
];

/// Immutable board topology plus the lookups the rules engine needs.
#[derive(Debug, Clone)]
pub struct CatanMap {
    pub tiles: BTreeMap<CubeCoord, Tile>,
    pub tiles_by_id: BTreeMap<TileId, LandTile>,
    pub land_nodes: BTreeSet<NodeId>,
    pub land_edges: BTreeSet<EdgeId>,
    pub node_neighbors: BTreeMap<NodeId, BTreeSet<NodeId>>,
    pub node_edges: BTreeMap<NodeId, BTreeSet<EdgeId>>,
    pub adjacent_tiles: BTreeMap<NodeId, Vec<TileId>>,
    pub tiles_by_number: BTreeMap<u8, Vec<TileId>>,
    pub desert_tile: Option<TileId>,
}

impl CatanMap {
    /// Builds one of the built-in maps, shuffling tile resources with `rng`
    /// where the map type calls for it.
    pub fn build(map_type: MapType, rng: &mut impl rand::Rng) -> Result<Self, MapError> {
        let template = map_type.template();
        if map_type.shuffles_resources() {
            Self::from_template_with_rng(template, rng)
        } else {
            Self::from_template(template)
        }
    }

    pub fn from_template_with_rng(
        template: &MapTemplate,
        rng: &mut impl rand::Rng,
    ) -> Result<Self, MapError> {
        let mut shuffled = template.clone();
        shuffled.tile_resources.shuffle(rng);
        Self::from_template(&shuffled)
    }

    /// Expands `template` exactly as listed, without shuffling.
    pub fn from_template(template: &MapTemplate) -> Result<Self, MapError> {
        let tiles = expand_topology(template)?;
        Ok(Self::from_tiles(tiles))
    }

    fn from_tiles(tiles: BTreeMap<CubeCoord, Tile>) -> Self {
        let tiles_by_id: BTreeMap<TileId, LandTile> = tiles
            .values()
            .filter_map(|tile| match tile {
                Tile::Land(land) => Some((land.id, land.clone())),
                _ => None,
            })
            .collect();

        let mut land_nodes = BTreeSet::new();
        let mut land_edges = BTreeSet::new();
        let mut node_neighbors: BTreeMap<NodeId, BTreeSet<NodeId>> = BTreeMap::new();
        let mut node_edges: BTreeMap<NodeId, BTreeSet<EdgeId>> = BTreeMap::new();
        let mut adjacent_tiles: BTreeMap<NodeId, Vec<TileId>> = BTreeMap::new();
        let mut tiles_by_number: BTreeMap<u8, Vec<TileId>> = BTreeMap::new();
        let mut desert_tile = None;

        for tile in tiles_by_id.values() {
            for node in tile.nodes {
                land_nodes.insert(node);
                adjacent_tiles.entry(node).or_default().push(tile.id);
            }
            for edge in tile.edges {
                land_edges.insert(edge);
                let [a, b] = edge.nodes();
                node_neighbors.entry(a).or_default().insert(b);
                node_neighbors.entry(b).or_default().insert(a);
                node_edges.entry(a).or_default().insert(edge);
                node_edges.entry(b).or_default().insert(edge);
            }
            if let Some(number) = tile.number {
                tiles_by_number.entry(number).or_default().push(tile.id);
            }
            if tile.is_desert() && desert_tile.is_none() {
                desert_tile = Some(tile.id);
            }
        }

        debug!(
            land_tiles = tiles_by_id.len(),
            land_nodes = land_nodes.len(),
            land_edges = land_edges.len(),
            "built map"
        );

        Self {
            tiles,
            tiles_by_id,
            land_nodes,
            land_edges,
            node_neighbors,
            node_edges,
            adjacent_tiles,
            tiles_by_number,
            desert_tile,
        }
    }

    pub fn tile(&self, id: TileId) -> Option<&LandTile> {
        self.tiles_by_id.get(&id)
    }

    pub fn land_tile_ids(&self) -> impl Iterator<Item = TileId> + '_ {
        self.tiles_by_id.keys().copied()
    }

    pub fn tile_ids_by_number(&self, number: u8) -> &[TileId] {
        self.tiles_by_number
            .get(&number)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn tile_nodes(&self, id: TileId) -> Option<&[NodeId; 6]> {
        self.tile(id).map(|tile| &tile.nodes)
    }

    pub fn tile_resource(&self, id: TileId) -> Option<Resource> {
        self.tile(id).and_then(|tile| tile.resource)
    }

    pub fn tile_number(&self, id: TileId) -> Option<u8> {
        self.tile(id).and_then(|tile| tile.number)
    }

    /// Land tiles touching `node`; empty for nodes that only border water.
    pub fn adjacent_tiles(&self, node: NodeId) -> &[TileId] {
        self.adjacent_tiles
            .get(&node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node_neighbors.get(&node).into_iter().flatten().copied()
    }

    pub fn edges_of(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.node_edges.get(&node).into_iter().flatten().copied()
    }

    pub fn is_land_node(&self, node: NodeId) -> bool {
        self.land_nodes.contains(&node)
    }

    pub fn is_land_edge(&self, edge: EdgeId) -> bool {
        self.land_edges.contains(&edge)
    }
}

fn expand_topology(template: &MapTemplate) -> Result<BTreeMap<CubeCoord, Tile>, MapError> {
    let land_count = template.land_count();
    if template.tile_resources.len() < land_count {
        return Err(MapError::NotEnoughResources {
            required: land_count,
            available: template.tile_resources.len(),
        });
    }
    let producing = template.tile_resources[..land_count]
        .iter()
        .filter(|resource| resource.is_some())
        .count();
    if template.numbers.len() < producing {
        return Err(MapError::NotEnoughNumbers {
            required: producing,
            available: template.numbers.len(),
        });
    }
    let port_count = template
        .topology
        .iter()
        .filter(|(_, kind)| matches!(kind, TileTemplate::Port(_)))
        .count();
    if template.port_resources.len() < port_count {
        return Err(MapError::NotEnoughPorts {
            required: port_count,
            available: template.port_resources.len(),
        });
    }

    let mut tiles: BTreeMap<CubeCoord, Tile> = BTreeMap::new();
    let mut next_node: NodeId = 0;
    let mut land_index: usize = 0;
    let mut deserts_seen: usize = 0;
    let mut next_port: u16 = 0;

    for (coord, kind) in &template.topology {
        let coord = CubeCoord::try_new(coord.q, coord.r, coord.s)?;
        if tiles.contains_key(&coord) {
            return Err(MapError::DuplicateCoordinate(coord));
        }
        let (nodes, edges) = resolve_nodes_and_edges(&tiles, coord, &mut next_node);

        let tile = match kind {
            TileTemplate::Land => {
                let resource = template.tile_resources[land_index];
                let number = match resource {
                    Some(_) => Some(template.numbers[land_index - deserts_seen]),
                    None => {
                        deserts_seen += 1;
                        None
                    }
                };
                let tile = LandTile {
                    id: land_index as TileId,
                    resource,
                    number,
                    nodes,
                    edges,
                };
                land_index += 1;
                Tile::Land(tile)
            }
            TileTemplate::Water => Tile::Water(Water { nodes, edges }),
            TileTemplate::Port(direction) => {
                let port = Port {
                    id: next_port,
                    resource: template.port_resources[next_port as usize],
                    direction: *direction,
                    nodes,
                    edges,
                };
                next_port += 1;
                Tile::Port(port)
            }
        };
        tiles.insert(coord, tile);
    }

    Ok(tiles)
}

/// Copies the node and edge ids shared with already-placed neighbors, then
/// allocates fresh ids for whatever is left.
fn resolve_nodes_and_edges(
    tiles: &BTreeMap<CubeCoord, Tile>,
    coord: CubeCoord,
    next_node: &mut NodeId,
) -> ([NodeId; 6], [EdgeId; 6]) {
    let mut nodes: [Option<NodeId>; 6] = [None; 6];
    let mut edges: [Option<EdgeId>; 6] = [None; 6];

    for (direction, node_pairs, (mine, theirs)) in SHARED_SLOTS {
        let Some(neighbor) = tiles.get(&coord.neighbor(direction)) else {
            continue;
        };
        for (my_slot, their_slot) in node_pairs {
            nodes[my_slot.index()] = Some(neighbor.nodes()[their_slot.index()]);
        }
        edges[mine.index()] = Some(neighbor.edges()[theirs.index()]);
    }

    let nodes = nodes.map(|slot| {
        slot.unwrap_or_else(|| {
            let id = *next_node;
            *next_node += 1;
            id
        })
    });
    let mut resolved = [EdgeId::new(0, 0); 6];
    for edge_ref in EdgeRef::ALL {
        let (a, b) = edge_ref.endpoints();
        resolved[edge_ref.index()] = edges[edge_ref.index()]
            .unwrap_or_else(|| EdgeId::new(nodes[a.index()], nodes[b.index()]));
    }

    (nodes, resolved)
}

impl FromStr for EdgeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (a, b) = s
            .split_once('-')
            .ok_or_else(|| format!("edge must look like `a-b`: {s}"))?;
        let a = a.trim().parse::<NodeId>().map_err(|err| err.to_string())?;
        let b = b.trim().parse::<NodeId>().map_err(|err| err.to_string())?;
        Ok(EdgeId::new(a, b))
    }
}
