use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::board::{CatanMap, EdgeId, NodeId};
use crate::types::BuildingKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub owner: usize,
    pub kind: BuildingKind,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("node {0} is not a land node")]
    UnknownNode(NodeId),
    #[error("edge {0} is not a land edge")]
    UnknownEdge(EdgeId),
    #[error("node {0} is already occupied")]
    NodeOccupied(NodeId),
    #[error("seat {seat} has no settlement at node {node}")]
    NotASettlement { seat: usize, node: NodeId },
    #[error("edge {0} already holds a road")]
    EdgeOccupied(EdgeId),
}

/// Placement graph for one game: who has built what, plus the nodes the
/// distance rule has closed. Blocked nodes are never reopened.
#[derive(Debug, Clone)]
pub struct Board {
    map: Arc<CatanMap>,
    buildings: BTreeMap<NodeId, Building>,
    roads: BTreeMap<EdgeId, usize>,
    blocked: BTreeSet<NodeId>,
}

impl Board {
    pub fn new(map: Arc<CatanMap>) -> Self {
        Self {
            map,
            buildings: BTreeMap::new(),
            roads: BTreeMap::new(),
            blocked: BTreeSet::new(),
        }
    }

    pub fn map(&self) -> &CatanMap {
        &self.map
    }

    pub fn shared_map(&self) -> Arc<CatanMap> {
        Arc::clone(&self.map)
    }

    pub fn building_at(&self, node: NodeId) -> Option<Building> {
        self.buildings.get(&node).copied()
    }

    pub fn road_owner(&self, edge: EdgeId) -> Option<usize> {
        self.roads.get(&edge).copied()
    }

    pub fn is_blocked(&self, node: NodeId) -> bool {
        self.blocked.contains(&node)
    }

    pub fn buildings(&self) -> impl Iterator<Item = (NodeId, Building)> + '_ {
        self.buildings.iter().map(|(node, building)| (*node, *building))
    }

    pub fn roads_of(&self, seat: usize) -> impl Iterator<Item = EdgeId> + '_ {
        self.roads
            .iter()
            .filter(move |(_, owner)| **owner == seat)
            .map(|(edge, _)| *edge)
    }

    pub fn owned_nodes(&self, seat: usize) -> impl Iterator<Item = NodeId> + '_ {
        self.buildings
            .iter()
            .filter(move |(_, building)| building.owner == seat)
            .map(|(node, _)| *node)
    }

    pub fn owned_settlements(&self, seat: usize) -> impl Iterator<Item = NodeId> + '_ {
        self.buildings
            .iter()
            .filter(move |(_, building)| {
                building.owner == seat && building.kind == BuildingKind::Settlement
            })
            .map(|(node, _)| *node)
    }

    fn touches_own_road(&self, seat: usize, node: NodeId) -> bool {
        self.map
            .edges_of(node)
            .any(|edge| self.road_owner(edge) == Some(seat))
    }

    pub fn buildable_node_ids(&self, seat: usize, initial_phase: bool) -> BTreeSet<NodeId> {
        self.map
            .land_nodes
            .iter()
            .copied()
            .filter(|node| !self.blocked.contains(node) && !self.buildings.contains_key(node))
            .filter(|node| initial_phase || self.touches_own_road(seat, *node))
            .collect()
    }

    /// Unowned land edges reachable from the seat's buildings or from either
    /// end of one of its roads.
    pub fn buildable_edges(&self, seat: usize) -> BTreeSet<EdgeId> {
        let mut frontier: BTreeSet<NodeId> = self.owned_nodes(seat).collect();
        for edge in self.roads_of(seat) {
            frontier.extend(edge.nodes());
        }
        frontier
            .into_iter()
            .flat_map(|node| self.map.edges_of(node))
            .filter(|edge| !self.roads.contains_key(edge))
            .collect()
    }

    pub fn build_settlement(&mut self, seat: usize, node: NodeId) -> Result<(), BoardError> {
        if !self.map.is_land_node(node) {
            return Err(BoardError::UnknownNode(node));
        }
        if self.buildings.contains_key(&node) {
            return Err(BoardError::NodeOccupied(node));
        }
        self.buildings.insert(
            node,
            Building {
                owner: seat,
                kind: BuildingKind::Settlement,
            },
        );
        self.blocked.insert(node);
        let neighbors: Vec<NodeId> = self.map.neighbors(node).collect();
        self.blocked.extend(neighbors);
        Ok(())
    }

    pub fn build_city(&mut self, seat: usize, node: NodeId) -> Result<(), BoardError> {
        match self.buildings.get_mut(&node) {
            Some(building) if building.owner == seat && building.kind == BuildingKind::Settlement => {
                building.kind = BuildingKind::City;
                Ok(())
            }
            _ => Err(BoardError::NotASettlement { seat, node }),
        }
    }

    pub fn build_road(&mut self, seat: usize, edge: EdgeId) -> Result<(), BoardError> {
        if !self.map.is_land_edge(edge) {
            return Err(BoardError::UnknownEdge(edge));
        }
        if self.roads.contains_key(&edge) {
            return Err(BoardError::EdgeOccupied(edge));
        }
        self.roads.insert(edge, seat);
        Ok(())
    }

    fn is_opponent_node(&self, seat: usize, node: NodeId) -> bool {
        self.buildings
            .get(&node)
            .is_some_and(|building| building.owner != seat)
    }

    /// Longest trail over the seat's roads. Edges are excluded only along the
    /// current path, so sibling branches may reuse them; an opponent's
    /// building ends the trail but the edge into it still counts.
    pub fn longest_road_length(&self, seat: usize) -> usize {
        let mut adjacency: BTreeMap<NodeId, Vec<EdgeId>> = BTreeMap::new();
        for edge in self.roads_of(seat) {
            for node in edge.nodes() {
                adjacency.entry(node).or_default().push(edge);
            }
        }

        let mut best = 0;
        let mut path: Vec<EdgeId> = Vec::new();
        let mut stack: Vec<(NodeId, usize)> = Vec::new();
        for &start in adjacency.keys() {
            stack.push((start, 0));
            while let Some(frame) = stack.last_mut() {
                let (node, cursor) = *frame;
                let edges = adjacency.get(&node).map(Vec::as_slice).unwrap_or(&[]);
                if cursor >= edges.len() || self.is_opponent_node(seat, node) {
                    stack.pop();
                    path.pop();
                    continue;
                }
                frame.1 += 1;
                let edge = edges[cursor];
                if path.contains(&edge) {
                    continue;
                }
                let Some(next) = edge.other(node) else {
                    continue;
                };
                path.push(edge);
                best = best.max(path.len());
                stack.push((next, 0));
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::board::MapTemplate;
    use crate::coords::CubeCoord;
    use crate::types::{EdgeRef, NodeRef};

    fn board() -> Board {
        let map = CatanMap::from_template(MapTemplate::base()).unwrap();
        Board::new(Arc::new(map))
    }

    fn center_tile(board: &Board) -> crate::board::LandTile {
        match board.map().tiles.get(&CubeCoord::ORIGIN) {
            Some(crate::board::Tile::Land(tile)) => tile.clone(),
            _ => panic!("no land at origin"),
        }
    }

    #[test]
    fn settlement_blocks_node_and_neighbors() {
        let mut board = board();
        let node = 0;
        board.build_settlement(0, node).unwrap();
        let buildable = board.buildable_node_ids(1, true);
        assert!(!buildable.contains(&node));
        for neighbor in board.map().neighbors(node) {
            assert!(board.is_blocked(neighbor));
            assert!(!buildable.contains(&neighbor));
        }
        assert_eq!(
            board.build_settlement(1, node),
            Err(BoardError::NodeOccupied(node))
        );
    }

    #[test]
    fn non_initial_settlement_needs_own_road() {
        let mut board = board();
        board.build_settlement(0, 0).unwrap();
        assert!(board.buildable_node_ids(0, false).is_empty());

        let tile = center_tile(&board);
        // Walk two edges away from the settlement so the far node is unblocked.
        let first = tile.edge(EdgeRef::NorthEast);
        let second = tile.edge(EdgeRef::East);
        board.build_road(0, first).unwrap();
        board.build_road(0, second).unwrap();
        let far = tile.node(NodeRef::SouthEast);
        assert_eq!(tile.node(NodeRef::North), 0);
        assert_eq!(board.buildable_node_ids(0, false), BTreeSet::from([far]));
        assert!(board.buildable_node_ids(1, false).is_empty());
    }

    #[test]
    fn buildable_edges_follow_footprint() {
        let mut board = board();
        assert!(board.buildable_edges(0).is_empty());

        board.build_settlement(0, 0).unwrap();
        let edges = board.buildable_edges(0);
        assert!(!edges.is_empty());
        assert!(edges.iter().all(|edge| edge.touches(0)));

        let road = *edges.iter().next().unwrap();
        board.build_road(0, road).unwrap();
        let footprint = [road.a(), road.b()];
        let edges = board.buildable_edges(0);
        assert!(!edges.contains(&road));
        assert!(
            edges
                .iter()
                .all(|edge| footprint.iter().any(|node| edge.touches(*node)))
        );
    }

    #[test]
    fn city_requires_own_settlement() {
        let mut board = board();
        board.build_settlement(0, 0).unwrap();
        assert_eq!(
            board.build_city(1, 0),
            Err(BoardError::NotASettlement { seat: 1, node: 0 })
        );
        board.build_city(0, 0).unwrap();
        assert_eq!(board.building_at(0).map(|b| b.kind), Some(BuildingKind::City));
        assert_eq!(
            board.build_city(0, 0),
            Err(BoardError::NotASettlement { seat: 0, node: 0 })
        );
    }

    #[test]
    fn duplicate_road_is_rejected() {
        let mut board = board();
        let edge = EdgeId::new(0, 1);
        assert!(board.map().is_land_edge(edge));
        board.build_road(0, edge).unwrap();
        assert_eq!(board.build_road(1, edge), Err(BoardError::EdgeOccupied(edge)));
        assert_eq!(
            board.build_road(0, EdgeId::new(0, 40)),
            Err(BoardError::UnknownEdge(EdgeId::new(0, 40)))
        );
    }

    #[test]
    fn longest_road_counts_a_ring_once_around() {
        let mut board = board();
        assert_eq!(board.longest_road_length(0), 0);
        let tile = center_tile(&board);
        for edge in tile.edges {
            board.build_road(0, edge).unwrap();
        }
        assert_eq!(board.longest_road_length(0), 6);
    }

    #[test]
    fn opponent_building_cuts_the_road() {
        let mut board = board();
        let tile = center_tile(&board);
        // A five-edge chain around the centre: N -> NE -> SE -> S -> SW -> NW.
        for slot in [
            EdgeRef::NorthEast,
            EdgeRef::East,
            EdgeRef::SouthEast,
            EdgeRef::SouthWest,
            EdgeRef::West,
        ] {
            board.build_road(0, tile.edge(slot)).unwrap();
        }
        assert_eq!(board.longest_road_length(0), 5);

        board.build_settlement(1, tile.node(NodeRef::SouthEast)).unwrap();
        // Two edges on one side of the cut, three on the other.
        assert_eq!(board.longest_road_length(0), 3);
    }
}
