use once_cell::sync::Lazy;

use crate::board::{MapTemplate, TileTemplate};
use crate::coords::{CubeCoord, Direction};
use crate::types::Resource;

use Resource::{Brick, Ore, Sheep, Wheat, Wood};

const BASE_NUMBERS: [u8; 18] = [11, 3, 6, 5, 4, 9, 10, 8, 4, 11, 12, 9, 10, 8, 3, 6, 2, 5];

pub(super) static BASE_TEMPLATE: Lazy<MapTemplate> = Lazy::new(|| MapTemplate {
    numbers: BASE_NUMBERS.to_vec(),
    port_resources: base_port_resources(),
    tile_resources: vec![
        Some(Wood),
        Some(Wood),
        Some(Wood),
        Some(Wood),
        Some(Brick),
        Some(Brick),
        Some(Brick),
        Some(Sheep),
        Some(Sheep),
        Some(Sheep),
        Some(Sheep),
        Some(Wheat),
        Some(Wheat),
        Some(Wheat),
        Some(Wheat),
        Some(Ore),
        Some(Ore),
        Some(Ore),
        None,
    ],
    topology: base_topology(),
});

pub(super) static TOURNAMENT_TEMPLATE: Lazy<MapTemplate> = Lazy::new(|| MapTemplate {
    numbers: vec![6, 3, 11, 9, 4, 5, 9, 12, 11, 4, 8, 10, 5, 2, 6, 3, 8, 10],
    port_resources: base_port_resources(),
    tile_resources: vec![
        None,
        Some(Ore),
        Some(Wood),
        Some(Ore),
        Some(Brick),
        Some(Ore),
        Some(Wheat),
        Some(Wheat),
        Some(Sheep),
        Some(Brick),
        Some(Sheep),
        Some(Brick),
        Some(Wheat),
        Some(Wood),
        Some(Wheat),
        Some(Wood),
        Some(Sheep),
        Some(Sheep),
        Some(Wood),
    ],
    topology: base_topology(),
});

pub(super) static MINI_TEMPLATE: Lazy<MapTemplate> = Lazy::new(|| MapTemplate {
    numbers: vec![3, 4, 5, 6, 8, 9, 10],
    port_resources: vec![],
    tile_resources: vec![
        Some(Wood),
        None,
        Some(Brick),
        Some(Sheep),
        Some(Wheat),
        Some(Wheat),
        Some(Ore),
    ],
    topology: mini_topology(),
});

fn base_port_resources() -> Vec<Option<Resource>> {
    vec![
        None,
        Some(Sheep),
        None,
        Some(Ore),
        Some(Wheat),
        None,
        Some(Wood),
        Some(Brick),
        None,
    ]
}

/// Centre, first ring and second ring of land, in that order.
fn land_rings() -> Vec<(CubeCoord, TileTemplate)> {
    use TileTemplate::Land;
    vec![
        (CubeCoord::new(0, 0, 0), Land),
        (CubeCoord::new(1, -1, 0), Land),
        (CubeCoord::new(0, -1, 1), Land),
        (CubeCoord::new(-1, 0, 1), Land),
        (CubeCoord::new(-1, 1, 0), Land),
        (CubeCoord::new(0, 1, -1), Land),
        (CubeCoord::new(1, 0, -1), Land),
        (CubeCoord::new(2, -2, 0), Land),
        (CubeCoord::new(1, -2, 1), Land),
        (CubeCoord::new(0, -2, 2), Land),
        (CubeCoord::new(-1, -1, 2), Land),
        (CubeCoord::new(-2, 0, 2), Land),
        (CubeCoord::new(-2, 1, 1), Land),
        (CubeCoord::new(-2, 2, 0), Land),
        (CubeCoord::new(-1, 2, -1), Land),
        (CubeCoord::new(0, 2, -2), Land),
        (CubeCoord::new(1, 1, -2), Land),
        (CubeCoord::new(2, 0, -2), Land),
        (CubeCoord::new(2, -1, -1), Land),
    ]
}

fn base_topology() -> Vec<(CubeCoord, TileTemplate)> {
    use TileTemplate::{Port, Water};
    let mut topology = land_rings();
    topology.extend([
        (CubeCoord::new(3, -3, 0), Port(Direction::West)),
        (CubeCoord::new(2, -3, 1), Water),
        (CubeCoord::new(1, -3, 2), Port(Direction::NorthWest)),
        (CubeCoord::new(0, -3, 3), Water),
        (CubeCoord::new(-1, -2, 3), Port(Direction::NorthWest)),
        (CubeCoord::new(-2, -1, 3), Water),
        (CubeCoord::new(-3, 0, 3), Port(Direction::NorthEast)),
        (CubeCoord::new(-3, 1, 2), Water),
        (CubeCoord::new(-3, 2, 1), Port(Direction::East)),
        (CubeCoord::new(-3, 3, 0), Water),
        (CubeCoord::new(-2, 3, -1), Port(Direction::East)),
        (CubeCoord::new(-1, 3, -2), Water),
        (CubeCoord::new(0, 3, -3), Port(Direction::SouthEast)),
        (CubeCoord::new(1, 2, -3), Water),
        (CubeCoord::new(2, 1, -3), Port(Direction::SouthWest)),
        (CubeCoord::new(3, 0, -3), Water),
        (CubeCoord::new(3, -1, -2), Port(Direction::SouthWest)),
        (CubeCoord::new(3, -2, -1), Water),
    ]);
    topology
}

fn mini_topology() -> Vec<(CubeCoord, TileTemplate)> {
    let mut topology = land_rings();
    for (_, kind) in topology.iter_mut().skip(7) {
        *kind = TileTemplate::Water;
    }
    topology
}
