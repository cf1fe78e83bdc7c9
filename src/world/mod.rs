//! World construction and collision.
//!
//! Consumes the map definition once at world build: Farmable flags feed
//! the soil grid, Collision/Water feed the walkability set, Trees place
//! tree entities, and the Bed/Trader cells become interaction zones.

use bevy::prelude::*;
use std::collections::HashSet;

use crate::shared::*;
use crate::trees;

pub mod maps;

use maps::{parse_map, MapDef, MapFeature, FARM_MAP};

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WorldMap>()
            .init_resource::<PlayerSpawn>()
            .add_systems(OnEnter(GameState::Playing), build_world);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Resources & components
// ─────────────────────────────────────────────────────────────────────────────

/// Walkability queries for the current map.
#[derive(Resource, Debug, Default)]
pub struct WorldMap {
    pub width: i32,
    pub height: i32,
    pub solid: HashSet<(i32, i32)>,
    pub built: bool,
}

impl WorldMap {
    pub fn is_walkable(&self, cell: (i32, i32)) -> bool {
        cell.0 >= 0
            && cell.1 >= 0
            && cell.0 < self.width
            && cell.1 < self.height
            && !self.solid.contains(&cell)
    }
}

/// Where the player enters the world (map Player layer).
#[derive(Resource, Debug, Clone)]
pub struct PlayerSpawn(pub Vec2);

impl Default for PlayerSpawn {
    fn default() -> Self {
        Self(Vec2::new(
            5.0 * TILE_SIZE,
            5.0 * TILE_SIZE,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneKind {
    Bed,
    Trader,
}

/// An interaction zone from the map's Interaction layer. Triggered by the
/// interact intent when the player stands on or beside its cell.
#[derive(Component, Debug, Clone)]
pub struct InteractionZone {
    pub kind: ZoneKind,
    pub cell: (i32, i32),
}

/// Marker for static map scenery entities.
#[derive(Component, Debug)]
pub struct MapTile;

// ─────────────────────────────────────────────────────────────────────────────
// Construction
// ─────────────────────────────────────────────────────────────────────────────

/// Build the farm world once. Re-entering Playing (e.g. closing the shop)
/// must not duplicate the map.
pub fn build_world(
    mut commands: Commands,
    mut world_map: ResMut<WorldMap>,
    mut grid: ResMut<SoilGrid>,
    mut spawn: ResMut<PlayerSpawn>,
) {
    if world_map.built {
        return;
    }
    let map = parse_map(FARM_MAP);
    apply_map(&map, &mut commands, &mut world_map, &mut grid, &mut spawn);
    info!(
        "world built: {}x{} tiles, {} farmable",
        map.width,
        map.height,
        grid.cells.len()
    );
}

/// Install a parsed map into the live world.
pub fn apply_map(
    map: &MapDef,
    commands: &mut Commands,
    world_map: &mut WorldMap,
    grid: &mut SoilGrid,
    spawn: &mut PlayerSpawn,
) {
    world_map.width = map.width;
    world_map.height = map.height;
    world_map.built = true;

    // Ground backdrop.
    commands.spawn((
        Sprite {
            color: Color::srgb(0.35, 0.58, 0.28),
            custom_size: Some(Vec2::new(
                map.width as f32 * TILE_SIZE,
                map.height as f32 * TILE_SIZE,
            )),
            ..default()
        },
        Transform::from_xyz(
            map.width as f32 * TILE_SIZE / 2.0,
            map.height as f32 * TILE_SIZE / 2.0,
            Z_GROUND,
        ),
        MapTile,
    ));

    for &(cell, feature) in &map.features {
        match feature {
            MapFeature::Farmable => {
                grid.cells.insert(cell, TileFlags::farmable());
            }
            MapFeature::Collision => {
                world_map.solid.insert(cell);
                commands.spawn((
                    Sprite {
                        color: Color::srgb(0.35, 0.32, 0.30),
                        custom_size: Some(Vec2::splat(TILE_SIZE)),
                        ..default()
                    },
                    Transform::from_translation(cell_to_world(cell, Z_MAIN)),
                    MapTile,
                ));
            }
            MapFeature::Water => {
                world_map.solid.insert(cell);
                commands.spawn((
                    Sprite {
                        color: Color::srgb(0.25, 0.45, 0.75),
                        custom_size: Some(Vec2::splat(TILE_SIZE)),
                        ..default()
                    },
                    Transform::from_translation(cell_to_world(cell, Z_WATER)),
                    MapTile,
                ));
            }
            MapFeature::Tree(species) => {
                world_map.solid.insert(cell);
                trees::spawn_tree(commands, species, cell);
            }
            MapFeature::Decoration => {
                world_map.solid.insert(cell);
                commands.spawn((
                    Sprite {
                        color: Color::srgb(0.75, 0.65, 0.35),
                        custom_size: Some(Vec2::new(TILE_SIZE * 0.4, TILE_SIZE * 0.6)),
                        ..default()
                    },
                    Transform::from_translation(cell_to_world(cell, Z_MAIN)),
                    MapTile,
                ));
            }
            MapFeature::PlayerStart => {
                spawn.0 = cell_to_world(cell, 0.0).truncate();
            }
            MapFeature::Bed => {
                commands.spawn((
                    InteractionZone {
                        kind: ZoneKind::Bed,
                        cell,
                    },
                    MapTile,
                ));
            }
            MapFeature::Trader => {
                commands.spawn((
                    InteractionZone {
                        kind: ZoneKind::Trader,
                        cell,
                    },
                    MapTile,
                ));
            }
        }
    }
}
