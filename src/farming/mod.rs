//! Farming domain — soil tilling, watering, planting, crop growth, harvest.
//!
//! Communicates with other domains exclusively through crate::shared
//! events/resources. Owns the soil dry-out timers and the mapping from
//! grid cells to soil/water/plant sprite entities.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::shared::*;

pub mod harvest;
pub mod plants;
pub mod render;
pub mod soil;

// ─────────────────────────────────────────────────────────────────────────────
// Entity bookkeeping
// ─────────────────────────────────────────────────────────────────────────────

/// Marker component for tilled-soil sprite entities.
#[derive(Component, Debug, Clone)]
pub struct SoilSprite {
    pub cell: (i32, i32),
    pub variant: SoilVariant,
}

/// Marker component for water overlay sprite entities.
#[derive(Component, Debug, Clone)]
pub struct WaterSprite {
    pub cell: (i32, i32),
}

/// Tracks which soil/water/plant entities exist, keyed by grid cell.
/// The invariant mirrored from the grid: every watered cell has exactly
/// one water entity and vice versa.
#[derive(Resource, Default, Debug)]
pub struct FarmVisuals {
    pub soil: HashMap<(i32, i32), Entity>,
    pub water: HashMap<(i32, i32), Entity>,
    pub plants: HashMap<(i32, i32), Entity>,
}

pub struct FarmingPlugin;

impl Plugin for FarmingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FarmVisuals>()
            .init_resource::<soil::SoilTimers>()
            .add_systems(
                Update,
                (
                    soil::handle_hoe_tool_use,
                    soil::handle_watering_can_use,
                    plants::handle_use_seed,
                )
                    .in_set(SimSet::Entities)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                Update,
                harvest::plant_collision_harvest
                    .in_set(SimSet::Harvest)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                Update,
                (soil::tick_soil_timers, plants::update_plants)
                    .chain()
                    .in_set(SimSet::Soil)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                PostUpdate,
                (
                    render::sync_plant_sprites,
                    render::decay_particles,
                )
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Edge-aware soil tiles
// ─────────────────────────────────────────────────────────────────────────────

/// The 16 edge-aware tilled-soil sprites, named by which edges the tile
/// shows. Picked from the tilled state of the four orthogonal neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoilVariant {
    /// Isolated tile, edges on all sides.
    O,
    /// Fully surrounded, no edges.
    X,
    L,
    R,
    LR,
    T,
    B,
    TB,
    TL,
    TR,
    BL,
    BR,
    TBL,
    TBR,
    LRT,
    LRB,
}

impl SoilVariant {
    /// Fixed lookup keyed by the tilled state of the N/S/W/E neighbors.
    pub fn from_neighbors(top: bool, bottom: bool, left: bool, right: bool) -> Self {
        match (top, bottom, left, right) {
            (true, true, true, true) => SoilVariant::X,

            (false, false, true, false) => SoilVariant::R,
            (false, false, false, true) => SoilVariant::L,
            (false, false, true, true) => SoilVariant::LR,

            (true, false, false, false) => SoilVariant::B,
            (false, true, false, false) => SoilVariant::T,
            (true, true, false, false) => SoilVariant::TB,

            (false, true, true, false) => SoilVariant::TR,
            (false, true, false, true) => SoilVariant::TL,
            (true, false, true, false) => SoilVariant::BR,
            (true, false, false, true) => SoilVariant::BL,

            (true, true, false, true) => SoilVariant::TBR,
            (true, true, true, false) => SoilVariant::TBL,
            (true, false, true, true) => SoilVariant::LRB,
            (false, true, true, true) => SoilVariant::LRT,

            (false, false, false, false) => SoilVariant::O,
        }
    }

    /// Variant for `cell` given the current grid.
    pub fn for_cell(grid: &SoilGrid, cell: (i32, i32)) -> Self {
        let (x, y) = cell;
        Self::from_neighbors(
            grid.is_tilled((x, y + 1)),
            grid.is_tilled((x, y - 1)),
            grid.is_tilled((x - 1, y)),
            grid.is_tilled((x + 1, y)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn autotile_table_is_exhaustive_and_exact() {
        use SoilVariant::*;
        // (top, bottom, left, right) → expected variant
        let table = [
            ((false, false, false, false), O),
            ((true, true, true, true), X),
            ((false, false, true, false), R),
            ((false, false, false, true), L),
            ((false, false, true, true), LR),
            ((true, false, false, false), B),
            ((false, true, false, false), T),
            ((true, true, false, false), TB),
            ((false, true, true, false), TR),
            ((false, true, false, true), TL),
            ((true, false, true, false), BR),
            ((true, false, false, true), BL),
            ((true, true, false, true), TBR),
            ((true, true, true, false), TBL),
            ((true, false, true, true), LRB),
            ((false, true, true, true), LRT),
        ];
        assert_eq!(table.len(), 16);
        for ((t, b, l, r), expected) in table {
            assert_eq!(
                SoilVariant::from_neighbors(t, b, l, r),
                expected,
                "neighbors t={t} b={b} l={l} r={r}"
            );
        }
    }

    #[test]
    fn variant_for_cell_reads_the_grid() {
        let mut grid = SoilGrid::default();
        for c in [(5, 5), (5, 6), (4, 5)] {
            grid.cells.insert(c, TileFlags::farmable());
            grid.till(c);
        }
        // (5,5): tilled above and to the left → bottom-right edges shown
        assert_eq!(SoilVariant::for_cell(&grid, (5, 5)), SoilVariant::BR);
        // (5,6): only tilled below → top edge tile
        assert_eq!(SoilVariant::for_cell(&grid, (5, 6)), SoilVariant::T);
    }

    #[test]
    fn world_cell_round_trip() {
        let world = cell_to_world((3, -2), Z_SOIL);
        assert_eq!(world_to_cell(world.truncate()), (3, -2));
    }
}
