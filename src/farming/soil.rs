//! Soil tilling, watering, and dry-out timers.
//!
//! Flag mutations live on [`SoilGrid`]; this module wraps them with the
//! timers and sprite bookkeeping that keep a cell's logical marker, its
//! visual, and its countdown in lockstep. The timer-advance path is a free
//! function so the sleep fast-forward can drive it second-by-second with
//! the exact behavior of live ticking.

use bevy::prelude::*;
use rand::Rng;
use std::collections::HashMap;

use super::{FarmVisuals, SoilSprite, SoilVariant, WaterSprite};
use crate::shared::*;

// ─────────────────────────────────────────────────────────────────────────────
// Dry-out timers
// ─────────────────────────────────────────────────────────────────────────────

/// One countdown per tilled cell. Created on till, removed on planting or
/// when the soil reverts. Never serialized: load reconciliation restarts
/// a fresh timer for every tilled cell.
#[derive(Resource, Debug, Default)]
pub struct SoilTimers {
    pub timers: HashMap<(i32, i32), Countdown>,
}

impl SoilTimers {
    pub fn start(&mut self, cell: (i32, i32)) {
        self.timers
            .entry(cell)
            .or_insert_with(|| Countdown::new(SOIL_DRYOUT_MS))
            .activate();
    }

    pub fn remove(&mut self, cell: (i32, i32)) {
        self.timers.remove(&cell);
    }

    pub fn contains(&self, cell: (i32, i32)) -> bool {
        self.timers.contains_key(&cell)
    }
}

/// What a timer pass changed, so callers can reconcile sprites.
#[derive(Debug, Default, PartialEq)]
pub struct SoilTickChanges {
    /// Cells whose tilled flag was cleared (soil sprite goes away and the
    /// neighborhood re-tiles).
    pub dried: Vec<(i32, i32)>,
    /// Cells whose watered flag was cleared by dry-out (water overlay
    /// goes away; the soil itself survives on a fresh timer).
    pub unwatered: Vec<(i32, i32)>,
}

/// Advance every dry-out timer by `dt_ms` and resolve expiries:
/// planted cells defer (growing plants keep their soil), watered cells
/// lose the water first and restart, bare cells revert to untilled.
pub fn advance_soil_timers(
    grid: &mut SoilGrid,
    timers: &mut SoilTimers,
    dt_ms: f32,
) -> SoilTickChanges {
    let mut changes = SoilTickChanges::default();
    let cells: Vec<(i32, i32)> = timers.timers.keys().copied().collect();

    for cell in cells {
        let Some(timer) = timers.timers.get_mut(&cell) else {
            continue;
        };
        if !timer.tick(dt_ms) {
            continue;
        }

        let flags = grid.get(cell);
        if flags.planted {
            // Soil under a crop never disappears; check again later.
            timer.activate();
        } else if flags.watered {
            grid.clear_watered(cell);
            timer.activate();
            changes.unwatered.push(cell);
        } else {
            grid.clear_tilled(cell);
            timers.remove(cell);
            changes.dried.push(cell);
        }
    }
    changes
}

// ─────────────────────────────────────────────────────────────────────────────
// Hoe — till a farmable tile
// ─────────────────────────────────────────────────────────────────────────────

pub fn handle_hoe_tool_use(
    mut tool_events: EventReader<ToolUseEvent>,
    mut grid: ResMut<SoilGrid>,
    mut timers: ResMut<SoilTimers>,
    mut visuals: ResMut<FarmVisuals>,
    mut commands: Commands,
    mut sfx_events: EventWriter<PlaySfxEvent>,
) {
    for event in tool_events.read() {
        if event.tool != ToolKind::Hoe {
            continue;
        }
        if !grid.till(event.target) {
            // Not farmable, or already tilled.
            continue;
        }
        timers.start(event.target);
        refresh_soil_sprites_around(&mut commands, &mut visuals, &grid, event.target);
        sfx_events.send(PlaySfxEvent {
            sfx_id: "hoe".to_string(),
        });
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Watering can
// ─────────────────────────────────────────────────────────────────────────────

pub fn handle_watering_can_use(
    mut tool_events: EventReader<ToolUseEvent>,
    mut grid: ResMut<SoilGrid>,
    mut visuals: ResMut<FarmVisuals>,
    mut commands: Commands,
    mut sfx_events: EventWriter<PlaySfxEvent>,
    mut mission_events: EventWriter<MissionActionEvent>,
) {
    for event in tool_events.read() {
        if event.tool != ToolKind::WateringCan {
            continue;
        }
        if !grid.water(event.target) {
            continue;
        }
        spawn_water_sprite(&mut commands, &mut visuals, event.target);
        sfx_events.send(PlaySfxEvent {
            sfx_id: "water".to_string(),
        });
        mission_events.send(MissionActionEvent {
            action: MissionAction::Water,
            target: "soil".to_string(),
            amount: 1,
        });
    }
}

/// Water every tilled cell (rain start / load reconciliation). Returns the
/// newly watered cells; each gets exactly one overlay.
pub fn water_all(
    grid: &mut SoilGrid,
    visuals: &mut FarmVisuals,
    commands: &mut Commands,
) -> Vec<(i32, i32)> {
    let tilled = grid.cells_where(|f| f.tilled && !f.watered);
    let mut newly = Vec::new();
    for cell in tilled {
        if grid.water(cell) {
            spawn_water_sprite(commands, visuals, cell);
            newly.push(cell);
        }
    }
    newly
}

/// Clear every watered flag and despawn every water overlay (rain stop,
/// after-sleep drying).
pub fn remove_water(grid: &mut SoilGrid, visuals: &mut FarmVisuals, commands: &mut Commands) {
    for cell in grid.cells_where(|f| f.watered) {
        grid.clear_watered(cell);
    }
    for (_, entity) in visuals.water.drain() {
        commands.entity(entity).despawn();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Timer tick system
// ─────────────────────────────────────────────────────────────────────────────

pub fn tick_soil_timers(
    time: Res<Time>,
    mut grid: ResMut<SoilGrid>,
    mut timers: ResMut<SoilTimers>,
    mut visuals: ResMut<FarmVisuals>,
    mut commands: Commands,
) {
    let changes = advance_soil_timers(&mut grid, &mut timers, time.delta_secs() * 1000.0);
    apply_soil_changes(&changes, &grid, &mut visuals, &mut commands);
}

/// Reconcile sprites with the outcome of a timer pass.
pub fn apply_soil_changes(
    changes: &SoilTickChanges,
    grid: &SoilGrid,
    visuals: &mut FarmVisuals,
    commands: &mut Commands,
) {
    for &cell in &changes.unwatered {
        despawn_water_sprite(commands, visuals, cell);
    }
    for &cell in &changes.dried {
        if let Some(entity) = visuals.soil.remove(&cell) {
            commands.entity(entity).despawn();
        }
        despawn_water_sprite(commands, visuals, cell);
        refresh_soil_sprites_around(commands, visuals, grid, cell);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sprite helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Placeholder colour per soil variant: edge tiles are a touch lighter so
/// the auto-tiling is visible without the atlas.
fn soil_color(variant: SoilVariant) -> Color {
    match variant {
        SoilVariant::X => Color::srgb(0.42, 0.30, 0.19),
        SoilVariant::O => Color::srgb(0.50, 0.37, 0.24),
        _ => Color::srgb(0.46, 0.33, 0.21),
    }
}

/// Spawn or restyle the soil sprite for one tilled cell.
pub fn spawn_or_update_soil_sprite(
    commands: &mut Commands,
    visuals: &mut FarmVisuals,
    grid: &SoilGrid,
    cell: (i32, i32),
) {
    let variant = SoilVariant::for_cell(grid, cell);
    if let Some(&entity) = visuals.soil.get(&cell) {
        commands.entity(entity).insert((
            Sprite {
                color: soil_color(variant),
                custom_size: Some(Vec2::splat(TILE_SIZE)),
                ..default()
            },
            SoilSprite { cell, variant },
        ));
    } else {
        let entity = commands
            .spawn((
                Sprite {
                    color: soil_color(variant),
                    custom_size: Some(Vec2::splat(TILE_SIZE)),
                    ..default()
                },
                Transform::from_translation(cell_to_world(cell, Z_SOIL)),
                SoilSprite { cell, variant },
            ))
            .id();
        visuals.soil.insert(cell, entity);
    }
}

/// Re-tile a cell and its four neighbors after a till or dry-out. Only
/// tilled cells get sprites; the centre cell may just have reverted.
pub fn refresh_soil_sprites_around(
    commands: &mut Commands,
    visuals: &mut FarmVisuals,
    grid: &SoilGrid,
    cell: (i32, i32),
) {
    let (x, y) = cell;
    for c in [(x, y), (x, y + 1), (x, y - 1), (x - 1, y), (x + 1, y)] {
        if grid.is_tilled(c) {
            spawn_or_update_soil_sprite(commands, visuals, grid, c);
        }
    }
}

pub fn spawn_water_sprite(
    commands: &mut Commands,
    visuals: &mut FarmVisuals,
    cell: (i32, i32),
) {
    if visuals.water.contains_key(&cell) {
        return;
    }
    let mut rng = rand::thread_rng();
    // Slight per-tile alpha variation, standing in for the randomly chosen
    // water frame of the art pack.
    let alpha = rng.gen_range(0.45..0.6);
    let entity = commands
        .spawn((
            Sprite {
                color: Color::srgba(0.20, 0.35, 0.65, alpha),
                custom_size: Some(Vec2::splat(TILE_SIZE)),
                ..default()
            },
            Transform::from_translation(cell_to_world(cell, Z_SOIL_WATER)),
            WaterSprite { cell },
        ))
        .id();
    visuals.water.insert(cell, entity);
}

pub fn despawn_water_sprite(
    commands: &mut Commands,
    visuals: &mut FarmVisuals,
    cell: (i32, i32),
) {
    if let Some(entity) = visuals.water.remove(&cell) {
        commands.entity(entity).despawn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tilled_grid(cells: &[(i32, i32)]) -> (SoilGrid, SoilTimers) {
        let mut grid = SoilGrid::default();
        let mut timers = SoilTimers::default();
        for &c in cells {
            grid.cells.insert(c, TileFlags::farmable());
            grid.till(c);
            timers.start(c);
        }
        (grid, timers)
    }

    #[test]
    fn bare_soil_reverts_after_dryout() {
        let (mut grid, mut timers) = tilled_grid(&[(2, 2)]);
        let changes = advance_soil_timers(&mut grid, &mut timers, SOIL_DRYOUT_MS);
        assert_eq!(changes.dried, vec![(2, 2)]);
        assert!(!grid.is_tilled((2, 2)));
        assert!(!timers.contains((2, 2)), "timer removed with the soil");
    }

    #[test]
    fn watered_soil_loses_water_first() {
        let (mut grid, mut timers) = tilled_grid(&[(1, 1)]);
        grid.water((1, 1));
        let changes = advance_soil_timers(&mut grid, &mut timers, SOIL_DRYOUT_MS);
        assert_eq!(changes.unwatered, vec![(1, 1)]);
        assert!(changes.dried.is_empty());
        assert!(grid.is_tilled((1, 1)), "soil survives the first expiry");
        assert!(!grid.is_watered((1, 1)));
        assert!(timers.contains((1, 1)), "fresh timer armed for bare soil");

        // Second full duration with no water: now the soil goes.
        let changes = advance_soil_timers(&mut grid, &mut timers, SOIL_DRYOUT_MS);
        assert_eq!(changes.dried, vec![(1, 1)]);
        assert!(!grid.is_tilled((1, 1)));
    }

    #[test]
    fn planted_soil_defers_dryout() {
        let (mut grid, mut timers) = tilled_grid(&[(3, 3)]);
        grid.plant((3, 3));
        let changes = advance_soil_timers(&mut grid, &mut timers, SOIL_DRYOUT_MS * 5.0);
        assert_eq!(changes, SoilTickChanges::default());
        assert!(grid.is_tilled((3, 3)));
        assert!(grid.is_planted((3, 3)));
        assert!(timers.contains((3, 3)));
    }

    #[test]
    fn split_ticks_match_one_big_tick() {
        let (mut grid_a, mut timers_a) = tilled_grid(&[(0, 0)]);
        let (mut grid_b, mut timers_b) = tilled_grid(&[(0, 0)]);

        let mut dried_a = Vec::new();
        for _ in 0..3 {
            dried_a.extend(advance_soil_timers(&mut grid_a, &mut timers_a, 1000.0).dried);
        }
        let dried_b = advance_soil_timers(&mut grid_b, &mut timers_b, 3000.0).dried;
        assert_eq!(dried_a, dried_b);
        assert_eq!(grid_a.is_tilled((0, 0)), grid_b.is_tilled((0, 0)));
    }
}
