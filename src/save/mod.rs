//! Save/load reconciliation.
//!
//! Save flattens the live world into a [`SavedGame`] snapshot; load
//! rebuilds sprites, grid markers, and timers from one, without
//! re-running world setup. Store failures never corrupt the live world:
//! a failed save leaves it untouched, a failed load leaves the current
//! (or fresh) world in play.

use bevy::prelude::*;

use crate::farming::plants::{plant_seed_at, Plant};
use crate::farming::soil::{self, SoilTimers};
use crate::farming::FarmVisuals;
use crate::shared::*;
use crate::store::{ActivePlayer, GameStore};
use crate::trees::{spawn_tree_from_save, Apple, FallenApple, Tree};

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActivePlayer>()
            .init_resource::<GameStore>()
            .add_systems(OnEnter(GameState::Playing), request_initial_load)
            .add_systems(
                Update,
                (handle_save_request, handle_load_request)
                    .run_if(in_state(GameState::Playing).or(in_state(GameState::Shop))),
            );
    }
}

/// Resume a previous session if the store has one. Runs once; a missing
/// or unreadable record simply means a fresh farm. Without a full world
/// save, the inventory record alone is still honored; with nothing at
/// all, a new farmer gets the starter kit.
fn request_initial_load(
    store: Res<GameStore>,
    player: Res<ActivePlayer>,
    mut inventory: ResMut<Inventory>,
    mut load_events: EventWriter<LoadRequestEvent>,
    mut done: Local<bool>,
) {
    if *done {
        return;
    }
    *done = true;
    match store.load_game_state(&player.id) {
        Ok(Some(_)) => {
            load_events.send(LoadRequestEvent);
            return;
        }
        Ok(None) => info!("no saved game for '{}', starting fresh", player.id),
        Err(e) => warn!("saved game unreadable, starting fresh: {e}"),
    }

    match store.load_inventory(&player.id) {
        Ok(Some(slots)) => inventory.slots = slots,
        Ok(None) => {
            inventory.add("carrot seeds", 5);
            inventory.add("wheat seeds", 3);
        }
        Err(e) => warn!("inventory unreadable, starting empty: {e}"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Save
// ─────────────────────────────────────────────────────────────────────────────

/// Flatten the live world into a snapshot and hand it to the store.
#[allow(clippy::too_many_arguments)]
fn handle_save_request(
    mut save_events: EventReader<SaveRequestEvent>,
    store: Res<GameStore>,
    active: Res<ActivePlayer>,
    grid: Res<SoilGrid>,
    sky: Res<Sky>,
    rain: Res<RainState>,
    player_state: Res<PlayerState>,
    inventory: Res<Inventory>,
    player_query: Query<&Transform, With<Player>>,
    plants: Query<&Plant>,
    trees: Query<&Tree>,
    mut complete_events: EventWriter<SaveCompleteEvent>,
) {
    for _ in save_events.read() {
        let position = player_query
            .get_single()
            .map(|tf| (tf.translation.x, tf.translation.y))
            .unwrap_or((0.0, 0.0));

        let game = SavedGame {
            version: SAVE_VERSION,
            player_position: position,
            selected_tool: player_state.selected_tool,
            selected_seed: player_state.selected_seed.clone(),
            coins: player_state.coins,
            inventory: inventory.slots.clone(),
            soil: grid
                .cells
                .iter()
                .map(|(&(x, y), &flags)| SoilCellSave { x, y, flags })
                .collect(),
            plants: plants
                .iter()
                .map(|p| PlantSave {
                    species: p.species.clone(),
                    cell: p.cell,
                    age: p.age,
                    watered: !p.needs_water,
                })
                .collect(),
            trees: trees
                .iter()
                .map(|t| TreeSave {
                    cell: t.cell,
                    species: t.species,
                    health: t.health,
                    alive: t.alive,
                    apples: t.apple_count(),
                })
                .collect(),
            water: grid.cells_where(|f| f.watered),
            time_of_day: sky.time_of_day,
            day_passed: sky.day_passed,
            is_raining: rain.raining,
        };

        let success = match store.save_game_state(&active.id, &game) {
            Ok(()) => match store.save_inventory(&active.id, &game.inventory) {
                Ok(()) => {
                    info!("game saved for '{}'", active.id);
                    true
                }
                Err(e) => {
                    warn!("inventory save failed: {e}");
                    false
                }
            },
            Err(e) => {
                warn!("save failed, world unchanged: {e}");
                false
            }
        };
        complete_events.send(SaveCompleteEvent { success });
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Load
// ─────────────────────────────────────────────────────────────────────────────

/// Rebuild the live world from the stored snapshot:
/// 1. install the flag grid, repairing planted-without-tilled cells;
/// 2. rebuild soil sprites and restart dry-out timers for tilled cells;
/// 3. replace every live plant/tree with its snapshot reconstruction;
/// 4. rebuild water overlays for watered cells.
#[allow(clippy::too_many_arguments)]
fn handle_load_request(
    mut load_events: EventReader<LoadRequestEvent>,
    mut commands: Commands,
    store: Res<GameStore>,
    active: Res<ActivePlayer>,
    registry: Res<PlantRegistry>,
    mut grid: ResMut<SoilGrid>,
    mut timers: ResMut<SoilTimers>,
    mut visuals: ResMut<FarmVisuals>,
    mut sky: ResMut<Sky>,
    mut rain: ResMut<RainState>,
    mut player_state: ResMut<PlayerState>,
    mut inventory: ResMut<Inventory>,
    mut player_query: Query<&mut Transform, With<Player>>,
    despawn_query: Query<Entity, Or<(With<Plant>, With<Tree>, With<Apple>, With<FallenApple>)>>,
    mut complete_events: EventWriter<LoadCompleteEvent>,
) {
    for _ in load_events.read() {
        let game = match store.load_game_state(&active.id) {
            Ok(Some(game)) => game,
            Ok(None) => {
                warn!("no saved game for '{}'; keeping current world", active.id);
                complete_events.send(LoadCompleteEvent { success: false });
                continue;
            }
            Err(e) => {
                warn!("load failed, keeping current world: {e}");
                complete_events.send(LoadCompleteEvent { success: false });
                continue;
            }
        };

        // 1. Flag grid, with the planted⇒tilled auto-repair.
        grid.cells = game
            .soil
            .iter()
            .map(|cell| ((cell.x, cell.y), cell.flags))
            .collect();
        let repaired = grid.repair();
        if repaired > 0 {
            warn!("repaired {repaired} planted-without-tilled cells on load");
        }

        // 2. Soil sprites from scratch; a fresh dry-out timer for every
        // tilled cell lacking one.
        for (_, entity) in visuals.soil.drain() {
            commands.entity(entity).despawn();
        }
        timers.timers.clear();
        for cell in grid.cells_where(|f| f.tilled) {
            soil::spawn_or_update_soil_sprite(&mut commands, &mut visuals, &grid, cell);
            timers.start(cell);
        }

        // 3. Plants and trees: tear down live entities, rebuild each from
        // its snapshot.
        for entity in despawn_query.iter() {
            commands.entity(entity).despawn();
        }
        visuals.plants.clear();

        for saved in &game.plants {
            let Some(species) = registry.species.get(&saved.species) else {
                warn!("saved plant has unknown species '{}'", saved.species);
                continue;
            };
            // plant_seed_at re-marks the cell and clears its dry-out timer.
            grid.clear_planted(saved.cell);
            if !plant_seed_at(
                &mut grid,
                &mut timers,
                &mut visuals,
                &mut commands,
                species,
                saved.cell,
                saved.age,
            ) {
                warn!("could not restore plant at {:?}", saved.cell);
            }
        }

        for saved in &game.trees {
            spawn_tree_from_save(&mut commands, saved);
        }

        // 4. Water overlays for every watered cell.
        for (_, entity) in visuals.water.drain() {
            commands.entity(entity).despawn();
        }
        for cell in grid.cells_where(|f| f.watered) {
            soil::spawn_water_sprite(&mut commands, &mut visuals, cell);
        }

        // Clock, weather, player.
        sky.time_of_day = game.time_of_day;
        sky.day_passed = game.day_passed;
        rain.raining = game.is_raining;
        rain.elapsed = 0.0;
        if game.is_raining && rain.duration <= 0.0 {
            // The snapshot stores only the flag; give resumed rain a
            // fresh duration draw.
            rain.duration = RAIN_MIN_SECS;
        }

        player_state.selected_tool = game.selected_tool;
        player_state.selected_seed = game.selected_seed.clone();
        player_state.coins = game.coins;
        inventory.slots = game.inventory.clone();
        if let Ok(mut tf) = player_query.get_single_mut() {
            tf.translation.x = game.player_position.0;
            tf.translation.y = game.player_position.1;
        }

        info!(
            "game loaded for '{}': day {}, {:.1}h, {} plants, {} trees",
            active.id,
            game.day_passed,
            game.time_of_day,
            game.plants.len(),
            game.trees.len()
        );
        complete_events.send(LoadCompleteEvent { success: true });
    }
}
