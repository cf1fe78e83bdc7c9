//! Level orchestration: per-tick phase ordering and the sleep time-skip.
//!
//! The tick contract (see [`SimSet`]): entity updates, then plant-collision
//! harvesting, then soil timers, then weather. Sleep compresses N seconds
//! of that same ticking into one synchronous call — it replays the
//! per-second effects rather than taking a separate code path, so a slept
//! world and a ticked world end up in the same state.

use bevy::prelude::*;

use crate::farming::plants::{GrowthTick, Plant};
use crate::farming::{soil, FarmVisuals};
use crate::shared::*;
use crate::trees::{self, Tree};

pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                SimSet::Entities,
                SimSet::Harvest,
                SimSet::Soil,
                SimSet::Weather,
            )
                .chain()
                .run_if(in_state(GameState::Playing)),
        )
        .add_systems(
            Update,
            handle_sleep
                .after(SimSet::Weather)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sleep
// ─────────────────────────────────────────────────────────────────────────────

/// How long a sleep skips, in simulated seconds (one game-minute each).
/// Late evening and small hours earn the long night sleep; midday beds
/// are only a nap.
pub fn sleep_duration_secs(hour: f32) -> f32 {
    if hour >= NIGHT_HOUR_LATE || hour <= NIGHT_HOUR_EARLY {
        NIGHT_SLEEP_SECS
    } else {
        DAY_NAP_SECS
    }
}

/// Fast-forward the world through a night (or nap) of simulation. Runs to
/// completion within this call; nothing else observes a half-slept world.
///
/// Replay order follows live ticking: plants grow second-by-second while
/// the pre-sleep watering still holds, then the soil dries, then tree
/// timers absorb the whole span at once.
#[allow(clippy::too_many_arguments)]
pub fn handle_sleep(
    mut sleep_events: EventReader<SleepEvent>,
    mut commands: Commands,
    mut sky: ResMut<Sky>,
    mut grid: ResMut<SoilGrid>,
    mut timers: ResMut<soil::SoilTimers>,
    mut visuals: ResMut<FarmVisuals>,
    mut plants: Query<(Entity, &mut Plant, &mut Transform)>,
    mut tree_query: Query<(Entity, &mut Tree, &mut Sprite)>,
    settings: Res<GameSettings>,
    mut save_events: EventWriter<SaveRequestEvent>,
) {
    for _ in sleep_events.read() {
        let secs = sleep_duration_secs(sky.time_of_day);
        let total_ms = secs * 1000.0;
        info!(
            "sleeping {secs:.0}s of world time from hour {:.1}",
            sky.time_of_day
        );

        sky.advance_hours(secs / 60.0);

        // Plants: replay one grow() per simulated second, reading the
        // watered flag live, exactly as the per-tick system does.
        for (entity, mut plant, mut transform) in plants.iter_mut() {
            let mut dead = false;
            for _ in 0..secs as u32 {
                let watered = grid.is_watered(plant.cell);
                match plant.grow(1000.0, watered) {
                    GrowthTick::Alive => {}
                    GrowthTick::Matured => transform.translation.z = Z_MAIN,
                    GrowthTick::Died => {
                        dead = true;
                        break;
                    }
                }
            }
            if dead {
                grid.clear_planted(plant.cell);
                visuals.plants.remove(&plant.cell);
                commands.entity(entity).despawn();
            }
        }

        // The night dries yesterday's watering.
        soil::remove_water(&mut grid, &mut visuals, &mut commands);

        // Trees absorb the elapsed span directly on their countdowns.
        for (entity, mut tree, mut sprite) in tree_query.iter_mut() {
            if !tree.alive {
                if tree.respawn_timer.tick(total_ms) {
                    trees::regrow_tree(&mut commands, entity, &mut tree, &mut sprite);
                }
            } else if tree.health > 0 && tree.apple_count() < tree.health - 1 {
                if tree.apple_timer.tick(total_ms) {
                    trees::grow_one_apple(&mut commands, entity, &mut tree);
                    tree.apple_timer.activate();
                }
            }
        }

        // Soil dry-out timers replay second-by-second.
        for _ in 0..secs as u32 {
            let changes = soil::advance_soil_timers(&mut grid, &mut timers, 1000.0);
            soil::apply_soil_changes(&changes, &grid, &mut visuals, &mut commands);
        }

        if settings.autosave_on_sleep {
            save_events.send(SaveRequestEvent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn night_hours_get_the_long_sleep() {
        assert_eq!(sleep_duration_secs(22.0), NIGHT_SLEEP_SECS);
        assert_eq!(sleep_duration_secs(18.0), NIGHT_SLEEP_SECS);
        assert_eq!(sleep_duration_secs(2.0), NIGHT_SLEEP_SECS);
        assert_eq!(sleep_duration_secs(4.0), NIGHT_SLEEP_SECS);
    }

    #[test]
    fn midday_is_only_a_nap() {
        assert_eq!(sleep_duration_secs(10.0), DAY_NAP_SECS);
        assert_eq!(sleep_duration_secs(17.9), DAY_NAP_SECS);
        assert_eq!(sleep_duration_secs(4.1), DAY_NAP_SECS);
    }
}
