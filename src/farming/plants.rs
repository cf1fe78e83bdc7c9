//! Crop planting and the per-plant growth state machine.
//!
//! A plant's watered status is derived from its tile's flag at the moment
//! of each tick — never cached — so watering the tile after planting
//! affects growth on the very next tick.

use bevy::prelude::*;

use super::{soil::SoilTimers, FarmVisuals};
use crate::shared::*;

// ─────────────────────────────────────────────────────────────────────────────
// Component
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Component, Debug, Clone)]
pub struct Plant {
    pub species: String,
    pub cell: (i32, i32),
    pub age: f32,
    pub max_age: f32,
    /// Age units gained per watered second.
    pub grow_rate: f32,
    pub harvestable: bool,
    pub needs_water: bool,
    /// Milliseconds since the tile was last seen watered.
    pub since_watered_ms: f32,
}

/// Outcome of one growth tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthTick {
    Alive,
    /// Crossed max age this tick: now harvestable, promote to the main
    /// collidable layer.
    Matured,
    /// Unwatered past the thirst deadline.
    Died,
}

impl Plant {
    pub fn new(species: &PlantSpecies, cell: (i32, i32)) -> Self {
        Self {
            species: species.name.clone(),
            cell,
            age: 0.0,
            max_age: species.max_age(),
            grow_rate: species.grow_rate,
            harvestable: false,
            needs_water: true,
            since_watered_ms: 0.0,
        }
    }

    /// Advance the state machine by `dt_ms` with the tile's current
    /// watered flag. Age only moves while watered; unwatered time counts
    /// toward the thirst deadline and freezes growth.
    pub fn grow(&mut self, dt_ms: f32, watered: bool) -> GrowthTick {
        if watered {
            self.since_watered_ms = 0.0;
            self.needs_water = false;
            if self.age < self.max_age {
                self.age += self.grow_rate * dt_ms / 1000.0;
                if self.age >= self.max_age {
                    self.age = self.max_age;
                    self.harvestable = true;
                    return GrowthTick::Matured;
                }
            }
        } else {
            self.needs_water = true;
            self.since_watered_ms += dt_ms;
            if self.since_watered_ms >= PLANT_THIRST_MS {
                return GrowthTick::Died;
            }
        }
        GrowthTick::Alive
    }

    /// Visual growth frame for the current age.
    pub fn stage(&self) -> u32 {
        self.age as u32
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Planting
// ─────────────────────────────────────────────────────────────────────────────

pub fn handle_use_seed(
    mut seed_events: EventReader<UseSeedEvent>,
    mut grid: ResMut<SoilGrid>,
    mut timers: ResMut<SoilTimers>,
    mut visuals: ResMut<FarmVisuals>,
    mut inventory: ResMut<Inventory>,
    mut commands: Commands,
    mut sfx_events: EventWriter<PlaySfxEvent>,
    mut mission_events: EventWriter<MissionActionEvent>,
    registry: Res<PlantRegistry>,
) {
    for event in seed_events.read() {
        let Some(species) = registry.species.get(&event.species) else {
            warn!("unknown seed species '{}'", event.species);
            continue;
        };
        let seed_item = format!("{} seeds", species.name);
        if !inventory.has(&seed_item, 1) {
            continue;
        }
        if !plant_seed_at(
            &mut grid,
            &mut timers,
            &mut visuals,
            &mut commands,
            species,
            event.target,
            0.0,
        ) {
            continue;
        }
        inventory.remove(&seed_item, 1);
        sfx_events.send(PlaySfxEvent {
            sfx_id: "plant".to_string(),
        });
        mission_events.send(MissionActionEvent {
            action: MissionAction::Plant,
            target: species.name.clone(),
            amount: 1,
        });
    }
}

/// Place a plant on a tilled, unplanted cell. Removes the cell's dry-out
/// timer: soil under a growing crop never disappears. Returns false (and
/// changes nothing) on an invalid cell. `age` is nonzero only when
/// restoring a saved plant.
pub fn plant_seed_at(
    grid: &mut SoilGrid,
    timers: &mut SoilTimers,
    visuals: &mut FarmVisuals,
    commands: &mut Commands,
    species: &PlantSpecies,
    cell: (i32, i32),
    age: f32,
) -> bool {
    if !grid.plant(cell) {
        return false;
    }
    timers.remove(cell);

    let mut plant = Plant::new(species, cell);
    plant.age = age.min(plant.max_age);
    if plant.age >= plant.max_age {
        plant.harvestable = true;
    }
    let z = if plant.harvestable { Z_MAIN } else { Z_GROUND_PLANT };

    let entity = commands
        .spawn((
            Sprite {
                color: plant_color(&plant),
                custom_size: Some(Vec2::new(TILE_SIZE * 0.6, TILE_SIZE * 0.8)),
                ..default()
            },
            Transform::from_translation(cell_to_world(cell, z)),
            plant,
        ))
        .id();
    visuals.plants.insert(cell, entity);
    true
}

/// Placeholder colour: pale seedling green ramping toward ripe orange.
pub fn plant_color(plant: &Plant) -> Color {
    let progress = if plant.max_age > 0.0 {
        (plant.age / plant.max_age).clamp(0.0, 1.0)
    } else {
        1.0
    };
    Color::srgb(
        0.35 + 0.45 * progress,
        0.65 - 0.15 * progress,
        0.25 * (1.0 - progress),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Growth tick
// ─────────────────────────────────────────────────────────────────────────────

pub fn update_plants(
    time: Res<Time>,
    mut grid: ResMut<SoilGrid>,
    mut visuals: ResMut<FarmVisuals>,
    mut commands: Commands,
    mut plants: Query<(Entity, &mut Plant, &mut Transform)>,
) {
    let dt_ms = time.delta_secs() * 1000.0;
    for (entity, mut plant, mut transform) in plants.iter_mut() {
        let watered = grid.is_watered(plant.cell);
        match plant.grow(dt_ms, watered) {
            GrowthTick::Alive => {}
            GrowthTick::Matured => {
                // Mature crops join the main layer and become interactable.
                transform.translation.z = Z_MAIN;
            }
            GrowthTick::Died => {
                grid.clear_planted(plant.cell);
                visuals.plants.remove(&plant.cell);
                commands.entity(entity).despawn();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn carrot() -> PlantSpecies {
        PlantSpecies {
            name: "carrot".to_string(),
            grow_rate: 0.05,
            stages: 4,
        }
    }

    #[test]
    fn age_advances_only_while_watered() {
        let species = carrot();
        let mut plant = Plant::new(&species, (5, 5));
        plant.grow(1000.0, true);
        assert!((plant.age - 0.05).abs() < 1e-6);
        assert!(!plant.needs_water);

        let before = plant.age;
        plant.grow(1000.0, false);
        assert_eq!(plant.age, before, "age freezes while unwatered");
        assert!(plant.needs_water);
    }

    #[test]
    fn matures_at_max_age_exactly_once() {
        let species = carrot();
        let mut plant = Plant::new(&species, (0, 0));
        let full_ms = species.max_age() / species.grow_rate * 1000.0;
        assert_eq!(plant.grow(full_ms, true), GrowthTick::Matured);
        assert!(plant.harvestable);
        assert_eq!(plant.age, plant.max_age);
        assert_eq!(
            plant.grow(1000.0, true),
            GrowthTick::Alive,
            "already-mature plants do not re-report maturity"
        );
        assert_eq!(plant.age, plant.max_age);
    }

    #[test]
    fn thirst_deadline_kills() {
        let species = carrot();
        let mut plant = Plant::new(&species, (0, 0));
        assert_eq!(plant.grow(PLANT_THIRST_MS - 1.0, false), GrowthTick::Alive);
        assert_eq!(plant.grow(1.0, false), GrowthTick::Died);
    }

    #[test]
    fn watering_resets_the_thirst_clock() {
        let species = carrot();
        let mut plant = Plant::new(&species, (0, 0));
        plant.grow(PLANT_THIRST_MS - 1.0, false);
        plant.grow(16.0, true);
        assert_eq!(plant.since_watered_ms, 0.0);
        assert_eq!(plant.grow(PLANT_THIRST_MS - 1.0, false), GrowthTick::Alive);
    }
}
