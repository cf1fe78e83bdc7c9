//! Harvest-on-collision: mature crops are collected by walking into them.

use bevy::prelude::*;

use super::{plants::Plant, FarmVisuals};
use crate::shared::*;

/// How close the player must be to a mature plant's centre to collect it.
const HARVEST_RADIUS: f32 = TILE_SIZE * 0.75;

/// Auto-collect harvestable plants overlapping the player. Runs before the
/// soil timers each tick, so a crop collected on the same tick its soil
/// would dry out clears its planted flag first.
pub fn plant_collision_harvest(
    mut commands: Commands,
    mut grid: ResMut<SoilGrid>,
    mut visuals: ResMut<FarmVisuals>,
    mut pickup_events: EventWriter<ItemPickupEvent>,
    mut mission_events: EventWriter<MissionActionEvent>,
    player_query: Query<&Transform, With<Player>>,
    plants: Query<(Entity, &Plant, &Transform), Without<Player>>,
) {
    let Ok(player_tf) = player_query.get_single() else {
        return;
    };
    let player_pos = player_tf.translation.truncate();

    for (entity, plant, transform) in plants.iter() {
        if !plant.harvestable {
            continue;
        }
        if player_pos.distance(transform.translation.truncate()) > HARVEST_RADIUS {
            continue;
        }

        pickup_events.send(ItemPickupEvent {
            item_name: plant.species.clone(),
            quantity: 1,
        });
        mission_events.send(MissionActionEvent {
            action: MissionAction::Harvest,
            target: plant.species.clone(),
            amount: 1,
        });

        grid.clear_planted(plant.cell);
        visuals.plants.remove(&plant.cell);

        // Decaying after-image where the crop stood.
        commands.spawn((
            Sprite {
                color: Color::srgba(0.95, 0.95, 0.85, 0.8),
                custom_size: Some(Vec2::new(TILE_SIZE * 0.6, TILE_SIZE * 0.8)),
                ..default()
            },
            Transform::from_translation(transform.translation),
            Particle { remaining_ms: 200.0 },
        ));

        commands.entity(entity).despawn();
    }
}
