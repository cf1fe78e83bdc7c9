//! Visual sync for crop sprites and decay of feedback particles.
//!
//! Soil and water sprites are reconciled at mutation time (they change
//! rarely); plant colour tracks age every frame.

use bevy::prelude::*;

use super::plants::{plant_color, Plant};
use crate::shared::Particle;

/// Restyle plant sprites as they age through growth stages.
pub fn sync_plant_sprites(mut plants: Query<(&Plant, &mut Sprite), Changed<Plant>>) {
    for (plant, mut sprite) in plants.iter_mut() {
        sprite.color = plant_color(plant);
    }
}

/// Count particles down and despawn them at zero.
pub fn decay_particles(
    time: Res<Time>,
    mut commands: Commands,
    mut particles: Query<(Entity, &mut Particle, &mut Sprite)>,
) {
    let dt_ms = time.delta_secs() * 1000.0;
    for (entity, mut particle, mut sprite) in particles.iter_mut() {
        particle.remaining_ms -= dt_ms;
        if particle.remaining_ms <= 0.0 {
            commands.entity(entity).despawn();
        } else {
            // Fade out over the particle's lifetime.
            let alpha = (particle.remaining_ms / 200.0).clamp(0.0, 1.0);
            sprite.color = sprite.color.with_alpha(alpha);
        }
    }
}
