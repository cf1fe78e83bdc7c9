//! Player domain: spawning, movement, tool/seed use, pickups, and the
//! bed/trader interactions.

pub mod interaction;
pub mod movement;
pub mod tools;

use bevy::prelude::*;

use crate::shared::*;
use crate::world::PlayerSpawn;

pub use tools::{SEED_ORDER, TOOL_ORDER};

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        // The map fixes the spawn point, so the world must build first.
        app.add_systems(
            OnEnter(GameState::Playing),
            spawn_player.after(crate::world::build_world),
        )
            .add_systems(
                Update,
                (
                    movement::player_movement,
                    tools::use_tool,
                    tools::use_seed,
                    tools::cycle_selection,
                    interaction::add_items_to_inventory,
                    interaction::handle_save_keys,
                    camera_follow_player,
                )
                    .in_set(SimSet::Entities)
                    .run_if(in_state(GameState::Playing)),
            )
            // Zone interaction also runs while the shop is open so the
            // trader can be closed again.
            .add_systems(
                Update,
                interaction::handle_interaction_zones
                    .run_if(in_state(GameState::Playing).or(in_state(GameState::Shop))),
            );
    }
}

fn spawn_player(
    mut commands: Commands,
    spawn: Res<PlayerSpawn>,
    existing: Query<Entity, With<Player>>,
) {
    if !existing.is_empty() {
        return;
    }
    commands.spawn((
        Player,
        PlayerMovement::default(),
        Sprite {
            color: Color::srgb(0.90, 0.80, 0.60),
            custom_size: Some(Vec2::new(TILE_SIZE * 0.7, TILE_SIZE * 0.9)),
            ..default()
        },
        Transform::from_translation(spawn.0.extend(Z_MAIN)),
    ));
}

fn camera_follow_player(
    player_query: Query<&Transform, With<Player>>,
    mut camera_query: Query<&mut Transform, (With<Camera2d>, Without<Player>)>,
) {
    let Ok(player_tf) = player_query.get_single() else {
        return;
    };
    for mut cam_tf in camera_query.iter_mut() {
        cam_tf.translation.x = player_tf.translation.x;
        cam_tf.translation.y = player_tf.translation.y;
    }
}
