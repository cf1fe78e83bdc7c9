//! Player movement with per-axis collision against the walkability map.

use bevy::prelude::*;

use crate::shared::*;
use crate::world::WorldMap;

/// Half-extent of the player's collision footprint.
const HITBOX_HALF: f32 = TILE_SIZE * 0.3;

pub fn player_movement(
    time: Res<Time>,
    input: Res<PlayerInput>,
    world_map: Res<WorldMap>,
    mut query: Query<(&mut Transform, &mut PlayerMovement), With<Player>>,
) {
    let Ok((mut transform, mut movement)) = query.get_single_mut() else {
        return;
    };

    let axis = input.move_axis;
    movement.is_moving = axis != Vec2::ZERO;
    if !movement.is_moving {
        return;
    }

    movement.facing = if axis.x.abs() > axis.y.abs() {
        if axis.x > 0.0 {
            Facing::Right
        } else {
            Facing::Left
        }
    } else if axis.y > 0.0 {
        Facing::Up
    } else {
        Facing::Down
    };

    let delta = axis.normalize_or_zero() * movement.speed * time.delta_secs();
    let pos = transform.translation.truncate();

    // Per-axis resolution lets the player slide along walls.
    let mut next = pos;
    let x_try = Vec2::new(pos.x + delta.x, pos.y);
    if footprint_walkable(&world_map, x_try) {
        next.x = x_try.x;
    }
    let y_try = Vec2::new(next.x, pos.y + delta.y);
    if footprint_walkable(&world_map, y_try) {
        next.y = y_try.y;
    }

    transform.translation.x = next.x;
    transform.translation.y = next.y;
}

/// All four corners of the footprint must land on walkable tiles.
fn footprint_walkable(world_map: &WorldMap, centre: Vec2) -> bool {
    for dx in [-HITBOX_HALF, HITBOX_HALF] {
        for dy in [-HITBOX_HALF, HITBOX_HALF] {
            let cell = world_to_cell(centre + Vec2::new(dx, dy));
            if !world_map.is_walkable(cell) {
                return false;
            }
        }
    }
    true
}

/// Grid offset of the tile the player is facing.
pub fn facing_offset(facing: Facing) -> (i32, i32) {
    match facing {
        Facing::Up => (0, 1),
        Facing::Down => (0, -1),
        Facing::Left => (-1, 0),
        Facing::Right => (1, 0),
    }
}
