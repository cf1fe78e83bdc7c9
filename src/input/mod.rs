//! The single point where hardware input becomes game intents.
//!
//! Every other system consumes [`PlayerInput`]; none touches the keyboard.

use bevy::prelude::*;

use crate::shared::*;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerInput>()
            .init_resource::<KeyBindings>()
            .add_systems(PreUpdate, read_input);
    }
}

fn read_input(
    keys: Res<ButtonInput<KeyCode>>,
    bindings: Res<KeyBindings>,
    mut input: ResMut<PlayerInput>,
) {
    *input = PlayerInput::default();

    let mut axis = Vec2::ZERO;
    if keys.pressed(bindings.move_up) || keys.pressed(KeyCode::ArrowUp) {
        axis.y += 1.0;
    }
    if keys.pressed(bindings.move_down) || keys.pressed(KeyCode::ArrowDown) {
        axis.y -= 1.0;
    }
    if keys.pressed(bindings.move_left) || keys.pressed(KeyCode::ArrowLeft) {
        axis.x -= 1.0;
    }
    if keys.pressed(bindings.move_right) || keys.pressed(KeyCode::ArrowRight) {
        axis.x += 1.0;
    }
    input.move_axis = axis;

    input.use_tool = keys.just_pressed(bindings.use_tool);
    input.use_seed = keys.just_pressed(bindings.use_seed);
    input.interact = keys.just_pressed(bindings.interact);
    input.toggle_inventory = keys.just_pressed(bindings.toggle_inventory);
    input.cycle_tool = keys.just_pressed(bindings.cycle_tool);
    input.cycle_seed = keys.just_pressed(bindings.cycle_seed);
    input.quicksave = keys.just_pressed(KeyCode::F5);
    input.quickload = keys.just_pressed(KeyCode::F9);
}
