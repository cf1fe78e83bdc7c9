//! Tool and seed use: turns input intents into targeted grid events.

use bevy::prelude::*;

use super::movement::facing_offset;
use crate::shared::*;

pub const TOOL_ORDER: [ToolKind; 3] = [ToolKind::Hoe, ToolKind::Axe, ToolKind::WateringCan];
pub const SEED_ORDER: [&str; 4] = ["carrot", "corn", "tomato", "wheat"];

/// Cell in front of the player, where tools and seeds land.
fn target_cell(transform: &Transform, movement: &PlayerMovement) -> (i32, i32) {
    let cell = world_to_cell(transform.translation.truncate());
    let (dx, dy) = facing_offset(movement.facing);
    (cell.0 + dx, cell.1 + dy)
}

pub fn use_tool(
    input: Res<PlayerInput>,
    player_state: Res<PlayerState>,
    query: Query<(&Transform, &PlayerMovement), With<Player>>,
    mut tool_events: EventWriter<ToolUseEvent>,
) {
    if !input.use_tool {
        return;
    }
    let Ok((transform, movement)) = query.get_single() else {
        return;
    };
    tool_events.send(ToolUseEvent {
        tool: player_state.selected_tool,
        target: target_cell(transform, movement),
    });
}

pub fn use_seed(
    input: Res<PlayerInput>,
    player_state: Res<PlayerState>,
    query: Query<(&Transform, &PlayerMovement), With<Player>>,
    mut seed_events: EventWriter<UseSeedEvent>,
) {
    if !input.use_seed {
        return;
    }
    let Ok((transform, movement)) = query.get_single() else {
        return;
    };
    seed_events.send(UseSeedEvent {
        target: target_cell(transform, movement),
        species: player_state.selected_seed.clone(),
    });
}

/// Tab cycles the tool, C cycles the seed.
pub fn cycle_selection(input: Res<PlayerInput>, mut player_state: ResMut<PlayerState>) {
    if input.cycle_tool {
        let idx = TOOL_ORDER
            .iter()
            .position(|t| *t == player_state.selected_tool)
            .unwrap_or(0);
        player_state.selected_tool = TOOL_ORDER[(idx + 1) % TOOL_ORDER.len()];
    }
    if input.cycle_seed {
        let idx = SEED_ORDER
            .iter()
            .position(|s| *s == player_state.selected_seed)
            .unwrap_or(0);
        player_state.selected_seed = SEED_ORDER[(idx + 1) % SEED_ORDER.len()].to_string();
    }
}
