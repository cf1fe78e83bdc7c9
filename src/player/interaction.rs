//! Item pickups, interaction zones (bed, trader), and save keybinds.

use bevy::prelude::*;

use crate::shared::*;
use crate::world::{InteractionZone, ZoneKind};

/// Move awarded items into the inventory and report the collect action.
pub fn add_items_to_inventory(
    mut pickup_events: EventReader<ItemPickupEvent>,
    mut inventory: ResMut<Inventory>,
    mut sfx_events: EventWriter<PlaySfxEvent>,
    mut mission_events: EventWriter<MissionActionEvent>,
) {
    for event in pickup_events.read() {
        inventory.add(&event.item_name, event.quantity);
        sfx_events.send(PlaySfxEvent {
            sfx_id: "success".to_string(),
        });
        mission_events.send(MissionActionEvent {
            action: MissionAction::Collect,
            target: event.item_name.clone(),
            amount: event.quantity,
        });
    }
}

/// Interacting on or beside a zone cell triggers it: the bed starts the
/// sleep fast-forward, the trader toggles the shop.
pub fn handle_interaction_zones(
    input: Res<PlayerInput>,
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
    player_query: Query<&Transform, With<Player>>,
    zones: Query<&InteractionZone>,
    mut sleep_events: EventWriter<SleepEvent>,
) {
    if !input.interact {
        return;
    }
    let Ok(player_tf) = player_query.get_single() else {
        return;
    };
    let player_cell = world_to_cell(player_tf.translation.truncate());

    for zone in zones.iter() {
        let (dx, dy) = (
            zone.cell.0 - player_cell.0,
            zone.cell.1 - player_cell.1,
        );
        if dx.abs() > 1 || dy.abs() > 1 {
            continue;
        }
        match zone.kind {
            ZoneKind::Bed => {
                if *state.get() == GameState::Playing {
                    sleep_events.send(SleepEvent);
                }
            }
            ZoneKind::Trader => {
                let next = match state.get() {
                    GameState::Shop => GameState::Playing,
                    _ => GameState::Shop,
                };
                next_state.set(next);
            }
        }
        break;
    }
}

/// F5 saves, F9 loads.
pub fn handle_save_keys(
    input: Res<PlayerInput>,
    mut save_events: EventWriter<SaveRequestEvent>,
    mut load_events: EventWriter<LoadRequestEvent>,
) {
    if input.quicksave {
        save_events.send(SaveRequestEvent);
    }
    if input.quickload {
        load_events.send(LoadRequestEvent);
    }
}
