//! Boot-time data loading: registries are populated from the store (with
//! built-in fallbacks) during the Loading state, then play begins.

pub mod items;
pub mod missions;
pub mod plants;

use bevy::prelude::*;

use crate::shared::*;
use crate::store::GameStore;

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            load_registries.run_if(in_state(GameState::Loading)),
        );
    }
}

fn load_registries(
    store: Res<GameStore>,
    mut item_registry: ResMut<ItemRegistry>,
    mut plant_registry: ResMut<PlantRegistry>,
    mut settings: ResMut<GameSettings>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    for item in store.all_items() {
        item_registry.items.insert(item.name.clone(), item);
    }
    for species in plants::builtin_species() {
        plant_registry
            .species
            .insert(species.name.clone(), species);
    }
    *settings = store.load_settings();
    info!(
        "registries loaded: {} items, {} plant species",
        item_registry.items.len(),
        plant_registry.species.len()
    );
    next_state.set(GameState::Playing);
}
