mod audio;
mod data;
mod farming;
mod input;
mod level;
mod missions;
mod player;
mod save;
mod shared;
mod shop;
mod sky;
mod store;
mod trees;
mod world;

use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};

use shared::*;

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Sproutvale".into(),
                        resolution: WindowResolution::new(SCREEN_WIDTH, SCREEN_HEIGHT),
                        present_mode: PresentMode::AutoVsync,
                        resizable: true,
                        ..default()
                    }),
                    ..default()
                })
                .set(ImagePlugin::default_nearest()),
        )
        // Game state
        .init_state::<GameState>()
        // Shared resources
        .init_resource::<SoilGrid>()
        .init_resource::<Sky>()
        .init_resource::<RainState>()
        .init_resource::<PlayerState>()
        .init_resource::<Inventory>()
        .init_resource::<ItemRegistry>()
        .init_resource::<PlantRegistry>()
        .init_resource::<GameSettings>()
        // Events
        .add_event::<ToolUseEvent>()
        .add_event::<UseSeedEvent>()
        .add_event::<ItemPickupEvent>()
        .add_event::<SleepEvent>()
        .add_event::<PlaySfxEvent>()
        .add_event::<PlayMusicEvent>()
        .add_event::<MissionActionEvent>()
        .add_event::<ShopTransactionEvent>()
        .add_event::<SaveRequestEvent>()
        .add_event::<LoadRequestEvent>()
        .add_event::<SaveCompleteEvent>()
        .add_event::<LoadCompleteEvent>()
        // Domain plugins
        .add_plugins(input::InputPlugin)
        .add_plugins(level::LevelPlugin)
        .add_plugins(player::PlayerPlugin)
        .add_plugins(farming::FarmingPlugin)
        .add_plugins(trees::TreePlugin)
        .add_plugins(sky::SkyPlugin)
        .add_plugins(world::WorldPlugin)
        .add_plugins(missions::MissionPlugin)
        .add_plugins(shop::ShopPlugin)
        .add_plugins(audio::AudioPlugin)
        .add_plugins(save::SavePlugin)
        .add_plugins(data::DataPlugin)
        // Camera
        .add_systems(Startup, setup_camera)
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        Transform::from_scale(Vec3::splat(1.0 / PIXEL_SCALE)),
    ));
}
