//! Event-driven audio dispatch.
//!
//! Other domains send [`PlaySfxEvent`]/[`PlayMusicEvent`] ids; this is the
//! only module that touches audio assets. An id with no mapped clip is
//! logged and skipped — the triggering action still happened.

use bevy::prelude::*;

use crate::shared::*;

pub struct AudioPlugin;

impl Plugin for AudioPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MusicState>()
            .add_systems(OnEnter(GameState::Playing), start_background_music)
            .add_systems(Update, (handle_play_sfx, handle_play_music));
    }
}

#[derive(Resource, Default)]
pub struct MusicState {
    pub current_track: Option<Entity>,
}

/// Maps SFX ids sent by other domains to audio file paths.
fn sfx_path(sfx_id: &str) -> Option<&'static str> {
    match sfx_id {
        "hoe" => Some("audio/hoe.ogg"),
        "water" => Some("audio/water.ogg"),
        "plant" => Some("audio/plant.ogg"),
        "axe" => Some("audio/axe.ogg"),
        "success" => Some("audio/success.ogg"),
        "trade" => Some("audio/trade.ogg"),
        _ => None,
    }
}

fn music_path(track_id: &str) -> Option<&'static str> {
    match track_id {
        "farm" => Some("audio/bg.ogg"),
        _ => None,
    }
}

fn handle_play_sfx(
    mut events: EventReader<PlaySfxEvent>,
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    settings: Res<GameSettings>,
) {
    for event in events.read() {
        let Some(path) = sfx_path(&event.sfx_id) else {
            warn!("no clip mapped for sfx '{}'", event.sfx_id);
            continue;
        };
        commands.spawn((
            AudioPlayer::new(asset_server.load(path)),
            PlaybackSettings::DESPAWN.with_volume(bevy::audio::Volume::new(settings.volume)),
        ));
    }
}

fn handle_play_music(
    mut events: EventReader<PlayMusicEvent>,
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    settings: Res<GameSettings>,
    mut music_state: ResMut<MusicState>,
) {
    for event in events.read() {
        if let Some(entity) = music_state.current_track.take() {
            commands.entity(entity).despawn();
        }
        let Some(path) = music_path(&event.track_id) else {
            warn!("no track mapped for '{}'", event.track_id);
            continue;
        };
        let entity = commands
            .spawn((
                AudioPlayer::new(asset_server.load(path)),
                PlaybackSettings::LOOP.with_volume(bevy::audio::Volume::new(settings.volume)),
            ))
            .id();
        music_state.current_track = Some(entity);
    }
}

fn start_background_music(
    music_state: Res<MusicState>,
    mut music_events: EventWriter<PlayMusicEvent>,
) {
    if music_state.current_track.is_some() {
        return;
    }
    music_events.send(PlayMusicEvent {
        track_id: "farm".to_string(),
    });
}
