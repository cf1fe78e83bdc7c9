//! Day/night clock, sky tint, and rain scheduling.
//!
//! The sky colour is a pure function of the hour so that fast-forward and
//! reload land on exactly the same tint as live ticking.

use bevy::prelude::*;
use rand::Rng;

use crate::farming::{soil, FarmVisuals};
use crate::shared::*;

pub struct SkyPlugin;

impl Plugin for SkyPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Playing), spawn_sky_overlay)
            .add_systems(
                Update,
                (tick_clock, update_rain, update_sky_overlay, rain_particles)
                    .chain()
                    .in_set(SimSet::Weather)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sky colour keyframes
// ─────────────────────────────────────────────────────────────────────────────

const NIGHT: (f32, f32, f32) = (38.0, 101.0, 189.0);
const DAWN: (f32, f32, f32) = (155.0, 186.0, 228.0);
const DAY: (f32, f32, f32) = (255.0, 255.0, 255.0);
const DUSK: (f32, f32, f32) = (255.0, 163.0, 127.0);
const EVENING: (f32, f32, f32) = (146.0, 126.0, 191.0);

fn blend(a: (f32, f32, f32), b: (f32, f32, f32), t: f32) -> (f32, f32, f32) {
    (
        a.0 + (b.0 - a.0) * t,
        a.1 + (b.1 - a.1) * t,
        a.2 + (b.2 - a.2) * t,
    )
}

/// Sky tint for an hour of day, as 0-255 RGB. Pure: the same hour always
/// yields the same colour.
///
/// Breakpoints: solid night until 5, dawn blending into day by 7, flat
/// daylight until 17, dusk blending into evening by 20, evening fading
/// back to night at 24.
pub fn sky_color(hour: f32) -> (f32, f32, f32) {
    let h = hour.rem_euclid(24.0);
    if h < 5.0 {
        NIGHT
    } else if h < 7.0 {
        blend(DAWN, DAY, (h - 5.0) / 2.0)
    } else if h < 17.0 {
        DAY
    } else if h < 20.0 {
        blend(DUSK, EVENING, (h - 17.0) / 3.0)
    } else {
        blend(EVENING, NIGHT, (h - 20.0) / 4.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Clock
// ─────────────────────────────────────────────────────────────────────────────

fn tick_clock(time: Res<Time>, mut sky: ResMut<Sky>) {
    sky.advance(time.delta_secs());
}

// ─────────────────────────────────────────────────────────────────────────────
// Rain
// ─────────────────────────────────────────────────────────────────────────────

/// While clear, a per-tick Bernoulli draw (p = chance × dt) starts rain
/// with a uniform duration and waters every tilled tile. While raining,
/// accumulate elapsed time; at the drawn duration, stop and dry the farm.
pub fn update_rain(
    time: Res<Time>,
    mut rain: ResMut<RainState>,
    mut grid: ResMut<SoilGrid>,
    mut visuals: ResMut<FarmVisuals>,
    mut commands: Commands,
) {
    let dt = time.delta_secs();
    if rain.raining {
        rain.elapsed += dt;
        if rain.elapsed >= rain.duration {
            stop_rain(&mut rain, &mut grid, &mut visuals, &mut commands);
        }
    } else {
        let mut rng = rand::thread_rng();
        if rng.gen_bool((RAIN_CHANCE_PER_SEC * dt).clamp(0.0, 1.0) as f64) {
            let duration = rng.gen_range(RAIN_MIN_SECS..=RAIN_MAX_SECS);
            start_rain(duration, &mut rain, &mut grid, &mut visuals, &mut commands);
        }
    }
}

pub fn start_rain(
    duration: f32,
    rain: &mut RainState,
    grid: &mut SoilGrid,
    visuals: &mut FarmVisuals,
    commands: &mut Commands,
) {
    rain.raining = true;
    rain.duration = duration;
    rain.elapsed = 0.0;
    soil::water_all(grid, visuals, commands);
    info!("rain started, {duration:.0}s");
}

pub fn stop_rain(
    rain: &mut RainState,
    grid: &mut SoilGrid,
    visuals: &mut FarmVisuals,
    commands: &mut Commands,
) {
    rain.raining = false;
    rain.elapsed = 0.0;
    soil::remove_water(grid, visuals, commands);
    info!("rain stopped");
}

// ─────────────────────────────────────────────────────────────────────────────
// Visuals
// ─────────────────────────────────────────────────────────────────────────────

/// Full-screen tint driven by the clock.
#[derive(Component, Debug)]
pub struct SkyOverlay;

/// Falling rain streak.
#[derive(Component, Debug)]
pub struct RainDrop {
    pub speed: f32,
}

fn spawn_sky_overlay(mut commands: Commands, existing: Query<Entity, With<SkyOverlay>>) {
    if !existing.is_empty() {
        return;
    }
    commands.spawn((
        SkyOverlay,
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(0.0),
            top: Val::Px(0.0),
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        },
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.0)),
        ZIndex(900),
    ));
}

fn update_sky_overlay(
    sky: Res<Sky>,
    mut overlay_query: Query<&mut BackgroundColor, With<SkyOverlay>>,
) {
    let (r, g, b) = sky_color(sky.time_of_day);
    // Invert brightness into a darkening overlay: full daylight is
    // transparent, deep night darkens toward the tint's hue.
    let brightness = (r + g + b) / (3.0 * 255.0);
    let alpha = (1.0 - brightness) * 0.6;
    for mut bg in &mut overlay_query {
        *bg = BackgroundColor(Color::srgba(
            r / 255.0 * 0.2,
            g / 255.0 * 0.2,
            b / 255.0 * 0.2,
            alpha,
        ));
    }
}

const MAX_RAIN_DROPS: usize = 400;

fn rain_particles(
    time: Res<Time>,
    rain: Res<RainState>,
    mut commands: Commands,
    camera_query: Query<&Transform, With<Camera2d>>,
    mut drops: Query<(Entity, &RainDrop, &mut Transform), Without<Camera2d>>,
) {
    let Ok(cam_tf) = camera_query.get_single() else {
        return;
    };
    let half_w = SCREEN_WIDTH / 2.0 * cam_tf.scale.x;
    let half_h = SCREEN_HEIGHT / 2.0 * cam_tf.scale.y;

    // Advance and cull.
    let dt = time.delta_secs();
    let floor_y = cam_tf.translation.y - half_h - 10.0;
    let mut alive = 0;
    for (entity, drop, mut transform) in drops.iter_mut() {
        transform.translation.y -= drop.speed * dt;
        transform.translation.x -= drop.speed * 0.3 * dt;
        if transform.translation.y < floor_y {
            commands.entity(entity).despawn();
        } else {
            alive += 1;
        }
    }

    if !rain.raining || alive >= MAX_RAIN_DROPS {
        return;
    }
    let mut rng = rand::thread_rng();
    for _ in 0..4 {
        let x = rng.gen_range(cam_tf.translation.x - half_w..cam_tf.translation.x + half_w);
        let y = cam_tf.translation.y + half_h + rng.gen_range(0.0..20.0);
        commands.spawn((
            RainDrop {
                speed: rng.gen_range(180.0..260.0),
            },
            Sprite {
                color: Color::srgba(0.55, 0.65, 0.95, 0.6),
                custom_size: Some(Vec2::new(1.0, 5.0)),
                ..default()
            },
            Transform::from_xyz(x, y, Z_RAIN),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_bands_hold_their_keyframe() {
        assert_eq!(sky_color(0.0), NIGHT);
        assert_eq!(sky_color(4.9), NIGHT);
        assert_eq!(sky_color(7.0), DAY);
        assert_eq!(sky_color(12.0), DAY);
        assert_eq!(sky_color(16.9), DAY);
    }

    #[test]
    fn blends_hit_their_endpoints() {
        assert_eq!(sky_color(5.0), DAWN);
        assert_eq!(sky_color(17.0), DUSK);
        assert_eq!(sky_color(20.0), EVENING);
        // Midnight wrap: end of the evening ramp meets the night colour.
        let (r, g, b) = sky_color(23.999);
        assert!((r - NIGHT.0).abs() < 1.0);
        assert!((g - NIGHT.1).abs() < 1.0);
        assert!((b - NIGHT.2).abs() < 1.0);
    }

    #[test]
    fn sky_color_is_pure() {
        for hour in [0.0_f32, 5.5, 9.25, 18.75, 21.0] {
            assert_eq!(sky_color(hour), sky_color(hour));
        }
    }

    #[test]
    fn dawn_midpoint_is_halfway() {
        let (r, _, _) = sky_color(6.0);
        let expected = DAWN.0 + (DAY.0 - DAWN.0) * 0.5;
        assert!((r - expected).abs() < 1e-3);
    }
}
