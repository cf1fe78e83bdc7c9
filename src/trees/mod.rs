//! Tree lifecycle: health/damage/death/regrowth and the apple sub-machine.
//!
//! The binding invariant: a tree never carries more apples than it has
//! health. Every health-reducing event re-clamps the apple set.

use bevy::prelude::*;
use rand::Rng;

use crate::shared::*;

/// Shake wobble length.
const SHAKE_MS: f32 = 300.0;
/// Fresh trees arm their first apple between these bounds.
const FIRST_APPLE_MIN_SECS: f32 = 10.0;
/// Minimum centre distance between two apples on the same tree.
const APPLE_MIN_DIST: f32 = 6.0;
const APPLE_SIZE: f32 = 5.0;
const APPLE_EDGE_PAD: f32 = 2.0;
/// Placement attempts before giving up on a non-overlapping spot.
const APPLE_PLACE_ATTEMPTS: u32 = 20;
/// Dropped apples stay collectible this long before rotting away.
const FALLEN_APPLE_MS: f32 = 2500.0;

pub struct TreePlugin;

impl Plugin for TreePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (handle_axe_tool_use, handle_tree_shake)
                .in_set(SimSet::Entities)
                .run_if(in_state(GameState::Playing)),
        )
        .add_systems(
            Update,
            (update_trees, update_fallen_apples)
                .in_set(SimSet::Soil)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Components
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AppleRef {
    pub entity: Entity,
    /// Offset from the tree centre.
    pub offset: Vec2,
}

#[derive(Component, Debug, Clone)]
pub struct Tree {
    pub species: TreeSpecies,
    pub cell: (i32, i32),
    pub health: u32,
    pub max_health: u32,
    pub alive: bool,
    pub wood_yield: u32,
    pub apples: Vec<AppleRef>,
    pub apple_timer: Countdown,
    pub respawn_timer: Countdown,
    pub shake_remaining_ms: f32,
}

impl Tree {
    pub fn new(species: TreeSpecies, cell: (i32, i32)) -> Self {
        let mut rng = rand::thread_rng();
        let mut apple_timer = Countdown::new(APPLE_GROW_SECS * 1000.0);
        apple_timer.activate();
        apple_timer
            .set_remaining(rng.gen_range(FIRST_APPLE_MIN_SECS..=APPLE_GROW_SECS) * 1000.0);
        Self {
            species,
            cell,
            health: species.max_health(),
            max_health: species.max_health(),
            alive: true,
            wood_yield: species.wood_yield(),
            apples: Vec::new(),
            apple_timer,
            respawn_timer: Countdown::new(TREE_RESPAWN_MS),
            shake_remaining_ms: 0.0,
        }
    }

    pub fn apple_count(&self) -> u32 {
        self.apples.len() as u32
    }
}

/// An apple hanging on a living tree.
#[derive(Component, Debug, Clone)]
pub struct Apple {
    pub tree: Entity,
}

/// A dropped apple: falls briefly, collectible on contact, then rots.
#[derive(Component, Debug, Clone)]
pub struct FallenApple {
    pub remaining_ms: f32,
    pub fall_speed: f32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Spawning & the species-template factory
// ─────────────────────────────────────────────────────────────────────────────

fn tree_sprite(tree: &Tree) -> Sprite {
    let size = tree.species.sprite_size();
    if tree.alive {
        Sprite {
            color: Color::srgb(0.16, 0.45, 0.18),
            custom_size: Some(size),
            ..default()
        }
    } else {
        // Stump: squat and brown.
        Sprite {
            color: Color::srgb(0.42, 0.30, 0.18),
            custom_size: Some(Vec2::new(size.x * 0.5, size.y * 0.3)),
            ..default()
        }
    }
}

fn apple_sprite() -> Sprite {
    Sprite {
        color: Color::srgb(0.85, 0.15, 0.15),
        custom_size: Some(Vec2::splat(APPLE_SIZE)),
        ..default()
    }
}

/// Spawn a fresh, full-health tree with a random initial apple set.
pub fn spawn_tree(commands: &mut Commands, species: TreeSpecies, cell: (i32, i32)) -> Entity {
    let mut tree = Tree::new(species, cell);
    let entity = spawn_tree_body(commands, &tree);
    let mut rng = rand::thread_rng();
    let count = rng.gen_range(0..tree.health.max(1));
    for _ in 0..count {
        grow_one_apple(commands, entity, &mut tree);
    }
    commands.entity(entity).insert(tree);
    entity
}

/// Rebuild a tree from its snapshot: the species template supplies shape
/// and yields, then the exact saved health/aliveness/apple count is
/// reapplied. Apple positions are re-rolled; their count is not.
pub fn spawn_tree_from_save(commands: &mut Commands, save: &TreeSave) -> Entity {
    let mut tree = Tree::new(save.species, save.cell);
    tree.health = save.health.min(tree.max_health);
    tree.alive = save.alive;
    let entity = spawn_tree_body(commands, &tree);

    if tree.alive {
        let count = save.apples.min(tree.health);
        for _ in 0..count {
            grow_one_apple(commands, entity, &mut tree);
        }
    } else {
        tree.respawn_timer.activate();
    }

    commands.entity(entity).insert(tree);
    entity
}

fn spawn_tree_body(commands: &mut Commands, tree: &Tree) -> Entity {
    commands
        .spawn((
            tree_sprite(tree),
            Transform::from_translation(tree_translation(tree)),
        ))
        .id()
}

fn tree_translation(tree: &Tree) -> Vec3 {
    let base = cell_to_world(tree.cell, Z_MAIN);
    // Tall sprite: lift so the trunk base sits on the tile.
    base + Vec3::new(0.0, tree.species.sprite_size().y / 2.0 - TILE_SIZE / 2.0, 0.0)
}

/// Pick a non-overlapping spot in the upper half of the tree's bounding
/// area by rejection sampling. `None` once the retry cap is spent.
pub fn random_apple_offset(
    rng: &mut impl Rng,
    size: Vec2,
    existing: &[Vec2],
) -> Option<Vec2> {
    let half_w = size.x / 2.0 - APPLE_SIZE / 2.0 - APPLE_EDGE_PAD;
    let top = size.y / 2.0 - APPLE_SIZE / 2.0 - APPLE_EDGE_PAD;
    if half_w <= 0.0 || top <= 0.0 {
        return None;
    }
    for _ in 0..APPLE_PLACE_ATTEMPTS {
        let candidate = Vec2::new(rng.gen_range(-half_w..=half_w), rng.gen_range(0.0..=top));
        if existing
            .iter()
            .all(|a| a.distance(candidate) >= APPLE_MIN_DIST)
        {
            return Some(candidate);
        }
    }
    None
}

/// Spawn one apple entity on `tree` if capacity and placement allow.
pub fn grow_one_apple(commands: &mut Commands, tree_entity: Entity, tree: &mut Tree) -> bool {
    if tree.apple_count() >= tree.health {
        return false;
    }
    let mut rng = rand::thread_rng();
    let existing: Vec<Vec2> = tree.apples.iter().map(|a| a.offset).collect();
    let Some(offset) = random_apple_offset(&mut rng, tree.species.sprite_size(), &existing)
    else {
        return false;
    };
    let pos = tree_translation(tree) + offset.extend(0.0);
    let entity = commands
        .spawn((
            apple_sprite(),
            Transform::from_translation(pos.with_z(Z_FRUIT)),
            Apple { tree: tree_entity },
        ))
        .id();
    tree.apples.push(AppleRef { entity, offset });
    true
}

// ─────────────────────────────────────────────────────────────────────────────
// Damage
// ─────────────────────────────────────────────────────────────────────────────

/// Axe swings at a tree's cell. Dead trees ignore further chops.
pub fn handle_axe_tool_use(
    mut tool_events: EventReader<ToolUseEvent>,
    mut commands: Commands,
    mut trees: Query<(&mut Tree, &mut Sprite, &Transform)>,
    mut pickup_events: EventWriter<ItemPickupEvent>,
    mut sfx_events: EventWriter<PlaySfxEvent>,
    mut mission_events: EventWriter<MissionActionEvent>,
) {
    for event in tool_events.read() {
        if event.tool != ToolKind::Axe {
            continue;
        }
        for (mut tree, mut sprite, transform) in trees.iter_mut() {
            if tree.cell != event.target {
                continue;
            }
            damage_tree(
                &mut commands,
                &mut tree,
                &mut sprite,
                transform,
                &mut pickup_events,
                &mut sfx_events,
                &mut mission_events,
            );
            break; // one tree per cell
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn damage_tree(
    commands: &mut Commands,
    tree: &mut Tree,
    sprite: &mut Sprite,
    transform: &Transform,
    pickup_events: &mut EventWriter<ItemPickupEvent>,
    sfx_events: &mut EventWriter<PlaySfxEvent>,
    mission_events: &mut EventWriter<MissionActionEvent>,
) {
    if !tree.alive {
        return;
    }

    tree.health = tree.health.saturating_sub(1);
    tree.shake_remaining_ms = SHAKE_MS;
    sfx_events.send(PlaySfxEvent {
        sfx_id: "axe".to_string(),
    });

    // A chop knocks one apple loose, straight into the player's pocket.
    let mut rng = rand::thread_rng();
    if !tree.apples.is_empty() {
        let idx = rng.gen_range(0..tree.apples.len());
        collect_apple(commands, tree, idx, pickup_events);
    }

    // Never more apples than remaining health.
    while tree.apple_count() > tree.health {
        let idx = rng.gen_range(0..tree.apples.len());
        collect_apple(commands, tree, idx, pickup_events);
    }

    if tree.health == 0 {
        pickup_events.send(ItemPickupEvent {
            item_name: "wood".to_string(),
            quantity: tree.wood_yield,
        });
        mission_events.send(MissionActionEvent {
            action: MissionAction::Chop,
            target: "tree".to_string(),
            amount: 1,
        });
        kill_tree(commands, tree, sprite, transform);
    }
}

/// Remove one hanging apple into the player's inventory, with a brief
/// after-image particle.
fn collect_apple(
    commands: &mut Commands,
    tree: &mut Tree,
    idx: usize,
    pickup_events: &mut EventWriter<ItemPickupEvent>,
) {
    let apple = tree.apples.swap_remove(idx);
    pickup_events.send(ItemPickupEvent {
        item_name: "apple".to_string(),
        quantity: 1,
    });
    commands.entity(apple.entity).despawn();
    commands.spawn((
        apple_sprite(),
        Transform::from_translation((tree_translation(tree) + apple.offset.extend(0.0)).with_z(Z_FRUIT)),
        Particle { remaining_ms: 300.0 },
    ));
}

/// Transition to the stump state: all remaining apples are force-dropped
/// as independent falling pickups and the respawn countdown starts.
fn kill_tree(commands: &mut Commands, tree: &mut Tree, sprite: &mut Sprite, transform: &Transform) {
    tree.alive = false;

    for apple in tree.apples.drain(..) {
        commands.entity(apple.entity).despawn();
        commands.spawn((
            apple_sprite(),
            Transform::from_translation(
                (transform.translation + apple.offset.extend(0.0)).with_z(Z_FRUIT),
            ),
            FallenApple {
                remaining_ms: FALLEN_APPLE_MS,
                fall_speed: 40.0,
            },
        ));
    }

    *sprite = tree_sprite(tree);
    tree.respawn_timer.activate();
}

// ─────────────────────────────────────────────────────────────────────────────
// Shake
// ─────────────────────────────────────────────────────────────────────────────

/// Interacting next to a living tree wobbles it, with a one-in-three
/// chance of shaking an apple loose.
pub fn handle_tree_shake(
    input: Res<PlayerInput>,
    mut commands: Commands,
    player_query: Query<&Transform, With<Player>>,
    mut trees: Query<&mut Tree>,
    mut pickup_events: EventWriter<ItemPickupEvent>,
) {
    if !input.interact {
        return;
    }
    let Ok(player_tf) = player_query.get_single() else {
        return;
    };
    let player_cell = world_to_cell(player_tf.translation.truncate());

    for mut tree in trees.iter_mut() {
        if !tree.alive {
            continue;
        }
        let (dx, dy) = (tree.cell.0 - player_cell.0, tree.cell.1 - player_cell.1);
        if dx.abs() > 1 || dy.abs() > 1 {
            continue;
        }

        tree.shake_remaining_ms = SHAKE_MS;
        let mut rng = rand::thread_rng();
        if !tree.apples.is_empty() && rng.gen_range(0..3) == 0 {
            let idx = rng.gen_range(0..tree.apples.len());
            collect_apple(&mut commands, &mut tree, idx, &mut pickup_events);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Per-tick update
// ─────────────────────────────────────────────────────────────────────────────

pub fn update_trees(
    time: Res<Time>,
    mut commands: Commands,
    mut trees: Query<(Entity, &mut Tree, &mut Sprite, &mut Transform)>,
) {
    let dt_ms = time.delta_secs() * 1000.0;
    for (entity, mut tree, mut sprite, mut transform) in trees.iter_mut() {
        if tree.alive {
            tick_apple_growth(&mut commands, entity, &mut tree, dt_ms);
        } else if tree.respawn_timer.tick(dt_ms) {
            regrow_tree(&mut commands, entity, &mut tree, &mut sprite);
        }

        // Shake wobble.
        if tree.shake_remaining_ms > 0.0 {
            tree.shake_remaining_ms = (tree.shake_remaining_ms - dt_ms).max(0.0);
            let intensity = tree.shake_remaining_ms / SHAKE_MS * 2.0;
            let base = tree_translation(&tree);
            transform.translation.x =
                base.x + (time.elapsed_secs() * 50.0).sin() * intensity;
            if tree.shake_remaining_ms == 0.0 {
                transform.translation.x = base.x;
            }
        }
    }
}

/// Advance the apple-growth countdown. The countdown only runs while the
/// tree is below its spontaneous-growth cap of health − 1 apples.
pub fn tick_apple_growth(
    commands: &mut Commands,
    entity: Entity,
    tree: &mut Tree,
    dt_ms: f32,
) {
    if tree.health == 0 || tree.apple_count() >= tree.health - 1 {
        return;
    }
    if !tree.apple_timer.active() {
        tree.apple_timer.activate();
    }
    if tree.apple_timer.tick(dt_ms) {
        grow_one_apple(commands, entity, tree);
        tree.apple_timer.activate();
    }
}

/// Respawn expiry: back to full health with a fresh random apple set.
pub fn regrow_tree(
    commands: &mut Commands,
    entity: Entity,
    tree: &mut Tree,
    sprite: &mut Sprite,
) {
    tree.alive = true;
    tree.health = tree.max_health;
    *sprite = tree_sprite(tree);

    let mut rng = rand::thread_rng();
    let count = rng.gen_range(0..tree.health.max(1));
    for _ in 0..count {
        grow_one_apple(commands, entity, tree);
    }
    info!(
        "tree at {:?} regrew with {} apples",
        tree.cell,
        tree.apple_count()
    );
}

/// Fallen apples drift to the ground, get collected on contact, and rot.
pub fn update_fallen_apples(
    time: Res<Time>,
    mut commands: Commands,
    player_query: Query<&Transform, With<Player>>,
    mut apples: Query<(Entity, &mut FallenApple, &mut Transform), Without<Player>>,
    mut pickup_events: EventWriter<ItemPickupEvent>,
) {
    let dt = time.delta_secs();
    let player_pos = player_query
        .get_single()
        .map(|tf| tf.translation.truncate())
        .ok();

    for (entity, mut apple, mut transform) in apples.iter_mut() {
        apple.remaining_ms -= dt * 1000.0;
        transform.translation.y -= apple.fall_speed * dt;
        apple.fall_speed = (apple.fall_speed - 60.0 * dt).max(0.0);

        let collected = player_pos
            .map(|p| p.distance(transform.translation.truncate()) < TILE_SIZE * 0.6)
            .unwrap_or(false);
        if collected {
            pickup_events.send(ItemPickupEvent {
                item_name: "apple".to_string(),
                quantity: 1,
            });
            commands.entity(entity).despawn();
        } else if apple.remaining_ms <= 0.0 {
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn apple_offsets_respect_separation_and_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let size = TreeSpecies::Medium.sprite_size();
        let mut placed: Vec<Vec2> = Vec::new();
        while let Some(offset) = random_apple_offset(&mut rng, size, &placed) {
            assert!(offset.y >= 0.0, "apples sit in the upper half");
            assert!(offset.x.abs() <= size.x / 2.0);
            for other in &placed {
                assert!(other.distance(offset) >= APPLE_MIN_DIST);
            }
            placed.push(offset);
            if placed.len() > 64 {
                panic!("rejection sampling failed to terminate");
            }
        }
        assert!(!placed.is_empty(), "some apples must fit on a medium tree");
    }

    #[test]
    fn respawn_timer_spans_three_game_days() {
        let tree = Tree::new(TreeSpecies::Small, (0, 0));
        assert_eq!(tree.respawn_timer.duration_ms(), 3.0 * DAY_LENGTH_SECS * 1000.0);
        assert!(!tree.respawn_timer.active(), "armed only once the tree dies");
    }

    #[test]
    fn new_tree_matches_species_template() {
        let tree = Tree::new(TreeSpecies::Medium, (4, 2));
        assert_eq!(tree.health, 8);
        assert_eq!(tree.wood_yield, 3);
        assert!(tree.alive);
        assert!(tree.apple_timer.active());
    }
}
