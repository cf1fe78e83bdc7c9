//! Shared components, resources, events, and states for Sproutvale.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain directly.

pub mod countdown;

pub use countdown::Countdown;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE — top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
    /// Trader menu open. Simulation systems do not run in this state.
    Shop,
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEM ORDERING — the per-tick contract
// ═══════════════════════════════════════════════════════════════════════

/// Fixed per-tick phases. Harvest must resolve before the soil timers do:
/// a plant collected in the same tick it would dry out clears its planted
/// flag first, which changes how the dry-out timer resolves for that cell.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSet {
    /// Player movement, tool/seed use, entity updates.
    Entities,
    /// Plant-collision harvesting.
    Harvest,
    /// Soil dry-out timers and plant growth.
    Soil,
    /// Day/night clock and rain scheduling.
    Weather,
}

// ═══════════════════════════════════════════════════════════════════════
// TILE FLAGS
// ═══════════════════════════════════════════════════════════════════════

/// Per-tile state of the farm grid. Farmable is fixed at world load from
/// the map definition; the other flags are runtime-mutated and round-trip
/// through save/load.
///
/// Invariant: `planted` implies `tilled`. All mutating operations on
/// [`SoilGrid`] preserve it; [`SoilGrid::repair`] restores it on load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileFlags {
    pub farmable: bool,
    pub tilled: bool,
    pub watered: bool,
    pub planted: bool,
}

impl TileFlags {
    pub fn farmable() -> Self {
        Self {
            farmable: true,
            ..Default::default()
        }
    }
}

/// The tile-state store. Keys are (col, row) grid cells; only cells that
/// appear in the map's Farmable layer have entries. Snapshots flatten
/// this into [`SoilCellSave`] records rather than serializing the map.
#[derive(Resource, Debug, Clone, Default)]
pub struct SoilGrid {
    pub cells: HashMap<(i32, i32), TileFlags>,
}

impl SoilGrid {
    pub fn get(&self, cell: (i32, i32)) -> TileFlags {
        self.cells.get(&cell).copied().unwrap_or_default()
    }

    pub fn is_tilled(&self, cell: (i32, i32)) -> bool {
        self.get(cell).tilled
    }

    pub fn is_watered(&self, cell: (i32, i32)) -> bool {
        self.get(cell).watered
    }

    pub fn is_planted(&self, cell: (i32, i32)) -> bool {
        self.get(cell).planted
    }

    /// Till a farmable, not-yet-tilled cell. Silent no-op otherwise.
    pub fn till(&mut self, cell: (i32, i32)) -> bool {
        match self.cells.get_mut(&cell) {
            Some(flags) if flags.farmable && !flags.tilled => {
                flags.tilled = true;
                true
            }
            _ => false,
        }
    }

    /// Water a tilled cell. Idempotent: re-watering is a no-op.
    pub fn water(&mut self, cell: (i32, i32)) -> bool {
        match self.cells.get_mut(&cell) {
            Some(flags) if flags.tilled && !flags.watered => {
                flags.watered = true;
                true
            }
            _ => false,
        }
    }

    /// Mark a tilled, unplanted cell as planted.
    pub fn plant(&mut self, cell: (i32, i32)) -> bool {
        match self.cells.get_mut(&cell) {
            Some(flags) if flags.tilled && !flags.planted => {
                flags.planted = true;
                true
            }
            _ => false,
        }
    }

    pub fn clear_planted(&mut self, cell: (i32, i32)) {
        if let Some(flags) = self.cells.get_mut(&cell) {
            flags.planted = false;
        }
    }

    pub fn clear_watered(&mut self, cell: (i32, i32)) {
        if let Some(flags) = self.cells.get_mut(&cell) {
            flags.watered = false;
        }
    }

    /// Remove the tilled state of a dried-out cell. Watered and planted
    /// are cleared with it; callers defer dry-out for planted cells.
    pub fn clear_tilled(&mut self, cell: (i32, i32)) {
        if let Some(flags) = self.cells.get_mut(&cell) {
            flags.tilled = false;
            flags.watered = false;
            flags.planted = false;
        }
    }

    /// All cells whose flags match a predicate.
    pub fn cells_where(&self, pred: impl Fn(TileFlags) -> bool) -> Vec<(i32, i32)> {
        self.cells
            .iter()
            .filter(|(_, &f)| pred(f))
            .map(|(&c, _)| c)
            .collect()
    }

    /// Force `tilled` wherever `planted` is set. Returns how many cells
    /// were repaired. Used by load reconciliation on snapshots written by
    /// older builds or mangled in the store.
    pub fn repair(&mut self) -> usize {
        let mut fixed = 0;
        for flags in self.cells.values_mut() {
            if flags.planted && !flags.tilled {
                flags.tilled = true;
                fixed += 1;
            }
        }
        fixed
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SKY & WEATHER
// ═══════════════════════════════════════════════════════════════════════

/// The day/night clock. `time_of_day` is a 0..24 hour float; wrapping past
/// 24 increments `day_passed`.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct Sky {
    pub time_of_day: f32,
    pub day_passed: u32,
    /// Real seconds per full 24-hour game day.
    pub day_length_secs: f32,
}

impl Default for Sky {
    fn default() -> Self {
        Self {
            time_of_day: 6.0,
            day_passed: 0,
            day_length_secs: DAY_LENGTH_SECS,
        }
    }
}

impl Sky {
    /// Advance by `dt` real seconds, wrapping past midnight.
    pub fn advance(&mut self, dt: f32) {
        self.advance_hours(dt * 24.0 / self.day_length_secs);
    }

    /// Advance by a number of game hours (used by the sleep fast-forward).
    pub fn advance_hours(&mut self, hours: f32) {
        self.time_of_day += hours;
        if self.time_of_day >= 24.0 {
            self.day_passed += (self.time_of_day / 24.0) as u32;
            self.time_of_day %= 24.0;
        }
    }
}

/// Rain on/off scheduling state. While raining, `elapsed` accumulates up
/// to `duration`; both are real seconds.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RainState {
    pub raining: bool,
    pub elapsed: f32,
    pub duration: f32,
}

// ═══════════════════════════════════════════════════════════════════════
// PLAYER
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    Hoe,
    Axe,
    WateringCan,
}

#[derive(Component, Debug, Clone, Default)]
pub struct Player;

#[derive(Component, Debug, Clone)]
pub struct PlayerMovement {
    pub facing: Facing,
    pub is_moving: bool,
    pub speed: f32,
}

impl Default for PlayerMovement {
    fn default() -> Self {
        Self {
            facing: Facing::Down,
            is_moving: false,
            speed: 80.0,
        }
    }
}

/// Tool/seed selection and wallet. Position lives on the player entity.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub selected_tool: ToolKind,
    pub selected_seed: String,
    pub coins: u32,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            selected_tool: ToolKind::Hoe,
            selected_seed: "carrot".to_string(),
            coins: 200,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// INVENTORY
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySlot {
    pub item_name: String,
    pub quantity: u32,
}

/// Ordered, nullable slots. Slot order is part of the persisted state:
/// the store's save_inventory is full-replace, so positions survive a
/// round trip exactly.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    pub slots: Vec<Option<InventorySlot>>,
    pub selected_slot: usize,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            slots: vec![None; INVENTORY_SLOTS],
            selected_slot: 0,
        }
    }
}

impl Inventory {
    /// Add to an existing stack of the same item, or the first empty slot.
    pub fn add(&mut self, item_name: &str, quantity: u32) {
        for slot in self.slots.iter_mut().flatten() {
            if slot.item_name == item_name {
                slot.quantity += quantity;
                return;
            }
        }
        if let Some(empty) = self.slots.iter_mut().find(|s| s.is_none()) {
            *empty = Some(InventorySlot {
                item_name: item_name.to_string(),
                quantity,
            });
        } else {
            self.slots.push(Some(InventorySlot {
                item_name: item_name.to_string(),
                quantity,
            }));
        }
    }

    /// Remove up to `quantity` of an item. Returns how many were removed;
    /// a drained slot reverts to empty.
    pub fn remove(&mut self, item_name: &str, quantity: u32) -> u32 {
        let mut remaining = quantity;
        for slot in self.slots.iter_mut() {
            if remaining == 0 {
                break;
            }
            if let Some(s) = slot {
                if s.item_name == item_name {
                    let take = remaining.min(s.quantity);
                    s.quantity -= take;
                    remaining -= take;
                    if s.quantity == 0 {
                        *slot = None;
                    }
                }
            }
        }
        quantity - remaining
    }

    pub fn count(&self, item_name: &str) -> u32 {
        self.slots
            .iter()
            .flatten()
            .filter(|s| s.item_name == item_name)
            .map(|s| s.quantity)
            .sum()
    }

    pub fn has(&self, item_name: &str, quantity: u32) -> bool {
        self.count(item_name) >= quantity
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ITEM & PLANT REGISTRIES — loaded from the store at boot
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDef {
    pub name: String,
    pub description: String,
    pub buy_price: Option<u32>,
    pub sell_price: Option<u32>,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct ItemRegistry {
    pub items: HashMap<String, ItemDef>,
}

impl ItemRegistry {
    pub fn get(&self, name: &str) -> Option<&ItemDef> {
        self.items.get(name)
    }
}

/// A crop species. `stages` is the number of visual growth frames; a plant
/// is mature when its age reaches `max_age()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantSpecies {
    pub name: String,
    /// Age units gained per watered second.
    pub grow_rate: f32,
    pub stages: u32,
}

impl PlantSpecies {
    pub fn max_age(&self) -> f32 {
        (self.stages - 1) as f32
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct PlantRegistry {
    pub species: HashMap<String, PlantSpecies>,
}

// ═══════════════════════════════════════════════════════════════════════
// INPUT — discrete intents produced by the input layer
// ═══════════════════════════════════════════════════════════════════════

/// Hardware-independent frame input. The input plugin is the single place
/// keyboard state is read; every other system consumes these intents.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlayerInput {
    pub move_axis: Vec2,
    pub use_tool: bool,
    pub use_seed: bool,
    pub interact: bool,
    pub toggle_inventory: bool,
    pub cycle_tool: bool,
    pub cycle_seed: bool,
    pub quicksave: bool,
    pub quickload: bool,
}

/// Player-tunable settings, persisted as a RON record in the store and
/// injected as a resource rather than read from a module-level global.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSettings {
    /// 0.0..=1.0 master volume.
    pub volume: f32,
    pub autosave_on_sleep: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            volume: 0.3,
            autosave_on_sleep: true,
        }
    }
}

/// Rebindable key map, injected as a resource rather than read from a
/// module-level global.
#[derive(Resource, Debug, Clone)]
pub struct KeyBindings {
    pub move_up: KeyCode,
    pub move_down: KeyCode,
    pub move_left: KeyCode,
    pub move_right: KeyCode,
    pub use_tool: KeyCode,
    pub use_seed: KeyCode,
    pub interact: KeyCode,
    pub toggle_inventory: KeyCode,
    pub cycle_tool: KeyCode,
    pub cycle_seed: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_up: KeyCode::KeyW,
            move_down: KeyCode::KeyS,
            move_left: KeyCode::KeyA,
            move_right: KeyCode::KeyD,
            use_tool: KeyCode::Space,
            use_seed: KeyCode::KeyR,
            interact: KeyCode::KeyQ,
            toggle_inventory: KeyCode::KeyE,
            cycle_tool: KeyCode::Tab,
            cycle_seed: KeyCode::KeyC,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS — cross-domain communication
// ═══════════════════════════════════════════════════════════════════════

/// The player swung the equipped tool at a grid cell.
#[derive(Event, Debug, Clone)]
pub struct ToolUseEvent {
    pub tool: ToolKind,
    pub target: (i32, i32),
}

/// The player used the selected seed on a grid cell.
#[derive(Event, Debug, Clone)]
pub struct UseSeedEvent {
    pub target: (i32, i32),
    pub species: String,
}

/// An item was awarded to the player (harvest, wood, apples, ...).
#[derive(Event, Debug, Clone)]
pub struct ItemPickupEvent {
    pub item_name: String,
    pub quantity: u32,
}

/// The player went to bed; the weather module fast-forwards the world.
#[derive(Event, Debug, Clone)]
pub struct SleepEvent;

#[derive(Event, Debug, Clone)]
pub struct PlaySfxEvent {
    pub sfx_id: String,
}

#[derive(Event, Debug, Clone)]
pub struct PlayMusicEvent {
    pub track_id: String,
}

/// Discrete action report consumed by the mission log.
#[derive(Event, Debug, Clone)]
pub struct MissionActionEvent {
    pub action: MissionAction,
    pub target: String,
    pub amount: u32,
}

/// What a mission asks the player to do. Authored as data — never parsed
/// out of description text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissionAction {
    Collect,
    Harvest,
    Plant,
    Chop,
    Water,
    Sell,
    Buy,
}

/// Buy or sell through the trader, priced via the store.
#[derive(Event, Debug, Clone)]
pub struct ShopTransactionEvent {
    pub item_name: String,
    pub quantity: u32,
    pub is_purchase: bool,
}

#[derive(Event, Debug, Clone)]
pub struct SaveRequestEvent;

#[derive(Event, Debug, Clone)]
pub struct LoadRequestEvent;

#[derive(Event, Debug, Clone)]
pub struct SaveCompleteEvent {
    pub success: bool,
}

#[derive(Event, Debug, Clone)]
pub struct LoadCompleteEvent {
    pub success: bool,
}

// ═══════════════════════════════════════════════════════════════════════
// SAVE DATA — the serialization boundary
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilCellSave {
    pub x: i32,
    pub y: i32,
    pub flags: TileFlags,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantSave {
    pub species: String,
    pub cell: (i32, i32),
    pub age: f32,
    pub watered: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSave {
    pub cell: (i32, i32),
    pub species: TreeSpecies,
    pub health: u32,
    pub alive: bool,
    pub apples: u32,
}

/// Complete flattened world + player snapshot. Created on save, consumed
/// on load, never held between sessions outside the store transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedGame {
    pub version: u32,
    pub player_position: (f32, f32),
    pub selected_tool: ToolKind,
    pub selected_seed: String,
    pub coins: u32,
    pub inventory: Vec<Option<InventorySlot>>,
    pub soil: Vec<SoilCellSave>,
    pub plants: Vec<PlantSave>,
    pub trees: Vec<TreeSave>,
    pub water: Vec<(i32, i32)>,
    pub time_of_day: f32,
    pub day_passed: u32,
    pub is_raining: bool,
}

pub const SAVE_VERSION: u32 = 1;

// ═══════════════════════════════════════════════════════════════════════
// GRID ↔ WORLD
// ═══════════════════════════════════════════════════════════════════════

/// Convert a grid cell to a world-space translation (centre of tile).
pub fn cell_to_world(cell: (i32, i32), z: f32) -> Vec3 {
    Vec3::new(
        cell.0 as f32 * TILE_SIZE + TILE_SIZE / 2.0,
        cell.1 as f32 * TILE_SIZE + TILE_SIZE / 2.0,
        z,
    )
}

/// Convert a world position to the grid cell containing it.
pub fn world_to_cell(pos: Vec2) -> (i32, i32) {
    (
        (pos.x / TILE_SIZE).floor() as i32,
        (pos.y / TILE_SIZE).floor() as i32,
    )
}

/// Short-lived feedback sprite (harvest after-image, apple puff).
#[derive(Component, Debug)]
pub struct Particle {
    pub remaining_ms: f32,
}

// ═══════════════════════════════════════════════════════════════════════
// TREES
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreeSpecies {
    Small,
    Medium,
}

impl TreeSpecies {
    pub fn max_health(self) -> u32 {
        match self {
            TreeSpecies::Small => 5,
            TreeSpecies::Medium => 8,
        }
    }

    pub fn wood_yield(self) -> u32 {
        match self {
            TreeSpecies::Small => 1,
            TreeSpecies::Medium => 3,
        }
    }

    pub fn sprite_size(self) -> Vec2 {
        match self {
            TreeSpecies::Small => Vec2::new(TILE_SIZE * 1.5, TILE_SIZE * 2.5),
            TreeSpecies::Medium => Vec2::new(TILE_SIZE * 2.0, TILE_SIZE * 3.0),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const TILE_SIZE: f32 = 16.0;
pub const PIXEL_SCALE: f32 = 3.0;
pub const SCREEN_WIDTH: f32 = 960.0;
pub const SCREEN_HEIGHT: f32 = 540.0;

pub const INVENTORY_SLOTS: usize = 24;

/// Draw-order layers, lowest first.
pub const Z_WATER: f32 = 0.0;
pub const Z_GROUND: f32 = 1.0;
pub const Z_SOIL: f32 = 2.0;
pub const Z_SOIL_WATER: f32 = 3.0;
pub const Z_GROUND_PLANT: f32 = 6.0;
pub const Z_MAIN: f32 = 7.0;
pub const Z_FRUIT: f32 = 9.0;
pub const Z_RAIN: f32 = 10.0;

/// Real seconds per 24-hour game day (one game-minute per real second).
pub const DAY_LENGTH_SECS: f32 = 24.0 * 60.0;

/// Tilled soil dries out and reverts after this long unwatered.
pub const SOIL_DRYOUT_MS: f32 = 3_000.0;

/// A plant dies after going this long without water (half a game day).
pub const PLANT_THIRST_MS: f32 = 12.0 * 60.0 * 1000.0;

/// Per-second chance that rain begins while the sky is clear.
pub const RAIN_CHANCE_PER_SEC: f32 = 0.005;
pub const RAIN_MIN_SECS: f32 = 20.0;
pub const RAIN_MAX_SECS: f32 = 60.0;

/// Sleep fast-forward spans, in simulated real seconds (= game minutes).
pub const DAY_NAP_SECS: f32 = 2.0 * 60.0;
pub const NIGHT_SLEEP_SECS: f32 = 6.0 * 60.0;
/// At or before this hour, sleeping still counts as night sleep.
pub const NIGHT_HOUR_EARLY: f32 = 4.0;
/// At or after this hour, sleeping counts as night sleep.
pub const NIGHT_HOUR_LATE: f32 = 18.0;

/// A living tree grows one apple per this interval while below capacity.
pub const APPLE_GROW_SECS: f32 = 60.0;
/// A felled tree regrows after three full game days.
pub const TREE_RESPAWN_MS: f32 = 3.0 * DAY_LENGTH_SECS * 1000.0;

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with_farmable(cells: &[(i32, i32)]) -> SoilGrid {
        let mut grid = SoilGrid::default();
        for &c in cells {
            grid.cells.insert(c, TileFlags::farmable());
        }
        grid
    }

    fn planted_implies_tilled(grid: &SoilGrid) -> bool {
        grid.cells.values().all(|f| !f.planted || f.tilled)
    }

    #[test]
    fn till_requires_farmable() {
        let mut grid = grid_with_farmable(&[(1, 1)]);
        assert!(grid.till((1, 1)));
        assert!(!grid.till((1, 1)), "re-tilling is a no-op");
        assert!(!grid.till((9, 9)), "unfarmable ground cannot be tilled");
        assert!(planted_implies_tilled(&grid));
    }

    #[test]
    fn water_is_idempotent_on_flags() {
        let mut grid = grid_with_farmable(&[(2, 3)]);
        assert!(!grid.water((2, 3)), "cannot water untilled soil");
        grid.till((2, 3));
        assert!(grid.water((2, 3)));
        assert!(!grid.water((2, 3)), "second watering is a no-op");
        assert!(grid.is_watered((2, 3)));
    }

    #[test]
    fn plant_requires_tilled_and_unplanted() {
        let mut grid = grid_with_farmable(&[(0, 0)]);
        assert!(!grid.plant((0, 0)));
        grid.till((0, 0));
        assert!(grid.plant((0, 0)));
        assert!(!grid.plant((0, 0)), "occupied cell rejects a second plant");
        assert!(planted_implies_tilled(&grid));
    }

    #[test]
    fn repair_forces_tilled_under_plants() {
        let mut grid = grid_with_farmable(&[(4, 4), (5, 5)]);
        grid.cells.get_mut(&(4, 4)).unwrap().planted = true; // corrupt
        grid.till((5, 5));
        assert_eq!(grid.repair(), 1);
        assert!(planted_implies_tilled(&grid));
    }

    #[test]
    fn sky_wraps_past_midnight() {
        let mut sky = Sky {
            time_of_day: 23.5,
            day_passed: 2,
            day_length_secs: 24.0,
        };
        // day_length 24s → one game hour per real second
        sky.advance(1.0);
        assert_eq!(sky.day_passed, 3);
        assert!((sky.time_of_day - 0.5).abs() < 1e-4);
    }

    #[test]
    fn inventory_stacks_then_fills_empty_slot() {
        let mut inv = Inventory::default();
        inv.add("wood", 2);
        inv.add("wood", 3);
        assert_eq!(inv.count("wood"), 5);
        assert_eq!(
            inv.slots.iter().flatten().count(),
            1,
            "same item stacks into one slot"
        );
        assert_eq!(inv.remove("wood", 4), 4);
        assert_eq!(inv.remove("wood", 4), 1, "removal is capped at holdings");
        assert!(!inv.has("wood", 1));
    }
}
