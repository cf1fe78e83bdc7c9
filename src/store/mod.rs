//! The record-store boundary.
//!
//! The simulation treats persistence as a schema-agnostic record service:
//! per-player game state, per-player inventory (full-replace), the item
//! catalog with buy/sell prices, and mission rows. Records are JSON files
//! under a root directory; every call can fail, and every failure
//! degrades to "no data" for loads and "not persisted this time" for
//! saves — logged, never fatal.
//!
//! The store is injected as a resource; nothing holds an ambient global
//! connection.

use bevy::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use crate::data::items::builtin_items;
use crate::missions::Mission;
use crate::shared::*;

/// Which price of an item to look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceKind {
    Buy,
    Sell,
}

#[derive(Resource, Debug, Clone)]
pub struct GameStore {
    root: PathBuf,
}

impl Default for GameStore {
    fn default() -> Self {
        let root = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("store");
        Self { root }
    }
}

impl GameStore {
    /// A store rooted at an explicit directory (tests use a temp dir).
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn player_dir(&self, player_id: &str) -> PathBuf {
        self.root.join("players").join(player_id)
    }

    fn read_record<T: DeserializeOwned>(&self, path: &PathBuf) -> Result<Option<T>, String> {
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(path)
            .map_err(|e| format!("read failed for {}: {e}", path.display()))?;
        let value = serde_json::from_str(&text)
            .map_err(|e| format!("malformed record {}: {e}", path.display()))?;
        Ok(Some(value))
    }

    /// Write via a temp file and rename, so a failed save never leaves a
    /// truncated record behind.
    fn write_record<T: Serialize>(&self, path: &PathBuf, value: &T) -> Result<(), String> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .map_err(|e| format!("could not create {}: {e}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| format!("serialization failed: {e}"))?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &json).map_err(|e| format!("write failed for {}: {e}", tmp.display()))?;
        fs::rename(&tmp, path).map_err(|e| format!("rename failed: {e}"))?;
        Ok(())
    }

    // ── Game state ───────────────────────────────────────────────────────

    pub fn load_game_state(&self, player_id: &str) -> Result<Option<SavedGame>, String> {
        let saved: Option<SavedGame> =
            self.read_record(&self.player_dir(player_id).join("game_state.json"))?;
        if let Some(ref game) = saved {
            if game.version != SAVE_VERSION {
                warn!(
                    "save for '{player_id}' has version {} (current {}); loading anyway",
                    game.version, SAVE_VERSION
                );
            }
        }
        Ok(saved)
    }

    pub fn save_game_state(&self, player_id: &str, game: &SavedGame) -> Result<(), String> {
        self.write_record(&self.player_dir(player_id).join("game_state.json"), game)
    }

    // ── Inventory (full-replace) ─────────────────────────────────────────

    pub fn load_inventory(
        &self,
        player_id: &str,
    ) -> Result<Option<Vec<Option<InventorySlot>>>, String> {
        self.read_record(&self.player_dir(player_id).join("inventory.json"))
    }

    /// Full-replace semantics: the stored slots become exactly `slots`.
    pub fn save_inventory(
        &self,
        player_id: &str,
        slots: &[Option<InventorySlot>],
    ) -> Result<(), String> {
        self.write_record(&self.player_dir(player_id).join("inventory.json"), &slots)
    }

    // ── Item catalog ─────────────────────────────────────────────────────

    /// The item catalog. Falls back to the built-in defaults when the
    /// stored catalog is missing or unreadable, so a dead store never
    /// empties the shop.
    pub fn all_items(&self) -> Vec<ItemDef> {
        match self.read_record::<Vec<ItemDef>>(&self.root.join("items.json")) {
            Ok(Some(items)) if !items.is_empty() => items,
            Ok(_) => builtin_items(),
            Err(e) => {
                warn!("item catalog unavailable, using defaults: {e}");
                builtin_items()
            }
        }
    }

    pub fn item_by_name(&self, name: &str) -> Option<ItemDef> {
        self.all_items().into_iter().find(|i| i.name == name)
    }

    pub fn item_price(&self, name: &str, kind: PriceKind) -> Option<u32> {
        let item = self.item_by_name(name)?;
        match kind {
            PriceKind::Buy => item.buy_price,
            PriceKind::Sell => item.sell_price,
        }
    }

    // ── Settings ─────────────────────────────────────────────────────────

    /// Player settings, kept as a RON record. Unreadable or missing
    /// settings fall back to the defaults.
    pub fn load_settings(&self) -> GameSettings {
        let path = self.root.join("settings.ron");
        if !path.exists() {
            return GameSettings::default();
        }
        match fs::read_to_string(&path) {
            Ok(text) => match ron::from_str(&text) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!("malformed settings record, using defaults: {e}");
                    GameSettings::default()
                }
            },
            Err(e) => {
                warn!("settings unreadable, using defaults: {e}");
                GameSettings::default()
            }
        }
    }

    pub fn save_settings(&self, settings: &GameSettings) -> Result<(), String> {
        fs::create_dir_all(&self.root)
            .map_err(|e| format!("could not create {}: {e}", self.root.display()))?;
        let text = ron::ser::to_string_pretty(settings, ron::ser::PrettyConfig::default())
            .map_err(|e| format!("settings serialization failed: {e}"))?;
        fs::write(self.root.join("settings.ron"), text)
            .map_err(|e| format!("settings write failed: {e}"))
    }

    // ── Missions ─────────────────────────────────────────────────────────

    /// Authored mission definitions, shared by all players.
    pub fn mission_definitions(&self) -> Result<Option<Vec<Mission>>, String> {
        self.read_record(&self.root.join("missions.json"))
    }

    /// A player's mission rows (progress, status, assignment days).
    pub fn player_missions(&self, player_id: &str) -> Result<Option<Vec<Mission>>, String> {
        self.read_record(&self.player_dir(player_id).join("missions.json"))
    }

    pub fn save_player_missions(
        &self,
        player_id: &str,
        missions: &[Mission],
    ) -> Result<(), String> {
        self.write_record(&self.player_dir(player_id).join("missions.json"), &missions)
    }
}

/// The active player identity. A single-profile build uses the default.
#[derive(Resource, Debug, Clone)]
pub struct ActivePlayer {
    pub id: String,
}

impl Default for ActivePlayer {
    fn default() -> Self {
        Self {
            id: "player_1".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(tag: &str) -> GameStore {
        let dir = std::env::temp_dir().join(format!("sproutvale_store_{tag}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        GameStore::at(dir)
    }

    #[test]
    fn missing_records_read_as_no_data() {
        let store = temp_store("missing");
        assert_eq!(store.load_game_state("nobody").unwrap(), None);
        assert_eq!(store.load_inventory("nobody").unwrap(), None);
        assert_eq!(store.player_missions("nobody").unwrap(), None);
    }

    #[test]
    fn inventory_round_trip_is_full_replace() {
        let store = temp_store("inventory");
        let first = vec![
            Some(InventorySlot {
                item_name: "wood".into(),
                quantity: 3,
            }),
            None,
        ];
        store.save_inventory("p", &first).unwrap();
        let second = vec![None, Some(InventorySlot {
            item_name: "apple".into(),
            quantity: 1,
        })];
        store.save_inventory("p", &second).unwrap();
        assert_eq!(store.load_inventory("p").unwrap(), Some(second));
    }

    #[test]
    fn item_catalog_falls_back_to_builtins() {
        let store = temp_store("catalog");
        let items = store.all_items();
        assert!(!items.is_empty());
        assert!(store.item_by_name("carrot seeds").is_some());
        assert!(store.item_price("wood", PriceKind::Sell).is_some());
        assert_eq!(
            store.item_price("wood", PriceKind::Buy),
            None,
            "wood is not buyable"
        );
    }

    #[test]
    fn settings_round_trip_through_ron() {
        let store = temp_store("settings");
        assert_eq!(store.load_settings(), GameSettings::default());
        let custom = GameSettings {
            volume: 0.7,
            autosave_on_sleep: false,
        };
        store.save_settings(&custom).unwrap();
        assert_eq!(store.load_settings(), custom);
    }

    #[test]
    fn game_state_round_trips() {
        let store = temp_store("game_state");
        let game = SavedGame {
            version: SAVE_VERSION,
            player_position: (42.0, 17.0),
            selected_tool: ToolKind::Axe,
            selected_seed: "corn".into(),
            coins: 99,
            inventory: vec![None],
            soil: vec![SoilCellSave {
                x: 5,
                y: 5,
                flags: TileFlags {
                    farmable: true,
                    tilled: true,
                    watered: true,
                    planted: true,
                },
            }],
            plants: vec![],
            trees: vec![],
            water: vec![(5, 5)],
            time_of_day: 13.5,
            day_passed: 4,
            is_raining: true,
        };
        store.save_game_state("p", &game).unwrap();
        let loaded = store.load_game_state("p").unwrap().unwrap();
        assert_eq!(loaded.soil, game.soil);
        assert_eq!(loaded.time_of_day, game.time_of_day);
        assert_eq!(loaded.coins, game.coins);
    }
}
