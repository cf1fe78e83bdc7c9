//! Missions: structured records driven by discrete action reports.
//!
//! One `Mission` record with a `kind` tag covers one-time, daily, weekly,
//! story, and chained missions; kind-specific behavior (resets,
//! prerequisites) lives in free functions dispatching on the tag. What a
//! mission requires is authored data — `action`, `target_item`,
//! `required` — never parsed out of its description text.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::shared::*;
use crate::store::{ActivePlayer, GameStore};

pub struct MissionPlugin;

impl Plugin for MissionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MissionLog>()
            .add_systems(OnEnter(GameState::Playing), init_missions)
            .add_systems(
                Update,
                (update_missions_by_action, daily_mission_reset)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(Update, persist_missions_on_save);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Data model
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissionKind {
    OneTime,
    Daily,
    Weekly,
    Story,
    Chained,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissionStatus {
    Active,
    Completed,
    Locked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub kind: MissionKind,
    /// What to do, on what, how many times — authored, not inferred.
    pub action: MissionAction,
    pub target_item: Option<String>,
    pub required: u32,
    pub progress: u32,
    pub status: MissionStatus,
    /// Day numbers, for daily/weekly resets.
    pub assigned_day: Option<u32>,
    pub completed_day: Option<u32>,
    /// Mission ids that must be completed first (story/chained).
    pub prerequisites: Vec<u32>,
    pub reward_item: Option<String>,
    pub reward_quantity: u32,
    pub reward_claimed: bool,
}

/// Whether a periodic mission is due for a reset on `today`.
pub fn should_reset(mission: &Mission, today: u32) -> bool {
    let Some(assigned) = mission.assigned_day else {
        return false;
    };
    match mission.kind {
        MissionKind::Daily => assigned < today,
        MissionKind::Weekly => assigned + 7 <= today,
        _ => false,
    }
}

pub fn reset_mission(mission: &mut Mission, today: u32) {
    mission.status = MissionStatus::Active;
    mission.progress = 0;
    mission.assigned_day = Some(today);
    mission.completed_day = None;
    mission.reward_claimed = false;
}

pub fn prerequisites_met(mission: &Mission, completed: &HashSet<u32>) -> bool {
    mission.prerequisites.iter().all(|id| completed.contains(id))
}

/// Does a reported action advance this mission?
pub fn matches_action(mission: &Mission, action: MissionAction, target: &str) -> bool {
    if mission.status != MissionStatus::Active || mission.action != action {
        return false;
    }
    match &mission.target_item {
        Some(item) => item == target,
        None => true,
    }
}

/// Apply progress; returns true when this call completes the mission.
pub fn record_progress(mission: &mut Mission, amount: u32, today: u32) -> bool {
    if mission.status != MissionStatus::Active {
        return false;
    }
    mission.progress = (mission.progress + amount).min(mission.required);
    if mission.progress >= mission.required {
        mission.status = MissionStatus::Completed;
        mission.completed_day = Some(today);
        return true;
    }
    false
}

// ─────────────────────────────────────────────────────────────────────────────
// Resource & systems
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Resource, Debug, Clone, Default)]
pub struct MissionLog {
    pub missions: Vec<Mission>,
    pub loaded: bool,
    last_seen_day: u32,
}

impl MissionLog {
    pub fn completed_ids(&self) -> HashSet<u32> {
        self.missions
            .iter()
            .filter(|m| m.status == MissionStatus::Completed)
            .map(|m| m.id)
            .collect()
    }

    /// Unlock every locked mission whose prerequisites are now satisfied.
    pub fn refresh_locks(&mut self, today: u32) {
        let done = self.completed_ids();
        for mission in &mut self.missions {
            if mission.status == MissionStatus::Locked && prerequisites_met(mission, &done) {
                mission.status = MissionStatus::Active;
                mission.assigned_day = Some(today);
            }
        }
    }
}

/// Load the player's mission rows, falling back to the authored
/// definitions (store-unreachable counts as "new player").
fn init_missions(
    mut log: ResMut<MissionLog>,
    store: Res<GameStore>,
    player: Res<ActivePlayer>,
    sky: Res<Sky>,
) {
    if log.loaded {
        return;
    }
    log.loaded = true;

    let rows = match store.player_missions(&player.id) {
        Ok(Some(rows)) => Some(rows),
        Ok(None) => None,
        Err(e) => {
            warn!("mission rows unavailable, starting fresh: {e}");
            None
        }
    };

    log.missions = match rows {
        Some(rows) => rows,
        None => {
            let mut defs = match store.mission_definitions() {
                Ok(Some(defs)) => defs,
                Ok(None) => crate::data::missions::builtin_missions(),
                Err(e) => {
                    warn!("mission definitions unavailable, using defaults: {e}");
                    crate::data::missions::builtin_missions()
                }
            };
            for mission in &mut defs {
                if mission.status == MissionStatus::Active {
                    mission.assigned_day = Some(sky.day_passed);
                }
            }
            defs
        }
    };
    log.last_seen_day = sky.day_passed;
    log.refresh_locks(sky.day_passed);
    info!("{} missions loaded", log.missions.len());
}

/// Advance matching missions from action reports; completed missions pay
/// their reward immediately.
fn update_missions_by_action(
    mut action_events: EventReader<MissionActionEvent>,
    mut log: ResMut<MissionLog>,
    sky: Res<Sky>,
    mut pickup_events: EventWriter<ItemPickupEvent>,
) {
    for event in action_events.read() {
        let today = sky.day_passed;
        let mut any_completed = false;

        for mission in &mut log.missions {
            if !matches_action(mission, event.action, &event.target) {
                continue;
            }
            if record_progress(mission, event.amount, today) {
                any_completed = true;
                info!("mission '{}' completed", mission.name);
                if let Some(reward) = mission.reward_item.clone() {
                    mission.reward_claimed = true;
                    pickup_events.send(ItemPickupEvent {
                        item_name: reward,
                        quantity: mission.reward_quantity,
                    });
                }
            }
        }

        if any_completed {
            log.refresh_locks(today);
        }
    }
}

/// Reset daily/weekly missions when the day counter moves.
fn daily_mission_reset(mut log: ResMut<MissionLog>, sky: Res<Sky>) {
    let today = sky.day_passed;
    if today == log.last_seen_day {
        return;
    }
    log.last_seen_day = today;
    for mission in &mut log.missions {
        if should_reset(mission, today) {
            reset_mission(mission, today);
        }
    }
}

/// Mission rows ride along with every game save.
fn persist_missions_on_save(
    mut save_events: EventReader<SaveRequestEvent>,
    log: Res<MissionLog>,
    store: Res<GameStore>,
    player: Res<ActivePlayer>,
) {
    for _ in save_events.read() {
        if let Err(e) = store.save_player_missions(&player.id, &log.missions) {
            warn!("mission save failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn daily(id: u32, action: MissionAction, target: &str, required: u32) -> Mission {
        Mission {
            id,
            name: format!("mission {id}"),
            description: String::new(),
            kind: MissionKind::Daily,
            action,
            target_item: Some(target.to_string()),
            required,
            progress: 0,
            status: MissionStatus::Active,
            assigned_day: Some(0),
            completed_day: None,
            prerequisites: Vec::new(),
            reward_item: None,
            reward_quantity: 0,
            reward_claimed: false,
        }
    }

    #[test]
    fn progress_completes_at_required() {
        let mut m = daily(1, MissionAction::Harvest, "carrot", 3);
        assert!(!record_progress(&mut m, 2, 5));
        assert!(record_progress(&mut m, 1, 5));
        assert_eq!(m.status, MissionStatus::Completed);
        assert_eq!(m.completed_day, Some(5));
        assert!(
            !record_progress(&mut m, 1, 5),
            "completed missions stop accumulating"
        );
    }

    #[test]
    fn matching_respects_action_and_target() {
        let m = daily(1, MissionAction::Harvest, "carrot", 3);
        assert!(matches_action(&m, MissionAction::Harvest, "carrot"));
        assert!(!matches_action(&m, MissionAction::Harvest, "corn"));
        assert!(!matches_action(&m, MissionAction::Collect, "carrot"));
    }

    #[test]
    fn daily_resets_next_day_weekly_after_seven() {
        let mut d = daily(1, MissionAction::Water, "soil", 5);
        assert!(!should_reset(&d, 0));
        assert!(should_reset(&d, 1));

        d.kind = MissionKind::Weekly;
        assert!(!should_reset(&d, 6));
        assert!(should_reset(&d, 7));

        reset_mission(&mut d, 7);
        assert_eq!(d.assigned_day, Some(7));
        assert_eq!(d.progress, 0);
        assert_eq!(d.status, MissionStatus::Active);
    }

    #[test]
    fn chained_missions_unlock_on_prerequisites() {
        let mut log = MissionLog::default();
        let mut first = daily(1, MissionAction::Chop, "tree", 1);
        first.kind = MissionKind::Chained;
        let mut second = daily(2, MissionAction::Collect, "wood", 3);
        second.kind = MissionKind::Chained;
        second.status = MissionStatus::Locked;
        second.prerequisites = vec![1];
        log.missions = vec![first, second];

        log.refresh_locks(0);
        assert_eq!(log.missions[1].status, MissionStatus::Locked);

        record_progress(&mut log.missions[0], 1, 0);
        log.refresh_locks(0);
        assert_eq!(log.missions[1].status, MissionStatus::Active);
    }
}
