//! Built-in mission definitions: the fallback when the store has no
//! authored mission records.

use crate::missions::{Mission, MissionKind, MissionStatus};
use crate::shared::MissionAction;

fn mission(
    id: u32,
    name: &str,
    description: &str,
    kind: MissionKind,
    action: MissionAction,
    target_item: Option<&str>,
    required: u32,
    reward_item: &str,
    reward_quantity: u32,
) -> Mission {
    Mission {
        id,
        name: name.to_string(),
        description: description.to_string(),
        kind,
        action,
        target_item: target_item.map(str::to_string),
        required,
        progress: 0,
        status: MissionStatus::Active,
        assigned_day: None,
        completed_day: None,
        prerequisites: Vec::new(),
        reward_item: Some(reward_item.to_string()),
        reward_quantity,
        reward_claimed: false,
    }
}

pub fn builtin_missions() -> Vec<Mission> {
    let mut first_harvest = mission(
        1,
        "First Harvest",
        "Harvest 3 carrots from your field.",
        MissionKind::OneTime,
        MissionAction::Harvest,
        Some("carrot"),
        3,
        "corn seeds",
        5,
    );
    first_harvest.assigned_day = Some(0);

    let green_thumb = mission(
        2,
        "Green Thumb",
        "Water your soil 10 times today.",
        MissionKind::Daily,
        MissionAction::Water,
        Some("soil"),
        10,
        "carrot seeds",
        2,
    );

    let lumberjack = mission(
        3,
        "Lumberjack",
        "Fell a tree.",
        MissionKind::Weekly,
        MissionAction::Chop,
        Some("tree"),
        1,
        "tomato seeds",
        3,
    );

    let mut orchard_keeper = mission(
        4,
        "Orchard Keeper",
        "Collect 5 apples.",
        MissionKind::Chained,
        MissionAction::Collect,
        Some("apple"),
        5,
        "wheat seeds",
        4,
    );
    orchard_keeper.status = MissionStatus::Locked;
    orchard_keeper.prerequisites = vec![3];

    vec![first_harvest, green_thumb, lumberjack, orchard_keeper]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_prerequisites_resolve() {
        let missions = builtin_missions();
        let mut ids: Vec<u32> = missions.iter().map(|m| m.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), missions.len());
        for m in &missions {
            for prereq in &m.prerequisites {
                assert!(ids.contains(prereq), "mission {} has dangling prereq", m.id);
            }
        }
    }
}
