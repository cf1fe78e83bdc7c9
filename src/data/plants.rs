//! Built-in crop species table.
//!
//! `grow_rate` is age units per watered second; a species matures after
//! `(stages - 1) / grow_rate` seconds of watered growth. Carrots are the
//! starter crop at one game-hour to maturity.

use crate::shared::PlantSpecies;

fn species(name: &str, grow_rate: f32, stages: u32) -> PlantSpecies {
    PlantSpecies {
        name: name.to_string(),
        grow_rate,
        stages,
    }
}

pub fn builtin_species() -> Vec<PlantSpecies> {
    vec![
        species("carrot", 0.05, 4),
        species("wheat", 0.06, 4),
        species("corn", 0.035, 5),
        species("tomato", 0.025, 5),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_species_can_mature() {
        for s in builtin_species() {
            assert!(s.grow_rate > 0.0);
            assert!(s.stages >= 2, "{} needs at least seed and ripe stages", s.name);
            let secs_to_mature = s.max_age() / s.grow_rate;
            assert!(
                secs_to_mature > 0.0 && secs_to_mature < 600.0,
                "{} takes {secs_to_mature}s to mature",
                s.name
            );
        }
    }
}
