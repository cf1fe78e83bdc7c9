//! The farm map definition.
//!
//! A character grid stands in for the tile-map resource: each named layer
//! of the original map (Farmable, Collision, Water, Trees, Decoration,
//! Player start, Interaction zones) is derived from one legend character.
//! Rows are listed north to south.

use crate::shared::TreeSpecies;

pub const FARM_MAP: &[&str] = &[
    "########################",
    "#..........##########..#",
    "#..ffffff...#......b#..#",
    "#..ffffff...#.......#..#",
    "#..ffffff...###.#####..#",
    "#..ffffff..............#",
    "#..ffffff.....P....d...#",
    "#..ffffff..............#",
    "#.....d......t.....T...#",
    "#..ffffff..............#",
    "#..ffffff....T.......t.#",
    "#..ffffff.......d......#",
    "#..ffffff..............#",
    "#.....s.........wwwww..#",
    "#...............wwwww..#",
    "########################",
];

/// One parsed map cell of interest. Plain grass produces no entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapFeature {
    Farmable,
    Collision,
    Water,
    Tree(TreeSpecies),
    Decoration,
    PlayerStart,
    Bed,
    Trader,
}

/// A parsed map: features keyed by (col, row) in y-up world cells.
#[derive(Debug, Clone)]
pub struct MapDef {
    pub width: i32,
    pub height: i32,
    pub features: Vec<((i32, i32), MapFeature)>,
}

/// Parse the character grid into per-cell features. Unknown characters are
/// treated as grass.
pub fn parse_map(rows: &[&str]) -> MapDef {
    let height = rows.len() as i32;
    let width = rows.first().map(|r| r.len()).unwrap_or(0) as i32;
    let mut features = Vec::new();

    for (row_idx, row) in rows.iter().enumerate() {
        // Row 0 is the northern edge; world y grows upward.
        let y = height - 1 - row_idx as i32;
        for (col_idx, ch) in row.chars().enumerate() {
            let x = col_idx as i32;
            let feature = match ch {
                'f' => MapFeature::Farmable,
                '#' => MapFeature::Collision,
                'w' => MapFeature::Water,
                'T' => MapFeature::Tree(TreeSpecies::Medium),
                't' => MapFeature::Tree(TreeSpecies::Small),
                'd' => MapFeature::Decoration,
                'P' => MapFeature::PlayerStart,
                'b' => MapFeature::Bed,
                's' => MapFeature::Trader,
                _ => continue,
            };
            features.push(((x, y), feature));
        }
    }

    MapDef {
        width,
        height,
        features,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn farm_map_is_rectangular() {
        let width = FARM_MAP[0].len();
        for row in FARM_MAP {
            assert_eq!(row.len(), width);
        }
    }

    #[test]
    fn farm_map_has_required_layers() {
        let map = parse_map(FARM_MAP);
        let count = |f: fn(&MapFeature) -> bool| map.features.iter().filter(|(_, m)| f(m)).count();
        assert_eq!(count(|m| matches!(m, MapFeature::PlayerStart)), 1);
        assert_eq!(count(|m| matches!(m, MapFeature::Bed)), 1);
        assert_eq!(count(|m| matches!(m, MapFeature::Trader)), 1);
        assert!(count(|m| matches!(m, MapFeature::Farmable)) > 20);
        assert!(count(|m| matches!(m, MapFeature::Tree(_))) >= 4);
        assert!(count(|m| matches!(m, MapFeature::Water)) > 0);
    }

    #[test]
    fn north_row_maps_to_high_y() {
        let map = parse_map(&["P.", ".."]);
        assert_eq!(map.features, vec![((0, 1), MapFeature::PlayerStart)]);
    }
}
