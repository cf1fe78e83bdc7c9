//! Built-in item catalog: the fallback when the store's catalog records
//! are missing or unreadable.

use crate::shared::ItemDef;

fn item(
    name: &str,
    description: &str,
    buy_price: Option<u32>,
    sell_price: Option<u32>,
) -> ItemDef {
    ItemDef {
        name: name.to_string(),
        description: description.to_string(),
        buy_price,
        sell_price,
    }
}

pub fn builtin_items() -> Vec<ItemDef> {
    vec![
        // Seeds
        item("carrot seeds", "Plant carrots", Some(8), Some(4)),
        item("corn seeds", "Plant corn", Some(10), Some(5)),
        item("tomato seeds", "Plant tomatoes", Some(12), Some(6)),
        item("wheat seeds", "Plant wheat", Some(6), Some(3)),
        // Crops
        item("carrot", "A crunchy carrot", None, Some(18)),
        item("corn", "An ear of corn", None, Some(22)),
        item("tomato", "A ripe tomato", None, Some(26)),
        item("wheat", "A bundle of wheat", None, Some(14)),
        // Forage & drops
        item("apple", "Shaken fresh from a tree", None, Some(10)),
        item("wood", "Building material", None, Some(8)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_seed_has_a_crop() {
        let items = builtin_items();
        for seed in items.iter().filter(|i| i.name.ends_with(" seeds")) {
            let crop = seed.name.trim_end_matches(" seeds");
            assert!(
                items.iter().any(|i| i.name == crop),
                "seed '{}' has no matching crop item",
                seed.name
            );
        }
    }

    #[test]
    fn seeds_are_buyable_crops_are_not() {
        for i in builtin_items() {
            if i.name.ends_with(" seeds") {
                assert!(i.buy_price.is_some(), "{} should be buyable", i.name);
            } else {
                assert!(i.buy_price.is_none(), "{} should not be buyable", i.name);
            }
            assert!(i.sell_price.is_some());
        }
    }
}
