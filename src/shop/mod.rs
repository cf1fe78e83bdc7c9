//! Trader transactions, priced through the item catalog.
//!
//! The shop state itself (opened at the trader, blocking the simulation)
//! is driven by the player's interaction; this module only settles the
//! transactions.

use bevy::prelude::*;

use crate::shared::*;

pub struct ShopPlugin;

impl Plugin for ShopPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            handle_transactions
                .run_if(in_state(GameState::Shop).or(in_state(GameState::Playing))),
        );
    }
}

fn handle_transactions(
    mut transactions: EventReader<ShopTransactionEvent>,
    mut inventory: ResMut<Inventory>,
    mut player_state: ResMut<PlayerState>,
    registry: Res<ItemRegistry>,
    mut sfx_events: EventWriter<PlaySfxEvent>,
    mut mission_events: EventWriter<MissionActionEvent>,
) {
    for tx in transactions.read() {
        let Some(item) = registry.get(&tx.item_name) else {
            warn!("transaction for unknown item '{}'", tx.item_name);
            continue;
        };

        if tx.is_purchase {
            let Some(price) = item.buy_price else {
                warn!("'{}' is not for sale", tx.item_name);
                continue;
            };
            let cost = price * tx.quantity;
            if player_state.coins < cost {
                continue;
            }
            player_state.coins -= cost;
            inventory.add(&tx.item_name, tx.quantity);
            mission_events.send(MissionActionEvent {
                action: MissionAction::Buy,
                target: tx.item_name.clone(),
                amount: tx.quantity,
            });
        } else {
            let Some(price) = item.sell_price else {
                continue;
            };
            let sold = inventory.remove(&tx.item_name, tx.quantity);
            if sold == 0 {
                continue;
            }
            player_state.coins += price * sold;
            mission_events.send(MissionActionEvent {
                action: MissionAction::Sell,
                target: tx.item_name.clone(),
                amount: sold,
            });
        }
        sfx_events.send(PlaySfxEvent {
            sfx_id: "trade".to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::items::builtin_items;

    fn registry() -> ItemRegistry {
        let mut registry = ItemRegistry::default();
        for item in builtin_items() {
            registry.items.insert(item.name.clone(), item);
        }
        registry
    }

    fn run_tx(
        tx: ShopTransactionEvent,
        inventory: &mut Inventory,
        player_state: &mut PlayerState,
    ) {
        let mut app = App::new();
        app.add_event::<ShopTransactionEvent>()
            .add_event::<PlaySfxEvent>()
            .add_event::<MissionActionEvent>()
            .insert_resource(std::mem::take(inventory))
            .insert_resource(player_state.clone())
            .insert_resource(registry())
            .add_systems(Update, handle_transactions);
        app.world_mut().send_event(tx);
        app.update();
        *inventory = app.world().resource::<Inventory>().clone();
        *player_state = app.world().resource::<PlayerState>().clone();
    }

    #[test]
    fn buying_moves_coins_into_items() {
        let mut inventory = Inventory::default();
        let mut state = PlayerState {
            coins: 100,
            ..Default::default()
        };
        run_tx(
            ShopTransactionEvent {
                item_name: "carrot seeds".into(),
                quantity: 2,
                is_purchase: true,
            },
            &mut inventory,
            &mut state,
        );
        assert_eq!(inventory.count("carrot seeds"), 2);
        assert_eq!(state.coins, 100 - 2 * 8);
    }

    #[test]
    fn selling_is_capped_at_holdings() {
        let mut inventory = Inventory::default();
        inventory.add("wood", 3);
        let mut state = PlayerState {
            coins: 0,
            ..Default::default()
        };
        run_tx(
            ShopTransactionEvent {
                item_name: "wood".into(),
                quantity: 5,
                is_purchase: false,
            },
            &mut inventory,
            &mut state,
        );
        assert_eq!(inventory.count("wood"), 0);
        assert_eq!(state.coins, 3 * 8);
    }

    #[test]
    fn insufficient_coins_abort_the_purchase() {
        let mut inventory = Inventory::default();
        let mut state = PlayerState {
            coins: 5,
            ..Default::default()
        };
        run_tx(
            ShopTransactionEvent {
                item_name: "tomato seeds".into(),
                quantity: 1,
                is_purchase: true,
            },
            &mut inventory,
            &mut state,
        );
        assert_eq!(inventory.count("tomato seeds"), 0);
        assert_eq!(state.coins, 5);
    }
}
