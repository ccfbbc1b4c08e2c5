//! Trading against a market with arbitrary ships, goods and amounts.
//!
//! Every purchase is all-or-nothing, and selling back what was just bought
//! at an unchanged price restores credits and stock exactly.

use galaxy_core::commodity::CommodityTable;
use galaxy_core::config::GalaxyConfig;
use galaxy_core::economy::Market;
use galaxy_core::entity::Role;
use galaxy_core::trade;
use galaxy_test_utils::determinism::strategies;
use galaxy_test_utils::fixtures::{npc, ship};
use galaxy_test_utils::proptest::prelude::*;

const STOCK: u32 = 60;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_buy_is_all_or_nothing_and_sells_back(
        class in strategies::arb_ship_class(),
        commodity in strategies::arb_commodity(),
        amount in strategies::arb_amount(),
    ) {
        let config = GalaxyConfig::default();
        let mut trader = npc(&config, 0, 0, Role::Trader);
        trader.swap_ship(ship(class));
        let mut market = Market::new(CommodityTable::filled(STOCK), config.economy.base_prices);
        let credits = trader.ledger().credits();
        let price = market.price(commodity);

        match trade::buy(&mut trader, &mut market, commodity, amount) {
            Ok(paid) => {
                prop_assert_eq!(paid, amount * price);
                prop_assert_eq!(trader.ledger().cargo(commodity), amount);
                prop_assert_eq!(market.stock(commodity), STOCK - amount);

                let earned = trade::sell(&mut trader, &mut market, commodity, amount)
                    .expect("sell what was bought");
                prop_assert_eq!(earned, paid);
                prop_assert_eq!(trader.ledger().credits(), credits);
                prop_assert_eq!(market.stock(commodity), STOCK);
                prop_assert_eq!(trader.ledger().total_cargo(), 0);
            }
            Err(_) => {
                prop_assert!(
                    amount * price > credits || amount > trader.ship().cargo_capacity()
                );
                prop_assert_eq!(trader.ledger().credits(), credits);
                prop_assert_eq!(trader.ledger().total_cargo(), 0);
                prop_assert_eq!(market.stock(commodity), STOCK);
            }
        }
    }
}
