//! Aggregation tests
//!
//! Covers batch enrichment and the per-product summary:
//! - enrichment output is sorted ascending by expiry for any input order
//! - the current price is the minimum discounted price across batches
//! - empty source lists yield zero-valued summaries, not errors
//! - summarization is idempotent for a fixed evaluation instant

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::{
    current_price, enrich_batches, summarize, DiscountSchedule, ExpiredStockPolicy,
    InventorySnapshot, Order, OrderItem, Product, ProductBatch, SummaryOptions,
};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn evaluation_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap()
}

fn product(id: i64) -> Product {
    Product {
        id,
        name: format!("Product {}", id),
        category: None,
    }
}

fn batch(id: i64, product_id: i64, expiry: NaiveDate, base: &str, qty: i64) -> ProductBatch {
    ProductBatch {
        id,
        product_id,
        manufacture_date: date(2025, 5, 1),
        expiry_date: expiry,
        base_price: dec(base),
        quantity: qty,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Scenario from the product brief: one batch of 10 units two days from
    /// expiry, one batch of 5 units forty days out
    #[test]
    fn test_two_batch_scenario() {
        let batches = vec![
            batch(1, 1, date(2025, 6, 12), "4.00", 10),
            batch(2, 1, date(2025, 7, 20), "3.50", 5),
        ];
        let summary = summarize(
            &product(1),
            &batches,
            &[],
            &[],
            evaluation_instant(),
            &SummaryOptions::default(),
        );

        assert_eq!(summary.sum_batch_quantity, 15);
        // min(0.50 * 4.00, 1.00 * 3.50)
        assert_eq!(summary.current_price, Some(dec("2.00")));
        assert!(summary.has_expiring_soon);
    }

    /// Three orders with quantities 2, 3, and 5 for the same product
    #[test]
    fn test_total_sold_scenario() {
        let item = |quantity| OrderItem {
            product_id: 1,
            quantity,
            price: dec("2.00"),
        };
        let orders: Vec<Order> = [2, 3, 5]
            .iter()
            .enumerate()
            .map(|(i, qty)| Order {
                id: i as i64 + 1,
                date: date(2025, 6, 1),
                total_price: dec("10.00"),
                items: vec![item(*qty)],
            })
            .collect();

        let summary = summarize(
            &product(1),
            &[],
            &[],
            &orders,
            evaluation_instant(),
            &SummaryOptions::default(),
        );
        assert_eq!(summary.total_sold, 10);
    }

    /// Empty batch list means no price, zero quantities, no flag
    #[test]
    fn test_empty_batches_yield_defaults() {
        let summary = summarize(
            &product(1),
            &[],
            &[],
            &[],
            evaluation_instant(),
            &SummaryOptions::default(),
        );
        assert_eq!(summary.current_price, None);
        assert_eq!(summary.sum_batch_quantity, 0);
        assert_eq!(summary.total_inventory, 0);
        assert_eq!(summary.total_sold, 0);
        assert!(!summary.has_expiring_soon);
    }

    /// Snapshot quantity is reported independently of batch sums
    #[test]
    fn test_snapshot_and_batch_sum_diverge() {
        let batches = vec![batch(1, 1, date(2025, 8, 1), "4.00", 50)];
        let snapshots = vec![InventorySnapshot {
            product_id: 1,
            date: date(2025, 6, 9),
            quantity: 37,
        }];
        let summary = summarize(
            &product(1),
            &batches,
            &snapshots,
            &[],
            evaluation_instant(),
            &SummaryOptions::default(),
        );
        // both figures surface; neither is derived from the other
        assert_eq!(summary.total_inventory, 37);
        assert_eq!(summary.sum_batch_quantity, 50);
    }

    /// Order items for other products are ignored
    #[test]
    fn test_orphan_items_ignored() {
        let orders = vec![Order {
            id: 1,
            date: date(2025, 6, 1),
            total_price: dec("10.00"),
            items: vec![
                OrderItem {
                    product_id: 99,
                    quantity: 4,
                    price: dec("2.00"),
                },
                OrderItem {
                    product_id: 1,
                    quantity: 2,
                    price: dec("1.00"),
                },
            ],
        }];
        let summary = summarize(
            &product(1),
            &[],
            &[],
            &orders,
            evaluation_instant(),
            &SummaryOptions::default(),
        );
        assert_eq!(summary.total_sold, 2);
    }

    /// The expiring-soon flag triggers at the 7-day window boundary
    #[test]
    fn test_expiring_soon_boundary() {
        let options = SummaryOptions::default();
        let at_boundary = vec![batch(1, 1, date(2025, 6, 17), "4.00", 5)]; // 7 days
        let outside = vec![batch(1, 1, date(2025, 6, 18), "4.00", 5)]; // 8 days

        let summary = summarize(
            &product(1),
            &at_boundary,
            &[],
            &[],
            evaluation_instant(),
            &options,
        );
        assert!(summary.has_expiring_soon);

        let summary = summarize(
            &product(1),
            &outside,
            &[],
            &[],
            evaluation_instant(),
            &options,
        );
        assert!(!summary.has_expiring_soon);
    }

    /// Excluding expired stock removes it from pricing but not from the
    /// batch-quantity sum
    #[test]
    fn test_exclude_expired_policy() {
        let batches = vec![
            batch(1, 1, date(2025, 6, 1), "4.00", 5), // expired, clearance 1.20
            batch(2, 1, date(2025, 8, 1), "6.00", 3), // full price 6.00
        ];
        let strict = SummaryOptions {
            expired_stock: ExpiredStockPolicy::ExcludeExpired,
            ..SummaryOptions::default()
        };
        let summary = summarize(
            &product(1),
            &batches,
            &[],
            &[],
            evaluation_instant(),
            &strict,
        );
        assert_eq!(summary.current_price, Some(dec("6.00")));
        assert_eq!(summary.sum_batch_quantity, 8);

        let lenient = SummaryOptions::default();
        let summary = summarize(
            &product(1),
            &batches,
            &[],
            &[],
            evaluation_instant(),
            &lenient,
        );
        assert_eq!(summary.current_price, Some(dec("1.20")));
    }

    /// A product whose only batches are expired still prices under the
    /// clearance policy and goes unpriced under the strict one
    #[test]
    fn test_all_batches_expired() {
        let batches = vec![batch(1, 1, date(2025, 6, 1), "4.00", 5)];
        let strict = SummaryOptions {
            expired_stock: ExpiredStockPolicy::ExcludeExpired,
            ..SummaryOptions::default()
        };
        let summary = summarize(
            &product(1),
            &batches,
            &[],
            &[],
            evaluation_instant(),
            &strict,
        );
        assert_eq!(summary.current_price, None);
        // an expired batch still counts as expiring soon
        assert!(summary.has_expiring_soon);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn batch_strategy() -> impl Strategy<Value = ProductBatch> {
        (
            1i64..=1000i64,
            0u32..400u32,
            1i64..=100_000i64,
            0i64..=500i64,
        )
            .prop_map(|(id, expiry_offset, price_cents, qty)| ProductBatch {
                id,
                product_id: 1,
                manufacture_date: date(2025, 1, 1),
                expiry_date: date(2025, 1, 1) + chrono::Duration::days(i64::from(expiry_offset)),
                base_price: Decimal::new(price_cents, 2),
                quantity: qty,
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Enrichment output is sorted ascending by expiry date regardless
        /// of input order
        #[test]
        fn prop_enrichment_sorted(
            batches in prop::collection::vec(batch_strategy(), 0..20)
        ) {
            let enriched = enrich_batches(
                &batches,
                evaluation_instant(),
                &DiscountSchedule::default(),
            );
            prop_assert_eq!(enriched.len(), batches.len());
            for pair in enriched.windows(2) {
                prop_assert!(pair[0].batch.expiry_date <= pair[1].batch.expiry_date);
            }
        }

        /// The current price is the minimum discounted price over all
        /// batches
        #[test]
        fn prop_current_price_is_minimum(
            batches in prop::collection::vec(batch_strategy(), 1..20)
        ) {
            let enriched = enrich_batches(
                &batches,
                evaluation_instant(),
                &DiscountSchedule::default(),
            );
            let price = current_price(&enriched, ExpiredStockPolicy::ClearanceListed)
                .expect("non-empty batch list must price");
            for e in &enriched {
                prop_assert!(price <= e.discounted_price);
            }
            prop_assert!(enriched.iter().any(|e| e.discounted_price == price));
        }

        /// Batch-quantity sums count every batch, expired or not
        #[test]
        fn prop_quantity_sum_unfiltered(
            batches in prop::collection::vec(batch_strategy(), 0..20)
        ) {
            let expected: i64 = batches.iter().map(|b| b.quantity).sum();
            let summary = summarize(
                &product(1),
                &batches,
                &[],
                &[],
                evaluation_instant(),
                &SummaryOptions::default(),
            );
            prop_assert_eq!(summary.sum_batch_quantity, expected);
        }

        /// Summarization has no hidden state: the same inputs and instant
        /// give the same output
        #[test]
        fn prop_summarize_idempotent(
            batches in prop::collection::vec(batch_strategy(), 0..10)
        ) {
            let options = SummaryOptions::default();
            let first = summarize(
                &product(1), &batches, &[], &[], evaluation_instant(), &options,
            );
            let second = summarize(
                &product(1), &batches, &[], &[], evaluation_instant(), &options,
            );
            prop_assert_eq!(first, second);
        }

        /// The strict expired-stock policy never prices below the lenient
        /// one
        #[test]
        fn prop_strict_policy_never_cheaper(
            batches in prop::collection::vec(batch_strategy(), 0..20)
        ) {
            let enriched = enrich_batches(
                &batches,
                evaluation_instant(),
                &DiscountSchedule::default(),
            );
            let lenient = current_price(&enriched, ExpiredStockPolicy::ClearanceListed);
            let strict = current_price(&enriched, ExpiredStockPolicy::ExcludeExpired);
            match (lenient, strict) {
                (Some(l), Some(s)) => prop_assert!(l <= s),
                (None, Some(_)) => prop_assert!(false, "strict priced what lenient could not"),
                _ => {}
            }
        }
    }
}
