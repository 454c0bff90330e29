//! Vendor dashboard analytics
//!
//! Secondary aggregations for the overview widgets: inventory depth by
//! category, sold vs spoilage, the trailing revenue trend, and imminent
//! expiry alerts.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use shared::{days_until, latest_snapshot};

use crate::services::refresh::Snapshot;

/// Days a batch may sit from expiry before it stops appearing in the
/// imminent-expiry alert list
const EXPIRY_ALERT_WINDOW_DAYS: i64 = 3;

/// Trailing window of the revenue trend
const REVENUE_TREND_DAYS: i64 = 7;

/// On-hand inventory total for one category
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CategoryInventory {
    pub category: String,
    pub total_quantity: i64,
}

/// Lifetime sold units against units sitting in expired batches
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SoldVsSpoilage {
    pub sold_units: i64,
    pub spoiled_units: i64,
}

/// Revenue total for one day
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub revenue: Decimal,
}

/// A batch about to expire, surfaced on the overview page
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExpiryAlert {
    pub batch_id: i64,
    pub product_name: String,
    pub days_to_expiry: i64,
    pub expiry_date: NaiveDate,
    pub quantity: i64,
}

/// All overview widgets in one payload
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardAnalytics {
    pub inventory_by_category: Vec<CategoryInventory>,
    pub sold_vs_spoilage: SoldVsSpoilage,
    pub revenue_trend: Vec<DailyRevenue>,
    pub expiry_alerts: Vec<ExpiryAlert>,
}

/// Latest-snapshot inventory totals bucketed by product category
pub fn inventory_by_category(snapshot: &Snapshot) -> Vec<CategoryInventory> {
    let mut totals: BTreeMap<String, i64> = BTreeMap::new();
    for product in &snapshot.lists.products {
        if let Some(latest) = latest_snapshot(&snapshot.lists.inventories, product.id) {
            *totals
                .entry(product.category_label().to_string())
                .or_insert(0) += latest.quantity;
        }
    }
    totals
        .into_iter()
        .map(|(category, total_quantity)| CategoryInventory {
            category,
            total_quantity,
        })
        .collect()
}

/// Units sold across all orders vs units stuck in expired batches
pub fn sold_vs_spoilage(snapshot: &Snapshot, now: DateTime<Utc>) -> SoldVsSpoilage {
    let sold_units = snapshot
        .lists
        .orders
        .iter()
        .map(|order| order.total_units())
        .sum();
    let spoiled_units = snapshot
        .lists
        .batches
        .iter()
        .filter(|batch| days_until(batch.expiry_date, now) <= 0)
        .map(|batch| batch.quantity)
        .sum();
    SoldVsSpoilage {
        sold_units,
        spoiled_units,
    }
}

/// Revenue per day for the trailing week, oldest day first
pub fn revenue_trend(snapshot: &Snapshot, now: DateTime<Utc>) -> Vec<DailyRevenue> {
    let today = now.date_naive();
    (0..REVENUE_TREND_DAYS)
        .map(|offset| {
            let date = today - Duration::days(REVENUE_TREND_DAYS - 1 - offset);
            let revenue = snapshot
                .lists
                .orders
                .iter()
                .filter(|order| order.date == date)
                .map(|order| order.total_price)
                .sum();
            DailyRevenue { date, revenue }
        })
        .collect()
}

/// Batches expiring within the alert window, soonest first
pub fn expiry_alerts(snapshot: &Snapshot, now: DateTime<Utc>) -> Vec<ExpiryAlert> {
    let mut alerts: Vec<ExpiryAlert> = snapshot
        .lists
        .batches
        .iter()
        .filter_map(|batch| {
            let days_to_expiry = days_until(batch.expiry_date, now);
            if !(0..=EXPIRY_ALERT_WINDOW_DAYS).contains(&days_to_expiry) {
                return None;
            }
            let product_name = snapshot
                .lists
                .products
                .iter()
                .find(|product| product.id == batch.product_id)
                .map(|product| product.name.clone())
                .unwrap_or_else(|| format!("Batch #{}", batch.id));
            Some(ExpiryAlert {
                batch_id: batch.id,
                product_name,
                days_to_expiry,
                expiry_date: batch.expiry_date,
                quantity: batch.quantity,
            })
        })
        .collect();
    alerts.sort_by_key(|alert| (alert.days_to_expiry, alert.batch_id));
    alerts
}

/// Compute every overview widget from one snapshot
pub fn analytics(snapshot: &Snapshot, now: DateTime<Utc>) -> DashboardAnalytics {
    DashboardAnalytics {
        inventory_by_category: inventory_by_category(snapshot),
        sold_vs_spoilage: sold_vs_spoilage(snapshot, now),
        revenue_trend: revenue_trend(snapshot, now),
        expiry_alerts: expiry_alerts(snapshot, now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::refresh::SourceLists;
    use chrono::TimeZone;
    use shared::{InventorySnapshot, Order, OrderItem, Product, ProductBatch};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap()
    }

    fn snapshot() -> Snapshot {
        Snapshot {
            lists: SourceLists::new(
                vec![
                    Product {
                        id: 1,
                        name: "Strawberries".to_string(),
                        category: Some("Fruit".to_string()),
                    },
                    Product {
                        id: 2,
                        name: "Milk".to_string(),
                        category: None,
                    },
                ],
                vec![
                    ProductBatch {
                        id: 10,
                        product_id: 1,
                        manufacture_date: date(2025, 5, 1),
                        expiry_date: date(2025, 6, 12), // 2 days out
                        base_price: dec("4.00"),
                        quantity: 10,
                    },
                    ProductBatch {
                        id: 11,
                        product_id: 2,
                        manufacture_date: date(2025, 5, 1),
                        expiry_date: date(2025, 6, 1), // expired
                        base_price: dec("2.00"),
                        quantity: 6,
                    },
                ],
                vec![
                    InventorySnapshot {
                        product_id: 1,
                        date: date(2025, 6, 9),
                        quantity: 25,
                    },
                    InventorySnapshot {
                        product_id: 2,
                        date: date(2025, 6, 9),
                        quantity: 8,
                    },
                ],
                vec![
                    Order {
                        id: 1,
                        date: date(2025, 6, 9),
                        total_price: dec("12.00"),
                        items: vec![OrderItem {
                            product_id: 1,
                            quantity: 3,
                            price: dec("4.00"),
                        }],
                    },
                    Order {
                        id: 2,
                        date: date(2025, 6, 1), // outside the trailing week
                        total_price: dec("99.00"),
                        items: vec![OrderItem {
                            product_id: 2,
                            quantity: 2,
                            price: dec("2.00"),
                        }],
                    },
                ],
            ),
            fetched_at: now(),
        }
    }

    #[test]
    fn test_inventory_by_category() {
        let buckets = inventory_by_category(&snapshot());
        assert_eq!(
            buckets,
            vec![
                CategoryInventory {
                    category: "Fruit".to_string(),
                    total_quantity: 25,
                },
                CategoryInventory {
                    category: "Uncategorized".to_string(),
                    total_quantity: 8,
                },
            ]
        );
    }

    #[test]
    fn test_sold_vs_spoilage() {
        let totals = sold_vs_spoilage(&snapshot(), now());
        assert_eq!(totals.sold_units, 5);
        assert_eq!(totals.spoiled_units, 6);
    }

    #[test]
    fn test_revenue_trend_window() {
        let trend = revenue_trend(&snapshot(), now());
        assert_eq!(trend.len(), 7);
        assert_eq!(trend[0].date, date(2025, 6, 4));
        assert_eq!(trend[6].date, date(2025, 6, 10));
        // order on 6/9 lands in the second-to-last slot
        assert_eq!(trend[5].revenue, dec("12.00"));
        // the 6/1 order is outside the window
        let total: Decimal = trend.iter().map(|day| day.revenue).sum();
        assert_eq!(total, dec("12.00"));
    }

    #[test]
    fn test_expiry_alerts_window() {
        let alerts = expiry_alerts(&snapshot(), now());
        // the expired batch is excluded; only the 2-days-out batch shows
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].batch_id, 10);
        assert_eq!(alerts[0].product_name, "Strawberries");
        assert_eq!(alerts[0].days_to_expiry, 2);
    }
}
