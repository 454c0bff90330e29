//! Batch-level dynamic pricing and expiry classification
//!
//! Prices decay in tiers as a batch approaches its expiry date. The discount
//! schedule, the urgency classifier, and the aggregator's expiring-soon
//! window use three separate threshold tables on purpose: pricing decays
//! faster than the displayed urgency escalates. Keep them independently
//! configurable.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::ProductBatch;

/// Number of days until a batch expires, relative to `now`
///
/// Ceiling of the span between midnight UTC of the expiry date and `now`.
/// Negative once the batch has expired; 0 on the expiry day itself.
pub fn days_until(expiry: NaiveDate, now: DateTime<Utc>) -> i64 {
    let expiry_midnight = expiry.and_time(NaiveTime::MIN).and_utc();
    let secs = (expiry_midnight - now).num_seconds();
    if secs > 0 {
        (secs + 86_399) / 86_400
    } else {
        // integer division already truncates toward zero, which is the
        // ceiling for non-positive spans
        secs / 86_400
    }
}

/// One tier of the discount schedule: applies when
/// `days_to_expiry >= min_days`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscountTier {
    pub min_days: i64,
    pub multiplier: Decimal,
}

impl DiscountTier {
    pub fn new(min_days: i64, multiplier: Decimal) -> Self {
        Self {
            min_days,
            multiplier,
        }
    }
}

/// Tiered time-decay discount schedule
///
/// Tiers are kept sorted descending by `min_days`; a lookup takes the first
/// tier the day count satisfies and falls through to the clearance
/// multiplier for everything at or past expiry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscountSchedule {
    tiers: Vec<DiscountTier>,
    clearance_multiplier: Decimal,
}

impl Default for DiscountSchedule {
    fn default() -> Self {
        Self::new(
            vec![
                DiscountTier::new(30, Decimal::new(100, 2)),
                DiscountTier::new(15, Decimal::new(90, 2)),
                DiscountTier::new(8, Decimal::new(80, 2)),
                DiscountTier::new(4, Decimal::new(70, 2)),
                DiscountTier::new(1, Decimal::new(50, 2)),
            ],
            Decimal::new(30, 2),
        )
    }
}

impl DiscountSchedule {
    pub fn new(mut tiers: Vec<DiscountTier>, clearance_multiplier: Decimal) -> Self {
        tiers.sort_by(|a, b| b.min_days.cmp(&a.min_days));
        Self {
            tiers,
            clearance_multiplier,
        }
    }

    /// Multiplier applied to the base price at the given day count
    pub fn multiplier_for(&self, days_to_expiry: i64) -> Decimal {
        self.tiers
            .iter()
            .find(|tier| days_to_expiry >= tier.min_days)
            .map(|tier| tier.multiplier)
            .unwrap_or(self.clearance_multiplier)
    }

    /// Discounted price for a base price at the given day count
    ///
    /// No rounding is performed here; display layers round to 2 decimals.
    /// Expired batches still get a price (the clearance multiplier) so that
    /// clearance stock stays visible; whether it remains orderable is the
    /// caller's policy, not this schedule's.
    pub fn price_for(&self, base_price: Decimal, days_to_expiry: i64) -> Decimal {
        base_price * self.multiplier_for(days_to_expiry)
    }
}

/// Discounted price under the default schedule
pub fn discounted_price(base_price: Decimal, days_to_expiry: i64) -> Decimal {
    DiscountSchedule::default().price_for(base_price, days_to_expiry)
}

/// Display urgency tier for a batch's remaining shelf life
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryStatus {
    Expired,
    Critical,
    Urgent,
    Soon,
    Good,
}

impl ExpiryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ExpiryStatus::Expired => "Expired",
            ExpiryStatus::Critical => "Critical",
            ExpiryStatus::Urgent => "Urgent",
            ExpiryStatus::Soon => "Soon",
            ExpiryStatus::Good => "Good",
        }
    }
}

impl std::fmt::Display for ExpiryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Day boundaries for the urgency classifier
///
/// Upper bounds are inclusive: 0..=critical_max is Critical,
/// critical_max+1..=urgent_max is Urgent, urgent_max+1..=soon_max is Soon.
/// Anything below 0 is Expired, anything above soon_max is Good.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpiryThresholds {
    pub critical_max: i64,
    pub urgent_max: i64,
    pub soon_max: i64,
}

impl Default for ExpiryThresholds {
    fn default() -> Self {
        Self {
            critical_max: 3,
            urgent_max: 7,
            soon_max: 14,
        }
    }
}

impl ExpiryThresholds {
    pub fn classify(&self, days_until_expiry: i64) -> ExpiryStatus {
        if days_until_expiry < 0 {
            ExpiryStatus::Expired
        } else if days_until_expiry <= self.critical_max {
            ExpiryStatus::Critical
        } else if days_until_expiry <= self.urgent_max {
            ExpiryStatus::Urgent
        } else if days_until_expiry <= self.soon_max {
            ExpiryStatus::Soon
        } else {
            ExpiryStatus::Good
        }
    }
}

/// Classify under the default thresholds
pub fn classify_expiry(days_until_expiry: i64) -> ExpiryStatus {
    ExpiryThresholds::default().classify(days_until_expiry)
}

/// Whether already-expired batches stay purchasable at clearance price
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExpiredStockPolicy {
    /// Expired batches remain listed and orderable at the clearance price
    #[default]
    ClearanceListed,
    /// Expired batches are skipped when pricing and rejected at checkout
    ExcludeExpired,
}

/// A batch annotated with its derived pricing fields
///
/// Ephemeral: recomputed on every evaluation, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichedBatch {
    pub batch: ProductBatch,
    pub days_to_expiry: i64,
    pub discounted_price: Decimal,
}

/// Annotate a product's batches with days-to-expiry and discounted price
///
/// Output is sorted ascending by expiry date (nearest expiry first). This
/// ordering is part of the contract; consumers must not re-sort.
pub fn enrich_batches(
    batches: &[ProductBatch],
    now: DateTime<Utc>,
    schedule: &DiscountSchedule,
) -> Vec<EnrichedBatch> {
    let mut enriched: Vec<EnrichedBatch> = batches
        .iter()
        .map(|batch| {
            let days_to_expiry = days_until(batch.expiry_date, now);
            EnrichedBatch {
                days_to_expiry,
                discounted_price: schedule.price_for(batch.base_price, days_to_expiry),
                batch: batch.clone(),
            }
        })
        .collect();
    enriched.sort_by(|a, b| a.batch.expiry_date.cmp(&b.batch.expiry_date));
    enriched
}

/// The storefront price for a product: the lowest discounted price across
/// its batches, or `None` when there are no (eligible) batches
pub fn current_price(enriched: &[EnrichedBatch], policy: ExpiredStockPolicy) -> Option<Decimal> {
    enriched
        .iter()
        .filter(|e| match policy {
            ExpiredStockPolicy::ClearanceListed => true,
            ExpiredStockPolicy::ExcludeExpired => e.days_to_expiry >= 0,
        })
        .map(|e| e.discounted_price)
        .min()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_schedule_tiers() {
        let schedule = DiscountSchedule::default();
        assert_eq!(schedule.price_for(dec("100"), 45), dec("100"));
        assert_eq!(schedule.price_for(dec("100"), 30), dec("100"));
        assert_eq!(schedule.price_for(dec("100"), 29), dec("90.00"));
        assert_eq!(schedule.price_for(dec("100"), 15), dec("90.00"));
        assert_eq!(schedule.price_for(dec("100"), 14), dec("80.00"));
        assert_eq!(schedule.price_for(dec("100"), 10), dec("80.00"));
        assert_eq!(schedule.price_for(dec("100"), 8), dec("80.00"));
        assert_eq!(schedule.price_for(dec("100"), 7), dec("70.00"));
        assert_eq!(schedule.price_for(dec("100"), 4), dec("70.00"));
        assert_eq!(schedule.price_for(dec("100"), 3), dec("50.00"));
        assert_eq!(schedule.price_for(dec("100"), 1), dec("50.00"));
        assert_eq!(schedule.price_for(dec("100"), 0), dec("30.00"));
        assert_eq!(schedule.price_for(dec("50"), -1), dec("15.00"));
    }

    #[test]
    fn test_schedule_unsorted_tiers_are_sorted() {
        let schedule = DiscountSchedule::new(
            vec![
                DiscountTier::new(1, dec("0.50")),
                DiscountTier::new(30, dec("1.00")),
                DiscountTier::new(8, dec("0.80")),
            ],
            dec("0.30"),
        );
        assert_eq!(schedule.price_for(dec("100"), 10), dec("80.00"));
        assert_eq!(schedule.price_for(dec("100"), 40), dec("100.00"));
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify_expiry(-10), ExpiryStatus::Expired);
        assert_eq!(classify_expiry(-1), ExpiryStatus::Expired);
        assert_eq!(classify_expiry(0), ExpiryStatus::Critical);
        assert_eq!(classify_expiry(3), ExpiryStatus::Critical);
        assert_eq!(classify_expiry(4), ExpiryStatus::Urgent);
        assert_eq!(classify_expiry(7), ExpiryStatus::Urgent);
        assert_eq!(classify_expiry(8), ExpiryStatus::Soon);
        assert_eq!(classify_expiry(14), ExpiryStatus::Soon);
        assert_eq!(classify_expiry(15), ExpiryStatus::Good);
        assert_eq!(classify_expiry(365), ExpiryStatus::Good);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(ExpiryStatus::Expired.label(), "Expired");
        assert_eq!(ExpiryStatus::Critical.label(), "Critical");
        assert_eq!(ExpiryStatus::Urgent.label(), "Urgent");
        assert_eq!(ExpiryStatus::Soon.label(), "Soon");
        assert_eq!(ExpiryStatus::Good.label(), "Good");
    }

    #[test]
    fn test_days_until_rounds_up() {
        // 14 hours from now at 10:00 -> expiry tomorrow counts as 1 day
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 10, 0, 0).unwrap();
        assert_eq!(days_until(date(2025, 6, 11), now), 1);
        // expiry day itself is 0, not -1
        assert_eq!(days_until(date(2025, 6, 10), now), 0);
        assert_eq!(days_until(date(2025, 6, 9), now), -1);
        assert_eq!(days_until(date(2025, 6, 20), now), 10);
    }

    #[test]
    fn test_days_until_at_midnight() {
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 0, 0, 0).unwrap();
        assert_eq!(days_until(date(2025, 6, 10), now), 0);
        assert_eq!(days_until(date(2025, 6, 11), now), 1);
        assert_eq!(days_until(date(2025, 6, 9), now), -1);
    }

    #[test]
    fn test_enrich_sorts_by_expiry() {
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
        let batches = vec![
            ProductBatch {
                id: 1,
                product_id: 7,
                manufacture_date: date(2025, 5, 1),
                expiry_date: date(2025, 7, 20),
                base_price: dec("10.00"),
                quantity: 5,
            },
            ProductBatch {
                id: 2,
                product_id: 7,
                manufacture_date: date(2025, 6, 1),
                expiry_date: date(2025, 6, 12),
                base_price: dec("10.00"),
                quantity: 10,
            },
        ];
        let enriched = enrich_batches(&batches, now, &DiscountSchedule::default());
        assert_eq!(enriched[0].batch.id, 2);
        assert_eq!(enriched[0].days_to_expiry, 2);
        assert_eq!(enriched[0].discounted_price, dec("5.0000"));
        assert_eq!(enriched[1].batch.id, 1);
        assert_eq!(enriched[1].discounted_price, dec("10.0000"));
    }

    #[test]
    fn test_current_price_policies() {
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
        let batches = vec![
            ProductBatch {
                id: 1,
                product_id: 7,
                manufacture_date: date(2025, 5, 1),
                expiry_date: date(2025, 6, 1), // expired, clearance 3.00
                base_price: dec("10.00"),
                quantity: 5,
            },
            ProductBatch {
                id: 2,
                product_id: 7,
                manufacture_date: date(2025, 6, 1),
                expiry_date: date(2025, 8, 1), // full price 10.00
                base_price: dec("10.00"),
                quantity: 10,
            },
        ];
        let enriched = enrich_batches(&batches, now, &DiscountSchedule::default());
        assert_eq!(
            current_price(&enriched, ExpiredStockPolicy::ClearanceListed),
            Some(dec("3.0000"))
        );
        assert_eq!(
            current_price(&enriched, ExpiredStockPolicy::ExcludeExpired),
            Some(dec("10.0000"))
        );
        assert_eq!(
            current_price(&[], ExpiredStockPolicy::ClearanceListed),
            None
        );
    }
}
