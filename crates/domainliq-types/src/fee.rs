//! Platform fee schedule and payment-processor fee model.
//!
//! Monetary amounts are integer minor-currency units (cents). Rates are
//! exact [`Decimal`]s; rate products round half-away-from-zero to whole
//! minor units and are clamped to `[0, amount]`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::constants;

/// One band of the platform fee schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBand {
    /// Inclusive upper bound for this band; `None` = open-ended.
    pub max_amount: Option<i64>,
    /// Fee rate applied to the full amount.
    pub rate: Decimal,
}

/// Tiered platform fee schedule.
///
/// The fee for an order is frozen at creation; swapping the store's schedule
/// later never touches existing orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Bands in ascending `max_amount` order, last one open-ended.
    bands: Vec<FeeBand>,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            bands: vec![
                FeeBand {
                    max_amount: Some(constants::FEE_BAND_FREE_MAX),
                    rate: Decimal::ZERO,
                },
                FeeBand {
                    max_amount: Some(constants::FEE_BAND_SMALL_MAX),
                    rate: Decimal::new(5, 2), // 5%
                },
                FeeBand {
                    max_amount: Some(constants::FEE_BAND_MID_MAX),
                    rate: Decimal::new(3, 2), // 3%
                },
                FeeBand {
                    max_amount: None,
                    rate: Decimal::new(2, 2), // 2%
                },
            ],
        }
    }
}

impl FeeSchedule {
    /// Custom schedule. Bands must be ascending with an open-ended last
    /// band; amounts falling past every band pay no fee.
    #[must_use]
    pub fn new(bands: Vec<FeeBand>) -> Self {
        Self { bands }
    }

    /// Rate of the first band whose bound covers `amount`.
    #[must_use]
    pub fn rate_for(&self, amount: i64) -> Decimal {
        self.bands
            .iter()
            .find(|band| band.max_amount.is_none_or(|max| amount <= max))
            .map_or(Decimal::ZERO, |band| band.rate)
    }

    /// Platform fee in minor units for `amount`.
    #[must_use]
    pub fn platform_fee(&self, amount: i64) -> i64 {
        apply_rate(amount, self.rate_for(amount))
    }
}

/// Payment-processor fee model: `rate * amount + fixed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorFee {
    /// Proportional component.
    pub rate: Decimal,
    /// Fixed component in minor units.
    pub fixed: i64,
}

impl Default for ProcessorFee {
    fn default() -> Self {
        Self {
            rate: Decimal::new(29, 3), // 2.9%
            fixed: constants::DEFAULT_PROCESSOR_FIXED_FEE,
        }
    }
}

impl ProcessorFee {
    /// Processor fee in minor units for `amount`, clamped to `[0, amount]`.
    #[must_use]
    pub fn fee_for(&self, amount: i64) -> i64 {
        (apply_rate(amount, self.rate) + self.fixed).clamp(0, amount.max(0))
    }
}

fn apply_rate(amount: i64, rate: Decimal) -> i64 {
    (Decimal::from(amount) * rate)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(amount)
        .clamp(0, amount.max(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_band_values() {
        let schedule = FeeSchedule::default();
        assert_eq!(schedule.platform_fee(50), 0);
        assert_eq!(schedule.platform_fee(500), 25);
        assert_eq!(schedule.platform_fee(2000), 60);
        assert_eq!(schedule.platform_fee(5000), 100);
    }

    #[test]
    fn band_bounds_are_inclusive() {
        let schedule = FeeSchedule::default();
        assert_eq!(schedule.rate_for(50), Decimal::ZERO);
        assert_eq!(schedule.rate_for(51), Decimal::new(5, 2));
        assert_eq!(schedule.rate_for(500), Decimal::new(5, 2));
        assert_eq!(schedule.rate_for(501), Decimal::new(3, 2));
        assert_eq!(schedule.rate_for(2000), Decimal::new(3, 2));
        assert_eq!(schedule.rate_for(2001), Decimal::new(2, 2));
    }

    #[test]
    fn fee_rounds_half_away_from_zero() {
        let schedule = FeeSchedule::default();
        // 5% of 51 = 2.55 -> 3
        assert_eq!(schedule.platform_fee(51), 3);
        // 3% of 501 = 15.03 -> 15
        assert_eq!(schedule.platform_fee(501), 15);
        // 2% of 2001 = 40.02 -> 40
        assert_eq!(schedule.platform_fee(2001), 40);
    }

    #[test]
    fn mid_band_covers_typical_sale() {
        // 3% of 1000 = 30, the fee used in the end-to-end payout scenario.
        assert_eq!(FeeSchedule::default().platform_fee(1000), 30);
    }

    #[test]
    fn processor_default_fee() {
        let processor = ProcessorFee::default();
        // 2.9% of 1000 = 29, plus 30 fixed.
        assert_eq!(processor.fee_for(1000), 59);
    }

    #[test]
    fn processor_fee_clamped_for_tiny_amounts() {
        let processor = ProcessorFee::default();
        // 2.9% of 10 rounds to 0; 0 + 30 fixed exceeds the amount.
        assert_eq!(processor.fee_for(10), 10);
        assert_eq!(processor.fee_for(0), 0);
    }

    #[test]
    fn custom_schedule() {
        let schedule = FeeSchedule::new(vec![FeeBand {
            max_amount: None,
            rate: Decimal::new(10, 2), // 10%
        }]);
        assert_eq!(schedule.platform_fee(500), 50);
    }

    #[test]
    fn schedule_serde_roundtrip() {
        let schedule = FeeSchedule::default();
        let json = serde_json::to_string(&schedule).unwrap();
        let back: FeeSchedule = serde_json::from_str(&json).unwrap();
        assert_eq!(schedule, back);
    }
}
