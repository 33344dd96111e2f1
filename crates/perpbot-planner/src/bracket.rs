//! Bracket plan construction.

use perpbot_core::error::PlanError;
use perpbot_core::types::{OrderRequest, Side};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// ATR-as-percent-of-price partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolatilityBucket {
    Low,
    Mid,
    High,
}

/// Stop-loss / take-profit multiplier pairs per volatility bucket, with
/// the two breakpoints that separate the buckets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolatilityTiers {
    /// Upper bound of the low bucket, ATR as percent of price
    pub low_max_pct: Decimal,
    /// Upper bound of the mid bucket, ATR as percent of price
    pub mid_max_pct: Decimal,
    /// (sl multiplier, tp multiplier) for the low bucket
    pub low: (Decimal, Decimal),
    /// (sl multiplier, tp multiplier) for the mid bucket
    pub mid: (Decimal, Decimal),
    /// (sl multiplier, tp multiplier) for the high bucket
    pub high: (Decimal, Decimal),
}

impl Default for VolatilityTiers {
    fn default() -> Self {
        Self {
            low_max_pct: dec!(0.5),
            mid_max_pct: dec!(1.5),
            low: (dec!(1.0), dec!(2.0)),
            mid: (dec!(1.5), dec!(2.5)),
            high: (dec!(2.0), dec!(3.0)),
        }
    }
}

impl VolatilityTiers {
    /// Classify an ATR-as-percent-of-price value into a bucket.
    pub fn classify(&self, atr_pct: Decimal) -> VolatilityBucket {
        if atr_pct <= self.low_max_pct {
            VolatilityBucket::Low
        } else if atr_pct <= self.mid_max_pct {
            VolatilityBucket::Mid
        } else {
            VolatilityBucket::High
        }
    }

    /// The (sl, tp) multiplier pair for a bucket.
    pub fn multipliers(&self, bucket: VolatilityBucket) -> (Decimal, Decimal) {
        match bucket {
            VolatilityBucket::Low => self.low,
            VolatilityBucket::Mid => self.mid,
            VolatilityBucket::High => self.high,
        }
    }

    /// Validate breakpoint ordering and multiplier signs.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.low_max_pct >= self.mid_max_pct {
            return Err(PlanError::InvalidParameter(
                "low_max_pct must be below mid_max_pct".into(),
            ));
        }
        for (sl, tp) in [self.low, self.mid, self.high] {
            if sl <= Decimal::ZERO || tp <= Decimal::ZERO {
                return Err(PlanError::InvalidParameter(
                    "bucket multipliers must be positive".into(),
                ));
            }
        }
        Ok(())
    }
}

/// How the take-profit and stop-loss distances are sized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum SizingMode {
    /// Fixed percentages of the entry price
    FixedPercent {
        tp_percent: Decimal,
        sl_percent: Decimal,
    },
    /// ATR multiples selected by volatility bucket
    VolatilityTiered { tiers: VolatilityTiers },
}

impl Default for SizingMode {
    fn default() -> Self {
        SizingMode::VolatilityTiered {
            tiers: VolatilityTiers::default(),
        }
    }
}

impl SizingMode {
    /// Validate the sizing parameters.
    pub fn validate(&self) -> Result<(), PlanError> {
        match self {
            SizingMode::FixedPercent {
                tp_percent,
                sl_percent,
            } => {
                if *tp_percent <= Decimal::ZERO || *sl_percent <= Decimal::ZERO {
                    return Err(PlanError::InvalidParameter(
                        "tp_percent and sl_percent must be positive".into(),
                    ));
                }
                Ok(())
            }
            SizingMode::VolatilityTiered { tiers } => tiers.validate(),
        }
    }
}

/// A fully priced three-leg bracket, ready for submission.
#[derive(Debug, Clone)]
pub struct BracketPlan {
    /// Market entry leg
    pub entry: OrderRequest,
    /// Reduce-only take-profit leg
    pub take_profit: OrderRequest,
    /// Reduce-only stop-loss leg
    pub stop_loss: OrderRequest,
    /// Take-profit trigger price
    pub take_profit_trigger: Decimal,
    /// Stop-loss trigger price
    pub stop_loss_trigger: Decimal,
    /// Bucket chosen for volatility-tiered sizing
    pub bucket: Option<VolatilityBucket>,
}

/// Bracket order planner.
///
/// Pure price arithmetic; never talks to the venue.
#[derive(Debug, Clone)]
pub struct BracketOrderPlanner {
    mode: SizingMode,
    price_decimals: u32,
}

impl BracketOrderPlanner {
    /// Create a planner for one sizing mode and price precision.
    pub fn new(mode: SizingMode, price_decimals: u32) -> Result<Self, PlanError> {
        mode.validate()?;
        Ok(Self {
            mode,
            price_decimals,
        })
    }

    /// Plan a bracket around a market entry.
    ///
    /// `atr` is required for volatility-tiered sizing and ignored for
    /// fixed-percent sizing.
    pub fn plan(
        &self,
        symbol: &str,
        side: Side,
        entry_price: Decimal,
        quantity: Decimal,
        atr: Option<Decimal>,
    ) -> Result<BracketPlan, PlanError> {
        if entry_price <= Decimal::ZERO {
            return Err(PlanError::InvalidParameter(
                "entry price must be positive".into(),
            ));
        }
        if quantity <= Decimal::ZERO {
            return Err(PlanError::InvalidParameter(
                "quantity must be positive".into(),
            ));
        }

        let (tp_offset, sl_offset, bucket) = match &self.mode {
            SizingMode::FixedPercent {
                tp_percent,
                sl_percent,
            } => (
                entry_price * *tp_percent / dec!(100),
                entry_price * *sl_percent / dec!(100),
                None,
            ),
            SizingMode::VolatilityTiered { tiers } => {
                let atr = atr.ok_or_else(|| {
                    PlanError::InvalidParameter(
                        "volatility-tiered sizing requires an ATR value".into(),
                    )
                })?;
                if atr <= Decimal::ZERO {
                    return Err(PlanError::InvalidParameter(
                        "ATR must be positive for tiered sizing".into(),
                    ));
                }
                let atr_pct = atr / entry_price * dec!(100);
                let bucket = tiers.classify(atr_pct);
                let (sl_mult, tp_mult) = tiers.multipliers(bucket);
                (atr * tp_mult, atr * sl_mult, Some(bucket))
            }
        };

        let (tp_raw, sl_raw) = match side {
            Side::Buy => (entry_price + tp_offset, entry_price - sl_offset),
            Side::Sell => (entry_price - tp_offset, entry_price + sl_offset),
        };
        let take_profit_trigger = tp_raw.round_dp(self.price_decimals);
        let stop_loss_trigger = sl_raw.round_dp(self.price_decimals);

        // Ordering invariant: long is tp > entry > sl, short the inverse.
        // Rounding can collapse a degenerate bracket onto the entry;
        // refuse to emit one.
        let ordered = match side {
            Side::Buy => take_profit_trigger > entry_price && entry_price > stop_loss_trigger,
            Side::Sell => take_profit_trigger < entry_price && entry_price < stop_loss_trigger,
        };
        if !ordered {
            return Err(PlanError::InvariantViolated {
                side,
                entry: entry_price,
                take_profit: take_profit_trigger,
                stop_loss: stop_loss_trigger,
            });
        }

        let position_side = side.position_side();
        Ok(BracketPlan {
            entry: OrderRequest::market(symbol, side, quantity),
            take_profit: OrderRequest::take_profit(
                symbol,
                position_side,
                quantity,
                take_profit_trigger,
            ),
            stop_loss: OrderRequest::stop_loss(symbol, position_side, quantity, stop_loss_trigger),
            take_profit_trigger,
            stop_loss_trigger,
            bucket,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perpbot_core::types::OrderType;

    fn tiered_planner() -> BracketOrderPlanner {
        BracketOrderPlanner::new(SizingMode::default(), 2).unwrap()
    }

    #[test]
    fn test_fixed_percent_long() {
        let planner = BracketOrderPlanner::new(
            SizingMode::FixedPercent {
                tp_percent: dec!(2),
                sl_percent: dec!(1),
            },
            2,
        )
        .unwrap();

        let plan = planner
            .plan("ETH-USDT", Side::Buy, dec!(2000), dec!(0.09), None)
            .unwrap();

        assert_eq!(plan.take_profit_trigger, dec!(2040.00));
        assert_eq!(plan.stop_loss_trigger, dec!(1980.00));
        assert!(plan.bucket.is_none());
    }

    #[test]
    fn test_tiered_low_bucket_scenario() {
        // ATR of 2.71 on a 112 entry is ~2.4% of price, which is the
        // high bucket; use a calmer ATR for the low bucket case
        let planner = tiered_planner();
        let plan = planner
            .plan(
                "ETH-USDT",
                Side::Buy,
                dec!(112),
                dec!(1),
                Some(dec!(0.5)),
            )
            .unwrap();

        // 0.5 / 112 = 0.45% of price: low bucket, sl x1.0 / tp x2.0
        assert_eq!(plan.bucket, Some(VolatilityBucket::Low));
        assert_eq!(plan.take_profit_trigger, dec!(113.00));
        assert_eq!(plan.stop_loss_trigger, dec!(111.50));
    }

    #[test]
    fn test_bucket_classification() {
        let tiers = VolatilityTiers::default();
        assert_eq!(tiers.classify(dec!(0.3)), VolatilityBucket::Low);
        assert_eq!(tiers.classify(dec!(0.5)), VolatilityBucket::Low);
        assert_eq!(tiers.classify(dec!(1.0)), VolatilityBucket::Mid);
        assert_eq!(tiers.classify(dec!(2.0)), VolatilityBucket::High);
    }

    #[test]
    fn test_ordering_invariant_both_sides_all_buckets() {
        let planner = tiered_planner();
        let entry = dec!(250.00);

        // One ATR per bucket
        for atr in [dec!(0.8), dec!(2.5), dec!(6.0)] {
            for side in [Side::Buy, Side::Sell] {
                let plan = planner
                    .plan("ETH-USDT", side, entry, dec!(1), Some(atr))
                    .unwrap();
                match side {
                    Side::Buy => {
                        assert!(plan.take_profit_trigger > entry);
                        assert!(entry > plan.stop_loss_trigger);
                    }
                    Side::Sell => {
                        assert!(plan.take_profit_trigger < entry);
                        assert!(entry < plan.stop_loss_trigger);
                    }
                }
            }
        }
    }

    #[test]
    fn test_legs_are_wired_correctly() {
        let planner = tiered_planner();
        let plan = planner
            .plan("ETH-USDT", Side::Sell, dec!(100), dec!(2), Some(dec!(1)))
            .unwrap();

        assert_eq!(plan.entry.order_type, OrderType::Market);
        assert_eq!(plan.entry.side, Side::Sell);
        assert!(!plan.entry.reduce_only);

        assert_eq!(plan.take_profit.order_type, OrderType::TakeProfitMarket);
        assert_eq!(plan.take_profit.side, Side::Buy);
        assert!(plan.take_profit.reduce_only);

        assert_eq!(plan.stop_loss.order_type, OrderType::StopMarket);
        assert_eq!(plan.stop_loss.side, Side::Buy);
        assert!(plan.stop_loss.reduce_only);

        // Three distinct idempotency keys
        assert_ne!(plan.entry.client_order_id, plan.take_profit.client_order_id);
        assert_ne!(plan.entry.client_order_id, plan.stop_loss.client_order_id);
        assert_ne!(
            plan.take_profit.client_order_id,
            plan.stop_loss.client_order_id
        );
    }

    #[test]
    fn test_degenerate_bracket_rejected() {
        // ATR so small that rounding collapses both triggers onto entry
        let planner = tiered_planner();
        let result = planner.plan(
            "ETH-USDT",
            Side::Buy,
            dec!(100.00),
            dec!(1),
            Some(dec!(0.001)),
        );
        assert!(matches!(result, Err(PlanError::InvariantViolated { .. })));
    }

    #[test]
    fn test_tiered_requires_atr() {
        let planner = tiered_planner();
        let result = planner.plan("ETH-USDT", Side::Buy, dec!(100), dec!(1), None);
        assert!(matches!(result, Err(PlanError::InvalidParameter(_))));
    }
}
