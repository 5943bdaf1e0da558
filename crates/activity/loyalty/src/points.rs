//! Points arithmetic

use crate::{IncentiveError, IncentiveResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What kind of member activity earned the incentive
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    Purchases,
    Referrals,
    Reviews,
}

impl ActivityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Purchases => "purchases",
            Self::Referrals => "referrals",
            Self::Reviews => "reviews",
        }
    }
}

impl std::fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base amount to points, one point per currency unit times a category multiplier
#[derive(Clone, Debug, PartialEq)]
pub struct PointsCalculator {
    multipliers: HashMap<ActivityCategory, f64>,
}

impl Default for PointsCalculator {
    fn default() -> Self {
        Self {
            multipliers: HashMap::from([
                (ActivityCategory::Purchases, 1.0),
                (ActivityCategory::Referrals, 2.0),
                (ActivityCategory::Reviews, 0.5),
            ]),
        }
    }
}

impl PointsCalculator {
    pub fn new(multipliers: HashMap<ActivityCategory, f64>) -> Self {
        Self { multipliers }
    }

    pub fn multiplier(&self, category: ActivityCategory) -> f64 {
        self.multipliers.get(&category).copied().unwrap_or(1.0)
    }

    /// Points for an amount, rounded down
    pub fn calculate(&self, category: ActivityCategory, base_amount: f64) -> IncentiveResult<i64> {
        if !base_amount.is_finite() || base_amount < 0.0 {
            return Err(IncentiveError::InvalidAmount(base_amount));
        }
        Ok((base_amount * self.multiplier(category)).floor() as i64)
    }

    /// Points with a bonus multiplier applied on top of the category one
    pub fn calculate_with_bonus(
        &self,
        category: ActivityCategory,
        base_amount: f64,
        bonus_multiplier: f64,
    ) -> IncentiveResult<i64> {
        let points = self.calculate(category, base_amount)?;
        Ok((points as f64 * bonus_multiplier).floor() as i64)
    }
}

/// Gold members ordering above a threshold earn a bonus
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DoublePointsRule {
    #[serde(default = "default_order_threshold")]
    pub order_threshold: f64,
    #[serde(default = "default_bonus_multiplier")]
    pub bonus_multiplier: f64,
}

fn default_order_threshold() -> f64 {
    500.0
}

fn default_bonus_multiplier() -> f64 {
    2.0
}

impl Default for DoublePointsRule {
    fn default() -> Self {
        Self {
            order_threshold: default_order_threshold(),
            bonus_multiplier: default_bonus_multiplier(),
        }
    }
}

impl DoublePointsRule {
    pub fn applies(&self, is_gold_member: bool, order_amount: f64) -> bool {
        is_gold_member && order_amount > self.order_threshold
    }

    /// Points for an activity, with the bonus when the rule applies
    pub fn points(
        &self,
        calculator: &PointsCalculator,
        category: ActivityCategory,
        is_gold_member: bool,
        amount: f64,
    ) -> IncentiveResult<i64> {
        if self.applies(is_gold_member, amount) {
            calculator.calculate_with_bonus(category, amount, self.bonus_multiplier)
        } else {
            calculator.calculate(category, amount)
        }
    }

    pub fn purchase_points(
        &self,
        calculator: &PointsCalculator,
        is_gold_member: bool,
        order_amount: f64,
    ) -> IncentiveResult<i64> {
        self.points(calculator, ActivityCategory::Purchases, is_gold_member, order_amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_multipliers() {
        let calc = PointsCalculator::default();
        assert_eq!(calc.calculate(ActivityCategory::Purchases, 199.99).unwrap(), 199);
        assert_eq!(calc.calculate(ActivityCategory::Referrals, 50.0).unwrap(), 100);
        assert_eq!(calc.calculate(ActivityCategory::Reviews, 15.0).unwrap(), 7);
    }

    #[test]
    fn test_missing_multiplier_defaults_to_one() {
        let calc = PointsCalculator::new(HashMap::new());
        assert_eq!(calc.calculate(ActivityCategory::Referrals, 10.0).unwrap(), 10);
    }

    #[test]
    fn test_rejects_bad_amounts() {
        let calc = PointsCalculator::default();
        assert!(calc.calculate(ActivityCategory::Purchases, -1.0).is_err());
        assert!(calc.calculate(ActivityCategory::Purchases, f64::NAN).is_err());
    }

    #[test]
    fn test_double_points_rule() {
        let rule = DoublePointsRule::default();
        let calc = PointsCalculator::default();
        assert!(!rule.applies(true, 500.0));
        assert!(!rule.applies(false, 900.0));
        assert_eq!(rule.purchase_points(&calc, true, 600.0).unwrap(), 1200);
        assert_eq!(rule.purchase_points(&calc, false, 600.0).unwrap(), 600);
        assert_eq!(
            rule.points(&calc, ActivityCategory::Referrals, true, 600.0).unwrap(),
            2400
        );
    }
}
