//! Single authoritative table of risk classification constants.
//!
//! Every consumer (metrics aggregator, scenario driver, CLI) reads these
//! from here; nothing redefines its own copy.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};

/// LTV at or below this is considered conservatively leveraged.
pub const LTV_LOW_MAX: Decimal = dec!(0.70);

/// LTV above this is considered highly leveraged.
pub const LTV_HIGH_MIN: Decimal = dec!(0.80);

/// Net annual return below this is weak.
pub const NET_RETURN_WEAK: Decimal = dec!(0.04);

/// Net annual return at or above this is adequate.
pub const NET_RETURN_ADEQUATE: Decimal = dec!(0.06);

/// Net annual return at or above this is strong.
pub const NET_RETURN_STRONG: Decimal = dec!(0.08);

/// Vacancy adjustment applied to rent when computing DSCR.
pub const DSCR_VACANCY_FACTOR: Decimal = dec!(0.80);

/// Deterministic risk tier for an investment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

/// Classify risk from LTV, net annual return, and monthly net cashflow.
///
/// HIGH dominates: excessive leverage, weak return, or negative cashflow.
/// LOW requires all three to clear the conservative bands.
pub fn classify_risk(ltv: Rate, net_annual_return: Rate, monthly_net_cashflow: Money) -> RiskTier {
    if ltv > LTV_HIGH_MIN
        || net_annual_return < NET_RETURN_WEAK
        || monthly_net_cashflow < Decimal::ZERO
    {
        return RiskTier::High;
    }
    if ltv <= LTV_LOW_MAX
        && net_annual_return >= NET_RETURN_ADEQUATE
        && monthly_net_cashflow > Decimal::ZERO
    {
        return RiskTier::Low;
    }
    RiskTier::Medium
}

/// An investment is favorable when it cashflows positively and is not
/// classified high risk.
pub fn is_favorable(tier: RiskTier, monthly_net_cashflow: Money) -> bool {
    tier != RiskTier::High && monthly_net_cashflow > Decimal::ZERO
}

/// Qualitative banding of net annual return over the 4/6/8% table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnStrength {
    Weak,
    Moderate,
    Adequate,
    Strong,
}

pub fn classify_return(net_annual_return: Rate) -> ReturnStrength {
    if net_annual_return >= NET_RETURN_STRONG {
        ReturnStrength::Strong
    } else if net_annual_return >= NET_RETURN_ADEQUATE {
        ReturnStrength::Adequate
    } else if net_annual_return >= NET_RETURN_WEAK {
        ReturnStrength::Moderate
    } else {
        ReturnStrength::Weak
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_documented_low_risk_vector() {
        // LTV 0.65, net return 7%, positive cashflow => LOW, favorable
        let tier = classify_risk(dec!(0.65), dec!(0.07), dec!(250));
        assert_eq!(tier, RiskTier::Low);
        assert!(is_favorable(tier, dec!(250)));
    }

    #[test]
    fn test_high_leverage_is_high_risk() {
        let tier = classify_risk(dec!(0.85), dec!(0.09), dec!(500));
        assert_eq!(tier, RiskTier::High);
        assert!(!is_favorable(tier, dec!(500)));
    }

    #[test]
    fn test_negative_cashflow_is_high_risk() {
        let tier = classify_risk(dec!(0.50), dec!(0.08), dec!(-10));
        assert_eq!(tier, RiskTier::High);
    }

    #[test]
    fn test_weak_return_is_high_risk() {
        let tier = classify_risk(dec!(0.60), dec!(0.03), dec!(100));
        assert_eq!(tier, RiskTier::High);
    }

    #[test]
    fn test_middle_band_is_medium() {
        // LTV between 0.70 and 0.80 with adequate return
        let tier = classify_risk(dec!(0.75), dec!(0.07), dec!(100));
        assert_eq!(tier, RiskTier::Medium);
        assert!(is_favorable(tier, dec!(100)));
    }

    #[test]
    fn test_boundary_values() {
        // Exactly at the low band ceiling still qualifies as LOW
        assert_eq!(classify_risk(dec!(0.70), dec!(0.06), dec!(1)), RiskTier::Low);
        // Exactly at the high band floor is not yet HIGH
        assert_ne!(
            classify_risk(dec!(0.80), dec!(0.06), dec!(1)),
            RiskTier::High
        );
    }

    #[test]
    fn test_return_strength_bands() {
        assert_eq!(classify_return(dec!(0.03)), ReturnStrength::Weak);
        assert_eq!(classify_return(dec!(0.05)), ReturnStrength::Moderate);
        assert_eq!(classify_return(dec!(0.07)), ReturnStrength::Adequate);
        assert_eq!(classify_return(dec!(0.09)), ReturnStrength::Strong);
        // Band floors are inclusive
        assert_eq!(classify_return(dec!(0.08)), ReturnStrength::Strong);
        assert_eq!(classify_return(dec!(0.04)), ReturnStrength::Moderate);
    }

    #[test]
    fn test_zero_cashflow_is_not_favorable() {
        let tier = classify_risk(dec!(0.65), dec!(0.07), Decimal::ZERO);
        assert_eq!(tier, RiskTier::Medium);
        assert!(!is_favorable(tier, Decimal::ZERO));
    }
}
