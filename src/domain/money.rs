use crate::error::{LedgerError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of fractional digits kept on computed totals.
pub const TOTAL_DUE_SCALE: u32 = 2;

/// A percentage constrained to the inclusive range `[0, 100]`.
///
/// Used for both the discount and the tax applied to a payment's base amount.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Percent(Decimal);

impl Percent {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self> {
        if value >= Decimal::ZERO && value <= Decimal::ONE_HUNDRED {
            Ok(Self(value))
        } else {
            Err(LedgerError::ValidationError(format!(
                "Percentage must be between 0 and 100, got {value}"
            )))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// The percentage as a fraction, e.g. `10` becomes `0.10`.
    fn fraction(&self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }
}

impl TryFrom<Decimal> for Percent {
    type Error = LedgerError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Percent> for Decimal {
    fn from(percent: Percent) -> Self {
        percent.0
    }
}

/// The base amount owed before discount and tax. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct DueAmount(Decimal);

impl DueAmount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(LedgerError::ValidationError(format!(
                "Due amount must not be negative, got {value}"
            )))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for DueAmount {
    type Error = LedgerError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<DueAmount> for Decimal {
    fn from(amount: DueAmount) -> Self {
        amount.0
    }
}

/// Applies the discount, then the tax, to the base amount.
///
/// `round(due * (1 - discount/100) * (1 + tax/100), 2)`, rounding half away from
/// zero. The intermediate product is kept at full decimal precision; only the
/// final value is rounded.
///
/// Fails with a validation error when the product leaves the `Decimal` range.
pub fn total_due(due: DueAmount, discount: Percent, tax: Percent) -> Result<Decimal> {
    let taxed = Decimal::ONE
        .checked_sub(discount.fraction())
        .and_then(|factor| due.value().checked_mul(factor))
        .and_then(|discounted| {
            Decimal::ONE
                .checked_add(tax.fraction())
                .and_then(|factor| discounted.checked_mul(factor))
        })
        .ok_or_else(|| {
            LedgerError::ValidationError(format!(
                "Total due for amount {} with {}% tax overflows",
                due.value(),
                tax.value()
            ))
        })?;
    Ok(taxed.round_dp_with_strategy(TOTAL_DUE_SCALE, RoundingStrategy::MidpointAwayFromZero))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn due(v: Decimal) -> DueAmount {
        DueAmount::new(v).unwrap()
    }

    fn pct(v: Decimal) -> Percent {
        Percent::new(v).unwrap()
    }

    #[test]
    fn test_percent_bounds() {
        assert!(Percent::new(dec!(0)).is_ok());
        assert!(Percent::new(dec!(100)).is_ok());
        assert!(Percent::new(dec!(12.5)).is_ok());
        assert!(matches!(
            Percent::new(dec!(-0.01)),
            Err(LedgerError::ValidationError(_))
        ));
        assert!(matches!(
            Percent::new(dec!(100.01)),
            Err(LedgerError::ValidationError(_))
        ));
    }

    #[test]
    fn test_due_amount_rejects_negative() {
        assert!(DueAmount::new(dec!(0)).is_ok());
        assert!(matches!(
            DueAmount::new(dec!(-1)),
            Err(LedgerError::ValidationError(_))
        ));
    }

    #[test]
    fn test_total_due_discount_then_tax() {
        let total = total_due(due(dec!(100)), pct(dec!(10)), pct(dec!(5))).unwrap();
        assert_eq!(total, dec!(94.50));
        assert_eq!(total.scale(), 2);
    }

    #[test]
    fn test_total_due_without_adjustments() {
        let total = total_due(due(dec!(250.125)), Percent::ZERO, Percent::ZERO).unwrap();
        assert_eq!(total, dec!(250.13));
    }

    #[test]
    fn test_total_due_rounds_half_up() {
        // Midpoints round away from zero: 0.125 -> 0.13 and 0.145 -> 0.15,
        // where banker's rounding would give 0.12 and 0.14.
        assert_eq!(
            total_due(due(dec!(0.125)), Percent::ZERO, Percent::ZERO).unwrap(),
            dec!(0.13)
        );
        assert_eq!(
            total_due(due(dec!(0.145)), Percent::ZERO, Percent::ZERO).unwrap(),
            dec!(0.15)
        );
    }

    #[test]
    fn test_total_due_full_discount_is_zero() {
        let total = total_due(due(dec!(99.99)), pct(dec!(100)), pct(dec!(20))).unwrap();
        assert_eq!(total, Decimal::ZERO);
    }

    #[test]
    fn test_total_due_never_negative_across_grid() {
        let amounts = [dec!(0), dec!(0.01), dec!(19.99), dec!(1000000.4999)];
        let percents = [dec!(0), dec!(0.5), dec!(33.333), dec!(50), dec!(100)];
        for d in amounts {
            for p in percents {
                for t in percents {
                    let total = total_due(due(d), pct(p), pct(t)).unwrap();
                    let expected = (d * (dec!(1) - p / dec!(100)) * (dec!(1) + t / dec!(100)))
                        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
                    assert_eq!(total, expected, "d={d} p={p} t={t}");
                    assert!(total >= Decimal::ZERO);
                }
            }
        }
    }

    #[test]
    fn test_total_due_overflow_is_validation_error() {
        let result = total_due(due(Decimal::MAX), Percent::ZERO, pct(dec!(100)));
        assert!(matches!(result, Err(LedgerError::ValidationError(_))));

        // Still representable once the discount brings the base down.
        let reduced = total_due(due(Decimal::MAX), pct(dec!(60)), pct(dec!(100))).unwrap();
        assert!(reduced > Decimal::ZERO);
    }

    #[test]
    fn test_percent_deserialize_validates() {
        let ok: Percent = serde_json::from_str("\"15\"").unwrap();
        assert_eq!(ok.value(), dec!(15));
        assert!(serde_json::from_str::<Percent>("\"150\"").is_err());
    }
}
