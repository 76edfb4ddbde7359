//! Fixed-precision monetary arithmetic. Floats never touch an order total.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Round a decimal amount to 2 places, half-up, the only rounding rule
/// allowed anywhere near an order total.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// `(unit_price + extra_cost) * quantity`, rounded half-up to 2dp.
pub fn line_total(unit_price: Decimal, extra_cost: Decimal, quantity: u32) -> Decimal {
    round_money((unit_price + extra_cost) * Decimal::from(quantity))
}

pub fn zero() -> Decimal {
    Decimal::ZERO
}

pub fn parse(s: &str) -> crate::Result<Decimal> {
    Decimal::from_str(s).map_err(|e| crate::Error::Config(format!("invalid decimal {s:?}: {e}")))
}
