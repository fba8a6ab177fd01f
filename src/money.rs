//! Rounding and even-split helpers shared by the balance, settlement and
//! expense code.
//!
//! Every monetary value in this crate is a [`Decimal`] rounded half-up at two
//! decimal places. The rounding happens after each arithmetic step, not just
//! at the end, so error never accumulates across a long expense list.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round to two decimal places, half-up, and pin the scale so values always
/// serialize like money (`"60.00"`, never `"60"`).
pub fn round2(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// A starting balance of `0.00`.
pub fn zero() -> Decimal {
    round2(Decimal::ZERO)
}

/// One sharer's portion of an amount split evenly `sharers` ways.
pub fn split_evenly(amount: Decimal, sharers: usize) -> Decimal {
    round2(amount / Decimal::from(sharers))
}
