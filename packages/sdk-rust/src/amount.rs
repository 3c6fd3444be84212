//! Fixed-point conversion between UI amounts and on-chain base units.
//!
//! Amounts are [`Decimal`] (96-bit mantissa, scale up to 28), so scaling by
//! `10^decimals` is exact for every `u64` base-unit amount. No `f64` touches
//! the scaling path; [`from_f64`] exists only to bring a float into
//! `Decimal` once, at the edge.

use std::str::FromStr;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{Error, Result};

/// Largest precision whose scale factor `10^decimals` still fits in a `u64`.
pub const MAX_DECIMALS: u8 = 19;

fn scale_factor(decimals: u8) -> Result<Decimal> {
    if decimals > MAX_DECIMALS {
        return Err(Error::InvalidAmount(format!(
            "decimals {decimals} exceeds the supported maximum of {MAX_DECIMALS}"
        )));
    }
    // decimals <= 19 so the power always fits.
    Ok(Decimal::from(10u64.pow(decimals as u32)))
}

/// `round(amount × 10^decimals)` as an integer base-unit amount.
///
/// Midpoints round away from zero. Negative amounts and results that do not
/// fit in a `u64` are [`Error::InvalidAmount`].
pub fn to_base_units(amount: Decimal, decimals: u8) -> Result<u64> {
    if amount < Decimal::ZERO {
        return Err(Error::InvalidAmount(format!("{amount} is negative")));
    }
    let scaled = amount
        .checked_mul(scale_factor(decimals)?)
        .ok_or_else(|| Error::InvalidAmount(format!("{amount} × 10^{decimals} overflows")))?;

    scaled
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .ok_or_else(|| {
            Error::InvalidAmount(format!("{amount} × 10^{decimals} does not fit in u64"))
        })
}

/// `amount / 10^decimals`, exact. The result carries scale `decimals`.
pub fn from_base_units(amount: u64, decimals: u8) -> Result<Decimal> {
    scale_factor(decimals)?;
    let mut ui = Decimal::from(amount);
    ui.set_scale(decimals as u32)
        .map_err(|e| Error::InvalidAmount(format!("cannot scale {amount} by 10^-{decimals}: {e}")))?;
    Ok(ui)
}

/// Parse a human-entered amount such as `"1.5"`.
pub fn parse_amount(s: &str) -> Result<Decimal> {
    Decimal::from_str(s.trim())
        .map_err(|e| Error::InvalidAmount(format!("'{s}' is not a decimal amount: {e}")))
}

/// Convert a float amount to `Decimal`, rejecting NaN and infinities.
pub fn from_f64(amount: f64) -> Result<Decimal> {
    if !amount.is_finite() {
        return Err(Error::InvalidAmount(format!("{amount} is not finite")));
    }
    Decimal::from_f64(amount)
        .ok_or_else(|| Error::InvalidAmount(format!("{amount} is out of decimal range")))
}
