//! Swap math
//!
//! Constant-product (x*y=k) quoting on U256 with an arbitrary fee in basis
//! points. All wei-scale amount arithmetic stays in integers; only derived
//! percentages are f64.

use alloy::primitives::U256;

const BPS_DENOMINATOR: u64 = 10_000;

/// Stateless constant-product calculator
pub struct SwapCalculator;

impl SwapCalculator {
    /// Output amount for a swap against (reserve_in, reserve_out) with the
    /// given fee.
    ///
    /// amount_in_with_fee = amount_in * (10000 - fee_bps) / 10000
    /// amount_out = reserve_out * amount_in_with_fee / (reserve_in + amount_in_with_fee)
    ///
    /// Zero inputs or reserves quote zero, never panic.
    pub fn amount_out(amount_in: U256, reserve_in: U256, reserve_out: U256, fee_bps: u32) -> U256 {
        if amount_in.is_zero()
            || reserve_in.is_zero()
            || reserve_out.is_zero()
            || fee_bps as u64 >= BPS_DENOMINATOR
        {
            return U256::ZERO;
        }

        let amount_in_with_fee = Self::amount_in_with_fee(amount_in, fee_bps);
        let numerator = reserve_out * amount_in_with_fee;
        let denominator = reserve_in + amount_in_with_fee;

        numerator / denominator
    }

    /// Input amount after the fee haircut
    pub fn amount_in_with_fee(amount_in: U256, fee_bps: u32) -> U256 {
        amount_in * U256::from(BPS_DENOMINATOR - fee_bps as u64) / U256::from(BPS_DENOMINATOR)
    }

    /// Price impact of the trade as a percent of the input-side reserve:
    /// amount_in_with_fee / reserve_in * 100
    pub fn price_impact_percent(amount_in: U256, reserve_in: U256, fee_bps: u32) -> f64 {
        if reserve_in.is_zero() {
            return 100.0;
        }
        let with_fee = Self::amount_in_with_fee(amount_in, fee_bps);
        (u256_to_f64(with_fee) / u256_to_f64(reserve_in)) * 100.0
    }
}

/// Saturating U256 -> f64 for score/percentage math. Amounts above u128::MAX
/// saturate; score inputs never need that range.
pub fn u256_to_f64(value: U256) -> f64 {
    if value > U256::from(u128::MAX) {
        u128::MAX as f64
    } else {
        value.to::<u128>() as f64
    }
}

/// f64 -> U256 via 1e9 fixed point, for the deterministic fallback quote.
/// Negative or non-finite rates map to zero.
pub fn apply_rate(amount: U256, rate: f64) -> U256 {
    if !rate.is_finite() || rate <= 0.0 {
        return U256::ZERO;
    }
    let rate_fp = (rate * 1e9) as u128;
    amount * U256::from(rate_fp) / U256::from(1_000_000_000u64)
}
