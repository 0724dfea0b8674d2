//! Deterministic fixed-point arithmetic.
//!
//! All engine math runs on integers with explicit scales:
//! - D18 (1e18): basket-units-per-share limits and the "wad" scale
//!   used by the exponential/logarithm routines.
//! - D27 (1e27): token weights and prices.
//!
//! Rounding direction is load-bearing (see the lot sizer): every
//! division states whether it floors or ceils. No floating point.

use uint::construct_uint;

construct_uint! {
    /// 256-bit unsigned integer for full-width intermediate math.
    pub struct U256(4);
}

/// 1e18, the wad scale (limits, decay constants).
pub const D18: u128 = 1_000_000_000_000_000_000;

/// 1e27 (weights, prices).
pub const D27: u128 = 1_000_000_000_000_000_000_000_000_000;

/// Upper bound on rebalance limits, 1e36.
pub const MAX_LIMIT: u128 = 1_000_000_000_000_000_000_000_000_000_000_000_000;

/// Balance ceiling above which the buy side of a lot is treated as
/// non-binding, 1e36.
pub const MAX_TOKEN_BALANCE: u128 = 1_000_000_000_000_000_000_000_000_000_000_000_000;

/// Maximum allowed ratio between a price range's high and low.
pub const MAX_PRICE_RATIO: u128 = 100;

/// ln(2) at wad scale.
const LN2_WAD: u128 = 693_147_180_559_945_309;

/// Rounding direction for a division.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rounding {
    /// Round down (towards zero).
    Floor,
    /// Round up (away from zero).
    Ceil,
}

/// `a * b / c` at full 256-bit width with explicit rounding.
///
/// Returns `None` on division by zero or if `a * b` overflows 256
/// bits.
pub fn mul_div(a: U256, b: U256, c: U256, rounding: Rounding) -> Option<U256> {
    if c.is_zero() {
        return None;
    }
    let prod = a.checked_mul(b)?;
    let quot = prod / c;
    match rounding {
        Rounding::Floor => Some(quot),
        Rounding::Ceil => {
            if (prod % c).is_zero() {
                Some(quot)
            } else {
                quot.checked_add(U256::one())
            }
        }
    }
}

/// Narrow to u128, `None` if the value does not fit.
pub fn narrow(value: U256) -> Option<u128> {
    if value.bits() <= 128 {
        Some(value.low_u128())
    } else {
        None
    }
}

/// Natural logarithm at wad scale, for `x >= 1e18` (i.e. ratios >= 1).
///
/// Range-reduces by powers of two, then sums the atanh series
/// `ln(m) = 2 * (z + z^3/3 + z^5/5 + ...)` with
/// `z = (m-1)/(m+1)` for the mantissa `m` in `[1, 2)`.
///
/// # Panics
/// Debug-asserts `x >= 1e18`; in release, smaller inputs return 0.
pub fn ln_wad(x: u128) -> u128 {
    debug_assert!(x >= D18, "ln_wad domain is x >= 1e18");
    if x <= D18 {
        return 0;
    }

    // x = m * 2^n with m in [1e18, 2e18)
    let mut n: u32 = 0;
    let mut m = x;
    while m >= 2 * D18 {
        m >>= 1;
        n += 1;
    }

    // z <= 1/3 in wad, so z*z fits comfortably in u128
    let z = (m - D18) * D18 / (m + D18);
    let z_sq = z * z / D18;

    let mut term = z;
    let mut sum: u128 = 0;
    let mut denom: u128 = 1;
    while term > 0 {
        sum += term / denom;
        term = term * z_sq / D18;
        denom += 2;
    }

    2 * sum + u128::from(n) * LN2_WAD
}

/// `e^{-x}` at wad scale, for `x >= 0` in wad.
///
/// Range-reduces by ln(2) so the Taylor remainder stays below one
/// wei, then halves `n` times. Monotonically non-increasing in `x`;
/// returns 0 once the value has fully decayed.
pub fn exp_neg_wad(x: u128) -> u128 {
    let n = x / LN2_WAD;
    if n >= 128 {
        return 0;
    }
    let r = x % LN2_WAD;

    // Alternating Taylor series for e^{-r}, r in [0, ln 2).
    // Terms shrink by at least r/k per step, so ~60 iterations max.
    let mut term: u128 = D18;
    let mut sum: i128 = D18 as i128;
    let mut k: u128 = 1;
    let mut negative = true;
    loop {
        term = term * r / (D18 * k);
        if term == 0 {
            break;
        }
        if negative {
            sum -= term as i128;
        } else {
            sum += term as i128;
        }
        negative = !negative;
        k += 1;
    }

    let mantissa = if sum > 0 { sum as u128 } else { 0 };
    mantissa >> n
}
