//! Exponential-decay price curve for an active auction.
//!
//! The decay constant is computed once at auction-open time; the
//! price at any interior timestamp is
//! `start_price * e^{-k * (t - start)}`, floored, and clamped so
//! numerical drift can never push it below `end_price`. The two
//! endpoints are returned by direct lookup so they are exact.

use crate::auction::Auction;
use crate::error::{EngineError, Result};
use crate::fixed::{self, Rounding, U256, D18};
use crate::types::Timestamp;

/// Compute the decay constant `k = ln(start/end) / duration`, in wad
/// per second. Requires `end_price <= start_price`, both nonzero,
/// and `duration > 0`.
pub fn decay_constant(start_price: U256, end_price: U256, duration: u64) -> Result<u128> {
    if duration == 0 || end_price.is_zero() || end_price > start_price {
        return Err(EngineError::InvalidPriceRange);
    }
    let ratio = fixed::mul_div(start_price, U256::from(D18), end_price, Rounding::Floor)
        .and_then(fixed::narrow)
        .ok_or(EngineError::Overflow)?;
    Ok(fixed::ln_wad(ratio) / u128::from(duration))
}

/// Price of `auction` at `timestamp`, D27 buy-token per sell-token.
///
/// Monotonically non-increasing over `[start, end]`;
/// `price(start) == start_price` and `price(end) == end_price`
/// exactly. Fails with `AuctionNotOngoing` outside the interval.
pub fn price(auction: &Auction, timestamp: Timestamp) -> Result<U256> {
    if !auction.is_ongoing(timestamp) {
        return Err(EngineError::AuctionNotOngoing);
    }
    // Endpoints bypass the exponential to avoid boundary rounding.
    if timestamp == auction.start {
        return Ok(auction.start_price);
    }
    if timestamp == auction.end {
        return Ok(auction.end_price);
    }

    let elapsed = u128::from(timestamp - auction.start);
    let x = auction.k.saturating_mul(elapsed);
    let factor = U256::from(fixed::exp_neg_wad(x));

    let raw = fixed::mul_div(auction.start_price, factor, U256::from(D18), Rounding::Floor)
        .ok_or(EngineError::Overflow)?;

    // Clamp against drift in either direction.
    Ok(raw.max(auction.end_price).min(auction.start_price))
}
