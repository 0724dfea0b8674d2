//! Lot sizing: the maximum sell quantity tradeable right now.
//!
//! The rounding asymmetry here is deliberate and exact, not
//! approximate. The sell-side floor uses ceiling rounding so the
//! protocol can never end up below its sell floor; the buy-side
//! ceiling uses floor rounding so it can never end up above its buy
//! ceiling. Whether a tight-limit lot is zero or one depends on this
//! bias.

use crate::auction::Auction;
use crate::fixed::{self, Rounding, U256, D18, D27, MAX_TOKEN_BALANCE};

/// Maximum sell-token quantity tradeable at `price` without
/// violating either token's limit.
///
/// `price` is D27 buy-token per sell-token (from the curve);
/// balances and supply are raw token/share quantities.
pub fn max_sell(
    auction: &Auction,
    sell_balance: u128,
    buy_balance: u128,
    total_supply: u128,
    price: U256,
) -> u128 {
    let supply = U256::from(total_supply);

    // Sell side: balance above the floor is available.
    let min_sell_bal = fixed::mul_div(
        U256::from(auction.sell_limit),
        supply,
        U256::from(D18),
        Rounding::Ceil,
    )
    .unwrap_or(U256::MAX);
    let sell_available = sat_sub(U256::from(sell_balance), min_sell_bal);

    // Buy side: headroom below the ceiling, converted into
    // sell-token terms at the current price.
    let max_buy_bal = fixed::mul_div(
        U256::from(auction.buy_limit),
        supply,
        U256::from(D18),
        Rounding::Floor,
    )
    .unwrap_or(U256::MAX);
    let buy_available = sat_sub(max_buy_bal, U256::from(buy_balance));

    let lot = if buy_available > U256::from(MAX_TOKEN_BALANCE) {
        // Buy side is non-binding; converting it at a dust price
        // could overflow, and it cannot constrain the lot anyway.
        sell_available
    } else {
        let sell_from_buy = fixed::mul_div(buy_available, U256::from(D27), price, Rounding::Floor)
            .unwrap_or(U256::MAX);
        sell_available.min(sell_from_buy)
    };

    // The lot never exceeds the sell balance, which fits in u128.
    fixed::narrow(lot).unwrap_or(u128::MAX)
}

fn sat_sub(a: U256, b: U256) -> U256 {
    if a > b { a - b } else { U256::zero() }
}
