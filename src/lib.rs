//! # dutchbook
//!
//! A deterministic Dutch-auction rebalancing engine for tokenized
//! multi-asset baskets.
//!
//! A basket of fungible tokens backs a share supply. Governance
//! starts a **rebalance** toward a target composition; auctions then
//! sell one token for another along an exponentially decaying price
//! curve, inside limits that bound how far any balance may move.
//! External bidders settle against the engine; it never executes
//! trades itself, it only defines the tradeable envelope.
//!
//! ## Features
//!
//! - **Price curve**: `price(t) = start · e^(-k·(t-start))`, exact at
//!   both endpoints, monotonically non-increasing
//! - **Lot sizing**: ceiling-rounded sell floors, floor-rounded buy
//!   ceilings — the basket never crosses either limit
//! - **Lifecycle**: launcher-exclusivity window, permissionless
//!   fallback, TTL expiry, narrowing-only overrides
//! - **Fixed-point throughout**: 18/27-decimal integer math, no
//!   floating point
//!
//! ## Quick Start
//!
//! ```
//! use dutchbook::{
//!     Account, Engine, PriceControl, PriceRange, RebalanceLimits, Role, Token, TokenParams,
//!     WeightRange, D18, D27,
//! };
//!
//! let admin = Account(0);
//! let manager = Account(1);
//! let launcher = Account(2);
//!
//! let mut engine = Engine::new(admin, 600); // 10-minute auctions
//! engine.grant_role(admin, manager, Role::RebalanceManager).unwrap();
//! engine.grant_role(admin, launcher, Role::AuctionLauncher).unwrap();
//!
//! // The basket holds 1M USDC against 1M shares; governance wants
//! // it fully rotated into WETH at $2000.
//! let usdc = Token::new("USDC");
//! let weth = Token::new("WETH");
//! engine.set_balance(usdc, 1_000_000);
//! engine.set_total_supply(1_000_000);
//!
//! let tokens = vec![
//!     TokenParams {
//!         token: usdc,
//!         weights: WeightRange::point(0), // sell out entirely
//!         prices: PriceRange::point(D27), // $1
//!     },
//!     TokenParams {
//!         token: weth,
//!         weights: WeightRange::point(D27 / 2_000), // 0.0005 WETH/share
//!         prices: PriceRange::point(2_000 * D27),   // $2000
//!     },
//! ];
//! let limits = RebalanceLimits::point(D18); // 1 basket unit per share
//!
//! engine
//!     .start_rebalance(manager, tokens, limits, PriceControl::None, 3_600, 86_400, 0)
//!     .unwrap();
//! engine.open_auction(launcher, usdc, weth, None, 0).unwrap();
//!
//! // 2000 USDC buys exactly 1 WETH at the opening price.
//! let quote = engine.bid(Account(9), 0, 2_000, 1).unwrap();
//! assert_eq!(quote.bid_amount, 1);
//! assert_eq!(engine.balance_of(usdc), 998_000);
//! assert_eq!(engine.balance_of(weth), 1);
//! ```
//!
//! ## Scales
//!
//! | Quantity | Scale | Unit |
//! |----------|-------|------|
//! | Basket limits | D18 (1e18) | basket-units per share |
//! | Token weights | D27 (1e27) | token per basket-unit |
//! | Token prices | D27 (1e27) | unit-of-account per token |
//! | Auction prices | D27 (1e27) | buy-token per sell-token |
//!
//! Balances and share supply are raw integer quantities.

mod auction;
pub mod bid;
pub mod curve;
mod engine;
mod error;
pub mod fixed;
mod event;
pub mod lot;
mod ranges;
mod rebalance;
mod roles;
mod types;

// Re-export public API
pub use auction::Auction;
pub use bid::Quote;
pub use engine::{AuctionOverrides, Engine, RESTRICTED_AUCTION_BUFFER};
pub use error::EngineError;
pub use event::Notification;
pub use fixed::{Rounding, U256, D18, D27, MAX_LIMIT, MAX_PRICE_RATIO, MAX_TOKEN_BALANCE};
pub use ranges::{PriceRange, RebalanceLimits, TokenParams, WeightRange};
pub use rebalance::{PriceControl, Rebalance};
pub use roles::{Role, Roles};
pub use types::{Account, AuctionId, RebalanceNonce, Timestamp, Token};
