//! Engine: the high-level API for rebalances, auctions and bids.
//!
//! A single owned state struct holds the balance ledger, role table,
//! and the (at most one) active rebalance/auction pair. Every
//! external operation is one synchronous call that either fully
//! commits or returns an error with no mutation; call order is the
//! only concurrency primitive.

#[cfg(feature = "event-log")]
use crate::event::Notification;
use crate::{
    auction::Auction,
    bid::{self, Quote},
    curve,
    error::{EngineError, Result},
    fixed::{self, Rounding, U256, D27},
    ranges::{PriceRange, RebalanceLimits, TokenParams, WeightRange},
    rebalance::{PriceControl, Rebalance},
    roles::{Role, Roles},
    types::{Account, AuctionId, RebalanceNonce, Timestamp, Token},
};
use rustc_hash::FxHashMap;

/// Quiet period, in seconds, guaranteed between the last launcher
/// action and the first permissionless auction opening.
pub const RESTRICTED_AUCTION_BUFFER: u64 = 120;

/// Launcher-supplied tightenings applied before an auction opens.
/// Every entry must narrow (never widen) the governance-approved
/// range it targets; price overrides are additionally gated by the
/// rebalance's [`PriceControl`].
#[derive(Clone, Debug, Default)]
pub struct AuctionOverrides {
    pub limits: Option<RebalanceLimits>,
    pub weights: Vec<(Token, WeightRange)>,
    pub prices: Vec<(Token, PriceRange)>,
}

/// The rebalancing/auction engine for one basket.
#[derive(Clone, Debug)]
pub struct Engine {
    /// Token balances held by the basket.
    balances: FxHashMap<Token, u128>,
    /// Total share supply backing the basket.
    total_supply: u128,
    roles: Roles,
    /// Duration of every auction, seconds.
    auction_length: u64,
    next_nonce: u64,
    next_auction_id: u64,
    rebalance: Option<Rebalance>,
    auction: Option<Auction>,
    #[cfg(feature = "event-log")]
    events: Vec<Notification>,
}

impl Engine {
    /// Create an engine with `admin` holding the Admin role.
    ///
    /// # Panics
    /// Panics if `auction_length` is zero.
    pub fn new(admin: Account, auction_length: u64) -> Self {
        assert!(auction_length > 0, "auction_length must be positive");
        Self {
            balances: FxHashMap::default(),
            total_supply: 0,
            roles: Roles::with_admin(admin),
            auction_length,
            next_nonce: 0,
            next_auction_id: 0,
            rebalance: None,
            auction: None,
            #[cfg(feature = "event-log")]
            events: Vec::new(),
        }
    }

    // === Custodial bookkeeping ===
    //
    // Deposits, share issuance and redemption happen outside this
    // engine; it only needs the resulting numbers.

    /// Set a token's ledger balance.
    pub fn set_balance(&mut self, token: Token, amount: u128) {
        self.balances.insert(token, amount);
    }

    /// Current ledger balance of `token`.
    pub fn balance_of(&self, token: Token) -> u128 {
        self.balances.get(&token).copied().unwrap_or(0)
    }

    /// Set the total share supply.
    pub fn set_total_supply(&mut self, supply: u128) {
        self.total_supply = supply;
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    // === Roles ===

    /// Grant `role` to `account`. Admin only.
    pub fn grant_role(&mut self, caller: Account, account: Account, role: Role) -> Result<()> {
        self.require(caller, Role::Admin)?;
        self.roles.grant(account, role);
        Ok(())
    }

    /// Revoke `role` from `account`. Admin only.
    pub fn revoke_role(&mut self, caller: Account, account: Account, role: Role) -> Result<()> {
        self.require(caller, Role::Admin)?;
        self.roles.revoke(account, role);
        Ok(())
    }

    fn require(&self, caller: Account, role: Role) -> Result<()> {
        if self.roles.allows(caller, role) {
            Ok(())
        } else {
            Err(EngineError::NotAuthorized)
        }
    }

    // === Rebalance lifecycle ===

    /// Start a rebalance. RebalanceManager only.
    ///
    /// Validates every supplied range before touching state, then
    /// force-closes any open auction and supersedes any previous
    /// rebalance. The exclusivity window must leave at least
    /// [`RESTRICTED_AUCTION_BUFFER`] seconds before the TTL.
    #[allow(clippy::too_many_arguments)]
    pub fn start_rebalance(
        &mut self,
        caller: Account,
        tokens: Vec<TokenParams>,
        limits: RebalanceLimits,
        price_control: PriceControl,
        exclusivity_secs: u64,
        ttl_secs: u64,
        now: Timestamp,
    ) -> Result<RebalanceNonce> {
        self.require(caller, Role::RebalanceManager)?;

        if tokens.is_empty() {
            return Err(EngineError::EmptyBasket);
        }
        for (i, params) in tokens.iter().enumerate() {
            params.validate()?;
            if tokens[..i].iter().any(|p| p.token == params.token) {
                return Err(EngineError::DuplicateToken(params.token));
            }
        }
        limits.validate()?;

        let buffered = exclusivity_secs
            .checked_add(RESTRICTED_AUCTION_BUFFER)
            .ok_or(EngineError::InvalidTtl)?;
        if ttl_secs < buffered {
            return Err(EngineError::InvalidTtl);
        }
        let restricted_until = now.checked_add(exclusivity_secs).ok_or(EngineError::InvalidTtl)?;
        let available_until = now.checked_add(ttl_secs).ok_or(EngineError::InvalidTtl)?;

        // All validation passed; commit.
        if let Some(auction) = self.auction.take() {
            if auction.is_ongoing(now) {
                #[cfg(feature = "event-log")]
                self.events.push(Notification::AuctionClosed { id: auction.id });
            }
        }

        self.next_nonce += 1;
        let nonce = RebalanceNonce(self.next_nonce);
        self.rebalance = Some(Rebalance {
            nonce,
            tokens,
            limits,
            price_control,
            restricted_until,
            available_until,
        });

        #[cfg(feature = "event-log")]
        self.events.push(Notification::RebalanceStarted {
            nonce,
            restricted_until,
            available_until,
        });

        Ok(nonce)
    }

    /// End the active rebalance, closing any open auction.
    /// RebalanceManager or Admin.
    pub fn end_rebalance(&mut self, caller: Account, now: Timestamp) -> Result<()> {
        self.require(caller, Role::RebalanceManager)?;
        let rebalance = self.rebalance.take().ok_or(EngineError::NoRebalance)?;

        if let Some(auction) = self.auction.take() {
            if auction.is_ongoing(now) {
                #[cfg(feature = "event-log")]
                self.events.push(Notification::AuctionClosed { id: auction.id });
            }
        }

        #[cfg(feature = "event-log")]
        self.events.push(Notification::RebalanceEnded {
            nonce: rebalance.nonce,
        });
        // Silence the unused-variable lint without the event log.
        let _ = rebalance;

        Ok(())
    }

    // === Auction opening ===

    /// Open an auction as the launcher, optionally tightening the
    /// governance ranges first.
    ///
    /// Allowed any time before the TTL; the exclusivity window
    /// restricts everyone else, not the launcher. Acting within
    /// [`RESTRICTED_AUCTION_BUFFER`] seconds of the window's end
    /// extends the window, so a quiet period always separates the
    /// launcher's action from the first permissionless open.
    pub fn open_auction(
        &mut self,
        caller: Account,
        sell: Token,
        buy: Token,
        overrides: Option<AuctionOverrides>,
        now: Timestamp,
    ) -> Result<AuctionId> {
        self.require(caller, Role::AuctionLauncher)?;
        self.check_can_open(sell, buy, now)?;

        // Work on a copy: overrides are validated and the auction is
        // derived before anything is written back, so any rejection
        // leaves the rebalance untouched.
        let mut narrowed = self.rebalance.clone().ok_or(EngineError::NoRebalance)?;
        if let Some(overrides) = overrides {
            if let Some(limits) = overrides.limits {
                narrowed.narrow_limits(limits)?;
            }
            for (token, weights) in overrides.weights {
                narrowed.narrow_weights(token, weights)?;
            }
            for (token, prices) in overrides.prices {
                narrowed.narrow_prices(token, prices)?;
            }
        }

        // Guarantee the quiet period after launcher action.
        if now < narrowed.restricted_until
            && narrowed.restricted_until - now < RESTRICTED_AUCTION_BUFFER
        {
            narrowed.restricted_until = now + RESTRICTED_AUCTION_BUFFER;
        }

        let auction = self.derive_auction(&narrowed, sell, buy, now)?;
        self.rebalance = Some(narrowed);
        Ok(self.commit_auction(auction))
    }

    /// Open an auction permissionlessly, once the exclusivity window
    /// has elapsed. Uses only the governance pre-approved spot
    /// values; the caller gets no discretion over parameters.
    pub fn open_auction_permissionless(
        &mut self,
        _caller: Account,
        sell: Token,
        buy: Token,
        now: Timestamp,
    ) -> Result<AuctionId> {
        let rebalance = self.rebalance.as_ref().ok_or(EngineError::NoRebalance)?;
        if now < rebalance.restricted_until {
            return Err(EngineError::ExclusivityNotElapsed);
        }
        self.check_can_open(sell, buy, now)?;
        let rebalance = self.rebalance.as_ref().ok_or(EngineError::NoRebalance)?;
        let auction = self.derive_auction(rebalance, sell, buy, now)?;
        Ok(self.commit_auction(auction))
    }

    /// Shared preconditions for both open paths.
    fn check_can_open(&self, sell: Token, buy: Token, now: Timestamp) -> Result<()> {
        let rebalance = self.rebalance.as_ref().ok_or(EngineError::NoRebalance)?;
        if now >= rebalance.available_until {
            return Err(EngineError::RebalanceExpired);
        }
        if let Some(auction) = &self.auction {
            if auction.is_ongoing(now) {
                return Err(EngineError::AuctionAlreadyOpen);
            }
        }
        if sell == buy {
            return Err(EngineError::SameToken);
        }
        if rebalance.token_params(sell).is_none() {
            return Err(EngineError::UnknownToken(sell));
        }
        if rebalance.token_params(buy).is_none() {
            return Err(EngineError::UnknownToken(buy));
        }
        Ok(())
    }

    /// Snapshot the price curve and limit pair from the (possibly
    /// just-narrowed) rebalance. Pure derivation; the caller commits.
    ///
    /// The curve band folds both tokens' price ranges: it runs from
    /// `sell.high / buy.low` down to `sell.low / buy.high`, so its
    /// width compounds the two tokens' uncertainties rather than
    /// averaging them.
    fn derive_auction(
        &self,
        rebalance: &Rebalance,
        sell: Token,
        buy: Token,
        now: Timestamp,
    ) -> Result<Auction> {
        let sell_params = rebalance
            .token_params(sell)
            .ok_or(EngineError::UnknownToken(sell))?;
        let buy_params = rebalance
            .token_params(buy)
            .ok_or(EngineError::UnknownToken(buy))?;

        // Worst case for the bidder first, best case last: the curve
        // starts at sell-high/buy-low and decays to sell-low/buy-high,
        // bracketing the true exchange rate from both sides.
        let start_price = fixed::mul_div(
            U256::from(sell_params.prices.high),
            U256::from(D27),
            U256::from(buy_params.prices.low),
            Rounding::Ceil,
        )
        .ok_or(EngineError::Overflow)?;
        let end_price = fixed::mul_div(
            U256::from(sell_params.prices.low),
            U256::from(D27),
            U256::from(buy_params.prices.high),
            Rounding::Floor,
        )
        .ok_or(EngineError::Overflow)?;
        if end_price.is_zero() {
            return Err(EngineError::InvalidPriceRange);
        }

        let k = curve::decay_constant(start_price, end_price, self.auction_length)?;

        // Token-per-share limits: basket limit spot folded with the
        // token's weight spot. Sell side rounds up (floor is never
        // undershot), buy side rounds down (ceiling is never
        // overshot).
        let sell_limit = fixed::mul_div(
            U256::from(rebalance.limits.spot),
            U256::from(sell_params.weights.spot),
            U256::from(D27),
            Rounding::Ceil,
        )
        .and_then(fixed::narrow)
        .ok_or(EngineError::Overflow)?;
        let buy_limit = fixed::mul_div(
            U256::from(rebalance.limits.spot),
            U256::from(buy_params.weights.spot),
            U256::from(D27),
            Rounding::Floor,
        )
        .and_then(fixed::narrow)
        .ok_or(EngineError::Overflow)?;

        let end = now
            .checked_add(self.auction_length)
            .ok_or(EngineError::Overflow)?;

        Ok(Auction {
            id: AuctionId(self.next_auction_id + 1),
            nonce: rebalance.nonce,
            sell,
            buy,
            sell_limit,
            buy_limit,
            start_price,
            end_price,
            k,
            start: now,
            end,
        })
    }

    fn commit_auction(&mut self, auction: Auction) -> AuctionId {
        self.next_auction_id += 1;
        debug_assert_eq!(auction.id, AuctionId(self.next_auction_id));
        let id = auction.id;

        #[cfg(feature = "event-log")]
        self.events.push(Notification::AuctionOpened {
            id,
            nonce: auction.nonce,
            sell: auction.sell,
            buy: auction.buy,
            start_price: auction.start_price,
            end_price: auction.end_price,
            start: auction.start,
            end: auction.end,
        });

        self.auction = Some(auction);
        id
    }

    /// Close the open auction. AuctionLauncher, RebalanceManager or
    /// Admin. Idempotent: a no-op when nothing is open or the
    /// auction already expired.
    pub fn close_auction(&mut self, caller: Account, now: Timestamp) -> Result<()> {
        if !self.roles.allows(caller, Role::AuctionLauncher)
            && !self.roles.allows(caller, Role::RebalanceManager)
        {
            return Err(EngineError::NotAuthorized);
        }
        if let Some(auction) = self.auction.take() {
            if auction.is_ongoing(now) {
                #[cfg(feature = "event-log")]
                self.events.push(Notification::AuctionClosed { id: auction.id });
            }
        }
        Ok(())
    }

    // === Bidding ===

    /// Read-only quote: what would a bid of `sell_amount` cost right
    /// now?
    pub fn get_bid(
        &self,
        now: Timestamp,
        sell_amount: u128,
        max_buy_amount: u128,
    ) -> Result<Quote> {
        let auction = self.auction.as_ref().ok_or(EngineError::AuctionNotOngoing)?;
        bid::quote(
            auction,
            now,
            self.total_supply,
            self.balance_of(auction.sell),
            self.balance_of(auction.buy),
            sell_amount,
            max_buy_amount,
        )
    }

    /// Settle a bid: `sell_amount` of the sell token leaves the
    /// basket, the priced bid amount of the buy token enters it,
    /// atomically. Permissionless.
    pub fn bid(
        &mut self,
        caller: Account,
        now: Timestamp,
        sell_amount: u128,
        max_buy_amount: u128,
    ) -> Result<Quote> {
        let quote = self.get_bid(now, sell_amount, max_buy_amount)?;
        let auction = self.auction.as_ref().ok_or(EngineError::AuctionNotOngoing)?;
        let (sell, buy, id) = (auction.sell, auction.buy, auction.id);

        // Compute both post-transfer balances before writing either.
        let new_sell = self
            .balance_of(sell)
            .checked_sub(quote.sell_amount)
            .ok_or(EngineError::InsufficientBalance)?;
        let new_buy = self
            .balance_of(buy)
            .checked_add(quote.bid_amount)
            .ok_or(EngineError::Overflow)?;

        self.balances.insert(sell, new_sell);
        self.balances.insert(buy, new_buy);

        #[cfg(feature = "event-log")]
        self.events.push(Notification::BidFilled {
            id,
            bidder: caller,
            sell,
            buy,
            sell_amount: quote.sell_amount,
            bid_amount: quote.bid_amount,
            price: quote.price,
        });
        #[cfg(not(feature = "event-log"))]
        let _ = (caller, id);

        Ok(quote)
    }

    // === Read-only state ===

    /// The active rebalance, if any.
    pub fn current_rebalance(&self) -> Option<&Rebalance> {
        self.rebalance.as_ref()
    }

    /// The auction accepting bids at `now`, if any.
    pub fn current_auction(&self, now: Timestamp) -> Option<&Auction> {
        self.auction.as_ref().filter(|a| a.is_ongoing(now))
    }

    /// All notifications emitted so far.
    #[cfg(feature = "event-log")]
    pub fn events(&self) -> &[Notification] {
        &self.events
    }
}
