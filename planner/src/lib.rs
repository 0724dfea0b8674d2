//! dutchbook-planner: off-chain basket target planner.
//!
//! Reads a basket snapshot (balances, prices, target weights) from a
//! JSON file, computes the auction sequence and governance parameters
//! needed to reach the target, and emits a plan the dutchbook engine
//! accepts via `start_rebalance`. Keeps a JSONL audit trail per run.

pub mod audit;
pub mod config;
pub mod error;
pub mod plan;
pub mod snapshot;
