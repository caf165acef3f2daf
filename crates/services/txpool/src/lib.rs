//! Admission and replacement policy engine for the pool of unconfirmed
//! transactions.
//!
//! Given one transaction or a dependency-ordered package, the pool decides
//! which candidates may enter, which resident entries must be evicted to
//! make room, and reports a per-transaction (and, for packages, per-package)
//! result. It maintains ancestor/descendant aggregates over the dependency
//! graph, enforces the restricted-topology ("TRUC") transaction class, the
//! generic chain limits, and the opt-in fee-bump replacement protocol with
//! sibling eviction.
//!
//! Consensus validity (signatures, scripts, value conservation) is assumed
//! to be checked before transactions reach this crate.

#![deny(clippy::arithmetic_side_effects)]
#![deny(clippy::cast_possible_truncation)]

pub mod config;
pub mod conflicts;
pub mod error;
pub mod limits;
mod package;
pub mod pool;
pub mod ports;
pub mod replacement;
pub mod shared_state;
pub mod storage;
pub mod truc;

#[cfg(test)]
mod tests;

use petgraph::graph::NodeIndex;

use crate::{
    conflicts::BasicConflictManager,
    storage::graph::GraphStorage,
};

/// The default pool: graph-backed storage with the basic conflict index.
pub type TxPool = pool::Pool<GraphStorage, BasicConflictManager<NodeIndex>>;

pub use config::{
    ChainLimits,
    Config,
};
pub use error::Error;
pub use pool::{
    PackageOutcome,
    Pool,
    TxAcceptance,
    TxResult,
};
pub use ports::UtxoView;
pub use shared_state::SharedState;

/// Build the default pool from a configuration.
pub fn new_pool(config: Config) -> TxPool {
    pool::Pool::new(
        GraphStorage::new(),
        BasicConflictManager::new(),
        config,
    )
}
