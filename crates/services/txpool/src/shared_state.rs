use std::sync::Arc;

use parking_lot::RwLock;
use tideway_types::{
    ArcPoolTx,
    Transaction,
    Txid,
};

use crate::{
    error::Error,
    pool::{
        PackageOutcome,
        TxAcceptance,
    },
    ports::UtxoView,
    storage::StorageData,
    TxPool,
};

/// Thread-safe handle over the pool.
///
/// All mutating operations (admission, package submission, reorg restore,
/// block connection) serialize under the write lock, so no two of them can
/// interleave their effects on the dependency aggregates. Speculative
/// evaluation and introspection take the read lock and run concurrently with
/// each other, always observing a fully applied state.
pub struct SharedState<V> {
    pool: Arc<RwLock<TxPool>>,
    utxo_view: Arc<V>,
}

impl<V> Clone for SharedState<V> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            utxo_view: self.utxo_view.clone(),
        }
    }
}

impl<V: UtxoView> SharedState<V> {
    /// Wrap a pool and the node's UTXO view.
    pub fn new(pool: TxPool, utxo_view: Arc<V>) -> Self {
        Self {
            pool: Arc::new(RwLock::new(pool)),
            utxo_view,
        }
    }

    /// Submit a single transaction. See [`crate::pool::Pool::insert`].
    pub fn insert(&self, tx: ArcPoolTx) -> Result<TxAcceptance, Error> {
        self.pool.write().insert(tx, self.utxo_view.as_ref())
    }

    /// Submit an ordered package, mutating the pool.
    pub fn submit_package(&self, package: Vec<ArcPoolTx>) -> PackageOutcome {
        self.pool
            .write()
            .submit_package(package, self.utxo_view.as_ref())
    }

    /// Evaluate a single transaction without mutating the pool.
    pub fn evaluate(&self, tx: ArcPoolTx) -> PackageOutcome {
        self.pool.read().evaluate(tx, self.utxo_view.as_ref())
    }

    /// Evaluate an ordered package without mutating the pool.
    pub fn evaluate_package(&self, package: Vec<ArcPoolTx>) -> PackageOutcome {
        self.pool
            .read()
            .evaluate_package(package, self.utxo_view.as_ref())
    }

    /// Re-admit a transaction after a chain reorganization.
    pub fn restore(&self, tx: ArcPoolTx) -> TxAcceptance {
        self.pool.write().restore(tx)
    }

    /// Notify the pool that a block containing `tx` was connected.
    pub fn block_connected(&self, tx: &Transaction) -> Vec<ArcPoolTx> {
        self.pool.write().block_connected(tx)
    }

    /// Whether the pool currently holds the transaction.
    pub fn contains(&self, tx_id: &Txid) -> bool {
        self.pool.read().contains(tx_id)
    }

    /// Snapshot of one entry, including its dependency aggregates.
    pub fn find_one(&self, tx_id: &Txid) -> Option<StorageData> {
        self.pool.read().find_one(tx_id).cloned()
    }

    /// Identifiers of all current entries.
    pub fn tx_ids(&self) -> Vec<Txid> {
        self.pool.read().iter_tx_ids().copied().collect()
    }

    /// Number of entries in the pool.
    pub fn count(&self) -> usize {
        self.pool.read().count()
    }
}
