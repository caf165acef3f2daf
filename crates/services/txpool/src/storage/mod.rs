use std::{
    collections::HashSet,
    fmt::Debug,
    hash::Hash,
};

use tideway_types::{
    ArcPoolTx,
    OutPoint,
};

pub mod graph;

/// A pool entry: the transaction plus its cached dependency aggregates.
///
/// The aggregates are maintained by the storage on every mutation so that
/// they always equal the true closure values. Counts exclude the entry
/// itself; virtual-size aggregates include it.
#[derive(Clone, Debug)]
pub struct StorageData {
    /// The transaction.
    pub transaction: ArcPoolTx,
    /// Number of unconfirmed ancestors.
    pub ancestor_count: usize,
    /// Virtual size of the entry plus all its unconfirmed ancestors.
    pub ancestor_vsize: u64,
    /// Number of unconfirmed descendants.
    pub descendant_count: usize,
    /// Virtual size of the entry plus all its unconfirmed descendants.
    pub descendant_vsize: u64,
    /// Whether this entry may be replaced by a conflicting candidate.
    /// Derived at admission from the entry's own signaling, its class, and
    /// its ancestors' replaceability.
    pub replaceable: bool,
}

pub type RemovedTransactions = Vec<StorageData>;

/// Storage of pool entries and the dependency DAG between them.
///
/// Entries are addressed by an opaque index that stays stable across
/// unrelated removals, so other components can hold references to entries
/// for the duration of one evaluation pass.
pub trait Storage {
    /// The index type used in the storage and allowing other components to
    /// reference transactions.
    type StorageIndex: Copy + Debug + Eq + Hash;

    /// Store a transaction connected to the given in-pool parents and,
    /// in the reorg-restore case, already-resident children.
    fn store_transaction(
        &mut self,
        transaction: ArcPoolTx,
        parents: &[Self::StorageIndex],
        children: &[Self::StorageIndex],
    ) -> Self::StorageIndex;

    /// Get the storage data by its index.
    fn get(&self, index: &Self::StorageIndex) -> Option<&StorageData>;

    /// Direct parents of an entry.
    fn get_direct_dependencies(
        &self,
        index: Self::StorageIndex,
    ) -> impl Iterator<Item = Self::StorageIndex>;

    /// Direct children of an entry.
    fn get_direct_dependents(
        &self,
        index: Self::StorageIndex,
    ) -> impl Iterator<Item = Self::StorageIndex>;

    /// All unconfirmed ancestors reachable from the given parents,
    /// deduplicated, excluding the candidate itself.
    fn collect_ancestors(
        &self,
        parents: &[Self::StorageIndex],
    ) -> HashSet<Self::StorageIndex>;

    /// All unconfirmed descendants of an entry, excluding the entry itself.
    fn collect_descendants(&self, index: Self::StorageIndex)
        -> HashSet<Self::StorageIndex>;

    /// Direct in-pool parents of a candidate: the entries that created the
    /// outputs it spends.
    fn collect_dependencies(
        &self,
        transaction: &ArcPoolTx,
    ) -> Vec<Self::StorageIndex>;

    /// The entry that created the given output, if it is in the pool.
    fn outpoint_creator(&self, outpoint: &OutPoint) -> Option<Self::StorageIndex>;

    /// Remove an entry along with its whole dependent subtree, updating the
    /// aggregates of surviving relatives.
    fn remove_transaction_and_dependents_subtree(
        &mut self,
        index: Self::StorageIndex,
    ) -> RemovedTransactions;

    /// Remove a single entry, keeping its dependents in the pool. Used when
    /// the transaction is confirmed in a block.
    fn remove_transaction_keep_dependents(
        &mut self,
        index: Self::StorageIndex,
    ) -> Option<StorageData>;

    /// Count the number of entries in the storage.
    fn count(&self) -> usize;
}
