use std::{
    collections::{
        HashMap,
        HashSet,
    },
    fmt::Debug,
    hash::Hash,
};

use tideway_types::{
    OutPoint,
    PoolTransaction,
};

/// Tracks which pool entry currently spends each outpoint, to detect input
/// conflicts between a candidate and resident entries. Also answers
/// "who spends this output" during reorg re-linking.
pub trait ConflictManager {
    type StorageIndex: Copy + Debug + Eq + Hash;

    /// Entries whose inputs overlap with the candidate's inputs.
    fn find_direct_conflicts(
        &self,
        transaction: &PoolTransaction,
    ) -> HashSet<Self::StorageIndex>;

    /// The entry spending the given outpoint, if any.
    fn spender_of(&self, outpoint: &OutPoint) -> Option<Self::StorageIndex>;

    /// Record the inputs of a newly stored entry.
    fn on_stored_transaction(
        &mut self,
        transaction: &PoolTransaction,
        transaction_storage_id: Self::StorageIndex,
    );

    /// Release the inputs of a removed entry.
    fn on_removed_transaction(&mut self, transaction: &PoolTransaction);
}

pub struct BasicConflictManager<I> {
    /// Outpoint -> transaction that currently spends it.
    coins_spenders: HashMap<OutPoint, I>,
}

impl<I> BasicConflictManager<I> {
    pub fn new() -> Self {
        Self {
            coins_spenders: HashMap::new(),
        }
    }
}

impl<I> Default for BasicConflictManager<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> Clone for BasicConflictManager<I>
where
    I: Clone,
{
    fn clone(&self) -> Self {
        Self {
            coins_spenders: self.coins_spenders.clone(),
        }
    }
}

impl<I> ConflictManager for BasicConflictManager<I>
where
    I: Copy + Debug + Eq + Hash,
{
    type StorageIndex = I;

    fn find_direct_conflicts(
        &self,
        transaction: &PoolTransaction,
    ) -> HashSet<Self::StorageIndex> {
        transaction
            .spent_outpoints()
            .filter_map(|outpoint| self.coins_spenders.get(outpoint))
            .copied()
            .collect()
    }

    fn spender_of(&self, outpoint: &OutPoint) -> Option<Self::StorageIndex> {
        self.coins_spenders.get(outpoint).copied()
    }

    fn on_stored_transaction(
        &mut self,
        transaction: &PoolTransaction,
        transaction_storage_id: Self::StorageIndex,
    ) {
        for outpoint in transaction.spent_outpoints() {
            self.coins_spenders
                .insert(*outpoint, transaction_storage_id);
        }
    }

    fn on_removed_transaction(&mut self, transaction: &PoolTransaction) {
        for outpoint in transaction.spent_outpoints() {
            self.coins_spenders.remove(outpoint);
        }
    }
}
