use std::collections::{
    HashMap,
    HashSet,
};

use tideway_types::{
    ArcPoolTx,
    Transaction,
    Txid,
};

use crate::{
    config::Config,
    conflicts::ConflictManager,
    error::{
        ConflictError,
        Error,
        ReplacementScope,
    },
    limits,
    package,
    ports::UtxoView,
    replacement,
    storage::{
        RemovedTransactions,
        Storage,
        StorageData,
    },
    truc,
};

/// Successful admission of one transaction.
#[derive(Debug, Clone)]
pub enum TxAcceptance {
    /// The transaction was stored; carries the entries evicted to make room.
    Added { replaced: Vec<ArcPoolTx> },
    /// The transaction was already resident and was deduplicated rather than
    /// re-validated.
    AlreadyInPool,
}

pub type TxResult = Result<TxAcceptance, Error>;

/// Outcome of a package evaluation or submission: one result per member, in
/// package order, plus an optional package-wide error shared by all members.
#[derive(Debug)]
pub struct PackageOutcome {
    pub results: Vec<(Txid, TxResult)>,
    pub package_error: Option<Error>,
}

/// Whether a candidate is submitted on its own or as part of a package.
/// Sibling eviction is only ever available to standalone submissions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AdmissionMode {
    Standalone,
    InPackage,
}

/// Everything needed to commit one admission, computed without mutating the
/// pool. Dropping it instead of committing leaves the pool untouched.
struct Admission<I> {
    parents: Vec<I>,
    evicted_roots: Vec<I>,
}

/// The pool is the policy engine's core component: it stores unconfirmed
/// transactions, resolves their dependencies, and decides admissions,
/// evictions and replacements.
pub struct Pool<S: Storage, CM> {
    /// Configuration of the pool.
    pub(crate) config: Config,
    /// The storage of the pool.
    pub(crate) storage: S,
    /// The input-conflict index of the pool.
    pub(crate) conflicts: CM,
    /// Mapping from tx_id to storage_id.
    pub(crate) tx_id_to_storage_id: HashMap<Txid, S::StorageIndex>,
}

impl<S: Storage, CM> Pool<S, CM> {
    /// Create a new pool.
    pub fn new(storage: S, conflicts: CM, config: Config) -> Self {
        Pool {
            config,
            storage,
            conflicts,
            tx_id_to_storage_id: HashMap::new(),
        }
    }

    /// Returns `true` if the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.tx_id_to_storage_id.is_empty()
    }

    /// Number of entries in the pool.
    pub fn count(&self) -> usize {
        self.storage.count()
    }

    pub fn contains(&self, tx_id: &Txid) -> bool {
        self.tx_id_to_storage_id.contains_key(tx_id)
    }

    pub fn find_one(&self, tx_id: &Txid) -> Option<&StorageData> {
        self.storage.get(self.tx_id_to_storage_id.get(tx_id)?)
    }

    pub fn iter_tx_ids(&self) -> impl Iterator<Item = &Txid> {
        self.tx_id_to_storage_id.keys()
    }
}

impl<S, CM> Clone for Pool<S, CM>
where
    S: Storage + Clone,
    CM: Clone,
{
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            storage: self.storage.clone(),
            conflicts: self.conflicts.clone(),
            tx_id_to_storage_id: self.tx_id_to_storage_id.clone(),
        }
    }
}

impl<S, CM> Pool<S, CM>
where
    S: Storage,
    CM: ConflictManager<StorageIndex = S::StorageIndex>,
{
    /// Submit a single transaction.
    ///
    /// This is the only entry point where sibling eviction is available: a
    /// candidate blocked solely by its parent's descendant limit may evict
    /// the parent's lone existing descendant, fees permitting.
    ///
    /// On any failure the pool is left exactly as before the call.
    pub fn insert(
        &mut self,
        tx: ArcPoolTx,
        utxo_view: &impl UtxoView,
    ) -> Result<TxAcceptance, Error> {
        let admission =
            self.can_insert_transaction(&tx, utxo_view, AdmissionMode::Standalone)?;
        let replaced = self.commit(tx, admission);
        Ok(TxAcceptance::Added { replaced })
    }

    /// Submit an ordered package of transactions, mutating the pool.
    ///
    /// Package well-formedness and the package-wide topology pre-pass run
    /// first; a failure there aborts the whole package before any mutation
    /// and is reported identically for every member. Afterwards members are
    /// admitted in order: already-resident members are deduplicated, and an
    /// individual failure does not abort later members unless they spend its
    /// outputs.
    pub fn submit_package(
        &mut self,
        package: Vec<ArcPoolTx>,
        utxo_view: &impl UtxoView,
    ) -> PackageOutcome {
        if let Err(error) = package::check_well_formed(&package) {
            return Self::reject_package(&package, error.into());
        }
        if let Err(error) = package::check_package_topology(
            &package,
            &self.config,
            &self.storage,
            &self.tx_id_to_storage_id,
        ) {
            return Self::reject_package(&package, error.into());
        }

        let mut results = Vec::with_capacity(package.len());
        for tx in package {
            let tx_id = *tx.id();
            if self.contains(&tx_id) {
                results.push((tx_id, Ok(TxAcceptance::AlreadyInPool)));
                continue;
            }
            let result = match self.can_insert_transaction(
                &tx,
                utxo_view,
                AdmissionMode::InPackage,
            ) {
                Ok(admission) => Ok(TxAcceptance::Added {
                    replaced: self.commit(tx, admission),
                }),
                Err(error) => Err(error),
            };
            results.push((tx_id, result));
        }
        PackageOutcome {
            results,
            package_error: None,
        }
    }

    /// Re-admit a transaction returned to the pool by a chain
    /// reorganization.
    ///
    /// Policy is an admission-time gate, not a consensus invariant: no
    /// topology or limit checks run here, and restored entries may
    /// transiently violate current limits until naturally evicted or
    /// replaced. Existing entries spending the restored transaction's
    /// outputs are re-attached as its children.
    pub fn restore(&mut self, tx: ArcPoolTx) -> TxAcceptance {
        let tx_id = *tx.id();
        if self.contains(&tx_id) {
            return TxAcceptance::AlreadyInPool;
        }

        let parents = self.storage.collect_dependencies(&tx);
        let mut seen = HashSet::new();
        let children: Vec<S::StorageIndex> = tx
            .created_outpoints()
            .filter_map(|outpoint| self.conflicts.spender_of(&outpoint))
            .filter(|child| seen.insert(*child))
            .collect();

        let storage_id = self.storage.store_transaction(tx.clone(), &parents, &children);
        self.tx_id_to_storage_id.insert(tx_id, storage_id);
        self.conflicts.on_stored_transaction(&tx, storage_id);
        tracing::debug!(%tx_id, "restored transaction after reorg");
        TxAcceptance::Added { replaced: vec![] }
    }

    /// A block containing `tx` was connected: drop the confirmed entry while
    /// keeping its dependents, then evict (cascading) every pool entry whose
    /// inputs conflict with the confirmed transaction.
    ///
    /// Returns the evicted conflicting transactions.
    pub fn block_connected(&mut self, tx: &Transaction) -> Vec<ArcPoolTx> {
        if let Some(storage_id) = self.tx_id_to_storage_id.remove(tx.id()) {
            if let Some(data) =
                self.storage.remove_transaction_keep_dependents(storage_id)
            {
                self.conflicts.on_removed_transaction(&data.transaction);
            }
        }

        let mut removed = vec![];
        for outpoint in tx.spent_outpoints() {
            if let Some(spender) = self.conflicts.spender_of(outpoint) {
                let subtree = self
                    .storage
                    .remove_transaction_and_dependents_subtree(spender);
                self.update_components_on_removal(&subtree);
                removed.extend(subtree.into_iter().map(|data| data.transaction));
            }
        }
        if !removed.is_empty() {
            tracing::debug!(
                confirmed = %tx.id(),
                count = removed.len(),
                "evicted transactions conflicting with a confirmed transaction"
            );
        }
        removed
    }

    /// Check whether a transaction could be inserted, computing everything
    /// needed to commit it. Never mutates the pool.
    fn can_insert_transaction(
        &self,
        tx: &ArcPoolTx,
        utxo_view: &impl UtxoView,
        mode: AdmissionMode,
    ) -> Result<Admission<S::StorageIndex>, Error> {
        if self.contains(tx.id()) {
            return Err(Error::DuplicateTxId(*tx.id()));
        }

        let parents = self.validate_inputs(tx, utxo_view)?;
        let ancestors = self.storage.collect_ancestors(&parents);

        let direct_conflicts = self.conflicts.find_direct_conflicts(tx);
        let mut direct = direct_conflicts;
        let mut evicted = HashSet::new();
        for conflict in &direct {
            evicted.insert(*conflict);
            evicted.extend(self.storage.collect_descendants(*conflict));
        }

        if ancestors.iter().any(|ancestor| evicted.contains(ancestor)) {
            return Err(ConflictError::ConflictIsAncestor { txid: *tx.id() }.into());
        }

        let mut scope = ReplacementScope::DirectConflicts;
        if let Err(failure) =
            truc::check_single(tx, &ancestors, &evicted, &self.config, &self.storage)
        {
            let sibling = failure
                .sibling_eviction
                .filter(|_| mode == AdmissionMode::Standalone);
            let Some(sibling) = sibling else {
                return Err(failure.error.into());
            };
            direct.insert(sibling);
            evicted.insert(sibling);
            evicted.extend(self.storage.collect_descendants(sibling));
            scope = ReplacementScope::WithSiblingEviction;
            truc::check_single(tx, &ancestors, &evicted, &self.config, &self.storage)
                .map_err(|failure| Error::from(failure.error))?;
        }

        limits::check_chain_limits(
            tx,
            &ancestors,
            &evicted,
            &self.config.chain_limits,
            &self.storage,
        )?;

        if !evicted.is_empty() {
            replacement::check_replacements(
                tx,
                &direct,
                &evicted,
                scope,
                &self.config,
                &self.storage,
            )?;
        }

        Ok(Admission {
            parents,
            evicted_roots: direct.into_iter().collect(),
        })
    }

    /// Resolve the candidate's inputs: each must be created by a pool entry
    /// or exist unspent in the confirmed UTXO set.
    fn validate_inputs(
        &self,
        tx: &ArcPoolTx,
        utxo_view: &impl UtxoView,
    ) -> Result<Vec<S::StorageIndex>, Error> {
        let mut seen = HashSet::new();
        let mut parents = Vec::new();
        for outpoint in tx.spent_outpoints() {
            if let Some(creator) = self.storage.outpoint_creator(outpoint) {
                if seen.insert(creator) {
                    parents.push(creator);
                }
            } else if self.contains(outpoint.txid()) {
                // The creating transaction is resident but has no such
                // output index.
                return Err(Error::UtxoNotFound(*outpoint));
            } else {
                let exists = utxo_view
                    .coin_exists(outpoint)
                    .map_err(|e| Error::Database(format!("{e:?}")))?;
                if !exists {
                    return Err(Error::UtxoNotFound(*outpoint));
                }
            }
        }
        Ok(parents)
    }

    /// Apply a validated admission as one indivisible state transition.
    fn commit(
        &mut self,
        tx: ArcPoolTx,
        admission: Admission<S::StorageIndex>,
    ) -> Vec<ArcPoolTx> {
        let Admission {
            parents,
            evicted_roots,
        } = admission;

        let mut removed_transactions = vec![];
        for root in evicted_roots {
            let subtree = self.storage.remove_transaction_and_dependents_subtree(root);
            self.update_components_on_removal(&subtree);
            removed_transactions
                .extend(subtree.into_iter().map(|data| data.transaction));
        }

        let tx_id = *tx.id();
        let storage_id = self.storage.store_transaction(tx.clone(), &parents, &[]);
        self.tx_id_to_storage_id.insert(tx_id, storage_id);
        self.conflicts.on_stored_transaction(&tx, storage_id);
        tracing::debug!(
            %tx_id,
            replaced = removed_transactions.len(),
            "inserted transaction"
        );

        removed_transactions
    }

    fn update_components_on_removal(&mut self, removed: &RemovedTransactions) {
        for data in removed {
            self.tx_id_to_storage_id.remove(data.transaction.id());
            self.conflicts.on_removed_transaction(&data.transaction);
        }
    }

    fn reject_package(package: &[ArcPoolTx], error: Error) -> PackageOutcome {
        PackageOutcome {
            results: package
                .iter()
                .map(|tx| (*tx.id(), Err(error.clone())))
                .collect(),
            package_error: Some(error),
        }
    }
}

impl<S, CM> Pool<S, CM>
where
    S: Storage + Clone,
    CM: ConflictManager<StorageIndex = S::StorageIndex> + Clone,
{
    /// Evaluate an ordered package without mutating the pool.
    ///
    /// Runs the exact submission code against a working copy of the pool
    /// state and discards the copy, so per-transaction outcomes match what
    /// [`Self::submit_package`] would report against the same starting
    /// state.
    pub fn evaluate_package(
        &self,
        package: Vec<ArcPoolTx>,
        utxo_view: &impl UtxoView,
    ) -> PackageOutcome {
        let mut overlay = self.clone();
        overlay.submit_package(package, utxo_view)
    }

    /// Evaluate a single transaction without mutating the pool. Evaluated as
    /// a package of one, so sibling eviction is not considered.
    pub fn evaluate(
        &self,
        tx: ArcPoolTx,
        utxo_view: &impl UtxoView,
    ) -> PackageOutcome {
        self.evaluate_package(vec![tx], utxo_view)
    }
}
