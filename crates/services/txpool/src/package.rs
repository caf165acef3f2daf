use std::collections::{
    HashMap,
    HashSet,
};

use tideway_types::{
    ArcPoolTx,
    OutPoint,
    Txid,
};

use crate::{
    config::Config,
    error::{
        PackageError,
        TrucError,
    },
    storage::{
        Storage,
        StorageData,
    },
    truc::{
        self,
        AncestorView,
    },
};

/// Structural validity of a package, checked before any member is evaluated:
/// no duplicate members, dependency order (parents before children), and no
/// two members spending the same outpoint.
pub(crate) fn check_well_formed(package: &[ArcPoolTx]) -> Result<(), PackageError> {
    let mut positions: HashMap<Txid, usize> = HashMap::new();
    for (index, tx) in package.iter().enumerate() {
        if positions.insert(*tx.id(), index).is_some() {
            return Err(PackageError::DuplicateTransaction { txid: *tx.id() });
        }
    }

    for (index, tx) in package.iter().enumerate() {
        for outpoint in tx.spent_outpoints() {
            if let Some(&creator_index) = positions.get(outpoint.txid()) {
                if creator_index >= index {
                    return Err(PackageError::NotSorted { txid: *tx.id() });
                }
            }
        }
    }

    let mut spenders: HashMap<OutPoint, Txid> = HashMap::new();
    for tx in package {
        for outpoint in tx.spent_outpoints() {
            if let Some(previous) = spenders.insert(*outpoint, *tx.id()) {
                if previous != *tx.id() {
                    return Err(PackageError::ConflictInPackage {
                        outpoint: *outpoint,
                    });
                }
            }
        }
    }

    Ok(())
}

fn view_of(data: &StorageData) -> AncestorView {
    AncestorView {
        txid: *data.transaction.id(),
        wtxid: *data.transaction.wtxid(),
        is_truc: data.transaction.is_truc(),
    }
}

/// Restricted-topology pre-pass over the whole package, merging the pool
/// view with package-internal parents. The first violation, in member order,
/// becomes the package-wide error and aborts the submission before any
/// mutation.
///
/// Members already resident in the pool contribute through the pool view and
/// are not re-checked themselves.
pub(crate) fn check_package_topology<S: Storage>(
    package: &[ArcPoolTx],
    config: &Config,
    storage: &S,
    tx_id_to_storage_id: &HashMap<Txid, S::StorageIndex>,
) -> Result<(), TrucError> {
    // Merged ancestor txid sets, memoized per non-resident member.
    let mut member_ancestors: HashMap<Txid, HashSet<Txid>> = HashMap::new();
    let mut views: HashMap<Txid, AncestorView> = HashMap::new();
    // Direct children each known parent gains from the package.
    let mut package_children: HashMap<Txid, usize> = HashMap::new();

    for tx in package {
        let txid = *tx.id();
        views.insert(
            txid,
            AncestorView {
                txid,
                wtxid: *tx.wtxid(),
                is_truc: tx.is_truc(),
            },
        );
        if tx_id_to_storage_id.contains_key(&txid) {
            continue;
        }

        let mut ancestors: HashSet<Txid> = HashSet::new();
        let mut direct_parents: HashSet<Txid> = HashSet::new();
        for outpoint in tx.spent_outpoints() {
            let parent_txid = *outpoint.txid();
            if let Some(parent_index) = tx_id_to_storage_id.get(&parent_txid) {
                let Some(parent_data) = storage.get(parent_index) else {
                    continue;
                };
                direct_parents.insert(parent_txid);
                views.insert(parent_txid, view_of(parent_data));
                ancestors.insert(parent_txid);
                for ancestor_index in storage.collect_ancestors(&[*parent_index]) {
                    if let Some(data) = storage.get(&ancestor_index) {
                        views.insert(*data.transaction.id(), view_of(data));
                        ancestors.insert(*data.transaction.id());
                    }
                }
            } else if let Some(parent_ancestors) = member_ancestors.get(&parent_txid) {
                direct_parents.insert(parent_txid);
                ancestors.insert(parent_txid);
                ancestors.extend(parent_ancestors.iter().copied());
            }
        }

        for parent in &direct_parents {
            let children = package_children.entry(*parent).or_insert(0);
            *children = children.saturating_add(1);
        }

        let ancestor_views: Vec<AncestorView> = ancestors
            .iter()
            .filter_map(|ancestor| views.get(ancestor).copied())
            .collect();

        let parent_total_descendants = if ancestors.len() == 1 {
            let parent_txid = ancestors
                .iter()
                .next()
                .expect("The set has exactly one element above");
            let pool_descendants = tx_id_to_storage_id
                .get(parent_txid)
                .and_then(|index| storage.get(index))
                .map(|data| data.descendant_count)
                .unwrap_or(0);
            pool_descendants
                .saturating_add(package_children.get(parent_txid).copied().unwrap_or(0))
        } else {
            0
        };

        truc::check_package_member(tx, &ancestor_views, parent_total_descendants, config)?;
        member_ancestors.insert(txid, ancestors);
    }

    Ok(())
}
