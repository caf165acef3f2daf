use std::collections::HashSet;

use tideway_types::PoolTransaction;

use crate::{
    config::ChainLimits,
    error::LimitError,
    storage::Storage,
};

/// Generic ancestor/descendant ceilings, applied to every candidate after
/// its closure is resolved.
///
/// These run even when the restricted-class checks passed: an operator may
/// tighten them below the class defaults, so neither validator short-circuits
/// the other. Entries in `to_evict` are about to leave the pool and are not
/// counted.
pub fn check_chain_limits<S: Storage>(
    tx: &PoolTransaction,
    ancestors: &HashSet<S::StorageIndex>,
    to_evict: &HashSet<S::StorageIndex>,
    limits: &ChainLimits,
    storage: &S,
) -> Result<(), LimitError> {
    let ancestor_count = ancestors.len();
    if ancestor_count > limits.max_ancestors {
        return Err(LimitError::AncestorCount {
            txid: *tx.id(),
            count: ancestor_count,
            limit: limits.max_ancestors,
        });
    }

    let ancestor_vsize = ancestors
        .iter()
        .filter_map(|ancestor| storage.get(ancestor))
        .fold(tx.vsize(), |acc, data| {
            acc.saturating_add(data.transaction.vsize())
        });
    if ancestor_vsize > limits.max_ancestor_vsize {
        return Err(LimitError::AncestorSize {
            txid: *tx.id(),
            vsize: ancestor_vsize,
            limit: limits.max_ancestor_vsize,
        });
    }

    for ancestor in ancestors {
        let Some(data) = storage.get(ancestor) else {
            continue;
        };
        let descendants = storage.collect_descendants(*ancestor);
        let surviving: Vec<_> = descendants
            .iter()
            .filter(|descendant| !to_evict.contains(*descendant))
            .collect();

        let descendant_count = surviving.len().saturating_add(1);
        if descendant_count > limits.max_descendants {
            return Err(LimitError::DescendantCount {
                ancestor: *data.transaction.id(),
                count: descendant_count,
                limit: limits.max_descendants,
            });
        }

        let descendant_vsize = surviving
            .iter()
            .filter_map(|descendant| storage.get(descendant))
            .fold(
                data.transaction.vsize().saturating_add(tx.vsize()),
                |acc, entry| acc.saturating_add(entry.transaction.vsize()),
            );
        if descendant_vsize > limits.max_descendant_vsize {
            return Err(LimitError::DescendantSize {
                ancestor: *data.transaction.id(),
                vsize: descendant_vsize,
                limit: limits.max_descendant_vsize,
            });
        }
    }

    Ok(())
}
