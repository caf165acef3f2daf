use std::collections::HashSet;

use num_rational::Ratio;
use tideway_types::PoolTransaction;

use crate::{
    config::Config,
    error::{
        ReplacementError,
        ReplacementScope,
    },
    storage::Storage,
};

/// Validation of an assembled eviction set, rules applied in order with the
/// first failure winning:
///
/// (a) the set may not exceed the eviction-count ceiling;
/// (b) unless full replacement is enabled, at least one directly conflicting
///     entry must be replaceable;
/// (c) the candidate must pay for the evicted fees plus the incremental
///     relay feerate over its own size;
/// (d) the candidate's feerate must exceed the feerate of every directly
///     conflicting entry.
///
/// `direct` holds the direct conflicts plus, when sibling eviction is in
/// play, the sibling; `all_evicted` additionally holds their cascaded
/// descendants.
pub fn check_replacements<S: Storage>(
    tx: &PoolTransaction,
    direct: &HashSet<S::StorageIndex>,
    all_evicted: &HashSet<S::StorageIndex>,
    scope: ReplacementScope,
    config: &Config,
    storage: &S,
) -> Result<(), ReplacementError> {
    if all_evicted.len() > config.max_replacements {
        return Err(ReplacementError::TooManyReplacements {
            txid: *tx.id(),
            scope,
            count: all_evicted.len(),
            max: config.max_replacements,
        });
    }

    if !config.full_replacement {
        let any_replaceable = direct
            .iter()
            .filter_map(|conflict| storage.get(conflict))
            .any(|data| data.replaceable);
        if !any_replaceable {
            let conflict = direct
                .iter()
                .filter_map(|conflict| storage.get(conflict))
                .map(|data| *data.transaction.id())
                .next()
                .unwrap_or_default();
            return Err(ReplacementError::NotSignaled {
                txid: *tx.id(),
                scope,
                conflict,
            });
        }
    }

    let evicted_fees = all_evicted
        .iter()
        .filter_map(|evicted| storage.get(evicted))
        .fold(0u64, |acc, data| acc.saturating_add(data.transaction.fee()));
    let required = evicted_fees
        .saturating_add(config.incremental_feerate.saturating_mul(tx.vsize()));
    if tx.fee() < required {
        return Err(ReplacementError::InsufficientFee {
            txid: *tx.id(),
            scope,
            fee: tx.fee(),
            required,
        });
    }

    let new_feerate = Ratio::new(tx.fee(), tx.vsize().max(1));
    for conflict in direct {
        let Some(data) = storage.get(conflict) else {
            continue;
        };
        let old_feerate = Ratio::new(
            data.transaction.fee(),
            data.transaction.vsize().max(1),
        );
        if new_feerate <= old_feerate {
            return Err(ReplacementError::InsufficientFeerate {
                txid: *tx.id(),
                scope,
                conflict: *data.transaction.id(),
            });
        }
    }

    Ok(())
}
