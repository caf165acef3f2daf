use std::collections::HashSet;

use tideway_types::{
    PoolTransaction,
    Txid,
    Wtxid,
};

use crate::{
    config::Config,
    error::TrucError,
    storage::Storage,
};

/// Maximum virtual size of a restricted-class transaction.
pub const TRUC_MAX_VSIZE: u64 = 10_000;
/// Maximum virtual size of a restricted-class transaction with an
/// unconfirmed parent.
pub const TRUC_CHILD_MAX_VSIZE: u64 = 1_000;

/// A failed restricted-topology check, possibly carrying the one pool entry
/// whose eviction would resolve it.
///
/// The sibling is populated exactly when the only violation is the parent's
/// descendant limit, the parent has exactly one descendant, and that
/// descendant is not already scheduled for eviction. With two or more
/// existing descendants the choice would be ambiguous, so no candidate is
/// offered.
#[derive(Debug)]
pub struct TrucFailure<I> {
    pub error: TrucError,
    pub sibling_eviction: Option<I>,
}

impl<I> From<TrucError> for TrucFailure<I> {
    fn from(error: TrucError) -> Self {
        Self {
            error,
            sibling_eviction: None,
        }
    }
}

/// Class and identity of one unconfirmed ancestor in a merged pool+package
/// view.
#[derive(Clone, Copy, Debug)]
pub struct AncestorView {
    pub txid: Txid,
    pub wtxid: Wtxid,
    pub is_truc: bool,
}

/// Restricted-topology rules for a single-transaction submission, evaluated
/// against the resolved in-pool ancestor closure.
///
/// `to_evict` is the set of entries already scheduled for removal by the
/// replacement engine; they are excluded from descendant counting so that a
/// candidate directly replacing its sibling is not double counted.
pub fn check_single<S: Storage>(
    tx: &PoolTransaction,
    ancestors: &HashSet<S::StorageIndex>,
    to_evict: &HashSet<S::StorageIndex>,
    config: &Config,
    storage: &S,
) -> Result<(), TrucFailure<S::StorageIndex>> {
    if !tx.is_truc() {
        for ancestor in ancestors {
            let Some(data) = storage.get(ancestor) else {
                continue;
            };
            if data.transaction.is_truc() {
                return Err(TrucError::NonTrucSpendsTruc {
                    child_txid: *tx.id(),
                    child_wtxid: *tx.wtxid(),
                    parent_txid: *data.transaction.id(),
                    parent_wtxid: *data.transaction.wtxid(),
                }
                .into());
            }
        }
        return Ok(());
    }

    if tx.vsize() > config.truc_max_vsize {
        return Err(TrucError::TooBig {
            txid: *tx.id(),
            wtxid: *tx.wtxid(),
            vsize: tx.vsize(),
            max: config.truc_max_vsize,
        }
        .into());
    }

    for ancestor in ancestors {
        let Some(data) = storage.get(ancestor) else {
            continue;
        };
        if !data.transaction.is_truc() {
            return Err(TrucError::TrucSpendsNonTruc {
                child_txid: *tx.id(),
                child_wtxid: *tx.wtxid(),
                parent_txid: *data.transaction.id(),
                parent_wtxid: *data.transaction.wtxid(),
            }
            .into());
        }
    }

    if ancestors.len() > 1 {
        return Err(TrucError::TooManyAncestors {
            txid: *tx.id(),
            wtxid: *tx.wtxid(),
        }
        .into());
    }

    if let Some(parent) = ancestors.iter().next() {
        if tx.vsize() > config.truc_child_max_vsize {
            return Err(TrucError::ChildTooBig {
                txid: *tx.id(),
                wtxid: *tx.wtxid(),
                vsize: tx.vsize(),
                max: config.truc_child_max_vsize,
            }
            .into());
        }

        let descendants = storage.collect_descendants(*parent);
        let remaining: Vec<_> = descendants
            .iter()
            .filter(|descendant| !to_evict.contains(*descendant))
            .collect();
        if !remaining.is_empty() {
            let parent_data = storage.get(parent);
            let (parent_txid, parent_wtxid) = parent_data
                .map(|data| (*data.transaction.id(), *data.transaction.wtxid()))
                .unwrap_or_default();
            let sibling_eviction = if descendants.len() == 1 {
                descendants.iter().next().copied()
            } else {
                None
            };
            return Err(TrucFailure {
                error: TrucError::TooManyDescendants {
                    txid: parent_txid,
                    wtxid: parent_wtxid,
                },
                sibling_eviction,
            });
        }
    }

    Ok(())
}

/// Restricted-topology rules for one package member, evaluated against the
/// merged pool+package ancestor closure. Never offers a sibling eviction.
///
/// `parent_total_descendants` is, when the member has exactly one
/// unconfirmed parent, that parent's descendant count including this member
/// and any earlier package members.
pub fn check_package_member(
    tx: &PoolTransaction,
    ancestors: &[AncestorView],
    parent_total_descendants: usize,
    config: &Config,
) -> Result<(), TrucError> {
    if !tx.is_truc() {
        for ancestor in ancestors {
            if ancestor.is_truc {
                return Err(TrucError::NonTrucSpendsTruc {
                    child_txid: *tx.id(),
                    child_wtxid: *tx.wtxid(),
                    parent_txid: ancestor.txid,
                    parent_wtxid: ancestor.wtxid,
                });
            }
        }
        return Ok(());
    }

    if tx.vsize() > config.truc_max_vsize {
        return Err(TrucError::TooBig {
            txid: *tx.id(),
            wtxid: *tx.wtxid(),
            vsize: tx.vsize(),
            max: config.truc_max_vsize,
        });
    }

    if ancestors.len() > 1 {
        return Err(TrucError::TooManyAncestors {
            txid: *tx.id(),
            wtxid: *tx.wtxid(),
        });
    }

    for ancestor in ancestors {
        if !ancestor.is_truc {
            return Err(TrucError::TrucSpendsNonTruc {
                child_txid: *tx.id(),
                child_wtxid: *tx.wtxid(),
                parent_txid: ancestor.txid,
                parent_wtxid: ancestor.wtxid,
            });
        }
    }

    if let Some(parent) = ancestors.first() {
        if tx.vsize() > config.truc_child_max_vsize {
            return Err(TrucError::ChildTooBig {
                txid: *tx.id(),
                wtxid: *tx.wtxid(),
                vsize: tx.vsize(),
                max: config.truc_child_max_vsize,
            });
        }
        if parent_total_descendants > 1 {
            return Err(TrucError::TooManyDescendants {
                txid: parent.txid,
                wtxid: parent.wtxid,
            });
        }
    }

    Ok(())
}
