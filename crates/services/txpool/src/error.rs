use core::fmt;

use tideway_types::{
    OutPoint,
    Txid,
    Wtxid,
};

#[derive(Clone, Debug, derive_more::Display)]
pub enum Error {
    #[display("TRUC-rule-violation: {_0}")]
    Truc(TrucError),
    #[display("too-long-mempool-chain: {_0}")]
    Limits(LimitError),
    #[display("replacement-rejected: {_0}")]
    Replacement(ReplacementError),
    #[display("conflict-unresolved: {_0}")]
    Conflict(ConflictError),
    #[display("package-invalid: {_0}")]
    Package(PackageError),
    #[display("Transaction id already exists (id: {_0})")]
    DuplicateTxId(Txid),
    #[display("UTXO (id: {_0}) does not exist")]
    UtxoNotFound(OutPoint),
    #[display("Database error: {_0}")]
    Database(String),
    #[display("Storage error: {_0}")]
    Storage(String),
}

/// Restricted-topology (TRUC) violations. Display strings are stable and
/// name the transaction whose limit would be broken, which is not always the
/// candidate itself.
#[derive(Clone, Debug, derive_more::Display)]
pub enum TrucError {
    #[display("TRUC tx {txid} (wtxid={wtxid}) is too big: {vsize} > {max} virtual bytes")]
    TooBig {
        txid: Txid,
        wtxid: Wtxid,
        vsize: u64,
        max: u64,
    },
    #[display(
        "TRUC child tx {txid} (wtxid={wtxid}) is too big: {vsize} > {max} virtual bytes"
    )]
    ChildTooBig {
        txid: Txid,
        wtxid: Wtxid,
        vsize: u64,
        max: u64,
    },
    #[display("tx {txid} (wtxid={wtxid}) would have too many ancestors")]
    TooManyAncestors { txid: Txid, wtxid: Wtxid },
    #[display("tx {txid} (wtxid={wtxid}) would exceed descendant count limit")]
    TooManyDescendants { txid: Txid, wtxid: Wtxid },
    #[display(
        "non-TRUC tx {child_txid} (wtxid={child_wtxid}) cannot spend from TRUC tx \
        {parent_txid} (wtxid={parent_wtxid})"
    )]
    NonTrucSpendsTruc {
        child_txid: Txid,
        child_wtxid: Wtxid,
        parent_txid: Txid,
        parent_wtxid: Wtxid,
    },
    #[display(
        "TRUC tx {child_txid} (wtxid={child_wtxid}) cannot spend from non-TRUC tx \
        {parent_txid} (wtxid={parent_wtxid})"
    )]
    TrucSpendsNonTruc {
        child_txid: Txid,
        child_wtxid: Wtxid,
        parent_txid: Txid,
        parent_wtxid: Wtxid,
    },
}

/// Generic ancestor/descendant ceilings, independent of transaction class.
#[derive(Clone, Debug, derive_more::Display)]
pub enum LimitError {
    #[display("tx {txid} has too many unconfirmed ancestors ({count} > {limit})")]
    AncestorCount {
        txid: Txid,
        count: usize,
        limit: usize,
    },
    #[display("tx {txid} exceeds ancestor size limit ({vsize} > {limit} virtual bytes)")]
    AncestorSize {
        txid: Txid,
        vsize: u64,
        limit: u64,
    },
    #[display("tx {ancestor} would have too many descendants ({count} > {limit})")]
    DescendantCount {
        ancestor: Txid,
        count: usize,
        limit: usize,
    },
    #[display(
        "exceeds descendant size limit for tx {ancestor} ({vsize} > {limit} virtual bytes)"
    )]
    DescendantSize {
        ancestor: Txid,
        vsize: u64,
        limit: u64,
    },
}

/// Marks whether an eviction set was extended with a sibling, so replacement
/// failure messages can say so.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplacementScope {
    DirectConflicts,
    WithSiblingEviction,
}

impl fmt::Display for ReplacementScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplacementScope::DirectConflicts => Ok(()),
            ReplacementScope::WithSiblingEviction => {
                f.write_str(" (including sibling eviction)")
            }
        }
    }
}

/// The four ordered replacement rejections; the first rule broken wins.
#[derive(Clone, Debug, derive_more::Display)]
pub enum ReplacementError {
    #[display(
        "too many potential replacements{scope}, rejecting replacement {txid}; \
        too many potential replacements ({count} > {max})"
    )]
    TooManyReplacements {
        txid: Txid,
        scope: ReplacementScope,
        count: usize,
        max: usize,
    },
    #[display(
        "non-replaceable conflict{scope}, rejecting replacement {txid}; \
        conflicting tx {conflict} does not signal replaceability"
    )]
    NotSignaled {
        txid: Txid,
        scope: ReplacementScope,
        conflict: Txid,
    },
    #[display(
        "insufficient fee{scope}, rejecting replacement {txid}, \
        not enough additional fees to relay; {fee} < {required}"
    )]
    InsufficientFee {
        txid: Txid,
        scope: ReplacementScope,
        fee: u64,
        required: u64,
    },
    #[display(
        "insufficient fee{scope}, rejecting replacement {txid}; \
        new feerate does not exceed feerate of conflicting tx {conflict}"
    )]
    InsufficientFeerate {
        txid: Txid,
        scope: ReplacementScope,
        conflict: Txid,
    },
}

/// The candidate conflicts with pool entries but no coherent eviction set
/// exists.
#[derive(Clone, Debug, derive_more::Display)]
pub enum ConflictError {
    #[display(
        "rejecting replacement {txid}; a conflicting transaction is also an \
        unconfirmed ancestor"
    )]
    ConflictIsAncestor { txid: Txid },
}

/// Malformed package batches, rejected before any member is evaluated.
#[derive(Clone, Debug, derive_more::Display)]
pub enum PackageError {
    #[display("package is not sorted: tx {txid} appears before one of its package parents")]
    NotSorted { txid: Txid },
    #[display("tx {txid} appears in the package more than once")]
    DuplicateTransaction { txid: Txid },
    #[display("outpoint {outpoint} is spent by multiple package members")]
    ConflictInPackage { outpoint: OutPoint },
}

impl From<TrucError> for Error {
    fn from(e: TrucError) -> Self {
        Error::Truc(e)
    }
}

impl From<LimitError> for Error {
    fn from(e: LimitError) -> Self {
        Error::Limits(e)
    }
}

impl From<ReplacementError> for Error {
    fn from(e: ReplacementError) -> Self {
        Error::Replacement(e)
    }
}

impl From<ConflictError> for Error {
    fn from(e: ConflictError) -> Self {
        Error::Conflict(e)
    }
}

impl From<PackageError> for Error {
    fn from(e: PackageError) -> Self {
        Error::Package(e)
    }
}
