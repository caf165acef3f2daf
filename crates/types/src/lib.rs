//! Common types shared by the tideway node services.
//!
//! The transaction model here is deliberately minimal: consensus-level
//! content (scripts, witnesses, amounts conservation) is validated elsewhere,
//! so the pool-facing types carry identities, topology (inputs referencing
//! prior outputs) and the policy-relevant attributes (version tag, virtual
//! size, sequence signaling).

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod pool;
pub mod primitives;
pub mod tx;

pub use pool::{
    ArcPoolTx,
    PoolTransaction,
};
pub use primitives::{
    Bytes32,
    OutPoint,
    Txid,
    Wtxid,
};
pub use tx::{
    Transaction,
    TransactionBuilder,
    TxInput,
    TxOutput,
    SEQUENCE_FINAL,
    SEQUENCE_REPLACEABLE_THRESHOLD,
    TRUC_VERSION,
};
