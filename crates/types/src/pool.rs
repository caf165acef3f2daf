//! Types for interoperability with the txpool service.

use crate::{
    primitives::{
        OutPoint,
        Txid,
        Wtxid,
    },
    tx::{
        Transaction,
        TxInput,
        TxOutput,
    },
};
use std::sync::Arc;

/// Pool transaction wrapped in an `Arc` for thread-safe sharing.
pub type ArcPoolTx = Arc<PoolTransaction>;

/// Transaction type used by the transaction pool: an individually valid
/// transaction together with the fee it pays, as computed by the
/// consensus-validation layer from the inputs it spends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolTransaction {
    transaction: Transaction,
    fee: u64,
}

impl PoolTransaction {
    /// Pair a validated transaction with its fee.
    pub const fn new(transaction: Transaction, fee: u64) -> Self {
        Self { transaction, fee }
    }

    /// Return the unique identifier of the transaction.
    pub const fn id(&self) -> &Txid {
        self.transaction.id()
    }

    /// Return the witness-inclusive identifier of the transaction.
    pub const fn wtxid(&self) -> &Wtxid {
        self.transaction.wtxid()
    }

    /// The fee paid by this transaction.
    pub const fn fee(&self) -> u64 {
        self.fee
    }

    /// The underlying transaction.
    pub const fn transaction(&self) -> &Transaction {
        &self.transaction
    }
}

#[allow(missing_docs)]
impl PoolTransaction {
    pub const fn version(&self) -> u32 {
        self.transaction.version()
    }

    pub const fn is_truc(&self) -> bool {
        self.transaction.is_truc()
    }

    pub fn signals_replaceability(&self) -> bool {
        self.transaction.signals_replaceability()
    }

    pub fn inputs(&self) -> &[TxInput] {
        self.transaction.inputs()
    }

    pub fn outputs(&self) -> &[TxOutput] {
        self.transaction.outputs()
    }

    pub const fn vsize(&self) -> u64 {
        self.transaction.vsize()
    }

    pub fn spent_outpoints(&self) -> impl Iterator<Item = &OutPoint> + '_ {
        self.transaction.spent_outpoints()
    }

    /// Outpoints created by this transaction.
    pub fn created_outpoints(&self) -> impl Iterator<Item = OutPoint> + '_ {
        let txid = *self.transaction.id();
        (0..self.transaction.outputs().len())
            .map(move |index| OutPoint::new(txid, index as u32))
    }
}
