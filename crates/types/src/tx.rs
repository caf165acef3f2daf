//! The pool-facing transaction model.

use crate::primitives::{
    OutPoint,
    Txid,
    Wtxid,
};

/// Version tag of the restricted-topology transaction class.
///
/// Transactions carrying this version trade cluster shape freedom (at most
/// one unconfirmed ancestor and one unconfirmed descendant) for predictable
/// fee-bumping behavior.
pub const TRUC_VERSION: u32 = 3;

/// The sequence value marking an input as final.
pub const SEQUENCE_FINAL: u32 = 0xFFFF_FFFF;

/// Inputs with a sequence strictly below this value signal opt-in
/// replaceability for the whole transaction.
pub const SEQUENCE_REPLACEABLE_THRESHOLD: u32 = 0xFFFF_FFFE;

/// A transaction input: the output it spends plus its sequence field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TxInput {
    prevout: OutPoint,
    sequence: u32,
}

impl TxInput {
    /// Create an input spending `prevout` with a final sequence.
    pub const fn new(prevout: OutPoint) -> Self {
        Self {
            prevout,
            sequence: SEQUENCE_FINAL,
        }
    }

    /// Create an input spending `prevout` with an explicit sequence.
    pub const fn with_sequence(prevout: OutPoint, sequence: u32) -> Self {
        Self { prevout, sequence }
    }

    /// The output this input spends.
    pub const fn prevout(&self) -> &OutPoint {
        &self.prevout
    }

    /// The declared sequence field.
    pub const fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Whether this input's sequence signals opt-in replaceability.
    pub const fn signals_replaceability(&self) -> bool {
        self.sequence < SEQUENCE_REPLACEABLE_THRESHOLD
    }
}

/// A transaction output. Script contents are consensus domain and are not
/// represented here; the pool only needs the output to exist and carry value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TxOutput {
    value: u64,
}

impl TxOutput {
    /// Create an output carrying `value`.
    pub const fn new(value: u64) -> Self {
        Self { value }
    }

    /// The value carried by the output.
    pub const fn value(&self) -> u64 {
        self.value
    }
}

/// An immutable, individually consensus-valid transaction.
///
/// Identity (`txid`, `wtxid`) and virtual size are computed by the codec and
/// weight layers before the transaction reaches the pool; they are carried
/// here as plain data.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transaction {
    version: u32,
    txid: Txid,
    wtxid: Wtxid,
    inputs: Vec<TxInput>,
    outputs: Vec<TxOutput>,
    vsize: u64,
}

impl Transaction {
    /// The transaction version tag.
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Identity excluding witness data.
    pub const fn id(&self) -> &Txid {
        &self.txid
    }

    /// Identity including witness data.
    pub const fn wtxid(&self) -> &Wtxid {
        &self.wtxid
    }

    /// The inputs, each referencing a prior output.
    pub fn inputs(&self) -> &[TxInput] {
        &self.inputs
    }

    /// The outputs created by this transaction.
    pub fn outputs(&self) -> &[TxOutput] {
        &self.outputs
    }

    /// Weight-derived virtual size in virtual bytes.
    pub const fn vsize(&self) -> u64 {
        self.vsize
    }

    /// Whether this transaction belongs to the restricted-topology class.
    pub const fn is_truc(&self) -> bool {
        self.version == TRUC_VERSION
    }

    /// Whether any input signals opt-in replaceability.
    pub fn signals_replaceability(&self) -> bool {
        self.inputs.iter().any(TxInput::signals_replaceability)
    }

    /// Iterate over the outpoints spent by this transaction.
    pub fn spent_outpoints(&self) -> impl Iterator<Item = &OutPoint> + '_ {
        self.inputs.iter().map(TxInput::prevout)
    }
}

/// Builder for [`Transaction`].
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    version: u32,
    inputs: Vec<TxInput>,
    outputs: Vec<TxOutput>,
    vsize: u64,
}

impl TransactionBuilder {
    /// Start building a non-restricted (version 2) transaction with a
    /// nominal virtual size of 100 vB.
    pub fn new() -> Self {
        Self {
            version: 2,
            inputs: vec![],
            outputs: vec![],
            vsize: 100,
        }
    }

    /// Set the version tag.
    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Add an input spending `prevout` with a final sequence.
    pub fn add_input(mut self, prevout: OutPoint) -> Self {
        self.inputs.push(TxInput::new(prevout));
        self
    }

    /// Add an input spending `prevout` with an explicit sequence.
    pub fn add_input_with_sequence(mut self, prevout: OutPoint, sequence: u32) -> Self {
        self.inputs.push(TxInput::with_sequence(prevout, sequence));
        self
    }

    /// Add `count` outputs of `value` each.
    pub fn add_outputs(mut self, count: usize, value: u64) -> Self {
        self.outputs
            .extend(core::iter::repeat(TxOutput::new(value)).take(count));
        self
    }

    /// Set the virtual size.
    pub fn vsize(mut self, vsize: u64) -> Self {
        self.vsize = vsize;
        self
    }

    /// Finalize with externally computed identities.
    pub fn finalize(self, txid: Txid, wtxid: Wtxid) -> Transaction {
        Transaction {
            version: self.version,
            txid,
            wtxid,
            inputs: self.inputs,
            outputs: self.outputs,
            vsize: self.vsize,
        }
    }

    /// Finalize with random identities.
    #[cfg(any(test, feature = "test-helpers"))]
    pub fn finalize_random(self, rng: &mut impl rand::Rng) -> Transaction {
        let txid = Txid::random(rng);
        let wtxid = Wtxid::random(rng);
        self.finalize(txid, wtxid)
    }
}

impl Default for TransactionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
