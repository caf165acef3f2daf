use tideway_types::OutPoint;

/// View over the confirmed UTXO set, provided by the node's chain state.
///
/// Consensus validity of the transactions themselves (signatures, scripts,
/// value conservation) is checked before they reach the pool; this port only
/// answers whether a confirmed output exists and is unspent.
pub trait UtxoView: Send + Sync {
    /// Whether the given confirmed output exists and is unspent.
    fn coin_exists(&self, outpoint: &OutPoint) -> anyhow::Result<bool>;
}

#[cfg(any(test, feature = "test-helpers"))]
pub use test_helpers::MemoryUtxoView;

#[cfg(any(test, feature = "test-helpers"))]
mod test_helpers {
    use super::UtxoView;
    use parking_lot::RwLock;
    use std::collections::HashSet;
    use tideway_types::OutPoint;

    /// In-memory [`UtxoView`] for tests.
    #[derive(Default)]
    pub struct MemoryUtxoView {
        coins: RwLock<HashSet<OutPoint>>,
    }

    impl MemoryUtxoView {
        pub fn new() -> Self {
            Self::default()
        }

        /// Record a confirmed, unspent output.
        pub fn insert_coin(&self, outpoint: OutPoint) {
            self.coins.write().insert(outpoint);
        }

        /// Remove a confirmed output (spent or reorged away).
        pub fn remove_coin(&self, outpoint: &OutPoint) {
            self.coins.write().remove(outpoint);
        }
    }

    impl UtxoView for MemoryUtxoView {
        fn coin_exists(&self, outpoint: &OutPoint) -> anyhow::Result<bool> {
            Ok(self.coins.read().contains(outpoint))
        }
    }
}
