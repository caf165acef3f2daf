/// Default ceiling on the number of unconfirmed ancestors of any entry.
pub const DEFAULT_MAX_ANCESTORS: usize = 24;
/// Default ceiling on the aggregate virtual size of an entry plus its
/// unconfirmed ancestors, in virtual bytes.
pub const DEFAULT_MAX_ANCESTOR_VSIZE: u64 = 101_000;
/// Default ceiling on the number of unconfirmed descendants of any entry.
pub const DEFAULT_MAX_DESCENDANTS: usize = 24;
/// Default ceiling on the aggregate virtual size of an entry plus its
/// unconfirmed descendants, in virtual bytes.
pub const DEFAULT_MAX_DESCENDANT_VSIZE: u64 = 101_000;
/// Default ceiling on the number of entries one replacement may evict.
pub const DEFAULT_MAX_REPLACEMENTS: usize = 100;
/// Default minimum additional feerate a replacement must pay on top of the
/// evicted fees, in satoshis per virtual byte.
pub const DEFAULT_INCREMENTAL_FEERATE: u64 = 1;

/// Ancestor/descendant ceilings applied to every candidate regardless of its
/// class. Counts exclude the transaction itself; size aggregates include it.
#[derive(Clone, Debug)]
pub struct ChainLimits {
    /// Maximum number of unconfirmed ancestors.
    pub max_ancestors: usize,
    /// Maximum virtual size of a transaction plus all its unconfirmed
    /// ancestors.
    pub max_ancestor_vsize: u64,
    /// Maximum number of unconfirmed descendants.
    pub max_descendants: usize,
    /// Maximum virtual size of a transaction plus all its unconfirmed
    /// descendants.
    pub max_descendant_vsize: u64,
}

impl Default for ChainLimits {
    fn default() -> Self {
        Self {
            max_ancestors: DEFAULT_MAX_ANCESTORS,
            max_ancestor_vsize: DEFAULT_MAX_ANCESTOR_VSIZE,
            max_descendants: DEFAULT_MAX_DESCENDANTS,
            max_descendant_vsize: DEFAULT_MAX_DESCENDANT_VSIZE,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Generic ancestor/descendant ceilings.
    pub chain_limits: ChainLimits,
    /// Maximum virtual size of a restricted-class transaction.
    pub truc_max_vsize: u64,
    /// Maximum virtual size of a restricted-class transaction that has an
    /// unconfirmed parent.
    pub truc_child_max_vsize: u64,
    /// Maximum number of pool entries a single replacement may evict.
    pub max_replacements: usize,
    /// Minimum additional feerate a replacement must pay on top of the sum
    /// of evicted fees, in satoshis per virtual byte of the candidate.
    pub incremental_feerate: u64,
    /// When enabled, conflicting entries may be replaced even if none of
    /// them signals opt-in replaceability.
    pub full_replacement: bool,
}

#[cfg(any(test, feature = "test-helpers"))]
impl Default for Config {
    fn default() -> Self {
        Self {
            chain_limits: ChainLimits::default(),
            truc_max_vsize: crate::truc::TRUC_MAX_VSIZE,
            truc_child_max_vsize: crate::truc::TRUC_CHILD_MAX_VSIZE,
            max_replacements: DEFAULT_MAX_REPLACEMENTS,
            incremental_feerate: DEFAULT_INCREMENTAL_FEERATE,
            full_replacement: false,
        }
    }
}
