use std::collections::{
    HashMap,
    HashSet,
};

use petgraph::{
    graph::NodeIndex,
    prelude::StableDiGraph,
    Direction,
};
use tideway_types::{
    ArcPoolTx,
    OutPoint,
};

use super::{
    RemovedTransactions,
    Storage,
    StorageData,
};

/// Entry storage backed by a stable directed graph.
///
/// Edges point from parent to child. Indices stay valid across unrelated
/// removals, so they can be handed out to the conflict index and to
/// validators for the duration of an evaluation pass.
#[derive(Clone)]
pub struct GraphStorage {
    /// The graph of transactions.
    graph: StableDiGraph<StorageData, ()>,
    /// Outpoint -> transaction that currently creates it.
    coins_creators: HashMap<OutPoint, NodeIndex>,
}

impl GraphStorage {
    /// Create an empty graph storage.
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::new(),
            coins_creators: HashMap::new(),
        }
    }
}

impl Default for GraphStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphStorage {
    fn cache_tx_infos(&mut self, transaction: &ArcPoolTx, node_id: NodeIndex) {
        for outpoint in transaction.created_outpoints() {
            self.coins_creators.insert(outpoint, node_id);
        }
    }

    fn clear_cache(&mut self, transaction: &ArcPoolTx) {
        for outpoint in transaction.created_outpoints() {
            self.coins_creators.remove(&outpoint);
        }
    }

    /// Walk the closure reachable from the seed nodes in the given
    /// direction. The seeds themselves are part of the closure.
    fn collect_closure(
        &self,
        start: impl IntoIterator<Item = NodeIndex>,
        direction: Direction,
    ) -> HashSet<NodeIndex> {
        let mut closure = HashSet::new();
        let mut to_visit: Vec<NodeIndex> = start.into_iter().collect();
        while let Some(node_id) = to_visit.pop() {
            if !closure.insert(node_id) {
                continue;
            }
            to_visit.extend(self.graph.neighbors_directed(node_id, direction));
        }
        closure
    }

    /// Recompute the cached aggregates of the given entries from the graph.
    ///
    /// Used on mutations that can reshape closures in ways incremental
    /// updates cannot track (subtree evictions, confirmations, reorg
    /// re-linking with diamond paths).
    fn recompute_aggregates(&mut self, affected: impl IntoIterator<Item = NodeIndex>) {
        let updates: Vec<(NodeIndex, usize, u64, usize, u64)> = affected
            .into_iter()
            .filter(|node_id| self.graph.node_weight(*node_id).is_some())
            .map(|node_id| {
                let own_vsize = self.graph[node_id].transaction.vsize();
                let ancestors = self.collect_closure(
                    self.graph.neighbors_directed(node_id, Direction::Incoming),
                    Direction::Incoming,
                );
                let descendants = self.collect_closure(
                    self.graph.neighbors_directed(node_id, Direction::Outgoing),
                    Direction::Outgoing,
                );
                let ancestor_vsize = own_vsize
                    .saturating_add(self.total_vsize(ancestors.iter().copied()));
                let descendant_vsize = own_vsize
                    .saturating_add(self.total_vsize(descendants.iter().copied()));
                (
                    node_id,
                    ancestors.len(),
                    ancestor_vsize,
                    descendants.len(),
                    descendant_vsize,
                )
            })
            .collect();

        for (node_id, ancestor_count, ancestor_vsize, descendant_count, descendant_vsize) in
            updates
        {
            let Some(node) = self.graph.node_weight_mut(node_id) else {
                debug_assert!(false, "Node with id {:?} not found", node_id);
                continue;
            };
            node.ancestor_count = ancestor_count;
            node.ancestor_vsize = ancestor_vsize;
            node.descendant_count = descendant_count;
            node.descendant_vsize = descendant_vsize;
        }
    }

    fn total_vsize(&self, nodes: impl Iterator<Item = NodeIndex>) -> u64 {
        nodes
            .filter_map(|node_id| self.graph.node_weight(node_id))
            .fold(0u64, |acc, node| {
                acc.saturating_add(node.transaction.vsize())
            })
    }
}

impl Storage for GraphStorage {
    type StorageIndex = NodeIndex;

    fn store_transaction(
        &mut self,
        transaction: ArcPoolTx,
        parents: &[Self::StorageIndex],
        children: &[Self::StorageIndex],
    ) -> Self::StorageIndex {
        let vsize = transaction.vsize();
        let ancestors = self.collect_ancestors(parents);

        let replaceable = transaction.signals_replaceability()
            || transaction.is_truc()
            || ancestors
                .iter()
                .any(|ancestor| self.graph[*ancestor].replaceable);

        let ancestor_vsize =
            vsize.saturating_add(self.total_vsize(ancestors.iter().copied()));
        let node = StorageData {
            ancestor_count: ancestors.len(),
            ancestor_vsize,
            descendant_count: 0,
            descendant_vsize: vsize,
            replaceable,
            transaction: transaction.clone(),
        };

        let node_id = self.graph.add_node(node);
        for parent in parents {
            self.graph.add_edge(*parent, node_id, ());
        }
        for child in children {
            self.graph.add_edge(node_id, *child, ());
        }
        self.cache_tx_infos(&transaction, node_id);

        if children.is_empty() {
            // A fresh admission cannot create diamond paths: every ancestor
            // gains exactly this one new descendant.
            for ancestor in ancestors {
                let Some(node) = self.graph.node_weight_mut(ancestor) else {
                    debug_assert!(false, "Node with id {:?} not found", ancestor);
                    continue;
                };
                node.descendant_count = node.descendant_count.saturating_add(1);
                node.descendant_vsize = node.descendant_vsize.saturating_add(vsize);
            }
        } else {
            // Reorg restore re-links existing entries on both sides; closures
            // may now share nodes, so recompute instead of incrementing.
            let mut affected = self.collect_closure(
                self.graph.neighbors_directed(node_id, Direction::Incoming),
                Direction::Incoming,
            );
            affected.extend(self.collect_closure(
                self.graph.neighbors_directed(node_id, Direction::Outgoing),
                Direction::Outgoing,
            ));
            affected.insert(node_id);
            self.recompute_aggregates(affected);
        }

        node_id
    }

    fn get(&self, index: &Self::StorageIndex) -> Option<&StorageData> {
        self.graph.node_weight(*index)
    }

    fn get_direct_dependencies(
        &self,
        index: Self::StorageIndex,
    ) -> impl Iterator<Item = Self::StorageIndex> {
        self.graph.neighbors_directed(index, Direction::Incoming)
    }

    fn get_direct_dependents(
        &self,
        index: Self::StorageIndex,
    ) -> impl Iterator<Item = Self::StorageIndex> {
        self.graph.neighbors_directed(index, Direction::Outgoing)
    }

    fn collect_ancestors(
        &self,
        parents: &[Self::StorageIndex],
    ) -> HashSet<Self::StorageIndex> {
        self.collect_closure(parents.iter().copied(), Direction::Incoming)
    }

    fn collect_descendants(
        &self,
        index: Self::StorageIndex,
    ) -> HashSet<Self::StorageIndex> {
        self.collect_closure(
            self.graph.neighbors_directed(index, Direction::Outgoing),
            Direction::Outgoing,
        )
    }

    fn collect_dependencies(&self, transaction: &ArcPoolTx) -> Vec<Self::StorageIndex> {
        let mut seen = HashSet::new();
        let mut pool_dependencies = Vec::new();
        for outpoint in transaction.spent_outpoints() {
            if let Some(node_id) = self.coins_creators.get(outpoint) {
                if seen.insert(*node_id) {
                    pool_dependencies.push(*node_id);
                }
            }
        }
        pool_dependencies
    }

    fn outpoint_creator(&self, outpoint: &OutPoint) -> Option<Self::StorageIndex> {
        self.coins_creators.get(outpoint).copied()
    }

    fn remove_transaction_and_dependents_subtree(
        &mut self,
        index: Self::StorageIndex,
    ) -> RemovedTransactions {
        if self.graph.node_weight(index).is_none() {
            return vec![];
        }

        let mut subtree: Vec<NodeIndex> = vec![index];
        subtree.extend(self.collect_descendants(index));

        let removed_set: HashSet<NodeIndex> = subtree.iter().copied().collect();
        let mut affected = HashSet::new();
        for node_id in &subtree {
            affected.extend(self.collect_closure(
                self.graph.neighbors_directed(*node_id, Direction::Incoming),
                Direction::Incoming,
            ));
        }

        let mut removed = Vec::with_capacity(subtree.len());
        for node_id in subtree {
            let Some(data) = self.graph.remove_node(node_id) else {
                debug_assert!(false, "Node with id {:?} not found", node_id);
                continue;
            };
            self.clear_cache(&data.transaction);
            removed.push(data);
        }

        self.recompute_aggregates(
            affected
                .into_iter()
                .filter(|node_id| !removed_set.contains(node_id)),
        );

        removed
    }

    fn remove_transaction_keep_dependents(
        &mut self,
        index: Self::StorageIndex,
    ) -> Option<StorageData> {
        let mut affected = self.collect_closure(
            self.graph.neighbors_directed(index, Direction::Incoming),
            Direction::Incoming,
        );
        affected.extend(self.collect_closure(
            self.graph.neighbors_directed(index, Direction::Outgoing),
            Direction::Outgoing,
        ));

        let data = self.graph.remove_node(index)?;
        self.clear_cache(&data.transaction);
        self.recompute_aggregates(affected);
        Some(data)
    }

    fn count(&self) -> usize {
        self.graph.node_count()
    }
}
