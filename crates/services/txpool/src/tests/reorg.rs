use tideway_types::TRUC_VERSION;

use super::universe::{
    outpoint_of,
    TxPoolUniverse,
};
use crate::{
    error::{
        Error,
        TrucError,
    },
    pool::TxAcceptance,
};

#[test]
fn restore_bypasses_topology_policy() {
    let mut universe = TxPoolUniverse::new();
    // A confirmed chain of three restricted transactions returns to the
    // pool on block disconnection, even though the grandchild violates the
    // ancestor limit.
    let coin = universe.confirmed_outpoint();
    let parent = universe.create_transaction(TRUC_VERSION, vec![coin], 1000);
    let child =
        universe.create_transaction(TRUC_VERSION, vec![outpoint_of(&parent, 0)], 1000);
    let grandchild =
        universe.create_transaction(TRUC_VERSION, vec![outpoint_of(&child, 0)], 1000);

    // Disconnection walks the block in reverse order.
    universe.restore(&grandchild);
    universe.restore(&child);
    universe.restore(&parent);

    assert_eq!(universe.count(), 3);
    let grandchild_entry = universe.find_one(grandchild.id()).unwrap();
    assert_eq!(grandchild_entry.ancestor_count, 2);
    let parent_entry = universe.find_one(parent.id()).unwrap();
    assert_eq!(parent_entry.descendant_count, 2);
}

#[test]
fn new_admissions_are_still_policed_after_restore() {
    let mut universe = TxPoolUniverse::new();
    let coin = universe.confirmed_outpoint();
    let parent = universe.create_transaction(TRUC_VERSION, vec![coin], 1000);
    let child =
        universe.create_transaction(TRUC_VERSION, vec![outpoint_of(&parent, 0)], 1000);
    let grandchild =
        universe.create_transaction(TRUC_VERSION, vec![outpoint_of(&child, 0)], 1000);
    universe.restore(&grandchild);
    universe.restore(&child);
    universe.restore(&parent);

    // Extending the restored over-long chain is rejected normally.
    let great_grandchild = universe.create_transaction(
        TRUC_VERSION,
        vec![outpoint_of(&grandchild, 0)],
        100_000,
    );
    let result = universe.insert(&great_grandchild);

    assert!(matches!(
        result,
        Err(Error::Truc(TrucError::TooManyAncestors { .. }))
    ));
    assert_eq!(universe.count(), 3);
}

#[test]
fn restore_relinks_resident_children() {
    let mut universe = TxPoolUniverse::new();
    let coin = universe.confirmed_outpoint();
    let parent = universe.create_transaction(2, vec![coin], 1000);

    // The parent confirmed earlier; its output is a spendable coin and the
    // child entered the pool on top of it.
    let parent_coin = outpoint_of(&parent, 0);
    universe.insert_confirmed_coin(parent_coin);
    let child = universe.create_transaction(2, vec![parent_coin], 1000);
    universe.insert_ok(&child);
    assert_eq!(universe.find_one(child.id()).unwrap().ancestor_count, 0);

    // The block containing the parent is disconnected.
    universe.restore(&parent);

    let child_entry = universe.find_one(child.id()).unwrap();
    assert_eq!(child_entry.ancestor_count, 1);
    let parent_entry = universe.find_one(parent.id()).unwrap();
    assert_eq!(parent_entry.descendant_count, 1);
}

#[test]
fn reconnecting_the_block_detaches_the_parent_again() {
    let mut universe = TxPoolUniverse::new();
    let coin = universe.confirmed_outpoint();
    let parent = universe.create_transaction(2, vec![coin], 1000);
    let parent_coin = outpoint_of(&parent, 0);
    universe.insert_confirmed_coin(parent_coin);
    let child = universe.create_transaction(2, vec![parent_coin], 1000);
    universe.insert_ok(&child);
    universe.restore(&parent);

    let evicted = universe.block_connected(parent.transaction());

    assert!(evicted.is_empty());
    assert!(!universe.contains(parent.id()));
    assert!(universe.contains(child.id()));
    assert_eq!(universe.find_one(child.id()).unwrap().ancestor_count, 0);
}

#[test]
fn restoring_a_resident_transaction_is_a_noop() {
    let mut universe = TxPoolUniverse::new();
    let coin = universe.confirmed_outpoint();
    let tx = universe.create_transaction(2, vec![coin], 1000);
    universe.insert_ok(&tx);

    let acceptance = universe.restore(&tx);

    assert!(matches!(acceptance, TxAcceptance::AlreadyInPool));
    assert_eq!(universe.count(), 1);
}
