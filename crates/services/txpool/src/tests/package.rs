use tideway_types::TRUC_VERSION;

use super::universe::{
    outpoint_of,
    TxPoolUniverse,
};
use crate::{
    error::{
        Error,
        PackageError,
        TrucError,
    },
    pool::TxAcceptance,
};

#[test]
fn unsorted_package_is_rejected_wholesale() {
    let mut universe = TxPoolUniverse::new();
    let coin = universe.confirmed_outpoint();
    let parent = universe.create_transaction(2, vec![coin], 1000);
    let child = universe.create_transaction(2, vec![outpoint_of(&parent, 0)], 1000);

    let outcome = universe.submit_package(vec![child.clone(), parent.clone()]);

    assert!(matches!(
        outcome.package_error,
        Some(Error::Package(PackageError::NotSorted { .. }))
    ));
    assert_eq!(outcome.results.len(), 2);
    assert!(outcome.results.iter().all(|(_, result)| result.is_err()));
    assert_eq!(universe.count(), 0);
}

#[test]
fn duplicate_member_is_rejected_wholesale() {
    let mut universe = TxPoolUniverse::new();
    let coin = universe.confirmed_outpoint();
    let tx = universe.create_transaction(2, vec![coin], 1000);

    let outcome = universe.submit_package(vec![tx.clone(), tx.clone()]);

    assert!(matches!(
        outcome.package_error,
        Some(Error::Package(PackageError::DuplicateTransaction { .. }))
    ));
    assert_eq!(universe.count(), 0);
}

#[test]
fn conflicting_members_are_rejected_wholesale() {
    let mut universe = TxPoolUniverse::new();
    let coin = universe.confirmed_outpoint();
    let spend_1 = universe.create_transaction(2, vec![coin], 1000);
    let spend_2 = universe.create_transaction(2, vec![coin], 2000);

    let outcome = universe.submit_package(vec![spend_1, spend_2]);

    assert!(matches!(
        outcome.package_error,
        Some(Error::Package(PackageError::ConflictInPackage { .. }))
    ));
    assert_eq!(universe.count(), 0);
}

#[test]
fn dependent_chain_package_is_accepted() {
    let mut universe = TxPoolUniverse::new();
    let coin = universe.confirmed_outpoint();
    let parent = universe.create_transaction(2, vec![coin], 1000);
    let child = universe.create_transaction(2, vec![outpoint_of(&parent, 0)], 1000);
    let grandchild =
        universe.create_transaction(2, vec![outpoint_of(&child, 0)], 1000);

    let outcome = universe.submit_package(vec![
        parent.clone(),
        child.clone(),
        grandchild.clone(),
    ]);

    assert!(outcome.package_error.is_none());
    assert!(outcome
        .results
        .iter()
        .all(|(_, result)| matches!(result, Ok(TxAcceptance::Added { .. }))));
    assert_eq!(universe.count(), 3);
    assert_eq!(
        universe.find_one(parent.id()).unwrap().descendant_count,
        2
    );
}

#[test]
fn truc_chain_of_three_fails_as_a_package() {
    let mut universe = TxPoolUniverse::new();
    let coin = universe.confirmed_outpoint();
    let parent = universe.create_transaction(TRUC_VERSION, vec![coin], 1000);
    let child =
        universe.create_transaction(TRUC_VERSION, vec![outpoint_of(&parent, 0)], 1000);
    let grandchild =
        universe.create_transaction(TRUC_VERSION, vec![outpoint_of(&child, 0)], 1000);

    let outcome = universe.submit_package(vec![parent, child, grandchild.clone()]);

    match outcome.package_error {
        Some(Error::Truc(TrucError::TooManyAncestors { txid, .. })) => {
            assert_eq!(&txid, grandchild.id());
        }
        other => panic!("expected package-wide ancestor violation, got {:?}", other),
    }
    assert!(outcome.results.iter().all(|(_, result)| result.is_err()));
    assert_eq!(universe.count(), 0);
}

#[test]
fn truc_package_cannot_add_a_second_child() {
    let mut universe = TxPoolUniverse::new();
    let coin = universe.confirmed_outpoint();
    let parent = universe.create_transaction(TRUC_VERSION, vec![coin], 1000);
    let child_1 =
        universe.create_transaction(TRUC_VERSION, vec![outpoint_of(&parent, 0)], 1000);
    universe.insert_ok(&parent);
    universe.insert_ok(&child_1);

    let child_2 =
        universe.create_transaction(TRUC_VERSION, vec![outpoint_of(&parent, 1)], 100_000);
    let outcome = universe.submit_package(vec![child_2.clone()]);

    match outcome.package_error {
        Some(Error::Truc(TrucError::TooManyDescendants { txid, .. })) => {
            assert_eq!(&txid, parent.id());
        }
        other => panic!("expected package-wide descendant violation, got {:?}", other),
    }
    assert!(universe.contains(child_1.id()));
    assert!(!universe.contains(child_2.id()));
}

#[test]
fn truc_package_sibling_pair_is_rejected() {
    let mut universe = TxPoolUniverse::new();
    let coin = universe.confirmed_outpoint();
    let parent = universe.create_transaction(TRUC_VERSION, vec![coin], 1000);
    let child_1 =
        universe.create_transaction(TRUC_VERSION, vec![outpoint_of(&parent, 0)], 1000);
    let child_2 =
        universe.create_transaction(TRUC_VERSION, vec![outpoint_of(&parent, 1)], 1000);

    let outcome = universe.submit_package(vec![parent.clone(), child_1, child_2]);

    match outcome.package_error {
        Some(Error::Truc(TrucError::TooManyDescendants { txid, .. })) => {
            assert_eq!(&txid, parent.id());
        }
        other => panic!("expected package-wide descendant violation, got {:?}", other),
    }
    assert_eq!(universe.count(), 0);
}

#[test]
fn package_inheritance_mismatch_is_package_wide() {
    let mut universe = TxPoolUniverse::new();

    let coin = universe.confirmed_outpoint();
    let truc_parent = universe.create_transaction(TRUC_VERSION, vec![coin], 1000);
    let plain_child =
        universe.create_transaction(2, vec![outpoint_of(&truc_parent, 0)], 1000);
    let outcome = universe.submit_package(vec![truc_parent, plain_child]);
    assert!(matches!(
        outcome.package_error,
        Some(Error::Truc(TrucError::NonTrucSpendsTruc { .. }))
    ));

    let coin = universe.confirmed_outpoint();
    let plain_parent = universe.create_transaction(2, vec![coin], 1000);
    let truc_child = universe.create_transaction(
        TRUC_VERSION,
        vec![outpoint_of(&plain_parent, 0)],
        1000,
    );
    let outcome = universe.submit_package(vec![plain_parent, truc_child]);
    assert!(matches!(
        outcome.package_error,
        Some(Error::Truc(TrucError::TrucSpendsNonTruc { .. }))
    ));

    assert_eq!(universe.count(), 0);
}

#[test]
fn resident_member_is_deduplicated() {
    let mut universe = TxPoolUniverse::new();
    let coin = universe.confirmed_outpoint();
    let parent = universe.create_transaction(2, vec![coin], 1000);
    universe.insert_ok(&parent);

    let child = universe.create_transaction(2, vec![outpoint_of(&parent, 0)], 1000);
    let outcome = universe.submit_package(vec![parent.clone(), child.clone()]);

    assert!(outcome.package_error.is_none());
    assert!(matches!(
        outcome.results[0],
        (_, Ok(TxAcceptance::AlreadyInPool))
    ));
    assert!(matches!(
        outcome.results[1],
        (_, Ok(TxAcceptance::Added { .. }))
    ));
    assert_eq!(universe.count(), 2);
}

#[test]
fn failed_member_invalidates_its_dependents_only() {
    let mut universe = TxPoolUniverse::new();
    let missing = universe.unknown_outpoint();
    let broken = universe.create_transaction(2, vec![missing], 1000);
    let broken_child =
        universe.create_transaction(2, vec![outpoint_of(&broken, 0)], 1000);
    let coin = universe.confirmed_outpoint();
    let unrelated = universe.create_transaction(2, vec![coin], 1000);

    let outcome = universe.submit_package(vec![
        broken.clone(),
        broken_child.clone(),
        unrelated.clone(),
    ]);

    assert!(outcome.package_error.is_none());
    assert!(matches!(
        outcome.results[0],
        (_, Err(Error::UtxoNotFound(_)))
    ));
    assert!(matches!(
        outcome.results[1],
        (_, Err(Error::UtxoNotFound(_)))
    ));
    assert!(matches!(
        outcome.results[2],
        (_, Ok(TxAcceptance::Added { .. }))
    ));
    assert!(universe.contains(unrelated.id()));
    assert_eq!(universe.count(), 1);
}

#[test]
fn sibling_eviction_is_disabled_for_packages() {
    let mut universe = TxPoolUniverse::new();
    let coin = universe.confirmed_outpoint();
    let parent = universe.create_transaction(TRUC_VERSION, vec![coin], 1000);
    let child_1 =
        universe.create_transaction(TRUC_VERSION, vec![outpoint_of(&parent, 0)], 100);
    universe.insert_ok(&parent);
    universe.insert_ok(&child_1);

    // Identical fees to what a successful standalone sibling eviction needs.
    let child_2 =
        universe.create_transaction(TRUC_VERSION, vec![outpoint_of(&parent, 1)], 300);

    let outcome = universe.submit_package(vec![child_2.clone()]);
    assert!(matches!(
        outcome.package_error,
        Some(Error::Truc(TrucError::TooManyDescendants { .. }))
    ));
    assert!(universe.contains(child_1.id()));
    assert!(!universe.contains(child_2.id()));

    // The very same transaction succeeds as a standalone submission.
    let replaced = universe.insert_ok(&child_2);
    assert_eq!(replaced.len(), 1);
    assert_eq!(replaced[0].id(), child_1.id());
}

#[test]
fn evaluate_reports_without_mutating() {
    let mut universe = TxPoolUniverse::new();
    let coin = universe.confirmed_outpoint();
    let parent = universe.create_transaction(2, vec![coin], 1000);
    let child = universe.create_transaction(2, vec![outpoint_of(&parent, 0)], 1000);

    let outcome = universe.evaluate_package(vec![parent.clone(), child.clone()]);

    assert!(outcome.package_error.is_none());
    assert!(outcome
        .results
        .iter()
        .all(|(_, result)| matches!(result, Ok(TxAcceptance::Added { .. }))));
    assert_eq!(universe.count(), 0);
    assert!(!universe.contains(parent.id()));
}

#[test]
fn evaluate_matches_submit_outcome() {
    let mut universe = TxPoolUniverse::new();
    let coin = universe.confirmed_outpoint();
    let parent = universe.create_transaction(2, vec![coin], 1000);
    let child = universe.create_transaction(2, vec![outpoint_of(&parent, 0)], 1000);
    let missing = universe.unknown_outpoint();
    let broken = universe.create_transaction(2, vec![missing], 1000);
    let package = vec![parent.clone(), child.clone(), broken.clone()];

    let evaluated = universe.evaluate_package(package.clone());
    let submitted = universe.submit_package(package);

    assert_eq!(evaluated.results.len(), submitted.results.len());
    for ((eval_id, eval_result), (submit_id, submit_result)) in
        evaluated.results.iter().zip(submitted.results.iter())
    {
        assert_eq!(eval_id, submit_id);
        match (eval_result, submit_result) {
            (Ok(_), Ok(_)) => {}
            (Err(eval_error), Err(submit_error)) => {
                assert_eq!(eval_error.to_string(), submit_error.to_string());
            }
            other => panic!("evaluation and submission diverged: {:?}", other),
        }
    }
}
