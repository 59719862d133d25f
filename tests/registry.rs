use {
    solana_program::pubkey::Pubkey,
    task_bounty::{
        error::TaskError,
        escrow::{Escrow, EscrowState},
        policy::{DEFAULT_VERIFICATION_THRESHOLD, MAX_VERIFICATION_THRESHOLD},
        state::{
            Registry, RegistryState, Task, TaskAccount, TaskStatus, MAX_DESCRIPTION_LEN,
            MAX_VERIFIERS,
        },
    },
};

const DESCRIPTION: &str = "Test task";
const REWARD: u64 = 100_000_000;
const DEADLINE: u64 = 100;
const HEIGHT: u64 = 1;

struct Wallets {
    deployer: Pubkey,
    wallet1: Pubkey,
    wallet2: Pubkey,
    wallet3: Pubkey,
    wallet4: Pubkey,
}

fn setup() -> (Registry, Wallets) {
    let wallets = Wallets {
        deployer: Pubkey::new_unique(),
        wallet1: Pubkey::new_unique(),
        wallet2: Pubkey::new_unique(),
        wallet3: Pubkey::new_unique(),
        wallet4: Pubkey::new_unique(),
    };
    let mut registry = Registry::new(wallets.deployer, DEFAULT_VERIFICATION_THRESHOLD).unwrap();
    registry.ledger.deposit(&wallets.wallet1, 10 * REWARD).unwrap();
    (registry, wallets)
}

fn setup_with_task() -> (Registry, Wallets) {
    let (mut registry, wallets) = setup();
    let task_id = registry
        .create_task(HEIGHT, &wallets.wallet1, DESCRIPTION.to_string(), REWARD, DEADLINE)
        .unwrap();
    assert_eq!(task_id, 0);
    (registry, wallets)
}

fn setup_with_completed_task() -> (Registry, Wallets) {
    let (mut registry, wallets) = setup_with_task();
    registry.claim_task(0, &wallets.wallet2).unwrap();
    registry.complete_task(0, &wallets.wallet2).unwrap();
    (registry, wallets)
}

#[test]
fn test_create_task() {
    let (registry, wallets) = setup_with_task();

    let task = registry.get_task(0).unwrap();
    assert_eq!(task.creator, wallets.wallet1);
    assert_eq!(task.description, DESCRIPTION);
    assert_eq!(task.reward, REWARD);
    assert_eq!(task.deadline, DEADLINE);
    assert_eq!(task.claimed_by, None);
    assert!(!task.completed);
    assert_eq!(task.verified_count, 0);
    assert_eq!(task.status, TaskStatus::Open);

    assert_eq!(registry.balance_of(&wallets.wallet1), 9 * REWARD);
    assert_eq!(registry.total_locked(), u128::from(REWARD));
    assert_eq!(registry.get_user_created_tasks(&wallets.wallet1), &[0]);
}

#[test]
fn test_create_task_insufficient_balance() {
    let (mut registry, wallets) = setup();

    let result = registry.create_task(
        HEIGHT,
        &wallets.wallet1,
        DESCRIPTION.to_string(),
        1_000_000_000_000,
        DEADLINE,
    );
    assert_eq!(result, Err(TaskError::InsufficientBalance));
    assert_eq!(registry.balance_of(&wallets.wallet1), 10 * REWARD);
    assert_eq!(registry.total_locked(), 0);
    assert_eq!(registry.next_task_id, 0);
    assert!(registry.get_user_created_tasks(&wallets.wallet1).is_empty());
}

#[test]
fn test_create_task_past_deadline() {
    let (mut registry, wallets) = setup();

    for height in &[200, DEADLINE] {
        let result = registry.create_task(
            *height,
            &wallets.wallet1,
            DESCRIPTION.to_string(),
            REWARD,
            DEADLINE,
        );
        assert_eq!(result, Err(TaskError::PastDeadline));
    }
    assert_eq!(registry.balance_of(&wallets.wallet1), 10 * REWARD);
    assert_eq!(registry.total_locked(), 0);
    assert!(registry.list_tasks().is_empty());
}

#[test]
fn test_create_task_description_too_long() {
    let (mut registry, wallets) = setup();

    let description = "x".repeat(MAX_DESCRIPTION_LEN + 1);
    let result = registry.create_task(HEIGHT, &wallets.wallet1, description, REWARD, DEADLINE);
    assert_eq!(result, Err(TaskError::DescriptionTooLong));

    let description = "x".repeat(MAX_DESCRIPTION_LEN);
    let result = registry.create_task(HEIGHT, &wallets.wallet1, description, REWARD, DEADLINE);
    assert_eq!(result, Ok(0));
}

#[test]
fn test_uninitialized_registry_rejects_tasks() {
    let mut registry = Registry::default();
    let creator = Pubkey::new_unique();

    let result = registry.create_task(HEIGHT, &creator, DESCRIPTION.to_string(), 0, DEADLINE);
    assert_eq!(result, Err(TaskError::Uninitialized));
}

#[test]
fn test_task_ids_are_never_reused() {
    let (mut registry, wallets) = setup();

    let create = |registry: &mut Registry| {
        registry
            .create_task(HEIGHT, &wallets.wallet1, DESCRIPTION.to_string(), REWARD, DEADLINE)
            .unwrap()
    };
    assert_eq!(create(&mut registry), 0);
    assert_eq!(create(&mut registry), 1);
    registry.cancel_task(1, &wallets.wallet1).unwrap();
    assert_eq!(create(&mut registry), 2);
    registry.cancel_task(0, &wallets.wallet1).unwrap();
    assert_eq!(create(&mut registry), 3);

    let ids: Vec<u64> = registry.list_tasks().iter().map(|task| task.task_id).collect();
    assert_eq!(ids, vec![2, 3]);
    assert_eq!(registry.get_user_created_tasks(&wallets.wallet1), &[2, 3]);
}

#[test]
fn test_claim_task() {
    let (mut registry, wallets) = setup_with_task();

    assert_eq!(registry.claim_task(7, &wallets.wallet2), Err(TaskError::NotFound));
    assert_eq!(registry.claim_task(0, &wallets.wallet1), Err(TaskError::OwnerOnly));

    registry.claim_task(0, &wallets.wallet2).unwrap();
    let task = registry.get_task(0).unwrap();
    assert_eq!(task.claimed_by, Some(wallets.wallet2));
    assert_eq!(task.status, TaskStatus::Claimed);
    assert_eq!(registry.get_user_claimed_tasks(&wallets.wallet2), &[0]);

    assert_eq!(
        registry.claim_task(0, &wallets.wallet3),
        Err(TaskError::AlreadyClaimed)
    );
    assert_eq!(registry.get_task(0).unwrap().claimed_by, Some(wallets.wallet2));
    assert!(registry.get_user_claimed_tasks(&wallets.wallet3).is_empty());
}

#[test]
fn test_complete_task() {
    let (mut registry, wallets) = setup_with_task();

    assert_eq!(
        registry.complete_task(0, &wallets.wallet3),
        Err(TaskError::NotClaimant)
    );
    registry.claim_task(0, &wallets.wallet2).unwrap();
    assert_eq!(
        registry.complete_task(0, &wallets.wallet3),
        Err(TaskError::NotClaimant)
    );

    registry.complete_task(0, &wallets.wallet2).unwrap();
    let task = registry.get_task(0).unwrap();
    assert!(task.completed);
    assert_eq!(task.status, TaskStatus::Completed);

    assert_eq!(
        registry.complete_task(0, &wallets.wallet2),
        Err(TaskError::AlreadyCompleted)
    );
    assert_eq!(registry.complete_task(9, &wallets.wallet2), Err(TaskError::NotFound));
}

#[test]
fn test_verify_task() {
    let (mut registry, wallets) = setup_with_completed_task();

    assert_eq!(registry.verify_task(0, &wallets.wallet3), Ok(true));
    let task = registry.get_task(0).unwrap();
    assert_eq!(task.verified_count, 1);
    assert_eq!(task.verifiers, vec![wallets.wallet3]);
    assert_eq!(task.status, TaskStatus::Completed);

    assert_eq!(
        registry.verify_task(0, &wallets.wallet3),
        Err(TaskError::AlreadyVerified)
    );
    assert_eq!(
        registry.verify_task(0, &wallets.wallet2),
        Err(TaskError::NotClaimant)
    );
    assert_eq!(registry.get_task(0).unwrap().verified_count, 1);
}

#[test]
fn test_verify_requires_completion() {
    let (mut registry, wallets) = setup_with_task();

    assert_eq!(
        registry.verify_task(0, &wallets.wallet3),
        Err(TaskError::NotCompleted)
    );
    registry.claim_task(0, &wallets.wallet2).unwrap();
    assert_eq!(
        registry.verify_task(0, &wallets.wallet3),
        Err(TaskError::NotCompleted)
    );
    assert_eq!(registry.verify_task(4, &wallets.wallet3), Err(TaskError::NotFound));
}

#[test]
fn test_reward_distributed_at_threshold() {
    let (mut registry, wallets) = setup_with_completed_task();
    let initial_balance = registry.balance_of(&wallets.wallet2);

    registry.verify_task(0, &wallets.wallet3).unwrap();
    registry.verify_task(0, &wallets.wallet4).unwrap();
    assert_eq!(registry.balance_of(&wallets.wallet2), initial_balance);

    assert_eq!(registry.verify_task(0, &wallets.wallet1), Ok(true));
    assert_eq!(registry.balance_of(&wallets.wallet2), initial_balance + REWARD);
    assert_eq!(registry.total_locked(), 0);
    let task = registry.get_task(0).unwrap();
    assert_eq!(task.status, TaskStatus::Rewarded);
    assert_eq!(task.verified_count, 3);

    // later verifications are accepted without being recorded or paying again
    let late = Pubkey::new_unique();
    assert_eq!(registry.verify_task(0, &late), Ok(true));
    assert_eq!(registry.verify_task(0, &wallets.wallet3), Ok(true));
    assert_eq!(registry.balance_of(&wallets.wallet2), initial_balance + REWARD);
    let task = registry.get_task(0).unwrap();
    assert_eq!(task.verified_count, 3);
    assert_eq!(task.status, TaskStatus::Rewarded);
    assert_eq!(
        registry.verify_task(0, &wallets.wallet2),
        Err(TaskError::NotClaimant)
    );
}

#[test]
fn test_creator_verification_policy() {
    let (mut registry, wallets) = setup_with_completed_task();

    assert_eq!(
        registry.set_creator_verification(&wallets.wallet1, false),
        Err(TaskError::OwnerOnly)
    );
    registry
        .set_creator_verification(&wallets.deployer, false)
        .unwrap();
    assert_eq!(
        registry.verify_task(0, &wallets.wallet1),
        Err(TaskError::OwnerOnly)
    );
    assert_eq!(registry.get_task(0).unwrap().verified_count, 0);

    registry
        .set_creator_verification(&wallets.deployer, true)
        .unwrap();
    assert_eq!(registry.verify_task(0, &wallets.wallet1), Ok(true));
}

#[test]
fn test_threshold_change_applies_to_open_verification() {
    let (mut registry, wallets) = setup_with_completed_task();

    registry.verify_task(0, &wallets.wallet3).unwrap();
    registry.verify_task(0, &wallets.wallet4).unwrap();
    registry
        .set_verification_threshold(&wallets.deployer, 5)
        .unwrap();
    registry.verify_task(0, &wallets.wallet1).unwrap();
    assert_eq!(registry.get_task(0).unwrap().status, TaskStatus::Completed);

    // lowering the threshold pays on the next verification, not retroactively
    registry
        .set_verification_threshold(&wallets.deployer, 2)
        .unwrap();
    assert_eq!(registry.get_task(0).unwrap().status, TaskStatus::Completed);
    assert_eq!(registry.balance_of(&wallets.wallet2), 0);

    registry.verify_task(0, &wallets.deployer).unwrap();
    assert_eq!(registry.get_task(0).unwrap().status, TaskStatus::Rewarded);
    assert_eq!(registry.balance_of(&wallets.wallet2), REWARD);
}

#[test]
fn test_cancel_task() {
    let (mut registry, wallets) = setup_with_task();

    let task = registry.cancel_task(0, &wallets.wallet1).unwrap();
    assert_eq!(task.status, TaskStatus::Cancelled);
    assert_eq!(task.reward, REWARD);
    assert_eq!(registry.get_task(0), None);
    assert_eq!(registry.balance_of(&wallets.wallet1), 10 * REWARD);
    assert_eq!(registry.total_locked(), 0);
    assert!(registry.get_user_created_tasks(&wallets.wallet1).is_empty());
    assert_eq!(registry.cancel_task(0, &wallets.wallet1), Err(TaskError::NotFound));
}

#[test]
fn test_cancel_claimed_task() {
    let (mut registry, wallets) = setup_with_task();
    registry.claim_task(0, &wallets.wallet2).unwrap();

    assert_eq!(
        registry.cancel_task(0, &wallets.wallet1),
        Err(TaskError::AlreadyClaimed)
    );
    assert!(registry.get_task(0).is_some());
    assert_eq!(registry.total_locked(), u128::from(REWARD));
}

#[test]
fn test_cancel_task_by_non_owner() {
    let (mut registry, wallets) = setup_with_task();

    assert_eq!(
        registry.cancel_task(0, &wallets.wallet2),
        Err(TaskError::OwnerOnly)
    );
    assert!(registry.get_task(0).is_some());
}

#[test]
fn test_cancel_rewarded_task_keeps_payout() {
    let (mut registry, wallets) = setup_with_completed_task();
    for verifier in &[wallets.wallet3, wallets.wallet4, wallets.deployer] {
        registry.verify_task(0, verifier).unwrap();
    }

    assert_eq!(
        registry.cancel_task(0, &wallets.wallet1),
        Err(TaskError::AlreadyClaimed)
    );
    assert_eq!(
        registry.tasks[&0].escrow.state,
        EscrowState::Released(wallets.wallet2)
    );
    assert_eq!(registry.balance_of(&wallets.wallet2), REWARD);
}

#[test]
fn test_set_verification_threshold() {
    let (mut registry, wallets) = setup();
    assert_eq!(
        registry.get_verification_threshold(),
        DEFAULT_VERIFICATION_THRESHOLD
    );

    assert_eq!(
        registry.set_verification_threshold(&wallets.wallet1, 5),
        Err(TaskError::OwnerOnly)
    );
    assert_eq!(
        registry.set_verification_threshold(&wallets.deployer, 0),
        Err(TaskError::InvalidThreshold)
    );
    assert_eq!(
        registry.set_verification_threshold(&wallets.deployer, MAX_VERIFICATION_THRESHOLD + 1),
        Err(TaskError::InvalidThreshold)
    );
    registry
        .set_verification_threshold(&wallets.deployer, 5)
        .unwrap();
    assert_eq!(registry.get_verification_threshold(), 5);
}

#[test]
fn test_verifier_list_stays_within_task_account() {
    let (mut registry, wallets) = setup_with_completed_task();
    registry
        .set_verification_threshold(&wallets.deployer, MAX_VERIFICATION_THRESHOLD)
        .unwrap();

    let verifiers: Vec<Pubkey> = (0..MAX_VERIFIERS + 8).map(|_| Pubkey::new_unique()).collect();
    for verifier in &verifiers[..MAX_VERIFIERS - 1] {
        registry.verify_task(0, verifier).unwrap();
    }
    assert_eq!(registry.get_task(0).unwrap().status, TaskStatus::Completed);
    assert_eq!(registry.balance_of(&wallets.wallet2), 0);

    // the verification that fills the list pays out, later ones are not recorded
    for verifier in &verifiers[MAX_VERIFIERS - 1..] {
        assert_eq!(registry.verify_task(0, verifier), Ok(true));
    }
    let task = registry.get_task(0).unwrap();
    assert_eq!(task.status, TaskStatus::Rewarded);
    assert_eq!(task.verified_count, MAX_VERIFIERS as u64);
    assert_eq!(registry.balance_of(&wallets.wallet2), REWARD);
    assert_eq!(registry.total_locked(), 0);
}

#[test]
fn test_registry_rebuilds_from_accounts() {
    let owner = Pubkey::new_unique();
    let creator = Pubkey::new_unique();
    let claimant = Pubkey::new_unique();
    let mut state = RegistryState::new(owner, 2).unwrap();
    state.next_task_id = 3;
    state.next_claim_seq = 2;

    let account = |task_id: u64, claim_seq: Option<u64>| {
        let mut task = Task::new(
            &creator,
            DESCRIPTION.to_string(),
            DEADLINE,
            Escrow::lock(&creator, REWARD),
        );
        if claim_seq.is_some() {
            task.claim(&claimant).unwrap();
        }
        TaskAccount {
            is_initialized: true,
            registry: Pubkey::new_unique(),
            task_id,
            claim_seq,
            task,
        }
    };
    let mut closed = account(1, None);
    closed.is_initialized = false;

    // task 2 was claimed before task 0
    let accounts = vec![account(2, Some(0)), closed, account(0, Some(1))];
    let registry = Registry::from_accounts(&state, accounts);

    assert!(registry.is_initialized);
    assert_eq!(registry.get_verification_threshold(), 2);
    assert_eq!(registry.next_task_id, 3);
    let ids: Vec<u64> = registry.list_tasks().iter().map(|task| task.task_id).collect();
    assert_eq!(ids, vec![0, 2]);
    assert_eq!(registry.get_user_created_tasks(&creator), &[0, 2]);
    assert_eq!(registry.get_user_claimed_tasks(&claimant), &[2, 0]);
    assert_eq!(registry.total_locked(), u128::from(2 * REWARD));
}
