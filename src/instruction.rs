use {
    crate::state::TASK_ACCOUNT_LEN,
    borsh::{BorshDeserialize, BorshSchema, BorshSerialize},
    solana_program::{
        instruction::{AccountMeta, Instruction},
        pubkey::Pubkey,
        system_instruction, sysvar,
    },
};

/// The list of instructions to the program
#[derive(Clone, Debug, PartialEq, BorshSerialize, BorshDeserialize, BorshSchema)]
pub enum TaskInstruction {
    /// Initialize the registry account, the signer becomes its owner.
    ///
    /// Accounts: [signer] owner, [writable] registry
    Initialize { verification_threshold: u64 },
    /// Create a new task with the registry's next id. The task account must be created
    /// in the same transaction, see `create_task_account`, and hold its rent plus the
    /// reward. The deadline is a slot and must be in the future.
    ///
    /// Accounts: [signer] creator, [writable] registry, [writable] task account,
    /// [] clock sysvar, [] rent sysvar
    CreateTask {
        description: String,
        reward: u64,
        deadline: u64,
    },
    /// Claim an open task.
    ///
    /// Accounts: [signer] claimant, [writable] registry, [writable] task account
    ClaimTask { task_id: u64 },
    /// Mark a claimed task as done.
    ///
    /// Accounts: [signer] claimant, [] registry, [writable] task account
    CompleteTask { task_id: u64 },
    /// Attest a completed task, the reward is paid once enough verifiers attested.
    ///
    /// Accounts: [signer] verifier, [] registry, [writable] task account,
    /// [writable] claimant
    VerifyTask { task_id: u64 },
    /// Cancel an unclaimed task, refund its reward and close its account.
    ///
    /// Accounts: [signer, writable] creator, [] registry, [writable] task account
    CancelTask { task_id: u64 },
    /// Owner only. Accounts: [signer] owner, [writable] registry
    SetVerificationThreshold(u64),
    /// Owner only. Accounts: [signer] owner, [writable] registry
    SetCreatorVerification(bool),
}

fn caller_and_registry(caller: &Pubkey, registry: &Pubkey) -> Vec<AccountMeta> {
    vec![
        AccountMeta::new_readonly(*caller, true),
        AccountMeta::new(*registry, false),
    ]
}

fn task_accounts(caller: AccountMeta, registry: AccountMeta, task: &Pubkey) -> Vec<AccountMeta> {
    vec![caller, registry, AccountMeta::new(*task, false)]
}

pub fn initialize(
    program_id: &Pubkey,
    owner: &Pubkey,
    registry: &Pubkey,
    verification_threshold: u64,
) -> Instruction {
    Instruction::new_with_bytes(
        *program_id,
        &TaskInstruction::Initialize {
            verification_threshold,
        }.try_to_vec().unwrap(),
        caller_and_registry(owner, registry),
    )
}

/// Create the account a new task lives in, owned by the program and funded with
/// `lamports`, the rent for `TASK_ACCOUNT_LEN` bytes plus the reward.
pub fn create_task_account(
    program_id: &Pubkey,
    creator: &Pubkey,
    task: &Pubkey,
    lamports: u64,
) -> Instruction {
    system_instruction::create_account(
        creator,
        task,
        lamports,
        TASK_ACCOUNT_LEN as u64,
        program_id,
    )
}

pub fn create_task(
    program_id: &Pubkey,
    creator: &Pubkey,
    registry: &Pubkey,
    task: &Pubkey,
    description: String,
    reward: u64,
    deadline: u64,
) -> Instruction {
    let mut accounts = task_accounts(
        AccountMeta::new_readonly(*creator, true),
        AccountMeta::new(*registry, false),
        task,
    );
    accounts.push(AccountMeta::new_readonly(sysvar::clock::id(), false));
    accounts.push(AccountMeta::new_readonly(sysvar::rent::id(), false));
    Instruction::new_with_bytes(
        *program_id,
        &TaskInstruction::CreateTask {
            description,
            reward,
            deadline,
        }.try_to_vec().unwrap(),
        accounts,
    )
}

pub fn claim_task(
    program_id: &Pubkey,
    claimant: &Pubkey,
    registry: &Pubkey,
    task: &Pubkey,
    task_id: u64,
) -> Instruction {
    Instruction::new_with_bytes(
        *program_id,
        &TaskInstruction::ClaimTask { task_id }.try_to_vec().unwrap(),
        task_accounts(
            AccountMeta::new_readonly(*claimant, true),
            AccountMeta::new(*registry, false),
            task,
        ),
    )
}

pub fn complete_task(
    program_id: &Pubkey,
    claimant: &Pubkey,
    registry: &Pubkey,
    task: &Pubkey,
    task_id: u64,
) -> Instruction {
    Instruction::new_with_bytes(
        *program_id,
        &TaskInstruction::CompleteTask { task_id }.try_to_vec().unwrap(),
        task_accounts(
            AccountMeta::new_readonly(*claimant, true),
            AccountMeta::new_readonly(*registry, false),
            task,
        ),
    )
}

pub fn verify_task(
    program_id: &Pubkey,
    verifier: &Pubkey,
    registry: &Pubkey,
    task: &Pubkey,
    claimant: &Pubkey,
    task_id: u64,
) -> Instruction {
    let mut accounts = task_accounts(
        AccountMeta::new_readonly(*verifier, true),
        AccountMeta::new_readonly(*registry, false),
        task,
    );
    accounts.push(AccountMeta::new(*claimant, false));
    Instruction::new_with_bytes(
        *program_id,
        &TaskInstruction::VerifyTask { task_id }.try_to_vec().unwrap(),
        accounts,
    )
}

pub fn cancel_task(
    program_id: &Pubkey,
    creator: &Pubkey,
    registry: &Pubkey,
    task: &Pubkey,
    task_id: u64,
) -> Instruction {
    Instruction::new_with_bytes(
        *program_id,
        &TaskInstruction::CancelTask { task_id }.try_to_vec().unwrap(),
        task_accounts(
            AccountMeta::new(*creator, true),
            AccountMeta::new_readonly(*registry, false),
            task,
        ),
    )
}

pub fn set_verification_threshold(
    program_id: &Pubkey,
    owner: &Pubkey,
    registry: &Pubkey,
    value: u64,
) -> Instruction {
    Instruction::new_with_bytes(
        *program_id,
        &TaskInstruction::SetVerificationThreshold(value).try_to_vec().unwrap(),
        caller_and_registry(owner, registry),
    )
}

pub fn set_creator_verification(
    program_id: &Pubkey,
    owner: &Pubkey,
    registry: &Pubkey,
    allowed: bool,
) -> Instruction {
    Instruction::new_with_bytes(
        *program_id,
        &TaskInstruction::SetCreatorVerification(allowed).try_to_vec().unwrap(),
        caller_and_registry(owner, registry),
    )
}
