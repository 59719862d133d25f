use {
    crate::{
        error::TaskError,
        escrow::{Escrow, EscrowLedger, ESCROW_LEN},
        index::UserIndex,
        policy::{AdminPolicy, ADMIN_POLICY_LEN, MAX_VERIFICATION_THRESHOLD},
    },
    borsh::{BorshDeserialize, BorshSchema, BorshSerialize},
    serde_derive::{Deserialize, Serialize},
    solana_program::{borsh::try_from_slice_unchecked, program_error::ProgramError, pubkey::Pubkey},
    std::collections::BTreeMap,
};

/// Longest accepted task description, in bytes
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Most verifiers a task can record, see `Task::verify`
pub const MAX_VERIFIERS: usize = MAX_VERIFICATION_THRESHOLD as usize;

/// Encoded size of a `Task` with the longest description and a full verifier list
pub const TASK_LEN: usize = 32 // creator
    + (4 + MAX_DESCRIPTION_LEN) // description
    + 8 // reward
    + 8 // deadline
    + (1 + 32) // claimed_by
    + 1 // completed
    + (4 + 32 * MAX_VERIFIERS) // verifiers
    + 1 // status
    + ESCROW_LEN;

/// Size of a task account, fixed when the account is created
pub const TASK_ACCOUNT_LEN: usize = 1 + 32 + 8 + (1 + 8) + TASK_LEN;

/// Size of the registry account
pub const REGISTRY_STATE_LEN: usize = 1 + ADMIN_POLICY_LEN + 8 + 8;

/**
Lifecycle of a task.

Open : The task accepts a claimant. Only in this state can the creator cancel it, which removes
the task from the registry and refunds the reward.

Claimed : A claimant has accepted the task; only the claimant can mark it completed.

Completed : The claimant reports the work done, verifiers may now attest it.

Rewarded : Enough verifiers attested the work and the escrowed reward was paid to the claimant.

Cancelled : The creator withdrew the task. Cancelled tasks are dropped from the registry, this
status is only seen on the snapshot returned by the cancellation.
*/
#[derive(
    Clone, Copy, Debug, BorshSerialize, BorshDeserialize, BorshSchema, PartialEq, Eq, Serialize,
    Deserialize,
)]
pub enum TaskStatus {
    Open,
    Claimed,
    Completed,
    Rewarded,
    Cancelled,
}

#[derive(Clone, Debug, BorshSerialize, BorshDeserialize, PartialEq)]
pub struct Task {
    /// The account that created the task and funded the reward
    pub creator: Pubkey,
    pub description: String,
    /// The escrowed reward
    pub reward: u64,
    /// Block height the task was posted against
    pub deadline: u64,
    /// Set once, when the task is claimed
    pub claimed_by: Option<Pubkey>,
    pub completed: bool,
    /// Accounts that attested the work, in order, without duplicates
    pub verifiers: Vec<Pubkey>,
    pub status: TaskStatus,
    pub escrow: Escrow,
}

/// Read-only snapshot of a task handed to clients
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskView {
    pub task_id: u64,
    pub creator: Pubkey,
    pub description: String,
    pub reward: u64,
    pub deadline: u64,
    pub claimed_by: Option<Pubkey>,
    pub completed: bool,
    pub verified_count: u64,
    pub verifiers: Vec<Pubkey>,
    pub status: TaskStatus,
}

impl TaskView {
    pub fn new(task_id: u64, task: &Task) -> Self {
        Self {
            task_id,
            creator: task.creator,
            description: task.description.clone(),
            reward: task.reward,
            deadline: task.deadline,
            claimed_by: task.claimed_by,
            completed: task.completed,
            verified_count: task.verified_count(),
            verifiers: task.verifiers.clone(),
            status: task.status,
        }
    }
}

/**
Contents of the registry account: the admin policy and the id counters. It never grows,
every task lives in its own account. An all-zero account decodes as an uninitialized
registry.
*/
#[derive(Clone, Debug, Default, BorshSerialize, BorshDeserialize, PartialEq)]
pub struct RegistryState {
    pub is_initialized: bool,
    pub policy: AdminPolicy,
    /// Never decremented, ids are not reused after cancellation
    pub next_task_id: u64,
    /// Orders claims so the claimant index keeps insertion order
    pub next_claim_seq: u64,
}

impl RegistryState {
    pub fn new(owner: Pubkey, verification_threshold: u64) -> Result<Self, TaskError> {
        Ok(Self {
            is_initialized: true,
            policy: AdminPolicy::new(owner, verification_threshold)?,
            ..Self::default()
        })
    }

    pub fn unpack(data: &[u8]) -> Result<Self, ProgramError> {
        Ok(try_from_slice_unchecked::<RegistryState>(data)?)
    }

    pub fn ensure_initialized(&self) -> Result<(), TaskError> {
        if !self.is_initialized {
            return Err(TaskError::Uninitialized);
        }
        Ok(())
    }
}

/**
Contents of a task account. The account is created by the client for the program in the
same transaction as `CreateTask`, funded with its rent plus the reward, and holds the
reward as lamports until it is paid out. Cancelling the task closes the account.
*/
#[derive(Clone, Debug, BorshSerialize, BorshDeserialize, PartialEq)]
pub struct TaskAccount {
    pub is_initialized: bool,
    /// The registry the task was created in
    pub registry: Pubkey,
    pub task_id: u64,
    /// Position of the claim among all claims of the registry
    pub claim_seq: Option<u64>,
    pub task: Task,
}

impl TaskAccount {
    pub fn unpack(data: &[u8]) -> Result<Self, ProgramError> {
        Ok(try_from_slice_unchecked::<TaskAccount>(data)?)
    }
}

/**
The whole registry held in memory: every live task, the admin policy, available balances
and the per-user indices. Operations on it have the same rules as the program and a
rejected call leaves it unchanged. Clients rebuild it from the registry and task accounts
with `Registry::from_accounts`.
*/
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Registry {
    pub is_initialized: bool,
    pub policy: AdminPolicy,
    pub next_task_id: u64,
    pub tasks: BTreeMap<u64, Task>,
    pub ledger: EscrowLedger,
    pub index: UserIndex,
}

impl Registry {
    pub fn new(owner: Pubkey, verification_threshold: u64) -> Result<Self, TaskError> {
        Ok(Self {
            is_initialized: true,
            policy: AdminPolicy::new(owner, verification_threshold)?,
            ..Self::default()
        })
    }

    /// Rebuild the registry from the registry account and the live task accounts.
    /// Balances are not part of the accounts and start empty.
    pub fn from_accounts<I>(state: &RegistryState, accounts: I) -> Self
    where
        I: IntoIterator<Item = TaskAccount>,
    {
        let mut accounts: Vec<TaskAccount> = accounts
            .into_iter()
            .filter(|account| account.is_initialized)
            .collect();
        accounts.sort_by_key(|account| account.task_id);

        let mut index = UserIndex::default();
        for account in &accounts {
            index.record_created(&account.task.creator, account.task_id);
        }
        let mut claims: Vec<(u64, Pubkey, u64)> = accounts
            .iter()
            .filter_map(|account| {
                Some((account.claim_seq?, account.task.claimed_by?, account.task_id))
            })
            .collect();
        claims.sort_unstable();
        for (_, claimant, task_id) in claims {
            index.record_claimed(&claimant, task_id);
        }

        Self {
            is_initialized: state.is_initialized,
            policy: state.policy.clone(),
            next_task_id: state.next_task_id,
            tasks: accounts
                .into_iter()
                .map(|account| (account.task_id, account.task))
                .collect(),
            ledger: EscrowLedger::default(),
            index,
        }
    }

    /// Sum of all rewards still held in escrow
    pub fn total_locked(&self) -> u128 {
        self.tasks
            .values()
            .filter(|task| task.escrow.is_locked())
            .map(|task| u128::from(task.escrow.amount))
            .sum()
    }
}
