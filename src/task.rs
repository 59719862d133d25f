use {
    crate::{
        error::TaskError,
        escrow::Escrow,
        state::{Task, TaskStatus, MAX_DESCRIPTION_LEN},
    },
    solana_program::{msg, pubkey::Pubkey},
};

/// Transitions of a single task. Each checks its preconditions before changing
/// anything, so a rejected call leaves the task as it was.
impl Task {
    /// Check the arguments of a new task. The deadline must lie strictly after
    /// `current_height`; it is not checked again later.
    pub fn check_new(
        current_height: u64,
        description: &str,
        deadline: u64,
    ) -> Result<(), TaskError> {
        if description.len() > MAX_DESCRIPTION_LEN {
            msg!(
                "Description is {} bytes, at most {} allowed",
                description.len(),
                MAX_DESCRIPTION_LEN
            );
            return Err(TaskError::DescriptionTooLong);
        }
        if deadline <= current_height {
            msg!("Deadline {} is not after height {}", deadline, current_height);
            return Err(TaskError::PastDeadline);
        }
        Ok(())
    }

    /// An open task holding `escrow` as its reward
    pub fn new(creator: &Pubkey, description: String, deadline: u64, escrow: Escrow) -> Self {
        Self {
            creator: *creator,
            description,
            reward: escrow.amount,
            deadline,
            claimed_by: None,
            completed: false,
            verifiers: Vec::new(),
            status: TaskStatus::Open,
            escrow,
        }
    }

    pub fn verified_count(&self) -> u64 {
        self.verifiers.len() as u64
    }

    pub fn has_verified(&self, account: &Pubkey) -> bool {
        self.verifiers.contains(account)
    }

    pub fn claim(&mut self, claimant: &Pubkey) -> Result<(), TaskError> {
        if self.status != TaskStatus::Open {
            return Err(TaskError::AlreadyClaimed);
        }
        if self.creator == *claimant {
            msg!("The creator cannot claim their own task");
            return Err(TaskError::OwnerOnly);
        }
        self.claimed_by = Some(*claimant);
        self.status = TaskStatus::Claimed;
        Ok(())
    }

    pub fn complete(&mut self, caller: &Pubkey) -> Result<(), TaskError> {
        if self.claimed_by != Some(*caller) {
            return Err(TaskError::NotClaimant);
        }
        if self.completed {
            return Err(TaskError::AlreadyCompleted);
        }
        self.completed = true;
        self.status = TaskStatus::Completed;
        Ok(())
    }

    /// Refund an unclaimed task to its creator, returning the amount to move back.
    pub fn cancel(&mut self, caller: &Pubkey) -> Result<u64, TaskError> {
        if self.creator != *caller {
            return Err(TaskError::OwnerOnly);
        }
        if self.status != TaskStatus::Open {
            return Err(TaskError::AlreadyClaimed);
        }
        let amount = self.escrow.refund()?;
        self.status = TaskStatus::Cancelled;
        Ok(amount)
    }
}
