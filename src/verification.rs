use {
    crate::{
        error::TaskError,
        policy::AdminPolicy,
        state::{Registry, Task, TaskStatus},
    },
    solana_program::{msg, pubkey::Pubkey},
};

impl Task {
    /**
    Record `caller` as a verifier of a completed task, returning the reward to pay out
    when this verification released it.

    The claimant can never verify their own work; the creator can unless the admin policy
    bars it. The verification that brings the count up to the threshold releases the
    escrow to the claimant and moves the task to `Rewarded`. The payout only happens on the
    `Completed -> Rewarded` transition, so it fires once per task. Lowering the threshold
    takes effect on the next accepted verification: a task that already holds enough
    verifications is paid then, never retroactively.

    Once rewarded, every further verification is accepted as a no-op and nothing is
    recorded. Together with the threshold cap this keeps the verifier list within
    `MAX_VERIFIERS`.
    */
    pub fn verify(
        &mut self,
        caller: &Pubkey,
        policy: &AdminPolicy,
    ) -> Result<Option<u64>, TaskError> {
        match self.status {
            TaskStatus::Completed | TaskStatus::Rewarded => {}
            _ => return Err(TaskError::NotCompleted),
        }
        let claimant = self.claimed_by.ok_or(TaskError::NotCompleted)?;
        if claimant == *caller {
            msg!("The claimant cannot verify their own task");
            return Err(TaskError::NotClaimant);
        }
        if self.creator == *caller && !policy.creator_can_verify() {
            msg!("The creator is not allowed to verify their own task");
            return Err(TaskError::OwnerOnly);
        }
        if self.status == TaskStatus::Rewarded {
            return Ok(None);
        }
        if self.has_verified(caller) {
            return Err(TaskError::AlreadyVerified);
        }

        let verified_count = self.verified_count() + 1;
        if verified_count < policy.verification_threshold() {
            self.verifiers.push(*caller);
            return Ok(None);
        }
        let amount = self.escrow.release(&claimant)?;
        self.verifiers.push(*caller);
        self.status = TaskStatus::Rewarded;
        msg!("Task rewarded after {} verifications", verified_count);
        Ok(Some(amount))
    }
}

impl Registry {
    /// Verify a task held in memory, crediting the claimant's available balance on
    /// payout. See `Task::verify` for the rules.
    pub fn verify_task(&mut self, task_id: u64, caller: &Pubkey) -> Result<bool, TaskError> {
        let mut task = self.task(task_id)?.clone();
        if let Some(amount) = task.verify(caller, &self.policy)? {
            let claimant = task.claimed_by.ok_or(TaskError::NotCompleted)?;
            self.ledger.deposit(&claimant, amount)?;
        }
        self.tasks.insert(task_id, task);
        Ok(true)
    }
}
