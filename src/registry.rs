use {
    crate::{
        error::TaskError,
        state::{Registry, Task, TaskView},
    },
    solana_program::pubkey::Pubkey,
};

/// Task lifecycle operations on a registry held in memory. Each one checks every
/// precondition before it touches the ledger, the task table or the indices, so a
/// rejected call leaves the registry unchanged.
impl Registry {
    /// Post a new task, escrowing `reward` from the creator's available balance.
    pub fn create_task(
        &mut self,
        current_height: u64,
        creator: &Pubkey,
        description: String,
        reward: u64,
        deadline: u64,
    ) -> Result<u64, TaskError> {
        self.ensure_initialized()?;
        Task::check_new(current_height, &description, deadline)?;
        let task_id = self.next_task_id;
        let next_task_id = task_id
            .checked_add(1)
            .ok_or(TaskError::ArithmeticOverflow)?;

        let escrow = self.ledger.reserve(creator, reward)?;
        self.tasks.insert(task_id, Task::new(creator, description, deadline, escrow));
        self.next_task_id = next_task_id;
        self.index.record_created(creator, task_id);
        Ok(task_id)
    }

    pub fn claim_task(&mut self, task_id: u64, claimant: &Pubkey) -> Result<(), TaskError> {
        self.task_mut(task_id)?.claim(claimant)?;
        self.index.record_claimed(claimant, task_id);
        Ok(())
    }

    pub fn complete_task(&mut self, task_id: u64, caller: &Pubkey) -> Result<(), TaskError> {
        self.task_mut(task_id)?.complete(caller)
    }

    /// Withdraw an unclaimed task. The reward goes back to the creator and the
    /// task is removed; the returned snapshot is the last view of it.
    pub fn cancel_task(&mut self, task_id: u64, caller: &Pubkey) -> Result<TaskView, TaskError> {
        let mut task = self.task(task_id)?.clone();
        let amount = task.cancel(caller)?;
        self.ledger.deposit(&task.escrow.payer, amount)?;
        self.tasks.remove(&task_id);
        self.index.forget_created(caller, task_id);
        Ok(TaskView::new(task_id, &task))
    }

    pub fn get_task(&self, task_id: u64) -> Option<TaskView> {
        self.tasks
            .get(&task_id)
            .map(|task| TaskView::new(task_id, task))
    }

    /// Every live task in id order
    pub fn list_tasks(&self) -> Vec<TaskView> {
        self.tasks
            .iter()
            .map(|(task_id, task)| TaskView::new(*task_id, task))
            .collect()
    }

    pub fn get_user_created_tasks(&self, creator: &Pubkey) -> &[u64] {
        self.index.created_by(creator)
    }

    pub fn get_user_claimed_tasks(&self, claimant: &Pubkey) -> &[u64] {
        self.index.claimed_by(claimant)
    }

    pub fn get_verification_threshold(&self) -> u64 {
        self.policy.verification_threshold()
    }

    pub fn set_verification_threshold(
        &mut self,
        caller: &Pubkey,
        value: u64,
    ) -> Result<(), TaskError> {
        self.ensure_initialized()?;
        self.policy.set_verification_threshold(caller, value)
    }

    pub fn set_creator_verification(
        &mut self,
        caller: &Pubkey,
        allowed: bool,
    ) -> Result<(), TaskError> {
        self.ensure_initialized()?;
        self.policy.set_creator_verification(caller, allowed)
    }

    pub fn balance_of(&self, owner: &Pubkey) -> u64 {
        self.ledger.balance_of(owner)
    }

    pub fn ensure_initialized(&self) -> Result<(), TaskError> {
        if !self.is_initialized {
            return Err(TaskError::Uninitialized);
        }
        Ok(())
    }

    pub(crate) fn task(&self, task_id: u64) -> Result<&Task, TaskError> {
        self.tasks.get(&task_id).ok_or(TaskError::NotFound)
    }

    pub(crate) fn task_mut(&mut self, task_id: u64) -> Result<&mut Task, TaskError> {
        self.tasks.get_mut(&task_id).ok_or(TaskError::NotFound)
    }
}
