use {
    crate::{
        error::TaskError,
        escrow::Escrow,
        instruction::TaskInstruction,
        state::{RegistryState, Task, TaskAccount, REGISTRY_STATE_LEN, TASK_ACCOUNT_LEN},
    },
    borsh::BorshDeserialize,
    borsh::BorshSerialize,
    solana_program::{
        account_info::{next_account_info, AccountInfo},
        entrypoint::ProgramResult,
        msg,
        program_error::ProgramError,
        pubkey::Pubkey,
        sysvar::{clock::Clock, rent::Rent, Sysvar},
    },
};

pub struct Processor {}

impl Processor {
    /// entry point for program
    pub fn process_instruction(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        input: &[u8],
    ) -> ProgramResult {
        use TaskInstruction::*;
        let instruction = TaskInstruction::try_from_slice(input)
            .map_err(|_| ProgramError::InvalidInstructionData)?;
        match instruction {
            Initialize {
                verification_threshold,
            } => {
                msg!("Instruction: Initialize");
                Self::process_initialize(program_id, accounts, verification_threshold)
            }
            CreateTask {
                description,
                reward,
                deadline,
            } => {
                msg!("Instruction: Create Task");
                Self::process_create_task(program_id, accounts, description, reward, deadline)
            }
            ClaimTask { task_id } => {
                msg!("Instruction: Claim Task");
                Self::process_claim_task(program_id, accounts, task_id)
            }
            CompleteTask { task_id } => {
                msg!("Instruction: Complete Task");
                Self::process_complete_task(program_id, accounts, task_id)
            }
            VerifyTask { task_id } => {
                msg!("Instruction: Verify Task");
                Self::process_verify_task(program_id, accounts, task_id)
            }
            CancelTask { task_id } => {
                msg!("Instruction: Cancel Task");
                Self::process_cancel_task(program_id, accounts, task_id)
            }
            SetVerificationThreshold(value) => {
                msg!("Instruction: Set Verification Threshold");
                Self::with_registry(program_id, accounts, |registry, caller| {
                    registry.policy.set_verification_threshold(caller, value)
                })
            }
            SetCreatorVerification(allowed) => {
                msg!("Instruction: Set Creator Verification");
                Self::with_registry(program_id, accounts, |registry, caller| {
                    registry.policy.set_creator_verification(caller, allowed)
                })
            }
        }
    }

    /**
    Initialize an empty registry account. The signer becomes the owner allowed to change
    the admin policy.
    */
    fn process_initialize(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        verification_threshold: u64,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let owner_info = next_account_info(account_info_iter)?;
        let registry_info = next_account_info(account_info_iter)?;

        Self::check_signer(owner_info)?;
        let registry = Self::load_registry(registry_info, program_id)?;
        if registry.is_initialized {
            return Err(TaskError::AlreadyInitialized.into());
        }

        let registry = RegistryState::new(*owner_info.key, verification_threshold)?;
        Self::store_registry(&registry, registry_info)
    }

    /**
    Create a new task in a fresh task account. The account must already be owned by the
    program with `TASK_ACCOUNT_LEN` bytes and hold its rent plus the reward, which stays in
    it as escrow. The current slot from the clock sysvar is the height the deadline is
    checked against.
    */
    fn process_create_task(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        description: String,
        reward: u64,
        deadline: u64,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let creator_info = next_account_info(account_info_iter)?;
        let registry_info = next_account_info(account_info_iter)?;
        let task_info = next_account_info(account_info_iter)?;
        let clock_sysvar_info = next_account_info(account_info_iter)?;
        let clock = &Clock::from_account_info(clock_sysvar_info)?;
        let rent_sysvar_info = next_account_info(account_info_iter)?;
        let rent = &Rent::from_account_info(rent_sysvar_info)?;

        Self::check_signer(creator_info)?;
        let mut registry = Self::load_registry(registry_info, program_id)?;
        registry.ensure_initialized()?;

        Self::check_account_owner(task_info, program_id)?;
        Self::check_data_len(task_info, TASK_ACCOUNT_LEN)?;
        if TaskAccount::unpack(&task_info.data.borrow())?.is_initialized {
            return Err(TaskError::AlreadyInitialized.into());
        }

        Task::check_new(clock.slot, &description, deadline)?;
        let task_id = registry.next_task_id;
        registry.next_task_id = task_id
            .checked_add(1)
            .ok_or(TaskError::ArithmeticOverflow)?;

        let required = rent
            .minimum_balance(TASK_ACCOUNT_LEN)
            .checked_add(reward)
            .ok_or(TaskError::ArithmeticOverflow)?;
        if task_info.lamports() < required {
            msg!(
                "Task account holds {} lamports, rent and reward need {}",
                task_info.lamports(),
                required
            );
            return Err(TaskError::InsufficientBalance.into());
        }

        let escrow = Escrow::lock(creator_info.key, reward);
        let account = TaskAccount {
            is_initialized: true,
            registry: *registry_info.key,
            task_id,
            claim_seq: None,
            task: Task::new(creator_info.key, description, deadline, escrow),
        };
        Self::store_task(&account, task_info)?;

        msg!("Task {} created with reward {}", task_id, reward);
        Self::store_registry(&registry, registry_info)
    }

    fn process_claim_task(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        task_id: u64,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let claimant_info = next_account_info(account_info_iter)?;
        let registry_info = next_account_info(account_info_iter)?;
        let task_info = next_account_info(account_info_iter)?;

        Self::check_signer(claimant_info)?;
        let mut registry = Self::load_registry(registry_info, program_id)?;
        registry.ensure_initialized()?;
        let mut account = Self::load_task(program_id, registry_info, task_info, task_id)?;

        account.task.claim(claimant_info.key)?;
        account.claim_seq = Some(registry.next_claim_seq);
        registry.next_claim_seq = registry
            .next_claim_seq
            .checked_add(1)
            .ok_or(TaskError::ArithmeticOverflow)?;

        Self::store_task(&account, task_info)?;
        Self::store_registry(&registry, registry_info)
    }

    fn process_complete_task(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        task_id: u64,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let claimant_info = next_account_info(account_info_iter)?;
        let registry_info = next_account_info(account_info_iter)?;
        let task_info = next_account_info(account_info_iter)?;

        Self::check_signer(claimant_info)?;
        let registry = Self::load_registry(registry_info, program_id)?;
        registry.ensure_initialized()?;
        let mut account = Self::load_task(program_id, registry_info, task_info, task_id)?;

        account.task.complete(claimant_info.key)?;
        Self::store_task(&account, task_info)
    }

    /// Record a verification. On payout the reward moves from the task account to the
    /// claimant; the rent stays so the rewarded task remains readable.
    fn process_verify_task(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        task_id: u64,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let verifier_info = next_account_info(account_info_iter)?;
        let registry_info = next_account_info(account_info_iter)?;
        let task_info = next_account_info(account_info_iter)?;
        let claimant_info = next_account_info(account_info_iter)?;

        Self::check_signer(verifier_info)?;
        let registry = Self::load_registry(registry_info, program_id)?;
        registry.ensure_initialized()?;
        let mut account = Self::load_task(program_id, registry_info, task_info, task_id)?;

        if let Some(amount) = account.task.verify(verifier_info.key, &registry.policy)? {
            if account.task.claimed_by != Some(*claimant_info.key) {
                msg!("{} is not the claimant of task {}", claimant_info.key, task_id);
                return Err(ProgramError::InvalidArgument);
            }
            Self::transfer_lamports(task_info, claimant_info, amount)?;
            msg!("Task {} paid {} to {}", task_id, amount, claimant_info.key);
        }
        Self::store_task(&account, task_info)
    }

    /// Refund an unclaimed task and close its account, its rent goes back to the creator
    /// along with the reward.
    fn process_cancel_task(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        task_id: u64,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let creator_info = next_account_info(account_info_iter)?;
        let registry_info = next_account_info(account_info_iter)?;
        let task_info = next_account_info(account_info_iter)?;

        Self::check_signer(creator_info)?;
        let registry = Self::load_registry(registry_info, program_id)?;
        registry.ensure_initialized()?;
        let mut account = Self::load_task(program_id, registry_info, task_info, task_id)?;

        let refund = account.task.cancel(creator_info.key)?;
        Self::transfer_lamports(task_info, creator_info, task_info.lamports())?;
        task_info.data.borrow_mut().fill(0);

        msg!("Task {} cancelled, {} refunded", task_id, refund);
        Ok(())
    }

    /// Run an admin operation for the signing caller and persist the result.
    /// Nothing is written back when the operation fails.
    fn with_registry<F>(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        operation: F,
    ) -> ProgramResult
    where
        F: FnOnce(&mut RegistryState, &Pubkey) -> Result<(), TaskError>,
    {
        let account_info_iter = &mut accounts.iter();
        let caller_info = next_account_info(account_info_iter)?;
        let registry_info = next_account_info(account_info_iter)?;

        Self::check_signer(caller_info)?;
        let mut registry = Self::load_registry(registry_info, program_id)?;
        registry.ensure_initialized()?;
        operation(&mut registry, caller_info.key)?;
        Self::store_registry(&registry, registry_info)
    }

    fn load_registry(
        registry_info: &AccountInfo,
        program_id: &Pubkey,
    ) -> Result<RegistryState, ProgramError> {
        Self::check_account_owner(registry_info, program_id)?;
        Self::check_data_len(registry_info, REGISTRY_STATE_LEN)?;
        RegistryState::unpack(&registry_info.data.borrow())
    }

    fn store_registry(registry: &RegistryState, registry_info: &AccountInfo) -> ProgramResult {
        if !registry_info.is_writable {
            msg!("The registry account is not writable");
            return Err(ProgramError::InvalidAccountData);
        }
        registry
            .serialize(&mut &mut registry_info.data.borrow_mut()[..])
            .map_err(|e| e.into())
    }

    /// Load task `task_id` of the registry. A missing or closed account is `NotFound`.
    fn load_task(
        program_id: &Pubkey,
        registry_info: &AccountInfo,
        task_info: &AccountInfo,
        task_id: u64,
    ) -> Result<TaskAccount, ProgramError> {
        if task_info.data_is_empty() {
            msg!("Task {} does not exist", task_id);
            return Err(TaskError::NotFound.into());
        }
        Self::check_account_owner(task_info, program_id)?;
        Self::check_data_len(task_info, TASK_ACCOUNT_LEN)?;
        let account = TaskAccount::unpack(&task_info.data.borrow())?;
        if !account.is_initialized {
            return Err(TaskError::NotFound.into());
        }
        if account.registry != *registry_info.key || account.task_id != task_id {
            msg!("Account {} does not hold task {}", task_info.key, task_id);
            return Err(ProgramError::InvalidArgument);
        }
        Ok(account)
    }

    fn store_task(account: &TaskAccount, task_info: &AccountInfo) -> ProgramResult {
        account
            .serialize(&mut &mut task_info.data.borrow_mut()[..])
            .map_err(|e| e.into())
    }

    fn transfer_lamports(from: &AccountInfo, to: &AccountInfo, amount: u64) -> ProgramResult {
        if from.key == to.key {
            msg!("Cannot move lamports from {} to itself", from.key);
            return Err(ProgramError::InvalidArgument);
        }
        let from_lamports = from
            .lamports()
            .checked_sub(amount)
            .ok_or(TaskError::ArithmeticOverflow)?;
        let to_lamports = to
            .lamports()
            .checked_add(amount)
            .ok_or(TaskError::ArithmeticOverflow)?;
        **from.try_borrow_mut_lamports()? = from_lamports;
        **to.try_borrow_mut_lamports()? = to_lamports;
        Ok(())
    }

    // registry and task accounts differ in size, so one is never read as the other
    fn check_data_len(account_info: &AccountInfo, len: usize) -> ProgramResult {
        if account_info.data_len() != len {
            msg!(
                "Account {} holds {} bytes, {} expected",
                account_info.key,
                account_info.data_len(),
                len
            );
            return Err(ProgramError::InvalidAccountData);
        }
        Ok(())
    }

    fn check_signer(account_info: &AccountInfo) -> ProgramResult {
        if !account_info.is_signer {
            msg!("{} is not a signer", account_info.key);
            return Err(ProgramError::MissingRequiredSignature);
        }
        Ok(())
    }

    /// Check account owner is the given program
    fn check_account_owner(
        account_info: &AccountInfo,
        program_id: &Pubkey,
    ) -> Result<(), ProgramError> {
        if *program_id != *account_info.owner {
            msg!(
                "Expected account to be owned by program {}, received {}",
                program_id,
                account_info.owner
            );
            Err(ProgramError::IncorrectProgramId)
        } else {
            Ok(())
        }
    }
}
