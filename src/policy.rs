use {
    crate::error::TaskError,
    borsh::{BorshDeserialize, BorshSerialize},
    solana_program::{msg, pubkey::Pubkey},
};

/// Verifications needed for a payout when none is given at initialization
pub const DEFAULT_VERIFICATION_THRESHOLD: u64 = 3;

/// Highest accepted threshold. It also bounds how many verifiers a task account records.
pub const MAX_VERIFICATION_THRESHOLD: u64 = 16;

/// Encoded size of an `AdminPolicy`
pub const ADMIN_POLICY_LEN: usize = 32 + 8 + 1;

/**
Global settings of the registry. Only `owner`, the account that initialized the
registry, may change them. A new threshold applies to every later verification,
including tasks already part way through verification.
*/
#[derive(Clone, Debug, Default, BorshSerialize, BorshDeserialize, PartialEq)]
pub struct AdminPolicy {
    pub owner: Pubkey,
    verification_threshold: u64,
    /// Whether the creator of a task may count as one of its verifiers
    creator_can_verify: bool,
}

impl AdminPolicy {
    pub fn new(owner: Pubkey, verification_threshold: u64) -> Result<Self, TaskError> {
        Self::check_threshold(verification_threshold)?;
        Ok(Self {
            owner,
            verification_threshold,
            creator_can_verify: true,
        })
    }

    pub fn ensure_owner(&self, caller: &Pubkey) -> Result<(), TaskError> {
        if *caller != self.owner {
            msg!("{} is not the registry owner", caller);
            return Err(TaskError::OwnerOnly);
        }
        Ok(())
    }

    pub fn verification_threshold(&self) -> u64 {
        self.verification_threshold
    }

    pub fn creator_can_verify(&self) -> bool {
        self.creator_can_verify
    }

    pub fn set_verification_threshold(
        &mut self,
        caller: &Pubkey,
        value: u64,
    ) -> Result<(), TaskError> {
        self.ensure_owner(caller)?;
        Self::check_threshold(value)?;
        self.verification_threshold = value;
        Ok(())
    }

    pub fn set_creator_verification(
        &mut self,
        caller: &Pubkey,
        allowed: bool,
    ) -> Result<(), TaskError> {
        self.ensure_owner(caller)?;
        self.creator_can_verify = allowed;
        Ok(())
    }

    fn check_threshold(value: u64) -> Result<(), TaskError> {
        if value == 0 || value > MAX_VERIFICATION_THRESHOLD {
            msg!(
                "Threshold {} is outside 1..={}",
                value,
                MAX_VERIFICATION_THRESHOLD
            );
            return Err(TaskError::InvalidThreshold);
        }
        Ok(())
    }
}
