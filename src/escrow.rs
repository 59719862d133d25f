use {
    crate::error::TaskError,
    borsh::{BorshDeserialize, BorshSerialize},
    solana_program::{msg, pubkey::Pubkey},
    std::collections::BTreeMap,
};

/// Encoded size of an `Escrow`: payer, amount and the largest `EscrowState` variant
pub const ESCROW_LEN: usize = 32 + 8 + (1 + 32);

#[derive(Clone, Copy, Debug, BorshSerialize, BorshDeserialize, PartialEq, Eq)]
pub enum EscrowState {
    /// Funds are held against the task
    Locked,
    /// Funds were paid out to the given account
    Released(Pubkey),
    /// Funds were returned to the payer
    Refunded,
}

/**
The reward held against one task. An escrow only ever moves out of `Locked` once, so a
reward can be paid or refunded but never both. Settling only records the outcome and
returns the amount; moving the funds is up to the caller, from the in-memory ledger or
from the task account's lamports.
*/
#[derive(Clone, Copy, Debug, BorshSerialize, BorshDeserialize, PartialEq, Eq)]
pub struct Escrow {
    /// The account the amount was reserved from
    pub payer: Pubkey,
    /// Fixed at reservation, never recomputed
    pub amount: u64,
    pub state: EscrowState,
}

impl Escrow {
    pub fn lock(payer: &Pubkey, amount: u64) -> Self {
        Self {
            payer: *payer,
            amount,
            state: EscrowState::Locked,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.state == EscrowState::Locked
    }

    /// Mark the escrow paid to `payee`, returning the amount to move.
    pub fn release(&mut self, payee: &Pubkey) -> Result<u64, TaskError> {
        self.ensure_locked()?;
        self.state = EscrowState::Released(*payee);
        msg!("Escrow released {} to {}", self.amount, payee);
        Ok(self.amount)
    }

    /// Mark the escrow returned to its payer, returning the amount to move.
    pub fn refund(&mut self) -> Result<u64, TaskError> {
        self.ensure_locked()?;
        self.state = EscrowState::Refunded;
        msg!("Escrow refunded {} to {}", self.amount, self.payer);
        Ok(self.amount)
    }

    fn ensure_locked(&self) -> Result<(), TaskError> {
        if !self.is_locked() {
            return Err(TaskError::EscrowSettled);
        }
        Ok(())
    }
}

/// Available balances per account for a registry kept in memory. On chain the
/// available balance is the wallet's own lamports.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EscrowLedger {
    balances: BTreeMap<Pubkey, u64>,
}

impl EscrowLedger {
    /// Available (unlocked) balance of an account
    pub fn balance_of(&self, owner: &Pubkey) -> u64 {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    /// Sum of all available balances
    pub fn total_available(&self) -> u128 {
        self.balances.values().map(|balance| u128::from(*balance)).sum()
    }

    pub fn deposit(&mut self, owner: &Pubkey, amount: u64) -> Result<u64, TaskError> {
        let balance = self
            .balance_of(owner)
            .checked_add(amount)
            .ok_or(TaskError::ArithmeticOverflow)?;
        self.set_balance(owner, balance);
        Ok(balance)
    }

    /// Move `amount` out of the payer's available balance into a new escrow.
    pub fn reserve(&mut self, payer: &Pubkey, amount: u64) -> Result<Escrow, TaskError> {
        let balance = self
            .balance_of(payer)
            .checked_sub(amount)
            .ok_or(TaskError::InsufficientBalance)?;
        self.set_balance(payer, balance);
        Ok(Escrow::lock(payer, amount))
    }

    fn set_balance(&mut self, owner: &Pubkey, balance: u64) {
        if balance == 0 {
            self.balances.remove(owner);
        } else {
            self.balances.insert(*owner, balance);
        }
    }
}
