//! Task bounty program: creators escrow a reward for a task, one claimant does the
//! work and the reward is released once enough distinct verifiers attest it.

pub mod entrypoint;
pub mod error;
pub mod escrow;
pub mod index;
pub mod instruction;
pub mod policy;
pub mod processor;
mod registry;
pub mod state;
mod task;
mod verification;
