use {
    num_derive::FromPrimitive,
    num_traits::FromPrimitive,
    solana_program::{
        decode_error::DecodeError,
        msg,
        program_error::{PrintProgramError, ProgramError},
    },
    thiserror::Error,
};

/// Errors returned by the task bounty program. The discriminants are the
/// custom error codes seen by clients.
#[derive(Clone, Copy, Debug, Eq, Error, FromPrimitive, PartialEq)]
pub enum TaskError {
    /// The caller lacks the privilege required for this action
    #[error("Caller is not permitted to perform this action")]
    OwnerOnly = 100,
    /// The referenced task does not exist
    #[error("Task not found")]
    NotFound = 101,
    /// The task is no longer open
    #[error("Task has already been claimed")]
    AlreadyClaimed = 102,
    #[error("Caller is not the required claimant")]
    NotClaimant = 103,
    #[error("Task has already been completed")]
    AlreadyCompleted = 104,
    #[error("Caller has already verified this task")]
    AlreadyVerified = 105,
    #[error("Insufficient available balance")]
    InsufficientBalance = 106,
    #[error("Deadline must be in the future")]
    PastDeadline = 107,
    #[error("Task has not been completed")]
    NotCompleted = 108,
    #[error("Verification threshold must be positive")]
    InvalidThreshold = 109,
    #[error("Task description is too long")]
    DescriptionTooLong = 110,
    #[error("Arithmetic overflow")]
    ArithmeticOverflow = 111,
    /// An escrow record was settled twice. Unreachable through the
    /// registry, which settles each task's escrow at most once.
    #[error("Escrow has already been settled")]
    EscrowSettled = 112,
    #[error("Registry is already initialized")]
    AlreadyInitialized = 113,
    #[error("Registry is not initialized")]
    Uninitialized = 114,
}

impl From<TaskError> for ProgramError {
    fn from(e: TaskError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for TaskError {
    fn type_of() -> &'static str {
        "TaskError"
    }
}

impl PrintProgramError for TaskError {
    fn print<E>(&self)
    where
        E: 'static + std::error::Error + DecodeError<E> + PrintProgramError + FromPrimitive,
    {
        msg!("Error: {} (code {})", self, *self as u32);
    }
}
