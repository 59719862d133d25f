use {
    crate::{error::TaskError, processor::Processor},
    solana_program::{
        account_info::AccountInfo, entrypoint::ProgramResult, program_error::PrintProgramError,
        pubkey::Pubkey,
    },
};

#[cfg(all(target_arch = "bpf", not(feature = "no-entrypoint")))]
solana_program::entrypoint!(process_instruction);

/// Dispatch an instruction, logging the decoded error when it fails
pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    input: &[u8],
) -> ProgramResult {
    if let Err(error) = Processor::process_instruction(program_id, accounts, input) {
        error.print::<TaskError>();
        return Err(error);
    }
    Ok(())
}
