use mpl_token_metadata::instructions::{
    CreateMetadataAccountV3, CreateMetadataAccountV3InstructionArgs,
};
use solana_sdk::instruction::Instruction;

use crate::{core::ChainError, metadata::TokenMetadata, prelude::*, protocol::PdaBuilder};

/// Parameters for binding uploaded metadata to a mint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindMetadataParams {
    pub mint: Pubkey,
    /// Mint authority; also pays for and may later update the metadata
    pub authority: Pubkey,
    pub metadata: TokenMetadata,
    /// URI of the uploaded JSON document
    pub uri: String,
}

/// Build the metadata account creation instruction.
/// Returns the derived metadata address alongside it.
pub fn create_metadata_instruction(
    params: &BindMetadataParams,
    pda: &PdaBuilder,
) -> Result<(Pubkey, Instruction), ChainError> {
    let data = params
        .metadata
        .to_data_v2(&params.uri)
        .map_err(|e| ChainError::InstructionBuild(e.to_string()))?;
    let (metadata_account, _) = pda.metadata(&params.mint);

    let instruction = CreateMetadataAccountV3 {
        metadata: metadata_account,
        mint: params.mint,
        mint_authority: params.authority,
        payer: params.authority,
        update_authority: (params.authority, true),
        system_program: solana_program::system_program::ID,
        rent: None,
    }
    .instruction(CreateMetadataAccountV3InstructionArgs {
        data,
        is_mutable: true,
        collection_details: None,
    });

    Ok((metadata_account, instruction))
}
