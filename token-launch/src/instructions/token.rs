use solana_program::program_pack::Pack;
use solana_sdk::instruction::Instruction;

use crate::{
    core::{ChainError, ConfigError, MAX_DECIMALS},
    prelude::*,
    protocol::PdaBuilder,
};

/// Parameters for creating a mint and its initial supply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTokenParams {
    pub decimals: u8,
    /// Whole tokens, scaled by 10^decimals when minted
    pub supply: u64,
    pub mint_authority: Pubkey,
    pub freeze_authority: Option<Pubkey>,
    /// Receives the initial supply in its associated token account
    pub owner: Pubkey,
}

impl CreateTokenParams {
    /// One identity for every role
    pub fn new(authority: Pubkey, decimals: u8, supply: u64) -> Self {
        Self {
            decimals,
            supply,
            mint_authority: authority,
            freeze_authority: Some(authority),
            owner: authority,
        }
    }

    pub fn with_owner(mut self, owner: Pubkey) -> Self {
        self.owner = owner;
        self
    }

    pub fn with_freeze_authority(mut self, freeze_authority: Option<Pubkey>) -> Self {
        self.freeze_authority = freeze_authority;
        self
    }

    pub fn raw_amount(&self) -> Result<u64, ConfigError> {
        raw_amount(self.supply, self.decimals)
    }
}

/// Exact `supply * 10^decimals`, wide enough that it never overflows
pub fn scale_amount(supply: u64, decimals: u8) -> Result<u128, ConfigError> {
    if decimals > MAX_DECIMALS {
        return Err(ConfigError::InvalidSupply(format!(
            "decimals must be between 0 and {}, got {}",
            MAX_DECIMALS, decimals
        )));
    }
    if supply == 0 {
        return Err(ConfigError::InvalidSupply(
            "supply must be greater than zero".to_string(),
        ));
    }
    Ok(supply as u128 * 10u128.pow(decimals as u32))
}

/// Raw token units to mint; the token program counts in u64
pub fn raw_amount(supply: u64, decimals: u8) -> Result<u64, ConfigError> {
    let scaled = scale_amount(supply, decimals)?;
    u64::try_from(scaled).map_err(|_| {
        ConfigError::InvalidSupply(format!(
            "{} tokens at {} decimals is {} raw units, above the u64 maximum",
            supply, decimals, scaled
        ))
    })
}

/// Size of a mint account
pub fn mint_account_size() -> usize {
    spl_token::state::Mint::LEN
}

/// Build the create-token batch, in execution order:
/// allocate mint, initialize mint, create holding account, mint supply
pub fn create_token_instructions(
    payer: &Pubkey,
    mint: &Pubkey,
    params: &CreateTokenParams,
    rent_lamports: u64,
    pda: &PdaBuilder,
) -> Result<Vec<Instruction>, ChainError> {
    let amount = params
        .raw_amount()
        .map_err(|e| ChainError::InstructionBuild(e.to_string()))?;
    let holding_account = pda.associated_token(&params.owner, mint);

    let create_mint_account = solana_program::system_instruction::create_account(
        payer,
        mint,
        rent_lamports,
        mint_account_size() as u64,
        &spl_token::ID,
    );

    let initialize_mint = spl_token::instruction::initialize_mint(
        &spl_token::ID,
        mint,
        &params.mint_authority,
        params.freeze_authority.as_ref(),
        params.decimals,
    )?;

    let create_holding_account =
        spl_associated_token_account::instruction::create_associated_token_account_idempotent(
            payer,
            &params.owner,
            mint,
            &spl_token::ID,
        );

    let mint_to = spl_token::instruction::mint_to(
        &spl_token::ID,
        mint,
        &holding_account,
        &params.mint_authority,
        &[],
        amount,
    )?;

    Ok(vec![
        create_mint_account,
        initialize_mint,
        create_holding_account,
        mint_to,
    ])
}
