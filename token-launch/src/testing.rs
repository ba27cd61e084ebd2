//! In-memory backends for exercising the workflow without a cluster or gateway

use async_trait::async_trait;
use solana_program::program_option::COption;
use solana_sdk::{hash::Hash, instruction::Instruction, transaction::Transaction};
use spl_token::instruction::TokenInstruction;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex, MutexGuard,
    },
};

use crate::{
    core::{ChainError, UploadError},
    events::{EventSink, WorkflowEvent},
    instructions::{
        create_metadata_instruction, create_token_instructions, BindMetadataParams,
        CreateTokenParams,
    },
    issuer::{MetadataReceipt, MintReceipt, TokenIssuer},
    prelude::*,
    protocol::PdaBuilder,
    storage::{AssetUploader, UploadFile},
};

/// Rent charged for a mint account by the in-memory chain
pub const MINT_RENT_LAMPORTS: u64 = 1_461_600;

const MEMORY_GATEWAY: &str = "https://gateway.memory";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Uploader that keeps files in memory and can fail a chosen call
pub struct InMemoryUploader {
    files: Mutex<Vec<(String, UploadFile)>>,
    calls: AtomicUsize,
    fail_on: Option<usize>,
    gateway: String,
}

impl Default for InMemoryUploader {
    fn default() -> Self {
        Self {
            files: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            fail_on: None,
            gateway: MEMORY_GATEWAY.to_string(),
        }
    }
}

impl InMemoryUploader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base of the URIs handed out
    pub fn with_gateway(mut self, gateway: impl Into<String>) -> Self {
        self.gateway = gateway.into();
        self
    }

    /// Reject the `call`-th upload (1-based) with a quota error
    pub fn fail_on_call(mut self, call: usize) -> Self {
        self.fail_on = Some(call);
        self
    }

    /// Upload attempts, including failed ones
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Successfully stored files, in upload order
    pub fn uploads(&self) -> Vec<UploadFile> {
        lock(&self.files).iter().map(|(_, file)| file.clone()).collect()
    }

    pub fn get(&self, uri: &str) -> Option<UploadFile> {
        lock(&self.files)
            .iter()
            .find(|(stored, _)| stored == uri)
            .map(|(_, file)| file.clone())
    }
}

#[async_trait]
impl AssetUploader for InMemoryUploader {
    async fn upload(&self, file: &UploadFile) -> Result<String, UploadError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on == Some(call) {
            return Err(UploadError::Rejected {
                status: 402,
                body: "insufficient balance for upload".to_string(),
            });
        }

        let mut files = lock(&self.files);
        let uri = format!("{}/{}/{}", self.gateway, files.len(), file.name);
        files.push((uri.clone(), file.clone()));
        Ok(uri)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintState {
    pub decimals: u8,
    pub mint_authority: Pubkey,
    pub freeze_authority: Option<Pubkey>,
    pub supply: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAccountState {
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    pub mint: Pubkey,
    pub update_authority: Pubkey,
    pub name: String,
    pub symbol: String,
    pub uri: String,
}

#[derive(Debug, Clone, Default)]
struct Ledger {
    mints: HashMap<Pubkey, MintState>,
    token_accounts: HashMap<Pubkey, TokenAccountState>,
    metadata: HashMap<Pubkey, MetadataRecord>,
    transactions: u64,
}

/// Token issuer backed by an in-memory ledger.
///
/// Replays the same instruction batches the RPC issuer sends. Each batch is
/// applied to a copy of the ledger and committed only if every instruction
/// succeeds.
#[derive(Default)]
pub struct InMemoryChain {
    ledger: Mutex<Ledger>,
    pda: PdaBuilder,
    create_calls: AtomicUsize,
    bind_calls: AtomicUsize,
    fail_create: bool,
    fail_bind: bool,
}

impl InMemoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_create_token(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn fail_bind_metadata(mut self) -> Self {
        self.fail_bind = true;
        self
    }

    pub fn create_token_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn bind_metadata_calls(&self) -> usize {
        self.bind_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.create_token_calls() + self.bind_metadata_calls()
    }

    pub fn mint(&self, mint: &Pubkey) -> Option<MintState> {
        lock(&self.ledger).mints.get(mint).cloned()
    }

    pub fn mint_count(&self) -> usize {
        lock(&self.ledger).mints.len()
    }

    pub fn token_balance(&self, account: &Pubkey) -> Option<u64> {
        lock(&self.ledger)
            .token_accounts
            .get(account)
            .map(|account| account.amount)
    }

    pub fn token_account(&self, account: &Pubkey) -> Option<TokenAccountState> {
        lock(&self.ledger).token_accounts.get(account).cloned()
    }

    pub fn metadata_account(&self, address: &Pubkey) -> Option<MetadataRecord> {
        lock(&self.ledger).metadata.get(address).cloned()
    }

    /// Metadata records bound to `mint`
    pub fn metadata_for_mint(&self, mint: &Pubkey) -> Vec<MetadataRecord> {
        lock(&self.ledger)
            .metadata
            .values()
            .filter(|record| record.mint == *mint)
            .cloned()
            .collect()
    }

    /// Sign the batch like a real submission would, then apply it atomically
    fn execute<F>(
        &self,
        instructions: &[Instruction],
        payer: &Keypair,
        signers: &[&Keypair],
        apply: F,
    ) -> Result<Signature, ChainError>
    where
        F: FnOnce(&mut Ledger) -> Result<(), ChainError>,
    {
        let mut ledger = lock(&self.ledger);

        let mut blockhash = [0u8; 32];
        blockhash[..8].copy_from_slice(&(ledger.transactions + 1).to_le_bytes());

        let mut tx = Transaction::new_with_payer(instructions, Some(&payer.pubkey()));
        tx.try_sign(signers, Hash::new_from_array(blockhash))
            .map_err(|e| ChainError::TransactionRejected(e.to_string()))?;

        let mut staged = ledger.clone();
        apply(&mut staged)?;
        staged.transactions += 1;
        *ledger = staged;

        Ok(tx.signatures[0])
    }
}

fn replay_create_token(
    ledger: &mut Ledger,
    instructions: &[Instruction],
) -> Result<(), ChainError> {
    for ix in instructions {
        if ix.program_id == solana_program::system_program::ID {
            let account = ix.accounts[1].pubkey;
            if ledger.mints.contains_key(&account) || ledger.token_accounts.contains_key(&account) {
                return Err(ChainError::AccountAlreadyExists(account.to_string()));
            }
        } else if ix.program_id == spl_associated_token_account::ID {
            let address = ix.accounts[1].pubkey;
            let owner = ix.accounts[2].pubkey;
            let mint = ix.accounts[3].pubkey;
            if !ledger.mints.contains_key(&mint) {
                return Err(ChainError::AccountNotFound(mint.to_string()));
            }
            ledger
                .token_accounts
                .entry(address)
                .or_insert(TokenAccountState {
                    mint,
                    owner,
                    amount: 0,
                });
        } else if ix.program_id == spl_token::ID {
            replay_token_instruction(ledger, ix)?;
        } else {
            return Err(ChainError::TransactionRejected(format!(
                "unsupported program {}",
                ix.program_id
            )));
        }
    }
    Ok(())
}

fn replay_token_instruction(ledger: &mut Ledger, ix: &Instruction) -> Result<(), ChainError> {
    let decoded = TokenInstruction::unpack(&ix.data)?;
    match decoded {
        TokenInstruction::InitializeMint {
            decimals,
            mint_authority,
            freeze_authority,
        } => {
            let mint = ix.accounts[0].pubkey;
            let freeze_authority = match freeze_authority {
                COption::Some(key) => Some(key),
                COption::None => None,
            };
            ledger.mints.insert(
                mint,
                MintState {
                    decimals,
                    mint_authority,
                    freeze_authority,
                    supply: 0,
                },
            );
            Ok(())
        }
        TokenInstruction::MintTo { amount } => {
            let mint = ix.accounts[0].pubkey;
            let destination = ix.accounts[1].pubkey;
            let authority = ix.accounts[2].pubkey;

            let mint_state = ledger
                .mints
                .get_mut(&mint)
                .ok_or_else(|| ChainError::AccountNotFound(mint.to_string()))?;
            if mint_state.mint_authority != authority {
                return Err(ChainError::TransactionRejected(format!(
                    "{} is not the mint authority of {}",
                    authority, mint
                )));
            }
            mint_state.supply = mint_state
                .supply
                .checked_add(amount)
                .ok_or_else(|| ChainError::TransactionRejected("supply overflow".to_string()))?;

            let account = ledger
                .token_accounts
                .get_mut(&destination)
                .ok_or_else(|| ChainError::AccountNotFound(destination.to_string()))?;
            if account.mint != mint {
                return Err(ChainError::TransactionRejected(format!(
                    "token account {} does not hold mint {}",
                    destination, mint
                )));
            }
            account.amount = account
                .amount
                .checked_add(amount)
                .ok_or_else(|| ChainError::TransactionRejected("balance overflow".to_string()))?;
            Ok(())
        }
        other => Err(ChainError::TransactionRejected(format!(
            "unsupported token instruction {:?}",
            other
        ))),
    }
}

#[async_trait]
impl TokenIssuer for InMemoryChain {
    async fn create_token(
        &self,
        payer: &Keypair,
        params: &CreateTokenParams,
    ) -> Result<MintReceipt, ChainError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create {
            return Err(ChainError::Rpc("simulated RPC failure".to_string()));
        }

        let mint = Keypair::new();
        let mint_pubkey = mint.pubkey();
        let instructions = create_token_instructions(
            &payer.pubkey(),
            &mint_pubkey,
            params,
            MINT_RENT_LAMPORTS,
            &self.pda,
        )?;
        let raw_amount = params
            .raw_amount()
            .map_err(|e| ChainError::InstructionBuild(e.to_string()))?;

        let signature = self.execute(&instructions, payer, &[payer, &mint], |ledger| {
            replay_create_token(ledger, &instructions)
        })?;

        Ok(MintReceipt {
            mint: mint_pubkey,
            holding_account: self.pda.associated_token(&params.owner, &mint_pubkey),
            raw_amount,
            signature,
        })
    }

    async fn bind_metadata(
        &self,
        payer: &Keypair,
        params: &BindMetadataParams,
    ) -> Result<MetadataReceipt, ChainError> {
        self.bind_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_bind {
            return Err(ChainError::TransactionRejected(
                "simulated metadata program failure".to_string(),
            ));
        }

        let (metadata_account, instruction) = create_metadata_instruction(params, &self.pda)?;
        let mint = instruction.accounts[1].pubkey;
        let mint_authority = instruction.accounts[2].pubkey;
        let update_authority = instruction.accounts[4].pubkey;

        let signature = self.execute(&[instruction], payer, &[payer], |ledger| {
            let mint_state = ledger
                .mints
                .get(&mint)
                .ok_or_else(|| ChainError::AccountNotFound(mint.to_string()))?;
            if mint_state.mint_authority != mint_authority {
                return Err(ChainError::TransactionRejected(format!(
                    "{} is not the mint authority of {}",
                    mint_authority, mint
                )));
            }
            if ledger.metadata.contains_key(&metadata_account) {
                return Err(ChainError::AccountAlreadyExists(metadata_account.to_string()));
            }
            ledger.metadata.insert(
                metadata_account,
                MetadataRecord {
                    mint,
                    update_authority,
                    name: params.metadata.name.clone(),
                    symbol: params.metadata.symbol.clone(),
                    uri: params.uri.clone(),
                },
            );
            Ok(())
        })?;

        Ok(MetadataReceipt {
            metadata_account,
            signature,
        })
    }
}

/// Sink that records every event for later inspection
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<WorkflowEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<WorkflowEvent> {
        lock(&self.events).clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &WorkflowEvent) {
        lock(&self.events).push(event.clone());
    }
}
