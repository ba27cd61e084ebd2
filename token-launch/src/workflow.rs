//! Launch workflow: identity, upload, mint, bind

use serde::Serialize;
use std::{path::PathBuf, sync::Arc};
use tracing::{info, warn};

use crate::{
    config::{Cluster, LaunchConfig},
    core::{LaunchError, LaunchResult, DEFAULT_DECIMALS, DEFAULT_SUPPLY},
    events::{EventSink, Step, TracingSink, WorkflowEvent},
    identity::load_keypair,
    instructions::raw_amount,
    issuer::{
        display_string, BindMetadataParams, CreateTokenParams, MetadataReceipt, MintReceipt,
        TokenIssuer,
    },
    metadata::TokenMetadata,
    prelude::*,
    storage::{upload_assets, AssetUploader, UploadFile, UploadedAssets},
};

/// Who may freeze holder accounts of the new mint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FreezeAuthority {
    /// The launching identity
    #[default]
    Payer,
    Key(Pubkey),
    Disabled,
}

/// Operator input for one launch
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    pub metadata: TokenMetadata,
    pub image_path: PathBuf,
    pub decimals: u8,
    /// Whole tokens
    pub supply: u64,
    /// Receiver of the initial supply; defaults to the payer
    pub owner: Option<Pubkey>,
    pub freeze_authority: FreezeAuthority,
    /// Stop after local validation
    pub dry_run: bool,
}

impl LaunchRequest {
    pub fn new(metadata: TokenMetadata, image_path: impl Into<PathBuf>) -> Self {
        Self {
            metadata,
            image_path: image_path.into(),
            decimals: DEFAULT_DECIMALS,
            supply: DEFAULT_SUPPLY,
            owner: None,
            freeze_authority: FreezeAuthority::default(),
            dry_run: false,
        }
    }

    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn with_supply(mut self, supply: u64) -> Self {
        self.supply = supply;
        self
    }

    pub fn with_owner(mut self, owner: Pubkey) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_freeze_authority(mut self, freeze_authority: FreezeAuthority) -> Self {
        self.freeze_authority = freeze_authority;
        self
    }

    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExplorerLinks {
    pub mint: String,
    pub mint_transaction: String,
    pub metadata_transaction: String,
}

/// Outcome of a launch, written to `--report` as JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchReport {
    pub cluster: Cluster,
    pub dry_run: bool,
    #[serde(with = "display_string")]
    pub payer: Pubkey,
    #[serde(with = "display_string")]
    pub owner: Pubkey,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub supply: u64,
    pub raw_amount: u64,
    pub assets: Option<UploadedAssets>,
    pub mint: Option<MintReceipt>,
    pub metadata: Option<MetadataReceipt>,
    pub explorer: Option<ExplorerLinks>,
}

impl LaunchReport {
    pub fn mint_address(&self) -> Option<Pubkey> {
        self.mint.as_ref().map(|receipt| receipt.mint)
    }
}

/// Everything validated locally before the first network call
struct Prepared {
    payer: Keypair,
    image: UploadFile,
    token: CreateTokenParams,
}

pub struct LaunchWorkflow {
    config: LaunchConfig,
    uploader: Arc<dyn AssetUploader>,
    issuer: Arc<dyn TokenIssuer>,
    sink: Arc<dyn EventSink>,
}

impl LaunchWorkflow {
    pub fn new(
        config: LaunchConfig,
        uploader: Arc<dyn AssetUploader>,
        issuer: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            config,
            uploader,
            issuer,
            sink: Arc::new(TracingSink),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }

    /// Run the launch. Steps never overlap and nothing is rolled back.
    pub async fn run(&self, request: &LaunchRequest) -> LaunchResult<LaunchReport> {
        info!(
            "Launching {} ({}) on {}",
            request.metadata.name,
            request.metadata.symbol,
            self.config.cluster()
        );

        self.started(Step::LoadIdentity);
        let prepared = self.finish(Step::LoadIdentity, self.prepare(request), |prepared| {
            format!("payer {}", prepared.payer.pubkey())
        })?;

        let mut report = LaunchReport {
            cluster: self.config.cluster(),
            dry_run: request.dry_run,
            payer: prepared.payer.pubkey(),
            owner: prepared.token.owner,
            name: request.metadata.name.clone(),
            symbol: request.metadata.symbol.clone(),
            decimals: prepared.token.decimals,
            supply: prepared.token.supply,
            raw_amount: raw_amount(prepared.token.supply, prepared.token.decimals)?,
            assets: None,
            mint: None,
            metadata: None,
            explorer: None,
        };

        if request.dry_run {
            info!("Dry run: inputs are valid, nothing was uploaded or sent");
            return Ok(report);
        }

        self.started(Step::UploadAssets);
        let uploaded = upload_assets(self.uploader.as_ref(), &prepared.image, &request.metadata)
            .await
            .map_err(LaunchError::from);
        let assets = self.finish(Step::UploadAssets, uploaded, |assets| {
            assets.metadata_uri.clone()
        })?;

        self.started(Step::CreateToken);
        let created = self
            .issuer
            .create_token(&prepared.payer, &prepared.token)
            .await
            .map_err(LaunchError::from);
        let mint = self.finish(Step::CreateToken, created, |receipt| {
            format!("mint {} ({})", receipt.mint, receipt.signature)
        })?;

        self.started(Step::BindMetadata);
        let bind_params = BindMetadataParams {
            mint: mint.mint,
            authority: prepared.payer.pubkey(),
            metadata: request.metadata.clone(),
            uri: assets.metadata_uri.clone(),
        };
        let bound = self
            .issuer
            .bind_metadata(&prepared.payer, &bind_params)
            .await
            .map_err(|source| {
                warn!("Mint {} exists without metadata", mint.mint);
                LaunchError::MetadataUnbound {
                    mint: mint.mint,
                    source,
                }
            });
        let metadata = self.finish(Step::BindMetadata, bound, |receipt| {
            format!("metadata {} ({})", receipt.metadata_account, receipt.signature)
        })?;

        report.explorer = Some(ExplorerLinks {
            mint: self.config.explorer_address_url(&mint.mint.to_string()),
            mint_transaction: self.config.explorer_tx_url(&mint.signature.to_string()),
            metadata_transaction: self.config.explorer_tx_url(&metadata.signature.to_string()),
        });
        report.assets = Some(assets);
        report.mint = Some(mint);
        report.metadata = Some(metadata);

        Ok(report)
    }

    /// Validate every local input without touching the network
    pub async fn dry_run(&self, request: &LaunchRequest) -> LaunchResult<LaunchReport> {
        let mut request = request.clone();
        request.dry_run = true;
        self.run(&request).await
    }

    fn prepare(&self, request: &LaunchRequest) -> LaunchResult<Prepared> {
        self.config.validate()?;
        let payer = load_keypair(&self.config.identity.keypair_path)?;
        let image = UploadFile::from_path(&request.image_path)?;
        request.metadata.validate()?;

        let freeze_authority = match request.freeze_authority {
            FreezeAuthority::Payer => Some(payer.pubkey()),
            FreezeAuthority::Key(key) => Some(key),
            FreezeAuthority::Disabled => None,
        };
        let token = CreateTokenParams::new(payer.pubkey(), request.decimals, request.supply)
            .with_owner(request.owner.unwrap_or_else(|| payer.pubkey()))
            .with_freeze_authority(freeze_authority);
        token.raw_amount()?;

        Ok(Prepared {
            payer,
            image,
            token,
        })
    }

    fn started(&self, step: Step) {
        self.sink.emit(&WorkflowEvent::StepStarted { step });
    }

    fn finish<T>(
        &self,
        step: Step,
        result: LaunchResult<T>,
        detail: impl FnOnce(&T) -> String,
    ) -> LaunchResult<T> {
        match &result {
            Ok(value) => self.sink.emit(&WorkflowEvent::StepCompleted {
                step,
                detail: detail(value),
            }),
            Err(e) => self.sink.emit(&WorkflowEvent::StepFailed {
                step,
                error: e.to_string(),
            }),
        }
        result
    }
}
