//! CLI command definitions and dispatch.

pub mod collab;
pub mod group;
pub mod migrate;
pub mod permission;
pub mod quota;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use storyhub_core::config::{AppConfig, StoreBackend};
use storyhub_core::error::AppError;
use storyhub_core::events::ActivityEvent;
use storyhub_core::traits::ActivityNotifier;
use storyhub_core::types::id::AuthorId;
use storyhub_database::connection::DatabasePool;
use storyhub_database::store::Stores;
use storyhub_service::{
    CollaborationService, GroupService, PermissionService, QuotaService, RequestContext,
};
use storyhub_worker::{
    ActivityDispatcher, ActivityRules, ChannelNotifier, LoggingEmailSender, LoggingPushSender,
};

use crate::output::OutputFormat;

/// StoryHub collaboration, group and storage quota administration
#[derive(Debug, Parser)]
#[command(name = "storyhub", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Author the command acts as
    #[arg(long = "as", global = true, value_name = "AUTHOR_ID")]
    pub acting_as: Option<AuthorId>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Storage quota reports
    Quota(quota::QuotaArgs),
    /// Story collaboration
    Collab(collab::CollabArgs),
    /// Account groups
    Group(group::GroupArgs),
    /// Capability checks
    Permission(permission::PermissionArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        if let Commands::Migrate(args) = &self.command {
            return migrate::execute(args, &config).await;
        }

        let runtime = Runtime::open(config).await?;
        let outcome = match &self.command {
            Commands::Migrate(_) => Ok(()),
            Commands::Quota(args) => quota::execute(args, &runtime, self.format).await,
            Commands::Collab(args) => {
                collab::execute(args, &runtime, self.actor()?, self.format).await
            }
            Commands::Group(args) => group::execute(args, &runtime, self.actor()?, self.format).await,
            Commands::Permission(args) => permission::execute(args, &runtime, self.format).await,
        };
        runtime.finish().await;
        outcome
    }

    /// The acting author; required by every mutating command.
    fn actor(&self) -> Result<RequestContext, AppError> {
        self.acting_as
            .map(RequestContext::new)
            .ok_or_else(|| AppError::unauthorized("This command requires --as <AUTHOR_ID>"))
    }
}

/// Stores, registries and the activity queue for one command invocation.
pub struct Runtime {
    /// Loaded configuration.
    pub config: AppConfig,
    /// Selected store backend.
    pub stores: Stores,
    notifier: Arc<ChannelNotifier>,
    queue: mpsc::Receiver<ActivityEvent>,
    pool: Option<DatabasePool>,
}

impl Runtime {
    /// Connect the configured backend and open the activity queue.
    pub async fn open(config: AppConfig) -> Result<Self, AppError> {
        let (stores, pool) = match config.store.backend {
            StoreBackend::Postgres => {
                let pool = DatabasePool::connect(&config.database).await?;
                (pool.stores(), Some(pool))
            }
            StoreBackend::Memory => {
                warn!("Memory backend selected; state is discarded when the command exits");
                (Stores::memory(), None)
            }
        };
        let (notifier, queue) = ChannelNotifier::channel(config.notifier.queue_capacity);

        Ok(Self {
            config,
            stores,
            notifier: Arc::new(notifier),
            queue,
            pool,
        })
    }

    fn notifier(&self) -> Arc<dyn ActivityNotifier> {
        self.notifier.clone()
    }

    /// Collaboration registry over the selected backend.
    pub fn collaboration(&self) -> CollaborationService {
        CollaborationService::new(
            &self.stores,
            self.notifier(),
            self.config.collaboration.clone(),
        )
    }

    /// Group registry over the selected backend.
    pub fn groups(&self) -> GroupService {
        GroupService::new(&self.stores, self.notifier(), self.config.groups.clone())
    }

    /// Quota reports over the selected backend.
    pub fn quota(&self) -> QuotaService {
        QuotaService::new(&self.stores, self.config.quota.clone())
    }

    /// Capability checks over the selected backend.
    pub fn permissions(&self) -> PermissionService {
        PermissionService::new(Arc::clone(&self.stores.stories))
    }

    /// Deliver every event the command emitted, then release the pool.
    pub async fn finish(self) {
        let dispatcher = ActivityDispatcher::new(
            ActivityRules::new(&self.stores, self.config.notifier.clone()),
            Arc::new(LoggingEmailSender),
            Arc::new(LoggingPushSender),
        );

        let (stop, shutdown) = watch::channel(false);
        let _ = stop.send(true);
        let stats = dispatcher.run(self.queue, shutdown).await;
        if self.notifier.dropped() > 0 {
            warn!(dropped = self.notifier.dropped(), "Activity events were dropped");
        }
        info!(events = stats.events, delivered = stats.delivered, "Activity delivered");

        if let Some(pool) = self.pool {
            pool.close().await;
        }
    }
}
