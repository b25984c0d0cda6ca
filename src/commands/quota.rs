//! Storage quota commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use storyhub_core::error::AppError;
use storyhub_core::types::id::AuthorId;
use storyhub_service::QuotaReport;

use super::Runtime;

/// Arguments for quota commands
#[derive(Debug, Args)]
pub struct QuotaArgs {
    /// Quota subcommand
    #[command(subcommand)]
    pub command: QuotaCommand,
}

/// Quota subcommands
#[derive(Debug, Subcommand)]
pub enum QuotaCommand {
    /// Show an author's quota, pooled when they are part of a group
    Show {
        /// Author ID
        author: AuthorId,
    },
}

/// Execute quota commands
pub async fn execute(
    args: &QuotaArgs,
    runtime: &Runtime,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        QuotaCommand::Show { author } => {
            let report = runtime.quota().compute_quota(*author).await?;
            if format == OutputFormat::Json {
                output::print_item(&report, format);
                return Ok(());
            }

            match &report {
                QuotaReport::Author { plan, quota } => {
                    println!("Author quota ({} plan):", plan.key);
                    output::print_kv("Total", &quota.total.formatted);
                    output::print_kv("Used", &quota.used.formatted);
                    output::print_kv("Left", &quota.left.formatted);
                }
                QuotaReport::Group { group_id, quota } => {
                    println!("Group quota ({}):", group_id);
                    output::print_kv("You", &quota.you.formatted);
                    output::print_kv("Others", &quota.others.formatted);
                    output::print_kv("Left", &quota.left.formatted);
                    output::print_kv("Total", &quota.total.formatted);
                }
            }
        }
    }

    Ok(())
}
