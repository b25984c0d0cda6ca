//! Capability check commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use storyhub_core::error::AppError;
use storyhub_core::types::id::{AuthorId, StoryId};
use storyhub_service::Audience;

use super::Runtime;

/// Arguments for permission commands
#[derive(Debug, Args)]
pub struct PermissionArgs {
    /// Permission subcommand
    #[command(subcommand)]
    pub command: PermissionCommand,
}

/// Permission subcommands
#[derive(Debug, Subcommand)]
pub enum PermissionCommand {
    /// Show what an author may do on a story
    Show {
        /// Story ID
        story: StoryId,
        /// Author ID
        author: AuthorId,
        /// The author follows the story owner
        #[arg(long)]
        follows_owner: bool,
        /// The author arrived through the share link
        #[arg(long)]
        has_link: bool,
    },
}

/// Execute permission commands
pub async fn execute(
    args: &PermissionArgs,
    runtime: &Runtime,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        PermissionCommand::Show {
            story,
            author,
            follows_owner,
            has_link,
        } => {
            let audience = Audience {
                follows_owner: *follows_owner,
                has_link: *has_link,
            };
            let caps = runtime
                .permissions()
                .resolve_permission(*story, *author, audience)
                .await?;

            if format == OutputFormat::Json {
                output::print_item(&caps, format);
            } else {
                println!("Capabilities of {} on {}:", author, story);
                output::print_kv("View", &caps.can_view.to_string());
                output::print_kv("Edit", &caps.can_edit.to_string());
                output::print_kv("Administer", &caps.can_administer.to_string());
                output::print_kv("Source", &format!("{:?}", caps.source));
            }
        }
    }

    Ok(())
}
