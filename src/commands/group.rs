//! Account group commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use storyhub_core::error::AppError;
use storyhub_core::types::id::{AuthorId, GroupId, GroupInviteId};
use storyhub_service::RequestContext;

use super::Runtime;

/// Arguments for group commands
#[derive(Debug, Args)]
pub struct GroupArgs {
    /// Group subcommand
    #[command(subcommand)]
    pub command: GroupCommand,
}

/// Group subcommands
#[derive(Debug, Subcommand)]
pub enum GroupCommand {
    /// Invite an email address into your group
    Invite {
        /// Email address
        email: String,
    },
    /// Answer a group invitation by its token
    Accept {
        /// Invitation token
        token: String,
        /// Decline instead of accepting
        #[arg(long)]
        decline: bool,
    },
    /// Leave the group you belong to
    Leave,
    /// Remove a member from your group
    Remove {
        /// Group ID
        group: GroupId,
        /// Member author ID
        member: AuthorId,
    },
    /// Withdraw an unanswered invitation
    CancelInvite {
        /// Invitation ID
        invite: GroupInviteId,
    },
    /// List the owner and members of a group
    Members {
        /// Group ID; defaults to your own group
        group: Option<GroupId>,
    },
    /// List unanswered invitations of your group
    Invites {
        /// Group ID
        group: GroupId,
    },
}

/// Group member display row
#[derive(Debug, Serialize, Tabled)]
struct MemberDisplay {
    /// Author ID
    id: String,
    /// Name
    name: String,
    /// Email
    email: String,
    /// Role
    role: String,
    /// Joined at
    joined_at: String,
}

/// Group invitation display row
#[derive(Debug, Serialize, Tabled)]
struct InviteDisplay {
    /// Invite ID
    id: String,
    /// Email
    email: String,
    /// Account
    invited: String,
    /// Sent at
    sent_at: String,
}

/// Execute group commands
pub async fn execute(
    args: &GroupArgs,
    runtime: &Runtime,
    ctx: RequestContext,
    format: OutputFormat,
) -> Result<(), AppError> {
    let service = runtime.groups();

    match &args.command {
        GroupCommand::Invite { email } => {
            let outcome = service.invite(&ctx, email).await?;
            match format {
                OutputFormat::Json => output::print_item(&outcome, format),
                OutputFormat::Table => {
                    output::print_success(&format!("Invitation sent to {}", outcome.email));
                    output::print_kv("Invite", &outcome.invite_id.to_string());
                    output::print_kv("Group", &outcome.group_id.to_string());
                    output::print_kv("Account", &output::or_dash(outcome.invited.map(|a| a.id)));
                }
            }
        }
        GroupCommand::Accept { token, decline } => {
            let outcome = service.accept(&ctx, token, !decline).await?;
            match (format, outcome.group) {
                (OutputFormat::Json, _) => output::print_item(&outcome, format),
                (OutputFormat::Table, Some(group)) => {
                    output::print_success(&format!("Joined group {}", group))
                }
                (OutputFormat::Table, None) => output::print_success("Invitation declined"),
            }
        }
        GroupCommand::Leave => {
            let group = service.leave(&ctx).await?;
            output::print_success(&format!("Left group {}", group));
        }
        GroupCommand::Remove { group, member } => {
            service.remove(&ctx, *group, *member).await?;
            output::print_success(&format!("Removed {} from group {}", member, group));
        }
        GroupCommand::CancelInvite { invite } => {
            let cancelled = service.cancel_invite(&ctx, *invite).await?;
            output::print_success(&format!("Invitation to {} withdrawn", cancelled.email));
        }
        GroupCommand::Members { group } => {
            let group_id = match group {
                Some(id) => *id,
                None => service
                    .group_of(ctx.author_id)
                    .await?
                    .map(|g| g.id)
                    .ok_or_else(|| AppError::not_found("You are not part of any group"))?,
            };
            let members = service.list_members(&ctx, group_id).await?;
            let rows: Vec<MemberDisplay> = members
                .iter()
                .map(|m| MemberDisplay {
                    id: m.author_id.to_string(),
                    name: m.name.clone(),
                    email: m.email.clone(),
                    role: format!("{:?}", m.role),
                    joined_at: m.joined_at.format("%Y-%m-%d %H:%M").to_string(),
                })
                .collect();
            output::print_list(&rows, &members, format);
        }
        GroupCommand::Invites { group } => {
            let invites = service.list_invites(&ctx, *group).await?;
            let rows: Vec<InviteDisplay> = invites
                .iter()
                .map(|i| InviteDisplay {
                    id: i.id.to_string(),
                    email: i.email.clone(),
                    invited: output::or_dash(i.invited),
                    sent_at: i.created_at.format("%Y-%m-%d %H:%M").to_string(),
                })
                .collect();
            output::print_list(&rows, &invites, format);
        }
    }

    Ok(())
}
