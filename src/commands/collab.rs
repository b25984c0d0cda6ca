//! Story collaboration commands.

use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use storyhub_core::error::AppError;
use storyhub_core::types::id::{AuthorId, CollaborationInviteId, StoryId};
use storyhub_core::types::pagination::PageRequest;
use storyhub_service::collaboration::{BatchFailure, BatchResult, InviteTarget};
use storyhub_service::RequestContext;

use super::Runtime;

/// Arguments for collaboration commands
#[derive(Debug, Args)]
pub struct CollabArgs {
    /// Collaboration subcommand
    #[command(subcommand)]
    pub command: CollabCommand,
}

/// Requested access level
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Access {
    /// Read only
    View,
    /// Read and write
    Edit,
}

impl Access {
    fn is_edit(self) -> bool {
        self == Self::Edit
    }
}

/// Answer to an invitation
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Answer {
    /// Accept the invitation
    Accept,
    /// Decline the invitation
    Decline,
}

/// Listing options shared by `list` and `pending`
#[derive(Debug, Args)]
pub struct ListOptions {
    /// Case-insensitive filter on name, username and email
    #[arg(short, long)]
    pub search: Option<String>,
    /// Page number (1-based)
    #[arg(long, default_value_t = 1)]
    pub page: u64,
    /// Items per page; defaults to the configured page size
    #[arg(long)]
    pub page_size: Option<u64>,
}

/// Collaboration subcommands
#[derive(Debug, Subcommand)]
pub enum CollabCommand {
    /// List the owner and collaborators of a story
    List {
        /// Story ID
        story: StoryId,
        #[command(flatten)]
        options: ListOptions,
    },
    /// List unanswered invitations of a story
    Pending {
        /// Story ID
        story: StoryId,
        #[command(flatten)]
        options: ListOptions,
    },
    /// Invite authors or email addresses to a story
    Invite {
        /// Story ID
        story: StoryId,
        /// Author to invite (repeatable)
        #[arg(long = "author")]
        authors: Vec<AuthorId>,
        /// Email address to invite (repeatable)
        #[arg(long = "email")]
        emails: Vec<String>,
        /// Access granted to every target
        #[arg(long, value_enum, default_value = "view")]
        access: Access,
    },
    /// Cancel invitations by email
    Cancel {
        /// Story ID
        story: StoryId,
        /// Invited email addresses
        #[arg(required = true)]
        emails: Vec<String>,
    },
    /// Change a collaborator's access
    Permission {
        /// Story ID
        story: StoryId,
        /// Collaborator author ID
        author: AuthorId,
        /// New access level
        #[arg(value_enum)]
        access: Access,
    },
    /// Remove collaborators from a story
    Remove {
        /// Story ID
        story: StoryId,
        /// Collaborator author IDs
        #[arg(required = true)]
        authors: Vec<AuthorId>,
    },
    /// Stop collaborating on a story
    Leave {
        /// Story ID
        story: StoryId,
        /// Also delete the pages you wrote in the story
        #[arg(long)]
        delete_pages: bool,
    },
    /// Accept or decline an invitation addressed to you
    Respond {
        /// Invitation ID
        invite: CollaborationInviteId,
        /// Answer
        #[arg(value_enum)]
        answer: Answer,
    },
    /// Attach email-only invitations addressed to your account
    Claim,
}

/// Collaborator display row
#[derive(Debug, Serialize, Tabled)]
struct CollaboratorDisplay {
    /// Author ID
    id: String,
    /// Name
    name: String,
    /// Username
    username: String,
    /// Email
    email: String,
    /// Access
    access: String,
    /// Can invite
    can_invite: bool,
}

/// Pending invitation display row
#[derive(Debug, Serialize, Tabled)]
struct PendingDisplay {
    /// Invite ID
    invite: String,
    /// Email
    email: String,
    /// Account
    author: String,
    /// Name
    name: String,
    /// Access
    access: String,
    /// Invited at
    invited_at: String,
}

/// Batch failure display row
#[derive(Debug, Serialize, Tabled)]
struct FailureDisplay {
    /// Target
    target: String,
    /// Kind
    kind: String,
    /// Reason
    message: String,
}

/// Execute collaboration commands
pub async fn execute(
    args: &CollabArgs,
    runtime: &Runtime,
    ctx: RequestContext,
    format: OutputFormat,
) -> Result<(), AppError> {
    let service = runtime.collaboration();

    match &args.command {
        CollabCommand::List { story, options } => {
            let page = page_request(options, service.default_page());
            let listing = service
                .list_collaborators(&ctx, *story, page, options.search.as_deref())
                .await?;
            let rows: Vec<CollaboratorDisplay> = listing
                .items
                .iter()
                .map(|c| CollaboratorDisplay {
                    id: c.author_id.to_string(),
                    name: c.name.clone(),
                    username: c.username.clone(),
                    email: c.email.clone(),
                    access: access_label(c.edit),
                    can_invite: c.can_invite,
                })
                .collect();
            output::print_list(&rows, &listing, format);
            if format == OutputFormat::Table {
                print_page_footer(listing.page, listing.total_pages, listing.total_items);
            }
        }
        CollabCommand::Pending { story, options } => {
            let page = page_request(options, service.default_page());
            let listing = service
                .list_pending(&ctx, *story, page, options.search.as_deref())
                .await?;
            let rows: Vec<PendingDisplay> = listing
                .items
                .iter()
                .map(|p| PendingDisplay {
                    invite: p.invite_id.to_string(),
                    email: p.email.clone(),
                    author: output::or_dash(p.author_id),
                    name: output::or_dash(p.name.as_deref()),
                    access: access_label(p.edit),
                    invited_at: p.invited_at.format("%Y-%m-%d %H:%M").to_string(),
                })
                .collect();
            output::print_list(&rows, &listing, format);
            if format == OutputFormat::Table {
                print_page_footer(listing.page, listing.total_pages, listing.total_items);
            }
        }
        CollabCommand::Invite {
            story,
            authors,
            emails,
            access,
        } => {
            let targets: Vec<InviteTarget> = authors
                .iter()
                .map(|id| InviteTarget::author(*id, access.is_edit()))
                .chain(
                    emails
                        .iter()
                        .map(|email| InviteTarget::email(email.clone(), access.is_edit())),
                )
                .collect();
            let result = service.invite(&ctx, *story, targets).await?;
            print_batch(&result, format, |invited| {
                format!(
                    "{} invited{}",
                    invited.email,
                    if invited.added { " and added" } else { "" }
                )
            });
        }
        CollabCommand::Cancel { story, emails } => {
            let outcome = service.cancel(&ctx, *story, emails.clone()).await?;
            match format {
                OutputFormat::Json => output::print_item(&outcome, format),
                OutputFormat::Table => output::print_success(&outcome.message),
            }
        }
        CollabCommand::Permission {
            story,
            author,
            access,
        } => {
            let entry = service
                .update_permission(&ctx, *story, *author, access.is_edit())
                .await?;
            match format {
                OutputFormat::Json => output::print_item(&entry, format),
                OutputFormat::Table => output::print_success(&format!(
                    "{} can now {} the story",
                    entry.author_id,
                    access_label(entry.edit)
                )),
            }
        }
        CollabCommand::Remove { story, authors } => {
            let result = service.remove(&ctx, *story, authors.clone()).await?;
            print_batch(&result, format, |id| format!("{} removed", id));
        }
        CollabCommand::Leave { story, delete_pages } => {
            let outcome = service.leave(&ctx, *story, *delete_pages).await?;
            match format {
                OutputFormat::Json => output::print_item(&outcome, format),
                OutputFormat::Table => output::print_success(&format!(
                    "Left story {} ({} page(s) deleted)",
                    outcome.story_id, outcome.pages_deleted
                )),
            }
        }
        CollabCommand::Respond { invite, answer } => {
            let resolved = service
                .respond(&ctx, *invite, *answer == Answer::Accept)
                .await?;
            match format {
                OutputFormat::Json => output::print_item(&resolved, format),
                OutputFormat::Table => output::print_success(&format!(
                    "Invitation {} {:?}",
                    resolved.id,
                    resolved.status()
                )),
            }
        }
        CollabCommand::Claim => {
            let claimed = service.claim_pending(ctx.author_id).await?;
            match format {
                OutputFormat::Json => output::print_item(&claimed, format),
                OutputFormat::Table => {
                    output::print_success(&format!("{} invitation(s) claimed", claimed.len()))
                }
            }
        }
    }

    Ok(())
}

fn page_request(options: &ListOptions, default: PageRequest) -> PageRequest {
    PageRequest::new(options.page, options.page_size.unwrap_or(default.page_size))
}

fn access_label(edit: bool) -> String {
    if edit { "edit" } else { "view" }.to_string()
}

fn print_page_footer(page: u64, total_pages: u64, total_items: u64) {
    println!("Page {} of {} ({} total)", page, total_pages, total_items);
}

fn print_batch<T: Serialize + std::fmt::Debug>(
    result: &BatchResult<T>,
    format: OutputFormat,
    describe: impl Fn(&T) -> String,
) {
    if format == OutputFormat::Json {
        output::print_item(result, format);
        return;
    }

    for item in &result.succeeded {
        output::print_success(&describe(item));
    }
    if !result.failed.is_empty() {
        output::print_warning(&format!("{} target(s) failed", result.failed.len()));
        let rows: Vec<FailureDisplay> = result.failed.iter().map(failure_row).collect();
        output::print_list(&rows, &result.failed, format);
    }
}

fn failure_row(failure: &BatchFailure) -> FailureDisplay {
    FailureDisplay {
        target: failure.target.clone(),
        kind: failure.kind.to_string(),
        message: failure.message.clone(),
    }
}
