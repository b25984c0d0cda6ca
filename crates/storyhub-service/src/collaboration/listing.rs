//! Collaborator and pending-invite listings.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storyhub_core::types::id::{AuthorId, CollaborationInviteId};
use storyhub_entity::author::Author;
use storyhub_entity::collaboration::CollaborationInvite;
use storyhub_entity::story::Story;

/// One row of the collaborator listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaboratorRow {
    /// The author.
    pub author_id: AuthorId,
    /// Display name.
    pub name: String,
    /// Handle.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Whether the author may edit.
    pub edit: bool,
    /// Whether this row is the story owner, the only role that may invite.
    pub can_invite: bool,
}

/// One row of the pending-invite listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingInviteRow {
    /// The invite.
    pub invite_id: CollaborationInviteId,
    /// Invitee account, when one exists.
    pub author_id: Option<AuthorId>,
    /// Invitee display name, when an account exists.
    pub name: Option<String>,
    /// Invitee handle, when an account exists.
    pub username: Option<String>,
    /// Invited address.
    pub email: String,
    /// Requested permission.
    pub edit: bool,
    /// Always false: invitees cannot invite.
    pub can_invite: bool,
    /// When the invite was issued.
    pub invited_at: DateTime<Utc>,
}

impl PendingInviteRow {
    fn matches_search(&self, needle: &str) -> bool {
        self.email.contains(needle)
            || self
                .name
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains(needle))
            || self
                .username
                .as_deref()
                .is_some_and(|u| u.to_lowercase().contains(needle))
    }
}

/// Lowercase, trimmed search needle; blank searches match everything.
pub(crate) fn search_needle(search: Option<&str>) -> Option<String> {
    search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}

/// Owner first, then collaborators in the order they were added.
pub(crate) fn collaborator_rows(
    story: &Story,
    authors: &HashMap<AuthorId, Author>,
    needle: Option<&str>,
) -> Vec<CollaboratorRow> {
    let owner = authors.get(&story.owner_id).map(|a| CollaboratorRow {
        author_id: a.id,
        name: a.name.clone(),
        username: a.username.clone(),
        email: a.email.clone(),
        edit: true,
        can_invite: true,
    });

    let collaborators = story.collaborators.iter().filter_map(|c| {
        authors.get(&c.author_id).map(|a| CollaboratorRow {
            author_id: a.id,
            name: a.name.clone(),
            username: a.username.clone(),
            email: a.email.clone(),
            edit: c.edit,
            can_invite: false,
        })
    });

    owner
        .into_iter()
        .chain(collaborators)
        .filter(|row| match needle {
            Some(needle) => {
                row.name.to_lowercase().contains(needle)
                    || row.username.to_lowercase().contains(needle)
                    || row.email.to_lowercase().contains(needle)
            }
            None => true,
        })
        .collect()
}

/// Active, unanswered invites, oldest first.
pub(crate) fn pending_rows(
    invites: Vec<CollaborationInvite>,
    authors: &HashMap<AuthorId, Author>,
    needle: Option<&str>,
) -> Vec<PendingInviteRow> {
    invites
        .into_iter()
        .filter(CollaborationInvite::is_pending)
        .map(|invite| {
            let account = invite.invited.and_then(|id| authors.get(&id));
            PendingInviteRow {
                invite_id: invite.id,
                author_id: invite.invited,
                name: account.map(|a| a.name.clone()),
                username: account.map(|a| a.username.clone()),
                email: invite.email,
                edit: invite.edit,
                can_invite: false,
                invited_at: invite.created_at,
            }
        })
        .filter(|row| needle.is_none_or(|n| row.matches_search(n)))
        .collect()
}
