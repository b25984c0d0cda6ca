//! Collaboration registry service.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use storyhub_core::config::CollaborationConfig;
use storyhub_core::error::{AppError, ErrorKind};
use storyhub_core::events::{ActivityEvent, CollaborationEvent};
use storyhub_core::result::AppResult;
use storyhub_core::traits::ActivityNotifier;
use storyhub_core::types::id::{AuthorId, CollaborationInviteId, StoryId};
use storyhub_core::types::pagination::{PageRequest, PageResponse};
use storyhub_database::store::{
    AuthorStore, CollaborationInviteStore, IdentityLookup, PageStore, StoryStore, Stores,
};
use storyhub_entity::author::Author;
use storyhub_entity::collaboration::CollaborationInvite;
use storyhub_entity::story::{AddCollaboratorOutcome, Collaborator, Story};

use super::batch::BatchResult;
use super::listing::{
    CollaboratorRow, PendingInviteRow, collaborator_rows, pending_rows, search_needle,
};
use super::target::InviteTarget;
use crate::context::RequestContext;
use crate::permission::{Audience, Capabilities, PermissionResolver};

const ALREADY_INVITED: &str = "User is already invited to this Story";
const NOT_A_COLLABORATOR: &str = "You are not a collaborator on this Story";
const INVITE_CLOSED: &str = "Invitation is no longer active";

/// A successfully invited target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitedCollaborator {
    /// The durable invite record.
    pub invite_id: CollaborationInviteId,
    /// The invitee account; `None` for an address with no account yet.
    pub author_id: Option<AuthorId>,
    /// Invited address.
    pub email: String,
    /// Granted permission.
    pub edit: bool,
    /// Whether a collaborator entry was created right away.
    pub added: bool,
}

/// Result of cancelling invitations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOutcome {
    /// Invites that transitioned to inactive.
    pub cancelled: u64,
    /// Caller-facing summary.
    pub message: String,
}

/// Result of leaving a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveOutcome {
    /// The story that was left.
    pub story_id: StoryId,
    /// Pages purged as part of leaving.
    pub pages_deleted: u64,
}

/// Owns per-story invitation and collaborator state.
#[derive(Debug, Clone)]
pub struct CollaborationService {
    /// Author store.
    authors: Arc<dyn AuthorStore>,
    /// Email to account lookup.
    identity: Arc<dyn IdentityLookup>,
    /// Story store.
    stories: Arc<dyn StoryStore>,
    /// Page store, for leave-with-purge.
    pages: Arc<dyn PageStore>,
    /// Invite store.
    invites: Arc<dyn CollaborationInviteStore>,
    /// Lifecycle event sink.
    notifier: Arc<dyn ActivityNotifier>,
    /// Capability rules.
    resolver: PermissionResolver,
    /// Listing and batch limits.
    config: CollaborationConfig,
}

impl CollaborationService {
    /// Creates a new collaboration service.
    pub fn new(
        stores: &Stores,
        notifier: Arc<dyn ActivityNotifier>,
        config: CollaborationConfig,
    ) -> Self {
        Self {
            authors: Arc::clone(&stores.authors),
            identity: Arc::clone(&stores.identity),
            stories: Arc::clone(&stores.stories),
            pages: Arc::clone(&stores.pages),
            invites: Arc::clone(&stores.collaboration_invites),
            notifier,
            resolver: PermissionResolver::new(),
            config,
        }
    }

    /// Invite one or many targets onto a story.
    ///
    /// Targets with an account become collaborators immediately; the invite
    /// record is the cancellable trace of how they were added. Address-only
    /// targets get an active invite and no entry until the account exists.
    pub async fn invite(
        &self,
        ctx: &RequestContext,
        story_id: StoryId,
        targets: Vec<InviteTarget>,
    ) -> AppResult<BatchResult<InvitedCollaborator>> {
        if targets.is_empty() {
            return Err(AppError::bad_request("At least one invitation is required"));
        }
        if targets.len() > self.config.max_invite_targets {
            return Err(AppError::bad_request(format!(
                "At most {} invitations can be sent at once",
                self.config.max_invite_targets
            )));
        }

        let story = self.live_story(story_id).await?;
        let caps = self.capabilities(&story, ctx);
        if !caps.can_edit {
            return Err(AppError::forbidden(
                "Only the owner or an editing collaborator can invite",
            ));
        }

        let mut result = BatchResult::new();
        for target in targets {
            let label = target.label();
            let outcome = self.invite_one(ctx, &story, target).await;
            result.record(label, outcome)?;
        }

        info!(
            story_id = %story_id,
            inviter = %ctx.author_id,
            invited = result.succeeded.len(),
            rejected = result.failed.len(),
            "Collaborators invited"
        );
        Ok(result)
    }

    async fn invite_one(
        &self,
        ctx: &RequestContext,
        story: &Story,
        target: InviteTarget,
    ) -> AppResult<InvitedCollaborator> {
        target.check()?;

        let (invitee, email) = match target.author_id {
            Some(author_id) => {
                let author = self
                    .authors
                    .find_by_id(author_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Author not found"))?;
                let email = author.email.clone();
                (Some(author), email)
            }
            None => {
                let email = target.email.as_deref().unwrap_or_default().trim().to_lowercase();
                (self.identity.find_by_email(&email).await?, email)
            }
        };

        if let Some(author) = &invitee {
            if author.id == ctx.author_id || story.is_owner(author.id) {
                return Err(AppError::invalid_self_operation(
                    "You cannot invite yourself or the Story owner",
                ));
            }
            if story.collaborators.contains(&author.id) {
                return Err(AppError::already_collaborator());
            }
        }

        let invited = invitee.as_ref().map(|a| a.id);
        let record = CollaborationInvite::new(story.id, ctx.author_id, invited, &email, target.edit);
        let invite = match self.invites.insert_active(&record).await {
            Ok(invite) => invite,
            Err(e) if e.kind == ErrorKind::Conflict => {
                // The snapshot may predate an earlier target of this batch or a racing invite.
                if let Some(author_id) = invited {
                    let current = self.live_story(story.id).await?;
                    if current.collaborators.contains(&author_id) {
                        return Err(AppError::already_collaborator());
                    }
                }
                return Err(AppError::unprocessable(ALREADY_INVITED));
            }
            Err(e) => return Err(e),
        };

        let added = match invited {
            Some(author_id) => {
                let outcome = self
                    .stories
                    .add_collaborator(story.id, Collaborator::new(author_id, target.edit))
                    .await;
                match outcome {
                    Ok(AddCollaboratorOutcome::Inserted) => true,
                    Ok(rejected) => {
                        self.invites.deactivate(invite.id).await?;
                        return Err(match rejected {
                            AddCollaboratorOutcome::AlreadyPresent => {
                                AppError::already_collaborator()
                            }
                            AddCollaboratorOutcome::OwnerRejected => {
                                AppError::invalid_self_operation("The Story owner cannot be invited")
                            }
                            _ => AppError::not_found("Story not found"),
                        });
                    }
                    Err(e) => {
                        self.invites.deactivate(invite.id).await?;
                        return Err(e);
                    }
                }
            }
            None => false,
        };

        self.notifier.emit(ActivityEvent::collaboration(
            ctx.author_id,
            CollaborationEvent::Added {
                story_id: story.id,
                invite_id: invite.id,
                author_id: invited,
                email: invite.email.clone(),
                edit: invite.edit,
            },
        ));

        Ok(InvitedCollaborator {
            invite_id: invite.id,
            author_id: invited,
            email: invite.email,
            edit: invite.edit,
            added,
        })
    }

    /// Cancel every active invite of the story addressed to one of `emails`
    /// and drop the matching collaborator entries. Owner only.
    pub async fn cancel(
        &self,
        ctx: &RequestContext,
        story_id: StoryId,
        emails: Vec<String>,
    ) -> AppResult<CancelOutcome> {
        let emails: Vec<String> = emails
            .iter()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        if emails.is_empty() {
            return Err(AppError::bad_request("At least one email is required"));
        }

        let story = self.live_story(story_id).await?;
        if !self.capabilities(&story, ctx).can_administer {
            return Err(AppError::forbidden(
                "Only the Story owner can cancel invitations",
            ));
        }

        let closed = self.invites.deactivate_by_emails(story_id, &emails).await?;
        let attached: Vec<AuthorId> = closed.iter().filter_map(|i| i.invited).collect();
        if !attached.is_empty() {
            self.stories.remove_collaborators(story_id, &attached).await?;
        }

        for invite in &closed {
            self.notifier.emit(ActivityEvent::collaboration(
                ctx.author_id,
                CollaborationEvent::Removed {
                    story_id,
                    author_id: invite.invited,
                    email: Some(invite.email.clone()),
                },
            ));
        }

        let cancelled = closed.len() as u64;
        info!(story_id = %story_id, cancelled, "Invitations cancelled");
        Ok(CancelOutcome {
            cancelled,
            message: format!("The {cancelled} invitation(s) has been cancelled successfully"),
        })
    }

    /// Change the edit flag of an existing collaborator.
    pub async fn update_permission(
        &self,
        ctx: &RequestContext,
        story_id: StoryId,
        target: AuthorId,
        edit: bool,
    ) -> AppResult<Collaborator> {
        let story = self.live_story(story_id).await?;
        if !self.capabilities(&story, ctx).can_edit {
            return Err(AppError::forbidden(
                "Only the owner or an editing collaborator can change permissions",
            ));
        }

        if !self
            .stories
            .set_collaborator_edit(story_id, target, edit)
            .await?
        {
            return Err(AppError::unprocessable("Collaborator not found"));
        }
        self.invites
            .set_edit_for_author(story_id, target, edit)
            .await?;

        info!(story_id = %story_id, author_id = %target, edit, "Collaborator permission updated");

        let updated = self.live_story(story_id).await?;
        updated
            .collaborators
            .get(&target)
            .cloned()
            .ok_or_else(|| AppError::unprocessable("Collaborator not found"))
    }

    /// Remove collaborators. Owner only.
    ///
    /// Always answers with the per-target outcome and always closes the
    /// originating invite of each target.
    pub async fn remove(
        &self,
        ctx: &RequestContext,
        story_id: StoryId,
        targets: Vec<AuthorId>,
    ) -> AppResult<BatchResult<AuthorId>> {
        if targets.is_empty() {
            return Err(AppError::bad_request("At least one collaborator is required"));
        }

        let story = self.live_story(story_id).await?;
        if !self.capabilities(&story, ctx).can_administer {
            return Err(AppError::forbidden(
                "Only the Story owner can remove collaborators",
            ));
        }

        let mut result = BatchResult::new();
        let mut candidates = Vec::with_capacity(targets.len());
        for target in targets {
            if candidates.contains(&target) {
                continue;
            }
            if story.is_owner(target) {
                result.fail(
                    target.to_string(),
                    AppError::invalid_self_operation("The Story owner cannot be removed"),
                );
                continue;
            }
            candidates.push(target);
        }

        let removed = if candidates.is_empty() {
            Vec::new()
        } else {
            self.stories.remove_collaborators(story_id, &candidates).await?
        };

        for target in candidates {
            self.invites.deactivate_for_author(story_id, target).await?;
            if removed.contains(&target) {
                self.notifier.emit(ActivityEvent::collaboration(
                    ctx.author_id,
                    CollaborationEvent::Removed {
                        story_id,
                        author_id: Some(target),
                        email: None,
                    },
                ));
                result.succeeded.push(target);
            } else {
                result.fail(
                    target.to_string(),
                    AppError::unprocessable("User is not a collaborator on this Story"),
                );
            }
        }

        info!(
            story_id = %story_id,
            removed = result.succeeded.len(),
            rejected = result.failed.len(),
            "Collaborators removed"
        );
        Ok(result)
    }

    /// Remove the caller's own collaborator entry, optionally purging the
    /// pages they wrote in the story.
    ///
    /// Pages go first: if a later step fails the call can be retried, and
    /// deleting pages that are already gone is a no-op.
    pub async fn leave(
        &self,
        ctx: &RequestContext,
        story_id: StoryId,
        delete_pages: bool,
    ) -> AppResult<LeaveOutcome> {
        let story = self.live_story(story_id).await?;
        if story.is_owner(ctx.author_id) {
            return Err(AppError::invalid_self_operation(
                "The Story owner cannot leave their own Story",
            ));
        }
        if !story.collaborators.contains(&ctx.author_id) {
            return Err(AppError::unprocessable(NOT_A_COLLABORATOR));
        }

        let pages_deleted = if delete_pages {
            let ids: Vec<_> = self
                .pages
                .find_by_story_and_author(story_id, ctx.author_id)
                .await?
                .into_iter()
                .map(|p| p.id)
                .collect();
            self.pages.delete_many(&ids).await?
        } else {
            0
        };

        let removed = self
            .stories
            .remove_collaborators(story_id, &[ctx.author_id])
            .await?;
        if removed.is_empty() {
            return Err(AppError::unprocessable(NOT_A_COLLABORATOR));
        }
        self.invites
            .deactivate_for_author(story_id, ctx.author_id)
            .await?;

        self.notifier.emit(ActivityEvent::collaboration(
            ctx.author_id,
            CollaborationEvent::Left {
                story_id,
                author_id: ctx.author_id,
                pages_deleted,
            },
        ));

        info!(story_id = %story_id, author_id = %ctx.author_id, pages_deleted, "Collaborator left");
        Ok(LeaveOutcome {
            story_id,
            pages_deleted,
        })
    }

    /// Accept or decline an invitation as the invitee.
    ///
    /// Declining drops the collaborator entry the invite created.
    pub async fn respond(
        &self,
        ctx: &RequestContext,
        invite_id: CollaborationInviteId,
        accept: bool,
    ) -> AppResult<CollaborationInvite> {
        let invite = self
            .invites
            .find_by_id(invite_id)
            .await?
            .ok_or_else(|| AppError::not_found("Invitation not found"))?;

        match invite.invited {
            Some(invited) if invited == ctx.author_id => {}
            Some(_) => {
                return Err(AppError::forbidden("This invitation is addressed to someone else"));
            }
            None => {
                let me = self.requester(ctx).await?;
                if !me.has_email(&invite.email) {
                    return Err(AppError::forbidden(
                        "This invitation is addressed to someone else",
                    ));
                }
            }
        }
        if !invite.active {
            return Err(AppError::unprocessable(INVITE_CLOSED));
        }

        if accept && invite.invited.is_none() {
            self.invites.attach_invited(invite.id, ctx.author_id).await?;
            let outcome = self
                .stories
                .add_collaborator(invite.story_id, Collaborator::new(ctx.author_id, invite.edit))
                .await?;
            match outcome {
                AddCollaboratorOutcome::Inserted | AddCollaboratorOutcome::AlreadyPresent => {}
                AddCollaboratorOutcome::OwnerRejected => {
                    self.invites.deactivate(invite.id).await?;
                    return Err(AppError::invalid_self_operation(
                        "The Story owner cannot accept an invitation to their own Story",
                    ));
                }
                AddCollaboratorOutcome::StoryMissing => {
                    self.invites.deactivate(invite.id).await?;
                    return Err(AppError::not_found("Story not found"));
                }
            }
        }

        let resolved = self
            .invites
            .resolve(invite.id, accept)
            .await?
            .ok_or_else(|| AppError::unprocessable(INVITE_CLOSED))?;

        if !accept {
            self.stories
                .remove_collaborators(invite.story_id, &[ctx.author_id])
                .await?;
            self.notifier.emit(ActivityEvent::collaboration(
                ctx.author_id,
                CollaborationEvent::ShareDeclined {
                    story_id: invite.story_id,
                    invite_id: invite.id,
                    author_id: ctx.author_id,
                },
            ));
        }

        info!(
            invite_id = %invite.id,
            story_id = %invite.story_id,
            accepted = accept,
            "Invitation answered"
        );
        Ok(resolved)
    }

    /// Attach every active address-only invite matching the author's email
    /// and create the collaborator entries they stand for.
    pub async fn claim_pending(&self, author_id: AuthorId) -> AppResult<Vec<CollaborationInvite>> {
        let author = self
            .authors
            .find_by_id(author_id)
            .await?
            .ok_or_else(|| AppError::not_found("Author not found"))?;

        let mut claimed = Vec::new();
        for invite in self.invites.find_active_by_email(&author.email).await? {
            if invite.invited.is_some() {
                continue;
            }
            if !self.invites.attach_invited(invite.id, author_id).await? {
                continue;
            }

            let outcome = self
                .stories
                .add_collaborator(invite.story_id, Collaborator::new(author_id, invite.edit))
                .await?;
            match outcome {
                AddCollaboratorOutcome::Inserted => {
                    self.notifier.emit(ActivityEvent::collaboration(
                        invite.author_id,
                        CollaborationEvent::Added {
                            story_id: invite.story_id,
                            invite_id: invite.id,
                            author_id: Some(author_id),
                            email: invite.email.clone(),
                            edit: invite.edit,
                        },
                    ));
                }
                AddCollaboratorOutcome::AlreadyPresent => {}
                AddCollaboratorOutcome::OwnerRejected | AddCollaboratorOutcome::StoryMissing => {
                    warn!(
                        invite_id = %invite.id,
                        outcome = ?outcome,
                        "Closing unclaimable invitation"
                    );
                    self.invites.deactivate(invite.id).await?;
                    continue;
                }
            }

            claimed.push(CollaborationInvite {
                invited: Some(author_id),
                ..invite
            });
        }

        if !claimed.is_empty() {
            info!(author_id = %author_id, claimed = claimed.len(), "Pending invitations claimed");
        }
        Ok(claimed)
    }

    /// The owner followed by every collaborator, filtered by `search`.
    pub async fn list_collaborators(
        &self,
        ctx: &RequestContext,
        story_id: StoryId,
        page: PageRequest,
        search: Option<&str>,
    ) -> AppResult<PageResponse<CollaboratorRow>> {
        let story = self.participant_story(ctx, story_id).await?;

        let mut ids = vec![story.owner_id];
        ids.extend(story.collaborators.author_ids());
        let authors = self.author_map(&ids).await?;

        let needle = search_needle(search);
        let rows = collaborator_rows(&story, &authors, needle.as_deref());
        Ok(page.paginate(rows))
    }

    /// Active invites that have not been answered yet, filtered by `search`.
    pub async fn list_pending(
        &self,
        ctx: &RequestContext,
        story_id: StoryId,
        page: PageRequest,
        search: Option<&str>,
    ) -> AppResult<PageResponse<PendingInviteRow>> {
        self.participant_story(ctx, story_id).await?;

        let invites = self.invites.find_active_by_story(story_id).await?;
        let ids: Vec<AuthorId> = invites.iter().filter_map(|i| i.invited).collect();
        let authors = self.author_map(&ids).await?;

        let needle = search_needle(search);
        let rows = pending_rows(invites, &authors, needle.as_deref());
        Ok(page.paginate(rows))
    }

    /// Page size used when the caller does not pick one.
    pub fn default_page(&self) -> PageRequest {
        PageRequest::new(1, self.config.page_size)
    }

    async fn live_story(&self, story_id: StoryId) -> AppResult<Story> {
        match self.stories.find_by_id(story_id).await? {
            Some(story) if !story.is_deleted() => Ok(story),
            _ => Err(AppError::not_found("Story not found")),
        }
    }

    async fn participant_story(&self, ctx: &RequestContext, story_id: StoryId) -> AppResult<Story> {
        let story = self.live_story(story_id).await?;
        if !self.capabilities(&story, ctx).is_participant() {
            return Err(AppError::forbidden(
                "Only the owner and collaborators can list collaborators",
            ));
        }
        Ok(story)
    }

    fn capabilities(&self, story: &Story, ctx: &RequestContext) -> Capabilities {
        self.resolver
            .resolve(story, ctx.author_id, Audience::default())
    }

    async fn requester(&self, ctx: &RequestContext) -> AppResult<Author> {
        self.authors
            .find_by_id(ctx.author_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("Unknown author"))
    }

    async fn author_map(&self, ids: &[AuthorId]) -> AppResult<HashMap<AuthorId, Author>> {
        Ok(self
            .authors
            .find_many(ids)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect())
    }
}
