//! Group registry service.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::ValidateEmail;

use storyhub_core::config::GroupConfig;
use storyhub_core::error::{AppError, ErrorKind};
use storyhub_core::events::{ActivityEvent, GroupEvent};
use storyhub_core::result::AppResult;
use storyhub_core::traits::ActivityNotifier;
use storyhub_core::types::id::{AuthorId, GroupId, GroupInviteId};
use storyhub_database::store::{AuthorStore, GroupInviteStore, GroupStore, IdentityLookup, Stores};
use storyhub_entity::author::Author;
use storyhub_entity::group::{AddMemberOutcome, Group, GroupInvite};

use super::token::generate_token;
use crate::context::RequestContext;

/// Result of issuing a group invitation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupInviteOutcome {
    /// The invite record.
    pub invite_id: GroupInviteId,
    /// The inviting owner's group.
    pub group_id: GroupId,
    /// The invitee's account, if one exists.
    pub invited: Option<Author>,
    /// Invited address.
    pub email: String,
}

/// Result of answering a group invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupAcceptOutcome {
    /// Whether the invitation was accepted.
    pub accepted: bool,
    /// The joined group; `None` when declined.
    pub group: Option<GroupId>,
}

/// Role of an author inside a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupRole {
    /// Owns the group.
    Owner,
    /// Joined through an invitation.
    Member,
}

/// One row of the member listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMemberRow {
    /// The author.
    pub author_id: AuthorId,
    /// Display name, empty when the account is gone.
    pub name: String,
    /// Email address, empty when the account is gone.
    pub email: String,
    /// Owner or member.
    pub role: GroupRole,
    /// When the author joined; group creation time for the owner.
    pub joined_at: DateTime<Utc>,
}

/// Owns groups, their members, and group invitations.
#[derive(Debug, Clone)]
pub struct GroupService {
    /// Author store.
    authors: Arc<dyn AuthorStore>,
    /// Email to account lookup.
    identity: Arc<dyn IdentityLookup>,
    /// Group store.
    groups: Arc<dyn GroupStore>,
    /// Group invite store.
    invites: Arc<dyn GroupInviteStore>,
    /// Lifecycle event sink.
    notifier: Arc<dyn ActivityNotifier>,
    /// Membership limits and token size.
    config: GroupConfig,
}

impl GroupService {
    /// Creates a new group service.
    pub fn new(stores: &Stores, notifier: Arc<dyn ActivityNotifier>, config: GroupConfig) -> Self {
        Self {
            authors: Arc::clone(&stores.authors),
            identity: Arc::clone(&stores.identity),
            groups: Arc::clone(&stores.groups),
            invites: Arc::clone(&stores.group_invites),
            notifier,
            config,
        }
    }

    /// Invite an address into the caller's group, creating the group on
    /// first use.
    pub async fn invite(&self, ctx: &RequestContext, email: &str) -> AppResult<GroupInviteOutcome> {
        let email = email.trim().to_lowercase();
        if !email.validate_email() {
            return Err(AppError::bad_request("A valid email address is required"));
        }
        if self.groups.find_by_member(ctx.author_id).await?.is_some() {
            return Err(AppError::forbidden(
                "Group members cannot invite others; only the owner can",
            ));
        }

        let invitee = self.identity.find_by_email(&email).await?;
        if let Some(author) = &invitee {
            if author.id == ctx.author_id {
                return Err(AppError::invalid_self_operation(
                    "You cannot invite yourself to your group",
                ));
            }
            if let Some(current) = self.groups.find_by_member(author.id).await? {
                return Err(AppError::unprocessable(if current.is_owner(ctx.author_id) {
                    "User is already a member of this group"
                } else {
                    "User already belongs to another group"
                }));
            }
        }

        let group = self.owned_group(ctx.author_id).await?;
        let outstanding = self.invites.find_active_by_group(group.id).await?.len();
        if group.members.len() + outstanding >= self.config.max_members {
            return Err(AppError::unprocessable(format!(
                "A group can have at most {} members",
                self.config.max_members
            )));
        }

        let record = GroupInvite::new(
            group.id,
            ctx.author_id,
            invitee.as_ref().map(|a| a.id),
            &email,
            generate_token(self.config.invite_token_bytes),
        );
        let invite = match self.invites.insert_active(&record).await {
            Ok(invite) => invite,
            Err(e) if e.kind == ErrorKind::Conflict => {
                return Err(AppError::unprocessable("User is already invited to this group"));
            }
            Err(e) => return Err(e),
        };

        self.notifier.emit(ActivityEvent::group(
            ctx.author_id,
            GroupEvent::InviteSent {
                group_id: group.id,
                invite_id: invite.id,
                invited: invite.invited,
                email: invite.email.clone(),
                token: invite.token.clone(),
            },
        ));

        info!(group_id = %group.id, invite_id = %invite.id, "Group invitation sent");
        Ok(GroupInviteOutcome {
            invite_id: invite.id,
            group_id: group.id,
            invited: invitee,
            email: invite.email,
        })
    }

    /// Answer a group invitation by token.
    ///
    /// Unknown tokens are `NotFound`; tokens that were already answered or
    /// cancelled are `UnprocessableEntity`.
    pub async fn accept(
        &self,
        ctx: &RequestContext,
        token: &str,
        accept: bool,
    ) -> AppResult<GroupAcceptOutcome> {
        let invite = self
            .invites
            .find_by_token(token.trim())
            .await?
            .ok_or_else(|| AppError::not_found("Invitation not found"))?;
        if invite.is_resolved() {
            return Err(AppError::unprocessable(
                "This invitation has already been used",
            ));
        }

        let me = self
            .authors
            .find_by_id(ctx.author_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("Unknown author"))?;
        let addressed_to_me = match invite.invited {
            Some(invited) => invited == me.id,
            None => me.has_email(&invite.email),
        };
        if !addressed_to_me {
            return Err(AppError::forbidden(
                "This invitation is addressed to someone else",
            ));
        }

        if !accept {
            self.invites
                .resolve(invite.id, false, me.id)
                .await?
                .ok_or_else(|| AppError::unprocessable("This invitation has already been used"))?;
            info!(invite_id = %invite.id, "Group invitation declined");
            return Ok(GroupAcceptOutcome {
                accepted: false,
                group: None,
            });
        }

        let outcome = self.groups.add_member(invite.group_id, me.id).await?;
        match outcome {
            AddMemberOutcome::Added | AddMemberOutcome::AlreadyMember => {}
            AddMemberOutcome::MemberElsewhere => {
                return Err(AppError::unprocessable(
                    "You already belong to another group",
                ));
            }
            AddMemberOutcome::IsOwner => {
                return Err(AppError::invalid_self_operation(
                    "You cannot join your own group",
                ));
            }
            AddMemberOutcome::OwnsGroup => {
                return Err(AppError::unprocessable(
                    "You already own a group; group owners cannot join another group",
                ));
            }
            AddMemberOutcome::GroupMissing => return Err(AppError::not_found("Group not found")),
        }

        if self.invites.resolve(invite.id, true, me.id).await?.is_none() {
            if outcome == AddMemberOutcome::Added {
                warn!(invite_id = %invite.id, "Invitation closed concurrently, reverting join");
                self.groups.remove_member(invite.group_id, me.id).await?;
            }
            return Err(AppError::unprocessable(
                "This invitation has already been used",
            ));
        }

        self.notifier.emit(ActivityEvent::group(
            me.id,
            GroupEvent::MemberAdded {
                group_id: invite.group_id,
                author_id: me.id,
            },
        ));

        info!(group_id = %invite.group_id, author_id = %me.id, "Group member added");
        Ok(GroupAcceptOutcome {
            accepted: true,
            group: Some(invite.group_id),
        })
    }

    /// Leave the group the caller is a member of.
    pub async fn leave(&self, ctx: &RequestContext) -> AppResult<GroupId> {
        let group = self
            .groups
            .find_by_member(ctx.author_id)
            .await?
            .ok_or_else(|| AppError::not_found("You are not a member of any group"))?;
        if !self.groups.remove_member(group.id, ctx.author_id).await? {
            return Err(AppError::not_found("You are not a member of any group"));
        }

        self.notifier.emit(ActivityEvent::group(
            ctx.author_id,
            GroupEvent::MemberRemoved {
                group_id: group.id,
                author_id: ctx.author_id,
                left: true,
            },
        ));

        info!(group_id = %group.id, author_id = %ctx.author_id, "Group member left");
        Ok(group.id)
    }

    /// Remove a member from the caller's group. Owner only.
    pub async fn remove(
        &self,
        ctx: &RequestContext,
        group_id: GroupId,
        member_id: AuthorId,
    ) -> AppResult<()> {
        let group = self.group(group_id).await?;
        if !group.is_owner(ctx.author_id) {
            return Err(AppError::forbidden("Only the group owner can remove members"));
        }
        if group.is_owner(member_id) {
            return Err(AppError::invalid_self_operation(
                "The group owner cannot be removed from the group",
            ));
        }
        if !group.is_member(member_id) || !self.groups.remove_member(group_id, member_id).await? {
            return Err(AppError::bad_request("User is not a member of this group"));
        }

        self.notifier.emit(ActivityEvent::group(
            ctx.author_id,
            GroupEvent::MemberRemoved {
                group_id,
                author_id: member_id,
                left: false,
            },
        ));

        info!(group_id = %group_id, author_id = %member_id, "Group member removed");
        Ok(())
    }

    /// Withdraw an open invitation. Only the inviter may do this.
    pub async fn cancel_invite(
        &self,
        ctx: &RequestContext,
        invite_id: GroupInviteId,
    ) -> AppResult<GroupInvite> {
        let invite = self
            .invites
            .find_by_id(invite_id)
            .await?
            .ok_or_else(|| AppError::not_found("Invitation not found"))?;
        if invite.author_id != ctx.author_id {
            return Err(AppError::forbidden(
                "Only the inviter can cancel this invitation",
            ));
        }
        if !self.invites.deactivate(invite_id).await? {
            return Err(AppError::unprocessable("Invitation is no longer active"));
        }

        info!(invite_id = %invite_id, group_id = %invite.group_id, "Group invitation cancelled");
        Ok(GroupInvite {
            active: false,
            updated_at: Utc::now(),
            ..invite
        })
    }

    /// Owner and members of a group. Visible to the owner and members.
    pub async fn list_members(
        &self,
        ctx: &RequestContext,
        group_id: GroupId,
    ) -> AppResult<Vec<GroupMemberRow>> {
        let group = self.group(group_id).await?;
        if !group.includes(ctx.author_id) {
            return Err(AppError::forbidden("Only group members can list the group"));
        }

        let authors: HashMap<AuthorId, Author> = self
            .authors
            .find_many(&group.all_authors())
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();
        let row = |author_id: AuthorId, role: GroupRole, joined_at: DateTime<Utc>| {
            let author = authors.get(&author_id);
            GroupMemberRow {
                author_id,
                name: author.map(|a| a.name.clone()).unwrap_or_default(),
                email: author.map(|a| a.email.clone()).unwrap_or_default(),
                role,
                joined_at,
            }
        };

        let mut rows = vec![row(group.owner_id, GroupRole::Owner, group.created_at)];
        rows.extend(
            group
                .members
                .iter()
                .map(|m| row(m.author_id, GroupRole::Member, m.joined_at)),
        );
        Ok(rows)
    }

    /// Open invitations of a group. Owner only.
    pub async fn list_invites(
        &self,
        ctx: &RequestContext,
        group_id: GroupId,
    ) -> AppResult<Vec<GroupInvite>> {
        let group = self.group(group_id).await?;
        if !group.is_owner(ctx.author_id) {
            return Err(AppError::forbidden("Only the group owner can list invitations"));
        }
        self.invites.find_active_by_group(group_id).await
    }

    /// The group an author owns or belongs to.
    pub async fn group_of(&self, author_id: AuthorId) -> AppResult<Option<Group>> {
        if let Some(group) = self.groups.find_by_owner(author_id).await? {
            return Ok(Some(group));
        }
        self.groups.find_by_member(author_id).await
    }

    async fn group(&self, group_id: GroupId) -> AppResult<Group> {
        self.groups
            .find_by_id(group_id)
            .await?
            .ok_or_else(|| AppError::not_found("Group not found"))
    }

    async fn owned_group(&self, owner_id: AuthorId) -> AppResult<Group> {
        if let Some(group) = self.groups.find_by_owner(owner_id).await? {
            return Ok(group);
        }
        match self.groups.create(&Group::new(owner_id)).await {
            Ok(group) => {
                info!(group_id = %group.id, owner_id = %owner_id, "Group created");
                Ok(group)
            }
            Err(e) if e.kind == ErrorKind::Conflict => self
                .groups
                .find_by_owner(owner_id)
                .await?
                .ok_or_else(|| AppError::internal("Group vanished after creation conflict")),
            Err(e) => Err(e),
        }
    }
}
