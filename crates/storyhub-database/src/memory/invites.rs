use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;

use storyhub_core::error::AppError;
use storyhub_core::result::AppResult;
use storyhub_core::types::id::{AuthorId, CollaborationInviteId, GroupId, GroupInviteId, StoryId};
use storyhub_entity::collaboration::CollaborationInvite;
use storyhub_entity::group::GroupInvite;

use super::{MemoryStore, normalize_email};
use crate::store::{CollaborationInviteStore, GroupInviteStore};

impl MemoryStore {
    /// Flip an active collaboration invite to inactive, applying `answer`
    /// first. Holds the active-index entry for the whole transition.
    fn close_collaboration_invite(
        &self,
        id: CollaborationInviteId,
        answer: impl FnOnce(&mut CollaborationInvite),
    ) -> Option<CollaborationInvite> {
        let key = {
            let invite = self.collaboration_invites.get(&id)?;
            if !invite.active {
                return None;
            }
            (invite.story_id, invite.email.clone())
        };

        match self.active_collaboration_invites.entry(key) {
            Entry::Occupied(slot) if *slot.get() == id => {
                let mut invite = self.collaboration_invites.get_mut(&id)?;
                answer(&mut invite);
                invite.active = false;
                invite.updated_at = Utc::now();
                let closed = invite.clone();
                drop(invite);
                slot.remove();
                Some(closed)
            }
            _ => None,
        }
    }

    fn close_group_invite(
        &self,
        id: GroupInviteId,
        answer: impl FnOnce(&mut GroupInvite),
    ) -> Option<GroupInvite> {
        let key = {
            let invite = self.group_invites.get(&id)?;
            if !invite.active {
                return None;
            }
            (invite.group_id, invite.email.clone())
        };

        match self.active_group_invites.entry(key) {
            Entry::Occupied(slot) if *slot.get() == id => {
                let mut invite = self.group_invites.get_mut(&id)?;
                answer(&mut invite);
                invite.active = false;
                invite.updated_at = Utc::now();
                let closed = invite.clone();
                drop(invite);
                slot.remove();
                Some(closed)
            }
            _ => None,
        }
    }

    fn collaboration_invites_where(
        &self,
        predicate: impl Fn(&CollaborationInvite) -> bool,
    ) -> Vec<CollaborationInvite> {
        let mut invites: Vec<CollaborationInvite> = self
            .collaboration_invites
            .iter()
            .filter(|i| predicate(i.value()))
            .map(|i| i.clone())
            .collect();
        invites.sort_by_key(|i| (i.created_at, i.id));
        invites
    }
}

#[async_trait]
impl CollaborationInviteStore for MemoryStore {
    async fn insert_active(&self, invite: &CollaborationInvite) -> AppResult<CollaborationInvite> {
        let mut invite = invite.clone();
        invite.email = normalize_email(&invite.email);
        invite.active = true;
        invite.accepted = None;

        match self
            .active_collaboration_invites
            .entry((invite.story_id, invite.email.clone()))
        {
            Entry::Occupied(_) => Err(AppError::conflict(format!(
                "An active invitation for '{}' already exists on story {}",
                invite.email, invite.story_id
            ))),
            Entry::Vacant(slot) => {
                self.collaboration_invites.insert(invite.id, invite.clone());
                slot.insert(invite.id);
                Ok(invite)
            }
        }
    }

    async fn find_by_id(
        &self,
        id: CollaborationInviteId,
    ) -> AppResult<Option<CollaborationInvite>> {
        Ok(self.collaboration_invites.get(&id).map(|i| i.clone()))
    }

    async fn find_active_by_story(&self, story_id: StoryId) -> AppResult<Vec<CollaborationInvite>> {
        Ok(self.collaboration_invites_where(|i| i.active && i.story_id == story_id))
    }

    async fn find_active_by_email(&self, email: &str) -> AppResult<Vec<CollaborationInvite>> {
        let email = normalize_email(email);
        Ok(self.collaboration_invites_where(|i| i.active && i.email == email))
    }

    async fn deactivate(&self, id: CollaborationInviteId) -> AppResult<bool> {
        Ok(self.close_collaboration_invite(id, |_| {}).is_some())
    }

    async fn deactivate_by_emails(
        &self,
        story_id: StoryId,
        emails: &[String],
    ) -> AppResult<Vec<CollaborationInvite>> {
        let ids: Vec<CollaborationInviteId> = emails
            .iter()
            .filter_map(|email| {
                self.active_collaboration_invites
                    .get(&(story_id, normalize_email(email)))
                    .map(|id| *id)
            })
            .collect();

        Ok(ids
            .into_iter()
            .filter_map(|id| self.close_collaboration_invite(id, |_| {}))
            .collect())
    }

    async fn deactivate_for_author(&self, story_id: StoryId, author_id: AuthorId) -> AppResult<u64> {
        let ids: Vec<CollaborationInviteId> = self
            .collaboration_invites_where(|i| {
                i.active && i.story_id == story_id && i.invited == Some(author_id)
            })
            .into_iter()
            .map(|i| i.id)
            .collect();

        Ok(ids
            .into_iter()
            .filter_map(|id| self.close_collaboration_invite(id, |_| {}))
            .count() as u64)
    }

    async fn resolve(
        &self,
        id: CollaborationInviteId,
        accepted: bool,
    ) -> AppResult<Option<CollaborationInvite>> {
        Ok(self.close_collaboration_invite(id, |invite| invite.accepted = Some(accepted)))
    }

    async fn attach_invited(
        &self,
        id: CollaborationInviteId,
        author_id: AuthorId,
    ) -> AppResult<bool> {
        let Some(mut invite) = self.collaboration_invites.get_mut(&id) else {
            return Ok(false);
        };
        if !invite.active || invite.invited.is_some() {
            return Ok(false);
        }
        invite.invited = Some(author_id);
        invite.updated_at = Utc::now();
        Ok(true)
    }

    async fn set_edit_for_author(
        &self,
        story_id: StoryId,
        author_id: AuthorId,
        edit: bool,
    ) -> AppResult<u64> {
        let mut updated = 0;
        for mut invite in self.collaboration_invites.iter_mut() {
            if invite.active && invite.story_id == story_id && invite.invited == Some(author_id) {
                invite.edit = edit;
                invite.updated_at = Utc::now();
                updated += 1;
            }
        }
        Ok(updated)
    }
}

#[async_trait]
impl GroupInviteStore for MemoryStore {
    async fn insert_active(&self, invite: &GroupInvite) -> AppResult<GroupInvite> {
        let mut invite = invite.clone();
        invite.email = normalize_email(&invite.email);
        invite.active = true;
        invite.accepted = None;

        match self
            .active_group_invites
            .entry((invite.group_id, invite.email.clone()))
        {
            Entry::Occupied(_) => Err(AppError::conflict(format!(
                "An active group invitation for '{}' already exists",
                invite.email
            ))),
            Entry::Vacant(slot) => match self.group_invite_tokens.entry(invite.token.clone()) {
                Entry::Occupied(_) => Err(AppError::conflict("Group invite token collision")),
                Entry::Vacant(token_slot) => {
                    self.group_invites.insert(invite.id, invite.clone());
                    token_slot.insert(invite.id);
                    slot.insert(invite.id);
                    Ok(invite)
                }
            },
        }
    }

    async fn find_by_id(&self, id: GroupInviteId) -> AppResult<Option<GroupInvite>> {
        Ok(self.group_invites.get(&id).map(|i| i.clone()))
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<GroupInvite>> {
        let id = self.group_invite_tokens.get(token).map(|id| *id);
        Ok(id.and_then(|id| self.group_invites.get(&id).map(|i| i.clone())))
    }

    async fn find_active_by_group(&self, group_id: GroupId) -> AppResult<Vec<GroupInvite>> {
        let mut invites: Vec<GroupInvite> = self
            .group_invites
            .iter()
            .filter(|i| i.active && i.group_id == group_id)
            .map(|i| i.clone())
            .collect();
        invites.sort_by_key(|i| (i.created_at, i.id));
        Ok(invites)
    }

    async fn resolve(
        &self,
        id: GroupInviteId,
        accepted: bool,
        invited: AuthorId,
    ) -> AppResult<Option<GroupInvite>> {
        Ok(self.close_group_invite(id, |invite| {
            invite.accepted = Some(accepted);
            invite.invited = Some(invited);
        }))
    }

    async fn deactivate(&self, id: GroupInviteId) -> AppResult<bool> {
        Ok(self.close_group_invite(id, |_| {}).is_some())
    }
}
