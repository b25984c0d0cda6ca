use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;

use storyhub_core::error::AppError;
use storyhub_core::result::AppResult;
use storyhub_core::types::id::{AuthorId, GroupId};
use storyhub_entity::group::{AddMemberOutcome, Group, GroupMember};

use super::MemoryStore;
use crate::store::GroupStore;

#[async_trait]
impl GroupStore for MemoryStore {
    async fn find_by_id(&self, id: GroupId) -> AppResult<Option<Group>> {
        Ok(self.groups.get(&id).map(|g| g.clone()))
    }

    async fn find_by_owner(&self, owner_id: AuthorId) -> AppResult<Option<Group>> {
        let id = self.group_owners.get(&owner_id).map(|id| *id);
        Ok(id.and_then(|id| self.groups.get(&id).map(|g| g.clone())))
    }

    async fn find_by_member(&self, author_id: AuthorId) -> AppResult<Option<Group>> {
        let id = self.group_members.get(&author_id).map(|id| *id);
        Ok(id.and_then(|id| self.groups.get(&id).map(|g| g.clone())))
    }

    async fn create(&self, group: &Group) -> AppResult<Group> {
        match self.group_owners.entry(group.owner_id) {
            Entry::Occupied(_) => Err(AppError::conflict(format!(
                "Author {} already owns a group",
                group.owner_id
            ))),
            Entry::Vacant(slot) => {
                self.groups.insert(group.id, group.clone());
                slot.insert(group.id);
                Ok(group.clone())
            }
        }
    }

    async fn add_member(
        &self,
        group_id: GroupId,
        author_id: AuthorId,
    ) -> AppResult<AddMemberOutcome> {
        match self.group_members.entry(author_id) {
            Entry::Occupied(slot) if *slot.get() == group_id => Ok(AddMemberOutcome::AlreadyMember),
            Entry::Occupied(_) => Ok(AddMemberOutcome::MemberElsewhere),
            Entry::Vacant(slot) => {
                let owned = self.group_owners.get(&author_id).map(|id| *id);
                if owned.is_some_and(|id| id != group_id) {
                    return Ok(AddMemberOutcome::OwnsGroup);
                }
                let Some(mut group) = self.groups.get_mut(&group_id) else {
                    return Ok(AddMemberOutcome::GroupMissing);
                };
                if group.is_owner(author_id) {
                    return Ok(AddMemberOutcome::IsOwner);
                }
                group.members.push(GroupMember {
                    author_id,
                    joined_at: Utc::now(),
                });
                drop(group);
                slot.insert(group_id);
                Ok(AddMemberOutcome::Added)
            }
        }
    }

    async fn remove_member(&self, group_id: GroupId, author_id: AuthorId) -> AppResult<bool> {
        match self.group_members.entry(author_id) {
            Entry::Occupied(slot) if *slot.get() == group_id => {
                if let Some(mut group) = self.groups.get_mut(&group_id) {
                    group.members.retain(|m| m.author_id != author_id);
                }
                slot.remove();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
