//! Process-local store backed by `dashmap`.
//!
//! Each uniqueness rule is guarded by an index map whose entry lock is held
//! for the whole mutation. Locks are always taken index-first, then the
//! record map, so concurrent mutations cannot deadlock.

mod authors;
mod groups;
mod invites;
mod stories;

use dashmap::DashMap;

use storyhub_core::types::id::{
    AuthorId, CollaborationInviteId, GroupId, GroupInviteId, PageId, StoryId,
};
use storyhub_entity::author::Author;
use storyhub_entity::collaboration::CollaborationInvite;
use storyhub_entity::group::{Group, GroupInvite};
use storyhub_entity::page::Page;
use storyhub_entity::story::Story;

use crate::store::normalize_email;

/// In-memory implementation of every store contract.
#[derive(Debug, Default)]
pub struct MemoryStore {
    authors: DashMap<AuthorId, Author>,
    author_emails: DashMap<String, AuthorId>,
    stories: DashMap<StoryId, Story>,
    pages: DashMap<PageId, Page>,
    collaboration_invites: DashMap<CollaborationInviteId, CollaborationInvite>,
    active_collaboration_invites: DashMap<(StoryId, String), CollaborationInviteId>,
    groups: DashMap<GroupId, Group>,
    group_owners: DashMap<AuthorId, GroupId>,
    group_members: DashMap<AuthorId, GroupId>,
    group_invites: DashMap<GroupInviteId, GroupInvite>,
    active_group_invites: DashMap<(GroupId, String), GroupInviteId>,
    group_invite_tokens: DashMap<String, GroupInviteId>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite an author's usage counter. Content code owns this value;
    /// the store exposes it so callers and tests can seed usage.
    pub fn set_used_bytes(&self, author_id: AuthorId, used_bytes: i64) -> bool {
        match self.authors.get_mut(&author_id) {
            Some(mut author) => {
                author.used_bytes = used_bytes;
                true
            }
            None => false,
        }
    }
}
