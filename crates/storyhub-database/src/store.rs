//! Persistence contracts consumed by the registries.
//!
//! Every mutating method is a single atomic update: implementations must
//! not let a concurrent caller observe or produce a state that breaks the
//! uniqueness rules documented on each method.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use storyhub_core::result::AppResult;
use storyhub_core::types::id::{
    AuthorId, CollaborationInviteId, GroupId, GroupInviteId, PageId, StoryId,
};
use storyhub_entity::author::Author;
use storyhub_entity::collaboration::CollaborationInvite;
use storyhub_entity::group::{AddMemberOutcome, Group, GroupInvite};
use storyhub_entity::page::Page;
use storyhub_entity::story::{AddCollaboratorOutcome, Collaborator, Story};

use crate::memory::MemoryStore;
use crate::repositories::{
    AuthorRepository, CollaborationInviteRepository, GroupInviteRepository, GroupRepository,
    PageRepository, StoryRepository,
};

/// Author records and their usage counters.
#[async_trait]
pub trait AuthorStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find an author by id.
    async fn find_by_id(&self, id: AuthorId) -> AppResult<Option<Author>>;

    /// Find every author in `ids` that exists. Order is unspecified.
    async fn find_many(&self, ids: &[AuthorId]) -> AppResult<Vec<Author>>;

    /// Register an author. Fails with `Conflict` on a duplicate email.
    async fn create(&self, author: &Author) -> AppResult<Author>;
}

/// Resolves an email address to an existing account.
#[async_trait]
pub trait IdentityLookup: Send + Sync + std::fmt::Debug + 'static {
    /// Case-insensitive lookup.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Author>>;
}

/// Stories and their embedded collaborator sets.
#[async_trait]
pub trait StoryStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a story by id, including soft-deleted ones.
    async fn find_by_id(&self, id: StoryId) -> AppResult<Option<Story>>;

    /// Persist a new story.
    async fn create(&self, story: &Story) -> AppResult<Story>;

    /// Add a collaborator unless the author already has an entry or owns
    /// the story. Deleted stories report `StoryMissing`.
    async fn add_collaborator(
        &self,
        story_id: StoryId,
        collaborator: Collaborator,
    ) -> AppResult<AddCollaboratorOutcome>;

    /// Set the edit flag of an existing entry. `false` if there is none.
    async fn set_collaborator_edit(
        &self,
        story_id: StoryId,
        author_id: AuthorId,
        edit: bool,
    ) -> AppResult<bool>;

    /// Remove the given entries and return the ids that were present.
    async fn remove_collaborators(
        &self,
        story_id: StoryId,
        author_ids: &[AuthorId],
    ) -> AppResult<Vec<AuthorId>>;

    /// Mark a story deleted. `false` if it was missing or already deleted.
    async fn soft_delete(&self, story_id: StoryId) -> AppResult<bool>;
}

/// Pages of story content.
#[async_trait]
pub trait PageStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a new page.
    async fn create(&self, page: &Page) -> AppResult<Page>;

    /// Pages written by one author inside one story.
    async fn find_by_story_and_author(
        &self,
        story_id: StoryId,
        author_id: AuthorId,
    ) -> AppResult<Vec<Page>>;

    /// Delete pages. Ids that no longer exist are ignored; returns the
    /// number actually deleted.
    async fn delete_many(&self, ids: &[PageId]) -> AppResult<u64>;
}

/// Collaboration invite records.
///
/// At most one invite per `(story, lowercase email)` may be active.
#[async_trait]
pub trait CollaborationInviteStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert an active invite. Fails with `Conflict` if another active
    /// invite exists for the same story and email.
    async fn insert_active(&self, invite: &CollaborationInvite) -> AppResult<CollaborationInvite>;

    /// Find an invite by id.
    async fn find_by_id(&self, id: CollaborationInviteId)
    -> AppResult<Option<CollaborationInvite>>;

    /// Active invites of a story, oldest first.
    async fn find_active_by_story(&self, story_id: StoryId) -> AppResult<Vec<CollaborationInvite>>;

    /// Active invites addressed to an email across all stories.
    async fn find_active_by_email(&self, email: &str) -> AppResult<Vec<CollaborationInvite>>;

    /// Close one active invite without answering it.
    async fn deactivate(&self, id: CollaborationInviteId) -> AppResult<bool>;

    /// Close every active invite of the story whose email is listed and
    /// return the closed records.
    async fn deactivate_by_emails(
        &self,
        story_id: StoryId,
        emails: &[String],
    ) -> AppResult<Vec<CollaborationInvite>>;

    /// Close the active invite attached to an author, if any.
    async fn deactivate_for_author(&self, story_id: StoryId, author_id: AuthorId) -> AppResult<u64>;

    /// Answer an active invite. `None` if it is missing or no longer active.
    async fn resolve(
        &self,
        id: CollaborationInviteId,
        accepted: bool,
    ) -> AppResult<Option<CollaborationInvite>>;

    /// Attach an account to an active email-only invite.
    async fn attach_invited(&self, id: CollaborationInviteId, author_id: AuthorId)
    -> AppResult<bool>;

    /// Mirror a permission change onto the author's active invite.
    async fn set_edit_for_author(
        &self,
        story_id: StoryId,
        author_id: AuthorId,
        edit: bool,
    ) -> AppResult<u64>;
}

/// Groups and their member sets.
///
/// An author owns at most one group and is a member of at most one group.
#[async_trait]
pub trait GroupStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a group by id.
    async fn find_by_id(&self, id: GroupId) -> AppResult<Option<Group>>;

    /// The group owned by an author.
    async fn find_by_owner(&self, owner_id: AuthorId) -> AppResult<Option<Group>>;

    /// The group an author belongs to as a member.
    async fn find_by_member(&self, author_id: AuthorId) -> AppResult<Option<Group>>;

    /// Persist a new group. Fails with `Conflict` if the owner already owns one.
    async fn create(&self, group: &Group) -> AppResult<Group>;

    /// Add a member, enforcing the one-group-per-member rule.
    async fn add_member(&self, group_id: GroupId, author_id: AuthorId)
    -> AppResult<AddMemberOutcome>;

    /// Remove a member. `false` if they were not a member of this group.
    async fn remove_member(&self, group_id: GroupId, author_id: AuthorId) -> AppResult<bool>;
}

/// Group invite records.
///
/// At most one invite per `(group, lowercase email)` may be active; tokens
/// are unique.
#[async_trait]
pub trait GroupInviteStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert an active invite. Fails with `Conflict` on a duplicate active
    /// invite or token.
    async fn insert_active(&self, invite: &GroupInvite) -> AppResult<GroupInvite>;

    /// Find an invite by id.
    async fn find_by_id(&self, id: GroupInviteId) -> AppResult<Option<GroupInvite>>;

    /// Find an invite by token, whatever its state.
    async fn find_by_token(&self, token: &str) -> AppResult<Option<GroupInvite>>;

    /// Active invites of a group, oldest first.
    async fn find_active_by_group(&self, group_id: GroupId) -> AppResult<Vec<GroupInvite>>;

    /// Answer an active invite on behalf of `invited`. `None` if it is no
    /// longer active.
    async fn resolve(
        &self,
        id: GroupInviteId,
        accepted: bool,
        invited: AuthorId,
    ) -> AppResult<Option<GroupInvite>>;

    /// Close an active invite without answering it.
    async fn deactivate(&self, id: GroupInviteId) -> AppResult<bool>;
}

/// Every store the registries need, behind trait objects.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Authors.
    pub authors: Arc<dyn AuthorStore>,
    /// Email lookup.
    pub identity: Arc<dyn IdentityLookup>,
    /// Stories.
    pub stories: Arc<dyn StoryStore>,
    /// Pages.
    pub pages: Arc<dyn PageStore>,
    /// Collaboration invites.
    pub collaboration_invites: Arc<dyn CollaborationInviteStore>,
    /// Groups.
    pub groups: Arc<dyn GroupStore>,
    /// Group invites.
    pub group_invites: Arc<dyn GroupInviteStore>,
}

impl Stores {
    /// Wire every store to one shared in-memory instance.
    pub fn memory() -> Self {
        Self::from_memory(Arc::new(MemoryStore::new()))
    }

    /// Wire every store to the given in-memory instance.
    pub fn from_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            authors: store.clone(),
            identity: store.clone(),
            stories: store.clone(),
            pages: store.clone(),
            collaboration_invites: store.clone(),
            groups: store.clone(),
            group_invites: store,
        }
    }

    /// Wire every store to PostgreSQL repositories sharing one pool.
    pub fn postgres(pool: PgPool) -> Self {
        let authors = Arc::new(AuthorRepository::new(pool.clone()));
        Self {
            authors: authors.clone(),
            identity: authors,
            stories: Arc::new(StoryRepository::new(pool.clone())),
            pages: Arc::new(PageRepository::new(pool.clone())),
            collaboration_invites: Arc::new(CollaborationInviteRepository::new(pool.clone())),
            groups: Arc::new(GroupRepository::new(pool.clone())),
            group_invites: Arc::new(GroupInviteRepository::new(pool)),
        }
    }
}

/// Canonical form of an email address as stored and compared by every backend.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
