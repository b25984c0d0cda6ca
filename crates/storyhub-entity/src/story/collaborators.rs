//! The collaborator set embedded in a story.
//!
//! Entries are keyed by author and kept in insertion order. The owner can
//! never appear, and an author can appear at most once; both rules are
//! enforced by [`Collaborators::insert`] rather than by callers.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use storyhub_core::types::id::AuthorId;

/// A single collaborator entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    /// The collaborating author.
    pub author_id: AuthorId,
    /// Whether the author may edit (otherwise view only).
    pub edit: bool,
    /// When the entry was added.
    pub added_at: DateTime<Utc>,
}

impl Collaborator {
    /// Create an entry stamped with the current time.
    pub fn new(author_id: AuthorId, edit: bool) -> Self {
        Self {
            author_id,
            edit,
            added_at: Utc::now(),
        }
    }
}

/// Result of trying to add a collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddCollaboratorOutcome {
    /// The entry was added.
    Inserted,
    /// The author already had an entry; nothing changed.
    AlreadyPresent,
    /// The author owns the story.
    OwnerRejected,
    /// The story does not exist or is deleted.
    StoryMissing,
}

/// Ordered map of collaborators keyed by author id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Collaborator>", into = "Vec<Collaborator>")]
pub struct Collaborators {
    entries: IndexMap<AuthorId, Collaborator>,
}

impl Collaborators {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry unless it would duplicate an author or name the owner.
    pub fn insert(&mut self, owner: AuthorId, collaborator: Collaborator) -> AddCollaboratorOutcome {
        if collaborator.author_id == owner {
            return AddCollaboratorOutcome::OwnerRejected;
        }
        if self.entries.contains_key(&collaborator.author_id) {
            return AddCollaboratorOutcome::AlreadyPresent;
        }
        self.entries.insert(collaborator.author_id, collaborator);
        AddCollaboratorOutcome::Inserted
    }

    /// Remove an entry, preserving the order of the rest.
    pub fn remove(&mut self, author_id: &AuthorId) -> Option<Collaborator> {
        self.entries.shift_remove(author_id)
    }

    /// Update the edit flag. Returns `false` when the author has no entry.
    pub fn set_edit(&mut self, author_id: &AuthorId, edit: bool) -> bool {
        match self.entries.get_mut(author_id) {
            Some(entry) => {
                entry.edit = edit;
                true
            }
            None => false,
        }
    }

    /// Look up an entry.
    pub fn get(&self, author_id: &AuthorId) -> Option<&Collaborator> {
        self.entries.get(author_id)
    }

    /// Whether the author has an entry.
    pub fn contains(&self, author_id: &AuthorId) -> bool {
        self.entries.contains_key(author_id)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Collaborator> {
        self.entries.values()
    }

    /// Author ids in insertion order.
    pub fn author_ids(&self) -> Vec<AuthorId> {
        self.entries.keys().copied().collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<Collaborator>> for Collaborators {
    fn from(list: Vec<Collaborator>) -> Self {
        let mut entries = IndexMap::with_capacity(list.len());
        for collaborator in list {
            entries.entry(collaborator.author_id).or_insert(collaborator);
        }
        Self { entries }
    }
}

impl From<Collaborators> for Vec<Collaborator> {
    fn from(collaborators: Collaborators) -> Self {
        collaborators.entries.into_values().collect()
    }
}
