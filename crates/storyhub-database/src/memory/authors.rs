use async_trait::async_trait;
use dashmap::mapref::entry::Entry;

use storyhub_core::error::AppError;
use storyhub_core::result::AppResult;
use storyhub_core::types::id::AuthorId;
use storyhub_entity::author::Author;

use super::{MemoryStore, normalize_email};
use crate::store::{AuthorStore, IdentityLookup};

impl MemoryStore {
    fn with_group(&self, mut author: Author) -> Author {
        author.group_id = self.group_members.get(&author.id).map(|g| *g);
        author
    }
}

#[async_trait]
impl AuthorStore for MemoryStore {
    async fn find_by_id(&self, id: AuthorId) -> AppResult<Option<Author>> {
        let author = self.authors.get(&id).map(|a| a.clone());
        Ok(author.map(|a| self.with_group(a)))
    }

    async fn find_many(&self, ids: &[AuthorId]) -> AppResult<Vec<Author>> {
        let found: Vec<Author> = ids
            .iter()
            .filter_map(|id| self.authors.get(id).map(|a| a.clone()))
            .collect();
        Ok(found.into_iter().map(|a| self.with_group(a)).collect())
    }

    async fn create(&self, author: &Author) -> AppResult<Author> {
        let mut author = author.clone();
        author.email = normalize_email(&author.email);
        match self.author_emails.entry(author.email.clone()) {
            Entry::Occupied(_) => Err(AppError::conflict(format!(
                "An author with email '{}' already exists",
                author.email
            ))),
            Entry::Vacant(slot) => {
                self.authors.insert(author.id, author.clone());
                slot.insert(author.id);
                Ok(author)
            }
        }
    }
}

#[async_trait]
impl IdentityLookup for MemoryStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Author>> {
        let id = self.author_emails.get(&normalize_email(email)).map(|id| *id);
        match id {
            Some(id) => AuthorStore::find_by_id(self, id).await,
            None => Ok(None),
        }
    }
}
