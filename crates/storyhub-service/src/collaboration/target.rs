//! Invite targets.

use serde::{Deserialize, Serialize};
use validator::Validate;

use storyhub_core::error::AppError;
use storyhub_core::result::AppResult;
use storyhub_core::types::id::AuthorId;

/// One addressee of an invite call: an existing account, an email, or both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct InviteTarget {
    /// Existing account to invite.
    #[serde(default)]
    pub author_id: Option<AuthorId>,
    /// Address to invite; used when the invitee has no account yet.
    #[serde(default)]
    #[validate(email(message = "A valid email address is required"))]
    pub email: Option<String>,
    /// Requested permission.
    #[serde(default)]
    pub edit: bool,
}

impl InviteTarget {
    /// Target an existing account.
    pub fn author(author_id: AuthorId, edit: bool) -> Self {
        Self {
            author_id: Some(author_id),
            email: None,
            edit,
        }
    }

    /// Target an email address.
    pub fn email(email: impl Into<String>, edit: bool) -> Self {
        Self {
            author_id: None,
            email: Some(email.into()),
            edit,
        }
    }

    /// Label used in batch failure reports.
    pub fn label(&self) -> String {
        match (&self.author_id, &self.email) {
            (Some(id), _) => id.to_string(),
            (None, Some(email)) => email.clone(),
            (None, None) => String::new(),
        }
    }

    /// Check shape and email syntax.
    pub fn check(&self) -> AppResult<()> {
        if self.author_id.is_none() && self.email.as_deref().is_none_or(|e| e.trim().is_empty()) {
            return Err(AppError::bad_request(
                "Each invitation needs an author id or an email",
            ));
        }
        self.validate()
            .map_err(|e| AppError::bad_request(format!("Invalid invitation: {e}")))
    }
}
