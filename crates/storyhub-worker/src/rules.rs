//! Recipient resolution: which emails and pushes an activity event produces.

use std::sync::Arc;

use storyhub_core::config::NotifierConfig;
use storyhub_core::events::{ActivityEvent, ActivityPayload, CollaborationEvent, GroupEvent};
use storyhub_core::result::AppResult;
use storyhub_core::traits::{EmailMessage, PushMessage};
use storyhub_core::types::id::{AuthorId, GroupId, StoryId};
use storyhub_database::store::{AuthorStore, GroupStore, StoryStore, Stores};

/// Messages produced for one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deliveries {
    /// Emails to send.
    pub emails: Vec<EmailMessage>,
    /// Pushes to send.
    pub pushes: Vec<PushMessage>,
}

impl Deliveries {
    /// Whether nothing needs to be sent.
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty() && self.pushes.is_empty()
    }
}

/// Who is told about what.
enum Recipient {
    Author(AuthorId),
    Address(String),
}

/// Resolves recipients for activity events and renders their messages.
#[derive(Debug, Clone)]
pub struct ActivityRules {
    /// Author store, for addresses and names.
    authors: Arc<dyn AuthorStore>,
    /// Story store, for titles and owners.
    stories: Arc<dyn StoryStore>,
    /// Group store, for owners.
    groups: Arc<dyn GroupStore>,
    /// Channel switches and sender address.
    config: NotifierConfig,
}

impl ActivityRules {
    /// Creates the rules over the given stores.
    pub fn new(stores: &Stores, config: NotifierConfig) -> Self {
        Self {
            authors: Arc::clone(&stores.authors),
            stories: Arc::clone(&stores.stories),
            groups: Arc::clone(&stores.groups),
            config,
        }
    }

    /// Build the deliveries for an event.
    pub async fn deliveries(&self, event: &ActivityEvent) -> AppResult<Deliveries> {
        let actor = self.author_name(event.actor_id).await?;
        let template = event.kind().as_str();

        let (recipient, title, body) = match &event.payload {
            ActivityPayload::Collaboration(e) => {
                let story = self.story_title(e.story_id()).await?;
                match e {
                    CollaborationEvent::Added {
                        author_id, email, edit, ..
                    } => (
                        recipient(*author_id, email),
                        format!("{actor} invited you to \"{story}\""),
                        format!(
                            "You can now {} \"{story}\".",
                            if *edit { "edit" } else { "view" }
                        ),
                    ),
                    CollaborationEvent::Removed {
                        author_id, email, ..
                    } => match (author_id, email) {
                        (Some(id), _) => (
                            Recipient::Author(*id),
                            format!("You no longer collaborate on \"{story}\""),
                            format!("{actor} removed you from \"{story}\"."),
                        ),
                        (None, Some(email)) => (
                            Recipient::Address(email.clone()),
                            format!("Your invitation to \"{story}\" was withdrawn"),
                            format!("{actor} cancelled your invitation to \"{story}\"."),
                        ),
                        (None, None) => return Ok(Deliveries::default()),
                    },
                    CollaborationEvent::Left {
                        story_id,
                        pages_deleted,
                        ..
                    } => {
                        let Some(owner) = self.story_owner(*story_id).await? else {
                            return Ok(Deliveries::default());
                        };
                        (
                            Recipient::Author(owner),
                            format!("{actor} left \"{story}\""),
                            format!("{actor} left \"{story}\" and removed {pages_deleted} page(s)."),
                        )
                    }
                    CollaborationEvent::ShareDeclined { story_id, .. } => {
                        let Some(owner) = self.story_owner(*story_id).await? else {
                            return Ok(Deliveries::default());
                        };
                        (
                            Recipient::Author(owner),
                            format!("{actor} declined to collaborate"),
                            format!("{actor} declined your invitation to \"{story}\"."),
                        )
                    }
                }
            }
            ActivityPayload::Group(e) => match e {
                GroupEvent::MemberAdded { group_id, .. } => {
                    let Some(owner) = self.group_owner(*group_id).await? else {
                        return Ok(Deliveries::default());
                    };
                    (
                        Recipient::Author(owner),
                        format!("{actor} joined your group"),
                        format!("{actor} now shares your storage quota."),
                    )
                }
                GroupEvent::MemberRemoved {
                    group_id,
                    author_id,
                    left,
                } => {
                    if *left {
                        let Some(owner) = self.group_owner(*group_id).await? else {
                            return Ok(Deliveries::default());
                        };
                        (
                            Recipient::Author(owner),
                            format!("{actor} left your group"),
                            format!("{actor} no longer shares your storage quota."),
                        )
                    } else {
                        (
                            Recipient::Author(*author_id),
                            "You were removed from a group".to_string(),
                            format!("{actor} removed you from their group."),
                        )
                    }
                }
                GroupEvent::InviteSent {
                    invited,
                    email,
                    token,
                    ..
                } => (
                    recipient(*invited, email),
                    format!("{actor} invited you to share storage"),
                    format!("Use this code to join the group: {token}"),
                ),
            },
        };

        self.render(recipient, template, title, body).await
    }

    async fn render(
        &self,
        recipient: Recipient,
        template: &str,
        title: String,
        body: String,
    ) -> AppResult<Deliveries> {
        let (author, address) = match recipient {
            Recipient::Author(id) => {
                let address = self.authors.find_by_id(id).await?.map(|a| a.email);
                (Some(id), address)
            }
            Recipient::Address(email) => (None, Some(email)),
        };

        let mut deliveries = Deliveries::default();
        if self.config.email_enabled {
            if let Some(to) = address {
                deliveries.emails.push(EmailMessage {
                    from: self.config.from_address.clone(),
                    to,
                    subject: title.clone(),
                    body: body.clone(),
                    template: template.to_string(),
                });
            }
        }
        if self.config.push_enabled {
            if let Some(recipient) = author {
                deliveries.pushes.push(PushMessage {
                    recipient,
                    title,
                    body,
                    template: template.to_string(),
                });
            }
        }
        Ok(deliveries)
    }

    async fn author_name(&self, id: AuthorId) -> AppResult<String> {
        Ok(self
            .authors
            .find_by_id(id)
            .await?
            .map(|a| a.name)
            .unwrap_or_else(|| "Someone".to_string()))
    }

    async fn story_title(&self, id: StoryId) -> AppResult<String> {
        Ok(self
            .stories
            .find_by_id(id)
            .await?
            .map(|s| s.title)
            .unwrap_or_else(|| "a story".to_string()))
    }

    async fn story_owner(&self, id: StoryId) -> AppResult<Option<AuthorId>> {
        Ok(self.stories.find_by_id(id).await?.map(|s| s.owner_id))
    }

    async fn group_owner(&self, id: GroupId) -> AppResult<Option<AuthorId>> {
        Ok(self.groups.find_by_id(id).await?.map(|g| g.owner_id))
    }
}

fn recipient(author_id: Option<AuthorId>, email: &str) -> Recipient {
    match author_id {
        Some(id) => Recipient::Author(id),
        None => Recipient::Address(email.to_string()),
    }
}
