//! Integration tests for activity delivery through the worker queue.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;

use storyhub_core::config::{AppConfig, NotifierConfig};
use storyhub_core::result::AppResult;
use storyhub_core::traits::{EmailMessage, EmailSender, PushMessage, PushSender};
use storyhub_database::{AuthorStore, GroupInviteStore, MemoryStore, StoryStore, Stores};
use storyhub_entity::author::{Author, CreateAuthor};
use storyhub_entity::story::{CreateStory, Story};
use storyhub_service::{CollaborationService, GroupService, InviteTarget, RequestContext};
use storyhub_worker::{ActivityDispatcher, ActivityRules, ChannelNotifier, DispatchStats};

#[derive(Debug, Default)]
struct Outbox {
    emails: Mutex<Vec<EmailMessage>>,
    pushes: Mutex<Vec<PushMessage>>,
}

#[derive(Debug, Clone, Default)]
struct RecordingEmail(Arc<Outbox>);

#[async_trait]
impl EmailSender for RecordingEmail {
    async fn send(&self, message: EmailMessage) -> AppResult<()> {
        self.0.emails.lock().unwrap().push(message);
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
struct RecordingPush(Arc<Outbox>);

#[async_trait]
impl PushSender for RecordingPush {
    async fn send(&self, message: PushMessage) -> AppResult<()> {
        self.0.pushes.lock().unwrap().push(message);
        Ok(())
    }
}

/// Services wired to a real bounded queue instead of a recorder.
struct QueuedApp {
    stores: Stores,
    notifier: Arc<ChannelNotifier>,
    queue: Option<tokio::sync::mpsc::Receiver<storyhub_core::events::ActivityEvent>>,
    collaboration: CollaborationService,
    groups: GroupService,
    outbox: Arc<Outbox>,
}

impl QueuedApp {
    fn new(capacity: usize) -> Self {
        let config = AppConfig::default();
        let stores = Stores::from_memory(Arc::new(MemoryStore::new()));
        let (notifier, queue) = ChannelNotifier::channel(capacity);
        let notifier = Arc::new(notifier);

        Self {
            collaboration: CollaborationService::new(
                &stores,
                notifier.clone(),
                config.collaboration.clone(),
            ),
            groups: GroupService::new(&stores, notifier.clone(), config.groups.clone()),
            stores,
            notifier,
            queue: Some(queue),
            outbox: Arc::new(Outbox::default()),
        }
    }

    async fn author(&self, name: &str) -> Author {
        let author = CreateAuthor {
            name: name.to_string(),
            username: name.to_lowercase(),
            email: format!("{}@x.com", name.to_lowercase()),
            plan: "free".to_string(),
        }
        .into_author();
        self.stores.authors.create(&author).await.unwrap()
    }

    async fn story(&self, owner: &Author, title: &str) -> Story {
        let story = CreateStory {
            owner_id: owner.id,
            title: title.to_string(),
            share: Default::default(),
        }
        .into_story();
        self.stores.stories.create(&story).await.unwrap()
    }

    /// Deliver everything queued so far and stop the dispatcher.
    async fn drain(&mut self, config: NotifierConfig) -> DispatchStats {
        let dispatcher = ActivityDispatcher::new(
            ActivityRules::new(&self.stores, config),
            Arc::new(RecordingEmail(self.outbox.clone())),
            Arc::new(RecordingPush(self.outbox.clone())),
        );
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        shutdown_tx.send(true).unwrap();
        let queue = self.queue.take().unwrap();
        dispatcher.run(queue, shutdown_rx).await
    }

    fn emails(&self) -> Vec<EmailMessage> {
        self.outbox.emails.lock().unwrap().clone()
    }

    fn pushes(&self) -> Vec<PushMessage> {
        self.outbox.pushes.lock().unwrap().clone()
    }
}

#[tokio::test]
async fn test_collaboration_activity_reaches_email_and_push() {
    let mut app = QueuedApp::new(64);
    let owner = app.author("Olive").await;
    let writer = app.author("Cato").await;
    let story = app.story(&owner, "Saga").await;
    let owner_ctx = RequestContext::new(owner.id);

    app.collaboration
        .invite(
            &owner_ctx,
            story.id,
            vec![
                InviteTarget::author(writer.id, true),
                InviteTarget::email("guest@x.com", false),
            ],
        )
        .await
        .unwrap();
    app.collaboration
        .leave(&RequestContext::new(writer.id), story.id, true)
        .await
        .unwrap();

    let stats = app.drain(NotifierConfig::default()).await;
    assert_eq!(stats.events, 3);
    assert_eq!(stats.failed, 0);
    // Writer: email and push. Guest: email only. Owner: email and push.
    assert_eq!(stats.delivered, 5);

    let emails = app.emails();
    let to: Vec<&str> = emails.iter().map(|e| e.to.as_str()).collect();
    assert_eq!(to, vec!["cato@x.com", "guest@x.com", "olive@x.com"]);
    assert_eq!(emails[0].template, "collaborator_added");
    assert!(emails[0].subject.contains("Saga"));
    assert_eq!(emails[2].template, "collaboration_left");

    let recipients: Vec<_> = app.pushes().iter().map(|p| p.recipient).collect();
    assert_eq!(recipients, vec![writer.id, owner.id]);
    assert_eq!(app.notifier.dropped(), 0);
}

#[tokio::test]
async fn test_group_invite_email_carries_token() {
    let mut app = QueuedApp::new(64);
    let owner = app.author("Gus").await;

    let outcome = app
        .groups
        .invite(&RequestContext::new(owner.id), "new@x.com")
        .await
        .unwrap();
    let invite = app
        .stores
        .group_invites
        .find_by_id(outcome.invite_id)
        .await
        .unwrap()
        .unwrap();

    let stats = app.drain(NotifierConfig::default()).await;
    assert_eq!(stats.events, 1);
    assert_eq!(stats.delivered, 1);

    let emails = app.emails();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].to, "new@x.com");
    assert_eq!(emails[0].template, "group_invite_sent");
    assert!(emails[0].body.contains(&invite.token));
    assert!(app.pushes().is_empty());
}

#[tokio::test]
async fn test_full_queue_never_fails_the_mutation() {
    let mut app = QueuedApp::new(1);
    let owner = app.author("Olive").await;
    let story = app.story(&owner, "Saga").await;
    let ctx = RequestContext::new(owner.id);

    let mut authors = Vec::new();
    for name in ["Ann", "Ben", "Cy"] {
        authors.push(app.author(name).await);
    }
    let result = app
        .collaboration
        .invite(
            &ctx,
            story.id,
            authors
                .iter()
                .map(|a| InviteTarget::author(a.id, false))
                .collect(),
        )
        .await
        .unwrap();

    assert_eq!(result.succeeded.len(), 3);
    assert_eq!(app.notifier.dropped(), 2);
    let stored = app.stores.stories.find_by_id(story.id).await.unwrap().unwrap();
    assert_eq!(stored.collaborators.len(), 3);

    let stats = app.drain(NotifierConfig::default()).await;
    assert_eq!(stats.events, 1);
}

#[tokio::test]
async fn test_disabled_channels_send_nothing() {
    let mut app = QueuedApp::new(8);
    let owner = app.author("Olive").await;
    let writer = app.author("Cato").await;
    let story = app.story(&owner, "Saga").await;

    app.collaboration
        .invite(
            &RequestContext::new(owner.id),
            story.id,
            vec![InviteTarget::author(writer.id, false)],
        )
        .await
        .unwrap();

    let stats = app
        .drain(NotifierConfig {
            email_enabled: false,
            push_enabled: false,
            ..NotifierConfig::default()
        })
        .await;
    assert_eq!(stats.events, 1);
    assert_eq!(stats.delivered, 0);
    assert!(app.emails().is_empty());
    assert!(app.pushes().is_empty());
}
