//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use storyhub_core::config::AppConfig;
use storyhub_core::events::ActivityEvent;
use storyhub_core::traits::ActivityNotifier;
use storyhub_core::types::id::StoryId;
use storyhub_database::{AuthorStore, MemoryStore, PageStore, StoryStore, Stores};
use storyhub_entity::author::{Author, CreateAuthor};
use storyhub_entity::page::Page;
use storyhub_entity::story::{CreateStory, ShareSettings, Story};
use storyhub_service::{
    CollaborationService, GroupService, PermissionService, QuotaService, RequestContext,
};

/// Notifier that keeps every emitted event in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<ActivityEvent>>,
}

impl RecordingNotifier {
    /// Every event emitted so far.
    pub fn events(&self) -> Vec<ActivityEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Wire names of every event emitted so far, in order.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.kind().as_str())
            .collect()
    }

    /// Forget recorded events.
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl ActivityNotifier for RecordingNotifier {
    fn emit(&self, event: ActivityEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Every service wired over one in-memory store.
pub struct TestApp {
    /// Backing store, for seeding usage counters
    pub memory: Arc<MemoryStore>,
    /// Store bundle handed to the services
    pub stores: Stores,
    /// Configuration the services were built with
    pub config: AppConfig,
    /// Captured activity events
    pub notifier: Arc<RecordingNotifier>,
    /// Collaboration registry
    pub collaboration: CollaborationService,
    /// Group registry
    pub groups: GroupService,
    /// Quota reports
    pub quota: QuotaService,
    /// Capability checks
    pub permissions: PermissionService,
}

impl TestApp {
    /// Create a test application with default configuration
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a test application with the given configuration
    pub fn with_config(config: AppConfig) -> Self {
        let memory = Arc::new(MemoryStore::new());
        let stores = Stores::from_memory(memory.clone());
        let notifier = Arc::new(RecordingNotifier::default());

        Self {
            collaboration: CollaborationService::new(
                &stores,
                notifier.clone(),
                config.collaboration.clone(),
            ),
            groups: GroupService::new(&stores, notifier.clone(), config.groups.clone()),
            quota: QuotaService::new(&stores, config.quota.clone()),
            permissions: PermissionService::new(stores.stories.clone()),
            memory,
            stores,
            config,
            notifier,
        }
    }

    /// Register an author on the `free` plan
    pub async fn create_author(&self, name: &str) -> Author {
        self.create_author_on_plan(name, "free").await
    }

    /// Register an author with `<name>@x.com` as email
    pub async fn create_author_on_plan(&self, name: &str, plan: &str) -> Author {
        self.register(name, &format!("{}@x.com", name.to_lowercase()), plan)
            .await
    }

    /// Register an author with an explicit email
    pub async fn register(&self, name: &str, email: &str, plan: &str) -> Author {
        let author = CreateAuthor {
            name: name.to_string(),
            username: name.to_lowercase(),
            email: email.to_string(),
            plan: plan.to_string(),
        }
        .into_author();
        self.stores
            .authors
            .create(&author)
            .await
            .expect("Failed to create author")
    }

    /// Create a private story
    pub async fn create_story(&self, owner: &Author, title: &str) -> Story {
        self.create_shared_story(owner, title, ShareSettings::default())
            .await
    }

    /// Create a story with public sharing flags
    pub async fn create_shared_story(
        &self,
        owner: &Author,
        title: &str,
        share: ShareSettings,
    ) -> Story {
        let story = CreateStory {
            owner_id: owner.id,
            title: title.to_string(),
            share,
        }
        .into_story();
        self.stores
            .stories
            .create(&story)
            .await
            .expect("Failed to create story")
    }

    /// Reload a story
    pub async fn story(&self, id: StoryId) -> Story {
        self.stores
            .stories
            .find_by_id(id)
            .await
            .expect("Failed to load story")
            .expect("Story missing")
    }

    /// Write a page into a story
    pub async fn write_page(&self, story: &Story, author: &Author, title: &str) -> Page {
        self.stores
            .pages
            .create(&Page::new(story.id, author.id, title))
            .await
            .expect("Failed to create page")
    }
}

/// Request context acting as `author`
pub fn ctx(author: &Author) -> RequestContext {
    RequestContext::new(author.id)
}
