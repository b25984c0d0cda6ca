//! Integration tests for capability resolution over stored stories.

mod helpers;

use storyhub_core::types::id::StoryId;
use storyhub_database::StoryStore;
use storyhub_entity::story::ShareSettings;
use storyhub_service::collaboration::InviteTarget;
use storyhub_service::permission::CapabilitySource;
use storyhub_service::{Audience, Capabilities};

use helpers::{TestApp, ctx};

#[tokio::test]
async fn test_collaboration_changes_are_visible_to_resolution() {
    let app = TestApp::new();
    let owner = app.create_author("Olive").await;
    let writer = app.create_author("Cato").await;
    let story = app.create_story(&owner, "Saga").await;

    let before = app
        .permissions
        .resolve_permission(story.id, writer.id, Audience::default())
        .await
        .unwrap();
    assert_eq!(before, Capabilities::none());

    app.collaboration
        .invite(&ctx(&owner), story.id, vec![InviteTarget::author(writer.id, true)])
        .await
        .unwrap();
    let granted = app
        .permissions
        .resolve_permission(story.id, writer.id, Audience::default())
        .await
        .unwrap();
    assert!(granted.can_view);
    assert!(granted.can_edit);
    assert!(!granted.can_administer);
    assert_eq!(granted.source, CapabilitySource::Collaborator);

    app.collaboration
        .update_permission(&ctx(&owner), story.id, writer.id, false)
        .await
        .unwrap();
    let viewer = app
        .permissions
        .resolve_permission(story.id, writer.id, Audience::default())
        .await
        .unwrap();
    assert!(viewer.can_view);
    assert!(!viewer.can_edit);

    app.collaboration
        .remove(&ctx(&owner), story.id, vec![writer.id])
        .await
        .unwrap();
    let revoked = app
        .permissions
        .resolve_permission(story.id, writer.id, Audience::default())
        .await
        .unwrap();
    assert!(!revoked.can_view);
    assert!(!revoked.can_edit);
}

#[tokio::test]
async fn test_public_flags_grant_view_only() {
    let app = TestApp::new();
    let owner = app.create_author("Olive").await;
    let reader = app.create_author("Rex").await;

    let followers = app
        .create_shared_story(
            &owner,
            "Followers",
            ShareSettings {
                followers: true,
                ..Default::default()
            },
        )
        .await;
    let linked = app
        .create_shared_story(
            &owner,
            "Linked",
            ShareSettings {
                link: true,
                ..Default::default()
            },
        )
        .await;
    let searchable = app
        .create_shared_story(
            &owner,
            "Searchable",
            ShareSettings {
                search: true,
                ..Default::default()
            },
        )
        .await;

    let resolve = |story: StoryId, audience: Audience| {
        let permissions = app.permissions.clone();
        let reader = reader.id;
        async move {
            permissions
                .resolve_permission(story, reader, audience)
                .await
                .unwrap()
        }
    };

    assert!(!resolve(followers.id, Audience::default()).await.can_view);
    let follower = resolve(
        followers.id,
        Audience {
            follows_owner: true,
            has_link: false,
        },
    )
    .await;
    assert!(follower.can_view);
    assert!(!follower.can_edit);
    assert_eq!(follower.source, CapabilitySource::PublicShare);

    assert!(!resolve(linked.id, Audience::default()).await.can_view);
    let with_link = resolve(
        linked.id,
        Audience {
            follows_owner: false,
            has_link: true,
        },
    )
    .await;
    assert!(with_link.can_view);
    assert!(!with_link.can_edit);

    let anyone = resolve(searchable.id, Audience::default()).await;
    assert!(anyone.can_view);
    assert!(!anyone.can_edit);
    assert!(!anyone.can_administer);
}

#[tokio::test]
async fn test_deleted_story_only_answers_to_owner() {
    let app = TestApp::new();
    let owner = app.create_author("Olive").await;
    let writer = app.create_author("Cato").await;
    let story = app
        .create_shared_story(
            &owner,
            "Saga",
            ShareSettings {
                search: true,
                ..Default::default()
            },
        )
        .await;
    app.collaboration
        .invite(&ctx(&owner), story.id, vec![InviteTarget::author(writer.id, true)])
        .await
        .unwrap();

    assert!(app.stores.stories.soft_delete(story.id).await.unwrap());

    let writer_caps = app
        .permissions
        .resolve_permission(story.id, writer.id, Audience::default())
        .await
        .unwrap();
    assert_eq!(writer_caps, Capabilities::none());

    let owner_caps = app
        .permissions
        .resolve_permission(story.id, owner.id, Audience::default())
        .await
        .unwrap();
    assert!(owner_caps.can_view);
    assert!(owner_caps.can_edit);
    assert!(owner_caps.can_administer);

    // Mutations on a deleted story are refused.
    let err = app
        .collaboration
        .update_permission(&ctx(&owner), story.id, writer.id, false)
        .await
        .unwrap_err();
    assert_eq!(err.kind, storyhub_core::error::ErrorKind::NotFound);
}

#[tokio::test]
async fn test_missing_story_resolves_to_nothing() {
    let app = TestApp::new();
    let author = app.create_author("Olive").await;

    let caps = app
        .permissions
        .resolve_permission(StoryId::new(), author.id, Audience::default())
        .await
        .unwrap();
    assert_eq!(caps, Capabilities::none());
}
