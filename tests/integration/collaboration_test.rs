//! Integration tests for the story collaboration lifecycle.

mod helpers;

use std::sync::Arc;

use storyhub_core::error::ErrorKind;
use storyhub_core::types::pagination::PageRequest;
use storyhub_database::{CollaborationInviteStore, PageStore};
use storyhub_entity::collaboration::InviteStatus;
use storyhub_service::InviteTarget;

use helpers::{TestApp, ctx};

#[tokio::test]
async fn test_invite_adds_collaborator_and_rejects_duplicate() {
    let app = TestApp::new();
    let owner = app.create_author("Olive").await;
    let c1 = app.create_author("Cleo").await;
    let story = app.create_story(&owner, "Saga").await;

    let result = app
        .collaboration
        .invite(&ctx(&owner), story.id, vec![InviteTarget::author(c1.id, true)])
        .await
        .unwrap();
    assert_eq!(result.succeeded.len(), 1);
    assert!(result.succeeded[0].added);

    let story = app.story(story.id).await;
    assert_eq!(story.collaborators.author_ids(), vec![c1.id]);
    assert!(story.collaborators.get(&c1.id).unwrap().edit);

    let again = app
        .collaboration
        .invite(&ctx(&owner), story.id, vec![InviteTarget::author(c1.id, true)])
        .await
        .unwrap();
    assert!(again.succeeded.is_empty());
    assert_eq!(again.failed.len(), 1);
    assert_eq!(again.failed[0].kind, ErrorKind::AlreadyCollaborator);
    assert_eq!(again.failed[0].kind.status_code(), 422);
    assert_eq!(again.failed[0].message, "User is already collaborator on this Story");

    assert_eq!(app.story(story.id).await.collaborators.len(), 1);
    assert_eq!(app.notifier.kinds(), vec!["collaborator_added"]);
}

#[tokio::test]
async fn test_same_author_twice_in_one_batch_is_already_collaborator() {
    let app = TestApp::new();
    let owner = app.create_author("Olive").await;
    let c1 = app.create_author("Cleo").await;
    let story = app.create_story(&owner, "Saga").await;

    let result = app
        .collaboration
        .invite(
            &ctx(&owner),
            story.id,
            vec![InviteTarget::author(c1.id, true), InviteTarget::author(c1.id, false)],
        )
        .await
        .unwrap();

    assert_eq!(result.succeeded.len(), 1);
    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].kind, ErrorKind::AlreadyCollaborator);
    assert_eq!(result.failed[0].message, "User is already collaborator on this Story");

    let story = app.story(story.id).await;
    assert_eq!(story.collaborators.author_ids(), vec![c1.id]);
    assert!(story.collaborators.get(&c1.id).unwrap().edit);
}

#[tokio::test]
async fn test_invite_batch_allows_partial_success() {
    let app = TestApp::new();
    let owner = app.create_author("Olive").await;
    let c1 = app.create_author("Cleo").await;
    let c2 = app.create_author("Cato").await;
    let story = app.create_story(&owner, "Saga").await;

    app.collaboration
        .invite(&ctx(&owner), story.id, vec![InviteTarget::author(c1.id, false)])
        .await
        .unwrap();

    let result = app
        .collaboration
        .invite(
            &ctx(&owner),
            story.id,
            vec![
                InviteTarget::author(c1.id, true),
                InviteTarget::email("CATO@x.com", false),
                InviteTarget::email("nobody@x.com", true),
                InviteTarget::author(owner.id, true),
            ],
        )
        .await
        .unwrap();

    assert_eq!(result.succeeded.len(), 2);
    let cato = &result.succeeded[0];
    assert_eq!(cato.author_id, Some(c2.id));
    assert_eq!(cato.email, "cato@x.com");
    assert!(cato.added);
    let nobody = &result.succeeded[1];
    assert_eq!(nobody.author_id, None);
    assert!(!nobody.added);

    let kinds: Vec<ErrorKind> = result.failed.iter().map(|f| f.kind).collect();
    assert_eq!(
        kinds,
        vec![ErrorKind::AlreadyCollaborator, ErrorKind::InvalidSelfOperation]
    );

    let story = app.story(story.id).await;
    assert_eq!(story.collaborators.author_ids(), vec![c1.id, c2.id]);
    assert!(!story.collaborators.get(&c1.id).unwrap().edit);
}

#[tokio::test]
async fn test_invite_rejects_duplicate_pending_email() {
    let app = TestApp::new();
    let owner = app.create_author("Olive").await;
    let story = app.create_story(&owner, "Saga").await;

    app.collaboration
        .invite(&ctx(&owner), story.id, vec![InviteTarget::email("new@x.com", false)])
        .await
        .unwrap();
    let again = app
        .collaboration
        .invite(&ctx(&owner), story.id, vec![InviteTarget::email("NEW@x.com", true)])
        .await
        .unwrap();

    assert_eq!(again.failed.len(), 1);
    assert_eq!(again.failed[0].kind, ErrorKind::UnprocessableEntity);
    assert_eq!(again.failed[0].message, "User is already invited to this Story");
}

#[tokio::test]
async fn test_invite_requires_edit_capability() {
    let app = TestApp::new();
    let owner = app.create_author("Olive").await;
    let viewer = app.create_author("Vic").await;
    let editor = app.create_author("Eda").await;
    let stranger = app.create_author("Stan").await;
    let story = app.create_story(&owner, "Saga").await;

    app.collaboration
        .invite(
            &ctx(&owner),
            story.id,
            vec![
                InviteTarget::author(viewer.id, false),
                InviteTarget::author(editor.id, true),
            ],
        )
        .await
        .unwrap();

    let err = app
        .collaboration
        .invite(&ctx(&viewer), story.id, vec![InviteTarget::author(stranger.id, false)])
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    let result = app
        .collaboration
        .invite(&ctx(&editor), story.id, vec![InviteTarget::author(stranger.id, false)])
        .await
        .unwrap();
    assert_eq!(result.succeeded.len(), 1);

    let err = app
        .collaboration
        .invite(&ctx(&owner), story.id, Vec::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::BadRequest);
}

#[tokio::test]
async fn test_cancel_one_of_three_pending_invites() {
    let app = TestApp::new();
    let owner = app.create_author("Olive").await;
    let story = app.create_story(&owner, "Saga").await;

    app.collaboration
        .invite(
            &ctx(&owner),
            story.id,
            vec![
                InviteTarget::email("test1@x.com", false),
                InviteTarget::email("test2@x.com", false),
                InviteTarget::email("test3@x.com", true),
            ],
        )
        .await
        .unwrap();

    let outcome = app
        .collaboration
        .cancel(&ctx(&owner), story.id, vec!["test3@x.com".to_string()])
        .await
        .unwrap();
    assert_eq!(outcome.cancelled, 1);
    assert_eq!(outcome.message, "The 1 invitation(s) has been cancelled successfully");

    let pending = app
        .collaboration
        .list_pending(&ctx(&owner), story.id, PageRequest::default(), None)
        .await
        .unwrap();
    let mut emails: Vec<&str> = pending.items.iter().map(|p| p.email.as_str()).collect();
    emails.sort_unstable();
    assert_eq!(emails, vec!["test1@x.com", "test2@x.com"]);

    // Cancelling again is a no-op, not an error.
    let again = app
        .collaboration
        .cancel(&ctx(&owner), story.id, vec!["test3@x.com".to_string()])
        .await
        .unwrap();
    assert_eq!(again.cancelled, 0);
    assert_eq!(again.message, "The 0 invitation(s) has been cancelled successfully");
}

#[tokio::test]
async fn test_cancel_removes_collaborator_and_is_owner_only() {
    let app = TestApp::new();
    let owner = app.create_author("Olive").await;
    let editor = app.create_author("Eda").await;
    let story = app.create_story(&owner, "Saga").await;

    app.collaboration
        .invite(&ctx(&owner), story.id, vec![InviteTarget::author(editor.id, true)])
        .await
        .unwrap();

    let err = app
        .collaboration
        .cancel(&ctx(&editor), story.id, vec!["eda@x.com".to_string()])
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    let err = app
        .collaboration
        .cancel(&ctx(&owner), story.id, vec!["  ".to_string()])
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::BadRequest);

    let outcome = app
        .collaboration
        .cancel(&ctx(&owner), story.id, vec!["EDA@x.com".to_string()])
        .await
        .unwrap();
    assert_eq!(outcome.cancelled, 1);
    assert!(app.story(story.id).await.collaborators.is_empty());
    assert_eq!(
        app.notifier.kinds(),
        vec!["collaborator_added", "collaboration_removed"]
    );
}

#[tokio::test]
async fn test_update_permission_mirrors_invite() {
    let app = TestApp::new();
    let owner = app.create_author("Olive").await;
    let c1 = app.create_author("Cleo").await;
    let stranger = app.create_author("Stan").await;
    let story = app.create_story(&owner, "Saga").await;

    app.collaboration
        .invite(&ctx(&owner), story.id, vec![InviteTarget::author(c1.id, false)])
        .await
        .unwrap();

    let entry = app
        .collaboration
        .update_permission(&ctx(&owner), story.id, c1.id, true)
        .await
        .unwrap();
    assert!(entry.edit);
    assert!(app.story(story.id).await.collaborators.get(&c1.id).unwrap().edit);

    let invites = app
        .stores
        .collaboration_invites
        .find_active_by_story(story.id)
        .await
        .unwrap();
    assert_eq!(invites.len(), 1);
    assert!(invites[0].edit);

    let err = app
        .collaboration
        .update_permission(&ctx(&owner), story.id, stranger.id, true)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnprocessableEntity);
    assert_eq!(err.message, "Collaborator not found");

    let err = app
        .collaboration
        .update_permission(&ctx(&stranger), story.id, c1.id, false)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);
}

#[tokio::test]
async fn test_remove_reports_per_target_and_closes_invite() {
    let app = TestApp::new();
    let owner = app.create_author("Olive").await;
    let c1 = app.create_author("Cleo").await;
    let stranger = app.create_author("Stan").await;
    let story = app.create_story(&owner, "Saga").await;

    let invited = app
        .collaboration
        .invite(&ctx(&owner), story.id, vec![InviteTarget::author(c1.id, true)])
        .await
        .unwrap();
    let invite_id = invited.succeeded[0].invite_id;

    let err = app
        .collaboration
        .remove(&ctx(&c1), story.id, vec![owner.id])
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    let result = app
        .collaboration
        .remove(&ctx(&owner), story.id, vec![c1.id, owner.id, stranger.id])
        .await
        .unwrap();
    assert_eq!(result.succeeded, vec![c1.id]);
    let kinds: Vec<ErrorKind> = result.failed.iter().map(|f| f.kind).collect();
    assert_eq!(
        kinds,
        vec![ErrorKind::InvalidSelfOperation, ErrorKind::UnprocessableEntity]
    );

    assert!(app.story(story.id).await.collaborators.is_empty());
    let invite = app
        .stores
        .collaboration_invites
        .find_by_id(invite_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(invite.status(), InviteStatus::Closed);

    // A fresh invite is possible once the old one is closed.
    let again = app
        .collaboration
        .invite(&ctx(&owner), story.id, vec![InviteTarget::author(c1.id, false)])
        .await
        .unwrap();
    assert_eq!(again.succeeded.len(), 1);
}

#[tokio::test]
async fn test_leave_deletes_own_pages() {
    let app = TestApp::new();
    let owner = app.create_author("Olive").await;
    let c1 = app.create_author("Cleo").await;
    let story = app.create_story(&owner, "Saga").await;

    app.collaboration
        .invite(&ctx(&owner), story.id, vec![InviteTarget::author(c1.id, true)])
        .await
        .unwrap();
    app.write_page(&story, &c1, "Chapter 1").await;
    app.write_page(&story, &owner, "Prologue").await;

    let outcome = app
        .collaboration
        .leave(&ctx(&c1), story.id, true)
        .await
        .unwrap();
    assert_eq!(outcome.pages_deleted, 1);
    assert!(!app.story(story.id).await.collaborators.contains(&c1.id));
    assert!(
        app.stores
            .pages
            .find_by_story_and_author(story.id, c1.id)
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(
        app.stores
            .pages
            .find_by_story_and_author(story.id, owner.id)
            .await
            .unwrap()
            .len(),
        1
    );

    let err = app
        .collaboration
        .leave(&ctx(&c1), story.id, true)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnprocessableEntity);
    assert_eq!(err.message, "You are not a collaborator on this Story");

    let err = app
        .collaboration
        .leave(&ctx(&owner), story.id, false)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidSelfOperation);

    assert_eq!(
        app.notifier.kinds(),
        vec!["collaborator_added", "collaboration_left"]
    );
}

#[tokio::test]
async fn test_respond_accept_and_decline() {
    let app = TestApp::new();
    let owner = app.create_author("Olive").await;
    let c1 = app.create_author("Cleo").await;
    let story = app.create_story(&owner, "Saga").await;

    let invited = app
        .collaboration
        .invite(
            &ctx(&owner),
            story.id,
            vec![
                InviteTarget::author(c1.id, true),
                InviteTarget::email("late@x.com", false),
            ],
        )
        .await
        .unwrap();
    let c1_invite = invited.succeeded[0].invite_id;
    let late_invite = invited.succeeded[1].invite_id;

    // Someone else cannot answer.
    let err = app
        .collaboration
        .respond(&ctx(&owner), c1_invite, true)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    let declined = app
        .collaboration
        .respond(&ctx(&c1), c1_invite, false)
        .await
        .unwrap();
    assert_eq!(declined.status(), InviteStatus::Declined);
    assert!(!app.story(story.id).await.collaborators.contains(&c1.id));
    assert!(app.notifier.kinds().contains(&"collaboration_share_false"));

    let err = app
        .collaboration
        .respond(&ctx(&c1), c1_invite, true)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnprocessableEntity);
    assert_eq!(err.message, "Invitation is no longer active");

    // The address-only invitee registers and accepts.
    let late = app.register("Lee", "LATE@x.com", "free").await;
    let accepted = app
        .collaboration
        .respond(&ctx(&late), late_invite, true)
        .await
        .unwrap();
    assert_eq!(accepted.status(), InviteStatus::Accepted);
    assert_eq!(accepted.invited, Some(late.id));
    let story = app.story(story.id).await;
    assert!(story.collaborators.contains(&late.id));
    assert!(!story.collaborators.get(&late.id).unwrap().edit);
}

#[tokio::test]
async fn test_claim_pending_attaches_address_only_invites() {
    let app = TestApp::new();
    let owner = app.create_author("Olive").await;
    let saga = app.create_story(&owner, "Saga").await;
    let epic = app.create_story(&owner, "Epic").await;

    for story in [&saga, &epic] {
        app.collaboration
            .invite(&ctx(&owner), story.id, vec![InviteTarget::email("new@x.com", true)])
            .await
            .unwrap();
    }
    assert!(app.story(saga.id).await.collaborators.is_empty());

    let newcomer = app.register("Nia", "new@x.com", "free").await;
    let claimed = app.collaboration.claim_pending(newcomer.id).await.unwrap();
    assert_eq!(claimed.len(), 2);
    assert!(claimed.iter().all(|i| i.invited == Some(newcomer.id)));

    assert!(app.story(saga.id).await.collaborators.contains(&newcomer.id));
    assert!(app.story(epic.id).await.collaborators.contains(&newcomer.id));

    // Claiming twice finds nothing new.
    assert!(app.collaboration.claim_pending(newcomer.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_listings_search_and_paginate() {
    let app = TestApp::new();
    let owner = app.create_author("Olive").await;
    let c1 = app.create_author("Cleo").await;
    let c2 = app.create_author("Cato").await;
    let stranger = app.create_author("Stan").await;
    let story = app.create_story(&owner, "Saga").await;

    app.collaboration
        .invite(
            &ctx(&owner),
            story.id,
            vec![
                InviteTarget::author(c1.id, true),
                InviteTarget::author(c2.id, false),
            ],
        )
        .await
        .unwrap();

    let all = app
        .collaboration
        .list_collaborators(&ctx(&c2), story.id, PageRequest::default(), None)
        .await
        .unwrap();
    assert_eq!(all.total_items, 3);
    assert_eq!(all.items[0].author_id, owner.id);
    assert!(all.items[0].can_invite);
    assert!(all.items[1..].iter().all(|row| !row.can_invite));

    let page = app
        .collaboration
        .list_collaborators(&ctx(&owner), story.id, PageRequest::new(2, 1), None)
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].author_id, c1.id);
    assert!(page.has_next);
    assert!(page.has_previous);

    let found = app
        .collaboration
        .list_collaborators(&ctx(&owner), story.id, PageRequest::default(), Some("CAT"))
        .await
        .unwrap();
    assert_eq!(found.items.len(), 1);
    assert_eq!(found.items[0].author_id, c2.id);

    let beyond = app
        .collaboration
        .list_collaborators(&ctx(&owner), story.id, PageRequest::new(u64::MAX, 50), None)
        .await
        .unwrap();
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total_items, 3);

    let err = app
        .collaboration
        .list_pending(&ctx(&stranger), story.id, PageRequest::default(), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_invites_add_one_entry() {
    let app = Arc::new(TestApp::new());
    let owner = app.create_author("Olive").await;
    let c1 = app.create_author("Cleo").await;
    let story = app.create_story(&owner, "Saga").await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = app.collaboration.clone();
        let owner = ctx(&owner);
        let target = c1.id;
        let story_id = story.id;
        handles.push(tokio::spawn(async move {
            service
                .invite(&owner, story_id, vec![InviteTarget::author(target, true)])
                .await
                .unwrap()
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        succeeded += handle.await.unwrap().succeeded.len();
    }

    assert_eq!(succeeded, 1);
    let story = app.story(story.id).await;
    assert_eq!(story.collaborators.author_ids(), vec![c1.id]);
    let active = app
        .stores
        .collaboration_invites
        .find_active_by_story(story.id)
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
}
