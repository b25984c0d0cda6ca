//! Integration tests for account groups.

mod helpers;

use storyhub_core::config::AppConfig;
use storyhub_core::error::ErrorKind;
use storyhub_database::{GroupInviteStore, GroupStore};
use storyhub_service::group::GroupRole;

use helpers::{TestApp, ctx};

async fn token_of(app: &TestApp, invite_id: storyhub_core::types::id::GroupInviteId) -> String {
    app.stores
        .group_invites
        .find_by_id(invite_id)
        .await
        .unwrap()
        .unwrap()
        .token
}

#[tokio::test]
async fn test_invite_unregistered_email_then_accept_after_signup() {
    let app = TestApp::new();
    let owner = app.create_author("Gus").await;

    let outcome = app.groups.invite(&ctx(&owner), "new@x.com").await.unwrap();
    assert!(outcome.invited.is_none());
    assert_eq!(outcome.email, "new@x.com");

    let invite = app
        .stores
        .group_invites
        .find_by_id(outcome.invite_id)
        .await
        .unwrap()
        .unwrap();
    assert!(invite.invited.is_none());
    assert!(invite.active);
    assert_eq!(invite.token.len(), 64);

    let newcomer = app.register("Nia", "new@x.com", "member").await;
    let accepted = app
        .groups
        .accept(&ctx(&newcomer), &invite.token, true)
        .await
        .unwrap();
    assert!(accepted.accepted);
    assert_eq!(accepted.group, Some(outcome.group_id));

    let group = app.stores.groups.find_by_id(outcome.group_id).await.unwrap().unwrap();
    assert_eq!(group.member_ids(), vec![newcomer.id]);

    let invite = app
        .stores
        .group_invites
        .find_by_id(outcome.invite_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(invite.accepted, Some(true));
    assert!(!invite.active);
    assert_eq!(invite.invited, Some(newcomer.id));

    assert_eq!(
        app.notifier.kinds(),
        vec!["group_invite_sent", "group_member_added"]
    );
}

#[tokio::test]
async fn test_used_token_fails_differently_from_unknown_token() {
    let app = TestApp::new();
    let owner = app.create_author("Gus").await;
    let member = app.create_author("Mo").await;

    let outcome = app.groups.invite(&ctx(&owner), "mo@x.com").await.unwrap();
    assert_eq!(outcome.invited.as_ref().map(|a| a.id), Some(member.id));
    let token = token_of(&app, outcome.invite_id).await;

    app.groups.accept(&ctx(&member), &token, true).await.unwrap();

    let used = app
        .groups
        .accept(&ctx(&member), &token, true)
        .await
        .unwrap_err();
    assert_eq!(used.kind, ErrorKind::UnprocessableEntity);
    assert_eq!(used.message, "This invitation has already been used");

    let unknown = app
        .groups
        .accept(&ctx(&member), "deadbeef", true)
        .await
        .unwrap_err();
    assert_eq!(unknown.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_decline_leaves_group_unchanged() {
    let app = TestApp::new();
    let owner = app.create_author("Gus").await;
    let member = app.create_author("Mo").await;
    let stranger = app.create_author("Stan").await;

    let outcome = app.groups.invite(&ctx(&owner), "mo@x.com").await.unwrap();
    let token = token_of(&app, outcome.invite_id).await;

    let err = app
        .groups
        .accept(&ctx(&stranger), &token, true)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    let declined = app.groups.accept(&ctx(&member), &token, false).await.unwrap();
    assert!(!declined.accepted);
    assert!(declined.group.is_none());

    let group = app.stores.groups.find_by_id(outcome.group_id).await.unwrap().unwrap();
    assert!(group.members.is_empty());
    let invite = app
        .stores
        .group_invites
        .find_by_id(outcome.invite_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(invite.accepted, Some(false));
    assert!(!invite.active);
}

#[tokio::test]
async fn test_author_joins_at_most_one_group() {
    let app = TestApp::new();
    let first = app.create_author("Gus").await;
    let second = app.create_author("Hal").await;
    let member = app.create_author("Mo").await;

    let a = app.groups.invite(&ctx(&first), "mo@x.com").await.unwrap();
    let b = app.groups.invite(&ctx(&second), "mo@x.com").await.unwrap();
    let token_a = token_of(&app, a.invite_id).await;
    let token_b = token_of(&app, b.invite_id).await;

    app.groups.accept(&ctx(&member), &token_a, true).await.unwrap();
    let err = app
        .groups
        .accept(&ctx(&member), &token_b, true)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnprocessableEntity);

    let joined = app.stores.groups.find_by_member(member.id).await.unwrap().unwrap();
    assert_eq!(joined.id, a.group_id);
    let other = app.stores.groups.find_by_id(b.group_id).await.unwrap().unwrap();
    assert!(other.members.is_empty());

    // Already a member elsewhere: rejected at invite time too.
    let third = app.create_author("Ivy").await;
    let err = app.groups.invite(&ctx(&third), "mo@x.com").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnprocessableEntity);
    assert_eq!(err.message, "User already belongs to another group");
}

#[tokio::test]
async fn test_group_owner_cannot_join_another_group() {
    let app = TestApp::new();
    let gus = app.create_author("Gus").await;
    let mo = app.create_author("Mo").await;
    let hal = app.create_author("Hal").await;

    let own = app.groups.invite(&ctx(&gus), "mo@x.com").await.unwrap();
    let token = token_of(&app, own.invite_id).await;
    app.groups.accept(&ctx(&mo), &token, true).await.unwrap();

    let theirs = app.groups.invite(&ctx(&hal), "gus@x.com").await.unwrap();
    let token = token_of(&app, theirs.invite_id).await;
    let err = app
        .groups
        .accept(&ctx(&gus), &token, true)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnprocessableEntity);

    assert!(app.stores.groups.find_by_member(gus.id).await.unwrap().is_none());
    let hal_group = app.stores.groups.find_by_id(theirs.group_id).await.unwrap().unwrap();
    assert!(hal_group.members.is_empty());
    let invite = app
        .stores
        .group_invites
        .find_by_id(theirs.invite_id)
        .await
        .unwrap()
        .unwrap();
    assert!(!invite.is_resolved());
}

#[tokio::test]
async fn test_invite_rules() {
    let mut config = AppConfig::default();
    config.groups.max_members = 2;
    let app = TestApp::with_config(config);
    let owner = app.create_author("Gus").await;
    let member = app.create_author("Mo").await;

    let err = app.groups.invite(&ctx(&owner), "gus@x.com").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidSelfOperation);

    let err = app.groups.invite(&ctx(&owner), "not-an-email").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::BadRequest);

    let outcome = app.groups.invite(&ctx(&owner), "mo@x.com").await.unwrap();
    let err = app.groups.invite(&ctx(&owner), "MO@x.com").await.unwrap_err();
    assert_eq!(err.message, "User is already invited to this group");

    app.groups.invite(&ctx(&owner), "two@x.com").await.unwrap();
    // One accepted member plus one open invite fill a group of two.
    let err = app.groups.invite(&ctx(&owner), "three@x.com").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnprocessableEntity);

    let token = token_of(&app, outcome.invite_id).await;
    app.groups.accept(&ctx(&member), &token, true).await.unwrap();
    let err = app.groups.invite(&ctx(&member), "other@x.com").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);
}

#[tokio::test]
async fn test_leave_and_remove() {
    let app = TestApp::new();
    let owner = app.create_author("Gus").await;
    let mo = app.create_author("Mo").await;
    let kai = app.create_author("Kai").await;
    let stranger = app.create_author("Stan").await;

    let mut group_id = None;
    for member in [&mo, &kai] {
        let outcome = app.groups.invite(&ctx(&owner), &member.email).await.unwrap();
        let token = token_of(&app, outcome.invite_id).await;
        app.groups.accept(&ctx(member), &token, true).await.unwrap();
        group_id = Some(outcome.group_id);
    }
    let group_id = group_id.unwrap();

    let rows = app.groups.list_members(&ctx(&kai), group_id).await.unwrap();
    let roles: Vec<GroupRole> = rows.iter().map(|r| r.role).collect();
    assert_eq!(roles, vec![GroupRole::Owner, GroupRole::Member, GroupRole::Member]);
    assert_eq!(rows[0].author_id, owner.id);

    let err = app
        .groups
        .list_members(&ctx(&stranger), group_id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    assert_eq!(app.groups.leave(&ctx(&mo)).await.unwrap(), group_id);
    let err = app.groups.leave(&ctx(&mo)).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = app
        .groups
        .remove(&ctx(&kai), group_id, owner.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    let err = app
        .groups
        .remove(&ctx(&owner), group_id, owner.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidSelfOperation);

    let err = app
        .groups
        .remove(&ctx(&owner), group_id, stranger.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::BadRequest);

    app.groups.remove(&ctx(&owner), group_id, kai.id).await.unwrap();
    let group = app.stores.groups.find_by_id(group_id).await.unwrap().unwrap();
    assert!(group.members.is_empty());
    assert!(group.is_owner(owner.id));

    let kinds = app.notifier.kinds();
    assert_eq!(
        kinds.iter().filter(|k| **k == "group_member_removed").count(),
        2
    );
}

#[tokio::test]
async fn test_cancel_invite_is_inviter_only() {
    let app = TestApp::new();
    let owner = app.create_author("Gus").await;
    let stranger = app.create_author("Stan").await;

    let outcome = app.groups.invite(&ctx(&owner), "new@x.com").await.unwrap();

    let err = app
        .groups
        .cancel_invite(&ctx(&stranger), outcome.invite_id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    let cancelled = app
        .groups
        .cancel_invite(&ctx(&owner), outcome.invite_id)
        .await
        .unwrap();
    assert!(!cancelled.active);
    assert!(
        app.groups
            .list_invites(&ctx(&owner), outcome.group_id)
            .await
            .unwrap()
            .is_empty()
    );

    let err = app
        .groups
        .cancel_invite(&ctx(&owner), outcome.invite_id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnprocessableEntity);

    // A cancelled token cannot be redeemed.
    let newcomer = app.register("Nia", "new@x.com", "free").await;
    let token = token_of(&app, outcome.invite_id).await;
    let err = app
        .groups
        .accept(&ctx(&newcomer), &token, true)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnprocessableEntity);
}
