//! Integration tests for quota reports.

mod helpers;

use storyhub_core::error::ErrorKind;
use storyhub_core::types::id::AuthorId;
use storyhub_database::GroupInviteStore;
use storyhub_entity::author::Author;
use storyhub_service::QuotaReport;

use helpers::{TestApp, ctx};

const MB: u64 = 1024 * 1024;

async fn join(app: &TestApp, owner: &Author, member: &Author) {
    let outcome = app.groups.invite(&ctx(owner), &member.email).await.unwrap();
    let invite = app
        .stores
        .group_invites
        .find_by_id(outcome.invite_id)
        .await
        .unwrap()
        .unwrap();
    app.groups
        .accept(&ctx(member), &invite.token, true)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_group_quota_pools_allotments_per_viewer() {
    let app = TestApp::new();
    let owner = app.create_author_on_plan("Gus", "free").await;
    let member = app.create_author_on_plan("Mo", "member").await;
    join(&app, &owner, &member).await;
    assert!(app.memory.set_used_bytes(owner.id, 10240));
    assert!(app.memory.set_used_bytes(member.id, 5791180));

    let QuotaReport::Group { quota, .. } = app.quota.compute_quota(owner.id).await.unwrap() else {
        panic!("owner should get a group report");
    };
    assert_eq!(quota.you.bytes, 10240);
    assert_eq!(quota.you.formatted, "10 KB");
    assert_eq!(quota.others.bytes, 5791180);
    assert_eq!(quota.others.formatted, "5.52 MB");
    assert_eq!(quota.total.bytes, 105 * MB);
    assert_eq!(quota.total.bytes, 110100480);
    assert_eq!(quota.left.bytes, 104299060);

    let QuotaReport::Group { quota: seen_by_member, .. } =
        app.quota.compute_quota(member.id).await.unwrap()
    else {
        panic!("member should get a group report");
    };
    assert_eq!(seen_by_member.you.bytes, 5791180);
    assert_eq!(seen_by_member.others.bytes, 10240);
    assert_eq!(seen_by_member.total, quota.total);
    assert_eq!(seen_by_member.left, quota.left);
}

#[tokio::test]
async fn test_solo_author_gets_plan_quota() {
    let app = TestApp::new();
    let author = app.create_author("Solo").await;
    assert!(app.memory.set_used_bytes(author.id, 10240));

    match app.quota.compute_quota(author.id).await.unwrap() {
        QuotaReport::Author { plan, quota } => {
            assert_eq!(plan.key, "free");
            assert_eq!(quota.total.formatted, "100 MB");
            assert_eq!(quota.used.formatted, "10 KB");
            assert_eq!(quota.left.bytes, 100 * MB - 10240);
        }
        other => panic!("unexpected report: {other:?}"),
    }

    // Unknown plans fall back to the default plan.
    let stray = app.create_author_on_plan("Stray", "legacy").await;
    match app.quota.compute_quota(stray.id).await.unwrap() {
        QuotaReport::Author { plan, quota } => {
            assert_eq!(plan.key, "free");
            assert_eq!(quota.total.bytes, 100 * MB);
        }
        other => panic!("unexpected report: {other:?}"),
    }
}

#[tokio::test]
async fn test_overuse_floors_left_at_zero() {
    let app = TestApp::new();
    let owner = app.create_author_on_plan("Gus", "member").await;
    let member = app.create_author_on_plan("Mo", "member").await;
    join(&app, &owner, &member).await;
    assert!(app.memory.set_used_bytes(owner.id, (8 * MB) as i64));
    assert!(app.memory.set_used_bytes(member.id, (4 * MB) as i64));

    let QuotaReport::Group { quota, .. } = app.quota.compute_quota(owner.id).await.unwrap() else {
        panic!("owner should get a group report");
    };
    assert_eq!(quota.total.bytes, 10 * MB);
    assert_eq!(quota.left.bytes, 0);
    assert_eq!(quota.left.formatted, "0 B");
}

#[tokio::test]
async fn test_negative_usage_counts_as_zero() {
    let app = TestApp::new();
    let author = app.create_author("Solo").await;
    assert!(app.memory.set_used_bytes(author.id, -512));

    let QuotaReport::Author { quota, .. } = app.quota.compute_quota(author.id).await.unwrap()
    else {
        panic!("solo author should get an author report");
    };
    assert_eq!(quota.used.bytes, 0);
    assert_eq!(quota.left.bytes, 100 * MB);
}

#[tokio::test]
async fn test_group_owner_without_members_still_pools() {
    let app = TestApp::new();
    let owner = app.create_author("Gus").await;
    // Inviting creates the group even before anyone joins.
    app.groups.invite(&ctx(&owner), "later@x.com").await.unwrap();

    let report = app.quota.compute_quota(owner.id).await.unwrap();
    let QuotaReport::Group { quota, .. } = report else {
        panic!("owner should get a group report");
    };
    assert_eq!(quota.total.bytes, 100 * MB);
    assert_eq!(quota.others.bytes, 0);
}

#[tokio::test]
async fn test_missing_author_is_not_found() {
    let app = TestApp::new();
    let err = app.quota.compute_quota(AuthorId::new()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}
