mod common;

use common::TestBackend;
use quill_server::data::profile_repository::ProfilePatch;
use quill_server::domain::error::DomainError;
use quill_server::domain::profile::SocialLinks;
use uuid::Uuid;

#[tokio::test]
async fn creating_a_profile_seeds_starter_posts() {
    let backend = TestBackend::new();
    let service = backend.profile_service();

    let profile = service
        .create_profile(Uuid::new_v4(), "alice".into(), "hi there".into())
        .await
        .unwrap();
    assert_eq!(profile.handle, "alice");

    let seeded = backend.posts.all();
    assert_eq!(seeded.len(), 3);
    assert_eq!(seeded.iter().filter(|p| p.published).count(), 2);
    assert_eq!(seeded.iter().filter(|p| !p.published).count(), 1);
    assert!(seeded.iter().all(|p| p.author_id == profile.id));
}

#[tokio::test]
async fn duplicate_handles_conflict_distinctly_on_create() {
    let backend = TestBackend::new();
    let service = backend.profile_service();

    service
        .create_profile(Uuid::new_v4(), "alice".into(), String::new())
        .await
        .unwrap();

    let err = service
        .create_profile(Uuid::new_v4(), "alice".into(), String::new())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::HandleTaken(h) if h == "alice"));
}

#[tokio::test]
async fn duplicate_handles_conflict_distinctly_on_update() {
    let backend = TestBackend::new();
    let service = backend.profile_service();

    service
        .create_profile(Uuid::new_v4(), "alice".into(), String::new())
        .await
        .unwrap();
    let bob = service
        .create_profile(Uuid::new_v4(), "bob".into(), String::new())
        .await
        .unwrap();

    let err = service
        .update_profile(
            bob.id,
            ProfilePatch {
                handle: Some("alice".into()),
                ..ProfilePatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::HandleTaken(_)));
}

#[tokio::test]
async fn one_profile_per_principal() {
    let backend = TestBackend::new();
    let service = backend.profile_service();
    let principal_id = Uuid::new_v4();

    service
        .create_profile(principal_id, "alice".into(), String::new())
        .await
        .unwrap();

    let err = service
        .create_profile(principal_id, "alice2".into(), String::new())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::ProfileExists));
}

#[tokio::test]
async fn malformed_handles_are_rejected() {
    let backend = TestBackend::new();
    let service = backend.profile_service();

    for bad in ["", "has space", "dot.ted", "émile"] {
        let err = service
            .create_profile(Uuid::new_v4(), bad.into(), String::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)), "accepted {bad:?}");
    }
}

#[tokio::test]
async fn partial_updates_leave_other_fields_alone() {
    let backend = TestBackend::new();
    let service = backend.profile_service();

    let profile = service
        .create_profile(Uuid::new_v4(), "alice".into(), "old bio".into())
        .await
        .unwrap();

    let updated = service
        .update_profile(
            profile.id,
            ProfilePatch {
                bio: Some("new bio".into()),
                ..ProfilePatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.handle, "alice");
    assert_eq!(updated.bio, "new bio");
}

#[tokio::test]
async fn blank_social_links_are_stripped_on_update() {
    let backend = TestBackend::new();
    let service = backend.profile_service();

    let profile = service
        .create_profile(Uuid::new_v4(), "alice".into(), String::new())
        .await
        .unwrap();

    let mut links = SocialLinks::new();
    links.insert("github".into(), "https://github.com/alice".into());
    links.insert("twitter".into(), "   ".into());

    let updated = service
        .update_profile(
            profile.id,
            ProfilePatch {
                social_links: Some(links),
                ..ProfilePatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.social_links.len(), 1);
    assert!(updated.social_links.contains_key("github"));
}

#[tokio::test]
async fn replacing_an_avatar_leaves_exactly_one_linked() {
    let backend = TestBackend::new();
    let service = backend.profile_service();

    let profile = service
        .create_profile(Uuid::new_v4(), "alice".into(), String::new())
        .await
        .unwrap();

    let first = service
        .replace_avatar(profile.id, &[1, 2, 3], "image/png")
        .await
        .unwrap();
    let first_path = first.avatar.as_ref().unwrap().path.clone();

    let second = service
        .replace_avatar(profile.id, &[4, 5, 6], "image/jpeg")
        .await
        .unwrap();
    let second_path = second.avatar.as_ref().unwrap().path.clone();

    assert_ne!(first_path, second_path);
    // old bytes were cleaned up
    assert_eq!(*backend.files.deleted.lock().unwrap(), vec![first_path]);
}

#[tokio::test]
async fn old_avatar_delete_failure_does_not_fail_the_replacement() {
    let backend = TestBackend::new();
    let service = backend.profile_service();

    let profile = service
        .create_profile(Uuid::new_v4(), "alice".into(), String::new())
        .await
        .unwrap();

    service
        .replace_avatar(profile.id, &[1, 2, 3], "image/png")
        .await
        .unwrap();

    backend.files.fail_deletes();
    let replaced = service
        .replace_avatar(profile.id, &[4, 5, 6], "image/webp")
        .await
        .unwrap();

    // the new avatar is linked even though the old file is stranded
    let avatar = replaced.avatar.unwrap();
    assert!(avatar.path.ends_with(".webp"));
    assert!(backend.files.deleted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn removing_a_missing_avatar_is_a_noop() {
    let backend = TestBackend::new();
    let service = backend.profile_service();

    let profile = service
        .create_profile(Uuid::new_v4(), "alice".into(), String::new())
        .await
        .unwrap();

    service.remove_avatar(profile.id).await.unwrap();

    service
        .replace_avatar(profile.id, &[1], "image/png")
        .await
        .unwrap();
    service.remove_avatar(profile.id).await.unwrap();

    let after = service.profile(profile.id).await.unwrap();
    assert!(after.avatar.is_none());
    assert_eq!(backend.files.deleted.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn oversized_or_non_image_avatars_are_rejected() {
    let backend = TestBackend::new();
    let service = backend.profile_service();

    let profile = service
        .create_profile(Uuid::new_v4(), "alice".into(), String::new())
        .await
        .unwrap();

    let too_big = vec![0u8; 2 * 1024 * 1024 + 1];
    assert!(matches!(
        service.replace_avatar(profile.id, &too_big, "image/png").await,
        Err(DomainError::Validation(_))
    ));
    assert!(matches!(
        service
            .replace_avatar(profile.id, &[1, 2], "application/pdf")
            .await,
        Err(DomainError::Validation(_))
    ));

    // nothing was linked by the failed attempts
    let after = service.profile(profile.id).await.unwrap();
    assert!(after.avatar.is_none());
}

#[tokio::test]
async fn discovery_lists_newest_profiles_first() {
    let backend = TestBackend::new();
    let service = backend.profile_service();

    for i in 0..12 {
        backend.insert_profile(&format!("author-{i}")).await;
    }

    let page1 = service.list_profiles(1).await.unwrap();
    assert_eq!(page1.items.len(), 10);
    assert!(page1.has_more);

    let page2 = service.list_profiles(2).await.unwrap();
    assert_eq!(page2.items.len(), 2);
    assert!(!page2.has_more);
}
