mod common;

use common::spawn_app;
use scribe::domain::{CallerIdentity, Role};
use scribe::models::post::{PostChanges, PostDraft, PostFilter};
use scribe::models::user::User;
use scribe::services::PostError;

fn caller(user: &User) -> CallerIdentity {
    CallerIdentity {
        id: user.id,
        username: user.username.clone(),
        role: user.role,
    }
}

fn draft(title: &str) -> PostDraft {
    PostDraft {
        title: title.to_string(),
        content: "Content long enough for validation to pass.".to_string(),
        tag: None,
    }
}

#[tokio::test]
async fn test_author_other_user_and_admin() {
    let app = spawn_app().await;
    let posts = &app.shared().post_service;

    let a = app.seed_user("author_a", Role::User).await;
    let b = app.seed_user("user_b", Role::User).await;
    let c = app.seed_user("admin_c", Role::Admin).await;

    let post = posts
        .create(&caller(&a), draft("Hello World Example"))
        .await
        .unwrap();
    assert_eq!(post.author_id, a.id);

    let err = posts
        .update(
            &caller(&b),
            post.id,
            PostChanges {
                title: "Hijacked title here".to_string(),
                ..PostChanges::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PostError::NotPermitted { .. }), "{err:?}");

    let unchanged = posts.find(post.id).await.unwrap();
    assert_eq!(unchanged, post);

    let updated = posts
        .update(
            &caller(&c),
            post.id,
            PostChanges {
                title: "Edited By An Administrator".to_string(),
                ..PostChanges::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Edited By An Administrator");
    assert_eq!(updated.author_id, a.id);
    assert_eq!(updated.id, post.id);
    assert_eq!(updated.created_at, post.created_at);
    assert_eq!(updated.content, post.content);
    assert!(updated.updated_at >= post.updated_at);
}

#[tokio::test]
async fn test_duplicate_title_on_create() {
    let app = spawn_app().await;
    let posts = &app.shared().post_service;
    let a = app.seed_user("author_a", Role::User).await;

    posts
        .create(&caller(&a), draft("Hello World Example"))
        .await
        .unwrap();

    let err = posts
        .create(&caller(&a), draft("Hello World Example"))
        .await
        .unwrap_err();
    assert!(matches!(err, PostError::DuplicateTitle(_)), "{err:?}");
}

#[tokio::test]
async fn test_concurrent_creates_with_same_title() {
    let app = spawn_app().await;
    let a = app.seed_user("author_a", Role::User).await;
    let who = caller(&a);

    let posts = app.shared().post_service.clone();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let posts = posts.clone();
            let who = who.clone();
            tokio::spawn(async move {
                posts
                    .create(&who, draft("Racing For The Same Title"))
                    .await
            })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(PostError::DuplicateTitle(_)) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(created, 1);

    let stored = posts.list(&PostFilter::default()).await.unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn test_distinct_titles_with_same_slug() {
    let app = spawn_app().await;
    let posts = &app.shared().post_service;
    let a = app.seed_user("author_a", Role::User).await;

    let first = posts
        .create(&caller(&a), draft("Hello, World Example"))
        .await
        .unwrap();
    let second = posts
        .create(&caller(&a), draft("Hello World Example!"))
        .await
        .unwrap();
    let third = posts
        .create(&caller(&a), draft("HELLO WORLD EXAMPLE"))
        .await
        .unwrap();

    assert_eq!(first.slug.as_deref(), Some("hello-world-example"));
    assert_eq!(second.slug.as_deref(), Some("hello-world-example-2"));
    assert_eq!(third.slug.as_deref(), Some("hello-world-example-3"));
}

#[tokio::test]
async fn test_fields_are_trimmed_before_duplicate_check() {
    let app = spawn_app().await;
    let posts = &app.shared().post_service;
    let a = app.seed_user("author_a", Role::User).await;

    let post = posts
        .create(
            &caller(&a),
            PostDraft {
                title: "  Hello World Example ".to_string(),
                content: "  Content long enough for validation to pass.\n".to_string(),
                tag: Some(" rust ".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(post.title, "Hello World Example");
    assert_eq!(post.content, "Content long enough for validation to pass.");
    assert_eq!(post.tag.as_deref(), Some("rust"));

    let err = posts
        .create(&caller(&a), draft("Hello World Example "))
        .await
        .unwrap_err();
    assert!(matches!(err, PostError::DuplicateTitle(_)), "{err:?}");

    let stored = posts.list(&PostFilter::default()).await.unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn test_update_to_taken_slug_gets_suffix() {
    let app = spawn_app().await;
    let posts = &app.shared().post_service;
    let a = app.seed_user("author_a", Role::User).await;

    posts
        .create(&caller(&a), draft("Hello World Example"))
        .await
        .unwrap();
    let other = posts
        .create(&caller(&a), draft("Another Post Entirely"))
        .await
        .unwrap();

    let renamed = posts
        .update(
            &caller(&a),
            other.id,
            PostChanges {
                title: "Hello World Example!".to_string(),
                ..PostChanges::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.slug.as_deref(), Some("hello-world-example-2"));

    let err = posts
        .update(
            &caller(&a),
            other.id,
            PostChanges {
                title: " Hello World Example ".to_string(),
                ..PostChanges::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PostError::DuplicateTitle(_)), "{err:?}");
}

#[tokio::test]
async fn test_update_validation_and_missing_post() {
    let app = spawn_app().await;
    let posts = &app.shared().post_service;
    let a = app.seed_user("author_a", Role::User).await;

    let post = posts
        .create(&caller(&a), draft("Hello World Example"))
        .await
        .unwrap();

    let err = posts
        .update(
            &caller(&a),
            post.id,
            PostChanges {
                title: "short".to_string(),
                ..PostChanges::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PostError::Validation(_)), "{err:?}");

    let err = posts
        .update(
            &caller(&a),
            post.id + 100,
            PostChanges {
                title: "Long enough new title".to_string(),
                ..PostChanges::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PostError::NotFound(_)), "{err:?}");

    // Keeping the same title is not a conflict with itself
    let same = posts
        .update(
            &caller(&a),
            post.id,
            PostChanges {
                title: post.title.clone(),
                content: Some("Rewritten content that is still long.".to_string()),
                tag: Some("  ".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(same.title, post.title);
    assert_eq!(same.tag, None);
    assert_eq!(same.slug.as_deref(), Some("hello-world-example"));
}

#[tokio::test]
async fn test_author_names_resolved_in_batch() {
    let app = spawn_app().await;
    let posts = &app.shared().post_service;
    let a = app.seed_user("author_a", Role::User).await;
    let b = app.seed_user("user_b", Role::User).await;

    posts
        .create(&caller(&a), draft("First Post From A"))
        .await
        .unwrap();
    posts
        .create(&caller(&b), draft("First Post From B"))
        .await
        .unwrap();

    let all = posts.list(&PostFilter::default()).await.unwrap();
    let names = posts.author_names(&all).await.unwrap();
    assert_eq!(names.get(&a.id).map(String::as_str), Some("author_a"));
    assert_eq!(names.get(&b.id).map(String::as_str), Some("user_b"));
}
