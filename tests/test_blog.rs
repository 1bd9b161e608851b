mod common;

use axum::http::StatusCode;
use botthef_admin::keys;

#[tokio::test]
async fn create_post_returns_created() {
    let env = common::TestEnv::start();
    let server = env.server();

    let response = server
        .post("/api/blog")
        .authorization(common::admin_bearer())
        .json(&common::sample_post("hello-world"))
        .await;

    response.assert_status(StatusCode::CREATED);
    response.assert_json(&serde_json::json!({
        "slug": "hello-world",
        "message": "Post created"
    }));

    let item = env.blog_repo.get(&keys::blog_key("hello-world")).unwrap();
    assert_eq!(item["PK"], "BLOG#hello-world");
    assert_eq!(item["SK"], "METADATA");
    assert_eq!(item["tags"], serde_json::json!(["intro", "meta"]));
    assert_eq!(item["media"][0]["type"], "image");
}

#[tokio::test]
async fn duplicate_slug_conflicts() {
    let env = common::TestEnv::start();
    let server = env.server_permissive();

    server
        .post("/api/blog")
        .authorization(common::admin_bearer())
        .json(&common::sample_post("hello-world"))
        .await
        .assert_status(StatusCode::CREATED);

    let mut second = common::sample_post("hello-world");
    second["title"] = "Replacement".into();
    let response = server
        .post("/api/blog")
        .authorization(common::admin_bearer())
        .json(&second)
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let item = env.blog_repo.get(&keys::blog_key("hello-world")).unwrap();
    assert_eq!(item["title"], "Hello World");
}

#[tokio::test]
async fn create_with_missing_field_is_unprocessable() {
    let env = common::TestEnv::start();
    let server = env.server_permissive();

    let mut post = common::sample_post("hello-world");
    post.as_object_mut().unwrap().remove("title");

    server
        .post("/api/blog")
        .authorization(common::admin_bearer())
        .json(&post)
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(env.blog_repo.len(), 0);
}

#[tokio::test]
async fn partial_update() {
    let env = common::TestEnv::start();
    let server = env.server();

    server
        .post("/api/blog")
        .authorization(common::admin_bearer())
        .json(&common::sample_post("hello-world"))
        .await;
    let before = env.blog_repo.get(&keys::blog_key("hello-world")).unwrap();

    let response = server
        .put("/api/blog/hello-world")
        .authorization(common::admin_bearer())
        .json(&serde_json::json!({ "title": "Hello Again", "tags": ["updated"] }))
        .await;

    response.assert_json(&serde_json::json!({
        "slug": "hello-world",
        "message": "Post updated"
    }));

    let after = env.blog_repo.get(&keys::blog_key("hello-world")).unwrap();
    assert_eq!(after["title"], "Hello Again");
    assert_eq!(after["tags"], serde_json::json!(["updated"]));
    assert_eq!(after["excerpt"], before["excerpt"]);
    assert_eq!(after["createdAt"], before["createdAt"]);
}

#[tokio::test]
async fn empty_update_is_bad_request() {
    let env = common::TestEnv::start();
    let server = env.server_permissive();

    server
        .post("/api/blog")
        .authorization(common::admin_bearer())
        .json(&common::sample_post("hello-world"))
        .await;

    let response = server
        .put("/api/blog/hello-world")
        .authorization(common::admin_bearer())
        .json(&serde_json::json!({}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["detail"], "No fields to update");
}

#[tokio::test]
async fn update_missing_post_is_not_found() {
    let env = common::TestEnv::start();
    let server = env.server_permissive();

    server
        .put("/api/blog/nope")
        .authorization(common::admin_bearer())
        .json(&serde_json::json!({ "title": "x" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_post_and_blobs() {
    let env = common::TestEnv::start();
    let server = env.server();

    server
        .post("/api/blog")
        .authorization(common::admin_bearer())
        .json(&common::sample_post("hello-world"))
        .await;

    server
        .delete("/api/blog/hello-world")
        .authorization(common::admin_bearer())
        .await
        .assert_json(&serde_json::json!({
            "slug": "hello-world",
            "message": "Post deleted"
        }));

    assert!(env.blog_repo.get(&keys::blog_key("hello-world")).is_none());
    assert_eq!(env.storage.deleted(), vec!["images/blog/hello-world/cover.jpg"]);
}

#[tokio::test]
async fn delete_missing_post_is_not_found() {
    let env = common::TestEnv::start();
    let server = env.server_permissive();

    server
        .delete("/api/blog/nope")
        .authorization(common::admin_bearer())
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_delete_recreate() {
    let env = common::TestEnv::start();
    let server = env.server();

    for _ in 0..2 {
        server
            .post("/api/blog")
            .authorization(common::admin_bearer())
            .json(&common::sample_post("hello-world"))
            .await
            .assert_status(StatusCode::CREATED);
        server
            .delete("/api/blog/hello-world")
            .authorization(common::admin_bearer())
            .await;
    }

    server
        .post("/api/blog")
        .authorization(common::admin_bearer())
        .json(&common::sample_post("hello-world"))
        .await
        .assert_status(StatusCode::CREATED);
    assert_eq!(env.blog_repo.len(), 1);
}
