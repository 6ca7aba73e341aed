mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use uuid::Uuid;

use common::{cleanup_user, create_verified_user, init_app, lazy_pool, test_pool};
use taskhive::db;

fn hashtag_names(hashtags: Vec<taskhive::models::Hashtag>) -> Vec<String> {
    hashtags.into_iter().map(|h| h.hashtag).collect()
}

#[actix_rt::test]
async fn test_create_task_unauthorized() {
    let app = init_app(lazy_pool()).await;

    let req = test::TestRequest::post()
        .uri("/tasks")
        .set_json(json!({"title": "Unauthorized Task", "creator_id": Uuid::new_v4()}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::delete()
        .uri(&format!("/tasks/{}", Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_task_crud_flow() {
    let Some(pool) = test_pool().await else { return };
    let app = init_app(pool.clone()).await;
    let creator = create_verified_user(&pool).await;
    let viewer = create_verified_user(&pool).await;

    // Create
    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header(creator.bearer())
        .set_json(json!({
            "title": "Record a podcast",
            "description": "About #Rust and #actix, more #rust",
            "creator_id": creator.id,
            "assignee_id": viewer.id,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let task: Value = test::read_body_json(resp).await;
    assert_eq!(task["title"], "Record a podcast");
    assert_eq!(task["status"], "IDEA");
    assert_eq!(task["creator_id"], creator.id.to_string());
    assert_eq!(task["assignee_id"], viewer.id.to_string());
    assert!(task["assigned_at"].is_string());
    assert!(task.get("creator").is_none());
    let task_id: Uuid = task["id"].as_str().unwrap().parse().unwrap();

    let hashtags = db::hashtags::get_hashtags_for_task(&pool, task_id).await.unwrap();
    assert_eq!(hashtag_names(hashtags), vec!["actix", "rust"]);

    // The creator sees everything
    let req = test::TestRequest::get()
        .uri(&format!("/tasks/{}", task_id))
        .insert_header(creator.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let details: Value = test::read_body_json(resp).await;
    assert_eq!(details["creator"]["id"], creator.id.to_string());
    assert_eq!(details["creator"]["username"], creator.username.as_str());
    assert_eq!(details["assignee"]["id"], viewer.id.to_string());
    assert_eq!(details["suggested_by"], Value::Null);
    assert_eq!(details["n_comments"], 0);

    // Everyone else does not see the planning fields
    let req = test::TestRequest::get()
        .uri(&format!("/tasks/{}", task_id))
        .insert_header(viewer.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let details: Value = test::read_body_json(resp).await;
    assert_eq!(details["title"], "Record a podcast");
    assert_eq!(details["assignee"], Value::Null);
    assert_eq!(details["assignee_id"], Value::Null);
    assert_eq!(details["assigned_at"], Value::Null);

    // Only the creator may update
    let req = test::TestRequest::patch()
        .uri(&format!("/tasks/{}", task_id))
        .insert_header(viewer.bearer())
        .set_json(json!({"title": "Hijacked"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::patch()
        .uri(&format!("/tasks/{}", task_id))
        .insert_header(creator.bearer())
        .set_json(json!({
            "description": "Now about #tokio",
            "status": "IN_PROGRESS",
            "assignee_id": null,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({
            "description": "Now about #tokio",
            "status": "IN_PROGRESS",
            "assignee_id": null,
            "assigned_at": null,
        })
    );

    let hashtags = db::hashtags::get_hashtags_for_task(&pool, task_id).await.unwrap();
    assert_eq!(hashtag_names(hashtags), vec!["tokio"]);

    // Give the task a comment and a task-scoped grade, both must go with it
    let req = test::TestRequest::post()
        .uri("/tasks/comment")
        .insert_header(viewer.bearer())
        .set_json(json!({"task_id": task_id, "user_id": viewer.id, "content": "Count me in"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/tasks/subscribe")
        .insert_header(viewer.bearer())
        .set_json(json!({"creator_id": creator.id, "task_id": task_id}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Delete
    let req = test::TestRequest::delete()
        .uri(&format!("/tasks/{}", task_id))
        .insert_header(viewer.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&format!("/tasks/{}", task_id))
        .insert_header(creator.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, Value::Null);

    let req = test::TestRequest::get()
        .uri(&format!("/tasks/{}", task_id))
        .insert_header(creator.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let hashtags = db::hashtags::get_hashtags_for_task(&pool, task_id).await.unwrap();
    assert!(hashtags.is_empty());

    let req = test::TestRequest::get()
        .uri(&format!("/tasks/{}/comments", task_id))
        .insert_header(viewer.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page: Value = test::read_body_json(resp).await;
    assert_eq!(page["total"], 0);
    assert_eq!(page["items"], json!([]));

    let req = test::TestRequest::get()
        .uri(&format!("/tasks/subscriptions?task_id={}", task_id))
        .insert_header(viewer.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"grades": []}));

    cleanup_user(&pool, &creator.email).await;
    cleanup_user(&pool, &viewer.email).await;
}

#[actix_rt::test]
async fn test_create_task_ownership_rules() {
    let Some(pool) = test_pool().await else { return };
    let app = init_app(pool.clone()).await;
    let user = create_verified_user(&pool).await;
    let creator = create_verified_user(&pool).await;

    // Posting a task on behalf of someone else
    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header(user.bearer())
        .set_json(json!({"title": "Not mine", "creator_id": creator.id}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({"error": "Can't create task: Current user id is not equal to creator_id"})
    );

    // Suggesting in someone else's name
    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header(user.bearer())
        .set_json(json!({
            "title": "Suggestion",
            "creator_id": creator.id,
            "suggested_by_id": creator.id,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // A proper suggestion
    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header(user.bearer())
        .set_json(json!({
            "title": "Suggestion",
            "creator_id": creator.id,
            "suggested_by_id": user.id,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let task: Value = test::read_body_json(resp).await;
    assert_eq!(task["suggested_by_id"], user.id.to_string());
    assert_eq!(task["assigned_at"], Value::Null);

    // Unknown assignee
    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header(creator.bearer())
        .set_json(json!({
            "title": "Assigned to nobody",
            "creator_id": creator.id,
            "assignee_id": Uuid::new_v4(),
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({"error": "Can't create task: No row with such foreign key id"})
    );

    cleanup_user(&pool, &user.email).await;
    cleanup_user(&pool, &creator.email).await;
}

#[actix_rt::test]
async fn test_update_task_rejections() {
    let Some(pool) = test_pool().await else { return };
    let app = init_app(pool.clone()).await;
    let creator = create_verified_user(&pool).await;

    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header(creator.bearer())
        .set_json(json!({"title": "Draft", "creator_id": creator.id}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let task: Value = test::read_body_json(resp).await;
    let task_id = task["id"].as_str().unwrap().to_string();

    let yesterday = (Utc::now() - Duration::days(1)).to_rfc3339();
    let cases = [
        json!({"creator_id": Uuid::new_v4()}),
        json!({"title": null}),
        json!({"title": "x"}),
        json!({"status": "ARCHIVED"}),
        json!({"due_to_date": yesterday}),
        json!({"assignee_id": Uuid::new_v4()}),
    ];
    for payload in cases {
        let req = test::TestRequest::patch()
            .uri(&format!("/tasks/{}", task_id))
            .insert_header(creator.bearer())
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "payload: {}", payload);
    }

    let req = test::TestRequest::patch()
        .uri(&format!("/tasks/{}", Uuid::new_v4()))
        .insert_header(creator.bearer())
        .set_json(json!({"title": "Missing"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/tasks/not-a-uuid")
        .insert_header(creator.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    cleanup_user(&pool, &creator.email).await;
}
