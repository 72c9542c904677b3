//! Integration tests for the WordPress REST API client.
//!
//! Every test runs against a local `wiremock` server mounted under
//! `/wp-json/`, so no live site is needed.
//!
//! Run with:
//!
//! ```bash
//! cargo test -- --nocapture
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wordpress_client::{
    Category, Paging, Post, PostsQuery, Rendered, TaxonomyQuery, WordPressClient, WordPressError,
};

fn client(server: &MockServer) -> WordPressClient {
    WordPressClient::new(&format!("{}/wp-json/", server.uri())).unwrap()
}

fn post_json(id: u64, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "date": "2024-05-01T10:00:00",
        "slug": title.to_lowercase().replace(' ', "-"),
        "status": "publish",
        "link": format!("https://demo.com/?p={id}"),
        "title": {"rendered": title},
        "content": {"rendered": "<p>Body</p>", "protected": false},
        "excerpt": {"rendered": "<p>Body</p>", "protected": false},
        "author": 1,
        "featured_media": 0,
        "sticky": false,
        "format": "standard",
        "categories": [7],
        "tags": []
    })
}

// ---------------------------------------------------------------------------
// 1. Listing & filters
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_posts_by_category() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts"))
        .and(query_param("categories", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([post_json(1, "First")])))
        .expect(1)
        .mount(&server)
        .await;

    let posts = client(&server)
        .posts()
        .by_category(7, false, false)
        .await
        .unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].title.rendered, "First");
}

#[tokio::test]
async fn list_posts_by_search_term() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts"))
        .and(query_param("search", "foo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let posts = client(&server)
        .posts()
        .by_search("foo", false, false)
        .await
        .unwrap();
    assert!(posts.is_empty());
}

#[tokio::test]
async fn post_shortcuts_use_expected_query() {
    let server = MockServer::start().await;
    for (key, value) in [("sticky", "true"), ("tags", "4"), ("author", "2")] {
        Mock::given(method("GET"))
            .and(path("/wp-json/wp/v2/posts"))
            .and(query_param(key, value))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([post_json(9, key)])))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = client(&server);
    let posts = client.posts();
    assert_eq!(posts.sticky(false, false).await.unwrap()[0].title.rendered, "sticky");
    assert_eq!(posts.by_tag(4, false, false).await.unwrap()[0].title.rendered, "tags");
    assert_eq!(posts.by_author(2, false, false).await.unwrap()[0].title.rendered, "author");
}

#[tokio::test]
async fn list_with_paging_and_embed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/categories"))
        .and(query_param("page", "2"))
        .and(query_param("per_page", "5"))
        .and(query_param("_embed", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 3, "count": 10, "name": "News", "slug": "news", "parent": 0}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let query = TaxonomyQuery {
        paging: Paging::page(2, 5),
        ..Default::default()
    };
    let cats = client(&server)
        .categories()
        .list(&query, true, false)
        .await
        .unwrap();
    assert_eq!(cats[0].name, "News");

    let received = server.received_requests().await.unwrap();
    assert_eq!(received[0].url.query(), Some("page=2&per_page=5&_embed"));
}

#[tokio::test]
async fn embed_without_query_uses_question_mark() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(post_json(5, "Embedded")))
        .mount(&server)
        .await;

    client(&server).posts().get(5, true, false).await.unwrap();

    let received = server.received_requests().await.unwrap();
    assert_eq!(received[0].url.query(), Some("_embed"));
}

#[tokio::test]
async fn list_all_walks_every_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "100"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-WP-Total", "3")
                .insert_header("X-WP-TotalPages", "2")
                .set_body_json(json!([post_json(1, "One"), post_json(2, "Two")])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([post_json(3, "Three")])))
        .expect(1)
        .mount(&server)
        .await;

    let posts = client(&server).posts().list_all(false, false).await.unwrap();
    let ids: Vec<u64> = posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn list_all_stops_at_first_empty_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/tags"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-WP-TotalPages", "100000")
                .set_body_json(json!([{"id": 1, "name": "rust"}])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/tags"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let tags = client(&server).tags().list_all(false, false).await.unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].name, "rust");
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// 2. Authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bearer_token_sent_only_when_requested() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(post_json(1, "Hello")))
        .mount(&server)
        .await;

    let client = client(&server);
    client.set_token("secret-token");
    client.posts().get(1, false, false).await.unwrap();
    client.posts().get(1, false, true).await.unwrap();

    let received = server.received_requests().await.unwrap();
    assert!(received[0].headers.get("authorization").is_none());
    assert_eq!(
        received[1].headers.get("authorization").unwrap(),
        "Bearer secret-token"
    );
}

#[tokio::test]
async fn current_user_requires_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/users/me"))
        .and(header("Authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1, "name": "admin", "slug": "admin"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = WordPressClient::builder(&format!("{}/wp-json/", server.uri()))
        .token("tok")
        .build()
        .unwrap();
    let me = client.users().me().await.unwrap();
    assert_eq!(me.id, 1);
    assert_eq!(me.name, "admin");
}

// ---------------------------------------------------------------------------
// 3. Create / update / delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_then_get_round_trip() {
    let server = MockServer::start().await;
    let stored = post_json(42, "Created");
    Mock::given(method("POST"))
        .and(path("/wp-json/wp/v2/posts"))
        .and(header("Authorization", "Bearer tok"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({
            "title": {"raw": "Created", "rendered": "Created"},
            "status": "publish",
            "categories": [7]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(stored.clone()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stored))
        .mount(&server)
        .await;

    let client = client(&server);
    client.set_token("tok");
    let draft = Post {
        title: Rendered::raw("Created"),
        status: "publish".into(),
        categories: Some(vec![7]),
        ..Default::default()
    };
    let created = client.posts().create(&draft).await.unwrap();
    let fetched = client.posts().get(created.id, false, false).await.unwrap();
    assert_eq!(created.id, 42);
    assert_eq!(created, fetched);
}

#[tokio::test]
async fn update_posts_to_item_route() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wp-json/wp/v2/categories/3"))
        .and(body_json(json!({"name": "Renamed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3, "count": 1, "name": "Renamed", "slug": "news", "parent": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    client.set_token("tok");
    let updated = client
        .categories()
        .update(
            3,
            &Category {
                name: "Renamed".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.slug, "news");
    assert_eq!(updated.parent, Some(0));
}

#[tokio::test]
async fn partial_update_sends_only_set_fields() {
    let server = MockServer::start().await;
    let mut stored = post_json(8, "New title");
    stored["sticky"] = json!(true);
    stored["tags"] = json!([2, 3]);
    Mock::given(method("POST"))
        .and(path("/wp-json/wp/v2/posts/8"))
        .and(body_json(json!({
            "title": {"raw": "New title", "rendered": "New title"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(stored))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    client.set_token("tok");
    let updated = client
        .posts()
        .update(
            8,
            &Post {
                title: Rendered::raw("New title"),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.sticky, Some(true));
    assert_eq!(updated.tags, Some(vec![2, 3]));

    let received = server.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    for field in ["sticky", "categories", "tags", "content", "excerpt"] {
        assert!(sent.get(field).is_none(), "{field} should not be sent");
    }
}

#[tokio::test]
async fn delete_passes_force_flag() {
    let server = MockServer::start().await;
    for force in ["true", "false"] {
        Mock::given(method("DELETE"))
            .and(path("/wp-json/wp/v2/posts/42"))
            .and(query_param("force", force))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"deleted": true})))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = client(&server);
    client.set_token("tok");
    assert!(client.posts().delete(42, true).await.unwrap());
    assert!(client.posts().delete(42, false).await.unwrap());
}

#[tokio::test]
async fn delete_reports_failure_status() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/wp-json/wp/v2/posts/5/revisions/9"))
        .respond_with(ResponseTemplate::new(501).set_body_json(json!({
            "code": "rest_trash_not_supported",
            "message": "Revisions do not support trashing."
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    assert!(!client.post_revisions(5).delete(9, false).await.unwrap());

    let meta = client
        .http()
        .delete("wp/v2/posts/5/revisions/9?force=false", true)
        .await
        .unwrap();
    assert_eq!(meta.status.as_u16(), 501);
}

// ---------------------------------------------------------------------------
// 4. Failure handling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_non_success_is_typed_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts/99"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": "rest_post_invalid_id",
            "message": "Invalid post ID.",
            "data": {"status": 404}
        })))
        .mount(&server)
        .await;

    let err = client(&server).posts().get(99, false, false).await.unwrap_err();
    assert!(matches!(err, WordPressError::NotFound { ref message } if message == "Invalid post ID."));
}

#[tokio::test]
async fn get_or_default_swallows_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let posts: Vec<Post> = client(&server)
        .http()
        .get_or_default("wp/v2/posts", false, false)
        .await
        .unwrap();
    assert!(posts.is_empty());
}

#[tokio::test]
async fn post_or_default_keeps_real_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wp-json/wp/v2/posts"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": "rest_cannot_create",
            "message": "Sorry, you are not allowed to create posts as this user."
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    let (post, meta): (Post, _) = client
        .http()
        .post_or_default("wp/v2/posts", "{}".into(), true)
        .await
        .unwrap();
    assert_eq!(post, Post::default());
    assert_eq!(meta.status.as_u16(), 401);

    let err = client.posts().create(&Post::default()).await.unwrap_err();
    assert!(matches!(err, WordPressError::Authentication { .. }));
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn undecodable_success_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wp-json/wp/v2/posts"))
        .respond_with(ResponseTemplate::new(201).set_body_string("<b>Notice</b>: not json"))
        .mount(&server)
        .await;

    let client = client(&server);
    client.set_token("tok");
    let err = client.posts().create(&Post::default()).await.unwrap_err();
    match err {
        WordPressError::Decode {
            type_name, body, ..
        } => {
            assert!(type_name.ends_with("Post"), "type name was {type_name}");
            assert_eq!(body, "<b>Notice</b>: not json");
        }
        other => panic!("expected decode error, got {other:?}"),
    }

    let err = client
        .http()
        .post_or_default::<Post>("wp/v2/posts", "{}".into(), true)
        .await
        .unwrap_err();
    assert!(matches!(err, WordPressError::Decode { .. }));
}

#[tokio::test]
async fn undecodable_get_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts/3"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client(&server).posts().get(3, false, false).await.unwrap_err();
    match err {
        WordPressError::Decode {
            type_name, body, ..
        } => {
            assert!(type_name.ends_with("Post"), "type name was {type_name}");
            assert_eq!(body, "<html>maintenance</html>");
        }
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[tokio::test]
async fn get_or_default_still_reports_decode_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client(&server)
        .http()
        .get_or_default::<Vec<Post>>("wp/v2/posts", false, false)
        .await
        .unwrap_err();
    match err {
        WordPressError::Decode {
            type_name, body, ..
        } => {
            assert!(type_name.contains("Vec"), "type name was {type_name}");
            assert!(type_name.contains("Post"), "type name was {type_name}");
            assert_eq!(body, "not json");
        }
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[tokio::test]
async fn transport_failure_propagates() {
    let client = WordPressClient::new("http://127.0.0.1:1/wp-json/").unwrap();
    let err = client.posts().get(1, false, false).await.unwrap_err();
    assert!(matches!(err, WordPressError::RequestFailed(_)));
}

// ---------------------------------------------------------------------------
// 5. Response preprocessing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn preprocessor_runs_once_before_decoding() {
    let server = MockServer::start().await;
    let body = format!("garbage{}", post_json(7, "Cleaned"));
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts/7"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let client = WordPressClient::builder(&format!("{}/wp-json/", server.uri()))
        .response_preprocessor(move |text| {
            counter.fetch_add(1, Ordering::SeqCst);
            text.trim_start_matches("garbage").to_string()
        })
        .build()
        .unwrap();

    let post = client.posts().get(7, false, false).await.unwrap();
    assert_eq!(post.title.rendered, "Cleaned");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn preprocessor_skipped_on_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts/7"))
        .respond_with(ResponseTemplate::new(404).set_body_string("{}"))
        .mount(&server)
        .await;

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let client = client(&server);
    client.http().set_response_preprocessor(move |text| {
        counter.fetch_add(1, Ordering::SeqCst);
        text
    });

    let post: Post = client
        .http()
        .get_or_default("wp/v2/posts/7", false, false)
        .await
        .unwrap();
    assert_eq!(post, Post::default());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

// ---------------------------------------------------------------------------
// 6. Concurrency
// ---------------------------------------------------------------------------

#[tokio::test]
async fn concurrent_requests_share_one_client() {
    let server = MockServer::start().await;
    for id in 1..=3u64 {
        Mock::given(method("GET"))
            .and(path(format!("/wp-json/wp/v2/posts/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(post_json(id, "Parallel")))
            .mount(&server)
            .await;
    }

    let client = Arc::new(client(&server));
    let handles: Vec<_> = (1..=3u64)
        .map(|id| {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.posts().get(id, false, false).await })
        })
        .collect();

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap().id);
    }
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn list_with_full_posts_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let query = PostsQuery {
        categories: vec![7],
        tags: vec![1, 2],
        ..Default::default()
    };
    client(&server)
        .posts()
        .list(&query, true, false)
        .await
        .unwrap();

    let received = server.received_requests().await.unwrap();
    assert_eq!(
        received[0].url.query(),
        Some("categories=7&tags=1%2C2&_embed")
    );
}
