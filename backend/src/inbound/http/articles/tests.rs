//! Handler coverage for article endpoints over in-memory services.

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::test::{self, TestRequest};
use rstest::rstest;
use serde_json::Value;

use crate::domain::{DisplayTimezone, Role};
use crate::inbound::http::state::HttpSettings;
use crate::inbound::http::test_utils::{json_body, sign_in};
use crate::test_support::http::{FormPart, SEED_PASSWORD, TestApp, multipart};

const PNG: &[u8] = b"\x89PNG\r\n\x1a\nbanner";

async fn send_form<S, B>(
    app: &S,
    request: TestRequest,
    cookie: Option<&Cookie<'static>>,
    parts: &[FormPart<'_>],
) -> ServiceResponse<B>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (content_type, body) = multipart(parts);
    let mut request = request
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body);
    if let Some(cookie) = cookie {
        request = request.cookie(cookie.clone());
    }
    test::call_service(app, request.to_request()).await
}

fn text<'a>(name: &'a str, value: &'a str) -> FormPart<'a> {
    FormPart::Text { name, value }
}

fn image<'a>(filename: &'a str, bytes: &'a [u8]) -> FormPart<'a> {
    FormPart::File {
        name: "image",
        filename,
        bytes,
    }
}

async fn publish<S, B>(app: &S, cookie: &Cookie<'static>, title: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = send_form(
        app,
        TestRequest::post().uri("/api/v1/articles"),
        Some(cookie),
        &[text("title", title), text("content", "Body text")],
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED, "publish {title}");
    json_body(res).await
}

async fn get_json<S, B>(app: &S, uri: &str, cookie: Option<&Cookie<'static>>) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let mut request = TestRequest::get().uri(uri);
    if let Some(cookie) = cookie {
        request = request.cookie(cookie.clone());
    }
    let res = test::call_service(app, request.to_request()).await;
    let status = res.status();
    (status, json_body(res).await)
}

fn titles(page: &Value) -> Vec<String> {
    page["data"]
        .as_array()
        .expect("data array")
        .iter()
        .filter_map(|article| article["title"].as_str().map(str::to_owned))
        .collect()
}

#[actix_web::test]
async fn writer_publishes_sanitised_article_with_banner() {
    let harness = TestApp::new();
    harness.seed_user("Ada", Role::Writer).await;
    let app = test::init_service(harness.app()).await;
    let cookie = sign_in(&app, "ada@example.com", SEED_PASSWORD).await;

    let res = send_form(
        &app,
        TestRequest::post().uri("/api/v1/articles"),
        Some(&cookie),
        &[
            text("title", "  Launch Day!  "),
            text("content", "**Big** news<script>alert(1)</script>"),
            image("My Cover.png", PNG),
        ],
    )
    .await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let location = res
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("location header");
    let body = json_body(res).await;
    assert_eq!(body["title"], "Launch Day!");
    assert_eq!(body["slug"], "launch-day");
    assert_eq!(body["format"], "markdown");
    assert_eq!(body["author"]["displayName"], "Ada");
    let html = body["html"].as_str().expect("html");
    assert!(html.contains("<strong>Big</strong>"));
    assert!(!html.contains("script"));
    assert_eq!(location, format!("/api/v1/articles/{}", body["id"].as_str().expect("id")));

    let image_url = body["imageUrl"].as_str().expect("image url");
    assert!(image_url.ends_with("_My_Cover.png"), "{image_url}");
    let served = test::call_service(&app, TestRequest::get().uri(image_url).to_request()).await;
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(test::read_body(served).await, PNG);
}

#[rstest]
#[case(None, StatusCode::UNAUTHORIZED)]
#[case(Some(Role::User), StatusCode::FORBIDDEN)]
#[actix_web::test]
async fn only_publishers_may_create(#[case] role: Option<Role>, #[case] expected: StatusCode) {
    let harness = TestApp::new();
    let app = test::init_service(harness.app()).await;
    let cookie = match role {
        Some(role) => {
            let user = harness.seed_user("Bob", role).await;
            Some(sign_in(&app, &user.email().to_string(), SEED_PASSWORD).await)
        }
        None => None,
    };

    let res = send_form(
        &app,
        TestRequest::post().uri("/api/v1/articles"),
        cookie.as_ref(),
        &[
            text("title", "Hello"),
            text("content", "Body"),
            image("cover.png", PNG),
        ],
    )
    .await;

    assert_eq!(res.status(), expected);
    assert!(harness.images.is_empty());
}

#[rstest]
#[case(&[], "title", "missing_field")]
#[case(&["title"], "content", "missing_field")]
#[case(&["title", "content", "image:notes.txt"], "image", "unsupported_extension")]
#[case(&["title", "content", "format:rtf"], "format", "unknown_format")]
#[actix_web::test]
async fn invalid_forms_name_the_offending_part(
    #[case] present: &[&str],
    #[case] field: &str,
    #[case] code: &str,
) {
    let harness = TestApp::new();
    harness.seed_user("Ada", Role::Writer).await;
    let app = test::init_service(harness.app()).await;
    let cookie = sign_in(&app, "ada@example.com", SEED_PASSWORD).await;

    let parts: Vec<FormPart<'_>> = present
        .iter()
        .map(|part| match part.split_once(':') {
            Some(("image", filename)) => image(filename, b"text"),
            Some((name, value)) => text(name, value),
            None => text(part, "Some value"),
        })
        .collect();
    let res = send_form(
        &app,
        TestRequest::post().uri("/api/v1/articles"),
        Some(&cookie),
        &parts,
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = json_body(res).await;
    assert_eq!(body["details"]["field"], field);
    assert_eq!(body["details"]["code"], code);
}

#[actix_web::test]
async fn oversized_banners_are_rejected_while_streaming() {
    let harness = TestApp::new();
    harness.seed_user("Ada", Role::Writer).await;
    let app = test::init_service(harness.app()).await;
    let cookie = sign_in(&app, "ada@example.com", SEED_PASSWORD).await;
    let oversized = vec![0_u8; 64 * 1024 + 1];

    let res = send_form(
        &app,
        TestRequest::post().uri("/api/v1/articles"),
        Some(&cookie),
        &[
            text("title", "Big"),
            text("content", "Body"),
            image("huge.jpg", &oversized),
        ],
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(res).await["details"]["code"], "file_too_large");
    assert!(harness.images.is_empty());
}

#[actix_web::test]
async fn titles_are_unique_per_author_and_slugs_per_author() {
    let harness = TestApp::new();
    let ada = harness.seed_user("Ada", Role::Writer).await;
    let bob = harness.seed_user("Bob", Role::Writer).await;
    let app = test::init_service(harness.app()).await;
    let ada_cookie = sign_in(&app, "ada@example.com", SEED_PASSWORD).await;
    let bob_cookie = sign_in(&app, "bob@example.com", SEED_PASSWORD).await;

    publish(&app, &ada_cookie, "Hello World").await;
    let clash = send_form(
        &app,
        TestRequest::post().uri("/api/v1/articles"),
        Some(&ada_cookie),
        &[text("title", "HELLO WORLD"), text("content", "Again")],
    )
    .await;
    assert_eq!(clash.status(), StatusCode::CONFLICT);

    harness.clock.advance_seconds(1);
    let punctuated = publish(&app, &ada_cookie, "Hello, World!").await;
    assert_eq!(punctuated["slug"], "hello-world-2");

    let other_author = publish(&app, &bob_cookie, "Hello World").await;
    assert_eq!(other_author["slug"], "hello-world");

    let (status, found) = get_json(
        &app,
        &format!("/api/v1/authors/{}/articles/hello-world", bob.id()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["author"]["id"], bob.id().to_string());

    let (_, listing) = get_json(&app, &format!("/api/v1/authors/{}/articles", ada.id()), None).await;
    assert_eq!(titles(&listing), ["Hello, World!", "Hello World"]);
}

#[actix_web::test]
async fn editing_keeps_slug_unless_title_changes() {
    let harness = TestApp::new();
    harness.seed_user("Ada", Role::Writer).await;
    let app = test::init_service(harness.app()).await;
    let cookie = sign_in(&app, "ada@example.com", SEED_PASSWORD).await;
    let created = publish(&app, &cookie, "First Draft").await;
    let uri = format!("/api/v1/articles/{}", created["id"].as_str().expect("id"));

    harness.clock.advance_seconds(30);
    let same_title = send_form(
        &app,
        TestRequest::put().uri(&uri),
        Some(&cookie),
        &[text("title", "First Draft"), text("content", "Edited")],
    )
    .await;
    assert_eq!(same_title.status(), StatusCode::OK);
    let same_title = json_body(same_title).await;
    assert_eq!(same_title["slug"], "first-draft");
    assert_eq!(same_title["content"], "Edited");
    assert_ne!(same_title["updatedAt"], same_title["createdAt"]);

    let renamed = send_form(
        &app,
        TestRequest::put().uri(&uri),
        Some(&cookie),
        &[text("title", "Final Cut"), text("content", "Edited")],
    )
    .await;
    assert_eq!(json_body(renamed).await["slug"], "final-cut");
}

#[actix_web::test]
async fn replacing_a_banner_removes_the_old_file() {
    let harness = TestApp::new();
    harness.seed_user("Ada", Role::Writer).await;
    let app = test::init_service(harness.app()).await;
    let cookie = sign_in(&app, "ada@example.com", SEED_PASSWORD).await;

    let created = send_form(
        &app,
        TestRequest::post().uri("/api/v1/articles"),
        Some(&cookie),
        &[
            text("title", "Pictures"),
            text("content", "Body"),
            image("first.png", PNG),
        ],
    )
    .await;
    let created = json_body(created).await;
    let uri = format!("/api/v1/articles/{}", created["id"].as_str().expect("id"));

    let kept = send_form(
        &app,
        TestRequest::put().uri(&uri),
        Some(&cookie),
        &[text("title", "Pictures"), text("content", "Body"), image("", b"")],
    )
    .await;
    assert_eq!(json_body(kept).await["imageUrl"], created["imageUrl"]);

    let replaced = send_form(
        &app,
        TestRequest::put().uri(&uri),
        Some(&cookie),
        &[
            text("title", "Pictures"),
            text("content", "Body"),
            image("second.gif", b"GIF89a"),
        ],
    )
    .await;
    let replaced = json_body(replaced).await;
    let new_url = replaced["imageUrl"].as_str().expect("image url");
    assert!(new_url.ends_with("_second.gif"));
    assert_eq!(harness.images.len(), 1);
    assert!(harness.images.contains(new_url.trim_start_matches("/uploads/")));
}

#[rstest]
#[case(Role::Writer, StatusCode::FORBIDDEN)]
#[case(Role::Admin, StatusCode::NO_CONTENT)]
#[actix_web::test]
async fn only_owner_or_admin_may_delete(#[case] role: Role, #[case] expected: StatusCode) {
    let harness = TestApp::new();
    harness.seed_user("Ada", Role::Writer).await;
    let other = harness.seed_user("Mallory", role).await;
    let app = test::init_service(harness.app()).await;
    let owner = sign_in(&app, "ada@example.com", SEED_PASSWORD).await;
    let intruder = sign_in(&app, &other.email().to_string(), SEED_PASSWORD).await;

    let created = send_form(
        &app,
        TestRequest::post().uri("/api/v1/articles"),
        Some(&owner),
        &[
            text("title", "Mine"),
            text("content", "Body"),
            image("cover.jpeg", PNG),
        ],
    )
    .await;
    let created = json_body(created).await;
    let uri = format!("/api/v1/articles/{}", created["id"].as_str().expect("id"));

    let res = test::call_service(
        &app,
        TestRequest::delete().uri(&uri).cookie(intruder).to_request(),
    )
    .await;
    assert_eq!(res.status(), expected);

    let (status, _) = get_json(&app, &uri, None).await;
    if expected == StatusCode::NO_CONTENT {
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(harness.images.is_empty());
    } else {
        assert_eq!(status, StatusCode::OK);
        assert_eq!(harness.images.len(), 1);
    }
}

#[actix_web::test]
async fn non_owner_writer_cannot_edit() {
    let harness = TestApp::new();
    harness.seed_user("Ada", Role::Writer).await;
    harness.seed_user("Bob", Role::Writer).await;
    let app = test::init_service(harness.app()).await;
    let owner = sign_in(&app, "ada@example.com", SEED_PASSWORD).await;
    let other = sign_in(&app, "bob@example.com", SEED_PASSWORD).await;
    let created = publish(&app, &owner, "Mine").await;

    let res = send_form(
        &app,
        TestRequest::put().uri(&format!(
            "/api/v1/articles/{}",
            created["id"].as_str().expect("id")
        )),
        Some(&other),
        &[text("title", "Theirs"), text("content", "Hijacked")],
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn listing_pages_newest_first_with_cursor_links() {
    let harness = TestApp::new();
    harness.seed_user("Ada", Role::Writer).await;
    let app = test::init_service(harness.app()).await;
    let cookie = sign_in(&app, "ada@example.com", SEED_PASSWORD).await;
    for title in ["One", "Two", "Three"] {
        publish(&app, &cookie, title).await;
        harness.clock.advance_seconds(60);
    }

    let (status, first) = get_json(&app, "/api/v1/articles?limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&first), ["Three", "Two"]);
    assert_eq!(first["limit"], 2);
    let next = first["links"]["next"].as_str().expect("next link");
    let next = url::Url::parse(next).expect("absolute next link");
    let next_uri = format!("{}?{}", next.path(), next.query().unwrap_or_default());

    let (_, second) = get_json(&app, &next_uri, None).await;
    assert_eq!(titles(&second), ["One"]);
    assert!(second["links"].get("next").is_none());
}

#[rstest]
#[case("/api/v1/articles?cursor=not-a-cursor", "invalid_cursor")]
#[case("/api/v1/articles/search", "missing_field")]
#[case("/api/v1/articles/search?q=%20%20", "empty_query")]
#[case("/api/v1/articles/not-a-uuid", "invalid_uuid")]
#[actix_web::test]
async fn malformed_listing_input_is_rejected(#[case] uri: &str, #[case] code: &str) {
    let harness = TestApp::new();
    let app = test::init_service(harness.app()).await;

    let (status, body) = get_json(&app, uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["code"], code);
}

#[actix_web::test]
async fn search_matches_title_or_body_literally() {
    let harness = TestApp::new();
    harness.seed_user("Ada", Role::Writer).await;
    let app = test::init_service(harness.app()).await;
    let cookie = sign_in(&app, "ada@example.com", SEED_PASSWORD).await;
    publish(&app, &cookie, "Rust in production").await;
    harness.clock.advance_seconds(1);
    send_form(
        &app,
        TestRequest::post().uri("/api/v1/articles"),
        Some(&cookie),
        &[text("title", "Discounts"), text("content", "Save 100% today")],
    )
    .await;

    let (_, by_title) = get_json(&app, "/api/v1/articles/search?q=RUST", None).await;
    assert_eq!(titles(&by_title), ["Rust in production"]);

    let (_, literal) = get_json(&app, "/api/v1/articles/search?q=100%25", None).await;
    assert_eq!(titles(&literal), ["Discounts"]);
}

#[actix_web::test]
async fn dashboard_scopes_articles_by_role() {
    let harness = TestApp::new();
    harness.seed_user("Root", Role::Admin).await;
    harness.seed_user("Ada", Role::Writer).await;
    harness.seed_user("Bob", Role::Writer).await;
    harness.seed_user("Reader", Role::User).await;
    let app = test::init_service(harness.app()).await;
    let admin = sign_in(&app, "root@example.com", SEED_PASSWORD).await;
    let ada = sign_in(&app, "ada@example.com", SEED_PASSWORD).await;
    let bob = sign_in(&app, "bob@example.com", SEED_PASSWORD).await;
    let reader = sign_in(&app, "reader@example.com", SEED_PASSWORD).await;
    publish(&app, &ada, "Ada's piece").await;
    harness.clock.advance_seconds(1);
    publish(&app, &bob, "Bob's piece").await;

    let (_, mine) = get_json(&app, "/api/v1/dashboard/articles", Some(&ada)).await;
    assert_eq!(titles(&mine), ["Ada's piece"]);

    let (_, everything) = get_json(&app, "/api/v1/dashboard/articles", Some(&admin)).await;
    assert_eq!(titles(&everything), ["Bob's piece", "Ada's piece"]);

    let (status, _) = get_json(&app, "/api/v1/dashboard/articles", Some(&reader)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn timestamps_are_localised_to_the_display_zone() {
    let timezone: DisplayTimezone = "Asia/Tokyo".parse().expect("zone");
    let harness = TestApp::with_settings(HttpSettings {
        timezone,
        max_upload_bytes: 64 * 1024,
    });
    harness.seed_user("Ada", Role::Writer).await;
    let app = test::init_service(harness.app()).await;
    let cookie = sign_in(&app, "ada@example.com", SEED_PASSWORD).await;

    let created = publish(&app, &cookie, "Tokyo edition").await;
    assert_eq!(created["createdAt"], "2026-03-14T09:00:00Z");
    assert_eq!(created["createdAtLocal"], "2026-03-14T18:00:00+09:00");
    assert_eq!(created["timezone"], "Asia/Tokyo");
}
