//! Banner image delivery.
//!
//! ```text
//! GET /uploads/3fa85f64-5717-4562-b3fc-2c963f66afa6_cover.png
//! ```

use actix_web::http::header;
use actix_web::{HttpResponse, get, web};

use crate::domain::{ApiResult, Error, ImageName};

use super::schemas::ErrorSchema;
use super::state::HttpState;

/// Serve a stored banner image.
///
/// Names that do not match the stored-name shape are reported as missing so
/// probing for other files yields nothing.
#[utoipa::path(
    get,
    path = "/uploads/{name}",
    params(("name" = String, Path, description = "Stored image name")),
    responses(
        (status = 200, description = "Image bytes", content_type = "image/*"),
        (status = 404, description = "No such image", body = ErrorSchema)
    ),
    tags = ["media"],
    operation_id = "serveUpload",
    security([])
)]
#[get("/uploads/{name}")]
pub async fn serve_upload(
    state: web::Data<HttpState>,
    name: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let raw = name.into_inner();
    let name = ImageName::new(raw.as_str())
        .map_err(|_| Error::not_found(format!("image {raw} not found")))?;
    let image = state.media.load_image(&name).await?;
    Ok(HttpResponse::Ok()
        .content_type(image.content_type)
        .insert_header((header::CACHE_CONTROL, "public, max-age=86400"))
        .insert_header((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .body(image.bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::ImageStore;
    use crate::test_support::http::TestApp;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;

    #[rstest]
    #[actix_web::test]
    async fn stored_images_are_served_with_their_content_type() {
        let harness = TestApp::new();
        let name = ImageName::new("3fa85f64-5717-4562-b3fc-2c963f66afa6_cover.gif").expect("name");
        harness.images.save(&name, b"GIF89a").await.expect("save");
        let app = test::init_service(harness.app()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/uploads/3fa85f64-5717-4562-b3fc-2c963f66afa6_cover.gif")
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            Some("image/gif")
        );
        assert_eq!(
            res.headers()
                .get(header::X_CONTENT_TYPE_OPTIONS)
                .and_then(|v| v.to_str().ok()),
            Some("nosniff")
        );
        assert_eq!(test::read_body(res).await, "GIF89a");
    }

    #[rstest]
    #[case("/uploads/missing_cover.png")]
    #[case("/uploads/..%2Fsecrets.png")]
    #[case("/uploads/notes.txt")]
    #[actix_web::test]
    async fn unknown_or_unsafe_names_are_not_found(#[case] uri: &str) {
        let harness = TestApp::new();
        let app = test::init_service(harness.app()).await;

        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
