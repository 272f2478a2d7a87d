//! Multipart parsing for article create and update forms.
//!
//! Expected parts: `title`, `content`, optional `format` (`markdown` when
//! absent) and an optional `image` file. An image part with no filename is
//! how browsers submit an untouched file input, so it counts as "no image".

use actix_multipart::{Field, Multipart};
use futures_util::TryStreamExt;

use crate::domain::ports::ArticleSubmission;
use crate::domain::{ArticleDraft, ContentFormat, Error, ImageUpload, ImageValidationError};

use super::validation::{FieldName, article_error, field_error, image_error, missing_field_error};

/// Cap on any single text part.
const TEXT_PART_MAX: usize = 1024 * 1024;

#[derive(Default)]
struct RawForm {
    title: Option<String>,
    content: Option<String>,
    format: Option<String>,
    image: Option<ImageUpload>,
}

fn malformed(err: impl std::fmt::Display) -> Error {
    Error::invalid_request(format!("malformed multipart body: {err}"))
}

async fn read_limited(
    field: &mut Field,
    limit: usize,
    too_large: impl FnOnce() -> Error,
) -> Result<Vec<u8>, Error> {
    let mut buffer = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(malformed)? {
        if buffer.len() + chunk.len() > limit {
            return Err(too_large());
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer)
}

async fn read_text(field: &mut Field, name: &'static str) -> Result<String, Error> {
    let field_name = FieldName::new(name);
    let bytes = read_limited(field, TEXT_PART_MAX, || {
        field_error(field_name, "field_too_large", format!("{name} is too large"))
    })
    .await?;
    String::from_utf8(bytes)
        .map_err(|_| field_error(field_name, "invalid_utf8", format!("{name} must be UTF-8 text")))
}

async fn read_image(field: &mut Field, max_bytes: usize) -> Result<Option<ImageUpload>, Error> {
    let file_name = field
        .content_disposition()
        .and_then(|disposition| disposition.get_filename())
        .map(str::to_owned)
        .unwrap_or_default();
    let bytes = read_limited(field, max_bytes, || {
        image_error(ImageValidationError::TooLarge { limit: max_bytes })
    })
    .await?;
    if file_name.is_empty() && bytes.is_empty() {
        return Ok(None);
    }
    ImageUpload::new(&file_name, bytes, max_bytes)
        .map(Some)
        .map_err(image_error)
}

async fn collect(mut payload: Multipart, max_image_bytes: usize) -> Result<RawForm, Error> {
    let mut form = RawForm::default();
    while let Some(mut field) = payload.try_next().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "title" => form.title = Some(read_text(&mut field, "title").await?),
            "content" => form.content = Some(read_text(&mut field, "content").await?),
            "format" => form.format = Some(read_text(&mut field, "format").await?),
            "image" => form.image = read_image(&mut field, max_image_bytes).await?,
            // Unknown parts are drained and ignored.
            _ => while field.try_next().await.map_err(malformed)?.is_some() {},
        }
    }
    Ok(form)
}

fn into_submission(form: RawForm) -> Result<ArticleSubmission, Error> {
    let title = form
        .title
        .ok_or_else(|| missing_field_error(FieldName::new("title")))?;
    let content = form
        .content
        .ok_or_else(|| missing_field_error(FieldName::new("content")))?;
    let format = match form.format.as_deref().map(str::trim) {
        None | Some("") => ContentFormat::default(),
        Some(raw) => raw
            .parse::<ContentFormat>()
            .map_err(|err| article_error(err.into()))?,
    };
    let draft = ArticleDraft::try_from_parts(&title, &content, format).map_err(article_error)?;
    Ok(ArticleSubmission {
        draft,
        image: form.image,
    })
}

/// Read and validate a multipart article form.
pub(crate) async fn read_article_form(
    payload: Multipart,
    max_image_bytes: usize,
) -> Result<ArticleSubmission, Error> {
    let form = collect(payload, max_image_bytes).await?;
    into_submission(form)
}
