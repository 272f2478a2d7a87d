//! Article domain service.
//!
//! Implements publishing, editing, deletion, listings and banner image reads.
//! Slugs are allocated per author; banner files are written before the row
//! that references them and removed best-effort once no row does.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    ArticleCommand, ArticlePersistenceError, ArticleQuery, ArticleRepository, ArticleSubmission,
    ImageStore, ImageStoreError, MediaQuery, StoredImage,
};
use crate::domain::{
    Article, ArticleChanges, ArticleFilter, ArticleId, ArticlePage, Error, ImageName, ImageUpload,
    NewArticle, PageRequest, SearchTerm, Slug, Title, User, UserId, allocate_slug,
    dashboard_filter, require_modify, require_publisher, slugify,
};

fn map_article_error(error: ArticlePersistenceError) -> Error {
    match error {
        ArticlePersistenceError::Connection { message } => {
            Error::service_unavailable(format!("article repository unavailable: {message}"))
        }
        ArticlePersistenceError::Query { message } => {
            Error::internal(format!("article repository error: {message}"))
        }
        ArticlePersistenceError::DuplicateSlug { slug } => {
            Error::conflict(format!("slug {slug} is already in use"))
        }
        ArticlePersistenceError::DuplicateTitle => duplicate_title(),
    }
}

/// Inserts or renames that lose a slug race reallocate at most this often.
const SLUG_ATTEMPTS: u32 = 3;

fn map_image_error(error: ImageStoreError) -> Error {
    Error::internal(error.to_string())
}

fn duplicate_title() -> Error {
    Error::conflict("you already have an article with this title")
}

fn article_not_found(id: &ArticleId) -> Error {
    Error::not_found(format!("article {id} not found"))
}

/// Article service implementing the article driving ports.
#[derive(Clone)]
pub struct ArticleService<A, I> {
    articles: Arc<A>,
    images: Arc<I>,
    clock: Arc<dyn Clock>,
}

impl<A, I> ArticleService<A, I> {
    /// Create a new service with the given repository, image store and clock.
    pub fn new(articles: Arc<A>, images: Arc<I>, clock: Arc<dyn Clock>) -> Self {
        Self {
            articles,
            images,
            clock,
        }
    }
}

impl<A, I> ArticleService<A, I>
where
    A: ArticleRepository,
    I: ImageStore,
{
    async fn load(&self, id: &ArticleId) -> Result<Article, Error> {
        self.articles
            .find_by_id(id)
            .await
            .map_err(map_article_error)?
            .ok_or_else(|| article_not_found(id))
    }

    async fn ensure_title_free(
        &self,
        author: &UserId,
        title: &Title,
        excluding: Option<ArticleId>,
    ) -> Result<(), Error> {
        let taken = self
            .articles
            .title_taken(author, title, excluding)
            .await
            .map_err(map_article_error)?;
        if taken { Err(duplicate_title()) } else { Ok(()) }
    }

    /// Pick a slug for `title` that none of `author`'s other articles use.
    async fn allocate(
        &self,
        author: &UserId,
        title: &Title,
        current: Option<&Slug>,
    ) -> Result<Slug, Error> {
        let base = slugify(title.as_ref());
        let mut taken = self
            .articles
            .slugs_with_prefix(author, &base)
            .await
            .map_err(map_article_error)?;
        if let Some(current) = current {
            taken.remove(&current.to_string());
        }
        Ok(allocate_slug(&base, &taken))
    }

    /// Insert `record`, reallocating its slug when a concurrent write took it.
    async fn insert_allocating(&self, record: &mut NewArticle) -> Result<Article, Error> {
        let mut attempt = 1;
        loop {
            match self.articles.insert(record).await {
                Err(ArticlePersistenceError::DuplicateSlug { slug }) if attempt < SLUG_ATTEMPTS => {
                    attempt += 1;
                    debug!(%slug, attempt, "slug taken concurrently; reallocating");
                    record.slug = self.allocate(&record.author, &record.title, None).await?;
                }
                result => return result.map_err(map_article_error),
            }
        }
    }

    /// Apply `changes`, reallocating the slug on a lost race when the title
    /// changed. `previous` is the slug being replaced, if any.
    async fn update_allocating(
        &self,
        author: &UserId,
        changes: &mut ArticleChanges,
        previous: Option<&Slug>,
    ) -> Result<Option<Article>, Error> {
        let mut attempt = 1;
        loop {
            match self.articles.update(changes).await {
                Err(ArticlePersistenceError::DuplicateSlug { slug })
                    if previous.is_some() && attempt < SLUG_ATTEMPTS =>
                {
                    attempt += 1;
                    debug!(%slug, attempt, "slug taken concurrently; reallocating");
                    changes.slug = self.allocate(author, &changes.title, previous).await?;
                }
                result => return result.map_err(map_article_error),
            }
        }
    }

    async fn store_image(&self, upload: Option<&ImageUpload>) -> Result<Option<ImageName>, Error> {
        let Some(upload) = upload else {
            return Ok(None);
        };
        let name = ImageName::for_upload(upload);
        self.images
            .save(&name, upload.bytes())
            .await
            .map_err(map_image_error)?;
        Ok(Some(name))
    }

    async fn discard_image(&self, name: Option<&ImageName>) {
        let Some(name) = name else {
            return;
        };
        if let Err(error) = self.images.remove(name).await {
            warn!(image = %name, %error, "failed to remove banner image");
        }
    }

    async fn list_page(
        &self,
        filter: ArticleFilter,
        page: PageRequest,
    ) -> Result<ArticlePage, Error> {
        let rows = self
            .articles
            .list(&page.overfetch(filter))
            .await
            .map_err(map_article_error)?;
        Ok(ArticlePage::from_overfetch(rows, page.limit))
    }
}

#[async_trait]
impl<A, I> ArticleCommand for ArticleService<A, I>
where
    A: ArticleRepository,
    I: ImageStore,
{
    async fn create(&self, actor: &User, submission: ArticleSubmission) -> Result<Article, Error> {
        require_publisher(actor)?;
        let ArticleSubmission { draft, image } = submission;
        let author = *actor.id();

        self.ensure_title_free(&author, &draft.title, None).await?;
        let slug = self.allocate(&author, &draft.title, None).await?;
        let image = self.store_image(image.as_ref()).await?;

        let mut record = NewArticle {
            id: ArticleId::random(),
            author,
            title: draft.title,
            slug,
            content: draft.content,
            image,
            created_at: self.clock.utc(),
        };
        match self.insert_allocating(&mut record).await {
            Ok(article) => {
                info!(
                    article_id = %article.id,
                    author = %author,
                    slug = %article.slug,
                    "article created"
                );
                Ok(article)
            }
            Err(error) => {
                self.discard_image(record.image.as_ref()).await;
                Err(error)
            }
        }
    }

    async fn update(
        &self,
        actor: &User,
        id: &ArticleId,
        submission: ArticleSubmission,
    ) -> Result<Article, Error> {
        let existing = self.load(id).await?;
        require_modify(actor, &existing)?;
        let ArticleSubmission { draft, image } = submission;
        let author = existing.byline.id;

        self.ensure_title_free(&author, &draft.title, Some(*id)).await?;
        let renamed = draft.title != existing.title;
        let slug = if renamed {
            self.allocate(&author, &draft.title, Some(&existing.slug)).await?
        } else {
            existing.slug.clone()
        };
        let uploaded = self.store_image(image.as_ref()).await?;
        let replaced = uploaded.is_some();

        let mut changes = ArticleChanges {
            id: *id,
            title: draft.title,
            slug,
            content: draft.content,
            image: uploaded.clone().or_else(|| existing.image.clone()),
            updated_at: self.clock.utc(),
        };
        let previous = renamed.then_some(&existing.slug);
        let updated = match self.update_allocating(&author, &mut changes, previous).await {
            Ok(Some(article)) => article,
            Ok(None) => {
                self.discard_image(uploaded.as_ref()).await;
                return Err(article_not_found(id));
            }
            Err(error) => {
                self.discard_image(uploaded.as_ref()).await;
                return Err(error);
            }
        };

        if replaced {
            self.discard_image(existing.image.as_ref()).await;
        }
        info!(article_id = %id, actor = %actor.id(), "article updated");
        Ok(updated)
    }

    async fn delete(&self, actor: &User, id: &ArticleId) -> Result<(), Error> {
        let existing = self.load(id).await?;
        require_modify(actor, &existing)?;

        let removed = self.articles.delete(id).await.map_err(map_article_error)?;
        if !removed {
            return Err(article_not_found(id));
        }
        self.discard_image(existing.image.as_ref()).await;
        info!(article_id = %id, actor = %actor.id(), "article deleted");
        Ok(())
    }
}

#[async_trait]
impl<A, I> ArticleQuery for ArticleService<A, I>
where
    A: ArticleRepository,
    I: ImageStore,
{
    async fn get(&self, id: &ArticleId) -> Result<Article, Error> {
        self.load(id).await
    }

    async fn get_by_slug(&self, author: &UserId, slug: &Slug) -> Result<Article, Error> {
        self.articles
            .find_by_slug(author, slug)
            .await
            .map_err(map_article_error)?
            .ok_or_else(|| Error::not_found(format!("article {slug} not found")))
    }

    async fn list(&self, page: PageRequest) -> Result<ArticlePage, Error> {
        self.list_page(ArticleFilter::All, page).await
    }

    async fn list_by_author(
        &self,
        author: &UserId,
        page: PageRequest,
    ) -> Result<ArticlePage, Error> {
        self.list_page(ArticleFilter::ByAuthor(*author), page).await
    }

    async fn search(&self, term: &SearchTerm, page: PageRequest) -> Result<ArticlePage, Error> {
        self.list_page(ArticleFilter::Search(term.clone()), page).await
    }

    async fn dashboard(&self, actor: &User, page: PageRequest) -> Result<ArticlePage, Error> {
        let filter = dashboard_filter(actor)?;
        self.list_page(filter, page).await
    }
}

#[async_trait]
impl<A, I> MediaQuery for ArticleService<A, I>
where
    A: ArticleRepository,
    I: ImageStore,
{
    async fn load_image(&self, name: &ImageName) -> Result<StoredImage, Error> {
        let bytes = self
            .images
            .load(name)
            .await
            .map_err(map_image_error)?
            .ok_or_else(|| Error::not_found(format!("image {name} not found")))?;
        Ok(StoredImage {
            bytes,
            content_type: name.content_type(),
        })
    }
}

#[cfg(test)]
#[path = "article_service_tests.rs"]
mod tests;
