//! Role gates for mutations and privileged listings.

use super::{Article, ArticleFilter, Error, User};

/// Require a role that may publish.
pub fn require_publisher(actor: &User) -> Result<(), Error> {
    if actor.role().can_publish() {
        Ok(())
    } else {
        Err(Error::forbidden("writer or admin role required"))
    }
}

/// Require the administrator role.
pub fn require_admin(actor: &User) -> Result<(), Error> {
    if actor.role().is_admin() {
        Ok(())
    } else {
        Err(Error::forbidden("admin role required"))
    }
}

/// Whether `actor` may edit or delete `article`.
///
/// Admins moderate everything; writers only their own work. A writer demoted
/// to reader loses access to articles they wrote earlier.
pub fn can_modify(actor: &User, article: &Article) -> bool {
    let role = actor.role();
    role.is_admin() || (role.can_publish() && article.is_authored_by(actor.id()))
}

/// Require edit rights over `article`.
pub fn require_modify(actor: &User, article: &Article) -> Result<(), Error> {
    if can_modify(actor, article) {
        Ok(())
    } else {
        Err(Error::forbidden("only the author or an admin may change this article"))
    }
}

/// Selection shown on the dashboard for `actor`.
///
/// Admins see every article, writers see their own, readers are refused.
pub fn dashboard_filter(actor: &User) -> Result<ArticleFilter, Error> {
    require_publisher(actor)?;
    if actor.role().is_admin() {
        Ok(ArticleFilter::All)
    } else {
        Ok(ArticleFilter::ByAuthor(*actor.id()))
    }
}
