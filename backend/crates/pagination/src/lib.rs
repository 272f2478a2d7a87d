//! Keyset pagination primitives shared by listing endpoints.
//!
//! Listings page through results ordered by a stable key. The position after
//! the last item of a page is handed to clients as an opaque [`Cursor`] token,
//! and responses are wrapped in a [`Paginated`] envelope carrying navigation
//! links.
//!
//! ```
//! use pagination::{Cursor, PageParams, Paginated, PaginationLinks};
//! use serde::{Deserialize, Serialize};
//! use url::Url;
//!
//! #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
//! struct Position {
//!     id: u32,
//! }
//!
//! let token = Cursor::new(Position { id: 7 }).encode().expect("encodes");
//! let decoded = Cursor::<Position>::decode(&token).expect("decodes");
//! assert_eq!(decoded.key(), &Position { id: 7 });
//!
//! let params = PageParams::new(None, Some(500));
//! assert_eq!(params.limit(), pagination::MAX_LIMIT);
//!
//! let url = Url::parse("https://news.example/api/v1/articles").expect("url");
//! let links = PaginationLinks::from_request(&url, params.limit(), Some(&token));
//! let page = Paginated::new(vec![1, 2, 3], params.limit(), links);
//! assert!(page.links.next.is_some());
//! ```

mod cursor;
mod envelope;
mod params;

pub use cursor::{Cursor, CursorError};
pub use envelope::{Paginated, PaginationLinks};
pub use params::{DEFAULT_LIMIT, MAX_LIMIT, PageParams};
