//! External collaborators used by the scouts
//!
//! # Module Structure
//!
//! - [`search`](crate::tools::search) - Web search (DuckDuckGo via daedra)
//! - [`fetch`](crate::tools::fetch) - Bounded-timeout HTTP GET
//! - [`extract`](crate::tools::extract) - Title + leading paragraph extraction
//!
//! Each capability sits behind a trait so scouts can be exercised with
//! in-memory doubles:
//! ```ignore
//! let hits = DuckDuckGoSearch::new().search("rust programming", 5).await?;
//! for hit in hits {
//!     println!("{}: {}", hit.title, hit.url);
//! }
//! ```

/// HTML summarisation.
pub mod extract;
/// HTTP page fetching.
pub mod fetch;
/// Web search using DuckDuckGo.
pub mod search;

pub use extract::{summarize_html, PageSummary};
pub use fetch::{FetchedPage, HttpFetcher, PageFetcher};
pub use search::{DuckDuckGoSearch, SearchHit, WebSearch};
