//! Solution page fetching and problem/solution extraction

mod extract;
mod fetch;

pub use extract::{ContentExtractor, api_url_from_link};
pub use fetch::{HttpFetcher, PageFetcher};
