//! Solution link handling
//!
//! - URL normalization and problem number parsing
//! - Pattern-based extraction from HTML and plain-text bodies

mod extract;
mod normalize;

pub use extract::{
    BodyLinks, FoundLink, LinkPattern, SkippedLink, extract_from_body, extract_from_email,
};
pub use normalize::{normalize_url, parse_solution_link, problem_id_from_url};
