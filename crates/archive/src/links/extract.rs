//! Finding solution links in email bodies

use std::collections::HashSet;

use scraper::{Html, Selector};

use super::normalize::parse_solution_link;
use crate::error::LinkError;
use crate::models::{EmailRecord, ProblemId};

/// Characters that end a URL-shaped run of text
fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '"' | '\'' | '<' | '>' | '`')
}

/// Case-insensitive substring pattern identifying the target site's links
#[derive(Debug, Clone)]
pub struct LinkPattern {
    needle: String,
}

impl LinkPattern {
    pub fn new(pattern: impl AsRef<str>) -> Self {
        Self {
            needle: pattern.as_ref().trim().to_ascii_lowercase(),
        }
    }

    pub fn matches(&self, candidate: &str) -> bool {
        !self.needle.is_empty() && candidate.to_ascii_lowercase().contains(&self.needle)
    }

    /// URL-shaped substrings of free text that contain the pattern
    pub fn scan_text<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.split(is_delimiter)
            .map(|token| {
                token
                    .trim_start_matches(['(', '['])
                    .trim_end_matches(['.', ',', ';', ':', '!', '?', ')', ']'])
            })
            .filter(|token| !token.is_empty() && self.matches(token))
            .collect()
    }
}

impl Default for LinkPattern {
    fn default() -> Self {
        Self::new(crate::settings::DEFAULT_LINK_PATTERN)
    }
}

/// A link found in a body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundLink {
    pub url: String,
    pub problem_id: ProblemId,
}

/// A candidate that matched the pattern but is not a usable link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLink {
    pub candidate: String,
    pub reason: LinkError,
}

/// Links extracted from one email body, in order of appearance
#[derive(Debug, Default, Clone)]
pub struct BodyLinks {
    pub links: Vec<FoundLink>,
    pub skipped: Vec<SkippedLink>,
}

impl BodyLinks {
    pub fn is_empty(&self) -> bool {
        self.links.is_empty() && self.skipped.is_empty()
    }
}

/// Collect raw candidates from an HTML body: anchor targets first, then
/// URLs written out in the visible text.
fn html_candidates(html: &str, pattern: &LinkPattern) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut candidates = Vec::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href")
                && pattern.matches(href)
            {
                candidates.push(href.trim().to_string());
            }
        }
    }

    let text = document.root_element().text().collect::<Vec<_>>().join(" ");
    candidates.extend(pattern.scan_text(&text).into_iter().map(str::to_string));
    candidates
}

/// Extract solution links from a body.
///
/// Duplicates inside the body collapse to one entry; each distinct malformed
/// candidate is reported once.
pub fn extract_from_body(body: &str, is_html: bool, pattern: &LinkPattern) -> BodyLinks {
    let candidates: Vec<String> = if is_html {
        html_candidates(body, pattern)
    } else {
        pattern.scan_text(body).into_iter().map(str::to_string).collect()
    };

    let mut result = BodyLinks::default();
    let mut seen_urls = HashSet::new();
    let mut seen_bad = HashSet::new();

    for candidate in candidates {
        match parse_solution_link(&candidate) {
            Ok((url, problem_id)) => {
                if seen_urls.insert(url.clone()) {
                    result.links.push(FoundLink { url, problem_id });
                }
            }
            Err(reason) => {
                if seen_bad.insert(candidate.clone()) {
                    result.skipped.push(SkippedLink { candidate, reason });
                }
            }
        }
    }

    result
}

/// Extract solution links from a stored email
pub fn extract_from_email(email: &EmailRecord, pattern: &LinkPattern) -> BodyLinks {
    extract_from_body(&email.raw_body, email.is_html(), pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATTERN: &str = "dailycodingproblem.com/solution";

    #[test]
    fn test_scan_text_trims_punctuation() {
        let pattern = LinkPattern::new(PATTERN);
        let found = pattern.scan_text(
            "Solution (https://www.dailycodingproblem.com/solution/4?token=t). Enjoy",
        );
        assert_eq!(found, vec!["https://www.dailycodingproblem.com/solution/4?token=t"]);
    }

    #[test]
    fn test_text_body_two_valid_one_malformed() {
        let pattern = LinkPattern::new(PATTERN);
        let body = "Yesterday: https://www.dailycodingproblem.com/solution/1?token=a\n\
                    Also: https://www.dailycodingproblem.com/solution/2?token=b\n\
                    Broken: dailycodingproblem.com/solution/oops";

        let links = extract_from_body(body, false, &pattern);
        assert_eq!(links.links.len(), 2);
        assert_eq!(links.skipped.len(), 1);
        assert_eq!(links.links[0].problem_id, ProblemId::new(1));
        assert_eq!(links.links[1].problem_id, ProblemId::new(2));
    }

    #[test]
    fn test_html_body_uses_anchor_targets() {
        let pattern = LinkPattern::new(PATTERN);
        let body = r#"<html><body>
            <p>Here is the solution to yesterday's problem.</p>
            <a href="https://www.dailycodingproblem.com/solution/761?token=abc&amp;utm_source=mail">Solution</a>
            <a href="https://www.dailycodingproblem.com/blog">Blog</a>
        </body></html>"#;

        let links = extract_from_body(body, true, &pattern);
        assert_eq!(links.links.len(), 1);
        assert_eq!(
            links.links[0].url,
            "https://www.dailycodingproblem.com/solution/761?token=abc"
        );
        assert!(links.skipped.is_empty());
    }

    #[test]
    fn test_html_duplicate_link_collapses() {
        let pattern = LinkPattern::new(PATTERN);
        let body = r#"<a href="https://www.dailycodingproblem.com/solution/5?token=t">x</a>
            <p>https://www.dailycodingproblem.com/solution/5?token=t</p>"#;

        let links = extract_from_body(body, true, &pattern);
        assert_eq!(links.links.len(), 1);
    }

    #[test]
    fn test_body_without_links() {
        let pattern = LinkPattern::new(PATTERN);
        let links = extract_from_body("Good morning! Here's your problem.", false, &pattern);
        assert!(links.is_empty());
    }

    #[test]
    fn test_pattern_is_case_insensitive() {
        let pattern = LinkPattern::new("DailyCodingProblem.com/Solution");
        assert!(pattern.matches("https://www.dailycodingproblem.com/solution/1"));
        assert!(!LinkPattern::new("").matches("anything"));
    }
}
