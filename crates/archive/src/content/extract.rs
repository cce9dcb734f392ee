//! Problem/solution extraction from the target site
//!
//! The selectors and the API shape are a contract with a site we don't
//! control, so both are configurable and every miss is a per-item error.

use anyhow::{Result, anyhow};
use log::warn;
use scraper::{ElementRef, Html, Node, Selector};
use serde::Deserialize;
use url::Url;

use super::fetch::PageFetcher;
use crate::error::FetchError;
use crate::models::{ProblemDocument, ProblemId};
use crate::settings::{ContentSource, Settings};

const API_HOST: &str = "www.dailycodingproblem.com";
const API_PATH: &str = "/api/solution";

/// JSON returned by the solution API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSolution {
    problem_id: Option<u32>,
    problem: String,
    solution: String,
}

/// Turns a stored link into a [`ProblemDocument`]
pub struct ContentExtractor {
    source: ContentSource,
    problem_selector: Selector,
    solution_selector: Selector,
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Invalid CSS selector {:?}: {}", css, e))
}

impl ContentExtractor {
    pub fn new(source: ContentSource, problem_css: &str, solution_css: &str) -> Result<Self> {
        Ok(Self {
            source,
            problem_selector: parse_selector(problem_css)?,
            solution_selector: parse_selector(solution_css)?,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            settings.content_source,
            &settings.problem_selector,
            &settings.solution_selector,
        )
    }

    /// URL to request for a stored link
    pub fn request_url(&self, link: &str) -> Result<String, FetchError> {
        match self.source {
            ContentSource::Page => Ok(link.to_string()),
            ContentSource::Api => api_url_from_link(link),
        }
    }

    /// Extract the document from a response body
    pub fn extract(
        &self,
        url: &str,
        problem_id: ProblemId,
        body: &str,
    ) -> Result<ProblemDocument, FetchError> {
        match self.source {
            ContentSource::Page => self.extract_page(url, problem_id, body),
            ContentSource::Api => extract_api(url, problem_id, body),
        }
    }

    /// Fetch and extract one link
    pub fn fetch(
        &self,
        fetcher: &dyn PageFetcher,
        link: &str,
        problem_id: ProblemId,
    ) -> Result<ProblemDocument, FetchError> {
        let url = self.request_url(link)?;
        let body = fetcher.get(&url)?;
        self.extract(&url, problem_id, &body)
    }

    fn extract_page(
        &self,
        url: &str,
        problem_id: ProblemId,
        html: &str,
    ) -> Result<ProblemDocument, FetchError> {
        let document = Html::parse_document(html);

        let problem = select_text(&document, &self.problem_selector).ok_or_else(|| {
            FetchError::MissingBlock {
                url: url.to_string(),
                block: "problem",
            }
        })?;
        let solution = select_text(&document, &self.solution_selector).ok_or_else(|| {
            FetchError::MissingBlock {
                url: url.to_string(),
                block: "solution",
            }
        })?;

        Ok(ProblemDocument {
            problem_id,
            problem,
            solution,
        })
    }
}

/// Rewrite a solution link into the JSON API URL, keeping its query string
pub fn api_url_from_link(link: &str) -> Result<String, FetchError> {
    let parsed = Url::parse(link).map_err(|_| FetchError::LinkWithoutToken(link.to_string()))?;
    if !parsed.query_pairs().any(|(k, _)| k == "token") {
        return Err(FetchError::LinkWithoutToken(link.to_string()));
    }

    let mut api = Url::parse(&format!("https://{}{}", API_HOST, API_PATH))
        .map_err(|_| FetchError::LinkWithoutToken(link.to_string()))?;
    api.set_query(parsed.query());
    Ok(api.to_string())
}

fn extract_api(url: &str, problem_id: ProblemId, body: &str) -> Result<ProblemDocument, FetchError> {
    let solution: ApiSolution =
        serde_json::from_str(body).map_err(|e| FetchError::InvalidJson {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    if solution.problem.trim().is_empty() {
        return Err(FetchError::MissingBlock {
            url: url.to_string(),
            block: "problem",
        });
    }
    if solution.solution.trim().is_empty() {
        return Err(FetchError::MissingBlock {
            url: url.to_string(),
            block: "solution",
        });
    }

    // Files are keyed by the number in the link; the API's own number is
    // only checked.
    if let Some(api_id) = solution.problem_id
        && api_id != problem_id.get()
    {
        warn!("{} answered for problem {}, link says {}", url, api_id, problem_id);
    }

    Ok(ProblemDocument {
        problem_id,
        problem: solution.problem,
        solution: solution.solution,
    })
}

/// Text of every element matching `selector`, blocks separated by a blank
/// line. `None` if nothing matched or the matches are empty.
fn select_text(document: &Html, selector: &Selector) -> Option<String> {
    let blocks: Vec<String> = document
        .select(selector)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect();

    if blocks.is_empty() {
        None
    } else {
        Some(blocks.join("\n\n"))
    }
}

/// Elements that start a new line of text
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "li", "pre", "tr", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote",
];

/// Append text the way a browser lays it out: whitespace runs collapse to
/// one space outside `<pre>`/`<code>`, and never start a line.
fn push_collapsed(out: &mut String, text: &str) {
    let at_break = out.is_empty() || out.ends_with(['\n', ' ']);
    let words: Vec<&str> = text.split_whitespace().collect();

    if words.is_empty() {
        if !at_break {
            out.push(' ');
        }
        return;
    }
    if text.starts_with(char::is_whitespace) && !at_break {
        out.push(' ');
    }
    out.push_str(&words.join(" "));
    if text.ends_with(char::is_whitespace) {
        out.push(' ');
    }
}

/// Visible text of an element, code blocks verbatim
fn element_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    for node in element.descendants() {
        let preformatted = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| matches!(e.name(), "pre" | "code"))
        });
        match node.value() {
            Node::Text(text) if preformatted => raw.push_str(text),
            Node::Text(text) => push_collapsed(&mut raw, text),
            Node::Element(e) if BLOCK_TAGS.contains(&e.name()) && !raw.is_empty() => {
                raw.push('\n')
            }
            _ => {}
        }
    }

    let mut lines: Vec<&str> = Vec::new();
    let mut blank_run = 0;
    for line in raw.lines().map(str::trim_end) {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 || lines.is_empty() {
                continue;
            }
        } else {
            blank_run = 0;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <div class="problem">
            <p>Given an array of integers, return a new array such that each element
            is the product of all the others.</p>
        </div>
        <div class="solution">
            <pre>def products(nums):
    return nums</pre>
        </div>
    </body></html>"#;

    fn page_extractor() -> ContentExtractor {
        ContentExtractor::new(ContentSource::Page, ".problem", ".solution").unwrap()
    }

    #[test]
    fn test_extract_page_blocks() {
        let doc = page_extractor()
            .extract("https://x/solution/2", ProblemId::new(2), PAGE)
            .unwrap();
        assert!(doc.problem.starts_with("Given an array of integers"));
        assert!(doc.solution.contains("def products(nums):"));
        assert!(doc.solution.contains("    return nums"));
        assert_eq!(doc.problem_id, ProblemId::new(2));
    }

    #[test]
    fn test_missing_solution_block() {
        let html = r#"<div class="problem">only the problem</div>"#;
        let err = page_extractor()
            .extract("https://x/solution/2", ProblemId::new(2), html)
            .unwrap_err();
        assert!(matches!(err, FetchError::MissingBlock { block: "solution", .. }));
    }

    #[test]
    fn test_invalid_selector_is_setup_error() {
        assert!(ContentExtractor::new(ContentSource::Page, "div[", ".solution").is_err());
    }

    #[test]
    fn test_api_url_keeps_query() {
        let url = api_url_from_link("https://www.dailycodingproblem.com/solution/761?token=abc123").unwrap();
        assert_eq!(url, "https://www.dailycodingproblem.com/api/solution?token=abc123");
    }

    #[test]
    fn test_api_url_requires_token() {
        let err = api_url_from_link("https://www.dailycodingproblem.com/solution/761").unwrap_err();
        assert!(matches!(err, FetchError::LinkWithoutToken(_)));
    }

    #[test]
    fn test_extract_api_json() {
        let extractor = ContentExtractor::new(ContentSource::Api, ".problem", ".solution").unwrap();
        let body = r#"{"problemId": 761, "problem": "Find the median.", "solution": "Use two heaps."}"#;
        let doc = extractor
            .extract("https://www.dailycodingproblem.com/api/solution?token=t", ProblemId::new(761), body)
            .unwrap();
        assert_eq!(doc.problem_id, ProblemId::new(761));
        assert_eq!(
            doc.to_markdown(),
            "## Problem #761\nFind the median.\n## Solution\nUse two heaps.\n"
        );
    }

    #[test]
    fn test_extract_api_keeps_link_problem_number() {
        let extractor = ContentExtractor::new(ContentSource::Api, ".problem", ".solution").unwrap();
        let body = r#"{"problemId": 700, "problem": "p", "solution": "s"}"#;
        let doc = extractor
            .extract("https://www.dailycodingproblem.com/api/solution?token=t", ProblemId::new(7), body)
            .unwrap();
        assert_eq!(doc.problem_id, ProblemId::new(7));
        assert!(doc.to_markdown().starts_with("## Problem #7\n"));
    }

    #[test]
    fn test_extract_api_rejects_html() {
        let extractor = ContentExtractor::new(ContentSource::Api, ".problem", ".solution").unwrap();
        let err = extractor
            .extract("https://x", ProblemId::new(1), "<html>login</html>")
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidJson { .. }));
    }

    #[test]
    fn test_paragraphs_and_code_layout() {
        let html = r#"<div class="problem">
            <p>First   paragraph
               wraps.</p>
            <p>Second.</p>
            <pre>if x:
    y()</pre>
        </div>"#;
        let document = Html::parse_document(html);
        let selector = Selector::parse(".problem").unwrap();
        assert_eq!(
            select_text(&document, &selector).unwrap(),
            "First paragraph wraps.\nSecond.\nif x:\n    y()"
        );
    }
}
