//! Canonical form of solution links
//!
//! Two links that point at the same solution page must normalize to the same
//! string, and normalizing an already normalized link is a no-op.

use url::Url;

use crate::error::LinkError;
use crate::models::ProblemId;

/// Query parameters added by mailers and ad trackers
const TRACKING_PARAMS: &[&str] = &["mc_cid", "mc_eid", "fbclid", "gclid", "ref", "_hsenc", "_hsmi"];

fn is_tracking_param(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name.starts_with("utm_") || TRACKING_PARAMS.contains(&name.as_str())
}

/// Normalize a URL: https scheme, lowercase host, no default port, no
/// fragment, no tracking parameters, no trailing slash.
pub fn normalize_url(raw: &str) -> Result<String, LinkError> {
    let raw = raw.trim();
    let mut url = Url::parse(raw).map_err(|_| LinkError::NotAbsolute(raw.to_string()))?;

    match url.scheme() {
        "https" => {}
        "http" => {
            url.set_scheme("https")
                .map_err(|_| LinkError::Scheme(raw.to_string()))?;
        }
        _ => return Err(LinkError::Scheme(raw.to_string())),
    }
    if url.host_str().is_none() {
        return Err(LinkError::NotAbsolute(raw.to_string()));
    }

    url.set_fragment(None);

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let kept: Vec<&(String, String)> = pairs.iter().filter(|(k, _)| !is_tracking_param(k)).collect();

    if kept.is_empty() {
        url.set_query(None);
    } else if kept.len() != pairs.len() {
        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    } else if url.query() == Some("") {
        url.set_query(None);
    }

    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/').to_string();
        let trimmed = if trimmed.is_empty() { "/".to_string() } else { trimmed };
        url.set_path(&trimmed);
    }

    Ok(url.to_string())
}

/// Problem number from a solution link path (`/solution/<n>`).
///
/// Falls back to a numeric last path segment for links that use another
/// route prefix.
pub fn problem_id_from_url(raw: &str) -> Option<ProblemId> {
    let url = Url::parse(raw.trim()).ok()?;
    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();

    let after_solution = segments
        .iter()
        .position(|s| s.eq_ignore_ascii_case("solution"))
        .and_then(|i| segments.get(i + 1));

    after_solution
        .or_else(|| segments.last())
        .and_then(|s| s.parse::<u32>().ok())
        .map(ProblemId::new)
}

/// Normalize a link and require a problem number in it
pub fn parse_solution_link(raw: &str) -> Result<(String, ProblemId), LinkError> {
    let url = normalize_url(raw)?;
    let id = problem_id_from_url(&url).ok_or_else(|| LinkError::NoProblemId(raw.trim().to_string()))?;
    Ok((url, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_tracking_params_and_fragment() {
        let url = normalize_url(
            "https://www.dailycodingproblem.com/solution/761?token=abc&utm_source=email&utm_medium=x#top",
        )
        .unwrap();
        assert_eq!(url, "https://www.dailycodingproblem.com/solution/761?token=abc");
    }

    #[test]
    fn test_lowercases_scheme_and_host() {
        let url = normalize_url("HTTP://WWW.DailyCodingProblem.COM/solution/12?token=AbC").unwrap();
        assert_eq!(url, "https://www.dailycodingproblem.com/solution/12?token=AbC");
    }

    #[test]
    fn test_drops_trailing_slash_and_empty_query() {
        let url = normalize_url("https://www.dailycodingproblem.com/solution/3/?").unwrap();
        assert_eq!(url, "https://www.dailycodingproblem.com/solution/3");
    }

    #[test]
    fn test_drops_default_port() {
        let url = normalize_url("http://www.dailycodingproblem.com:80/solution/3").unwrap();
        assert_eq!(url, "https://www.dailycodingproblem.com/solution/3");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let inputs = [
            "https://www.dailycodingproblem.com/solution/761?token=a%2Bb&utm_campaign=c",
            "HTTP://www.DAILYCODINGPROBLEM.com/solution/1/?token=x y",
            "https://www.dailycodingproblem.com/solution/9?fbclid=1",
            "https://www.dailycodingproblem.com/solution/10?b=2&a=1",
        ];
        for input in inputs {
            let once = normalize_url(input).unwrap();
            let twice = normalize_url(&once).unwrap();
            assert_eq!(once, twice, "input: {}", input);
        }
    }

    #[test]
    fn test_rejects_relative_and_other_schemes() {
        assert!(matches!(
            normalize_url("dailycodingproblem.com/solution/5"),
            Err(LinkError::NotAbsolute(_))
        ));
        assert!(matches!(
            normalize_url("mailto:someone@dailycodingproblem.com"),
            Err(LinkError::Scheme(_))
        ));
    }

    #[test]
    fn test_problem_id_from_url() {
        assert_eq!(
            problem_id_from_url("https://www.dailycodingproblem.com/solution/761?token=abc"),
            Some(ProblemId::new(761))
        );
        assert_eq!(
            problem_id_from_url("https://www.dailycodingproblem.com/problem/15"),
            Some(ProblemId::new(15))
        );
        assert_eq!(problem_id_from_url("https://www.dailycodingproblem.com/solution/abc"), None);
    }

    #[test]
    fn test_parse_solution_link_requires_problem_id() {
        let err = parse_solution_link("https://www.dailycodingproblem.com/solution/?token=t").unwrap_err();
        assert!(matches!(err, LinkError::NoProblemId(_)));

        let (url, id) = parse_solution_link("https://www.dailycodingproblem.com/solution/8?token=t").unwrap();
        assert_eq!(id, ProblemId::new(8));
        assert!(url.ends_with("/solution/8?token=t"));
    }
}
