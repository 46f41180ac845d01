//! Boundary behaviour of Ant-style patterns as seen by routing code.

use proptest::prelude::*;
use trellis_router::{MatchError, PathMatcher};

#[test]
fn test_single_star_boundaries() {
    let matcher = PathMatcher::new();
    assert!(matcher.matches("/some/*", "/some/match"));
    assert!(matcher.matches("/some/*", "/some/"));
    assert!(!matcher.matches("/some/*", "/some"));
    assert!(!matcher.matches("/some/*", "/some/deep/path"));
}

#[test]
fn test_double_star_boundaries() {
    let matcher = PathMatcher::new();
    assert!(matcher.matches("/some/**", "/some"));
    assert!(matcher.matches("/some/**", "/some/"));
    assert!(matcher.matches("/some/**", "/some/path"));
    assert!(matcher.matches("/some/**", "/some/deep/path"));
    assert!(!matcher.matches("/some/**", "/other/path"));
}

#[test]
fn test_separators_must_agree() {
    let matcher = PathMatcher::new();
    assert!(!matcher.matches("/path", "/path/"));
    assert!(!matcher.matches("/path", "path"));
}

#[test]
fn test_exclude_rules_use_the_same_syntax() {
    let matcher = PathMatcher::new();
    let excluded = ["/static/**", "/favicon.ico", "/*.txt"];

    let is_excluded = |path: &str| excluded.iter().any(|p| matcher.matches(p, path));

    assert!(is_excluded("/static/js/app.js"));
    assert!(is_excluded("/favicon.ico"));
    assert!(is_excluded("/robots.txt"));
    assert!(!is_excluded("/users/robots.txt"));
    assert!(!is_excluded("/users"));
}

#[test]
fn test_extraction_reports_non_matches() {
    let matcher = PathMatcher::new();
    match matcher.extract_variables("/a/{b}", "/x/y") {
        Err(MatchError::NoMatch { pattern, path }) => {
            assert_eq!(pattern, "/a/{b}");
            assert_eq!(path, "/x/y");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

fn segment() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,6}"
}

proptest! {
    #[test]
    fn test_literal_pattern_matches_itself(segments in prop::collection::vec(segment(), 1..6)) {
        let path = format!("/{}", segments.join("/"));
        let matcher = PathMatcher::new();
        prop_assert!(matcher.matches(&path, &path));
        prop_assert!(matcher.matches("/**", &path));
    }

    #[test]
    fn test_variables_capture_each_segment(segments in prop::collection::vec(segment(), 1..6)) {
        let pattern: String = (0..segments.len()).map(|i| format!("/{{v{i}}}")).collect();
        let path = format!("/{}", segments.join("/"));
        let matcher = PathMatcher::new();

        let first = matcher.extract_variables(&pattern, &path).unwrap();
        let second = matcher.extract_variables(&pattern, &path).unwrap();
        prop_assert_eq!(&first, &second);
        for (i, value) in segments.iter().enumerate() {
            let name = format!("v{i}");
            prop_assert_eq!(first.get(&name), Some(value.as_str()));
        }
    }
}
