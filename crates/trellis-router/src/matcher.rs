//! Ant-style path pattern matching.
//!
//! Patterns are split on `/` and compared segment by segment:
//!
//! | Syntax | Matches |
//! |--------|---------|
//! | `?` | exactly one character |
//! | `*` | zero or more characters within a segment |
//! | `**` | zero or more whole segments |
//! | `{name}` | a segment part, captured as variable `name` |
//! | `{name:regex}` | a segment part matching `regex`, captured as `name` |
//!
//! Matching runs left to right until the first `**`, then right to left
//! until the last `**`, and resolves whatever is left in between by sliding
//! each `**`-delimited run of segments over the remaining path at the
//! earliest offset where it fits.

use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use regex::Regex;
use tracing::{trace, warn};

use crate::error::MatchError;
use crate::variables::PathVariables;

const SEPARATOR: char = '/';
const DOUBLE_WILDCARD: &str = "**";
const DEFAULT_VARIABLE_PATTERN: &str = "(.*)";

/// Finds `?`, `*` and `{...}` (allowing one level of nested braces) in a segment.
fn glob_regex() -> &'static Regex {
    static GLOB: OnceLock<Regex> = OnceLock::new();
    GLOB.get_or_init(|| {
        Regex::new(r"\?|\*|\{((?:\{[^/]+?\}|[^/{}]|\\[{}])+?)\}").expect("valid regex")
    })
}

/// Drops matrix and session parameters (`;jsessionid=...`) from a path.
fn strip_matrix_params(path: &str) -> &str {
    path.find(';').map_or(path, |idx| &path[..idx])
}

/// Compiled form of one pattern segment.
#[derive(Debug)]
enum SegmentMatcher {
    /// Segment without wildcards or variables.
    Literal(String),
    /// Segment compiled to an anchored regular expression.
    Glob {
        source: String,
        regex: Regex,
        variables: Vec<String>,
    },
}

impl SegmentMatcher {
    fn compile(segment: &str) -> Result<Self, MatchError> {
        if !segment.contains(['?', '*', '{']) {
            return Ok(Self::Literal(segment.to_string()));
        }

        let mut expr = String::from("^(?:");
        let mut variables = Vec::new();
        let mut end = 0;

        for caps in glob_regex().captures_iter(segment) {
            let Some(whole) = caps.get(0) else { continue };
            expr.push_str(&regex::escape(&segment[end..whole.start()]));
            match whole.as_str() {
                "?" => expr.push('.'),
                "*" => expr.push_str(".*"),
                token => {
                    let inner = &token[1..token.len() - 1];
                    match inner.find(':') {
                        Some(colon) => {
                            expr.push('(');
                            expr.push_str(&inner[colon + 1..]);
                            expr.push(')');
                            variables.push(inner[..colon].to_string());
                        }
                        None => {
                            expr.push_str(DEFAULT_VARIABLE_PATTERN);
                            variables.push(inner.to_string());
                        }
                    }
                }
            }
            end = whole.end();
        }
        expr.push_str(&regex::escape(&segment[end..]));
        expr.push_str(")$");

        let regex = Regex::new(&expr)
            .map_err(|err| MatchError::invalid_pattern(segment, err.to_string()))?;

        Ok(Self::Glob {
            source: segment.to_string(),
            regex,
            variables,
        })
    }

    fn matches(&self, text: &str, vars: Option<&mut PathVariables>) -> Result<bool, MatchError> {
        match self {
            Self::Literal(literal) => Ok(literal == text),
            Self::Glob {
                source,
                regex,
                variables,
            } => {
                let Some(vars) = vars else {
                    return Ok(regex.is_match(text));
                };
                let Some(caps) = regex.captures(text) else {
                    return Ok(false);
                };
                let groups = caps.len() - 1;
                if groups != variables.len() {
                    return Err(MatchError::CapturingGroupMismatch {
                        segment: source.clone(),
                        groups,
                        variables: variables.len(),
                    });
                }
                for (name, group) in variables.iter().zip(caps.iter().skip(1)) {
                    vars.insert(name.as_str(), group.map_or("", |m| m.as_str()));
                }
                Ok(true)
            }
        }
    }
}

/// Matches request paths against Ant-style patterns and extracts URI template variables.
///
/// Compiled segments are cached by their raw text. The cache is safe to share
/// between threads; two threads compiling the same segment at once both
/// produce the same matcher and the later insert wins.
///
/// # Example
///
/// ```rust
/// use trellis_router::PathMatcher;
///
/// let matcher = PathMatcher::new();
/// assert!(matcher.matches("/static/**/*.css", "/static/css/site/main.css"));
///
/// let vars = matcher.extract_variables("/users/{id}/posts/{post}", "/users/7/posts/42").unwrap();
/// assert_eq!(vars.get("id"), Some("7"));
/// assert_eq!(vars.get("post"), Some("42"));
/// ```
#[derive(Debug)]
pub struct PathMatcher {
    trim_tokens: bool,
    cache: DashMap<String, Arc<SegmentMatcher>>,
}

impl Default for PathMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PathMatcher {
    /// Creates a matcher that trims whitespace around path segments.
    #[must_use]
    pub fn new() -> Self {
        Self {
            trim_tokens: true,
            cache: DashMap::with_capacity(256),
        }
    }

    /// Sets whether whitespace around path segments is ignored.
    #[must_use]
    pub fn with_trim_tokens(mut self, trim_tokens: bool) -> Self {
        self.trim_tokens = trim_tokens;
        self
    }

    /// Returns true if `path` matches `pattern`.
    ///
    /// A pattern whose segments fail to compile never matches; the failure
    /// is logged.
    #[must_use]
    pub fn matches(&self, pattern: &str, path: &str) -> bool {
        match self.do_match(pattern, strip_matrix_params(path), None) {
            Ok(matched) => matched,
            Err(err) => {
                warn!(pattern = %pattern, error = %err, "path pattern could not be evaluated");
                false
            }
        }
    }

    /// Extracts the URI template variables of `pattern` from `path`.
    ///
    /// Fails with [`MatchError::NoMatch`] if the path does not match, and
    /// with [`MatchError::CapturingGroupMismatch`] if a `{name:regex}`
    /// variable uses capturing groups of its own.
    pub fn extract_variables(&self, pattern: &str, path: &str) -> Result<PathVariables, MatchError> {
        let path = strip_matrix_params(path);
        let mut vars = PathVariables::new();
        if self.do_match(pattern, path, Some(&mut vars))? {
            Ok(vars)
        } else {
            Err(MatchError::no_match(pattern, path))
        }
    }

    /// Returns the number of compiled segments held in the cache.
    #[must_use]
    pub fn cached_segments(&self) -> usize {
        self.cache.len()
    }

    fn tokenize<'a>(&self, value: &'a str) -> Vec<&'a str> {
        value
            .split(SEPARATOR)
            .map(|token| if self.trim_tokens { token.trim() } else { token })
            .filter(|token| !token.is_empty())
            .collect()
    }

    fn segment_matcher(&self, segment: &str) -> Result<Arc<SegmentMatcher>, MatchError> {
        if let Some(found) = self.cache.get(segment) {
            return Ok(Arc::clone(found.value()));
        }
        let compiled = Arc::new(SegmentMatcher::compile(segment)?);
        trace!(segment = %segment, "compiled path pattern segment");
        self.cache.insert(segment.to_string(), Arc::clone(&compiled));
        Ok(compiled)
    }

    fn match_segment(
        &self,
        pattern: &str,
        text: &str,
        vars: Option<&mut PathVariables>,
    ) -> Result<bool, MatchError> {
        self.segment_matcher(pattern)?.matches(text, vars)
    }

    fn do_match(
        &self,
        pattern: &str,
        path: &str,
        mut vars: Option<&mut PathVariables>,
    ) -> Result<bool, MatchError> {
        if path.starts_with(SEPARATOR) != pattern.starts_with(SEPARATOR) {
            return Ok(false);
        }

        let patt = self.tokenize(pattern);
        let dirs = self.tokenize(path);

        // Half-open windows over the pattern and path segments.
        let (mut ps, mut pe) = (0, patt.len());
        let (mut qs, mut qe) = (0, dirs.len());

        while ps < pe && qs < qe {
            if patt[ps] == DOUBLE_WILDCARD {
                break;
            }
            if !self.match_segment(patt[ps], dirs[qs], vars.as_deref_mut())? {
                return Ok(false);
            }
            ps += 1;
            qs += 1;
        }

        if qs == qe {
            if ps == pe {
                return Ok(if pattern.ends_with(SEPARATOR) {
                    path.ends_with(SEPARATOR)
                } else {
                    !path.ends_with(SEPARATOR)
                });
            }
            if pe - ps == 1 && patt[ps] == "*" && path.ends_with(SEPARATOR) {
                return Ok(true);
            }
            return Ok(only_double_wildcards(&patt[ps..pe]));
        } else if ps == pe {
            return Ok(false);
        }

        while ps < pe && qs < qe {
            if patt[pe - 1] == DOUBLE_WILDCARD {
                break;
            }
            if !self.match_segment(patt[pe - 1], dirs[qe - 1], vars.as_deref_mut())? {
                return Ok(false);
            }
            pe -= 1;
            qe -= 1;
        }
        if qs == qe {
            return Ok(only_double_wildcards(&patt[ps..pe]));
        }

        while pe - ps > 1 && qs < qe {
            let Some(next) = (ps + 1..pe).find(|&i| patt[i] == DOUBLE_WILDCARD) else {
                break;
            };
            if next == ps + 1 {
                // `**/**`
                ps += 1;
                continue;
            }

            let run = &patt[ps + 1..next];
            let remaining = qe - qs;
            let mut found = None;
            if remaining >= run.len() {
                'offsets: for offset in 0..=remaining - run.len() {
                    for (j, sub) in run.iter().enumerate() {
                        if !self.match_segment(sub, dirs[qs + offset + j], vars.as_deref_mut())? {
                            continue 'offsets;
                        }
                    }
                    found = Some(qs + offset);
                    break;
                }
            }

            let Some(start) = found else {
                return Ok(false);
            };
            ps = next;
            qs = start + run.len();
        }

        Ok(only_double_wildcards(&patt[ps..pe]))
    }
}

fn only_double_wildcards(segments: &[&str]) -> bool {
    segments.iter().all(|s| *s == DOUBLE_WILDCARD)
}
