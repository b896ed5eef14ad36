use std::collections::BTreeMap;
use std::fmt;

use percent_encoding::percent_decode_str;
use thiserror::Error;

/// Param name under which a trailing `*` stores the unmatched remainder of a path.
pub const WILDCARD_PARAM: &str = "pathMatch";

/// PatternError
///
/// Raised while parsing a route template. These are construction-time defects
/// in the route table, never runtime conditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern `{0}` has a param segment without a name")]
    EmptyParamName(String),
    #[error("pattern `{pattern}` declares param `{name}` more than once")]
    DuplicateParam { pattern: String, name: String },
    #[error("pattern `{0}` has a wildcard that is not the final segment")]
    WildcardNotLast(String),
}

/// Segment
///
/// One `/`-separated piece of a route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text, compared ASCII case-insensitively.
    Static(String),
    /// `:name`, matches exactly one non-empty path segment.
    Param(String),
    /// `*`, matches whatever is left (possibly nothing).
    Wildcard,
}

/// RoutePattern
///
/// A parsed path template such as `/task/:id` or `/*`. Child patterns are
/// written without the leading slash and are joined onto their parent with
/// [`RoutePattern::join`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// parse
    ///
    /// Splits the template on `/`, ignoring empty pieces, and classifies each
    /// piece. Fails on an unnamed param, a repeated param name or a wildcard
    /// followed by further segments.
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        let segments = raw
            .split('/')
            .filter(|piece| !piece.is_empty())
            .map(|piece| match piece {
                "*" => Ok(Segment::Wildcard),
                _ => match piece.strip_prefix(':') {
                    Some("") => Err(PatternError::EmptyParamName(raw.to_string())),
                    Some(name) => Ok(Segment::Param(name.to_string())),
                    None => Ok(Segment::Static(piece.to_string())),
                },
            })
            .collect::<Result<Vec<_>, _>>()?;

        let pattern = Self {
            raw: raw.to_string(),
            segments,
        };
        pattern.validate()?;
        Ok(pattern)
    }

    fn validate(&self) -> Result<(), PatternError> {
        if let Some(pos) = self.segments.iter().position(|s| *s == Segment::Wildcard) {
            if pos + 1 != self.segments.len() {
                return Err(PatternError::WildcardNotLast(self.raw.clone()));
            }
        }

        let mut seen = Vec::new();
        for segment in &self.segments {
            if let Segment::Param(name) = segment {
                if seen.contains(&name) {
                    return Err(PatternError::DuplicateParam {
                        pattern: self.raw.clone(),
                        name: name.clone(),
                    });
                }
                seen.push(name);
            }
        }
        Ok(())
    }

    /// join
    ///
    /// Builds the full pattern of a child record: the parent's segments
    /// followed by the child's.
    pub fn join(&self, child: &RoutePattern) -> Result<Self, PatternError> {
        let raw = format!(
            "{}/{}",
            self.raw.trim_end_matches('/'),
            child.raw.trim_start_matches('/')
        );
        let mut segments = self.segments.clone();
        segments.extend(child.segments.iter().cloned());

        let joined = Self { raw, segments };
        joined.validate()?;
        Ok(joined)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns true for a pattern that ends with `*`, e.g. `/files/*`.
    pub fn is_catch_all(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Wildcard))
    }

    /// Returns true only for `/*`, the pattern that matches every path.
    pub fn is_root_catch_all(&self) -> bool {
        self.segments == [Segment::Wildcard]
    }

    /// Names of the `:param` segments, in order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// matches
    ///
    /// Structural match against already-split path segments. Returns the
    /// decoded param values on success.
    pub fn matches(&self, path: &[&str]) -> Option<BTreeMap<String, String>> {
        let mut params = BTreeMap::new();
        let mut rest = path;

        for segment in &self.segments {
            match segment {
                Segment::Wildcard => {
                    params.insert(WILDCARD_PARAM.to_string(), rest.join("/"));
                    return Some(params);
                }
                Segment::Static(text) => {
                    let (head, tail) = rest.split_first()?;
                    if !head.eq_ignore_ascii_case(text) {
                        return None;
                    }
                    rest = tail;
                }
                Segment::Param(name) => {
                    let (head, tail) = rest.split_first()?;
                    params.insert(name.clone(), decode_segment(head));
                    rest = tail;
                }
            }
        }

        rest.is_empty().then_some(params)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// NormalizedPath
///
/// A request path with query and fragment split off and empty segments
/// removed, so `/login/`, `//login` and `/login?next=x` all resolve alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPath<'a> {
    pub segments: Vec<&'a str>,
    pub query: Option<&'a str>,
}

impl<'a> NormalizedPath<'a> {
    pub fn new(raw: &'a str) -> Self {
        let without_fragment = raw.split_once('#').map_or(raw, |(path, _)| path);
        let (path, query) = match without_fragment.split_once('?') {
            Some((path, query)) => (path, Some(query).filter(|q| !q.is_empty())),
            None => (without_fragment, None),
        };

        Self {
            segments: path.split('/').filter(|s| !s.is_empty()).collect(),
            query,
        }
    }

    /// The canonical form: a leading slash, segments joined by single slashes.
    pub fn canonical(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

fn decode_segment(raw: &str) -> String {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}
