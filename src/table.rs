use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::collections::HashSet;
use thiserror::Error;

use crate::{
    models::{Params, RouteDefinition, RouteSummary, RouteTarget, ViewId},
    navigator::NavigationError,
    pattern::{NormalizedPath, PatternError, RoutePattern, Segment, WILDCARD_PARAM},
};

/// Characters escaped when a param value is written back into a path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// RouteTableError
///
/// Static misconfiguration of the table. Surfaced once, at construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteTableError {
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error("route name `{0}` is declared more than once")]
    DuplicateName(String),
    #[error("the table has no top-level catch-all route")]
    MissingCatchAll,
    #[error("catch-all route `{0}` must be the last top-level entry")]
    CatchAllNotLast(String),
    #[error("catch-all route `{0}` resolves to `/*` and is only allowed at the top level")]
    NestedCatchAll(String),
    #[error("redirect route `{0}` cannot have children")]
    RedirectWithChildren(String),
}

/// RouteRecord
///
/// A compiled [`RouteDefinition`]: the same metadata, with the full pattern
/// (parent segments included) parsed up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRecord {
    pattern: RoutePattern,
    target: RouteTarget,
    name: Option<String>,
    requires_auth: bool,
    props_from_params: bool,
    children: Vec<RouteRecord>,
}

impl RouteRecord {
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn target(&self) -> &RouteTarget {
        &self.target
    }

    pub fn view(&self) -> Option<ViewId> {
        match self.target {
            RouteTarget::View(view) => Some(view),
            RouteTarget::Redirect(_) => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The record's own flag. Inheritance from ancestors is resolved on the
    /// matched chain, see [`crate::models::NavigationIntent::requires_auth`].
    pub fn requires_auth(&self) -> bool {
        self.requires_auth
    }

    pub fn props_from_params(&self) -> bool {
        self.props_from_params
    }

    pub fn children(&self) -> &[RouteRecord] {
        &self.children
    }

    fn compile(
        definition: RouteDefinition,
        parent: Option<&RoutePattern>,
    ) -> Result<Self, RouteTableError> {
        let own = RoutePattern::parse(&definition.path)?;
        let pattern = match parent {
            Some(parent) => parent.join(&own)?,
            None => own,
        };

        if parent.is_some() && pattern.is_root_catch_all() {
            return Err(RouteTableError::NestedCatchAll(pattern.to_string()));
        }
        if matches!(definition.target, RouteTarget::Redirect(_)) && !definition.children.is_empty()
        {
            return Err(RouteTableError::RedirectWithChildren(pattern.to_string()));
        }

        let children = definition
            .children
            .into_iter()
            .map(|child| Self::compile(child, Some(&pattern)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            pattern,
            target: definition.target,
            name: definition.name,
            requires_auth: definition.requires_auth,
            props_from_params: definition.props_from_params,
            children,
        })
    }

    /// Children are tried before the record itself; the first hit wins.
    fn resolve<'a>(&'a self, segments: &[&str]) -> Option<(Vec<&'a RouteRecord>, Params)> {
        for child in &self.children {
            if let Some((mut chain, params)) = child.resolve(segments) {
                chain.insert(0, self);
                return Some((chain, params));
            }
        }
        self.pattern
            .matches(segments)
            .map(|params| (vec![self], params))
    }

    fn find<'a>(&'a self, name: &str) -> Option<&'a RouteRecord> {
        if self.name() == Some(name) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    fn collect_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        if let Some(name) = self.name() {
            names.push(name);
        }
        for child in &self.children {
            child.collect_names(names);
        }
    }

    fn summarize(&self, inherited_auth: bool, out: &mut Vec<RouteSummary>) {
        let requires_auth = inherited_auth || self.requires_auth;
        out.push(RouteSummary {
            path: self.pattern.to_string(),
            name: self.name.clone(),
            view: self.view(),
            redirect: match &self.target {
                RouteTarget::Redirect(target) => Some(target.clone()),
                RouteTarget::View(_) => None,
            },
            requires_auth,
            props_from_params: self.props_from_params,
        });
        for child in &self.children {
            child.summarize(requires_auth, out);
        }
    }
}

/// RouteMatch
///
/// Successful resolution of a path: the matched records from root to leaf and
/// the params extracted along the way.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    pub chain: Vec<&'a RouteRecord>,
    pub params: Params,
    /// Canonical form of the requested path.
    pub path: String,
    pub query: Option<String>,
}

impl<'a> RouteMatch<'a> {
    pub fn leaf(&self) -> &'a RouteRecord {
        // chain always holds at least the top-level record
        self.chain[self.chain.len() - 1]
    }
}

/// RouteTable
///
/// The ordered, immutable tree of route records. Built once at startup;
/// resolution is a pure recursive descent over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<RouteRecord>,
}

impl RouteTable {
    /// new
    ///
    /// Compiles and validates the definitions. Names must be unique across the
    /// whole tree and exactly one catch-all must close the top-level list.
    pub fn new(definitions: Vec<RouteDefinition>) -> Result<Self, RouteTableError> {
        let routes = definitions
            .into_iter()
            .map(|definition| RouteRecord::compile(definition, None))
            .collect::<Result<Vec<_>, _>>()?;

        let mut names = Vec::new();
        for route in &routes {
            route.collect_names(&mut names);
        }
        let mut seen = HashSet::new();
        if let Some(duplicate) = names.into_iter().find(|name| !seen.insert(*name)) {
            return Err(RouteTableError::DuplicateName(duplicate.to_string()));
        }

        let last = routes.len().checked_sub(1);
        match routes.iter().position(|route| route.pattern.is_root_catch_all()) {
            None => return Err(RouteTableError::MissingCatchAll),
            Some(pos) if Some(pos) != last => {
                return Err(RouteTableError::CatchAllNotLast(
                    routes[pos].pattern.to_string(),
                ));
            }
            Some(_) => {}
        }

        Ok(Self { routes })
    }

    pub fn routes(&self) -> &[RouteRecord] {
        &self.routes
    }

    /// resolve
    ///
    /// Matches `path` against the table in declaration order. With a validated
    /// table the catch-all guarantees a result.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        let normalized = NormalizedPath::new(path);
        let (chain, params) = self
            .routes
            .iter()
            .find_map(|route| route.resolve(&normalized.segments))?;

        let matched = RouteMatch {
            chain,
            params,
            path: normalized.canonical(),
            query: normalized.query.map(str::to_string),
        };
        tracing::debug!(path = %matched.path, pattern = %matched.leaf().pattern, "route resolved");
        Some(matched)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&RouteRecord> {
        self.routes.iter().find_map(|route| route.find(name))
    }

    /// build_path
    ///
    /// Fills the named record's pattern with `params`. Values are
    /// percent-encoded; params the pattern does not use are ignored.
    pub fn build_path(&self, name: &str, params: &Params) -> Result<String, NavigationError> {
        let record = self
            .find_by_name(name)
            .ok_or_else(|| NavigationError::UnknownRouteName(name.to_string()))?;

        let mut pieces = Vec::with_capacity(record.pattern.segments().len());
        for segment in record.pattern.segments() {
            match segment {
                Segment::Static(text) => pieces.push(text.clone()),
                Segment::Param(param) => {
                    let value = params
                        .get(param)
                        .filter(|value| !value.is_empty())
                        .ok_or_else(|| NavigationError::MissingParam {
                            route: name.to_string(),
                            param: param.clone(),
                        })?;
                    pieces.push(utf8_percent_encode(value, SEGMENT).to_string());
                }
                Segment::Wildcard => {
                    if let Some(rest) = params.get(WILDCARD_PARAM).filter(|rest| !rest.is_empty()) {
                        pieces.push(rest.trim_matches('/').to_string());
                    }
                }
            }
        }

        Ok(format!("/{}", pieces.join("/")))
    }

    /// Flat listing of every record, children right after their parent.
    /// `requires_auth` is reported with ancestors taken into account.
    pub fn summaries(&self) -> Vec<RouteSummary> {
        let mut out = Vec::new();
        for route in &self.routes {
            route.summarize(false, &mut out);
        }
        out
    }
}
