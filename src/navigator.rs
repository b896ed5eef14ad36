use std::sync::Arc;
use thiserror::Error;

use crate::{
    guards::GuardChain,
    models::{
        ActivatedView, Navigation, NavigationDecision, NavigationIntent, NavigationTarget, Params,
        RouteTarget,
    },
    table::{RouteMatch, RouteTable},
};

/// NavigationError
///
/// The ways a navigation can fail. Unknown paths are not among them: they
/// land on the catch-all and redirect like any other route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("no route is named `{0}`")]
    UnknownRouteName(String),
    #[error("route `{route}` needs a value for param `{param}`")]
    MissingParam { route: String, param: String },
    #[error("navigation did not settle after {hops} redirects (last path `{path}`)")]
    RedirectLoop { hops: usize, path: String },
    #[error("no route matches `{0}`")]
    Unmatched(String),
}

/// Navigator
///
/// The driver loop around the route table and the guard chain. It owns no
/// mutable state: the same target, token and table always settle the same way.
#[derive(Clone)]
pub struct Navigator {
    table: Arc<RouteTable>,
    guards: GuardChain,
    max_redirects: usize,
}

impl Navigator {
    pub fn new(table: Arc<RouteTable>, guards: GuardChain, max_redirects: usize) -> Self {
        Self {
            table,
            guards,
            max_redirects,
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// navigate_path
    ///
    /// Shorthand for navigating to a raw path.
    pub fn navigate_path(&self, path: &str, from: Option<&str>) -> Result<Navigation, NavigationError> {
        self.navigate(NavigationTarget::path(path), from)
    }

    /// navigate
    ///
    /// Runs one navigation to completion:
    /// 1. a named target is expanded into a path;
    /// 2. the path is resolved; a redirect record sends the loop to its
    ///    target without consulting the guards;
    /// 3. otherwise the guard chain decides, and a guard redirect sends the
    ///    loop to the new target with the guards re-run against it;
    /// 4. `Allow` activates the matched views.
    ///
    /// `from` is the location the user was on before this navigation and
    /// stays the same across redirects.
    pub fn navigate(
        &self,
        target: NavigationTarget,
        from: Option<&str>,
    ) -> Result<Navigation, NavigationError> {
        let requested = match &target {
            NavigationTarget::Path { path } => path.clone(),
            NavigationTarget::Named { name, .. } => name.clone(),
        };
        let mut target = target;
        let mut redirects = Vec::new();

        loop {
            let path = match &target {
                NavigationTarget::Path { path } => path.clone(),
                NavigationTarget::Named { name, params } => self.table.build_path(name, params)?,
            };
            let matched = self
                .table
                .resolve(&path)
                .ok_or_else(|| NavigationError::Unmatched(path.clone()))?;

            let next = match matched.leaf().target() {
                RouteTarget::Redirect(next) => {
                    tracing::debug!(path = %matched.path, ?next, "route redirect");
                    next.clone()
                }
                RouteTarget::View(_) => {
                    let intent = NavigationIntent {
                        target_path: matched.path.clone(),
                        matched: matched.chain.clone(),
                        resolved_params: matched.params.clone(),
                    };
                    match self.guards.evaluate(&intent, from) {
                        NavigationDecision::Allow => {
                            return Ok(activate(requested, matched, redirects));
                        }
                        NavigationDecision::RedirectTo { target } => target,
                    }
                }
            };

            redirects.push(matched.path);
            if redirects.len() > self.max_redirects {
                tracing::warn!(
                    requested = %requested,
                    hops = redirects.len(),
                    "redirect loop detected"
                );
                return Err(NavigationError::RedirectLoop {
                    hops: redirects.len(),
                    path: redirects.last().cloned().unwrap_or_default(),
                });
            }
            target = next;
        }
    }
}

fn activate(requested: String, matched: RouteMatch<'_>, redirects: Vec<String>) -> Navigation {
    let views = matched
        .chain
        .iter()
        .filter_map(|record| {
            record.view().map(|view| ActivatedView {
                view,
                route_name: record.name().map(str::to_string),
                props: if record.props_from_params() {
                    matched.params.clone()
                } else {
                    Params::new()
                },
            })
        })
        .collect();

    Navigation {
        requested,
        route_name: matched.leaf().name().map(str::to_string),
        path: matched.path,
        query: matched.query,
        params: matched.params,
        views,
        redirects,
    }
}
