use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::table::RouteRecord;

/// Resolved path params, `name -> value`. Ordered so responses are stable.
pub type Params = BTreeMap<String, String>;

// --- View Identifiers ---

/// ViewId
///
/// The view components a route can activate. The components themselves live in
/// the SPA; this crate only decides which one is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub enum ViewId {
    Login,
    Register,
    MainPage,
    TaskDetails,
    ProfilePage,
    CreateStartup,
    EditStartup,
    /// Backs both `/create-task` and `/create-task/:id`.
    CreateTask,
    EditTask,
    CompleteTask,
    TaskResult,
    Chats,
    ChatRoom,
    AboutUs,
}

// --- Route Declarations ---

/// RouteTarget
///
/// What a route record does once matched: render a view, or send the
/// navigation somewhere else before any guard runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
    View(ViewId),
    Redirect(NavigationTarget),
}

/// RouteDefinition
///
/// Declarative input to [`crate::table::RouteTable::new`]. Child paths are
/// relative to their parent (`":id"` under `"/chats"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDefinition {
    pub path: String,
    pub target: RouteTarget,
    pub name: Option<String>,
    /// Gates the record, and every child below it, behind a token.
    pub requires_auth: bool,
    /// Hand the resolved params to the view as props.
    pub props_from_params: bool,
    pub children: Vec<RouteDefinition>,
}

impl RouteDefinition {
    pub fn view(path: impl Into<String>, view: ViewId) -> Self {
        Self {
            path: path.into(),
            target: RouteTarget::View(view),
            name: None,
            requires_auth: false,
            props_from_params: false,
            children: Vec::new(),
        }
    }

    pub fn redirect(path: impl Into<String>, target: NavigationTarget) -> Self {
        Self {
            target: RouteTarget::Redirect(target),
            ..Self::view(path, ViewId::Login)
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn requires_auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    pub fn props(mut self) -> Self {
        self.props_from_params = true;
        self
    }

    pub fn children(mut self, children: Vec<RouteDefinition>) -> Self {
        self.children = children;
        self
    }
}

// --- Navigation Inputs ---

/// NavigationTarget
///
/// Where a navigation (or a redirect) wants to go: a raw path, or a route name
/// plus the params needed to fill its pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum NavigationTarget {
    Path {
        path: String,
    },
    Named {
        name: String,
        #[serde(default)]
        params: BTreeMap<String, String>,
    },
}

impl NavigationTarget {
    pub fn path(path: impl Into<String>) -> Self {
        Self::Path { path: path.into() }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            name: name.into(),
            params: Params::new(),
        }
    }

    pub fn named_with(name: impl Into<String>, params: Params) -> Self {
        Self::Named {
            name: name.into(),
            params,
        }
    }
}

/// NavigationIntent
///
/// One navigation attempt as the guards see it: the normalized target path,
/// the matched records from root to leaf, and the params pulled out of the path.
#[derive(Debug, Clone)]
pub struct NavigationIntent<'a> {
    pub target_path: String,
    pub matched: Vec<&'a RouteRecord>,
    pub resolved_params: Params,
}

impl<'a> NavigationIntent<'a> {
    /// The deepest matched record, the one whose view ends up on screen.
    pub fn leaf(&self) -> Option<&'a RouteRecord> {
        self.matched.last().copied()
    }

    /// Name of the leaf record, if it has one.
    pub fn route_name(&self) -> Option<&'a str> {
        self.leaf().and_then(RouteRecord::name)
    }

    /// True when the leaf or any ancestor demands authentication.
    pub fn requires_auth(&self) -> bool {
        self.matched.iter().any(|record| record.requires_auth())
    }
}

// --- Navigation Outputs ---

/// NavigationDecision
///
/// Result of running the guard chain once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(tag = "decision", rename_all = "snake_case")]
#[ts(export)]
pub enum NavigationDecision {
    Allow,
    RedirectTo { target: NavigationTarget },
}

impl NavigationDecision {
    pub fn redirect(target: NavigationTarget) -> Self {
        Self::RedirectTo { target }
    }
}

/// ActivatedView
///
/// A view the SPA must mount, outermost first. `props` is empty unless the
/// record passes its params through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ActivatedView {
    pub view: ViewId,
    pub route_name: Option<String>,
    pub props: BTreeMap<String, String>,
}

/// Navigation
///
/// The settled result of a navigation: the path that was finally activated,
/// the views to mount and every path that redirected on the way there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Navigation {
    /// The path (or route name) that was originally requested.
    pub requested: String,
    /// Canonical path that was activated.
    pub path: String,
    pub query: Option<String>,
    pub route_name: Option<String>,
    pub params: BTreeMap<String, String>,
    pub views: Vec<ActivatedView>,
    /// Paths that redirected, in the order they were visited.
    pub redirects: Vec<String>,
}

impl Navigation {
    /// The innermost view, i.e. the page the user actually lands on.
    pub fn view(&self) -> Option<ViewId> {
        self.views.last().map(|activated| activated.view)
    }

    pub fn was_redirected(&self) -> bool {
        !self.redirects.is_empty()
    }
}

/// RouteSummary
///
/// Flat description of one route record, used by the route listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RouteSummary {
    pub path: String,
    pub name: Option<String>,
    pub view: Option<ViewId>,
    pub redirect: Option<NavigationTarget>,
    pub requires_auth: bool,
    pub props_from_params: bool,
}

// --- Request Payloads ---

/// NamedNavigationRequest
///
/// Body of `POST /navigate`: navigate by route name, the programmatic
/// `navigate(name, params)` form used by the views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NamedNavigationRequest {
    pub name: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    /// Path the user is currently on, if any.
    pub from: Option<String>,
}
