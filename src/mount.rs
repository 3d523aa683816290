//! Namespace mounting.
//!
//! Mounting a [`Group`] under a prefix registers each of its routes with a
//! [`RuleSink`] (normally the [`Router`]):
//!
//! | prefix      | endpoint  | path               | name                |
//! |-------------|-----------|--------------------|---------------------|
//! | `/`         | `/login`  | `/login`           | `login`             |
//! | `/auth`     | `/login`  | `/auth/login`      | `auth.login`        |
//! | `/admin/v2` | `/logout` | `/admin/v2/logout` | `admin.v2.logout`   |
//!
//! The name column assumes the endpoint handlers are called `login` and
//! `logout`; names come from handlers, paths from endpoints.

use std::collections::HashMap;

use tracing::info;

use crate::error::Error;
use crate::group::Group;
use crate::handler::BoxedHandler;
use crate::method::Method;
use crate::router::{Router, RuleSink};

/// A route as registered with the router: final path, qualified name and
/// the composed handler.
#[derive(Clone)]
pub struct MountedRule {
    path: String,
    name: String,
    methods: Vec<Method>,
    handler: BoxedHandler,
}

impl MountedRule {
    pub fn path(&self) -> &str { &self.path }
    pub fn name(&self) -> &str { &self.name }
    pub fn methods(&self) -> &[Method] { &self.methods }
    pub fn handler(&self) -> &BoxedHandler { &self.handler }
}

impl std::fmt::Debug for MountedRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountedRule")
            .field("path", &self.path)
            .field("name", &self.name)
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}

/// `prefix` with leading and trailing slashes removed. Empty for the root.
pub fn namespace(prefix: &str) -> &str {
    prefix.trim_matches('/')
}

/// Final path of `endpoint` under `prefix`.
///
/// A root prefix leaves the endpoint untouched; otherwise both sides are
/// trimmed of slashes and joined with exactly one.
pub fn mount_path(prefix: &str, endpoint: &str) -> String {
    let ns = namespace(prefix);
    if ns.is_empty() {
        return endpoint.to_owned();
    }
    format!("/{ns}/{}", endpoint.trim_matches('/'))
}

/// Qualified rule name of `handler_name` under `prefix`: path separators in
/// the namespace become dots.
pub fn qualified_name(prefix: &str, handler_name: &str) -> String {
    let ns = namespace(prefix);
    if ns.is_empty() {
        return handler_name.to_owned();
    }
    let dotted = ns.split('/').filter(|s| !s.is_empty()).collect::<Vec<_>>().join(".");
    format!("{dotted}.{handler_name}")
}

/// Registers every route of `group` under `prefix` with `sink`, in
/// declaration order, and returns what was registered.
///
/// The group itself is left untouched, so it can be mounted again elsewhere.
/// Stops at the first rule `sink` rejects; rules registered before it stay
/// with `sink`. [`Mux::mount`] rolls those back.
pub fn mount(
    prefix: &str,
    group: &Group,
    sink: &mut impl RuleSink,
) -> Result<Vec<MountedRule>, Error> {
    let rules: Vec<MountedRule> = group
        .routes()
        .iter()
        .map(|route| MountedRule {
            path: mount_path(prefix, route.endpoint()),
            name: qualified_name(prefix, route.raw().name()),
            methods: route.methods().to_vec(),
            handler: route.handler().clone(),
        })
        .collect();

    for rule in &rules {
        sink.add_rule(&rule.path, &rule.name, rule.handler.clone(), &rule.methods)?;
    }
    for rule in &rules {
        info!(path = %rule.path, name = %rule.name, methods = ?rule.methods, "rule mounted");
    }
    Ok(rules)
}

/// Owns the [`Router`] and remembers which rules each namespace mounted.
///
/// ```rust
/// use mux::chain::handler;
/// use mux::{Group, Mux, Router};
///
/// async fn login(_req: mux::Request) -> &'static str { "welcome" }
///
/// # fn main() -> Result<(), mux::Error> {
/// let mut auth = Group::new();
/// auth.post("/login", [handler(login)])?;
///
/// let mut mux = Mux::new(Router::new());
/// mux.mount("/auth", &auth)?;
///
/// assert_eq!(mux.rules("auth")[0].path(), "/auth/login");
/// assert_eq!(mux.rules("auth")[0].name(), "auth.login");
/// let router = mux.into_router();
/// # Ok(())
/// # }
/// ```
pub struct Mux {
    router: Router,
    rules: HashMap<String, Vec<MountedRule>>,
}

impl Mux {
    pub fn new(router: Router) -> Self {
        Self { router, rules: HashMap::new() }
    }

    /// Mounts `group` under `prefix` and returns the rules it produced.
    ///
    /// All or nothing: when any rule is rejected the router and the
    /// recorded rules stay as they were.
    pub fn mount(&mut self, prefix: &str, group: &Group) -> Result<&[MountedRule], Error> {
        let mut staged = self.router.clone();
        let mounted = mount(prefix, group, &mut staged)?;
        self.router = staged;
        let rules = self.rules.entry(namespace(prefix).to_owned()).or_default();
        let start = rules.len();
        rules.extend(mounted);
        Ok(&rules[start..])
    }

    /// Rules mounted under `prefix` (slashes optional; `""` or `"/"` for
    /// the root). Empty when nothing was mounted there.
    pub fn rules(&self, prefix: &str) -> &[MountedRule] {
        self.rules.get(namespace(prefix)).map(Vec::as_slice).unwrap_or_default()
    }

    /// Namespaces mounted so far, in no particular order.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn into_router(self) -> Router {
        self.router
    }
}
