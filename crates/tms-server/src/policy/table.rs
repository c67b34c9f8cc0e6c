//! Route policy table compilation and lookup.
//!
//! Rules are keyed by `"METHOD /path"` using the route template the router
//! registered. Every protected route starts out manager-only; configuration
//! may widen or change the allowed roles per route.

use std::collections::{HashMap, HashSet};

use tms_core::error::{Result, TmsError};
use tms_core::Role;

use crate::config::RouteOverride;

/// Every route that sits behind the role gate.
pub const PROTECTED_ROUTES: &[&str] = &[
    "GET /projects",
    "GET /project",
    "POST /project",
    "DELETE /project",
    "POST /project/archive",
    "POST /project/set-completion-date",
    "GET /test-cases",
    "GET /test-case",
    "POST /test-case",
    "POST /test-cases/batch",
    "DELETE /test-case",
    "POST /test-case/add-requirement",
    "POST /test-case/remove-requirement",
    "GET /test-plans",
    "GET /test-plan",
    "POST /test-plan",
    "DELETE /test-plan",
    "GET /test-suites",
    "GET /test-suite",
    "POST /test-suite",
    "DELETE /test-suite",
    "POST /test-suite/add-test-case",
    "POST /test-suite/remove-test-case",
    "GET /requirements",
    "GET /requirement",
    "POST /requirement",
    "DELETE /requirement",
    "POST /run-tests",
    "GET /test-reports",
    "GET /test-report",
    "DELETE /test-report",
];

const DEFAULT_ROLE: Role = Role::Manager;

/// Decision from policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    Allow,
    Deny,
    UnknownRoute,
}

#[derive(Debug, Clone)]
pub struct PolicyTable {
    rules: HashMap<String, HashSet<Role>>,
}

impl PolicyTable {
    /// Default table: every protected route allows `manager` only.
    pub fn uniform() -> Self {
        let rules = PROTECTED_ROUTES
            .iter()
            .map(|r| (r.to_string(), HashSet::from([DEFAULT_ROLE])))
            .collect();
        Self { rules }
    }

    pub fn compile(overrides: &[RouteOverride]) -> Result<Self> {
        let mut table = Self::uniform();
        for o in overrides {
            let key = normalize_route(&o.route)?;
            let Some(slot) = table.rules.get_mut(&key) else {
                return Err(TmsError::Validation(format!(
                    "access override refers to unknown route: {}",
                    o.route
                )));
            };
            if o.roles.is_empty() {
                return Err(TmsError::Validation(format!(
                    "access override for {key} must name at least one role"
                )));
            }
            *slot = o.roles.iter().copied().collect();
        }
        Ok(table)
    }

    pub fn check(&self, method: &str, path: &str, role: Role) -> PolicyDecision {
        match self.rules.get(&route_key(method, path)) {
            None => PolicyDecision::UnknownRoute,
            Some(roles) if roles.contains(&role) => PolicyDecision::Allow,
            Some(_) => PolicyDecision::Deny,
        }
    }

    pub fn allowed_roles(&self, method: &str, path: &str) -> Option<&HashSet<Role>> {
        self.rules.get(&route_key(method, path))
    }
}

pub fn route_key(method: &str, path: &str) -> String {
    format!("{} {}", method.to_ascii_uppercase(), path)
}

fn normalize_route(raw: &str) -> Result<String> {
    // format: "METHOD /path"
    let (method, path) = raw.trim().split_once(' ').ok_or_else(|| {
        TmsError::Validation(format!("invalid route: {raw} (expected \"METHOD /path\")"))
    })?;
    let path = path.trim();
    if !path.starts_with('/') {
        return Err(TmsError::Validation(format!("invalid route path: {path}")));
    }
    Ok(route_key(method, path))
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn uniform_table_is_manager_only() {
        let t = PolicyTable::uniform();
        for route in PROTECTED_ROUTES {
            let (m, p) = route.split_once(' ').expect("METHOD /path");
            assert_eq!(t.check(m, p, Role::Manager), PolicyDecision::Allow);
            assert_eq!(t.check(m, p, Role::Tester), PolicyDecision::Deny);
            assert_eq!(t.check(m, p, Role::TestAnalyst), PolicyDecision::Deny);
        }
        assert_eq!(t.check("GET", "/nope", Role::Manager), PolicyDecision::UnknownRoute);
    }

    #[test]
    fn override_replaces_roles() {
        let t = PolicyTable::compile(&[RouteOverride {
            route: "get /test-reports".into(),
            roles: vec![Role::Tester],
        }])
        .expect("compile");
        assert_eq!(t.check("GET", "/test-reports", Role::Tester), PolicyDecision::Allow);
        assert_eq!(t.check("GET", "/test-reports", Role::Manager), PolicyDecision::Deny);
    }

    #[test]
    fn override_for_unknown_route_rejected() {
        let res = PolicyTable::compile(&[RouteOverride {
            route: "GET /admin".into(),
            roles: vec![Role::Manager],
        }]);
        assert!(res.is_err());

        let res = PolicyTable::compile(&[RouteOverride {
            route: "/projects".into(),
            roles: vec![Role::Manager],
        }]);
        assert!(res.is_err());
    }
}
