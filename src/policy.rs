//! Route-level access policy.
//!
//! One pure function decides, for every inbound page request, whether it goes through
//! or where it is redirected. The HTTP layer only translates the [`Decision`].

use crate::models::session::SessionRecord;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";
pub const ADMIN_LOGIN_PATH: &str = "/admin";
pub const ADMIN_DASHBOARD_PATH: &str = "/admin/dashboard";

/// The outcome of evaluating a request against the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectLogin,
    RedirectHome,
    RedirectAdminLogin,
    RedirectAdminDashboard,
}

impl Decision {
    /// Where a redirect decision points to; `None` for [`Decision::Allow`].
    pub fn location(self) -> Option<&'static str> {
        match self {
            Decision::Allow => None,
            Decision::RedirectLogin => Some(LOGIN_PATH),
            Decision::RedirectHome => Some(HOME_PATH),
            Decision::RedirectAdminLogin => Some(ADMIN_LOGIN_PATH),
            Decision::RedirectAdminDashboard => Some(ADMIN_DASHBOARD_PATH),
        }
    }
}

/// The classes of paths the policy distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    /// `/login`, `/register`.
    CitizenAuth,
    /// `/admin`, `/admin/register`: the admin login flow.
    AdminEntry,
    /// Every other path under `/admin/`.
    AdminArea,
    /// `/nouvelle-demande*`, `/suivi-demande`.
    CitizenArea,
    /// Everything else.
    Public,
}

/// Strips trailing slashes, keeping `/` itself.
fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

impl PathClass {
    /// Classifies a request path. Admin paths are matched before citizen paths.
    pub fn of(path: &str) -> Self {
        let path = normalize(path);

        if path == "/admin" || path == "/admin/register" {
            return PathClass::AdminEntry;
        }
        if path.starts_with("/admin/") {
            return PathClass::AdminArea;
        }
        if path == "/login" || path == "/register" {
            return PathClass::CitizenAuth;
        }
        if path.starts_with("/nouvelle-demande") || path == "/suivi-demande" {
            return PathClass::CitizenArea;
        }
        PathClass::Public
    }
}

/// Decides what happens to a request for `path` made with `session`.
///
/// Citizen sessions may still open `/admin` and `/admin/register`; only staff
/// sessions are sent on to the dashboard.
pub fn decide(path: &str, session: Option<&SessionRecord>) -> Decision {
    let role = session.map(|s| s.role);

    match (PathClass::of(path), role) {
        (PathClass::Public, _) => Decision::Allow,

        (PathClass::CitizenAuth, None) => Decision::Allow,
        (PathClass::CitizenAuth, Some(_)) => Decision::RedirectHome,

        (PathClass::AdminEntry, Some(role)) if role.is_administrative() => {
            Decision::RedirectAdminDashboard
        }
        (PathClass::AdminEntry, _) => Decision::Allow,

        (PathClass::AdminArea, None) => Decision::RedirectAdminLogin,
        (PathClass::AdminArea, Some(role)) if role.is_administrative() => Decision::Allow,
        (PathClass::AdminArea, Some(_)) => Decision::RedirectHome,

        (PathClass::CitizenArea, None) => Decision::RedirectLogin,
        (PathClass::CitizenArea, Some(_)) => Decision::Allow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session::Role;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn session(role: Role) -> SessionRecord {
        SessionRecord::issue(Uuid::new_v4(), role, Utc::now(), Duration::days(7))
    }

    #[test]
    fn classification() {
        assert_eq!(PathClass::of("/login"), PathClass::CitizenAuth);
        assert_eq!(PathClass::of("/register/"), PathClass::CitizenAuth);
        assert_eq!(PathClass::of("/admin"), PathClass::AdminEntry);
        assert_eq!(PathClass::of("/admin/"), PathClass::AdminEntry);
        assert_eq!(PathClass::of("/admin/register"), PathClass::AdminEntry);
        assert_eq!(PathClass::of("/admin/dashboard"), PathClass::AdminArea);
        assert_eq!(PathClass::of("/admin/register/extra"), PathClass::AdminArea);
        assert_eq!(PathClass::of("/administration"), PathClass::Public);
        assert_eq!(PathClass::of("/nouvelle-demande"), PathClass::CitizenArea);
        assert_eq!(PathClass::of("/nouvelle-demande-mariage"), PathClass::CitizenArea);
        assert_eq!(PathClass::of("/suivi-demande"), PathClass::CitizenArea);
        assert_eq!(PathClass::of("/suivi-demande/42"), PathClass::Public);
        assert_eq!(PathClass::of("/"), PathClass::Public);
        assert_eq!(PathClass::of("/dashboard"), PathClass::Public);
    }

    #[test]
    fn citizen_auth_pages() {
        assert_eq!(decide("/login", None), Decision::Allow);
        assert_eq!(decide("/register", None), Decision::Allow);
        assert_eq!(decide("/login", Some(&session(Role::Citoyen))), Decision::RedirectHome);
        assert_eq!(decide("/register", Some(&session(Role::Agent))), Decision::RedirectHome);
    }

    #[test]
    fn admin_entry_pages() {
        assert_eq!(decide("/admin", None), Decision::Allow);
        assert_eq!(decide("/admin/register", None), Decision::Allow);
        assert_eq!(decide("/admin", Some(&session(Role::Citoyen))), Decision::Allow);
        assert_eq!(
            decide("/admin", Some(&session(Role::Administrateur))),
            Decision::RedirectAdminDashboard
        );
        assert_eq!(
            decide("/admin/register", Some(&session(Role::Agent))),
            Decision::RedirectAdminDashboard
        );
    }

    #[test]
    fn admin_area() {
        assert_eq!(decide("/admin/reports", None), Decision::RedirectAdminLogin);
        assert_eq!(decide("/admin/reports", Some(&session(Role::Citoyen))), Decision::RedirectHome);
        assert_eq!(decide("/admin/reports", Some(&session(Role::Administrateur))), Decision::Allow);
        assert_eq!(decide("/admin/dashboard", Some(&session(Role::Agent))), Decision::Allow);
    }

    #[test]
    fn citizen_area() {
        for path in ["/nouvelle-demande", "/nouvelle-demande-deces", "/suivi-demande"] {
            assert_eq!(decide(path, None), Decision::RedirectLogin);
            assert_eq!(decide(path, Some(&session(Role::Citoyen))), Decision::Allow);
            assert_eq!(decide(path, Some(&session(Role::Agent))), Decision::Allow);
        }
    }

    #[test]
    fn every_path_and_role_has_exactly_the_tabled_decision() {
        let paths = [
            "/", "/login", "/register", "/admin", "/admin/register", "/admin/x",
            "/nouvelle-demande", "/suivi-demande", "/dashboard", "/api/demandes",
        ];
        let roles = [None, Some(Role::Citoyen), Some(Role::Administrateur), Some(Role::Agent)];
        for path in paths {
            for role in roles {
                let s = role.map(session);
                let first = decide(path, s.as_ref());
                assert_eq!(first, decide(path, s.as_ref()));
                assert_eq!(first == Decision::Allow, first.location().is_none());
            }
        }
    }

    #[test]
    fn public_paths_always_pass() {
        for role in [None, Some(Role::Citoyen), Some(Role::Administrateur)] {
            let s = role.map(session);
            assert_eq!(decide("/", s.as_ref()), Decision::Allow);
            assert_eq!(decide("/dashboard", s.as_ref()), Decision::Allow);
        }
    }
}
