use std::fmt;

use crate::catalog::Catalog;
use crate::notify::Notification;
use crate::types::UserProfile;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Landing,
    Login,
    Signup,
    AdminLogin,
    ProfileSetup,
    Dashboard,
    AdminDashboard,
    Roadmap(String),
    NotFound(String),
}

impl Route {
    /// Unknown paths map to [`Route::NotFound`].
    pub fn parse(path: &str) -> Route {
        let trimmed = path.trim();
        let normalized = if trimmed.len() > 1 {
            trimmed.trim_end_matches('/')
        } else {
            trimmed
        };
        match normalized {
            "" | "/" => Route::Landing,
            "/login" => Route::Login,
            "/signup" => Route::Signup,
            "/admin-login" => Route::AdminLogin,
            "/profile-setup" => Route::ProfileSetup,
            "/dashboard" => Route::Dashboard,
            "/admin-dashboard" => Route::AdminDashboard,
            other => match other.strip_prefix("/roadmap/") {
                Some(id) if !id.is_empty() && !id.contains('/') => Route::Roadmap(id.to_string()),
                _ => Route::NotFound(other.to_string()),
            },
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Landing => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Signup => "/signup".to_string(),
            Route::AdminLogin => "/admin-login".to_string(),
            Route::ProfileSetup => "/profile-setup".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::AdminDashboard => "/admin-dashboard".to_string(),
            Route::Roadmap(id) => format!("/roadmap/{id}"),
            Route::NotFound(path) => path.clone(),
        }
    }

    /// Where a freshly logged-in user lands.
    pub fn home_for(profile: &UserProfile) -> Route {
        if profile.is_admin() {
            Route::AdminDashboard
        } else {
            Route::Dashboard
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub route: Route,
    pub notice: Option<Notification>,
}

impl Resolution {
    fn to(route: Route) -> Self {
        Self { route, notice: None }
    }
}

/// Applies the access rules of each page and returns the route to render.
pub fn resolve(route: Route, profile: Option<&UserProfile>, catalog: &Catalog) -> Resolution {
    let resolution = match (&route, profile) {
        (Route::ProfileSetup | Route::Dashboard | Route::Roadmap(_), None) => {
            Resolution::to(Route::Login)
        }
        (Route::AdminDashboard, Some(p)) if p.is_admin() => Resolution::to(route.clone()),
        (Route::AdminDashboard, _) => Resolution {
            route: Route::Login,
            notice: Some(Notification::destructive(
                "Access Denied",
                "You must be an administrator to access this page.",
            )),
        },
        (Route::Roadmap(id), Some(_)) if catalog.roadmap(id).is_none() => {
            Resolution::to(Route::Dashboard)
        }
        _ => Resolution::to(route.clone()),
    };
    if resolution.route != route {
        tracing::debug!(from = %route, to = %resolution.route, "redirect");
    }
    resolution
}
