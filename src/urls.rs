//! Named URL routes.
//!
//! Every path the router serves is declared here once, so handlers and tests can
//! refer to routes by name with [`reverse`] instead of hardcoding paths.

pub const HOME: &str = "/";
pub const HEALTH: &str = "/health";
pub const MOVIE_DETAIL: &str = "/movies/:id/";

pub const API_LANGUAGES: &str = "/api/languages/";
pub const API_MOVIES: &str = "/api/movies/";
pub const API_SHOW: &str = "/api/shows/:id/";
pub const API_BOOK_SHOW: &str = "/api/shows/:id/bookings/";

pub const ADMIN_INDEX: &str = "/admin/";
pub const ADMIN_LOGIN: &str = "/admin/login/";
pub const ADMIN_LOGOUT: &str = "/admin/logout/";
pub const ADMIN_ADD_LANGUAGE: &str = "/admin/languages/";

/// Route name to path pattern
static ROUTES: &[(&str, &str)] = &[
    ("home", HOME),
    ("health", HEALTH),
    ("movie_detail", MOVIE_DETAIL),
    ("api_languages", API_LANGUAGES),
    ("api_movies", API_MOVIES),
    ("api_show", API_SHOW),
    ("book_show", API_BOOK_SHOW),
    ("admin_index", ADMIN_INDEX),
    ("admin_login", ADMIN_LOGIN),
    ("admin_logout", ADMIN_LOGOUT),
    ("admin_add_language", ADMIN_ADD_LANGUAGE),
];

/// Look up the path of a route that takes no parameters.
///
/// Returns `None` for unknown names and for parameterised routes.
pub fn reverse(name: &str) -> Option<&'static str> {
    ROUTES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, path)| *path)
        .filter(|path| !path.contains(':'))
}

/// Build the path of a route, substituting `:param` segments in order.
///
/// Returns `None` if the name is unknown or the argument count doesn't match.
pub fn reverse_with(name: &str, args: &[&str]) -> Option<String> {
    let pattern = ROUTES.iter().find(|(n, _)| *n == name)?.1;
    let mut args = args.iter();

    let segments: Option<Vec<String>> = pattern
        .split('/')
        .map(|segment| {
            if segment.starts_with(':') {
                args.next().map(|a| a.to_string())
            } else {
                Some(segment.to_string())
            }
        })
        .collect();

    if args.next().is_some() {
        return None;
    }
    segments.map(|s| s.join("/"))
}

/// Location of the admin login page that returns to `next` afterwards.
pub fn login_redirect(next: &str) -> String {
    format!("{}?next={}", ADMIN_LOGIN, safe_next(Some(next)))
}

/// Only local admin paths are accepted as post-login targets.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(n)
            if n.starts_with(ADMIN_INDEX)
                && !n.contains("//")
                && !n.contains('\\')
                && !n.to_ascii_lowercase().contains("%2e")
                && !n.split('/').any(|segment| segment == "." || segment == "..") =>
        {
            n
        }
        _ => ADMIN_INDEX,
    }
}
