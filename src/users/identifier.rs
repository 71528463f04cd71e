//! User identifier resolution.

/// Resolve the user identifier for an update request.
///
/// The route binding wins when it is present and non-empty. Otherwise the
/// final `/`-separated segment of `request_path` is used; any query string
/// or fragment is ignored. Returns `None` when both come up empty.
///
/// ```rust
/// use users_api::users::resolve_user_id;
///
/// assert_eq!(resolve_user_id(Some("u1"), "/users/ignored"), Some("u1".to_string()));
/// assert_eq!(resolve_user_id(None, "/api/users/u2?x=1"), Some("u2".to_string()));
/// assert_eq!(resolve_user_id(None, "/users/"), None);
/// ```
pub fn resolve_user_id(route_binding: Option<&str>, request_path: &str) -> Option<String> {
    if let Some(id) = route_binding.filter(|id| !id.is_empty()) {
        return Some(id.to_string());
    }

    let path = request_path
        .split(['?', '#'])
        .next()
        .unwrap_or_default();

    path.rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}
