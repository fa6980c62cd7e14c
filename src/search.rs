use crate::app::AppState;
use crate::model::User;

/// Case-insensitive substring match over the columns the table shows.
pub fn user_matches(user: &User, query_lower: &str) -> bool {
    query_lower.is_empty()
        || user.name.to_lowercase().contains(query_lower)
        || user.email.to_lowercase().contains(query_lower)
        || user.phone.to_lowercase().contains(query_lower)
        || user.address.city.to_lowercase().contains(query_lower)
        || user.address.zipcode.to_lowercase().contains(query_lower)
        || user.id.to_string().contains(query_lower)
}

/// Rebuild `app.users` from the last store snapshot and clamp the selection.
pub fn apply_search(app: &mut AppState) {
    let q = app.search_query.to_lowercase();
    app.users = app
        .snapshot
        .users
        .iter()
        .filter(|u| user_matches(u, &q))
        .cloned()
        .collect();
    app.selected_user_index = app.selected_user_index.min(app.users.len().saturating_sub(1));
}
