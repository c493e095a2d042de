use crate::app::AppState;
use crate::catalog::filter_books;

/// Rebuild the visible book and user lists from the full snapshots using
/// the current search query.
pub fn apply_search(app: &mut AppState) {
    let q = app.search_query.trim().to_lowercase();
    app.books = filter_books(&app.books_all, &q);
    if q.is_empty() {
        app.users = app.users_all.clone();
    } else {
        app.users = app
            .users_all
            .iter()
            .filter(|u| {
                u.username.to_lowercase().contains(&q)
                    || u.full_name.to_lowercase().contains(&q)
                    || u.email.to_lowercase().contains(&q)
            })
            .cloned()
            .collect();
    }
    app.selected_book_index = app.selected_book_index.min(app.books.len().saturating_sub(1));
    app.selected_user_index = app.selected_user_index.min(app.users.len().saturating_sub(1));
}
