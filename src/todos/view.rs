//! Filtered, sorted projection of the item collection.

use crate::models::{FilterSpec, SortKey, Todo};
use std::cmp::Ordering;

/// Applies the four filter stages in order (completion, text, priority, category),
/// then a stable sort. The source slice is never reordered.
pub fn derive_view<'a>(items: &'a [Todo], filter: &FilterSpec) -> Vec<&'a Todo> {
    // Whitespace-only means no search; otherwise the query is matched as typed.
    let blank = filter.query.trim().is_empty();
    let query = filter.query.to_lowercase();

    let mut view: Vec<&Todo> = items
        .iter()
        .filter(|todo| filter.completion.accepts(todo))
        .filter(|todo| blank || matches_query(todo, &query))
        .filter(|todo| filter.priority.is_none_or(|p| todo.priority == p))
        .filter(|todo| filter.category.is_none_or(|c| todo.category == c))
        .collect();

    // `sort_by` is stable, so ties keep collection order.
    match filter.sort {
        SortKey::Priority => view.sort_by_key(|todo| todo.priority.rank()),
        SortKey::Title => view.sort_by(|a, b| compare_titles(&a.title, &b.title)),
        SortKey::Date => view.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
    view
}

/// `query` must already be lowercased.
fn matches_query(todo: &Todo, query: &str) -> bool {
    todo.title.to_lowercase().contains(query)
        || todo
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(query))
}

/// Case-insensitive first; on a tie lowercase sorts before uppercase, as a
/// locale-aware comparison would.
fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}
