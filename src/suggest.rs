pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

/// Filters `names` down to the ones containing `query`, ignoring case.
///
/// Source order is kept and the result holds at most `limit` names. An empty
/// query hides suggestions rather than listing everything.
pub fn suggest(query: &str, names: &[String], limit: usize) -> Vec<String> {
    if query.is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    names
        .iter()
        .filter(|name| name.to_lowercase().contains(&needle))
        .take(limit)
        .cloned()
        .collect()
}
