//! Column-name normalisation shared by schema validation and the resolver

/// Trim, lowercase and collapse internal whitespace runs to one space.
///
/// `"  Churn   Risk "` → `"churn risk"`
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercase with every separator removed; the fuzzy-match key.
///
/// `"Churn-Prob"`, `"churn prob"` and `"churn_prob"` all map to `"churnprob"`.
pub fn separator_key(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '_' | '-' | '.'))
        .flat_map(char::to_lowercase)
        .collect()
}
