//! Query predicates
//!
//! A [`Filter`] is a storage-agnostic predicate over a document's JSON form.
//! Backends may translate it into their native query language; the
//! in-memory backend evaluates it directly with [`Filter::matches`].
//!
//! Paths are dotted field names (`access_config.access_type`). A path step
//! that lands on an array fans out over its elements, so
//! `users_access.user_id` reaches the `user_id` of every member entry,
//! and a leaf array matches if any of its elements does.

use serde_json::Value;
use uuid::Uuid;

/// Predicate over documents.
///
/// # Examples
///
/// ```
/// use bulletin_store::Filter;
/// use serde_json::json;
///
/// let doc = json!({
///     "name": "Weekly Climate Bulletin",
///     "status": "draft",
///     "access_config": {"access_type": "restricted", "allowed_groups": ["g1", "g2"]}
/// });
///
/// assert!(Filter::eq("status", "draft").matches(&doc));
/// assert!(Filter::contains_text("name", "climate").matches(&doc));
/// assert!(Filter::any_in("access_config.allowed_groups", vec![json!("g2")]).matches(&doc));
/// assert!(!Filter::eq("status", "published").matches(&doc));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Filter {
    /// Matches every document.
    #[default]
    All,
    /// Field equals the value.
    Eq(String, Value),
    /// String field contains the needle, case-insensitively.
    ContainsText(String, String),
    /// Field equals any of the values.
    AnyIn(String, Vec<Value>),
    /// All sub-filters match.
    And(Vec<Filter>),
    /// At least one sub-filter matches.
    Or(Vec<Filter>),
    /// The sub-filter does not match.
    Not(Box<Filter>),
}

impl Filter {
    /// Field equality.
    pub fn eq(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(path.into(), value.into())
    }

    /// Case-insensitive substring match on a string field.
    pub fn contains_text(path: impl Into<String>, needle: impl Into<String>) -> Self {
        Filter::ContainsText(path.into(), needle.into())
    }

    /// Field equals any of `values`.
    pub fn any_in(path: impl Into<String>, values: Vec<Value>) -> Self {
        Filter::AnyIn(path.into(), values)
    }

    /// Match the document with the given id.
    pub fn id(id: Uuid) -> Self {
        Self::uuid_eq("id", id)
    }

    /// Field equals the given UUID.
    pub fn uuid_eq(path: impl Into<String>, id: Uuid) -> Self {
        Filter::Eq(path.into(), Value::String(id.to_string()))
    }

    /// Field equals any of the given UUIDs.
    pub fn uuid_in<'a>(path: impl Into<String>, ids: impl IntoIterator<Item = &'a Uuid>) -> Self {
        Filter::AnyIn(
            path.into(),
            ids.into_iter().map(|id| Value::String(id.to_string())).collect(),
        )
    }

    /// Free-text search: any non-blank term found in any of `fields`.
    ///
    /// Matches everything when no term is given.
    pub fn search<T: AsRef<str>>(terms: &[T], fields: &[&str]) -> Self {
        let clauses: Vec<Filter> = terms
            .iter()
            .map(|t| t.as_ref().trim())
            .filter(|t| !t.is_empty())
            .flat_map(|term| fields.iter().map(move |field| Filter::contains_text(*field, term)))
            .collect();
        if clauses.is_empty() {
            Filter::All
        } else {
            Filter::Or(clauses)
        }
    }

    /// Conjunction of `self` and `other`, flattening nested `And`s and
    /// dropping `All`.
    pub fn and(self, other: Filter) -> Self {
        match (self, other) {
            (Filter::All, f) | (f, Filter::All) => f,
            (Filter::And(mut a), Filter::And(b)) => {
                a.extend(b);
                Filter::And(a)
            }
            (Filter::And(mut a), f) => {
                a.push(f);
                Filter::And(a)
            }
            (f, Filter::And(mut b)) => {
                b.insert(0, f);
                Filter::And(b)
            }
            (a, b) => Filter::And(vec![a, b]),
        }
    }

    /// Negation of `self`.
    pub fn negate(self) -> Self {
        Filter::Not(Box::new(self))
    }

    /// Evaluate the filter against a document's JSON form.
    pub fn matches(&self, doc: &Value) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq(path, expected) => resolve(doc, path).iter().any(|v| *v == expected),
            Filter::ContainsText(path, needle) => {
                let needle = needle.to_lowercase();
                resolve(doc, path)
                    .iter()
                    .filter_map(|v| v.as_str())
                    .any(|s| s.to_lowercase().contains(&needle))
            }
            Filter::AnyIn(path, values) => resolve(doc, path)
                .iter()
                .any(|v| values.iter().any(|candidate| candidate == *v)),
            Filter::And(filters) => filters.iter().all(|f| f.matches(doc)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(doc)),
            Filter::Not(filter) => !filter.matches(doc),
        }
    }
}

/// Collect every value reachable at `path`, fanning out over arrays.
fn resolve<'a>(doc: &'a Value, path: &str) -> Vec<&'a Value> {
    let mut current = vec![doc];
    for segment in path.split('.') {
        let mut next = Vec::new();
        for value in current {
            match value {
                Value::Object(map) => next.extend(map.get(segment)),
                Value::Array(items) => {
                    for item in items {
                        if let Value::Object(map) = item {
                            next.extend(map.get(segment));
                        }
                    }
                }
                _ => {}
            }
        }
        current = next;
    }

    // Leaf arrays match element-wise as well as whole.
    let mut leaves = Vec::with_capacity(current.len());
    for value in current {
        leaves.push(value);
        if let Value::Array(items) = value {
            leaves.extend(items.iter());
        }
    }
    leaves
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn group_doc() -> Value {
        json!({
            "id": "g-1",
            "group_name": "Regional Office",
            "country": "CO",
            "users_access": [
                {"user_id": "a-1", "role_id": "r-admin"},
                {"user_id": "a-2", "role_id": "r-editor"}
            ]
        })
    }

    #[test]
    fn test_eq_and_nested_array_fan_out() {
        let doc = group_doc();
        assert!(Filter::eq("users_access.user_id", "a-2").matches(&doc));
        assert!(!Filter::eq("users_access.user_id", "a-3").matches(&doc));
        assert!(Filter::eq("country", "CO").matches(&doc));
    }

    #[test]
    fn test_default_matches_everything() {
        assert_eq!(Filter::default(), Filter::All);
        assert!(Filter::default().matches(&group_doc()));
    }

    #[test]
    fn test_missing_path_never_matches() {
        let doc = group_doc();
        assert!(!Filter::eq("nope.deeper", "x").matches(&doc));
        assert!(!Filter::contains_text("nope", "x").matches(&doc));
        assert!(Filter::eq("nope", "x").negate().matches(&doc));
    }

    #[test]
    fn test_contains_text_is_case_insensitive() {
        let doc = group_doc();
        assert!(Filter::contains_text("group_name", "REGIONAL").matches(&doc));
        assert!(!Filter::contains_text("group_name", "national").matches(&doc));
    }

    #[test]
    fn test_any_in_against_leaf_array() {
        let doc = json!({"allowed_groups": ["g1", "g2"]});
        assert!(Filter::any_in("allowed_groups", vec![json!("g9"), json!("g2")]).matches(&doc));
        assert!(!Filter::any_in("allowed_groups", vec![json!("g9")]).matches(&doc));
        assert!(!Filter::any_in("allowed_groups", vec![]).matches(&doc));
    }

    #[test]
    fn test_uuid_helpers() {
        let id = Uuid::now_v7();
        let doc = json!({"id": id.to_string(), "refs": [id.to_string()]});
        assert!(Filter::id(id).matches(&doc));
        assert!(Filter::uuid_in("refs", [&id]).matches(&doc));
        assert!(!Filter::id(Uuid::now_v7()).matches(&doc));
    }

    #[test]
    fn test_and_flattens() {
        let f = Filter::All
            .and(Filter::eq("a", 1))
            .and(Filter::eq("b", 2))
            .and(Filter::All);
        assert_eq!(f, Filter::And(vec![Filter::eq("a", 1), Filter::eq("b", 2)]));

        assert!(f.matches(&json!({"a": 1, "b": 2})));
        assert!(!f.matches(&json!({"a": 1, "b": 3})));
    }

    #[test]
    fn test_or() {
        let f = Filter::Or(vec![Filter::eq("status", "draft"), Filter::eq("status", "review")]);
        assert!(f.matches(&json!({"status": "review"})));
        assert!(!f.matches(&json!({"status": "published"})));
    }

    #[test]
    fn test_search_across_fields() {
        let doc = json!({"name": "Rainfall outlook", "description": "Monthly"});
        let f = Filter::search(&["drought", " monthly "], &["name", "description"]);
        assert!(f.matches(&doc));
        assert!(!Filter::search(&["drought"], &["name", "description"]).matches(&doc));
        assert_eq!(Filter::search(&["  "], &["name"]), Filter::All);
    }
}
