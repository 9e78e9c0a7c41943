//! Atomic field updates
//!
//! A [`Patch`] is a set of top-level field assignments guarded by optional
//! equality preconditions. Backends apply a patch to a single document
//! atomically: either every precondition holds and every assignment lands,
//! or nothing changes.

use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::document::Collection;
use crate::store::{StoreError, StoreResult};

/// Field name that no patch may assign.
const ID_FIELD: &str = "id";

/// Guarded top-level field assignments for one document.
///
/// # Examples
///
/// ```
/// use bulletin_store::Patch;
/// use serde_json::json;
///
/// // Compare-and-set: advance the pointer only if nobody else moved it.
/// let patch = Patch::new()
///     .when("current_version_id", json!(null))
///     .set("current_version_id", "v-1");
/// assert!(!patch.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    preconditions: Vec<(String, Value)>,
    sets: Vec<(String, Value)>,
}

impl Patch {
    /// Create an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `value` to `field`.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.sets.push((field.into(), value.into()));
        self
    }

    /// Assign any serializable value to `field`.
    pub fn set_serialized<T: Serialize>(self, field: impl Into<String>, value: &T) -> StoreResult<Self> {
        let value = serde_json::to_value(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(self.set(field, value))
    }

    /// Require `field` to currently equal `expected` (absent fields equal
    /// `null`).
    pub fn when(mut self, field: impl Into<String>, expected: impl Into<Value>) -> Self {
        self.preconditions.push((field.into(), expected.into()));
        self
    }

    /// Build the patch that turns `old` into `new`.
    ///
    /// Every changed top-level field is assigned its new value and guarded
    /// by its old value, so the patch fails if a concurrent writer touched
    /// any of the same fields. Fields missing from `new` are set to `null`.
    pub fn between(old: &Value, new: &Value) -> StoreResult<Self> {
        let (Value::Object(old), Value::Object(new)) = (old, new) else {
            return Err(StoreError::InvalidPatch(
                "patch diff requires two JSON objects".to_string(),
            ));
        };

        let mut patch = Patch::new();
        for (field, value) in new {
            if field == ID_FIELD {
                continue;
            }
            let previous = old.get(field).unwrap_or(&Value::Null);
            if previous != value {
                patch = patch.when(field.clone(), previous.clone()).set(field.clone(), value.clone());
            }
        }
        for (field, previous) in old {
            if field != ID_FIELD && !new.contains_key(field) && !previous.is_null() {
                patch = patch.when(field.clone(), previous.clone()).set(field.clone(), Value::Null);
            }
        }
        Ok(patch)
    }

    /// Check if the patch assigns nothing.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Field assignments in application order.
    pub fn sets(&self) -> &[(String, Value)] {
        &self.sets
    }

    /// Preconditions checked before any assignment.
    pub fn preconditions(&self) -> &[(String, Value)] {
        &self.preconditions
    }

    /// Apply the patch to a document's JSON form in place.
    ///
    /// The document is left untouched when an error is returned.
    pub fn apply(&self, collection: Collection, id: Uuid, doc: &mut Value) -> StoreResult<()> {
        let Value::Object(map) = doc else {
            return Err(StoreError::Serialization(format!(
                "{collection}/{id} is not a JSON object"
            )));
        };

        if let Some((field, _)) = self.sets.iter().find(|(field, _)| field == ID_FIELD) {
            return Err(StoreError::InvalidPatch(format!("field '{field}' is immutable")));
        }

        for (field, expected) in &self.preconditions {
            if map.get(field).unwrap_or(&Value::Null) != expected {
                return Err(StoreError::PreconditionFailed {
                    collection,
                    id,
                    field: field.clone(),
                });
            }
        }

        apply_sets(map, &self.sets);
        Ok(())
    }
}

fn apply_sets(map: &mut Map<String, Value>, sets: &[(String, Value)]) {
    for (field, value) in sets {
        map.insert(field.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_apply_sets_fields() {
        let id = Uuid::now_v7();
        let mut doc = json!({"id": id.to_string(), "name": "a", "status": "draft"});
        Patch::new()
            .set("status", "published")
            .apply(Collection::Templates, id, &mut doc)
            .unwrap();
        assert_eq!(doc["status"], "published");
        assert_eq!(doc["name"], "a");
    }

    #[test]
    fn test_failed_precondition_leaves_document_untouched() {
        let id = Uuid::now_v7();
        let mut doc = json!({"id": id.to_string(), "current_version_id": "v-1"});
        let before = doc.clone();

        let err = Patch::new()
            .when("current_version_id", Value::Null)
            .set("current_version_id", "v-2")
            .apply(Collection::Templates, id, &mut doc)
            .unwrap_err();

        assert!(matches!(err, StoreError::PreconditionFailed { ref field, .. } if field == "current_version_id"));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_absent_field_equals_null() {
        let id = Uuid::now_v7();
        let mut doc = json!({"id": id.to_string()});
        Patch::new()
            .when("current_version_id", Value::Null)
            .set("current_version_id", "v-1")
            .apply(Collection::Bulletins, id, &mut doc)
            .unwrap();
        assert_eq!(doc["current_version_id"], "v-1");
    }

    #[test]
    fn test_id_is_immutable() {
        let id = Uuid::now_v7();
        let mut doc = json!({"id": id.to_string()});
        let err = Patch::new()
            .set("id", "other")
            .apply(Collection::Cards, id, &mut doc)
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidPatch(_)));
    }

    #[test]
    fn test_between_guards_changed_fields_only() {
        let old = json!({"id": "x", "name": "a", "status": "draft", "note": "keep"});
        let new = json!({"id": "x", "name": "b", "status": "draft"});
        let patch = Patch::between(&old, &new).unwrap();

        assert_eq!(
            patch.sets(),
            &[("name".to_string(), json!("b")), ("note".to_string(), Value::Null)]
        );
        assert_eq!(
            patch.preconditions(),
            &[("name".to_string(), json!("a")), ("note".to_string(), json!("keep"))]
        );
    }

    #[test]
    fn test_between_identical_is_empty() {
        let doc = json!({"id": "x", "name": "a"});
        assert!(Patch::between(&doc, &doc).unwrap().is_empty());
        assert!(Patch::between(&json!(1), &doc).is_err());
    }
}
