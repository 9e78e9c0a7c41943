//! Identifier parsing
//!
//! Ids cross the core boundary as strings. They are validated here, before
//! any lookup, and only the canonical hyphenated UUID form is accepted.

use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

const CANONICAL_LEN: usize = 36;

/// Parse a single id.
///
/// # Arguments
///
/// * `kind` - What the id refers to, for the error message
/// * `raw` - Hyphenated UUID, surrounding whitespace allowed
///
/// # Example
///
/// ```
/// use bulletin_access::ids::parse_id;
///
/// let id = parse_id("template", "0190a5b2-8f3e-7cc1-9d2e-5b1f0a4c3d21").unwrap();
/// assert_eq!(id.to_string(), "0190a5b2-8f3e-7cc1-9d2e-5b1f0a4c3d21");
///
/// assert!(parse_id("template", "0190a5b28f3e7cc19d2e5b1f0a4c3d21").is_err());
/// assert!(parse_id("template", "64b7f0c2e1a9d3f5a8b6c4d2").is_err());
/// ```
pub fn parse_id(kind: &str, raw: &str) -> CoreResult<Uuid> {
    let trimmed = raw.trim();
    if trimmed.len() != CANONICAL_LEN {
        return Err(invalid(kind, trimmed));
    }
    Uuid::try_parse(trimmed).map_err(|_| invalid(kind, trimmed))
}

/// Parse a comma-separated list of ids.
///
/// Blank entries are skipped. Every malformed entry is reported in the
/// same error.
///
/// # Example
///
/// ```
/// use bulletin_access::ids::parse_ids;
///
/// let ids = parse_ids(
///     "group",
///     "0190a5b2-8f3e-7cc1-9d2e-5b1f0a4c3d21, ,0190a5b2-8f3e-7cc1-9d2e-5b1f0a4c3d22",
/// )
/// .unwrap();
/// assert_eq!(ids.len(), 2);
/// assert!(parse_ids("group", "").unwrap().is_empty());
/// ```
pub fn parse_ids(kind: &str, raw: &str) -> CoreResult<Vec<Uuid>> {
    let mut ids = Vec::new();
    let mut invalid_entries = Vec::new();

    for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match parse_id(kind, entry) {
            Ok(id) => ids.push(id),
            Err(_) => invalid_entries.push(entry),
        }
    }

    if invalid_entries.is_empty() {
        Ok(ids)
    } else {
        Err(CoreError::InvalidArgument(format!(
            "invalid {kind} ids: {}",
            invalid_entries.join(", ")
        )))
    }
}

fn invalid(kind: &str, raw: &str) -> CoreError {
    CoreError::InvalidArgument(format!("invalid {kind} id: '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_accepts_canonical_forms() {
        let id = Uuid::now_v7();
        assert_eq!(parse_id("master", &id.to_string()).unwrap(), id);
        assert_eq!(parse_id("master", &format!("  {id} ")).unwrap(), id);
        assert_eq!(parse_id("master", &id.to_string().to_uppercase()).unwrap(), id);
    }

    #[test]
    fn test_parse_id_rejects_non_canonical() {
        let id = Uuid::now_v7();
        let simple = id.simple().to_string();
        let braced = id.braced().to_string();
        for raw in ["", "abc", simple.as_str(), braced.as_str(), "zzzzzzzz-zzzz-zzzz-zzzz-zzzzzzzzzzzz"] {
            let err = parse_id("master", raw).unwrap_err();
            assert_eq!(err.error_code(), "INVALID_ARGUMENT");
        }
    }

    #[test]
    fn test_parse_ids_reports_all_invalid() {
        let id = Uuid::now_v7();
        let err = parse_ids("group", &format!("{id},bad,worse")).unwrap_err();
        match err {
            CoreError::InvalidArgument(msg) => {
                assert!(msg.contains("bad"));
                assert!(msg.contains("worse"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
