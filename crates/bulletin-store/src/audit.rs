//! Audit log sub-document

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who created a document and who last touched it.
///
/// # Examples
///
/// ```
/// use bulletin_store::AuditLog;
/// use uuid::Uuid;
///
/// let creator = Uuid::now_v7();
/// let editor = Uuid::now_v7();
///
/// let log = AuditLog::new(creator);
/// let touched = log.touched_by(editor);
/// assert_eq!(touched.creator_user_id, creator);
/// assert_eq!(touched.updater_user_id, Some(editor));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditLog {
    /// Actor who created the document
    pub creator_user_id: Uuid,

    /// When the document was created
    pub created_at: DateTime<Utc>,

    /// Actor who last updated the document
    pub updater_user_id: Option<Uuid>,

    /// When the document was last updated
    pub updated_at: Option<DateTime<Utc>>,
}

impl AuditLog {
    /// Start a log for a document created now by `creator`.
    pub fn new(creator: Uuid) -> Self {
        Self {
            creator_user_id: creator,
            created_at: Utc::now(),
            updater_user_id: None,
            updated_at: None,
        }
    }

    /// Return a copy recording an update by `updater` now.
    ///
    /// Creator and creation time are preserved.
    pub fn touched_by(&self, updater: Uuid) -> Self {
        Self {
            creator_user_id: self.creator_user_id,
            created_at: self.created_at,
            updater_user_id: Some(updater),
            updated_at: Some(Utc::now()),
        }
    }

    /// Time of the latest change (update if any, otherwise creation).
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }
}
