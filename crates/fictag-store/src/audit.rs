use crate::error::Result;
use fictag_core::domain::{Tag, User};

/// Identifies the object an audit entry is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditObject {
    pub object_type: &'static str,
    pub object_id: i64,
    pub repr: String,
}

impl From<&Tag> for AuditObject {
    fn from(tag: &Tag) -> Self {
        Self {
            object_type: "tag",
            object_id: tag.id.get(),
            repr: tag.name.clone(),
        }
    }
}

/// Moderation log sink.
pub trait AuditSink {
    fn log_addition(&self, by: &User, what: &AuditObject) -> Result<()>;
    fn log_changed_fields(&self, by: &User, what: &AuditObject, fields: &[&str]) -> Result<()>;
    fn log_changed_generic(&self, by: &User, what: &AuditObject, message: &str) -> Result<()>;
    fn log_deletion(&self, by: &User, what: &AuditObject) -> Result<()>;
}
