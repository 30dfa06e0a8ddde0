use chrono::{DateTime, Utc};

use crate::firestore::{Document, DocumentPath};

/// A newly created trigger document, as handed over by the event source.
#[derive(Debug, Clone)]
pub struct TriggerEvent {
    /// Where the trigger lives; enough to delete it
    pub path: DocumentPath,
    pub document: Document,
    /// Event time reported by the delivery platform, if any
    pub event_time: Option<DateTime<Utc>>,
}

impl TriggerEvent {
    pub fn new(path: DocumentPath, document: Document) -> Self {
        Self {
            path,
            document,
            event_time: None,
        }
    }

    pub fn with_event_time(mut self, event_time: DateTime<Utc>) -> Self {
        self.event_time = Some(event_time);
        self
    }

    /// Creation time of the trigger: document `createTime`, then the event time, then now
    pub fn created_at(&self) -> DateTime<Utc> {
        self.document
            .create_time
            .or(self.event_time)
            .unwrap_or_else(Utc::now)
    }
}

/// Fields of a trigger document. Anything may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerRecord {
    pub trigger_type: Option<String>,
    pub task_id: Option<String>,
    pub team_doc_id: Option<String>,
    pub member_name: Option<String>,
    pub admin_uid: Option<String>,
}

/// A `fingerprint_auth` trigger with every field present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintAuth {
    pub task_id: String,
    pub team_doc_id: String,
    pub member_name: String,
    pub admin_uid: String,
    pub authenticated_at: DateTime<Utc>,
}

impl TriggerRecord {
    pub fn from_document(document: &Document) -> Self {
        let field = |key: &str| document.string_field(key).map(str::to_string);
        Self {
            trigger_type: field("type"),
            task_id: field("taskId"),
            team_doc_id: field("teamDocId"),
            member_name: field("memberName"),
            admin_uid: field("adminUid"),
        }
    }

    pub fn is_type(&self, trigger_type: &str) -> bool {
        self.trigger_type.as_deref() == Some(trigger_type)
    }

    /// Require every field to be a non-empty string; `Err` lists the missing ones
    pub fn into_fingerprint_auth(
        self,
        authenticated_at: DateTime<Utc>,
    ) -> Result<FingerprintAuth, Vec<&'static str>> {
        fn present(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        let task_id = present(self.task_id);
        let team_doc_id = present(self.team_doc_id);
        let member_name = present(self.member_name);
        let admin_uid = present(self.admin_uid);

        match (task_id, team_doc_id, member_name, admin_uid) {
            (Some(task_id), Some(team_doc_id), Some(member_name), Some(admin_uid)) => {
                Ok(FingerprintAuth {
                    task_id,
                    team_doc_id,
                    member_name,
                    admin_uid,
                    authenticated_at,
                })
            }
            (task_id, team_doc_id, member_name, admin_uid) => {
                let mut missing = Vec::new();
                if task_id.is_none() {
                    missing.push("taskId");
                }
                if team_doc_id.is_none() {
                    missing.push("teamDocId");
                }
                if member_name.is_none() {
                    missing.push("memberName");
                }
                if admin_uid.is_none() {
                    missing.push("adminUid");
                }
                Err(missing)
            }
        }
    }
}
