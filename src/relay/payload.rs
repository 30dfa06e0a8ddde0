use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Utc};

use crate::config::NotificationConfig;
use crate::push::{AndroidConfig, ApnsConfig, Notification, PushMessage};

use super::FingerprintAuth;

/// Render an instant as `11:08 PM UTC+05:00 on Tuesday, May 13, 2025`.
pub fn format_event_time(at: DateTime<Utc>, offset: FixedOffset) -> String {
    let local = at.with_timezone(&offset);
    let zone = if offset.local_minus_utc() == 0 {
        "UTC".to_string()
    } else {
        format!("UTC{}", offset)
    };
    format!(
        "{} {} on {}",
        local.format("%-I:%M %p"),
        zone,
        local.format("%A, %B %-d, %Y")
    )
}

/// Builds the push message sent to the admin's device.
#[derive(Debug, Clone)]
pub struct MessageComposer {
    title: String,
    click_action: String,
    android_channel_id: String,
}

impl MessageComposer {
    pub fn new(config: &NotificationConfig) -> Self {
        Self {
            title: config.title.clone(),
            click_action: config.click_action.clone(),
            android_channel_id: config.android_channel_id.clone(),
        }
    }

    pub fn compose(&self, auth: &FingerprintAuth, offset: FixedOffset, token: &str) -> PushMessage {
        let body = format!(
            "{} has authenticated for task {} at {}",
            auth.member_name,
            auth.task_id,
            format_event_time(auth.authenticated_at, offset)
        );

        // Keys are read by the mobile client to route the tap
        let mut data = BTreeMap::new();
        data.insert("click_action".to_string(), self.click_action.clone());
        data.insert("taskId".to_string(), auth.task_id.clone());
        data.insert("teamDocId".to_string(), auth.team_doc_id.clone());

        PushMessage {
            token: token.to_string(),
            notification: Some(Notification {
                title: self.title.clone(),
                body,
            }),
            data,
            android: Some(AndroidConfig::high_priority(&self.android_channel_id)),
            apns: Some(ApnsConfig::immediate_content_available()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn create_test_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 13, 18, 8, 0).unwrap()
    }

    #[test]
    fn test_format_event_time_with_offset() {
        let pkt = FixedOffset::east_opt(5 * 3600).unwrap();
        assert_eq!(
            format_event_time(create_test_instant(), pkt),
            "11:08 PM UTC+05:00 on Tuesday, May 13, 2025"
        );
    }

    #[test]
    fn test_format_event_time_in_utc() {
        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(
            format_event_time(create_test_instant(), utc),
            "6:08 PM UTC on Tuesday, May 13, 2025"
        );
    }

    #[test]
    fn test_negative_offset_crosses_date_line() {
        let at = Utc.with_ymd_and_hms(2025, 5, 14, 2, 30, 0).unwrap();
        let edt = FixedOffset::west_opt(4 * 3600).unwrap();
        assert_eq!(
            format_event_time(at, edt),
            "10:30 PM UTC-04:00 on Tuesday, May 13, 2025"
        );
    }

    #[test]
    fn test_compose_full_message() {
        let composer = MessageComposer::new(&NotificationConfig::default());
        let auth = FingerprintAuth {
            task_id: "T1".to_string(),
            team_doc_id: "D1".to_string(),
            member_name: "Alice".to_string(),
            admin_uid: "U1".to_string(),
            authenticated_at: create_test_instant(),
        };
        let message = composer.compose(&auth, FixedOffset::east_opt(5 * 3600).unwrap(), "tok-123");

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "token": "tok-123",
                "notification": {
                    "title": "Fingerprint Authentication",
                    "body": "Alice has authenticated for task T1 at 11:08 PM UTC+05:00 on Tuesday, May 13, 2025"
                },
                "data": {
                    "click_action": "FLUTTER_NOTIFICATION_CLICK",
                    "taskId": "T1",
                    "teamDocId": "D1"
                },
                "android": {
                    "priority": "HIGH",
                    "notification": {"channel_id": "fingerprint_auth_channel"}
                },
                "apns": {
                    "headers": {"apns-priority": "10"},
                    "payload": {"aps": {"content-available": 1}}
                }
            })
        );
    }
}
