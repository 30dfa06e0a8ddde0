//! FCM HTTP v1 message model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A message addressed to one device registration token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushMessage {
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
    /// String-to-string payload delivered to the client app
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android: Option<AndroidConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apns: Option<ApnsConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum AndroidPriority {
    #[default]
    Normal,
    /// Wakes a dozing device
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AndroidConfig {
    pub priority: AndroidPriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<AndroidNotification>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AndroidNotification {
    pub channel_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApnsConfig {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    pub payload: ApnsPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApnsPayload {
    pub aps: Aps,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aps {
    /// `1` lets the app process the message in the background
    #[serde(rename = "content-available", skip_serializing_if = "Option::is_none")]
    pub content_available: Option<u8>,
}

impl AndroidConfig {
    /// High priority delivery through a named notification channel
    pub fn high_priority(channel_id: impl Into<String>) -> Self {
        Self {
            priority: AndroidPriority::High,
            notification: Some(AndroidNotification {
                channel_id: channel_id.into(),
            }),
        }
    }
}

impl ApnsConfig {
    /// Immediate delivery (`apns-priority: 10`) with a background-wakeable payload
    pub fn immediate_content_available() -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("apns-priority".to_string(), "10".to_string());
        Self {
            headers,
            payload: ApnsPayload {
                aps: Aps {
                    content_available: Some(1),
                },
            },
        }
    }
}

/// Body of `projects/{project}/messages:send`
#[derive(Debug, Serialize)]
pub(crate) struct SendRequest<'a> {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub validate_only: bool,
    pub message: &'a PushMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SendResponse {
    /// `projects/{project}/messages/{message_id}`
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_platform_configs_serialize_to_fcm_shape() {
        let android = serde_json::to_value(AndroidConfig::high_priority("alerts")).unwrap();
        assert_eq!(
            android,
            json!({"priority": "HIGH", "notification": {"channel_id": "alerts"}})
        );

        let apns = serde_json::to_value(ApnsConfig::immediate_content_available()).unwrap();
        assert_eq!(
            apns,
            json!({
                "headers": {"apns-priority": "10"},
                "payload": {"aps": {"content-available": 1}}
            })
        );
    }

    #[test]
    fn test_send_request_omits_validate_only_when_false() {
        let message = PushMessage {
            token: "tok".to_string(),
            notification: None,
            data: BTreeMap::new(),
            android: None,
            apns: None,
        };

        let live = serde_json::to_value(SendRequest {
            validate_only: false,
            message: &message,
        })
        .unwrap();
        assert_eq!(live, json!({"message": {"token": "tok"}}));

        let dry_run = serde_json::to_value(SendRequest {
            validate_only: true,
            message: &message,
        })
        .unwrap();
        assert_eq!(dry_run["validate_only"], true);
    }
}
