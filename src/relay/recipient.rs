use chrono::{FixedOffset, Offset, Utc};

use crate::firestore::Document;

/// Largest offset chrono accepts, in minutes (just under 24h)
const MAX_OFFSET_MINUTES: i64 = 24 * 60 - 1;

/// The fields of a `users/{uid}` profile the relay reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientProfile {
    pub fcm_token: Option<String>,
    pub utc_offset_minutes: Option<i32>,
}

impl RecipientProfile {
    pub fn from_document(document: &Document) -> Self {
        Self {
            fcm_token: document
                .string_field("fcmToken")
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            utc_offset_minutes: document
                .integer_field("utcOffsetMinutes")
                .filter(|m| (-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(m))
                .and_then(|m| i32::try_from(m).ok()),
        }
    }

    /// Display offset for event times, falling back to `default_minutes`
    pub fn display_offset(&self, default_minutes: i32) -> FixedOffset {
        self.utc_offset_minutes
            .and_then(|m| FixedOffset::east_opt(m.saturating_mul(60)))
            .or_else(|| FixedOffset::east_opt(default_minutes.saturating_mul(60)))
            .unwrap_or_else(|| Utc.fix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firestore::FirestoreValue;

    #[test]
    fn test_empty_token_is_missing() {
        let doc = Document::new("users/U1").with_string("fcmToken", "");
        assert_eq!(RecipientProfile::from_document(&doc).fcm_token, None);
    }

    #[test]
    fn test_display_offset_prefers_profile() {
        let doc = Document::new("users/U1")
            .with_string("fcmToken", "tok")
            .with_field("utcOffsetMinutes", FirestoreValue::IntegerValue("300".into()));
        let profile = RecipientProfile::from_document(&doc);
        assert_eq!(profile.display_offset(0).local_minus_utc(), 300 * 60);

        let bare = RecipientProfile::default();
        assert_eq!(bare.display_offset(-240).local_minus_utc(), -240 * 60);
    }

    #[test]
    fn test_out_of_range_offsets_fall_back() {
        let doc = Document::new("users/U1")
            .with_field("utcOffsetMinutes", FirestoreValue::IntegerValue("99999".into()));
        let profile = RecipientProfile::from_document(&doc);
        assert_eq!(profile.utc_offset_minutes, None);
        assert_eq!(profile.display_offset(99999).local_minus_utc(), 0);
    }

    #[test]
    fn test_extreme_offsets_use_configured_default() {
        for value in [
            FirestoreValue::IntegerValue(i64::MIN.to_string()),
            FirestoreValue::IntegerValue(i64::MAX.to_string()),
            FirestoreValue::DoubleValue(-1e30),
            FirestoreValue::DoubleValue(1e30),
        ] {
            let doc = Document::new("users/U1").with_field("utcOffsetMinutes", value.clone());
            let profile = RecipientProfile::from_document(&doc);
            assert_eq!(profile.utc_offset_minutes, None, "{:?}", value);
            assert_eq!(profile.display_offset(-240).local_minus_utc(), -240 * 60);
        }
    }
}
