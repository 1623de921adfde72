//! Inbound webhook events.
//!
//! # Hierarchy
//!
//! ```text
//! WebhookPayload { destination, events }
//! └── Event { reply_token, timestamp, source }
//!     └── EventKind
//!         ├── Message(MessageContent: text | image | video | audio | location | sticker)
//!         ├── Follow | Unfollow | Join | Leave
//!         ├── Postback { data }
//!         └── Beacon { hwid, type: enter | leave | banner }
//! ```
//!
//! Kinds this crate does not know about decode to [`EventKind::Unsupported`]
//! and unknown source types to [`Source::Unsupported`], so one new event or
//! source type never rejects a whole batch.

use serde::{Deserialize, Serialize};

use crate::error::WebhookResult;

/// The body of a webhook request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayload {
    /// User ID of the bot that should receive the events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    /// Events in delivery order.
    #[serde(default)]
    pub events: Vec<Event>,
}

/// Decodes a raw webhook body into its events.
///
/// This performs no signature check; platforms verify the body first.
pub fn parse_payload(body: &[u8]) -> WebhookResult<Vec<Event>> {
    let payload: WebhookPayload = serde_json::from_slice(body)?;
    Ok(payload.events)
}

/// A single inbound event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Token for replying to this event. Absent for unfollow and leave.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_token: Option<String>,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: i64,
    /// Where the event came from.
    pub source: Source,
    /// Kind-specific payload, tagged by `type`.
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    /// Creates an event without a reply token.
    pub fn new(source: Source, kind: EventKind) -> Self {
        Self {
            reply_token: None,
            timestamp: 0,
            source,
            kind,
        }
    }

    /// Sets the reply token.
    pub fn with_reply_token(mut self, token: impl Into<String>) -> Self {
        self.reply_token = Some(token.into());
        self
    }

    /// Sets the timestamp.
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Dotted kind name used in logs, e.g. `message.text` or `beacon.enter`.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            EventKind::Message { message } => match message {
                MessageContent::Text { .. } => "message.text",
                MessageContent::Image { .. } => "message.image",
                MessageContent::Video { .. } => "message.video",
                MessageContent::Audio { .. } => "message.audio",
                MessageContent::Location { .. } => "message.location",
                MessageContent::Sticker { .. } => "message.sticker",
                MessageContent::Unsupported => "message.unsupported",
            },
            EventKind::Follow => "follow",
            EventKind::Unfollow => "unfollow",
            EventKind::Join => "join",
            EventKind::Leave => "leave",
            EventKind::Postback { .. } => "postback",
            EventKind::Beacon { beacon } => match beacon.kind {
                BeaconKind::Enter => "beacon.enter",
                BeaconKind::Leave => "beacon.leave",
                BeaconKind::Banner => "beacon.banner",
            },
            EventKind::Unsupported => "unsupported",
        }
    }

    /// Returns the message payload of a message event.
    pub fn message(&self) -> Option<&MessageContent> {
        match &self.kind {
            EventKind::Message { message } => Some(message),
            _ => None,
        }
    }

    /// Returns the text of a text message event.
    pub fn text(&self) -> Option<&str> {
        match self.message()? {
            MessageContent::Text { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Returns the ID of the user behind this event, when the source carries one.
    pub fn user_id(&self) -> Option<&str> {
        self.source.user_id()
    }
}

/// Kind-specific event payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EventKind {
    Message {
        message: MessageContent,
    },
    Follow,
    Unfollow,
    Join,
    Leave,
    Postback {
        postback: Postback,
    },
    Beacon {
        beacon: Beacon,
    },
    #[serde(other)]
    Unsupported,
}

/// Content of a message event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum MessageContent {
    Text {
        id: String,
        text: String,
    },
    Image {
        id: String,
    },
    Video {
        id: String,
    },
    Audio {
        id: String,
    },
    Location {
        id: String,
        #[serde(default)]
        title: String,
        #[serde(default)]
        address: String,
        latitude: f64,
        longitude: f64,
    },
    Sticker {
        id: String,
        package_id: String,
        sticker_id: String,
    },
    #[serde(other)]
    Unsupported,
}

impl MessageContent {
    /// Platform message ID, used to download binary content.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Text { id, .. }
            | Self::Image { id }
            | Self::Video { id }
            | Self::Audio { id }
            | Self::Location { id, .. }
            | Self::Sticker { id, .. } => Some(id),
            Self::Unsupported => None,
        }
    }
}

/// Where an event originated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum Source {
    User {
        user_id: String,
    },
    Group {
        group_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_id: Option<String>,
    },
    Room {
        room_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_id: Option<String>,
    },
    #[serde(other)]
    Unsupported,
}

impl Source {
    /// Creates a one-to-one chat source.
    pub fn user(user_id: impl Into<String>) -> Self {
        Self::User {
            user_id: user_id.into(),
        }
    }

    /// Creates a group source without a known member.
    pub fn group(group_id: impl Into<String>) -> Self {
        Self::Group {
            group_id: group_id.into(),
            user_id: None,
        }
    }

    /// Creates a room source without a known member.
    pub fn room(room_id: impl Into<String>) -> Self {
        Self::Room {
            room_id: room_id.into(),
            user_id: None,
        }
    }

    /// The sending user, if the platform disclosed one.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::User { user_id } => Some(user_id),
            Self::Group { user_id, .. } | Self::Room { user_id, .. } => user_id.as_deref(),
            Self::Unsupported => None,
        }
    }

    /// The ID messages should be pushed to in order to reach this source.
    pub fn target_id(&self) -> Option<&str> {
        match self {
            Self::User { user_id } => Some(user_id),
            Self::Group { group_id, .. } => Some(group_id),
            Self::Room { room_id, .. } => Some(room_id),
            Self::Unsupported => None,
        }
    }
}

/// Payload of a postback event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Postback {
    pub data: String,
}

/// Payload of a beacon event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beacon {
    /// Hardware ID of the beacon.
    pub hwid: String,
    #[serde(rename = "type")]
    pub kind: BeaconKind,
    /// Device message, hex encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dm: Option<String>,
}

/// Beacon event sub-type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeaconKind {
    Enter,
    Leave,
    Banner,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_text_message() {
        let body = json!({
            "destination": "Ubot",
            "events": [{
                "replyToken": "nHuyWiB7yP5Zw52FIkcQobQuGDXCTA",
                "type": "message",
                "mode": "active",
                "timestamp": 1462629479859_i64,
                "source": {"type": "user", "userId": "U4af4980629"},
                "message": {"id": "325708", "type": "text", "text": "Hello, world"}
            }]
        });

        let events = parse_payload(body.to_string().as_bytes()).unwrap();
        assert_eq!(events.len(), 1);

        let event = &events[0];
        assert_eq!(
            event.reply_token.as_deref(),
            Some("nHuyWiB7yP5Zw52FIkcQobQuGDXCTA")
        );
        assert_eq!(event.timestamp, 1462629479859);
        assert_eq!(event.text(), Some("Hello, world"));
        assert_eq!(event.user_id(), Some("U4af4980629"));
        assert_eq!(event.kind_name(), "message.text");
    }

    #[test]
    fn test_parse_group_sticker_and_beacon() {
        let body = json!({
            "events": [
                {
                    "replyToken": "t1",
                    "type": "message",
                    "timestamp": 1,
                    "source": {"type": "group", "groupId": "Ca56f9", "userId": "U206d"},
                    "message": {"id": "1", "type": "sticker", "packageId": "1", "stickerId": "2"}
                },
                {
                    "replyToken": "t2",
                    "type": "beacon",
                    "timestamp": 2,
                    "source": {"type": "user", "userId": "U1"},
                    "beacon": {"hwid": "d41d8cd98f", "type": "leave"}
                }
            ]
        });

        let events = parse_payload(body.to_string().as_bytes()).unwrap();
        assert_eq!(
            events[0].message(),
            Some(&MessageContent::Sticker {
                id: "1".into(),
                package_id: "1".into(),
                sticker_id: "2".into(),
            })
        );
        assert_eq!(events[0].source.target_id(), Some("Ca56f9"));
        assert_eq!(events[0].user_id(), Some("U206d"));

        match &events[1].kind {
            EventKind::Beacon { beacon } => {
                assert_eq!(beacon.hwid, "d41d8cd98f");
                assert_eq!(beacon.kind, BeaconKind::Leave);
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn test_unfollow_has_no_reply_token() {
        let body = r#"{"events":[{"type":"unfollow","timestamp":3,"source":{"type":"user","userId":"U1"}}]}"#;
        let events = parse_payload(body.as_bytes()).unwrap();
        assert_eq!(events[0].kind, EventKind::Unfollow);
        assert!(events[0].reply_token.is_none());
    }

    #[test]
    fn test_unknown_kinds_are_unsupported() {
        let body = r#"{"events":[
            {"type":"memberJoined","timestamp":3,"source":{"type":"group","groupId":"G"}},
            {"type":"message","replyToken":"r","timestamp":4,"source":{"type":"user","userId":"U"},
             "message":{"id":"9","type":"file","fileName":"a.txt"}}
        ]}"#;
        let events = parse_payload(body.as_bytes()).unwrap();
        assert_eq!(events[0].kind, EventKind::Unsupported);
        assert_eq!(events[1].message(), Some(&MessageContent::Unsupported));
        assert_eq!(events[1].kind_name(), "message.unsupported");
    }

    #[test]
    fn test_unknown_source_is_unsupported() {
        let body = r#"{"events":[
            {"type":"follow","replyToken":"r","timestamp":5,"source":{"type":"channel","channelId":"C"}},
            {"type":"follow","replyToken":"s","timestamp":6,"source":{"type":"user","userId":"U"}}
        ]}"#;
        let events = parse_payload(body.as_bytes()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].source, Source::Unsupported);
        assert_eq!(events[0].source.user_id(), None);
        assert_eq!(events[0].source.target_id(), None);
        assert_eq!(events[1].source, Source::user("U"));
    }

    #[test]
    fn test_malformed_body_is_parse_error() {
        let err = parse_payload(b"{not json").unwrap_err();
        assert!(matches!(err, crate::WebhookError::Parse(_)));
    }
}
