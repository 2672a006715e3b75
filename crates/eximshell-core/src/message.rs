// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge message codec.
//
// Messages travel as JSON strings over the content view's message channel:
//
//   native -> page  {"type":"pushNotification","payload":<content>}
//   native -> page  {"type":"imageUpload","payload":{"uri":"<file ref>"}}
//   page -> native  {"type":"requestImageUpload"}
//
// Unknown `type` values decode to `BridgeMessage::Unknown` so receivers can
// skip them without treating them as faults.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, ShellError};

pub const TYPE_PUSH_NOTIFICATION: &str = "pushNotification";
pub const TYPE_IMAGE_UPLOAD: &str = "imageUpload";
pub const TYPE_REQUEST_IMAGE_UPLOAD: &str = "requestImageUpload";

/// Payload of an `imageUpload` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUpload {
    pub uri: String,
}

/// A tagged payload exchanged between the shell and the hosted page.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeMessage {
    /// Native -> page: structured content of a foreground notification.
    PushNotification(Value),
    /// Native -> page: local reference to an image the user picked.
    ImageUpload(ImageUpload),
    /// Page -> native: open the image picker.
    RequestImageUpload,
    /// Any `type` this build does not understand.
    Unknown(String),
}

#[derive(Serialize)]
struct OutboundEnvelope<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<&'a Value>,
}

#[derive(Deserialize)]
struct InboundEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
}

impl BridgeMessage {
    pub fn image_upload(uri: impl Into<String>) -> Self {
        Self::ImageUpload(ImageUpload { uri: uri.into() })
    }

    /// The wire `type` tag.
    pub fn kind(&self) -> &str {
        match self {
            Self::PushNotification(_) => TYPE_PUSH_NOTIFICATION,
            Self::ImageUpload(_) => TYPE_IMAGE_UPLOAD,
            Self::RequestImageUpload => TYPE_REQUEST_IMAGE_UPLOAD,
            Self::Unknown(kind) => kind,
        }
    }

    /// Serialise to the JSON wire form.
    ///
    /// `Unknown` messages are receive-only and cannot be encoded.
    pub fn encode(&self) -> Result<String> {
        let upload;
        let payload = match self {
            Self::PushNotification(content) => Some(content),
            Self::ImageUpload(image) => {
                upload = serde_json::to_value(image)?;
                Some(&upload)
            }
            Self::RequestImageUpload => None,
            Self::Unknown(kind) => {
                return Err(ShellError::MalformedMessage(format!(
                    "refusing to encode unknown message type `{kind}`"
                )));
            }
        };
        let envelope = OutboundEnvelope {
            kind: self.kind(),
            payload,
        };
        Ok(serde_json::to_string(&envelope)?)
    }

    /// Parse the JSON wire form.
    ///
    /// Fails only when the text is not a JSON object with a string `type`, or
    /// when a known type carries a payload of the wrong shape.
    pub fn decode(raw: &str) -> Result<Self> {
        let envelope: InboundEnvelope = serde_json::from_str(raw)
            .map_err(|e| ShellError::MalformedMessage(e.to_string()))?;

        match envelope.kind.as_str() {
            TYPE_PUSH_NOTIFICATION => Ok(Self::PushNotification(envelope.payload)),
            TYPE_IMAGE_UPLOAD => serde_json::from_value(envelope.payload)
                .map(Self::ImageUpload)
                .map_err(|e| ShellError::MalformedMessage(format!("imageUpload payload: {e}"))),
            TYPE_REQUEST_IMAGE_UPLOAD => Ok(Self::RequestImageUpload),
            _ => Ok(Self::Unknown(envelope.kind)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_image_upload_has_no_payload() {
        let wire = BridgeMessage::RequestImageUpload.encode().unwrap();
        assert_eq!(wire, r#"{"type":"requestImageUpload"}"#);
    }

    #[test]
    fn image_upload_wire_shape() {
        let wire = BridgeMessage::image_upload("file:///tmp/cat.jpg").encode().unwrap();
        assert_eq!(
            wire,
            r#"{"type":"imageUpload","payload":{"uri":"file:///tmp/cat.jpg"}}"#
        );
    }

    #[test]
    fn push_notification_payload_is_passed_through() {
        let content = json!({ "orderId": 42, "status": "shipped" });
        let wire = BridgeMessage::PushNotification(content.clone())
            .encode()
            .unwrap();
        let parsed: Value = serde_json::from_str(&wire).unwrap();
        assert_eq!(parsed["type"], "pushNotification");
        assert_eq!(parsed["payload"], content);
    }

    #[test]
    fn decodes_request_from_page() {
        let msg = BridgeMessage::decode(r#"{"type":"requestImageUpload"}"#).unwrap();
        assert_eq!(msg, BridgeMessage::RequestImageUpload);
    }

    #[test]
    fn request_with_stray_payload_still_decodes() {
        let msg = BridgeMessage::decode(r#"{"type":"requestImageUpload","payload":{}}"#).unwrap();
        assert_eq!(msg, BridgeMessage::RequestImageUpload);
    }

    #[test]
    fn unknown_type_is_not_an_error() {
        let msg = BridgeMessage::decode(r#"{"type":"openCamera","payload":[1,2]}"#).unwrap();
        assert_eq!(msg, BridgeMessage::Unknown("openCamera".into()));
        assert_eq!(msg.kind(), "openCamera");
    }

    #[test]
    fn unknown_type_cannot_be_encoded() {
        let err = BridgeMessage::Unknown("x".into()).encode().unwrap_err();
        assert!(matches!(err, ShellError::MalformedMessage(_)));
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(
            BridgeMessage::decode("not json"),
            Err(ShellError::MalformedMessage(_))
        ));
        assert!(matches!(
            BridgeMessage::decode(r#"{"payload":1}"#),
            Err(ShellError::MalformedMessage(_))
        ));
        assert!(matches!(
            BridgeMessage::decode(r#"{"type":7}"#),
            Err(ShellError::MalformedMessage(_))
        ));
    }

    #[test]
    fn image_upload_requires_uri() {
        assert!(matches!(
            BridgeMessage::decode(r#"{"type":"imageUpload","payload":{}}"#),
            Err(ShellError::MalformedMessage(_))
        ));
    }
}
