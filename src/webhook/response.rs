use serde_json::Value;

use crate::error::{Result, StudioError};
use crate::models::ImageReference;

const MISCONFIG_SIGNATURE: &str = "Unused Respond to Webhook node";
const MISCONFIG_HINT: &str = "The 'Respond to Webhook' node is present but not active. \
Ensure 'Response Mode' is set to 'When Last Node Finishes'.";

/// Normalizes a successful webhook reply into exactly one image
/// reference. The recognized shapes form a closed set; anything else is
/// rejected explicitly instead of guessing.
pub fn normalize_reply(content_type: Option<&str>, body: &[u8]) -> Result<ImageReference> {
    if content_type.is_some_and(|ct| ct.contains("application/json")) {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| StudioError::SerializationError(format!("invalid JSON reply: {}", e)))?;
        return normalize_json_reply(&value);
    }

    if body.is_empty() {
        return Err(StudioError::EmptyPayload);
    }

    let mime = content_type.unwrap_or("image/png").to_string();
    Ok(ImageReference::Binary {
        bytes: body.to_vec(),
        mime,
    })
}

/// The three known JSON reply shapes, checked in order of precedence:
/// nested binary object with inline bytes, direct data-URL field, raw
/// base64 string under the binary key.
pub fn normalize_json_reply(value: &Value) -> Result<ImageReference> {
    let item = match value.as_array() {
        Some(items) => items.first().ok_or(StudioError::NoImagePayload)?,
        None => value,
    };

    if let Some(data) = item
        .pointer("/binary/data/data")
        .and_then(Value::as_str)
    {
        let mime = item
            .pointer("/binary/data/mimeType")
            .and_then(Value::as_str)
            .unwrap_or("image/png");
        return Ok(ImageReference::Encoded(format!(
            "data:{};base64,{}",
            mime, data
        )));
    }

    if let Some(data) = item.get("data").and_then(Value::as_str) {
        if data.starts_with("data:image") {
            return Ok(ImageReference::Encoded(data.to_string()));
        }
    }

    if let Some(data) = item.pointer("/binary/data").and_then(Value::as_str) {
        return Ok(ImageReference::Encoded(format!(
            "data:image/png;base64,{}",
            data
        )));
    }

    Err(StudioError::NoImagePayload)
}

/// Maps a non-success reply body to the most specific error we can
/// produce. A known remote misconfiguration signature gets a corrective
/// hint instead of the raw server message.
pub fn interpret_error_body(status: u16, body: &str) -> StudioError {
    if let Ok(parsed) = serde_json::from_str::<Value>(body) {
        if let Some(message) = parsed.get("message").and_then(Value::as_str) {
            if message.contains(MISCONFIG_SIGNATURE) {
                return StudioError::RemoteMisconfigured(MISCONFIG_HINT.to_string());
            }
            return StudioError::RemoteError {
                status,
                message: message.to_string(),
            };
        }
    }

    StudioError::RemoteError {
        status,
        message: if body.is_empty() {
            "no response body".to_string()
        } else {
            body.to_string()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encoded(reference: ImageReference) -> String {
        match reference {
            ImageReference::Encoded(url) => url,
            other => panic!("expected encoded reference, got {:?}", other),
        }
    }

    #[test]
    fn nested_binary_object_with_mime_type() {
        let reply = json!({"binary": {"data": {"data": "aGVsbG8=", "mimeType": "image/jpeg"}}});
        let result = normalize_json_reply(&reply).unwrap();
        assert_eq!(encoded(result), "data:image/jpeg;base64,aGVsbG8=");
    }

    #[test]
    fn nested_binary_object_defaults_to_png() {
        let reply = json!({"binary": {"data": {"data": "aGVsbG8="}}});
        assert_eq!(
            encoded(normalize_json_reply(&reply).unwrap()),
            "data:image/png;base64,aGVsbG8="
        );
    }

    #[test]
    fn single_element_sequence_is_unwrapped() {
        let reply = json!([{"binary": {"data": {"data": "eA==", "mimeType": "image/webp"}}}]);
        assert_eq!(
            encoded(normalize_json_reply(&reply).unwrap()),
            "data:image/webp;base64,eA=="
        );
    }

    #[test]
    fn direct_data_url_field_is_passed_through() {
        let reply = json!({"data": "data:image/png;base64,eA=="});
        assert_eq!(
            encoded(normalize_json_reply(&reply).unwrap()),
            "data:image/png;base64,eA=="
        );
    }

    #[test]
    fn direct_data_field_without_image_prefix_is_rejected() {
        let reply = json!({"data": "just some text"});
        assert!(matches!(
            normalize_json_reply(&reply),
            Err(StudioError::NoImagePayload)
        ));
    }

    #[test]
    fn raw_string_under_binary_key_becomes_png() {
        let reply = json!({"binary": {"data": "eA=="}});
        assert_eq!(
            encoded(normalize_json_reply(&reply).unwrap()),
            "data:image/png;base64,eA=="
        );
    }

    #[test]
    fn unrecognized_shapes_fail_loudly() {
        for reply in [json!({}), json!({"image": "eA=="}), json!([])] {
            assert!(matches!(
                normalize_json_reply(&reply),
                Err(StudioError::NoImagePayload)
            ));
        }
    }

    #[test]
    fn empty_binary_body_is_an_error() {
        assert!(matches!(
            normalize_reply(Some("image/png"), &[]),
            Err(StudioError::EmptyPayload)
        ));
    }

    #[test]
    fn binary_body_keeps_reported_mime() {
        let reference = normalize_reply(Some("image/webp"), b"bytes").unwrap();
        assert_eq!(
            reference,
            ImageReference::Binary {
                bytes: b"bytes".to_vec(),
                mime: "image/webp".to_string()
            }
        );
    }

    #[test]
    fn json_content_type_with_invalid_body_is_a_serialization_error() {
        assert!(matches!(
            normalize_reply(Some("application/json"), b"not json"),
            Err(StudioError::SerializationError(_))
        ));
    }

    #[test]
    fn misconfiguration_signature_gets_a_hint() {
        let body = r#"{"message": "Unused Respond to Webhook node found in workflow"}"#;
        assert!(matches!(
            interpret_error_body(500, body),
            StudioError::RemoteMisconfigured(_)
        ));
    }

    #[test]
    fn other_json_messages_become_remote_errors() {
        let body = r#"{"message": "workflow crashed"}"#;
        match interpret_error_body(502, body) {
            StudioError::RemoteError { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "workflow crashed");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn non_json_bodies_are_reported_verbatim() {
        match interpret_error_body(404, "not found") {
            StudioError::RemoteError { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
