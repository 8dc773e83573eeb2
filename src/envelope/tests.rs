use super::codec;
use super::*;
use serde_json::json;

#[test]
fn test_round_trip_preserves_type_and_data() {
    let envelope = Envelope::new("price", json!({"symbol": "ACME", "last": 12.5}));

    let frame = codec::encode(&envelope).unwrap();
    let decoded = codec::decode(&frame).unwrap();

    assert_eq!(decoded.msg_type, "price");
    assert_eq!(decoded.data, json!({"symbol": "ACME", "last": 12.5}));
    assert_eq!(decoded, envelope);
}

#[test]
fn test_wire_field_is_named_type() {
    let envelope = Envelope::new("ping", json!({}));

    let frame = codec::encode(&envelope).unwrap();
    let text = String::from_utf8(frame).unwrap();

    assert!(text.contains("\"type\":\"ping\""));
    assert!(!text.contains("msg_type"));
}

#[test]
fn test_unknown_fields_ignored_on_decode() {
    let frame = br#"{
        "type": "price",
        "data": {"last": 3.14},
        "timestamp": "2026-02-11T13:00:00Z",
        "sequence": 42,
        "shard": "eu-1"
    }"#;

    let decoded = codec::decode(frame).unwrap();
    assert_eq!(decoded.msg_type, "price");
    assert_eq!(decoded.data, json!({"last": 3.14}));
}

#[test]
fn test_missing_data_field_fails() {
    let frame = br#"{"type": "price", "timestamp": "2026-02-11T13:00:00Z"}"#;
    assert!(codec::decode(frame).is_err());
}

#[test]
fn test_missing_type_field_fails() {
    let frame = br#"{"data": {}, "timestamp": "2026-02-11T13:00:00Z"}"#;
    assert!(codec::decode(frame).is_err());
}

#[test]
fn test_missing_timestamp_fails() {
    let frame = br#"{"type": "price", "data": {}}"#;
    assert!(codec::decode(frame).is_err());
}

#[test]
fn test_malformed_frame_fails() {
    assert!(codec::decode(b"not json at all").is_err());
    assert!(codec::decode(b"[1, 2, 3]").is_err());
}

#[test]
fn test_data_accepts_any_json_value() {
    // Scalars and arrays are valid payloads; only the envelope shape is fixed
    let frame = br#"{"type": "tick", "data": 7, "timestamp": "2026-02-11T13:00:00Z"}"#;
    let decoded = codec::decode(frame).unwrap();
    assert_eq!(decoded.data, json!(7));
}
