//! Schema-aware envelope encoding
//!
//! Wire format: `[magic_byte(1)][schema_id(4, big-endian)][avro datum(N)]`.
//! The magic byte is reserved for format-version signalling and is always
//! zero; registry-aware consumers expect exactly this five-byte prefix.

use crate::error::{EventError, Result};
use crate::schema::SchemaHandle;
use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;

/// Reserved leading byte of every envelope
pub const MAGIC_BYTE: u8 = 0x00;

/// Length of the magic byte plus schema id
pub const HEADER_LEN: usize = 5;

/// Encodes events into framed Avro envelopes
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeEncoder;

impl EnvelopeEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encode an event against a schema handle
    ///
    /// The event is rendered to JSON, resolved against the schema, encoded
    /// to Avro binary and framed with the handle's id. Nothing is returned
    /// unless every step succeeds.
    pub fn encode<E>(&self, schema: &SchemaHandle, event: &E) -> Result<Bytes>
    where
        E: Serialize + ?Sized,
    {
        let text = serde_json::to_vec(event)?;

        let native = schema
            .codec()
            .native_from_textual(&text)
            .map_err(|reason| EventError::EncodingMismatch {
                schema_id: schema.id(),
                reason,
            })?;

        let payload = schema
            .codec()
            .binary_from_native(native)
            .map_err(|reason| EventError::BinaryEncodingError {
                schema_id: schema.id(),
                reason,
            })?;

        tracing::trace!(
            schema_id = schema.id(),
            subject = schema.subject(),
            payload_len = payload.len(),
            "Event encoded"
        );

        Ok(frame(schema.id(), &payload))
    }
}

/// Prefix a binary payload with the envelope header
pub fn frame(schema_id: u32, payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(HEADER_LEN + payload.len());
    buf.put_u8(MAGIC_BYTE);
    buf.put_u32(schema_id);
    buf.put_slice(payload);
    buf.freeze()
}

/// Split an envelope into its schema id and payload
pub fn decode_envelope(data: &[u8]) -> Result<(u32, &[u8])> {
    if data.len() < HEADER_LEN {
        return Err(EventError::EncodingMismatch {
            schema_id: 0,
            reason: format!("Envelope too short: {} bytes", data.len()),
        });
    }

    if data[0] != MAGIC_BYTE {
        return Err(EventError::EncodingMismatch {
            schema_id: 0,
            reason: format!("Invalid magic byte: expected 0x00, got 0x{:02x}", data[0]),
        });
    }

    let schema_id = u32::from_be_bytes([data[1], data[2], data[3], data[4]]);
    Ok((schema_id, &data[HEADER_LEN..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaFormat;
    use apache_avro::types::Value;

    const ORDER_SCHEMA: &str = r#"{"type":"record","name":"Order","fields":[{"name":"id","type":"string"},{"name":"name","type":"string"}]}"#;

    fn order_handle(id: u32) -> SchemaHandle {
        SchemaHandle::new(id, "Orders-value", 1, ORDER_SCHEMA, SchemaFormat::Avro).unwrap()
    }

    #[test]
    fn test_frame_layout() {
        let framed = frame(0x0102_0304, b"abc");
        assert_eq!(&framed[..], &[0x00, 0x01, 0x02, 0x03, 0x04, b'a', b'b', b'c']);
    }

    #[test]
    fn test_encode_orders_scenario() {
        let handle = order_handle(1);
        let bytes = EnvelopeEncoder::new()
            .encode(&handle, &serde_json::json!({"id": "4324", "name": "ABC"}))
            .unwrap();

        // Avro strings: zigzag varint length, then UTF-8 bytes
        let mut expected = vec![0x00, 0x00, 0x00, 0x00, 0x01];
        expected.push(8);
        expected.extend_from_slice(b"4324");
        expected.push(6);
        expected.extend_from_slice(b"ABC");
        assert_eq!(&bytes[..], &expected[..]);
    }

    #[test]
    fn test_header_carries_schema_id() {
        let handle = order_handle(7);
        let bytes = EnvelopeEncoder::new()
            .encode(&handle, &serde_json::json!({"id": "1", "name": "x"}))
            .unwrap();

        assert!(bytes.len() >= HEADER_LEN);
        let (id, payload) = decode_envelope(&bytes).unwrap();
        assert_eq!(id, 7);
        assert_eq!(
            handle.decode(payload).unwrap(),
            Value::Record(vec![
                ("id".to_string(), Value::String("1".to_string())),
                ("name".to_string(), Value::String("x".to_string())),
            ])
        );
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let handle = order_handle(7);
        let with_extra = EnvelopeEncoder::new()
            .encode(&handle, &serde_json::json!({"id": "1", "name": "x", "extra": true}))
            .unwrap();
        let without = EnvelopeEncoder::new()
            .encode(&handle, &serde_json::json!({"id": "1", "name": "x"}))
            .unwrap();
        assert_eq!(with_extra, without);
    }

    #[test]
    fn test_missing_required_field_is_mismatch() {
        let handle = order_handle(7);
        let err = EnvelopeEncoder::new()
            .encode(&handle, &serde_json::json!({"name": "x"}))
            .unwrap_err();

        match err {
            EventError::EncodingMismatch { schema_id, .. } => assert_eq!(schema_id, 7),
            other => panic!("expected EncodingMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_envelope_too_short() {
        assert!(decode_envelope(&[0x00, 0x01]).is_err());
    }

    #[test]
    fn test_decode_envelope_invalid_magic_byte() {
        let err = decode_envelope(&[0xFF, 0x00, 0x00, 0x00, 0x01, 0x42]).unwrap_err();
        assert!(err.to_string().contains("0xff"));
    }
}
