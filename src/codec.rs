//! Avro codec bound to a single parsed schema
//!
//! Converts between three representations of a record:
//! textual (JSON), native (`apache_avro::types::Value` resolved against the
//! schema), and binary (Avro datum encoding, no container header).

use apache_avro::types::Value;
use apache_avro::Schema;

/// Codec for one Avro schema
#[derive(Debug, Clone)]
pub struct AvroCodec {
    schema: Schema,
}

impl AvroCodec {
    /// Parse a schema definition into a codec
    pub fn parse(definition: &str) -> Result<Self, apache_avro::Error> {
        Ok(Self {
            schema: Schema::parse_str(definition)?,
        })
    }

    /// The parsed schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Convert JSON text into a schema-typed native value
    ///
    /// Record fields missing from the input fall back to their schema
    /// default; without a default the conversion fails. Input fields the
    /// schema does not declare are dropped.
    pub fn native_from_textual(&self, text: &[u8]) -> Result<Value, String> {
        let json: serde_json::Value =
            serde_json::from_slice(text).map_err(|e| format!("invalid JSON input: {}", e))?;
        Value::from(json)
            .resolve(&self.schema)
            .map_err(|e| e.to_string())
    }

    /// Encode a native value as an Avro binary datum
    pub fn binary_from_native(&self, native: Value) -> Result<Vec<u8>, String> {
        apache_avro::to_avro_datum(&self.schema, native).map_err(|e| e.to_string())
    }

    /// Decode an Avro binary datum written with this schema
    pub fn native_from_binary(&self, mut binary: &[u8]) -> Result<Value, String> {
        apache_avro::from_avro_datum(&self.schema, &mut binary, None).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDER_SCHEMA: &str = r#"{
        "type": "record",
        "name": "Order",
        "fields": [
            {"name": "id", "type": "string"},
            {"name": "name", "type": "string"},
            {"name": "note", "type": ["null", "string"], "default": null}
        ]
    }"#;

    #[test]
    fn test_parse_rejects_malformed_definition() {
        assert!(AvroCodec::parse(r#"{"type": "record", "name": "X"}"#).is_err());
        assert!(AvroCodec::parse("not json").is_err());
    }

    #[test]
    fn test_native_from_textual_resolves_record() {
        let codec = AvroCodec::parse(ORDER_SCHEMA).unwrap();
        let native = codec
            .native_from_textual(br#"{"id": "4324", "name": "ABC"}"#)
            .unwrap();

        match native {
            Value::Record(fields) => {
                assert_eq!(fields[0], ("id".to_string(), Value::String("4324".to_string())));
                assert_eq!(fields[1], ("name".to_string(), Value::String("ABC".to_string())));
                assert_eq!(fields[2], ("note".to_string(), Value::Union(0, Box::new(Value::Null))));
            }
            other => panic!("expected record, got {:?}", other),
        }
    }

    #[test]
    fn test_native_from_textual_missing_required_field() {
        let codec = AvroCodec::parse(ORDER_SCHEMA).unwrap();
        let err = codec.native_from_textual(br#"{"name": "ABC"}"#).unwrap_err();
        assert!(err.contains("id"), "error should name the field: {}", err);
    }

    #[test]
    fn test_native_from_textual_wrong_type() {
        let codec = AvroCodec::parse(ORDER_SCHEMA).unwrap();
        assert!(codec
            .native_from_textual(br#"{"id": 4324, "name": "ABC"}"#)
            .is_err());
    }

    #[test]
    fn test_binary_roundtrip() {
        let codec = AvroCodec::parse(ORDER_SCHEMA).unwrap();
        let native = codec
            .native_from_textual(br#"{"id": "1", "name": "n", "note": "hello"}"#)
            .unwrap();

        let binary = codec.binary_from_native(native.clone()).unwrap();
        assert_eq!(codec.native_from_binary(&binary).unwrap(), native);
    }

    #[test]
    fn test_binary_from_native_rejects_unresolved_value() {
        let codec = AvroCodec::parse(ORDER_SCHEMA).unwrap();
        assert!(codec.binary_from_native(Value::Int(5)).is_err());
    }
}
