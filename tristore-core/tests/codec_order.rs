//! Value codec round-trip and ordering tests.
//!
//! For every supported datatype, encoding then decoding returns the canonical
//! value, and byte order of the encodings matches the datatype's order.

#[cfg(test)]
mod tests {
    use tristore_core::{Error, Position, Value, ValueCodec, ValueRange};
    use tristore_vocab::xsd;

    fn assert_ordered(codec: &ValueCodec, values: &[Value]) {
        for pair in values.windows(2) {
            let a = codec.encode(&pair[0]).unwrap();
            let b = codec.encode(&pair[1]).unwrap();
            assert!(a < b, "{} should sort before {}", pair[0], pair[1]);
        }
    }

    fn assert_roundtrip(codec: &ValueCodec, values: &[Value]) {
        for v in values {
            let bytes = codec.encode(v).unwrap();
            assert_eq!(&codec.decode(Position::Object, &bytes).unwrap(), v);
        }
    }

    #[test]
    fn resources_and_strings() {
        let codec = ValueCodec::new();
        let resources: Vec<Value> = ["_:b0", "urn:a", "urn:ab", "urn:b", "urn:\u{e9}"]
            .iter()
            .map(|s| Value::iri(*s))
            .collect();
        assert_ordered(&codec, &resources);
        assert_roundtrip(&codec, &resources);

        let strings: Vec<Value> = ["", "A", "a", "a b", "ab", "\u{1F600}"]
            .iter()
            .map(|s| Value::literal(*s))
            .collect();
        assert_ordered(&codec, &strings);
        assert_roundtrip(&codec, &strings);
    }

    #[test]
    fn strings_sort_before_their_extensions() {
        let codec = ValueCodec::new();
        let values: Vec<Value> = ["a", "a\u{2}", "a\t", "a\u{1f}", "a ", "ab", "b"]
            .iter()
            .map(|s| Value::literal(*s))
            .collect();
        assert_ordered(&codec, &values);
        assert_roundtrip(&codec, &values);
    }

    #[test]
    fn reserved_key_bytes_are_rejected() {
        let codec = ValueCodec::new();
        for bad in ["a\u{0}", "a\u{1}", "\u{1}"] {
            let err = codec.encode(&Value::literal(bad)).unwrap_err();
            assert!(matches!(err, Error::InvalidValue(_)), "{:?}", bad);
        }

        // a range starting at such a value cannot silently admit its prefix
        let range = ValueRange::new(Value::literal("a\u{1}"), Value::literal("b"));
        assert!(range
            .contains(&codec, Position::Object, &Value::literal("a"))
            .is_err());
        assert!(!ValueRange::new(Value::literal("a\u{2}"), Value::literal("b"))
            .contains(&codec, Position::Object, &Value::literal("a"))
            .unwrap());
    }

    #[test]
    fn integers() {
        let codec = ValueCodec::new();
        let longs: Vec<Value> = [i64::MIN, -100, -9, -1, 0, 1, 9, 10, 100, i64::MAX]
            .into_iter()
            .map(Value::long)
            .collect();
        assert_ordered(&codec, &longs);
        assert_roundtrip(&codec, &longs);

        let integers: Vec<Value> = [-5, 0, 5].into_iter().map(Value::integer).collect();
        assert_ordered(&codec, &integers);
        assert_roundtrip(&codec, &integers);

        let ints: Vec<Value> = [i32::MIN, -2, 0, 2, 11, i32::MAX]
            .into_iter()
            .map(Value::int)
            .collect();
        assert_ordered(&codec, &ints);
        assert_roundtrip(&codec, &ints);
    }

    #[test]
    fn non_canonical_integers_decode_canonically() {
        let codec = ValueCodec::new();
        let bytes = codec.encode(&Value::typed("+007", xsd::INT)).unwrap();
        assert_eq!(codec.decode(Position::Object, &bytes).unwrap(), Value::int(7));
    }

    #[test]
    fn floating_point() {
        let codec = ValueCodec::new();
        let doubles: Vec<Value> = [-1e300, -2.5, -0.001, 0.0, 1e-10, 0.5, 2.0, 10.0, 1e300]
            .into_iter()
            .map(Value::double)
            .collect();
        assert_ordered(&codec, &doubles);
        assert_roundtrip(&codec, &doubles);

        let floats: Vec<Value> = ["-3.5", "0", "0.25", "7"]
            .iter()
            .map(|s| Value::typed(*s, xsd::FLOAT))
            .collect();
        assert_ordered(&codec, &floats);
        assert_roundtrip(&codec, &floats);

        assert!(codec.encode(&Value::typed("NaN", xsd::DOUBLE)).is_err());

        // negative zero is the same key and value as zero
        assert_roundtrip(&codec, &[Value::double(-0.0)]);
        assert_eq!(
            codec.encode(&Value::typed("-0", xsd::DOUBLE)).unwrap(),
            codec.encode(&Value::double(0.0)).unwrap()
        );
    }

    #[test]
    fn booleans() {
        let codec = ValueCodec::new();
        let values = [Value::boolean(false), Value::boolean(true)];
        assert_ordered(&codec, &values);
        assert_roundtrip(&codec, &values);
    }

    #[test]
    fn date_times() {
        let codec = ValueCodec::new();
        let values: Vec<Value> = [
            "1969-12-31T23:59:59Z",
            "1970-01-01T00:00:00Z",
            "2024-02-29T12:00:00.500Z",
            "2024-02-29T12:00:01Z",
        ]
        .iter()
        .map(|s| Value::typed(*s, xsd::DATE_TIME))
        .collect();
        assert_ordered(&codec, &values);
        assert_roundtrip(&codec, &values);

        // offsets normalize to UTC
        let offset = codec
            .encode(&Value::typed("2024-01-01T02:00:00+02:00", xsd::DATE_TIME))
            .unwrap();
        let utc = codec
            .encode(&Value::typed("2024-01-01T00:00:00Z", xsd::DATE_TIME))
            .unwrap();
        assert_eq!(offset, utc);
    }

    #[test]
    fn dates() {
        let codec = ValueCodec::new();
        let values: Vec<Value> = ["0001-01-01", "1999-12-31", "2000-01-01", "2024-02-29"]
            .iter()
            .map(|s| Value::typed(*s, xsd::DATE))
            .collect();
        assert_ordered(&codec, &values);
        assert_roundtrip(&codec, &values);
    }

    #[test]
    fn datatypes_do_not_collide() {
        let codec = ValueCodec::new();
        let int = codec.encode(&Value::int(1)).unwrap();
        let long = codec.encode(&Value::long(1)).unwrap();
        assert_ne!(int, long);
        let string = codec.encode(&Value::literal("urn:a")).unwrap();
        let resource = codec.encode(&Value::iri("urn:a")).unwrap();
        assert_ne!(string, resource);
        assert_eq!(codec.decode(Position::Object, &resource).unwrap(), Value::iri("urn:a"));
    }
}
