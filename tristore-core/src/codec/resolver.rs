//! Per-datatype resolvers.
//!
//! A [`TypeResolver`] turns the lexical form of one datatype into
//! order-preserving data bytes and back. The codec appends the type delimiter
//! and the resolver's marker byte; resolvers never see either.
//!
//! Marker bytes are part of the persisted key format and must not change.

use super::lexicode;
use crate::error::{Error, Result};
use chrono::{
    DateTime as ChronoDateTime, Datelike, NaiveDate, NaiveDateTime, SecondsFormat, Utc,
};
use tristore_vocab::xsd;

/// Marker for resource identifiers
pub const RESOURCE_MARKER: u8 = 0x02;
/// Marker for `xsd:string`
pub const STRING_MARKER: u8 = 0x03;
/// Marker for `xsd:long`
pub const LONG_MARKER: u8 = 0x04;
/// Marker for `xsd:integer`
pub const INTEGER_MARKER: u8 = 0x05;
/// Marker for `xsd:double`
pub const DOUBLE_MARKER: u8 = 0x06;
/// Marker for `xsd:dateTime`
pub const DATE_TIME_MARKER: u8 = 0x07;
/// Marker for `xsd:float`
pub const FLOAT_MARKER: u8 = 0x08;
/// Marker for `xsd:int`
pub const INT_MARKER: u8 = 0x09;
/// Marker for `xsd:boolean`
pub const BOOLEAN_MARKER: u8 = 0x0A;
/// Marker for `xsd:date`
pub const DATE_MARKER: u8 = 0x0B;

/// Order-preserving serializer for one datatype
pub trait TypeResolver: Send + Sync {
    /// Datatype IRI handled, or `None` for the resource resolver
    fn datatype(&self) -> Option<&'static str>;

    /// Marker byte written after the type delimiter
    fn marker(&self) -> u8;

    /// Lexical form -> data bytes. Must be monotonic in the datatype's order.
    fn serialize_data(&self, data: &str) -> Result<Vec<u8>>;

    /// Data bytes -> canonical lexical form
    fn deserialize_data(&self, bytes: &[u8]) -> Result<String>;
}

fn utf8(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| Error::decode(e.to_string()))
}

/// IRIs and blank nodes, stored as raw UTF-8 so they sort lexically.
#[derive(Debug, Default)]
pub struct ResourceResolver;

impl TypeResolver for ResourceResolver {
    fn datatype(&self) -> Option<&'static str> {
        None
    }

    fn marker(&self) -> u8 {
        RESOURCE_MARKER
    }

    fn serialize_data(&self, data: &str) -> Result<Vec<u8>> {
        Ok(data.as_bytes().to_vec())
    }

    fn deserialize_data(&self, bytes: &[u8]) -> Result<String> {
        utf8(bytes)
    }
}

/// `xsd:string`, stored as raw UTF-8.
#[derive(Debug, Default)]
pub struct StringResolver;

impl TypeResolver for StringResolver {
    fn datatype(&self) -> Option<&'static str> {
        Some(xsd::STRING)
    }

    fn marker(&self) -> u8 {
        STRING_MARKER
    }

    fn serialize_data(&self, data: &str) -> Result<Vec<u8>> {
        Ok(data.as_bytes().to_vec())
    }

    fn deserialize_data(&self, bytes: &[u8]) -> Result<String> {
        utf8(bytes)
    }
}

/// 64-bit integers (`xsd:long`, and `xsd:integer` restricted to 64 bits).
#[derive(Debug)]
pub struct LongResolver {
    datatype: &'static str,
    marker: u8,
}

impl LongResolver {
    pub fn long() -> Self {
        Self {
            datatype: xsd::LONG,
            marker: LONG_MARKER,
        }
    }

    pub fn integer() -> Self {
        Self {
            datatype: xsd::INTEGER,
            marker: INTEGER_MARKER,
        }
    }
}

impl TypeResolver for LongResolver {
    fn datatype(&self) -> Option<&'static str> {
        Some(self.datatype)
    }

    fn marker(&self) -> u8 {
        self.marker
    }

    fn serialize_data(&self, data: &str) -> Result<Vec<u8>> {
        let v: i64 = data
            .trim()
            .parse()
            .map_err(|e| Error::invalid_value(format!("{:?} as {}: {}", data, self.datatype, e)))?;
        Ok(lexicode::encode_i64(v).into_bytes())
    }

    fn deserialize_data(&self, bytes: &[u8]) -> Result<String> {
        Ok(lexicode::decode_i64(bytes)?.to_string())
    }
}

/// `xsd:int`
#[derive(Debug, Default)]
pub struct IntResolver;

impl TypeResolver for IntResolver {
    fn datatype(&self) -> Option<&'static str> {
        Some(xsd::INT)
    }

    fn marker(&self) -> u8 {
        INT_MARKER
    }

    fn serialize_data(&self, data: &str) -> Result<Vec<u8>> {
        let v: i32 = data
            .trim()
            .parse()
            .map_err(|e| Error::invalid_value(format!("{:?} as xsd:int: {}", data, e)))?;
        Ok(lexicode::encode_i32(v).into_bytes())
    }

    fn deserialize_data(&self, bytes: &[u8]) -> Result<String> {
        Ok(lexicode::decode_i32(bytes)?.to_string())
    }
}

/// `xsd:double`
#[derive(Debug, Default)]
pub struct DoubleResolver;

impl TypeResolver for DoubleResolver {
    fn datatype(&self) -> Option<&'static str> {
        Some(xsd::DOUBLE)
    }

    fn marker(&self) -> u8 {
        DOUBLE_MARKER
    }

    fn serialize_data(&self, data: &str) -> Result<Vec<u8>> {
        let v: f64 = data
            .trim()
            .parse()
            .map_err(|e| Error::invalid_value(format!("{:?} as xsd:double: {}", data, e)))?;
        Ok(lexicode::encode_f64(v)?.into_bytes())
    }

    fn deserialize_data(&self, bytes: &[u8]) -> Result<String> {
        Ok(lexicode::decode_f64(bytes)?.to_string())
    }
}

/// `xsd:float`, widened to f64 for the key.
#[derive(Debug, Default)]
pub struct FloatResolver;

impl TypeResolver for FloatResolver {
    fn datatype(&self) -> Option<&'static str> {
        Some(xsd::FLOAT)
    }

    fn marker(&self) -> u8 {
        FLOAT_MARKER
    }

    fn serialize_data(&self, data: &str) -> Result<Vec<u8>> {
        let v: f32 = data
            .trim()
            .parse()
            .map_err(|e| Error::invalid_value(format!("{:?} as xsd:float: {}", data, e)))?;
        Ok(lexicode::encode_f64(f64::from(v))?.into_bytes())
    }

    fn deserialize_data(&self, bytes: &[u8]) -> Result<String> {
        Ok((lexicode::decode_f64(bytes)? as f32).to_string())
    }
}

/// `xsd:boolean`: `false` < `true`.
#[derive(Debug, Default)]
pub struct BooleanResolver;

impl TypeResolver for BooleanResolver {
    fn datatype(&self) -> Option<&'static str> {
        Some(xsd::BOOLEAN)
    }

    fn marker(&self) -> u8 {
        BOOLEAN_MARKER
    }

    fn serialize_data(&self, data: &str) -> Result<Vec<u8>> {
        match data.trim() {
            "true" | "1" => Ok(b"1".to_vec()),
            "false" | "0" => Ok(b"0".to_vec()),
            other => Err(Error::invalid_value(format!(
                "{:?} as xsd:boolean",
                other
            ))),
        }
    }

    fn deserialize_data(&self, bytes: &[u8]) -> Result<String> {
        match bytes {
            b"1" => Ok("true".to_string()),
            b"0" => Ok("false".to_string()),
            other => Err(Error::decode(format!("bad boolean bytes {:?}", other))),
        }
    }
}

/// `xsd:dateTime`, normalized to a UTC instant with microsecond precision.
///
/// Values without a timezone are treated as UTC.
#[derive(Debug, Default)]
pub struct DateTimeResolver;

impl DateTimeResolver {
    fn parse(s: &str) -> Result<ChronoDateTime<Utc>> {
        if let Ok(dt) = ChronoDateTime::parse_from_rfc3339(s) {
            return Ok(dt.with_timezone(&Utc));
        }
        for fmt in &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M:%S%z"] {
            if let Ok(dt) = ChronoDateTime::parse_from_str(s, fmt) {
                return Ok(dt.with_timezone(&Utc));
            }
        }
        for fmt in &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
            if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Ok(ndt.and_utc());
            }
        }
        Err(Error::invalid_value(format!("Cannot parse dateTime: {}", s)))
    }
}

impl TypeResolver for DateTimeResolver {
    fn datatype(&self) -> Option<&'static str> {
        Some(xsd::DATE_TIME)
    }

    fn marker(&self) -> u8 {
        DATE_TIME_MARKER
    }

    fn serialize_data(&self, data: &str) -> Result<Vec<u8>> {
        let instant = Self::parse(data.trim())?;
        Ok(lexicode::encode_i64(instant.timestamp_micros()).into_bytes())
    }

    fn deserialize_data(&self, bytes: &[u8]) -> Result<String> {
        let micros = lexicode::decode_i64(bytes)?;
        let instant = ChronoDateTime::<Utc>::from_timestamp_micros(micros)
            .ok_or_else(|| Error::decode(format!("dateTime out of range: {}", micros)))?;
        Ok(instant.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

/// `xsd:date`, as days from the common era.
#[derive(Debug, Default)]
pub struct DateResolver;

impl TypeResolver for DateResolver {
    fn datatype(&self) -> Option<&'static str> {
        Some(xsd::DATE)
    }

    fn marker(&self) -> u8 {
        DATE_MARKER
    }

    fn serialize_data(&self, data: &str) -> Result<Vec<u8>> {
        let date = NaiveDate::parse_from_str(data.trim(), "%Y-%m-%d")
            .map_err(|e| Error::invalid_value(format!("{:?} as xsd:date: {}", data, e)))?;
        Ok(lexicode::encode_i32(date.num_days_from_ce()).into_bytes())
    }

    fn deserialize_data(&self, bytes: &[u8]) -> Result<String> {
        let days = lexicode::decode_i32(bytes)?;
        let date = NaiveDate::from_num_days_from_ce_opt(days)
            .ok_or_else(|| Error::decode(format!("date out of range: {}", days)))?;
        Ok(date.format("%Y-%m-%d").to_string())
    }
}

/// The resolvers registered by [`super::ValueCodec::new`].
pub fn standard_resolvers() -> Vec<Box<dyn TypeResolver>> {
    vec![
        Box::new(ResourceResolver),
        Box::new(StringResolver),
        Box::new(LongResolver::long()),
        Box::new(LongResolver::integer()),
        Box::new(DoubleResolver),
        Box::new(DateTimeResolver),
        Box::new(FloatResolver),
        Box::new(IntResolver),
        Box::new(BooleanResolver),
        Box::new(DateResolver),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ser(r: &dyn TypeResolver, s: &str) -> Vec<u8> {
        r.serialize_data(s).unwrap()
    }

    #[test]
    fn test_long_numeric_not_string_order() {
        let r = LongResolver::long();
        // decimal-string order would put "10" before "9"
        assert!(ser(&r, "9") < ser(&r, "10"));
        assert!(ser(&r, "-10") < ser(&r, "-9"));
        assert!(ser(&r, "-1") < ser(&r, "0"));
    }

    #[test]
    fn test_long_accepts_plus_sign() {
        let r = LongResolver::integer();
        assert_eq!(ser(&r, "+5"), ser(&r, "5"));
        assert_eq!(r.deserialize_data(&ser(&r, "+5")).unwrap(), "5");
    }

    #[test]
    fn test_boolean() {
        let r = BooleanResolver;
        assert!(ser(&r, "false") < ser(&r, "true"));
        assert_eq!(r.deserialize_data(&ser(&r, "1")).unwrap(), "true");
        assert!(r.serialize_data("yes").is_err());
    }

    #[test]
    fn test_date_time_normalizes_to_utc() {
        let r = DateTimeResolver;
        assert_eq!(
            ser(&r, "2024-01-01T05:00:00Z"),
            ser(&r, "2024-01-01T00:00:00-05:00")
        );
        assert_eq!(
            r.deserialize_data(&ser(&r, "2024-01-01T00:00:00-05:00")).unwrap(),
            "2024-01-01T05:00:00Z"
        );
        assert_eq!(
            r.deserialize_data(&ser(&r, "2024-01-15T10:30:00.123Z")).unwrap(),
            "2024-01-15T10:30:00.123Z"
        );
    }

    #[test]
    fn test_date_time_without_zone_is_utc() {
        let r = DateTimeResolver;
        assert_eq!(ser(&r, "2024-01-15T10:30:00"), ser(&r, "2024-01-15T10:30:00Z"));
    }

    #[test]
    fn test_date_time_order_crosses_epoch() {
        let r = DateTimeResolver;
        assert!(ser(&r, "1969-12-31T23:59:59Z") < ser(&r, "1970-01-01T00:00:00Z"));
        assert!(ser(&r, "1999-12-31T23:59:59Z") < ser(&r, "2000-01-01T00:00:00Z"));
    }

    #[test]
    fn test_date_roundtrip() {
        let r = DateResolver;
        assert_eq!(r.deserialize_data(&ser(&r, "2024-02-29")).unwrap(), "2024-02-29");
        assert!(ser(&r, "0999-12-31") < ser(&r, "1000-01-01"));
        assert!(r.serialize_data("2024-13-01").is_err());
    }

    #[test]
    fn test_float_roundtrip() {
        let r = FloatResolver;
        assert_eq!(r.deserialize_data(&ser(&r, "1.5")).unwrap(), "1.5");
        assert_eq!(r.deserialize_data(&ser(&r, "0.1")).unwrap(), "0.1");
    }

    #[test]
    fn test_markers_are_unique() {
        let resolvers = standard_resolvers();
        let mut markers: Vec<u8> = resolvers.iter().map(|r| r.marker()).collect();
        markers.sort_unstable();
        markers.dedup();
        assert_eq!(markers.len(), resolvers.len());
        // markers must never collide with the delimiters or the sentinel
        assert!(markers.iter().all(|m| *m > 0x01 && *m < 0xFF));
    }
}
