//! Row-key bytes and scan bounds
//!
//! Row keys are encoded fields joined by [`DELIM`]. Scan bounds are half-open
//! `[start, stop)`; inclusive upper bounds are expressed by appending
//! `DELIM ++ MAX_SENTINEL`, which sorts after every key sharing the prefix.
//!
//! The three byte constants are part of the persisted key format.
//
// Known fragility: the format relies on DELIM and MAX_SENTINEL never
// appearing inside an encoded field. The codec rejects DELIM and TYPE_DELIM
// in data and
// every encoding it produces is UTF-8 or ASCII (never 0xFF); keys written by
// other encoders are not checked.

use sha2::Digest;
use std::fmt;

/// Separates fields inside a row key
pub const DELIM: u8 = 0x00;

/// Separates an object's data bytes from its datatype marker
pub const TYPE_DELIM: u8 = 0x01;

/// Maximal byte appended to turn a prefix into an exclusive upper bound
pub const MAX_SENTINEL: u8 = 0xFF;

/// Half-open byte interval `[start, stop)` handed to the store's scan
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ByteRange {
    pub start: Vec<u8>,
    pub stop: Vec<u8>,
}

impl ByteRange {
    pub fn new(start: Vec<u8>, stop: Vec<u8>) -> Self {
        Self { start, stop }
    }

    /// Whether `key` falls in `[start, stop)`
    pub fn contains(&self, key: &[u8]) -> bool {
        key >= self.start.as_slice() && key < self.stop.as_slice()
    }

    /// True when no key can fall in the range
    pub fn is_empty(&self) -> bool {
        self.start >= self.stop
    }
}

impl fmt::Debug for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ByteRange[{:?}, {:?})",
            String::from_utf8_lossy(&self.start),
            String::from_utf8_lossy(&self.stop)
        )
    }
}

/// Range endpoints already encoded for one position
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedRange {
    pub start: Vec<u8>,
    pub stop: Vec<u8>,
    pub start_inclusive: bool,
    pub stop_inclusive: bool,
}

/// Hex SHA-256 of a row's anchor field.
///
/// Hashed rows are written as `row_hash(f1) DELIM f1 DELIM ..`, which spreads
/// anchors evenly over the key space at the cost of anchor range scans.
pub fn row_hash(anchor: &[u8]) -> Vec<u8> {
    let mut hasher = sha2::Sha256::new();
    hasher.update(anchor);
    hex::encode(hasher.finalize()).into_bytes()
}

/// Concatenate encoded fields, separated by [`DELIM`].
pub fn join_fields<T: AsRef<[u8]>>(fields: &[T]) -> Vec<u8> {
    let len = fields.iter().map(|f| f.as_ref().len() + 1).sum::<usize>();
    let mut out = Vec::with_capacity(len);
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(DELIM);
        }
        out.extend_from_slice(field.as_ref());
    }
    out
}

/// Bounds covering every key whose leading fields equal `fields`.
///
/// With `complete` the fields form a whole row key (every position bound),
/// so the row itself has no trailing delimiter.
pub fn prefix_bounds<T: AsRef<[u8]>>(fields: &[T], complete: bool) -> ByteRange {
    let mut start = join_fields(fields);
    if complete {
        let mut stop = start.clone();
        stop.push(DELIM);
        stop.push(MAX_SENTINEL);
        ByteRange::new(start, stop)
    } else {
        start.push(DELIM);
        let mut stop = start.clone();
        stop.push(MAX_SENTINEL);
        ByteRange::new(start, stop)
    }
}

/// Bounds for a range field following `prefix` and followed by `suffix`.
///
/// - inclusive start: `prefix DELIM start [DELIM suffix]`
/// - exclusive start: `prefix DELIM start DELIM MAX` (skips the start's subtree)
/// - inclusive stop: `prefix DELIM stop [DELIM suffix] DELIM MAX`
/// - exclusive stop: `prefix DELIM stop`
///
/// An empty `prefix` drops the leading delimiter (range on the anchor field).
pub fn range_bounds<T: AsRef<[u8]>>(prefix: &[T], range: &EncodedRange, suffix: &[T]) -> ByteRange {
    let mut head = join_fields(prefix);
    if !prefix.is_empty() {
        head.push(DELIM);
    }
    let tail = join_fields(suffix);

    let mut start = head.clone();
    start.extend_from_slice(&range.start);
    if range.start_inclusive {
        if !suffix.is_empty() {
            start.push(DELIM);
            start.extend_from_slice(&tail);
        }
    } else {
        start.push(DELIM);
        start.push(MAX_SENTINEL);
    }

    let mut stop = head;
    stop.extend_from_slice(&range.stop);
    if range.stop_inclusive {
        if !suffix.is_empty() {
            stop.push(DELIM);
            stop.extend_from_slice(&tail);
        }
        stop.push(DELIM);
        stop.push(MAX_SENTINEL);
    }

    ByteRange::new(start, stop)
}

/// Split a row key into exactly `n` fields.
///
/// Returns `None` when the key has fewer than `n` fields; the last field keeps
/// any remaining bytes.
pub fn split_fields(row: &[u8], n: usize) -> Option<Vec<&[u8]>> {
    let fields: Vec<&[u8]> = row.splitn(n, |b| *b == DELIM).collect();
    (fields.len() == n).then_some(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inclusive(start: &[u8], stop: &[u8]) -> EncodedRange {
        EncodedRange {
            start: start.to_vec(),
            stop: stop.to_vec(),
            start_inclusive: true,
            stop_inclusive: true,
        }
    }

    #[test]
    fn test_join_fields() {
        assert_eq!(join_fields(&[b"a".as_slice(), b"bc"]), b"a\x00bc".to_vec());
        assert_eq!(join_fields::<&[u8]>(&[]), Vec::<u8>::new());
    }

    #[test]
    fn test_row_hash() {
        assert_eq!(
            row_hash(b"abc"),
            b"ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad".to_vec()
        );
        assert_eq!(row_hash(b"urn:p").len(), 64);
        assert!(!row_hash(b"urn:p").contains(&DELIM));
    }

    #[test]
    fn test_prefix_bounds_partial() {
        let r = prefix_bounds(&[b"urn:p".as_slice()], false);
        assert_eq!(r.start, b"urn:p\x00".to_vec());
        assert_eq!(r.stop, b"urn:p\x00\xff".to_vec());
        assert!(r.contains(b"urn:p\x00anything"));
        assert!(!r.contains(b"urn:pq\x00x"));
        assert!(!r.contains(b"urn:p"));
    }

    #[test]
    fn test_prefix_bounds_complete() {
        let r = prefix_bounds(&[b"s".as_slice(), b"p", b"o"], true);
        assert_eq!(r.start, b"s\x00p\x00o".to_vec());
        assert_eq!(r.stop, b"s\x00p\x00o\x00\xff".to_vec());
        assert!(r.contains(b"s\x00p\x00o"));
        assert!(!r.contains(b"s\x00p\x00oo"));
    }

    #[test]
    fn test_range_bounds_anchor() {
        let r = range_bounds::<&[u8]>(&[], &inclusive(b"a", b"c"), &[]);
        assert_eq!(r.start, b"a".to_vec());
        assert_eq!(r.stop, b"c\x00\xff".to_vec());
        assert!(r.contains(b"c\x00x"));
        assert!(!r.contains(b"ca\x00x"));
    }

    #[test]
    fn test_range_bounds_with_trailing_scalar() {
        let r = range_bounds(&[b"p".as_slice()], &inclusive(b"a", b"c"), &[b"s".as_slice()]);
        assert_eq!(r.start, b"p\x00a\x00s".to_vec());
        assert_eq!(r.stop, b"p\x00c\x00s\x00\xff".to_vec());
    }

    #[test]
    fn test_range_bounds_exclusive_ends() {
        let range = EncodedRange {
            start: b"b".to_vec(),
            stop: b"d".to_vec(),
            start_inclusive: false,
            stop_inclusive: false,
        };
        let r = range_bounds(&[b"p".as_slice()], &range, &[]);
        assert_eq!(r.start, b"p\x00b\x00\xff".to_vec());
        assert_eq!(r.stop, b"p\x00d".to_vec());
        assert!(!r.contains(b"p\x00b"));
        assert!(r.contains(b"p\x00ba"));
        assert!(r.contains(b"p\x00c"));
        assert!(!r.contains(b"p\x00d"));
    }

    #[test]
    fn test_split_fields() {
        let row = b"s\x00p\x00o\x01\x03";
        let fields = split_fields(row, 3).unwrap();
        assert_eq!(fields, vec![b"s".as_slice(), b"p", b"o\x01\x03"]);
        assert!(split_fields(b"s\x00p", 3).is_none());
    }

    #[test]
    fn test_empty_range() {
        assert!(ByteRange::new(b"b".to_vec(), b"a".to_vec()).is_empty());
        assert!(!ByteRange::new(b"a".to_vec(), b"b".to_vec()).is_empty());
    }
}
