//! Streaming base64 decoder with periodic record skipping.
//!
//! Decodes a base64 text payload straight into a caller-owned, fixed-size
//! byte buffer. When a record size and point ratio are given, only the first
//! record of every `point_ratio` records is written; the characters of the
//! skipped records are stepped over without being decoded.
//!
//! ## Skip arithmetic
//!
//! Base64 carries 6 bits per character while records are whole bytes, so a
//! record boundary usually falls inside a character. At every boundary the
//! decoder holds `leftover` bits of the last consumed character. To skip
//! `skip_bits = (point_ratio - 1) * record_size * 8` bits it advances the
//! cursor by `ceil((skip_bits - leftover) / 6)` characters. The new leftover
//! is whatever those characters overshoot `skip_bits` by (always `0..6`), and
//! when it is non-zero the accumulator is reloaded from the character under
//! the cursor.
//!
//! ```rust
//! use pointstream::codec::decode;
//!
//! // "AAECAwQF" is six bytes 0..=5; keep records 0 and 2 of three 2-byte records.
//! let mut out = [0u8; 4];
//! let records = decode(b"AAECAwQF", &mut out, 2, 2);
//! assert_eq!(records, 2);
//! assert_eq!(out, [0, 1, 4, 5]);
//! ```

use tracing::trace;

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const PADDING: u8 = b'=';
const INVALID: u8 = 0xFF;

/// Character to 6-bit value lookup, `INVALID` outside the alphabet.
static DECODE_TABLE: [u8; 256] = build_decode_table();

const fn build_decode_table() -> [u8; 256] {
    let mut table = [INVALID; 256];
    let mut i = 0;
    while i < ALPHABET.len() {
        table[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
}

/// Position and value of the first character outside the base64 alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidCharacter {
    pub position: usize,
    pub byte: u8,
}

/// Outcome of a streaming decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeReport {
    /// Complete records written to the output
    pub records: usize,
    /// Bytes written to the output, including a partial trailing record
    pub bytes_written: usize,
    /// Set when decoding stopped on an illegal character
    pub invalid: Option<InvalidCharacter>,
}

impl DecodeReport {
    /// Whether decoding stopped early on an illegal character.
    pub fn is_truncated(&self) -> bool {
        self.invalid.is_some()
    }
}

enum Lookup {
    Value(u8),
    Padding,
    Invalid,
}

#[inline]
fn lookup(byte: u8) -> Lookup {
    match DECODE_TABLE[byte as usize] {
        INVALID if byte == PADDING => Lookup::Padding,
        INVALID => Lookup::Invalid,
        value => Lookup::Value(value),
    }
}

/// Decode `input` into `output` and return the number of complete records.
///
/// `record_size` of 0 means the whole output is one record; `point_ratio` of
/// 0 or 1 disables skipping. See [`decode_with_report`] for details.
pub fn decode(input: &[u8], output: &mut [u8], record_size: usize, point_ratio: usize) -> usize {
    decode_with_report(input, output, record_size, point_ratio).records
}

/// Decode `input` into `output`, keeping one record out of every `point_ratio`.
///
/// Stops when the input is exhausted, the output is full, a `=` padding
/// character is reached, or a character outside the alphabet is found. The
/// last case is reported through [`DecodeReport::invalid`]; everything
/// written before it stays valid.
pub fn decode_with_report(
    input: &[u8],
    output: &mut [u8],
    record_size: usize,
    point_ratio: usize,
) -> DecodeReport {
    let record_size = if record_size == 0 { output.len() } else { record_size };
    if record_size == 0 {
        return DecodeReport::default();
    }

    let point_ratio = point_ratio.max(1);
    let skip_bits = (point_ratio - 1).saturating_mul(record_size).saturating_mul(8);

    let mut acc: u32 = 0;
    let mut leftover: usize = 0;
    let mut written = 0;
    let mut cursor = 0;
    let mut invalid = None;

    'decode: while cursor < input.len() && written < output.len() {
        let value = match lookup(input[cursor]) {
            Lookup::Value(value) => value,
            Lookup::Padding => break,
            Lookup::Invalid => {
                invalid = Some(InvalidCharacter { position: cursor, byte: input[cursor] });
                break;
            }
        };

        acc = ((acc << 6) | value as u32) & 0xFFFF;
        leftover += 6;

        if leftover >= 8 {
            leftover -= 8;
            output[written] = (acc >> leftover) as u8;
            written += 1;

            if written % record_size == 0 && skip_bits > 0 {
                let advance = (skip_bits - leftover).div_ceil(6);
                cursor = cursor.saturating_add(advance);
                leftover = leftover + advance * 6 - skip_bits;

                if leftover > 0 {
                    let Some(&byte) = input.get(cursor) else {
                        break;
                    };
                    match lookup(byte) {
                        Lookup::Value(value) => acc = value as u32,
                        Lookup::Padding => break 'decode,
                        Lookup::Invalid => {
                            invalid = Some(InvalidCharacter { position: cursor, byte });
                            break 'decode;
                        }
                    }
                }
            }
        }

        cursor += 1;
    }

    let records = written / record_size;
    trace!(
        "Decoded {} bytes ({} records, ratio {}) from {} chars",
        written,
        records,
        point_ratio,
        input.len()
    );

    DecodeReport { records, bytes_written: written, invalid }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use proptest::prelude::*;

    fn records(count: usize, record_size: usize) -> Vec<u8> {
        (0..count * record_size).map(|i| (i * 7 + i / record_size) as u8).collect()
    }

    fn expected_subsample(source: &[u8], record_size: usize, ratio: usize) -> Vec<u8> {
        source.chunks(record_size).step_by(ratio).filter(|r| r.len() == record_size).flatten().copied().collect()
    }

    proptest! {
        #[test]
        fn prop_roundtrip_without_skipping(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
            let text = STANDARD.encode(&bytes);
            let mut out = vec![0u8; bytes.len()];
            let report = decode_with_report(text.as_bytes(), &mut out, 0, 1);

            prop_assert_eq!(report.bytes_written, bytes.len());
            prop_assert!(report.invalid.is_none());
            prop_assert_eq!(out, bytes);
        }

        #[test]
        fn prop_subsampling_keeps_every_kth_record(
            record_size in 1usize..24,
            ratio in 1usize..7,
            count in 0usize..40
        ) {
            let source = records(count, record_size);
            let text = STANDARD.encode(&source);
            let expected = expected_subsample(&source, record_size, ratio);

            let mut out = vec![0u8; expected.len()];
            let decoded = decode(text.as_bytes(), &mut out, record_size, ratio);

            prop_assert_eq!(decoded, count.div_ceil(ratio));
            prop_assert_eq!(out, expected);
        }

        #[test]
        fn prop_output_bounds_are_respected(
            record_size in 1usize..24,
            ratio in 1usize..5,
            count in 0usize..40,
            capacity in 0usize..128
        ) {
            let source = records(count, record_size);
            let text = STANDARD.encode(&source);

            // Guard bytes after the slice handed to the decoder
            let mut backing = vec![0xEEu8; capacity + 8];
            let report = decode_with_report(text.as_bytes(), &mut backing[..capacity], record_size, ratio);

            prop_assert!(report.records <= capacity / record_size);
            prop_assert!(report.bytes_written <= capacity);
            prop_assert!(backing[capacity..].iter().all(|&b| b == 0xEE));

            let expected = expected_subsample(&source, record_size, ratio);
            let whole = report.records * record_size;
            prop_assert_eq!(&backing[..whole], &expected[..whole]);
        }
    }

    #[test]
    fn table_covers_alphabet_only() {
        assert_eq!(DECODE_TABLE[b'A' as usize], 0);
        assert_eq!(DECODE_TABLE[b'z' as usize], 51);
        assert_eq!(DECODE_TABLE[b'/' as usize], 63);
        assert_eq!(DECODE_TABLE.iter().filter(|&&v| v != INVALID).count(), 64);
        assert_eq!(DECODE_TABLE[b'=' as usize], INVALID);
    }

    #[test]
    fn skip_span_multiple_of_six_bits() {
        // 3-byte records: every boundary lands on a character boundary
        let source = records(7, 3);
        let text = STANDARD.encode(&source);
        let mut out = vec![0u8; 4 * 3];
        assert_eq!(decode(text.as_bytes(), &mut out, 3, 2), 4);
        assert_eq!(out, expected_subsample(&source, 3, 2));
    }

    #[test]
    fn skip_span_not_multiple_of_six_bits() {
        // 16-byte records: boundaries alternate through leftover 4, 2, 0
        let source = records(9, 16);
        let text = STANDARD.encode(&source);
        let mut out = vec![0u8; 3 * 16];
        assert_eq!(decode(text.as_bytes(), &mut out, 16, 3), 3);
        assert_eq!(out, expected_subsample(&source, 16, 3));
    }

    #[test]
    fn single_byte_records_with_skip() {
        let source: Vec<u8> = (0..10).collect();
        let text = STANDARD.encode(&source);
        let mut out = vec![0u8; 5];
        assert_eq!(decode(text.as_bytes(), &mut out, 1, 2), 5);
        assert_eq!(out, vec![0, 2, 4, 6, 8]);
    }

    #[test]
    fn illegal_character_truncates_to_complete_records() {
        let source = records(4, 4);
        let mut text = STANDARD.encode(&source).into_bytes();
        // Corrupt a character inside the third record (bytes 8..12 -> chars 10..16)
        text[12] = b'*';

        let mut out = vec![0u8; 16];
        let report = decode_with_report(&text, &mut out, 4, 1);

        assert_eq!(report.records, 2);
        assert_eq!(report.invalid, Some(InvalidCharacter { position: 12, byte: b'*' }));
        assert!(report.is_truncated());
        assert_eq!(&out[..8], &source[..8]);
    }

    #[test]
    fn padding_ends_stream_without_error() {
        let mut out = [0u8; 8];
        let report = decode_with_report(b"AQI=", &mut out, 1, 1);
        assert_eq!(report.bytes_written, 2);
        assert_eq!(report.records, 2);
        assert!(report.invalid.is_none());
        assert_eq!(&out[..2], &[1, 2]);
    }

    #[test]
    fn partial_trailing_record_is_not_counted() {
        let source = records(3, 4);
        let text = STANDARD.encode(&source[..10]);
        let mut out = vec![0u8; 12];
        let report = decode_with_report(text.as_bytes(), &mut out, 4, 1);
        assert_eq!(report.bytes_written, 10);
        assert_eq!(report.records, 2);
    }

    #[test]
    fn empty_inputs() {
        let mut out = [0u8; 4];
        assert_eq!(decode(b"", &mut out, 4, 1), 0);
        assert_eq!(decode(b"AAAA", &mut [], 0, 1), 0);
    }

    #[test]
    fn zero_ratio_means_no_skipping() {
        let source = records(2, 2);
        let text = STANDARD.encode(&source);
        let mut out = vec![0u8; 4];
        assert_eq!(decode(text.as_bytes(), &mut out, 2, 0), 2);
        assert_eq!(out, source);
    }
}
