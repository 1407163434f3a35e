//! Uses the `nom` library to parse the packed little-endian buffers handed
//! over by the readout storage layer and transforms them into the record
//! structures of format.rs.
//!
//! The raw data stream itself is an array of 32-bit words; the meta data
//! tables come as packed structs (V1: 24 bytes per row, V2: 32 bytes per
//! row) and the scan parameter table as packed 32-bit signed integers.
//!
//! # See also
//!   * `format.rs` -- for the struct definitions that are parsed here
//!   * `interpret.rs` -- for the consumer of the parsed slices

use super::format::*;
use nom::*;

named!(pub parse_meta_info<&[u8], MetaInfo>,
    do_parse!(
        start_index: le_u32 >>
        stop_index: le_u32 >>
        length: le_u32 >>
        time_stamp: le_f64 >>
        error_code: le_u32 >>
        (MetaInfo {
            start_index: start_index,
            stop_index: stop_index,
            length: length,
            time_stamp: time_stamp,
            error_code: error_code,
        })
    )
);

named!(pub parse_meta_info_v2<&[u8], MetaInfoV2>,
    do_parse!(
        start_index: le_u32 >>
        stop_index: le_u32 >>
        length: le_u32 >>
        start_time_stamp: le_f64 >>
        stop_time_stamp: le_f64 >>
        error_code: le_u32 >>
        (MetaInfoV2 {
            start_index: start_index,
            stop_index: stop_index,
            length: length,
            start_time_stamp: start_time_stamp,
            stop_time_stamp: stop_time_stamp,
            error_code: error_code,
        })
    )
);

/// Parse one chunk of the raw data stream into 32-bit words.
pub fn parse_raw_words(input: &[u8], count: usize) -> IResult<&[u8], Vec<u32>> {
    count!(input, le_u32, count)
}

/// Parse a V1 meta data table.
pub fn parse_meta_table(input: &[u8], count: usize) -> IResult<&[u8], Vec<MetaInfo>> {
    count!(input, parse_meta_info, count)
}

/// Parse a V2 meta data table.
pub fn parse_meta_table_v2(input: &[u8], count: usize) -> IResult<&[u8], Vec<MetaInfoV2>> {
    count!(input, parse_meta_info_v2, count)
}

/// Parse a per-readout scan parameter table.
pub fn parse_scan_parameters(input: &[u8], count: usize) -> IResult<&[u8], Vec<i32>> {
    count!(input, le_i32, count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack_meta_v1(rows: &[(u32, u32, u32, f64, u32)]) -> Vec<u8> {
        let mut bytes = Vec::new();
        for &(start, stop, length, ts, err) in rows {
            bytes.extend_from_slice(&start.to_le_bytes());
            bytes.extend_from_slice(&stop.to_le_bytes());
            bytes.extend_from_slice(&length.to_le_bytes());
            bytes.extend_from_slice(&ts.to_le_bytes());
            bytes.extend_from_slice(&err.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn raw_words_round_trip() {
        let words = [0x00E9_0001u32, 0x0002_0E87, 0x8000_002A];
        let mut bytes = Vec::new();
        for w in &words {
            bytes.extend_from_slice(&w.to_le_bytes());
        }
        let (rest, parsed) = parse_raw_words(&bytes, words.len()).unwrap();
        assert!(rest.is_empty());
        assert_eq!(parsed, words);
    }

    #[test]
    fn meta_table_v1_layout() {
        let bytes = pack_meta_v1(&[(0, 10, 10, 1.5, 0), (10, 12, 2, 2.5, 1)]);
        assert_eq!(bytes.len(), 2 * 24);
        let (rest, table) = parse_meta_table(&bytes, 2).unwrap();
        assert!(rest.is_empty());
        assert_eq!(
            table[0],
            MetaInfo {
                start_index: 0,
                stop_index: 10,
                length: 10,
                time_stamp: 1.5,
                error_code: 0,
            }
        );
        assert_eq!(table[1].start_index, 10);
        assert_eq!(table[1].error_code, 1);
    }

    #[test]
    fn meta_table_v2_layout() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&7u32.to_le_bytes());
        bytes.extend_from_slice(&9u32.to_le_bytes());
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&0.25f64.to_le_bytes());
        bytes.extend_from_slice(&0.75f64.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        assert_eq!(bytes.len(), 32);
        let (rest, table) = parse_meta_table_v2(&bytes, 1).unwrap();
        assert!(rest.is_empty());
        assert_eq!(table[0].start_time_stamp, 0.25);
        assert_eq!(table[0].stop_time_stamp, 0.75);
    }

    #[test]
    fn scan_parameters_signed() {
        let mut bytes = Vec::new();
        for v in &[-5i32, 0, 120] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let (_, pars) = parse_scan_parameters(&bytes, 3).unwrap();
        assert_eq!(pars, vec![-5, 0, 120]);
    }

    #[test]
    fn incomplete_input_is_rejected() {
        let bytes = [0u8; 10];
        assert!(parse_meta_table(&bytes, 1).is_err());
    }
}
