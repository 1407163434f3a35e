//! Contains the record structures and the raw word codec of the FE-I4
//! readout format.
//!
//! In order to parse these structures from raw byte buffers, please have a
//! look at the functions in parser.rs.
//!
//! # References
//! The bit-level layout follows the FE-I4 data output format:
//!
//!   * The FE-I4B Integrated Circuit Guide
//!   * https://github.com/SiLab-Bonn/pyBAR

use bitflags::*;

/// Lowest valid pixel column (1-based).
pub const MIN_COLUMN: u16 = 1;
/// Highest valid pixel column.
pub const MAX_COLUMN: u16 = 80;
/// Lowest valid pixel row (1-based).
pub const MIN_ROW: u16 = 1;
/// Highest valid pixel row.
pub const MAX_ROW: u16 = 336;

/// Number of distinct service record codes.
pub const N_SERVICE_RECORDS: usize = 32;
/// Number of event error code bits that are histogrammed.
pub const N_ERROR_CODES: usize = 16;
/// Number of trigger error code bits that are histogrammed.
pub const N_TRIGGER_ERROR_CODES: usize = 8;
/// Number of distinct TDC counter values (12 bit).
pub const N_TDC_VALUES: usize = 4096;
/// TDC value depth of the per-pixel TDC histogram.
pub const N_TDC_PIXEL_VALUES: usize = 2048;

/// Relative BCID depth of the clusterizer hit maps. 16 would do for the
/// FE in normal mode, 256 covers stop mode.
pub const MAX_BCID_WINDOW: usize = 256;
/// ToT depth of the charge calibration lookup.
pub const MAX_TOT_LOOKUP: usize = 14;
/// Number of ToT bins of the cluster ToT histogram.
pub const MAX_TOT_BINS: usize = 128;
/// Number of bins of the cluster size histogram.
pub const MAX_CLUSTER_HITS_BINS: usize = 1024;

/// Capacity of the event-local hit buffer. Events producing more hits are
/// truncated and split.
pub const MAX_HIT_BUFFER_SIZE: usize = 4_000_000;

// Trigger word: the top bit marks the word, the rest is payload.
const TRIGGER_WORD_HEADER_MASK: u32 = 0x8000_0000;
const TRIGGER_PAYLOAD_MASK: u32 = 0x7FFF_FFFF;

// TDC word.
const TDC_HEADER_MASK: u32 = 0xF000_0000;
const TDC_HEADER: u32 = 0x4000_0000;
const TDC_COUNT_MASK: u32 = 0x0000_0FFF;
const TDC_TIME_STAMP_MASK: u32 = 0x0FFF_F000;
const TDC_TRIG_DIST_MASK: u32 = 0x0FF0_0000;

// Data header (DH). The identifying mask is shared by the address, value
// and service records.
const DATA_HEADER: u32 = 0x00E9_0000;
const DATA_HEADER_MASK: u32 = 0xF0FF_0000;
const DATA_HEADER_FLAG_MASK: u32 = 0x0000_8000;
const DATA_HEADER_LVL1ID_MASK: u32 = 0x0000_7F00;
// Data format changed in FE-I4B: upper LVL1ID bits arrive via service
// record 14 and the BCID counter grew to 10 bit.
const DATA_HEADER_LVL1ID_MASK_FEI4B: u32 = 0x0000_7C00;
const DATA_HEADER_BCID_MASK: u32 = 0x0000_00FF;
const DATA_HEADER_BCID_MASK_FEI4B: u32 = 0x0000_03FF;

// Data record (DR).
const DATA_RECORD_MASK: u32 = 0xF000_0000;
const DATA_RECORD_COLUMN_MASK: u32 = 0x00FE_0000;
const DATA_RECORD_ROW_MASK: u32 = 0x0001_FF00;
const DATA_RECORD_TOT1_MASK: u32 = 0x0000_00F0;
const DATA_RECORD_TOT2_MASK: u32 = 0x0000_000F;

// Address record (AR).
const ADDRESS_RECORD: u32 = 0x00EA_0000;
const ADDRESS_RECORD_TYPE_MASK: u32 = 0x0000_8000;
const ADDRESS_RECORD_ADDRESS_MASK: u32 = 0x0000_7FFF;

// Value record (VR).
const VALUE_RECORD: u32 = 0x00EC_0000;
const VALUE_RECORD_VALUE_MASK: u32 = 0x0000_FFFF;

// Service record (SR).
const SERVICE_RECORD: u32 = 0x00EF_0000;
const SERVICE_RECORD_CODE_MASK: u32 = 0x0000_FC00;
const SERVICE_RECORD_COUNTER_MASK: u32 = 0x0000_03FF;
// FE-I4B reinterprets SR 14 as carrier of the upper LVL1ID and BCID bits
// and SR 16 as an ETC/time field.
const SERVICE_RECORD_LVL1ID_MASK_FEI4B: u32 = 0x0000_03F8;
const SERVICE_RECORD_BCID_MASK_FEI4B: u32 = 0x0000_0007;
const SERVICE_RECORD_ETC_MASK_FEI4B: u32 = 0x0000_01F0;

// Empty record: the all-zero word.
const EMPTY_RECORD: u32 = 0x0000_0000;

/// ToT code that denotes "no hit" in a data record.
pub const TOT_NO_HIT: u8 = 0xF;

/// The two FE-I4 chip revisions. They differ in the BCID counter width and
/// in how the upper LVL1ID bits are transported.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Flavor {
    FeI4A,
    FeI4B,
}

impl Flavor {
    /// Size of the cyclic bunch crossing counter: 8 bit for flavor A,
    /// 10 bit for flavor B.
    pub fn bcid_counter_size(self) -> u32 {
        match self {
            Flavor::FeI4A => 256,
            Flavor::FeI4B => 1024,
        }
    }
}

impl Default for Flavor {
    fn default() -> Flavor {
        Flavor::FeI4A
    }
}

/// Marker word starting a new BCID slice of detector data.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct DataHeader {
    pub flag: bool,
    /// 7 bit for flavor A, 5 bit for flavor B (upper bits come via SR 14).
    pub lvl1_id: u16,
    /// 8 bit for flavor A, 10 bit for flavor B.
    pub bcid: u16,
}

/// A word carrying up to two hits in one column, rows `row` and `row + 1`.
///
/// A ToT code of [`TOT_NO_HIT`] means the slot is empty; codes above the
/// interpreter's ToT cut are late/small hits and are dropped there.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct DataRecord {
    pub column: u16,
    pub row: u16,
    pub tot1: u8,
    pub tot2: u8,
}

/// External trigger word. The low 31 bits are either a trigger number or a
/// trigger time stamp; the readout mode decides, so the raw payload is kept.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct TriggerWord {
    pub payload: u32,
}

/// Housekeeping/status word from the chip.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ServiceRecord {
    pub code: u8,
    /// Counter value with the flavor rules applied: for FE-I4B, code 14 is
    /// stored with count 1 and code 16 carries the ETC field.
    pub count: u16,
    /// Upper LVL1ID bits, only meaningful for FE-I4B SR 14.
    pub lvl1_id_upper: u8,
    /// Upper BCID bits, only meaningful for FE-I4B SR 14.
    pub bcid_upper: u8,
}

/// Time-to-digital converter word. Carries a running time stamp or, in
/// trigger-distance mode, the delay between trigger and TDC leading edge;
/// both interpretations are decoded, the interpreter picks one.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct TdcWord {
    pub count: u16,
    pub time_stamp: u16,
    pub trigger_distance: u8,
}

/// Configuration readback address, either a global or a shift register one.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct AddressRecord {
    pub shift_register: bool,
    pub address: u16,
}

/// Configuration readback value.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ValueRecord {
    pub value: u16,
}

/// One classified 24-bit readout word (in the low bits of a 32-bit word).
///
/// Classification is total and disjoint: every word maps to exactly one
/// variant, anything unrecognized lands in `Unknown`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RawWord {
    DataHeader(DataHeader),
    DataRecord(DataRecord),
    Trigger(TriggerWord),
    ServiceRecord(ServiceRecord),
    Tdc(TdcWord),
    AddressRecord(AddressRecord),
    ValueRecord(ValueRecord),
    EmptyRecord,
    Unknown(u32),
}

impl RawWord {
    /// Classify and decode a single raw word.
    ///
    /// This is the inner loop of the interpreter: one dispatched check on
    /// the identifying bits instead of nested mask cascades.
    pub fn decode(word: u32, flavor: Flavor) -> RawWord {
        if word & TRIGGER_WORD_HEADER_MASK != 0 {
            return RawWord::Trigger(TriggerWord {
                payload: word & TRIGGER_PAYLOAD_MASK,
            });
        }
        if word & TDC_HEADER_MASK == TDC_HEADER {
            return RawWord::Tdc(TdcWord {
                count: (word & TDC_COUNT_MASK) as u16,
                time_stamp: ((word & TDC_TIME_STAMP_MASK) >> 12) as u16,
                trigger_distance: ((word & TDC_TRIG_DIST_MASK) >> 20) as u8,
            });
        }
        if word & 0xF000_0000 != 0 {
            return RawWord::Unknown(word);
        }
        if word == EMPTY_RECORD {
            return RawWord::EmptyRecord;
        }
        // the four record kinds share one identifying mask
        match word & DATA_HEADER_MASK {
            DATA_HEADER => RawWord::DataHeader(Self::decode_data_header(word, flavor)),
            ADDRESS_RECORD => RawWord::AddressRecord(AddressRecord {
                shift_register: word & ADDRESS_RECORD_TYPE_MASK == ADDRESS_RECORD_TYPE_MASK,
                address: (word & ADDRESS_RECORD_ADDRESS_MASK) as u16,
            }),
            VALUE_RECORD => RawWord::ValueRecord(ValueRecord {
                value: (word & VALUE_RECORD_VALUE_MASK) as u16,
            }),
            SERVICE_RECORD => RawWord::ServiceRecord(Self::decode_service_record(word, flavor)),
            _ => Self::decode_data_record(word),
        }
    }

    fn decode_data_header(word: u32, flavor: Flavor) -> DataHeader {
        let (lvl1_id, bcid) = match flavor {
            Flavor::FeI4A => (
                ((word & DATA_HEADER_LVL1ID_MASK) >> 8) as u16,
                (word & DATA_HEADER_BCID_MASK) as u16,
            ),
            Flavor::FeI4B => (
                ((word & DATA_HEADER_LVL1ID_MASK_FEI4B) >> 10) as u16,
                (word & DATA_HEADER_BCID_MASK_FEI4B) as u16,
            ),
        };
        DataHeader {
            flag: word & DATA_HEADER_FLAG_MASK == DATA_HEADER_FLAG_MASK,
            lvl1_id,
            bcid,
        }
    }

    fn decode_service_record(word: u32, flavor: Flavor) -> ServiceRecord {
        let code = ((word & SERVICE_RECORD_CODE_MASK) >> 10) as u8;
        let mut record = ServiceRecord {
            code,
            count: (word & SERVICE_RECORD_COUNTER_MASK) as u16,
            lvl1_id_upper: 0,
            bcid_upper: 0,
        };
        if flavor == Flavor::FeI4B {
            match code {
                14 => {
                    record.count = 1;
                    record.lvl1_id_upper = ((word & SERVICE_RECORD_LVL1ID_MASK_FEI4B) >> 3) as u8;
                    record.bcid_upper = (word & SERVICE_RECORD_BCID_MASK_FEI4B) as u8;
                }
                16 => {
                    record.count = ((word & SERVICE_RECORD_ETC_MASK_FEI4B) >> 4) as u16;
                }
                _ => {}
            }
        }
        record
    }

    fn decode_data_record(word: u32) -> RawWord {
        debug_assert!(word & DATA_RECORD_MASK == 0);
        let column = ((word & DATA_RECORD_COLUMN_MASK) >> 17) as u16;
        let row = ((word & DATA_RECORD_ROW_MASK) >> 8) as u16;
        if column < MIN_COLUMN || column > MAX_COLUMN || row < MIN_ROW || row > MAX_ROW {
            return RawWord::Unknown(word);
        }
        RawWord::DataRecord(DataRecord {
            column,
            row,
            tot1: ((word & DATA_RECORD_TOT1_MASK) >> 4) as u8,
            tot2: (word & DATA_RECORD_TOT2_MASK) as u8,
        })
    }
}

impl DataRecord {
    /// The second hit sits one row below the first, if its slot is filled.
    pub fn row2(&self) -> u16 {
        self.row + 1
    }
}

bitflags! {
    /// Per-event status bits, OR-accumulated while the event is decoded and
    /// stamped on every hit of the event at finalization.
    pub struct EventStatus: u16 {
        /// The event has service records.
        const HAS_SR = 1 << 0;
        /// The event has no trigger word; expected without external triggering.
        const NO_TRG_WORD = 1 << 1;
        /// LVL1ID changes within one event; expected for self triggering.
        const NON_CONST_LVL1ID = 1 << 2;
        /// BCID not increasing by 1, most likely incomplete data transmission.
        const EVENT_INCOMPLETE = 1 << 3;
        /// The event has unknown words.
        const UNKNOWN_WORD = 1 << 4;
        /// BCID jumps, but LVL1ID is constant or the data is externally aligned.
        const BCID_JUMP = 1 << 5;
        /// An external trigger error occurred.
        const TRG_ERROR = 1 << 6;
        /// The event had too many hits or headers and was truncated.
        const TRUNC_EVENT = 1 << 7;
        /// The event has a TDC word.
        const TDC_WORD = 1 << 8;
        /// The event has more than one valid TDC word.
        const MANY_TDC_WORDS = 1 << 9;
        /// The event has a TDC word indicating a TDC overflow.
        const TDC_OVERFLOW = 1 << 10;
        /// Event without any hit; useful for trigger number debugging.
        const NO_HIT = 1 << 11;
    }
}

impl EventStatus {
    pub fn has_service_record(&self) -> bool {
        self.contains(EventStatus::HAS_SR)
    }

    pub fn has_no_trigger_word(&self) -> bool {
        self.contains(EventStatus::NO_TRG_WORD)
    }

    pub fn is_incomplete(&self) -> bool {
        self.contains(EventStatus::EVENT_INCOMPLETE)
    }

    pub fn is_truncated(&self) -> bool {
        self.contains(EventStatus::TRUNC_EVENT)
    }

    pub fn is_virtual_hit(&self) -> bool {
        self.contains(EventStatus::NO_HIT)
    }
}

bitflags! {
    /// Trigger error bits of one event.
    pub struct TriggerStatus: u8 {
        /// Two consecutive trigger numbers do not increase by exactly one
        /// (counter overflow handled separately).
        const NUMBER_INC_ERROR = 1 << 0;
        /// More than one trigger word per event.
        const NUMBER_MORE_ONE = 1 << 1;
        /// TLU trigger accept error.
        const TRG_ACCEPT = 1 << 2;
        /// TLU low timeout error.
        const LOW_TIMEOUT = 1 << 3;
    }
}

impl TriggerStatus {
    pub fn has_increment_error(&self) -> bool {
        self.contains(TriggerStatus::NUMBER_INC_ERROR)
    }

    pub fn has_more_than_one(&self) -> bool {
        self.contains(TriggerStatus::NUMBER_MORE_ONE)
    }
}

/// One reconstructed hit with its event metadata.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Hit {
    pub event_number: u64,
    /// External trigger number of the event.
    pub trigger_number: u32,
    /// Relative BCID within the event window.
    pub relative_bcid: u8,
    pub lvl1_id: u16,
    pub column: u16,
    pub row: u16,
    pub tot: u8,
    /// Absolute BCID of the data header the hit belongs to.
    pub bcid: u16,
    /// TDC count of the event, zero if no TDC word occurred.
    pub tdc: u16,
    /// TDC time stamp, either a counter or the trigger distance.
    pub tdc_time_stamp: u8,
    pub trigger_status: TriggerStatus,
    /// OR of the service record codes seen in the event.
    pub service_record: u32,
    pub event_status: EventStatus,
}

impl Default for Hit {
    fn default() -> Hit {
        Hit {
            event_number: 0,
            trigger_number: 0,
            relative_bcid: 0,
            lvl1_id: 0,
            column: 0,
            row: 0,
            tot: 0,
            bcid: 0,
            tdc: 0,
            tdc_time_stamp: 0,
            trigger_status: TriggerStatus::empty(),
            service_record: 0,
            event_status: EventStatus::empty(),
        }
    }
}

/// One hit enriched with the cluster information of its event.
///
/// Row `i` of the cluster hit table aligns with row `i` of the hit table
/// it was built from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterHit {
    pub event_number: u64,
    pub trigger_number: u32,
    pub relative_bcid: u8,
    pub lvl1_id: u16,
    pub column: u16,
    pub row: u16,
    pub tot: u8,
    pub bcid: u16,
    pub tdc: u16,
    pub tdc_time_stamp: u8,
    pub trigger_status: TriggerStatus,
    pub service_record: u32,
    pub event_status: EventStatus,
    /// Dense per-event cluster id the hit belongs to.
    pub cluster_id: u16,
    /// 1 for exactly one hit per cluster.
    pub is_seed: u8,
    pub cluster_size: u16,
    /// Number of accepted clusters in the hit's event.
    pub n_cluster_in_event: u16,
}

impl ClusterHit {
    /// Copy the plain hit fields; the cluster fields start out unset.
    pub fn from_hit(hit: &Hit) -> ClusterHit {
        ClusterHit {
            event_number: hit.event_number,
            trigger_number: hit.trigger_number,
            relative_bcid: hit.relative_bcid,
            lvl1_id: hit.lvl1_id,
            column: hit.column,
            row: hit.row,
            tot: hit.tot,
            bcid: hit.bcid,
            tdc: hit.tdc,
            tdc_time_stamp: hit.tdc_time_stamp,
            trigger_status: hit.trigger_status,
            service_record: hit.service_record,
            event_status: hit.event_status,
            cluster_id: 0,
            is_seed: 0,
            cluster_size: 0,
            n_cluster_in_event: 0,
        }
    }
}

impl Default for ClusterHit {
    fn default() -> ClusterHit {
        ClusterHit::from_hit(&Hit::default())
    }
}

/// One cluster of spatially and temporally grouped hits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterInfo {
    pub event_number: u64,
    /// Dense cluster id within the event, starting at 0.
    pub id: u16,
    pub size: u16,
    /// Summed ToT of all cluster hits.
    pub tot: u16,
    /// Summed charge of all cluster hits.
    pub charge: f32,
    pub seed_column: u16,
    pub seed_row: u16,
    /// Charge-weighted mean position, 1-based like column/row.
    pub mean_column: f32,
    pub mean_row: f32,
    pub event_status: EventStatus,
}

impl Default for ClusterInfo {
    fn default() -> ClusterInfo {
        ClusterInfo {
            event_number: 0,
            id: 0,
            size: 0,
            tot: 0,
            charge: 0.0,
            seed_column: 0,
            seed_row: 0,
            mean_column: 0.0,
            mean_row: 0.0,
            event_status: EventStatus::empty(),
        }
    }
}

/// One readout window of the input meta data table (V1 layout).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetaInfo {
    /// First raw data word index of this readout.
    pub start_index: u32,
    /// One past the last raw data word index of this readout.
    pub stop_index: u32,
    /// Number of data words in this readout.
    pub length: u32,
    pub time_stamp: f64,
    /// Error code of the readout system, 0 means no error.
    pub error_code: u32,
}

/// One readout window of the input meta data table (V2 layout, with start
/// and stop time stamps).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetaInfoV2 {
    pub start_index: u32,
    pub stop_index: u32,
    pub length: u32,
    pub start_time_stamp: f64,
    pub stop_time_stamp: f64,
    pub error_code: u32,
}

/// One row of the derived output meta data, one per readout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetaInfoOut {
    /// Event number of the first event touching the readout.
    pub event_index: u64,
    pub time_stamp: f64,
    pub error_code: u32,
}

/// Start/stop word range of one event, emitted when the word index output
/// is enabled.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct MetaWordInfo {
    pub event_index: u64,
    pub start_word_index: u32,
    pub stop_word_index: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn data_record_two_hits() {
        // col 1, row 14, ToT 8 and 7
        match RawWord::decode(0x0002_0E87, Flavor::FeI4A) {
            RawWord::DataRecord(dr) => {
                assert_eq!(dr.column, 1);
                assert_eq!(dr.row, 14);
                assert_eq!(dr.row2(), 15);
                assert_eq!(dr.tot1, 8);
                assert_eq!(dr.tot2, 7);
            }
            other => panic!("expected data record, got {:?}", other),
        }
    }

    #[rstest]
    #[case::column_zero(0x0000_0E87)]
    #[case::column_too_large(0x00A2_0E87)] // col 81
    #[case::row_zero(0x0002_0087)]
    #[case::row_too_large(0x0003_5187)] // row 337
    fn data_record_out_of_range_is_unknown(#[case] word: u32) {
        assert_eq!(RawWord::decode(word, Flavor::FeI4A), RawWord::Unknown(word));
    }

    #[rstest]
    #[case::fei4a(Flavor::FeI4A, 0x00E9_3AB5, 0x3A, 0xB5)]
    #[case::fei4b(Flavor::FeI4B, 0x00E9_3AB5, 0x0E, 0x2B5)]
    fn data_header_fields(
        #[case] flavor: Flavor,
        #[case] word: u32,
        #[case] lvl1_id: u16,
        #[case] bcid: u16,
    ) {
        match RawWord::decode(word, flavor) {
            RawWord::DataHeader(dh) => {
                assert_eq!(dh.lvl1_id, lvl1_id);
                assert_eq!(dh.bcid, bcid);
            }
            other => panic!("expected data header, got {:?}", other),
        }
    }

    #[test]
    fn trigger_word_payload() {
        match RawWord::decode(0x8000_002A, Flavor::FeI4A) {
            RawWord::Trigger(tr) => assert_eq!(tr.payload, 42),
            other => panic!("expected trigger word, got {:?}", other),
        }
        // Any word with the top bit set is a trigger word.
        match RawWord::decode(0xFFFF_FFFF, Flavor::FeI4A) {
            RawWord::Trigger(tr) => assert_eq!(tr.payload, 0x7FFF_FFFF),
            other => panic!("expected trigger word, got {:?}", other),
        }
    }

    #[test]
    fn tdc_word_fields() {
        match RawWord::decode(0x4A5B_C123, Flavor::FeI4A) {
            RawWord::Tdc(tdc) => {
                assert_eq!(tdc.count, 0x123);
                assert_eq!(tdc.time_stamp, 0xA5BC);
                assert_eq!(tdc.trigger_distance, 0xA5);
            }
            other => panic!("expected tdc word, got {:?}", other),
        }
    }

    #[test]
    fn service_record_counter() {
        // code 9, counter 0x155
        match RawWord::decode(0x00EF_2555, Flavor::FeI4A) {
            RawWord::ServiceRecord(sr) => {
                assert_eq!(sr.code, 9);
                assert_eq!(sr.count, 0x155);
            }
            other => panic!("expected service record, got {:?}", other),
        }
    }

    #[test]
    fn service_record_14_fei4b_carries_upper_lvl1id() {
        // code 14, LVL1ID upper bits 5, BCID upper bits 3
        let word = 0x00EF_0000 | (14 << 10) | (5 << 3) | 3;
        match RawWord::decode(word, Flavor::FeI4B) {
            RawWord::ServiceRecord(sr) => {
                assert_eq!(sr.code, 14);
                assert_eq!(sr.count, 1);
                assert_eq!(sr.lvl1_id_upper, 5);
                assert_eq!(sr.bcid_upper, 3);
            }
            other => panic!("expected service record, got {:?}", other),
        }
        // Flavor A keeps the plain counter.
        match RawWord::decode(word, Flavor::FeI4A) {
            RawWord::ServiceRecord(sr) => {
                assert_eq!(sr.count, ((5 << 3) | 3) as u16);
                assert_eq!(sr.lvl1_id_upper, 0);
            }
            other => panic!("expected service record, got {:?}", other),
        }
    }

    #[test]
    fn service_record_16_fei4b_carries_etc() {
        // code 16, ETC field 0x15, L1Req 0x3
        let word = 0x00EF_0000 | (16 << 10) | (0x15 << 4) | 3;
        match RawWord::decode(word, Flavor::FeI4B) {
            RawWord::ServiceRecord(sr) => {
                assert_eq!(sr.code, 16);
                assert_eq!(sr.count, 0x15);
            }
            other => panic!("expected service record, got {:?}", other),
        }
        match RawWord::decode(word, Flavor::FeI4A) {
            RawWord::ServiceRecord(sr) => {
                assert_eq!(sr.count, ((0x15 << 4) | 3) as u16);
            }
            other => panic!("expected service record, got {:?}", other),
        }
    }

    #[rstest]
    #[case::empty(0x0000_0000)]
    #[case::address(0x00EA_8123)]
    #[case::value(0x00EC_BEEF)]
    fn housekeeping_words(#[case] word: u32) {
        match RawWord::decode(word, Flavor::FeI4A) {
            RawWord::EmptyRecord | RawWord::AddressRecord(_) | RawWord::ValueRecord(_) => {}
            other => panic!("expected housekeeping word, got {:?}", other),
        }
    }

    #[test]
    fn address_record_shift_register_flag() {
        match RawWord::decode(0x00EA_8123, Flavor::FeI4A) {
            RawWord::AddressRecord(ar) => {
                assert!(ar.shift_register);
                assert_eq!(ar.address, 0x123);
            }
            other => panic!("expected address record, got {:?}", other),
        }
    }

    #[rstest]
    #[case(0x00EB_0000)] // unused identifying byte
    #[case(0x30E9_0000)] // data header pattern with reserved bits set
    #[case(0x0FFF_FFFF)]
    fn unclassifiable_words(#[case] word: u32) {
        assert_eq!(RawWord::decode(word, Flavor::FeI4A), RawWord::Unknown(word));
    }

    #[test]
    fn classification_is_total() {
        // A sweep over the identifying byte must always produce a variant.
        for byte in 0..=0xFFu32 {
            let _ = RawWord::decode(byte << 16 | 0x1234, Flavor::FeI4A);
            let _ = RawWord::decode(byte << 16 | 0x1234, Flavor::FeI4B);
        }
    }
}
