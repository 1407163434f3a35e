//! Stateful raw data stream decoder and event segmenter.
//!
//! Consumes chunks of 32-bit readout words, groups them into events and
//! emits flat [`Hit`] records with the per-event metadata (trigger number,
//! status flags, service record summary, TDC) stamped on. Carries all
//! cross-chunk state, so a caller can feed an arbitrarily chunked stream
//! and pull the hits after every chunk.
//!
//! # See also
//!   * `format.rs` -- for the word codec and the record definitions
//!   * `parser.rs` -- for turning raw byte buffers into word slices

use std::fmt;
use std::mem;

use log::{debug, info, warn};

use super::format::*;
use crate::Error;

/// The readout meta data table, in either of its two on-disk layouts.
#[derive(Debug, Clone)]
enum MetaTable {
    V1(Vec<MetaInfo>),
    V2(Vec<MetaInfoV2>),
}

impl MetaTable {
    fn len(&self) -> usize {
        match self {
            MetaTable::V1(t) => t.len(),
            MetaTable::V2(t) => t.len(),
        }
    }

    fn start_index(&self, i: usize) -> u32 {
        match self {
            MetaTable::V1(t) => t[i].start_index,
            MetaTable::V2(t) => t[i].start_index,
        }
    }

    fn stop_index(&self, i: usize) -> u32 {
        match self {
            MetaTable::V1(t) => t[i].stop_index,
            MetaTable::V2(t) => t[i].stop_index,
        }
    }

    fn length(&self, i: usize) -> u32 {
        match self {
            MetaTable::V1(t) => t[i].length,
            MetaTable::V2(t) => t[i].length,
        }
    }

    fn time_stamp(&self, i: usize) -> f64 {
        match self {
            MetaTable::V1(t) => t[i].time_stamp,
            MetaTable::V2(t) => t[i].start_time_stamp,
        }
    }

    fn error_code(&self, i: usize) -> u32 {
        match self {
            MetaTable::V1(t) => t[i].error_code,
            MetaTable::V2(t) => t[i].error_code,
        }
    }
}

fn validate_meta_rows(
    rows: &[(u32, u32, u32)], // (start, stop, length)
) -> Result<(), Error> {
    if rows.is_empty() {
        warn!("set_meta_data: data is empty");
        return Err(Error::CorruptMetaTable {
            row: 0,
            reason: "table is empty".into(),
        });
    }
    for (i, &(start, stop, length)) in rows.iter().enumerate() {
        if start + length != stop {
            return Err(Error::CorruptMetaTable {
                row: i,
                reason: format!("start {} + length {} != stop {}", start, length, stop),
            });
        }
        if i + 1 < rows.len() {
            let next_start = rows[i + 1].0;
            if stop != next_start && next_start != 0 {
                return Err(Error::CorruptMetaTable {
                    row: i + 1,
                    reason: format!("readouts not contiguous: stop {} vs. start {}", stop, next_start),
                });
            }
        }
    }
    Ok(())
}

/// Raw data stream interpreter for one front end.
///
/// Owns all its output buffers; callers borrow read-only slices. The hit
/// buffer holds the hits of the most recent chunk only, every counter and
/// the readout-to-event map accumulate across chunks until [`reset`].
///
/// [`reset`]: Interpreter::reset
pub struct Interpreter {
    // analysis options
    n_bcids: u32,
    max_tot: u8,
    flavor: Flavor,
    align_at_trigger_number: bool,
    align_at_tdc_word: bool,
    use_trigger_time_stamp: bool,
    use_tdc_trigger_time_stamp: bool,
    max_tdc_delay: u8,
    max_trigger_number: u32,
    create_empty_event_hits: bool,
    create_meta_data_word_index: bool,
    debug_events: Option<(u64, u64)>,

    // interpreted output of the actual chunk
    hits: Vec<Hit>,
    meta_word_index: Vec<MetaWordInfo>,

    // hits of the event in progress; status words can only be stamped once
    // the event is complete
    hit_buffer: Vec<Hit>,

    // one event state
    t_n_data_header: u32,
    t_start_bcid: u32,
    t_start_lvl1_id: u16,
    t_db_cid: u32,
    t_trigger_error: TriggerStatus,
    t_error_code: EventStatus,
    t_service_record: u32,
    t_event_trigger_number: u32,
    t_total_hits: u32,
    t_bcid_error: bool,
    t_trigger_word: u32,
    t_tdc_count: u16,
    t_tdc_time_stamp: u8,
    t_lvl1_id_upper: u8,

    // values of the most recent word of its kind
    t_trigger_number: u32,
    t_actual_lvl1_id: u16,
    t_actual_bcid: u16,

    // counters for the total raw data processing
    n_triggers: u32,
    n_events: u64,
    n_max_hits_per_event: u32,
    n_empty_events: u32,
    n_incomplete_events: u32,
    n_tdc_words: u32,
    n_unknown_words: u32,
    n_other_words: u32,
    n_service_records: u32,
    n_data_records: u32,
    n_data_headers: u32,
    n_hits: u32,
    n_data_words: u32,
    first_trigger_number_set: bool,
    first_tdc_set: bool,
    last_trigger_number: u32,
    start_word_index: u32,
    data_word_index: u32,

    // meta data in/out
    meta_table: Option<MetaTable>,
    meta_event_index: Vec<u64>,
    last_meta_index_not_set: usize,
    last_word_index_set: u32,

    // counter histograms
    trigger_error_counter: [u32; N_TRIGGER_ERROR_CODES],
    error_counter: [u32; N_ERROR_CODES],
    service_record_counter: [u32; N_SERVICE_RECORDS],
    tdc_counter: Vec<u32>,
}

impl Interpreter {
    pub fn new() -> Interpreter {
        Interpreter {
            n_bcids: 16,
            max_tot: 13,
            flavor: Flavor::FeI4A,
            align_at_trigger_number: false,
            align_at_tdc_word: false,
            use_trigger_time_stamp: false,
            use_tdc_trigger_time_stamp: false,
            max_tdc_delay: 255,
            max_trigger_number: 0x7FFF_FFFF,
            create_empty_event_hits: false,
            create_meta_data_word_index: false,
            debug_events: None,
            hits: Vec::new(),
            meta_word_index: Vec::new(),
            hit_buffer: Vec::new(),
            t_n_data_header: 0,
            t_start_bcid: 0,
            t_start_lvl1_id: 0,
            t_db_cid: 0,
            t_trigger_error: TriggerStatus::empty(),
            t_error_code: EventStatus::empty(),
            t_service_record: 0,
            t_event_trigger_number: 0,
            t_total_hits: 0,
            t_bcid_error: false,
            t_trigger_word: 0,
            t_tdc_count: 0,
            t_tdc_time_stamp: 0,
            t_lvl1_id_upper: 0,
            t_trigger_number: 0,
            t_actual_lvl1_id: 0,
            t_actual_bcid: 0,
            n_triggers: 0,
            n_events: 0,
            n_max_hits_per_event: 0,
            n_empty_events: 0,
            n_incomplete_events: 0,
            n_tdc_words: 0,
            n_unknown_words: 0,
            n_other_words: 0,
            n_service_records: 0,
            n_data_records: 0,
            n_data_headers: 0,
            n_hits: 0,
            n_data_words: 0,
            first_trigger_number_set: false,
            first_tdc_set: false,
            last_trigger_number: 0,
            start_word_index: 0,
            data_word_index: 0,
            meta_table: None,
            meta_event_index: Vec::new(),
            last_meta_index_not_set: 0,
            last_word_index_set: 0,
            trigger_error_counter: [0; N_TRIGGER_ERROR_CODES],
            error_counter: [0; N_ERROR_CODES],
            service_record_counter: [0; N_SERVICE_RECORDS],
            tdc_counter: vec![0; N_TDC_VALUES],
        }
    }

    /// Interpret one chunk of the raw data stream.
    ///
    /// The hits of the chunk are available via [`hits`] afterwards; the
    /// event in progress at the end of the chunk stays buffered and is
    /// emitted with a later chunk.
    ///
    /// [`hits`]: Interpreter::hits
    pub fn interpret_raw_data(&mut self, words: &[u32]) {
        debug!(
            "interpret_raw_data with {} words at total word {}",
            words.len(),
            self.n_data_words
        );
        self.hits.clear();
        self.meta_word_index.clear();

        for &word in words {
            self.correlate_meta_word_index(self.n_events, self.data_word_index);
            self.n_data_words += 1;
            self.data_word_index += 1;

            let decoded = RawWord::decode(word, self.flavor);
            match decoded {
                RawWord::DataHeader(dh) => self.process_data_header(dh),
                RawWord::Trigger(tr) => self.process_trigger_word(tr),
                RawWord::ServiceRecord(sr) => self.process_service_record(sr),
                RawWord::Tdc(tdc) => {
                    self.add_tdc_value(tdc.count);
                    self.n_tdc_words += 1;
                    // A too large trigger distance means the TDC word does
                    // not belong to this event.
                    if self.use_tdc_trigger_time_stamp
                        && tdc.trigger_distance > self.max_tdc_delay
                    {
                        if self.event_debug() {
                            debug!(
                                " {} TDC COUNT {}\t{}\t TRG DIST TIME STAMP {}\t WORD {}",
                                self.n_data_words,
                                tdc.count,
                                self.n_events,
                                tdc.trigger_distance,
                                word
                            );
                        }
                        continue;
                    }
                    self.process_tdc_word(tdc);
                }
                RawWord::DataRecord(dr) => self.process_data_record(dr),
                RawWord::AddressRecord(_) | RawWord::ValueRecord(_) | RawWord::EmptyRecord => {
                    self.n_other_words += 1;
                }
                RawWord::Unknown(w) => {
                    self.add_event_error_code(EventStatus::UNKNOWN_WORD);
                    self.n_unknown_words += 1;
                    warn!(
                        "interpret_raw_data: {} UNKNOWN WORD {:#010x} at event {}",
                        self.n_data_words, w, self.n_events
                    );
                }
            }

            // A broken BCID sequence aborts the event; the offending data
            // header becomes the first header of the next event.
            if self.t_bcid_error {
                if let RawWord::DataHeader(dh) = decoded {
                    warn!(
                        "interpret_raw_data: {} BCID ERROR at event {}",
                        self.n_data_words, self.n_events
                    );
                    self.add_event();
                    self.n_incomplete_events += 1;
                    self.t_n_data_header = 1;
                    self.t_start_bcid = dh.bcid as u32;
                    self.t_start_lvl1_id = dh.lvl1_id;
                    self.t_actual_bcid = dh.bcid;
                    self.t_actual_lvl1_id = dh.lvl1_id;
                }
            }
        }
    }

    /// Install the readout meta data table (V1 layout).
    ///
    /// The table is validated and copied; the derived event index output
    /// (one entry per readout) is sized to match.
    pub fn set_meta_data(&mut self, table: &[MetaInfo]) -> Result<(), Error> {
        info!("set_meta_data with {} entries", table.len());
        let rows: Vec<(u32, u32, u32)> = table
            .iter()
            .map(|m| (m.start_index, m.stop_index, m.length))
            .collect();
        validate_meta_rows(&rows)?;
        self.meta_event_index = vec![0; table.len()];
        self.meta_table = Some(MetaTable::V1(table.to_vec()));
        Ok(())
    }

    /// Install the readout meta data table (V2 layout with start and stop
    /// time stamps).
    pub fn set_meta_data_v2(&mut self, table: &[MetaInfoV2]) -> Result<(), Error> {
        info!("set_meta_data_v2 with {} entries", table.len());
        let rows: Vec<(u32, u32, u32)> = table
            .iter()
            .map(|m| (m.start_index, m.stop_index, m.length))
            .collect();
        validate_meta_rows(&rows)?;
        self.meta_event_index = vec![0; table.len()];
        self.meta_table = Some(MetaTable::V2(table.to_vec()));
        Ok(())
    }

    /// True if a V2 meta data table is installed.
    pub fn is_meta_table_v2(&self) -> bool {
        matches!(self.meta_table, Some(MetaTable::V2(_)))
    }

    /// The hits interpreted from the most recent chunk.
    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    /// Event number of the first event touching each readout; one entry
    /// per meta data table row, cumulative across chunks.
    pub fn meta_event_index(&self) -> &[u64] {
        &self.meta_event_index
    }

    /// Per-event word ranges of the most recent chunk, if enabled.
    pub fn meta_word_index(&self) -> &[MetaWordInfo] {
        &self.meta_word_index
    }

    /// Derived output meta data: one row per readout combining the event
    /// index with the readout time stamp and error code.
    pub fn meta_out(&self) -> Vec<MetaInfoOut> {
        let table = match &self.meta_table {
            Some(t) => t,
            None => return Vec::new(),
        };
        self.meta_event_index
            .iter()
            .enumerate()
            .map(|(i, &event_index)| MetaInfoOut {
                event_index,
                time_stamp: table.time_stamp(i),
                error_code: table.error_code(i),
            })
            .collect()
    }

    // analysis options

    /// Number of data headers expected per event window (default 16).
    pub fn set_nb_cids(&mut self, n_bcids: u32) {
        self.n_bcids = n_bcids;
    }

    /// Highest ToT code still considered a hit (default 13).
    pub fn set_max_tot(&mut self, max_tot: u8) {
        self.max_tot = max_tot;
    }

    /// Chip flavor; decides BCID counter size and LVL1ID transport.
    pub fn set_flavor(&mut self, flavor: Flavor) {
        self.flavor = flavor;
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// Force an event boundary at every trigger word.
    pub fn align_at_trigger_number(&mut self, toggle: bool) {
        info!("align_at_trigger_number({})", toggle);
        self.align_at_trigger_number = toggle;
    }

    /// Start a new event at a TDC word once the previous event structure
    /// is complete.
    pub fn align_at_tdc_word(&mut self, toggle: bool) {
        info!("align_at_tdc_word({})", toggle);
        self.align_at_tdc_word = toggle;
    }

    /// Interpret the trigger word payload as a clock count instead of a
    /// trigger number.
    pub fn use_trigger_time_stamp(&mut self, toggle: bool) {
        info!("use_trigger_time_stamp({})", toggle);
        self.use_trigger_time_stamp = toggle;
    }

    /// Fill the TDC time stamp with the trigger distance instead of the
    /// running counter.
    pub fn use_tdc_trigger_time_stamp(&mut self, toggle: bool) {
        info!("use_tdc_trigger_time_stamp({})", toggle);
        self.use_tdc_trigger_time_stamp = toggle;
    }

    /// TDC words with a larger trigger distance are ignored (default 255).
    pub fn set_max_tdc_delay(&mut self, max_tdc_delay: u8) {
        self.max_tdc_delay = max_tdc_delay;
    }

    /// Value at which the external trigger counter wraps to zero.
    pub fn set_max_trigger_number(&mut self, max_trigger_number: u32) {
        self.max_trigger_number = max_trigger_number;
    }

    /// Synthesize one virtual hit for events without any hit, so empty
    /// events show up in the hit table.
    pub fn create_empty_event_hits(&mut self, toggle: bool) {
        debug!("create_empty_event_hits({})", toggle);
        self.create_empty_event_hits = toggle;
    }

    /// Record the start/stop word index of every event.
    pub fn create_meta_data_word_index(&mut self, toggle: bool) {
        debug!("create_meta_data_word_index({})", toggle);
        self.create_meta_data_word_index = toggle;
    }

    /// Emit per-word debug output for the given event number range.
    pub fn set_debug_events(&mut self, start_event: u64, stop_event: u64, toggle: bool) {
        self.debug_events = if toggle {
            Some((start_event, stop_event))
        } else {
            None
        };
    }

    // counters

    /// Total number of words processed.
    pub fn n_words(&self) -> u32 {
        self.n_data_words
    }

    /// Total number of hits stored, virtual hits included.
    pub fn n_hits(&self) -> u32 {
        self.n_hits
    }

    /// Total number of completed events.
    pub fn n_events(&self) -> u64 {
        self.n_events
    }

    pub fn n_empty_events(&self) -> u32 {
        self.n_empty_events
    }

    pub fn n_incomplete_events(&self) -> u32 {
        self.n_incomplete_events
    }

    pub fn n_triggers(&self) -> u32 {
        self.n_triggers
    }

    pub fn n_unknown_words(&self) -> u32 {
        self.n_unknown_words
    }

    pub fn n_other_words(&self) -> u32 {
        self.n_other_words
    }

    pub fn n_service_records(&self) -> u32 {
        self.n_service_records
    }

    pub fn n_data_records(&self) -> u32 {
        self.n_data_records
    }

    pub fn n_data_headers(&self) -> u32 {
        self.n_data_headers
    }

    pub fn n_tdc_words(&self) -> u32 {
        self.n_tdc_words
    }

    pub fn n_max_hits_per_event(&self) -> u32 {
        self.n_max_hits_per_event
    }

    /// Histogram of the event error code bits, indexed by bit position.
    pub fn error_counters(&self) -> &[u32; N_ERROR_CODES] {
        &self.error_counter
    }

    /// Histogram of the trigger error code bits, indexed by bit position.
    pub fn trigger_error_counters(&self) -> &[u32; N_TRIGGER_ERROR_CODES] {
        &self.trigger_error_counter
    }

    /// Per-code service record counters.
    pub fn service_record_counters(&self) -> &[u32; N_SERVICE_RECORDS] {
        &self.service_record_counter
    }

    /// Histogram of the TDC counter values.
    pub fn tdc_counters(&self) -> &[u32] {
        &self.tdc_counter
    }

    /// Size of one hit record in bytes, to check in-memory alignment of
    /// consumers.
    pub fn hit_size(&self) -> usize {
        mem::size_of::<Hit>()
    }

    /// Reset all data but keep the settings and the installed meta table.
    /// The derived event index is zeroed so a rerun reproduces it.
    pub fn reset(&mut self) {
        info!("reset()");
        self.reset_counters();
        self.reset_event_variables();
        self.hits.clear();
        self.hit_buffer.clear();
        self.meta_word_index.clear();
        self.last_meta_index_not_set = 0;
        self.last_word_index_set = 0;
        self.start_word_index = 0;
        for entry in self.meta_event_index.iter_mut() {
            *entry = 0;
        }
        self.t_trigger_number = 0;
        self.t_actual_lvl1_id = 0;
        self.t_actual_bcid = 0;
    }

    /// Reset the word/readout cursors; needed when meta data of several
    /// files is combined.
    pub fn reset_meta_data_counter(&mut self) {
        self.last_word_index_set = 0;
        self.data_word_index = 0;
    }

    /// Reset the summary counters and counter histograms.
    pub fn reset_counters(&mut self) {
        info!("reset_counters()");
        self.n_data_words = 0;
        self.n_triggers = 0;
        self.n_events = 0;
        self.n_incomplete_events = 0;
        self.n_data_records = 0;
        self.n_data_headers = 0;
        self.n_service_records = 0;
        self.n_unknown_words = 0;
        self.n_tdc_words = 0;
        self.n_other_words = 0;
        self.n_hits = 0;
        self.n_empty_events = 0;
        self.n_max_hits_per_event = 0;
        self.first_trigger_number_set = false;
        self.first_tdc_set = false;
        self.last_trigger_number = 0;
        self.data_word_index = 0;
        self.trigger_error_counter = [0; N_TRIGGER_ERROR_CODES];
        self.error_counter = [0; N_ERROR_CODES];
        self.service_record_counter = [0; N_SERVICE_RECORDS];
        for bin in self.tdc_counter.iter_mut() {
            *bin = 0;
        }
    }

    /// Finalize the event in progress: stamp the buffered hits, update the
    /// counter histograms and start a new event.
    pub fn add_event(&mut self) {
        if self.event_debug() {
            debug!("add_event() {}", self.n_events);
        }
        if self.t_total_hits == 0 {
            self.n_empty_events += 1;
            if self.create_empty_event_hits {
                self.add_event_error_code(EventStatus::NO_HIT);
                self.add_hit(0, 0, 0, 0, 0, 0);
            }
        }
        if self.t_trigger_word == 0 {
            self.add_event_error_code(EventStatus::NO_TRG_WORD);
            // events without own trigger word inherit the last number seen
            if self.first_trigger_number_set {
                self.t_event_trigger_number = self.last_trigger_number;
            }
        }
        if self.t_trigger_word > 1 {
            self.add_trigger_error_code(TriggerStatus::NUMBER_MORE_ONE);
            warn!("add_event: # trigger words > 1 at event {}", self.n_events);
        }
        if self.use_tdc_trigger_time_stamp && self.t_tdc_time_stamp >= 254 {
            self.add_event_error_code(EventStatus::TDC_OVERFLOW);
        }

        self.store_event_hits();
        if self.t_total_hits > self.n_max_hits_per_event {
            self.n_max_hits_per_event = self.t_total_hits;
        }
        self.histogram_trigger_error_code();
        self.histogram_error_code();
        if self.create_meta_data_word_index {
            let stop_word_index = self.n_data_words.saturating_sub(1);
            self.meta_word_index.push(MetaWordInfo {
                event_index: self.n_events,
                start_word_index: self.start_word_index,
                stop_word_index,
            });
            self.start_word_index = stop_word_index;
        }
        self.n_events += 1;
        self.reset_event_variables();
    }

    // private

    fn process_data_header(&mut self, dh: DataHeader) {
        self.n_data_headers += 1;
        if self.t_n_data_header >= self.n_bcids {
            // the maximum event window is reached, create a new event
            if self.align_at_trigger_number {
                self.add_event_error_code(EventStatus::TRUNC_EVENT);
                warn!(
                    "process_data_header: too many data headers, event {} truncated",
                    self.n_events
                );
            }
            self.add_event();
        }
        if self.t_n_data_header == 0 {
            self.t_start_bcid = dh.bcid as u32;
            self.t_start_lvl1_id = dh.lvl1_id;
        } else {
            self.t_db_cid += 1;
            let counter_size = self.flavor.bcid_counter_size();
            // counter rollover; the start value wraps below zero and the
            // sums below compare modulo 2^32
            if self.t_start_bcid.wrapping_add(self.t_db_cid) > counter_size - 1 {
                self.t_start_bcid = self.t_start_bcid.wrapping_sub(counter_size);
            }
            if self.t_start_bcid.wrapping_add(self.t_db_cid) != dh.bcid as u32 {
                if dh.lvl1_id == self.t_start_lvl1_id {
                    // non-increasing BCID with constant LVL1ID is an FE
                    // feature, keep the event
                    self.add_event_error_code(EventStatus::BCID_JUMP);
                } else if self.align_at_trigger_number || self.align_at_tdc_word {
                    self.add_event_error_code(EventStatus::BCID_JUMP);
                } else {
                    self.t_bcid_error = true;
                    self.add_event_error_code(EventStatus::EVENT_INCOMPLETE);
                }
            }
            if !self.t_bcid_error && dh.lvl1_id != self.t_start_lvl1_id {
                self.add_event_error_code(EventStatus::NON_CONST_LVL1ID);
                info!(
                    "process_data_header: LVL1 is not constant: {} != {} at event {}",
                    dh.lvl1_id, self.t_start_lvl1_id, self.n_events
                );
            }
        }
        self.t_n_data_header += 1;
        self.t_actual_lvl1_id = dh.lvl1_id;
        self.t_actual_bcid = dh.bcid;
        if self.event_debug() {
            debug!(
                " {} DH LVL1ID/BCID {}/{}\t{}",
                self.n_data_words, dh.lvl1_id, dh.bcid, self.n_events
            );
        }
    }

    fn process_trigger_word(&mut self, tr: TriggerWord) {
        self.n_triggers += 1;
        if !self.align_at_trigger_number {
            // the trigger word is not always the first word of an event
            if self.t_n_data_header >= self.n_bcids {
                self.add_event();
            }
        } else if self.first_trigger_number_set {
            self.add_event();
        }
        self.t_trigger_word += 1;
        self.t_trigger_number = tr.payload;
        if self.event_debug() {
            debug!(
                " {} TR {} {}\t{}",
                self.n_data_words,
                if self.use_trigger_time_stamp { "TIME STAMP" } else { "NUMBER" },
                self.t_trigger_number,
                self.n_events
            );
        }

        if !self.first_trigger_number_set {
            self.first_trigger_number_set = true;
        } else if !self.use_trigger_time_stamp
            && self.last_trigger_number + 1 != self.t_trigger_number
            && !(self.last_trigger_number == self.max_trigger_number && self.t_trigger_number == 0)
        {
            self.add_trigger_error_code(TriggerStatus::NUMBER_INC_ERROR);
            warn!(
                "process_trigger_word: trigger number not increasing by 1 (old/new): {}/{} at event {}",
                self.last_trigger_number, self.t_trigger_number, self.n_events
            );
        }

        // the event trigger number is the number of the first trigger word
        // within the event
        if self.t_trigger_word == 1 {
            self.t_event_trigger_number = self.t_trigger_number;
        }
        self.last_trigger_number = self.t_trigger_number;
    }

    fn process_service_record(&mut self, sr: ServiceRecord) {
        if self.event_debug() {
            debug!(
                " {} SR {} ({}) at event {}",
                self.n_data_words, sr.code, sr.count, self.n_events
            );
        }
        self.add_service_record(&sr);
        self.add_event_error_code(EventStatus::HAS_SR);
        self.n_service_records += 1;
        if self.flavor == Flavor::FeI4B && sr.code == 14 {
            self.t_lvl1_id_upper = sr.lvl1_id_upper;
        }
    }

    fn process_tdc_word(&mut self, tdc: TdcWord) {
        // a new event starts at a TDC word if the previous event has all
        // its data headers or was not TDC aligned itself
        if self.align_at_tdc_word
            && self.first_tdc_set
            && (self.t_n_data_header >= self.n_bcids
                || !self.t_error_code.contains(EventStatus::TDC_WORD))
        {
            self.add_event();
        }
        self.first_tdc_set = true;

        if self.t_error_code.contains(EventStatus::TDC_WORD) {
            if !self.use_tdc_trigger_time_stamp {
                // the first TDC word defines the event TDC value
                self.add_event_error_code(EventStatus::MANY_TDC_WORDS);
            } else if tdc.trigger_distance != 255 {
                // in trigger distance mode the first valid TDC word counts
                if self.t_tdc_time_stamp != 255 {
                    self.add_event_error_code(EventStatus::MANY_TDC_WORDS);
                } else {
                    self.t_tdc_time_stamp = tdc.trigger_distance;
                    self.t_tdc_count = tdc.count;
                }
            }
        } else {
            self.add_event_error_code(EventStatus::TDC_WORD);
            self.t_tdc_count = tdc.count;
            self.t_tdc_time_stamp = if self.use_tdc_trigger_time_stamp {
                tdc.trigger_distance
            } else {
                // only the low 8 bits of the running counter fit the hit
                tdc.time_stamp as u8
            };
        }
        if self.t_tdc_count == 0 {
            self.add_event_error_code(EventStatus::TDC_OVERFLOW);
        }
        if self.event_debug() {
            debug!(
                " {} TDC COUNT {}\t{}\t TIME STAMP {}",
                self.n_data_words, tdc.count, self.n_events, self.t_tdc_time_stamp
            );
        }
    }

    fn process_data_record(&mut self, dr: DataRecord) {
        self.n_data_records += 1;
        if dr.tot1 <= self.max_tot {
            self.add_hit(
                self.t_db_cid as u8,
                self.t_actual_lvl1_id,
                dr.column,
                dr.row,
                dr.tot1,
                self.t_actual_bcid,
            );
        }
        if dr.tot2 <= self.max_tot {
            self.add_hit(
                self.t_db_cid as u8,
                self.t_actual_lvl1_id,
                dr.column,
                dr.row2(),
                dr.tot2,
                self.t_actual_bcid,
            );
        }
        if self.event_debug() {
            debug!(
                " {} DR COL/ROW/TOT1/TOT2 {}/{}/{}/{} rBCID {}\t{}",
                self.n_data_words, dr.column, dr.row, dr.tot1, dr.tot2, self.t_db_cid, self.n_events
            );
        }
    }

    fn add_hit(&mut self, rel_bcid: u8, lvl1_id: u16, column: u16, row: u16, tot: u8, bcid: u16) {
        if self.hit_buffer.len() < MAX_HIT_BUFFER_SIZE {
            let hit = Hit {
                event_number: self.n_events,
                trigger_number: self.t_event_trigger_number,
                relative_bcid: rel_bcid,
                lvl1_id,
                column,
                row,
                tot,
                bcid,
                tdc: self.t_tdc_count,
                tdc_time_stamp: self.t_tdc_time_stamp,
                trigger_status: self.t_trigger_error,
                service_record: self.t_service_record,
                event_status: self.t_error_code,
            };
            if !hit.event_status.contains(EventStatus::NO_HIT) {
                self.t_total_hits += 1;
            }
            self.hit_buffer.push(hit);
        } else {
            self.add_event_error_code(EventStatus::TRUNC_EVENT);
            self.add_event();
            warn!(
                "add_hit: hit buffer overflow prevented by splitting events at event {}",
                self.n_events
            );
        }
    }

    fn store_event_hits(&mut self) {
        // trigger number and status words are only known now; FE-I4B
        // events also merge the upper LVL1ID bits carried by SR 14
        let lvl1_id_upper = (self.t_lvl1_id_upper as u16) << 5;
        for mut hit in self.hit_buffer.drain(..) {
            hit.trigger_number = self.t_event_trigger_number;
            hit.trigger_status = self.t_trigger_error;
            hit.event_status = self.t_error_code;
            hit.lvl1_id |= lvl1_id_upper;
            self.n_hits += 1;
            self.hits.push(hit);
        }
    }

    fn reset_event_variables(&mut self) {
        self.t_n_data_header = 0;
        self.t_db_cid = 0;
        self.t_trigger_error = TriggerStatus::empty();
        self.t_error_code = EventStatus::empty();
        self.t_service_record = 0;
        self.t_bcid_error = false;
        self.t_trigger_word = 0;
        self.t_tdc_count = 0;
        self.t_tdc_time_stamp = 0;
        self.t_lvl1_id_upper = 0;
        self.t_trigger_number = 0;
        self.t_event_trigger_number = 0;
        self.t_start_bcid = 0;
        self.t_start_lvl1_id = 0;
        self.t_total_hits = 0;
    }

    /// Write the event number into the readout-to-event map whenever the
    /// word cursor crosses a readout boundary. Zero length readouts get
    /// the same event number in a tight loop.
    fn correlate_meta_word_index(&mut self, event_number: u64, word_index: u32) {
        let table = match &self.meta_table {
            Some(table) => table,
            None => return,
        };
        // the boundary index only ever increases, one comparison suffices
        if word_index != self.last_word_index_set {
            return;
        }
        let n_readouts = table.len();
        if self.last_meta_index_not_set >= n_readouts {
            return;
        }
        self.meta_event_index[self.last_meta_index_not_set] = event_number;
        self.last_word_index_set = table.stop_index(self.last_meta_index_not_set);
        self.last_meta_index_not_set += 1;
        while self.last_meta_index_not_set < n_readouts
            && table.length(self.last_meta_index_not_set - 1) == 0
        {
            info!("correlate_meta_word_index: more than one readout during one event, correcting meta info");
            self.meta_event_index[self.last_meta_index_not_set] = event_number;
            self.last_word_index_set = table.stop_index(self.last_meta_index_not_set);
            self.last_meta_index_not_set += 1;
        }
    }

    fn add_trigger_error_code(&mut self, code: TriggerStatus) {
        self.add_event_error_code(EventStatus::TRG_ERROR);
        self.t_trigger_error |= code;
    }

    fn add_event_error_code(&mut self, code: EventStatus) {
        if !self.t_error_code.contains(code) && self.event_debug() {
            debug!("add_event_error_code: {:?}\t{}", code, self.n_events);
        }
        self.t_error_code |= code;
    }

    fn histogram_trigger_error_code(&mut self) {
        let mut code = self.t_trigger_error.bits();
        let mut bit = 0;
        while code != 0 {
            if code & 1 != 0 {
                self.trigger_error_counter[bit] += 1;
            }
            code >>= 1;
            bit += 1;
        }
    }

    fn histogram_error_code(&mut self) {
        let mut code = self.t_error_code.bits();
        let mut bit = 0;
        while code != 0 {
            if code & 1 != 0 {
                self.error_counter[bit] += 1;
            }
            code >>= 1;
            bit += 1;
        }
    }

    fn add_service_record(&mut self, sr: &ServiceRecord) {
        self.t_service_record |= sr.code as u32;
        if (sr.code as usize) < N_SERVICE_RECORDS {
            self.service_record_counter[sr.code as usize] += sr.count as u32;
        }
    }

    fn add_tdc_value(&mut self, count: u16) {
        if (count as usize) < N_TDC_VALUES {
            self.tdc_counter[count as usize] += 1;
        }
    }

    fn event_debug(&self) -> bool {
        match self.debug_events {
            Some((start, stop)) => self.n_events >= start && self.n_events <= stop,
            None => log::log_enabled!(log::Level::Debug),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Interpreter {
        Interpreter::new()
    }
}

impl fmt::Display for Interpreter {
    /// The summary the original tooling printed after a conversion pass.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "#Data Words {}", self.n_data_words)?;
        writeln!(f, "#Data Header {}", self.n_data_headers)?;
        writeln!(f, "#Data Records {}", self.n_data_records)?;
        writeln!(f, "#Service Records {}", self.n_service_records)?;
        writeln!(f, "#Other Words {}", self.n_other_words)?;
        writeln!(f, "#Unknown Words {}", self.n_unknown_words)?;
        writeln!(f, "#TDC Words {}", self.n_tdc_words)?;
        writeln!(f, "#Hits {}", self.n_hits)?;
        writeln!(f, "MaxHitsPerEvent {}", self.n_max_hits_per_event)?;
        writeln!(f, "#Events {}", self.n_events)?;
        writeln!(f, "#Trigger {}", self.n_triggers)?;
        writeln!(f, "#Empty Events {}", self.n_empty_events)?;
        write!(f, "#Incomplete Events {}", self.n_incomplete_events)
    }
}
