//! fei4raw: interpret, cluster and histogram raw data of FE-I4 pixel
//! detector readouts.
//!
//! The library turns the chunked 24-bit word stream a readout system
//! records into flat tables: reconstructed hits with per-event metadata,
//! spatiotemporal clusters, and aggregate histograms (occupancy over a
//! scan parameter, ToT, TDC, relative BCID, service record and error
//! counters). It is strictly offline, deterministic and replayable; all
//! I/O stays with the caller.
//!
//! The pipeline is pull-style: feed word chunks to an
//! [`Interpreter`](fei4::Interpreter), hand its hits to a
//! [`Clusterizer`](fei4::Clusterizer) and a
//! [`Histogram`](fei4::Histogram), then align the output tables with the
//! helpers in [`analysis`].
//!
//! ```
//! use fei4raw::fei4::{Clusterizer, Histogram, Interpreter};
//!
//! let mut interpreter = Interpreter::new();
//! let mut clusterizer = Clusterizer::new();
//! clusterizer.create_cluster_hit_info_array(true);
//! let mut histogram = Histogram::new();
//! histogram.create_occupancy_hist(true);
//!
//! // two data headers and one data record: one event window of two BCIDs
//! interpreter.set_nb_cids(2);
//! let words = [0x00E9_0000, 0x0002_0E87, 0x00E9_0001];
//! interpreter.interpret_raw_data(&words);
//! interpreter.add_event(); // flush the event at end of stream
//!
//! clusterizer.add_hits(interpreter.hits()).unwrap();
//! histogram.add_hits(interpreter.hits()).unwrap();
//! assert_eq!(interpreter.hits().len(), 2);
//! assert_eq!(clusterizer.n_clusters(), 1);
//! ```

use thiserror::Error;

pub mod analysis;
pub mod fei4;

/// Fatal error conditions. Everything recoverable is flagged on the event
/// status instead and never surfaces here.
#[derive(Debug, Error)]
pub enum Error {
    /// The readout meta table violates `start + length == stop` or the
    /// rows are not contiguous.
    #[error("corrupt readout meta table at row {row}: {reason}")]
    CorruptMetaTable { row: usize, reason: String },

    /// A hit or seed pixel outside the chip geometry.
    #[error("pixel column/row {column}/{row} out of range, they have to start at 1")]
    PixelOutOfRange { column: u16, row: u16 },

    /// A histogram index outside the declared bin range.
    #[error("histogram index {index} out of range (0..{bins})")]
    BinOutOfRange { index: usize, bins: usize },

    /// A histogram bin exceeded the u32 counter.
    #[error("histogram bin {index} has more entries than supported")]
    BinOverflow { index: usize },

    /// Index arrays of one histogram call differ in length.
    #[error("input arrays differ in length: {left} vs. {right}")]
    LengthMismatch { left: usize, right: usize },

    /// The scan parameter table is shorter than the readout table.
    #[error("scan parameter index {index} out of range (0..{len})")]
    ParameterIndexOutOfRange { index: usize, len: usize },

    /// An event number cannot be matched to any readout window.
    #[error("event {event_number} cannot be correlated to a readout")]
    EventCorrelation { event_number: u64 },

    /// An enrichment index points outside the cluster hit table.
    #[error("result array too small: index {index} out of range (0..{size})")]
    ResultArrayTooSmall { index: usize, size: usize },

    /// Output toggles are inconsistent with each other.
    #[error("invalid configuration: {reason}")]
    Configuration { reason: String },
}
