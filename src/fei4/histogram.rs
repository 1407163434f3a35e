//! Aggregate histograms over interpreted hits: per-pixel occupancy across
//! the scan parameter, ToT, TDC and relative BCID spectra, and the fast
//! closed-form threshold/noise estimator for threshold scans.
//!
//! Each histogram is enabled individually and allocated on enable; the
//! occupancy histogram is reallocated whenever the scan parameter
//! cardinality changes.

use log::{debug, error, info};

use super::format::*;
use crate::Error;

#[inline]
fn pixel_index(column: usize, row: usize, plane: usize) -> usize {
    column + row * MAX_COLUMN as usize + plane * MAX_COLUMN as usize * MAX_ROW as usize
}

const N_PIXELS: usize = MAX_COLUMN as usize * MAX_ROW as usize;
const N_TOT_VALUES: usize = 16;

/// Histogrammer for interpreted hits and cluster seed hits.
///
/// Owns all its histograms; they accumulate across [`add_hits`] calls and
/// are only cleared on explicit request.
///
/// [`add_hits`]: Histogram::add_hits
pub struct Histogram {
    occupancy: Vec<u32>,
    tot: Vec<u32>,
    tdc: Vec<u32>,
    tdc_pixel: Vec<u16>,
    tot_pixel: Vec<u16>,
    rel_bcid: Vec<u32>,

    create_occupancy_hist: bool,
    create_rel_bcid_hist: bool,
    create_tot_hist: bool,
    create_tdc_hist: bool,
    create_tdc_pixel_hist: bool,
    create_tot_pixel_hist: bool,
    max_tot: u8,

    /// Event number of the first event of each readout.
    meta_event_index: Vec<u64>,
    /// Scan parameter value of each readout.
    par_info: Vec<i32>,
    /// Sorted distinct parameter values; the position is the bucket.
    parameter_values: Vec<i32>,
    n_parameter_values: usize,
    /// Readout cursor, events only ever move forward.
    last_meta_event_index: usize,
}

impl Histogram {
    pub fn new() -> Histogram {
        Histogram {
            occupancy: Vec::new(),
            tot: Vec::new(),
            tdc: Vec::new(),
            tdc_pixel: Vec::new(),
            tot_pixel: Vec::new(),
            rel_bcid: Vec::new(),
            create_occupancy_hist: false,
            create_rel_bcid_hist: false,
            create_tot_hist: false,
            create_tdc_hist: false,
            create_tdc_pixel_hist: false,
            create_tot_pixel_hist: false,
            max_tot: 13,
            meta_event_index: Vec::new(),
            par_info: Vec::new(),
            parameter_values: Vec::new(),
            n_parameter_values: 1,
            last_meta_event_index: 0,
        }
    }

    // options

    pub fn create_occupancy_hist(&mut self, toggle: bool) {
        self.create_occupancy_hist = toggle;
        if toggle {
            self.allocate_occupancy_array();
        } else {
            self.occupancy = Vec::new();
        }
    }

    pub fn create_rel_bcid_hist(&mut self, toggle: bool) {
        self.create_rel_bcid_hist = toggle;
        self.rel_bcid = if toggle {
            vec![0; MAX_BCID_WINDOW]
        } else {
            Vec::new()
        };
    }

    pub fn create_tot_hist(&mut self, toggle: bool) {
        self.create_tot_hist = toggle;
        self.tot = if toggle { vec![0; N_TOT_VALUES] } else { Vec::new() };
    }

    pub fn create_tdc_hist(&mut self, toggle: bool) {
        self.create_tdc_hist = toggle;
        self.tdc = if toggle { vec![0; N_TDC_VALUES] } else { Vec::new() };
    }

    pub fn create_tdc_pixel_hist(&mut self, toggle: bool) {
        self.create_tdc_pixel_hist = toggle;
        self.tdc_pixel = if toggle {
            vec![0; N_PIXELS * N_TDC_PIXEL_VALUES]
        } else {
            Vec::new()
        };
    }

    pub fn create_tot_pixel_hist(&mut self, toggle: bool) {
        self.create_tot_pixel_hist = toggle;
        self.tot_pixel = if toggle {
            vec![0; N_PIXELS * N_TOT_VALUES]
        } else {
            Vec::new()
        };
    }

    /// Highest ToT code still considered a hit (default 13).
    pub fn set_max_tot(&mut self, max_tot: u8) {
        self.max_tot = max_tot;
    }

    /// Install the readout-to-event map produced by the interpreter.
    pub fn add_meta_event_index(&mut self, meta_event_index: &[u64]) {
        debug!("add_meta_event_index() with {} entries", meta_event_index.len());
        self.meta_event_index = meta_event_index.to_vec();
        self.last_meta_event_index = 0;
    }

    /// Install the per-readout scan parameter values. The occupancy depth
    /// becomes the number of distinct values.
    pub fn add_scan_parameter(&mut self, par_info: &[i32]) {
        debug!("add_scan_parameter() with {} entries", par_info.len());
        self.par_info = par_info.to_vec();
        let mut values = par_info.to_vec();
        values.sort_unstable();
        values.dedup();
        self.n_parameter_values = values.len().max(1);
        self.parameter_values = values;
        self.last_meta_event_index = 0;
        if self.create_occupancy_hist {
            self.allocate_occupancy_array();
        }
    }

    /// Histogram all hits into one parameter bucket.
    pub fn set_no_scan_parameter(&mut self) {
        debug!("set_no_scan_parameter()");
        self.par_info = Vec::new();
        self.parameter_values = Vec::new();
        self.n_parameter_values = 1;
        if self.create_occupancy_hist {
            self.allocate_occupancy_array();
        }
    }

    /// Number of distinct scan parameter values, 1 without a scan parameter.
    pub fn n_parameters(&self) -> usize {
        self.n_parameter_values
    }

    /// Book a slice of hits into the enabled histograms.
    pub fn add_hits(&mut self, hits: &[Hit]) -> Result<(), Error> {
        debug!("add_hits() with {} hits", hits.len());
        for hit in hits {
            // virtual hits mark empty events and carry no pixel
            if hit.event_status.contains(EventStatus::NO_HIT) {
                continue;
            }
            if hit.column < MIN_COLUMN
                || hit.column > MAX_COLUMN
                || hit.row < MIN_ROW
                || hit.row > MAX_ROW
            {
                return Err(Error::PixelOutOfRange {
                    column: hit.column,
                    row: hit.row,
                });
            }
            let column = (hit.column - 1) as usize;
            let row = (hit.row - 1) as usize;
            let tot = hit.tot as usize;
            if tot >= N_TOT_VALUES {
                return Err(Error::BinOutOfRange {
                    index: tot,
                    bins: N_TOT_VALUES,
                });
            }
            let mut tdc = hit.tdc as usize;
            if tdc >= N_TDC_VALUES {
                return Err(Error::BinOutOfRange {
                    index: tdc,
                    bins: N_TDC_VALUES,
                });
            }
            let is_hit = hit.tot <= self.max_tot;

            let par_bucket = self.par_index(hit.event_number)?;

            if self.create_occupancy_hist && is_hit {
                self.occupancy[pixel_index(column, row, par_bucket)] += 1;
            }
            if self.create_rel_bcid_hist && is_hit {
                self.rel_bcid[hit.relative_bcid as usize] += 1;
            }
            if self.create_tot_hist && is_hit {
                self.tot[tot] += 1;
            }
            if self.create_tdc_hist {
                self.tdc[tdc] += 1;
            }
            if self.create_tdc_pixel_hist {
                if tdc >= N_TDC_PIXEL_VALUES {
                    info!("add_hits: TDC value out of range: {}", tdc);
                    tdc = 0;
                }
                self.tdc_pixel[pixel_index(column, row, tdc)] += 1;
            }
            if self.create_tot_pixel_hist && is_hit {
                self.tot_pixel[pixel_index(column, row, tot)] += 1;
            }
        }
        Ok(())
    }

    /// Book cluster seed positions into the occupancy histogram.
    pub fn add_cluster_seed_hits(&mut self, clusters: &[ClusterInfo]) -> Result<(), Error> {
        debug!("add_cluster_seed_hits() with {} clusters", clusters.len());
        for cluster in clusters {
            if cluster.seed_column < MIN_COLUMN
                || cluster.seed_column > MAX_COLUMN
                || cluster.seed_row < MIN_ROW
                || cluster.seed_row > MAX_ROW
            {
                return Err(Error::PixelOutOfRange {
                    column: cluster.seed_column,
                    row: cluster.seed_row,
                });
            }
            let column = (cluster.seed_column - 1) as usize;
            let row = (cluster.seed_row - 1) as usize;
            let par_bucket = self.par_index(cluster.event_number)?;
            if self.create_occupancy_hist {
                self.occupancy[pixel_index(column, row, par_bucket)] += 1;
            }
        }
        Ok(())
    }

    /// Per-pixel threshold and noise from a stack of occupancies over the
    /// injection levels; quick algorithm from M. Mertens, PhD thesis,
    /// Juelich 2010.
    ///
    /// Returns `(threshold, noise)` arrays of `MAX_COLUMN * MAX_ROW`
    /// values, indexed by `column + row * MAX_COLUMN`.
    pub fn calculate_threshold_scan_arrays(
        &self,
        max_injections: u32,
        min_parameter: u32,
        max_parameter: u32,
    ) -> Result<(Vec<f64>, Vec<f64>), Error> {
        debug!("calculate_threshold_scan_arrays(...)");
        if !self.create_occupancy_hist || self.occupancy.is_empty() {
            return Err(Error::Configuration {
                reason: "occupancy histogram is not enabled".into(),
            });
        }
        let mut thresholds = vec![0.0f64; N_PIXELS];
        let mut noises = vec![0.0f64; N_PIXELS];
        let n = self.n_parameter_values;
        // a minimum number of different scans is needed
        if n < 2 {
            return Ok((thresholds, noises));
        }
        let a = max_injections as f64;
        let d = ((max_parameter as f64 - min_parameter as f64) / (n as f64 - 1.0)) as u32 as f64;

        for column in 0..MAX_COLUMN as usize {
            for row in 0..MAX_ROW as usize {
                let mut m: u64 = 0;
                for k in 0..n {
                    m += self.occupancy[pixel_index(column, row, k)] as u64;
                }
                let threshold = max_parameter as f64 - d * m as f64 / a;
                thresholds[column + row * MAX_COLUMN as usize] = threshold;

                let mut mu1: i64 = 0;
                let mut mu2: i64 = 0;
                for k in 0..n {
                    let occupancy = self.occupancy[pixel_index(column, row, k)] as i64;
                    if (k as f64) * d < threshold {
                        mu1 += occupancy;
                    } else {
                        mu2 += max_injections as i64 - occupancy;
                    }
                }
                let noise =
                    d * (mu1 + mu2) as f64 / a * (std::f64::consts::PI / 2.0).sqrt();
                noises[column + row * MAX_COLUMN as usize] = noise;
            }
        }
        Ok((thresholds, noises))
    }

    // result access

    /// The occupancy histogram, `MAX_COLUMN * MAX_ROW * n_parameters()`
    /// cells indexed by `column + row * MAX_COLUMN + parameter * MAX_COLUMN
    /// * MAX_ROW`.
    pub fn occupancy(&self) -> &[u32] {
        &self.occupancy
    }

    pub fn tot_hist(&self) -> &[u32] {
        &self.tot
    }

    pub fn tdc_hist(&self) -> &[u32] {
        &self.tdc
    }

    pub fn rel_bcid_hist(&self) -> &[u32] {
        &self.rel_bcid
    }

    /// Per-pixel ToT spectra, 16 values per pixel.
    pub fn tot_pixel_hist(&self) -> &[u16] {
        &self.tot_pixel
    }

    /// Per-pixel TDC spectra, [`N_TDC_PIXEL_VALUES`] values per pixel.
    pub fn tdc_pixel_hist(&self) -> &[u16] {
        &self.tdc_pixel
    }

    // resets

    pub fn reset_occupancy_array(&mut self) {
        info!("reset_occupancy_array()");
        for bin in self.occupancy.iter_mut() {
            *bin = 0;
        }
    }

    pub fn reset_tot_array(&mut self) {
        info!("reset_tot_array()");
        for bin in self.tot.iter_mut() {
            *bin = 0;
        }
    }

    pub fn reset_tdc_array(&mut self) {
        info!("reset_tdc_array()");
        for bin in self.tdc.iter_mut() {
            *bin = 0;
        }
    }

    pub fn reset_tdc_pixel_array(&mut self) {
        info!("reset_tdc_pixel_array()");
        for bin in self.tdc_pixel.iter_mut() {
            *bin = 0;
        }
    }

    pub fn reset_tot_pixel_array(&mut self) {
        info!("reset_tot_pixel_array()");
        for bin in self.tot_pixel.iter_mut() {
            *bin = 0;
        }
    }

    pub fn reset_rel_bcid_array(&mut self) {
        info!("reset_rel_bcid_array()");
        for bin in self.rel_bcid.iter_mut() {
            *bin = 0;
        }
    }

    /// Reset all histograms and the scan parameter, keep the settings.
    pub fn reset(&mut self) {
        info!("reset()");
        self.reset_occupancy_array();
        self.reset_tot_array();
        self.reset_tdc_array();
        self.reset_tot_pixel_array();
        self.reset_tdc_pixel_array();
        self.reset_rel_bcid_array();
        self.par_info = Vec::new();
        self.last_meta_event_index = 0;
    }

    // private

    fn allocate_occupancy_array(&mut self) {
        debug!(
            "allocate_occupancy_array() with {} parameters",
            self.n_parameter_values
        );
        self.occupancy = vec![0; N_PIXELS * self.n_parameter_values];
    }

    /// The scan parameter bucket of an event: the parameter of readout `i`
    /// applies to events `meta_event_index[i] <= e < meta_event_index[i+1]`.
    /// The cursor only moves forward, amortized O(1) for sorted input.
    fn par_index(&mut self, event_number: u64) -> Result<usize, Error> {
        if self.par_info.is_empty() {
            return Ok(0);
        }
        if self.meta_event_index.is_empty() {
            return Err(Error::EventCorrelation { event_number });
        }
        let n_readouts = self.meta_event_index.len();
        let mut i = self.last_meta_event_index;
        while i + 1 < n_readouts {
            // the second case catches entries not filled in yet, the event
            // number has to increase
            if self.meta_event_index[i + 1] > event_number
                || self.meta_event_index[i + 1] < self.meta_event_index[i]
            {
                self.last_meta_event_index = i;
                return self.bucket_of_readout(i, event_number);
            }
            i += 1;
        }
        if self.meta_event_index[n_readouts - 1] <= event_number {
            return self.bucket_of_readout(n_readouts - 1, event_number);
        }
        error!("par_index: correlation issues at event {}", event_number);
        Err(Error::EventCorrelation { event_number })
    }

    fn bucket_of_readout(&self, readout: usize, event_number: u64) -> Result<usize, Error> {
        let value = match self.par_info.get(readout) {
            Some(&value) => value,
            None => {
                error!("bucket_of_readout: scan parameter index {} out of range", readout);
                return Err(Error::ParameterIndexOutOfRange {
                    index: readout,
                    len: self.par_info.len(),
                });
            }
        };
        self.parameter_values
            .binary_search(&value)
            .map_err(|_| Error::EventCorrelation { event_number })
    }
}

impl Default for Histogram {
    fn default() -> Histogram {
        Histogram::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(event_number: u64, column: u16, row: u16, tot: u8) -> Hit {
        Hit {
            event_number,
            column,
            row,
            tot,
            ..Hit::default()
        }
    }

    #[test]
    fn occupancy_without_scan_parameter_has_depth_one() {
        let mut histogram = Histogram::new();
        histogram.create_occupancy_hist(true);
        assert_eq!(histogram.n_parameters(), 1);
        histogram
            .add_hits(&[hit(0, 1, 1, 5), hit(1, 1, 1, 6), hit(2, 80, 336, 1)])
            .unwrap();
        let occupancy = histogram.occupancy();
        assert_eq!(occupancy.len(), N_PIXELS);
        assert_eq!(occupancy[pixel_index(0, 0, 0)], 2);
        assert_eq!(occupancy[pixel_index(79, 335, 0)], 1);
    }

    #[test]
    fn parameter_buckets_follow_the_readout_map() {
        let mut histogram = Histogram::new();
        histogram.create_occupancy_hist(true);
        // readouts start at events 0, 2, 4; parameter values 30, 10, 30
        histogram.add_meta_event_index(&[0, 2, 4]);
        histogram.add_scan_parameter(&[30, 10, 30]);
        assert_eq!(histogram.n_parameters(), 2);
        histogram
            .add_hits(&[
                hit(0, 3, 4, 1), // readout 0, value 30 -> bucket 1
                hit(2, 3, 4, 1), // readout 1, value 10 -> bucket 0
                hit(5, 3, 4, 1), // readout 2, value 30 -> bucket 1
            ])
            .unwrap();
        let occupancy = histogram.occupancy();
        assert_eq!(occupancy[pixel_index(2, 3, 0)], 1);
        assert_eq!(occupancy[pixel_index(2, 3, 1)], 2);
    }

    #[test]
    fn tot_cut_applies_to_occupancy_and_tot() {
        let mut histogram = Histogram::new();
        histogram.create_occupancy_hist(true);
        histogram.create_tot_hist(true);
        histogram.set_max_tot(13);
        histogram
            .add_hits(&[hit(0, 10, 10, 13), hit(0, 10, 10, 14)])
            .unwrap();
        assert_eq!(histogram.occupancy()[pixel_index(9, 9, 0)], 1);
        assert_eq!(histogram.tot_hist()[13], 1);
        assert_eq!(histogram.tot_hist()[14], 0);
    }

    #[test]
    fn virtual_hits_are_skipped() {
        let mut histogram = Histogram::new();
        histogram.create_occupancy_hist(true);
        let mut virtual_hit = hit(0, 0, 0, 0);
        virtual_hit.event_status = EventStatus::NO_HIT;
        histogram.add_hits(&[virtual_hit]).unwrap();
        assert!(histogram.occupancy().iter().all(|&bin| bin == 0));
    }

    #[test]
    fn out_of_range_pixel_is_fatal() {
        let mut histogram = Histogram::new();
        histogram.create_occupancy_hist(true);
        assert!(histogram.add_hits(&[hit(0, 81, 1, 1)]).is_err());
        assert!(histogram.add_hits(&[hit(0, 1, 337, 1)]).is_err());
    }

    #[test]
    fn threshold_and_noise_closed_form() {
        let mut histogram = Histogram::new();
        histogram.create_occupancy_hist(true);
        histogram.add_meta_event_index(&[0, 1, 2, 3]);
        histogram.add_scan_parameter(&[0, 10, 20, 30]);
        // pixel (1,1): 0, 0, 100, 100 out of 100 injections -> threshold
        // at half the range
        histogram
            .add_hits(
                &(0..200)
                    .map(|i| hit(if i < 100 { 2 } else { 3 }, 1, 1, 1))
                    .collect::<Vec<_>>(),
            )
            .unwrap();
        let (thresholds, noises) = histogram
            .calculate_threshold_scan_arrays(100, 0, 30)
            .unwrap();
        let d = 10.0;
        let expected_threshold = 30.0 - d * 200.0 / 100.0;
        assert!((thresholds[0] - expected_threshold).abs() < 1e-9);
        // mu1 collects the occupancy below threshold (0 here), mu2 the
        // missing counts above: bin k=1 sits right at the threshold and
        // contributes A - 0
        let expected_noise = d * 100.0 / 100.0 * (std::f64::consts::PI / 2.0).sqrt();
        assert!((noises[0] - expected_noise).abs() < 1e-9);
        // untouched pixels sit at the maximum parameter
        assert!((thresholds[5] - 30.0).abs() < 1e-9);
    }

    #[test]
    fn occupancy_reallocates_on_cardinality_change() {
        let mut histogram = Histogram::new();
        histogram.create_occupancy_hist(true);
        histogram.add_scan_parameter(&[1, 2, 3]);
        assert_eq!(histogram.occupancy().len(), N_PIXELS * 3);
        histogram.set_no_scan_parameter();
        assert_eq!(histogram.occupancy().len(), N_PIXELS);
    }
}
