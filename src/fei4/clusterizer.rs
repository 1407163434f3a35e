//! Simple and fast event-wise clusterizer with a run time linear in
//! `dx * dy * d_bcid * number of hits`.
//!
//! The basic idea:
//! - keep the hits of one event in a dense map indexed by column, row and
//!   relative BCID; per trigger there are usually fewer than 10 hits
//! - start at one hit position and search around it with a distance of
//!   `dx`, `dy` (8 directions: up, up right, right, ...) and `d_bcid`
//! - only increase the search distance in a direction if no hit was found
//!   in this direction already
//! - delete hits from the map once they are assigned to a cluster; when
//!   the map is empty all hits are clustered and the scan aborts early
//!
//! Hits have to arrive aligned at events (the interpreter output is).

use log::{debug, error, info, warn};

use super::format::*;
use crate::Error;

/// Maximum hits per event to start the clustering for this event,
/// otherwise the event is omitted.
const MAX_HITS_PER_EVENT: u32 = 1000;

/// Sentinel of the ToT hit map for "no hit here".
const NO_HIT_SENTINEL: i16 = -1;

#[inline]
fn map_index(column: usize, row: usize, rel_bcid: usize) -> usize {
    column + row * MAX_COLUMN as usize + rel_bcid * MAX_COLUMN as usize * MAX_ROW as usize
}

#[inline]
fn charge_index(column: usize, row: usize, tot: usize) -> usize {
    column + row * MAX_COLUMN as usize + tot * MAX_COLUMN as usize * MAX_ROW as usize
}

/// Which hit becomes the cluster seed when several share the maximum ToT.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SeedTieBreak {
    /// The first hit visited in scan order wins (default).
    FirstMaxWins,
    /// The last hit visited with the maximum ToT wins.
    LastMaxWins,
}

/// Event-aligned spatiotemporal clusterizer.
///
/// Groups the hits of each event into connected components within per-axis
/// tolerances in column, row and relative BCID, and emits one
/// [`ClusterInfo`] per component plus one [`ClusterHit`] per input hit.
/// Cluster hit row `i` aligns with input hit row `i` of the last
/// [`add_hits`] call.
///
/// [`add_hits`]: Clusterizer::add_hits
pub struct Clusterizer {
    // output data
    cluster_hits: Vec<ClusterHit>,
    clusters: Vec<ClusterInfo>,
    create_cluster_hit_info: bool,
    create_cluster_info: bool,

    // result histograms
    cluster_size_hist: Vec<u32>,
    cluster_tot_hist: Vec<u32>,

    // data arrays for one event, dense and incrementally cleared
    hit_map: Vec<i16>,
    hit_index_map: Vec<u32>,
    charge_map: Vec<f32>,

    // cluster settings
    dx: u16,
    dy: u16,
    d_bcid: u16,
    max_cluster_hit_tot: u8,
    min_cluster_hits: u16,
    max_cluster_hits: u16,
    max_hit_tot: u8,
    seed_tie_break: SeedTieBreak,

    // actual event variables
    event_number: Option<u64>,
    event_status: EventStatus,
    n_event_hits: u32,
    cluster_id: u16,
    n_hits: u32,
    min_col_hit_pos: u16,
    max_col_hit_pos: u16,
    min_row_hit_pos: u16,
    max_row_hit_pos: u16,
    bcid_first_hit: i16,
    bcid_last_hit: i16,

    // actual cluster variables
    cluster_tot: u32,
    cluster_max_tot: u16,
    cluster_charge: f32,
    cluster_rel_bcid: u16,
    cluster_size: u16,
    cluster_x: f32,
    cluster_y: f32,
    seed_column: u16,
    seed_row: u16,
    seed_rel_bcid: u16,
    seed_set: bool,
    cluster_hit_indices: Vec<u32>,
    abort_cluster: bool,
}

impl Clusterizer {
    pub fn new() -> Clusterizer {
        let map_cells = MAX_COLUMN as usize * MAX_ROW as usize * MAX_BCID_WINDOW;
        let charge_cells = MAX_COLUMN as usize * MAX_ROW as usize * MAX_TOT_LOOKUP;
        let mut charge_map = vec![0.0f32; charge_cells];
        // identity calibration: charge = tot + 1
        for column in 0..MAX_COLUMN as usize {
            for row in 0..MAX_ROW as usize {
                for tot in 0..MAX_TOT_LOOKUP {
                    charge_map[charge_index(column, row, tot)] = (tot + 1) as f32;
                }
            }
        }
        Clusterizer {
            cluster_hits: Vec::new(),
            clusters: Vec::new(),
            create_cluster_hit_info: false,
            create_cluster_info: true,
            cluster_size_hist: vec![0; MAX_CLUSTER_HITS_BINS],
            cluster_tot_hist: vec![0; MAX_TOT_BINS * MAX_CLUSTER_HITS_BINS],
            hit_map: vec![NO_HIT_SENTINEL; map_cells],
            hit_index_map: vec![0; map_cells],
            charge_map,
            dx: 1,
            dy: 2,
            d_bcid: 4,
            max_cluster_hit_tot: 13,
            min_cluster_hits: 1,
            max_cluster_hits: 30,
            max_hit_tot: 13,
            seed_tie_break: SeedTieBreak::FirstMaxWins,
            event_number: None,
            event_status: EventStatus::empty(),
            n_event_hits: 0,
            cluster_id: 0,
            n_hits: 0,
            min_col_hit_pos: MAX_COLUMN - 1,
            max_col_hit_pos: 0,
            min_row_hit_pos: MAX_ROW - 1,
            max_row_hit_pos: 0,
            bcid_first_hit: -1,
            bcid_last_hit: -1,
            cluster_tot: 0,
            cluster_max_tot: 0,
            cluster_charge: 0.0,
            cluster_rel_bcid: 0,
            cluster_size: 0,
            cluster_x: 0.0,
            cluster_y: 0.0,
            seed_column: 0,
            seed_row: 0,
            seed_rel_bcid: 0,
            seed_set: false,
            cluster_hit_indices: Vec::new(),
            abort_cluster: false,
        }
    }

    /// Cluster a slice of event-aligned hits.
    ///
    /// The cluster and cluster hit tables are rebuilt per call; an event
    /// spanning two calls is carried over (with a warning, results of the
    /// split event are unreliable).
    pub fn add_hits(&mut self, hits: &[Hit]) -> Result<(), Error> {
        debug!("add_hits(n_hits={})", hits.len());
        if self.create_cluster_hit_info && !self.create_cluster_info {
            return Err(Error::Configuration {
                reason: "cluster hit output needs the cluster info output enabled".into(),
            });
        }
        self.clusters.clear();
        self.cluster_hits.clear();
        if self.create_cluster_hit_info {
            self.cluster_hits.resize(hits.len(), ClusterHit::default());
        }

        if let Some(event_number) = self.event_number {
            if hits.first().map(|h| h.event_number) == Some(event_number) {
                warn!("add_hits: hit chunks not aligned at events, clustering will not work properly");
            }
        }

        for (i, hit) in hits.iter().enumerate() {
            if self.event_number != Some(hit.event_number) {
                if self.n_hits > MAX_HITS_PER_EVENT {
                    warn!(
                        "add_hits: event {:?}, too many hits ({} > {}), omit this event",
                        self.event_number, self.n_hits, MAX_HITS_PER_EVENT
                    );
                    self.clear_hit_map();
                }
                self.clusterize(hits)?;
                self.add_hit_cluster_info(i)?;
                self.clear_event_variables();
            }
            self.event_number = Some(hit.event_number);
            self.add_hit(hits, i)?;
        }
        // cluster the remaining hit data of the last event
        self.clusterize(hits)?;
        self.add_hit_cluster_info(hits.len())?;
        Ok(())
    }

    /// The clusters of the most recent [`add_hits`] call.
    ///
    /// [`add_hits`]: Clusterizer::add_hits
    pub fn clusters(&self) -> &[ClusterInfo] {
        &self.clusters
    }

    /// The enriched hits of the most recent [`add_hits`] call, row-aligned
    /// with its input.
    ///
    /// [`add_hits`]: Clusterizer::add_hits
    pub fn cluster_hits(&self) -> &[ClusterHit] {
        &self.cluster_hits
    }

    pub fn n_clusters(&self) -> usize {
        self.clusters.len()
    }

    /// Histogram of cluster sizes.
    pub fn cluster_size_hist(&self) -> &[u32] {
        &self.cluster_size_hist
    }

    /// Histogram of summed cluster ToT per cluster size; size row 0 holds
    /// all sizes.
    pub fn cluster_tot_hist(&self) -> &[u32] {
        &self.cluster_tot_hist
    }

    /// Reset all data but keep the settings and the charge calibration.
    pub fn reset(&mut self) {
        info!("reset()");
        for cell in self.hit_map.iter_mut() {
            *cell = NO_HIT_SENTINEL;
        }
        for bin in self.cluster_size_hist.iter_mut() {
            *bin = 0;
        }
        for bin in self.cluster_tot_hist.iter_mut() {
            *bin = 0;
        }
        self.clusters.clear();
        self.cluster_hits.clear();
        self.n_hits = 0;
        self.reset_bounding_box();
        self.clear_cluster_data();
        self.clear_event_variables();
    }

    // options

    pub fn create_cluster_hit_info_array(&mut self, toggle: bool) {
        self.create_cluster_hit_info = toggle;
    }

    pub fn create_cluster_info_array(&mut self, toggle: bool) {
        self.create_cluster_info = toggle;
    }

    /// Column distance up to which two hits belong to one cluster.
    pub fn set_x_cluster_distance(&mut self, dx: u16) {
        info!("set_x_cluster_distance: {}", dx);
        if dx >= 1 && dx < MAX_COLUMN - 1 {
            self.dx = dx;
        }
    }

    /// Row distance up to which two hits belong to one cluster.
    pub fn set_y_cluster_distance(&mut self, dy: u16) {
        info!("set_y_cluster_distance: {}", dy);
        if dy >= 1 && dy < MAX_ROW - 1 {
            self.dy = dy;
        }
    }

    /// Relative BCID window within which hits are clustered together.
    pub fn set_bcid_cluster_distance(&mut self, d_bcid: u16) {
        info!("set_bcid_cluster_distance: {}", d_bcid);
        if (d_bcid as usize) < MAX_BCID_WINDOW - 1 {
            self.d_bcid = d_bcid;
        }
    }

    /// Minimum hits per cluster, smaller clusters are dropped.
    pub fn set_min_cluster_hits(&mut self, min_cluster_hits: u16) {
        info!("set_min_cluster_hits: {}", min_cluster_hits);
        self.min_cluster_hits = min_cluster_hits;
    }

    /// Maximum hits per cluster, bigger clusters are omitted.
    pub fn set_max_cluster_hits(&mut self, max_cluster_hits: u16) {
        info!("set_max_cluster_hits: {}", max_cluster_hits);
        self.max_cluster_hits = max_cluster_hits;
    }

    /// Maximum ToT of a cluster hit, clusters with a larger one are omitted.
    pub fn set_max_cluster_hit_tot(&mut self, max_cluster_hit_tot: u8) {
        info!("set_max_cluster_hit_tot: {}", max_cluster_hit_tot);
        self.max_cluster_hit_tot = max_cluster_hit_tot;
    }

    /// Highest ToT for which a hit enters the hit map and can seed.
    pub fn set_max_hit_tot(&mut self, max_hit_tot: u8) {
        info!("set_max_hit_tot: {}", max_hit_tot);
        // bounded by the charge lookup depth
        self.max_hit_tot = max_hit_tot.min(MAX_TOT_LOOKUP as u8 - 1);
    }

    /// Seed selection among equal maximum ToT hits.
    pub fn set_seed_tie_break(&mut self, seed_tie_break: SeedTieBreak) {
        self.seed_tie_break = seed_tie_break;
    }

    /// Install one cell of the pixel/ToT charge calibration; the default
    /// is the identity `charge = tot + 1`.
    pub fn set_charge_calibration(
        &mut self,
        column: u16,
        row: u16,
        tot: u8,
        charge: f32,
    ) -> Result<(), Error> {
        if column < MIN_COLUMN || column > MAX_COLUMN || row < MIN_ROW || row > MAX_ROW {
            return Err(Error::PixelOutOfRange { column, row });
        }
        if tot as usize >= MAX_TOT_LOOKUP {
            return Err(Error::BinOutOfRange {
                index: tot as usize,
                bins: MAX_TOT_LOOKUP,
            });
        }
        let index = charge_index((column - 1) as usize, (row - 1) as usize, tot as usize);
        self.charge_map[index] = charge;
        Ok(())
    }

    // private

    fn add_hit(&mut self, hits: &[Hit], index: usize) -> Result<(), Error> {
        let hit = hits[index];
        self.event_status |= hit.event_status;
        self.n_event_hits += 1;

        if self.create_cluster_hit_info {
            self.cluster_hits[index] = ClusterHit::from_hit(&hit);
        }

        // virtual hits of empty events carry no pixel
        if hit.event_status.contains(EventStatus::NO_HIT) {
            return Ok(());
        }
        // omit hits with a too high ToT
        if hit.tot > self.max_hit_tot {
            return Ok(());
        }
        if hit.column < MIN_COLUMN || hit.column > MAX_COLUMN || hit.row < MIN_ROW || hit.row > MAX_ROW
        {
            return Err(Error::PixelOutOfRange {
                column: hit.column,
                row: hit.row,
            });
        }

        let column = hit.column - 1;
        let row = hit.row - 1;
        let rel_bcid = hit.relative_bcid as u16;

        if self.n_hits == 0 {
            self.bcid_first_hit = rel_bcid as i16;
        }
        if rel_bcid as i16 > self.bcid_last_hit {
            self.bcid_last_hit = rel_bcid as i16;
        }
        if column > self.max_col_hit_pos {
            self.max_col_hit_pos = column;
        }
        if column < self.min_col_hit_pos {
            self.min_col_hit_pos = column;
        }
        if row > self.max_row_hit_pos {
            self.max_row_hit_pos = row;
        }
        if row < self.min_row_hit_pos {
            self.min_row_hit_pos = row;
        }

        let index_in_map = map_index(column as usize, row as usize, rel_bcid as usize);
        if self.hit_map[index_in_map] == NO_HIT_SENTINEL {
            self.hit_map[index_in_map] = hit.tot as i16;
            self.hit_index_map[index_in_map] = index as u32;
            self.n_hits += 1;
        } else {
            warn!(
                "add_hit: event {}, attempt to add the same hit col/row/rel.bcid={}/{}/{} again, ignored",
                hit.event_number, column, row, rel_bcid
            );
        }
        Ok(())
    }

    fn clusterize(&mut self, hits: &[Hit]) -> Result<(), Error> {
        debug!(
            "clusterize: n_hits {} bcid {}..{} col {}..{} row {}..{}",
            self.n_hits,
            self.bcid_first_hit,
            self.bcid_last_hit,
            self.min_col_hit_pos,
            self.max_col_hit_pos,
            self.min_row_hit_pos,
            self.max_row_hit_pos
        );
        if self.n_hits == 0 {
            return Ok(());
        }

        // scan the event bounding box from the first to the last hit BCID
        for rel_bcid in self.bcid_first_hit as i32..=self.bcid_last_hit as i32 {
            for column in self.min_col_hit_pos as i32..=self.max_col_hit_pos as i32 {
                for row in self.min_row_hit_pos as i32..=self.max_row_hit_pos as i32 {
                    if self.hit_exists(column, row, rel_bcid) {
                        self.clear_cluster_data();
                        self.cluster_rel_bcid = rel_bcid as u16;
                        self.search_next_hits(column, row, rel_bcid)?;
                        if self.cluster_size >= self.min_cluster_hits && !self.abort_cluster {
                            self.add_cluster();
                            self.add_cluster_to_results()?;
                            self.cluster_id += 1;
                        } else if self.abort_cluster {
                            debug!("clusterize: cluster omitted");
                        } else {
                            warn!("clusterize: cluster size too small");
                        }
                    }
                    // the scan is aborted once every hit is in a cluster
                    if self.n_hits == 0 {
                        return Ok(());
                    }
                }
            }
        }
        if self.n_hits == 0 {
            return Ok(());
        }

        error!(
            "clusterize: event {:?}, {} hits of {} not clustered",
            self.event_number,
            self.n_hits,
            hits.len()
        );
        self.clear_hit_map();
        Ok(())
    }

    /// Search for hits next to the given one in time (BCIDs) and space
    /// (column, row) and grow the actual cluster recursively.
    fn search_next_hits(&mut self, column: i32, row: i32, rel_bcid: i32) -> Result<(), Error> {
        self.cluster_size += 1;

        let index_in_map = map_index(column as usize, row as usize, rel_bcid as usize);
        let tot = self.hit_map[index_in_map] as u16;

        // seed finding
        let beats_seed = match self.seed_tie_break {
            SeedTieBreak::FirstMaxWins => tot > self.cluster_max_tot,
            SeedTieBreak::LastMaxWins => tot >= self.cluster_max_tot,
        };
        if (tot as u8) <= self.max_hit_tot && (!self.seed_set || beats_seed) {
            self.seed_column = column as u16;
            self.seed_row = row as u16;
            self.seed_rel_bcid = rel_bcid as u16;
            self.cluster_max_tot = tot;
            self.seed_set = true;
        }

        if self.create_cluster_hit_info {
            let hit_index = self.hit_index_map[index_in_map] as usize;
            if hit_index >= self.cluster_hits.len() {
                return Err(Error::ResultArrayTooSmall {
                    index: hit_index,
                    size: self.cluster_hits.len(),
                });
            }
            self.cluster_hit_indices.push(hit_index as u32);
        }

        // omit clusters with a too high single hit ToT or too many hits;
        // the search continues so all their hits leave the map
        if tot > self.max_cluster_hit_tot as u16 || self.cluster_size > self.max_cluster_hits {
            self.abort_cluster = true;
        }

        let charge = self.charge_map[charge_index(column as usize, row as usize, tot as usize)];
        self.cluster_tot += tot as u32;
        self.cluster_charge += charge;
        self.cluster_x += (column as f32 + 0.5) * (charge + 1.0);
        self.cluster_y += (row as f32 + 0.5) * (charge + 1.0);

        if self.delete_hit(column, row, rel_bcid) {
            // no hit left in the map
            return Ok(());
        }

        // sticky per-direction flags: each direction is searched at most
        // once per (dx, dy) combination
        let mut hit_up = false;
        let mut hit_up_right = false;
        let mut hit_right = false;
        let mut hit_down_right = false;
        let mut hit_down = false;
        let mut hit_down_left = false;
        let mut hit_left = false;
        let mut hit_up_left = false;

        let first_bcid = self.cluster_rel_bcid as i32;
        for bcid in first_bcid..=(first_bcid + self.d_bcid as i32) {
            if bcid > self.bcid_last_hit as i32 {
                break;
            }
            for dx in 1..=self.dx as i32 {
                for dy in 1..=self.dy as i32 {
                    if !hit_up && self.hit_exists(column, row + dy, bcid) {
                        hit_up = true;
                        self.search_next_hits(column, row + dy, bcid)?;
                    }
                    if !hit_up_right && self.hit_exists(column + dx, row + dy, bcid) {
                        hit_up_right = true;
                        self.search_next_hits(column + dx, row + dy, bcid)?;
                    }
                    if !hit_right && self.hit_exists(column + dx, row, bcid) {
                        hit_right = true;
                        self.search_next_hits(column + dx, row, bcid)?;
                    }
                    if !hit_down_right && self.hit_exists(column + dx, row - dy, bcid) {
                        hit_down_right = true;
                        self.search_next_hits(column + dx, row - dy, bcid)?;
                    }
                    if !hit_down && self.hit_exists(column, row - dy, bcid) {
                        hit_down = true;
                        self.search_next_hits(column, row - dy, bcid)?;
                    }
                    if !hit_down_left && self.hit_exists(column - dx, row - dy, bcid) {
                        hit_down_left = true;
                        self.search_next_hits(column - dx, row - dy, bcid)?;
                    }
                    if !hit_left && self.hit_exists(column - dx, row, bcid) {
                        hit_left = true;
                        self.search_next_hits(column - dx, row, bcid)?;
                    }
                    if !hit_up_left && self.hit_exists(column - dx, row + dy, bcid) {
                        hit_up_left = true;
                        self.search_next_hits(column - dx, row + dy, bcid)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Delete the hit from the map; true if the map is empty afterwards.
    fn delete_hit(&mut self, column: i32, row: i32, rel_bcid: i32) -> bool {
        self.hit_map[map_index(column as usize, row as usize, rel_bcid as usize)] = NO_HIT_SENTINEL;
        self.n_hits -= 1;
        if self.n_hits == 0 {
            self.reset_bounding_box();
            return true;
        }
        false
    }

    fn hit_exists(&self, column: i32, row: i32, rel_bcid: i32) -> bool {
        column >= 0
            && column < MAX_COLUMN as i32
            && row >= 0
            && row < MAX_ROW as i32
            && rel_bcid >= 0
            && rel_bcid < MAX_BCID_WINDOW as i32
            && self.hit_map[map_index(column as usize, row as usize, rel_bcid as usize)]
                != NO_HIT_SENTINEL
    }

    /// Store the actual cluster and mark its seed hit.
    fn add_cluster(&mut self) {
        // normalize the charge weighted position
        let weight_sum = self.cluster_charge + self.cluster_size as f32;
        self.cluster_x /= weight_sum;
        self.cluster_y /= weight_sum;

        if self.create_cluster_info {
            self.clusters.push(ClusterInfo {
                event_number: self.event_number.unwrap_or(0),
                id: self.cluster_id,
                size: self.cluster_size,
                tot: self.cluster_tot as u16,
                charge: self.cluster_charge,
                seed_column: self.seed_column + 1,
                seed_row: self.seed_row + 1,
                mean_column: self.cluster_x + 1.0,
                mean_row: self.cluster_y + 1.0,
                event_status: self.event_status,
            });
        }

        if self.create_cluster_hit_info {
            for &hit_index in &self.cluster_hit_indices {
                let cluster_hit = &mut self.cluster_hits[hit_index as usize];
                cluster_hit.cluster_id = self.cluster_id;
                cluster_hit.cluster_size = self.cluster_size;
            }
            let seed_index = self.hit_index_map[map_index(
                self.seed_column as usize,
                self.seed_row as usize,
                self.seed_rel_bcid as usize,
            )] as usize;
            self.cluster_hits[seed_index].is_seed = 1;
        }
    }

    /// Book the actual cluster into the result histograms.
    fn add_cluster_to_results(&mut self) -> Result<(), Error> {
        let size = self.cluster_size as usize;
        if size >= MAX_CLUSTER_HITS_BINS {
            return Err(Error::BinOutOfRange {
                index: size,
                bins: MAX_CLUSTER_HITS_BINS,
            });
        }
        self.cluster_size_hist[size] += 1;
        let tot = self.cluster_tot as usize;
        if tot < MAX_TOT_BINS {
            self.cluster_tot_hist[tot + size * MAX_TOT_BINS] += 1;
            // size row 0 contains all cluster sizes
            self.cluster_tot_hist[tot] += 1;
        } else {
            info!(
                "add_cluster_to_results: cluster tot {} with cluster size {} does not fit into the cluster tot histogram",
                tot, size
            );
        }
        Ok(())
    }

    /// Stamp the per-event cluster quantities on the cluster hits of the
    /// event ending at `end_index`; they are only known after clustering.
    fn add_hit_cluster_info(&mut self, end_index: usize) -> Result<(), Error> {
        if !self.create_cluster_hit_info {
            return Ok(());
        }
        let n_cluster_in_event = self.cluster_id;
        let first = end_index.saturating_sub(self.n_event_hits as usize);
        for cluster_hit in &mut self.cluster_hits[first..end_index] {
            cluster_hit.n_cluster_in_event = n_cluster_in_event;
        }
        Ok(())
    }

    fn clear_hit_map(&mut self) {
        debug!("clear_hit_map");
        if self.n_hits != 0 {
            for rel_bcid in self.bcid_first_hit as i32..=self.bcid_last_hit as i32 {
                for column in self.min_col_hit_pos..=self.max_col_hit_pos {
                    for row in self.min_row_hit_pos..=self.max_row_hit_pos {
                        self.hit_map
                            [map_index(column as usize, row as usize, rel_bcid as usize)] =
                            NO_HIT_SENTINEL;
                    }
                }
            }
        }
        self.n_hits = 0;
        self.reset_bounding_box();
    }

    fn reset_bounding_box(&mut self) {
        self.min_col_hit_pos = MAX_COLUMN - 1;
        self.max_col_hit_pos = 0;
        self.min_row_hit_pos = MAX_ROW - 1;
        self.max_row_hit_pos = 0;
        self.bcid_first_hit = -1;
        self.bcid_last_hit = -1;
    }

    fn clear_cluster_data(&mut self) {
        self.cluster_tot = 0;
        self.cluster_max_tot = 0;
        self.cluster_charge = 0.0;
        self.cluster_rel_bcid = 0;
        self.cluster_size = 0;
        self.cluster_x = 0.0;
        self.cluster_y = 0.0;
        self.seed_column = 0;
        self.seed_row = 0;
        self.seed_rel_bcid = 0;
        self.seed_set = false;
        self.cluster_hit_indices.clear();
        self.abort_cluster = false;
    }

    fn clear_event_variables(&mut self) {
        self.event_number = None;
        self.event_status = EventStatus::empty();
        self.cluster_id = 0;
        self.n_event_hits = 0;
    }
}

impl Default for Clusterizer {
    fn default() -> Clusterizer {
        Clusterizer::new()
    }
}
