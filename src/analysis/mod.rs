//! Fast helpers to align hit and cluster tables by event number after the
//! interpretation pass. All event number inputs are expected sorted
//! ascending; every function runs a single monotone scan.

use crate::fei4::ClusterInfo;
use crate::Error;

/// Run-length encode a sorted event number column: how many clusters (or
/// hits) occur in every event. Returns `(event_number, count)` pairs.
pub fn count_clusters_per_event(event_numbers: &[u64]) -> Vec<(u64, u32)> {
    let mut result = Vec::new();
    let mut last_index = 0;
    let mut last_value = match event_numbers.first() {
        Some(&value) => value,
        None => return result,
    };
    for (i, &value) in event_numbers.iter().enumerate().skip(1) {
        if value != last_value {
            result.push((last_value, (i - last_index) as u32));
            last_value = value;
            last_index = i;
        }
    }
    result.push((last_value, (event_numbers.len() - last_index) as u32));
    result
}

/// The sorted unique intersection of two sorted event number arrays.
pub fn intersect_events(left: &[u64], right: &[u64]) -> Vec<u64> {
    let mut result = Vec::new();
    let mut cursor = 0;
    let mut last: Option<u64> = None;
    for &event_number in left {
        // omit the same event number occurring again
        if last == Some(event_number) {
            continue;
        }
        last = Some(event_number);
        while cursor < right.len() && right[cursor] < event_number {
            cursor += 1;
        }
        if cursor < right.len() && right[cursor] == event_number {
            result.push(event_number);
        }
    }
    result
}

/// For every element of `values` (in scan order), whether it occurs in the
/// sorted array `sorted`. Does what `np.in1d` does, but uses the sort
/// order of the second array.
pub fn in1d_sorted(values: &[u64], sorted: &[u64]) -> Vec<bool> {
    let mut selection = Vec::with_capacity(values.len());
    let mut cursor = 0;
    for &value in values {
        while cursor < sorted.len() && sorted[cursor] < value {
            cursor += 1;
        }
        selection.push(cursor < sorted.len() && sorted[cursor] == value);
    }
    selection
}

/// Merge two sorted event number arrays keeping, per event number, the
/// maximum occurrence count of the two sides. Useful for one-to-many
/// joins where the denser table wins.
pub fn max_events_in_both(left: &[u64], right: &[u64]) -> Vec<u64> {
    let mut result = Vec::new();
    let mut i = 0;
    let mut j = 0;
    while i < left.len() || j < right.len() {
        let next_left = left.get(i).copied();
        let next_right = right.get(j).copied();
        let event_number = match (next_left, next_right) {
            (Some(l), Some(r)) => l.min(r),
            (Some(l), None) => l,
            (None, Some(r)) => r,
            (None, None) => break,
        };
        let mut left_count = 0;
        while i < left.len() && left[i] == event_number {
            left_count += 1;
            i += 1;
        }
        let mut right_count = 0;
        while j < right.len() && right[j] == event_number {
            right_count += 1;
            j += 1;
        }
        for _ in 0..left_count.max(right_count) {
            result.push(event_number);
        }
    }
    result
}

/// For every row of `event_numbers`, attach the next cluster with a
/// matching event number; rows without a match stay at the default
/// cluster. Both inputs are scanned monotonically.
pub fn map_cluster_to_hits(event_numbers: &[u64], clusters: &[ClusterInfo]) -> Vec<ClusterInfo> {
    let mut mapped = Vec::with_capacity(event_numbers.len());
    let mut cursor = 0;
    for &event_number in event_numbers {
        while cursor < clusters.len() && clusters[cursor].event_number < event_number {
            cursor += 1;
        }
        if cursor < clusters.len() && clusters[cursor].event_number == event_number {
            mapped.push(clusters[cursor]);
            cursor += 1;
        } else {
            mapped.push(ClusterInfo::default());
        }
    }
    mapped
}

/// Fast 1d index histogramming (bin size 1, values starting from 0).
pub fn histogram_1d(x: &[u32], n_bins_x: usize) -> Result<Vec<u32>, Error> {
    let mut result = vec![0u32; n_bins_x];
    for &value in x {
        let index = value as usize;
        if index >= n_bins_x {
            return Err(Error::BinOutOfRange {
                index,
                bins: n_bins_x,
            });
        }
        result[index] = result[index]
            .checked_add(1)
            .ok_or(Error::BinOverflow { index })?;
    }
    Ok(result)
}

/// Fast 2d index histogramming; the result is row-major over `(x, y)`.
pub fn histogram_2d(
    x: &[u32],
    y: &[u32],
    n_bins_x: usize,
    n_bins_y: usize,
) -> Result<Vec<u32>, Error> {
    if x.len() != y.len() {
        return Err(Error::LengthMismatch {
            left: x.len(),
            right: y.len(),
        });
    }
    let mut result = vec![0u32; n_bins_x * n_bins_y];
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        if xi as usize >= n_bins_x || yi as usize >= n_bins_y {
            return Err(Error::BinOutOfRange {
                index: xi as usize * n_bins_y + yi as usize,
                bins: n_bins_x * n_bins_y,
            });
        }
        let index = xi as usize * n_bins_y + yi as usize;
        result[index] = result[index]
            .checked_add(1)
            .ok_or(Error::BinOverflow { index })?;
    }
    Ok(result)
}

/// Fast 3d index histogramming; the result is row-major over `(x, y, z)`.
pub fn histogram_3d(
    x: &[u32],
    y: &[u32],
    z: &[u32],
    n_bins_x: usize,
    n_bins_y: usize,
    n_bins_z: usize,
) -> Result<Vec<u32>, Error> {
    if x.len() != y.len() || x.len() != z.len() {
        return Err(Error::LengthMismatch {
            left: x.len(),
            right: y.len().max(z.len()),
        });
    }
    let mut result = vec![0u32; n_bins_x * n_bins_y * n_bins_z];
    for i in 0..x.len() {
        let (xi, yi, zi) = (x[i] as usize, y[i] as usize, z[i] as usize);
        if xi >= n_bins_x || yi >= n_bins_y || zi >= n_bins_z {
            return Err(Error::BinOutOfRange {
                index: xi * n_bins_y * n_bins_z + yi * n_bins_z + zi,
                bins: n_bins_x * n_bins_y * n_bins_z,
            });
        }
        let index = xi * n_bins_y * n_bins_z + yi * n_bins_z + zi;
        result[index] = result[index]
            .checked_add(1)
            .ok_or(Error::BinOverflow { index })?;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster(event_number: u64, id: u16) -> ClusterInfo {
        ClusterInfo {
            event_number,
            id,
            ..ClusterInfo::default()
        }
    }

    #[test]
    fn count_clusters_is_a_run_length_encoding() {
        let events = [0, 0, 1, 4, 4, 4, 7];
        let counts = count_clusters_per_event(&events);
        assert_eq!(counts, vec![(0, 2), (1, 1), (4, 3), (7, 1)]);
        // concatenating the encoding reproduces the input
        let decoded: Vec<u64> = counts
            .iter()
            .flat_map(|&(event, n)| std::iter::repeat(event).take(n as usize))
            .collect();
        assert_eq!(decoded, events);
    }

    #[test]
    fn count_clusters_empty_input() {
        assert!(count_clusters_per_event(&[]).is_empty());
    }

    #[test]
    fn intersection_is_sorted_and_unique() {
        let left = [0, 1, 1, 2, 5, 9];
        let right = [1, 2, 3, 9, 9];
        assert_eq!(intersect_events(&left, &right), vec![1, 2, 9]);
        assert_eq!(intersect_events(&left, &[]), Vec::<u64>::new());
    }

    #[test]
    fn in1d_sorted_marks_membership() {
        let values = [0, 2, 2, 4, 8];
        let sorted = [1, 2, 4, 5];
        assert_eq!(
            in1d_sorted(&values, &sorted),
            vec![false, true, true, true, false]
        );
    }

    #[test]
    fn max_events_keeps_duplicate_counts() {
        let left = [0, 0, 1, 3];
        let right = [0, 1, 1, 1, 2];
        assert_eq!(
            max_events_in_both(&left, &right),
            vec![0, 0, 1, 1, 1, 2, 3]
        );
    }

    #[test]
    fn map_cluster_aligns_rows() {
        let clusters = [cluster(1, 0), cluster(1, 1), cluster(3, 0)];
        let events = [0, 1, 1, 2, 3];
        let mapped = map_cluster_to_hits(&events, &clusters);
        assert_eq!(mapped.len(), events.len());
        assert_eq!(mapped[0], ClusterInfo::default());
        assert_eq!(mapped[1].event_number, 1);
        assert_eq!(mapped[1].id, 0);
        assert_eq!(mapped[2].id, 1);
        assert_eq!(mapped[3], ClusterInfo::default());
        assert_eq!(mapped[4].event_number, 3);
    }

    #[test]
    fn histogram_1d_bins_by_index() {
        let result = histogram_1d(&[0, 1, 1, 3], 4).unwrap();
        assert_eq!(result, vec![1, 2, 0, 1]);
        assert!(histogram_1d(&[4], 4).is_err());
    }

    #[test]
    fn histogram_2d_rejects_length_mismatch() {
        assert!(histogram_2d(&[1], &[1, 2], 4, 4).is_err());
        let result = histogram_2d(&[0, 1], &[1, 0], 2, 2).unwrap();
        assert_eq!(result, vec![0, 1, 1, 0]);
    }

    #[test]
    fn histogram_3d_bins_by_index() {
        let result = histogram_3d(&[0, 1], &[1, 0], &[0, 1], 2, 2, 2).unwrap();
        assert_eq!(result[0 * 4 + 1 * 2 + 0], 1);
        assert_eq!(result[1 * 4 + 0 * 2 + 1], 1);
        assert_eq!(result.iter().sum::<u32>(), 2);
    }
}
