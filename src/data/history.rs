//! Rolling history of chart points.

use std::collections::{BTreeMap, VecDeque};

/// Default number of points kept for the chart.
pub const DEFAULT_CAPACITY: usize = 50;

/// One chart sample: a time label and the value of each series present
/// in that cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub label: String,
    pub values: BTreeMap<String, f64>,
}

impl SeriesPoint {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn with(mut self, series: &str, value: f64) -> Self {
        self.values.insert(series.to_string(), value);
        self
    }
}

/// Fixed-capacity, oldest-first sequence of [`SeriesPoint`]s.
///
/// Once full, each push evicts the single oldest point first, so the
/// buffer always holds the most recent `capacity` points in order.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    points: VecDeque<SeriesPoint>,
    capacity: usize,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl HistoryBuffer {
    /// Create an empty buffer. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a point, evicting the oldest when full.
    pub fn push(&mut self, point: SeriesPoint) {
        if self.points.len() >= self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeriesPoint> {
        self.points.iter()
    }

    /// Labels of all buffered points, oldest first.
    pub fn labels(&self) -> Vec<&str> {
        self.points.iter().map(|p| p.label.as_str()).collect()
    }

    /// Chart coordinates for one series.
    ///
    /// X is the point's position in the buffer so every series shares the
    /// same axis; points where the series was absent are skipped.
    pub fn series(&self, id: &str) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.values.get(id).map(|v| (i as f64, *v)))
            .collect()
    }

    /// Most recent value recorded for a series.
    pub fn latest(&self, id: &str) -> Option<f64> {
        self.points.iter().rev().find_map(|p| p.values.get(id).copied())
    }

    /// Smallest and largest value across all series, if any.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        self.points
            .iter()
            .flat_map(|p| p.values.values().copied())
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(i: usize) -> SeriesPoint {
        SeriesPoint::new(format!("t{}", i)).with("power", i as f64)
    }

    #[test]
    fn test_push_within_capacity() {
        let mut buffer = HistoryBuffer::new(5);
        for i in 0..3 {
            buffer.push(point(i));
        }
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.labels(), vec!["t0", "t1", "t2"]);
    }

    #[test]
    fn test_fifty_one_pushes_evict_the_first() {
        let mut buffer = HistoryBuffer::new(50);
        for i in 0..51 {
            buffer.push(point(i));
            assert!(buffer.len() <= 50);
        }

        assert_eq!(buffer.len(), 50);
        assert!(!buffer.labels().contains(&"t0"));
        let expected: Vec<String> = (1..51).map(|i| format!("t{}", i)).collect();
        assert_eq!(buffer.labels(), expected.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn test_small_capacity_keeps_most_recent() {
        let mut buffer = HistoryBuffer::new(10);
        for i in 0..137 {
            buffer.push(point(i));
        }
        assert_eq!(buffer.len(), 10);
        assert_eq!(buffer.iter().next().unwrap().label, "t127");
        assert_eq!(buffer.latest("power"), Some(136.0));
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut buffer = HistoryBuffer::new(0);
        buffer.push(point(1));
        buffer.push(point(2));
        assert_eq!(buffer.capacity(), 1);
        assert_eq!(buffer.labels(), vec!["t2"]);
    }

    #[test]
    fn test_series_skips_missing_points() {
        let mut buffer = HistoryBuffer::new(10);
        buffer.push(SeriesPoint::new("a").with("sum", 1.0).with("limit", 5.0));
        buffer.push(SeriesPoint::new("b").with("sum", 2.0));
        buffer.push(SeriesPoint::new("c").with("sum", 3.0).with("limit", 6.0));

        assert_eq!(buffer.series("sum"), vec![(0.0, 1.0), (1.0, 2.0), (2.0, 3.0)]);
        assert_eq!(buffer.series("limit"), vec![(0.0, 5.0), (2.0, 6.0)]);
        assert!(buffer.series("unknown").is_empty());
    }

    #[test]
    fn test_value_bounds() {
        let mut buffer = HistoryBuffer::new(10);
        assert_eq!(buffer.value_bounds(), None);

        buffer.push(SeriesPoint::new("a").with("sum", -20.0).with("limit", 600.0));
        buffer.push(SeriesPoint::new("b").with("sum", 350.0));
        assert_eq!(buffer.value_bounds(), Some((-20.0, 600.0)));
    }
}
