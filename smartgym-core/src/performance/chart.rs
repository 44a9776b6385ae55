use serde::{Deserialize, Serialize};

use super::PerformanceRecord;

/// Number of most recent records plotted per chart.
pub const CHART_WINDOW: usize = 6;

const LABEL_FORMAT: &str = "%d/%m";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartMetric {
    Reps,
    Load,
}

impl ChartMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartMetric::Reps => "reps",
            ChartMetric::Load => "load",
        }
    }

    fn value(&self, record: &PerformanceRecord) -> f64 {
        match self {
            ChartMetric::Reps => record.reps_count as f64,
            ChartMetric::Load => record.load_kg.unwrap_or(0.0),
        }
    }
}

/// Parallel label/value arrays, oldest point first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

pub fn chart_series(records: &[PerformanceRecord], metric: ChartMetric) -> ChartSeries {
    let mut sorted: Vec<&PerformanceRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.date);
    let window = &sorted[sorted.len().saturating_sub(CHART_WINDOW)..];

    ChartSeries {
        labels: window
            .iter()
            .map(|r| r.date.format(LABEL_FORMAT).to_string())
            .collect(),
        values: window.iter().map(|r| metric.value(r)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::performance::tests::record;

    #[test]
    fn keeps_most_recent_six_in_ascending_order() {
        let records: Vec<_> = (1..=9)
            .rev()
            .map(|d| record(d as i64, d, 3, 10 + d as i64, Some(d as f64 * 5.0)))
            .collect();

        let series = chart_series(&records, ChartMetric::Reps);

        assert_eq!(series.len(), CHART_WINDOW);
        assert_eq!(
            series.labels,
            vec!["04/03", "05/03", "06/03", "07/03", "08/03", "09/03"]
        );
        assert_eq!(series.values, vec![14.0, 15.0, 16.0, 17.0, 18.0, 19.0]);
    }

    #[test]
    fn short_history_is_not_padded() {
        let records = vec![record(2, 20, 3, 12, None), record(1, 11, 3, 10, Some(50.0))];

        let series = chart_series(&records, ChartMetric::Load);

        assert_eq!(series.len(), 2);
        assert_eq!(series.labels, vec!["11/03", "20/03"]);
        // missing load charts as zero
        assert_eq!(series.values, vec![50.0, 0.0]);
    }

    #[test]
    fn empty_records_give_empty_series() {
        let series = chart_series(&[], ChartMetric::Reps);
        assert!(series.is_empty());
        assert!(series.labels.is_empty());
    }
}
