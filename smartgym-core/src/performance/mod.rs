//! Per-machine grouping and statistics over logged performances.
//!
//! Everything here is a pure function of already-fetched rows. Rows arrive
//! newest-first from the data layer and keep that order inside each group.

mod chart;

pub use chart::{CHART_WINDOW, ChartMetric, ChartSeries, chart_series};

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseRef {
    pub id: i64,
    pub title: String,
    /// `None` while the exercise is not linked to a piece of equipment.
    pub machine: Option<MachineRef>,
}

/// One logged set of an exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub series_count: i64,
    pub reps_count: i64,
    pub load_kg: Option<f64>,
}

impl PerformanceRecord {
    pub fn volume(&self) -> f64 {
        (self.series_count * self.reps_count) as f64 * self.load_kg.unwrap_or(0.0)
    }
}

/// A fetched performance row with its nullable exercise -> machine chain.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPerformance {
    pub record: PerformanceRecord,
    pub exercise: Option<ExerciseRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachinePerformanceGroup {
    pub machine_id: i64,
    pub machine_name: String,
    pub exercise_id: i64,
    pub exercise_title: String,
    pub records: Vec<PerformanceRecord>,
}

impl MachinePerformanceGroup {
    /// Mean reps per record, rounded to the nearest integer. Zero when empty.
    pub fn average_reps(&self) -> i64 {
        if self.records.is_empty() {
            return 0;
        }
        let sum: i64 = self.records.iter().map(|r| r.reps_count).sum();
        (sum as f64 / self.records.len() as f64).round() as i64
    }

    pub fn total_volume(&self) -> f64 {
        self.records.iter().map(PerformanceRecord::volume).sum()
    }

    /// Load of the first record in group order, i.e. the most recent one.
    pub fn last_load(&self) -> f64 {
        self.records
            .first()
            .and_then(|r| r.load_kg)
            .unwrap_or(0.0)
    }

    pub fn has_load_data(&self) -> bool {
        self.records.iter().any(|r| r.load_kg.is_some())
    }

    pub fn summary(&self) -> MachineSummary {
        MachineSummary {
            record_count: self.records.len(),
            average_reps: self.average_reps(),
            total_volume: self.total_volume(),
            last_load: self.last_load(),
        }
    }

    pub fn chart(&self, metric: ChartMetric) -> ChartSeries {
        chart_series(&self.records, metric)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MachineSummary {
    pub record_count: usize,
    pub average_reps: i64,
    pub total_volume: f64,
    pub last_load: f64,
}

/// Insertion-ordered association from machine id to its group.
#[derive(Debug, Default)]
struct MachineGroups {
    index: HashMap<i64, usize>,
    groups: Vec<MachinePerformanceGroup>,
}

impl MachineGroups {
    fn push(
        &mut self,
        exercise_id: i64,
        exercise_title: String,
        machine: MachineRef,
        record: PerformanceRecord,
    ) {
        let slot = match self.index.get(&machine.id) {
            Some(&slot) => slot,
            None => {
                self.groups.push(MachinePerformanceGroup {
                    machine_id: machine.id,
                    machine_name: machine.name,
                    exercise_id,
                    exercise_title,
                    records: Vec::new(),
                });
                let slot = self.groups.len() - 1;
                self.index.insert(machine.id, slot);
                slot
            }
        };
        self.groups[slot].records.push(record);
    }

    fn into_groups(self) -> Vec<MachinePerformanceGroup> {
        self.groups
    }
}

/// Buckets performances by machine. Rows without a machine are skipped; groups
/// come out in first-encounter order.
pub fn group_by_machine<I>(performances: I) -> Vec<MachinePerformanceGroup>
where
    I: IntoIterator<Item = RawPerformance>,
{
    let mut groups = MachineGroups::default();
    let mut skipped = 0usize;

    for RawPerformance { record, exercise } in performances {
        match exercise {
            Some(ExerciseRef {
                id,
                title,
                machine: Some(machine),
            }) => groups.push(id, title, machine, record),
            _ => skipped += 1,
        }
    }

    let groups = groups.into_groups();
    debug!(
        "group_by_machine built {} groups ({} unlinked records skipped)",
        groups.len(),
        skipped
    );
    groups
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStatistics {
    pub total_sessions: i64,
    pub distinct_exercises: i64,
    pub last_session: Option<DateTime<Utc>>,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, d, 12, 0, 0).unwrap()
    }

    pub(crate) fn record(
        id: i64,
        d: u32,
        series: i64,
        reps: i64,
        load: Option<f64>,
    ) -> PerformanceRecord {
        PerformanceRecord {
            id,
            date: day(d),
            series_count: series,
            reps_count: reps,
            load_kg: load,
        }
    }

    fn on_machine(record: PerformanceRecord, machine_id: i64) -> RawPerformance {
        RawPerformance {
            record,
            exercise: Some(ExerciseRef {
                id: machine_id * 10,
                title: format!("Exercise {}", machine_id * 10),
                machine: Some(MachineRef {
                    id: machine_id,
                    name: format!("Machine {}", machine_id),
                }),
            }),
        }
    }

    fn unlinked(record: PerformanceRecord) -> RawPerformance {
        RawPerformance {
            record,
            exercise: Some(ExerciseRef {
                id: 99,
                title: "Free weights".into(),
                machine: None,
            }),
        }
    }

    fn group(records: Vec<PerformanceRecord>) -> MachinePerformanceGroup {
        MachinePerformanceGroup {
            machine_id: 1,
            machine_name: "Leg press".into(),
            exercise_id: 10,
            exercise_title: "Leg press".into(),
            records,
        }
    }

    #[test]
    fn unlinked_records_are_dropped() {
        let input = vec![
            on_machine(record(1, 5, 3, 10, Some(40.0)), 2),
            unlinked(record(2, 4, 3, 10, None)),
            RawPerformance {
                record: record(3, 3, 3, 10, None),
                exercise: None,
            },
            on_machine(record(4, 2, 3, 10, Some(40.0)), 1),
            on_machine(record(5, 1, 3, 8, Some(45.0)), 2),
        ];

        let groups = group_by_machine(input);

        assert_eq!(groups.len(), 2);
        let ids: Vec<i64> = groups
            .iter()
            .flat_map(|g| g.records.iter().map(|r| r.id))
            .collect();
        assert!(!ids.contains(&2));
        assert!(!ids.contains(&3));
    }

    #[test]
    fn groups_follow_first_encounter_order() {
        let input = vec![
            on_machine(record(1, 9, 3, 10, None), 7),
            on_machine(record(2, 8, 3, 10, None), 3),
            on_machine(record(3, 7, 3, 10, None), 7),
            on_machine(record(4, 6, 3, 10, None), 5),
        ];

        let groups = group_by_machine(input);

        let order: Vec<i64> = groups.iter().map(|g| g.machine_id).collect();
        assert_eq!(order, vec![7, 3, 5]);
        assert_eq!(groups[0].machine_name, "Machine 7");
        assert_eq!(groups[0].exercise_id, 70);
        let records: Vec<i64> = groups[0].records.iter().map(|r| r.id).collect();
        assert_eq!(records, vec![1, 3]);
    }

    #[test]
    fn empty_group_statistics_are_zero() {
        let empty = group(vec![]);
        assert_eq!(empty.average_reps(), 0);
        assert_eq!(empty.total_volume(), 0.0);
        assert_eq!(empty.last_load(), 0.0);
        assert!(!empty.has_load_data());
    }

    #[test]
    fn statistics_for_documented_example() {
        let g = group(vec![
            record(2, 2, 3, 12, None),
            record(1, 1, 3, 10, Some(50.0)),
        ]);
        assert_eq!(g.average_reps(), 11);
        assert_eq!(g.total_volume(), 1500.0);
        // newest-first ordering: the first record has no load
        assert_eq!(g.last_load(), 0.0);

        let reversed = group(vec![
            record(1, 1, 3, 10, Some(50.0)),
            record(2, 2, 3, 12, None),
        ]);
        assert_eq!(reversed.last_load(), 50.0);
    }

    #[test]
    fn total_volume_ignores_order() {
        let records = vec![
            record(1, 1, 4, 8, Some(60.0)),
            record(2, 2, 3, 10, Some(52.5)),
            record(3, 3, 5, 5, None),
            record(4, 4, 2, 12, Some(20.0)),
        ];
        let forward = group(records.clone()).total_volume();

        let mut shuffled = records;
        shuffled.reverse();
        shuffled.swap(0, 2);
        assert_eq!(group(shuffled).total_volume(), forward);
        assert_eq!(forward, 1920.0 + 1575.0 + 480.0);
    }

    #[test]
    fn average_reps_rounds_to_nearest() {
        let g = group(vec![
            record(1, 1, 3, 10, None),
            record(2, 2, 3, 11, None),
        ]);
        assert_eq!(g.average_reps(), 11);

        let g = group(vec![
            record(1, 1, 3, 10, None),
            record(2, 2, 3, 10, None),
            record(3, 3, 3, 11, None),
        ]);
        assert_eq!(g.average_reps(), 10);
    }

    #[test]
    fn summary_bundles_statistics() {
        let g = group(vec![
            record(2, 2, 3, 12, Some(55.0)),
            record(1, 1, 3, 10, Some(50.0)),
        ]);
        let summary = g.summary();
        assert_eq!(summary.record_count, 2);
        assert_eq!(summary.average_reps, 11);
        assert_eq!(summary.total_volume, 3.0 * 12.0 * 55.0 + 1500.0);
        assert_eq!(summary.last_load, 55.0);
    }
}
