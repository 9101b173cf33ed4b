//! FILENAME: tests/common/mod.rs
//! Fixtures for cube-engine integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;

use cube_engine::{CubeDefinition, DimensionDomain};
use report_model::MeasurementRow;

/// Monthly cost rows grouped by unit, environment and service.
pub struct CostFixture;

impl CostFixture {
    pub fn dimensions() -> Vec<&'static str> {
        vec!["unit", "environment", "service"]
    }

    pub fn months() -> Vec<&'static str> {
        vec!["2024-01", "2024-02", "2024-03"]
    }

    /// (unit, environment, service, month, cost)
    pub fn data() -> Vec<(&'static str, &'static str, &'static str, &'static str, &'static str)> {
        vec![
            ("A", "development", "ecs", "2024-01", "-1.01"),
            ("A", "development", "ecs", "2024-02", "3.01"),
            ("B", "development", "ecs", "2024-01", "10.0"),
            ("A", "development", "ec2", "2024-01", "3.51"),
            ("B", "development", "ec2", "2024-01", "-4.72"),
        ]
    }

    pub fn rows() -> Vec<MeasurementRow> {
        Self::data()
            .into_iter()
            .map(|(unit, env, service, month, cost)| {
                MeasurementRow::new(month, cost)
                    .with("unit", unit)
                    .with("environment", env)
                    .with("service", service)
            })
            .collect()
    }

    pub fn definition() -> CubeDefinition {
        CubeDefinition::new(Self::dimensions(), Self::months())
    }

    /// A wider domain than the data covers, as a caller would supply it.
    pub fn wide_domain() -> DimensionDomain {
        DimensionDomain::from_values([
            ("unit", vec!["A", "B", "C"]),
            ("environment", vec!["development", "pre-production", "production"]),
            ("service", vec!["ecs", "ec2", "rds"]),
        ])
        .unwrap()
    }

    /// The same rows as flat records with `date` and `cost` fields.
    pub fn records() -> Vec<BTreeMap<String, String>> {
        Self::data()
            .into_iter()
            .map(|(unit, env, service, month, cost)| {
                [
                    ("unit", unit),
                    ("environment", env),
                    ("service", service),
                    ("date", month),
                    ("cost", cost),
                ]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
            })
            .collect()
    }
}

/// Monthly uptime percentages per team, for averaged totals.
pub struct UptimeFixture;

impl UptimeFixture {
    pub fn months() -> Vec<&'static str> {
        vec!["2024-01", "2024-02", "2024-03"]
    }

    pub fn rows() -> Vec<MeasurementRow> {
        vec![
            MeasurementRow::new("2024-01", "99.5").with("team", "a"),
            MeasurementRow::new("2024-02", "98.5").with("team", "a"),
            MeasurementRow::new("2024-01", "100").with("team", "b"),
        ]
    }

    pub fn definition() -> CubeDefinition {
        CubeDefinition::new(vec!["team"], Self::months())
    }
}

/// Deterministic synthetic rows: `units` x `services` combinations over
/// `months` buckets, every third cell left empty.
pub fn synthetic_rows(units: usize, services: usize, months: usize) -> Vec<MeasurementRow> {
    let mut rows = Vec::new();
    for u in 0..units {
        for s in 0..services {
            for m in 0..months {
                if (u + s + m) % 3 == 0 {
                    continue;
                }
                let value = format!("{}.{:02}", (u * 7 + s * 3 + m) % 50, (u + m) % 100);
                rows.push(
                    MeasurementRow::new(format!("2024-{:02}", m + 1), value)
                        .with("unit", format!("unit-{}", u))
                        .with("service", format!("svc-{}", s)),
                );
            }
        }
    }
    rows
}

pub fn synthetic_months(months: usize) -> Vec<String> {
    (1..=months).map(|m| format!("2024-{:02}", m)).collect()
}
