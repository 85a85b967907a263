// Aggregations the dashboard presents, computed over the enriched table.
// Everything here is a pure read: the table is shared, never mutated.
use crate::prep::categorize_power;
use crate::types::{
    DepartmentCountRow, DepartmentOperatorRow, EnrichedStation, MarketShareRow, NetworkSummary,
    OperatorComparisonRow, PowerBand, QuarterlyInstallRow,
};
use crate::util::{average, format_number, median};
use std::collections::{HashMap, HashSet};

/// Installation time series is clipped to these years: the network barely
/// existed before 2015 and dates after the snapshot year are input noise.
const SERIES_FIRST_YEAR: i32 = 2015;
const SERIES_LAST_YEAR: i32 = 2025;

/// How many operators the market-share breakdown names before folding the
/// tail into "Others".
const MARKET_SHARE_TOP_N: usize = 10;

pub fn network_summary(stations: &[EnrichedStation]) -> NetworkSummary {
    let powers: Vec<f64> = stations.iter().filter_map(|s| s.record.power_kw).collect();
    let operators: HashSet<&str> = stations.iter().map(|s| s.record.operator.as_str()).collect();
    let departments: HashSet<&str> = stations.iter().map(|s| s.department.as_str()).collect();
    NetworkSummary {
        stations: stations.len(),
        charge_points: stations
            .iter()
            .map(|s| u64::from(s.record.charge_points))
            .sum(),
        avg_power_kw: average(&powers),
        operators: operators.len(),
        departments: departments.len(),
    }
}

/// New installations per quarter with per-band composition and the running
/// network total. Stations without a commissioning date are excluded here
/// (never fabricated), which is why the cumulative column undercounts the
/// full table.
pub fn quarterly_installations(stations: &[EnrichedStation]) -> Vec<QuarterlyInstallRow> {
    use chrono::Datelike;

    #[derive(Default)]
    struct Acc {
        installed: usize,
        by_band: [usize; 4],
    }

    let mut map: HashMap<(i32, u32), Acc> = HashMap::new();
    for station in stations {
        let Some(date) = station.record.commissioned else {
            continue;
        };
        let year = date.year();
        if !(SERIES_FIRST_YEAR..=SERIES_LAST_YEAR).contains(&year) {
            continue;
        }
        let quarter = (date.month() - 1) / 3 + 1;
        let acc = map.entry((year, quarter)).or_default();
        acc.installed += 1;
        let band = categorize_power(station.record.power_kw);
        acc.by_band[band as usize] += 1;
    }

    let mut keys: Vec<(i32, u32)> = map.keys().copied().collect();
    keys.sort_unstable();

    let mut cumulative = 0usize;
    keys.into_iter()
        .map(|key| {
            let acc = &map[&key];
            cumulative += acc.installed;
            QuarterlyInstallRow {
                quarter: format!("{}-Q{}", key.0, key.1),
                installed: acc.installed,
                slow: acc.by_band[PowerBand::Slow as usize],
                fast: acc.by_band[PowerBand::Fast as usize],
                rapid: acc.by_band[PowerBand::Rapid as usize],
                ultra_fast: acc.by_band[PowerBand::UltraFast as usize],
                cumulative_total: cumulative,
            }
        })
        .collect()
}

/// Top operators by station count plus an "Others" bucket, with shares of
/// the whole table. The operator set is open-ended (unmapped names pass
/// canonicalization unchanged), so the tail bucket matters.
pub fn operator_market_share(stations: &[EnrichedStation]) -> Vec<MarketShareRow> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for station in stations {
        *counts.entry(station.record.operator.as_str()).or_default() += 1;
    }
    let total = stations.len();
    if total == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let share = |n: usize| format_number(n as f64 / total as f64 * 100.0, 2);
    let mut rows: Vec<MarketShareRow> = ranked
        .iter()
        .take(MARKET_SHARE_TOP_N)
        .map(|(operator, stations)| MarketShareRow {
            operator: (*operator).to_string(),
            stations: *stations,
            share_pct: share(*stations),
        })
        .collect();

    let tail: usize = ranked
        .iter()
        .skip(MARKET_SHARE_TOP_N)
        .map(|(_, n)| *n)
        .sum();
    if tail > 0 {
        rows.push(MarketShareRow {
            operator: "Others".to_string(),
            stations: tail,
            share_pct: share(tail),
        });
    }
    rows
}

/// Stations and charge points per department, densest first.
pub fn department_counts(stations: &[EnrichedStation], top_n: usize) -> Vec<DepartmentCountRow> {
    #[derive(Default)]
    struct Acc {
        stations: usize,
        charge_points: u64,
    }
    let mut map: HashMap<&str, Acc> = HashMap::new();
    for station in stations {
        let acc = map.entry(station.department.as_str()).or_default();
        acc.stations += 1;
        acc.charge_points += u64::from(station.record.charge_points);
    }
    let mut rows: Vec<(&str, Acc)> = map.into_iter().collect();
    rows.sort_by(|a, b| b.1.stations.cmp(&a.1.stations).then_with(|| a.0.cmp(b.0)));
    rows.into_iter()
        .take(top_n)
        .map(|(department, acc)| DepartmentCountRow {
            department: department.to_string(),
            stations: acc.stations,
            charge_points: format_number(acc.charge_points as f64, 0),
        })
        .collect()
}

/// Leading operators within one department.
pub fn top_operators_in_department(
    stations: &[EnrichedStation],
    department: &str,
    top_n: usize,
) -> Vec<DepartmentOperatorRow> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for station in stations.iter().filter(|s| s.department == department) {
        *counts.entry(station.record.operator.as_str()).or_default() += 1;
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(top_n)
        .enumerate()
        .map(|(idx, (operator, stations))| DepartmentOperatorRow {
            rank: idx + 1,
            operator: operator.to_string(),
            stations,
        })
        .collect()
}

/// Side-by-side profile of the named operators: fleet size, power statistics
/// and power-band mix. Order of the output follows the input names; unknown
/// names yield no row.
pub fn compare_operators(
    stations: &[EnrichedStation],
    operators: &[String],
) -> Vec<OperatorComparisonRow> {
    operators
        .iter()
        .filter_map(|operator| {
            let fleet: Vec<&EnrichedStation> = stations
                .iter()
                .filter(|s| s.record.operator == *operator)
                .collect();
            if fleet.is_empty() {
                return None;
            }
            let powers: Vec<f64> = fleet.iter().filter_map(|s| s.record.power_kw).collect();
            let mut by_band = [0usize; 4];
            for station in &fleet {
                by_band[categorize_power(station.record.power_kw) as usize] += 1;
            }
            let charge_points: u64 = fleet
                .iter()
                .map(|s| u64::from(s.record.charge_points))
                .sum();
            Some(OperatorComparisonRow {
                operator: operator.clone(),
                stations: fleet.len(),
                charge_points: format_number(charge_points as f64, 0),
                avg_power_kw: format_number(average(&powers), 2),
                median_power_kw: format_number(median(powers.clone()), 2),
                slow: by_band[PowerBand::Slow as usize],
                fast: by_band[PowerBand::Fast as usize],
                rapid: by_band[PowerBand::Rapid as usize],
                ultra_fast: by_band[PowerBand::UltraFast as usize],
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StationRecord;
    use chrono::NaiveDate;

    fn enriched(
        operator: &str,
        department: &str,
        power_kw: Option<f64>,
        commissioned: Option<(i32, u32, u32)>,
        charge_points: u32,
    ) -> EnrichedStation {
        EnrichedStation {
            longitude: 2.35,
            latitude: 48.85,
            department: department.to_string(),
            record: StationRecord {
                operator: operator.to_string(),
                address: None,
                longitude: Some(2.35),
                latitude: Some(48.85),
                power_kw,
                plug_ef: false,
                plug_type2: true,
                plug_combo_ccs: false,
                plug_chademo: false,
                plug_other: false,
                payment_act: false,
                payment_card: false,
                payment_other: false,
                access_condition: None,
                reservation: None,
                commissioned: commissioned
                    .and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
                charge_points,
            },
        }
    }

    fn sample_table() -> Vec<EnrichedStation> {
        vec![
            enriched("TESLA", "75", Some(250.0), Some((2022, 2, 1)), 8),
            enriched("TESLA", "75", Some(150.0), Some((2022, 3, 10)), 12),
            enriched("IZIVIA", "75", Some(22.0), Some((2022, 5, 20)), 2),
            enriched("IZIVIA", "69", Some(7.4), None, 2),
            enriched("FRESHMILE", "69", None, Some((2016, 11, 2)), 1),
        ]
    }

    #[test]
    fn summary_counts_the_whole_table() {
        let summary = network_summary(&sample_table());
        assert_eq!(summary.stations, 5);
        assert_eq!(summary.charge_points, 25);
        assert_eq!(summary.operators, 3);
        assert_eq!(summary.departments, 2);
        // Mean over the four known ratings only.
        assert!((summary.avg_power_kw - 107.35).abs() < 1e-9);
    }

    #[test]
    fn quarterly_series_skips_undated_and_accumulates() {
        let rows = quarterly_installations(&sample_table());
        let quarters: Vec<&str> = rows.iter().map(|r| r.quarter.as_str()).collect();
        assert_eq!(quarters, vec!["2016-Q4", "2022-Q1", "2022-Q2"]);
        assert_eq!(rows[1].installed, 2);
        assert_eq!(rows[1].ultra_fast, 2);
        // 4 dated stations total; the undated IZIVIA row never appears.
        assert_eq!(rows.last().unwrap().cumulative_total, 4);
    }

    #[test]
    fn market_share_folds_the_tail_into_others() {
        let mut table = Vec::new();
        for i in 0..12 {
            let name = format!("OP{:02}", i);
            for _ in 0..(12 - i) {
                table.push(enriched(&name, "75", Some(22.0), None, 1));
            }
        }
        let rows = operator_market_share(&table);
        assert_eq!(rows.len(), MARKET_SHARE_TOP_N + 1);
        assert_eq!(rows[0].operator, "OP00");
        assert_eq!(rows[0].stations, 12);
        let others = rows.last().unwrap();
        assert_eq!(others.operator, "Others");
        // OP10 (2 stations) and OP11 (1 station) fold together.
        assert_eq!(others.stations, 3);
        let total: usize = rows.iter().map(|r| r.stations).sum();
        assert_eq!(total, table.len());
    }

    #[test]
    fn department_density_sorts_descending() {
        let rows = department_counts(&sample_table(), 20);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].department, "75");
        assert_eq!(rows[0].stations, 3);
        assert_eq!(rows[1].department, "69");
    }

    #[test]
    fn department_top_operators_are_ranked() {
        let rows = top_operators_in_department(&sample_table(), "75", 5);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].operator, "TESLA");
        assert_eq!(rows[0].stations, 2);
        assert_eq!(rows[1].operator, "IZIVIA");
    }

    #[test]
    fn comparator_profiles_each_named_operator() {
        let rows = compare_operators(
            &sample_table(),
            &["TESLA".to_string(), "FRESHMILE".to_string(), "GHOST".to_string()],
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].operator, "TESLA");
        assert_eq!(rows[0].stations, 2);
        assert_eq!(rows[0].ultra_fast, 2);
        // FRESHMILE's single station has no power rating: Slow band.
        assert_eq!(rows[1].slow, 1);
    }
}
