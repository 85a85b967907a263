use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

/// One row of the raw IRVE snapshot, exactly as the CSV delivers it.
///
/// Every field is an optional string: the source is self-reported by hundreds
/// of operators and nothing about it can be trusted before the typed cast.
/// Field names follow the French open-data headers.
#[derive(Debug, Deserialize)]
pub struct RawStationRow {
    #[serde(rename = "nom_operateur")]
    pub operator: Option<String>,
    #[serde(rename = "adresse_station")]
    pub address: Option<String>,
    #[serde(rename = "consolidated_longitude")]
    pub longitude: Option<String>,
    #[serde(rename = "consolidated_latitude")]
    pub latitude: Option<String>,
    #[serde(rename = "puissance_nominale")]
    pub power_kw: Option<String>,
    #[serde(rename = "prise_type_ef")]
    pub plug_ef: Option<String>,
    #[serde(rename = "prise_type_2")]
    pub plug_type2: Option<String>,
    #[serde(rename = "prise_type_combo_ccs")]
    pub plug_combo_ccs: Option<String>,
    #[serde(rename = "prise_type_chademo")]
    pub plug_chademo: Option<String>,
    #[serde(rename = "prise_type_autre")]
    pub plug_other: Option<String>,
    #[serde(rename = "paiement_acte")]
    pub payment_act: Option<String>,
    #[serde(rename = "paiement_cb")]
    pub payment_card: Option<String>,
    #[serde(rename = "paiement_autre")]
    pub payment_other: Option<String>,
    #[serde(rename = "condition_acces")]
    pub access_condition: Option<String>,
    #[serde(rename = "reservation")]
    pub reservation: Option<String>,
    #[serde(rename = "date_mise_en_service")]
    pub commissioned: Option<String>,
    #[serde(rename = "nbre_pdc")]
    pub charge_points: Option<String>,
}

/// A charging station after the typed cast, null policy and operator
/// canonicalization. Immutable once built; downstream consumers work on
/// filtered copies, never on the canonical table in place.
#[derive(Debug, Clone, PartialEq)]
pub struct StationRecord {
    /// Canonical upper-cased brand, never empty (sentinel-defaulted).
    pub operator: String,
    pub address: Option<String>,
    /// WGS84 degrees. Jointly present or jointly `None`: a row carrying only
    /// one of the two coordinates has no usable location.
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    /// `None` when the source value did not parse; never coerced to 0.
    pub power_kw: Option<f64>,
    pub plug_ef: bool,
    pub plug_type2: bool,
    pub plug_combo_ccs: bool,
    pub plug_chademo: bool,
    pub plug_other: bool,
    pub payment_act: bool,
    pub payment_card: bool,
    pub payment_other: bool,
    pub access_condition: Option<String>,
    pub reservation: Option<String>,
    /// `None` when the source date did not parse; never fabricated.
    pub commissioned: Option<NaiveDate>,
    pub charge_points: u32,
}

/// A station that survived the spatial join. Coordinates and the department
/// code are non-optional by construction, which is the point of the type.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedStation {
    pub longitude: f64,
    pub latitude: f64,
    /// Code of the department polygon the point fell into.
    pub department: String,
    pub record: StationRecord,
}

/// Ordered charging-speed class. Band boundaries are half-open at 22, 50 and
/// 150 kW; an unknown or non-positive rating lands in `Slow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PowerBand {
    Slow,
    Fast,
    Rapid,
    UltraFast,
}

impl PowerBand {
    pub fn label(self) -> &'static str {
        match self {
            PowerBand::Slow => "Slow (< 22 kW)",
            PowerBand::Fast => "Fast (22-50 kW)",
            PowerBand::Rapid => "Rapid (50-150 kW)",
            PowerBand::UltraFast => "Ultra-Fast (>= 150 kW)",
        }
    }
}

impl fmt::Display for PowerBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct QuarterlyInstallRow {
    #[serde(rename = "Quarter")]
    #[tabled(rename = "Quarter")]
    pub quarter: String,
    #[serde(rename = "Installed")]
    #[tabled(rename = "Installed")]
    pub installed: usize,
    #[serde(rename = "Slow")]
    #[tabled(rename = "Slow")]
    pub slow: usize,
    #[serde(rename = "Fast")]
    #[tabled(rename = "Fast")]
    pub fast: usize,
    #[serde(rename = "Rapid")]
    #[tabled(rename = "Rapid")]
    pub rapid: usize,
    #[serde(rename = "UltraFast")]
    #[tabled(rename = "UltraFast")]
    pub ultra_fast: usize,
    #[serde(rename = "CumulativeTotal")]
    #[tabled(rename = "CumulativeTotal")]
    pub cumulative_total: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MarketShareRow {
    #[serde(rename = "Operator")]
    #[tabled(rename = "Operator")]
    pub operator: String,
    #[serde(rename = "Stations")]
    #[tabled(rename = "Stations")]
    pub stations: usize,
    #[serde(rename = "SharePct")]
    #[tabled(rename = "SharePct")]
    pub share_pct: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DepartmentCountRow {
    #[serde(rename = "Department")]
    #[tabled(rename = "Department")]
    pub department: String,
    #[serde(rename = "Stations")]
    #[tabled(rename = "Stations")]
    pub stations: usize,
    #[serde(rename = "ChargePoints")]
    #[tabled(rename = "ChargePoints")]
    pub charge_points: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DepartmentOperatorRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Operator")]
    #[tabled(rename = "Operator")]
    pub operator: String,
    #[serde(rename = "Stations")]
    #[tabled(rename = "Stations")]
    pub stations: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct OperatorComparisonRow {
    #[serde(rename = "Operator")]
    #[tabled(rename = "Operator")]
    pub operator: String,
    #[serde(rename = "Stations")]
    #[tabled(rename = "Stations")]
    pub stations: usize,
    #[serde(rename = "ChargePoints")]
    #[tabled(rename = "ChargePoints")]
    pub charge_points: String,
    #[serde(rename = "AvgPowerKw")]
    #[tabled(rename = "AvgPowerKw")]
    pub avg_power_kw: String,
    #[serde(rename = "MedianPowerKw")]
    #[tabled(rename = "MedianPowerKw")]
    pub median_power_kw: String,
    #[serde(rename = "Slow")]
    #[tabled(rename = "Slow")]
    pub slow: usize,
    #[serde(rename = "Fast")]
    #[tabled(rename = "Fast")]
    pub fast: usize,
    #[serde(rename = "Rapid")]
    #[tabled(rename = "Rapid")]
    pub rapid: usize,
    #[serde(rename = "UltraFast")]
    #[tabled(rename = "UltraFast")]
    pub ultra_fast: usize,
}

/// Top-line figures for the whole enriched network, exported as JSON.
#[derive(Debug, Serialize)]
pub struct NetworkSummary {
    pub stations: usize,
    pub charge_points: u64,
    pub avg_power_kw: f64,
    pub operators: usize,
    pub departments: usize,
}
