// Typed cast, null policy and operator canonicalization.
//
// Order matters: defaults are filled at the cast boundary (upper-casing needs
// a non-null string) and canonicalization runs last, on the filled value.
use crate::types::{PowerBand, RawStationRow, StationRecord};
use crate::util::{parse_bool_flag, parse_date_safe, parse_f64_safe, parse_u32_safe};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Sentinel operator for rows that ship no usable name.
pub const UNSPECIFIED_OPERATOR: &str = "Opérateur non spécifié";

/// Fixed many-to-one alias table collapsing legal-entity spellings into one
/// brand token. Keys are the trimmed, upper-cased first pipe segment of the
/// raw name. The table is deliberately a static lookup, not fuzzy matching:
/// it can be audited and extended without touching the transform logic, and
/// unmapped names pass through unchanged. Maintained by hand against the
/// data.gouv.fr consolidated file.
static OPERATOR_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("TOTALENERGIES CHARGING SERVICES", "TOTALENERGIES"),
        ("TOTALENERGIES MARKETING FRANCE", "TOTALENERGIES"),
        ("TOTAL MARKETING FRANCE", "TOTALENERGIES"),
        ("TOTAL CHARGING SERVICES", "TOTALENERGIES"),
        ("TOTAL ÉNERGIE", "TOTALENERGIES"),
        ("ATLANTE FRANCE", "ATLANTE"),
        ("FRESHMILE SAS", "FRESHMILE"),
        ("CENTRE D'EXPLOITATION FRESHMILE", "FRESHMILE"),
        ("BOUYGUES ENERGIES & SERVICES", "BOUYGUES E&S"),
        ("BOUYGUES ENERGIES ET SERVICES", "BOUYGUES E&S"),
        ("BOUYGUES ENERGIES SERVICES", "BOUYGUES E&S"),
        ("CHARGEPOINT", "CHARGEPOINT"),
        ("CHARGE POINT", "CHARGEPOINT"),
        ("CHARGEPOINT AUSTRIA GMBH", "CHARGEPOINT"),
        ("TESLA FRANCE SARL", "TESLA"),
        ("LIDL FRANCE", "LIDL"),
        ("IZIVIA", "IZIVIA"),
        ("MOVIVE_IZIVIA", "IZIVIA"),
        ("ELECTROMAPS", "ELECTROMAPS"),
        ("WAAT - PROUDREED", "WAAT"),
        ("WAAT SAS", "WAAT"),
        ("IONITY", "IONITY"),
        ("SHELL RECHARGE", "SHELL RECHARGE"),
        ("GREENFLUX", "GREENFLUX"),
        ("ALLEGO", "ALLEGO"),
        ("DRIVECO", "DRIVECO"),
        ("VIRTA", "VIRTA"),
        ("EVBOX", "EVBOX"),
        ("SPIE CITYNETWORKS", "SPIE"),
        ("ZUNDER (GRUPO EASYCHARGER S.A)", "ZUNDER"),
        ("ALDI MARCHE COLMAR", "ALDI"),
        ("ALDI MARCHE CESTAS SARL", "ALDI"),
        ("ALDI MARCHE CAVAILLON (ALDI MARCHE)", "ALDI"),
        ("AUTORECHARGE SAS", "AUTORECHARGE"),
        ("EASY CHARGE SERVICES", "EASY CHARGE"),
        ("SAS E-MOTUM", "E-MOTUM"),
        ("EV MAP SAS", "EV MAP"),
        ("BP FRANCE", "BP"),
        ("BP PULSE", "BP"),
        ("ZEPHYRE SAS", "ZEPHYRE"),
        ("NORMATECH LODMI", "NORMATECH"),
        ("MOBILIZE FAST CHARGE NETWORK FRANCE", "MOBILIZE FAST CHARGE"),
        ("SAP LABS FRANCE SAS", "SAP LABS"),
        ("SAP LABS FRANCE", "SAP LABS"),
        ("SYNDICAT DÉPARTEMENTAL ÉNERGIE AUBE (SDEA)", "SDEA"),
        (
            "SYNDICAT MIXTE DÉPARTEMENTAL D'ÉNERGIES DU CALVADOS (SDEC ÉNERGIE)",
            "SDEC ÉNERGIE",
        ),
        (
            "SYNDICAT INTERCOMMUNAL D'ELECTRICITÉ DE CÔTE D'OR (SICECO21)",
            "SICECO21",
        ),
        (
            "SYNDICAT DÉPARTEMENTAL D'ÉNERGIE DE LA HAUTE-GARONNE (SDEHG)",
            "SDEHG",
        ),
        ("SYNDICAT D'ENERGIE ET DES DÉCHETS DE LA MARNE (SDED52)", "SDED52"),
        ("MORBIHAN ÉNERGIES", "MORBIHAN ÉNERGIES"),
        // Placeholder strings some operators use instead of leaving the
        // field empty; fold them into the sentinel.
        ("NAN", "OPÉRATEUR NON SPÉCIFIÉ"),
        ("NON CONCERNÉ", "OPÉRATEUR NON SPÉCIFIÉ"),
        ("PAS DITINERANCE", "OPÉRATEUR NON SPÉCIFIÉ"),
    ])
});

/// Aggregate counts of silent degradations, in the spirit of a load report:
/// nothing here is an error, but consumers may want the numbers.
#[derive(Debug, Clone, Default)]
pub struct PrepReport {
    /// All data rows in the snapshot, including structurally unreadable ones.
    pub total_rows: usize,
    /// Rows the CSV reader could not decode at all.
    pub read_errors: usize,
    /// Rows whose power rating was present but unparseable (nulled).
    pub unparsed_power: usize,
    /// Rows without a usable commissioning date.
    pub missing_dates: usize,
    /// Rows with a complete coordinate pair, before the spatial join.
    pub with_coords: usize,
}

/// Null-default policy for the operator field. Blank strings count as null:
/// the upstream export writes both.
fn fill_operator(raw: Option<String>) -> String {
    match raw {
        Some(s) if !s.trim().is_empty() => s,
        _ => UNSPECIFIED_OPERATOR.to_string(),
    }
}

fn clean_optional(raw: Option<String>) -> Option<String> {
    let s = raw?;
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Cast one untrusted row into the typed record.
///
/// Field policies:
/// - dates and numerics null out on parse failure, never raise;
/// - the 8 flag columns are true iff the raw value is in {"true", "1"}
///   (case-insensitive), so an absent flag is already `false` — which is
///   exactly the null-default the payment columns require;
/// - a coordinate pair is only kept whole: one missing half nulls both.
pub fn cast_row(row: RawStationRow) -> StationRecord {
    let mut longitude = parse_f64_safe(row.longitude.as_deref());
    let mut latitude = parse_f64_safe(row.latitude.as_deref());
    if longitude.is_none() || latitude.is_none() {
        longitude = None;
        latitude = None;
    }

    StationRecord {
        operator: fill_operator(row.operator),
        address: clean_optional(row.address),
        longitude,
        latitude,
        power_kw: parse_f64_safe(row.power_kw.as_deref()),
        plug_ef: parse_bool_flag(row.plug_ef.as_deref()),
        plug_type2: parse_bool_flag(row.plug_type2.as_deref()),
        plug_combo_ccs: parse_bool_flag(row.plug_combo_ccs.as_deref()),
        plug_chademo: parse_bool_flag(row.plug_chademo.as_deref()),
        plug_other: parse_bool_flag(row.plug_other.as_deref()),
        payment_act: parse_bool_flag(row.payment_act.as_deref()),
        payment_card: parse_bool_flag(row.payment_card.as_deref()),
        payment_other: parse_bool_flag(row.payment_other.as_deref()),
        access_condition: clean_optional(row.access_condition),
        reservation: clean_optional(row.reservation),
        commissioned: parse_date_safe(row.commissioned.as_deref()),
        charge_points: parse_u32_safe(row.charge_points.as_deref()).unwrap_or(0),
    }
}

/// Collapse a raw operator string to its canonical brand.
///
/// Stations sometimes list several pipe-joined aliases; the first segment is
/// authoritative. The result is trimmed, upper-cased and passed through
/// [`OPERATOR_ALIASES`]; unmapped names survive unchanged, so the output
/// operator set is open-ended. Pure and idempotent.
pub fn canonicalize_operator(raw: &str) -> String {
    let first = raw.split('|').next().unwrap_or(raw).trim();
    let upper = first.to_uppercase();
    match OPERATOR_ALIASES.get(upper.as_str()) {
        Some(brand) => (*brand).to_string(),
        None => upper,
    }
}

/// Run cast → defaults → canonicalization over the whole snapshot.
pub fn prepare(rows: Vec<RawStationRow>, read_errors: usize) -> (Vec<StationRecord>, PrepReport) {
    let mut report = PrepReport {
        total_rows: rows.len() + read_errors,
        read_errors,
        ..Default::default()
    };
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let had_power_value = row
            .power_kw
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty());
        let mut record = cast_row(row);
        if had_power_value && record.power_kw.is_none() {
            report.unparsed_power += 1;
        }
        if record.commissioned.is_none() {
            report.missing_dates += 1;
        }
        if record.longitude.is_some() {
            report.with_coords += 1;
        }
        record.operator = canonicalize_operator(&record.operator);
        records.push(record);
    }
    (records, report)
}

/// Classify a nominal power rating into its band. Total: every input,
/// including `None`, zero and negatives, lands in exactly one band.
/// First match wins at the half-open boundaries 22, 50 and 150.
pub fn categorize_power(power_kw: Option<f64>) -> PowerBand {
    match power_kw {
        None => PowerBand::Slow,
        Some(p) if p <= 0.0 => PowerBand::Slow,
        Some(p) if p < 22.0 => PowerBand::Slow,
        Some(p) if p < 50.0 => PowerBand::Fast,
        Some(p) if p < 150.0 => PowerBand::Rapid,
        Some(_) => PowerBand::UltraFast,
    }
}
