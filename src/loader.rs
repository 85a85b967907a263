use crate::errors::PipelineError;
use crate::types::RawStationRow;
use csv::ReaderBuilder;
use std::fs;
use std::path::Path;

/// The 17 columns the pipeline consumes. The consolidated export carries many
/// more; extras are dropped at deserialization. A column from this list being
/// entirely absent is a schema error, a column full of empty values is not.
pub const REQUIRED_COLUMNS: [&str; 17] = [
    "nom_operateur",
    "adresse_station",
    "consolidated_longitude",
    "consolidated_latitude",
    "puissance_nominale",
    "prise_type_ef",
    "prise_type_2",
    "prise_type_combo_ccs",
    "prise_type_chademo",
    "prise_type_autre",
    "paiement_acte",
    "paiement_cb",
    "paiement_autre",
    "condition_acces",
    "reservation",
    "date_mise_en_service",
    "nbre_pdc",
];

/// Decode bytes as UTF-8, dropping invalid sequences outright.
///
/// Operators upload the source file themselves and a handful of rows arrive
/// in Latin-1 or worse. Losing those few bytes beats failing the whole load,
/// and dropping (rather than substituting U+FFFD) keeps the affected strings
/// clean for the canonicalization lookup.
fn decode_utf8_ignoring(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}

/// Load the raw snapshot into untrusted rows.
///
/// Returns the rows together with the number of rows the CSV reader could
/// not structurally decode (those are skipped, same as the per-value policy:
/// degrade, count, move on). Fails only for unreadable files or a header
/// missing one of [`REQUIRED_COLUMNS`].
pub fn load_raw(path: &Path) -> Result<(Vec<RawStationRow>, usize), PipelineError> {
    let bytes = fs::read(path).map_err(|e| PipelineError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let content = decode_utf8_ignoring(&bytes);

    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = rdr
        .headers()
        .map_err(|e| PipelineError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?
        .clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h.trim() == column) {
            return Err(PipelineError::MissingColumn { column });
        }
    }

    let mut rows: Vec<RawStationRow> = Vec::new();
    let mut read_errors = 0usize;
    for result in rdr.deserialize::<RawStationRow>() {
        match result {
            Ok(row) => rows.push(row),
            Err(_) => read_errors += 1,
        }
    }
    Ok((rows, read_errors))
}
