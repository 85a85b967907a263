use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal pipeline failures. Every variant aborts the whole run: the pipeline
/// never produces a partial table.
///
/// Per-value problems (a date that does not parse, a power rating that is not
/// a number, a boolean flag with a junk value) are *not* errors. They degrade
/// to `None`/`false` per field policy and only show up in the aggregate
/// counters of `PrepReport`.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("required column '{column}' is missing from the source header")]
    MissingColumn { column: &'static str },
    #[error("cannot parse department layer {path}: {source}")]
    GeometryParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("department layer {path} contains no polygons")]
    EmptyPolygonLayer { path: PathBuf },
}
