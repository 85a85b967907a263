//! Data-preparation pipeline for the French EV charging-station dashboard.
//!
//! The pipeline turns the raw consolidated IRVE snapshot into an
//! analysis-ready table in five steps:
//!
//! 1. [`loader`] reads the CSV with best-effort UTF-8 decoding and checks
//!    the schema.
//! 2. [`prep`] casts rows to typed records, applies the null-default policy
//!    and canonicalizes operator names against a fixed alias table.
//! 3. [`geo`] spatially joins each located station against the department
//!    polygon layer, dropping anything it cannot place.
//! 4. [`filters`] and [`reports`] derive read-only views and aggregations
//!    for the presentation layer.
//!
//! Fatal conditions (missing file, missing column, empty polygon layer)
//! surface as [`errors::PipelineError`]; individual bad values degrade to
//! nulls and are only visible as aggregate counts in `prep::PrepReport`.

pub mod errors;
pub mod filters;
pub mod geo;
pub mod loader;
pub mod output;
pub mod prep;
pub mod reports;
pub mod types;
pub mod util;
