//! Point loader
//!
//! Reads the scattered sample table: one row per model node with an
//! (x, y) position plus depth and velocity. Column headers are
//! configurable via [`FieldNames`]. No coordinate transformation is
//! performed; positions are taken to be in the boundary's spatial
//! reference already.

use crate::config::FieldNames;
use sedra_core::{Error, Result};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// One scattered measurement: depth and velocity at an (x, y) site
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    pub depth: f64,
    pub velocity: f64,
}

fn malformed(source_name: &str, reason: impl Into<String>) -> Error {
    Error::MalformedInput {
        source_name: source_name.to_string(),
        reason: reason.into(),
    }
}

/// Load samples from a CSV file
pub fn load_samples_from_path<P: AsRef<Path>>(
    path: P,
    fields: &FieldNames,
) -> Result<Vec<Sample>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    load_samples(file, &path.to_string_lossy(), fields)
}

/// Load samples from any CSV reader.
///
/// `source_name` is used in error messages only. Fails with
/// [`Error::MalformedInput`] when a required column is missing, a value
/// fails to parse as a number, or two rows share the same (x, y) site
/// (duplicate sites would make the triangulation nondeterministic, so
/// they are rejected outright).
pub fn load_samples<R: Read>(
    reader: R,
    source_name: &str,
    fields: &FieldNames,
) -> Result<Vec<Sample>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| malformed(source_name, format!("cannot read header row: {}", e)))?
        .clone();

    let column = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| malformed(source_name, format!("missing required column '{}'", name)))
    };

    let x_col = column(&fields.x)?;
    let y_col = column(&fields.y)?;
    let depth_col = column(&fields.depth)?;
    let velocity_col = column(&fields.velocity)?;

    let mut samples = Vec::new();
    let mut seen_sites: HashSet<(u64, u64)> = HashSet::new();

    for (index, record) in csv_reader.records().enumerate() {
        // Header is line 1
        let line = index + 2;
        let record =
            record.map_err(|e| malformed(source_name, format!("line {}: {}", line, e)))?;

        // The model export pads rows with trailing empty fields; a row
        // that is entirely empty is skipped rather than rejected.
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }

        let parse = |col: usize, name: &str| -> Result<f64> {
            let raw = record.get(col).ok_or_else(|| {
                malformed(source_name, format!("line {}: missing '{}' value", line, name))
            })?;
            let value: f64 = raw.parse().map_err(|_| {
                malformed(
                    source_name,
                    format!("line {}: '{}' value '{}' is not numeric", line, name, raw),
                )
            })?;
            if !value.is_finite() {
                return Err(malformed(
                    source_name,
                    format!("line {}: '{}' value '{}' is not finite", line, name, raw),
                ));
            }
            Ok(value)
        };

        let sample = Sample {
            x: parse(x_col, &fields.x)?,
            y: parse(y_col, &fields.y)?,
            depth: parse(depth_col, &fields.depth)?,
            velocity: parse(velocity_col, &fields.velocity)?,
        };

        if !seen_sites.insert((sample.x.to_bits(), sample.y.to_bits())) {
            return Err(malformed(
                source_name,
                format!(
                    "line {}: duplicate sample site ({}, {})",
                    line, sample.x, sample.y
                ),
            ));
        }

        samples.push(sample);
    }

    if samples.is_empty() {
        return Err(malformed(source_name, "no sample rows"));
    }

    debug!(count = samples.len(), "loaded samples");
    Ok(samples)
}
