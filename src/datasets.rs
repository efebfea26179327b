//! Training datasets.
//!
//! Iris ships inside the binary. California housing is read from a local CSV
//! export whose header names the columns.

use crate::feature_extractor::HOUSING_FEATURES;
use anyhow::{bail, Context, Result};
use linfa::Dataset;
use ndarray::{Array1, Array2, Ix1};
use std::fs;
use std::path::Path;
use tracing::info;

/// Target column of the housing export
pub const HOUSING_TARGET: &str = "MedHouseVal";

/// The 150 sample iris dataset, targets 0 (setosa) to 2 (virginica)
pub fn iris() -> Dataset<f64, usize, Ix1> {
    linfa_datasets::iris()
}

/// Load the California housing CSV export
pub fn load_housing_csv<P: AsRef<Path>>(path: P) -> Result<Dataset<f64, f64, Ix1>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read housing dataset {}", path.display()))?;

    let (records, targets) = parse_housing_csv(&text)
        .with_context(|| format!("Malformed housing dataset {}", path.display()))?;

    info!(
        path = %path.display(),
        samples = records.nrows(),
        "Housing dataset loaded"
    );

    Ok(Dataset::new(records, targets))
}

/// Parse CSV text into feature records (in [`HOUSING_FEATURES`] order) and targets.
///
/// Columns are located by header name; extra columns are ignored and empty
/// cells become NaN. Surrounding double quotes are stripped from every cell,
/// but quoted cells may not contain commas.
pub fn parse_housing_csv(text: &str) -> Result<(Array2<f64>, Array1<f64>)> {
    let mut lines = text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());

    let header: Vec<&str> = match lines.next() {
        Some((_, line)) => line.split(',').map(unquote).collect(),
        None => bail!("dataset is empty"),
    };

    let column = |name: &str| -> Result<usize> {
        header
            .iter()
            .position(|h| *h == name)
            .with_context(|| format!("missing column {}", name))
    };
    let feature_columns: Vec<usize> = HOUSING_FEATURES
        .iter()
        .map(|name| column(name))
        .collect::<Result<_>>()?;
    let target_column = column(HOUSING_TARGET)?;

    let mut values = Vec::new();
    let mut targets = Vec::new();

    for (index, line) in lines {
        let cells: Vec<&str> = line.split(',').map(unquote).collect();
        if cells.len() != header.len() {
            bail!(
                "line {}: expected {} cells, found {}",
                index + 1,
                header.len(),
                cells.len()
            );
        }

        let cell = |col: usize| -> Result<f64> {
            let raw = cells[col];
            if raw.is_empty() {
                return Ok(f64::NAN);
            }
            raw.parse::<f64>().with_context(|| {
                format!(
                    "line {}: column {} is not a number: {:?}",
                    index + 1,
                    header[col],
                    raw
                )
            })
        };

        for &col in &feature_columns {
            values.push(cell(col)?);
        }
        targets.push(cell(target_column)?);
    }

    if targets.is_empty() {
        bail!("dataset has a header but no rows");
    }

    let records = Array2::from_shape_vec((targets.len(), HOUSING_FEATURES.len()), values)
        .context("inconsistent record shape")?;
    Ok((records, Array1::from(targets)))
}

fn unquote(cell: &str) -> &str {
    cell.trim().trim_matches('"').trim()
}
