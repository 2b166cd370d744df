// Comet Catalog - Loads orbital elements from a delimited table
// Malformed rows are logged and skipped; only an unreadable source is an error

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{VisError, VisResult};
use crate::orbit::OrbitalElements;

// =============================================================================
// RAW ROW
// =============================================================================

/// One record as it appears in the file. Everything stays textual until
/// validation so a bad cell rejects only its own row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CometRow {
    #[serde(rename = "Object_name", default)]
    pub object_name: Option<String>,
    #[serde(default)]
    pub q: Option<String>,
    #[serde(rename = "Q", default)]
    pub big_q: Option<String>,
    #[serde(default)]
    pub e: Option<String>,
    #[serde(rename = "MOID", default)]
    pub moid: Option<String>,
    #[serde(rename = "P", default)]
    pub period: Option<String>,
}

fn parse_field(row: usize, field: &str, value: Option<&String>) -> VisResult<f64> {
    let text = value.map(|s| s.trim()).unwrap_or_default();
    if text.is_empty() {
        return Err(VisError::InvalidRow {
            row,
            reason: format!("missing {}", field),
        });
    }
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(VisError::InvalidRow {
            row,
            reason: format!("{} is not a number: {:?}", field, text),
        }),
    }
}

impl CometRow {
    /// Validate the row into elements usable by the integrator
    pub fn to_elements(&self, row: usize) -> VisResult<OrbitalElements> {
        let q = parse_field(row, "q", self.q.as_ref())?;
        let big_q = parse_field(row, "Q", self.big_q.as_ref())?;
        let e = parse_field(row, "e", self.e.as_ref())?;
        let moid = parse_field(row, "MOID", self.moid.as_ref())?;
        let period = parse_field(row, "P", self.period.as_ref())?;

        let invalid = |reason: String| VisError::InvalidRow { row, reason };

        if !(0.0..1.0).contains(&e) {
            return Err(invalid(format!("eccentricity {} is not elliptical", e)));
        }
        if q <= 0.0 || big_q <= 0.0 {
            return Err(invalid(format!("distances must be positive (q={}, Q={})", q, big_q)));
        }
        if big_q < q {
            return Err(invalid(format!("aphelion {} is inside perihelion {}", big_q, q)));
        }
        if moid < 0.0 {
            return Err(invalid(format!("MOID {} is negative", moid)));
        }
        if period <= 0.0 {
            return Err(invalid(format!("period {} must be positive", period)));
        }

        let name = self
            .object_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Comet #{}", row));

        Ok(OrbitalElements {
            name,
            perihelion: q,
            aphelion: big_q,
            eccentricity: e,
            moid,
            period,
        })
    }
}

// =============================================================================
// CATALOG
// =============================================================================

/// Validated comets in file order
#[derive(Debug, Clone, Default)]
pub struct CometCatalog {
    comets: Vec<OrbitalElements>,
    skipped: usize,
}

impl CometCatalog {
    /// Load from a CSV file with a header row
    pub fn from_path(path: &Path) -> VisResult<Self> {
        tracing::info!("Loading comet catalog from {:?}", path);
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load from any reader yielding CSV with a header row
    pub fn from_reader<R: Read>(rdr: R) -> VisResult<Self> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
        // Surface an unreadable header as a load failure rather than N bad rows
        reader.headers()?;
        Ok(Self::collect(reader))
    }

    fn collect<R: Read>(mut reader: csv::Reader<R>) -> Self {
        let mut comets = Vec::new();
        let mut skipped = 0;

        for (index, result) in reader.deserialize::<CometRow>().enumerate() {
            let row = index + 1;
            let elements = result
                .map_err(VisError::from)
                .and_then(|record| record.to_elements(row));

            match elements {
                Ok(elements) => comets.push(elements),
                Err(err) => {
                    tracing::warn!("Skipping comet row: {}", err);
                    skipped += 1;
                }
            }
        }

        tracing::info!("Loaded {} valid comets ({} skipped)", comets.len(), skipped);
        Self { comets, skipped }
    }

    pub fn from_elements(comets: Vec<OrbitalElements>) -> Self {
        Self { comets, skipped: 0 }
    }

    pub fn len(&self) -> usize {
        self.comets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comets.is_empty()
    }

    /// Rows rejected during loading
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn iter(&self) -> impl Iterator<Item = &OrbitalElements> {
        self.comets.iter()
    }

    pub fn into_elements(self) -> Vec<OrbitalElements> {
        self.comets
    }
}

// =============================================================================
// TESTS
// =============================================================================
