//! Reference dataset loading.
//!
//! Datasets are compiled into the binary and can be replaced by files named
//! in [`DataConfig`]. A dataset that fails to load is logged and left empty;
//! start-up never fails because of reference data.

use crate::config::DataConfig;
use frontline_common::{FrontlineError, LocationRecord, Result, ServiceDirectory, ServiceRecord};
use std::path::Path;
use tracing::{info, warn};

const BUNDLED_SERVICES: &str = include_str!("../data/services.json");
const BUNDLED_LOCATIONS: &str = include_str!("../data/locations.csv");

/// Parse a JSON array of service records.
pub fn parse_services(json: &str) -> Result<Vec<ServiceRecord>> {
    let records: Vec<ServiceRecord> = serde_json::from_str(json)?;
    Ok(records)
}

/// Parse a `city,province,emergency_services` CSV with a header row.
///
/// Only `city` is required. Columns may appear in any order; quoting is
/// not supported.
pub fn parse_locations(csv: &str) -> Result<Vec<LocationRecord>> {
    let mut lines = csv.lines().map(str::trim).filter(|l| !l.is_empty());

    let header: Vec<String> = lines
        .next()
        .ok_or_else(|| FrontlineError::ReferenceData("locations CSV is empty".into()))?
        .split(',')
        .map(|h| h.trim().to_lowercase())
        .collect();

    let column = |name: &str| header.iter().position(|h| h == name);
    let city_col = column("city")
        .ok_or_else(|| FrontlineError::ReferenceData("locations CSV has no 'city' column".into()))?;
    let province_col = column("province");
    let services_col = column("emergency_services");

    let mut records = Vec::new();
    for (row, line) in lines.enumerate() {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let field = |col: Option<usize>| col.and_then(|c| fields.get(c).copied()).unwrap_or("");

        let city = field(Some(city_col));
        if city.is_empty() {
            warn!(row = row + 2, "Skipping location row without a city");
            continue;
        }

        let emergency_services = match field(services_col) {
            "" => 0,
            raw => raw.parse().unwrap_or_else(|_| {
                warn!(row = row + 2, value = %raw, "Invalid emergency_services count, using 0");
                0
            }),
        };

        records.push(LocationRecord {
            city: city.to_string(),
            province: field(province_col).to_string(),
            emergency_services,
        });
    }

    Ok(records)
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| FrontlineError::ReferenceData(format!("failed to read '{}': {}", path.display(), e)))
}

fn load_dataset<T>(
    name: &str,
    path: Option<&Path>,
    bundled: &str,
    parse: impl Fn(&str) -> Result<Vec<T>>,
) -> Vec<T> {
    let loaded = match path {
        Some(path) => read_file(path).and_then(|content| parse(&content)),
        None => parse(bundled),
    };

    match loaded {
        Ok(records) => {
            info!(
                dataset = name,
                source = %path.map(|p| p.display().to_string()).unwrap_or_else(|| "bundled".into()),
                records = records.len(),
                "Loaded reference dataset"
            );
            records
        }
        Err(e) => {
            warn!(dataset = name, error = %e, code = e.code(), "Failed to load reference dataset, continuing without it");
            Vec::new()
        }
    }
}

/// Build the directory from configured paths or the bundled copies.
pub fn load_directory(config: &DataConfig) -> ServiceDirectory {
    let services = load_dataset("services", config.services_path.as_deref(), BUNDLED_SERVICES, parse_services);
    let locations = load_dataset(
        "locations",
        config.locations_path.as_deref(),
        BUNDLED_LOCATIONS,
        parse_locations,
    );
    ServiceDirectory::new(services, locations)
}
