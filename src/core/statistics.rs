//! Location-filtered summaries of the reference dataset.
//!
//! Two entry points share one filtering core but differ in how they match
//! and in what an empty result means:
//!
//! - [`aggregate`] backs prediction enrichment: case-insensitive city then
//!   district, and an empty result is simply `None`.
//! - [`filter_by_location`] backs the direct location query: case-sensitive
//!   province, city and district, and an empty result is `NotFound`.

use crate::domain::model::{round2, LocationFilter, PropertyRecord, StatisticsSnapshot};
use crate::utils::error::{PricingError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchMode {
    IgnoreCase,
    Exact,
}

#[derive(Debug, Clone, Copy)]
enum LocationColumn {
    Province,
    City,
    District,
}

impl LocationColumn {
    fn cell(self, record: &PropertyRecord) -> Option<&str> {
        match self {
            LocationColumn::Province => record.province.as_deref(),
            LocationColumn::City => record.city.as_deref(),
            LocationColumn::District => record.district.as_deref(),
        }
    }
}

fn cell_matches(cell: Option<&str>, wanted: &str, mode: MatchMode) -> bool {
    match (cell, mode) {
        (None, _) => false,
        (Some(cell), MatchMode::Exact) => cell == wanted,
        (Some(cell), MatchMode::IgnoreCase) => cell.to_lowercase() == wanted.to_lowercase(),
    }
}

/// Narrows `rows` to those whose `column` equals `wanted`. A missing
/// criterion leaves the rows untouched.
fn narrow<'a>(
    rows: Vec<&'a PropertyRecord>,
    column: LocationColumn,
    wanted: Option<&str>,
    mode: MatchMode,
) -> Vec<&'a PropertyRecord> {
    match wanted {
        None => rows,
        Some(wanted) => rows
            .into_iter()
            .filter(|r| cell_matches(column.cell(r), wanted, mode))
            .collect(),
    }
}

#[derive(Default)]
struct Column {
    sum: f64,
    n: usize,
    min: Option<f64>,
    max: Option<f64>,
}

impl Column {
    fn from_values(values: impl Iterator<Item = Option<f64>>) -> Self {
        let mut col = Column::default();
        for v in values.flatten().filter(|v| !v.is_nan()) {
            col.sum += v;
            col.n += 1;
            col.min = Some(col.min.map_or(v, |m| m.min(v)));
            col.max = Some(col.max.map_or(v, |m| m.max(v)));
        }
        col
    }

    fn mean(&self) -> Option<f64> {
        (self.n > 0).then(|| self.sum / self.n as f64)
    }
}

/// Computes the snapshot for a non-empty slice of rows. Missing numeric cells
/// are skipped; a column with no values at all yields NaN, or no year.
fn summarize(rows: &[&PropertyRecord], filters: LocationFilter) -> StatisticsSnapshot {
    let price = Column::from_values(rows.iter().map(|r| r.price));
    let area = Column::from_values(rows.iter().map(|r| r.area));
    let room_count = Column::from_values(rows.iter().map(|r| r.rooms));
    let year = Column::from_values(rows.iter().map(|r| r.year));

    StatisticsSnapshot {
        count: rows.len(),
        avg_price: round2(price.mean().unwrap_or(f64::NAN)),
        min_price: round2(price.min.unwrap_or(f64::NAN)),
        max_price: round2(price.max.unwrap_or(f64::NAN)),
        avg_area: round2(area.mean().unwrap_or(f64::NAN)),
        avg_rooms: round2(room_count.mean().unwrap_or(f64::NAN)),
        avg_year: year.mean().map(|y| y.trunc() as i64),
        filters_applied: filters,
    }
}

/// Statistics for comparable properties around a prediction request.
///
/// City is matched first; the district filter only runs when the city filter
/// left something, so it can only ever narrow the result. Returns `Ok(None)`
/// when nothing matches, and an error when the matches carry no construction
/// year to average.
pub fn aggregate(
    records: &[PropertyRecord],
    city: Option<&str>,
    district: Option<&str>,
) -> Result<Option<StatisticsSnapshot>> {
    let filters = LocationFilter::city_district(city, district);

    let mut rows = narrow(
        records.iter().collect(),
        LocationColumn::City,
        filters.city.as_deref(),
        MatchMode::IgnoreCase,
    );
    if !rows.is_empty() {
        rows = narrow(
            rows,
            LocationColumn::District,
            filters.district.as_deref(),
            MatchMode::IgnoreCase,
        );
    }

    if rows.is_empty() {
        tracing::debug!("No reference properties for {:?}", filters);
        return Ok(None);
    }
    let snapshot = summarize(&rows, filters);
    if snapshot.avg_year.is_none() {
        return Err(PricingError::ProcessingError {
            message: "no construction years among matching properties".to_string(),
        });
    }
    Ok(Some(snapshot))
}

/// Statistics for an explicit location query. Matching is exact and an
/// empty result is an error. Rows without a construction year still count;
/// the snapshot then simply has no `avg_year`.
pub fn filter_by_location(
    records: &[PropertyRecord],
    filters: &LocationFilter,
) -> Result<StatisticsSnapshot> {
    let mut rows: Vec<&PropertyRecord> = records.iter().collect();
    for (column, wanted) in [
        (LocationColumn::Province, filters.province.as_deref()),
        (LocationColumn::City, filters.city.as_deref()),
        (LocationColumn::District, filters.district.as_deref()),
    ] {
        rows = narrow(rows, column, wanted, MatchMode::Exact);
    }

    if rows.is_empty() {
        return Err(PricingError::NotFound);
    }
    Ok(summarize(&rows, filters.clone()))
}
