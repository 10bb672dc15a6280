use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One CSV row before validation. Every field is kept as text so the loader
/// can report exactly which value failed to parse.
///
/// The aliases are the column names of the original Spanish export.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(alias = "Ciudad")]
    pub city: Option<String>,
    #[serde(alias = "Mes")]
    pub month: Option<String>,
    #[serde(alias = "Plazas_oferta")]
    pub capacity_offered: Option<String>,
    #[serde(alias = "Plazas_ocupadas")]
    pub capacity_occupied: Option<String>,
    #[serde(alias = "Ingresos_generados")]
    pub revenue: Option<String>,
    #[serde(alias = "Latitud")]
    pub latitude: Option<String>,
    #[serde(alias = "Longitud")]
    pub longitude: Option<String>,
}

/// A validated row of the dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub city: String,
    pub month: u8,
    pub capacity_offered: f64,
    pub capacity_occupied: f64,
    pub revenue: f64,
    pub latitude: f64,
    pub longitude: f64,
}

/// Per-row ratios. `None` means the denominator was zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub occupancy_rate: Option<f64>,
    pub revenue_per_occupied_unit: Option<f64>,
    pub revpar: Option<f64>,
}

/// An observation together with its derived metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    #[serde(flatten)]
    pub observation: Observation,
    #[serde(flatten)]
    pub metrics: Metrics,
}

/// The full dataset, loaded and derived once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Aggregates. Plain numbers, consumed by the presentation layer.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub struct KpiSummary {
    pub capacity_offered_total: f64,
    pub capacity_occupied_total: f64,
    pub avg_occupancy_rate: f64,
    pub revenue_total: f64,
    pub avg_revenue_per_occupied_unit: f64,
}

/// The occupancy rates of every row sharing a (city, month) key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRates {
    pub city: String,
    pub month: u8,
    pub occupancy_rates: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRevenue {
    pub city: String,
    pub month: u8,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityLocation {
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub capacity_offered: f64,
    pub capacity_occupied: f64,
    pub revenue: f64,
    pub occupancy_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatCell {
    pub city: String,
    pub month: u8,
    pub revpar: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityRevenue {
    pub city: String,
    pub revenue: f64,
    /// Percentage of the filtered revenue, 0-100.
    pub share_pct: f64,
}

// ---------------------------------------------------------------------------
// Display rows. Pre-formatted strings for table previews and CSV export.
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct OccupancyRateRow {
    #[serde(rename = "City")]
    #[tabled(rename = "City")]
    pub city: String,
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: u8,
    #[serde(rename = "OccupancyRate")]
    #[tabled(rename = "OccupancyRate")]
    pub occupancy_rate: String,
    #[serde(rename = "Color")]
    #[tabled(rename = "Color")]
    pub color: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MonthlyRevenueRow {
    #[serde(rename = "City")]
    #[tabled(rename = "City")]
    pub city: String,
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: u8,
    #[serde(rename = "Revenue")]
    #[tabled(rename = "Revenue")]
    pub revenue: String,
    #[serde(rename = "Color")]
    #[tabled(rename = "Color")]
    pub color: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CityLocationRow {
    #[serde(rename = "City")]
    #[tabled(rename = "City")]
    pub city: String,
    #[serde(rename = "Latitude")]
    #[tabled(rename = "Latitude")]
    pub latitude: String,
    #[serde(rename = "Longitude")]
    #[tabled(rename = "Longitude")]
    pub longitude: String,
    #[serde(rename = "CapacityOffered")]
    #[tabled(rename = "CapacityOffered")]
    pub capacity_offered: String,
    #[serde(rename = "CapacityOccupied")]
    #[tabled(rename = "CapacityOccupied")]
    pub capacity_occupied: String,
    #[serde(rename = "Revenue")]
    #[tabled(rename = "Revenue")]
    pub revenue: String,
    #[serde(rename = "OccupancyRate")]
    #[tabled(rename = "OccupancyRate")]
    pub occupancy_rate: String,
    #[serde(rename = "Color")]
    #[tabled(rename = "Color")]
    pub color: String,
}

/// Long format of the heat grid, one row per cell.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct HeatCellRow {
    #[serde(rename = "City")]
    #[tabled(rename = "City")]
    pub city: String,
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: u8,
    #[serde(rename = "REVPAR")]
    #[tabled(rename = "REVPAR")]
    pub revpar: String,
}

/// Pivoted heat grid: one row per city, one column per month.
#[derive(Debug, Tabled, Clone)]
pub struct HeatPivotRow {
    #[tabled(rename = "City")]
    pub city: String,
    #[tabled(rename = "Jan")]
    pub jan: String,
    #[tabled(rename = "Feb")]
    pub feb: String,
    #[tabled(rename = "Mar")]
    pub mar: String,
    #[tabled(rename = "Apr")]
    pub apr: String,
    #[tabled(rename = "May")]
    pub may: String,
    #[tabled(rename = "Jun")]
    pub jun: String,
    #[tabled(rename = "Jul")]
    pub jul: String,
    #[tabled(rename = "Aug")]
    pub aug: String,
    #[tabled(rename = "Sep")]
    pub sep: String,
    #[tabled(rename = "Oct")]
    pub oct: String,
    #[tabled(rename = "Nov")]
    pub nov: String,
    #[tabled(rename = "Dec")]
    pub dec: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RevenueShareRow {
    #[serde(rename = "City")]
    #[tabled(rename = "City")]
    pub city: String,
    #[serde(rename = "Revenue")]
    #[tabled(rename = "Revenue")]
    pub revenue: String,
    #[serde(rename = "Share")]
    #[tabled(rename = "Share")]
    pub share: String,
    #[serde(rename = "Color")]
    #[tabled(rename = "Color")]
    pub color: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DetailRow {
    #[serde(rename = "City")]
    #[tabled(rename = "City")]
    pub city: String,
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: u8,
    #[serde(rename = "CapacityOffered")]
    #[tabled(rename = "CapacityOffered")]
    pub capacity_offered: String,
    #[serde(rename = "CapacityOccupied")]
    #[tabled(rename = "CapacityOccupied")]
    pub capacity_occupied: String,
    #[serde(rename = "Revenue")]
    #[tabled(rename = "Revenue")]
    pub revenue: String,
    #[serde(rename = "Latitude")]
    #[tabled(rename = "Latitude")]
    pub latitude: String,
    #[serde(rename = "Longitude")]
    #[tabled(rename = "Longitude")]
    pub longitude: String,
    #[serde(rename = "OccupancyRate")]
    #[tabled(rename = "OccupancyRate")]
    pub occupancy_rate: String,
    #[serde(rename = "RevenuePerOccupiedUnit")]
    #[tabled(rename = "RevenuePerOccupiedUnit")]
    pub revenue_per_occupied_unit: String,
    #[serde(rename = "REVPAR")]
    #[tabled(rename = "REVPAR")]
    pub revpar: String,
}
