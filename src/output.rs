//! Terminal rendering and file export of a [`Dashboard`].

use crate::config::CityPalette;
use crate::error::ExportError;
use crate::filters::FilteredView;
use crate::reports::Dashboard;
use crate::types::{
    CityLocation, CityLocationRow, CityRevenue, DetailRow, HeatCell, HeatCellRow, HeatPivotRow,
    KpiSummary, MonthlyRates, MonthlyRevenue, MonthlyRevenueRow, OccupancyRateRow, Record,
    RevenueShareRow,
};
use crate::util::{
    format_euros, format_int, format_number, format_optional, format_percent, month_label,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ExportError> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}", table_str);
    if rows.len() > max_rows {
        println!("... {} more rows", format_int(rows.len() - max_rows));
    }
    println!();
}

/// The five headline figures as (label, value) pairs.
pub fn kpi_lines(kpis: &KpiSummary) -> Vec<(&'static str, String)> {
    vec![
        ("Capacity offered", format_number(kpis.capacity_offered_total, 0)),
        ("Capacity occupied", format_number(kpis.capacity_occupied_total, 0)),
        ("Average occupancy rate", format_percent(kpis.avg_occupancy_rate, 2)),
        ("Total revenue", format_euros(kpis.revenue_total, 0)),
        (
            "Revenue per occupied unit",
            format_euros(kpis.avg_revenue_per_occupied_unit, 2),
        ),
    ]
}

/// One row per observation, for the grouped bar chart.
pub fn occupancy_rate_rows(groups: &[MonthlyRates], palette: &CityPalette) -> Vec<OccupancyRateRow> {
    groups
        .iter()
        .flat_map(|g| {
            g.occupancy_rates.iter().map(move |rate| OccupancyRateRow {
                city: g.city.clone(),
                month: g.month,
                occupancy_rate: format_optional(*rate, |v| format_percent(v, 2)),
                color: palette.color(&g.city).to_string(),
            })
        })
        .collect()
}

pub fn monthly_revenue_rows(
    revenue: &[MonthlyRevenue],
    palette: &CityPalette,
) -> Vec<MonthlyRevenueRow> {
    revenue
        .iter()
        .map(|r| MonthlyRevenueRow {
            city: r.city.clone(),
            month: r.month,
            revenue: format_euros(r.revenue, 0),
            color: palette.color(&r.city).to_string(),
        })
        .collect()
}

pub fn location_rows(locations: &[CityLocation], palette: &CityPalette) -> Vec<CityLocationRow> {
    locations
        .iter()
        .map(|l| CityLocationRow {
            city: l.city.clone(),
            latitude: format!("{:.4}", l.latitude),
            longitude: format!("{:.4}", l.longitude),
            capacity_offered: format_number(l.capacity_offered, 0),
            capacity_occupied: format_number(l.capacity_occupied, 0),
            revenue: format_euros(l.revenue, 0),
            occupancy_rate: format_optional(l.occupancy_rate, |v| format_percent(v, 1)),
            color: palette.color(&l.city).to_string(),
        })
        .collect()
}

pub fn heat_cell_rows(grid: &[HeatCell]) -> Vec<HeatCellRow> {
    grid.iter()
        .map(|c| HeatCellRow {
            city: c.city.clone(),
            month: c.month,
            revpar: format_number(c.revpar, 2),
        })
        .collect()
}

/// City rows by month columns. Expects the densified grid.
pub fn heat_pivot_rows(grid: &[HeatCell]) -> Vec<HeatPivotRow> {
    let mut by_city: BTreeMap<&str, [String; 12]> = BTreeMap::new();
    for c in grid {
        if let Some(slot) = by_city
            .entry(c.city.as_str())
            .or_default()
            .get_mut(usize::from(c.month).wrapping_sub(1))
        {
            *slot = format_number(c.revpar, 2);
        }
    }
    by_city
        .into_iter()
        .map(|(city, m)| {
            let [jan, feb, mar, apr, may, jun, jul, aug, sep, oct, nov, dec] = m;
            HeatPivotRow {
                city: city.to_string(),
                jan,
                feb,
                mar,
                apr,
                may,
                jun,
                jul,
                aug,
                sep,
                oct,
                nov,
                dec,
            }
        })
        .collect()
}

pub fn revenue_share_rows(shares: &[CityRevenue], palette: &CityPalette) -> Vec<RevenueShareRow> {
    shares
        .iter()
        .map(|s| RevenueShareRow {
            city: s.city.clone(),
            revenue: format_euros(s.revenue, 0),
            share: format!("{:.1}%", s.share_pct),
            color: palette.color(&s.city).to_string(),
        })
        .collect()
}

pub fn detail_rows(view: &FilteredView) -> Vec<DetailRow> {
    view.iter()
        .map(|r| {
            let o = &r.observation;
            DetailRow {
                city: o.city.clone(),
                month: o.month,
                capacity_offered: format_number(o.capacity_offered, 0),
                capacity_occupied: format_number(o.capacity_occupied, 0),
                revenue: format_euros(o.revenue, 0),
                latitude: format!("{:.4}", o.latitude),
                longitude: format!("{:.4}", o.longitude),
                occupancy_rate: format_optional(r.metrics.occupancy_rate, |v| format_percent(v, 2)),
                revenue_per_occupied_unit: format_optional(r.metrics.revenue_per_occupied_unit, |v| {
                    format_euros(v, 2)
                }),
                revpar: format_optional(r.metrics.revpar, |v| format_euros(v, 2)),
            }
        })
        .collect()
}

/// Print the KPI panel and a preview of every chart table.
pub fn render_dashboard(dashboard: &Dashboard, palette: &CityPalette, max_rows: usize) {
    let c = &dashboard.criteria;
    println!("Hotel Occupancy Dashboard");
    println!(
        "(City: {}, Months: {} to {})\n",
        c.city,
        month_label(c.months.start()),
        month_label(c.months.end())
    );

    println!("Key indicators");
    for (label, value) in kpi_lines(&dashboard.kpis) {
        println!("  {:<28}{}", label, value);
    }
    println!();

    println!("Monthly occupancy rate by city");
    preview_table_rows(&occupancy_rate_rows(&dashboard.monthly_rates, palette), max_rows);

    println!("Monthly revenue by city");
    preview_table_rows(&monthly_revenue_rows(&dashboard.monthly_revenue, palette), max_rows);

    println!("Geographic distribution");
    preview_table_rows(&location_rows(&dashboard.locations, palette), max_rows);

    println!("Average REVPAR by month and city");
    preview_table_rows(&heat_pivot_rows(&dashboard.heat_grid), max_rows);

    println!("Revenue share by city");
    preview_table_rows(&revenue_share_rows(&dashboard.revenue_shares, palette), max_rows);
}

pub fn render_detail(view: &FilteredView) {
    println!("Filtered rows ({})", format_int(view.len()));
    if view.is_empty() {
        println!("No rows match the active filters.\n");
        return;
    }
    preview_table_rows(&detail_rows(view), usize::MAX);
}

#[derive(Serialize)]
struct CriteriaExport {
    city: String,
    month_start: u8,
    month_end: u8,
}

#[derive(Serialize)]
struct DashboardExport<'a> {
    generated_at: DateTime<Utc>,
    criteria: CriteriaExport,
    kpis: &'a KpiSummary,
    monthly_rates: &'a [MonthlyRates],
    monthly_revenue: &'a [MonthlyRevenue],
    locations: &'a [CityLocation],
    heat_grid: &'a [HeatCell],
    revenue_shares: &'a [CityRevenue],
    palette: &'a CityPalette,
    rows: Vec<&'a Record>,
}

/// Write one CSV per chart, the detail table and `dashboard.json` into
/// `out_dir`. Returns the paths written.
pub fn export(
    dashboard: &Dashboard,
    palette: &CityPalette,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, ExportError> {
    std::fs::create_dir_all(out_dir)?;
    let mut written = Vec::new();
    let mut target = |name: &str| {
        let path = out_dir.join(name);
        written.push(path.clone());
        path
    };

    write_csv(
        &target("occupancy_rate_by_month.csv"),
        &occupancy_rate_rows(&dashboard.monthly_rates, palette),
    )?;
    write_csv(
        &target("revenue_by_month.csv"),
        &monthly_revenue_rows(&dashboard.monthly_revenue, palette),
    )?;
    write_csv(
        &target("city_locations.csv"),
        &location_rows(&dashboard.locations, palette),
    )?;
    write_csv(&target("revpar_heatmap.csv"), &heat_cell_rows(&dashboard.heat_grid))?;
    write_csv(
        &target("revenue_share.csv"),
        &revenue_share_rows(&dashboard.revenue_shares, palette),
    )?;
    write_csv(&target("filtered_rows.csv"), &detail_rows(&dashboard.view))?;

    let summary = DashboardExport {
        generated_at: Utc::now(),
        criteria: CriteriaExport {
            city: dashboard.criteria.city.to_string(),
            month_start: dashboard.criteria.months.start(),
            month_end: dashboard.criteria.months.end(),
        },
        kpis: &dashboard.kpis,
        monthly_rates: &dashboard.monthly_rates,
        monthly_revenue: &dashboard.monthly_revenue,
        locations: &dashboard.locations,
        heat_grid: &dashboard.heat_grid,
        revenue_shares: &dashboard.revenue_shares,
        palette,
        rows: dashboard.view.iter().collect(),
    };
    write_json(&target("dashboard.json"), &summary)?;

    tracing::info!("exported {} files to {}", written.len(), out_dir.display());
    Ok(written)
}
