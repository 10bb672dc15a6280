use crate::filters::{self, FilterCriteria, FilteredView};
use crate::types::{
    CityLocation, CityRevenue, Dataset, HeatCell, KpiSummary, MonthlyRates, MonthlyRevenue,
};
use crate::util::{mean_defined, ratio, ratio_or_zero};
use std::collections::BTreeMap;

pub fn kpi_summary(view: &FilteredView) -> KpiSummary {
    let (offered, occupied, revenue) = view.iter().fold((0.0, 0.0, 0.0), |(o, c, r), rec| {
        (
            o + rec.observation.capacity_offered,
            c + rec.observation.capacity_occupied,
            r + rec.observation.revenue,
        )
    });
    KpiSummary {
        capacity_offered_total: offered,
        capacity_occupied_total: occupied,
        // Summary ratios fall back to 0, unlike the per-row ratios.
        avg_occupancy_rate: ratio_or_zero(occupied, offered),
        revenue_total: revenue,
        avg_revenue_per_occupied_unit: ratio_or_zero(revenue, occupied),
    }
}

/// Per-row occupancy rates grouped by (city, month), for the grouped bar chart.
pub fn monthly_occupancy_by_city(view: &FilteredView) -> Vec<MonthlyRates> {
    let mut map: BTreeMap<(&str, u8), Vec<Option<f64>>> = BTreeMap::new();
    for r in view.iter() {
        map.entry((r.observation.city.as_str(), r.observation.month))
            .or_default()
            .push(r.metrics.occupancy_rate);
    }
    map.into_iter()
        .map(|((city, month), occupancy_rates)| MonthlyRates {
            city: city.to_string(),
            month,
            occupancy_rates,
        })
        .collect()
}

/// Total revenue per (city, month), for the trend line.
pub fn monthly_revenue_by_city(view: &FilteredView) -> Vec<MonthlyRevenue> {
    let mut map: BTreeMap<(&str, u8), f64> = BTreeMap::new();
    for r in view.iter() {
        *map.entry((r.observation.city.as_str(), r.observation.month))
            .or_default() += r.observation.revenue;
    }
    map.into_iter()
        .map(|((city, month), revenue)| MonthlyRevenue {
            city: city.to_string(),
            month,
            revenue,
        })
        .collect()
}

/// One point per city for the map. Coordinates come from the first row of
/// the city; the occupancy rate is recomputed from the summed capacities.
pub fn geographic_summary(view: &FilteredView) -> Vec<CityLocation> {
    let mut map: BTreeMap<&str, CityLocation> = BTreeMap::new();
    for r in view.iter() {
        let obs = &r.observation;
        let e = map.entry(obs.city.as_str()).or_insert_with(|| CityLocation {
            city: obs.city.clone(),
            latitude: obs.latitude,
            longitude: obs.longitude,
            capacity_offered: 0.0,
            capacity_occupied: 0.0,
            revenue: 0.0,
            occupancy_rate: None,
        });
        e.capacity_offered += obs.capacity_offered;
        e.capacity_occupied += obs.capacity_occupied;
        e.revenue += obs.revenue;
    }
    map.into_values()
        .map(|mut loc| {
            loc.occupancy_rate = ratio(loc.capacity_occupied, loc.capacity_offered);
            loc
        })
        .collect()
}

/// Mean REVPAR per (city, month), padded so every city in the view has all
/// twelve months. Months with no rows, or whose REVPAR is undefined in every
/// row, are filled with 0. Months outside the active month filter are still
/// present.
pub fn revpar_heat_grid(view: &FilteredView) -> Vec<HeatCell> {
    let mut map: BTreeMap<&str, [Vec<Option<f64>>; 12]> = BTreeMap::new();
    for r in view.iter() {
        let month = r.observation.month;
        if !(1..=12).contains(&month) {
            continue;
        }
        map.entry(r.observation.city.as_str())
            .or_default()[usize::from(month - 1)]
            .push(r.metrics.revpar);
    }
    map.into_iter()
        .flat_map(|(city, months)| {
            months.into_iter().zip(1u8..).map(move |(values, month)| HeatCell {
                city: city.to_string(),
                month,
                revpar: mean_defined(values).unwrap_or(0.0),
            })
        })
        .collect()
}

/// Revenue per city and its share of the filtered total, for the donut.
pub fn revenue_by_city(view: &FilteredView) -> Vec<CityRevenue> {
    let mut map: BTreeMap<&str, f64> = BTreeMap::new();
    for r in view.iter() {
        *map.entry(r.observation.city.as_str()).or_default() += r.observation.revenue;
    }
    let total: f64 = map.values().sum();
    map.into_iter()
        .map(|(city, revenue)| CityRevenue {
            city: city.to_string(),
            revenue,
            share_pct: ratio_or_zero(revenue, total) * 100.0,
        })
        .collect()
}

/// Everything one render pass needs, computed from a single filter selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard<'a> {
    pub criteria: FilterCriteria,
    pub view: FilteredView<'a>,
    pub kpis: KpiSummary,
    pub monthly_rates: Vec<MonthlyRates>,
    pub monthly_revenue: Vec<MonthlyRevenue>,
    pub locations: Vec<CityLocation>,
    pub heat_grid: Vec<HeatCell>,
    pub revenue_shares: Vec<CityRevenue>,
}

impl<'a> Dashboard<'a> {
    /// Filter the dataset and compute every aggregate from that one view.
    pub fn build(dataset: &'a Dataset, criteria: &FilterCriteria) -> Self {
        let view = filters::apply(dataset, criteria);
        let dashboard = Dashboard {
            criteria: criteria.clone(),
            kpis: kpi_summary(&view),
            monthly_rates: monthly_occupancy_by_city(&view),
            monthly_revenue: monthly_revenue_by_city(&view),
            locations: geographic_summary(&view),
            heat_grid: revpar_heat_grid(&view),
            revenue_shares: revenue_by_city(&view),
            view,
        };
        tracing::debug!(
            "built dashboard for {} rows across {} cities",
            dashboard.view.len(),
            dashboard.locations.len()
        );
        dashboard
    }
}
