//! Per-row derived ratios.
//!
//! Metrics are always computed from the raw counts of an [`Observation`] and
//! never from previously derived values, so deriving again is a no-op.

use crate::types::{Dataset, Metrics, Observation, Record};
use crate::util::ratio;

/// Compute the three ratios for one observation. A zero denominator leaves
/// the ratio undefined rather than producing an error or a zero.
pub fn derive_metrics(obs: &Observation) -> Metrics {
    Metrics {
        occupancy_rate: ratio(obs.capacity_occupied, obs.capacity_offered),
        revenue_per_occupied_unit: ratio(obs.revenue, obs.capacity_occupied),
        revpar: ratio(obs.revenue, obs.capacity_offered),
    }
}

/// Names of the ratios that could not be computed.
pub fn undefined_ratios(metrics: &Metrics) -> Vec<&'static str> {
    [
        ("occupancy_rate", metrics.occupancy_rate),
        ("revenue_per_occupied_unit", metrics.revenue_per_occupied_unit),
        ("revpar", metrics.revpar),
    ]
    .into_iter()
    .filter(|(_, v)| v.is_none())
    .map(|(name, _)| name)
    .collect()
}

/// Attach derived metrics to every observation, preserving order.
pub fn derive_dataset(observations: Vec<Observation>) -> Dataset {
    let records = observations
        .into_iter()
        .map(|observation| {
            let metrics = derive_metrics(&observation);
            let undefined = undefined_ratios(&metrics);
            if !undefined.is_empty() {
                tracing::warn!(
                    "{} month {}: {} undefined (zero denominator)",
                    observation.city,
                    observation.month,
                    undefined.join(", ")
                );
            }
            Record {
                observation,
                metrics,
            }
        })
        .collect();
    Dataset::new(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(city: &str, offered: f64, occupied: f64, revenue: f64) -> Observation {
        Observation {
            city: city.to_string(),
            month: 1,
            capacity_offered: offered,
            capacity_occupied: occupied,
            revenue,
            latitude: 0.0,
            longitude: 0.0,
        }
    }

    #[test]
    fn derives_all_three_ratios() {
        let m = derive_metrics(&obs("Madrid", 200.0, 150.0, 30000.0));

        assert_eq!(m.occupancy_rate, Some(0.75));
        assert_eq!(m.revenue_per_occupied_unit, Some(200.0));
        assert_eq!(m.revpar, Some(150.0));
    }

    #[test]
    fn zero_denominators_are_undefined_not_zero() {
        let m = derive_metrics(&obs("Madrid", 0.0, 0.0, 100.0));

        assert_eq!(m.occupancy_rate, None);
        assert_eq!(m.revenue_per_occupied_unit, None);
        assert_eq!(m.revpar, None);

        let m = derive_metrics(&obs("Madrid", 10.0, 0.0, 0.0));
        assert_eq!(m.occupancy_rate, Some(0.0));
        assert_eq!(m.revenue_per_occupied_unit, None);
        assert_eq!(m.revpar, Some(0.0));
    }

    #[test]
    fn names_every_undefined_ratio() {
        let unoccupied = derive_metrics(&obs("Madrid", 10.0, 0.0, 0.0));
        assert_eq!(undefined_ratios(&unoccupied), ["revenue_per_occupied_unit"]);

        let empty = derive_metrics(&obs("Madrid", 0.0, 0.0, 0.0));
        assert_eq!(
            undefined_ratios(&empty),
            ["occupancy_rate", "revenue_per_occupied_unit", "revpar"]
        );

        let full = derive_metrics(&obs("Madrid", 10.0, 5.0, 50.0));
        assert!(undefined_ratios(&full).is_empty());
    }

    #[test]
    fn deriving_twice_does_not_divide_twice() {
        let once = derive_dataset(vec![
            obs("Madrid", 100.0, 50.0, 5000.0),
            obs("Sevilla", 0.0, 0.0, 0.0),
        ]);
        let twice = derive_dataset(
            once.records()
                .iter()
                .map(|r| r.observation.clone())
                .collect(),
        );

        assert_eq!(once, twice);
        assert_eq!(twice.records()[0].metrics.occupancy_rate, Some(0.5));
    }

    #[test]
    fn preserves_row_order() {
        let dataset = derive_dataset(vec![
            obs("Valencia", 1.0, 1.0, 1.0),
            obs("Barcelona", 1.0, 1.0, 1.0),
        ]);

        let cities: Vec<_> = dataset
            .records()
            .iter()
            .map(|r| r.observation.city.as_str())
            .collect();
        assert_eq!(cities, ["Valencia", "Barcelona"]);
    }
}
