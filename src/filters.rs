//! City and month filtering of the dataset.

use crate::error::FilterError;
use crate::types::{Dataset, Record};
use std::fmt;

/// The selector value meaning "every city".
pub const ALL_CITIES: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CityFilter {
    #[default]
    All,
    Only(String),
}

impl CityFilter {
    /// Parse selector text. `all` (any case) selects every city; anything else
    /// is matched exactly against city names.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.eq_ignore_ascii_case(ALL_CITIES) {
            CityFilter::All
        } else {
            CityFilter::Only(s.to_string())
        }
    }

    fn matches(&self, city: &str) -> bool {
        match self {
            CityFilter::All => true,
            CityFilter::Only(name) => name == city,
        }
    }
}

impl fmt::Display for CityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CityFilter::All => f.write_str(ALL_CITIES),
            CityFilter::Only(name) => f.write_str(name),
        }
    }
}

/// An inclusive range of calendar months.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    start: u8,
    end: u8,
}

impl MonthRange {
    pub const FULL_YEAR: MonthRange = MonthRange { start: 1, end: 12 };

    pub fn new(start: u8, end: u8) -> Result<Self, FilterError> {
        if start < 1 || end > 12 || start > end {
            return Err(FilterError::InvalidMonthRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u8 {
        self.start
    }

    pub fn end(&self) -> u8 {
        self.end
    }

    pub fn contains(&self, month: u8) -> bool {
        self.start <= month && month <= self.end
    }
}

impl Default for MonthRange {
    fn default() -> Self {
        Self::FULL_YEAR
    }
}

impl fmt::Display for MonthRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// The active filter selection. Built fresh for every interaction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    pub city: CityFilter,
    pub months: MonthRange,
}

impl FilterCriteria {
    fn matches(&self, record: &Record) -> bool {
        self.months.contains(record.observation.month) && self.city.matches(&record.observation.city)
    }
}

/// The records of a dataset that satisfy some criteria, in dataset order.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView<'a> {
    records: Vec<&'a Record>,
}

impl<'a> FilteredView<'a> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.records.iter().copied()
    }
}

/// Keep the records matching both the month range and the city filter.
pub fn apply<'a>(dataset: &'a Dataset, criteria: &FilterCriteria) -> FilteredView<'a> {
    let records: Vec<&Record> = dataset
        .records()
        .iter()
        .filter(|r| criteria.matches(r))
        .collect();
    tracing::debug!(
        "filter city={} months={} kept {} of {} rows",
        criteria.city,
        criteria.months,
        records.len(),
        dataset.len()
    );
    FilteredView { records }
}

/// City names for the selector: the `all` sentinel followed by every
/// distinct city in the dataset, sorted.
pub fn available_cities(dataset: &Dataset) -> Vec<String> {
    let mut cities: Vec<String> = dataset
        .records()
        .iter()
        .map(|r| r.observation.city.clone())
        .collect();
    cities.sort();
    cities.dedup();
    std::iter::once(ALL_CITIES.to_string())
        .chain(cities)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::derive_dataset;
    use crate::types::Observation;

    fn dataset() -> Dataset {
        let rows = [
            ("Madrid", 1),
            ("Sevilla", 1),
            ("Madrid", 6),
            ("Valencia", 7),
            ("Madrid", 12),
        ];
        derive_dataset(
            rows.iter()
                .map(|(city, month)| Observation {
                    city: city.to_string(),
                    month: *month,
                    capacity_offered: 100.0,
                    capacity_occupied: 50.0,
                    revenue: 1000.0,
                    latitude: 0.0,
                    longitude: 0.0,
                })
                .collect(),
        )
    }

    fn keys(view: &FilteredView) -> Vec<(String, u8)> {
        view.iter()
            .map(|r| (r.observation.city.clone(), r.observation.month))
            .collect()
    }

    #[test]
    fn identity_filter_keeps_everything_in_order() {
        let data = dataset();
        let view = apply(&data, &FilterCriteria::default());

        let all: Vec<&Record> = data.records().iter().collect();
        assert_eq!(view.iter().collect::<Vec<_>>(), all);
    }

    #[test]
    fn month_range_is_inclusive() {
        let data = dataset();
        let criteria = FilterCriteria {
            city: CityFilter::All,
            months: MonthRange::new(6, 7).unwrap(),
        };
        let view = apply(&data, &criteria);

        assert_eq!(
            keys(&view),
            [("Madrid".to_string(), 6), ("Valencia".to_string(), 7)]
        );
    }

    #[test]
    fn filters_apply_together_and_form_a_subset() {
        let data = dataset();
        let criteria = FilterCriteria {
            city: CityFilter::parse("Madrid"),
            months: MonthRange::new(2, 12).unwrap(),
        };
        let view = apply(&data, &criteria);

        assert_eq!(
            keys(&view),
            [("Madrid".to_string(), 6), ("Madrid".to_string(), 12)]
        );
        assert!(view.len() <= data.len());
        assert!(view
            .iter()
            .all(|r| data.records().iter().any(|d| std::ptr::eq(d, r))));
    }

    #[test]
    fn city_match_is_exact() {
        let data = dataset();
        let criteria = FilterCriteria {
            city: CityFilter::parse("madrid"),
            months: MonthRange::FULL_YEAR,
        };

        assert!(apply(&data, &criteria).is_empty());
    }

    #[test]
    fn empty_result_is_not_an_error() {
        let data = dataset();
        let criteria = FilterCriteria {
            city: CityFilter::All,
            months: MonthRange::new(3, 3).unwrap(),
        };

        assert!(apply(&data, &criteria).is_empty());
    }

    #[test]
    fn rejects_invalid_month_ranges() {
        assert_eq!(
            MonthRange::new(0, 5),
            Err(FilterError::InvalidMonthRange { start: 0, end: 5 })
        );
        assert!(MonthRange::new(5, 13).is_err());
        assert!(MonthRange::new(8, 3).is_err());
        assert!(MonthRange::new(4, 4).is_ok());
    }

    #[test]
    fn parses_the_all_sentinel() {
        assert_eq!(CityFilter::parse("ALL"), CityFilter::All);
        assert_eq!(
            CityFilter::parse(" Sevilla "),
            CityFilter::Only("Sevilla".to_string())
        );
    }

    #[test]
    fn lists_sorted_distinct_cities_after_the_sentinel() {
        assert_eq!(
            available_cities(&dataset()),
            ["all", "Madrid", "Sevilla", "Valencia"]
        );
    }
}
