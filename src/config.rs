//! Command line options and the city color palette.

use crate::error::ConfigError;
use crate::filters::{CityFilter, FilterCriteria, MonthRange};
use clap::Parser;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Color used for cities without an entry in the palette.
pub const FALLBACK_COLOR: &str = "#7f7f7f";

static DEFAULT_PALETTE: Lazy<CityPalette> = Lazy::new(|| {
    CityPalette::from_pairs([
        ("Madrid", "#1f77b4"),
        ("Barcelona", "#ff7f0e"),
        ("Valencia", "#2ca02c"),
        ("Sevilla", "#d62728"),
    ])
});

/// Interactive hotel occupancy and revenue dashboard for Spanish cities.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// CSV file with one row per city and month.
    #[arg(long, default_value = "data/ocupacion_ciudades.csv")]
    pub data: PathBuf,

    /// Initial city filter, or `all`.
    #[arg(long, default_value = "all")]
    pub city: String,

    /// First month of the initial range (1-12).
    #[arg(long, default_value_t = 1)]
    pub from: u8,

    /// Last month of the initial range (1-12).
    #[arg(long, default_value_t = 12)]
    pub to: u8,

    /// Directory that exported reports are written to.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// JSON object mapping city names to colors, merged over the defaults.
    #[arg(long)]
    pub palette: Option<PathBuf>,

    /// Print the dashboard once and exit instead of showing the menu.
    #[arg(long)]
    pub once: bool,
}

impl Args {
    /// The filter selection requested on the command line.
    pub fn criteria(&self) -> Result<FilterCriteria, crate::error::FilterError> {
        Ok(FilterCriteria {
            city: CityFilter::parse(&self.city),
            months: MonthRange::new(self.from, self.to)?,
        })
    }
}

/// Display color per city, shared by every chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CityPalette {
    colors: BTreeMap<String, String>,
}

impl CityPalette {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            colors: pairs
                .into_iter()
                .map(|(c, col)| (c.to_string(), col.to_string()))
                .collect(),
        }
    }

    /// Load overrides from a JSON file on top of the default palette.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let overrides: BTreeMap<String, String> =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        let mut palette = Self::default();
        palette.colors.extend(overrides);
        Ok(palette)
    }

    pub fn color(&self, city: &str) -> &str {
        self.colors
            .get(city)
            .map(String::as_str)
            .unwrap_or(FALLBACK_COLOR)
    }
}

impl Default for CityPalette {
    fn default() -> Self {
        DEFAULT_PALETTE.clone()
    }
}
