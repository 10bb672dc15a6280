//! Error types for loading, filtering and exporting the occupancy data.

/// A required column is missing or a value does not have the expected type.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SchemaError {
    /// The header row does not contain the named column (or any of its aliases).
    #[error("required column \"{0}\" is missing from the header")]
    MissingColumn(String),

    /// A numeric column holds something that cannot be parsed as a number.
    #[error("line {line}: column \"{column}\" expects a number but got \"{value}\"")]
    NotNumeric {
        line: u64,
        column: &'static str,
        value: String,
    },

    /// The month column parsed but is not a calendar month.
    #[error("line {line}: month {value} is outside 1-12")]
    MonthOutOfRange { line: u64, value: i64 },

    /// The city column is blank.
    #[error("line {line}: city is empty")]
    EmptyCity { line: u64 },
}

/// The dataset could not be loaded. Always fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The source file is missing or cannot be opened.
    #[error("could not read \"{path}\": {source}")]
    Unreadable {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// The file opened but is not well-formed CSV (e.g. ragged rows).
    #[error("malformed CSV: {source}")]
    Malformed {
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Invalid filter criteria supplied by the user.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FilterError {
    #[error("invalid month range {start}-{end}: months must satisfy 1 <= start <= end <= 12")]
    InvalidMonthRange { start: u8, end: u8 },
}

/// Writing report files failed.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("could not write file: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("could not serialize as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The palette file could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read palette file \"{path}\": {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("palette file \"{path}\" is not a JSON object of city to color: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
