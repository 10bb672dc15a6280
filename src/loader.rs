use crate::error::{LoadError, SchemaError};
use crate::metrics::derive_dataset;
use crate::types::{Dataset, Observation, RawRow};
use crate::util::{parse_f64, parse_i64};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;
use std::path::Path;

/// Required columns and the alternative header names accepted for each.
const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("city", &["Ciudad"]),
    ("month", &["Mes"]),
    ("capacity_offered", &["Plazas_oferta"]),
    ("capacity_occupied", &["Plazas_ocupadas"]),
    ("revenue", &["Ingresos_generados"]),
    ("latitude", &["Latitud"]),
    ("longitude", &["Longitud"]),
];

#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub cities: usize,
}

/// Load, validate and derive the dataset from a CSV file.
pub fn load_dataset(path: &Path) -> Result<(Dataset, LoadReport), LoadError> {
    let rdr = reader_builder()
        .from_path(path)
        .map_err(|source| LoadError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;
    read_dataset(rdr)
}

/// Headers are trimmed so the required-column check and the row
/// deserializer see the same names.
fn reader_builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder.trim(Trim::Headers);
    builder
}

fn read_dataset<R: Read>(mut rdr: csv::Reader<R>) -> Result<(Dataset, LoadReport), LoadError> {
    let headers = rdr
        .headers()
        .map_err(|source| LoadError::Malformed { source })?
        .clone();
    check_headers(&headers)?;

    let mut observations = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|source| LoadError::Malformed { source })?;
        let line = record.position().map_or(0, |p| p.line());
        let row: RawRow = record
            .deserialize(Some(&headers))
            .map_err(|source| LoadError::Malformed { source })?;
        observations.push(validate_row(row, line)?);
    }

    let dataset = derive_dataset(observations);
    let mut cities: Vec<&str> = dataset
        .records()
        .iter()
        .map(|r| r.observation.city.as_str())
        .collect();
    cities.sort_unstable();
    cities.dedup();
    let report = LoadReport {
        total_rows: dataset.len(),
        cities: cities.len(),
    };
    Ok((dataset, report))
}

fn check_headers(headers: &StringRecord) -> Result<(), SchemaError> {
    for (name, aliases) in REQUIRED_COLUMNS {
        let present = headers
            .iter()
            .any(|h| h.trim() == *name || aliases.contains(&h.trim()));
        if !present {
            return Err(SchemaError::MissingColumn(name.to_string()));
        }
    }
    Ok(())
}

fn validate_row(row: RawRow, line: u64) -> Result<Observation, SchemaError> {
    let number = |value: Option<String>, column: &'static str| {
        parse_f64(value.as_deref()).ok_or_else(|| SchemaError::NotNumeric {
            line,
            column,
            value: value.unwrap_or_default(),
        })
    };

    let city = row.city.as_deref().map(str::trim).unwrap_or_default();
    if city.is_empty() {
        return Err(SchemaError::EmptyCity { line });
    }
    let city = city.to_string();

    let month = parse_i64(row.month.as_deref()).ok_or_else(|| SchemaError::NotNumeric {
        line,
        column: "month",
        value: row.month.clone().unwrap_or_default(),
    })?;
    if !(1..=12).contains(&month) {
        return Err(SchemaError::MonthOutOfRange { line, value: month });
    }

    Ok(Observation {
        city,
        month: month as u8,
        capacity_offered: number(row.capacity_offered, "capacity_offered")?,
        capacity_occupied: number(row.capacity_occupied, "capacity_occupied")?,
        revenue: number(row.revenue, "revenue")?,
        latitude: number(row.latitude, "latitude")?,
        longitude: number(row.longitude, "longitude")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "city,month,capacity_offered,capacity_occupied,revenue,latitude,longitude\n";

    fn load(text: &str) -> Result<(Dataset, LoadReport), LoadError> {
        read_dataset(reader_builder().from_reader(text.as_bytes()))
    }

    #[test]
    fn loads_and_derives_rows() {
        let csv = format!(
            "{HEADER}Madrid,1,100,50,5000,40.4168,-3.7038\n\
             Sevilla,2,200,0,0,37.3891,-5.9845\n"
        );
        let (dataset, report) = load(&csv).unwrap();

        assert_eq!(report, LoadReport { total_rows: 2, cities: 2 });
        let madrid = &dataset.records()[0];
        assert_eq!(madrid.observation.city, "Madrid");
        assert_eq!(madrid.observation.month, 1);
        assert_eq!(madrid.metrics.occupancy_rate, Some(0.5));
        assert_eq!(madrid.metrics.revenue_per_occupied_unit, Some(100.0));
        assert_eq!(madrid.metrics.revpar, Some(50.0));
        assert_eq!(dataset.records()[1].metrics.revenue_per_occupied_unit, None);
    }

    #[test]
    fn accepts_spanish_headers_in_any_order() {
        let csv = "Mes,Ciudad,Plazas_oferta,Plazas_ocupadas,Ingresos_generados,Latitud,Longitud\n\
                   3,Valencia,10,5,100,39.47,-0.37\n";
        let (dataset, _) = load(csv).unwrap();

        assert_eq!(dataset.records()[0].observation.city, "Valencia");
        assert_eq!(dataset.records()[0].observation.month, 3);
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let csv = "city,month,capacity_offered,capacity_occupied,latitude,longitude\n";
        let err = load(csv).unwrap_err();

        assert!(matches!(
            err,
            LoadError::Schema(SchemaError::MissingColumn(ref c)) if c == "revenue"
        ));
    }

    #[test]
    fn non_numeric_value_is_a_schema_error() {
        let csv = format!("{HEADER}Madrid,1,100,lots,5000,40.4,-3.7\n");
        let err = load(&csv).unwrap_err();

        match err {
            LoadError::Schema(e) => assert_eq!(
                e,
                SchemaError::NotNumeric {
                    line: 2,
                    column: "capacity_occupied",
                    value: "lots".to_string()
                }
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn padded_header_names_are_matched() {
        let csv = "city, month, capacity_offered, capacity_occupied, revenue, latitude, longitude\n\
                   Madrid,1,100,50,5000,40.4,-3.7\n";
        let (dataset, _) = load(csv).unwrap();

        assert_eq!(dataset.records()[0].observation.month, 1);
        assert_eq!(dataset.records()[0].metrics.occupancy_rate, Some(0.5));
    }

    #[test]
    fn errors_report_physical_lines_across_multiline_fields() {
        let csv = format!(
            "{HEADER}\"San\nSebastian\",1,100,50,5000,43.3,-1.98\n\
             Madrid,2,100,x,5000,40.4,-3.7\n"
        );
        let err = load(&csv).unwrap_err();

        assert!(matches!(
            err,
            LoadError::Schema(SchemaError::NotNumeric { line: 4, column: "capacity_occupied", .. })
        ));
    }

    #[test]
    fn month_outside_calendar_is_rejected() {
        let csv = format!("{HEADER}Madrid,13,100,50,5000,40.4,-3.7\n");
        let err = load(&csv).unwrap_err();

        assert!(matches!(
            err,
            LoadError::Schema(SchemaError::MonthOutOfRange { line: 2, value: 13 })
        ));
    }

    #[test]
    fn blank_city_is_rejected() {
        let csv = format!("{HEADER} ,1,100,50,5000,40.4,-3.7\n");
        let err = load(&csv).unwrap_err();

        assert!(matches!(
            err,
            LoadError::Schema(SchemaError::EmptyCity { line: 2 })
        ));
    }

    #[test]
    fn missing_file_is_unreadable() {
        let err = load_dataset(Path::new("does/not/exist.csv")).unwrap_err();

        assert!(matches!(err, LoadError::Unreadable { .. }));
    }

    #[test]
    fn header_only_file_is_an_empty_dataset() {
        let (dataset, report) = load(HEADER).unwrap();

        assert!(dataset.is_empty());
        assert_eq!(report.total_rows, 0);
    }

    #[test]
    fn bundled_sample_has_a_full_year_per_city() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/ocupacion_ciudades.csv");
        let (dataset, report) = load_dataset(&path).unwrap();

        assert_eq!(report, LoadReport { total_rows: 48, cities: 4 });
        assert!(dataset
            .records()
            .iter()
            .all(|r| r.observation.capacity_occupied <= r.observation.capacity_offered));
    }
}
