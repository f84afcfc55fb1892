use std::num::ParseFloatError;

use thiserror::Error;
use ustr::Ustr;

const CITY_COLUMN: usize = 1;
const LATITUDE_COLUMN: usize = 2;
const LONGITUDE_COLUMN: usize = 3;
const COUNTRY_COLUMN: usize = 4;

#[derive(Debug, Error)]
pub enum RowParseError {
    #[error("missing column '{column}'")]
    MissingColumn { column: &'static str },
    #[error("invalid {column} '{value}': {source}")]
    InvalidCoordinate {
        column: &'static str,
        value: String,
        #[source]
        source: ParseFloatError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub city: Ustr,
    pub country: Ustr,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// Builds a location from one data row laid out as
    /// `[_, city, latitude, longitude, country]`.
    pub fn from_row<S: AsRef<str>>(row: &[S]) -> Result<Self, RowParseError> {
        let city = extract_column(row, CITY_COLUMN, "city")?;
        let latitude = parse_coordinate(row, LATITUDE_COLUMN, "latitude")?;
        let longitude = parse_coordinate(row, LONGITUDE_COLUMN, "longitude")?;
        let country = extract_column(row, COUNTRY_COLUMN, "country")?;
        Ok(Self {
            city: city.into(),
            country: country.into(),
            latitude,
            longitude,
        })
    }

    pub fn autocomplete_option(&self) -> String {
        format!("{}, {}", self.city.as_str(), self.country.as_str())
    }
}

fn extract_column<'a, S: AsRef<str>>(
    row: &'a [S],
    idx: usize,
    column: &'static str,
) -> Result<&'a str, RowParseError> {
    row.get(idx)
        .map(|cell| cell.as_ref())
        .ok_or(RowParseError::MissingColumn { column })
}

fn parse_coordinate<S: AsRef<str>>(
    row: &[S],
    idx: usize,
    column: &'static str,
) -> Result<f64, RowParseError> {
    let raw = extract_column(row, idx, column)?;
    raw.trim()
        .parse::<f64>()
        .map_err(|source| RowParseError::InvalidCoordinate {
            column,
            value: raw.to_string(),
            source,
        })
}
