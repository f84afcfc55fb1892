use schemars::JsonSchema;
use serde::Serialize;

use worldcities_core::location::Location;

#[derive(Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct LocJson {
    city: &'static str,
    country: &'static str,
    longitude: f64,
    latitude: f64,
}

impl LocJson {
    pub fn from_location(l: &Location) -> Self {
        Self {
            city: l.city.as_str(),
            country: l.country.as_str(),
            longitude: l.longitude,
            latitude: l.latitude,
        }
    }
}
