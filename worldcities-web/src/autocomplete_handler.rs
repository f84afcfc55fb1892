use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Extension, Query};
use axum::Json;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use tracing::debug;

use worldcities_core::locations_db::LocationsDb;

use crate::location_json::LocJson;

#[derive(Debug, Deserialize)]
pub struct AutocompleteParams {
    term: Option<String>,
}

/// `options` is always an array, empty when nothing matches.
#[derive(Serialize, JsonSchema)]
pub struct AutocompleteResults {
    options: Vec<LocJson>,
}

pub async fn autocomplete_handler(
    Query(params): Query<AutocompleteParams>,
    Extension(state): Extension<Arc<LocationsDb>>,
) -> Json<AutocompleteResults> {
    let start_time = Instant::now();
    let term = params.term.unwrap_or_default();
    let options: Vec<LocJson> = state
        .autocomplete(&term)
        .iter()
        .map(LocJson::from_location)
        .collect();
    debug!(
        "Autocomplete '{}': {} options in {:.2?}",
        term,
        options.len(),
        start_time.elapsed()
    );
    Json(AutocompleteResults { options })
}

pub async fn autocomplete_schema_handler() -> String {
    let schema = schema_for!(AutocompleteResults);
    serde_json::to_string(&schema).expect("json schema")
}
