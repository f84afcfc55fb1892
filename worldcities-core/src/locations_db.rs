use std::collections::HashMap;

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::debug;
use ustr::{Ustr, UstrMap};

use crate::location::Location;
use crate::normalize;

/// Immutable city store plus the indexes derived from it.
///
/// Populate with [`LocationsDb::insert`], then call
/// [`LocationsDb::mk_autocomplete`] once before serving queries.
#[derive(Default)]
pub struct LocationsDb {
    pub all: UstrMap<Location>,
    pub by_lowercase_key: HashMap<String, Vec<Ustr>>,
    pub autocomplete: Vec<String>,
}

impl LocationsDb {
    /// Last write wins for duplicate city names.
    pub fn insert(&mut self, l: Location) -> Option<Location> {
        let old = self.all.insert(l.city, l);
        if let Some(prev) = &old {
            debug!(
                "Duplicate city {}: replacing {} with {}",
                l.city,
                prev.country,
                l.country
            );
        }
        old
    }

    pub fn mk_autocomplete(self) -> Self {
        let mut keys = self.all.keys().copied().collect::<Vec<_>>();
        keys.sort_unstable_by(|a, b| a.as_str().cmp(b.as_str()));
        let mut by_lowercase_key: HashMap<String, Vec<Ustr>> = HashMap::new();
        for key in keys {
            by_lowercase_key
                .entry(normalize(key.as_str()))
                .or_default()
                .push(key);
        }
        let autocomplete = build_autocomplete_options(&self.all);
        LocationsDb {
            all: self.all,
            by_lowercase_key,
            autocomplete,
        }
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    pub fn filter(&self, term: &str) -> Vec<String> {
        filter_options(&self.autocomplete, term)
    }

    /// Maps matched options back to every record whose key equals the
    /// option's city segment, ignoring case.
    pub fn resolve<S: AsRef<str>>(&self, options: &[S]) -> Vec<Location> {
        options
            .iter()
            .flat_map(|option| {
                let city = normalize(city_segment(option.as_ref()));
                self.by_lowercase_key
                    .get(&city)
                    .into_iter()
                    .flatten()
                    .filter_map(move |key| self.all.get(key).copied())
            })
            .collect()
    }

    pub fn autocomplete(&self, term: &str) -> Vec<Location> {
        let options = self.filter(term);
        self.resolve(&options)
    }
}

/// One `"City, Country"` entry per stored location, sorted.
pub fn build_autocomplete_options(all: &UstrMap<Location>) -> Vec<String> {
    let mut options = all
        .values()
        .map(|loc| loc.autocomplete_option())
        .collect::<Vec<_>>();
    options.sort_unstable();
    options
}

/// Lowercased options that start with the lowercased `term`. An empty
/// term matches every option.
pub fn filter_options(options: &[String], term: &str) -> Vec<String> {
    let term = normalize(term);
    options
        .par_iter()
        .map(|option| normalize(option))
        .filter(|option| option.starts_with(&term))
        .collect()
}

fn city_segment(option: &str) -> &str {
    match option.find(',') {
        Some(idx) => &option[..idx],
        None => option,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn loc(city: &str, country: &str, latitude: f64, longitude: f64) -> Location {
        Location {
            city: city.into(),
            country: country.into(),
            latitude,
            longitude,
        }
    }

    fn paris() -> Location {
        loc("Paris", "France", 48.85, 2.35)
    }

    fn london() -> Location {
        loc("London", "UK", 51.50, -0.12)
    }

    fn sample_db() -> LocationsDb {
        let mut db = LocationsDb::default();
        for l in [
            paris(),
            london(),
            loc("Parma", "Italy", 44.80, 10.33),
            loc("Lagos", "Nigeria", 6.45, 3.40),
            loc("Lago", "Italy", 39.17, 16.15),
        ] {
            db.insert(l);
        }
        db.mk_autocomplete()
    }

    #[test]
    fn paris_london_scenario() {
        let mut db = LocationsDb::default();
        db.insert(paris());
        db.insert(london());
        let db = db.mk_autocomplete();

        let matches = db.filter("par");
        assert_eq!(matches, vec!["paris, france".to_string()]);
        assert_eq!(db.resolve(&matches), vec![paris()]);
    }

    #[test]
    fn no_match_is_empty() {
        let db = sample_db();
        let matches = db.filter("zz");
        assert!(matches.is_empty());
        assert!(db.resolve(&matches).is_empty());
        assert!(db.autocomplete("zz").is_empty());
    }

    #[test]
    fn filtered_options_share_the_prefix() {
        let db = sample_db();
        for term in ["", "p", "PAR", "Lag", "lagos, n", "x"] {
            let prefix = normalize(term);
            for option in db.filter(term) {
                assert!(option.starts_with(&prefix), "{} !~ {}", option, term);
            }
        }
    }

    #[test]
    fn empty_term_returns_whole_index() {
        let db = sample_db();
        let all = db.filter("").into_iter().collect::<HashSet<_>>();
        let expected = db
            .autocomplete
            .iter()
            .map(|o| normalize(o))
            .collect::<HashSet<_>>();
        assert_eq!(all, expected);
        assert_eq!(db.autocomplete("").len(), db.len());
    }

    #[test]
    fn resolved_cities_match_option_city() {
        let db = sample_db();
        for term in ["", "la", "par", "london"] {
            let options = db.filter(term);
            let cities = options
                .iter()
                .map(|o| city_segment(o).to_string())
                .collect::<HashSet<_>>();
            for found in db.resolve(&options) {
                assert!(cities.contains(&normalize(found.city.as_str())));
            }
        }
    }

    #[test]
    fn exact_option_round_trips_to_record() {
        let db = sample_db();
        for l in db.all.values() {
            let found = db.autocomplete(&l.autocomplete_option().to_uppercase());
            assert!(found.contains(l), "{} not found", l.city);
        }
    }

    #[test]
    fn resolve_returns_every_case_variant() {
        let mut db = LocationsDb::default();
        db.insert(loc("Springfield", "USA", 39.80, -89.64));
        db.insert(loc("SPRINGFIELD", "Jamaica", 18.0, -77.0));
        let db = db.mk_autocomplete();

        let found = db.resolve(&["springfield, usa"]);
        assert_eq!(found.len(), 2);
        // Two matched options, each resolving to both records.
        assert_eq!(db.autocomplete("spring").len(), 4);
    }

    #[test]
    fn duplicate_city_last_write_wins() {
        let mut db = LocationsDb::default();
        assert!(db.insert(loc("Valencia", "Spain", 39.47, -0.38)).is_none());
        let replaced = db.insert(loc("Valencia", "Venezuela", 10.16, -68.0));
        assert_eq!(replaced.map(|l| l.country.as_str()), Some("Spain"));
        let db = db.mk_autocomplete();
        assert_eq!(db.autocomplete, vec!["Valencia, Venezuela".to_string()]);
    }

    #[test]
    fn index_is_sorted() {
        let db = sample_db();
        let mut sorted = db.autocomplete.clone();
        sorted.sort();
        assert_eq!(db.autocomplete, sorted);
    }

    #[test]
    fn option_without_comma_uses_whole_string() {
        let db = sample_db();
        assert_eq!(db.resolve(&["paris"]), vec![paris()]);
    }
}
