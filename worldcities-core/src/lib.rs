pub use rayon;
pub use ustr;

pub mod loader;
pub mod location;
pub mod locations_db;

/// Lowercasing used for every prefix and key comparison.
pub fn normalize(s: &str) -> String {
    s.to_lowercase()
}
