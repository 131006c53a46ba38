pub mod listing;
pub mod summary;

pub use listing::*;
pub use summary::*;

/// How presenters render a field that is absent from the page.
pub const NOT_AVAILABLE: &str = "N/A";

/// Render an optional field, substituting [`NOT_AVAILABLE`] when absent.
pub fn display_or_na<T: std::fmt::Display>(value: Option<&T>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => NOT_AVAILABLE.to_string(),
    }
}
