pub mod history;
pub mod listing;
pub mod markup;

pub use history::*;
pub use listing::*;
pub use markup::*;
