pub mod dates;
pub mod filters;
pub mod query;
pub mod zones;

pub use filters::{FilterSet, PriceRange, SortOrder};
pub use query::{Page, PropertyQuery};
