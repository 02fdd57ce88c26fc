//! Search routing module
//!
//! Executes the specialized and general backends, applies the
//! specialized-to-general fallback chain and post-filters link sets.

mod executor;
mod router;

pub use executor::BackendExecutor;
pub use router::{filter_by_year, RouteLimits, RoutedSearch, SearchRouter};
