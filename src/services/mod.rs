pub mod aggregator;
pub mod enricher;
pub mod page;
pub mod validation;


pub use aggregator::{AggregateError, Aggregator};
pub use enricher::{GitHubApiClient, MetadataEnricher};
pub use page::{FetchError, RowSource, TrendingPageClient};
pub use validation::{language_metadata, validate_inputs, ValidationError};
