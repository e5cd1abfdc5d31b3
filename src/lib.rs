pub mod aggregator;
pub mod error;
pub mod http_cache;
pub mod http_client;
pub mod leagues;
pub mod merge;
pub mod report;
pub mod resolver;
pub mod season_fetch;
pub mod sources;

pub use aggregator::Aggregator;
pub use error::StatsError;
pub use report::TeamReport;
