pub mod ratings;
pub mod statistics;

pub use ratings::RatingAggregator;
pub use statistics::StatisticsAggregator;
