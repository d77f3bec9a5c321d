pub mod cohere;
pub mod traits;
