pub mod client;
pub mod types;

pub use client::PlacesClient;
pub use types::{PlaceDetails, PlaceSummary, Review};
