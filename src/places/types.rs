// src/places/types.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct TextSearchResponse {
    #[serde(default)]
    pub results: Vec<PlaceSummary>,
    #[serde(default)]
    pub status: String,
}

/// One hit from the text search. Only `place_id` matters downstream, the
/// rest is for logging.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceSummary {
    pub place_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub formatted_address: String,
}

#[derive(Debug, Deserialize)]
pub struct DetailsResponse {
    pub result: Option<PlaceDetails>,
    #[serde(default)]
    pub status: String,
}

/// Details payload for one place. Every field is optional in the upstream
/// API; absent fields default so the enrichment row can always be built.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceDetails {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub formatted_address: String,
    pub price_level: Option<i64>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub formatted_phone_number: String,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<i64>,
    pub opening_hours: Option<OpeningHours>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpeningHours {
    #[serde(default)]
    pub weekday_text: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub text: String,
    pub rating: Option<f64>,
}

impl PlaceDetails {
    pub fn opening_hours_joined(&self) -> String {
        self.opening_hours
            .as_ref()
            .map(|h| h.weekday_text.join(", "))
            .unwrap_or_default()
    }

    /// The highest-rated review; ties keep the earliest one the API returned.
    pub fn most_relevant_review(&self) -> Option<&Review> {
        let mut best: Option<&Review> = None;
        for review in &self.reviews {
            let rating = review.rating.unwrap_or(0.0);
            if best.map_or(true, |b| rating > b.rating.unwrap_or(0.0)) {
                best = Some(review);
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(author: &str, rating: Option<f64>) -> Review {
        Review {
            author_name: author.to_string(),
            text: format!("{} says hi", author),
            rating,
        }
    }

    #[test]
    fn highest_rated_review_wins() {
        let details = PlaceDetails {
            reviews: vec![review("a", Some(3.0)), review("b", Some(5.0)), review("c", Some(4.0))],
            ..Default::default()
        };
        assert_eq!(details.most_relevant_review().unwrap().author_name, "b");
    }

    #[test]
    fn rating_ties_keep_the_earliest_review() {
        let details = PlaceDetails {
            reviews: vec![review("first", Some(5.0)), review("second", Some(5.0))],
            ..Default::default()
        };
        assert_eq!(details.most_relevant_review().unwrap().author_name, "first");
    }

    #[test]
    fn unrated_reviews_count_as_zero() {
        let details = PlaceDetails {
            reviews: vec![review("none", None), review("rated", Some(1.0))],
            ..Default::default()
        };
        assert_eq!(details.most_relevant_review().unwrap().author_name, "rated");
    }

    #[test]
    fn no_reviews_means_no_relevant_review() {
        assert!(PlaceDetails::default().most_relevant_review().is_none());
    }

    #[test]
    fn missing_opening_hours_join_to_empty() {
        assert_eq!(PlaceDetails::default().opening_hours_joined(), "");
    }

    #[test]
    fn details_payload_tolerates_missing_fields() {
        let details: PlaceDetails = serde_json::from_str(r#"{"name": "Cafe X"}"#).unwrap();
        assert_eq!(details.name, "Cafe X");
        assert!(details.website.is_empty());
        assert!(details.reviews.is_empty());
        assert!(details.price_level.is_none());
    }
}
