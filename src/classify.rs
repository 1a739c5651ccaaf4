// src/classify.rs
use tracing::debug;

/// Map a place's type tags to a service category.
///
/// BB1 = full service, BB2 = quick service, BB3 = bar. A place tagged both
/// "restaurant" and "bar" counts as a bar unless fast-food tags pulled it
/// into BB2 first.
pub fn classify_service_type(types: &[String]) -> &'static str {
    let types_lower: Vec<String> = types.iter().map(|t| t.to_lowercase()).collect();
    let has = |tag: &str| types_lower.iter().any(|t| t == tag);

    debug!("Classifying service type for types={:?}", types);

    if has("restaurant") && !has("bar") && !has("fast_food") {
        "BB1"
    } else if has("fast_food") || has("meal_takeaway") || has("meal_delivery") {
        "BB2"
    } else if has("bar") {
        "BB3"
    } else if ["cafe", "bakery", "food", "drink"].iter().any(|tag| has(tag)) {
        // With "restaurant" alongside, treat as full service
        if has("restaurant") {
            "BB1"
        } else {
            "BB2"
        }
    } else {
        "Not a restaurant"
    }
}
