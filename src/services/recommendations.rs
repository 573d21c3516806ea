use crate::{error::AppResult, models::Title};

/// Generates personalized watch recommendations
///
/// Based on the user's preferred titles and their selected streaming services,
/// recommends titles available on their subscriptions that match their taste.
///
/// Uses collaborative filtering and content-based approaches to find
/// similar titles to the user's preferences.
pub async fn get_recommendations(
    _user_titles: Vec<String>,
    _subscribed_services: Vec<String>,
) -> AppResult<Vec<Title>> {
    // TODO: Implement recommendations
    // 1. Fetch metadata for user's preferred titles
    // 2. Find similar titles using:
    //    - Genre matching
    //    - Director/actor overlap
    //    - Release year proximity
    //    - User ratings correlation
    // 3. Filter to only titles available on subscribed services
    // 4. Rank by relevance score
    // 5. Return top N recommendations

    Ok(vec![])
}
