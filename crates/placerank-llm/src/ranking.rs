//! Hands the merged search results to the model and validates what comes back.

use serde_json::Value;

use placerank_core::{RankedPlace, RankingResponse, SearchEnvelope};

use crate::chat::{ChatClient, ChatRequest};
use crate::error::RankingError;

const RANKING_TEMPERATURE: f32 = 0.5;
const RANKING_MAX_TOKENS: u32 = 8000;

pub const RANKING_SYSTEM_PROMPT: &str = r#"You rank candidate places for a location search. Your entire reply is one JSON object.

Input: a JSON document with the user's query, their context (coordinates, timezone, local time, inferred location), and two candidate lists: "foursquare" and "google".

Steps:
1. Work out what the user is looking for from the query and context.
2. Infer what they need (category, proximity, quality) and what they would not want (off-category places, clearly weaker options, places much farther away than a comparable one).
3. Combine both lists. Treat two entries as the same place only when the names clearly match AND the coordinates are close. When merging, keep Google's rating and review count and keep Foursquare's tel and website when present.
4. Score each place: relevance 0.4, proximity 0.3, quality 0.3. Quality combines rating, review count, and the tone of recent_reviews.
5. Never invent a value. Use null when a field is unknown. Never compute a distance yourself.

Scoring notes:
- Relevance: a place whose category or name matches the query beats a loosely related one, unless its reviews clearly show it serves the need.
- Proximity: nearer is usually better, but a much stronger rating or review base can outweigh a small distance gap.
- Quality: a high rating backed by many reviews beats a high rating with few.
Break ties by review count, then category match, then having tel/website, then address clarity.

Summaries:
- review_summary: one or two sentences drawn only from the supplied review snippets and rating, written for this query. With no reviews, write "No review data available."
- location_summary: up to three sentences on what the place is, why it suits the query, and its setting or strengths.

Reply schema:
{
  "query_analysis": {
    "interpreted_intent": "<one sentence>",
    "context_used": "<short summary of the context you used>",
    "needs_inferred": ["..."],
    "not_wanted_inferred": ["..."],
    "ranking_approach": "Relevance-Proximity-Quality weighted ranking with data-driven tie-breakers"
  },
  "ranked_places": [
    {
      "rank": <integer starting at 1>,
      "place_id": "<id>",
      "google_place_id": "<google_place_id or null>",
      "latitude": <number>,
      "longitude": <number>,
      "distance": <number or null>,
      "name": "<string>",
      "address": "<string or null>",
      "tel": "<string or null>",
      "website": "<string or null>",
      "rating": <number or null>,
      "review_count": <number or null>,
      "review_summary": "<string>",
      "location_summary": "<string>"
    }
  ]
}

Constraints:
- Output only the JSON object: no markdown, no code fences, no commentary. The first character is { and the last is }.
- Ranks are 1, 2, 3, ... with no gaps or repeats.
- Include every relevant place. Explain exclusions in not_wanted_inferred.
- Copy distance_km from the input into distance unchanged.
- Keep google_place_id from the input when present, otherwise null."#;

/// A validated ranking plus the model's exact reply text.
#[derive(Debug, Clone)]
pub struct RankingOutcome {
    pub response: RankingResponse,
    pub raw_response: String,
}

pub struct RankingGateway {
    chat: ChatClient,
}

impl RankingGateway {
    #[must_use]
    pub fn new(chat: ChatClient) -> Self {
        Self { chat }
    }

    /// Ranks the merged search results with one model call.
    ///
    /// # Errors
    ///
    /// - [`RankingError::Llm`] if the call itself fails.
    /// - [`RankingError::InvalidJson`] if the reply is not JSON.
    /// - [`RankingError::SchemaViolation`] if the reply is JSON but not a
    ///   valid ranking (wrong shape, or ranks not `1..=n`).
    pub async fn rank(&self, envelope: &SearchEnvelope) -> Result<RankingOutcome, RankingError> {
        let user = serde_json::to_string(envelope).map_err(RankingError::Encode)?;
        let request = ChatRequest {
            system: RANKING_SYSTEM_PROMPT,
            user: &user,
            temperature: RANKING_TEMPERATURE,
            max_tokens: RANKING_MAX_TOKENS,
        };

        let candidates = envelope.foursquare.count + envelope.google.count;
        tracing::info!(candidates, model = self.chat.model(), "ranking candidates");

        let raw_response = self.chat.complete(&request).await?;
        let response = parse_ranking(&raw_response, envelope)?;
        tracing::info!(ranked = response.ranked_places.len(), "ranking complete");
        Ok(RankingOutcome {
            response,
            raw_response,
        })
    }
}

/// Parses and validates a ranking reply against the envelope it ranked.
///
/// On success the places are ordered by rank and each `distance` is taken
/// from the input record it names, when that record can be found.
///
/// # Errors
///
/// [`RankingError::InvalidJson`] or [`RankingError::SchemaViolation`], both
/// carrying `raw`.
pub fn parse_ranking(raw: &str, envelope: &SearchEnvelope) -> Result<RankingResponse, RankingError> {
    let value: Value = serde_json::from_str(raw.trim()).map_err(|e| RankingError::InvalidJson {
        message: e.to_string(),
        raw_response: raw.to_string(),
    })?;

    let violation = |reason: String| RankingError::SchemaViolation {
        reason,
        raw_response: raw.to_string(),
    };

    if !value.is_object() {
        return Err(violation("top-level value is not an object".to_string()));
    }
    if !value.get("ranked_places").is_some_and(Value::is_array) {
        return Err(violation("`ranked_places` is missing or not an array".to_string()));
    }

    let mut response: RankingResponse =
        serde_json::from_value(value).map_err(|e| violation(e.to_string()))?;
    check_ranks(&mut response.ranked_places).map_err(violation)?;
    restore_distances(&mut response.ranked_places, envelope);
    Ok(response)
}

/// Sorts by rank and requires the ranks to be exactly `1..=n`.
fn check_ranks(places: &mut [RankedPlace]) -> Result<(), String> {
    places.sort_by_key(|p| p.rank);
    for (expected, place) in (1_u32..).zip(places.iter()) {
        if place.rank != expected {
            return Err(format!(
                "ranks must be contiguous from 1; expected {expected}, found {} ({})",
                place.rank, place.name
            ));
        }
    }
    Ok(())
}

fn restore_distances(places: &mut [RankedPlace], envelope: &SearchEnvelope) {
    for place in places {
        if let Some(record) =
            envelope.find_record(place.place_id.as_deref(), place.google_place_id.as_deref())
        {
            if place.distance != record.distance_km {
                tracing::debug!(
                    name = %place.name,
                    model = ?place.distance,
                    input = ?record.distance_km,
                    "restoring input distance"
                );
            }
            place.distance = record.distance_km;
        }
    }
}
