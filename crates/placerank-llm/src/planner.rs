//! Free-text query to provider-specific search parameters.
//!
//! Each provider gets its own model call. Planning never fails: a transport
//! error or a reply that is not a JSON object falls back to a deterministic
//! plan, and every plan (model or fallback) goes through the same
//! post-processing so the provider invariants always hold.

use serde_json::{Map, Value};

use placerank_core::params::{
    DIRECTORY_RESULT_CAP, LOCAL_NUM_DEFAULT, LOCAL_NUM_MAX, LOCAL_NUM_MIN,
};
use placerank_core::{DirectorySearchParams, LocalSearchParams, UserContext};

use crate::chat::{ChatClient, ChatRequest};

const DIRECTORY_TEMPERATURE: f32 = 0.5;
const DIRECTORY_MAX_TOKENS: u32 = 800;
const LOCAL_TEMPERATURE: f32 = 0.2;
const LOCAL_MAX_TOKENS: u32 = 400;

const FALLBACK_QUERY: &str = "coffee";
const FALLBACK_RADIUS_M: u32 = 5000;
const FALLBACK_SORT: &str = "RELEVANCE";
const DEFAULT_HL: &str = "en";
const DEFAULT_GL: &str = "in";

pub struct QueryPlanner {
    chat: ChatClient,
}

impl QueryPlanner {
    #[must_use]
    pub fn new(chat: ChatClient) -> Self {
        Self { chat }
    }

    /// Directory search parameters for `query`.
    pub async fn plan_directory(&self, query: &str, ctx: &UserContext) -> DirectorySearchParams {
        let system = directory_system_prompt(ctx);
        let reply = self
            .ask(&system, query, DIRECTORY_TEMPERATURE, DIRECTORY_MAX_TOKENS, "directory")
            .await;
        let plan = reply
            .as_deref()
            .and_then(|text| parse_object(text, "directory"))
            .map_or_else(|| directory_fallback(query, ctx), |obj| directory_from_object(&obj));
        finalize_directory(plan, ctx)
    }

    /// Web-local search parameters for `query`.
    pub async fn plan_local(&self, query: &str, ctx: &UserContext) -> LocalSearchParams {
        let system = local_system_prompt(ctx);
        let reply = self
            .ask(&system, query, LOCAL_TEMPERATURE, LOCAL_MAX_TOKENS, "local")
            .await;
        match reply.as_deref().and_then(|text| parse_object(text, "local")) {
            Some(obj) => local_from_object(&obj, query, ctx),
            None => local_fallback(query, ctx),
        }
    }

    async fn ask(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: u32,
        plan: &'static str,
    ) -> Option<String> {
        let request = ChatRequest {
            system,
            user,
            temperature,
            max_tokens,
        };
        match self.chat.complete(&request).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(plan, error = %e, "query planning call failed; using fallback plan");
                None
            }
        }
    }
}

#[must_use]
pub fn directory_system_prompt(ctx: &UserContext) -> String {
    format!(
        r#"Translate the user's place search into Foursquare Places search parameters.

Context:
- user_location_ll: {ll}
- user_timezone: {tz}
- current_time: {now}

Reply with a single JSON object and nothing else. Use null or omit any field you do not need:
{{
  "ll": "lat,lng" | null,
  "near": "city or address" | null,
  "radius": integer metres (1000-100000) | null,
  "query": "free text" | null,
  "categories": "comma-separated numeric category ids" | null,
  "chains": "comma-separated chain ids" | null,
  "open_now": true | false | null,
  "open_at": "DOWTHHMM" | null,
  "min_price": 1-4 | null,
  "max_price": 1-4 | null,
  "sort": "DISTANCE" | "RELEVANCE" | "RATING" | null,
  "limit": integer | null,
  "fields": "comma-separated fields" | null
}}

Rules:
- Use the context ll unless the user names a different place.
- limit must not exceed {cap}."#,
        ll = ctx.ll,
        tz = ctx.timezone,
        now = ctx.current_time,
        cap = DIRECTORY_RESULT_CAP,
    )
}

#[must_use]
pub fn local_system_prompt(ctx: &UserContext) -> String {
    let coordinates = ctx
        .coordinates()
        .map_or_else(|| "unknown".to_string(), |c| format!("{},{}", c.latitude, c.longitude));
    let inferred = ctx.text_location.as_deref().unwrap_or("unknown");
    format!(
        r#"Translate the user's place search into SerpApi Google Local parameters.

Context:
- coordinates: {coordinates}
- inferred_location_text: {inferred}
- user_timezone: {tz}
- current_time_local: {now}

Reply with a single JSON object and nothing else:
{{
  "engine": "google_local",
  "q": "search terms",
  "location": "city or full address" | null,
  "hl": "language code" | null,
  "gl": "country code" | null,
  "num": integer ({min}-{max}) | null
}}

Rules:
- engine is always google_local.
- When the user gives no location and inferred_location_text is not "unknown", use it.
- Defaults: hl="{hl}", gl="{gl}", num={num}."#,
        tz = ctx.timezone,
        now = ctx.current_time,
        min = LOCAL_NUM_MIN,
        max = LOCAL_NUM_MAX,
        hl = DEFAULT_HL,
        gl = DEFAULT_GL,
        num = LOCAL_NUM_DEFAULT,
    )
}

/// The plan used when the model is unavailable or unparsable.
#[must_use]
pub fn directory_fallback(query: &str, ctx: &UserContext) -> DirectorySearchParams {
    DirectorySearchParams {
        ll: Some(ctx.ll.clone()),
        radius: Some(FALLBACK_RADIUS_M),
        query: Some(query_or_default(query)),
        sort: Some(FALLBACK_SORT.to_string()),
        limit: Some(DIRECTORY_RESULT_CAP),
        ..DirectorySearchParams::default()
    }
}

/// The plan used when the model is unavailable or unparsable.
#[must_use]
pub fn local_fallback(query: &str, ctx: &UserContext) -> LocalSearchParams {
    LocalSearchParams {
        engine: LocalSearchParams::ENGINE.to_string(),
        q: query_or_default(query),
        location: ctx.text_location.clone(),
        hl: DEFAULT_HL.to_string(),
        gl: DEFAULT_GL.to_string(),
        num: LOCAL_NUM_DEFAULT,
    }
}

/// Parses a model reply that must be exactly one JSON object.
fn parse_object(text: &str, plan: &'static str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Object(obj)) => Some(obj),
        Ok(other) => {
            tracing::warn!(plan, kind = json_kind(&other), "planner reply is not a JSON object; using fallback plan");
            None
        }
        Err(e) => {
            tracing::warn!(plan, error = %e, "planner reply is not valid JSON; using fallback plan");
            None
        }
    }
}

/// Reads a directory plan out of the model's object.
///
/// `limit` is carried through unclamped here (negative or zero included) and
/// fixed up by [`finalize_directory`].
#[must_use]
pub fn directory_from_object(obj: &Map<String, Value>) -> DirectorySearchParams {
    DirectorySearchParams {
        ll: text_field(obj, "ll"),
        near: text_field(obj, "near"),
        radius: int_field(obj, "radius").and_then(|r| u32::try_from(r).ok()).filter(|r| *r > 0),
        query: text_field(obj, "query"),
        categories: text_field(obj, "categories"),
        chains: text_field(obj, "chains"),
        open_now: bool_field(obj, "open_now"),
        open_at: text_field(obj, "open_at"),
        min_price: price_field(obj, "min_price"),
        max_price: price_field(obj, "max_price"),
        sort: text_field(obj, "sort").map(|s| s.to_ascii_uppercase()),
        limit: int_field(obj, "limit").map(|l| u32::try_from(l).unwrap_or(0)),
        fields: text_field(obj, "fields"),
    }
}

/// Enforces the directory invariants on any plan: `limit` within 1..=5 and
/// at least one of `ll` / `near`.
#[must_use]
pub fn finalize_directory(mut plan: DirectorySearchParams, ctx: &UserContext) -> DirectorySearchParams {
    plan.limit = match plan.limit {
        Some(limit) if (1..=DIRECTORY_RESULT_CAP).contains(&limit) => Some(limit),
        _ => Some(DIRECTORY_RESULT_CAP),
    };
    if plan.ll.is_none() && plan.near.is_none() {
        plan.ll = Some(ctx.ll.clone());
    }
    plan
}

/// Reads a web-local plan out of the model's object and applies defaults.
#[must_use]
pub fn local_from_object(obj: &Map<String, Value>, query: &str, ctx: &UserContext) -> LocalSearchParams {
    let num = match obj.get("num") {
        Some(Value::String(s)) => s.trim().parse::<i64>().unwrap_or(i64::from(LOCAL_NUM_DEFAULT)),
        Some(value) => value_as_i64(value).unwrap_or(0),
        None => 0,
    };
    let num = if num == 0 { i64::from(LOCAL_NUM_DEFAULT) } else { num };
    let num = u32::try_from(num.clamp(i64::from(LOCAL_NUM_MIN), i64::from(LOCAL_NUM_MAX)))
        .unwrap_or(LOCAL_NUM_DEFAULT);

    LocalSearchParams {
        engine: LocalSearchParams::ENGINE.to_string(),
        q: text_field(obj, "q").unwrap_or_else(|| query_or_default(query)),
        location: text_field(obj, "location").or_else(|| ctx.text_location.clone()),
        hl: text_field(obj, "hl").unwrap_or_else(|| DEFAULT_HL.to_string()),
        gl: text_field(obj, "gl").unwrap_or_else(|| DEFAULT_GL.to_string()),
        num,
    }
}

fn query_or_default(query: &str) -> String {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        FALLBACK_QUERY.to_string()
    } else {
        trimmed.to_string()
    }
}

/// A non-empty string; numbers are rendered. `"null"` counts as absent.
fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty() && !s.eq_ignore_ascii_case("null")).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// An integer from a JSON number or a numeric string.
fn int_field(obj: &Map<String, Value>, key: &str) -> Option<i64> {
    match obj.get(key)? {
        Value::String(s) => s.trim().parse::<i64>().ok(),
        other => value_as_i64(other),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn value_as_i64(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite())
            .map(|f| f.round() as i64)
    })
}

fn bool_field(obj: &Map<String, Value>, key: &str) -> Option<bool> {
    match obj.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

fn price_field(obj: &Map<String, Value>, key: &str) -> Option<u8> {
    int_field(obj, key)
        .and_then(|p| u8::try_from(p).ok())
        .filter(|p| (1..=4).contains(p))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
