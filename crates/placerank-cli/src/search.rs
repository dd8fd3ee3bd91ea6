//! `search` and `rank` command handlers.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;

use placerank_core::{AppConfig, LocationInput, PlaceRecord, RankingResponse, SearchEnvelope};
use placerank_pipeline::{build_live_pipeline, SearchRequest};

#[derive(Debug)]
pub(crate) struct SearchArgs {
    pub query: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: Option<String>,
    pub rank: bool,
    pub json: bool,
}

/// # Errors
///
/// Returns an error if the pipeline cannot be built, the request is invalid,
/// the directory search fails, or ranking fails.
pub(crate) async fn run_search(config: &AppConfig, args: SearchArgs) -> anyhow::Result<()> {
    let pipeline = build_live_pipeline(config)?;
    let request = SearchRequest::new(
        args.query,
        LocationInput {
            latitude: Some(args.latitude),
            longitude: Some(args.longitude),
            timezone: args.timezone,
            captured_at: Some(chrono::Utc::now().to_rfc3339()),
            accuracy_m: None,
        },
    );

    if !args.rank {
        let search = pipeline.search(&request).await?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&search)?);
        } else {
            print!("{}", format_search(&search));
        }
        return Ok(());
    }

    let ranked = pipeline.search_and_rank(&request).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&ranked.ranking.response)?);
    } else {
        print!("{}", format_search(&ranked.search));
        print!("{}", format_ranking(&ranked.ranking.response));
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or ranking fails.
pub(crate) async fn run_rank(config: &AppConfig, file: &Path, json: bool) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let envelope: SearchEnvelope = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a search results document", file.display()))?;

    tracing::info!(
        query = %envelope.query,
        candidates = envelope.foursquare.count + envelope.google.count,
        "ranking saved search results"
    );
    let pipeline = build_live_pipeline(config)?;
    let ranking = pipeline.rank(&envelope).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&ranking.response)?);
    } else {
        print!("{}", format_ranking(&ranking.response));
    }
    Ok(())
}

pub(crate) fn format_search(search: &SearchEnvelope) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "\"{}\" near {} ({})",
        search.query,
        search
            .context
            .text_location
            .as_deref()
            .unwrap_or(&search.context.ll),
        search.context.current_time
    );
    for (label, results) in [
        ("Foursquare", &search.foursquare.results),
        ("Google", &search.google.results),
    ] {
        let _ = writeln!(out, "{label}: {} result(s)", results.len());
        for record in results {
            let _ = writeln!(out, "  - {}", describe_record(record));
        }
    }
    out
}

fn describe_record(record: &PlaceRecord) -> String {
    let mut line = record.name.clone().unwrap_or_else(|| "(unnamed)".to_string());
    if let Some(distance) = record.distance_km {
        let _ = write!(line, " [{distance:.2} km]");
    }
    if let Some(rating) = record.rating {
        let _ = write!(line, " {rating:.1}★");
    }
    if let Some(address) = &record.address {
        let _ = write!(line, ", {address}");
    }
    line
}

pub(crate) fn format_ranking(ranking: &RankingResponse) -> String {
    let mut out = String::new();
    let analysis = &ranking.query_analysis;
    if !analysis.interpreted_intent.is_empty() {
        let _ = writeln!(out, "Intent: {}", analysis.interpreted_intent);
    }
    if ranking.ranked_places.is_empty() {
        let _ = writeln!(out, "No places ranked.");
        return out;
    }
    for place in &ranking.ranked_places {
        let distance = place
            .distance
            .map_or_else(|| "?".to_string(), |d| format!("{d:.2}"));
        let _ = writeln!(out, "{:>2}. {} ({distance} km)", place.rank, place.name);
        if !place.location_summary.is_empty() {
            let _ = writeln!(out, "    {}", place.location_summary);
        }
        if !place.review_summary.is_empty() {
            let _ = writeln!(out, "    Reviews: {}", place.review_summary);
        }
    }
    out
}
