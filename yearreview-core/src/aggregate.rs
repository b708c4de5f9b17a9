//! Source aggregation.
//!
//! Merges per-source records into one [`AggregatedView`]:
//!
//! 1. each record's source name is resolved through the alias map;
//! 2. merged names get palette colors in order of first appearance;
//! 3. events are relabeled and appended to the global timeline;
//! 4. session/message counters go to both the global and per-source totals;
//! 5. model usage is merged field by field;
//! 6. project lists are concatenated verbatim;
//! 7. the longest session across all records is kept;
//! 8. the timeline is sorted (stable) and streaks computed over it.
//!
//! Per-source day counts come from each merged bucket's own dates, so a day
//! active on two sources merged under one alias counts once.

use chrono::{Local, NaiveDate};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::aliases::AliasMap;
use crate::analytics::streaks::calculate_streaks;
use crate::types::{
    total_tokens, AggregatedView, DateRange, LongestSession, SourceRecord, SourceStats,
};

/// Aggregate records relative to the local "today".
pub fn aggregate(records: Vec<SourceRecord>, aliases: &AliasMap) -> AggregatedView {
    aggregate_at(records, aliases, Local::now().date_naive())
}

/// Aggregate records; `today` anchors the current streak.
pub fn aggregate_at(
    records: Vec<SourceRecord>,
    aliases: &AliasMap,
    today: NaiveDate,
) -> AggregatedView {
    let mut view = AggregatedView::default();
    let mut active_days: HashMap<String, BTreeSet<NaiveDate>> = HashMap::new();
    let mut per_source: BTreeMap<String, SourceStats> = BTreeMap::new();

    for record in records {
        let merged = aliases.resolve(&record.source).to_string();

        if view.source_colors.assign(&merged) {
            view.sources.push(merged.clone());
        }

        let stats = per_source.entry(merged.clone()).or_default();
        stats.tokens += record.tokens();
        stats.sessions += record.total_sessions;
        stats.messages += record.total_messages;
        stats.events += record.events.len() as u64;

        let days = active_days.entry(merged.clone()).or_default();
        days.extend(record.events.iter().map(|e| e.date()));

        view.total_sessions += record.total_sessions;
        view.total_messages += record.total_messages;

        view.events.extend(record.events.into_iter().map(|mut event| {
            event.source.clone_from(&merged);
            event
        }));

        for (model, usage) in &record.model_usage {
            view.model_usage.entry(model.clone()).or_default().merge(usage);
        }

        view.projects.extend(record.projects);

        view.longest_session = longer_session(view.longest_session, record.longest_session);
    }

    for (name, stats) in per_source.iter_mut() {
        stats.days = active_days.get(name).map(|d| d.len() as u64).unwrap_or(0);
    }
    view.per_source_stats = per_source;

    view.events.sort_by_key(|e| e.timestamp);
    view.total_tokens = total_tokens(&view.model_usage);
    view.date_range = match (view.events.first(), view.events.last()) {
        (Some(first), Some(last)) => Some(DateRange {
            first: first.timestamp,
            last: last.timestamp,
        }),
        _ => None,
    };
    view.streaks = calculate_streaks(view.events.iter().map(|e| e.timestamp), today);

    tracing::info!(
        sources = view.sources.len(),
        events = view.events.len(),
        total_tokens = view.total_tokens,
        active_days = view.streaks.total_days,
        "Aggregated usage data"
    );

    view
}

/// Keep the strictly longer session; ties keep the earlier one.
fn longer_session(
    current: Option<LongestSession>,
    candidate: Option<LongestSession>,
) -> Option<LongestSession> {
    match (current, candidate) {
        (Some(cur), Some(cand)) if cand.duration_ms > cur.duration_ms => Some(cand),
        (Some(cur), _) => Some(cur),
        (None, cand) => cand,
    }
}
