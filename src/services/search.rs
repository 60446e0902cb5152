//! In-memory search and filter pipeline
//!
//! Operates on lists already fetched from the database. Relevance is a
//! handful of arithmetic heuristics, not an index: title hits outweigh
//! content hits, whole words outweigh substrings, favorites and recent
//! entries get a small boost.

use crate::config;
use crate::database::models::{DiaryWithTags, Mood};
use chrono::{Duration, Utc};

/// Sort key for unscored listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    Created,
    #[default]
    Updated,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Criteria applied to a diary list in memory.
#[derive(Debug, Clone, Default)]
pub struct DiaryFilter {
    /// Entry must carry every one of these tag ids
    pub tag_ids: Vec<String>,
    pub category_id: Option<String>,
    pub favorite_only: bool,
    pub mood: Option<Mood>,
    /// Free-text query; when set, results are ordered by relevance
    pub query: Option<String>,
    pub sort: SortKey,
    pub direction: SortDirection,
}

/// Run the full filter/sort/search pipeline over a fetched list.
pub fn apply(filter: &DiaryFilter, entries: Vec<DiaryWithTags>) -> Vec<DiaryWithTags> {
    let mut entries: Vec<DiaryWithTags> = entries
        .into_iter()
        .filter(|entry| matches_filter(filter, entry))
        .collect();

    match filter.query.as_deref().map(str::trim) {
        Some(query) if !query.is_empty() => {
            let query = query.to_lowercase();
            let mut scored: Vec<(f64, DiaryWithTags)> = entries
                .into_iter()
                .filter_map(|entry| {
                    let score = relevance(&query, &entry);
                    (score > 0.0).then_some((score, entry))
                })
                .collect();

            // Ties fall back to recency
            scored.sort_by(|(a_score, a), (b_score, b)| {
                b_score
                    .partial_cmp(a_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| b.diary.updated_at.cmp(&a.diary.updated_at))
            });

            scored.into_iter().map(|(_, entry)| entry).collect()
        }
        _ => {
            sort_entries(&mut entries, filter.sort, filter.direction);
            entries
        }
    }
}

fn matches_filter(filter: &DiaryFilter, entry: &DiaryWithTags) -> bool {
    if filter.favorite_only && !entry.diary.favorite {
        return false;
    }

    if let Some(category_id) = &filter.category_id {
        if entry.diary.category_id.as_ref() != Some(category_id) {
            return false;
        }
    }

    if let Some(mood) = filter.mood {
        if entry.diary.mood != Some(mood) {
            return false;
        }
    }

    filter
        .tag_ids
        .iter()
        .all(|wanted| entry.tags.iter().any(|tag| &tag.id == wanted))
}

/// Pinned entries always sort before unpinned ones.
fn sort_entries(entries: &mut [DiaryWithTags], sort: SortKey, direction: SortDirection) {
    entries.sort_by(|a, b| {
        let pin = b.diary.pinned.cmp(&a.diary.pinned);
        if pin != std::cmp::Ordering::Equal {
            return pin;
        }

        let ordering = match sort {
            SortKey::Created => a.diary.created_at.cmp(&b.diary.created_at),
            SortKey::Updated => a.diary.updated_at.cmp(&b.diary.updated_at),
            SortKey::Title => a
                .diary
                .title
                .to_lowercase()
                .cmp(&b.diary.title.to_lowercase()),
        };

        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// Score a diary against a lowercase query. Zero means no match.
pub fn relevance(query: &str, entry: &DiaryWithTags) -> f64 {
    let mut score = 0.0;

    let title = entry.diary.title.to_lowercase();
    if title.contains(query) {
        score += config::SCORE_TITLE_HIT;
        if title
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word == query)
        {
            score += config::SCORE_WHOLE_WORD_BONUS;
        }
    }

    let content = entry.diary.content.to_lowercase();
    let content_hits = content.matches(query).count().min(3);
    score += config::SCORE_CONTENT_HIT * content_hits as f64;

    if entry
        .tags
        .iter()
        .any(|tag| tag.name.to_lowercase().contains(query))
    {
        score += config::SCORE_TAG_HIT;
    }

    // Boosts only apply to entries that matched at all
    if score > 0.0 {
        if entry.diary.favorite {
            score += config::SCORE_FAVORITE_BONUS;
        }
        if entry.diary.updated_at > Utc::now() - Duration::days(7) {
            score += config::SCORE_RECENCY_BONUS;
        }
    }

    score
}
