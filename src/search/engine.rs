use std::cmp::Reverse;

use super::query::normalize_query;
use crate::catalog::language::Language;
use crate::records::types::FoodRecord;

pub const SCORE_NAME_EXACT: u32 = 1000;
pub const SCORE_BRAND_EXACT: u32 = 900;
pub const SCORE_NAME_PREFIX: u32 = 800;
pub const SCORE_BRAND_PREFIX: u32 = 700;
pub const SCORE_NAME_CONTAINS: u32 = 600;
pub const SCORE_BRAND_CONTAINS: u32 = 500;

#[derive(Debug, Clone, Copy)]
pub struct ScoredRecord<'a> {
    pub record: &'a FoodRecord,
    pub score: u32,
}

/// The lowercased name searched for a language. Fixed per language, never per record.
pub fn name_field(record: &FoodRecord, lang: Language) -> &str {
    match lang {
        Language::Kr => &record.keys().name_kor,
        _ => &record.keys().name_eng,
    }
}

/// Scores one record against an already normalized query. 0 means no match.
pub fn score(record: &FoodRecord, query: &str, lang: Language) -> u32 {
    let name = name_field(record, lang);
    let brand = record.keys().brand.as_str();

    if name == query {
        SCORE_NAME_EXACT
    } else if brand == query {
        SCORE_BRAND_EXACT
    } else if name.starts_with(query) {
        SCORE_NAME_PREFIX
    } else if brand.starts_with(query) {
        SCORE_BRAND_PREFIX
    } else if name.contains(query) {
        SCORE_NAME_CONTAINS
    } else if brand.contains(query) {
        SCORE_BRAND_CONTAINS
    } else {
        0
    }
}

/// All matching records, best first.
///
/// Score descending, then records with calorie data, then dataset order.
/// The sort is stable, so the last tie-break is the part concatenation order.
pub fn rank<'a>(records: &'a [FoodRecord], query: &str, lang: Language) -> Vec<ScoredRecord<'a>> {
    let mut scored: Vec<ScoredRecord<'a>> = records
        .iter()
        .filter_map(|record| match score(record, query, lang) {
            0 => None,
            score => Some(ScoredRecord { record, score }),
        })
        .collect();

    scored.sort_by_key(|s| (Reverse(s.score), !s.record.has_calories()));
    scored
}

/// Ranked, paginated search over one language's records.
///
/// Queries shorter than two characters return nothing.
pub fn search<'a>(
    records: &'a [FoodRecord],
    query: &str,
    lang: Language,
    limit: usize,
    offset: usize,
) -> Vec<&'a FoodRecord> {
    let Some(query) = normalize_query(query) else {
        return Vec::new();
    };

    let ranked = rank(records, &query, lang);
    tracing::debug!("Query '{}' matched {} {} record(s)", query, ranked.len(), lang);

    ranked
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(|s| s.record)
        .collect()
}
