//! Records Module Tests
//!
//! ## Test Scopes
//! - **Decoding**: gzip handling, BOM stripping, lenient field parsing.
//! - **Cache**: part concatenation order, pointer-identical hits,
//!   all-or-nothing loads with retry, single-flight population.

#[cfg(test)]
mod tests {
    use crate::catalog::language::Language;
    use crate::catalog::locator::DatasetLocator;
    use crate::error::DatasetError;
    use crate::records::cache::RecordCache;
    use crate::records::decode::{decode_part, gunzip, parse_records};
    use crate::records::types::FoodRecord;
    use crate::storage::client::ChunkStore;
    use crate::storage::memory::{MemoryBackend, gzip, gzip_json};
    use bytes::Bytes;
    use serde_json::json;
    use std::sync::Arc;

    fn cache_over(backend: &Arc<MemoryBackend>) -> RecordCache {
        let locator = DatasetLocator::new(ChunkStore::new(backend.clone()));
        RecordCache::new(Arc::new(locator))
    }

    fn ids(records: &[FoodRecord]) -> Vec<String> {
        records.iter().map(|r| r.id()).collect()
    }

    // ============================================================
    // DECODING
    // ============================================================

    #[tokio::test]
    async fn test_gunzip_roundtrip() {
        let payload = b"[{\"id\": 1}]".repeat(1000);
        let compressed = gzip(&payload).await;

        assert_eq!(gunzip(&compressed).await.unwrap(), payload);
    }

    #[tokio::test]
    async fn test_gunzip_rejects_garbage() {
        assert!(gunzip(b"definitely not gzip").await.is_err());
    }

    #[test]
    fn test_parse_records_lenient_fields() {
        let json = r#"[
            {"id": 42, "name_eng": "Apple", "calories": "52.5", "protein": null, "fat": "n/a"},
            {"id": "x-1", "name_kor": "사과", "calories": 95, "origin": "KR"}
        ]"#;

        let records = parse_records(json.as_bytes()).unwrap();

        assert_eq!(records[0].id(), "42");
        assert_eq!(records[0].calories(), Some(52.5));
        assert_eq!(records[1].id(), "x-1");
        assert_eq!(records[1].calories(), Some(95.0));
        assert_eq!(records[1].keys().name_kor, "사과");
        assert_eq!(records[1].get("origin"), Some(&json!("KR")));
    }

    #[test]
    fn test_records_serialize_as_stored() {
        let stored = json!([
            {"id": 42, "calories": 120, "fat": "n/a", "sodium": "12", "protein": 3.5},
            {"id": "7", "food_code": 12345, "name_eng": null, "tags": ["a", 1]}
        ]);
        let records = parse_records(stored.to_string().as_bytes()).unwrap();

        assert_eq!(serde_json::to_value(&records).unwrap(), stored);
        assert_eq!(records[1].fields().len(), 4);
    }

    #[test]
    fn test_parse_records_accepts_any_field_types() {
        let records = parse_records(br#"[{"id": 1, "food_code": 12345, "brand": false}]"#).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("food_code"), Some(&json!(12345)));
        assert_eq!(records[0].keys().brand, "");
    }

    #[test]
    fn test_parse_records_strips_bom() {
        let json = b"\xEF\xBB\xBF[{\"id\": \"a\"}]";
        let records = parse_records(json).unwrap();
        assert_eq!(ids(&records), vec!["a"]);
    }

    #[test]
    fn test_unknown_fields_written_back() {
        let records = parse_records(br#"[{"id": "1", "vitamin_c": 4.6}]"#).unwrap();
        let value = serde_json::to_value(&records[0]).unwrap();

        assert_eq!(value["vitamin_c"], json!(4.6));
        assert_eq!(value["id"], json!("1"));
    }

    #[test]
    fn test_has_calories() {
        let records = parse_records(
            br#"[{"id": "1"}, {"calories": 0}, {"calories": "0.0"}, {"calories": "n/a"}, {"calories": 12}, {"calories": " 8.5 "}]"#,
        )
        .unwrap();

        let flags: Vec<bool> = records.iter().map(|r| r.has_calories()).collect();
        assert_eq!(flags, vec![false, false, false, false, true, true]);
    }

    #[tokio::test]
    async fn test_decode_part_reports_invalid_gzip() {
        let result = decode_part("us/us_part1.json.gz", Bytes::from_static(b"plain")).await;

        match result {
            Err(DatasetError::DatasetCorrupt { path, reason }) => {
                assert_eq!(path, "us/us_part1.json.gz");
                assert!(reason.starts_with("invalid gzip"));
            }
            other => panic!("expected DatasetCorrupt, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_decode_part_reports_invalid_json() {
        let compressed = gzip(b"{\"not\": \"an array\"").await;
        let result = decode_part("kr.json.gz", Bytes::from(compressed)).await;

        match result {
            Err(DatasetError::DatasetCorrupt { reason, .. }) => {
                assert!(reason.starts_with("invalid JSON"));
            }
            other => panic!("expected DatasetCorrupt, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_decode_part_rejects_invalid_utf8() {
        let compressed = gzip(b"[{\"id\": \"\xFF\xFE\"}]").await;
        let result = decode_part("jp.json.gz", Bytes::from(compressed)).await;

        assert!(matches!(result, Err(DatasetError::DatasetCorrupt { .. })));
    }

    // ============================================================
    // CACHE - LOADING
    // ============================================================

    #[tokio::test]
    async fn test_get_records_concatenates_parts_in_order() {
        let backend = Arc::new(MemoryBackend::new());
        // Inserted out of order and beyond part 9 on purpose
        for part in [10u32, 2, 1] {
            let value = json!([{"id": format!("p{part}-a")}, {"id": format!("p{part}-b")}]);
            backend.insert(
                &format!("us/us_part{part}.json.gz"),
                gzip_json(&value).await,
            );
        }
        let cache = cache_over(&backend);

        let records = cache.get_records(Language::Us).await.unwrap();

        assert_eq!(
            ids(&records),
            vec!["p1-a", "p1-b", "p2-a", "p2-b", "p10-a", "p10-b"]
        );
    }

    #[tokio::test]
    async fn test_single_file_loaded_without_part_files() {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert("us/us.json.gz", gzip_json(&json!([{"id": "a"}, {"id": "b"}])).await);
        backend.insert("us/us_part1.json.gz", gzip_json(&json!([{"id": "a"}])).await);
        backend.insert("us/us_part2.json.gz", gzip_json(&json!([{"id": "b"}])).await);
        let cache = cache_over(&backend);

        let records = cache.get_records(Language::Us).await.unwrap();

        assert_eq!(ids(&records), vec!["a", "b"]);
        assert_eq!(backend.open_count("us/us_part1.json.gz"), 0);
        assert_eq!(backend.open_count("us/us_part2.json.gz"), 0);
    }

    #[tokio::test]
    async fn test_cache_hit_returns_same_list() {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert("fr/fr.json.gz", gzip_json(&json!([{"id": 1}])).await);
        let cache = cache_over(&backend);

        let first = cache.get_records(Language::Fr).await.unwrap();
        let opens = backend.total_opens();
        let second = cache.get_records(Language::Fr).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(backend.total_opens(), opens);
        assert!(Arc::ptr_eq(&cache.cached(Language::Fr).unwrap(), &first));
    }

    #[tokio::test]
    async fn test_missing_dataset() {
        let backend = Arc::new(MemoryBackend::new());
        let cache = cache_over(&backend);

        let result = cache.get_records(Language::Zh).await;

        assert!(matches!(
            result,
            Err(DatasetError::DatasetNotFound { lang: Language::Zh, .. })
        ));
        assert!(cache.cached(Language::Zh).is_none());
    }

    #[tokio::test]
    async fn test_store_outage_is_not_cached() {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert("au/au.json.gz", gzip_json(&json!([{"id": 1}])).await);
        backend.set_unavailable(true);
        let cache = cache_over(&backend);

        let result = cache.get_records(Language::Au).await;
        assert!(matches!(result, Err(DatasetError::StoreUnavailable(_))));

        backend.set_unavailable(false);
        let records = cache.get_records(Language::Au).await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_part_fails_whole_load_then_retries() {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert(
            "kr/kr_part1.json.gz",
            gzip_json(&json!([{"id": "a"}, {"id": "b"}])).await,
        );
        backend.insert("kr/kr_part2.json.gz", b"broken upload".to_vec());
        let cache = cache_over(&backend);

        match cache.get_records(Language::Kr).await {
            Err(DatasetError::DatasetCorrupt { path, .. }) => {
                assert_eq!(path, "kr/kr_part2.json.gz");
            }
            other => panic!("expected DatasetCorrupt, got {:?}", other),
        }
        // Nothing partial is kept
        assert!(cache.cached(Language::Kr).is_none());
        assert!(cache.cached_languages().is_empty());

        backend.insert("kr/kr_part2.json.gz", gzip_json(&json!([{"id": "c"}])).await);

        let records = cache.get_records(Language::Kr).await.unwrap();
        assert_eq!(ids(&records), vec!["a", "b", "c"]);
    }

    // ============================================================
    // CACHE - CONCURRENCY
    // ============================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_loads_fetch_once() {
        let backend = Arc::new(MemoryBackend::new());
        for part in 1..=3u32 {
            backend.insert(
                &format!("jp/jp_part{part}.json.gz"),
                gzip_json(&json!([{"id": part}])).await,
            );
        }
        let cache = Arc::new(cache_over(&backend));

        let loads = (0..8).map(|_| {
            let cache = cache.clone();
            tokio::spawn(async move { cache.get_records(Language::Jp).await })
        });
        let results = futures::future::join_all(loads).await;

        let lists: Vec<_> = results
            .into_iter()
            .map(|r| r.unwrap().unwrap())
            .collect();
        for list in &lists {
            assert!(Arc::ptr_eq(list, &lists[0]));
        }
        for part in 1..=3u32 {
            assert_eq!(backend.open_count(&format!("jp/jp_part{part}.json.gz")), 1);
        }
        assert_eq!(backend.list_count(), 1);
    }

    #[tokio::test]
    async fn test_languages_are_cached_independently() {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert("us/us.json.gz", gzip_json(&json!([{"id": 1}, {"id": 2}])).await);
        backend.insert("ca/ca.json.gz", gzip_json(&json!([{"id": 3}])).await);
        let cache = cache_over(&backend);

        cache.warm(&[Language::Us, Language::Ca, Language::Zh]).await;
        // "en" is the same dataset as "us"
        let en = cache
            .get_records("en".parse::<Language>().unwrap())
            .await
            .unwrap();

        let stats: Vec<(Language, usize)> = cache
            .cached_languages()
            .into_iter()
            .map(|s| (s.lang, s.records))
            .collect();
        assert_eq!(stats, vec![(Language::Us, 2), (Language::Ca, 1)]);
        assert_eq!(en.len(), 2);
        assert_eq!(backend.open_count("us/us.json.gz"), 1);
    }
}
