pub mod cache {
    use chrono::Duration;

    pub const RECOMMENDATION_TTL_HOURS: i64 = 24;

    #[must_use]
    pub const fn recommendation_ttl() -> Duration {
        Duration::hours(RECOMMENDATION_TTL_HOURS)
    }
}

pub mod limits {

    pub const TITLE_MAX: usize = 255;

    pub const SUMMARY_MAX: usize = 1000;

    pub const TAG_NAME_MAX: usize = 50;

    pub const BOOK_TITLE_MAX: usize = 500;

    pub const BOOK_AUTHOR_MAX: usize = 255;

    /// Concurrent bibliographic lookups per regeneration.
    pub const ENRICHMENT_CONCURRENCY: usize = 4;
}

pub mod display {
    /// Asia/Tokyo has no DST, so a fixed offset is exact.
    pub const JST_OFFSET_SECONDS: i32 = 9 * 3600;

    pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
}

pub mod metrics {
    pub const HTTP_REQUESTS: &str = "http_requests_total";

    pub const HTTP_REQUEST_DURATION: &str = "http_request_duration_seconds";

    pub const HTTP_REQUEST_FAILURES: &str = "http_requests_failed_total";

    pub const CACHE_HITS: &str = "book_recommendations_cache_hits_total";

    pub const CACHE_MISSES: &str = "book_recommendations_cache_misses_total";

    pub const ENRICHMENT_FAILURES: &str = "book_recommendations_enrichment_failures_total";
}
