use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RoleQuery {
    pub user_role: String,
}

/// Inclusive date range, both ends as `YYYY-MM-DD`. Kept as strings so a
/// malformed date can be answered with a detail body instead of a plain
/// extractor rejection.
#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    pub start_date: String,
    pub end_date: String,
}
