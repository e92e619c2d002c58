#[derive(serde::Deserialize)]
pub struct CountResult {
    pub total: u64,
}

/// Row of a `count()` + `math::sum(duration)` query grouped over a table
#[derive(serde::Deserialize)]
pub struct DurationTotals {
    pub count: u64,
    #[serde(default)]
    pub total_duration: f64,
}
