// Rate-limited sequential query execution
//
// Multi-query searches against the unauthenticated search API have to be
// throttled or GitHub starts answering 403. The scheduler runs the queries
// one after another with a fixed gap, and when a rate limit does hit it
// sleeps an extra cooldown and carries on with the rest of the list rather
// than giving up.
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Timing knobs for a query sequence
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// Gap between consecutive queries
    pub inter_query_delay_ms: u64,
    /// Extra sleep after a rate-limit response before continuing
    pub rate_limit_cooldown_ms: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            inter_query_delay_ms: 800,
            rate_limit_cooldown_ms: 2000,
        }
    }
}

/// Result of a single query in the sequence
pub struct QueryOutcome<T, E> {
    pub query: String,
    pub result: Result<T, E>,
}

impl<T, E> QueryOutcome<T, E> {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Run `queries` one at a time through `task`, throttled.
///
/// Every query gets its shot even if earlier ones failed; the caller
/// inspects the outcomes to decide whether the batch as a whole counts
/// as a failure. `is_rate_limited` tells the scheduler which errors
/// deserve the extra cooldown.
pub async fn run_sequential<T, E, F, Fut>(
    config: &ScheduleConfig,
    queries: &[String],
    is_rate_limited: impl Fn(&E) -> bool,
    mut task: F,
) -> Vec<QueryOutcome<T, E>>
where
    F: FnMut(String) -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    let mut outcomes = Vec::with_capacity(queries.len());

    for (i, query) in queries.iter().enumerate() {
        let result = task(query.clone()).await;

        if result.as_ref().err().map(&is_rate_limited).unwrap_or(false) {
            warn!(
                "Rate limit hit on query {}/{}, cooling down {}ms",
                i + 1,
                queries.len(),
                config.rate_limit_cooldown_ms
            );
            sleep(Duration::from_millis(config.rate_limit_cooldown_ms)).await;
        }

        outcomes.push(QueryOutcome {
            query: query.clone(),
            result,
        });

        // No point sleeping after the last one
        if i + 1 < queries.len() {
            sleep(Duration::from_millis(config.inter_query_delay_ms)).await;
        }
    }

    outcomes
}
