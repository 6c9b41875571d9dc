use chrono::{DateTime, NaiveDate, Utc};
use std::future::Future;
use std::time::Duration;

use crate::error::{Error, Result};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Midnight UTC at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Runs `fut` under a request-scoped deadline. An elapsed deadline surfaces as
/// the retryable [`Error::Timeout`]; the dropped future rolls back any open
/// transaction it held.
pub async fn with_deadline<T, F>(deadline: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout(deadline.as_millis() as u64)),
    }
}
