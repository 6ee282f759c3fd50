use std::fmt::Display;

use chrono::{Local, NaiveDateTime};

const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Length of `-YYYYMMDD-HHMMSS` appended to the configured prefix.
pub(crate) const TIMESTAMP_SUFFIX_LEN: usize = 16;

/// Source of the wall-clock time used to stamp job names.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Name of a submitted job: `<prefix>-<YYYYMMDD-HHMMSS>`.
///
/// Second resolution only. Two launches within the same second get the
/// same name and the second create is rejected by the API server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobName(String);

impl JobName {
    pub fn at(prefix: &str, at: NaiveDateTime) -> JobName {
        JobName(format!("{prefix}-{}", at.format(TIMESTAMP_FORMAT)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for JobName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
