use chrono::{Datelike, Local, NaiveDate};
use std::fmt;

/// The date stamped on every member of a batch, eg "March 5 2024".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDate(String);

impl RunDate {
    pub fn today() -> RunDate {
        RunDate::from(Local::now().date_naive())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<NaiveDate> for RunDate {
    fn from(date: NaiveDate) -> Self {
        RunDate(format!("{} {} {}", date.format("%B"), date.day(), date.year()))
    }
}

impl AsRef<str> for RunDate {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
