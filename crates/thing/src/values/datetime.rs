use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::ComponentError;

use super::codable::CodableValue;
use super::date::{ApproximateDate, HealthServiceDate};
use super::time::ApproximateTime;

/// A full date with an optional approximate time and time zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct HealthServiceDateTime {
    pub date: HealthServiceDate,
    pub time: Option<ApproximateTime>,
    pub time_zone: Option<CodableValue>,
}

impl HealthServiceDateTime {
    pub fn new(date: HealthServiceDate) -> Self {
        Self {
            date,
            time: None,
            time_zone: None,
        }
    }

    pub fn at(date: HealthServiceDate, time: ApproximateTime) -> Self {
        Self {
            date,
            time: Some(time),
            time_zone: None,
        }
    }

    pub fn with_time_zone(mut self, time_zone: CodableValue) -> Self {
        self.time_zone = Some(time_zone);
        self
    }

    pub fn to_naive_date_time(&self) -> Option<NaiveDateTime> {
        let date = self.date.to_naive_date()?;
        let time = match &self.time {
            Some(time) => time.to_naive_time()?,
            None => chrono::NaiveTime::MIN,
        };
        Some(date.and_time(time))
    }
}

impl TryFrom<NaiveDateTime> for HealthServiceDateTime {
    type Error = ComponentError;

    fn try_from(value: NaiveDateTime) -> Result<Self, Self::Error> {
        Ok(Self::at(
            HealthServiceDate::try_from(value.date())?,
            ApproximateTime::from(value.time()),
        ))
    }
}

/// A point in time known either structurally, to some precision, or only
/// as a description such as "when I was a child".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ApproximateDateTime {
    Structured {
        date: ApproximateDate,
        time: Option<ApproximateTime>,
        time_zone: Option<CodableValue>,
    },
    Descriptive(String),
}

impl ApproximateDateTime {
    pub fn from_date(date: ApproximateDate) -> Self {
        ApproximateDateTime::Structured {
            date,
            time: None,
            time_zone: None,
        }
    }

    pub fn at(date: ApproximateDate, time: ApproximateTime) -> Self {
        ApproximateDateTime::Structured {
            date,
            time: Some(time),
            time_zone: None,
        }
    }

    pub fn descriptive(text: impl Into<String>) -> Self {
        ApproximateDateTime::Descriptive(text.into())
    }

    pub fn date(&self) -> Option<&ApproximateDate> {
        match self {
            ApproximateDateTime::Structured { date, .. } => Some(date),
            ApproximateDateTime::Descriptive(_) => None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            ApproximateDateTime::Descriptive(text) => Some(text),
            ApproximateDateTime::Structured { .. } => None,
        }
    }
}

impl From<HealthServiceDateTime> for ApproximateDateTime {
    fn from(value: HealthServiceDateTime) -> Self {
        ApproximateDateTime::Structured {
            date: value.date.into(),
            time: value.time,
            time_zone: value.time_zone,
        }
    }
}
