use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::error::{ComponentError, check_component};

pub const MIN_YEAR: i32 = 1000;
pub const MAX_YEAR: i32 = 9999;

fn check_year(year: i32) -> Result<(), ComponentError> {
    check_component("year", year.into(), MIN_YEAR.into(), MAX_YEAR.into())
}

fn check_month(month: u32) -> Result<(), ComponentError> {
    check_component("month", month.into(), 1, 12)
}

fn check_day(day: u32) -> Result<(), ComponentError> {
    check_component("day", day.into(), 1, 31)
}

/// A date where the month and day may be unknown.
///
/// The day can only be present when the month is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ApproximateDate {
    year: i32,
    month: Option<u32>,
    day: Option<u32>,
}

impl ApproximateDate {
    pub fn new(year: i32, month: Option<u32>, day: Option<u32>) -> Result<Self, ComponentError> {
        check_year(year)?;
        if let Some(month) = month {
            check_month(month)?;
        }
        if let Some(day) = day {
            check_day(day)?;
            if month.is_none() {
                return Err(ComponentError::Requires {
                    component: "day",
                    requires: "month",
                });
            }
        }
        Ok(Self { year, month, day })
    }

    pub fn year_only(year: i32) -> Result<Self, ComponentError> {
        Self::new(year, None, None)
    }

    pub fn year_month(year: i32, month: u32) -> Result<Self, ComponentError> {
        Self::new(year, Some(month), None)
    }

    pub fn ymd(year: i32, month: u32, day: u32) -> Result<Self, ComponentError> {
        Self::new(year, Some(month), Some(day))
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    pub fn day(&self) -> Option<u32> {
        self.day
    }

    pub fn set_year(&mut self, year: i32) -> Result<(), ComponentError> {
        check_year(year)?;
        self.year = year;
        Ok(())
    }

    /// Clearing the month is rejected while a day is set.
    pub fn set_month(&mut self, month: Option<u32>) -> Result<(), ComponentError> {
        match month {
            Some(month) => check_month(month)?,
            None if self.day.is_some() => {
                return Err(ComponentError::Requires {
                    component: "day",
                    requires: "month",
                });
            }
            None => {}
        }
        self.month = month;
        Ok(())
    }

    pub fn set_day(&mut self, day: Option<u32>) -> Result<(), ComponentError> {
        if let Some(day) = day {
            check_day(day)?;
            if self.month.is_none() {
                return Err(ComponentError::Requires {
                    component: "day",
                    requires: "month",
                });
            }
        }
        self.day = day;
        Ok(())
    }

    /// The calendar date, when all three parts are known and form a real
    /// date.
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month?, self.day?)
    }
}

impl TryFrom<NaiveDate> for ApproximateDate {
    type Error = ComponentError;

    fn try_from(date: NaiveDate) -> Result<Self, Self::Error> {
        Self::ymd(date.year(), date.month(), date.day())
    }
}

/// A fully specified date as recorded by a health service.
///
/// Components are range checked individually; a day that does not exist in
/// its month (such as 31 June) is accepted, as the wire format allows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct HealthServiceDate {
    year: i32,
    month: u32,
    day: u32,
}

impl HealthServiceDate {
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, ComponentError> {
        check_year(year)?;
        check_month(month)?;
        check_day(day)?;
        Ok(Self { year, month, day })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn set_year(&mut self, year: i32) -> Result<(), ComponentError> {
        check_year(year)?;
        self.year = year;
        Ok(())
    }

    pub fn set_month(&mut self, month: u32) -> Result<(), ComponentError> {
        check_month(month)?;
        self.month = month;
        Ok(())
    }

    pub fn set_day(&mut self, day: u32) -> Result<(), ComponentError> {
        check_day(day)?;
        self.day = day;
        Ok(())
    }

    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

impl TryFrom<NaiveDate> for HealthServiceDate {
    type Error = ComponentError;

    fn try_from(date: NaiveDate) -> Result<Self, Self::Error> {
        Self::new(date.year(), date.month(), date.day())
    }
}

impl From<HealthServiceDate> for ApproximateDate {
    fn from(date: HealthServiceDate) -> Self {
        Self {
            year: date.year,
            month: Some(date.month),
            day: Some(date.day),
        }
    }
}
