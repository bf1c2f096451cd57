use chrono::{NaiveTime, Timelike};
use serde::Serialize;

use crate::error::{ComponentError, check_component};

/// A time of day where seconds and milliseconds may be unknown.
///
/// Milliseconds can only be present when seconds are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ApproximateTime {
    hour: u32,
    minute: u32,
    second: Option<u32>,
    millisecond: Option<u32>,
}

fn check_hour(hour: u32) -> Result<(), ComponentError> {
    check_component("hour", hour.into(), 0, 23)
}

fn check_minute(minute: u32) -> Result<(), ComponentError> {
    check_component("minute", minute.into(), 0, 59)
}

fn check_second(second: u32) -> Result<(), ComponentError> {
    check_component("second", second.into(), 0, 59)
}

fn check_millisecond(millisecond: u32) -> Result<(), ComponentError> {
    check_component("millisecond", millisecond.into(), 0, 999)
}

impl ApproximateTime {
    pub fn new(
        hour: u32,
        minute: u32,
        second: Option<u32>,
        millisecond: Option<u32>,
    ) -> Result<Self, ComponentError> {
        check_hour(hour)?;
        check_minute(minute)?;
        if let Some(second) = second {
            check_second(second)?;
        }
        if let Some(millisecond) = millisecond {
            check_millisecond(millisecond)?;
            if second.is_none() {
                return Err(ComponentError::Requires {
                    component: "millisecond",
                    requires: "second",
                });
            }
        }
        Ok(Self {
            hour,
            minute,
            second,
            millisecond,
        })
    }

    pub fn hm(hour: u32, minute: u32) -> Result<Self, ComponentError> {
        Self::new(hour, minute, None, None)
    }

    pub fn hms(hour: u32, minute: u32, second: u32) -> Result<Self, ComponentError> {
        Self::new(hour, minute, Some(second), None)
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    pub fn second(&self) -> Option<u32> {
        self.second
    }

    pub fn millisecond(&self) -> Option<u32> {
        self.millisecond
    }

    pub fn set_hour(&mut self, hour: u32) -> Result<(), ComponentError> {
        check_hour(hour)?;
        self.hour = hour;
        Ok(())
    }

    pub fn set_minute(&mut self, minute: u32) -> Result<(), ComponentError> {
        check_minute(minute)?;
        self.minute = minute;
        Ok(())
    }

    pub fn set_second(&mut self, second: Option<u32>) -> Result<(), ComponentError> {
        match second {
            Some(second) => check_second(second)?,
            None if self.millisecond.is_some() => {
                return Err(ComponentError::Requires {
                    component: "millisecond",
                    requires: "second",
                });
            }
            None => {}
        }
        self.second = second;
        Ok(())
    }

    pub fn set_millisecond(&mut self, millisecond: Option<u32>) -> Result<(), ComponentError> {
        if let Some(millisecond) = millisecond {
            check_millisecond(millisecond)?;
            if self.second.is_none() {
                return Err(ComponentError::Requires {
                    component: "millisecond",
                    requires: "second",
                });
            }
        }
        self.millisecond = millisecond;
        Ok(())
    }

    /// Unknown seconds and milliseconds become zero.
    pub fn to_naive_time(&self) -> Option<NaiveTime> {
        NaiveTime::from_hms_milli_opt(
            self.hour,
            self.minute,
            self.second.unwrap_or(0),
            self.millisecond.unwrap_or(0),
        )
    }
}

impl From<NaiveTime> for ApproximateTime {
    /// Leap seconds are folded into the 59th second.
    fn from(time: NaiveTime) -> Self {
        Self {
            hour: time.hour(),
            minute: time.minute(),
            second: Some(time.second().min(59)),
            millisecond: Some((time.nanosecond() / 1_000_000).min(999)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_ranges() {
        assert!(ApproximateTime::hm(23, 59).is_ok());
        assert!(ApproximateTime::hm(24, 0).is_err());
        assert!(ApproximateTime::hm(0, 60).is_err());
        assert!(ApproximateTime::hms(0, 0, 60).is_err());
        assert!(ApproximateTime::new(0, 0, Some(0), Some(999)).is_ok());
        assert!(ApproximateTime::new(0, 0, Some(0), Some(1000)).is_err());
    }

    #[test]
    fn test_millisecond_requires_second() {
        assert!(matches!(
            ApproximateTime::new(7, 30, None, Some(5)),
            Err(ComponentError::Requires { component: "millisecond", .. })
        ));

        let mut time = ApproximateTime::new(7, 30, Some(1), Some(5)).unwrap();
        assert!(time.set_second(None).is_err());
        time.set_millisecond(None).unwrap();
        time.set_second(None).unwrap();
        assert_eq!(time, ApproximateTime::hm(7, 30).unwrap());
    }

    #[test]
    fn test_chrono_conversion() {
        let naive = NaiveTime::from_hms_milli_opt(22, 15, 7, 250).unwrap();
        let time = ApproximateTime::from(naive);
        assert_eq!(time.millisecond(), Some(250));
        assert_eq!(time.to_naive_time(), Some(naive));
    }
}
