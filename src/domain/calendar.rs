//! Simulated trading calendar: weekdays, 09:30–15:00.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};

/// Session window expressed as fractional hours, matching the simulated
/// exchange (09:30 = 9.5, 15:00 = 15.0). Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradingCalendar {
    pub open_hour: f64,
    pub close_hour: f64,
}

impl Default for TradingCalendar {
    fn default() -> Self {
        TradingCalendar {
            open_hour: 9.5,
            close_hour: 15.0,
        }
    }
}

impl TradingCalendar {
    pub fn is_trading_day(date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// True while orders are accepted and NAVs drift: a trading day, with the
    /// current hour-fraction inside the session window. Seconds are ignored,
    /// as the minute resolution is what the window is defined in.
    pub fn is_open(&self, now: NaiveDateTime) -> bool {
        if !Self::is_trading_day(now.date()) {
            return false;
        }
        let hour = now.hour() as f64 + now.minute() as f64 / 60.0;
        hour >= self.open_hour && hour <= self.close_hour
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn weekdays_are_trading_days() {
        // 2025-06-02 is a Monday.
        for d in 2..=6 {
            assert!(TradingCalendar::is_trading_day(
                NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
            ));
        }
    }

    #[test]
    fn weekend_is_closed() {
        let cal = TradingCalendar::default();
        // Saturday and Sunday, mid-session hours.
        assert!(!cal.is_open(at(2025, 6, 7, 10, 0)));
        assert!(!cal.is_open(at(2025, 6, 8, 10, 0)));
    }

    #[test]
    fn open_during_session() {
        let cal = TradingCalendar::default();
        assert!(cal.is_open(at(2025, 6, 2, 10, 0)));
        assert!(cal.is_open(at(2025, 6, 2, 14, 59)));
    }

    #[test]
    fn session_bounds_are_inclusive() {
        let cal = TradingCalendar::default();
        assert!(cal.is_open(at(2025, 6, 2, 9, 30)));
        assert!(cal.is_open(at(2025, 6, 2, 15, 0)));
    }

    #[test]
    fn closed_outside_session_hours() {
        let cal = TradingCalendar::default();
        assert!(!cal.is_open(at(2025, 6, 2, 9, 29)));
        assert!(!cal.is_open(at(2025, 6, 2, 15, 1)));
        assert!(!cal.is_open(at(2025, 6, 2, 3, 0)));
        assert!(!cal.is_open(at(2025, 6, 2, 22, 0)));
    }

    #[test]
    fn custom_session_window() {
        let cal = TradingCalendar {
            open_hour: 8.0,
            close_hour: 16.5,
        };
        assert!(cal.is_open(at(2025, 6, 3, 8, 0)));
        assert!(cal.is_open(at(2025, 6, 3, 16, 30)));
        assert!(!cal.is_open(at(2025, 6, 3, 16, 31)));
    }
}
