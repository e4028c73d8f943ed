//! Clock port trait.
//!
//! Trading-window and lock-up checks are pure functions of "now", so the
//! current time is injected rather than read ambiently. Tests swap in a
//! fixed clock.

use chrono::NaiveDateTime;

pub trait ClockPort {
    fn now(&self) -> NaiveDateTime;
}
