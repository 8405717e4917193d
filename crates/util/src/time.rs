/// Internal time in minutes since the 1970-01-01 epoch.
///
/// All scheduler state is persisted in this unit. Signed 32-bit minutes
/// reach past year 6000, which outlives any running game.
pub type Time = i32;

/// User-facing time as exposed by the command surface.
///
/// Distinct from [`Time`] on purpose: the two scalars convert only through
/// a configured scale (seconds per internal minute, normally 60), so mixing
/// them up fails to type-check instead of silently shifting every date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UserTime(pub i64);

/// Minutes in one day.
pub const MINUTES_PER_DAY: Time = 24 * 60;

/// Weekday of a day index (days since epoch). 0 = Sunday ... 6 = Saturday.
/// Day 0 (1970-01-01) was a Thursday.
pub fn weekday_of_day(day: Time) -> i32 {
    (day + 4).rem_euclid(7)
}

/// Weekday of an internal time. 0 = Sunday ... 6 = Saturday.
pub fn weekday(time: Time) -> i32 {
    weekday_of_day(time.div_euclid(MINUTES_PER_DAY))
}

/// Minutes since midnight of an internal time.
pub fn time_of_day(time: Time) -> Time {
    time.rem_euclid(MINUTES_PER_DAY)
}

/// Convert internal to user time with the given scale (seconds per minute).
pub fn to_user_time(time: Time, scale: i64) -> UserTime {
    UserTime(time as i64 * scale)
}

/// Convert user to internal time with the given scale, truncating.
pub fn from_user_time(time: UserTime, scale: i64) -> Time {
    (time.0 / scale) as Time
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_is_thursday() {
        assert_eq!(weekday_of_day(0), 4);
        assert_eq!(weekday(0), 4);
    }

    #[test]
    fn weekday_cycles() {
        // 1970-01-04 was a Sunday.
        assert_eq!(weekday_of_day(3), 0);
        assert_eq!(weekday_of_day(10), 0);
        assert_eq!(weekday_of_day(9), 6);
    }

    #[test]
    fn day_split() {
        let t = 500 * MINUTES_PER_DAY + 400;
        assert_eq!(time_of_day(t), 400);
        assert_eq!(t - time_of_day(t), 500 * MINUTES_PER_DAY);
    }

    #[test]
    fn user_time_round_trip() {
        let t = 1234567;
        assert_eq!(from_user_time(to_user_time(t, 60), 60), t);
    }
}
