use nova_core::MINUTES_PER_DAY;
use nova_core::Time;
use nova_core::Turn;
use nova_core::time_of_day;
use nova_core::weekday_of_day;
use nova_store::Store;
use nova_store::StoreExt;
use serde::Deserialize;
use serde::Serialize;

/// Kind of a schedule, with its wire integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScheduleKind {
    #[default]
    Stopped,
    /// Host every N days.
    Weekly,
    /// Host on fixed weekdays.
    Daily,
    /// Host as soon as all turns are in.
    Quick,
    /// Host only on explicit request.
    Manual,
}

impl ScheduleKind {
    pub fn to_wire(self) -> i32 {
        match self {
            ScheduleKind::Stopped => 0,
            ScheduleKind::Weekly => 1,
            ScheduleKind::Daily => 2,
            ScheduleKind::Quick => 3,
            ScheduleKind::Manual => 4,
        }
    }
    pub fn from_wire(value: i32) -> Option<Self> {
        match value {
            0 => Some(ScheduleKind::Stopped),
            1 => Some(ScheduleKind::Weekly),
            2 => Some(ScheduleKind::Daily),
            3 => Some(ScheduleKind::Quick),
            4 => Some(ScheduleKind::Manual),
            _ => None,
        }
    }
}

/// Expiration condition of a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Expiration {
    #[default]
    Never,
    /// Expires when the game reaches this turn.
    AtTurn(Turn),
    /// Expires at this time.
    AtTime(Time),
}

impl Expiration {
    pub fn kind_to_wire(self) -> i32 {
        match self {
            Expiration::Never => 0,
            Expiration::AtTurn(_) => 1,
            Expiration::AtTime(_) => 2,
        }
    }
    pub fn from_wire(kind: i32, turn: Turn, time: Time) -> Option<Self> {
        match kind {
            0 => Some(Expiration::Never),
            1 => Some(Expiration::AtTurn(turn)),
            2 => Some(Expiration::AtTime(time)),
            _ => None,
        }
    }
}

/// One host schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub kind: ScheduleKind,
    /// Weekday mask for daily schedules; bit 0 = Sunday ... bit 6 = Saturday.
    pub weekdays: u8,
    /// Interval in days for weekly schedules.
    pub interval: i32,
    /// Time of day hosts run at, minutes since midnight.
    pub daytime: Time,
    /// Host as soon as all turns are in, ahead of schedule.
    pub host_early: bool,
    /// Minutes between the last turn submission and an early host.
    pub host_delay: Time,
    /// How late a host may run and still count as on-schedule.
    pub host_limit: Time,
    pub expiration: Expiration,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            kind: ScheduleKind::Stopped,
            weekdays: 0,
            interval: 3,
            daytime: 360,
            host_early: false,
            host_delay: 30,
            host_limit: 360,
            expiration: Expiration::Never,
        }
    }
}

impl Schedule {
    /// True if the given weekday (0 = Sunday) is enabled.
    pub fn runs_on(&self, weekday: i32) -> bool {
        (0..7).contains(&weekday) && self.weekdays & (1 << weekday) != 0
    }

    /// Next host time strictly after `last_host`, if the schedule
    /// produces host times by itself. Quick and manual schedules host on
    /// turn submission or trigger only; they have no own next time.
    pub fn next_host(&self, last_host: Time) -> Option<Time> {
        match self.kind {
            ScheduleKind::Weekly => self.next_weekly(last_host),
            ScheduleKind::Daily => self.next_daily(last_host),
            _ => None,
        }
    }

    /// Weekly: one interval after the day of the last host, at the
    /// schedule daytime. A host that overshot its slot by more than
    /// `host_limit` counts as the next day's host.
    fn next_weekly(&self, last_host: Time) -> Option<Time> {
        if self.interval <= 0 {
            return None;
        }
        let overshoot = time_of_day(last_host) - self.daytime;
        let mut day = last_host.div_euclid(MINUTES_PER_DAY);
        if overshoot > self.host_limit {
            day += 1;
        }
        let mut candidate = (day + self.interval) * MINUTES_PER_DAY + self.daytime;
        while candidate <= last_host {
            candidate += self.interval * MINUTES_PER_DAY;
        }
        Some(candidate)
    }

    /// Daily: the next enabled weekday after the last host, at the
    /// schedule daytime. A host that ran more than `host_limit` minutes
    /// past its slot pushes the scan one day further.
    fn next_daily(&self, last_host: Time) -> Option<Time> {
        if self.weekdays == 0 {
            return None;
        }
        let late = self
            .previous_virtual_host(last_host)
            .map(|slot| last_host - slot)
            .unwrap_or(0);
        let mut day = last_host.div_euclid(MINUTES_PER_DAY);
        if late > self.host_limit {
            day += 1;
        }
        for next in day + 1..=day + 7 {
            if self.runs_on(weekday_of_day(next)) {
                return Some(next * MINUTES_PER_DAY + self.daytime);
            }
        }
        None
    }

    /// Latest on-schedule host slot at or before `now`. This is the host
    /// the schedule would have run had it been active all along; the
    /// scheduler uses it to re-anchor `lastHostTime` when a stacked
    /// schedule expires.
    pub fn previous_virtual_host(&self, now: Time) -> Option<Time> {
        match self.kind {
            ScheduleKind::Weekly => {
                let mut slot = now - time_of_day(now) + self.daytime;
                if slot > now {
                    slot -= MINUTES_PER_DAY;
                }
                Some(slot)
            }
            ScheduleKind::Daily => {
                if self.weekdays == 0 {
                    return None;
                }
                let mut slot = now - time_of_day(now) + self.daytime;
                if slot > now {
                    slot -= MINUTES_PER_DAY;
                }
                for _ in 0..7 {
                    if self.runs_on(weekday_of_day(slot.div_euclid(MINUTES_PER_DAY))) {
                        return Some(slot);
                    }
                    slot -= MINUTES_PER_DAY;
                }
                None
            }
            _ => None,
        }
    }

    /// Has this schedule expired at the given turn and time?
    pub fn is_expired(&self, turn: Turn, now: Time) -> bool {
        match self.expiration {
            Expiration::Never => false,
            Expiration::AtTurn(n) => turn >= n,
            Expiration::AtTime(t) => now >= t,
        }
    }

    /// Time at which this schedule hands over to the next one, if timed.
    pub fn expiration_time(&self) -> Option<Time> {
        match self.expiration {
            Expiration::AtTime(t) => Some(t),
            _ => None,
        }
    }

    /// Persist into a store hash.
    pub fn save_to(&self, store: &dyn Store, key: &str) {
        store.hset_int(key, "type", self.kind.to_wire() as i64);
        store.hset_int(key, "weekdays", self.weekdays as i64);
        store.hset_int(key, "interval", self.interval as i64);
        store.hset_int(key, "daytime", self.daytime as i64);
        store.hset_int(key, "hostEarly", self.host_early as i64);
        store.hset_int(key, "hostDelay", self.host_delay as i64);
        store.hset_int(key, "hostLimit", self.host_limit as i64);
        store.hset_int(key, "condition", self.expiration.kind_to_wire() as i64);
        match self.expiration {
            Expiration::AtTurn(n) => store.hset_int(key, "condTurn", n as i64),
            Expiration::AtTime(t) => store.hset_int(key, "condTime", t as i64),
            Expiration::Never => {}
        }
    }

    /// Load from a store hash; absent fields keep their defaults.
    pub fn load_from(store: &dyn Store, key: &str) -> Self {
        let mut schedule = Schedule::default();
        if let Some(kind) = ScheduleKind::from_wire(store.hget_int(key, "type") as i32) {
            schedule.kind = kind;
        }
        schedule.weekdays = store.hget_int(key, "weekdays") as u8;
        if let Some(interval) = store.hget_int_opt(key, "interval") {
            schedule.interval = interval as i32;
        }
        if let Some(daytime) = store.hget_int_opt(key, "daytime") {
            schedule.daytime = daytime as Time;
        }
        schedule.host_early = store.hget_int(key, "hostEarly") != 0;
        if let Some(delay) = store.hget_int_opt(key, "hostDelay") {
            schedule.host_delay = delay as Time;
        }
        if let Some(limit) = store.hget_int_opt(key, "hostLimit") {
            schedule.host_limit = limit as Time;
        }
        schedule.expiration = Expiration::from_wire(
            store.hget_int(key, "condition") as i32,
            store.hget_int(key, "condTurn") as Turn,
            store.hget_int(key, "condTime") as Time,
        )
        .unwrap_or(Expiration::Never);
        schedule
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_store::MemoryStore;

    const MPD: Time = MINUTES_PER_DAY;

    fn weekly(interval: i32, daytime: Time, host_limit: Time) -> Schedule {
        Schedule {
            kind: ScheduleKind::Weekly,
            interval,
            daytime,
            host_limit,
            ..Schedule::default()
        }
    }

    fn daily(weekdays: u8, daytime: Time, host_limit: Time) -> Schedule {
        Schedule {
            kind: ScheduleKind::Daily,
            weekdays,
            daytime,
            host_limit,
            ..Schedule::default()
        }
    }

    #[test]
    fn weekly_normal() {
        // Last host three minutes late: well within the limit.
        let schedule = weekly(4, 400, 300);
        let last = 500 * MPD + 400 + 3;
        assert_eq!(schedule.next_host(last), Some(504 * MPD + 400));
    }

    #[test]
    fn weekly_delayed_past_limit() {
        let schedule = weekly(4, 150, 45);
        let last = 500 * MPD + 150 + 50;
        assert_eq!(schedule.next_host(last), Some(505 * MPD + 150));
    }

    #[test]
    fn weekly_delayed_exactly_at_limit() {
        let schedule = weekly(4, 150, 45);
        let last = 500 * MPD + 150 + 45;
        assert_eq!(schedule.next_host(last), Some(504 * MPD + 150));
    }

    #[test]
    fn weekly_interval_bounds() {
        // From an aligned base the next host is exactly one interval out.
        for interval in 1..=7 {
            let schedule = weekly(interval, 400, 300);
            let last = 500 * MPD + 400;
            let next = schedule.next_host(last).unwrap();
            assert_eq!(next - last, interval * MPD);
        }
    }

    // Weekday masks: bit 0 = Sunday. Day 696 is a Sunday (1970-01-01 was
    // a Thursday, and 696 = 700 - 4).
    const MO_WE_FR: u8 = 2 + 8 + 32;
    const SUNDAY: Time = 700 - 4;

    #[test]
    fn daily_monday_to_wednesday() {
        let schedule = daily(MO_WE_FR, 360, 45);
        let last = (SUNDAY + 1) * MPD + 360;
        assert_eq!(schedule.next_host(last), Some((SUNDAY + 3) * MPD + 360));
    }

    #[test]
    fn daily_friday_to_next_monday() {
        let schedule = daily(MO_WE_FR, 360, 45);
        let last = (SUNDAY + 5) * MPD + 360;
        assert_eq!(schedule.next_host(last), Some((SUNDAY + 8) * MPD + 360));
    }

    #[test]
    fn daily_overdue_host_skips_a_day() {
        // The host that should have run Monday ran Tuesday morning; the
        // Wednesday slot is forfeit and the next host lands on Friday.
        let schedule = daily(MO_WE_FR, 360, 45);
        let last = (SUNDAY + 2) * MPD + 360;
        assert_eq!(schedule.next_host(last), Some((SUNDAY + 5) * MPD + 360));
    }

    #[test]
    fn previous_virtual_host_weekly() {
        let schedule = weekly(7, 200, 360);
        assert_eq!(
            schedule.previous_virtual_host(100 * MPD + 200),
            Some(100 * MPD + 200)
        );
        assert_eq!(
            schedule.previous_virtual_host(100 * MPD + 199),
            Some(99 * MPD + 200)
        );
    }

    #[test]
    fn previous_virtual_host_daily() {
        let schedule = daily(MO_WE_FR, 150, 45);
        // From a Sunday evening, the last slot was Friday.
        let now = SUNDAY * MPD + 700;
        assert_eq!(
            schedule.previous_virtual_host(now),
            Some((SUNDAY - 2) * MPD + 150)
        );
    }

    #[test]
    fn stopped_quick_manual_produce_nothing() {
        for kind in [ScheduleKind::Stopped, ScheduleKind::Quick, ScheduleKind::Manual] {
            let schedule = Schedule {
                kind,
                ..Schedule::default()
            };
            assert_eq!(schedule.next_host(1000), None);
            assert_eq!(schedule.previous_virtual_host(1000), None);
        }
    }

    #[test]
    fn expiration_by_turn() {
        let mut schedule = weekly(4, 400, 300);
        schedule.expiration = Expiration::AtTurn(25);
        assert!(!schedule.is_expired(24, 0));
        assert!(schedule.is_expired(25, 0));
        assert!(schedule.is_expired(26, 0));
    }

    #[test]
    fn expiration_by_time() {
        let mut schedule = weekly(4, 400, 300);
        schedule.expiration = Expiration::AtTime(5000);
        assert!(!schedule.is_expired(99, 4999));
        assert!(schedule.is_expired(0, 5000));
        assert_eq!(schedule.expiration_time(), Some(5000));
    }

    #[test]
    fn wire_round_trips() {
        for value in 0..=4 {
            assert_eq!(ScheduleKind::from_wire(value).unwrap().to_wire(), value);
        }
        assert_eq!(ScheduleKind::from_wire(5), None);
        for (kind, exp) in [
            (0, Expiration::Never),
            (1, Expiration::AtTurn(7)),
            (2, Expiration::AtTime(900)),
        ] {
            assert_eq!(Expiration::from_wire(kind, 7, 900), Some(exp));
            assert_eq!(exp.kind_to_wire(), kind);
        }
        assert_eq!(Expiration::from_wire(3, 0, 0), None);
    }

    #[test]
    fn store_round_trip() {
        let store = MemoryStore::new();
        let schedule = Schedule {
            kind: ScheduleKind::Daily,
            weekdays: MO_WE_FR,
            interval: 2,
            daytime: 480,
            host_early: true,
            host_delay: 25,
            host_limit: 90,
            expiration: Expiration::AtTurn(30),
        };
        schedule.save_to(&store, "game:9:schedule:1");
        assert_eq!(Schedule::load_from(&store, "game:9:schedule:1"), schedule);

        let timed = Schedule {
            expiration: Expiration::AtTime(123456),
            ..schedule
        };
        timed.save_to(&store, "game:9:schedule:2");
        assert_eq!(Schedule::load_from(&store, "game:9:schedule:2"), timed);
    }
}
