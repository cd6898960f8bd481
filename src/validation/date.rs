use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Utc};

/// Minimum age, in full years, for a user record to be accepted
pub const AGE_OF_MAJORITY: i32 = 18;

/// Calendar difference between two instants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Elapsed {
    pub years: i32,
    pub months: i32,
    pub days: i32,
    pub hours: i32,
    pub minutes: i32,
    pub seconds: i32,
}

/// The instant an unset timestamp serializes to: `0001-01-01T00:00:00Z`.
pub fn zero_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// True when `ts` is the "not provided" timestamp, whatever its offset.
pub fn is_zero_instant<Tz: TimeZone>(ts: &DateTime<Tz>) -> bool {
    ts.with_timezone(&Utc) == zero_instant()
}

fn days_in_month(year: i32, month: u32) -> i32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day() as i32)
        .unwrap_or(31)
}

/// Years, months, days, hours, minutes and seconds between `a` and `b`.
///
/// Argument order does not matter. Both instants are compared in UTC and
/// negative components borrow from the next larger unit; a day borrow uses
/// the length of the earlier instant's month.
pub fn time_between(a: DateTime<Utc>, b: DateTime<Utc>) -> Elapsed {
    let (from, to) = if a > b { (b, a) } else { (a, b) };

    let mut e = Elapsed {
        years: to.year() - from.year(),
        months: to.month() as i32 - from.month() as i32,
        days: to.day() as i32 - from.day() as i32,
        hours: to.hour() as i32 - from.hour() as i32,
        minutes: to.minute() as i32 - from.minute() as i32,
        seconds: to.second() as i32 - from.second() as i32,
    };

    if e.seconds < 0 {
        e.seconds += 60;
        e.minutes -= 1;
    }
    if e.minutes < 0 {
        e.minutes += 60;
        e.hours -= 1;
    }
    if e.hours < 0 {
        e.hours += 24;
        e.days -= 1;
    }
    if e.days < 0 {
        e.days += days_in_month(from.year(), from.month());
        e.months -= 1;
    }
    if e.months < 0 {
        e.months += 12;
        e.years -= 1;
    }

    e
}

/// Whether someone born at `birthdate` is under [`AGE_OF_MAJORITY`] at `now`.
pub fn is_underage_at(birthdate: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    if birthdate > now {
        return true;
    }
    time_between(birthdate, now).years < AGE_OF_MAJORITY
}

/// Whether someone born at `birthdate` is under [`AGE_OF_MAJORITY`] today.
pub fn is_underage(birthdate: DateTime<Utc>) -> bool {
    is_underage_at(birthdate, Utc::now())
}
