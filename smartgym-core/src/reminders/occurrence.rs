use chrono::{DateTime, Datelike, Days, Duration, NaiveTime, TimeZone, Weekday};

/// Sunday = 0 through Saturday = 6.
pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

/// Next `weekday` at `hour:minute:00` strictly after `now`, in `now`'s time zone.
///
/// When today is `weekday` and that time has already come, the result is one
/// week ahead. A time skipped by a daylight-saving jump fires one hour later
/// on the wall clock. Returns `None` for out-of-range times.
pub fn next_occurrence<Tz: TimeZone>(
    now: &DateTime<Tz>,
    weekday: Weekday,
    hour: u32,
    minute: u32,
) -> Option<DateTime<Tz>> {
    let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
    let today = now.date_naive();
    let tz = now.timezone();

    let at = |days_ahead: u32| {
        let date = today.checked_add_days(Days::new(days_ahead as u64))?;
        let local = date.and_time(time);
        tz.from_local_datetime(&local)
            .earliest()
            .or_else(|| tz.from_local_datetime(&(local + Duration::hours(1))).earliest())
    };

    let days_ahead =
        (weekday.num_days_from_sunday() + 7 - today.weekday().num_days_from_sunday()) % 7;
    let candidate = at(days_ahead)?;
    if candidate > *now {
        Some(candidate)
    } else {
        at(days_ahead + 7)
    }
}
