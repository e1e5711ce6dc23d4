// This file is part of battlegame-tournament.
//
// battlegame-tournament is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// battlegame-tournament is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::time::Duration;

use chrono::{DateTime, Datelike, Days, NaiveTime, Utc, Weekday};

/// The source of "now" for anything that schedules rounds.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Tomorrow at `boundary`, UTC.
#[must_use]
pub fn next_round_time(now: DateTime<Utc>, boundary: NaiveTime) -> DateTime<Utc> {
    (now + Days::new(1)).date_naive().and_time(boundary).and_utc()
}

/// The next time of day at `boundary`: today if it's still ahead, otherwise
/// tomorrow.
#[must_use]
pub fn next_boundary(now: DateTime<Utc>, boundary: NaiveTime) -> DateTime<Utc> {
    let today = now.date_naive().and_time(boundary).and_utc();
    if today > now {
        today
    } else {
        next_round_time(now, boundary)
    }
}

/// The next `weekday` strictly after today, at `boundary`, UTC.
#[must_use]
pub fn next_tournament_start(
    now: DateTime<Utc>,
    weekday: Weekday,
    boundary: NaiveTime,
) -> DateTime<Utc> {
    let today = now.weekday().num_days_from_monday();
    let mut days = (weekday.num_days_from_monday() + 7 - today) % 7;
    if days == 0 {
        days = 7;
    }

    (now + Days::new(u64::from(days)))
        .date_naive()
        .and_time(boundary)
        .and_utc()
}

/// How long to sleep from `now` until `then`, zero if `then` has passed.
#[must_use]
pub fn until(now: DateTime<Utc>, then: DateTime<Utc>) -> Duration {
    then.signed_duration_since(now)
        .to_std()
        .unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn next_round_is_tomorrow_at_the_boundary() -> anyhow::Result<()> {
        let now = Utc
            .with_ymd_and_hms(2026, 3, 10, 17, 45, 3)
            .single()
            .ok_or_else(|| anyhow::Error::msg("bad date"))?;

        let next = next_round_time(now, NaiveTime::MIN);
        assert_eq!(next.to_rfc3339(), "2026-03-11T00:00:00+00:00");

        let boundary =
            NaiveTime::from_hms_opt(6, 30, 0).ok_or_else(|| anyhow::Error::msg("bad time"))?;
        let next = next_round_time(now, boundary);
        assert_eq!(next.to_rfc3339(), "2026-03-11T06:30:00+00:00");
        Ok(())
    }

    #[test]
    fn next_boundary_can_be_today() -> anyhow::Result<()> {
        let boundary =
            NaiveTime::from_hms_opt(6, 0, 0).ok_or_else(|| anyhow::Error::msg("bad time"))?;
        let before = Utc
            .with_ymd_and_hms(2026, 3, 10, 3, 0, 0)
            .single()
            .ok_or_else(|| anyhow::Error::msg("bad date"))?;
        let after = Utc
            .with_ymd_and_hms(2026, 3, 10, 6, 0, 0)
            .single()
            .ok_or_else(|| anyhow::Error::msg("bad date"))?;

        assert_eq!(
            next_boundary(before, boundary).to_rfc3339(),
            "2026-03-10T06:00:00+00:00"
        );
        assert_eq!(
            next_boundary(after, boundary).to_rfc3339(),
            "2026-03-11T06:00:00+00:00"
        );
        assert_eq!(
            next_round_time(before, boundary).to_rfc3339(),
            "2026-03-11T06:00:00+00:00"
        );
        Ok(())
    }

    #[test]
    fn next_start_skips_today() -> anyhow::Result<()> {
        // A Friday.
        let friday = Utc
            .with_ymd_and_hms(2026, 3, 13, 12, 0, 0)
            .single()
            .ok_or_else(|| anyhow::Error::msg("bad date"))?;

        let next = next_tournament_start(friday, Weekday::Fri, NaiveTime::MIN);
        assert_eq!(next.to_rfc3339(), "2026-03-20T00:00:00+00:00");

        let next = next_tournament_start(friday, Weekday::Sun, NaiveTime::MIN);
        assert_eq!(next.to_rfc3339(), "2026-03-15T00:00:00+00:00");

        let next = next_tournament_start(friday, Weekday::Thu, NaiveTime::MIN);
        assert_eq!(next.to_rfc3339(), "2026-03-19T00:00:00+00:00");
        Ok(())
    }

    #[test]
    fn until_never_goes_negative() {
        let now = Utc::now();
        assert_eq!(until(now, now - Days::new(1)), Duration::ZERO);
        assert!(until(now, next_round_time(now, NaiveTime::MIN)) > Duration::ZERO);
    }
}
