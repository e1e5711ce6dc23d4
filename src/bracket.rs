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

use std::cmp::Reverse;

use log::{debug, info, warn};

use crate::{
    GroupId,
    accounts::Profiles,
    roster::BotRoster,
    settings::Settings,
    time::{Clock, next_round_time},
    tournament::{GROUP_SIZE, Group, Member, Tournament, TournamentError},
};

impl Tournament {
    /// Seeds the registered users into groups of [`GROUP_SIZE`] by regular
    /// rating, highest first, and pads the last group with bots.
    ///
    /// Users with equal ratings keep their registration order. The
    /// registration queue is emptied.
    ///
    /// # Errors
    ///
    /// If a tournament is already running or the roster runs out of bots.
    pub fn build_bracket<P: Profiles + ?Sized, C: Clock + ?Sized>(
        &mut self,
        profiles: &P,
        roster: &mut BotRoster,
        clock: &C,
        settings: &Settings,
    ) -> Result<Vec<GroupId>, TournamentError> {
        if self.is_running() {
            return Err(TournamentError::Running);
        }

        let mut users = Vec::new();
        for user in self.registrations.drain(..) {
            if roster.contains(user) {
                warn!("build_bracket: skipping registered bot {user}");
            } else {
                users.push(user);
            }
        }
        users.sort_by_key(|user| Reverse(profiles.rating(*user)));

        let round_expiration = next_round_time(clock.now(), settings.round_boundary);
        let mut groups = Vec::new();

        for chunk in users.chunks(GROUP_SIZE) {
            let group = self.next_id();
            self.groups.insert(
                group,
                Group {
                    id: group,
                    round: 1,
                    round_expiration,
                    finalized: false,
                },
            );

            for user in chunk {
                let id = self.next_id();
                self.members.insert(id, Member::new(id, *user, group, false));
            }

            for _ in chunk.len()..GROUP_SIZE {
                let bot = roster.allocate()?;
                let id = self.next_id();
                self.members.insert(id, Member::new(id, bot, group, true));
                debug!("build_bracket: group {group} padded with bot {bot}");
            }

            groups.push(group);
        }

        info!(
            "build_bracket: {} players in {} groups, {} bots left",
            users.len(),
            groups.len(),
            roster.remaining()
        );

        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{accounts::Accounts, time::FixedClock};

    fn accounts(ratings: &[(u64, i64)]) -> Accounts {
        let mut accounts = Accounts::default();
        for (user, elo) in ratings {
            accounts.0.entry(*user).or_default().elo = *elo;
        }
        accounts
    }

    #[test]
    fn equal_ratings_keep_registration_order() -> anyhow::Result<()> {
        let profiles = accounts(&[(1, 1000), (2, 1300), (3, 1000), (4, 1300)]);
        let settings = Settings::default();
        let mut roster = settings.roster();
        let mut tournament = Tournament::default();
        tournament.registrations = vec![1, 2, 3, 4];

        tournament.build_bracket(&profiles, &mut roster, &FixedClock(Utc::now()), &settings)?;

        let users: Vec<_> = tournament.members.values().map(|member| member.user).collect();
        assert_eq!(users, vec![2, 4, 1, 3, 33, 32, 31, 30]);
        assert_eq!(
            tournament.members.values().filter(|member| member.bot).count(),
            4
        );
        assert!(tournament.registrations.is_empty());
        Ok(())
    }

    #[test]
    fn nobody_registered_is_no_groups() -> anyhow::Result<()> {
        let settings = Settings::default();
        let mut tournament = Tournament::default();

        let groups = tournament.build_bracket(
            &Accounts::default(),
            &mut settings.roster(),
            &FixedClock(Utc::now()),
            &settings,
        )?;

        assert!(groups.is_empty());
        assert!(!tournament.is_running());
        Ok(())
    }

    #[test]
    fn registered_bots_are_skipped() -> anyhow::Result<()> {
        let settings = Settings::default();
        let mut tournament = Tournament::default();
        tournament.registrations = (1..=7).chain([33]).collect();

        tournament.build_bracket(
            &Accounts::default(),
            &mut settings.roster(),
            &FixedClock(Utc::now()),
            &settings,
        )?;

        let bots: Vec<_> = tournament
            .members
            .values()
            .filter(|member| member.bot)
            .map(|member| member.user)
            .collect();
        assert_eq!(bots, vec![33]);
        Ok(())
    }

    #[test]
    fn building_twice_is_rejected() -> anyhow::Result<()> {
        let settings = Settings::default();
        let clock = FixedClock(Utc::now());
        let mut tournament = Tournament::default();
        tournament.registrations = vec![1];

        tournament.build_bracket(&Accounts::default(), &mut settings.roster(), &clock, &settings)?;
        tournament.registrations.push(2);

        assert_eq!(
            tournament.build_bracket(
                &Accounts::default(),
                &mut settings.roster(),
                &clock,
                &settings
            ),
            Err(TournamentError::Running)
        );
        assert_eq!(tournament.registrations, vec![2]);
        Ok(())
    }

    #[test]
    fn a_small_roster_is_an_error() {
        let settings = Settings {
            bots: vec![27, 28],
            ..Settings::default()
        };
        let mut tournament = Tournament::default();
        tournament.registrations = vec![1];

        let result = tournament.build_bracket(
            &Accounts::default(),
            &mut settings.roster(),
            &FixedClock(Utc::now()),
            &settings,
        );
        assert!(matches!(result, Err(TournamentError::Roster(_))));
    }
}
