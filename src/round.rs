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

//! The daily round advance.
//!
//! A pass settles whatever the last round left open, knocks out the members
//! with the most losses and draws the next round's matches. It runs on a copy
//! of the tournament and is only swapped in if every group went through.

use std::{cmp::Reverse, collections::BTreeMap, fmt};

use log::{debug, error, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    GroupId, MemberId,
    accounts::Profiles,
    rating::{Outcome, RatingError},
    schedule::{UnsupportedGroupSize, make_matches},
    settings::Settings,
    standings::apply_standings,
    status::Status,
    time::{Clock, next_round_time},
    tournament::{
        ELIMINATIONS_PER_ROUND, FIGHTS_PER_ROUND, FINAL_ROUND, FIRST_ELIMINATION_ROUND, Standing,
        Tournament, TournamentError,
    },
};

#[derive(Clone, Debug, Error, PartialEq)]
pub enum RoundError {
    #[error("round: group {0} is already finalized")]
    Finalized(GroupId),
    #[error(transparent)]
    Rating(#[from] RatingError),
    #[error(transparent)]
    Schedule(#[from] UnsupportedGroupSize),
    #[error(transparent)]
    Tournament(#[from] TournamentError),
}

/// What a pass did.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct RoundReport {
    pub groups: usize,
    pub bot_matches: usize,
    pub forfeits: usize,
    pub eliminated: Vec<MemberId>,
    pub new_matches: usize,
    pub standings: BTreeMap<GroupId, Vec<Standing>>,
}

impl fmt::Display for RoundReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "groups: {}, bot matches: {}, forfeits: {}, eliminated: {}, new matches: {}, finalized: {}",
            self.groups,
            self.bot_matches,
            self.forfeits,
            self.eliminated.len(),
            self.new_matches,
            self.standings.len(),
        )
    }
}

impl RoundReport {
    fn apply<P: Profiles + ?Sized>(&self, profiles: &mut P) {
        apply_standings(profiles, self.standings.values().flatten());
    }
}

impl Tournament {
    /// Runs one round pass over every group still in progress.
    ///
    /// The new tournament ratings are written to `profiles` once the pass has
    /// gone through.
    ///
    /// # Errors
    ///
    /// If any group fails, in which case nothing changes.
    pub fn advance_round<P, R, C>(
        &mut self,
        profiles: &mut P,
        rng: &mut R,
        clock: &C,
        settings: &Settings,
    ) -> Result<RoundReport, RoundError>
    where
        P: Profiles + ?Sized,
        R: Rng + ?Sized,
        C: Clock + ?Sized,
    {
        let mut next = self.clone();
        let report = next
            .pass(&*profiles, rng, clock, settings)
            .inspect_err(|err| error!("advance_round: {err}"))?;

        *self = next;
        report.apply(profiles);
        info!("advance_round: {report}");

        Ok(report)
    }

    /// Builds a bracket from the registrations and seeds its first round.
    ///
    /// # Errors
    ///
    /// If the bracket can't be built or the first pass fails, in which case
    /// nothing changes.
    pub fn setup<P, R, C>(
        &mut self,
        profiles: &mut P,
        rng: &mut R,
        clock: &C,
        settings: &Settings,
    ) -> Result<RoundReport, RoundError>
    where
        P: Profiles + ?Sized,
        R: Rng + ?Sized,
        C: Clock + ?Sized,
    {
        let mut next = self.clone();
        let mut roster = settings.roster();

        let report = next
            .build_bracket(&*profiles, &mut roster, clock, settings)
            .map_err(RoundError::from)
            .and_then(|_| next.pass(&*profiles, rng, clock, settings))
            .inspect_err(|err| error!("setup: {err}"))?;

        *self = next;
        report.apply(profiles);
        info!("setup: {report}");

        Ok(report)
    }

    fn pass<P, R, C>(
        &mut self,
        profiles: &P,
        rng: &mut R,
        clock: &C,
        settings: &Settings,
    ) -> Result<RoundReport, RoundError>
    where
        P: Profiles + ?Sized,
        R: Rng + ?Sized,
        C: Clock + ?Sized,
    {
        let mut report = RoundReport {
            bot_matches: self.play_bot_moves(rng, &settings.card_pool)?,
            forfeits: self.forfeit_pending()?,
            ..RoundReport::default()
        };

        let round_expiration = next_round_time(clock.now(), settings.round_boundary);
        let groups: Vec<GroupId> = self
            .groups
            .values()
            .filter(|group| !group.finalized)
            .map(|group| group.id)
            .collect();

        for group in groups {
            let round = self
                .groups
                .get(&group)
                .ok_or(TournamentError::UnknownGroup(group))?
                .round;

            let mut ranked: Vec<_> = self
                .group_members(group)
                .into_iter()
                .filter(|member| !member.eliminated)
                .map(|member| (member.id, member.record.losses))
                .collect();
            ranked.sort_by_key(|(_, losses)| Reverse(*losses));
            let ranked: Vec<MemberId> = ranked.into_iter().map(|(id, _)| id).collect();

            let eliminated = if round >= FIRST_ELIMINATION_ROUND {
                ranked.len().min(ELIMINATIONS_PER_ROUND)
            } else {
                0
            };
            for id in ranked.iter().take(eliminated) {
                self.member_mut(*id)?.eliminated = true;
                report.eliminated.push(*id);
            }

            let mut pairs = Vec::new();
            match round {
                1 | 2 => {
                    pairs.extend(make_matches(ranked.get(4..).unwrap_or(&[]))?);
                    pairs.extend(make_matches(ranked.get(..4).unwrap_or(&[]))?);
                }
                round if round < FINAL_ROUND => {
                    pairs.extend(make_matches(ranked.get(eliminated..).unwrap_or(&[]))?);
                }
                _ => {
                    let standings =
                        self.finalize_group(group, profiles, settings.tourney_k_factor)?;
                    report.standings.insert(group, standings);
                }
            }

            report.new_matches += pairs.len();
            for (attacker, defender) in pairs {
                self.add_match(group, round, attacker, defender);
            }

            let members: Vec<MemberId> = self
                .group_members(group)
                .into_iter()
                .map(|member| member.id)
                .collect();
            for id in members {
                let member = self.member_mut(id)?;
                if member.eliminated {
                    member.fights_left = 0;
                } else {
                    member.has_picked = false;
                    member.fights_left = FIGHTS_PER_ROUND;
                }
            }

            if let Some(entry) = self.groups.get_mut(&group) {
                entry.round += 1;
                entry.round_expiration = round_expiration;
            }

            debug!("pass: group {group} round {round} done, {eliminated} eliminated");
            report.groups += 1;
        }

        Ok(report)
    }

    /// Every match still pending counts as a loss for its attacker.
    fn forfeit_pending(&mut self) -> Result<usize, TournamentError> {
        let pending: Vec<_> = self
            .matches
            .values()
            .filter(|game| game.status == Status::Pending && self.in_progress(game.group))
            .map(|game| game.id)
            .collect();

        for id in &pending {
            self.resolve_match(*id, Outcome::Loss)?;
        }

        Ok(pending.len())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{
        accounts::Accounts,
        time::FixedClock,
        tournament::{Group, Member},
    };

    /// A round three group whose members have the given loss counts, in
    /// seeding order.
    fn round_three(losses: [u32; 8]) -> (Tournament, Vec<MemberId>) {
        let mut tournament = Tournament::default();
        let group = tournament.next_id();
        tournament.groups.insert(
            group,
            Group {
                id: group,
                round: 3,
                round_expiration: Utc::now(),
                finalized: false,
            },
        );

        let mut ids = Vec::new();
        for (user, losses) in (100..).zip(losses) {
            let id = tournament.next_id();
            let mut member = Member::new(id, user, group, false);
            member.record.losses = losses;
            tournament.members.insert(id, member);
            ids.push(id);
        }

        (tournament, ids)
    }

    #[test]
    fn most_losses_are_eliminated_ties_by_seeding() -> anyhow::Result<()> {
        let (mut tournament, ids) = round_three([1, 4, 2, 3, 3, 0, 1, 2]);
        let mut accounts = Accounts::default();
        let mut rng = StdRng::seed_from_u64(5);

        let report = tournament.advance_round(
            &mut accounts,
            &mut rng,
            &FixedClock(Utc::now()),
            &Settings::default(),
        )?;

        // The fourth and fifth seeds tie on three losses; the fourth goes.
        assert_eq!(report.eliminated, vec![ids[1], ids[3]]);
        assert_eq!(report.new_matches, 18);
        assert!(tournament.members[&ids[1]].eliminated);
        assert!(tournament.members[&ids[3]].eliminated);
        assert!(!tournament.members[&ids[4]].eliminated);
        assert_eq!(tournament.members[&ids[3]].fights_left, 0);

        let ranked = [ids[4], ids[2], ids[7], ids[0], ids[6], ids[5]];
        let pairs: Vec<_> = tournament
            .matches
            .values()
            .map(|game| (game.attacker, game.defender))
            .collect();
        assert_eq!(pairs, make_matches(&ranked)?);
        assert!(tournament.matches.values().all(|game| game.round == 3));
        assert_eq!(tournament.groups.values().next().map(|group| group.round), Some(4));
        Ok(())
    }
}
