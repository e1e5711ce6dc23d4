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

//! The tournament state.
//!
//! Every entity is a plain value addressed by id. A [`Group`] is one bracket
//! of eight [`Member`]s, a [`Match`] is one attack of a member on another, and
//! [`Character`]s are the tournament-only units picked from cards.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    CharType, CharacterId, GroupId, Id, MatchId, MemberId, UserId,
    placement::{Placement, PlacementError},
    rating::Outcome,
    roster::RosterError,
    status::Status,
};

pub const GROUP_SIZE: usize = 8;
pub const FIGHTS_PER_ROUND: u32 = 3;
pub const FINAL_ROUND: u32 = 5;
pub const FIRST_ELIMINATION_ROUND: u32 = 3;
pub const ELIMINATIONS_PER_ROUND: usize = 2;

/// How many cards make up the first pick of a round.
#[must_use]
pub fn selection_count(round: u32) -> usize {
    if round <= 2 { 2 } else { 1 }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum TournamentError {
    #[error("not competing in current tournament")]
    NotCompeting,
    #[error("eliminated from current tournament")]
    Eliminated,
    #[error("no fights left")]
    NoFightsLeft,
    #[error("already registered for next tournament")]
    AlreadyRegistered,
    #[error("already picked cards")]
    AlreadyPicked,
    #[error("invalid number of selected cards")]
    InvalidSelectionCount,
    #[error("invalid card selection")]
    InvalidSelection,
    #[error("invalid number of cards requested")]
    InvalidCardCount,
    #[error("character {0} is not on your team")]
    NotOnTeam(CharacterId),
    #[error("match not found")]
    MatchNotFound,
    #[error("match already resolved")]
    MatchResolved,
    #[error("tournament already running")]
    Running,
    #[error("unknown group {0}")]
    UnknownGroup(GroupId),
    #[error("unknown member {0}")]
    UnknownMember(MemberId),
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error(transparent)]
    Roster(#[from] RosterError),
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Record {
    pub wins: u32,
    pub losses: u32,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Group {
    pub id: GroupId,
    pub round: u32,
    pub round_expiration: DateTime<Utc>,
    /// Set once the final standings have been applied.
    #[serde(default)]
    pub finalized: bool,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Member {
    pub id: MemberId,
    pub user: UserId,
    pub group: GroupId,
    pub record: Record,
    pub has_picked: bool,
    /// Redraw credits.
    pub rewards_left: u32,
    pub fights_left: u32,
    pub eliminated: bool,
    pub placement: Placement,
    pub bot: bool,
}

impl Member {
    #[must_use]
    pub fn new(id: MemberId, user: UserId, group: GroupId, bot: bool) -> Self {
        Self {
            id,
            user,
            group,
            record: Record::default(),
            has_picked: false,
            rewards_left: 0,
            fights_left: FIGHTS_PER_ROUND,
            eliminated: false,
            placement: Placement::default(),
            bot,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Match {
    pub id: MatchId,
    pub group: GroupId,
    pub round: u32,
    pub attacker: MemberId,
    pub defender: MemberId,
    pub status: Status,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Character {
    pub id: CharacterId,
    pub owner: UserId,
    pub char_type: CharType,
}

/// A member's final place in a group and the rating change it earned.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Standing {
    pub member: MemberId,
    pub user: UserId,
    pub place: usize,
    pub previous_rating: i64,
    pub rating: i64,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Tournament {
    next_id: Id,
    /// Users waiting for the next bracket, in registration order.
    pub registrations: Vec<UserId>,
    pub groups: BTreeMap<GroupId, Group>,
    pub members: BTreeMap<MemberId, Member>,
    pub matches: BTreeMap<MatchId, Match>,
    pub characters: BTreeMap<CharacterId, Character>,
    pub teams: BTreeMap<UserId, Vec<CharacterId>>,
    pub selection_cards: BTreeMap<UserId, Vec<CharType>>,
}

impl Tournament {
    pub(crate) fn next_id(&mut self) -> Id {
        self.next_id += 1;
        self.next_id
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Whether the group exists and hasn't played its final round.
    #[must_use]
    pub fn in_progress(&self, group: GroupId) -> bool {
        self.groups.get(&group).is_some_and(|group| !group.finalized)
    }

    #[must_use]
    pub fn is_registered(&self, user: UserId) -> bool {
        self.registrations.contains(&user)
    }

    #[must_use]
    pub fn member_of(&self, user: UserId) -> Option<&Member> {
        self.members.values().find(|member| member.user == user)
    }

    pub(crate) fn member_id_of(&self, user: UserId) -> Result<MemberId, TournamentError> {
        self.member_of(user)
            .map(|member| member.id)
            .ok_or(TournamentError::NotCompeting)
    }

    pub(crate) fn member_mut(&mut self, id: MemberId) -> Result<&mut Member, TournamentError> {
        self.members
            .get_mut(&id)
            .ok_or(TournamentError::UnknownMember(id))
    }

    /// The members of a group in seeding order.
    #[must_use]
    pub fn group_members(&self, group: GroupId) -> Vec<&Member> {
        self.members
            .values()
            .filter(|member| member.group == group)
            .collect()
    }

    #[must_use]
    pub fn team(&self, user: UserId) -> &[CharacterId] {
        self.teams.get(&user).map_or(&[], Vec::as_slice)
    }

    pub(crate) fn add_character(&mut self, owner: UserId, char_type: CharType) -> CharacterId {
        let id = self.next_id();
        self.characters.insert(
            id,
            Character {
                id,
                owner,
                char_type,
            },
        );
        self.teams.entry(owner).or_default().push(id);
        id
    }

    pub(crate) fn add_match(
        &mut self,
        group: GroupId,
        round: u32,
        attacker: MemberId,
        defender: MemberId,
    ) -> MatchId {
        let id = self.next_id();
        self.matches.insert(
            id,
            Match {
                id,
                group,
                round,
                attacker,
                defender,
                status: Status::Pending,
            },
        );
        id
    }

    /// Resolves a pending match from the attacker's point of view and updates
    /// both records.
    ///
    /// # Errors
    ///
    /// If the match doesn't exist or has already been played.
    pub fn resolve_match(&mut self, id: MatchId, outcome: Outcome) -> Result<(), TournamentError> {
        let game = self
            .matches
            .get(&id)
            .ok_or(TournamentError::MatchNotFound)?;
        if game.status.has_played() {
            return Err(TournamentError::MatchResolved);
        }
        let (attacker, defender) = (game.attacker, game.defender);

        if !self.members.contains_key(&attacker) {
            return Err(TournamentError::UnknownMember(attacker));
        }
        if !self.members.contains_key(&defender) {
            return Err(TournamentError::UnknownMember(defender));
        }

        match outcome {
            Outcome::Win => {
                self.member_mut(attacker)?.record.wins += 1;
                self.member_mut(defender)?.record.losses += 1;
            }
            Outcome::Loss => {
                self.member_mut(attacker)?.record.losses += 1;
                self.member_mut(defender)?.record.wins += 1;
            }
        }

        if let Some(game) = self.matches.get_mut(&id) {
            game.status = Status::from_attacker(outcome);
        }

        Ok(())
    }

    /// Deletes the event, keeping the registrations for the next one.
    pub fn end_tournament(&mut self) {
        self.groups.clear();
        self.members.clear();
        self.matches.clear();
        self.characters.clear();
        self.teams.clear();
        self.selection_cards.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tournament_with_match() -> (Tournament, MatchId) {
        let mut tournament = Tournament::default();
        let group = tournament.next_id();
        let attacker = tournament.next_id();
        let defender = tournament.next_id();

        tournament
            .members
            .insert(attacker, Member::new(attacker, 100, group, false));
        tournament
            .members
            .insert(defender, Member::new(defender, 101, group, false));
        let game = tournament.add_match(group, 1, attacker, defender);

        (tournament, game)
    }

    #[test]
    fn selection_count_drops_after_round_two() {
        assert_eq!(selection_count(1), 2);
        assert_eq!(selection_count(2), 2);
        assert_eq!(selection_count(3), 1);
        assert_eq!(selection_count(5), 1);
    }

    #[test]
    fn resolving_updates_both_records_once() -> anyhow::Result<()> {
        let (mut tournament, game) = tournament_with_match();

        tournament.resolve_match(game, Outcome::Loss)?;
        assert_eq!(tournament.matches[&game].status, Status::DefenderWins);
        assert_eq!(
            tournament.resolve_match(game, Outcome::Win),
            Err(TournamentError::MatchResolved)
        );

        let attacker = tournament.member_of(100).map(|member| member.record);
        let defender = tournament.member_of(101).map(|member| member.record);
        assert_eq!(attacker, Some(Record { wins: 0, losses: 1 }));
        assert_eq!(defender, Some(Record { wins: 1, losses: 0 }));
        Ok(())
    }

    #[test]
    fn ending_keeps_registrations() {
        let (mut tournament, _) = tournament_with_match();
        tournament.registrations.push(7);
        tournament.add_character(100, 3);
        tournament.selection_cards.insert(101, vec![1, 2, 3]);

        tournament.end_tournament();

        assert!(!tournament.is_running());
        assert!(tournament.members.is_empty());
        assert!(tournament.matches.is_empty());
        assert!(tournament.characters.is_empty());
        assert!(tournament.teams.is_empty());
        assert!(tournament.selection_cards.is_empty());
        assert_eq!(tournament.registrations, vec![7]);
    }
}
