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

//! The player-facing operations.
//!
//! Every operation checks everything it needs before it writes, so a
//! rejected request leaves the tournament as it was.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    CharType, CharacterId, MatchId, UserId,
    accounts::Profiles,
    cards::{self, HAND_SIZES},
    placement::Placement,
    rating::Outcome,
    role::Role,
    settings::Settings,
    status::Status,
    time::{Clock, next_tournament_start},
    tournament::{Group, Member, Record, Tournament, TournamentError, selection_count},
};

/// One line of a group table.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Entry {
    pub user: UserId,
    pub name: String,
    pub rating: i64,
    pub tourney_rating: i64,
    pub record: Record,
    pub eliminated: bool,
}

impl Entry {
    fn new<P: Profiles + ?Sized>(member: &Member, profiles: &P) -> Self {
        Self {
            user: member.user,
            name: profiles.username(member.user),
            rating: profiles.rating(member.user),
            tourney_rating: profiles.tourney_rating(member.user),
            record: member.record,
            eliminated: member.eliminated,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum StatusView {
    Competing {
        group: Group,
        group_list: Vec<Entry>,
        me: Box<Member>,
    },
    Waiting {
        next_start: DateTime<Utc>,
    },
    NotRegistered {
        next_start: DateTime<Utc>,
    },
}

/// A match the caller still has to attack in.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Fight {
    pub id: MatchId,
    pub defender: Entry,
    pub placement: Placement,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub round: u32,
    pub opponent: Entry,
    pub role: Role,
    pub won: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SelfView {
    pub name: String,
    pub tourney_rating: i64,
    pub placement: Placement,
}

impl Tournament {
    /// Queues the user for the next bracket.
    ///
    /// # Errors
    ///
    /// If the user is already queued.
    pub fn register(&mut self, user: UserId) -> Result<(), TournamentError> {
        if self.is_registered(user) {
            return Err(TournamentError::AlreadyRegistered);
        }

        self.registrations.push(user);
        Ok(())
    }

    /// The user's selection hand, drawing a new one of `num_cards` cards if
    /// they don't hold one.
    ///
    /// # Errors
    ///
    /// If `num_cards` isn't one of [`HAND_SIZES`].
    pub fn get_cards<R: Rng + ?Sized>(
        &mut self,
        user: UserId,
        num_cards: usize,
        rng: &mut R,
        card_pool: &[CharType],
    ) -> Result<Vec<CharType>, TournamentError> {
        if !HAND_SIZES.contains(&num_cards) {
            return Err(TournamentError::InvalidCardCount);
        }

        let hand = self
            .selection_cards
            .entry(user)
            .or_insert_with(|| cards::draw(card_pool, num_cards, rng));

        Ok(hand.clone())
    }

    /// Turns picked cards from the user's hand into team characters.
    ///
    /// The first pick of a round is two cards in the first two rounds and one
    /// after that. Picking again spends a redraw credit and takes one card.
    ///
    /// # Errors
    ///
    /// If the user isn't competing, has nothing left to pick, picks the wrong
    /// number of cards or a card they don't hold.
    pub fn pick_cards(
        &mut self,
        user: UserId,
        picked: &[CharType],
    ) -> Result<Vec<CharacterId>, TournamentError> {
        let member = self.member_of(user).ok_or(TournamentError::NotCompeting)?;
        let (id, redraw) = (member.id, member.has_picked);

        if redraw && member.rewards_left == 0 {
            return Err(TournamentError::AlreadyPicked);
        }

        let round = self
            .groups
            .get(&member.group)
            .ok_or(TournamentError::UnknownGroup(member.group))?
            .round;
        let expected = if redraw { 1 } else { selection_count(round) };
        if picked.len() != expected {
            return Err(TournamentError::InvalidSelectionCount);
        }

        let hand = self
            .selection_cards
            .get(&user)
            .ok_or(TournamentError::InvalidSelection)?;
        if cards::take(hand, picked).is_none() {
            return Err(TournamentError::InvalidSelection);
        }

        let member = self.member_mut(id)?;
        if redraw {
            member.rewards_left -= 1;
        } else {
            member.has_picked = true;
        }

        self.selection_cards.remove(&user);
        Ok(picked
            .iter()
            .map(|char_type| self.add_character(user, *char_type))
            .collect())
    }

    /// Replaces the user's defensive layout.
    ///
    /// # Errors
    ///
    /// If the user isn't competing or a character isn't on their team.
    pub fn set_defense(
        &mut self,
        user: UserId,
        placement: Placement,
    ) -> Result<(), TournamentError> {
        let id = self.member_id_of(user)?;

        let team = self.team(user);
        if let Some(character) = placement
            .characters()
            .find(|character| !team.contains(character))
        {
            return Err(TournamentError::NotOnTeam(character));
        }

        self.member_mut(id)?.placement = placement;
        Ok(())
    }

    /// Records the result of the user's attack on `opponent` in the round
    /// being played.
    ///
    /// # Errors
    ///
    /// If the user can't fight or there is no pending match between them.
    pub fn report_result(
        &mut self,
        user: UserId,
        opponent: UserId,
        outcome: Outcome,
    ) -> Result<MatchId, TournamentError> {
        let member = self.member_of(user).ok_or(TournamentError::NotCompeting)?;
        if member.eliminated {
            return Err(TournamentError::Eliminated);
        }
        if member.fights_left == 0 {
            return Err(TournamentError::NoFightsLeft);
        }

        let attacker = member.id;
        let group = member.group;
        let round = self
            .groups
            .get(&group)
            .ok_or(TournamentError::UnknownGroup(group))?
            .round
            .saturating_sub(1);
        let defender = self
            .group_members(group)
            .into_iter()
            .find(|member| member.user == opponent)
            .ok_or(TournamentError::MatchNotFound)?
            .id;

        let mut candidates = self.matches.values().filter(|game| {
            game.round == round && game.attacker == attacker && game.defender == defender
        });
        let game = match candidates.clone().find(|game| !game.status.has_played()) {
            Some(game) => game.id,
            None if candidates.next().is_some() => return Err(TournamentError::MatchResolved),
            None => return Err(TournamentError::MatchNotFound),
        };

        self.resolve_match(game, outcome)?;
        self.member_mut(attacker)?.fights_left -= 1;

        Ok(game)
    }

    /// Adds redraw credits to a competing user.
    ///
    /// # Errors
    ///
    /// If the user isn't competing.
    pub fn grant_rewards(&mut self, user: UserId, credits: u32) -> Result<u32, TournamentError> {
        let id = self.member_id_of(user)?;
        let member = self.member_mut(id)?;
        member.rewards_left = member.rewards_left.saturating_add(credits);

        Ok(member.rewards_left)
    }

    #[must_use]
    pub fn status<P: Profiles + ?Sized, C: Clock + ?Sized>(
        &self,
        user: UserId,
        profiles: &P,
        clock: &C,
        settings: &Settings,
    ) -> StatusView {
        let Some(me) = self.member_of(user) else {
            let next_start =
                next_tournament_start(clock.now(), settings.start_weekday, settings.round_boundary);

            return if self.is_registered(user) {
                StatusView::Waiting { next_start }
            } else {
                StatusView::NotRegistered { next_start }
            };
        };

        let mut members = self.group_members(me.group);
        members.sort_by_key(|member| (Reverse(member.eliminated), Reverse(member.record.wins)));

        match self.groups.get(&me.group) {
            Some(group) => StatusView::Competing {
                group: group.clone(),
                group_list: members
                    .into_iter()
                    .map(|member| Entry::new(member, profiles))
                    .collect(),
                me: Box::new(me.clone()),
            },
            None => StatusView::NotRegistered {
                next_start: next_tournament_start(
                    clock.now(),
                    settings.start_weekday,
                    settings.round_boundary,
                ),
            },
        }
    }

    /// The user's pending attacks in the round being played.
    ///
    /// # Errors
    ///
    /// If the user isn't competing.
    pub fn fights<P: Profiles + ?Sized>(
        &self,
        user: UserId,
        profiles: &P,
    ) -> Result<Vec<Fight>, TournamentError> {
        let me = self.member_of(user).ok_or(TournamentError::NotCompeting)?;
        let round = self
            .groups
            .get(&me.group)
            .ok_or(TournamentError::UnknownGroup(me.group))?
            .round
            .saturating_sub(1);

        let mut fights = Vec::new();
        for game in self.matches.values().filter(|game| {
            game.attacker == me.id && game.round == round && game.status == Status::Pending
        }) {
            let defender = self
                .members
                .get(&game.defender)
                .ok_or(TournamentError::UnknownMember(game.defender))?;

            fights.push(Fight {
                id: game.id,
                defender: Entry::new(defender, profiles),
                placement: defender.placement.clone(),
            });
        }

        Ok(fights)
    }

    /// The user's played matches, latest round first.
    ///
    /// # Errors
    ///
    /// If the user isn't competing.
    pub fn match_history<P: Profiles + ?Sized>(
        &self,
        user: UserId,
        profiles: &P,
    ) -> Result<Vec<HistoryEntry>, TournamentError> {
        let me = self.member_of(user).ok_or(TournamentError::NotCompeting)?;

        let mut history = Vec::new();
        for game in self.matches.values() {
            let Some(attacker_won) = game.status.is_win() else {
                continue;
            };
            let (role, opponent) = if game.attacker == me.id {
                (Role::Attacker, game.defender)
            } else if game.defender == me.id {
                (Role::Defender, game.attacker)
            } else {
                continue;
            };
            let opponent = self
                .members
                .get(&opponent)
                .ok_or(TournamentError::UnknownMember(opponent))?;

            history.push(HistoryEntry {
                round: game.round,
                opponent: Entry::new(opponent, profiles),
                role,
                won: attacker_won == (role == Role::Attacker),
            });
        }
        history.sort_by_key(|entry| Reverse(entry.round));

        Ok(history)
    }

    /// # Errors
    ///
    /// If the user isn't competing.
    pub fn me<P: Profiles + ?Sized>(
        &self,
        user: UserId,
        profiles: &P,
    ) -> Result<SelfView, TournamentError> {
        let me = self.member_of(user).ok_or(TournamentError::NotCompeting)?;

        Ok(SelfView {
            name: profiles.username(user),
            tourney_rating: profiles.tourney_rating(user),
            placement: me.placement.clone(),
        })
    }
}
