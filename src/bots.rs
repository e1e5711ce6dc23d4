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

use log::{debug, warn};
use rand::{Rng, seq::SliceRandom};

use crate::{
    CharType, MatchId,
    cards,
    placement::Placement,
    rating::Outcome,
    status::Status,
    tournament::{Tournament, TournamentError, selection_count},
};

impl Tournament {
    /// Plays the round for every bot of a group still in progress: picks
    /// cards, lays out a defense and settles the matches the bots attack in.
    ///
    /// Returns how many bot matches were settled.
    ///
    /// # Errors
    ///
    /// If a bot or its group has gone missing.
    pub fn play_bot_moves<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        card_pool: &[CharType],
    ) -> Result<usize, TournamentError> {
        let bots: Vec<_> = self
            .members
            .values()
            .filter(|member| member.bot && !member.eliminated && self.in_progress(member.group))
            .map(|member| (member.id, member.user, member.group))
            .collect();

        for (id, user, group) in bots {
            let round = self
                .groups
                .get(&group)
                .ok_or(TournamentError::UnknownGroup(group))?
                .round;

            for char_type in cards::draw(card_pool, selection_count(round), rng) {
                self.add_character(user, char_type);
            }

            let mut team = self.team(user).to_vec();
            team.shuffle(rng);

            if team.len() < 2 {
                warn!("play_bot_moves: bot {user} has {} characters, skipping", team.len());
                continue;
            }

            let bot = self.member_mut(id)?;
            bot.placement = Placement::from_team(&team);
            bot.has_picked = true;
        }

        let matches: Vec<MatchId> = self
            .matches
            .values()
            .filter(|game| {
                game.status == Status::Pending
                    && self.in_progress(game.group)
                    && self
                        .members
                        .get(&game.attacker)
                        .is_some_and(|attacker| attacker.bot)
            })
            .map(|game| game.id)
            .collect();

        for id in &matches {
            self.resolve_match(*id, Outcome::from(rng.random_bool(0.5)))?;
        }

        debug!("play_bot_moves: {} bot matches", matches.len());
        Ok(matches.len())
    }
}
