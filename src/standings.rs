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

use log::debug;

use crate::{
    GroupId,
    accounts::Profiles,
    rating::tourney_rating,
    round::RoundError,
    tournament::{Standing, Tournament, TournamentError},
};

impl Tournament {
    /// Ranks a group by wins and works out everyone's new tournament rating
    /// against the group's mean. The group is marked finalized; the ratings
    /// are only returned, not written.
    ///
    /// # Errors
    ///
    /// If the group is unknown or was already finalized.
    #[allow(clippy::cast_precision_loss)]
    pub fn finalize_group<P: Profiles + ?Sized>(
        &mut self,
        group: GroupId,
        profiles: &P,
        k: f64,
    ) -> Result<Vec<Standing>, RoundError> {
        let finalized = self
            .groups
            .get(&group)
            .ok_or(TournamentError::UnknownGroup(group))?
            .finalized;
        if finalized {
            return Err(RoundError::Finalized(group));
        }

        let mut members: Vec<_> = self
            .group_members(group)
            .into_iter()
            .map(|member| (member.id, member.user, member.record.wins))
            .collect();
        members.sort_by_key(|(_, _, wins)| Reverse(*wins));

        let ratings: Vec<i64> = members
            .iter()
            .map(|(_, user, _)| profiles.tourney_rating(*user))
            .collect();
        let mean = if ratings.is_empty() {
            0.0
        } else {
            ratings.iter().sum::<i64>() as f64 / ratings.len() as f64
        };

        let mut standings = Vec::new();
        for (place, ((member, user, _), previous_rating)) in
            members.into_iter().zip(ratings).enumerate()
        {
            let rating = tourney_rating(previous_rating, mean, place, k)?;
            debug!(
                "finalize_group: group {group} place {place} user {user}: {previous_rating} -> {rating}"
            );

            standings.push(Standing {
                member,
                user,
                place,
                previous_rating,
                rating,
            });
        }

        if let Some(entry) = self.groups.get_mut(&group) {
            entry.finalized = true;
        }

        Ok(standings)
    }
}

/// Writes final standings to the profile store.
pub fn apply_standings<'a, P: Profiles + ?Sized>(
    profiles: &mut P,
    standings: impl IntoIterator<Item = &'a Standing>,
) {
    for standing in standings {
        profiles.set_tourney_rating(standing.user, standing.rating);
    }
}
