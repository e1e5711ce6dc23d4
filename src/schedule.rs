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

//! Pairings for one round of a group.

use thiserror::Error;

/// Opponents each index attacks in a group of six.
const SIX_DEFENDERS: [[usize; 3]; 6] = [
    [1, 2, 3],
    [0, 2, 4],
    [0, 1, 5],
    [0, 4, 5],
    [1, 3, 5],
    [2, 3, 4],
];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Topology {
    /// Everyone attacks everyone: 12 matches.
    Four,
    /// Everyone attacks three opponents: 18 matches.
    Six,
}

#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
#[error("schedule: no pairing topology for {0} members")]
pub struct UnsupportedGroupSize(pub usize);

impl TryFrom<usize> for Topology {
    type Error = UnsupportedGroupSize;

    fn try_from(size: usize) -> Result<Self, Self::Error> {
        match size {
            4 => Ok(Self::Four),
            6 => Ok(Self::Six),
            size => Err(UnsupportedGroupSize(size)),
        }
    }
}

impl Topology {
    /// `(attacker, defender)` index pairs.
    #[must_use]
    pub fn pairings(self) -> Vec<(usize, usize)> {
        match self {
            Self::Four => (0..4)
                .flat_map(|attacker| {
                    (0..4)
                        .filter(move |defender| *defender != attacker)
                        .map(move |defender| (attacker, defender))
                })
                .collect(),
            Self::Six => SIX_DEFENDERS
                .iter()
                .enumerate()
                .flat_map(|(attacker, defenders)| {
                    defenders.iter().map(move |defender| (attacker, *defender))
                })
                .collect(),
        }
    }
}

/// Directed matches between `members`, as `(attacker, defender)`.
///
/// # Errors
///
/// If there is no topology for the number of members.
pub fn make_matches<T: Copy>(members: &[T]) -> Result<Vec<(T, T)>, UnsupportedGroupSize> {
    let topology = Topology::try_from(members.len())?;

    Ok(topology
        .pairings()
        .into_iter()
        .filter_map(|(attacker, defender)| Some((*members.get(attacker)?, *members.get(defender)?)))
        .collect())
}
