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

//! Defensive layouts.
//!
//! A layout has five slots. On the wire every slot is a `(position,
//! character)` pair where position `-1` means empty, and a slot is valid only
//! when both halves are set or both are empty. Inside the engine a slot is an
//! `Option<Slot>`, so an invalid pair can't be stored.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::CharacterId;

pub const SLOTS: usize = 5;
pub const EMPTY_POSITION: i32 = -1;

/// The board positions bots always defend from.
pub const BOT_POSITIONS: [u8; SLOTS] = [12, 13, 14, 15, 16];

pub type Pair = (i32, Option<CharacterId>);

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Slot {
    pub position: u8,
    pub character: CharacterId,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Placement {
    pub slots: [Option<Slot>; SLOTS],
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum PlacementError {
    #[error(
        "invalid slot {slot}: position {position} and character {character:?} must both be set or both be empty"
    )]
    Mismatch {
        slot: usize,
        position: i32,
        character: Option<CharacterId>,
    },
    #[error("invalid slot {slot}: position {position} is out of range")]
    Position { slot: usize, position: i32 },
    #[error("invalid defense: {0}")]
    Parse(String),
}

impl Placement {
    /// # Errors
    ///
    /// If a slot has only one of its position and character set, or the
    /// position doesn't fit on the board.
    pub fn from_pairs(pairs: &[Pair; SLOTS]) -> Result<Self, PlacementError> {
        let mut placement = Placement::default();

        for (slot, (&(position, character), stored)) in
            pairs.iter().zip(placement.slots.iter_mut()).enumerate()
        {
            *stored = match (position == EMPTY_POSITION, character) {
                (true, None) => None,
                (false, Some(character)) => {
                    let position = u8::try_from(position)
                        .map_err(|_| PlacementError::Position { slot, position })?;

                    Some(Slot {
                        position,
                        character,
                    })
                }
                _ => {
                    return Err(PlacementError::Mismatch {
                        slot,
                        position,
                        character,
                    });
                }
            };
        }

        Ok(placement)
    }

    /// Fills [`BOT_POSITIONS`] in order with the first five characters.
    #[must_use]
    pub fn from_team(team: &[CharacterId]) -> Self {
        let mut placement = Placement::default();

        for ((stored, position), character) in placement
            .slots
            .iter_mut()
            .zip(BOT_POSITIONS)
            .zip(team.iter().copied())
        {
            *stored = Some(Slot {
                position,
                character,
            });
        }

        placement
    }

    #[must_use]
    pub fn pairs(&self) -> [Pair; SLOTS] {
        self.slots.map(|slot| match slot {
            Some(slot) => (i32::from(slot.position), Some(slot.character)),
            None => (EMPTY_POSITION, None),
        })
    }

    pub fn characters(&self) -> impl Iterator<Item = CharacterId> + '_ {
        self.slots.iter().flatten().map(|slot| slot.character)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<_> = self
            .pairs()
            .iter()
            .map(|(position, character)| match character {
                Some(character) => format!("{position}:{character}"),
                None => format!("{position}:_"),
            })
            .collect();

        write!(f, "{}", pairs.join(" "))
    }
}

impl FromStr for Placement {
    type Err = PlacementError;

    /// Parses five `position:character` pairs, `-1:_` being an empty slot.
    fn from_str(string: &str) -> Result<Self, Self::Err> {
        let mut pairs = [(EMPTY_POSITION, None); SLOTS];
        let mut words = string.split_ascii_whitespace();

        for pair in &mut pairs {
            let Some(word) = words.next() else {
                return Err(PlacementError::Parse(format!(
                    "expected {SLOTS} slots in '{string}'"
                )));
            };
            let Some((position, character)) = word.split_once(':') else {
                return Err(PlacementError::Parse(format!("'{word}' is not position:character")));
            };

            let position = position
                .parse()
                .map_err(|error| PlacementError::Parse(format!("{word}: {error}")))?;
            let character = match character {
                "_" => None,
                character => Some(
                    character
                        .parse()
                        .map_err(|error| PlacementError::Parse(format!("{word}: {error}")))?,
                ),
            };

            *pair = (position, character);
        }

        if words.next().is_some() {
            return Err(PlacementError::Parse(format!(
                "more than {SLOTS} slots in '{string}'"
            )));
        }

        Placement::from_pairs(&pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_set_slots_are_rejected() {
        let pairs = [(12, Some(1)), (13, None), (-1, None), (-1, None), (-1, None)];
        assert_eq!(
            Placement::from_pairs(&pairs),
            Err(PlacementError::Mismatch {
                slot: 1,
                position: 13,
                character: None
            })
        );

        let pairs = [(-1, Some(4)), (-1, None), (-1, None), (-1, None), (-1, None)];
        assert!(Placement::from_pairs(&pairs).is_err());
    }

    #[test]
    fn negative_positions_other_than_empty_are_rejected() {
        let pairs = [(-7, Some(1)), (-1, None), (-1, None), (-1, None), (-1, None)];
        assert_eq!(
            Placement::from_pairs(&pairs),
            Err(PlacementError::Position {
                slot: 0,
                position: -7
            })
        );
    }

    #[test]
    fn pairs_survive_parsing() -> anyhow::Result<()> {
        let placement: Placement = "12:5 13:9 -1:_ 20:2 -1:_".parse()?;

        assert_eq!(
            placement.pairs(),
            [(12, Some(5)), (13, Some(9)), (-1, None), (20, Some(2)), (-1, None)]
        );
        assert_eq!(placement.to_string(), "12:5 13:9 -1:_ 20:2 -1:_");
        assert_eq!(placement.characters().collect::<Vec<_>>(), vec![5, 9, 2]);
        Ok(())
    }

    #[test]
    fn wrong_slot_count() {
        assert!("12:5 13:9".parse::<Placement>().is_err());
        assert!("12:5 13:9 -1:_ -1:_ -1:_ -1:_".parse::<Placement>().is_err());
    }

    #[test]
    fn bot_layout_uses_fixed_positions() {
        let placement = Placement::from_team(&[7, 8, 9]);

        assert_eq!(
            placement.pairs(),
            [(12, Some(7)), (13, Some(8)), (14, Some(9)), (-1, None), (-1, None)]
        );

        let placement = Placement::from_team(&[1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(placement.characters().count(), SLOTS);
        assert!(Placement::default().is_empty());
    }
}
