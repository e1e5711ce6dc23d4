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

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::rating::Outcome;

/// Where a scheduled match stands. A match is played exactly when it is no
/// longer [`Status::Pending`].
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Status {
    AttackerWins,
    #[default]
    Pending,
    DefenderWins,
}

impl Status {
    #[must_use]
    pub fn from_attacker(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Win => Self::AttackerWins,
            Outcome::Loss => Self::DefenderWins,
        }
    }

    #[must_use]
    pub fn has_played(self) -> bool {
        self != Self::Pending
    }

    /// The attacker's result, if the match has been played.
    #[must_use]
    pub fn is_win(self) -> Option<bool> {
        match self {
            Self::AttackerWins => Some(true),
            Self::Pending => None,
            Self::DefenderWins => Some(false),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttackerWins => write!(f, "attacker_wins"),
            Self::Pending => write!(f, "pending"),
            Self::DefenderWins => write!(f, "defender_wins"),
        }
    }
}

impl FromStr for Status {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> anyhow::Result<Self> {
        match value {
            "attacker_wins" => Ok(Self::AttackerWins),
            "pending" => Ok(Self::Pending),
            "defender_wins" => Ok(Self::DefenderWins),
            _ => Err(anyhow::Error::msg(format!("invalid status: {value}"))),
        }
    }
}
