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

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::UserId;

/// Reserved bot accounts used to pad the last group of a bracket.
///
/// Bots are handed out from the end of the roster backward. A roster is built
/// fresh from the settings for every bracket.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct BotRoster {
    bots: Vec<UserId>,
    cursor: usize,
}

#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
#[error("roster: all {0} bots are already allocated")]
pub struct RosterError(pub usize);

impl BotRoster {
    #[must_use]
    pub fn new(bots: Vec<UserId>) -> Self {
        let cursor = bots.len();
        Self { bots, cursor }
    }

    /// # Errors
    ///
    /// If every bot has already been handed out.
    pub fn allocate(&mut self) -> Result<UserId, RosterError> {
        let Some(cursor) = self.cursor.checked_sub(1) else {
            return Err(RosterError(self.bots.len()));
        };
        let bot = self.bots.get(cursor).copied().ok_or(RosterError(self.bots.len()))?;

        self.cursor = cursor;
        Ok(bot)
    }

    #[must_use]
    pub fn contains(&self, user: UserId) -> bool {
        self.bots.contains(&user)
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_from_the_end() {
        let mut roster = BotRoster::new(vec![27, 28, 29]);

        assert_eq!(roster.allocate(), Ok(29));
        assert_eq!(roster.allocate(), Ok(28));
        assert_eq!(roster.remaining(), 1);
        assert_eq!(roster.allocate(), Ok(27));
        assert_eq!(roster.allocate(), Err(RosterError(3)));
        assert!(roster.contains(28));
        assert!(!roster.contains(30));
    }
}
