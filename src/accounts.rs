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

use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{UserId, rating::DEFAULT_RATING};

/// The slice of the player profile store the tournament engine uses.
pub trait Profiles {
    /// The regular rating, used to seed brackets.
    fn rating(&self, user: UserId) -> i64;

    fn tourney_rating(&self, user: UserId) -> i64;

    /// Replaces the tournament rating, keeping the old one as the previous
    /// rating.
    fn set_tourney_rating(&mut self, user: UserId, rating: i64);

    fn username(&self, user: UserId) -> String {
        format!("player{user}")
    }
}

impl fmt::Display for Accounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut accounts = Vec::new();
        for (user, account) in &self.0 {
            accounts.push(format!("{user} {account}"));
        }
        accounts.sort_unstable();
        let accounts = accounts.join(" ");

        write!(f, "{accounts}")
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Account {
    #[serde(default)]
    pub username: String,
    #[serde(default = "default_rating")]
    pub elo: i64,
    #[serde(default = "default_rating")]
    pub tourney_elo: i64,
    #[serde(default = "default_rating")]
    pub prev_tourney_elo: i64,
}

fn default_rating() -> i64 {
    DEFAULT_RATING
}

impl Default for Account {
    fn default() -> Self {
        Self {
            username: String::new(),
            elo: DEFAULT_RATING,
            tourney_elo: DEFAULT_RATING,
            prev_tourney_elo: DEFAULT_RATING,
        }
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let username = if self.username.is_empty() {
            "_"
        } else {
            self.username.as_str()
        };

        write!(
            f,
            "{username} {} {} {}",
            self.elo, self.tourney_elo, self.prev_tourney_elo
        )
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Accounts(pub HashMap<UserId, Account>);

impl Profiles for Accounts {
    fn rating(&self, user: UserId) -> i64 {
        self.0.get(&user).map_or(DEFAULT_RATING, |account| account.elo)
    }

    fn tourney_rating(&self, user: UserId) -> i64 {
        self.0
            .get(&user)
            .map_or(DEFAULT_RATING, |account| account.tourney_elo)
    }

    fn set_tourney_rating(&mut self, user: UserId, rating: i64) {
        let account = self.0.entry(user).or_default();
        account.prev_tourney_elo = account.tourney_elo;
        account.tourney_elo = rating;
    }

    fn username(&self, user: UserId) -> String {
        match self.0.get(&user) {
            Some(account) if !account.username.is_empty() => account.username.clone(),
            _ => format!("player{user}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_users_have_the_default_rating() {
        let accounts = Accounts::default();

        assert_eq!(accounts.rating(5), DEFAULT_RATING);
        assert_eq!(accounts.tourney_rating(5), DEFAULT_RATING);
        assert_eq!(accounts.username(5), "player5");
    }

    #[test]
    fn setting_keeps_the_previous_rating() {
        let mut accounts = Accounts::default();
        accounts.set_tourney_rating(1, 1250);
        accounts.set_tourney_rating(1, 1190);

        let account = &accounts.0[&1];
        assert_eq!(account.tourney_elo, 1190);
        assert_eq!(account.prev_tourney_elo, 1250);
        assert_eq!(account.elo, DEFAULT_RATING);
    }
}
