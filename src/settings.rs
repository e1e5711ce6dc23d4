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

use std::{fs, io::ErrorKind, path::Path};

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::{
    CharType, UserId,
    rating::TOURNEY_K_FACTOR,
    roster::BotRoster,
};

pub const SETTINGS_FILE: &str = "settings.ron";

/// Engine tunables, read from `settings.ron` in the data folder.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Accounts reserved for padding groups.
    pub bots: Vec<UserId>,
    /// Character types cards are drawn from.
    pub card_pool: Vec<CharType>,
    /// When a round expires each day, UTC.
    pub round_boundary: NaiveTime,
    /// The day a new event starts.
    pub start_weekday: Weekday,
    pub tourney_k_factor: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bots: (27..=33).collect(),
            card_pool: (1..=30).collect(),
            round_boundary: NaiveTime::MIN,
            start_weekday: Weekday::Fri,
            tourney_k_factor: TOURNEY_K_FACTOR,
        }
    }
}

impl Settings {
    /// Reads the settings file, falling back to the defaults if it doesn't
    /// exist.
    ///
    /// # Errors
    ///
    /// If the file can't be read or isn't valid RON.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        match fs::read_to_string(path) {
            Ok(string) => ron::from_str(&string).map_err(|err| {
                anyhow::Error::msg(format!("RON: {}: {err}", path.display()))
            }),
            Err(err) => match err.kind() {
                ErrorKind::NotFound => Ok(Self::default()),
                _ => Err(anyhow::Error::msg(err.to_string())),
            },
        }
    }

    #[must_use]
    pub fn roster(&self) -> BotRoster {
        BotRoster::new(self.bots.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() -> anyhow::Result<()> {
        let settings: Settings = ron::from_str(r#"(bots: [1, 2], start_weekday: "Thu")"#)?;

        assert_eq!(settings.bots, vec![1, 2]);
        assert_eq!(settings.start_weekday, Weekday::Thu);
        assert_eq!(settings.card_pool, Settings::default().card_pool);
        assert!((settings.tourney_k_factor - TOURNEY_K_FACTOR).abs() < f64::EPSILON);
        Ok(())
    }

    #[test]
    fn missing_file_is_the_default() -> anyhow::Result<()> {
        let settings = Settings::load(Path::new("/nonexistent/battlegame/settings.ron"))?;
        assert_eq!(settings, Settings::default());
        Ok(())
    }
}
