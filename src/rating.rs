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

//! Logistic Elo.
//!
//! [`rating_update`] is the plain update used by regular matches.
//! [`tourney_rating`] is the variant applied once a group has finished: the
//! outcome is derived from the final standing and the delta is discounted
//! towards the middle of the table.

use std::{fmt, ops::Not, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_RATING: i64 = 1200;
pub const K_FACTOR: f64 = 50.0;
pub const TOURNEY_K_FACTOR: f64 = 100.0;

/// Share of the raw delta each final standing keeps, best standing first.
pub const STANDING_MULTIPLIERS: [f64; 8] = [1.0, 0.75, 0.5, 0.25, 0.25, 0.5, 0.75, 1.0];

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Outcome {
    #[default]
    Loss,
    Win,
}

impl Outcome {
    #[must_use]
    pub fn score(self) -> f64 {
        match self {
            Self::Loss => 0.0,
            Self::Win => 1.0,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loss => write!(f, "loss"),
            Self::Win => write!(f, "win"),
        }
    }
}

impl Not for Outcome {
    type Output = Outcome;

    fn not(self) -> Self::Output {
        match self {
            Self::Loss => Self::Win,
            Self::Win => Self::Loss,
        }
    }
}

impl From<bool> for Outcome {
    fn from(win: bool) -> Self {
        if win { Self::Win } else { Self::Loss }
    }
}

impl FromStr for Outcome {
    type Err = anyhow::Error;

    fn from_str(string: &str) -> anyhow::Result<Self> {
        match string.to_lowercase().as_str() {
            "1" | "true" | "win" => Ok(Self::Win),
            "0" | "false" | "loss" => Ok(Self::Loss),
            _ => Err(anyhow::Error::msg(format!(
                "Error trying to convert '{string}' to an Outcome!"
            ))),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum RatingError {
    #[error("rating: the k factor must be positive, got {0}")]
    KFactor(f64),
    #[error("rating: standing {standing} is outside a group of {group_size}")]
    Standing { standing: usize, group_size: usize },
}

/// The probability that a player rated `r1` beats a player rated `r2`.
#[must_use]
pub fn expected_score(r1: f64, r2: f64) -> f64 {
    let q1 = 10_f64.powf(r1 / 400.0);
    let q2 = 10_f64.powf(r2 / 400.0);

    q1 / (q1 + q2)
}

fn delta(r1: f64, r2: f64, outcome: Outcome, k: f64) -> Result<f64, RatingError> {
    if !k.is_finite() || k <= 0.0 {
        return Err(RatingError::KFactor(k));
    }

    Ok(k * (outcome.score() - expected_score(r1, r2)))
}

/// # Errors
///
/// If `k` is not a positive finite number.
pub fn rating_update(r1: f64, r2: f64, outcome: Outcome, k: f64) -> Result<f64, RatingError> {
    Ok((r1 + delta(r1, r2, outcome, k)?).max(0.0))
}

/// The outcome a final standing counts as: the top half of the group wins.
#[must_use]
pub fn standing_outcome(standing: usize) -> Outcome {
    Outcome::from(standing < STANDING_MULTIPLIERS.len() / 2)
}

/// The tournament rating of a player who finished at zero based `standing`
/// in a group whose mean tournament rating is `group_mean`.
///
/// # Errors
///
/// If `k` is not positive or `standing` is outside the multiplier table.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn tourney_rating(
    rating: i64,
    group_mean: f64,
    standing: usize,
    k: f64,
) -> Result<i64, RatingError> {
    let Some(multiplier) = STANDING_MULTIPLIERS.get(standing) else {
        return Err(RatingError::Standing {
            standing,
            group_size: STANDING_MULTIPLIERS.len(),
        });
    };

    let current = rating as f64;
    let delta = delta(current, group_mean, standing_outcome(standing), k)?;

    let new_rating = (current + delta * multiplier).round_ties_even();
    Ok((new_rating as i64).max(0))
}
