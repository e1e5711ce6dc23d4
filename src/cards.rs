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

use rand::{Rng, seq::IndexedRandom};

use crate::CharType;

/// The sizes of a selection hand a player may ask for.
pub const HAND_SIZES: [usize; 2] = [3, 5];

/// Draws `count` character types from the pool, with replacement.
///
/// An empty pool draws nothing.
pub fn draw<R: Rng + ?Sized>(pool: &[CharType], count: usize, rng: &mut R) -> Vec<CharType> {
    (0..count)
        .filter_map(|_| pool.choose(rng).copied())
        .collect()
}

/// Takes every card of `picked` out of `hand`, one copy per pick.
///
/// Returns the hand that is left, or `None` if a picked card isn't in the
/// hand.
#[must_use]
pub fn take(hand: &[CharType], picked: &[CharType]) -> Option<Vec<CharType>> {
    let mut hand = hand.to_vec();

    for card in picked {
        let index = hand.iter().position(|held| held == card)?;
        hand.swap_remove(index);
    }

    Some(hand)
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn draws_only_from_the_pool() {
        let mut rng = StdRng::seed_from_u64(7);
        let pool = [4, 8, 15];

        let hand = draw(&pool, 5, &mut rng);
        assert_eq!(hand.len(), 5);
        assert!(hand.iter().all(|card| pool.contains(card)));
        assert!(draw(&[], 3, &mut rng).is_empty());
    }

    #[test]
    fn take_consumes_one_copy_per_pick() {
        assert_eq!(take(&[1, 2, 2], &[2]), Some(vec![1, 2]));
        assert_eq!(take(&[1, 2, 2], &[2, 2]), Some(vec![1]));
        assert_eq!(take(&[1, 2], &[2, 2]), None);
        assert_eq!(take(&[1, 2], &[9]), None);
    }
}
