//! The tournament engine of the battlegame backend.
//!
//! Registered players are seeded by rating into groups of eight, padded with
//! bots, and play a five round elimination event. Every day the round
//! advancer resolves the round, eliminates the players with the most losses,
//! pairs the survivors and, on the last round, adjusts tournament ratings by
//! final standing.
//!
//! ## Feature Flags
//!
//! By default the `server` feature flag is enabled.
//!
//! * bench - enable the criterion benchmarks
//! * server - enable the `tournament-server` binary

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

#![deny(clippy::panic)]

pub mod accounts;
pub mod bots;
pub mod bracket;
pub mod cards;
pub mod controller;
pub mod placement;
pub mod rating;
pub mod response;
pub mod role;
pub mod roster;
pub mod round;
pub mod schedule;
pub mod settings;
pub mod standings;
pub mod status;
pub mod time;
pub mod tournament;
pub mod utils;

pub type Id = u64;
pub type UserId = Id;
pub type GroupId = Id;
pub type MemberId = Id;
pub type MatchId = Id;
pub type CharacterId = Id;
pub type CharType = u32;

pub const HOME: &str = "battlegame-tournament";
pub const SERVER_PORT: &str = ":49160";

pub const COPYRIGHT: &str = r".SH COPYRIGHT
Copyright (C) 2025-2026 Developers of the battlegame-tournament project

This program is free software: you can redistribute it and/or modify
it under the terms of the GNU Affero General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU Affero General Public License for more details.

You should have received a copy of the GNU Affero General Public License
along with this program.  If not, see <https://www.gnu.org/licenses/>.
";

pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "
Copyright (c) 2025-2026 Developers of the battlegame-tournament project
Licensed under the AGPLv3"
);
