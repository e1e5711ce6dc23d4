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

use std::io::Write as _;

use battlegame_tournament::{COPYRIGHT, LONG_VERSION};
use clap::{CommandFactory, Parser};

/// Battlegame Tournament Server
///
/// This is a TCP server that runs the weekly tournament. Every request is one
/// line, `<user_id> <command> [args...]`, and every reply is one line of
/// JSON.
#[derive(Parser, Debug)]
#[command(long_version = LONG_VERSION, about = "Battlegame Tournament Server")]
pub(crate) struct Args {
    /// Whether to log on the debug level
    #[arg(long)]
    pub debug: bool,

    /// Whether to skip the data file
    #[arg(long)]
    pub skip_the_data_file: bool,

    /// Whether the application is being run by systemd
    #[arg(long)]
    pub systemd: bool,

    /// Seed the random number generator, for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// The address to listen on
    #[arg(default_value = "[::]", long)]
    pub host: String,

    /// Build the manpage
    #[arg(long)]
    pub man: bool,
}

impl Args {
    pub(crate) fn generate_man_page() -> anyhow::Result<()> {
        let mut buffer: Vec<u8> = Vec::default();
        let cmd = Self::command().name("tournament-server").long_version(None);
        let man = clap_mangen::Man::new(cmd).date("2026-03-13");

        man.render(&mut buffer)?;
        write!(buffer, "{COPYRIGHT}")?;

        std::fs::write("tournament-server.1", buffer)?;
        Ok(())
    }
}
