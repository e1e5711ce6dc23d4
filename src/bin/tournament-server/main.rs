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

mod command_line;
mod tests;

use std::{
    fmt,
    fs::{self, File},
    io::{BufRead, BufReader, ErrorKind, Write},
    net::{SocketAddr, TcpListener, TcpStream},
    process::exit,
    sync::mpsc::{self, Receiver, Sender},
    thread::{self, sleep},
    time::Duration,
};

use battlegame_tournament::{
    CharType, SERVER_PORT, UserId,
    accounts::Accounts,
    placement::Placement,
    rating::Outcome,
    response,
    round::{RoundError, RoundReport},
    settings::{SETTINGS_FILE, Settings},
    time::{Clock, SystemClock, next_boundary, until},
    tournament::Tournament,
    utils::{self, create_data_folder, data_file},
};
use chrono::{DateTime, Datelike, Utc};
use clap::Parser;
use log::{debug, error, info};
use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::command_line::Args;

const HOUR_IN_SECONDS: u64 = 60 * 60;
const STATE_FILE: &str = "tournament.ron";

/// Requests from this user are administrative.
const ADMIN: UserId = 0;

type Message = (String, Option<Sender<String>>);

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    utils::init_logger("tournament_server", args.debug, args.systemd);

    if args.man {
        return Args::generate_man_page();
    }

    create_data_folder()?;

    let (tx, rx) = mpsc::channel();
    let mut server = Server {
        seed: args.seed,
        ..Server::default()
    };

    if args.skip_the_data_file {
        server.skip_the_data_file = true;
    } else {
        server.load_data_files()?;
    }
    server.settings = Settings::load(&data_file(SETTINGS_FILE))?;

    let boundary = server.settings.round_boundary;
    if server.round_overdue(Utc::now()) {
        info!("a round boundary passed while the server was down");
        tx.send(("0 tick".to_string(), None))?;
    }

    Server::set_shutdown_handler(tx.clone(), args.systemd)?;
    thread::spawn(move || handle_error(server.handle_messages(&rx)));

    Server::schedule(tx.clone(), boundary);
    Server::save(tx.clone());

    let mut address = args.host.clone();
    address.push_str(SERVER_PORT);

    let listener = match TcpListener::bind(&address) {
        Ok(listener) => listener,
        Err(error) => {
            error!("TcpLister::bind: {error}");

            address = "0.0.0.0".to_string();
            address.push_str(SERVER_PORT);
            TcpListener::bind(&address)?
        }
    };

    info!("listening on {address} ...");

    for stream in listener.incoming() {
        let stream = match stream {
            Ok(stream) => stream,
            Err(error) => {
                error!("stream: {error}");
                continue;
            }
        };

        let tx = tx.clone();
        thread::spawn(move || {
            if let Err(error) = handle_connection(stream, &tx) {
                error!("connection: {error}");
            }
        });
    }

    Ok(())
}

fn handle_connection(mut stream: TcpStream, tx: &Sender<Message>) -> anyhow::Result<()> {
    let local = is_local(stream.peer_addr()?);
    let mut reader = BufReader::new(stream.try_clone()?);
    let (client_tx, client_rx) = mpsc::channel();
    let mut buf = String::new();

    loop {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            return Ok(());
        }

        let line = buf.trim();
        if line.is_empty() {
            continue;
        }

        let mut reply = if line.chars().any(char::is_control) {
            response::failure("there are control characters in the request").to_string()
        } else if !local && is_admin(line) {
            response::failure("admin commands are only accepted locally").to_string()
        } else {
            tx.send((line.to_string(), Some(client_tx.clone())))?;
            client_rx.recv()?
        };

        reply.push('\n');
        stream.write_all(reply.as_bytes())?;
    }
}

/// IPv4 peers of a dual-stack listener show up as mapped IPv6 addresses.
fn is_local(peer: SocketAddr) -> bool {
    peer.ip().to_canonical().is_loopback()
}

fn is_admin(line: &str) -> bool {
    line.split_ascii_whitespace()
        .next()
        .and_then(|user| user.parse::<UserId>().ok())
        == Some(ADMIN)
}

fn handle_error<T, E: fmt::Display>(result: Result<T, E>) -> T {
    match result {
        Ok(value) => value,
        Err(error) => {
            error!("{error}");
            exit(1)
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct Server {
    #[serde(default)]
    tournament: Tournament,
    #[serde(default)]
    accounts: Accounts,
    #[serde(skip)]
    settings: Settings,
    #[serde(skip)]
    seed: Option<u64>,
    #[serde(skip)]
    skip_the_data_file: bool,
}

impl Server {
    fn load_data_files(&mut self) -> anyhow::Result<()> {
        let state_file = data_file(STATE_FILE);
        match &fs::read_to_string(&state_file) {
            Ok(string) => match ron::from_str::<Server>(string.as_str()) {
                Ok(server_ron) => {
                    self.tournament = server_ron.tournament;
                    self.accounts = server_ron.accounts;
                }
                Err(err) => {
                    return Err(anyhow::Error::msg(format!(
                        "RON: {}: {err}",
                        state_file.display(),
                    )));
                }
            },
            Err(err) => match err.kind() {
                ErrorKind::NotFound => {}
                _ => return Err(anyhow::Error::msg(err.to_string())),
            },
        }

        Ok(())
    }

    fn save_server(&self) {
        if self.skip_the_data_file {
            return;
        }

        match ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            Ok(string) => {
                let state_file = data_file(STATE_FILE);

                match File::create(&state_file) {
                    Ok(mut file) => {
                        if let Err(error) = file.write_all(string.as_bytes()) {
                            error!("save file (3): {error}");
                        }
                    }
                    Err(error) => error!("save file (2): {error}"),
                }
            }
            Err(error) => error!("save file (1): {error}"),
        }
    }

    /// Whether a boundary passed without its tick: a round left past its
    /// expiration, or a start weekday boundary with no event set up since.
    fn round_overdue(&self, now: DateTime<Utc>) -> bool {
        let groups = &self.tournament.groups;
        if groups
            .values()
            .any(|group| !group.finalized && group.round_expiration <= now)
        {
            return true;
        }

        let boundary = now
            .date_naive()
            .and_time(self.settings.round_boundary)
            .and_utc();
        let set_up_since = groups
            .values()
            .any(|group| group.round == 2 && group.round_expiration > now);

        now.weekday() == self.settings.start_weekday && boundary <= now && !set_up_since
    }

    fn set_shutdown_handler(tx: Sender<Message>, systemd: bool) -> anyhow::Result<()> {
        ctrlc::set_handler(move || {
            if !systemd {
                println!();
            }
            handle_error(tx.send(("0 save".to_string(), None)));
            handle_error(tx.send(("0 exit".to_string(), None)));
        })?;

        Ok(())
    }

    fn save(tx: Sender<Message>) {
        thread::spawn(move || {
            loop {
                sleep(Duration::from_secs(HOUR_IN_SECONDS));
                handle_error(tx.send(("0 save".to_string(), None)));
            }
        });
    }

    fn schedule(tx: Sender<Message>, boundary: chrono::NaiveTime) {
        thread::spawn(move || {
            loop {
                let now = Utc::now();
                let duration = until(now, next_boundary(now, boundary));
                debug!("seconds until the next round: {}", duration.as_secs());

                sleep(duration);
                sleep(Duration::from_secs(1));

                handle_error(tx.send(("0 tick".to_string(), None)));
            }
        });
    }

    fn handle_messages(&mut self, rx: &Receiver<Message>) -> anyhow::Result<()> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        for (message, option_tx) in rx {
            let reply = self.handle_message(&message, &mut rng);

            if let Some(tx) = option_tx
                && let Err(error) = tx.send(reply.to_string())
            {
                error!("reply: {error}");
            }
        }

        Ok(())
    }

    #[allow(clippy::too_many_lines)]
    fn handle_message(&mut self, message: &str, rng: &mut StdRng) -> Value {
        let mut words = message.split_ascii_whitespace();
        let (Some(user), Some(command)) = (words.next(), words.next()) else {
            return response::failure("expected: <user_id> <command> [args...]");
        };
        let Ok(user) = user.parse::<UserId>() else {
            return response::failure(&format!("invalid user id '{user}'"));
        };
        let the_rest: Vec<_> = words.collect();
        let clock = SystemClock;

        debug!("{user} {command} {}", the_rest.join(" "));

        if user == ADMIN {
            return self.handle_admin(command, &the_rest, rng);
        }

        match command {
            "register" => response::done(&self.tournament.register(user)),
            "status" => {
                let view = self
                    .tournament
                    .status(user, &self.accounts, &clock, &self.settings);
                response::status(&view).unwrap_or_else(|err| response::failure(&err))
            }
            "fights" => response::reply("matches", &self.tournament.fights(user, &self.accounts)),
            "get_cards" => {
                let Some(Ok(num_cards)) = the_rest.first().map(|n| n.parse::<usize>()) else {
                    return response::failure("invalid number of cards requested");
                };

                let cards = self.tournament.get_cards(
                    user,
                    num_cards,
                    rng,
                    &self.settings.card_pool,
                );
                response::reply("cards", &cards)
            }
            "pick_cards" => {
                let picked: Result<Vec<CharType>, _> =
                    the_rest.iter().map(|card| card.parse::<CharType>()).collect();
                let Ok(picked) = picked else {
                    return response::failure("invalid card selection");
                };

                response::reply("characters", &self.tournament.pick_cards(user, &picked))
            }
            "set_defense" => match the_rest.join(" ").parse::<Placement>() {
                Ok(placement) => response::done(&self.tournament.set_defense(user, placement)),
                Err(err) => response::failure(&err),
            },
            "report" => {
                let (Some(opponent), Some(outcome)) = (the_rest.first(), the_rest.get(1)) else {
                    return response::failure("expected: report <opponent> <win|loss>");
                };
                let Ok(opponent) = opponent.parse::<UserId>() else {
                    return response::failure(&format!("invalid user id '{opponent}'"));
                };
                let outcome = match outcome.parse::<Outcome>() {
                    Ok(outcome) => outcome,
                    Err(err) => return response::failure(&err),
                };

                let result = self.tournament.report_result(user, opponent, outcome);
                if let Ok(game) = &result {
                    info!("{user} reported match {game}: {outcome}");
                }
                response::reply("match", &result)
            }
            "history" => response::reply(
                "matches",
                &self.tournament.match_history(user, &self.accounts),
            ),
            "me" => response::reply("me", &self.tournament.me(user, &self.accounts)),
            _ => response::failure(&format!("unknown command '{command}'")),
        }
    }

    fn handle_admin(&mut self, command: &str, the_rest: &[&str], rng: &mut StdRng) -> Value {
        let clock = SystemClock;

        match command {
            "setup" => response::reply(
                "report",
                &self
                    .tournament
                    .setup(&mut self.accounts, rng, &clock, &self.settings),
            ),
            "advance" => response::reply(
                "report",
                &self
                    .tournament
                    .advance_round(&mut self.accounts, rng, &clock, &self.settings),
            ),
            "end" => {
                info!("ending the tournament...");
                self.tournament.end_tournament();
                response::success()
            }
            "tick" => {
                let result = self.tick(rng, &clock);
                self.save_server();
                response::reply("report", &result)
            }
            "grant" => {
                let (Some(Ok(user)), Some(Ok(credits))) = (
                    the_rest.first().map(|user| user.parse::<UserId>()),
                    the_rest.get(1).map(|credits| credits.parse::<u32>()),
                ) else {
                    return response::failure("expected: grant <user_id> <credits>");
                };

                response::reply("rewards_left", &self.tournament.grant_rewards(user, credits))
            }
            "set_rating" => {
                let (Some(Ok(user)), Some(Ok(rating))) = (
                    the_rest.first().map(|user| user.parse::<UserId>()),
                    the_rest.get(1).map(|rating| rating.parse::<i64>()),
                ) else {
                    return response::failure("expected: set_rating <user_id> <rating>");
                };

                self.accounts.0.entry(user).or_default().elo = rating.max(0);
                response::success()
            }
            "save" => {
                debug!("saving the data file...");
                self.save_server();
                response::success()
            }
            "exit" => {
                info!("exiting...");
                exit(0)
            }
            _ => response::failure(&format!("unknown command '{command}'")),
        }
    }

    /// Runs the work of a round boundary: a new event on the start weekday,
    /// otherwise the next round.
    fn tick<C: Clock>(&mut self, rng: &mut StdRng, clock: &C) -> Result<RoundReport, RoundError> {
        if clock.now().weekday() == self.settings.start_weekday {
            info!("starting a new tournament...");

            let mut next = self.tournament.clone();
            next.end_tournament();
            let report = next.setup(&mut self.accounts, rng, clock, &self.settings)?;
            self.tournament = next;

            Ok(report)
        } else {
            self.tournament
                .advance_round(&mut self.accounts, rng, clock, &self.settings)
        }
    }
}
