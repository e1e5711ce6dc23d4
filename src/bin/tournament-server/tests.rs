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

#![allow(clippy::unwrap_used)]
#![cfg(test)]

use battlegame_tournament::time::FixedClock;
use chrono::TimeZone;
use serde_json::json;

use super::*;

fn server() -> (Server, StdRng) {
    let server = Server {
        skip_the_data_file: true,
        seed: Some(3),
        ..Server::default()
    };

    (server, StdRng::seed_from_u64(3))
}

#[test]
fn requests_must_name_a_user() {
    let (mut server, mut rng) = server();

    let reply = server.handle_message("register", &mut rng);
    assert_eq!(reply["status"], json!(false));

    let reply = server.handle_message("me register", &mut rng);
    assert_eq!(reply["reason"], json!("invalid user id 'me'"));

    let reply = server.handle_message("5 dance", &mut rng);
    assert_eq!(reply["reason"], json!("unknown command 'dance'"));
}

#[test]
fn registering_twice_is_refused() {
    let (mut server, mut rng) = server();

    assert_eq!(server.handle_message("5 register", &mut rng), json!({ "status": true }));
    assert_eq!(
        server.handle_message("5 register", &mut rng),
        json!({ "status": false, "reason": "already registered for next tournament" })
    );

    let reply = server.handle_message("5 status", &mut rng);
    assert_eq!(reply["reason"], json!("waiting for tournament to start"));

    let reply = server.handle_message("6 status", &mut rng);
    assert_eq!(reply["has_joined"], json!(false));
}

#[test]
fn a_player_fights_through_the_protocol() {
    let (mut server, mut rng) = server();

    server.handle_message("5 register", &mut rng);
    let reply = server.handle_message("0 setup", &mut rng);
    assert_eq!(reply["status"], json!(true));
    assert_eq!(reply["report"]["groups"], json!(1));
    assert_eq!(reply["report"]["new_matches"], json!(24));

    let reply = server.handle_message("5 status", &mut rng);
    assert_eq!(reply["tournament"]["round"], json!(2));
    assert_eq!(reply["group_list"].as_array().map(Vec::len), Some(8));

    let reply = server.handle_message("5 fights", &mut rng);
    assert_eq!(reply["matches"].as_array().map(Vec::len), Some(3));

    // The bots are handed out from the end of the roster.
    let reply = server.handle_message("5 report 33 win", &mut rng);
    assert_eq!(reply["status"], json!(true));
    let reply = server.handle_message("5 report 33 win", &mut rng);
    assert_eq!(reply["reason"], json!("match already resolved"));
    let reply = server.handle_message("5 report 27 win", &mut rng);
    assert_eq!(reply["reason"], json!("match not found"));

    let reply = server.handle_message("5 history", &mut rng);
    assert_eq!(reply["matches"][0]["won"], json!(true));
    assert_eq!(reply["matches"][0]["role"], json!("Attacker"));

    let reply = server.handle_message("5 get_cards 4", &mut rng);
    assert_eq!(reply["reason"], json!("invalid number of cards requested"));
    let reply = server.handle_message("5 get_cards 3", &mut rng);
    let cards: Vec<u32> = serde_json::from_value(reply["cards"].clone()).unwrap();
    assert_eq!(cards.len(), 3);

    let reply = server.handle_message(&format!("5 pick_cards {} {}", cards[0], cards[1]), &mut rng);
    let characters: Vec<u64> = serde_json::from_value(reply["characters"].clone()).unwrap();
    assert_eq!(characters.len(), 2);

    let defense = format!("3:{} 4:{} -1:_ -1:_ -1:_", characters[0], characters[1]);
    let reply = server.handle_message(&format!("5 set_defense {defense}"), &mut rng);
    assert_eq!(reply, json!({ "status": true }));

    let reply = server.handle_message("5 me", &mut rng);
    assert_eq!(reply["me"]["tourney_rating"], json!(1200));

    let reply = server.handle_message("0 end", &mut rng);
    assert_eq!(reply["status"], json!(true));
    let reply = server.handle_message("5 fights", &mut rng);
    assert_eq!(reply["reason"], json!("not competing in current tournament"));
}

#[test]
fn admin_commands_are_recognized() {
    assert!(is_admin("0 advance"));
    assert!(!is_admin("10 advance"));
    assert!(!is_admin("advance"));
}

#[test]
fn mapped_ipv4_loopback_is_local() {
    assert!(is_local("[::ffff:127.0.0.1]:49160".parse().unwrap()));
    assert!(is_local("[::1]:49160".parse().unwrap()));
    assert!(is_local("127.0.0.1:49160".parse().unwrap()));
    assert!(!is_local("[::ffff:192.0.2.7]:49160".parse().unwrap()));
    assert!(!is_local("192.0.2.7:49160".parse().unwrap()));
}

#[test]
fn ipv4_clients_of_a_dual_stack_listener_are_local() {
    // Hosts without IPv6 or with v6only sockets can't make this connection.
    let Ok(listener) = TcpListener::bind("[::]:0") else {
        return;
    };
    let port = listener.local_addr().unwrap().port();
    let Ok(_client) = TcpStream::connect(("127.0.0.1", port)) else {
        return;
    };

    let (stream, peer) = listener.accept().unwrap();
    assert_eq!(stream.peer_addr().unwrap(), peer);
    assert!(is_local(peer));
}

#[test]
fn a_missed_start_day_is_overdue() {
    let (mut server, mut rng) = server();
    let friday = Utc.with_ymd_and_hms(2026, 3, 13, 12, 0, 0).unwrap();
    let thursday = Utc.with_ymd_and_hms(2026, 3, 12, 12, 0, 0).unwrap();

    assert!(!server.round_overdue(thursday));
    assert!(server.round_overdue(friday));

    server.handle_message("5 register", &mut rng);
    server
        .tournament
        .setup(&mut server.accounts, &mut rng, &FixedClock(friday), &server.settings)
        .unwrap();

    assert!(!server.round_overdue(friday));
    assert!(!server.round_overdue(friday + chrono::Duration::hours(11)));
    // The first round boundary of the event passed with nobody to run it.
    assert!(server.round_overdue(friday + chrono::Duration::hours(13)));
}
