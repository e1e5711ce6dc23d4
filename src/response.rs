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

//! Replies are one JSON object per line. Every object carries a `status`
//! boolean and a failed request also carries a `reason`.

use std::fmt;

use serde::Serialize;
use serde_json::{Value, json};

use crate::controller::StatusView;

#[must_use]
pub fn success() -> Value {
    json!({ "status": true })
}

/// A successful reply with `data` under `key`.
///
/// # Errors
///
/// If `data` can't be turned into JSON.
pub fn with<T: Serialize + ?Sized>(key: &str, data: &T) -> Result<Value, serde_json::Error> {
    let mut reply = success();
    reply[key] = serde_json::to_value(data)?;

    Ok(reply)
}

#[must_use]
pub fn failure<E: fmt::Display + ?Sized>(reason: &E) -> Value {
    json!({ "status": false, "reason": reason.to_string() })
}

/// Turns a result into a reply, the `Ok` value going under `key`.
#[must_use]
pub fn reply<T: Serialize, E: fmt::Display>(key: &str, result: &Result<T, E>) -> Value {
    match result {
        Ok(data) => with(key, data).unwrap_or_else(|err| failure(&err)),
        Err(err) => failure(err),
    }
}

#[must_use]
pub fn done<E: fmt::Display>(result: &Result<(), E>) -> Value {
    match result {
        Ok(()) => success(),
        Err(err) => failure(err),
    }
}

/// The self status reply. Users who aren't in a group get a failure that
/// still tells them when the next event starts.
///
/// # Errors
///
/// If the view can't be turned into JSON.
pub fn status(view: &StatusView) -> Result<Value, serde_json::Error> {
    Ok(match view {
        StatusView::Competing {
            group,
            group_list,
            me,
        } => {
            let mut reply = with("tournament", group)?;
            reply["group_list"] = serde_json::to_value(group_list)?;
            reply["me"] = serde_json::to_value(me)?;
            reply
        }
        StatusView::Waiting { next_start } => json!({
            "status": false,
            "reason": "waiting for tournament to start",
            "has_joined": true,
            "next_tourney_start_time": next_start,
        }),
        StatusView::NotRegistered { next_start } => json!({
            "status": false,
            "reason": "not registered for next tournament",
            "has_joined": false,
            "next_tourney_start_time": next_start,
        }),
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::tournament::TournamentError;

    #[test]
    fn failures_carry_the_reason() {
        let result: Result<(), _> = Err(TournamentError::NoFightsLeft);
        let reply = reply("unused", &result);

        assert_eq!(reply, json!({ "status": false, "reason": "no fights left" }));
    }

    #[test]
    fn data_goes_under_its_key() {
        let result: Result<_, TournamentError> = Ok(vec![3, 5, 8]);

        assert_eq!(
            reply("cards", &result).to_string(),
            r#"{"cards":[3,5,8],"status":true}"#
        );
    }

    #[test]
    fn waiting_users_get_the_next_start() {
        let reply = status(&StatusView::Waiting {
            next_start: Utc::now(),
        });

        assert_eq!(reply.as_ref().ok().map(|reply| reply["status"].clone()), Some(json!(false)));
        assert!(reply.is_ok_and(|reply| reply["has_joined"] == json!(true)));
    }
}
