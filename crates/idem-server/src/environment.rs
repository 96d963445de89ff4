//! The match a game server was launched for.
//!
//! The hosting provider starts one server process per match and passes the
//! match description through environment variables:
//!
//! | Variable        | Content                                        |
//! |-----------------|------------------------------------------------|
//! | `idemGameId`    | game mode                                      |
//! | `idemMatchUuid` | match id                                       |
//! | `idemTeams`     | JSON `[[{"playerId": "...", "rating": 0.0}]]`  |

use std::fmt;

use serde::{Deserialize, Serialize};

pub const GAME_ID_VAR: &str = "idemGameId";
pub const MATCH_ID_VAR: &str = "idemMatchUuid";
pub const TEAMS_VAR: &str = "idemTeams";

/// A player slot in the match, with the rating the backend matched on.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerRating {
    pub player_id: String,
    pub rating: f32,
}

impl PlayerRating {
    pub fn new(player_id: impl Into<String>, rating: f32) -> Self {
        Self {
            player_id: player_id.into(),
            rating,
        }
    }
}

/// Game, match and team assignment for the hosted match.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatchEnvironment {
    pub game_id: String,
    pub match_id: String,
    pub teams: Vec<Vec<PlayerRating>>,
}

impl MatchEnvironment {
    pub fn new(
        game_id: impl Into<String>,
        match_id: impl Into<String>,
        teams: Vec<Vec<PlayerRating>>,
    ) -> Self {
        Self {
            game_id: game_id.into(),
            match_id: match_id.into(),
            teams,
        }
    }

    /// Reads the environment of the current process.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the environment through `lookup`.
    ///
    /// Missing variables become empty values, and unparseable teams are
    /// logged and left empty; [`is_valid`](Self::is_valid) reports either.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let game_id = lookup(GAME_ID_VAR).unwrap_or_default();
        let match_id = lookup(MATCH_ID_VAR).unwrap_or_default();
        let raw_teams = lookup(TEAMS_VAR).unwrap_or_default();

        let teams = match serde_json::from_str(&raw_teams) {
            Ok(teams) => teams,
            Err(e) => {
                tracing::error!(
                    variable = TEAMS_VAR,
                    value = %raw_teams,
                    error = %e,
                    "could not parse teams"
                );
                Vec::new()
            }
        };

        Self {
            game_id,
            match_id,
            teams,
        }
    }

    /// A usable environment has a game id, a match id and at least one
    /// team, none of them empty.
    pub fn is_valid(&self) -> bool {
        !self.game_id.trim().is_empty()
            && !self.match_id.trim().is_empty()
            && !self.teams.is_empty()
            && self.teams.iter().all(|team| !team.is_empty())
    }

    /// Every player id, team by team.
    pub fn all_player_ids(&self) -> Vec<String> {
        self.teams
            .iter()
            .flatten()
            .map(|p| p.player_id.clone())
            .collect()
    }
}

impl fmt::Display for MatchEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "game id '{}', match id '{}', teams: ",
            self.game_id, self.match_id
        )?;
        let mut first = true;
        for (i, team) in self.teams.iter().enumerate() {
            for player in team {
                if !first {
                    f.write_str(", ")?;
                }
                first = false;
                write!(f, "[{i}] {}: {}", player.player_id, player.rating)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_from_lookup_parses_teams() {
        let env = MatchEnvironment::from_lookup(lookup(&[
            (GAME_ID_VAR, "1v1"),
            (MATCH_ID_VAR, "m-1"),
            (
                TEAMS_VAR,
                r#"[[{"playerId":"a","rating":1500}],[{"playerId":"b","rating":1400.5}]]"#,
            ),
        ]));
        assert!(env.is_valid());
        assert_eq!(env.teams.len(), 2);
        assert_eq!(env.teams[1][0], PlayerRating::new("b", 1400.5));
        assert_eq!(env.all_player_ids(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_from_lookup_bad_teams_is_invalid() {
        let env = MatchEnvironment::from_lookup(lookup(&[
            (GAME_ID_VAR, "1v1"),
            (MATCH_ID_VAR, "m-1"),
            (TEAMS_VAR, "not json"),
        ]));
        assert!(env.teams.is_empty());
        assert!(!env.is_valid());
    }

    #[test]
    fn test_is_valid_rejects_blank_ids_and_empty_teams() {
        let team = vec![vec![PlayerRating::new("a", 1.0)]];
        assert!(MatchEnvironment::new("1v1", "m", team.clone()).is_valid());
        assert!(!MatchEnvironment::new(" ", "m", team.clone()).is_valid());
        assert!(!MatchEnvironment::new("1v1", "", team).is_valid());
        assert!(!MatchEnvironment::new("1v1", "m", vec![]).is_valid());
        assert!(
            !MatchEnvironment::new("1v1", "m", vec![vec![PlayerRating::new("a", 1.0)], vec![]])
                .is_valid()
        );
    }

    #[test]
    fn test_display_lists_players_by_team() {
        let env = MatchEnvironment::new(
            "1v1",
            "m-1",
            vec![
                vec![PlayerRating::new("a", 1500.0)],
                vec![PlayerRating::new("b", 1400.0)],
            ],
        );
        assert_eq!(
            env.to_string(),
            "game id '1v1', match id 'm-1', teams: [0] a: 1500, [1] b: 1400"
        );
    }
}
