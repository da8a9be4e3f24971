//! Snapshot file loading.
//!
//! Two layouts are supported: a nested `team -> season -> [player]` tree
//! and a flat array of player-season rows. Both are read on demand and
//! handed to the caller as owned [`Record`]s.

use crate::analysis::retain_seasons;
use crate::config::DataConfig;
use crate::error::{Result, StatsError};
use crate::models::{fields, Record};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A flattened team tree: every `(team, season)` node in file order and
/// the player rows found under them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamTree {
    pub nodes: Vec<(String, String)>,
    pub rows: Vec<Record>,
}

impl TeamTree {
    /// Drop nodes and rows whose season is not in `allowed`.
    pub fn retain_seasons(self, allowed: &[String]) -> Self {
        Self {
            nodes: self
                .nodes
                .into_iter()
                .filter(|(_, season)| allowed.contains(season))
                .collect(),
            rows: retain_seasons(self.rows, allowed),
        }
    }
}

/// Location of the two snapshot files.
#[derive(Debug, Clone)]
pub struct DataStore {
    teams_path: PathBuf,
    players_path: PathBuf,
}

impl From<&DataConfig> for DataStore {
    fn from(config: &DataConfig) -> Self {
        Self::new(&config.dir, &config.teams_file, &config.players_file)
    }
}

impl DataStore {
    pub fn new(dir: &Path, teams_file: &str, players_file: &str) -> Self {
        Self {
            teams_path: dir.join(teams_file),
            players_path: dir.join(players_file),
        }
    }

    /// Read the team tree snapshot, flattened into player rows that carry
    /// their `team` and `season`.
    pub async fn team_tree(&self) -> Result<TeamTree> {
        let tree = read_json(&self.teams_path).await?;
        flatten_team_tree(tree, &self.teams_path)
    }

    /// Read the flat player-season snapshot.
    pub async fn player_rows(&self) -> Result<Vec<Record>> {
        let rows = read_json(&self.players_path).await?;
        into_rows(rows, &self.players_path)
    }
}

async fn read_json(path: &Path) -> Result<Value> {
    debug!("Reading snapshot {}", path.display());

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| StatsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    serde_json::from_str(&content).map_err(|source| StatsError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn shape_error(path: &Path, reason: impl Into<String>) -> StatsError {
    StatsError::SnapshotShape {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// Flatten `{team: {season: [player, ...]}}` into player rows.
///
/// The tree's team and season keys overwrite any `team`/`season` fields on
/// the player objects. Seasons with no players still appear in `nodes`.
pub fn flatten_team_tree(tree: Value, path: &Path) -> Result<TeamTree> {
    let Value::Object(teams) = tree else {
        return Err(shape_error(path, "top level must be an object keyed by team"));
    };

    let mut flat = TeamTree::default();
    for (team, seasons) in teams {
        let Value::Object(seasons) = seasons else {
            return Err(shape_error(path, format!("team `{team}` must map seasons to players")));
        };

        for (season, players) in seasons {
            let Value::Array(players) = players else {
                return Err(shape_error(
                    path,
                    format!("season `{season}` of `{team}` must be a player array"),
                ));
            };

            flat.nodes.push((team.clone(), season.clone()));
            for player in players {
                let Value::Object(mut player) = player else {
                    return Err(shape_error(path, format!("non-object player in `{team}` {season}")));
                };
                player.insert(fields::TEAM.to_string(), Value::String(team.clone()));
                player.insert(fields::SEASON.to_string(), Value::String(season.clone()));
                flat.rows.push(player);
            }
        }
    }

    Ok(flat)
}

/// Accept a JSON array of objects as rows.
pub fn into_rows(value: Value, path: &Path) -> Result<Vec<Record>> {
    let Value::Array(items) = value else {
        return Err(shape_error(path, "expected an array of rows"));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(row) => Ok(row),
            _ => Err(shape_error(path, format!("row {index} is not an object"))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    const TEAM_TREE: &str = include_str!("../../fixtures/nba_team.json");
    const PLAYER_ROWS: &str = include_str!("../../fixtures/nba_data.json");

    fn store_with_fixtures() -> (TempDir, DataStore) {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("nba_team.json"), TEAM_TREE).unwrap();
        std::fs::write(dir.path().join("nba_data.json"), PLAYER_ROWS).unwrap();
        let store = DataStore::new(dir.path(), "nba_team.json", "nba_data.json");
        (dir, store)
    }

    #[tokio::test]
    async fn test_team_tree_is_flattened() {
        let (_dir, store) = store_with_fixtures();
        let tree = store.team_tree().await.unwrap();
        let rows = &tree.rows;

        assert_eq!(rows.len(), 6);
        assert!(rows
            .iter()
            .all(|r| r.contains_key("team") && r.contains_key("season")));

        let jokic = rows
            .iter()
            .find(|r| r["full_name"] == json!("Nikola Jokic"))
            .unwrap();
        assert_eq!(jokic["team"], json!("Denver Nuggets"));
        assert_eq!(jokic["season"], json!("2019-2020"));
    }

    #[tokio::test]
    async fn test_player_rows_load() {
        let (_dir, store) = store_with_fixtures();
        let rows = store.player_rows().await.unwrap();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0]["full_name"], json!("Al Horford"));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let store = DataStore::new(dir.path(), "nba_team.json", "nba_data.json");

        let err = store.player_rows().await.unwrap_err();
        assert!(matches!(err, StatsError::Io { .. }));
        assert!(err.to_string().contains("nba_data.json"));
    }

    #[tokio::test]
    async fn test_invalid_json_is_reported() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("nba_data.json"), "[{").unwrap();
        let store = DataStore::new(dir.path(), "nba_team.json", "nba_data.json");

        assert!(matches!(
            store.player_rows().await,
            Err(StatsError::Json { .. })
        ));
    }

    #[test]
    fn test_tree_with_wrong_shape_is_rejected() {
        let path = Path::new("nba_team.json");
        let err = flatten_team_tree(json!({"Celtics": ["not", "seasons"]}), path).unwrap_err();
        assert!(err.to_string().contains("Celtics"));

        assert!(flatten_team_tree(json!([]), path).is_err());
    }

    #[test]
    fn test_rows_must_be_objects() {
        let path = Path::new("nba_data.json");
        assert!(into_rows(json!([{"team": "A"}, 3]), path).is_err());
        assert_eq!(into_rows(json!([]), path).unwrap().len(), 0);
    }

    #[test]
    fn test_empty_season_keeps_its_node() {
        let tree = json!({
            "Lakers": {
                "2019-2020": [],
                "2020-2021": [{"full_name": "A", "points": 5}]
            }
        });

        let flat = flatten_team_tree(tree, Path::new("nba_team.json")).unwrap();
        assert_eq!(flat.rows.len(), 1);
        assert_eq!(
            flat.nodes,
            vec![
                ("Lakers".to_string(), "2019-2020".to_string()),
                ("Lakers".to_string(), "2020-2021".to_string()),
            ]
        );
    }

    #[test]
    fn test_tree_keeps_file_order() {
        let tree: Value =
            serde_json::from_str(r#"{"Lakers": {"2019-2020": []}, "Celtics": {"2019-2020": []}}"#)
                .unwrap();

        let flat = flatten_team_tree(tree, Path::new("nba_team.json")).unwrap();
        let teams: Vec<&str> = flat.nodes.iter().map(|(team, _)| team.as_str()).collect();
        assert_eq!(teams, vec!["Lakers", "Celtics"]);
    }

    #[test]
    fn test_tree_season_filter_applies_to_nodes() {
        let tree = json!({"Lakers": {"2017-2018": [], "2019-2020": [{"points": 1}]}});
        let flat = flatten_team_tree(tree, Path::new("nba_team.json"))
            .unwrap()
            .retain_seasons(&["2019-2020".to_string()]);

        assert_eq!(flat.nodes, vec![("Lakers".to_string(), "2019-2020".to_string())]);
        assert_eq!(flat.rows.len(), 1);
    }
}
