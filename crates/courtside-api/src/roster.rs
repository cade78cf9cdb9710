//! Hosted roster database (PostgREST over HTTP)
//!
//! ```text
//! GET {url}/rest/v1/equipes?select=id,nome,jogadores(id,nome,contato)&status=eq.pre_agendado
//! GET {url}/rest/v1/jogadores?select=nome,contato&equipe_id=eq.{team_id}
//!
//! headers: apikey: <anon key>
//!          Authorization: Bearer <anon key>
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use courtside_core::{Player, RosterTeam};

use crate::config::RosterConfig;
use crate::http::HttpClient;
use crate::ClientResult;

/// Status value that marks a team as pre-scheduled.
pub const PRE_SCHEDULED_STATUS: &str = "pre_agendado";

const TEAMS_PATH: &str = "rest/v1/equipes";
const PLAYERS_PATH: &str = "rest/v1/jogadores";

/// Read-only source of teams and players.
#[async_trait]
pub trait RosterSource: Send + Sync {
    /// Pre-scheduled teams, each with its players.
    async fn pre_scheduled_teams(&self) -> ClientResult<Vec<RosterTeam>>;

    /// Players of one team, in the order the source returns them.
    async fn players(&self, team_id: &str) -> ClientResult<Vec<Player>>;
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct TeamRow {
    #[serde(deserialize_with = "id_string")]
    id: String,
    #[serde(default)]
    nome: Option<String>,
    #[serde(default)]
    jogadores: Option<Vec<PlayerRow>>,
}

#[derive(Debug, Deserialize)]
struct PlayerRow {
    #[serde(default)]
    nome: Option<String>,
    #[serde(default)]
    contato: Option<String>,
}

impl From<PlayerRow> for Player {
    fn from(row: PlayerRow) -> Self {
        Player {
            name: row.nome,
            contact: row.contato,
        }
    }
}

impl From<TeamRow> for RosterTeam {
    fn from(row: TeamRow) -> Self {
        RosterTeam {
            id: row.id,
            name: row.nome.unwrap_or_default(),
            players: row
                .jogadores
                .unwrap_or_default()
                .into_iter()
                .map(Player::from)
                .collect(),
        }
    }
}

fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "team id must be a string or number, got {other}"
        ))),
    }
}

// =============================================================================
// HTTP implementation
// =============================================================================

/// `RosterSource` over the hosted database's REST interface.
#[derive(Debug, Clone)]
pub struct RestRoster {
    http: HttpClient,
}

impl RestRoster {
    pub fn new(config: &RosterConfig) -> ClientResult<Self> {
        let bearer = format!("Bearer {}", config.anon_key);
        let http = HttpClient::new(
            config.url.clone(),
            config.timeout,
            &[
                ("apikey", config.anon_key.as_str()),
                ("authorization", bearer.as_str()),
            ],
        )?;
        Ok(Self { http })
    }
}

#[async_trait]
impl RosterSource for RestRoster {
    async fn pre_scheduled_teams(&self) -> ClientResult<Vec<RosterTeam>> {
        let status = format!("eq.{PRE_SCHEDULED_STATUS}");
        let rows: Vec<TeamRow> = self
            .http
            .get_with_query(
                TEAMS_PATH,
                &[
                    ("select", "id,nome,jogadores(id,nome,contato)"),
                    ("status", status.as_str()),
                ],
            )
            .await?;
        debug!(count = rows.len(), "Pre-scheduled teams fetched");
        Ok(rows.into_iter().map(RosterTeam::from).collect())
    }

    async fn players(&self, team_id: &str) -> ClientResult<Vec<Player>> {
        let team_filter = format!("eq.{team_id}");
        let rows: Vec<PlayerRow> = self
            .http
            .get_with_query(
                PLAYERS_PATH,
                &[("select", "nome,contato"), ("equipe_id", team_filter.as_str())],
            )
            .await?;
        debug!(team_id, count = rows.len(), "Team players fetched");
        Ok(rows.into_iter().map(Player::from).collect())
    }
}
