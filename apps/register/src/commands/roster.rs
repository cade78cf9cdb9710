//! # Roster Commands
//!
//! Pre-scheduled teams with a drill-down into one team's players.
//!
//! ```text
//! teams ──► RosterSource::pre_scheduled_teams ──► summary list
//! team 2 ─► RosterSource::players(team_id) ─────► detail view
//! hide ───► detail cleared, summary list kept
//! ```
//!
//! A failed fetch leaves whatever was on screen before.

use tracing::{debug, error, info};

use courtside_core::{TeamDetail, TeamSummary};

use crate::error::ApiError;
use crate::state::{RemoteState, RosterState};

/// Fetches pre-scheduled teams and replaces the summary list.
pub async fn list_teams(
    remote: &RemoteState,
    roster: &RosterState,
) -> Result<Vec<TeamSummary>, ApiError> {
    debug!("list_teams command");
    let teams = remote.roster()?.pre_scheduled_teams().await.map_err(|e| {
        error!(error = %e, "Team fetch failed");
        ApiError::from(e)
    })?;

    let summaries = roster.with_view_mut(|view| {
        view.replace_teams(&teams);
        view.teams().to_vec()
    });
    info!(count = summaries.len(), "Pre-scheduled teams loaded");
    Ok(summaries)
}

/// Opens the detail view for the team at `index` in the summary list.
pub async fn show_team(
    remote: &RemoteState,
    roster: &RosterState,
    index: usize,
) -> Result<TeamDetail, ApiError> {
    debug!(index, "show_team command");
    let summary = roster.with_view(|view| view.team(index).cloned())?;

    let players = remote
        .roster()?
        .players(&summary.team_id)
        .await
        .map_err(|e| {
            error!(team_id = %summary.team_id, error = %e, "Player fetch failed");
            ApiError::from(e)
        })?;

    let detail = TeamDetail {
        team: summary.clone(),
        players: players.clone(),
    };
    roster.with_view_mut(|view| view.show_detail(summary, players));
    Ok(detail)
}

/// Closes the detail view.
pub fn hide_team(roster: &RosterState) {
    debug!("hide_team command");
    roster.with_view_mut(|view| view.close_detail());
}

/// The summary list currently on screen.
pub fn get_teams(roster: &RosterState) -> Vec<TeamSummary> {
    roster.with_view(|view| view.teams().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{roster_team, Harness};
    use crate::error::ErrorCode;
    use courtside_core::roster::NOT_PROVIDED;

    #[tokio::test]
    async fn test_team_detail_keeps_backend_order() {
        let h = Harness::new();
        h.roster_source.set_teams(vec![
            roster_team("7", "Falcons", &[("Bia", Some("11 98888-0000")), ("Caio", None)]),
            roster_team("9", "Owls", &[]),
        ]);

        let teams = list_teams(&h.remote, &h.roster).await.unwrap();
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0].player_name, "Bia");
        assert_eq!(teams[1].player_name, NOT_PROVIDED);

        let detail = show_team(&h.remote, &h.roster, 0).await.unwrap();
        let names: Vec<&str> = detail.players.iter().map(|p| p.display_name()).collect();
        assert_eq!(names, vec!["Bia", "Caio"]);

        hide_team(&h.roster);
        assert!(h.roster.with_view(|v| v.detail().is_none()));
        assert_eq!(get_teams(&h.roster).len(), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_list() {
        let h = Harness::new();
        h.roster_source
            .set_teams(vec![roster_team("7", "Falcons", &[("Bia", None)])]);
        list_teams(&h.remote, &h.roster).await.unwrap();

        h.roster_source.set_failing(true);
        assert!(list_teams(&h.remote, &h.roster).await.is_err());
        assert!(show_team(&h.remote, &h.roster, 0).await.is_err());
        assert_eq!(get_teams(&h.roster).len(), 1);
        assert!(h.roster.with_view(|v| v.detail().is_none()));
    }

    #[tokio::test]
    async fn test_bad_team_index() {
        let h = Harness::new();
        let err = show_team(&h.remote, &h.roster, 0).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
