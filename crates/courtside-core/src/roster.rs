//! # Team Roster
//!
//! Read-only view model for the pre-scheduled teams screen.
//!
//! ```text
//! RosterSource::pre_scheduled_teams() ──► replace_teams() ──► summary list
//!                                                                 │
//!            team 2 ──► RosterSource::players(team_id) ──► show_detail()
//!                                                                 │
//!                                               hide ──► close_detail()
//!                                              (summary list is kept)
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

/// Shown in place of a missing player name or contact.
pub const NOT_PROVIDED: &str = "not provided";

/// A player as returned by the roster source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub name: Option<String>,
    pub contact: Option<String>,
}

impl Player {
    pub fn display_name(&self) -> &str {
        or_placeholder(self.name.as_deref())
    }

    pub fn display_contact(&self) -> &str {
        or_placeholder(self.contact.as_deref())
    }
}

/// A team joined with its players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RosterTeam {
    pub id: String,
    pub name: String,
    pub players: Vec<Player>,
}

/// One row of the summary list: the team and its first player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    pub team_id: String,
    pub team_name: String,
    pub player_name: String,
    pub contact: String,
}

impl TeamSummary {
    pub fn from_team(team: &RosterTeam) -> Self {
        let first = team.players.first();
        TeamSummary {
            team_id: team.id.clone(),
            team_name: team.name.clone(),
            player_name: or_placeholder(first.and_then(|p| p.name.as_deref())).to_string(),
            contact: or_placeholder(first.and_then(|p| p.contact.as_deref())).to_string(),
        }
    }

    /// `tel:` link for the first player's contact, when there is one.
    pub fn dial_uri(&self) -> Option<String> {
        if self.contact == NOT_PROVIDED {
            return None;
        }
        let digits: String = self
            .contact
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .collect();
        (!digits.is_empty()).then(|| format!("tel:{digits}"))
    }
}

/// The open detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TeamDetail {
    pub team: TeamSummary,
    /// In the order the roster source returned them.
    pub players: Vec<Player>,
}

/// Summary list plus the optional detail view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RosterView {
    teams: Vec<TeamSummary>,
    detail: Option<TeamDetail>,
}

impl RosterView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn teams(&self) -> &[TeamSummary] {
        &self.teams
    }

    pub fn detail(&self) -> Option<&TeamDetail> {
        self.detail.as_ref()
    }

    pub fn team(&self, index: usize) -> CoreResult<&TeamSummary> {
        let len = self.teams.len();
        self.teams
            .get(index)
            .ok_or(CoreError::TeamIndexOutOfRange { index, len })
    }

    /// Replaces the summary list with freshly fetched teams.
    pub fn replace_teams(&mut self, teams: &[RosterTeam]) {
        self.teams = teams.iter().map(TeamSummary::from_team).collect();
    }

    /// Opens the detail view for `team`.
    pub fn show_detail(&mut self, team: TeamSummary, players: Vec<Player>) {
        self.detail = Some(TeamDetail { team, players });
    }

    /// Closes the detail view. The summary list is not touched.
    pub fn close_detail(&mut self) {
        self.detail = None;
    }
}

fn or_placeholder(value: Option<&str>) -> &str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => NOT_PROVIDED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(name: &str, contact: &str) -> Player {
        Player {
            name: Some(name.to_string()),
            contact: Some(contact.to_string()),
        }
    }

    fn team(id: &str, name: &str, players: Vec<Player>) -> RosterTeam {
        RosterTeam {
            id: id.to_string(),
            name: name.to_string(),
            players,
        }
    }

    #[test]
    fn test_summary_uses_first_player() {
        let t = team(
            "1",
            "Falcons",
            vec![player("Bia", "11 98888-0000"), player("Caio", "11 97777-0000")],
        );
        let summary = TeamSummary::from_team(&t);
        assert_eq!(summary.player_name, "Bia");
        assert_eq!(summary.dial_uri().as_deref(), Some("tel:11988880000"));
    }

    #[test]
    fn test_missing_player_is_not_provided() {
        let summary = TeamSummary::from_team(&team("2", "Owls", vec![]));
        assert_eq!(summary.player_name, NOT_PROVIDED);
        assert_eq!(summary.contact, NOT_PROVIDED);
        assert_eq!(summary.dial_uri(), None);

        let blank = Player {
            name: Some("  ".to_string()),
            contact: None,
        };
        assert_eq!(blank.display_name(), NOT_PROVIDED);
    }

    #[test]
    fn test_detail_keeps_order_and_closing_keeps_list() {
        let mut view = RosterView::new();
        view.replace_teams(&[team("1", "Falcons", vec![player("Bia", "1")])]);

        let summary = view.team(0).unwrap().clone();
        view.show_detail(summary, vec![player("Bia", "1"), player("Caio", "2")]);
        let names: Vec<&str> = view
            .detail()
            .unwrap()
            .players
            .iter()
            .map(Player::display_name)
            .collect();
        assert_eq!(names, vec!["Bia", "Caio"]);

        view.close_detail();
        assert!(view.detail().is_none());
        assert_eq!(view.teams().len(), 1);
    }

    #[test]
    fn test_team_index_out_of_range() {
        let view = RosterView::new();
        assert_eq!(
            view.team(0).unwrap_err(),
            CoreError::TeamIndexOutOfRange { index: 0, len: 0 }
        );
    }
}
