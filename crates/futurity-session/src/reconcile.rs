//! Reconciling the persisted team selection with freshly loaded teams

use crate::model::Team;
use crate::store::PersistedTeam;

/// Which team becomes current after the user's teams are (re)loaded.
#[derive(Debug, Clone, PartialEq)]
pub enum TeamSelection {
    /// The user has no teams
    NoTeams,
    /// The persisted team is still accessible; carries its fresh record
    Restored(Team),
    /// The persisted team is no longer accessible; falls back to the first team
    Revoked { stale: PersistedTeam, fallback: Team },
    /// Nothing was persisted; the first team is used
    FirstAvailable(Team),
}

impl TeamSelection {
    pub fn team(&self) -> Option<&Team> {
        match self {
            TeamSelection::NoTeams => None,
            TeamSelection::Restored(team)
            | TeamSelection::FirstAvailable(team)
            | TeamSelection::Revoked { fallback: team, .. } => Some(team),
        }
    }

    pub fn into_team(self) -> Option<Team> {
        match self {
            TeamSelection::NoTeams => None,
            TeamSelection::Restored(team)
            | TeamSelection::FirstAvailable(team)
            | TeamSelection::Revoked { fallback: team, .. } => Some(team),
        }
    }
}

/// Pick the current team. "First" is the order the relationship service returned.
pub fn reconcile(available: &[Team], persisted: Option<&PersistedTeam>) -> TeamSelection {
    let Some(first) = available.first() else {
        return TeamSelection::NoTeams;
    };

    match persisted {
        Some(stored) => match available.iter().find(|t| t.unique_id == stored.unique_id) {
            Some(fresh) => TeamSelection::Restored(fresh.clone()),
            None => TeamSelection::Revoked {
                stale: stored.clone(),
                fallback: first.clone(),
            },
        },
        None => TeamSelection::FirstAvailable(first.clone()),
    }
}
