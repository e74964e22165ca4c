//! One-shot landing dispatch for the generic home route.

use super::access::{Landing, Target};
use super::claims::SessionClaims;
use super::error::ResolverError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeState {
    Unresolved,
    Resolving,
    Resolved(Landing),
    Failed,
}

impl HomeState {
    /// The single navigation a terminal state issues.
    pub fn navigation(&self) -> Option<Target> {
        match self {
            HomeState::Resolved(landing) => Some(Target::Landing(*landing)),
            HomeState::Failed => Some(Target::Authentication),
            HomeState::Unresolved | HomeState::Resolving => None,
        }
    }
}

/// Drives `Unresolved -> Resolving -> Resolved | Failed` for one navigation.
#[derive(Debug)]
pub struct HomeResolver {
    state: HomeState,
}

impl Default for HomeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl HomeResolver {
    pub fn new() -> Self {
        Self {
            state: HomeState::Unresolved,
        }
    }

    pub fn state(&self) -> HomeState {
        self.state
    }

    /// Arrival at the landing route.
    pub fn start(&mut self) -> Result<(), ResolverError> {
        match self.state {
            HomeState::Unresolved => {
                self.state = HomeState::Resolving;
                Ok(())
            }
            from => Err(ResolverError::InvalidTransition {
                from,
                event: "start",
            }),
        }
    }

    /// Feed the decoder's answer and take the resulting navigation.
    pub fn complete(&mut self, session: Option<&SessionClaims>) -> Result<Target, ResolverError> {
        if self.state != HomeState::Resolving {
            return Err(ResolverError::InvalidTransition {
                from: self.state,
                event: "complete",
            });
        }

        self.state = match session {
            Some(claims) => HomeState::Resolved(Landing::for_role(claims.role())),
            None => HomeState::Failed,
        };

        match self.state.navigation() {
            Some(target) => Ok(target),
            None => Err(ResolverError::InvalidTransition {
                from: self.state,
                event: "complete",
            }),
        }
    }

    /// Run a fresh resolver to completion.
    pub fn resolve(session: Option<&SessionClaims>) -> Result<Target, ResolverError> {
        let mut resolver = Self::new();
        resolver.start()?;
        resolver.complete(session)
    }
}
