//! Role-gate evaluation.

use std::collections::BTreeSet;

use super::claims::{Role, SessionClaims};

/// Non-empty set of roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSet(BTreeSet<Role>);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("a role requirement must name at least one role")]
pub struct EmptyRoleSet;

impl RoleSet {
    pub fn single(role: Role) -> Self {
        Self(BTreeSet::from([role]))
    }

    pub fn try_from_roles(roles: impl IntoIterator<Item = Role>) -> Result<Self, EmptyRoleSet> {
        let roles: BTreeSet<Role> = roles.into_iter().collect();
        if roles.is_empty() {
            return Err(EmptyRoleSet);
        }
        Ok(Self(roles))
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }
}

/// What a protected resource asks of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleRequirement {
    /// Any authenticated session, whatever its role.
    AnyAuthenticated,
    Roles(RoleSet),
}

impl RoleRequirement {
    pub fn only(role: Role) -> Self {
        RoleRequirement::Roles(RoleSet::single(role))
    }

    pub fn admits(&self, role: Role) -> bool {
        match self {
            RoleRequirement::AnyAuthenticated => true,
            RoleRequirement::Roles(roles) => roles.contains(role),
        }
    }
}

/// Role-specific landing screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Landing {
    AdminHome,
    SchoolAdminHome,
    TeacherHome,
    StudentHome,
}

impl Landing {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Admin => Landing::AdminHome,
            Role::SchoolAdmin => Landing::SchoolAdminHome,
            Role::Teacher => Landing::TeacherHome,
            Role::Student => Landing::StudentHome,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Landing::AdminHome => "/admin",
            Landing::SchoolAdminHome => "/schooladmin",
            Landing::TeacherHome => "/teacher",
            Landing::StudentHome => "/student",
        }
    }
}

pub const AUTHENTICATION_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// Navigation destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// Login screen.
    Authentication,
    /// Generic landing route that re-dispatches by role.
    Home,
    Landing(Landing),
}

impl Target {
    pub fn path(&self) -> &'static str {
        match self {
            Target::Authentication => AUTHENTICATION_PATH,
            Target::Home => HOME_PATH,
            Target::Landing(landing) => landing.path(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect(Target),
}

/// Pure evaluator; the single place role strings are compared.
pub struct AccessControl;

impl AccessControl {
    pub fn evaluate(session: Option<&SessionClaims>, required: &RoleRequirement) -> Decision {
        let Some(session) = session else {
            return Decision::Redirect(Target::Authentication);
        };

        if required.admits(session.role()) {
            Decision::Allow
        } else {
            // Sending a valid session back to login would loop; home
            // re-dispatches to the role's own landing screen instead.
            tracing::debug!(
                user_id = session.subject_id(),
                role = %session.role(),
                "Insufficient role for resource"
            );
            Decision::Redirect(Target::Home)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::test_tokens::claims_for;

    fn all_requirements() -> Vec<RoleRequirement> {
        let mut requirements = vec![RoleRequirement::AnyAuthenticated];
        requirements.extend(Role::ALL.into_iter().map(RoleRequirement::only));
        requirements.push(RoleRequirement::Roles(
            RoleSet::try_from_roles([Role::Teacher, Role::SchoolAdmin]).unwrap(),
        ));
        requirements.push(RoleRequirement::Roles(
            RoleSet::try_from_roles(Role::ALL).unwrap(),
        ));
        requirements
    }

    #[test]
    fn test_empty_role_set_rejected() {
        assert_eq!(RoleSet::try_from_roles(Vec::<Role>::new()), Err(EmptyRoleSet));
    }

    #[test]
    fn test_role_set_deduplicates() {
        let set = RoleSet::try_from_roles([Role::Admin, Role::Admin, Role::Student]).unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Role::Admin, Role::Student]);
    }

    #[test]
    fn test_no_session_redirects_to_authentication() {
        for required in all_requirements() {
            assert_eq!(
                AccessControl::evaluate(None, &required),
                Decision::Redirect(Target::Authentication)
            );
        }
    }

    #[test]
    fn test_role_gate_matrix() {
        for role in Role::ALL {
            let claims = claims_for(role);
            for required in all_requirements() {
                let expected = match &required {
                    RoleRequirement::AnyAuthenticated => Decision::Allow,
                    RoleRequirement::Roles(set) if set.contains(role) => Decision::Allow,
                    RoleRequirement::Roles(_) => Decision::Redirect(Target::Home),
                };
                assert_eq!(
                    AccessControl::evaluate(Some(&claims), &required),
                    expected,
                    "role {role} against {required:?}"
                );
            }
        }
    }

    #[test]
    fn test_wrong_role_goes_home_not_login() {
        let claims = claims_for(Role::Teacher);
        let decision = AccessControl::evaluate(Some(&claims), &RoleRequirement::only(Role::Admin));
        assert_eq!(decision, Decision::Redirect(Target::Home));
        assert_ne!(Target::Home.path(), Target::Authentication.path());
    }

    #[test]
    fn test_landing_paths_are_distinct() {
        let paths: BTreeSet<_> = Role::ALL
            .into_iter()
            .map(|role| Landing::for_role(role).path())
            .collect();
        assert_eq!(paths.len(), Role::ALL.len());
        assert!(!paths.contains(AUTHENTICATION_PATH));
        assert!(!paths.contains(HOME_PATH));
    }
}
