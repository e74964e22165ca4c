//! Access policy: which role requirement guards which portal screen.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::session::{Role, RoleRequirement, RoleSet, HOME_PATH};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("route {path} must admit at least one role")]
    EmptyRoleSet { path: String },

    #[error("route {path} is declared more than once")]
    DuplicatePath { path: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyEntry {
    pub path: String,
    pub screen: String,
    pub requirement: RoleRequirement,
}

impl PolicyEntry {
    /// Paths with `:param` segments are reachable but have no menu link.
    pub fn is_parameterised(&self) -> bool {
        self.path.split('/').any(|segment| segment.starts_with(':'))
    }
}

/// Menu link for a screen the role may enter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationItem {
    pub screen: String,
    pub path: String,
}

/// Collects entries and checks them once at [`build`](Self::build).
#[derive(Debug, Default)]
pub struct AccessPolicyBuilder {
    entries: Vec<(String, String, Option<Vec<Role>>)>,
}

impl AccessPolicyBuilder {
    pub fn allow(mut self, path: &str, screen: &str, roles: &[Role]) -> Self {
        self.entries
            .push((path.to_string(), screen.to_string(), Some(roles.to_vec())));
        self
    }

    pub fn any_authenticated(mut self, path: &str, screen: &str) -> Self {
        self.entries
            .push((path.to_string(), screen.to_string(), None));
        self
    }

    pub fn build(self) -> Result<AccessPolicy, PolicyError> {
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(self.entries.len());

        for (path, screen, roles) in self.entries {
            if !seen.insert(path.clone()) {
                return Err(PolicyError::DuplicatePath { path });
            }

            let requirement = match roles {
                None => RoleRequirement::AnyAuthenticated,
                Some(roles) => match RoleSet::try_from_roles(roles) {
                    Ok(set) => RoleRequirement::Roles(set),
                    Err(_) => return Err(PolicyError::EmptyRoleSet { path }),
                },
            };

            entries.push(PolicyEntry {
                path,
                screen,
                requirement,
            });
        }

        Ok(AccessPolicy { entries })
    }
}

/// Immutable route table.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    entries: Vec<PolicyEntry>,
}

impl AccessPolicy {
    pub fn builder() -> AccessPolicyBuilder {
        AccessPolicyBuilder::default()
    }

    /// The portal's screens.
    pub fn portal() -> Result<Self, PolicyError> {
        use Role::*;

        Self::builder()
            .allow("/admin", "admin.dashboard", &[Admin])
            .allow("/schooladmin", "schooladmin.dashboard", &[SchoolAdmin])
            .allow("/schooladmin/pending-users", "schooladmin.pending_users", &[SchoolAdmin])
            .allow("/schooladmin/classrooms", "schooladmin.classrooms", &[SchoolAdmin])
            .allow("/schooladmin/subjects", "schooladmin.subjects", &[SchoolAdmin])
            .allow("/schooladmin/assign-subject", "schooladmin.assign_subject", &[SchoolAdmin])
            .allow("/schooladmin/enrollments", "schooladmin.enrollments", &[SchoolAdmin])
            .allow("/schooladmin/timetables", "schooladmin.timetables", &[SchoolAdmin])
            .allow("/schooladmin/calendar", "schooladmin.calendar", &[SchoolAdmin])
            .allow("/schooladmin/syllabus", "schooladmin.syllabus", &[SchoolAdmin])
            .allow("/schooladmin/teaching-logs", "schooladmin.teaching_logs", &[SchoolAdmin])
            .allow("/schooladmin/attendance", "schooladmin.attendance", &[SchoolAdmin])
            .allow("/schooladmin/exams", "schooladmin.exams", &[SchoolAdmin])
            .allow("/schooladmin/assignments", "schooladmin.assignments", &[SchoolAdmin])
            .allow(
                "/schooladmin/assignments/:assignment_id/submissions",
                "schooladmin.submissions",
                &[SchoolAdmin],
            )
            .allow("/schooladmin/marks", "schooladmin.marks", &[SchoolAdmin])
            .allow("/teacher", "teacher.dashboard", &[Teacher])
            .allow("/teacher/attendance", "teacher.attendance", &[Teacher])
            .allow(
                "/teacher/attendance/:class_id/:subject_id",
                "teacher.attendance",
                &[Teacher],
            )
            .allow("/teacher/assignments", "teacher.assignments", &[Teacher])
            .allow("/teacher/syllabus", "teacher.syllabus", &[Teacher])
            .allow("/teacher/teaching-logs", "teacher.teaching_logs", &[Teacher])
            .allow("/teacher/exams", "teacher.exams", &[Teacher])
            .allow("/teacher/marks", "teacher.marks", &[Teacher])
            .allow("/student", "student.dashboard", &[Student])
            .allow("/student/timetable", "student.timetable", &[Student])
            .allow("/student/exams", "student.exams", &[Student])
            .allow("/student/marks", "student.marks", &[Student])
            .allow("/student/assignments", "student.assignments", &[Student])
            .allow(
                "/student/assignments/:assignment_id/submission",
                "student.submission",
                &[Student],
            )
            .allow("/student/attendance", "student.attendance", &[Student])
            .allow("/student/syllabus", "student.syllabus", &[Student])
            .any_authenticated("/profile", "profile")
            .any_authenticated(HOME_PATH, "landing")
            .build()
    }

    pub fn entries(&self) -> &[PolicyEntry] {
        &self.entries
    }

    pub fn requirement_for(&self, path: &str) -> Option<&RoleRequirement> {
        self.entries
            .iter()
            .find(|entry| entry.path == path)
            .map(|entry| &entry.requirement)
    }

    /// Screens `role` may enter, in table order, one link per screen.
    pub fn screens_for(&self, role: Role) -> Vec<NavigationItem> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .filter(|entry| entry.requirement.admits(role) && !entry.is_parameterised())
            .filter(|entry| seen.insert(entry.screen.as_str()))
            .map(|entry| NavigationItem {
                screen: entry.screen.clone(),
                path: entry.path.clone(),
            })
            .collect()
    }
}
