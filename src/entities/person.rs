//! Person entity type - students, faculty and mailroom workers

use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::PersonId;

/// Maximum length of a first or last name
pub const MAX_NAME_LEN: usize = 50;

/// Maximum length of a mailbox number
pub const MAX_BOX_LEN: usize = 5;

/// Maximum length of a department name
pub const MAX_DEPARTMENT_LEN: usize = 100;

/// Class years above this value denote graduate students
pub const LAST_UNDERGRADUATE_YEAR: i64 = 4;

/// A person known to the mailroom
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub wpi_id: PersonId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(default)]
    pub is_student: bool,

    #[serde(default)]
    pub is_mailroom_worker: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub box_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_year: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supervisor_id: Option<PersonId>,
}

impl Person {
    /// Graduate status is derived from the class year, never stored
    pub fn is_graduate(&self) -> bool {
        self.class_year
            .map(|year| year > LAST_UNDERGRADUATE_YEAR)
            .unwrap_or(false)
    }

    /// Display name, falling back to the ID for placeholder records
    pub fn display_name(&self) -> String {
        display_name(
            &self.wpi_id,
            self.first_name.as_deref(),
            self.last_name.as_deref(),
        )
    }
}

/// "First Last" from whichever name parts are known, else the ID
pub fn display_name(id: &PersonId, first: Option<&str>, last: Option<&str>) -> String {
    match (first, last) {
        (Some(first), Some(last)) => format!("{} {}", first, last),
        (Some(name), None) | (None, Some(name)) => name.to_string(),
        (None, None) => id.to_string(),
    }
}

impl Entity for Person {
    const KIND: &'static str = "person";
    const TABLE: &'static str = "persons";
    const KEY_COLUMN: &'static str = "wpi_id";
}

/// Attributes for creating a person
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPerson {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_student: bool,
    pub is_mailroom_worker: bool,
    pub box_number: Option<String>,
    pub class_year: Option<i64>,
    pub supervisor_id: Option<PersonId>,
}

/// Filter for listing persons
#[derive(Debug, Clone, Copy, Default)]
pub struct PersonFilter {
    pub students_only: bool,
    pub workers_only: bool,
}
