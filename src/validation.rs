//! Field constraints for incoming player data.

use time::OffsetDateTime;

use crate::errors::BackendError;

/// The bounds every stored player must respect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Limits {
    pub max_name_length: usize,
    pub max_title_length: usize,
    pub min_experience: i32,
    pub max_experience: i32,
    pub min_birthday_year: i32,
    pub max_birthday_year: i32,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_name_length: 12,
            max_title_length: 30,
            min_experience: 0,
            max_experience: 10_000_000,
            min_birthday_year: 2000,
            max_birthday_year: 3000,
        }
    }
}

impl Limits {
    pub fn check_name(&self, name: Option<&str>) -> Result<(), BackendError> {
        check_text(name, self.max_name_length, "name")
    }

    pub fn check_title(&self, title: Option<&str>) -> Result<(), BackendError> {
        check_text(title, self.max_title_length, "title")
    }

    pub fn check_experience(&self, experience: Option<i32>) -> Result<(), BackendError> {
        match experience {
            Some(e) if (self.min_experience..=self.max_experience).contains(&e) => Ok(()),
            _ => Err(BackendError::invalid("experience")),
        }
    }

    /// The year is taken in UTC.
    pub fn check_birthday(&self, birthday: Option<OffsetDateTime>) -> Result<(), BackendError> {
        match birthday {
            Some(b) if (self.min_birthday_year..=self.max_birthday_year).contains(&b.year()) => {
                Ok(())
            }
            _ => Err(BackendError::invalid("birthday")),
        }
    }
}

/// IDs are assigned from 1 upwards, so anything lower can never match.
pub fn check_id(id: i64) -> Result<(), BackendError> {
    if id <= 0 {
        Err(BackendError::invalid("id"))
    } else {
        Ok(())
    }
}

fn check_text(
    value: Option<&str>,
    max_length: usize,
    field: &'static str,
) -> Result<(), BackendError> {
    match value {
        Some(v) if !v.is_empty() && v.chars().count() <= max_length => Ok(()),
        _ => Err(BackendError::invalid(field)),
    }
}
