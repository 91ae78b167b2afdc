use serde::{Deserialize, Serialize};
use std::fmt;

/// Vacancy identifier as the board reports it. hh.ru and zarplata.ru use numbers,
/// superjob.ru uses strings; both survive a round trip through the seen-id file unchanged.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VacancyId {
    Numeric(u64),
    Text(String),
}

impl fmt::Display for VacancyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VacancyId::Numeric(id) => write!(f, "{}", id),
            VacancyId::Text(id) => write!(f, "{}", id),
        }
    }
}

impl From<u64> for VacancyId {
    fn from(id: u64) -> Self {
        VacancyId::Numeric(id)
    }
}

impl From<&str> for VacancyId {
    fn from(id: &str) -> Self {
        VacancyId::Text(id.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactInfo {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ContactInfo {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

/// One listing as read from a search page.
#[derive(Debug, Clone, PartialEq)]
pub struct VacancyRecord {
    pub id: VacancyId,
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub city_name: Option<String>,
    pub url: Option<String>,
    pub contact_flag: bool,
    pub employer_id: Option<String>,
    pub is_advertisement: bool,
    pub creation_site: Option<String>,
    pub inline_contact: Option<ContactInfo>,
}

impl VacancyRecord {
    pub fn new(id: impl Into<VacancyId>) -> Self {
        Self {
            id: id.into(),
            title: None,
            company_name: None,
            city_name: None,
            url: None,
            contact_flag: false,
            employer_id: None,
            is_advertisement: false,
            creation_site: None,
            inline_contact: None,
        }
    }
}

/// How a board signals whether another page exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// Cursor-style paging; `has_next` is false when the board reports no next page.
    Cursor { has_next: bool },
    /// Offset paging; the crawl ends at the first empty page.
    UntilEmpty,
}

#[derive(Debug, Clone)]
pub struct SearchPage {
    pub vacancies: Vec<VacancyRecord>,
    pub continuation: Continuation,
}
