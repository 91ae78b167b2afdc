mod resolver;

pub use resolver::resolve_targets;

use std::fmt;

/// A named node of a board's taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyEntry {
    pub id: String,
    pub text: String,
}

impl TaxonomyEntry {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Searchable id of the region itself, if the board has one.
    pub id: Option<String>,
    pub name: String,
    pub locations: Vec<TaxonomyEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Country {
    pub name: String,
    pub regions: Vec<Region>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleGroup {
    pub name: Option<String>,
    pub roles: Vec<TaxonomyEntry>,
}

/// Locations and roles a board can be searched by.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Taxonomy {
    pub countries: Vec<Country>,
    pub role_groups: Vec<RoleGroup>,
}

impl Taxonomy {
    pub fn roles(&self) -> impl Iterator<Item = &TaxonomyEntry> {
        self.role_groups.iter().flat_map(|group| group.roles.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueryTarget {
    pub country: String,
    pub region: String,
    pub location_id: String,
    pub location_name: String,
    pub role_id: String,
    pub role_name: String,
}

impl fmt::Display for QueryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} / {} / {}",
            self.country, self.region, self.location_name, self.role_name
        )
    }
}
