use super::{QueryTarget, Taxonomy, TaxonomyEntry};
use crate::config::Whitelist;
use log::debug;
use std::collections::BTreeSet;

/// Crosses every whitelisted location with every whitelisted role.
///
/// A region with an id of its own is searchable alongside its child locations.
/// The result is sorted and free of duplicates, whatever order the taxonomy
/// arrived in.
pub fn resolve_targets(taxonomy: &Taxonomy, whitelist: &Whitelist) -> Vec<QueryTarget> {
    let roles: Vec<&TaxonomyEntry> = taxonomy
        .roles()
        .filter(|role| whitelist.roles.contains(&role.id))
        .collect();

    let mut targets = BTreeSet::new();
    for country in &taxonomy.countries {
        for region in &country.regions {
            let region_entry = region
                .id
                .as_ref()
                .map(|id| TaxonomyEntry::new(id.clone(), region.name.clone()));
            let locations = region.locations.iter().chain(region_entry.iter());

            for location in locations {
                for role in &roles {
                    if !whitelist.allows(&location.id, &role.id) {
                        continue;
                    }
                    targets.insert(QueryTarget {
                        country: country.name.clone(),
                        region: region.name.clone(),
                        location_id: location.id.clone(),
                        location_name: location.text.clone(),
                        role_id: role.id.clone(),
                        role_name: role.text.clone(),
                    });
                }
            }
        }
    }

    debug!("Resolved {} query targets", targets.len());
    targets.into_iter().collect()
}
