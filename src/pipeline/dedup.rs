use crate::models::{VacancyId, VacancyRecord};
use std::collections::BTreeSet;

/// Tracks which vacancies are already handled: the persisted set from earlier
/// runs plus everything delivered in this one.
#[derive(Debug, Clone, Default)]
pub struct Deduplicator {
    persisted: BTreeSet<VacancyId>,
    delivered: BTreeSet<VacancyId>,
}

impl Deduplicator {
    pub fn new(persisted: BTreeSet<VacancyId>) -> Self {
        Self {
            persisted,
            delivered: BTreeSet::new(),
        }
    }

    pub fn is_new(&self, id: &VacancyId) -> bool {
        !self.persisted.contains(id) && !self.delivered.contains(id)
    }

    /// New, not an advertisement, and flagged as having contacts.
    pub fn is_candidate(&self, vacancy: &VacancyRecord) -> bool {
        !vacancy.is_advertisement && vacancy.contact_flag && self.is_new(&vacancy.id)
    }

    /// Candidates of a page in page order, each id at most once.
    pub fn candidates<'a>(&self, vacancies: &'a [VacancyRecord]) -> Vec<&'a VacancyRecord> {
        let mut taken = BTreeSet::new();
        vacancies
            .iter()
            .filter(|&vacancy| self.is_candidate(vacancy) && taken.insert(&vacancy.id))
            .collect()
    }

    pub fn mark_delivered(&mut self, id: VacancyId) {
        self.delivered.insert(id);
    }

    pub fn persisted_count(&self) -> usize {
        self.persisted.len()
    }

    pub fn delivered_count(&self) -> usize {
        self.delivered.len()
    }

    /// `persisted ∪ delivered`, the set to write back.
    pub fn snapshot(&self) -> BTreeSet<VacancyId> {
        self.persisted.union(&self.delivered).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: u64) -> VacancyRecord {
        VacancyRecord {
            contact_flag: true,
            ..VacancyRecord::new(id)
        }
    }

    #[test]
    fn test_persisted_and_delivered_are_not_new() {
        let mut dedup = Deduplicator::new([VacancyId::from(1)].into());
        assert!(!dedup.is_new(&VacancyId::from(1)));
        assert!(dedup.is_new(&VacancyId::from(2)));

        dedup.mark_delivered(VacancyId::from(2));
        assert!(!dedup.is_new(&VacancyId::from(2)));
    }

    #[test]
    fn test_candidates_skip_ads_and_hidden_contacts() {
        let dedup = Deduplicator::default();
        let ad = VacancyRecord {
            is_advertisement: true,
            ..listing(3)
        };
        let hidden = VacancyRecord::new(4);
        let page = vec![listing(1), ad, hidden, listing(5), listing(1)];

        let ids: Vec<_> = dedup
            .candidates(&page)
            .iter()
            .map(|vacancy| vacancy.id.clone())
            .collect();
        assert_eq!(ids, vec![VacancyId::from(1), VacancyId::from(5)]);
    }

    #[test]
    fn test_snapshot_only_grows() {
        let before: BTreeSet<VacancyId> = [VacancyId::from(1), VacancyId::from("x")].into();
        let mut dedup = Deduplicator::new(before.clone());
        dedup.mark_delivered(VacancyId::from(7));
        dedup.mark_delivered(VacancyId::from(1));

        let after = dedup.snapshot();
        assert!(after.is_superset(&before));
        assert_eq!(after.len(), 3);
        assert_eq!(dedup.persisted_count(), 2);
        assert_eq!(dedup.delivered_count(), 2);
    }
}
