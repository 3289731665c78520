//! Plan selection for the bill draft, keyed by plan id.

use ledger_client::Plan;
use std::collections::HashSet;
use uuid::Uuid;

/// Plans the operator picked for the next bill draft.
///
/// Stored as a set; display order always follows the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanSelection {
    selected: HashSet<Uuid>,
}

impl PlanSelection {
    /// Returns whether the plan is selected afterwards
    pub fn toggle(&mut self, plan_id: Uuid) -> bool {
        if self.selected.remove(&plan_id) {
            false
        } else {
            self.selected.insert(plan_id);
            true
        }
    }

    pub fn select(&mut self, plan_id: Uuid) {
        self.selected.insert(plan_id);
    }

    pub fn deselect(&mut self, plan_id: Uuid) {
        self.selected.remove(&plan_id);
    }

    pub fn contains(&self, plan_id: Uuid) -> bool {
        self.selected.contains(&plan_id)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Drop ids that are no longer in the catalog
    pub fn retain_catalog(&mut self, catalog: &[Plan]) {
        self.selected
            .retain(|id| catalog.iter().any(|plan| plan.id == *id));
    }

    /// Selected plans in catalog order
    pub fn ordered<'a>(&self, catalog: &'a [Plan]) -> Vec<&'a Plan> {
        catalog
            .iter()
            .filter(|plan| self.selected.contains(&plan.id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn plan(name: &str) -> Plan {
        Plan {
            id: Uuid::new_v4(),
            name: name.to_string(),
            monthly_price: dec!(100),
            code: name.to_uppercase(),
            active: true,
        }
    }

    #[test]
    fn test_order_follows_catalog_not_clicks() {
        let catalog = vec![plan("a"), plan("b"), plan("c")];
        let mut selection = PlanSelection::default();
        selection.toggle(catalog[2].id);
        selection.toggle(catalog[0].id);

        let names: Vec<_> = selection.ordered(&catalog).iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn test_toggle_twice_deselects() {
        let id = Uuid::new_v4();
        let mut selection = PlanSelection::default();
        assert!(selection.toggle(id));
        assert!(!selection.toggle(id));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_retain_catalog_drops_retired_plans() {
        let catalog = vec![plan("a")];
        let mut selection = PlanSelection::default();
        selection.select(catalog[0].id);
        selection.select(Uuid::new_v4());
        selection.retain_catalog(&catalog);
        assert_eq!(selection.len(), 1);
        assert!(selection.contains(catalog[0].id));
    }
}
