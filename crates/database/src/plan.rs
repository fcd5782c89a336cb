//! Load ordering for the workbook import.
//!
//! Relations form a dependency graph through their foreign keys. [`LoadPlan::new`] sorts the
//! mappings so every parent is appended before its children. Ties between ready relations are
//! broken by declaration order, which keeps the plan deterministic.

use std::collections::{BTreeSet, HashMap};
use thiserror::Error;
use vd_types::Relation;

use crate::sheets::{SheetMapping, workbook_mappings};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("relation {0} is mapped more than once")]
    Duplicate(Relation),
    #[error("load plan has a dependency cycle through {0:?}")]
    Cycle(Vec<Relation>),
}

#[derive(Debug, Clone)]
pub struct LoadPlan {
    steps: Vec<SheetMapping>,
}

impl LoadPlan {
    /// Topologically sort `mappings`. Parents outside the set are treated as already loaded.
    pub fn new(mappings: Vec<SheetMapping>) -> Result<Self, PlanError> {
        let mut position: HashMap<Relation, usize> = HashMap::new();
        for (i, m) in mappings.iter().enumerate() {
            if position.insert(m.relation, i).is_some() {
                return Err(PlanError::Duplicate(m.relation));
            }
        }

        let n = mappings.len();
        let mut indegree = vec![0usize; n];
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (i, m) in mappings.iter().enumerate() {
            for parent in m.parents() {
                // self-references would be a cycle of one; keep them so they are reported
                if let Some(&p) = position.get(&parent) {
                    indegree[i] += 1;
                    children[p].push(i);
                }
            }
        }

        // ready set ordered by declaration index
        let mut ready: BTreeSet<usize> = (0..n).filter(|&i| indegree[i] == 0).collect();
        let mut order = Vec::with_capacity(n);
        while let Some(i) = ready.pop_first() {
            order.push(i);
            for &c in &children[i] {
                indegree[c] -= 1;
                if indegree[c] == 0 {
                    ready.insert(c);
                }
            }
        }

        if order.len() < n {
            let stuck = (0..n)
                .filter(|i| indegree[*i] > 0)
                .map(|i| mappings[i].relation)
                .collect();
            return Err(PlanError::Cycle(stuck));
        }

        let mut slots: Vec<Option<SheetMapping>> = mappings.into_iter().map(Some).collect();
        let steps = order.into_iter().filter_map(|i| slots[i].take()).collect();
        Ok(Self { steps })
    }

    /// The plan for the full workbook.
    pub fn workbook() -> Result<Self, PlanError> {
        Self::new(workbook_mappings())
    }

    pub fn steps(&self) -> &[SheetMapping] {
        &self.steps
    }

    pub fn relations(&self) -> Vec<Relation> {
        self.steps.iter().map(|m| m.relation).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::{ForeignKey, mapping_for};

    fn position(order: &[Relation], r: Relation) -> usize {
        order.iter().position(|x| *x == r).unwrap()
    }

    #[test]
    fn workbook_plan_puts_parents_first() {
        let plan = LoadPlan::workbook().unwrap();
        let order = plan.relations();
        assert_eq!(order.len(), 12);
        for m in plan.steps() {
            for parent in m.parents() {
                assert!(
                    position(&order, parent) < position(&order, m.relation),
                    "{parent} must precede {}",
                    m.relation
                );
            }
        }
    }

    #[test]
    fn reversed_declaration_still_sorts() {
        let mut mappings = workbook_mappings();
        mappings.reverse();
        let order = LoadPlan::new(mappings).unwrap().relations();
        assert!(position(&order, Relation::VaccinationEvent) < position(&order, Relation::VaccinePatient));
        assert!(position(&order, Relation::Patient) < position(&order, Relation::Diagnosis));
    }

    #[test]
    fn duplicate_relation_is_rejected() {
        let m = mapping_for(Relation::Patient).unwrap();
        assert_eq!(
            LoadPlan::new(vec![m.clone(), m]).unwrap_err(),
            PlanError::Duplicate(Relation::Patient)
        );
    }

    #[test]
    fn cycle_is_rejected() {
        const BACK: &[ForeignKey] = &[ForeignKey {
            columns: &["ssn"],
            parent: Relation::Diagnosis,
            parent_columns: &["patient"],
        }];
        let mut patient = mapping_for(Relation::Patient).unwrap();
        patient.foreign_keys = BACK;
        let diagnosis = mapping_for(Relation::Diagnosis).unwrap();
        let err = LoadPlan::new(vec![patient, diagnosis]).unwrap_err();
        assert_eq!(
            err,
            PlanError::Cycle(vec![Relation::Patient, Relation::Diagnosis])
        );
    }

    #[test]
    fn parents_outside_the_plan_are_assumed_loaded() {
        let plan = LoadPlan::new(vec![mapping_for(Relation::Diagnosis).unwrap()]).unwrap();
        assert_eq!(plan.relations(), vec![Relation::Diagnosis]);
    }
}
