//! Key-addressed sparse policies for exchange with other policy consumers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::error::PolicyError;
use crate::game::State;
use crate::table::PolicyTable;

/// Legal-action probabilities per key string.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SparsePolicy {
    entries: BTreeMap<String, Vec<(Action, f64)>>,
}

impl SparsePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, probabilities: Vec<(Action, f64)>) {
        self.entries.insert(key.into(), probabilities);
    }

    pub fn get(&self, key: &str) -> Option<&[(Action, f64)]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[(Action, f64)])> {
        self.entries
            .iter()
            .map(|(key, probabilities)| (key.as_str(), probabilities.as_slice()))
    }
}

impl<S: State> PolicyTable<S> {
    /// Sparse view of the table: for every key, the (action, probability)
    /// pairs of the row's legal actions in ascending action order.
    ///
    /// Probability stored on an action the legal-actions mask rules out is
    /// dropped.
    pub fn to_sparse(&self) -> SparsePolicy {
        let mut sparse = SparsePolicy::new();
        for (index, key) in self.keys().iter().enumerate() {
            let row = self.row_at(index).unwrap_or(&[]);
            let mask = self.legal_mask(index).unwrap_or(&[]);
            let probabilities = row
                .iter()
                .zip(mask)
                .enumerate()
                .filter(|(_, (_, legal))| **legal)
                .map(|(action, (probability, _))| (action, *probability))
                .collect();
            sparse.insert(key.clone(), probabilities);
        }
        sparse
    }

    /// Write a sparse policy back into the table. Each listed row is cleared
    /// and then filled from its pairs; rows not mentioned keep their values.
    /// Pairs are taken as given, without checking legality or normalization.
    pub fn apply_sparse(&mut self, sparse: &SparsePolicy) -> Result<(), PolicyError> {
        for (key, probabilities) in sparse.iter() {
            let row = self.row_mut(key)?;
            row.fill(0.0);
            for (action, probability) in probabilities {
                if let Some(slot) = row.get_mut(*action) {
                    *slot = *probability;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::KuhnPoker;

    #[test]
    fn sparse_lists_only_legal_actions() -> Result<(), PolicyError> {
        let mut table = PolicyTable::new(&KuhnPoker)?;
        assert_eq!(table.to_sparse().len(), 12);
        table.row_mut("2pb")?.copy_from_slice(&[0.25, 0.75]);
        let sparse = table.to_sparse();
        assert_eq!(sparse.get("2pb"), Some(&[(0, 0.25), (1, 0.75)][..]));
        Ok(())
    }

    #[test]
    fn unknown_keys_are_reported() -> Result<(), PolicyError> {
        let mut table = PolicyTable::new(&KuhnPoker)?;
        let mut sparse = SparsePolicy::new();
        sparse.insert("9", vec![(0, 1.0)]);
        assert_eq!(
            table.apply_sparse(&sparse),
            Err(PolicyError::KeyNotFound("9".to_string()))
        );
        Ok(())
    }
}
