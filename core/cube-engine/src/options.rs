//! FILENAME: core/cube-engine/src/options.rs
//! Dropdown Option Deriver.
//!
//! Options always come from the FULL normalized dataset, never from a filtered
//! subset: a dropdown that shrank to the currently visible values would leave
//! the user no way to broaden a filter back out. The `Cube` derives them once
//! per committed load.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use engine::{Dimension, NormalizedRecord};

/// Sorted distinct values per dimension.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimensionOptions {
    values: BTreeMap<Dimension, Vec<String>>,
}

impl DimensionOptions {
    /// The option list for one dimension (empty before any data is loaded).
    pub fn get(&self, dim: Dimension) -> &[String] {
        self.values.get(&dim).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, dim: Dimension, value: &str) -> bool {
        self.get(dim).binary_search_by(|v| v.as_str().cmp(value)).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dimension, &[String])> {
        self.values.iter().map(|(dim, values)| (*dim, values.as_slice()))
    }
}

/// Collects the sorted distinct normalized values of every dimension.
pub fn derive_options(records: &[NormalizedRecord]) -> DimensionOptions {
    let mut sets: [BTreeSet<&str>; Dimension::COUNT] = Default::default();
    for record in records {
        for dim in Dimension::ALL {
            sets[dim.index()].insert(record.dimension(dim));
        }
    }

    let values = Dimension::ALL
        .iter()
        .map(|&dim| {
            let sorted = sets[dim.index()].iter().map(|v| v.to_string()).collect();
            (dim, sorted)
        })
        .collect();
    DimensionOptions { values }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::PredicateSet;
    use crate::filter::apply;
    use engine::{normalize, RawRecord};
    use serde_json::json;

    fn dataset() -> Vec<NormalizedRecord> {
        normalize(vec![
            RawRecord::from_value(json!({ "sector": "Retail", "end_year": 2021 })),
            RawRecord::from_value(json!({ "sector": "Energy", "end_year": "2020" })),
            RawRecord::from_value(json!({ "sector": "Energy" })),
        ])
    }

    #[test]
    fn test_sorted_distinct_values() {
        let options = derive_options(&dataset());
        assert_eq!(options.get(Dimension::Sector), ["Energy", "Retail"]);
        assert_eq!(options.get(Dimension::Year), ["2020", "2021", "Unknown"]);
        assert_eq!(options.get(Dimension::City), ["Unknown"]);
        assert!(options.contains(Dimension::Sector, "Retail"));
        assert!(!options.contains(Dimension::Sector, "Health"));
    }

    #[test]
    fn test_empty_dataset_has_empty_lists() {
        let options = derive_options(&[]);
        for dim in Dimension::ALL {
            assert!(options.get(dim).is_empty());
        }
    }

    #[test]
    fn test_options_unaffected_by_filtering() {
        let records = dataset();
        let before = derive_options(&records);
        let predicates = PredicateSet::new().with_filter(Dimension::Sector, "Retail");
        let _subset = apply(&records, &predicates);
        let after = derive_options(&records);
        assert_eq!(before, after);
    }

    #[test]
    fn test_serializes_keyed_by_dimension() {
        let json = serde_json::to_value(derive_options(&dataset())).unwrap();
        assert_eq!(json["sector"], json!(["Energy", "Retail"]));
        assert_eq!(json["pestle"], json!(["Unknown"]));
    }
}
