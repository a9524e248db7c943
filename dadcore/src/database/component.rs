use std::collections::HashMap;

use crate::error::{DadError, DadResult};
use crate::peak::Peak;

/// Registry of named reference peaks used for compound identification.
///
/// Names are unique and entries are kept in insertion order. The registry
/// only grows.
#[derive(Clone, Debug, Default)]
pub struct ComponentDatabase<'a> {
    entries: Vec<(String, Peak<'a>)>,
    index: HashMap<String, usize>,
}

impl<'a> ComponentDatabase<'a> {
    pub fn new() -> Self {
        ComponentDatabase { entries: Vec::new(), index: HashMap::new() }
    }

    /// Registers `peak` as the reference for `name`.
    ///
    /// # Errors
    ///
    /// `DuplicateComponent` if `name` is already registered; the database is left unchanged.
    pub fn add_peak(&mut self, peak: Peak<'a>, name: &str) -> DadResult<()> {
        if self.index.contains_key(name) {
            return Err(DadError::DuplicateComponent(name.to_string()));
        }
        log::debug!("registered component '{}' at time {}", name, peak.maximum());
        self.index.insert(name.to_string(), self.entries.len());
        self.entries.push((name.to_string(), peak));
        Ok(())
    }

    /// Exact name lookup, no prefix or substring matching.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> DadResult<&Peak<'a>> {
        self.index
            .get(name)
            .map(|&i| &self.entries[i].1)
            .ok_or_else(|| DadError::MissingComponent(name.to_string()))
    }

    /// Registered names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// `(name, reference peak)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Peak<'a>)> + '_ {
        self.entries.iter().map(|(name, peak)| (name.as_str(), peak))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'d, 'a> IntoIterator for &'d ComponentDatabase<'a> {
    type Item = &'d str;
    type IntoIter = std::iter::Map<std::slice::Iter<'d, (String, Peak<'a>)>, fn(&'d (String, Peak<'a>)) -> &'d str>;

    fn into_iter(self) -> Self::IntoIter {
        fn name<'e>(entry: &'e (String, Peak<'_>)) -> &'e str {
            entry.0.as_str()
        }
        self.entries.iter().map(name as fn(&'d (String, Peak<'a>)) -> &'d str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::ten_compound_dataset;

    #[test]
    fn test_add_and_get() {
        let ds = ten_compound_dataset(0.0);
        let first = Peak::new(90, 110, 100, &ds).unwrap();
        let second = Peak::new(140, 160, 150, &ds).unwrap();
        let first_spectrum = first.spectra().to_vec();

        let mut db = ComponentDatabase::new();
        assert!(db.is_empty());
        db.add_peak(first, "caffeine").unwrap();
        db.add_peak(second, "theobromine").unwrap();
        assert_eq!(db.len(), 2);

        let stored = db.get("caffeine").unwrap();
        assert_eq!((stored.left(), stored.right(), stored.maximum()), (90, 110, 100));
        assert_eq!(stored.spectra(), first_spectrum.as_slice());
        let stored = db.get("theobromine").unwrap();
        assert_eq!((stored.left(), stored.right(), stored.maximum()), (140, 160, 150));
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let ds = ten_compound_dataset(0.0);
        let mut db = ComponentDatabase::new();
        db.add_peak(Peak::new(90, 110, 100, &ds).unwrap(), "caffeine").unwrap();
        let result = db.add_peak(Peak::new(140, 160, 150, &ds).unwrap(), "caffeine");
        assert!(matches!(result, Err(DadError::DuplicateComponent(name)) if name == "caffeine"));
        assert_eq!(db.len(), 1);
        assert_eq!(db.get("caffeine").unwrap().maximum(), 100);
    }

    #[test]
    fn test_missing_name_and_exact_membership() {
        let ds = ten_compound_dataset(0.0);
        let mut db = ComponentDatabase::new();
        db.add_peak(Peak::new(90, 110, 100, &ds).unwrap(), "caffeine").unwrap();

        assert!(db.contains("caffeine"));
        assert!(!db.contains("caff"));
        assert!(!db.contains("caffeine "));
        assert!(!db.contains("Caffeine"));
        assert!(matches!(db.get("paraxanthine"), Err(DadError::MissingComponent(_))));
    }

    #[test]
    fn test_iteration_keeps_insertion_order() {
        let ds = ten_compound_dataset(0.0);
        let mut db = ComponentDatabase::new();
        for (name, apex) in [("zeta", 100), ("alpha", 150), ("mu", 200)] {
            db.add_peak(Peak::new(apex - 5, apex + 5, apex, &ds).unwrap(), name).unwrap();
        }
        let names: Vec<&str> = db.names().collect();
        assert_eq!(names, vec!["zeta", "alpha", "mu"]);

        let mut via_ref = Vec::new();
        for name in &db {
            via_ref.push(name);
        }
        assert_eq!(via_ref, names);

        let apexes: Vec<usize> = db.iter().map(|(_, peak)| peak.maximum()).collect();
        assert_eq!(apexes, vec![100, 150, 200]);
    }
}
