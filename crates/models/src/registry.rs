use super::{StorageLocation, TrackedFile};
use std::collections::HashMap;

/// Filename → location map that remembers insertion order.
///
/// Re-marking an existing name changes its location in place and keeps its
/// position, so a selection list built from [`Registry::names`] stays stable
/// across save/upload round trips.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    locations: HashMap<String, StorageLocation>,
    order: Vec<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `name` as living at `location`, returning the previous location if any
    pub fn mark(&mut self, name: &str, location: StorageLocation) -> Option<StorageLocation> {
        let previous = self.locations.insert(name.to_string(), location);
        if previous.is_none() {
            self.order.push(name.to_string());
        }
        previous
    }

    /// Removes `name`, returning where it lived
    pub fn remove(&mut self, name: &str) -> Option<StorageLocation> {
        let previous = self.locations.remove(name)?;
        self.order.retain(|n| n != name);
        Some(previous)
    }

    pub fn location(&self, name: &str) -> Option<StorageLocation> {
        self.locations.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.locations.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.locations.clear();
        self.order.clear();
    }

    /// Lazy iterator over known filenames in insertion order.
    /// The iterator is `Clone`; calling `names()` again starts over.
    pub fn names(&self) -> Names<'_> {
        Names {
            inner: self.order.iter(),
        }
    }

    /// Owned snapshot of every entry, in insertion order
    pub fn snapshot(&self) -> Vec<TrackedFile> {
        self.order
            .iter()
            .filter_map(|name| {
                self.locations.get(name).map(|location| TrackedFile {
                    name: name.clone(),
                    location: *location,
                })
            })
            .collect()
    }

    pub fn count(&self, location: StorageLocation) -> usize {
        self.locations.values().filter(|l| **l == location).count()
    }
}

#[derive(Debug, Clone)]
pub struct Names<'a> {
    inner: std::slice::Iter<'a, String>,
}

impl<'a> Iterator for Names<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(String::as_str)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Names<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_returns_previous_location() {
        let mut registry = Registry::new();

        assert_eq!(registry.mark("cat.png", StorageLocation::Local), None);
        assert_eq!(
            registry.mark("cat.png", StorageLocation::Remote),
            Some(StorageLocation::Local)
        );
        assert_eq!(registry.location("cat.png"), Some(StorageLocation::Remote));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_names_keep_insertion_order() {
        let mut registry = Registry::new();
        registry.mark("b.png", StorageLocation::Local);
        registry.mark("a.png", StorageLocation::Remote);
        registry.mark("c.png", StorageLocation::Local);

        // Re-marking keeps the original slot
        registry.mark("b.png", StorageLocation::Remote);

        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["b.png", "a.png", "c.png"]);
    }

    #[test]
    fn test_names_are_restartable() {
        let mut registry = Registry::new();
        registry.mark("a.png", StorageLocation::Local);
        registry.mark("b.png", StorageLocation::Local);

        let names = registry.names();
        let first_pass: Vec<_> = names.clone().collect();
        let second_pass: Vec<_> = names.collect();
        assert_eq!(first_pass, second_pass);
        assert_eq!(registry.names().len(), 2);
    }

    #[test]
    fn test_remove() {
        let mut registry = Registry::new();
        registry.mark("a.png", StorageLocation::Local);
        registry.mark("b.png", StorageLocation::Remote);

        assert_eq!(registry.remove("a.png"), Some(StorageLocation::Local));
        assert_eq!(registry.remove("a.png"), None);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["b.png"]);
        assert!(!registry.contains("a.png"));
    }

    #[test]
    fn test_snapshot_and_counts() {
        let mut registry = Registry::new();
        registry.mark("a.png", StorageLocation::Local);
        registry.mark("b.png", StorageLocation::Remote);
        registry.mark("c.png", StorageLocation::Remote);

        assert_eq!(registry.count(StorageLocation::Local), 1);
        assert_eq!(registry.count(StorageLocation::Remote), 2);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot[0].name, "a.png");
        assert_eq!(snapshot[2].location, StorageLocation::Remote);

        registry.clear();
        assert!(registry.is_empty());
    }
}
