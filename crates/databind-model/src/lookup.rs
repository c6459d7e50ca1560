use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// A map keyed by names compared without regard to ASCII case.
///
/// The spelling used at first insertion is kept for display.
#[derive(Debug, Clone)]
pub struct CaseInsensitiveMap<V> {
    map: HashMap<String, (String, V)>,
}

impl<V> Default for CaseInsensitiveMap<V> {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
        }
    }
}

impl<V> CaseInsensitiveMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value` under `name`. Returns false and leaves the map
    /// untouched if the name is already present.
    pub fn try_insert(&mut self, name: &str, value: V) -> bool {
        match self.map.entry(name.to_ascii_uppercase()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert((name.to_string(), value));
                true
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.map
            .get(&name.to_ascii_uppercase())
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(&name.to_ascii_uppercase())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterates over `(original spelling, value)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.map.values().map(|(name, value)| (name.as_str(), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_ignore_case() {
        let mut map = CaseInsensitiveMap::new();
        assert!(map.try_insert("Name", 2));
        assert_eq!(map.get("name"), Some(&2));
        assert_eq!(map.get("NAME"), Some(&2));
        assert!(!map.try_insert("nAmE", 3));
        assert_eq!(map.get("Name"), Some(&2));
        assert_eq!(map.iter().collect::<Vec<_>>(), vec![("Name", &2)]);
    }
}
