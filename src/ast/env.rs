//! Placeholder-key environments carried by expression nodes.

use std::collections::BTreeSet;

/// The set of prepared-parameter keys reachable from a node.
///
/// Every node computes its environment once, at construction, as the union of
/// its children's environments. A tree built from many sub-expressions thus
/// carries every placeholder key used anywhere inside it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Env {
    keys: BTreeSet<String>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment holding a single placeholder key.
    pub fn single(key: impl Into<String>) -> Self {
        let mut keys = BTreeSet::new();
        keys.insert(key.into());
        Self { keys }
    }

    /// Union of all given environments.
    pub fn merged<'a>(envs: impl IntoIterator<Item = &'a Env>) -> Self {
        let mut keys = BTreeSet::new();
        for env in envs {
            keys.extend(env.keys.iter().cloned());
        }
        Self { keys }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merged_is_union() {
        let a = Env::single("start");
        let b = Env::single("end");
        let merged = Env::merged([&a, &b, &a]);
        assert_eq!(merged.keys().collect::<Vec<_>>(), vec!["end", "start"]);
        assert!(a.contains("start") && !a.contains("end"));
    }
}
