//! The version chain and its bump/reset cascade

use std::collections::HashSet;
use std::fmt;

use tracing::{debug, info};

use crate::version::error::{ConfigError, LookupError};
use crate::version::kind::PartValue;
use crate::version::part::{Part, PartSpec};

/// An ordered chain of parts making up one version
///
/// Parts are linked parent to child in declaration order and the topology is
/// fixed once the chain is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionChain {
    parts: Vec<Part>,
}

impl VersionChain {
    /// Build a chain from parts in declaration order.
    ///
    /// Fails on duplicate keys or on a `requires` that names the part itself
    /// or a key that is not in the chain.
    pub fn new(parts: Vec<Part>) -> Result<Self, ConfigError> {
        let mut chain = Self { parts };
        chain.link();
        chain.validate_keys()?;
        chain.validate_requires()?;

        debug!(
            "Built version chain: {:?}",
            chain.parts.iter().map(Part::key).collect::<Vec<_>>()
        );
        Ok(chain)
    }

    /// Build a chain of unset parts
    pub fn from_specs(specs: impl IntoIterator<Item = PartSpec>) -> Result<Self, ConfigError> {
        Self::new(specs.into_iter().map(Part::new).collect())
    }

    fn link(&mut self) {
        for part in &mut self.parts {
            part.parent = None;
            part.child = None;
        }
        for parent in 1..self.parts.len() {
            self.set_child(parent - 1, parent);
        }
    }

    fn set_child(&mut self, parent: usize, child: usize) {
        self.parts[parent].child = Some(child);
        self.parts[child].parent = Some(parent);
    }

    fn validate_keys(&self) -> Result<(), ConfigError> {
        let mut keys = HashSet::new();
        for part in &self.parts {
            if !keys.insert(part.key()) {
                return Err(ConfigError::DuplicateKey {
                    key: part.key().to_string(),
                });
            }
        }
        Ok(())
    }

    fn validate_requires(&self) -> Result<(), ConfigError> {
        for part in &self.parts {
            let Some(requires) = part.requires() else {
                continue;
            };

            if requires == part.key() {
                return Err(ConfigError::SelfRequires {
                    key: part.key().to_string(),
                });
            }
            if !self.parts.iter().any(|p| p.key() == requires) {
                return Err(ConfigError::UnknownRequires {
                    key: part.key().to_string(),
                    requires: requires.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Current value of every part, in chain order
    pub fn values(&self) -> impl Iterator<Item = (&str, Option<&PartValue>)> {
        self.parts.iter().map(|part| (part.key(), part.value()))
    }

    pub fn part(&self, key: &str) -> Result<&Part, LookupError> {
        self.index_of(key).map(|index| &self.parts[index])
    }

    fn index_of(&self, key: &str) -> Result<usize, LookupError> {
        self.parts
            .iter()
            .position(|part| part.key() == key)
            .ok_or_else(|| LookupError::NotFound(key.to_string()))
    }

    /// Resolve every key before anything is mutated, so an unknown key leaves
    /// the chain untouched.
    fn indices_of<S: AsRef<str>>(&self, keys: &[S]) -> Result<Vec<usize>, LookupError> {
        keys.iter().map(|key| self.index_of(key.as_ref())).collect()
    }

    /// Bump the parts named by `keys`, in order.
    ///
    /// Each bump resets the bumped part's descendants, so a key listed after
    /// one of its ancestors restarts from its start value and then advances
    /// from there on its own bump.
    pub fn bump<S: AsRef<str>>(&mut self, keys: &[S]) -> Result<(), LookupError> {
        let indices = self.indices_of(keys)?;
        for index in indices {
            self.bump_at(index);
        }
        info!("Bumped {:?}: {}", keys_of(keys), self);
        Ok(())
    }

    /// Reset the parts named by `keys`, in order
    pub fn reset<S: AsRef<str>>(&mut self, keys: &[S]) -> Result<(), LookupError> {
        let indices = self.indices_of(keys)?;
        for index in indices {
            self.reset_at(index);
        }
        info!("Reset {:?}: {}", keys_of(keys), self);
        Ok(())
    }

    /// Whether a set ancestor of `key` requires it
    pub fn is_required(&self, key: &str) -> Result<bool, LookupError> {
        self.index_of(key).map(|index| self.is_required_at(index))
    }

    fn bump_at(&mut self, index: usize) {
        let next = self.parts[index].next_value();
        debug!(
            "Bumping `{}`: {:?} -> {:?}",
            self.parts[index].key(),
            self.parts[index].value(),
            next
        );
        self.parts[index].set_value(next);

        if let Some(child) = self.parts[index].child() {
            self.reset_at(child);
        }
    }

    /// Reset `index` and every part below it. Each part takes its start value
    /// when required by a set ancestor and is cleared otherwise.
    fn reset_at(&mut self, index: usize) {
        let mut cursor = Some(index);
        while let Some(current) = cursor {
            let value = self
                .is_required_at(current)
                .then(|| self.parts[current].start());
            self.parts[current].set_value(value);
            cursor = self.parts[current].child();
        }
    }

    fn is_required_at(&self, index: usize) -> bool {
        let key = self.parts[index].key();
        let mut cursor = self.parts[index].parent();

        // A chain has no cycles, so the walk reaches the head within len steps.
        for _ in 0..self.parts.len() {
            let Some(ancestor) = cursor.map(|i| &self.parts[i]) else {
                return false;
            };
            if ancestor.requires() == Some(key) && ancestor.is_set() {
                return true;
            }
            cursor = ancestor.parent();
        }
        false
    }
}

fn keys_of<S: AsRef<str>>(keys: &[S]) -> Vec<&str> {
    keys.iter().map(AsRef::as_ref).collect()
}

impl fmt::Display for VersionChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in self.parts.iter().filter(|part| part.is_set()) {
            write!(f, "{}", part)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::kind::{IdentifierRules, NumberRules};
    use rstest::rstest;

    fn number(key: &str) -> PartSpec {
        PartSpec::number(key, NumberRules::default())
    }

    fn set(spec: PartSpec, value: u64) -> Part {
        Part::with_value(spec, Some(PartValue::Number(value))).unwrap()
    }

    fn identifier(key: &str, strings: &[&str]) -> PartSpec {
        let strings = strings.iter().map(|s| s.to_string()).collect();
        PartSpec::identifier(key, IdentifierRules::new(key, strings, None).unwrap())
    }

    #[test]
    fn new_links_parts_in_declaration_order() {
        let chain = VersionChain::from_specs([number("a"), number("b"), number("c")]).unwrap();

        let links: Vec<_> = chain
            .parts()
            .iter()
            .map(|p| (p.parent(), p.child()))
            .collect();
        assert_eq!(
            links,
            vec![(None, Some(1)), (Some(0), Some(2)), (Some(1), None)]
        );
    }

    #[test]
    fn parent_and_child_links_are_reciprocal() {
        let chain = VersionChain::from_specs([number("a"), number("b"), number("c")]).unwrap();

        for (index, part) in chain.parts().iter().enumerate() {
            if let Some(child) = part.child() {
                assert_eq!(chain.parts()[child].parent(), Some(index));
            }
        }
    }

    #[rstest]
    #[case(
        vec![number("a"), number("b"), number("a")],
        ConfigError::DuplicateKey { key: "a".to_string() }
    )]
    #[case(
        vec![number("a").with_requires("a"), number("b")],
        ConfigError::SelfRequires { key: "a".to_string() }
    )]
    #[case(
        vec![number("a").with_requires("z"), number("b")],
        ConfigError::UnknownRequires { key: "a".to_string(), requires: "z".to_string() }
    )]
    fn new_rejects_invalid_chains(#[case] specs: Vec<PartSpec>, #[case] expected: ConfigError) {
        assert_eq!(VersionChain::from_specs(specs), Err(expected));
    }

    #[test]
    fn requires_may_name_any_part_not_only_the_child() {
        let chain = VersionChain::from_specs([
            number("a").with_requires("c"),
            number("b"),
            number("c"),
        ]);

        assert!(chain.is_ok());
    }

    #[test]
    fn part_returns_not_found_for_unknown_key() {
        let chain = VersionChain::from_specs([number("a")]).unwrap();

        assert_eq!(
            chain.part("b"),
            Err(LookupError::NotFound("b".to_string()))
        );
    }

    #[test]
    fn bump_number_from_unset_uses_start_then_increments() {
        let spec = PartSpec::number("n", NumberRules::default().with_start(5));
        let mut chain = VersionChain::from_specs([spec]).unwrap();

        chain.bump(&["n"]).unwrap();
        assert_eq!(chain.part("n").unwrap().value(), Some(&PartValue::Number(5)));

        chain.bump(&["n"]).unwrap();
        assert_eq!(chain.part("n").unwrap().value(), Some(&PartValue::Number(6)));
    }

    #[test]
    fn bump_identifier_walks_strings_and_exhausts() {
        let mut chain = VersionChain::from_specs([identifier("pre", &["a", "b"])]).unwrap();

        let mut seen = Vec::new();
        for _ in 0..4 {
            chain.bump(&["pre"]).unwrap();
            seen.push(chain.to_string());
        }

        assert_eq!(seen, vec!["a", "b", "", "a"]);
    }

    #[test]
    fn bump_never_touches_ancestors() {
        let mut chain = VersionChain::new(vec![
            set(number("a"), 1),
            set(number("b"), 2),
            set(number("c"), 3),
        ])
        .unwrap();

        chain.bump(&["b"]).unwrap();

        assert_eq!(chain.to_string(), "13");
        assert_eq!(chain.part("a").unwrap().value(), Some(&PartValue::Number(1)));
        assert_eq!(chain.part("c").unwrap().value(), None);
    }

    #[test]
    fn reset_forces_required_descendant_to_start() {
        let mut chain = VersionChain::new(vec![
            set(number("a").with_requires("c"), 1),
            set(number("b"), 4),
            set(PartSpec::number("c", NumberRules::default().with_start(7)), 9),
        ])
        .unwrap();

        chain.reset(&["b"]).unwrap();

        assert_eq!(chain.part("b").unwrap().value(), None);
        assert_eq!(chain.part("c").unwrap().value(), Some(&PartValue::Number(7)));
    }

    #[test]
    fn requires_is_ignored_when_ancestor_is_unset() {
        let mut chain = VersionChain::new(vec![
            Part::new(number("a").with_requires("b")),
            set(number("b"), 4),
        ])
        .unwrap();

        assert_eq!(chain.is_required("b"), Ok(false));
        chain.reset(&["b"]).unwrap();
        assert_eq!(chain.part("b").unwrap().value(), None);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut chain = VersionChain::new(vec![
            set(number("a").with_requires("b"), 1),
            set(number("b"), 4),
            set(number("c"), 2),
        ])
        .unwrap();

        chain.reset(&["a"]).unwrap();
        let once = chain.clone();
        chain.reset(&["a"]).unwrap();

        assert_eq!(chain, once);
    }

    #[test]
    fn unknown_key_in_batch_leaves_chain_untouched() {
        let mut chain = VersionChain::new(vec![set(number("a"), 1), set(number("b"), 2)]).unwrap();
        let before = chain.clone();

        assert_eq!(
            chain.bump(&["a", "missing"]),
            Err(LookupError::NotFound("missing".to_string()))
        );
        assert_eq!(chain, before);

        assert!(chain.reset(&["b", "missing"]).is_err());
        assert_eq!(chain, before);
    }

    #[test]
    fn display_skips_unset_parts_and_their_prefix() {
        let chain = VersionChain::new(vec![
            set(number("a"), 1),
            Part::new(number("b").with_prefix(".")),
            set(number("c").with_prefix("-"), 3),
        ])
        .unwrap();

        assert_eq!(chain.to_string(), "1-3");
    }

    #[test]
    fn values_lists_every_part_in_order() {
        let chain = VersionChain::new(vec![set(number("a"), 1), Part::new(number("b"))]).unwrap();

        let values: Vec<_> = chain.values().collect();
        assert_eq!(
            values,
            vec![("a", Some(&PartValue::Number(1))), ("b", None)]
        );
    }
}
