use std::collections::HashMap;

use thiserror::Error;

use crate::{
    canonicalizer::{Canonicalizer, Qti12Canonicalizer, Qti21Canonicalizer, Qti30Canonicalizer},
    error::MigrationError,
    models::canonical::Document,
    schema_version::SchemaFamily,
    transformation_engine::{qti12_to_21::Qti12To21Rules, qti21_to_30::Qti21To30Rules, TargetDocument},
};

/// Transformation rules for one adjacent pair of schema families.
pub trait MigrationRules: Send + Sync {
    fn source(&self) -> SchemaFamily;

    fn target(&self) -> SchemaFamily;

    /// Build a fresh target document. The input is never modified.
    fn migrate(&self, doc: &Document) -> Result<TargetDocument, MigrationError>;
}

/// Registry that manages canonicalizers and transformation rule sets
pub struct SchemaRegistry {
    canonicalizers: HashMap<SchemaFamily, Box<dyn Canonicalizer>>,
    rule_sets: HashMap<(SchemaFamily, SchemaFamily), Box<dyn MigrationRules>>,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("No canonicalizer registered for QTI {0}")]
    NoCanonicalizer(SchemaFamily),

    #[error("No transformation rules found from QTI {0} to QTI {1}")]
    NoRuleSet(SchemaFamily, SchemaFamily),
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self {
            canonicalizers: HashMap::new(),
            rule_sets: HashMap::new(),
        }
    }

    /// Registry with every built-in canonicalizer and the two adjacent rule sets.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.add_canonicalizer(Box::new(Qti12Canonicalizer));
        registry.add_canonicalizer(Box::new(Qti21Canonicalizer));
        registry.add_canonicalizer(Box::new(Qti30Canonicalizer));
        registry.add_rules(Box::new(Qti12To21Rules));
        registry.add_rules(Box::new(Qti21To30Rules));
        registry
    }

    /// Add a canonicalizer, replacing any previous one for the same family
    pub fn add_canonicalizer(&mut self, canonicalizer: Box<dyn Canonicalizer>) {
        self.canonicalizers.insert(canonicalizer.family(), canonicalizer);
    }

    /// Add a rule set, keyed by its source and target family
    pub fn add_rules(&mut self, rules: Box<dyn MigrationRules>) {
        self.rule_sets.insert((rules.source(), rules.target()), rules);
    }

    pub fn get_canonicalizer(&self, family: SchemaFamily) -> Result<&dyn Canonicalizer, RegistryError> {
        self.canonicalizers
            .get(&family)
            .map(|c| c.as_ref())
            .ok_or(RegistryError::NoCanonicalizer(family))
    }

    /// Get the rule set migrating `source` documents to `target`
    pub fn get_rules(
        &self,
        source: SchemaFamily,
        target: SchemaFamily,
    ) -> Result<&dyn MigrationRules, RegistryError> {
        self.rule_sets
            .get(&(source, target))
            .map(|r| r.as_ref())
            .ok_or(RegistryError::NoRuleSet(source, target))
    }

    pub fn has_rules(&self, source: SchemaFamily, target: SchemaFamily) -> bool {
        self.rule_sets.contains_key(&(source, target))
    }

    /// Families that can be read, oldest first
    pub fn get_available_families(&self) -> Vec<SchemaFamily> {
        let mut families: Vec<_> = self.canonicalizers.keys().copied().collect();
        families.sort();
        families
    }

    /// Supported (source, target) pairs, oldest source first
    pub fn get_migration_paths(&self) -> Vec<(SchemaFamily, SchemaFamily)> {
        let mut paths: Vec<_> = self.rule_sets.keys().copied().collect();
        paths.sort();
        paths
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_registry_creation() {
        let registry = SchemaRegistry::new();
        assert!(registry.get_available_families().is_empty());
        assert!(registry.get_migration_paths().is_empty());
    }

    #[test]
    fn test_default_registry_contents() {
        let registry = SchemaRegistry::with_defaults();
        assert_eq!(registry.get_available_families(), SchemaFamily::ALL.to_vec());
        assert_eq!(
            registry.get_migration_paths(),
            vec![
                (SchemaFamily::Qti12, SchemaFamily::Qti21),
                (SchemaFamily::Qti21, SchemaFamily::Qti30),
            ]
        );
    }

    #[test]
    fn test_only_adjacent_pairs_have_rules() {
        let registry = SchemaRegistry::with_defaults();
        assert!(registry.has_rules(SchemaFamily::Qti12, SchemaFamily::Qti21));
        assert!(!registry.has_rules(SchemaFamily::Qti12, SchemaFamily::Qti30));
        assert!(!registry.has_rules(SchemaFamily::Qti30, SchemaFamily::Qti21));

        let err = registry
            .get_rules(SchemaFamily::Qti12, SchemaFamily::Qti30)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            RegistryError::NoRuleSet(SchemaFamily::Qti12, SchemaFamily::Qti30)
        ));
    }

    #[test]
    fn test_get_canonicalizer() {
        let mut registry = SchemaRegistry::new();
        assert!(registry.get_canonicalizer(SchemaFamily::Qti21).is_err());

        registry.add_canonicalizer(Box::new(Qti21Canonicalizer));
        let canonicalizer = registry.get_canonicalizer(SchemaFamily::Qti21).unwrap();
        assert_eq!(canonicalizer.family(), SchemaFamily::Qti21);
    }

    #[test]
    fn test_rule_set_endpoints() {
        let registry = SchemaRegistry::with_defaults();
        let rules = registry.get_rules(SchemaFamily::Qti21, SchemaFamily::Qti30).unwrap();
        assert_eq!(rules.source(), SchemaFamily::Qti21);
        assert_eq!(rules.target(), SchemaFamily::Qti30);
    }
}
