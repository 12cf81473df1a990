//! The structured model produced by parsing LU text.

use super::entity::EntityKind;

/// An intent and what it declares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Intent {
    pub name: String,
    pub utterances: Vec<String>,
    pub features: Vec<String>,
}

/// A normalized value of a list entity with its synonyms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListValue {
    pub canonical: String,
    pub synonyms: Vec<String>,
}

/// One typed entity definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub name: String,
    pub kind: EntityKind,
    pub roles: Vec<String>,
    pub features: Vec<String>,
    /// Composite members or ml child entities.
    pub children: Vec<String>,
    /// List values.
    pub values: Vec<ListValue>,
    /// Phrase list words.
    pub phrases: Vec<String>,
    /// Regex pattern without the surrounding slashes.
    pub pattern: Option<String>,
}

impl Entity {
    pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            name: name.into(),
            kind,
            roles: Vec::new(),
            features: Vec::new(),
            children: Vec::new(),
            values: Vec::new(),
            phrases: Vec::new(),
            pattern: None,
        }
    }
}

/// An `{entity}` or `{entity:role}` reference inside a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternReference {
    pub name: String,
    pub role: Option<String>,
}

/// Best-effort structured view of one LU document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedModel {
    pub culture: String,
    pub intents: Vec<Intent>,
    /// Definitions in document order. A name defined with two different kinds
    /// appears twice.
    pub entities: Vec<Entity>,
    pub pattern_references: Vec<PatternReference>,
    /// Entity names labeled inside example utterances.
    pub labels: Vec<String>,
    /// Names used by separated definitions (`@ name = ...`).
    pub references: Vec<String>,
}

impl ParsedModel {
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn intent(&self, name: &str) -> Option<&Intent> {
        self.intents.iter().find(|i| i.name == name)
    }

    /// Whether `name` is defined with any kind, phrase lists included.
    pub fn defines(&self, name: &str) -> bool {
        self.entity(name).is_some()
    }

    /// Names of entities of the given kind, in document order.
    pub fn names_of(&self, kind: EntityKind) -> Vec<String> {
        self.entity_names(&[kind])
    }

    /// Distinct entity names whose kind is in `kinds`.
    ///
    /// Names only referenced from patterns count as pattern.any entities.
    pub fn entity_names(&self, kinds: &[EntityKind]) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for entity in &self.entities {
            if kinds.contains(&entity.kind) && !names.contains(&entity.name) {
                names.push(entity.name.clone());
            }
        }
        if kinds.contains(&EntityKind::PatternAny) {
            for reference in &self.pattern_references {
                if !self.defines(&reference.name) && !names.contains(&reference.name) {
                    names.push(reference.name.clone());
                }
            }
        }
        names
    }

    /// Distinct role names declared on entities whose kind is in `kinds`.
    pub fn roles(&self, kinds: &[EntityKind]) -> Vec<String> {
        let declared = self
            .entities
            .iter()
            .filter(|e| kinds.contains(&e.kind))
            .flat_map(|e| e.roles.iter());
        let from_patterns = self
            .pattern_references
            .iter()
            .filter(|r| kinds.contains(&EntityKind::PatternAny) && !self.defines(&r.name))
            .filter_map(|r| r.role.as_ref());

        let mut roles: Vec<String> = Vec::new();
        for role in declared.chain(from_patterns) {
            if !roles.contains(role) {
                roles.push(role.clone());
            }
        }
        roles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::entity::{ALL_ENTITY_KINDS, NON_COMPOSITE_KINDS};

    fn model() -> ParsedModel {
        let mut city = Entity::new("city", EntityKind::List);
        city.roles = vec!["origin".into(), "destination".into()];
        let mut trip = Entity::new("trip", EntityKind::Composite);
        trip.roles = vec!["origin".into()];
        ParsedModel {
            culture: "en-us".into(),
            entities: vec![
                city,
                trip,
                Entity::new("number", EntityKind::Prebuilt),
                Entity::new("city", EntityKind::List),
            ],
            pattern_references: vec![
                PatternReference {
                    name: "title".into(),
                    role: Some("bookTitle".into()),
                },
                PatternReference {
                    name: "city".into(),
                    role: None,
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn entity_names_are_distinct_and_include_pattern_any() {
        assert_eq!(
            model().entity_names(ALL_ENTITY_KINDS),
            vec!["city", "trip", "number", "title"]
        );
    }

    #[test]
    fn entity_names_respect_kind_filter() {
        assert_eq!(
            model().entity_names(NON_COMPOSITE_KINDS),
            vec!["city", "number", "title"]
        );
        assert_eq!(model().names_of(EntityKind::Prebuilt), vec!["number"]);
    }

    #[test]
    fn roles_are_distinct() {
        assert_eq!(
            model().roles(ALL_ENTITY_KINDS),
            vec!["origin", "destination", "bookTitle"]
        );
    }
}
