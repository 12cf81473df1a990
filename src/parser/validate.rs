//! Schema validation of a parsed LU model.
//!
//! Problems found here have no source location; the caller decides where to
//! show them.

use crate::error::ValidationError;

use super::entity::EntityKind;
use super::model::ParsedModel;

/// Check cross-definition consistency of a model.
pub fn validate(model: &ParsedModel) -> Result<(), ValidationError> {
    let mut problems = Vec::new();

    conflicting_kinds(model, &mut problems);
    for entity in &model.entities {
        for feature in &entity.features {
            if feature == &entity.name {
                problems.push(format!(
                    "Entity '{}' cannot use itself as a feature",
                    entity.name
                ));
            } else if !model.defines(feature) {
                problems.push(format!(
                    "Feature '{}' used by entity '{}' is not defined",
                    feature, entity.name
                ));
            }
        }
        if entity.kind == EntityKind::Composite {
            for child in &entity.children {
                if !model.defines(child) {
                    problems.push(format!(
                        "Composite entity '{}' includes undefined entity '{}'",
                        entity.name, child
                    ));
                }
            }
        }
    }
    for intent in &model.intents {
        for feature in &intent.features {
            if !model.defines(feature) {
                problems.push(format!(
                    "Feature '{}' used by intent '{}' is not defined",
                    feature, intent.name
                ));
            }
        }
    }
    for label in &model.labels {
        let defined = model
            .entities
            .iter()
            .any(|e| &e.name == label && e.kind != EntityKind::PhraseList);
        if !defined {
            problems.push(format!(
                "Utterance label references undefined entity '{}'",
                label
            ));
        }
    }
    for reference in &model.references {
        let message = format!("Entity '{}' is never defined with a type", reference);
        if !model.defines(reference) && !problems.contains(&message) {
            problems.push(message);
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::from_messages(problems))
    }
}

fn conflicting_kinds(model: &ParsedModel, problems: &mut Vec<String>) {
    let mut reported: Vec<&str> = Vec::new();
    for entity in &model.entities {
        if reported.contains(&entity.name.as_str()) {
            continue;
        }
        let kinds: Vec<&str> = model
            .entities
            .iter()
            .filter(|e| e.name == entity.name)
            .map(|e| e.kind.keyword())
            .collect();
        if kinds.len() > 1 {
            reported.push(&entity.name);
            problems.push(format!(
                "Entity '{}' is defined with conflicting types ({})",
                entity.name,
                kinds.join(", ")
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{LuFileParser, LuParser};

    fn problems(text: &str) -> Vec<String> {
        let model = LuFileParser.parse(text, "en-us").unwrap();
        match validate(&model) {
            Ok(()) => vec![],
            Err(e) => e.problems.into_iter().map(|p| p.message).collect(),
        }
    }

    #[test]
    fn consistent_model_is_valid() {
        let text = "@ prebuilt number\n@ ml address usesFeature number\n# Book\n- book to {address=Seattle}";
        assert!(problems(text).is_empty());
    }

    #[test]
    fn conflicting_kinds_are_reported_once() {
        assert_eq!(
            problems("@ ml city\n@ list city\n@ regex city"),
            vec!["Entity 'city' is defined with conflicting types (ml, list, regex)"]
        );
    }

    #[test]
    fn undefined_and_self_features() {
        assert_eq!(
            problems("@ ml address usesFeature address, zip"),
            vec![
                "Entity 'address' cannot use itself as a feature",
                "Feature 'zip' used by entity 'address' is not defined",
            ]
        );
    }

    #[test]
    fn intent_features_must_exist() {
        assert_eq!(
            problems("@ intent Book usesFeature city"),
            vec!["Feature 'city' used by intent 'Book' is not defined"]
        );
    }

    #[test]
    fn composite_children_must_exist() {
        assert_eq!(
            problems("@ ml origin\n@ composite trip = [origin, destination]"),
            vec!["Composite entity 'trip' includes undefined entity 'destination'"]
        );
    }

    #[test]
    fn labels_must_name_entities() {
        assert_eq!(
            problems("# Book\n- book at {time=5pm}"),
            vec!["Utterance label references undefined entity 'time'"]
        );
    }

    #[test]
    fn separated_definition_needs_a_typed_entity() {
        assert_eq!(
            problems("@ zip = /x/\n@ zip hasRoles home"),
            vec!["Entity 'zip' is never defined with a type"]
        );
    }

    #[test]
    fn pattern_references_need_no_definition() {
        assert!(problems("# Book\n- book {title}").is_empty());
    }
}
