//! Line patterns that recognise where the caret sits in an LU line.
//!
//! Every predicate takes the current line's text up to the caret.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Entity type keywords accepted in `@ <type> <name>` lines.
const TYPES: &str = r"(?:ml|simple|list|composite|regex|prebuilt|pattern\.any|phraselist)";
/// An entity name, optionally quoted.
const NAME: &str = r#"(?:[\w._]+|"[\w._\s]+")"#;

static ENTITY_TYPE_SLOT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*@\s*$").unwrap());
static PREBUILT_SLOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*@\s*prebuilt\s+$").unwrap());
static REGEX_VALUE_SLOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^\s*@\s*regex\s+{NAME}\s*=\s*$")).unwrap());
static ENTITY_NAME_DECLARATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^\s*@\s*{TYPES}\s+{NAME}\s+$")).unwrap());
static SEPARATED_DEFINITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^\s*@\s*({NAME})\s*=\s*$")).unwrap());
static PATTERN_ENTITY_SLOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-.*\{\s*(?:\})?$").unwrap());
static COMPOSITE_CHILDREN_SLOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\s*@\s*composite\s+{NAME}\s*=\s*\[[^\]]*$")).unwrap()
});
static ROLE_SLOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-.*\{[^{}=]*:\s*(?:\})?$").unwrap());
static CHILD_REFERENCE_SLOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-\s*@$").unwrap());
static ENTITY_FEATURE_SLOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\s*@\s*(?:{TYPES}\s+)?({NAME})\s+(?:.*\s)?usesFeatures?\s+(?:[\w._]+\s*,\s*)*$"
    ))
    .unwrap()
});
static INTENT_DEFINITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^\s*@\s*intent\s+{NAME}\s+$")).unwrap());
static INTENT_FEATURE_SLOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\s*@\s*intent\s+{NAME}\s+usesFeatures?\s+(?:[\w._]+\s*,\s*)*$"
    ))
    .unwrap()
});
static ML_DEFINITION_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*@\s*(?:ml\s+)?([0-9a-zA-Z_.\-]+)").unwrap());
static ML_DECLARATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*@\s*(?:ml|simple)\s+([0-9a-zA-Z_.\-]+)").unwrap());
static LABELED_UTTERANCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*-([^{}]*\s*\{[\w.@:\s]+\s*=\s*[\w.]+\}[^{}]*)+$").unwrap()
});
static LABEL_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[\w.@:\s]+?\s*=\s*([\w.]+)\}").unwrap());

fn unquote(name: &str) -> &str {
    name.trim().trim_matches('"').trim()
}

/// `@ `: the caret is where an entity type goes.
pub fn is_entity_type_slot(line: &str) -> bool {
    ENTITY_TYPE_SLOT.is_match(line)
}

/// `@ prebuilt `: the caret is where a prebuilt name goes.
pub fn is_prebuilt_slot(line: &str) -> bool {
    PREBUILT_SLOT.is_match(line)
}

/// `@ regex name = `: the caret is where the pattern goes.
pub fn is_regex_value_slot(line: &str) -> bool {
    REGEX_VALUE_SLOT.is_match(line)
}

/// `@ ml name `: an entity name was just declared.
pub fn is_entity_name_declaration(line: &str) -> bool {
    ENTITY_NAME_DECLARATION.is_match(line)
}

/// `@ name = `: returns the name of a separated definition.
pub fn separated_definition_name(line: &str) -> Option<&str> {
    SEPARATED_DEFINITION
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| unquote(m.as_str()))
}

/// `- book a {`: the caret opens an entity reference.
pub fn is_pattern_entity_slot(line: &str) -> bool {
    PATTERN_ENTITY_SLOT.is_match(line)
}

/// `@ composite name = [a, `: the caret is inside the children list.
pub fn is_composite_children_slot(line: &str) -> bool {
    COMPOSITE_CHILDREN_SLOT.is_match(line)
}

/// `- fly from {city:`: the caret is where a role goes.
pub fn is_role_slot(line: &str) -> bool {
    ROLE_SLOT.is_match(line)
}

/// `- @`: the caret follows an ml child marker.
pub fn is_child_reference_slot(line: &str) -> bool {
    CHILD_REFERENCE_SLOT.is_match(line)
}

/// `@ ml name usesFeature `: returns the entity receiving features.
pub fn entity_feature_owner(line: &str) -> Option<&str> {
    let name = ENTITY_FEATURE_SLOT
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| unquote(m.as_str()))?;
    (name != "intent").then_some(name)
}

/// `@ intent Name `: an intent definition awaiting its features.
pub fn is_intent_definition(line: &str) -> bool {
    INTENT_DEFINITION.is_match(line)
}

/// `@ intent Name usesFeature `: the caret is where an intent feature goes.
pub fn is_intent_feature_slot(line: &str) -> bool {
    INTENT_FEATURE_SLOT.is_match(line)
}

/// The entity named by an `@ [ml] name ...` line.
pub fn ml_definition_name(line: &str) -> Option<&str> {
    ML_DEFINITION_NAME
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Names declared with `@ ml name` or `@ simple name`, in order, without
/// parsing the rest of the document.
pub fn ml_entity_names<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let mut names = Vec::new();
    for line in lines {
        if let Some(name) = ML_DECLARATION.captures(line).and_then(|c| c.get(1)) {
            if !names.contains(&name.as_str()) {
                names.push(name.as_str());
            }
        }
    }
    names
}

/// `- book a {time=5pm} flight`: an utterance with at least one label.
pub fn is_labeled_utterance(line: &str) -> bool {
    LABELED_UTTERANCE.is_match(line)
}

/// Replace every `{entity=value}` span with its value.
pub fn remove_labels(line: &str) -> Cow<'_, str> {
    LABEL_SPAN.replace_all(line, "${1}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_type_slot() {
        assert!(is_entity_type_slot("@"));
        assert!(is_entity_type_slot("  @ "));
        assert!(!is_entity_type_slot("@ ml"));
    }

    #[test]
    fn prebuilt_slot() {
        assert!(is_prebuilt_slot("@ prebuilt "));
        assert!(!is_prebuilt_slot("@ prebuilt"));
        assert!(!is_prebuilt_slot("@ prebuilt number "));
    }

    #[test]
    fn regex_value_slot() {
        assert!(is_regex_value_slot("@ regex zip = "));
        assert!(is_regex_value_slot("@ regex \"zip code\" ="));
        assert!(!is_regex_value_slot("@ regex zip = /x/"));
    }

    #[test]
    fn entity_name_declaration() {
        assert!(is_entity_name_declaration("@ ml address "));
        assert!(is_entity_name_declaration("@ prebuilt number "));
        assert!(!is_entity_name_declaration("@ ml address"));
        assert!(!is_entity_name_declaration("@ intent Book "));
    }

    #[test]
    fn separated_definition() {
        assert_eq!(separated_definition_name("@ zip = "), Some("zip"));
        assert_eq!(separated_definition_name("@ \"zip code\" ="), Some("zip code"));
        assert_eq!(separated_definition_name("@ regex zip ="), None);
    }

    #[test]
    fn pattern_entity_slot() {
        assert!(is_pattern_entity_slot("- book a {"));
        assert!(is_pattern_entity_slot("- book a {}"));
        assert!(!is_pattern_entity_slot("- book a {time"));
        assert!(!is_pattern_entity_slot("@ ml {"));
    }

    #[test]
    fn composite_children_slot() {
        assert!(is_composite_children_slot("@ composite trip = ["));
        assert!(is_composite_children_slot("@ composite trip = [origin, "));
        assert!(!is_composite_children_slot("@ composite trip = [origin]"));
    }

    #[test]
    fn role_slot() {
        assert!(is_role_slot("- fly from {city:"));
        assert!(is_role_slot("- fly from {city:}"));
        assert!(!is_role_slot("- fly from {city=Seattle}:"));
    }

    #[test]
    fn child_reference_slot() {
        assert!(is_child_reference_slot("\t- @"));
        assert!(!is_child_reference_slot("- @ ml"));
    }

    #[test]
    fn entity_feature_owner_capture() {
        assert_eq!(entity_feature_owner("@ ml color usesFeature "), Some("color"));
        assert_eq!(
            entity_feature_owner("@ ml address hasRoles home usesFeatures number, "),
            Some("address")
        );
        assert_eq!(entity_feature_owner("@ color usesFeature "), Some("color"));
        assert_eq!(entity_feature_owner("@ intent Book usesFeature "), None);
        assert_eq!(entity_feature_owner("@ ml color usesFeature"), None);
    }

    #[test]
    fn intent_slots() {
        assert!(is_intent_definition("@ intent Book "));
        assert!(is_intent_feature_slot("@ intent Book usesFeature "));
        assert!(is_intent_feature_slot("@ intent Book usesFeatures city, "));
        assert!(!is_intent_feature_slot("@ intent Book "));
    }

    #[test]
    fn ml_definition_name_capture() {
        assert_eq!(ml_definition_name("@ ml address ="), Some("address"));
        assert_eq!(ml_definition_name("@ address ="), Some("address"));
        assert_eq!(ml_definition_name("- address"), None);
    }

    #[test]
    fn ml_entity_names_scan_lines() {
        let lines = [
            "hello",
            "@ ml address =",
            "- \t",
            "@ simple street",
            "@ list ml",
            "@ ml address",
        ];
        assert_eq!(ml_entity_names(lines), vec!["address", "street"]);
        assert!(ml_entity_names(["@ mlx y", "@ prebuilt number"]).is_empty());
    }

    #[test]
    fn labeled_utterances() {
        assert!(is_labeled_utterance("- book a {time=5pm} flight"));
        assert!(is_labeled_utterance("- {@city=Seattle} to {city:destination=Paris}"));
        assert!(!is_labeled_utterance("- book a flight"));
        assert!(!is_labeled_utterance("- book a {time} flight"));
    }

    #[test]
    fn labels_are_removed() {
        assert_eq!(remove_labels("- book a {time=5pm} flight"), "- book a 5pm flight");
        assert_eq!(
            remove_labels("- {@city=Seattle} to {city:destination=Paris}"),
            "- Seattle to Paris"
        );
    }
}
