//! Completion support for LU documents.
//!
//! Completion is a table of independent rules. Each rule looks at the current
//! line up to the caret and, when it applies, contributes items. Several rules
//! may fire for the same line and their items accumulate in table order. The
//! parsed model is only built when a rule that needs it fires.

use std::cell::OnceCell;

use tower_lsp::lsp_types::*;
use tracing::debug;

use crate::document::{DocumentState, LineIndex};
use crate::parser::{
    extract_with_fallback, EntityKind, LuParser, ParsedModel, ALL_ENTITY_KINDS, ENTITY_TYPES,
    FEATURE_KINDS, NON_COMPOSITE_KINDS, PREBUILT_ENTITIES,
};

use super::patterns;

/// Everything a rule may look at for one completion request.
pub struct CompletionContext<'a> {
    /// The current line up to the caret.
    pub line_prefix: &'a str,
    index: &'a LineIndex,
    line: usize,
    parser: &'a dyn LuParser,
    locale: &'a str,
    model: OnceCell<Option<ParsedModel>>,
}

impl<'a> CompletionContext<'a> {
    pub fn new(
        parser: &'a dyn LuParser,
        index: &'a LineIndex,
        position: Position,
        locale: &'a str,
    ) -> Self {
        Self {
            line_prefix: index.line_prefix(position),
            index,
            line: position.line as usize,
            parser,
            locale,
            model: OnceCell::new(),
        }
    }

    /// The parsed model, built on first use.
    pub fn model(&self) -> Option<&ParsedModel> {
        self.model
            .get_or_init(|| extract_with_fallback(self.parser, self.index, self.line, self.locale))
            .as_ref()
    }

    fn entity_names(&self, kinds: &[EntityKind]) -> Vec<String> {
        self.model()
            .map(|model| model.entity_names(kinds))
            .unwrap_or_default()
    }
}

/// One completion strategy.
pub struct CompletionRule {
    pub name: &'static str,
    pub applies: fn(&str) -> bool,
    pub produce: fn(&CompletionContext<'_>) -> Vec<CompletionItem>,
}

/// All completion rules in evaluation order.
pub const RULES: &[CompletionRule] = &[
    CompletionRule {
        name: "entity-types",
        applies: patterns::is_entity_type_slot,
        produce: entity_type_items,
    },
    CompletionRule {
        name: "prebuilt-entities",
        applies: patterns::is_prebuilt_slot,
        produce: prebuilt_items,
    },
    CompletionRule {
        name: "regex-scaffold",
        applies: patterns::is_regex_value_slot,
        produce: |_| vec![regex_scaffold()],
    },
    CompletionRule {
        name: "entity-modifiers",
        applies: patterns::is_entity_name_declaration,
        produce: entity_modifier_items,
    },
    CompletionRule {
        name: "separated-regex",
        applies: |line| patterns::separated_definition_name(line).is_some(),
        produce: separated_regex_items,
    },
    CompletionRule {
        name: "pattern-entities",
        applies: patterns::is_pattern_entity_slot,
        produce: pattern_entity_items,
    },
    CompletionRule {
        name: "defined-entities",
        applies: patterns::is_entity_type_slot,
        produce: defined_entity_items,
    },
    CompletionRule {
        name: "composite-children",
        applies: patterns::is_composite_children_slot,
        produce: composite_child_items,
    },
    CompletionRule {
        name: "roles",
        applies: patterns::is_role_slot,
        produce: role_items,
    },
    CompletionRule {
        name: "child-references",
        applies: patterns::is_child_reference_slot,
        produce: child_reference_items,
    },
    CompletionRule {
        name: "entity-features",
        applies: |line| patterns::entity_feature_owner(line).is_some(),
        produce: entity_feature_items,
    },
    CompletionRule {
        name: "intent-feature-keyword",
        applies: patterns::is_intent_definition,
        produce: |_| {
            vec![item(
                "usesFeature?",
                CompletionItemKind::KEYWORD,
                "usesFeature",
                "Does this intent use a feature?".to_string(),
            )]
        },
    },
    CompletionRule {
        name: "intent-features",
        applies: patterns::is_intent_feature_slot,
        produce: intent_feature_items,
    },
];

fn item(
    label: impl Into<String>,
    kind: CompletionItemKind,
    insert_text: impl Into<String>,
    documentation: String,
) -> CompletionItem {
    CompletionItem {
        label: label.into(),
        kind: Some(kind),
        insert_text: Some(insert_text.into()),
        documentation: Some(Documentation::String(documentation)),
        ..Default::default()
    }
}

fn regex_scaffold() -> CompletionItem {
    item(
        "RegExp Entity",
        CompletionItemKind::KEYWORD,
        "//",
        "Regex entity pattern".to_string(),
    )
}

fn entity_type_items(_: &CompletionContext<'_>) -> Vec<CompletionItem> {
    ENTITY_TYPES
        .iter()
        .map(|kind| {
            item(
                kind.keyword(),
                CompletionItemKind::KEYWORD,
                kind.keyword(),
                format!("Entity type: {}", kind),
            )
        })
        .collect()
}

fn prebuilt_items(_: &CompletionContext<'_>) -> Vec<CompletionItem> {
    PREBUILT_ENTITIES
        .iter()
        .map(|name| {
            item(
                *name,
                CompletionItemKind::KEYWORD,
                *name,
                format!("Prebuilt entity: {}", name),
            )
        })
        .collect()
}

fn entity_modifier_items(_: &CompletionContext<'_>) -> Vec<CompletionItem> {
    vec![
        item(
            "hasRoles?",
            CompletionItemKind::KEYWORD,
            "hasRoles",
            "Does this entity have roles?".to_string(),
        ),
        item(
            "usesFeature?",
            CompletionItemKind::KEYWORD,
            "usesFeature",
            "Does this entity use a feature?".to_string(),
        ),
    ]
}

fn separated_regex_items(ctx: &CompletionContext<'_>) -> Vec<CompletionItem> {
    let Some(name) = patterns::separated_definition_name(ctx.line_prefix) else {
        return Vec::new();
    };
    let is_regex = ctx
        .model()
        .is_some_and(|model| model.names_of(EntityKind::Regex).iter().any(|n| n == name));
    if is_regex {
        vec![regex_scaffold()]
    } else {
        Vec::new()
    }
}

fn pattern_entity_items(ctx: &CompletionContext<'_>) -> Vec<CompletionItem> {
    ctx.entity_names(ALL_ENTITY_KINDS)
        .into_iter()
        .map(|name| {
            item(
                format!("Entity: {}", name),
                CompletionItemKind::PROPERTY,
                name.clone(),
                format!("Pattern suggestion for entity: {}", name),
            )
        })
        .collect()
}

fn defined_entity_items(ctx: &CompletionContext<'_>) -> Vec<CompletionItem> {
    ctx.entity_names(ALL_ENTITY_KINDS)
        .into_iter()
        .filter(|name| EntityKind::from_keyword(name).is_none())
        .map(|name| {
            item(
                name.clone(),
                CompletionItemKind::PROPERTY,
                name.clone(),
                format!("Defined entity: {}", name),
            )
        })
        .collect()
}

fn composite_child_items(ctx: &CompletionContext<'_>) -> Vec<CompletionItem> {
    ctx.entity_names(NON_COMPOSITE_KINDS)
        .into_iter()
        .map(|name| {
            item(
                name.clone(),
                CompletionItemKind::PROPERTY,
                name.clone(),
                format!("Composite child entity: {}", name),
            )
        })
        .collect()
}

fn role_items(ctx: &CompletionContext<'_>) -> Vec<CompletionItem> {
    ctx.model()
        .map(|model| model.roles(ALL_ENTITY_KINDS))
        .unwrap_or_default()
        .into_iter()
        .map(|role| {
            item(
                format!("Role: {}", role),
                CompletionItemKind::PROPERTY,
                role.clone(),
                format!("Role suggestion: {}", role),
            )
        })
        .collect()
}

fn child_reference_items(ctx: &CompletionContext<'_>) -> Vec<CompletionItem> {
    ctx.entity_names(ALL_ENTITY_KINDS)
        .into_iter()
        .map(|name| {
            item(
                format!("Entity: {}", name),
                CompletionItemKind::PROPERTY,
                format!(" {}", name),
                format!("Child entity suggestion: {}", name),
            )
        })
        .collect()
}

fn feature_item(name: String) -> CompletionItem {
    item(
        format!("Entity: {}", name),
        CompletionItemKind::METHOD,
        name.clone(),
        format!("Feature suggestion: {}", name),
    )
}

fn entity_feature_items(ctx: &CompletionContext<'_>) -> Vec<CompletionItem> {
    let Some(owner) = patterns::entity_feature_owner(ctx.line_prefix) else {
        return Vec::new();
    };
    ctx.entity_names(FEATURE_KINDS)
        .into_iter()
        .filter(|name| name != owner)
        .map(feature_item)
        .collect()
}

fn intent_feature_items(ctx: &CompletionContext<'_>) -> Vec<CompletionItem> {
    ctx.entity_names(FEATURE_KINDS)
        .into_iter()
        .map(feature_item)
        .collect()
}

/// Run every applicable rule for the caret's line.
pub fn completion_items(ctx: &CompletionContext<'_>) -> Vec<CompletionItem> {
    let mut items = Vec::new();
    for rule in RULES {
        if (rule.applies)(ctx.line_prefix) {
            let produced = (rule.produce)(ctx);
            debug!(rule = rule.name, items = produced.len(), "completion rule fired");
            items.extend(produced);
        }
    }
    items
}

/// Generate completions at a position in an LU document.
pub fn completion_at_position(
    parser: &dyn LuParser,
    document: &DocumentState,
    position: Position,
    locale: &str,
) -> CompletionList {
    let ctx = CompletionContext::new(parser, &document.line_index, position, locale);
    CompletionList {
        is_incomplete: false,
        items: completion_items(&ctx),
    }
}
