//! Entity kinds and the built-in names the LU language knows about.

use std::fmt;

/// The kind of an entity definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Ml,
    List,
    Prebuilt,
    Regex,
    Composite,
    PatternAny,
    PhraseList,
}

impl EntityKind {
    /// Parse the type keyword of an `@ <type> <name>` line.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "ml" | "simple" => Some(EntityKind::Ml),
            "list" => Some(EntityKind::List),
            "prebuilt" => Some(EntityKind::Prebuilt),
            "regex" => Some(EntityKind::Regex),
            "composite" => Some(EntityKind::Composite),
            "pattern.any" | "patternany" => Some(EntityKind::PatternAny),
            "phraselist" => Some(EntityKind::PhraseList),
            _ => None,
        }
    }

    /// The canonical keyword for this kind.
    pub fn keyword(self) -> &'static str {
        match self {
            EntityKind::Ml => "ml",
            EntityKind::List => "list",
            EntityKind::Prebuilt => "prebuilt",
            EntityKind::Regex => "regex",
            EntityKind::Composite => "composite",
            EntityKind::PatternAny => "pattern.any",
            EntityKind::PhraseList => "phraselist",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Canonical entity type keywords, in the order they are suggested.
pub const ENTITY_TYPES: &[EntityKind] = &[
    EntityKind::Ml,
    EntityKind::Prebuilt,
    EntityKind::List,
    EntityKind::Regex,
    EntityKind::Composite,
    EntityKind::PatternAny,
    EntityKind::PhraseList,
];

/// Prebuilt entity names recognised by the LU service.
pub const PREBUILT_ENTITIES: &[&str] = &[
    "age",
    "datetimeV2",
    "dimension",
    "email",
    "geographyV2",
    "keyPhrase",
    "money",
    "number",
    "ordinal",
    "ordinalV2",
    "percentage",
    "personName",
    "phonenumber",
    "temperature",
    "url",
];

/// Kinds offered wherever any entity may be referenced.
pub const ALL_ENTITY_KINDS: &[EntityKind] = &[
    EntityKind::Ml,
    EntityKind::List,
    EntityKind::Prebuilt,
    EntityKind::Regex,
    EntityKind::Composite,
    EntityKind::PatternAny,
];

/// Kinds that may be children of a composite entity.
pub const NON_COMPOSITE_KINDS: &[EntityKind] = &[
    EntityKind::Ml,
    EntityKind::List,
    EntityKind::Prebuilt,
    EntityKind::Regex,
    EntityKind::PatternAny,
];

/// Kinds that may be used as features.
pub const FEATURE_KINDS: &[EntityKind] = &[
    EntityKind::Ml,
    EntityKind::List,
    EntityKind::Prebuilt,
    EntityKind::Regex,
    EntityKind::Composite,
    EntityKind::PhraseList,
];

pub fn is_prebuilt(name: &str) -> bool {
    PREBUILT_ENTITIES.contains(&name)
}
