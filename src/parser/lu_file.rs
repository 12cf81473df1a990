//! Line-oriented reader for LU files.
//!
//! This is not a full grammar. It walks the document once, tracks which block
//! a `-` line belongs to, and records every definition it understands into a
//! [`ParsedModel`]. Anything it cannot make sense of becomes a syntax error
//! pointing at the whole offending line.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ParseError, SourceRange, SyntaxDiagnostic, ValidationError};

use super::entity::{is_prebuilt, EntityKind};
use super::model::{Entity, Intent, ListValue, ParsedModel, PatternReference};
use super::{validate, LuParser};

static ENTITY_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.\-]+(?:\s+[\w.\-]+)*$").unwrap());
static MODIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(hasroles?|usesfeatures?)\b").unwrap());
static IMPORT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[[^\]]*\]\([^)]*\)$").unwrap());

/// The bundled LU parser and schema validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct LuFileParser;

impl LuParser for LuFileParser {
    fn parse(&self, text: &str, locale: &str) -> Result<ParsedModel, ParseError> {
        let mut reader = Reader::new(locale);
        for (i, line) in text.split('\n').enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            reader.read_line(i as u32 + 1, line);
        }
        reader.finish()
    }

    fn validate_schema(&self, model: &ParsedModel) -> Result<(), ValidationError> {
        validate::validate(model)
    }
}

/// Which block a `-` line belongs to.
#[derive(Debug, Clone, Copy)]
enum Block {
    None,
    Intent(usize),
    List { entity: usize, value: Option<usize> },
    Ml(usize),
    PhraseList(usize),
}

#[derive(Debug, Default)]
struct Modifiers {
    roles: Vec<String>,
    features: Vec<String>,
}

impl Modifiers {
    fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.features.is_empty()
    }
}

struct Reader {
    model: ParsedModel,
    block: Block,
    /// Modifiers on separated definitions whose entity was not yet defined.
    deferred: Vec<(String, Modifiers)>,
    errors: Vec<SyntaxDiagnostic>,
}

impl Reader {
    fn new(locale: &str) -> Self {
        Self {
            model: ParsedModel {
                culture: locale.to_string(),
                ..Default::default()
            },
            block: Block::None,
            deferred: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn read_line(&mut self, number: u32, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('>') {
            return;
        }

        let result = if let Some(rest) = trimmed.strip_prefix('#') {
            self.read_intent(rest)
        } else if let Some(rest) = trimmed.strip_prefix('@') {
            self.read_definition(rest)
        } else if let Some(rest) = strip_bullet(trimmed) {
            self.read_item(rest.trim())
        } else if IMPORT.is_match(trimmed) {
            Ok(())
        } else {
            Err(format!("Invalid input: unrecognized line '{}'", trimmed))
        };

        if let Err(message) = result {
            let width = line.chars().map(|c| c.len_utf16() as u32).sum();
            self.errors.push(SyntaxDiagnostic {
                range: SourceRange::line(number, width),
                message,
            });
        }
    }

    fn finish(mut self) -> Result<ParsedModel, ParseError> {
        for (name, modifiers) in std::mem::take(&mut self.deferred) {
            if let Some(index) = self.model.entities.iter().position(|e| e.name == name) {
                self.apply_modifiers(index, modifiers);
            }
        }

        if self.errors.is_empty() {
            Ok(self.model)
        } else {
            Err(ParseError {
                diagnostics: self.errors,
            })
        }
    }

    fn read_intent(&mut self, rest: &str) -> Result<(), String> {
        let name = rest.trim_start_matches('#').trim();
        if name.is_empty() {
            return Err("Invalid intent: missing intent name".to_string());
        }
        if name.starts_with('?') {
            return Err(format!(
                "Invalid intent: '{}' is a QnA question, not an intent",
                name
            ));
        }
        let index = self.intent_index(name);
        self.block = Block::Intent(index);
        Ok(())
    }

    fn read_definition(&mut self, rest: &str) -> Result<(), String> {
        let rest = rest.trim();
        if rest.is_empty() {
            return Err("Invalid entity definition: missing entity type and name".to_string());
        }
        self.block = Block::None;

        let (header, body) = match rest.split_once('=') {
            Some((header, body)) => (header.trim(), Some(body.trim())),
            None => match rest.strip_suffix(':') {
                Some(header) => (header.trim(), Some("")),
                None => (rest, None),
            },
        };

        let (first, after_first) = split_word(header);
        if first.eq_ignore_ascii_case("intent") {
            return self.read_intent_definition(after_first, body);
        }
        match EntityKind::from_keyword(first) {
            Some(kind) => self.read_typed_definition(kind, after_first, body),
            None => self.read_separated_definition(header, body),
        }
    }

    fn read_intent_definition(&mut self, rest: &str, body: Option<&str>) -> Result<(), String> {
        let (name, rest) = split_name(rest)?;
        if name.is_empty() {
            return Err("Invalid intent definition: missing intent name".to_string());
        }
        check_name(name)?;
        let modifiers = parse_modifiers(rest)?;
        if !modifiers.roles.is_empty() {
            return Err(format!("Invalid intent definition: intent '{}' cannot have roles", name));
        }
        if body.is_some_and(|b| !b.is_empty()) {
            return Err(format!("Invalid intent definition: unexpected value for intent '{}'", name));
        }
        let index = self.intent_index(name);
        extend_distinct(&mut self.model.intents[index].features, modifiers.features);
        Ok(())
    }

    fn read_typed_definition(
        &mut self,
        kind: EntityKind,
        rest: &str,
        body: Option<&str>,
    ) -> Result<(), String> {
        let (raw_name, rest) = split_name(rest)?;
        if raw_name.is_empty() {
            return Err(format!(
                "Invalid {} entity definition: missing entity name",
                kind
            ));
        }
        let name = match kind {
            EntityKind::PhraseList => raw_name.split('(').next().unwrap_or(raw_name).trim(),
            _ => raw_name,
        };
        check_name(name)?;
        if kind == EntityKind::Prebuilt && !is_prebuilt(name) {
            return Err(format!("Unknown prebuilt entity '{}'", name));
        }
        let modifiers = parse_modifiers(rest)?;

        let index = self.define(name, kind);
        self.apply_modifiers(index, modifiers);
        match kind {
            EntityKind::List => {
                if body.is_some_and(|b| !b.is_empty()) {
                    return Err(format!(
                        "Invalid list entity definition: values of '{}' must be listed on the following lines",
                        name
                    ));
                }
                self.block = Block::List {
                    entity: index,
                    value: None,
                };
            }
            _ => self.read_body(index, body)?,
        }
        Ok(())
    }

    fn read_separated_definition(&mut self, header: &str, body: Option<&str>) -> Result<(), String> {
        let (name, rest) = split_name(header)?;
        check_name(name)?;
        let modifiers = parse_modifiers(rest)?;
        if body.is_none() && modifiers.is_empty() {
            return Err(format!(
                "Invalid entity definition: unknown entity type '{}'",
                name
            ));
        }

        self.model.references.push(name.to_string());
        match self.model.entities.iter().position(|e| e.name == name) {
            Some(index) => {
                self.apply_modifiers(index, modifiers);
                if self.model.entities[index].kind == EntityKind::List {
                    if body.is_some_and(|b| !b.is_empty()) {
                        return Err(format!(
                            "Invalid list entity definition: values of '{}' must be listed on the following lines",
                            name
                        ));
                    }
                    if body.is_some() {
                        self.block = Block::List {
                            entity: index,
                            value: None,
                        };
                    }
                    return Ok(());
                }
                self.read_body(index, body)
            }
            None => {
                if !modifiers.is_empty() {
                    self.deferred.push((name.to_string(), modifiers));
                }
                Ok(())
            }
        }
    }

    /// Interpret the text after `=` for an entity that is not a list.
    fn read_body(&mut self, index: usize, body: Option<&str>) -> Result<(), String> {
        let Some(body) = body else {
            return Ok(());
        };
        let entity = &mut self.model.entities[index];
        match entity.kind {
            EntityKind::Ml if body.is_empty() => self.block = Block::Ml(index),
            EntityKind::Ml => {
                return Err(format!(
                    "Invalid ml entity definition: children of '{}' must be listed on the following lines",
                    entity.name
                ))
            }
            EntityKind::Regex if body.is_empty() => {}
            EntityKind::Regex => entity.pattern = Some(parse_regex(body)?),
            EntityKind::Composite => {
                let children = parse_composite(body)?;
                extend_distinct(&mut entity.children, children);
            }
            EntityKind::PhraseList if body.is_empty() => self.block = Block::PhraseList(index),
            EntityKind::PhraseList => extend_distinct(&mut entity.phrases, split_list(body)),
            EntityKind::Prebuilt | EntityKind::PatternAny | EntityKind::List => {
                if !body.is_empty() {
                    return Err(format!(
                        "Invalid {} entity definition: unexpected value for '{}'",
                        entity.kind, entity.name
                    ));
                }
            }
        }
        Ok(())
    }

    fn read_item(&mut self, content: &str) -> Result<(), String> {
        match self.block {
            Block::Intent(index) => self.read_utterance(index, content),
            Block::List { entity, value } => self.read_list_value(entity, value, content),
            Block::Ml(parent) => self.read_child(parent, content),
            Block::PhraseList(index) => {
                let phrases = split_list(content);
                if phrases.is_empty() {
                    return Err("Invalid phrase list value: value is empty".to_string());
                }
                extend_distinct(&mut self.model.entities[index].phrases, phrases);
                Ok(())
            }
            Block::None => Err(
                "Invalid input: list item must follow an intent or entity definition".to_string(),
            ),
        }
    }

    fn read_utterance(&mut self, intent: usize, text: &str) -> Result<(), String> {
        if text.is_empty() {
            return Err("Invalid utterance: utterance text is empty".to_string());
        }

        let mut labels = Vec::new();
        let mut references = Vec::new();
        let mut open: Option<usize> = None;
        for (i, c) in text.char_indices() {
            match c {
                '{' if open.is_some() => {
                    return Err(format!("Invalid utterance: nested '{{' in '{}'", text))
                }
                '{' => open = Some(i),
                '}' => {
                    let Some(start) = open.take() else {
                        return Err(format!("Invalid utterance: unbalanced '}}' in '{}'", text));
                    };
                    read_span(&text[start + 1..i], &mut labels, &mut references)?;
                }
                _ => {}
            }
        }
        if open.is_some() {
            return Err(format!("Invalid utterance: unbalanced '{{' in '{}'", text));
        }

        extend_distinct(&mut self.model.labels, labels);
        self.model.pattern_references.extend(references);
        self.model.intents[intent].utterances.push(text.to_string());
        Ok(())
    }

    fn read_list_value(
        &mut self,
        entity: usize,
        value: Option<usize>,
        content: &str,
    ) -> Result<(), String> {
        let values = &mut self.model.entities[entity].values;
        if let Some(canonical) = content.strip_suffix(':') {
            let canonical = canonical.trim();
            if canonical.is_empty() {
                return Err("Invalid list entity value: missing normalized value".to_string());
            }
            values.push(ListValue {
                canonical: canonical.to_string(),
                synonyms: Vec::new(),
            });
            self.block = Block::List {
                entity,
                value: Some(values.len() - 1),
            };
            return Ok(());
        }

        if content.is_empty() {
            return Err("Invalid list entity value: synonym is empty".to_string());
        }
        match value {
            Some(value) => {
                values[value].synonyms.push(content.to_string());
                Ok(())
            }
            None => Err(format!(
                "Invalid list entity value: synonym '{}' has no normalized value; end the value line with ':'",
                content
            )),
        }
    }

    fn read_child(&mut self, parent: usize, content: &str) -> Result<(), String> {
        let Some(child) = content.strip_prefix('@') else {
            return Err(format!(
                "Invalid child entity definition: expected '- @ <type> <name>', found '{}'",
                content
            ));
        };
        let header = child.split_once('=').map_or(child, |(h, _)| h).trim();

        let (first, rest) = split_word(header);
        if first.is_empty() {
            return Err("Invalid child entity definition: missing entity name".to_string());
        }
        let (kind, name, mut features, rest) = match EntityKind::from_keyword(first) {
            Some(kind) => {
                let (name, rest) = split_word(rest);
                if name.is_empty() {
                    return Err(format!(
                        "Invalid child entity definition: missing {} entity name",
                        kind
                    ));
                }
                (kind, name, Vec::new(), rest)
            }
            None => {
                let (second, after) = split_word(rest);
                if second.is_empty() || MODIFIER.is_match(second) {
                    (EntityKind::Ml, first, Vec::new(), rest)
                } else {
                    (EntityKind::Ml, second, vec![first.to_string()], after)
                }
            }
        };
        check_name(name)?;
        let modifiers = parse_modifiers(rest)?;
        features.extend(modifiers.features);

        let index = self.define(name, kind);
        self.apply_modifiers(
            index,
            Modifiers {
                roles: modifiers.roles,
                features,
            },
        );
        let name = name.to_string();
        extend_distinct(&mut self.model.entities[parent].children, vec![name]);
        Ok(())
    }

    fn intent_index(&mut self, name: &str) -> usize {
        match self.model.intents.iter().position(|i| i.name == name) {
            Some(index) => index,
            None => {
                self.model.intents.push(Intent {
                    name: name.to_string(),
                    ..Default::default()
                });
                self.model.intents.len() - 1
            }
        }
    }

    /// Find the definition of `name` with `kind`, creating it if needed.
    fn define(&mut self, name: &str, kind: EntityKind) -> usize {
        let existing = self
            .model
            .entities
            .iter()
            .position(|e| e.name == name && e.kind == kind);
        match existing {
            Some(index) => index,
            None => {
                self.model.entities.push(Entity::new(name, kind));
                self.model.entities.len() - 1
            }
        }
    }

    fn apply_modifiers(&mut self, index: usize, modifiers: Modifiers) {
        let entity = &mut self.model.entities[index];
        extend_distinct(&mut entity.roles, modifiers.roles);
        extend_distinct(&mut entity.features, modifiers.features);
    }
}

/// Record one `{...}` span of an utterance.
fn read_span(
    span: &str,
    labels: &mut Vec<String>,
    references: &mut Vec<PatternReference>,
) -> Result<(), String> {
    let span = span.trim();
    if span.is_empty() {
        return Err("Invalid utterance: empty entity reference '{}'".to_string());
    }

    if let Some((name, value)) = span.split_once('=') {
        let name = name.trim().trim_start_matches('@').trim();
        let name = name.split(':').next().unwrap_or(name).trim();
        if name.is_empty() {
            return Err(format!("Invalid labeled utterance: missing entity name in '{{{}}}'", span));
        }
        if value.trim().is_empty() {
            return Err(format!("Invalid labeled utterance: missing labeled value in '{{{}}}'", span));
        }
        labels.push(name.to_string());
    } else {
        let (name, role) = match span.split_once(':') {
            Some((name, role)) => (name.trim(), Some(role.trim().to_string())),
            None => (span, None),
        };
        let name = name.trim_start_matches('@').trim();
        if name.is_empty() || role.as_deref() == Some("") {
            return Err(format!("Invalid pattern: malformed entity reference '{{{}}}'", span));
        }
        references.push(PatternReference {
            name: name.to_string(),
            role,
        });
    }
    Ok(())
}

fn strip_bullet(line: &str) -> Option<&str> {
    line.strip_prefix('-')
        .or_else(|| line.strip_prefix('*'))
        .or_else(|| line.strip_prefix('+'))
}

/// Split off the first whitespace-delimited word.
fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim();
    match s.find(char::is_whitespace) {
        Some(end) => (&s[..end], s[end..].trim()),
        None => (s, ""),
    }
}

/// Split off an entity name, which may be quoted to contain spaces.
fn split_name(s: &str) -> Result<(&str, &str), String> {
    let s = s.trim();
    match s.strip_prefix('"') {
        Some(quoted) => match quoted.find('"') {
            Some(end) => Ok((quoted[..end].trim(), quoted[end + 1..].trim())),
            None => Err(format!("Invalid entity name: missing closing quote in '{}'", s)),
        },
        None => Ok(split_word(s)),
    }
}

fn check_name(name: &str) -> Result<(), String> {
    if ENTITY_NAME.is_match(name) {
        Ok(())
    } else {
        Err(format!("Invalid entity name '{}'", name))
    }
}

/// Parse trailing `hasRoles a, b` and `usesFeature(s) c, d` clauses.
fn parse_modifiers(rest: &str) -> Result<Modifiers, String> {
    let rest = rest.trim();
    let mut modifiers = Modifiers::default();
    if rest.is_empty() {
        return Ok(modifiers);
    }

    let keywords: Vec<_> = MODIFIER.find_iter(rest).collect();
    let leading_end = keywords.first().map_or(rest.len(), |m| m.start());
    if leading_end != 0 {
        return Err(format!(
            "Invalid entity definition: unexpected '{}'",
            rest[..leading_end].trim()
        ));
    }

    for (i, keyword) in keywords.iter().enumerate() {
        let end = keywords.get(i + 1).map_or(rest.len(), |next| next.start());
        let names = split_list(&rest[keyword.end()..end]);
        if names.is_empty() {
            return Err(format!(
                "Invalid entity definition: '{}' requires at least one name",
                keyword.as_str()
            ));
        }
        if keyword.as_str().to_ascii_lowercase().starts_with("hasrole") {
            modifiers.roles.extend(names);
        } else {
            modifiers.features.extend(names);
        }
    }
    Ok(modifiers)
}

/// Split a comma-separated list of names, dropping quotes and blanks.
fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|item| item.trim().trim_matches('"').trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_regex(body: &str) -> Result<String, String> {
    match body
        .strip_prefix('/')
        .and_then(|inner| inner.strip_suffix('/'))
    {
        Some(pattern) => Ok(pattern.to_string()),
        None => Err(format!(
            "Invalid regex entity definition: pattern '{}' must be enclosed in '/'",
            body
        )),
    }
}

fn parse_composite(body: &str) -> Result<Vec<String>, String> {
    match body
        .strip_prefix('[')
        .and_then(|inner| inner.strip_suffix(']'))
    {
        Some(children) => Ok(split_list(children)),
        None => Err(format!(
            "Invalid composite entity definition: children '{}' must be enclosed in '[' and ']'",
            body
        )),
    }
}

fn extend_distinct(target: &mut Vec<String>, items: Vec<String>) {
    for item in items {
        if !target.contains(&item) {
            target.push(item);
        }
    }
}
