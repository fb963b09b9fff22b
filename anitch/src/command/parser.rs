//! Ordered rule table turning free text into an [`Intent`]
//!
//! Rules are evaluated top-down and the first one whose pattern matches and
//! whose constructor accepts the captures wins. Meditation keywords come
//! before analysis keywords because both can appear in the same sentence.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use crate::command::types::{Intent, IntentKind, Shape};

/// Priority order of the command rules. The first entry is checked first.
pub const RULE_ORDER: [&str; 5] = [
    "meditate",
    "analyze",
    "toggle_bridge",
    "consult_oracle",
    "manifest_object",
];

/// One `(predicate, constructor)` pair
pub struct CommandRule {
    pub name: &'static str,
    pattern: Regex,
    build: fn(&Captures<'_>) -> Option<IntentKind>,
}

impl CommandRule {
    fn new(
        name: &'static str,
        pattern: &str,
        build: fn(&Captures<'_>) -> Option<IntentKind>,
    ) -> Self {
        Self {
            name,
            // Patterns are literals below; a bad one is a programming error caught by tests
            pattern: Regex::new(pattern).unwrap_or_else(|e| panic!("rule {}: {}", name, e)),
            build,
        }
    }

    /// Try this rule against already-trimmed input
    pub fn apply(&self, input: &str) -> Option<IntentKind> {
        let caps = self.pattern.captures(input)?;
        (self.build)(&caps)
    }
}

static RULES: Lazy<Vec<CommandRule>> = Lazy::new(|| {
    vec![
        CommandRule::new("meditate", r"(?i)meditate|focus|restore", |_| {
            Some(IntentKind::Meditate)
        }),
        CommandRule::new("analyze", r"(?i)analyze|build|construct", |_| {
            Some(IntentKind::Analyze)
        }),
        CommandRule::new(
            "toggle_bridge",
            r"(?i)connect bridge|disconnect bridge",
            |_| Some(IntentKind::ToggleBridge),
        ),
        CommandRule::new("consult_oracle", r"(?is)^(?:gemini|ask)\s+(.+)", |caps| {
            let query = caps.get(1)?.as_str().trim();
            if query.is_empty() {
                None
            } else {
                Some(IntentKind::ConsultOracle(query.to_string()))
            }
        }),
        CommandRule::new(
            "manifest_object",
            r"(?i)manifest (?:a |an )?(cube|sphere|pyramid)",
            |caps| {
                caps.get(1)?
                    .as_str()
                    .parse::<Shape>()
                    .ok()
                    .map(IntentKind::ManifestObject)
            },
        ),
    ]
});

/// The rule table in evaluation order
pub fn rules() -> &'static [CommandRule] {
    &RULES
}

/// Parse a raw command. Total: anything unmatched becomes `Unknown`.
pub fn parse(raw: &str) -> Intent {
    let input = raw.trim();
    for rule in rules() {
        if let Some(kind) = rule.apply(input) {
            debug!(rule = rule.name, command = raw, "command rule matched");
            return Intent::new(kind, raw);
        }
    }
    debug!(command = raw, "no command rule matched");
    Intent::new(IntentKind::Unknown, raw)
}
