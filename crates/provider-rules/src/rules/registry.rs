use std::collections::HashSet;

use super::rule::BuiltinRule;

/// Static description of a rule to register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDefinition {
    pub name: String,
    pub rule: BuiltinRule,
}

impl RuleDefinition {
    pub fn new(name: impl Into<String>, rule: BuiltinRule) -> Self {
        Self {
            name: name.into(),
            rule,
        }
    }
}

impl From<BuiltinRule> for RuleDefinition {
    fn from(rule: BuiltinRule) -> Self {
        Self::new(rule.default_name(), rule)
    }
}

/// Built-in rules in registration order.
pub fn standard_definitions() -> Vec<RuleDefinition> {
    vec![
        BuiltinRule::LicenseExpiry.into(),
        BuiltinRule::DuplicateDetection.into(),
    ]
}

/// Named rule inside a built registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredRule {
    name: String,
    rule: BuiltinRule,
}

impl RegisteredRule {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rule(&self) -> BuiltinRule {
        self.rule
    }
}

/// Ordered, immutable set of rules the engine runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleRegistry {
    rules: Vec<RegisteredRule>,
}

impl RuleRegistry {
    pub fn from_definitions(definitions: &[RuleDefinition]) -> Result<Self, RegistryError> {
        if definitions.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut seen = HashSet::new();
        let mut rules = Vec::with_capacity(definitions.len());
        for definition in definitions {
            let name = definition.name.trim();
            if name.is_empty() {
                return Err(RegistryError::BlankName);
            }
            if !seen.insert(name.to_string()) {
                return Err(RegistryError::DuplicateName(name.to_string()));
            }
            rules.push(RegisteredRule {
                name: name.to_string(),
                rule: definition.rule,
            });
        }

        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[RegisteredRule] {
        &self.rules
    }

    pub fn names(&self) -> Vec<String> {
        self.rules.iter().map(|rule| rule.name.clone()).collect()
    }

    /// Rules picked by a selector, in registration order.
    ///
    /// `None`, a blank selector, `"all"` and `"*"` select every rule; otherwise the
    /// selector is a comma-separated list of rule names that must all be registered
    /// and must name at least one rule.
    pub fn select(&self, selector: Option<&str>) -> Result<Vec<&RegisteredRule>, RegistryError> {
        let Some(raw) = selector.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Ok(self.rules.iter().collect());
        };
        if raw == "*" || raw.eq_ignore_ascii_case("all") {
            return Ok(self.rules.iter().collect());
        }

        let requested: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect();
        if requested.is_empty() {
            return Err(RegistryError::EmptySelection(raw.to_string()));
        }

        if let Some(unknown) = requested
            .iter()
            .find(|name| !self.rules.iter().any(|rule| rule.name == **name))
        {
            return Err(RegistryError::UnknownRule(unknown.to_string()));
        }

        Ok(self
            .rules
            .iter()
            .filter(|rule| requested.contains(&rule.name.as_str()))
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("rule registry has no rule definitions")]
    Empty,
    #[error("rule definition has a blank name")]
    BlankName,
    #[error("rule '{0}' is defined more than once")]
    DuplicateName(String),
    #[error("unknown rule '{0}' in rule set")]
    UnknownRule(String),
    #[error("rule set '{0}' names no rules")]
    EmptySelection(String),
}
