use serde::Serialize;

use crate::ability::{Ability, Rule, Subject};
use crate::permissions::{Action, Permission, Resource};

/// Auditable answer to "why may (or may not) this caller do that?".
#[derive(Debug, Clone, Serialize)]
pub struct AbilityExplanation {
    pub action: Action,
    /// Catalog entry the subject resolved to, `None` when outside the catalog.
    pub resource: Option<Resource>,
    pub granted: bool,
    pub matched_rule: Option<Rule>,
    pub reason: String,
    /// Every grant of the ability, as `"<resource>:<action>"`.
    pub rules: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Explain the decision `ability.can(action, subject)` would take.
pub fn explain<S: Subject + ?Sized>(ability: &Ability, action: Action, subject: &S) -> AbilityExplanation {
    let rules: Vec<String> = ability.rules().iter().map(ToString::to_string).collect();

    let Some(resource) = subject.subject_type() else {
        return AbilityExplanation {
            action,
            resource: None,
            granted: false,
            matched_rule: None,
            reason: "Subject is not part of the resource catalog".to_string(),
            rules,
            suggestions: vec!["Use one of the catalog resources (e.g. 'patients', 'agendas')".to_string()],
        };
    };

    if let Some(rule) = ability.matching_rule(action, &resource) {
        let reason = if rule.resource == Resource::All {
            "Caller holds the 'all' permission".to_string()
        } else if rule.action == Action::Manage {
            format!("Caller manages '{resource}', which covers every action")
        } else {
            format!("Caller holds '{rule}'")
        };

        return AbilityExplanation {
            action,
            resource: Some(resource),
            granted: true,
            matched_rule: Some(*rule),
            reason,
            rules,
            suggestions: Vec::new(),
        };
    }

    let mut suggestions = vec![
        format!("Grant '{}'", Permission::new(resource, action)),
        format!("Grant '{}'", Permission::new(resource, Action::Manage)),
    ];
    if action == Action::Read {
        suggestions.insert(1, format!("Grant '{}' (write implies read)", Permission::new(resource, Action::Write)));
    }

    AbilityExplanation {
        action,
        resource: Some(resource),
        granted: false,
        matched_rule: None,
        reason: format!("No grant allows '{action}' on '{resource}'. Current grants: {rules:?}"),
        rules,
        suggestions,
    }
}
