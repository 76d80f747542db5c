//! Conflict Resolver
//!
//! Reconciles a previously recorded identifier with a freshly matched one.
//! Only a disagreement between two present identifiers is escalated; both
//! already passed a matching process, so no scoring rule can break the tie.

use crate::review::{ConflictChoice, ConflictReview, DecisionProvider};
use serde::Serialize;
use tracing::{debug, info};

/// Comparison of an existing and a fresh identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IdComparison {
    /// Neither side has an identifier
    NoIdentifier,
    /// Only the recorded identifier exists
    OnlyExisting { id: String },
    /// Only the fresh match exists
    OnlyNew { id: String },
    /// Both exist and agree
    Agreed { id: String },
    /// Both exist and disagree
    Conflict { existing: String, new: String },
}

impl IdComparison {
    /// Compare two (already normalized) identifiers
    pub fn compare(existing: Option<&str>, new: Option<&str>) -> Self {
        match (existing, new) {
            (None, None) => IdComparison::NoIdentifier,
            (Some(id), None) => IdComparison::OnlyExisting { id: id.to_string() },
            (None, Some(id)) => IdComparison::OnlyNew { id: id.to_string() },
            (Some(existing), Some(new)) if existing == new => IdComparison::Agreed {
                id: existing.to_string(),
            },
            (Some(existing), Some(new)) => IdComparison::Conflict {
                existing: existing.to_string(),
                new: new.to_string(),
            },
        }
    }

    /// Identifier settled without human input
    pub fn auto_resolved(&self) -> Option<&str> {
        match self {
            IdComparison::OnlyExisting { id }
            | IdComparison::OnlyNew { id }
            | IdComparison::Agreed { id } => Some(id),
            IdComparison::NoIdentifier | IdComparison::Conflict { .. } => None,
        }
    }

    pub fn needs_escalation(&self) -> bool {
        matches!(self, IdComparison::Conflict { .. })
    }
}

/// How a conflict ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictOutcome {
    /// Settled without escalation
    Automatic,
    /// Reviewer kept the recorded identifier
    KeptExisting,
    /// Reviewer took the fresh match
    TookNew,
    /// Reviewer deferred; the recorded identifier stays for now
    Deferred,
}

/// Final identifier for one person plus how it was reached
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictResolution {
    pub comparison: IdComparison,
    pub resolved_id: Option<String>,
    pub outcome: ConflictOutcome,
}

/// Resolves identifier pairs, escalating real conflicts to a decision provider
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictResolver;

impl ConflictResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve one person's identifier pair
    ///
    /// `provider` is consulted only when both identifiers exist and differ.
    /// A deferred conflict leaves the recorded identifier in place.
    pub fn resolve(
        &self,
        person: &str,
        existing: Option<&str>,
        new: Option<&str>,
        provider: &mut dyn DecisionProvider,
    ) -> ConflictResolution {
        let comparison = IdComparison::compare(existing, new);

        let IdComparison::Conflict { existing, new } = &comparison else {
            let resolved_id = comparison.auto_resolved().map(str::to_string);
            if resolved_id.is_some() {
                debug!(person = %person, resolved = ?resolved_id, "Auto-resolved identifier");
            }
            return ConflictResolution {
                comparison,
                resolved_id,
                outcome: ConflictOutcome::Automatic,
            };
        };

        info!(person = %person, existing = %existing, new = %new, "Identifier conflict");

        let review = ConflictReview {
            person,
            existing_id: existing,
            new_id: new,
        };
        let (resolved_id, outcome) = match provider.resolve_conflict(&review) {
            ConflictChoice::KeepExisting => (existing.clone(), ConflictOutcome::KeptExisting),
            ConflictChoice::KeepNew => (new.clone(), ConflictOutcome::TookNew),
            ConflictChoice::Skip => (existing.clone(), ConflictOutcome::Deferred),
        };

        ConflictResolution {
            resolved_id: Some(resolved_id),
            comparison,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::{DeferAll, ScriptedDecisions};

    #[test]
    fn test_compare_cases() {
        assert_eq!(IdComparison::compare(None, None), IdComparison::NoIdentifier);
        assert_eq!(
            IdComparison::compare(None, Some("X")).auto_resolved(),
            Some("X")
        );
        assert_eq!(
            IdComparison::compare(Some("X"), None).auto_resolved(),
            Some("X")
        );
        assert_eq!(
            IdComparison::compare(Some("X"), Some("X")),
            IdComparison::Agreed { id: "X".to_string() }
        );
        assert!(IdComparison::compare(Some("X"), Some("Y")).needs_escalation());
        assert!(!IdComparison::compare(Some("X"), Some("X")).needs_escalation());
    }

    #[test]
    fn test_auto_resolve_never_consults_provider() {
        // A script that would pick "new" must not be consumed
        let mut provider = ScriptedDecisions::new().conflict(ConflictChoice::KeepNew);
        let resolver = ConflictResolver::new();

        let resolution = resolver.resolve("Jane Doe", None, Some("X"), &mut provider);
        assert_eq!(resolution.resolved_id.as_deref(), Some("X"));
        assert_eq!(resolution.outcome, ConflictOutcome::Automatic);

        let resolution = resolver.resolve("Jane Doe", Some("X"), Some("X"), &mut provider);
        assert_eq!(resolution.resolved_id.as_deref(), Some("X"));

        let resolution = resolver.resolve("Jane Doe", None, None, &mut provider);
        assert_eq!(resolution.resolved_id, None);

        assert_eq!(provider.remaining(), 1);
    }

    #[test]
    fn test_conflict_choices() {
        let resolver = ConflictResolver::new();

        let mut provider = ScriptedDecisions::new().conflict(ConflictChoice::KeepExisting);
        let resolution = resolver.resolve("Jane Doe", Some("X"), Some("Y"), &mut provider);
        assert_eq!(resolution.resolved_id.as_deref(), Some("X"));
        assert_eq!(resolution.outcome, ConflictOutcome::KeptExisting);

        let mut provider = ScriptedDecisions::new().conflict(ConflictChoice::KeepNew);
        let resolution = resolver.resolve("Jane Doe", Some("X"), Some("Y"), &mut provider);
        assert_eq!(resolution.resolved_id.as_deref(), Some("Y"));
        assert_eq!(resolution.outcome, ConflictOutcome::TookNew);
    }

    #[test]
    fn test_deferred_conflict_keeps_prior_state() {
        let resolution =
            ConflictResolver::new().resolve("Jane Doe", Some("X"), Some("Y"), &mut DeferAll);
        assert_eq!(resolution.resolved_id.as_deref(), Some("X"));
        assert_eq!(resolution.outcome, ConflictOutcome::Deferred);
        assert!(resolution.comparison.needs_escalation());
    }
}
