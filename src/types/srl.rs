//! Semantic role labelling: predicates and their roles.

use serde::{Deserialize, Serialize};

use super::external_ref::ExternalRef;
use super::span::Span;
use super::term::TermId;

/// Semantic role of a predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    id: String,
    span: Span<TermId>,
    /// Role label (e.g. "A0").
    pub sem_role: String,
    /// External references.
    pub external_refs: Vec<ExternalRef>,
    /// Free-form flags.
    pub flags: Vec<String>,
}

impl Role {
    pub(crate) fn new(id: String, sem_role: impl Into<String>, span: Span<TermId>) -> Self {
        Self {
            id,
            span,
            sem_role: sem_role.into(),
            external_refs: Vec::new(),
            flags: Vec::new(),
        }
    }

    /// Identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Role filler terms.
    pub fn span(&self) -> &Span<TermId> {
        &self.span
    }
}

/// Predicate with its roles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    id: String,
    span: Span<TermId>,
    roles: Vec<Role>,
    /// Predicate URI.
    pub uri: Option<String>,
    /// Producing source.
    pub source: Option<String>,
    /// Confidence.
    pub confidence: Option<f32>,
    /// External references.
    pub external_refs: Vec<ExternalRef>,
    /// Free-form flags.
    pub flags: Vec<String>,
}

impl Predicate {
    pub(crate) fn new(id: String, span: Span<TermId>) -> Self {
        Self {
            id,
            span,
            roles: Vec::new(),
            uri: None,
            source: None,
            confidence: None,
            external_refs: Vec::new(),
            flags: Vec::new(),
        }
    }

    /// Identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Predicate terms.
    pub fn span(&self) -> &Span<TermId> {
        &self.span
    }

    /// Roles in order.
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Role by id.
    pub fn role(&self, id: &str) -> Option<&Role> {
        self.roles.iter().find(|r| r.id == id)
    }

    /// Mutable role by id (its span stays fixed).
    pub fn role_mut(&mut self, id: &str) -> Option<&mut Role> {
        self.roles.iter_mut().find(|r| r.id == id)
    }

    pub(crate) fn push_role(&mut self, role: Role) -> &mut Role {
        self.roles.push(role);
        let last = self.roles.len() - 1;
        &mut self.roles[last]
    }

    /// Remove a role by id, returning it.
    pub fn remove_role(&mut self, id: &str) -> Option<Role> {
        let idx = self.roles.iter().position(|r| r.id == id)?;
        Some(self.roles.remove(idx))
    }
}
