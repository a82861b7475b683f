//! Per-layer identifier generation.
//!
//! Every annotation layer owns an [`IdGenerator`] made of a prefix and a
//! monotonically increasing counter. Identifiers read from foreign documents are
//! fed through [`IdGenerator::observe`], which raises the counter's high-water mark
//! so that freshly generated identifiers never collide with loaded ones.
//!
//! ## Sticky inconsistency
//!
//! An observed identifier without trailing digits cannot be ordered against the
//! counter. The generator is then marked inconsistent and every later call to
//! [`IdGenerator::next`] fails with [`NafError::InconsistentIdState`]. Other layers
//! keep working.

use std::collections::HashMap;

use crate::error::{NafError, Result};
use crate::types::TermId;

/// Separator between a term id and a component index.
const COMPONENT_SEPARATOR: char = '.';

/// Monotonic identifier generator for one layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdGenerator {
    layer: &'static str,
    prefix: &'static str,
    counter: u64,
    inconsistent: bool,
}

impl IdGenerator {
    /// Create a generator for `layer` producing `prefix1`, `prefix2`, ...
    pub const fn new(layer: &'static str, prefix: &'static str) -> Self {
        Self {
            layer,
            prefix,
            counter: 0,
            inconsistent: false,
        }
    }

    /// Allocate the next identifier.
    pub fn next(&mut self) -> Result<String> {
        if self.inconsistent {
            return Err(NafError::InconsistentIdState {
                layer: self.layer.to_string(),
                prefix: self.prefix.to_string(),
            });
        }
        match self.counter.checked_add(1) {
            Some(next) => {
                self.counter = next;
                Ok(format!("{}{}", self.prefix, self.counter))
            }
            None => {
                self.inconsistent = true;
                tracing::warn!(layer = self.layer, prefix = self.prefix, "Identifier counter exhausted");
                Err(NafError::InconsistentIdState {
                    layer: self.layer.to_string(),
                    prefix: self.prefix.to_string(),
                })
            }
        }
    }

    /// Record an existing identifier, raising the counter if needed.
    pub fn observe(&mut self, id: &str) {
        match trailing_number(id) {
            Some(n) => {
                if n > self.counter {
                    self.counter = n;
                }
            }
            None => {
                if !self.inconsistent {
                    tracing::warn!(
                        layer = self.layer,
                        id = %id,
                        "Identifier does not end in digits; fresh ids disabled for this layer"
                    );
                }
                self.inconsistent = true;
            }
        }
    }

    /// Current high-water mark.
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Prefix used for generated identifiers.
    pub fn prefix(&self) -> &'static str {
        self.prefix
    }

    /// Layer name, used in error reports.
    pub fn layer(&self) -> &'static str {
        self.layer
    }

    /// Whether a malformed identifier has been observed.
    pub fn is_inconsistent(&self) -> bool {
        self.inconsistent
    }
}

/// Parse the trailing run of ASCII digits of `id`.
fn trailing_number(id: &str) -> Option<u64> {
    let digits = id.len() - id.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    id[id.len() - digits..].parse().ok()
}

/// Identifier generators for every layer of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdManager {
    /// Word forms.
    pub wfs: IdGenerator,
    /// Terms.
    pub terms: IdGenerator,
    /// Markables.
    pub marks: IdGenerator,
    /// Multi-word compounds.
    pub mws: IdGenerator,
    /// Chunks.
    pub chunks: IdGenerator,
    /// Entities.
    pub entities: IdGenerator,
    /// Coreference chains.
    pub corefs: IdGenerator,
    /// Time expressions.
    pub timex3s: IdGenerator,
    /// Linked entities.
    pub linked_entities: IdGenerator,
    /// Properties.
    pub properties: IdGenerator,
    /// Categories.
    pub categories: IdGenerator,
    /// Opinions.
    pub opinions: IdGenerator,
    /// Relations.
    pub relations: IdGenerator,
    /// SRL predicates.
    pub predicates: IdGenerator,
    /// SRL roles.
    pub roles: IdGenerator,
    /// Constituency terminals.
    pub terminals: IdGenerator,
    /// Constituency non-terminals.
    pub nonterminals: IdGenerator,
    /// Constituency edges.
    pub edges: IdGenerator,
    /// Super-sense tag spans.
    pub ssts: IdGenerator,
    /// Topics.
    pub topics: IdGenerator,
    /// Temporal links.
    pub tlinks: IdGenerator,
    /// Causal links.
    pub clinks: IdGenerator,
    component_counter: HashMap<String, u64>,
    inconsistent_components: bool,
}

impl Default for IdManager {
    fn default() -> Self {
        Self::new()
    }
}

impl IdManager {
    /// Create a manager with every counter at zero.
    pub fn new() -> Self {
        Self {
            wfs: IdGenerator::new("wfs", "w"),
            terms: IdGenerator::new("terms", "t"),
            marks: IdGenerator::new("marks", "m"),
            mws: IdGenerator::new("mws", "t.mw"),
            chunks: IdGenerator::new("chunks", "c"),
            entities: IdGenerator::new("entities", "e"),
            corefs: IdGenerator::new("corefs", "co"),
            timex3s: IdGenerator::new("timex3s", "tmx"),
            linked_entities: IdGenerator::new("linkedentities", "le"),
            properties: IdGenerator::new("properties", "p"),
            categories: IdGenerator::new("categories", "cat"),
            opinions: IdGenerator::new("opinions", "o"),
            relations: IdGenerator::new("relations", "r"),
            predicates: IdGenerator::new("predicates", "pr"),
            roles: IdGenerator::new("roles", "rl"),
            terminals: IdGenerator::new("terminals", "ter"),
            nonterminals: IdGenerator::new("nonterminals", "nter"),
            edges: IdGenerator::new("edges", "tre"),
            ssts: IdGenerator::new("ssts", "sst"),
            topics: IdGenerator::new("topics", "top"),
            tlinks: IdGenerator::new("tlinks", "tlink"),
            clinks: IdGenerator::new("clinks", "clink"),
            component_counter: HashMap::new(),
            inconsistent_components: false,
        }
    }

    /// Allocate the next component id of `term`: `<term>.1`, `<term>.2`, ...
    pub fn next_component_id(&mut self, term: &TermId) -> Result<String> {
        if self.inconsistent_components {
            return Err(NafError::InconsistentIdState {
                layer: "components".to_string(),
                prefix: format!("{}{}", term, COMPONENT_SEPARATOR),
            });
        }
        let counter = self.component_counter.entry(term.to_string()).or_insert(0);
        *counter += 1;
        Ok(format!("{}{}{}", term, COMPONENT_SEPARATOR, counter))
    }

    /// Record a component id loaded from a document.
    ///
    /// Ids must look like `t12.3` (optionally `t_12.3`); anything else disables
    /// component id generation.
    pub fn observe_component_id(&mut self, id: &str, term: &TermId) {
        match component_index(id, self.terms.prefix()) {
            Some(n) => {
                let counter = self.component_counter.entry(term.to_string()).or_insert(0);
                if n > *counter {
                    *counter = n;
                }
            }
            None => {
                tracing::debug!(id = %id, "Component id does not follow <term>.<n>");
                self.inconsistent_components = true;
            }
        }
    }

    /// Whether component id generation has been disabled.
    pub fn components_inconsistent(&self) -> bool {
        self.inconsistent_components
    }
}

/// Extract `n` from `<prefix>[_]<digits>.<n>`.
fn component_index(id: &str, term_prefix: &str) -> Option<u64> {
    let rest = id.strip_prefix(term_prefix)?;
    let rest = rest.strip_prefix('_').unwrap_or(rest);
    let (term_digits, index) = rest.split_once(COMPONENT_SEPARATOR)?;
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(term_digits) || !all_digits(index) {
        return None;
    }
    index.parse().ok()
}
