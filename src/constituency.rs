//! Bracket-notation constituency parser.
//!
//! Turns parser output such as `(ROOT (S (NP (NNP John)) (VP (VBZ loves))))`
//! into [`TreeNode`]s whose leaves point at the terms of one sentence. Leaf
//! words are aligned to terms positionally, tolerating the usual PTB bracket
//! escapes and tokens split out of multi-word terms.

use std::collections::HashMap;

use crate::error::Result;
use crate::ids::IdManager;
use crate::types::{Span, TermId, TreeNode};

/// Suffix marking a head constituent (`NP=H`).
pub const HEAD_MARK: &str = "=H";

/// Tokens shown on each side of the offending one in error messages.
const CONTEXT_WINDOW: usize = 5;

/// Why a bracket string could not be turned into trees.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeParseError {
    /// The bracket structure is invalid.
    #[error("Malformed tree at token {position}: \"... {context} ...\"")]
    MalformedTree {
        /// Index of the offending token.
        position: usize,
        /// Surrounding tokens, offender marked `->tok<-`.
        context: String,
    },

    /// A leaf word matches no remaining term of the sentence.
    #[error("Alignment failure in sentence {sentence}: form \"{token}\" not found among the sentence terms")]
    AlignmentFailure {
        /// Sentence being parsed.
        sentence: u32,
        /// Leaf word that could not be placed.
        token: String,
    },
}

fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    for (i, ch) in text.char_indices() {
        let is_bracket = ch == '(' || ch == ')';
        if is_bracket || ch.is_whitespace() {
            if let Some(s) = start.take() {
                tokens.push(&text[s..i]);
            }
            if is_bracket {
                tokens.push(&text[i..i + 1]);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        tokens.push(&text[s..]);
    }
    tokens
}

fn is_word(token: &str) -> bool {
    token != "(" && token != ")"
}

fn malformed(tokens: &[&str], position: usize) -> TreeParseError {
    let from = position.saturating_sub(CONTEXT_WINDOW);
    let to = (position + CONTEXT_WINDOW).min(tokens.len());
    let context = tokens[from..to]
        .iter()
        .enumerate()
        .map(|(i, tok)| {
            if from + i == position {
                format!("->{}<-", tok)
            } else {
                tok.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    TreeParseError::MalformedTree { position, context }
}

/// Validate the token stream and pair each `(` with its `)`.
fn check(tokens: &[&str]) -> std::result::Result<HashMap<usize, usize>, TreeParseError> {
    let last = tokens.len().saturating_sub(1);
    let mut stack = Vec::new();
    let mut pairs = HashMap::new();
    for (i, tok) in tokens.iter().enumerate() {
        match *tok {
            "(" => {
                if (i > 0 && tokens[i - 1] == "(") || i == last {
                    return Err(malformed(tokens, i));
                }
                stack.push(i);
            }
            ")" => {
                if i < 3 || tokens[i - 1] == "(" {
                    return Err(malformed(tokens, i));
                }
                let open = stack.pop().ok_or_else(|| malformed(tokens, i))?;
                pairs.insert(open, i);
            }
            _ => {
                if i == 0 || i == last {
                    return Err(malformed(tokens, i));
                }
                let (prev, next) = (tokens[i - 1], tokens[i + 1]);
                if (is_word(prev) && is_word(next)) || prev == ")" || (prev == "(" && next == ")") {
                    return Err(malformed(tokens, i));
                }
            }
        }
    }
    if !stack.is_empty() {
        return Err(malformed(tokens, last));
    }
    Ok(pairs)
}

fn bracket_escape(form: &str) -> &str {
    match form {
        "(" => "-LRB-",
        ")" => "-RRB-",
        "{" => "-LCB-",
        "}" => "-RCB-",
        "[" => "-LSB-",
        "]" => "-RSB-",
        other => other,
    }
}

/// Map every leaf token index to a term of the sentence.
fn align(
    tokens: &[&str],
    terms: &[(TermId, String)],
    sentence: u32,
) -> std::result::Result<HashMap<usize, TermId>, TreeParseError> {
    let mut mapping = HashMap::new();
    let mut next = 0usize;
    for i in 1..tokens.len() {
        let token = tokens[i];
        if !is_word(token) || !is_word(tokens[i - 1]) {
            continue;
        }
        let failure = || TreeParseError::AlignmentFailure {
            sentence,
            token: token.to_string(),
        };
        let current = terms.get(next).ok_or_else(failure)?;
        if bracket_escape(&current.1).contains(token) {
            mapping.insert(i, current.0.clone());
            next += 1;
        } else if next > 0 && terms[next - 1].1.contains(token) {
            // piece of a multi-token term
            mapping.insert(i, terms[next - 1].0.clone());
        } else {
            next += 1;
            let found = terms[next.min(terms.len())..].iter().position(|(_, form)| form == token);
            let offset = found.ok_or_else(failure)?;
            mapping.insert(i, terms[next + offset].0.clone());
            next += offset + 1;
        }
    }
    Ok(mapping)
}

struct Builder<'a> {
    tokens: &'a [&'a str],
    pairs: HashMap<usize, usize>,
    leaves: HashMap<usize, TermId>,
    ids: &'a mut IdManager,
}

impl Builder<'_> {
    /// Build the constituent whose label is at `start` and whose content ends at `end`.
    fn nonterminal(&mut self, start: usize, end: usize, is_root: bool) -> Result<TreeNode> {
        let tag = self.tokens[start];
        let (label, head) = match tag.strip_suffix(HEAD_MARK) {
            Some(label) => (label, true),
            None => (tag, false),
        };
        let id = self.ids.nonterminals.next()?;
        let edge_id = if is_root { None } else { Some(self.ids.edges.next()?) };

        let mut children = Vec::new();
        if end == start + 1 {
            let Some(term) = self.leaves.get(&end).cloned() else {
                return Err(malformed(self.tokens, end).into());
            };
            children.push(TreeNode::Terminal {
                id: self.ids.terminals.next()?,
                span: Span::from_targets(vec![term]),
                edge_id: Some(self.ids.edges.next()?),
                head: false,
            });
        } else {
            let mut current = start + 1;
            while current <= end {
                let close = *self.pairs.get(&current).ok_or_else(|| malformed(self.tokens, current))?;
                children.push(self.nonterminal(current + 1, close - 1, false)?);
                current = close + 1;
            }
        }
        Ok(TreeNode::NonTerminal {
            id,
            label: label.to_string(),
            children,
            edge_id,
            head,
        })
    }
}

/// Parse `text` into one tree per top-level bracket.
///
/// `terms` are the sentence's terms with their surface forms, in order. Node
/// and edge ids are drawn from `ids`. A string without leaf words yields no
/// trees.
pub fn parse(text: &str, sentence: u32, terms: &[(TermId, String)], ids: &mut IdManager) -> Result<Vec<TreeNode>> {
    let tokens = tokenize(text);
    let pairs = check(&tokens)?;
    let leaves = align(&tokens, terms, sentence)?;
    if leaves.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder = Builder {
        tokens: &tokens,
        pairs,
        leaves,
        ids,
    };
    let mut roots = Vec::new();
    let mut current = 0;
    while current < tokens.len() {
        let close = *builder.pairs.get(&current).ok_or_else(|| malformed(&tokens, current))?;
        roots.push(builder.nonterminal(current + 1, close - 1, true)?);
        current = close + 1;
    }
    Ok(roots)
}
