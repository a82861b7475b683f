//! Annotation model: one module per family of layers.

pub mod span;
pub mod text;
pub mod term;
pub mod external_ref;
pub mod header;
pub mod syntax;
pub mod entity;
pub mod opinion;
pub mod srl;
pub mod temporal;
pub mod lexical;
pub mod tree;

pub use span::Span;
pub use text::{Wf, WfId};
pub use term::{Sentiment, Term, TermId};
pub use external_ref::ExternalRef;
pub use header::{FileDesc, Header, LinguisticProcessor, ProcessorGroup, Public};
pub use syntax::{Chunk, Dep, Mark};
pub use entity::{Coref, Entity, Feature, FeatureKind, LinkedEntity, Relation, Relational};
pub use opinion::{Opinion, OpinionExpression, OpinionHolder, OpinionTarget};
pub use srl::{Predicate, Role};
pub use temporal::{CLink, Factuality, FactualityPart, TLink, TLinkReferable, Timex3};
pub use lexical::{SstSpan, Topic};
pub use tree::{Tree, TreeEdge, TreeNode};
