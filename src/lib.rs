//! # naf-kernel
//!
//! Multi-layer linguistic annotation documents with a lossless NAF codec.
//!
//! A [`Document`] holds word forms, terms and some twenty annotation layers
//! (dependencies, entities, coreference, opinions, semantic roles, constituency
//! trees, time expressions, ...). Every annotation points into lower layers by
//! identifier; the store keeps those references valid and indexed by term,
//! word form and sentence.
//!
//! ## Architecture
//!
//! ```text
//! NAF XML → codec::reader → Document (facade) → codec::writer → NAF XML
//!                              ↓
//!              IdManager + AnnotationStore + DepPathEngine
//! ```
//!
//! ## Guarantees
//!
//! - Every span target resolves to an existing annotation
//! - Generated ids never collide with ids observed on load
//! - Decode then encode preserves every layer in iteration order, unknown
//!   sections included

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod ids;
pub mod error;
pub mod store;
pub mod dep_path;
pub mod constituency;
pub mod codec;
pub mod document;
pub mod canonical;
pub mod telemetry;

// Re-exports
pub use types::{
    CLink, Chunk, Coref, Dep, Entity, ExternalRef, Factuality, FactualityPart, Feature, FeatureKind,
    FileDesc, Header, LinguisticProcessor, LinkedEntity, Mark, Opinion, OpinionExpression,
    OpinionHolder, OpinionTarget, Predicate, Public, Relation, Relational, Role, Sentiment, Span,
    SstSpan, TLink, TLinkReferable, Term, TermId, Timex3, Topic, Tree, TreeNode, Wf, WfId,
};
pub use error::{NafError, Result};
pub use ids::{IdGenerator, IdManager};
pub use store::{AnnotationRef, AnnotationStore, Layer, LayerCounts, UnknownLayer};
pub use dep_path::{DepPathEngine, DepPathStats, Walk};
pub use constituency::TreeParseError;
pub use codec::CodecConfig;
pub use document::{Document, DEFAULT_NAF_VERSION};
pub use canonical::{canonical_hash, canonical_hash_hex, document_hash, document_hash_hex, to_canonical_bytes};
pub use telemetry::{init_tracing, LogConfig, LogFormat};
