//! # rolematch
//!
//! Normalizes free-text job role titles (Brazilian Portuguese, with some
//! English loanwords) and resolves them to canonical role identifiers drawn
//! from a reference catalog.
//!
//! The engine cascades three matchers over a single canonicalized form of
//! the input title: an exact lookup against the catalog's normalized
//! titles, a multi-pattern substring automaton, and an IDF-weighted
//! embedding nearest-neighbor search. Construct an [`Engine`] once from a
//! catalog and an [`EngineConfig`], then call [`Engine::normalize_and_match`]
//! or the batch, splitting [`Engine::normalize_titles`] entry point per
//! request.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod fold;
pub mod gazetteer;
pub mod matcher;
pub mod normalizer;
pub mod spell;
pub mod substring;
pub mod unicode;

pub use catalog::{CatalogRole, CatalogTier, ProfileMapping};
pub use config::{EngineConfig, NormalizeOptions};
pub use engine::{CatalogEntry, Engine, NormalizedRoleTitle};
pub use error::{EngineError, Result};
pub use matcher::{MatchKind, MatchResult};
pub use normalizer::NormalizedTitle;
