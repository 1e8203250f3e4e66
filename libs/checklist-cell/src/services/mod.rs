pub mod scoring;

pub use scoring::{KeywordGroup, RelevanceScorer};
