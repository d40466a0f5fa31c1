//! Token extraction
//!
//! Each ecosystem has a pure function from an evaluated config (or raw
//! stylesheet) to [`PartialTokens`](crate::tokens::PartialTokens).
//! [`UniversalTokenExtractor`] loads every accepted source, picks the
//! function by ecosystem and merges the results into one
//! [`TokenTree`](crate::tokens::TokenTree).

pub mod css_variables;
pub mod custom_js;
pub mod normalize;
pub mod tailwind;
pub mod theme;
pub mod token_tree;
pub mod universal;

pub use universal::UniversalTokenExtractor;
