//! forcedata type generation
//!
//! Derives record types from sample fixture files and turns them into Rust:
//!
//! ```text
//!   json/*.json ──► TypeInferrer ──► TypeDefinitions ──► render_rust ──► model.rs
//!   (samples)       (merge per type)  (YAML, editable)
//! ```
//!
//! The YAML document in the middle is the hand-off point: `json2type` writes
//! it, a human may adjust it, and `json2rs` reads it back.

pub mod error;
pub mod files;
pub mod infer;
pub mod rust;
pub mod schema;


pub use error::TypeGenError;
pub use files::expand_pattern;
pub use infer::TypeInferrer;
pub use rust::render_rust;
pub use schema::{DataFileDef, FieldDef, SystemType, TypeDef, TypeDefinitions};

pub type Result<T, E = TypeGenError> = std::result::Result<T, E>;

/// Expand `pattern` and infer definitions for every matching file, with
/// `model` naming each file's root type.
pub fn infer_files(pattern: &str, model: &str) -> Result<TypeDefinitions> {
    let mut inferrer = TypeInferrer::new(model)?;
    for path in expand_pattern(pattern)? {
        inferrer.add_file(&path)?;
    }
    Ok(inferrer.finish())
}
