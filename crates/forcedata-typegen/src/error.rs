use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum TypeGenError {
    #[error("model name must contain at least one letter or digit")]
    InvalidModel,

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not valid JSON", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{file}: expected a JSON object at `{path}`")]
    NotAnObject { file: String, path: String },

    #[error("sample file name `{name}` is used more than once")]
    DuplicateFile { name: String },

    #[error("invalid type definitions")]
    Yaml(#[from] serde_yaml::Error),

    #[error("field `{field}` of `{type_name}` is an object but names no type")]
    MissingObjectName { type_name: String, field: String },

    #[error("field `{field}` of `{type_name}` refers to undefined type `{object}`")]
    UndefinedType {
        type_name: String,
        field: String,
        object: String,
    },

    #[error("invalid file pattern `{pattern}`")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("failed to walk {}", root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("no files match `{pattern}`")]
    NoMatch { pattern: String },

    #[error("failed to format generated code")]
    Fmt(#[from] std::fmt::Error),
}
