use std::fmt;

use crate::DataId;

/// Identifiers under construction when an error was raised, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildChain(Vec<DataId>);

impl BuildChain {
    pub fn new(ids: Vec<DataId>) -> Self {
        Self(ids)
    }

    pub fn ids(&self) -> &[DataId] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for BuildChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        f.write_str(" (while building ")?;
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" > ")?;
            }
            write!(f, "{id}")?;
        }
        f.write_str(")")
    }
}

/// Fixture authoring errors. None of them is recoverable: the registration
/// pass that raised one is rolled back and should be abandoned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FactoryError {
    #[error("`{id}` is not registered{chain}")]
    NotRegistered { id: DataId, chain: BuildChain },

    #[error("`{id}` was fetched outside of a builder")]
    NoActiveFrame { id: DataId },

    #[error("`{id}` is already registered")]
    AlreadyRegistered { id: DataId },

    #[error("`{id}` references itself{chain}")]
    Cycle { id: DataId, chain: BuildChain },

    #[error("`{id}` is not a {expected}{chain}")]
    TypeMismatch {
        id: DataId,
        expected: &'static str,
        chain: BuildChain,
    },

    #[error("data id must not be empty")]
    InvalidId,
}

impl FactoryError {
    /// The identifier the error is about, if any.
    pub fn data_id(&self) -> Option<&DataId> {
        match self {
            Self::NotRegistered { id, .. }
            | Self::NoActiveFrame { id }
            | Self::AlreadyRegistered { id }
            | Self::Cycle { id, .. }
            | Self::TypeMismatch { id, .. } => Some(id),
            Self::InvalidId => None,
        }
    }
}
