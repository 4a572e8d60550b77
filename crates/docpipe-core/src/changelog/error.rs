use thiserror::Error as ThisError;

///
/// ChangeLogError
///
/// Structured replay failures. Leaf variants describe the violation; the
/// `Context` wrapper records which entry and change raised it.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ChangeLogError {
    #[error("{operation}: index {index} out of range for {len} subdocuments")]
    IndexOutOfRange {
        operation: &'static str,
        index: usize,
        len: usize,
    },

    #[error(
        "{operation}: subdocument {index} has reference {actual:?}, expected {expected:?}"
    )]
    ReferenceMismatch {
        operation: &'static str,
        index: usize,
        expected: String,
        actual: Option<String>,
    },

    #[error("change log replay failed at {path}: {source}")]
    Context {
        path: String,
        #[source]
        source: Box<Self>,
    },
}

impl ChangeLogError {
    /// Prepend the change-log entry position to the error path.
    #[must_use]
    pub fn with_entry(self, index: usize) -> Self {
        self.with_path_segment(format!("entry[{index}]"))
    }

    /// Prepend the position of a change within its list.
    #[must_use]
    pub fn with_change(self, index: usize) -> Self {
        self.with_path_segment(format!("change[{index}]"))
    }

    /// Prepend the subdocument an update descended into.
    #[must_use]
    pub fn with_subdocument(self, index: usize) -> Self {
        self.with_path_segment(format!("updateSubdocument[{index}]"))
    }

    /// Return the full contextual path, if available.
    #[must_use]
    pub const fn path(&self) -> Option<&str> {
        match self {
            Self::Context { path, .. } => Some(path.as_str()),
            _ => None,
        }
    }

    /// Return the innermost, non-context error variant.
    #[must_use]
    pub fn leaf(&self) -> &Self {
        match self {
            Self::Context { source, .. } => source.leaf(),
            _ => self,
        }
    }

    #[must_use]
    fn with_path_segment(self, segment: String) -> Self {
        match self {
            Self::Context { path, source } => Self::Context {
                path: format!("{segment}.{path}"),
                source,
            },
            source => Self::Context {
                path: segment,
                source: Box::new(source),
            },
        }
    }
}
