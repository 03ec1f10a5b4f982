use thiserror::Error;

use crate::doc::SectionKind;

/// Errors raised by the designer's model and editing operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DesignerError {
    /// Drawn geometry is too small or has too few vertices to commit.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    /// A bulk operation was requested with nothing selected.
    #[error("nothing selected: {0}")]
    MissingSelection(&'static str),
    /// The target section cannot hold seats.
    #[error("section kind {0:?} does not accept seats")]
    StructuralConflict(SectionKind),
    /// A field edit carries a value the entity cannot take.
    #[error("invalid value: {0}")]
    InvalidField(String),
    /// A mutation referenced an id that is not in the layout.
    #[error("unknown {kind} {id}")]
    UnknownEntity { kind: &'static str, id: uuid::Uuid },
    /// A layout document failed to parse or validate.
    #[error("import failed: {0}")]
    Import(String),
    #[error("export failed: {0}")]
    Export(String),
}
