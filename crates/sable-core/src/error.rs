//! Compiler diagnostics.
//!
//! Every failure the compiler can report is a [`CompilerError`]. The message
//! text is the observable contract: tools and tests match on it verbatim, so
//! the `Display` output never includes the span. Use [`CompilerError::span`]
//! to position a diagnostic and [`CompilerErrors`] to report several at once.
//!
//! ```text
//! CompilerError
//! ├── name resolution   UnresolvedIdentifier, UndeclaredType, Redefinition
//! ├── type errors       Type, ConstantOverflow, LiteralOverflow
//! ├── statement errors  Statement, MissingReturn, UnreachableCode
//! ├── resource errors   LabelRedefinition, UnresolvedLabel, TemporariesExhausted
//! └── Internal
//! ```

use std::fmt;

use thiserror::Error;

use crate::Span;

// ============================================================================
// CompilerError
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompilerError {
    #[error("use of unresolved identifier: `{name}'")]
    UnresolvedIdentifier { name: String, span: Span },

    #[error("use of undeclared type `{name}'")]
    UndeclaredType { name: String, span: Span },

    /// A declaration collides with a symbol in the same scope.
    ///
    /// `kind` is the declaration's noun: `variable`, `constant`, `function`
    /// or `struct declaration`.
    #[error("{kind} redefines existing symbol: `{name}'")]
    Redefinition {
        kind: &'static str,
        name: String,
        span: Span,
    },

    /// A compile-time integer does not fit the type it is converted to.
    #[error("integer constant `{value}' overflows when stored into `{target}'")]
    ConstantOverflow {
        value: i64,
        target: String,
        span: Span,
    },

    /// A literal is too large for any concrete integer type.
    #[error("integer literal `{value}' overflows when stored into `{target}'")]
    LiteralOverflow {
        value: i64,
        target: String,
        span: Span,
    },

    /// Operator, conversion, call, member and subscript errors.
    #[error("{message}")]
    Type { message: String, span: Span },

    /// Declaration and control-flow errors.
    #[error("{message}")]
    Statement { message: String, span: Span },

    #[error("missing return in a function expected to return `{expected}'")]
    MissingReturn { expected: String, span: Span },

    #[error("code after return will never be executed")]
    UnreachableCode { span: Span },

    #[error("label redefines existing symbol: `{name}'")]
    LabelRedefinition { name: String },

    #[error("cannot resolve label `{name}'")]
    UnresolvedLabel { name: String },

    #[error("temporary storage exhausted: {requested} bytes requested, {available} available")]
    TemporariesExhausted {
        requested: usize,
        available: usize,
        span: Span,
    },

    /// A broken compiler invariant. Never caused by user input.
    #[error("internal compiler error: {message}")]
    Internal { message: String },
}

impl CompilerError {
    pub fn type_error(message: impl Into<String>, span: Span) -> Self {
        CompilerError::Type {
            message: message.into(),
            span,
        }
    }

    pub fn statement(message: impl Into<String>, span: Span) -> Self {
        CompilerError::Statement {
            message: message.into(),
            span,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        CompilerError::Internal {
            message: message.into(),
        }
    }

    /// Where the error occurred. Backend errors have no source position.
    pub fn span(&self) -> Span {
        match self {
            CompilerError::UnresolvedIdentifier { span, .. } => *span,
            CompilerError::UndeclaredType { span, .. } => *span,
            CompilerError::Redefinition { span, .. } => *span,
            CompilerError::ConstantOverflow { span, .. } => *span,
            CompilerError::LiteralOverflow { span, .. } => *span,
            CompilerError::Type { span, .. } => *span,
            CompilerError::Statement { span, .. } => *span,
            CompilerError::MissingReturn { span, .. } => *span,
            CompilerError::UnreachableCode { span } => *span,
            CompilerError::TemporariesExhausted { span, .. } => *span,
            CompilerError::LabelRedefinition { .. }
            | CompilerError::UnresolvedLabel { .. }
            | CompilerError::Internal { .. } => Span::default(),
        }
    }
}

// ============================================================================
// CompilerErrors
// ============================================================================

/// Several independent errors gathered into one omnibus report.
///
/// Sibling top-level declarations are compiled even after one of them fails,
/// and their errors accumulate here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompilerErrors {
    errors: Vec<CompilerError>,
}

impl CompilerErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn push(&mut self, error: CompilerError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompilerError> {
        self.errors.iter()
    }

    pub fn first(&self) -> Option<&CompilerError> {
        self.errors.first()
    }

    pub fn into_vec(self) -> Vec<CompilerError> {
        self.errors
    }

    /// `Ok(())` when nothing was collected, otherwise the whole report.
    pub fn into_result(self) -> Result<(), CompilerErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for CompilerErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.as_slice() {
            [] => write!(f, "no errors"),
            [only] => write!(f, "{only}"),
            many => {
                for (index, error) in many.iter().enumerate() {
                    if index > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}: {}", error.span(), error)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for CompilerErrors {}

impl From<CompilerError> for CompilerErrors {
    fn from(error: CompilerError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl IntoIterator for CompilerErrors {
    type Item = CompilerError;
    type IntoIter = std::vec::IntoIter<CompilerError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a CompilerErrors {
    type Item = &'a CompilerError;
    type IntoIter = std::slice::Iter<'a, CompilerError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
