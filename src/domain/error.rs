//! Domain error types.

/// A lexing or parsing error with position information for the rule DSL.
#[derive(Debug, Clone, thiserror::Error)]
#[error("syntax error at position {position}: {message}")]
pub struct SyntaxError {
    pub message: String,
    pub position: usize,
}

impl SyntaxError {
    /// Format the error with a caret pointing at the error position in the input.
    pub fn display_with_context(&self, input: &str) -> String {
        let caret = " ".repeat(self.position) + "^";
        format!(
            "{input}\n{caret}\n{err}",
            input = input,
            caret = caret,
            err = self
        )
    }
}

/// Strategy validation errors, raised when a parsed rule tree is checked
/// against the indicator registry. Always caller-correctable DSL mistakes.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BuildError {
    #[error("unknown indicator '{name}'")]
    UnknownIndicator { name: String },

    #[error("indicator '{name}' takes {expected} argument(s), found {found}")]
    Arity {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("type mismatch in {context}: expected {expected}, found {found}")]
    TypeMismatch {
        context: String,
        expected: &'static str,
        found: String,
    },
}

/// Evaluation-time errors. Warm-up gaps are not errors (they yield `false`
/// signals); the only failure left is a column the price table never had.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EvalError {
    #[error("unknown column '{name}'")]
    UnknownColumn { name: String },
}

/// Top-level error type for rulebench.
#[derive(Debug, thiserror::Error)]
pub enum RulebenchError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("invalid price table: {reason}")]
    PriceTable { reason: String },

    #[error("cannot render rules: {reason}")]
    Render { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&RulebenchError> for std::process::ExitCode {
    fn from(err: &RulebenchError) -> Self {
        let code: u8 = match err {
            RulebenchError::Io(_) => 1,
            RulebenchError::ConfigParse { .. } | RulebenchError::ConfigInvalid { .. } => 2,
            RulebenchError::Data { .. } | RulebenchError::PriceTable { .. } => 3,
            RulebenchError::Syntax(_)
            | RulebenchError::Build(_)
            | RulebenchError::Render { .. } => 4,
            RulebenchError::Eval(_) => 5,
        };
        std::process::ExitCode::from(code)
    }
}
