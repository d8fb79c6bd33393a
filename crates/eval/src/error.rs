use willsuite_interchange::SchemaError;

/// Errors raised by the evaluator's fallible entry points.
///
/// Condition evaluation and interpolation never fail; these errors cover
/// malformed inputs and the person-record lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("answers must be a JSON object, got {kind}")]
    AnswersNotAnObject { kind: String },

    #[error("'{key}' does not hold a list of person records")]
    NotAPersonList { key: String },

    #[error("person record must be a JSON object")]
    PersonNotAnObject,

    #[error("person '{id}' not found in '{key}'")]
    PersonNotFound { key: String, id: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}
