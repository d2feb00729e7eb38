pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid problem name '{0}': only ASCII letters, digits, '_' and '-' are allowed")]
    InvalidProblemName(String),

    #[error("No such problem: '{0}'")]
    NoSuchProblem(String),

    #[error("Problem '{0}' already exists")]
    ProblemAlreadyExists(String),

    #[error("No such testcase '{name}' in problem '{problem}'")]
    NoSuchTestcase { problem: String, name: String },

    #[error("No such template: '{0}'")]
    NoSuchTemplate(String),

    #[error(transparent)]
    Fs(#[from] fsutil::Error),
}
