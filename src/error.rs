/// Errors raised by data store and auth operations. The messages are the
/// ones shown to the user.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("User must be logged in")]
    NotLoggedIn,

    #[error("You have already applied to this job")]
    AlreadyApplied,

    #[error("Job {0} not found")]
    JobNotFound(String),

    #[error("Application {0} not found")]
    ApplicationNotFound(String),

    #[error("User {0} not found")]
    UserNotFound(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account with this email already exists")]
    EmailTaken,

    #[error("{0}")]
    Forbidden(String),
}
