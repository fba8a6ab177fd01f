//! Classified failures surfaced by the service layer, with their HTTP
//! translation in one place.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The referenced username has no dashboard.
    #[error("dashboard not found")]
    DashboardNotFound,

    /// The referenced expense id does not exist on the dashboard.
    #[error("expense not found")]
    ExpenseNotFound,

    /// A payer or sharer is not a registered member of the dashboard.
    #[error("group member '{0}' is not part of the dashboard")]
    GroupMemberNotFound(String),

    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("group member '{0}' is already on the dashboard")]
    DuplicateGroupMember(String),

    /// Removing a member who is still referenced by an expense is never
    /// attempted partially; the whole operation is rejected.
    #[error("cannot remove '{0}': member is tied to existing expenses")]
    MemberHasExpenses(String),

    /// Rejected before any balance is touched.
    #[error("invalid expense details: {0}")]
    InvalidExpense(&'static str),

    #[error(transparent)]
    Database(#[from] mongodb::error::Error),
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::DashboardNotFound | Error::ExpenseNotFound | Error::GroupMemberNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Error::UsernameTaken(_)
            | Error::DuplicateGroupMember(_)
            | Error::MemberHasExpenses(_) => StatusCode::CONFLICT,
            Error::InvalidExpense(_) => StatusCode::BAD_REQUEST,
            Error::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let Error::Database(err) = self {
            tracing::error!("database error: {}", err);
        }
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
