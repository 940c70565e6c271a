//! Conversions from external infrastructure errors into domain errors.

use homedash_domain::HomedashError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can
/// be converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub HomedashError);

impl From<InfraError> for HomedashError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<HomedashError> for InfraError {
    fn from(value: HomedashError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and
/// within this module.
trait IntoHomedashError {
    fn into_homedash(self) -> HomedashError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → HomedashError */
/* -------------------------------------------------------------------------- */

impl IntoHomedashError for SqlError {
    fn into_homedash(self) -> HomedashError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        HomedashError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        HomedashError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067) => {
                        HomedashError::Conflict("unique constraint violation".into())
                    }
                    (ErrorCode::ConstraintViolation, 1555) => {
                        HomedashError::Conflict("primary key already exists".into())
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        HomedashError::Database("foreign key constraint violation".into())
                    }
                    _ => HomedashError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => HomedashError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                HomedashError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                HomedashError::Database(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => {
                HomedashError::Database("invalid UTF-8 returned from sqlite".into())
            }
            RE::InvalidQuery => HomedashError::Database("invalid SQL query".into()),
            other => HomedashError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_homedash())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → HomedashError */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(HomedashError::Database(format!("connection pool error: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → HomedashError */
/* -------------------------------------------------------------------------- */

impl IntoHomedashError for HttpError {
    fn into_homedash(self) -> HomedashError {
        if self.is_timeout() {
            return HomedashError::RemoteUnavailable("HTTP request timed out".into());
        }

        if self.is_connect() {
            return HomedashError::RemoteUnavailable("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => HomedashError::SessionExpired,
                404 => HomedashError::NotFound(message),
                409 => HomedashError::Conflict(message),
                _ => HomedashError::RemoteUnavailable(message),
            };
        }

        HomedashError::RemoteUnavailable(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_homedash())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
