use async_graphql::{Error, ErrorExtensions, ServerError, Value};

use crate::services::ServiceError;

pub const FORBIDDEN: &str = "FORBIDDEN";
pub const UNAVAILABLE: &str = "UNAVAILABLE";

impl ErrorExtensions for ServiceError {
    fn extend(&self) -> Error {
        Error::new(self.to_string()).extend_with(|_, e| e.set("code", self.code()))
    }
}

/// Field error for callers lacking the admin role
pub fn forbidden() -> Error {
    Error::new("you cannot access this resource").extend_with(|_, e| e.set("code", FORBIDDEN))
}

/// The `extensions.code` of an execution error, if any
pub fn error_code(error: &ServerError) -> Option<&str> {
    match error.extensions.as_ref()?.get("code")? {
        Value::String(code) => Some(code.as_str()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::StoreError;
    use async_graphql::Pos;

    #[test]
    fn service_error_carries_code() {
        let err = ServiceError::Store(StoreError::NotFound("gone".into())).extend();
        let server = err.into_server_error(Pos { line: 1, column: 1 });
        assert_eq!(error_code(&server), Some("NOT_FOUND"));
        assert_eq!(server.message, "could not find product: gone");
    }

    #[test]
    fn forbidden_carries_code() {
        let server = forbidden().into_server_error(Pos { line: 1, column: 1 });
        assert_eq!(error_code(&server), Some(FORBIDDEN));
    }

    #[test]
    fn plain_error_has_no_code() {
        let server = ServerError::new("syntax", None);
        assert_eq!(error_code(&server), None);
    }
}
