//! Human-readable descriptions of MongoDB driver errors.
//!
//! Read-side failures (count, find, find_one) are reported through
//! [`ExportError::FetchFailed`](super::ExportError::FetchFailed) and
//! [`LookupError::Backend`](super::LookupError::Backend) as plain strings, so
//! the structured driver error is flattened here once.

use mongodb::error::ErrorKind;

/// Describe a driver error using its typed kind where possible.
pub fn describe_mongodb_error(error: &mongodb::error::Error) -> String {
    match error.kind.as_ref() {
        ErrorKind::Command(command_error) => match error_name(command_error.code) {
            Some(name) => format!(
                "{name} ({}): {}",
                command_error.code, command_error.message
            ),
            None => format!(
                "command error {}: {}",
                command_error.code, command_error.message
            ),
        },
        ErrorKind::Authentication { message, .. } => format!("authentication failed: {message}"),
        ErrorKind::InvalidArgument { message, .. } => format!("invalid argument: {message}"),
        ErrorKind::ServerSelection { message, .. } => {
            format!("server selection failed: {message}")
        }
        _ => error.to_string(),
    }
}

/// Get a human-readable error name from a MongoDB error code.
fn error_name(code: i32) -> Option<&'static str> {
    let name = match code {
        2 => "BadValue",
        13 => "Unauthorized",
        18 => "AuthenticationFailed",
        26 => "NamespaceNotFound",
        50 => "MaxTimeMSExpired",
        96 => "OperationFailed",
        _ => return None,
    };

    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_name_known_codes() {
        assert_eq!(error_name(13), Some("Unauthorized"));
        assert_eq!(error_name(50), Some("MaxTimeMSExpired"));
        assert_eq!(error_name(12345), None);
    }
}
