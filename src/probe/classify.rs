use super::{Failure, Phase, outcome::{Category, Classification}};
use crate::{config::DatabaseKind, descriptor::ConnectionDescriptor};

/// Recognises one failure shape, `None` hands the failure to the next rule
type Rule = fn(&Failure, &ConnectionDescriptor) -> Option<Classification>;

/// Checked in order, first match wins. Anything left over is `Unknown`.
const RULES: [Rule; 4] = [driver_missing, invalid_descriptor, connection_failed, query_failed];

const DESCRIPTOR_HINT: &str = "Check DB_HOST/DB_PORT/DB_NAME/DB_USER formatting.";
const CONNECTION_HINT: &str = "Verify the database is running, network access, credentials, and that the driver is installed.";
const DRIVER_HINT: &str = "Install a dbprobe build with the postgres and mysql features enabled.";

/// Turn a probe failure into a taxonomy entry
#[must_use]
pub fn classify(failure: &Failure, descriptor: &ConnectionDescriptor) -> Classification {
    RULES
        .iter()
        .find_map(|rule| rule(failure, descriptor))
        .unwrap_or_else(|| unknown(failure))
}

const fn feature_for(kind: DatabaseKind) -> &'static str {
    match kind {
        DatabaseKind::Postgres => "postgres",
        DatabaseKind::Mysql => "mysql",
    }
}

const fn client_for(kind: DatabaseKind) -> &'static str {
    match kind {
        DatabaseKind::Postgres => "PostgreSQL",
        DatabaseKind::Mysql => "MySQL",
    }
}

fn vendor_code(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => {
            sqlx::error::DatabaseError::code(&**db_err).map(std::borrow::Cow::into_owned)
        }
        _ => None,
    }
}

/// Errors raised by the driver machinery itself rather than the server
const fn is_driver_fault(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::AnyDriverError(_) | sqlx::Error::WorkerCrashed
    )
}

const fn is_transport(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::Database(_)
            | sqlx::Error::PoolTimedOut
    )
}

fn error_name(err: &sqlx::Error) -> &'static str {
    match err {
        sqlx::Error::Configuration(_) => "Configuration",
        sqlx::Error::InvalidArgument(_) => "InvalidArgument",
        sqlx::Error::Database(_) => "Database",
        sqlx::Error::Io(_) => "Io",
        sqlx::Error::Tls(_) => "Tls",
        sqlx::Error::Protocol(_) => "Protocol",
        sqlx::Error::RowNotFound => "RowNotFound",
        sqlx::Error::TypeNotFound { .. } => "TypeNotFound",
        sqlx::Error::ColumnIndexOutOfBounds { .. } => "ColumnIndexOutOfBounds",
        sqlx::Error::ColumnNotFound(_) => "ColumnNotFound",
        sqlx::Error::ColumnDecode { .. } => "ColumnDecode",
        sqlx::Error::Encode(_) => "Encode",
        sqlx::Error::Decode(_) => "Decode",
        sqlx::Error::AnyDriverError(_) => "AnyDriverError",
        sqlx::Error::PoolTimedOut => "PoolTimedOut",
        sqlx::Error::PoolClosed => "PoolClosed",
        sqlx::Error::WorkerCrashed => "WorkerCrashed",
        _ => "Error",
    }
}

fn driver_missing(failure: &Failure, descriptor: &ConnectionDescriptor) -> Option<Classification> {
    let Failure::DriverUnavailable = failure else {
        return None;
    };

    let feature = feature_for(descriptor.kind);
    Some(Classification {
        category: Category::DriverMissing,
        message: format!(
            "Database driver {} not found for {}. Install the {} client by building dbprobe with the `{feature}` feature.",
            descriptor.driver,
            descriptor.redacted_url(),
            client_for(descriptor.kind),
        ),
        hint: Some(format!("cargo install dbprobe --features {feature}")),
        code: None,
    })
}

fn invalid_descriptor(failure: &Failure, _: &ConnectionDescriptor) -> Option<Classification> {
    let message = match failure {
        Failure::InvalidTarget(reason) => reason.clone(),
        Failure::Connect(
            err @ (sqlx::Error::Configuration(_) | sqlx::Error::InvalidArgument(_)),
        ) => err.to_string(),
        _ => return None,
    };

    Some(Classification {
        category: Category::InvalidDescriptor,
        message,
        hint: Some(DESCRIPTOR_HINT.to_string()),
        code: None,
    })
}

fn connection_failed(failure: &Failure, _: &ConnectionDescriptor) -> Option<Classification> {
    let (message, code) = match failure {
        Failure::Connect(err) if is_transport(err) => (err.to_string(), vendor_code(err)),
        Failure::Timeout {
            phase: Phase::Connect,
            after,
        } => (
            format!("connection attempt timed out after {}s", after.as_secs()),
            None,
        ),
        _ => return None,
    };

    Some(Classification {
        category: Category::ConnectionFailed,
        message,
        hint: Some(CONNECTION_HINT.to_string()),
        code,
    })
}

fn query_failed(failure: &Failure, _: &ConnectionDescriptor) -> Option<Classification> {
    let (message, code) = match failure {
        Failure::Query(err) if !is_driver_fault(err) => (err.to_string(), vendor_code(err)),
        Failure::Timeout {
            phase: Phase::Query,
            after,
        } => (
            format!("SELECT 1 did not complete within {}s", after.as_secs()),
            None,
        ),
        _ => return None,
    };

    Some(Classification {
        category: Category::QueryFailed,
        message,
        hint: None,
        code,
    })
}

fn unknown(failure: &Failure) -> Classification {
    let (message, hint) = match failure {
        Failure::Connect(err) | Failure::Query(err) => (
            format!("{}: {err}", error_name(err)),
            is_driver_fault(err).then(|| DRIVER_HINT.to_string()),
        ),
        Failure::Panicked(reason) => (
            format!("Panic: {reason}"),
            Some(DRIVER_HINT.to_string()),
        ),
        other => (format!("{other:?}"), None),
    };

    Classification {
        category: Category::Unknown,
        message,
        hint,
        code: None,
    }
}
