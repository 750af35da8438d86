//! Contains the error types for the CloudFormation layer.

#![allow(clippy::default_trait_access)]

use quick_xml::escape::unescape;
use quick_xml::events::Event;
use quick_xml::Reader;
use rusoto_cloudformation::{
    CreateStackError, DeleteStackError, DescribeStacksError, UpdateStackError,
};
use rusoto_core::RusotoError;
use snafu::Snafu;
use std::fmt::{self, Display, Formatter};

/// Alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

// CloudFormation answers an update whose template matches the deployed stack with this message.
const NO_UPDATES_MESSAGE: &str = "No updates are to be performed.";

/// The error type for the CloudFormation layer.
#[derive(Debug, Snafu)]
#[snafu(visibility = "pub(crate)")]
#[allow(missing_docs)]
pub enum Error {
    // A field we rely on was absent from a CloudFormation response
    #[snafu(display("Missing field in `{}` response: {}", api, field))]
    CfnMissingField {
        api: &'static str,
        field: &'static str,
    },

    // The application failed to create HttpClient
    #[snafu(display("Failed to create HTTP client: {}", source))]
    HttpClient {
        source: rusoto_core::request::TlsError,
    },

    // The application failed to parse region
    #[snafu(display("Failed to parse region `{}` : {}", name, source))]
    ParseRegion {
        name: String,
        source: rusoto_signature::region::ParseRegionError,
    },

    // The application failed to read the named profile
    #[snafu(display("Failed to create credentials provider for profile `{}`: {}", profile, source))]
    ProfileProvider {
        profile: String,
        source: rusoto_credential::CredentialsError,
    },

    // CloudFormation rejected a call
    #[snafu(display("`{}` failed in region {}: {}", api, region, source))]
    Provider {
        api: &'static str,
        region: String,
        source: ProviderFailure,
    },

    // A call was made for a region we never built a client for
    #[snafu(display("No CloudFormation client was built for region {}", region))]
    UnknownRegion { region: String },
}

impl Error {
    /// The provider response behind this error, if CloudFormation answered at all.
    pub fn provider_failure(&self) -> Option<&ProviderFailure> {
        match self {
            Error::Provider { source, .. } => Some(source),
            _ => None,
        }
    }

    /// True when CloudFormation reported that the update would not change anything.
    pub fn is_no_updates(&self) -> bool {
        self.provider_failure()
            .map_or(false, ProviderFailure::is_no_updates)
    }
}

/// A failed CloudFormation call reduced to what is worth showing to a user: the HTTP status (when
/// the response made it back), the service error code and its message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    pub http_status: Option<u16>,
    pub code: String,
    pub message: String,
}

impl ProviderFailure {
    pub fn new<C, M>(http_status: Option<u16>, code: C, message: M) -> Self
    where
        C: Into<String>,
        M: Into<String>,
    {
        Self {
            http_status,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn is_no_updates(&self) -> bool {
        self.message.trim() == NO_UPDATES_MESSAGE
    }

    /// `DescribeStacks` on a name or id CloudFormation no longer knows about.
    pub fn is_stack_not_found(&self) -> bool {
        self.code == "ValidationError" && self.message.contains("does not exist")
    }

    /// Flattens a rusoto error. Most CloudFormation failures, including `ValidationError`, are
    /// not modelled by rusoto and arrive as `Unknown` with the raw XML body.
    pub(crate) fn from_rusoto<E: ServiceError>(err: RusotoError<E>) -> Self {
        match err {
            RusotoError::Service(e) => Self::new(None, e.code(), e.to_string()),
            RusotoError::Unknown(response) => {
                Self::from_error_body(Some(response.status.as_u16()), response.body_as_str())
            }
            RusotoError::HttpDispatch(e) => Self::new(None, "HttpDispatch", e.to_string()),
            RusotoError::Credentials(e) => Self::new(None, "Credentials", e.to_string()),
            RusotoError::Validation(msg) => Self::new(None, "Validation", msg),
            RusotoError::ParseError(msg) => Self::new(None, "ParseError", msg),
            RusotoError::Blocking => Self::new(None, "Blocking", "Failed to run blocking future"),
        }
    }

    fn from_error_body(http_status: Option<u16>, body: &str) -> Self {
        let parsed = parse_error_body(body).unwrap_or_default();
        Self::new(
            http_status,
            parsed.code.unwrap_or_else(|| "Unknown".to_string()),
            parsed
                .message
                .map(|message| message.trim().to_string())
                .unwrap_or_else(|| body.trim().to_string()),
        )
    }
}

impl Display for ProviderFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.http_status {
            Some(status) => write!(f, "HTTP Code: {}, ", status)?,
            None => write!(f, "HTTP Code: n/a, ")?,
        }
        write!(f, "Error Code: {}, Error Message: {}", self.code, self.message)
    }
}

impl std::error::Error for ProviderFailure {}

/// The modelled errors of the CloudFormation calls we make, with their wire error codes.
pub(crate) trait ServiceError: std::error::Error + 'static {
    fn code(&self) -> &'static str;
}

impl ServiceError for CreateStackError {
    fn code(&self) -> &'static str {
        match self {
            CreateStackError::AlreadyExists(_) => "AlreadyExistsException",
            CreateStackError::InsufficientCapabilities(_) => "InsufficientCapabilitiesException",
            CreateStackError::LimitExceeded(_) => "LimitExceededException",
            CreateStackError::TokenAlreadyExists(_) => "TokenAlreadyExistsException",
        }
    }
}

impl ServiceError for UpdateStackError {
    fn code(&self) -> &'static str {
        match self {
            UpdateStackError::InsufficientCapabilities(_) => "InsufficientCapabilitiesException",
            UpdateStackError::TokenAlreadyExists(_) => "TokenAlreadyExistsException",
        }
    }
}

impl ServiceError for DeleteStackError {
    fn code(&self) -> &'static str {
        match self {
            DeleteStackError::TokenAlreadyExists(_) => "TokenAlreadyExistsException",
        }
    }
}

impl ServiceError for DescribeStacksError {
    fn code(&self) -> &'static str {
        match *self {}
    }
}

#[derive(Debug, Default)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

/// Reads `<Error><Code>` and `<Error><Message>` out of an AWS query-protocol error response.
/// Entity and character references are resolved and CDATA sections are taken verbatim. `None`
/// when the body is not well-formed XML.
fn parse_error_body(body: &str) -> Option<ErrorBody> {
    let mut reader = Reader::from_str(body);
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut parsed = ErrorBody::default();
    loop {
        let text = match reader.read_event().ok()? {
            Event::Start(e) => {
                path.push(e.local_name().as_ref().to_vec());
                continue;
            }
            Event::End(_) => {
                path.pop();
                continue;
            }
            Event::Text(e) => {
                let decoded = e.decode().ok()?;
                unescape(&decoded).ok()?.into_owned()
            }
            Event::GeneralRef(e) => {
                let name = String::from_utf8_lossy(&e);
                unescape(&format!("&{};", name)).ok()?.into_owned()
            }
            Event::CData(e) => String::from_utf8_lossy(&e).into_owned(),
            Event::Eof => break,
            _ => continue,
        };
        let field = match path.as_slice() {
            [.., parent, field] if parent.as_slice() == b"Error" => field.as_slice(),
            _ => continue,
        };
        let target = match field {
            b"Code" => &mut parsed.code,
            b"Message" => &mut parsed.message,
            _ => continue,
        };
        target.get_or_insert_with(String::new).push_str(&text);
    }
    Some(parsed)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn no_updates_is_recognised_from_validation_error_body() {
        let body = r#"<ErrorResponse xmlns="http://cloudformation.amazonaws.com/doc/2010-05-15/">
  <Error>
    <Type>Sender</Type>
    <Code>ValidationError</Code>
    <Message>No updates are to be performed.</Message>
  </Error>
  <RequestId>5ccc7dcd-744c-11e5-be70-1b08c228efb3</RequestId>
</ErrorResponse>"#;
        let failure = ProviderFailure::from_error_body(Some(400), body);
        assert_eq!(failure.http_status, Some(400));
        assert_eq!(failure.code, "ValidationError");
        assert!(failure.is_no_updates());
        assert!(!failure.is_stack_not_found());
    }

    #[test]
    fn no_updates_in_cdata_is_recognised() {
        let body = "<ErrorResponse><Error><Code>ValidationError</Code>\
            <Message><![CDATA[No updates are to be performed.]]></Message></Error></ErrorResponse>";
        let failure = ProviderFailure::from_error_body(Some(400), body);
        assert_eq!(failure.code, "ValidationError");
        assert!(failure.is_no_updates());
    }

    #[test]
    fn missing_stack_is_recognised() {
        let body = "<ErrorResponse><Error><Code>ValidationError</Code>\
            <Message>Stack with id s3-us-east-1 does not exist</Message></Error></ErrorResponse>";
        let failure = ProviderFailure::from_error_body(Some(400), body);
        assert!(failure.is_stack_not_found());
        assert!(!failure.is_no_updates());
    }

    #[test]
    fn references_in_messages_are_resolved() {
        let body = "<ErrorResponse><Error><Code>ValidationError</Code>\
            <Message>Template error: resource &#39;Bucket&#39; &amp; &apos;Policy&apos; invalid</Message>\
            </Error></ErrorResponse>";
        let failure = ProviderFailure::from_error_body(Some(400), body);
        assert_eq!(
            failure.message,
            "Template error: resource 'Bucket' & 'Policy' invalid"
        );
    }

    #[test]
    fn code_outside_error_element_is_ignored() {
        let body = "<ErrorResponse><Code>Wrong</Code><Error><Code>Throttling</Code>\
            <Message>Rate exceeded</Message></Error></ErrorResponse>";
        let failure = ProviderFailure::from_error_body(Some(400), body);
        assert_eq!(failure.code, "Throttling");
        assert_eq!(failure.message, "Rate exceeded");
    }

    #[test]
    fn body_without_error_element_is_kept_as_message() {
        let failure = ProviderFailure::from_error_body(Some(502), " Bad Gateway ");
        assert_eq!(failure.code, "Unknown");
        assert_eq!(failure.message, "Bad Gateway");
    }

    #[test]
    fn modelled_service_errors_use_wire_codes() {
        let err: RusotoError<CreateStackError> = RusotoError::Service(
            CreateStackError::AlreadyExists("Stack [s3-us-east-1] already exists".into()),
        );
        let failure = ProviderFailure::from_rusoto(err);
        assert_eq!(failure.code, "AlreadyExistsException");
        assert_eq!(failure.http_status, None);
        assert!(failure.message.contains("already exists"));

        let err: RusotoError<UpdateStackError> = RusotoError::Service(
            UpdateStackError::InsufficientCapabilities("Requires capabilities".into()),
        );
        assert_eq!(
            ProviderFailure::from_rusoto(err).code,
            "InsufficientCapabilitiesException"
        );
    }

    #[test]
    fn display_includes_codes() {
        let failure = ProviderFailure::new(Some(403), "AccessDenied", "not authorized");
        assert_eq!(
            failure.to_string(),
            "HTTP Code: 403, Error Code: AccessDenied, Error Message: not authorized"
        );
        let failure = ProviderFailure::new(None, "HttpDispatch", "timed out");
        assert!(failure.to_string().starts_with("HTTP Code: n/a"));
    }

    #[test]
    fn no_updates_error_is_detected_through_provider_variant() {
        let err = Error::Provider {
            api: "update_stack",
            region: "us-east-1".to_string(),
            source: ProviderFailure::new(Some(400), "ValidationError", NO_UPDATES_MESSAGE),
        };
        assert!(err.is_no_updates());
        let err = Error::UnknownRegion {
            region: "us-east-1".to_string(),
        };
        assert!(!err.is_no_updates());
    }
}
