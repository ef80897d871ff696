//! Artifact and inference error to HTTP error conversion.

use polarity_core::ErrorKind as CoreErrorKind;

use super::http_error::{Error as HttpError, ErrorKind};

impl From<polarity_core::Error> for HttpError {
    fn from(error: polarity_core::Error) -> Self {
        match error.kind() {
            CoreErrorKind::ArtifactUnavailable => {
                let http_error = ErrorKind::ServiceUnavailable
                    .with_message("The sentiment model is not available")
                    .with_context(error.to_string());

                match error.artifact() {
                    Some(artifact) => http_error.with_resource(artifact.as_ref().to_owned()),
                    None => http_error,
                }
            }
            _ => ErrorKind::InternalServerError
                .with_message("Prediction failed")
                .with_context(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use polarity_core::ArtifactKind;

    use super::*;

    #[test]
    fn unavailable_artifact_names_the_artifact() {
        let error = polarity_core::Error::artifact_unavailable(ArtifactKind::Model)
            .with_message("model could not be loaded: remote not found");

        let http_error = HttpError::from(error);
        assert_eq!(http_error.kind(), ErrorKind::ServiceUnavailable);
        assert_eq!(http_error.resource(), Some("model"));
        assert!(http_error.context().is_some_and(|c| c.contains("remote not found")));
    }

    #[test]
    fn other_errors_are_internal() {
        let error = polarity_core::Error::invalid_input().with_message("bad sequence");

        let http_error = HttpError::from(error);
        assert_eq!(http_error.kind(), ErrorKind::InternalServerError);
        assert_eq!(http_error.resource(), None);
    }
}
