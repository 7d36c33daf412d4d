//! Pipe configuration
//!
//! Options accepted by [`Pipe`](super::Pipe) and
//! [`PipeFactory`](super::PipeFactory). Validated at construction time so
//! a misconfigured pipe fails before it ever sees a request.

use thiserror::Error;

use crate::group::ValidationGroup;

/// Behavioral options for a pipe instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipeOptions {
    /// Validation group used for configured-type and metatype validation.
    /// Request-bound pipes infer the group from the request method instead.
    pub group: Option<ValidationGroup>,
    /// Surface failures as structured validation errors instead of a plain
    /// bad-request message.
    pub use_validation_error: bool,
    /// Report only the raw failure reasons, without the request framing.
    /// Requires `use_validation_error`.
    pub skip_error_formatting: bool,
}

impl PipeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group(mut self, group: ValidationGroup) -> Self {
        self.group = Some(group);
        self
    }

    pub fn use_validation_error(mut self, enabled: bool) -> Self {
        self.use_validation_error = enabled;
        self
    }

    pub fn skip_error_formatting(mut self, enabled: bool) -> Self {
        self.skip_error_formatting = enabled;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), PipeConfigError> {
        if let Some(ValidationGroup::Named(name)) = &self.group {
            if name.is_empty() {
                return Err(PipeConfigError::EmptyGroupName);
            }
        }
        if self.skip_error_formatting && !self.use_validation_error {
            return Err(PipeConfigError::UnformattedWithoutValidationError);
        }
        Ok(())
    }
}

/// Rejected pipe configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipeConfigError {
    #[error("Invalid pipe options: custom group name must not be empty")]
    EmptyGroupName,

    #[error("Invalid pipe options: skip_error_formatting requires use_validation_error")]
    UnformattedWithoutValidationError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_are_valid() {
        assert!(PipeOptions::new().validate().is_ok());
    }

    #[test]
    fn test_empty_group_name_rejected() {
        let options = PipeOptions::new().group(ValidationGroup::named(""));
        assert_eq!(options.validate(), Err(PipeConfigError::EmptyGroupName));
    }

    #[test]
    fn test_skip_formatting_requires_validation_error() {
        let options = PipeOptions::new().skip_error_formatting(true);
        assert_eq!(
            options.validate(),
            Err(PipeConfigError::UnformattedWithoutValidationError)
        );
        let options = PipeOptions::new()
            .use_validation_error(true)
            .skip_error_formatting(true);
        assert!(options.validate().is_ok());
    }
}
