use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

pub const UNPROCESSABLE_ENTITY: u16 = 422;
pub const GENERAL_FIELD: &str = "general";

/// Decides which failure statuses carry per-field validation errors in their body.
#[derive(Clone)]
pub enum StatusMatcher {
    Exact(u16),
    AnyOf(BTreeSet<u16>),
    Custom(Arc<dyn Fn(u16) -> bool + Send + Sync>),
}

impl StatusMatcher {
    pub fn custom(predicate: impl Fn(u16) -> bool + Send + Sync + 'static) -> Self {
        StatusMatcher::Custom(Arc::new(predicate))
    }

    pub fn matches(&self, status: u16) -> bool {
        match self {
            StatusMatcher::Exact(expected) => *expected == status,
            StatusMatcher::AnyOf(statuses) => statuses.contains(&status),
            StatusMatcher::Custom(predicate) => predicate(status),
        }
    }
}

impl Default for StatusMatcher {
    fn default() -> Self {
        StatusMatcher::Exact(UNPROCESSABLE_ENTITY)
    }
}

impl Debug for StatusMatcher {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusMatcher::Exact(status) => f.debug_tuple("Exact").field(status).finish(),
            StatusMatcher::AnyOf(statuses) => f.debug_tuple("AnyOf").field(statuses).finish(),
            StatusMatcher::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl<const N: usize> From<[u16; N]> for StatusMatcher {
    fn from(value: [u16; N]) -> Self {
        StatusMatcher::AnyOf(value.into_iter().collect())
    }
}

/// What happens when a submit starts while another one on the same form is in flight.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SubmitOverlap {
    /// Both requests run; whichever settles last decides the recorded errors.
    #[default]
    Allow,
    /// The new submit fails with `FormError::AlreadySubmitting` before any request is sent.
    Reject,
}

#[derive(Clone, Debug)]
pub struct FormOptions {
    pub validation_status: StatusMatcher,
    pub general_field: Cow<'static, str>,
    /// Key under which validation bodies nest their field map, e.g. `"errors"` for
    /// `{ "message": .., "errors": { .. } }`. `None` reads the body itself as the map.
    pub errors_key: Option<String>,
    pub overlap: SubmitOverlap,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            validation_status: StatusMatcher::default(),
            general_field: Cow::Borrowed(GENERAL_FIELD),
            errors_key: None,
            overlap: SubmitOverlap::Allow,
        }
    }
}

impl FormOptions {
    pub fn with_validation_status(mut self, matcher: impl Into<StatusMatcher>) -> Self {
        self.validation_status = matcher.into();
        self
    }

    pub fn with_general_field(mut self, field: impl Into<Cow<'static, str>>) -> Self {
        self.general_field = field.into();
        self
    }

    pub fn with_errors_key(mut self, key: impl Into<String>) -> Self {
        self.errors_key = Some(key.into());
        self
    }

    pub fn with_overlap(mut self, overlap: SubmitOverlap) -> Self {
        self.overlap = overlap;
        self
    }
}

impl From<u16> for StatusMatcher {
    fn from(value: u16) -> Self {
        StatusMatcher::Exact(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matcher_only_accepts_unprocessable_entity() {
        let options = FormOptions::default();
        assert!(options.validation_status.matches(422));
        assert!(!options.validation_status.matches(400));
        assert_eq!(options.general_field, "general");
        assert_eq!(options.overlap, SubmitOverlap::Allow);
    }

    #[test]
    fn matchers_can_be_widened() {
        let any_of = FormOptions::default().with_validation_status([400, 422]);
        assert!(any_of.validation_status.matches(400));
        assert!(!any_of.validation_status.matches(500));

        let custom = StatusMatcher::custom(|status| (400..500).contains(&status));
        assert!(custom.matches(409));
        assert_eq!(format!("{custom:?}"), "Custom(..)");
    }
}
