use std::fmt::Debug;

/// Error-code enumerations carried by a failed [`OpResult`].
///
/// `name` is the member identifier and doubles as the problem-details title at
/// the HTTP boundary; `description` is the human readable text attached to the
/// member.
pub trait ErrorCode: Copy + Eq + Debug + Send + Sync + 'static {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
}

/// Implements [`ErrorCode`] for enums deriving strum's `IntoStaticStr` and `EnumMessage`.
macro_rules! impl_error_code {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::result::ErrorCode for $ty {
            fn name(&self) -> &'static str {
                (*self).into()
            }

            fn description(&self) -> &'static str {
                ::strum::EnumMessage::get_message(self).unwrap_or_default()
            }
        }
    )+};
}
pub(crate) use impl_error_code;

/// Success indicator consulted by the caching behavior.
///
/// Responses that do not override `succeeded` report no indicator and are
/// never cached.
pub trait Outcome {
    fn succeeded(&self) -> Option<bool> {
        None
    }
}

/// Outcome of an operation whose expected failures are data, not errors.
///
/// Exactly one variant holds at any time, so a success can never carry an
/// error code and a failure can never carry a value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OpResult<T, C: ErrorCode> {
    Success(T),
    Failure { code: C, description: String },
}

impl<T, C: ErrorCode> OpResult<T, C> {
    pub fn success(value: T) -> Self {
        OpResult::Success(value)
    }

    pub fn failure(code: C, description: impl Into<String>) -> Self {
        OpResult::Failure {
            code,
            description: description.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, OpResult::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// True only for a failure carrying exactly `code`.
    pub fn failed_with(&self, code: C) -> bool {
        match self {
            OpResult::Failure { code: actual, .. } => *actual == code,
            OpResult::Success(_) => false,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            OpResult::Success(value) => Some(value),
            OpResult::Failure { .. } => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            OpResult::Success(value) => Some(value),
            OpResult::Failure { .. } => None,
        }
    }

    pub fn error_code(&self) -> Option<C> {
        match self {
            OpResult::Failure { code, .. } => Some(*code),
            OpResult::Success(_) => None,
        }
    }

    pub fn error_description(&self) -> Option<&str> {
        match self {
            OpResult::Failure { description, .. } => Some(description),
            OpResult::Success(_) => None,
        }
    }

    pub fn map<U, F>(self, f: F) -> OpResult<U, C>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            OpResult::Success(value) => OpResult::Success(f(value)),
            OpResult::Failure { code, description } => OpResult::Failure { code, description },
        }
    }

    pub fn into_std(self) -> Result<T, (C, String)> {
        match self {
            OpResult::Success(value) => Ok(value),
            OpResult::Failure { code, description } => Err((code, description)),
        }
    }
}

impl<T, C: ErrorCode> Outcome for OpResult<T, C> {
    fn succeeded(&self) -> Option<bool> {
        Some(self.is_success())
    }
}
