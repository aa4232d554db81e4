//! Error types surfaced by the notifications bridge.
//!
//! This module defines:
//!
//! - [`FailureKind`] — the closed failure taxonomy every error maps into.
//! - [`NotificationsError`] — the single typed failure returned by every public operation.
//! - [`DispatchError`] — failures of the dispatch primitive itself (never surfaced to callers).
//!
//! Both error types provide `as_label` for logs, and [`FailureKind`] round-trips
//! the `ERR_*` wire codes used by native replies.

use thiserror::Error;

/// Result of a single native call once normalized.
pub type CanonicalResult<T> = Result<T, NotificationsError>;

/// # Closed set of failure kinds.
///
/// Native replies carry free-form codes; anything outside this set is
/// reported as [`FailureKind::NativeFailure`] with the original code kept in
/// [`NotificationsError::native_kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Native module or one of its methods could not be found.
    NotificationsUnavailable,
    /// The user (or platform) refused notification permissions.
    PermissionDenied,
    /// The push provider is not configured on the host.
    ProviderUnconfigured,
    /// Caller-supplied input failed validation before reaching native.
    InvalidArgument,
    /// Malformed reply, or a native error with an untranslated code.
    NativeFailure,
}

impl FailureKind {
    const ALL: [FailureKind; 5] = [
        FailureKind::NotificationsUnavailable,
        FailureKind::PermissionDenied,
        FailureKind::ProviderUnconfigured,
        FailureKind::InvalidArgument,
        FailureKind::NativeFailure,
    ];

    /// Returns the wire code used by native replies.
    ///
    /// # Example
    /// ```
    /// use notibridge::FailureKind;
    ///
    /// assert_eq!(FailureKind::PermissionDenied.code(), "ERR_PERMISSION_DENIED");
    /// ```
    pub fn code(&self) -> &'static str {
        match self {
            FailureKind::NotificationsUnavailable => "ERR_NOTIFICATIONS_UNAVAILABLE",
            FailureKind::PermissionDenied => "ERR_PERMISSION_DENIED",
            FailureKind::ProviderUnconfigured => "ERR_PROVIDER_UNCONFIGURED",
            FailureKind::InvalidArgument => "ERR_INVALID_ARGUMENT",
            FailureKind::NativeFailure => "ERR_NATIVE_FAILURE",
        }
    }

    /// Maps a native code into the closed set, if it belongs to it.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            FailureKind::NotificationsUnavailable => "notifications_unavailable",
            FailureKind::PermissionDenied => "permission_denied",
            FailureKind::ProviderUnconfigured => "provider_unconfigured",
            FailureKind::InvalidArgument => "invalid_argument",
            FailureKind::NativeFailure => "native_failure",
        }
    }
}

/// # Typed failure returned by every bridge operation.
///
/// Carries the mapped [`FailureKind`], a human-readable message, and the
/// untranslated native code when the failure came from a native reply.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}: {message}", .kind.code())]
pub struct NotificationsError {
    /// Mapped failure kind.
    pub kind: FailureKind,
    /// Human-readable description.
    pub message: String,
    /// Original native code, preserved for diagnostics.
    pub native_kind: Option<String>,
}

impl NotificationsError {
    /// Creates an error of the given kind without a native code.
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            native_kind: None,
        }
    }

    /// Builds an error from a native `{code, message}` payload.
    ///
    /// Unknown codes fall back to [`FailureKind::NativeFailure`]; the raw code is always kept.
    ///
    /// # Example
    /// ```
    /// use notibridge::{FailureKind, NotificationsError};
    ///
    /// let err = NotificationsError::from_native(Some("E_TIMEOUT"), "took too long");
    /// assert_eq!(err.kind, FailureKind::NativeFailure);
    /// assert_eq!(err.native_kind.as_deref(), Some("E_TIMEOUT"));
    /// ```
    pub fn from_native(code: Option<&str>, message: impl Into<String>) -> Self {
        let kind = code
            .and_then(FailureKind::from_code)
            .unwrap_or(FailureKind::NativeFailure);
        Self {
            kind,
            message: message.into(),
            native_kind: code.map(str::to_owned),
        }
    }

    pub(crate) fn unavailable(message: impl Into<String>) -> Self {
        Self::new(FailureKind::NotificationsUnavailable, message)
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(FailureKind::InvalidArgument, message)
    }

    pub(crate) fn native(message: impl Into<String>) -> Self {
        Self::new(FailureKind::NativeFailure, message)
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        self.kind.as_label()
    }
}

/// # Errors produced by the dispatch primitive.
///
/// These never reach callers: the dispatch shim falls back to running the
/// task directly whenever one of these is observed.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The background context refused the job.
    #[error("background context rejected the job: {reason}")]
    Rejected {
        /// Why the context refused it.
        reason: String,
    },

    /// The job was accepted but dropped before it reported a result.
    #[error("background job dropped before completion")]
    Dropped,
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::Rejected { .. } => "dispatch_rejected",
            DispatchError::Dropped => "dispatch_dropped",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_round_trip() {
        for kind in FailureKind::ALL {
            assert_eq!(FailureKind::from_code(kind.code()), Some(kind));
        }
    }

    #[test]
    fn unknown_native_code_maps_to_native_failure() {
        let err = NotificationsError::from_native(Some("SOMETHING_ELSE"), "boom");
        assert_eq!(err.kind, FailureKind::NativeFailure);
        assert_eq!(err.native_kind.as_deref(), Some("SOMETHING_ELSE"));
        assert_eq!(err.to_string(), "ERR_NATIVE_FAILURE: boom");
    }

    #[test]
    fn recognized_native_code_keeps_native_kind() {
        let err = NotificationsError::from_native(Some("ERR_PROVIDER_UNCONFIGURED"), "no fcm");
        assert_eq!(err.kind, FailureKind::ProviderUnconfigured);
        assert_eq!(err.native_kind.as_deref(), Some("ERR_PROVIDER_UNCONFIGURED"));
        assert_eq!(err.as_label(), "provider_unconfigured");
    }
}
