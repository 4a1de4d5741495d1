//! Error types.
//!
//! Errors are split by when they are detected:
//!
//! - [`ConfigError`]: malformed component or route declarations, raised eagerly
//!   when a type or a set of routes is registered.
//! - [`RouteError`]: route tree traversal failures.
//! - [`HistoryError`]: history bounds and resize failures. The router treats
//!   the bounds variants as "nothing to do".
//! - [`Error`]: everything surfaced by navigation and lifecycle calls.

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

// ---------------------------------------------------------------------------
// RouteError
// ---------------------------------------------------------------------------

/// Route tree traversal failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// A `..` segment tried to leave the root while inserting.
    #[error("cannot navigate above the root node while inserting '{path}'")]
    AboveRoot { path: String },
}

// ---------------------------------------------------------------------------
// HistoryError
// ---------------------------------------------------------------------------

/// History queue failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
    /// `back()` at the first entry.
    #[error("no previous history entry")]
    NoPrevious,
    /// `forward()` at the last entry.
    #[error("no next history entry")]
    NoNext,
    /// `current()` on an empty queue.
    #[error("history is empty")]
    Empty,
    /// A capacity below one was requested.
    #[error("history size must be at least 1, got {size}")]
    InvalidSize { size: usize },
    /// Shrinking would drop the current entry.
    #[error("cannot shrink history to {size}: current entry {current} is outside the last {size} of {len} entries")]
    ShrinkRejected {
        size: usize,
        current: usize,
        len: usize,
    },
}

impl HistoryError {
    /// Whether this is a bounds error from `back()`/`forward()`.
    pub fn is_bounds(&self) -> bool {
        matches!(self, Self::NoPrevious | Self::NoNext)
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Malformed declarations, detected at registration time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("duplicate route '{path}': already bound to {existing}, cannot bind {new}")]
    DuplicateRoute {
        path: String,
        existing: String,
        new: String,
    },
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error("routes of {owner} are already registered on this router")]
    RoutesAlreadyRegistered { owner: String },
    #[error("member '{member}' of {owner} is declared both as a single parameter and as a parameter map")]
    ConflictingParamTags { member: String, owner: String },
    #[error("method '{member}' of {owner} takes {arity} parameters but names {names}")]
    ParamsArity {
        member: String,
        owner: String,
        names: usize,
        arity: usize,
    },
    #[error("{phase} hook '{hook}' of {owner} is declared more than once")]
    DuplicateHook {
        hook: String,
        phase: &'static str,
        owner: String,
    },
    #[error("{owner} declares more than one resource bundle")]
    DuplicateResource { owner: String },
    #[error("view method '{method}' is not declared on {owner}")]
    MissingViewMethod { method: String, owner: String },
    #[error("{owner} is a component and cannot use a method as its view")]
    MethodViewOnComponent { owner: String },
    #[error("{owner} declares more than one sub-component provider for {type_name}")]
    DuplicateSubComponentProvider { type_name: String, owner: String },
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors surfaced by navigation and lifecycle calls.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("route '{path}' does not exist{suffix}", suffix = hint_suffix(.hint))]
    RouteNotFound { path: String, hint: Option<String> },
    #[error("provider for '{path}' declares {declared} but produced {produced}")]
    ProviderMismatch {
        path: String,
        declared: String,
        produced: String,
    },
    #[error("parameter '{param}' of '{member}' in {owner}: expected {expected}, got {actual}")]
    ParamTypeMismatch {
        param: String,
        member: String,
        owner: String,
        expected: String,
        actual: String,
    },
    #[error("{owner} has no more sub-components of type {type_name} to provide")]
    SubComponentExhausted { type_name: String, owner: String },
    #[error("{owner} has no sub-component or provider of type {type_name}")]
    NoSubComponent { type_name: String, owner: String },
    #[error("sub-component provider of {owner} for {declared} produced {produced}")]
    SubComponentMismatch {
        declared: String,
        produced: String,
        owner: String,
    },
    #[error("title '{title}' of {owner} needs a resource bundle but none is available")]
    MissingResourceBundle { title: String, owner: String },
    #[error("resource key '{key}' for the title of {owner} is missing")]
    MissingResourceKey { key: String, owner: String },
    #[error("no template loader is installed to load '{template}' for {owner}")]
    NoTemplateLoader { template: String, owner: String },
    #[error("failed to load template '{template}' for {owner}: {message}")]
    Template {
        template: String,
        owner: String,
        message: String,
    },
    #[error("item {item} is already in the for-each list of {owner}")]
    DuplicateItem { item: String, owner: String },
    #[error("{owner} is already borrowed by a running lifecycle call")]
    InstanceBusy { owner: String },
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error("nothing is displayed")]
    NothingDisplayed,
}

impl From<RouteError> for Error {
    fn from(err: RouteError) -> Self {
        Self::Config(ConfigError::Route(err))
    }
}

fn hint_suffix(hint: &Option<String>) -> String {
    match hint {
        Some(path) => format!(" (did you mean '{path}'?)"),
        None => String::new(),
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ── Messages ─────────────────────────────────────────────────────

    #[test]
    fn route_not_found_with_hint() {
        let err = Error::RouteNotFound {
            path: "settings".into(),
            hint: Some("/settings".into()),
        };
        insta::assert_snapshot!(err.to_string(), @"route 'settings' does not exist (did you mean '/settings'?)");
    }

    #[test]
    fn route_not_found_without_hint() {
        let err = Error::RouteNotFound {
            path: "/nowhere".into(),
            hint: None,
        };
        insta::assert_snapshot!(err.to_string(), @"route '/nowhere' does not exist");
    }

    #[test]
    fn type_mismatch_names_everything() {
        let err = Error::ParamTypeMismatch {
            param: "count".into(),
            member: "count".into(),
            owner: "CounterController".into(),
            expected: "i32".into(),
            actual: "alloc::string::String".into(),
        };
        insta::assert_snapshot!(err.to_string(), @"parameter 'count' of 'count' in CounterController: expected i32, got alloc::string::String");
    }

    #[test]
    fn shrink_rejected_message() {
        let err = HistoryError::ShrinkRejected {
            size: 3,
            current: 1,
            len: 5,
        };
        insta::assert_snapshot!(err.to_string(), @"cannot shrink history to 3: current entry 1 is outside the last 3 of 5 entries");
    }

    // ── Conversions ──────────────────────────────────────────────────

    #[test]
    fn route_error_lifts_into_config() {
        let err: Error = RouteError::AboveRoot { path: "..".into() }.into();
        assert!(matches!(err, Error::Config(ConfigError::Route(_))));
    }

    #[test]
    fn bounds_classification() {
        assert!(HistoryError::NoPrevious.is_bounds());
        assert!(HistoryError::NoNext.is_bounds());
        assert!(!HistoryError::Empty.is_bounds());
        assert!(!HistoryError::InvalidSize { size: 0 }.is_bounds());
    }
}
