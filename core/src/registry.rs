//! Option registry.
//!
//! An [`OptionRegistry`] is the validated, immutable list of options a
//! parser accepts, each an [`OptionDecl`] with an optional handler.

use std::fmt;

use crate::error::HandlerError;
use crate::validate::{ConfigError, validate_declarations};
use crate::{OptionDecl, OptionId};

/// Callback invoked with the values of each occurrence of an option.
pub type Handler<'h> = Box<dyn FnMut(&[&str]) -> Result<(), HandlerError> + 'h>;

/// An option declaration with an optional handler.
///
/// Every occurrence is recorded in the parse results. When a handler is
/// attached it is also called, synchronously and in token order, with
/// exactly `arity` values.
///
/// # Examples
///
/// ```
/// use std::cell::Cell;
/// use argdispatch_core::OptionSpec;
///
/// let seen = Cell::new(0);
/// let spec = OptionSpec::flag(&["-v", "--verbose"]).on(|_| {
///     seen.set(seen.get() + 1);
///     Ok(())
/// });
/// assert!(spec.has_handler());
/// assert_eq!(spec.decl().canonical_name(), "--verbose");
/// ```
pub struct OptionSpec<'h> {
    decl: OptionDecl,
    handler: Option<Handler<'h>>,
}

impl<'h> OptionSpec<'h> {
    /// Wraps a declaration without a handler.
    pub fn new(decl: OptionDecl) -> Self {
        Self {
            decl,
            handler: None,
        }
    }

    /// See [`OptionDecl::flag`].
    pub fn flag(switches: &[&str]) -> Self {
        Self::new(OptionDecl::flag(switches))
    }

    /// See [`OptionDecl::value`].
    pub fn value(switches: &[&str]) -> Self {
        Self::new(OptionDecl::value(switches))
    }

    /// See [`OptionDecl::with_arity`].
    pub fn with_arity(switches: &[&str], arity: usize) -> Self {
        Self::new(OptionDecl::with_arity(switches, arity))
    }

    /// See [`OptionDecl::positional`].
    pub fn positional() -> Self {
        Self::new(OptionDecl::positional())
    }

    /// Keeps every occurrence.
    pub fn multi(mut self) -> Self {
        self.decl = self.decl.multi();
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.decl = self.decl.with_description(desc);
        self
    }

    /// Attaches a handler, replacing any previous one.
    pub fn on<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&[&str]) -> Result<(), HandlerError> + 'h,
    {
        self.handler = Some(Box::new(handler));
        self
    }

    /// The underlying declaration.
    pub fn decl(&self) -> &OptionDecl {
        &self.decl
    }

    /// Whether a handler is attached.
    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }
}

impl From<OptionDecl> for OptionSpec<'_> {
    fn from(decl: OptionDecl) -> Self {
        Self::new(decl)
    }
}

impl fmt::Debug for OptionSpec<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionSpec")
            .field("decl", &self.decl)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

/// Validated, immutable set of options.
///
/// # Examples
///
/// ```
/// use argdispatch_core::*;
///
/// let registry = OptionRegistry::new(vec![
///     OptionSpec::flag(&["-a"]),
///     OptionSpec::value(&["-c"]).multi(),
///     OptionSpec::positional(),
/// ])
/// .unwrap();
/// assert_eq!(registry.len(), 3);
/// assert_eq!(registry.find("-c"), Some(OptionId(1)));
///
/// let clash = OptionRegistry::new(vec![OptionSpec::flag(&["-a"]), OptionSpec::flag(&["-a"])]);
/// assert!(clash.is_err());
/// ```
#[derive(Debug)]
pub struct OptionRegistry<'h> {
    specs: Vec<OptionSpec<'h>>,
}

impl<'h> OptionRegistry<'h> {
    /// Validates and stores `specs` in declaration order.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn new(specs: Vec<OptionSpec<'h>>) -> Result<Self, ConfigError> {
        validate_declarations(specs.iter().map(OptionSpec::decl))?;
        Ok(Self { specs })
    }

    /// Builds a handler-less registry from plain declarations.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn from_decls(decls: Vec<OptionDecl>) -> Result<Self, ConfigError> {
        Self::new(decls.into_iter().map(OptionSpec::new).collect())
    }

    /// Number of declared options.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Returns `true` when no options are declared.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Declaration of option `id`.
    pub fn decl(&self, id: OptionId) -> Option<&OptionDecl> {
        self.specs.get(id.0).map(OptionSpec::decl)
    }

    /// All declarations, in order.
    pub fn decls(&self) -> impl Iterator<Item = &OptionDecl> {
        self.specs.iter().map(OptionSpec::decl)
    }

    /// Finds the option owning a switch spelling.
    pub fn find(&self, spelling: &str) -> Option<OptionId> {
        self.specs
            .iter()
            .position(|spec| spec.decl.matches(spelling))
            .map(OptionId)
    }

    /// Finds the positional receiver.
    pub fn positional(&self) -> Option<OptionId> {
        self.specs
            .iter()
            .position(|spec| spec.decl.positional)
            .map(OptionId)
    }

    pub(crate) fn handler_mut(&mut self, id: OptionId) -> Option<&mut Handler<'h>> {
        self.specs.get_mut(id.0).and_then(|spec| spec.handler.as_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_rejects_invalid_spelling() {
        let err = OptionRegistry::new(vec![OptionSpec::flag(&["-ab"])]).unwrap_err();
        assert_eq!(err, ConfigError::InvalidLongSwitch("-ab".into()));
    }

    #[test]
    fn test_registry_lookups() {
        let registry = OptionRegistry::from_decls(vec![
            OptionDecl::flag(&["-h", "--help"]),
            OptionDecl::positional(),
        ])
        .unwrap();

        assert_eq!(registry.find("--help"), Some(OptionId(0)));
        assert_eq!(registry.find("-h"), Some(OptionId(0)));
        assert_eq!(registry.find("--nope"), None);
        assert_eq!(registry.positional(), Some(OptionId(1)));
        assert_eq!(registry.decls().count(), 2);
    }

    #[test]
    fn test_handler_is_reachable() {
        let mut calls = Vec::new();
        {
            let mut registry = OptionRegistry::new(vec![
                OptionSpec::flag(&["-a"]),
                OptionSpec::value(&["-c"]).on(|values| {
                    calls.push(values.join(","));
                    Ok(())
                }),
            ])
            .unwrap();

            assert!(registry.handler_mut(OptionId(0)).is_none());
            let handler = registry.handler_mut(OptionId(1)).unwrap();
            handler(&["x"]).unwrap();
        }
        assert_eq!(calls, vec!["x".to_string()]);
    }
}
