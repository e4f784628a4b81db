//! The registration capability supplied by the host test framework.

use std::time::Duration;

use futures::future::BoxFuture;

use crate::error::{Error, TestError};

/// Which entry point of a registration primitive to use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Register normally.
    #[default]
    Normal,
    /// Register, but skip execution.
    Skip,
    /// Register, and restrict execution to this item (and other `Only` items).
    Only,
}

/// Body of a grouping registration; registers nested groups and tests.
pub type GroupBody<'a> = dyn FnMut(&mut dyn Registrar) -> Result<(), Error> + 'a;

/// Future produced by a leaf test.
pub type TestFuture = BoxFuture<'static, Result<(), TestError>>;

/// Body of a leaf test; called once by the host when the test executes.
pub type TestFn = Box<dyn FnOnce() -> TestFuture + Send>;

/// Grouping and leaf-test primitives of a host test framework.
///
/// Hosts are expected to call a group's `body` before `group` returns, and to
/// propagate the body's error.
pub trait Registrar {
    /// Registers a group labelled `label` and fills it by calling `body`.
    /// `timeout` is forwarded from configuration without interpretation.
    fn group(
        &mut self,
        variant: Variant,
        label: &str,
        timeout: Option<Duration>,
        body: &mut GroupBody<'_>,
    ) -> Result<(), Error>;

    /// Registers a leaf test labelled `label`.
    fn test(&mut self, variant: Variant, label: &str, body: TestFn);
}
