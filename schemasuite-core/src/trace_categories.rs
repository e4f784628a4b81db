//! Trace utilities

/// Trace category for suite discovery and loading.
pub const DISCOVERY: &str = "discovery";
/// Trace category for validator execution.
pub const EXECUTION: &str = "execution";
/// Trace category for result hooks.
pub const HOOKS: &str = "hooks";
