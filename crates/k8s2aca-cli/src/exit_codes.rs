//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// Success - operation completed without errors
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Parse error - the manifest stream is not valid YAML
pub const PARSE_ERROR: i32 = 2;

/// No workload - no Deployment, ReplicaSet or Pod in the input
pub const NO_WORKLOAD: i32 = 3;

/// Resolve error - a conversion choice could not be answered
pub const RESOLVE_ERROR: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Usage error - invalid arguments or options (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;
