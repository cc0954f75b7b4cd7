//! Exit codes. The CLI surface promises a uniform "0 on success, 1 on any
//! error" exit policy, so every named constant below is 1 (the names exist
//! to make each call site's failure mode legible, not to distinguish exit
//! statuses from each other).

/// CLI argument parsing or validation error.
pub(crate) const CLI_ARG_ERROR: i32 = 1;
/// Device open/seek/read/write error.
pub(crate) const IO_ERR: i32 = 1;
/// LDM database format error (bad signature, version, or cross-reference).
pub(crate) const FORMAT_ERR: i32 = 1;
