//! Process exit codes, following BSD sysexits.h

pub const OK: i32 = 0;

/// Bad flags or missing `--answer` pairs
pub const USAGE: i32 = 64;

/// Malformed tree JSON or a rejected tree operation
pub const DATAERR: i32 = 65;

/// Tree file unreadable or unwritable
pub const IOERR: i32 = 74;

/// Settings failed to load
pub const CONFIG: i32 = 78;
