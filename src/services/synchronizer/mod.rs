//! Synchronizers apply one already resolved theme name to one target application.
//!
//! They are stateless: every call is a blind overwrite, never a diff against the
//! previous state, so applying the same theme twice is harmless.

mod dry_run;
mod helix;
mod kitty;
mod r#trait;

pub use self::r#trait::{create_synchronizers, Synchronizers, ThemeSynchronizer};
