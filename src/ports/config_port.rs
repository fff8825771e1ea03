//! Configuration access port trait.

/// Section/key lookup over an INI-style configuration source.
///
/// Typed reading and validation live in
/// [`crate::domain::config_validation`], which reports malformed values
/// instead of defaulting them.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
}
