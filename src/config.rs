//! Provider options.
//!
//! With the `config` feature enabled, [`ProviderOptions`] can be loaded from
//! JSON alongside the rest of an application's configuration.

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

/// Default maximum depth of a resolution chain
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Options applied to a [`DependencyProvider`](crate::DependencyProvider).
///
/// # Examples
///
/// ```
/// use ferrous_wire::{DependencyConfiguration, ProviderOptions};
///
/// let options = ProviderOptions::default().with_max_depth(64);
/// let provider = DependencyConfiguration::new().build_with_options(options);
/// assert_eq!(provider.options().max_depth(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ProviderOptions {
    /// Deepest chain of nested constructions before failing with `DepthExceeded`
    max_depth: usize,
}

impl ProviderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum resolution depth. Values below 1 are raised to 1.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Parses options from JSON. Missing fields keep their defaults.
    #[cfg(feature = "config")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let options: Self = serde_json::from_str(json)?;
        Ok(options.with_max_depth(options.max_depth))
    }
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_standard_depth() {
        assert_eq!(ProviderOptions::new().max_depth(), DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn zero_depth_is_clamped() {
        assert_eq!(ProviderOptions::new().with_max_depth(0).max_depth(), 1);
    }

    #[cfg(feature = "config")]
    #[test]
    fn loads_from_json() {
        let options = ProviderOptions::from_json(r#"{ "max_depth": 32 }"#).unwrap();
        assert_eq!(options.max_depth(), 32);

        let defaulted = ProviderOptions::from_json("{}").unwrap();
        assert_eq!(defaulted, ProviderOptions::default());
    }
}
