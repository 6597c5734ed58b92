//! Decoder configuration.

/// Default bound on record nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Settings for [`Decoder`](super::parser::Decoder).
///
/// # Examples
///
/// ```
/// use officeart::DecodeConfig;
///
/// let config = DecodeConfig::new().with_max_depth(16);
/// assert_eq!(config.max_depth, 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeConfig {
    /// Maximum number of records on any root-to-leaf path. Deeper input fails
    /// with `RecursionLimitExceeded` instead of exhausting the stack.
    pub max_depth: usize,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DecodeConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the nesting limit
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
