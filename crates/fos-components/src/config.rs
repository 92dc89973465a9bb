//! Component Configuration

/// Element tree configuration options
#[derive(Debug, Clone)]
pub struct Config {
    /// Separator used by `join_class` between the base class and a suffix
    pub class_separator: String,

    /// Fail construction when input carries keys that are neither declared
    /// attributes nor tag-attribute groups
    pub reject_unknown_input: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            class_separator: "-".to_string(),
            reject_unknown_input: false,
        }
    }
}
