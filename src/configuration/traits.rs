use super::error::ConfigurationError;

/// A deserialized but not yet derived configuration table
/// that can be turned into its final, typed form on its own.
pub trait ResolvableConfiguration {
    type Resolved;

    /// Apply the table's derivation rules. Any rule violation is returned as `Err`
    /// and no partially-resolved value is produced.
    fn resolve(self) -> Result<Self::Resolved, ConfigurationError>;
}


/// Like [`ResolvableConfiguration`], for tables whose derivation rules
/// need to know something from outside the table itself.
pub trait ResolvableConfigurationWithContext {
    type Context;
    type Resolved;

    fn resolve(self, context: Self::Context) -> Result<Self::Resolved, ConfigurationError>;
}
