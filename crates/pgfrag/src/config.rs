/// Options for [`SqlFragment::compile_with`](crate::SqlFragment::compile_with).
///
/// Both casts are off by default, leaving the parameter type to Postgres.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileConfig {
    /// Render JSON array parameters as `$n::json`.
    pub cast_array_params_to_json: bool,
    /// Render structured record parameters as `$n::json`.
    pub cast_object_params_to_json: bool,
}

impl CompileConfig {
    /// Create a new configuration with defaults (no casts).
    pub fn new() -> Self {
        Self::default()
    }

    /// Cast array parameters to `json`.
    ///
    /// Without the cast, Postgres infers the parameter type from context, which
    /// fails for untyped positions such as `SELECT $1`.
    pub fn with_cast_array_params_to_json(mut self, enabled: bool) -> Self {
        self.cast_array_params_to_json = enabled;
        self
    }

    /// Cast structured record parameters to `json`.
    pub fn with_cast_object_params_to_json(mut self, enabled: bool) -> Self {
        self.cast_object_params_to_json = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_off() {
        let cfg = CompileConfig::new();
        assert!(!cfg.cast_array_params_to_json);
        assert!(!cfg.cast_object_params_to_json);
    }

    #[test]
    fn setters_chain() {
        let cfg = CompileConfig::new()
            .with_cast_array_params_to_json(true)
            .with_cast_object_params_to_json(true)
            .with_cast_array_params_to_json(false);
        assert!(!cfg.cast_array_params_to_json);
        assert!(cfg.cast_object_params_to_json);
    }
}
