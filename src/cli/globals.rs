/// Cross-cutting options the server wiring needs outside of auth config.
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Exact dashboard origin for CORS; `None` stays permissive for local
    /// development.
    pub cors_origin: Option<String>,
}

impl GlobalArgs {
    #[must_use]
    pub const fn new(cors_origin: Option<String>) -> Self {
        Self { cors_origin }
    }
}
