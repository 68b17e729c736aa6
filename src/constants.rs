//! Crate-wide constants and default values
//!
//! Centralized location for all hard-coded values to improve maintainability

/// Autosave defaults
pub mod autosave {
    /// Delay between the last graph change and the autosave write (milliseconds)
    pub const DEFAULT_DELAY_MS: u64 = 2000;

    /// File name used for the autosave document inside the data directory
    pub const DEFAULT_FILENAME: &str = "autosave.json";
}

/// Persisted document format
pub mod document {
    /// Version attribute written into every document root
    pub const FORMAT_VERSION: &str = "1.0";

    /// Creator string recorded in document metadata
    pub const CREATOR: &str = "Wiregraph 0.1";
}
