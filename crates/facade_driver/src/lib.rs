mod pipeline;

pub use pipeline::{
    DriverError, FileDiagnostic, SourceInput, TranslateOptions, TranslatedUnit, translate_files,
    translate_sources,
};

// Options name engine types; re-export them so callers need only the driver.
pub use facade_core::{Diagnostic, ReportMode, TranslateError, UnionPolicy};
