mod collect;
mod emit;
mod lower;
mod prelude;
mod translate;
mod utils;

pub use translate::{
    DriverError, FileDiagnostic, SourceInput, TranslateOptions, TranslatedUnit, translate_files,
    translate_sources,
};
