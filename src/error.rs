use std::path::PathBuf;
use thiserror::Error;

/// Reasons a command line cannot be turned into a run configuration.
///
/// Every variant is fatal: the run stops before any file is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown argument: {0}")]
    UnknownOption(String),

    #[error("'{0}' was given more than once, which is not allowed")]
    Duplicate(&'static str),

    #[error("'{0}' needs a value, e.g. {0}=<value>")]
    MissingValue(&'static str),

    #[error("'{0}' is a flag and does not take a value")]
    UnexpectedValue(&'static str),

    #[error("invalid '{option}' value: {value}! It must be one of {valid:?}")]
    InvalidValue {
        option: &'static str,
        value: String,
        valid: &'static [&'static str],
    },

    #[error("'-mode' must come before '{0}'")]
    ModeNotSet(&'static str),

    #[error("'{option}' is only allowed with {allowed}")]
    ModeMismatch {
        option: &'static str,
        allowed: &'static str,
    },

    #[error("'-pathType' must come after '-path' or '-folder'")]
    PathTypeBeforePath,

    #[error("the selected mode is single, so a PDF file must be given with '-path'")]
    MissingPath,

    #[error("the selected mode is regex, so a regular expression must be given with '-regex'")]
    MissingRegex,

    #[error("the file given with '-path' must be a pdf file: {}", .0.display())]
    NotPdf(PathBuf),

    #[error("the file given with '-path' must exist: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("the folder given with '-folder' must exist: {}", .0.display())]
    FolderNotFound(PathBuf),

    #[error("'-folder' must point to a folder, but this is a file: {}", .0.display())]
    FolderIsFile(PathBuf),

    #[error("'-regex' is not a valid regular expression")]
    InvalidRegex(#[source] regex::Error),

    #[error("the {what} path is absolute: {}. Add '-pathType=absolute' after it", .path.display())]
    AbsoluteButRelative { what: &'static str, path: PathBuf },

    #[error("'-pathType=absolute' was given, but the {what} path is relative: {}. Leave out '-pathType' for relative paths", .path.display())]
    RelativeButAbsolute { what: &'static str, path: PathBuf },

    #[error("cannot determine the working directory")]
    WorkingDir(#[source] std::io::Error),

    #[error("'-logfile' needs a relative path or 'auto', got: {}", .0.display())]
    AbsoluteLogPath(PathBuf),
}
