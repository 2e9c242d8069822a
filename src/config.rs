use std::fmt;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::args::{self, PartialConfig};
use crate::error::ConfigError;

/// How the PDF files of a run are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    All,
    Single,
    Regex,
}

impl SelectionMode {
    pub const VALUES: &'static [&'static str] = &["all", "single", "regex"];

    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Self::All),
            "single" => Some(Self::Single),
            "regex" => Some(Self::Regex),
            _ => None,
        }
    }
}

/// What happens when the text file of a PDF already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwritePolicy {
    All,
    None,
    Select,
}

impl OverwritePolicy {
    pub const VALUES: &'static [&'static str] = &["all", "none", "select"];

    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Self::All),
            "none" => Some(Self::None),
            "select" => Some(Self::Select),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathType {
    Relative,
    Absolute,
}

impl PathType {
    pub const VALUES: &'static [&'static str] = &["relative", "absolute"];

    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "relative" => Some(Self::Relative),
            "absolute" => Some(Self::Absolute),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Relative => "RELATIVE path",
            Self::Absolute => "ABSOLUTE path",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// `log_<millis>.log` in the working directory.
    Auto,
    File(PathBuf),
}

/// A file name filter that only accepts names matching the whole pattern.
#[derive(Debug, Clone)]
pub struct FileNamePattern {
    source: String,
    full: Regex,
}

impl FileNamePattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        // The bare pattern is compiled first so that errors point at what the user wrote.
        Regex::new(source)?;
        let full = Regex::new(&format!("^(?:{})$", source))?;
        Ok(Self {
            source: source.to_string(),
            full,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.full.is_match(file_name)
    }
}

/// The selection strategy together with the data it needs.
#[derive(Debug, Clone)]
pub enum Selection {
    All { folder: PathBuf },
    Single { path: PathBuf },
    Regex { pattern: FileNamePattern, folder: PathBuf },
}

/// Fully defaulted and validated settings for one run. Read-only once built.
#[derive(Debug, Clone)]
pub struct ResolvedConfiguration {
    selection: Selection,
    path_type: PathType,
    recursive: bool,
    overwrite: OverwritePolicy,
    muted: bool,
    log: Option<LogTarget>,
}

impl ResolvedConfiguration {
    /// Parses and resolves command line tokens (without the program name).
    pub fn from_args<I, S>(tokens: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let partial = args::parse_tokens(tokens)?;
        let current_dir = std::env::current_dir().map_err(ConfigError::WorkingDir)?;
        resolve(partial, &current_dir)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn mode(&self) -> SelectionMode {
        match self.selection {
            Selection::All { .. } => SelectionMode::All,
            Selection::Single { .. } => SelectionMode::Single,
            Selection::Regex { .. } => SelectionMode::Regex,
        }
    }

    pub fn single_path(&self) -> Option<&Path> {
        match &self.selection {
            Selection::Single { path } => Some(path),
            _ => None,
        }
    }

    pub fn regex_pattern(&self) -> Option<&FileNamePattern> {
        match &self.selection {
            Selection::Regex { pattern, .. } => Some(pattern),
            _ => None,
        }
    }

    pub fn search_folder(&self) -> Option<&Path> {
        match &self.selection {
            Selection::All { folder } | Selection::Regex { folder, .. } => Some(folder),
            Selection::Single { .. } => None,
        }
    }

    pub fn path_is_absolute(&self) -> bool {
        self.path_type == PathType::Absolute
    }

    pub fn recursive(&self) -> bool {
        self.recursive
    }

    pub fn overwrite(&self) -> OverwritePolicy {
        self.overwrite
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    pub fn logging_enabled(&self) -> bool {
        self.log.is_some()
    }

    pub fn auto_log_name(&self) -> bool {
        matches!(self.log, Some(LogTarget::Auto))
    }

    /// The user supplied log path; `None` for auto-named logs or no logging.
    pub fn log_path(&self) -> Option<&Path> {
        match &self.log {
            Some(LogTarget::File(path)) => Some(path),
            _ => None,
        }
    }
}

/// Applies defaults and cross-field checks to the options collected by the parser.
///
/// `current_dir` is used as the default search folder for absolute path types.
/// Fails on the first violation found.
pub fn resolve(partial: PartialConfig, current_dir: &Path) -> Result<ResolvedConfiguration, ConfigError> {
    let mode = partial.mode.unwrap_or(SelectionMode::All);
    let overwrite = partial.overwrite.unwrap_or(OverwritePolicy::None);
    let path_type = partial.path_type.unwrap_or(PathType::Relative);
    let folder = match partial.folder {
        Some(folder) => folder,
        None => match path_type {
            PathType::Relative => PathBuf::from("."),
            PathType::Absolute => current_dir.to_path_buf(),
        },
    };

    let selection = match (mode, partial.path, partial.regex) {
        (SelectionMode::Single, Some(path), _) => {
            check_path_type("file", &path, path_type)?;
            if !path.is_file() {
                return Err(ConfigError::PathNotFound(path));
            }
            Selection::Single { path }
        }
        (SelectionMode::Regex, _, Some(pattern)) => {
            check_path_type("folder", &folder, path_type)?;
            Selection::Regex { pattern, folder }
        }
        (SelectionMode::All, _, _) => {
            check_path_type("folder", &folder, path_type)?;
            Selection::All { folder }
        }
        (SelectionMode::Single, None, _) => return Err(ConfigError::MissingPath),
        (SelectionMode::Regex, _, None) => return Err(ConfigError::MissingRegex),
    };

    log::debug!("resolved selection: {:?}", selection);

    Ok(ResolvedConfiguration {
        selection,
        path_type,
        recursive: partial.recursive,
        overwrite,
        muted: partial.muted,
        log: partial.logfile,
    })
}

fn check_path_type(what: &'static str, path: &Path, path_type: PathType) -> Result<(), ConfigError> {
    match (path_type, path.is_absolute()) {
        (PathType::Relative, true) => Err(ConfigError::AbsoluteButRelative {
            what,
            path: path.to_path_buf(),
        }),
        (PathType::Absolute, false) => Err(ConfigError::RelativeButAbsolute {
            what,
            path: path.to_path_buf(),
        }),
        _ => Ok(()),
    }
}

const RULE: &str = "-----------------------------------------------------------------------";

impl fmt::Display for ResolvedConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", RULE)?;
        writeln!(f, "Resolved arguments:")?;
        match &self.selection {
            Selection::All { folder } => {
                writeln!(f, "PDF selection mode (-mode): every PDF file.")?;
                write_folder(f, folder, self.path_type)?;
            }
            Selection::Single { path } => {
                writeln!(f, "PDF selection mode (-mode): a single PDF file.")?;
                writeln!(f, "PDF file (-path): {} ({})", path.display(), self.path_type.label())?;
            }
            Selection::Regex { pattern, folder } => {
                writeln!(f, "PDF selection mode (-mode): PDF files whose name matches a regular expression.")?;
                writeln!(f, "Regular expression (-regex): {}", pattern.as_str())?;
                write_folder(f, folder, self.path_type)?;
            }
        }
        if self.recursive {
            writeln!(f, "Recursive search (-recursive): subfolders are searched too.")?;
        } else {
            writeln!(f, "No recursive search, only the folder itself is searched.")?;
        }
        let overwrite = match self.overwrite {
            OverwritePolicy::All => "overwrite every existing text file.",
            OverwritePolicy::None => "keep every existing text file (no overwriting).",
            OverwritePolicy::Select => "ask for each existing text file.",
        };
        writeln!(f, "Overwrite policy (-overwrite): {}", overwrite)?;
        if self.muted {
            writeln!(f, "Console output is muted (-mute).")?;
        } else {
            writeln!(f, "Console output is enabled.")?;
        }
        match &self.log {
            Some(LogTarget::Auto) => {
                writeln!(f, "Log file is enabled (-logfile).")?;
                writeln!(f, "An automatically generated log file name will be used.")?;
            }
            Some(LogTarget::File(path)) => {
                writeln!(f, "Log file is enabled (-logfile).")?;
                writeln!(f, "Log file RELATIVE path: {}", path.display())?;
            }
            None => writeln!(f, "Log file is disabled.")?,
        }
        write!(f, "{}", RULE)
    }
}

fn write_folder(f: &mut fmt::Formatter<'_>, folder: &Path, path_type: PathType) -> fmt::Result {
    if folder == Path::new(".") {
        writeln!(f, "Search folder (-folder): current working directory ({})", path_type.label())
    } else {
        writeln!(f, "Search folder (-folder): {} ({})", folder.display(), path_type.label())
    }
}
