//! First phase of configuration: scans `-name[=value]` tokens in order.
//!
//! Some options depend on ones given before them (`-path` needs `-mode`,
//! `-pathType` needs `-path` or `-folder`), so each handler checks the
//! options collected so far. Defaults and cross-field rules live in
//! [`crate::config::resolve`].

use std::path::{Path, PathBuf};

use crate::config::{FileNamePattern, LogTarget, OverwritePolicy, PathType, SelectionMode};
use crate::error::ConfigError;
use crate::utils::{has_pdf_extension, normalize_folder};

/// Every option the command line understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Mode,
    Path,
    Folder,
    Regex,
    Overwrite,
    Recursive,
    Mute,
    Logfile,
    PathType,
}

impl OptionKind {
    pub const ALL: [OptionKind; 9] = [
        OptionKind::Mode,
        OptionKind::Path,
        OptionKind::Folder,
        OptionKind::Regex,
        OptionKind::Overwrite,
        OptionKind::Recursive,
        OptionKind::Mute,
        OptionKind::Logfile,
        OptionKind::PathType,
    ];

    pub fn flag(self) -> &'static str {
        match self {
            OptionKind::Mode => "-mode",
            OptionKind::Path => "-path",
            OptionKind::Folder => "-folder",
            OptionKind::Regex => "-regex",
            OptionKind::Overwrite => "-overwrite",
            OptionKind::Recursive => "-recursive",
            OptionKind::Mute => "-mute",
            OptionKind::Logfile => "-logfile",
            OptionKind::PathType => "-pathType",
        }
    }

    fn takes_value(self) -> bool {
        !matches!(self, OptionKind::Recursive | OptionKind::Mute)
    }

    fn from_flag(flag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.flag() == flag)
    }
}

/// Options collected so far. Unset options stay `None`/`false` until resolution.
#[derive(Debug, Default)]
pub struct PartialConfig {
    pub mode: Option<SelectionMode>,
    pub path: Option<PathBuf>,
    pub folder: Option<PathBuf>,
    pub regex: Option<FileNamePattern>,
    pub overwrite: Option<OverwritePolicy>,
    pub recursive: bool,
    pub muted: bool,
    pub logfile: Option<LogTarget>,
    pub path_type: Option<PathType>,
}

/// Parses the tokens in order, stopping at the first invalid one.
pub fn parse_tokens<I, S>(tokens: I) -> Result<PartialConfig, ConfigError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut partial = PartialConfig::default();
    for token in tokens {
        partial.apply(token.as_ref())?;
    }
    Ok(partial)
}

/// Splits `-name=value` on the first `=`, so values may contain `=` themselves.
fn split_token(token: &str) -> Result<(OptionKind, &str), ConfigError> {
    let (flag, value) = match token.split_once('=') {
        Some((flag, value)) => (flag, Some(value)),
        None => (token, None),
    };
    let kind = OptionKind::from_flag(flag).ok_or_else(|| ConfigError::UnknownOption(token.to_string()))?;
    match (kind.takes_value(), value) {
        (true, None) => Err(ConfigError::MissingValue(kind.flag())),
        (false, Some(_)) => Err(ConfigError::UnexpectedValue(kind.flag())),
        (_, value) => Ok((kind, value.unwrap_or_default())),
    }
}

impl PartialConfig {
    fn apply(&mut self, token: &str) -> Result<(), ConfigError> {
        let (kind, value) = split_token(token)?;
        log::trace!("parsing {} with value {:?}", kind.flag(), value);
        match kind {
            OptionKind::Mode => self.parse_mode(value),
            OptionKind::Path => self.parse_path(value),
            OptionKind::Folder => self.parse_folder(value),
            OptionKind::Regex => self.parse_regex(value),
            OptionKind::Overwrite => self.parse_overwrite(value),
            OptionKind::Recursive => set_flag(&mut self.recursive, kind),
            OptionKind::Mute => set_flag(&mut self.muted, kind),
            OptionKind::Logfile => self.parse_logfile(value),
            OptionKind::PathType => self.parse_path_type(value),
        }
    }

    fn parse_mode(&mut self, value: &str) -> Result<(), ConfigError> {
        if self.mode.is_some() {
            return Err(ConfigError::Duplicate("-mode"));
        }
        let mode = SelectionMode::from_value(value).ok_or_else(|| ConfigError::InvalidValue {
            option: "-mode",
            value: value.to_string(),
            valid: SelectionMode::VALUES,
        })?;
        self.mode = Some(mode);
        Ok(())
    }

    fn require_mode(&self, option: &'static str, allowed: &[SelectionMode], description: &'static str) -> Result<(), ConfigError> {
        match self.mode {
            None => Err(ConfigError::ModeNotSet(option)),
            Some(mode) if !allowed.contains(&mode) => Err(ConfigError::ModeMismatch {
                option,
                allowed: description,
            }),
            Some(_) => Ok(()),
        }
    }

    fn parse_path(&mut self, value: &str) -> Result<(), ConfigError> {
        if self.path.is_some() {
            return Err(ConfigError::Duplicate("-path"));
        }
        self.require_mode("-path", &[SelectionMode::Single], "'-mode=single'")?;
        let path = PathBuf::from(value);
        if !has_pdf_extension(&path) {
            return Err(ConfigError::NotPdf(path));
        }
        if !path.is_file() {
            return Err(ConfigError::PathNotFound(path));
        }
        self.path = Some(path);
        Ok(())
    }

    fn parse_folder(&mut self, value: &str) -> Result<(), ConfigError> {
        if self.folder.is_some() {
            return Err(ConfigError::Duplicate("-folder"));
        }
        self.require_mode(
            "-folder",
            &[SelectionMode::All, SelectionMode::Regex],
            "'-mode=all' or '-mode=regex'",
        )?;
        let folder = normalize_folder(value);
        if !folder.exists() {
            return Err(ConfigError::FolderNotFound(folder));
        }
        if !folder.is_dir() {
            return Err(ConfigError::FolderIsFile(folder));
        }
        self.folder = Some(folder);
        Ok(())
    }

    fn parse_regex(&mut self, value: &str) -> Result<(), ConfigError> {
        if self.regex.is_some() {
            return Err(ConfigError::Duplicate("-regex"));
        }
        self.require_mode("-regex", &[SelectionMode::Regex], "'-mode=regex'")?;
        let pattern = FileNamePattern::new(value).map_err(ConfigError::InvalidRegex)?;
        self.regex = Some(pattern);
        Ok(())
    }

    fn parse_overwrite(&mut self, value: &str) -> Result<(), ConfigError> {
        if self.overwrite.is_some() {
            return Err(ConfigError::Duplicate("-overwrite"));
        }
        let policy = OverwritePolicy::from_value(value).ok_or_else(|| ConfigError::InvalidValue {
            option: "-overwrite",
            value: value.to_string(),
            valid: OverwritePolicy::VALUES,
        })?;
        self.overwrite = Some(policy);
        Ok(())
    }

    fn parse_logfile(&mut self, value: &str) -> Result<(), ConfigError> {
        if self.logfile.is_some() {
            return Err(ConfigError::Duplicate("-logfile"));
        }
        let target = match value {
            "" => return Err(ConfigError::MissingValue("-logfile")),
            "auto" => LogTarget::Auto,
            path if Path::new(path).is_absolute() => return Err(ConfigError::AbsoluteLogPath(PathBuf::from(path))),
            path => LogTarget::File(PathBuf::from(path)),
        };
        self.logfile = Some(target);
        Ok(())
    }

    fn parse_path_type(&mut self, value: &str) -> Result<(), ConfigError> {
        if self.path_type.is_some() {
            return Err(ConfigError::Duplicate("-pathType"));
        }
        if self.path.is_none() && self.folder.is_none() {
            return Err(ConfigError::PathTypeBeforePath);
        }
        let path_type = PathType::from_value(value).ok_or_else(|| ConfigError::InvalidValue {
            option: "-pathType",
            value: value.to_string(),
            valid: PathType::VALUES,
        })?;
        self.path_type = Some(path_type);
        Ok(())
    }
}

fn set_flag(flag: &mut bool, kind: OptionKind) -> Result<(), ConfigError> {
    if *flag {
        return Err(ConfigError::Duplicate(kind.flag()));
    }
    *flag = true;
    Ok(())
}
