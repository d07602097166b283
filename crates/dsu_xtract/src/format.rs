//! Archive format registry and delegate argument conventions

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf, MAIN_SEPARATOR_STR};

/// The external tool families archives are delegated to.
///
/// Each family has its own way of being told where to write:
///
/// - `tar` takes a separate `-C <dir>` pair
/// - `7z` wants the directory glued to the switch, as in `-o<dir>`
/// - `unzip` takes a separate `-d <dir>` pair
/// - `unrar` takes the directory as a bare trailing argument ending in a separator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolFamily {
    Tar,
    SevenZip,
    Unzip,
    Unrar,
}

impl ToolFamily {
    /// Name of the binary that is looked up on `PATH`
    pub fn tool(&self) -> &'static str {
        match self {
            Self::Tar => "tar",
            Self::SevenZip => "7z",
            Self::Unzip => "unzip",
            Self::Unrar => "unrar",
        }
    }

    /// Binary names accepted for this family, in order of preference
    pub fn candidates(&self) -> &'static [&'static str] {
        match self {
            Self::Tar => &["tar"],
            Self::SevenZip => &["7z", "7zz", "7za"],
            Self::Unzip => &["unzip"],
            Self::Unrar => &["unrar"],
        }
    }

    /// The switch that selects the output directory, if the family has one
    pub fn output_dir_flag(&self) -> Option<&'static str> {
        match self {
            Self::Tar => Some("-C"),
            Self::SevenZip => Some("-o"),
            Self::Unzip => Some("-d"),
            Self::Unrar => None,
        }
    }
}

/// A registered archive type: the extension it is recognized by and how its delegate is driven
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArchiveFormat {
    extension: &'static str,
    family: ToolFamily,
    list_flag: &'static str,
    extract_flag: Option<&'static str>,
}

const fn tar(extension: &'static str, list: &'static str, extract: &'static str) -> ArchiveFormat {
    ArchiveFormat {
        extension,
        family: ToolFamily::Tar,
        list_flag: list,
        extract_flag: Some(extract),
    }
}

const fn sevenzip(extension: &'static str) -> ArchiveFormat {
    ArchiveFormat {
        extension,
        family: ToolFamily::SevenZip,
        list_flag: "l",
        extract_flag: Some("x"),
    }
}

/// Every archive type `xtract` knows about
pub static FORMATS: &[ArchiveFormat] = &[
    tar("tar", "-tf", "-xf"),
    tar("tar.gz", "-tzf", "-xzf"),
    tar("tgz", "-tzf", "-xzf"),
    tar("tar.bz2", "-tjf", "-xjf"),
    tar("tbz", "-tjf", "-xjf"),
    tar("tbz2", "-tjf", "-xjf"),
    tar("tar.xz", "-tJf", "-xJf"),
    tar("txz", "-tJf", "-xJf"),
    sevenzip("7z"),
    sevenzip("gz"),
    sevenzip("bz2"),
    sevenzip("xz"),
    ArchiveFormat {
        extension: "zip",
        family: ToolFamily::Unzip,
        list_flag: "-l",
        extract_flag: Some("-q"),
    },
    ArchiveFormat {
        extension: "rar",
        family: ToolFamily::Unrar,
        list_flag: "l",
        extract_flag: Some("x"),
    },
];

impl ArchiveFormat {
    /// Look up the format of a file name.
    ///
    /// Suffixes are tried from the leftmost dot onwards, so the longest registered
    /// suffix wins: `backup.tar.gz` resolves to `tar.gz`, never to `gz`.
    /// Matching ignores ASCII case.
    pub fn lookup(filename: &str) -> Option<&'static ArchiveFormat> {
        Self::split(filename).map(|(_, format)| format)
    }

    /// Detect the format from the final component of a path
    pub fn detect_from_path<P: AsRef<Path>>(path: P) -> Option<&'static ArchiveFormat> {
        path.as_ref()
            .file_name()
            .and_then(OsStr::to_str)
            .and_then(Self::lookup)
    }

    /// The file name with its recognized extension removed, e.g. `foo.tar.gz` -> `foo`
    pub fn base_name(filename: &str) -> Option<&str> {
        Self::split(filename).map(|(stem, _)| stem)
    }

    fn split(filename: &str) -> Option<(&str, &'static ArchiveFormat)> {
        let lowered = filename.to_ascii_lowercase();
        lowered
            .match_indices('.')
            .filter(|(idx, _)| *idx > 0)
            .find_map(|(idx, _)| {
                let suffix = &lowered[idx + 1..];
                FORMATS
                    .iter()
                    .find(|format| format.extension == suffix)
                    .map(|format| (&filename[..idx], format))
            })
    }

    /// The extension this entry is registered under, without the leading dot
    pub fn extension(&self) -> &'static str {
        self.extension
    }

    pub fn family(&self) -> ToolFamily {
        self.family
    }

    /// Name of the external binary that handles this format
    pub fn tool(&self) -> &'static str {
        self.family.tool()
    }

    pub fn list_flag(&self) -> &'static str {
        self.list_flag
    }

    pub fn extract_flag(&self) -> Option<&'static str> {
        self.extract_flag
    }

    pub fn output_dir_flag(&self) -> Option<&'static str> {
        self.family.output_dir_flag()
    }

    /// Check if this is a tar-based format
    pub fn is_tar_based(&self) -> bool {
        self.family == ToolFamily::Tar
    }

    /// Arguments that make the delegate print the archive's table of contents
    pub fn list_args(&self, archive: &Path) -> Vec<OsString> {
        vec![self.list_flag.into(), guard_dash(archive).into_os_string()]
    }

    /// Arguments that make the delegate unpack `archive` into `output_dir`
    pub fn extract_args(&self, archive: &Path, output_dir: &Path) -> Vec<OsString> {
        let archive = guard_dash(archive).into_os_string();
        let output_dir = guard_dash(output_dir).into_os_string();

        let mut args: Vec<OsString> = self.extract_flag.iter().map(OsString::from).collect();
        match self.family {
            ToolFamily::Tar => {
                args.extend([archive, "-C".into(), output_dir]);
            }
            ToolFamily::SevenZip => {
                let mut glued = OsString::from("-o");
                glued.push(output_dir);
                args.extend([archive, glued]);
            }
            ToolFamily::Unzip => {
                args.extend([archive, "-d".into(), output_dir]);
            }
            ToolFamily::Unrar => {
                let mut trailing = output_dir;
                if !trailing.to_string_lossy().ends_with(MAIN_SEPARATOR_STR) {
                    trailing.push(MAIN_SEPARATOR_STR);
                }
                args.extend([archive, trailing]);
            }
        }
        args
    }
}

/// Relative paths starting with `-` would be read as switches by every delegate
fn guard_dash(path: &Path) -> PathBuf {
    if path.is_relative() && path.as_os_str().to_string_lossy().starts_with('-') {
        Path::new(".").join(path)
    } else {
        path.to_path_buf()
    }
}
