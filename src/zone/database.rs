//! Sources of zone definitions.

use crate::error::zone::ZoneDatabaseError;
use crate::timezone::TimeZone;
use crate::zone::ZoneDefinition;

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Well-known locations of the system zoneinfo database, searched after `TZDIR`
const ZONEINFO_DIRECTORIES: &[&str] = &["/usr/share/zoneinfo", "/share/zoneinfo", "/etc/zoneinfo"];

/// Top-level zoneinfo subdirectories holding duplicate copies of the database
const DUPLICATE_DIRECTORIES: &[&str] = &["posix", "right"];

/// Top-level TZif files which are not zones of their own
const NON_ZONE_FILES: &[&str] = &["localtime", "posixrules", "Factory"];

/// Read-only provider of zone definitions, queried at call time
pub trait ZoneDatabase: Send + Sync {
    /// Enumerate every zone definition, in the enumeration order of the database
    fn zones(&self) -> crate::Result<Vec<ZoneDefinition>>;
}

impl ZoneDatabase for [ZoneDefinition] {
    fn zones(&self) -> crate::Result<Vec<ZoneDefinition>> {
        Ok(self.to_vec())
    }
}

impl ZoneDatabase for Vec<ZoneDefinition> {
    fn zones(&self) -> crate::Result<Vec<ZoneDefinition>> {
        Ok(self.clone())
    }
}

impl<T: ZoneDatabase + ?Sized> ZoneDatabase for &T {
    fn zones(&self) -> crate::Result<Vec<ZoneDefinition>> {
        (**self).zones()
    }
}

/// Zone database read from the TZif files of a zoneinfo directory.
///
/// The directory is walked again on every call to [`ZoneDatabase::zones`], so updates are visible on the next call.
/// Zones are sorted by identifier, which is the path of the file relative to the directory.
///
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SystemZoneDatabase {
    /// Candidate zoneinfo directories, the first readable one being used
    directories: Vec<PathBuf>,
}

impl SystemZoneDatabase {
    /// Use the directory named by the `TZDIR` environment variable, then the well-known system locations
    pub fn from_env() -> Self {
        let mut directories = Vec::new();

        if let Some(tzdir) = std::env::var_os("TZDIR") {
            let tzdir = PathBuf::from(tzdir);
            debug!("using zoneinfo database at TZDIR={}", tzdir.display());
            directories.push(tzdir);
        }

        directories.extend(ZONEINFO_DIRECTORIES.iter().map(PathBuf::from));

        Self { directories }
    }

    /// Use a single zoneinfo directory
    pub fn from_dir(directory: impl Into<PathBuf>) -> Self {
        Self { directories: vec![directory.into()] }
    }

    /// Returns candidate zoneinfo directories, in search order
    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }
}

impl Default for SystemZoneDatabase {
    fn default() -> Self {
        Self::from_env()
    }
}

impl ZoneDatabase for SystemZoneDatabase {
    fn zones(&self) -> crate::Result<Vec<ZoneDefinition>> {
        for directory in &self.directories {
            if !directory.is_dir() {
                debug!("no zoneinfo database at {}", directory.display());
                continue;
            }

            let mut zones = walk(directory)?;
            if zones.is_empty() {
                return Err(ZoneDatabaseError::Empty(directory.clone()).into());
            }

            zones.sort_by(|x, y| x.id().cmp(y.id()));
            debug!("loaded {} zones from {}", zones.len(), directory.display());
            return Ok(zones);
        }

        warn!("could not find a zoneinfo database at any of the following paths: {:?}", self.directories);
        Err(ZoneDatabaseError::NotFound(self.directories.clone()).into())
    }
}

/// Collect the zone definitions of every readable TZif file below `start`.
///
/// Unreadable or corrupt files are logged and skipped.
///
fn walk(start: &Path) -> io::Result<Vec<ZoneDefinition>> {
    let mut zones = Vec::new();

    let mut stack = vec![start.to_path_buf()];
    while let Some(directory) = stack.pop() {
        let read_dir = match fs::read_dir(&directory) {
            Ok(read_dir) => read_dir,
            Err(err) if directory == start => return Err(err),
            Err(_err) => {
                warn!("error when reading {} as a directory: {_err}", directory.display());
                continue;
            }
        };

        for entry in read_dir {
            let entry = match entry {
                Ok(entry) => entry,
                Err(_err) => {
                    warn!("error when reading directory entry from {}: {_err}", directory.display());
                    continue;
                }
            };

            let path = entry.path();

            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(_err) => {
                    warn!("error when reading file type of {}: {_err}", path.display());
                    continue;
                }
            };

            if file_type.is_dir() {
                let is_duplicate = directory == start && DUPLICATE_DIRECTORIES.iter().any(|name| entry.file_name() == *name);
                if !is_duplicate {
                    stack.push(path);
                }
                continue;
            }

            if directory == start && NON_ZONE_FILES.iter().any(|name| entry.file_name() == *name) {
                trace!("skipping {} since it is not a zone", path.display());
                continue;
            }

            let Some(id) = zone_id(start, &path) else {
                debug!("skipping {} since its name is not valid UTF-8", path.display());
                continue;
            };

            match read_zone(&path, &id) {
                Ok(Some(zone)) => zones.push(zone),
                Ok(None) => {
                    trace!("skipping {} since it is not a TZif file", path.display());
                }
                Err(_err) => {
                    warn!("skipping {}: {_err}", path.display());
                }
            }
        }
    }

    Ok(zones)
}

/// Zone identifier of a file, as its `/`-separated path relative to the zoneinfo directory
fn zone_id(start: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(start).ok()?;

    let components: Option<Vec<&str>> = relative.components().map(|component| component.as_os_str().to_str()).collect();
    Some(components?.join("/"))
}

/// Read a zone definition from a file, or `None` if it is not a TZif file
fn read_zone(path: &Path, id: &str) -> crate::Result<Option<ZoneDefinition>> {
    let mut bytes = Vec::new();
    File::open(path)?.read_to_end(&mut bytes)?;

    if !bytes.starts_with(b"TZif") {
        return Ok(None);
    }

    let time_zone = TimeZone::from_tz_data(&bytes)?;
    Ok(Some(ZoneDefinition::from_time_zone(id, &time_zone)?))
}
