//! Font discovery for report rendering.
//!
//! `genpdf` needs a TrueType family on disk. The bundled family is looked up in, in order:
//! an explicit directory, `CAFE_REPORT_FONTS_DIR`, `assets/fonts` beside the executable and the
//! crate's own `assets/fonts`. When none of them holds the full family, well-known system
//! locations of Liberation Sans are tried.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::Error;
use genpdf::fonts::{self, FontData, FontFamily};
use log::{debug, warn};

/// Name of the bundled font family.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "Roboto";

/// Environment variable pointing at a directory with the bundled family.
pub const FONTS_DIR_ENV: &str = "CAFE_REPORT_FONTS_DIR";

const STYLE_SUFFIXES: &[&str] = &["Regular", "Bold", "Italic", "BoldItalic"];

const SYSTEM_FALLBACK_FAMILY: &str = "LiberationSans";

const SYSTEM_FALLBACK_DIRS: &[&str] = &[
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/truetype/liberation2",
    "/usr/share/fonts/liberation-sans",
    "/usr/share/fonts/liberation",
];

/// Directories searched for the bundled family, most specific first.
fn bundled_candidates(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    let mut add = |path: PathBuf| {
        if !path.as_os_str().is_empty() && !candidates.contains(&path) {
            candidates.push(path);
        }
    };

    if let Some(dir) = explicit {
        add(dir.to_path_buf());
    }
    if let Some(dir) = env::var_os(FONTS_DIR_ENV) {
        add(PathBuf::from(dir));
    }
    if let Some(bin_dir) = env::current_exe().ok().as_deref().and_then(Path::parent) {
        add(bin_dir.join("assets/fonts"));
    }
    add(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts"));
    candidates
}

fn family_files(dir: &Path, family: &str) -> Vec<PathBuf> {
    STYLE_SUFFIXES
        .iter()
        .map(|suffix| dir.join(format!("{}-{}.ttf", family, suffix)))
        .collect()
}

fn has_family(dir: &Path, family: &str) -> bool {
    dir.is_dir() && family_files(dir, family).iter().all(|f| f.is_file())
}

/// First directory holding all four styles of a family, with the family name.
fn resolve_font_directory(explicit: Option<&Path>) -> Result<(PathBuf, &'static str), Error> {
    let bundled = bundled_candidates(explicit);
    if let Some(dir) = bundled.iter().find(|d| has_family(d, DEFAULT_FONT_FAMILY_NAME)) {
        return Ok((dir.clone(), DEFAULT_FONT_FAMILY_NAME));
    }

    if let Some(dir) = SYSTEM_FALLBACK_DIRS
        .iter()
        .map(PathBuf::from)
        .find(|d| has_family(d, SYSTEM_FALLBACK_FAMILY))
    {
        warn!(
            "Bundled '{}' fonts not found; falling back to '{}' in {}",
            DEFAULT_FONT_FAMILY_NAME,
            SYSTEM_FALLBACK_FAMILY,
            dir.display()
        );
        return Ok((dir, SYSTEM_FALLBACK_FAMILY));
    }

    let checked = bundled
        .iter()
        .map(|d| d.display().to_string())
        .chain(SYSTEM_FALLBACK_DIRS.iter().map(|d| d.to_string()))
        .collect::<Vec<_>>()
        .join(", ");
    Err(Error::new(
        format!(
            "No usable font family found. Checked: {}. Set {} to a directory with {}-Regular.ttf, -Bold.ttf, -Italic.ttf and -BoldItalic.ttf.",
            checked, FONTS_DIR_ENV, DEFAULT_FONT_FAMILY_NAME
        ),
        io::Error::new(io::ErrorKind::NotFound, "font family not found"),
    ))
}

/// Loads the report font family, searching `explicit` first.
pub fn default_font_family(explicit: Option<&Path>) -> Result<FontFamily<FontData>, Error> {
    let (dir, family) = resolve_font_directory(explicit)?;
    debug!("Loading font family '{}' from {}", family, dir.display());
    fonts::from_files(&dir, family, None).map_err(|err| {
        Error::new(
            format!(
                "Failed to load font family '{}' from {}: {}",
                family,
                dir.display(),
                err
            ),
            io::Error::new(io::ErrorKind::Other, err.to_string()),
        )
    })
}

/// Whether a font family can be found without loading it.
pub fn fonts_available(explicit: Option<&Path>) -> bool {
    resolve_font_directory(explicit).is_ok()
}
