//! drawio-libgen - build draw.io shape libraries from folders of SVG icons
//!
//! The input root holds one folder per style, optionally split into one
//! folder per subvariant. Every folder of icons becomes one library file.
//!
//! # Example
//!
//! ```no_run
//! use drawio_libgen::{generate_libraries, Config};
//!
//! let config = Config::new().with_input("svg").with_output("libraries");
//! let written = generate_libraries(&config, |context| {
//!     println!("Generating library for {}", context.library_name());
//! })
//! .unwrap();
//! assert!(!written.is_empty());
//! ```

pub mod config;
pub mod converter;
pub mod error;
pub mod library;
pub mod title;
pub mod walker;

use std::path::PathBuf;

use thiserror::Error;

pub use config::{Config, ConfigError, TitleRule};
pub use converter::{convert_svg, ImageRecord};
pub use error::ConvertError;
pub use library::{render_library, write_library};
pub use title::derive_title;
pub use walker::{discover, discover_groups, Discovery, LibraryGroup, StyleContext};

/// Errors that can occur during a generation run
#[derive(Debug, Error)]
pub enum LibraryError {
    /// A library group failed to convert or write
    #[error("library '{library}': {source}")]
    Group {
        library: String,
        #[source]
        source: ConvertError,
    },

    /// The input or output root could not be used
    #[error(transparent)]
    Setup(#[from] ConvertError),
}

impl LibraryError {
    /// The underlying conversion error
    pub fn convert_error(&self) -> &ConvertError {
        match self {
            LibraryError::Group { source, .. } => source,
            LibraryError::Setup(source) => source,
        }
    }
}

/// Generate one library per style/subvariant group
///
/// `on_group` is called before each group is processed. Returns the paths
/// of the written library files, in processing order. The first error
/// aborts the run.
pub fn generate_libraries(
    config: &Config,
    mut on_group: impl FnMut(&StyleContext),
) -> Result<Vec<PathBuf>, LibraryError> {
    library::ensure_output_dir(&config.output)?;

    let groups = discover_groups(&config.input)?;
    log::info!(
        "found {} library group(s) under '{}'",
        groups.len(),
        config.input.display()
    );

    let mut written = Vec::with_capacity(groups.len());
    for group in &groups {
        on_group(&group.context);
        let path = generate_library(group, config).map_err(|source| LibraryError::Group {
            library: group.context.library_name(),
            source,
        })?;
        written.push(path);
    }

    Ok(written)
}

/// Convert every SVG of one group and write its library file
pub fn generate_library(group: &LibraryGroup, config: &Config) -> Result<PathBuf, ConvertError> {
    let records = walker::svg_files(&group.dir)?
        .iter()
        .map(|path| convert_svg(path, &group.context, config))
        .collect::<Result<Vec<_>, _>>()?;

    let name = group.context.library_name();
    let path = write_library(&records, &name, &config.output)?;
    log::info!("wrote {} icon(s) to '{}'", records.len(), path.display());
    Ok(path)
}
