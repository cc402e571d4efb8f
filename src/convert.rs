use crate::encoder::IconEncoder;
use crate::source::read_png;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::fs;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

//===========================================================================//

/// An error from converting PNG files to ICO files, tagged with the file and
/// the stage that failed.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// The source file couldn't be read or isn't a supported PNG.
    #[error("failed to decode {path:?}: {source}")]
    Decode {
        /// The source file.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// The decoded image couldn't be encoded as an ICO file.
    #[error("failed to encode {path:?}: {source}")]
    Encode {
        /// The source file.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// The ICO file couldn't be written.
    #[error("failed to write {path:?}: {source}")]
    Write {
        /// The output file.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// The input directory couldn't be listed.
    #[error("failed to list {path:?}: {source}")]
    ListDir {
        /// The input directory.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// The output directory couldn't be created.
    #[error("failed to create {path:?}: {source}")]
    CreateDir {
        /// The output directory.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// Another source file in the same batch already produced this output.
    #[error("skipped {path:?}: {output:?} was already written in this batch")]
    DuplicateOutput {
        /// The source file that was skipped.
        path: PathBuf,
        /// The output file both sources map to.
        output: PathBuf,
    },
}

//===========================================================================//

/// Converts one PNG file into an ICO file.
///
/// The whole ICO file is built in memory, written to a temporary file next
/// to `output`, and then renamed into place, so a failed conversion never
/// leaves a partial file at `output`.
pub fn convert_file(
    input: &Path,
    output: &Path,
    encoder: &IconEncoder,
) -> Result<(), ConvertError> {
    let source = fs::File::open(input)
        .and_then(|file| read_png(BufReader::new(file)))
        .map_err(|source| ConvertError::Decode {
            path: input.to_path_buf(),
            source,
        })?;
    debug!(
        "Decoded {:?} ({}x{})",
        input,
        source.width(),
        source.height()
    );
    let data = encoder.assemble(&source).map_err(|source| {
        ConvertError::Encode { path: input.to_path_buf(), source }
    })?;
    write_atomically(output, &data).map_err(|source| ConvertError::Write {
        path: output.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn write_atomically(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut temp_name = path.as_os_str().to_os_string();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);
    let result = fs::write(&temp_path, data)
        .and_then(|()| fs::rename(&temp_path, path));
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

//===========================================================================//

/// The outcome of converting a directory of PNG files.
#[derive(Debug, Default)]
pub struct BatchReport {
    converted: Vec<PathBuf>,
    failed: Vec<ConvertError>,
}

impl BatchReport {
    /// Returns the ICO files that were written.
    pub fn converted(&self) -> &[PathBuf] {
        &self.converted
    }

    /// Returns the errors for files that couldn't be converted.
    pub fn failed(&self) -> &[ConvertError] {
        &self.failed
    }
}

/// Converts every `*.png` file in `input_dir` into `<name>.ico` in
/// `output_dir`, creating `output_dir` if needed.
///
/// Files are processed in sorted order.  A failure to convert one file is
/// logged and recorded in the report, and the remaining files are still
/// converted; only failing to list `input_dir` or create `output_dir` aborts
/// the batch.  When two sources map to the same output name (for example
/// `a.PNG` and `a.png`), the first one converted wins and the later one is
/// reported as a `DuplicateOutput` failure.
pub fn convert_dir(
    input_dir: &Path,
    output_dir: &Path,
    encoder: &IconEncoder,
) -> Result<BatchReport, ConvertError> {
    let inputs = list_png_files(input_dir).map_err(|source| {
        ConvertError::ListDir { path: input_dir.to_path_buf(), source }
    })?;
    fs::create_dir_all(output_dir).map_err(|source| {
        ConvertError::CreateDir { path: output_dir.to_path_buf(), source }
    })?;
    if inputs.is_empty() {
        warn!("No PNG files found in {:?}", input_dir);
    }
    let mut report = BatchReport::default();
    let mut written = HashSet::<PathBuf>::new();
    for input in inputs {
        let mut name = input.file_stem().unwrap_or_default().to_os_string();
        name.push(".ico");
        let output = output_dir.join(name);
        if written.contains(&output) {
            let error = ConvertError::DuplicateOutput { path: input, output };
            warn!("{}", error);
            report.failed.push(error);
            continue;
        }
        info!("Processing {:?}", input);
        match convert_file(&input, &output, encoder) {
            Ok(()) => {
                info!("Created {:?}", output);
                written.insert(output.clone());
                report.converted.push(output);
            }
            Err(error) => {
                warn!("{}", error);
                report.failed.push(error);
            }
        }
    }
    Ok(report)
}

fn list_png_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_png = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("png"));
        if is_png && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

//===========================================================================//
