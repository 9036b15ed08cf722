//! End-to-end conversion of NIfTI files into DICOM series.
use std::{
    fs,
    path::{Path, PathBuf},
};

use dicom::object::{InMemDicomObject, ReadError, open_file};
use ndarray::ArrayD;
use thiserror::Error;
use tracing::{debug, info};

use crate::enums::{DicomType, RtUidPolicy};
use crate::modules::CompositionContext;
use crate::nifti::{NiftiLoader, NiftiLoaderError};
use crate::object::DicomObject;
use crate::parameters::NiftiParameters;
use crate::transfer::{
    ReferenceTransferReport, transfer_nii_hdr_series_tags, transfer_ref_dicom_series_tags,
};
use crate::writer::{RtStructure, SeriesOutput, SeriesWriteError, write_series};

const NIFTI_SUFFIX: &str = ".nii";

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("input path {} does not exist", .0.display())]
    InputNotFound(PathBuf),

    #[error("no .nii or .nii.gz files found in {}", .0.display())]
    NoInputs(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("NIfTI error: {0}")]
    Nifti(#[from] NiftiLoaderError),

    #[error("could not read reference DICOM {}: {source}", path.display())]
    Reference {
        path: PathBuf,
        #[source]
        source: ReadError,
    },

    #[error("Series error: {0}")]
    Series(#[from] SeriesWriteError),
}

/// Options of a conversion run.
#[derive(Debug, Clone, Default)]
pub struct ConversionOptions {
    /// Output directory, by default the input path without its `.nii*` suffix.
    pub output_dir: Option<PathBuf>,
    pub dicom_type: DicomType,
    /// Patient Name, by default the output directory name.
    pub patient_name: Option<String>,
    /// DICOM file whose patient, study and equipment attributes are copied.
    pub reference_dicom: Option<PathBuf>,
    pub rt_structure: bool,
    pub rt_uid_policy: RtUidPolicy,
    /// Write slices on the rayon thread pool.
    pub parallel: bool,
}

/// Result of converting one volume.
#[derive(Debug, Clone)]
pub struct ConversionSummary {
    pub output_dir: PathBuf,
    /// Written files, in slice order.
    pub files: Vec<PathBuf>,
    /// Outcome of the reference transfer, if a reference was given.
    pub reference: Option<ReferenceTransferReport>,
}

/// Text before the first `.nii` in `name`.
pub fn strip_nifti_suffix(name: &str) -> &str {
    name.split(NIFTI_SUFFIX).next().unwrap_or(name)
}

/// Base name of the slice files, and Patient ID, for an input file.
pub fn output_name(input: &Path) -> String {
    let file_name = input
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    strip_nifti_suffix(&file_name).to_string()
}

/// Output directory used when none is configured: the input path without
/// its `.nii*` suffix.
pub fn default_output_dir(input: &Path) -> PathBuf {
    input.with_file_name(output_name(input))
}

/// Patient Name used when none is configured.
pub fn default_patient_name(output_dir: &Path) -> String {
    let stem = output_dir
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();
    strip_nifti_suffix(&stem).to_string()
}

/// NIfTI files named by `input`: the file itself, or every `*.nii.gz` and
/// `*.nii` file of a directory, sorted by path.
///
/// # Errors
///
/// Returns error if `input` does not exist, cannot be listed, or is a
/// directory without NIfTI files
pub fn collect_inputs(input: &Path) -> Result<Vec<PathBuf>, ConversionError> {
    if !input.exists() {
        return Err(ConversionError::InputNotFound(input.to_path_buf()));
    }
    if !input.is_dir() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut files: Vec<PathBuf> = fs::read_dir(input)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_nifti_file(path))
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(ConversionError::NoInputs(input.to_path_buf()));
    }
    Ok(files)
}

fn is_nifti_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(".nii.gz") || name.ends_with(".nii"))
}

/// Convert one NIfTI file into a DICOM series.
///
/// # Arguments
///
/// * `input` - Path of the `.nii` or `.nii.gz` file
/// * `options` - Output location, modality and optional features
///
/// # Errors
///
/// Returns error if the NIfTI or reference file cannot be read, or if any
/// slice cannot be written. Slices written before the failure stay on disk.
pub fn run_nii2dcm(
    input: &Path,
    options: &ConversionOptions,
) -> Result<ConversionSummary, ConversionError> {
    let volume = NiftiLoader::load(input)?;
    debug!(
        input = %input.display(),
        shape = ?volume.data.shape(),
        "loaded NIfTI volume"
    );

    let output_dir = options
        .output_dir
        .clone()
        .unwrap_or_else(|| default_output_dir(input));
    fs::create_dir_all(&output_dir)?;

    let patient_name = match &options.patient_name {
        Some(name) => strip_nifti_suffix(name).to_string(),
        None => default_patient_name(&output_dir),
    };

    let reference = options
        .reference_dicom
        .as_deref()
        .map(|path| {
            open_file(path).map_err(|source| ConversionError::Reference {
                path: path.to_path_buf(),
                source,
            })
        })
        .transpose()?;

    let rt_structure = options
        .rt_structure
        .then(|| RtStructure::new(options.rt_uid_policy));
    let output_name = output_name(input);
    let output = SeriesOutput {
        output_dir: &output_dir,
        output_name: &output_name,
        patient_name: &patient_name,
        rt_structure: rt_structure.as_ref(),
        parallel: options.parallel,
    };

    let (files, reference) = convert_volume(
        &volume.data,
        &volume.parameters,
        options.dicom_type,
        reference.as_deref(),
        &output,
    )?;

    info!(
        input = %input.display(),
        output_dir = %output_dir.display(),
        modality = %options.dicom_type,
        "wrote {} slices",
        files.len()
    );
    Ok(ConversionSummary {
        output_dir,
        files,
        reference,
    })
}

/// Compose, transfer and write the series for an already loaded volume.
///
/// # Errors
///
/// Returns error if any slice cannot be written
pub fn convert_volume(
    data: &ArrayD<f32>,
    params: &NiftiParameters,
    dicom_type: DicomType,
    reference: Option<&InMemDicomObject>,
    output: &SeriesOutput<'_>,
) -> Result<(Vec<PathBuf>, Option<ReferenceTransferReport>), ConversionError> {
    let ctx = CompositionContext::new(dicom_type);
    let mut dcm = DicomObject::with_context(&ctx);

    transfer_nii_hdr_series_tags(&mut dcm, params);
    let report = reference.map(|reference| transfer_ref_dicom_series_tags(&mut dcm, reference));

    let template = dcm.into_template();
    let files = write_series(&template, params, data, output)?;
    Ok((files, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_drop_the_nifti_suffix() {
        assert_eq!(output_name(Path::new("/data/sub-01_T1w.nii.gz")), "sub-01_T1w");
        assert_eq!(output_name(Path::new("scan.nii")), "scan");
        assert_eq!(
            default_output_dir(Path::new("/data/sub-01_T1w.nii.gz")),
            PathBuf::from("/data/sub-01_T1w")
        );
        assert_eq!(default_patient_name(Path::new("/out/sub-01.nii.gz")), "sub-01");
        assert_eq!(strip_nifti_suffix("Doe.nii"), "Doe");
        assert_eq!(strip_nifti_suffix("Doe"), "Doe");
    }

    #[test]
    fn directories_yield_sorted_nifti_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.nii.gz", "a.nii", "notes.txt", "c.nii.gz.bak"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        let inputs = collect_inputs(dir.path()).unwrap();
        let names: Vec<_> = inputs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.nii", "b.nii.gz"]);
    }

    #[test]
    fn missing_and_empty_inputs_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            collect_inputs(&dir.path().join("missing.nii")),
            Err(ConversionError::InputNotFound(_))
        ));
        assert!(matches!(
            collect_inputs(dir.path()),
            Err(ConversionError::NoInputs(_))
        ));
    }
}
