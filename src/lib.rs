//! # nii2dcm library
//!
//! This crate converts NIfTI-1 volumes (`.nii`, `.nii.gz`) into series of
//! single-frame DICOM files, one file per axial slice.
//!
//! This library is built on the dicom-rs ecosystem. A series template is
//! composed from the IOD modules of the chosen modality (MR or CT), the
//! series level attributes derived from the NIfTI header are transferred
//! onto it, and every slice is then written from an independent copy of the
//! template with its own SOP Instance UID, Instance Number and position.
//! Slices can be written in parallel using rayon.
//!
//! Optionally, patient, study and equipment attributes are copied from a
//! reference DICOM file, and slices can be tagged as an RT Structure Set so
//! they are picked up as contours by planning systems.
//!
//! Inputs are assumed to have the following properties:
//!  - Single-file NIfTI-1 (`n+1` magic)
//!  - Three dimensions, or four of which only the first volume is used
//!  - Slices along the third axis
//!
//! # Examples
//!
//! ## Converting a NIfTI file into an MR series
//!
//! Write every axial slice of `sub-01_T1w.nii.gz` as a DICOM file into
//! `dicom/`, in parallel.
//!
//! ```no_run
//! # use nii2dcm::{ConversionOptions, DicomType, run_nii2dcm};
//! # use std::path::{Path, PathBuf};
//! let options = ConversionOptions {
//!     output_dir: Some(PathBuf::from("dicom")),
//!     dicom_type: DicomType::Mr,
//!     parallel: true,
//!     ..Default::default()
//! };
//! let summary = run_nii2dcm(Path::new("sub-01_T1w.nii.gz"), &options)
//!     .expect("should have converted the volume");
//! println!("wrote {} slices", summary.files.len());
//! ```

pub mod attributes;
pub mod conversion;
pub mod enums;
pub mod modules;
pub mod nifti;
pub mod object;
pub mod parameters;
pub mod transfer;
pub mod uid;
pub mod writer;

pub use conversion::{ConversionError, ConversionOptions, ConversionSummary, run_nii2dcm};
pub use enums::{DicomType, RtUidPolicy};
pub use object::{DicomObject, SeriesTemplate};
pub use writer::{RtStructure, write_series, write_slice};
