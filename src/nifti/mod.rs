//! Reading of NIfTI-1 volumes (`.nii`, `.nii.gz`).
use ndarray::ShapeError;
use thiserror::Error;

mod header;
mod loader;

pub use header::{DataType, NiftiHeader};
pub use loader::{NiftiLoader, NiftiVolume};

#[derive(Debug, Error)]
pub enum NiftiLoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("header is {0} bytes, expected at least 348")]
    HeaderTooShort(usize),

    #[error("not a single-file NIfTI-1 image (magic {0:?})")]
    InvalidMagic([u8; 4]),

    #[error("unsupported NIfTI datatype code {0}")]
    UnsupportedDataType(i16),

    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("voxel data truncated: expected {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("dimension {axis} has size {size}, which does not fit a DICOM US value")]
    DimensionTooLarge { axis: usize, size: usize },

    #[error("Shape error: {0}")]
    Shape(#[from] ShapeError),
}
