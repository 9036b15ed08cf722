//! Writing of DICOM slices from a NIfTI voxel array.
//!
//! [`write_slice`] produces one Part 10 file for one slice of the volume.
//! [`write_series`] drives it over every slice of a [`SeriesTemplate`],
//! either sequentially or on the rayon thread pool.
use std::path::{Path, PathBuf};

use dicom::core::{DataElement, PrimitiveValue, VR};
use dicom::object::{FileMetaTableBuilder, WithMetaError, WriteError};
use dicom_dictionary_std::{tags, uids};
use ndarray::{ArrayD, ArrayView2, Axis, Ix2, ShapeError};
use rayon::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::attributes::{put_str, read_str, read_u16};
use crate::enums::RtUidPolicy;
use crate::object::{DicomObject, SeriesTemplate};
use crate::parameters::NiftiParameters;
use crate::transfer::{TransferError, transfer_nii_hdr_instance_tags};
use crate::uid::generate_uid;

/// SOP Instance UID stamped on every RT output under [`RtUidPolicy::Legacy`].
pub const LEGACY_RT_SOP_INSTANCE_UID: &str =
    "1.2.410.200113.1.963357531907.20231031143352369568.2784";
/// Series Instance UID stamped on every RT output under [`RtUidPolicy::Legacy`].
pub const LEGACY_RT_SERIES_INSTANCE_UID: &str =
    "1.2.410.200113.1.963357531907.20231031143352369568.2784.1";

const RT_FILE_PREFIX: &str = "rt_";

#[derive(Debug, Error)]
pub enum WriteSliceError {
    #[error("slice index {index} is out of range for {len} slices")]
    SliceIndexOutOfRange { index: usize, len: usize },
    #[error("expected a 3D or 4D pixel array, got {0} dimensions")]
    UnsupportedDimensionality(usize),
    #[error("slice plane is {found:?} but the data set declares {expected:?} (rows, columns)")]
    PlaneShapeMismatch {
        expected: (u16, u16),
        found: (usize, usize),
    },
    #[error("unsupported Bits Allocated value {0}")]
    UnsupportedBitsAllocated(u16),
    #[error("data set has no {0} value")]
    MissingAttribute(&'static str),
    #[error("Shape error: {0}")]
    Shape(#[from] ShapeError),
    #[error("could not build file meta table: {0}")]
    Meta(#[from] WithMetaError),
    #[error("could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: WriteError,
    },
}

#[derive(Debug, Error)]
pub enum SeriesWriteError {
    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),
    #[error("Write error: {0}")]
    Write(#[from] WriteSliceError),
}

/// Identifiers stamped onto slices written as RT structure outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtStructure {
    policy: RtUidPolicy,
    series_instance_uid: String,
}

impl RtStructure {
    pub fn new(policy: RtUidPolicy) -> Self {
        let series_instance_uid = match policy {
            RtUidPolicy::Fresh => generate_uid(),
            RtUidPolicy::Legacy => LEGACY_RT_SERIES_INSTANCE_UID.to_string(),
        };
        Self {
            policy,
            series_instance_uid,
        }
    }

    pub fn policy(&self) -> RtUidPolicy {
        self.policy
    }

    pub fn series_instance_uid(&self) -> &str {
        &self.series_instance_uid
    }

    fn sop_instance_uid(&self) -> String {
        match self.policy {
            RtUidPolicy::Fresh => generate_uid(),
            RtUidPolicy::Legacy => LEGACY_RT_SOP_INSTANCE_UID.to_string(),
        }
    }
}

/// Name of the file holding slice `index` (zero based).
pub fn slice_file_name(output_name: &str, index: usize, rt_structure: bool) -> String {
    let name = format!("{output_name}_{:04}.dcm", index + 1);
    if rt_structure {
        format!("{RT_FILE_PREFIX}{name}")
    } else {
        name
    }
}

/// Write slice `index` of `img` as one DICOM file in `output_dir`.
///
/// The slice plane is `img[:, :, index]`, or `img[:, :, index, 0]` for 4D
/// arrays. The data set receives a fresh SOP Instance UID, the encoded pixel
/// data and the patient name and ID. When `rt` is given the slice is stamped
/// as an RT structure set and the file name gets an `rt_` prefix.
///
/// # Arguments
///
/// * `dcm` - Data set of this slice, with instance tags already applied.
/// * `img` - Voxel array with axes `[X, Y, Z]` or `[X, Y, Z, T]`.
/// * `index` - Zero based slice index.
/// * `output_dir` - Existing directory to write into.
/// * `output_name` - Base file name, also used as the Patient ID.
/// * `patient_name` - Patient Name to record.
/// * `rt` - RT structure identifiers, if the slice is an RT output.
///
/// # Errors
///
/// Returns an error if the slice does not exist in `img`, if the plane does
/// not match the declared Rows and Columns, if the data set's pixel layout is
/// unsupported, or if the file cannot be written.
pub fn write_slice(
    dcm: &mut DicomObject,
    img: &ArrayD<f32>,
    index: usize,
    output_dir: &Path,
    output_name: &str,
    patient_name: &str,
    rt: Option<&RtStructure>,
) -> Result<PathBuf, WriteSliceError> {
    let plane = select_plane(img, index)?;
    let ds = dcm.dataset_mut();

    if let (Some(rows), Some(columns)) = (read_u16(ds, tags::ROWS), read_u16(ds, tags::COLUMNS)) {
        if plane.dim() != (rows as usize, columns as usize) {
            return Err(WriteSliceError::PlaneShapeMismatch {
                expected: (rows, columns),
                found: plane.dim(),
            });
        }
    }

    put_str(ds, tags::SOP_INSTANCE_UID, VR::UI, generate_uid());

    let bits_allocated = read_u16(ds, tags::BITS_ALLOCATED)
        .ok_or(WriteSliceError::MissingAttribute("BitsAllocated"))?;
    let pixel_representation = read_u16(ds, tags::PIXEL_REPRESENTATION).unwrap_or(0);
    let (vr, bytes) = encode_plane(plane, bits_allocated, pixel_representation)?;
    ds.put(DataElement::new(
        tags::PIXEL_DATA,
        vr,
        PrimitiveValue::from(bytes),
    ));

    put_str(ds, tags::PATIENT_NAME, VR::PN, patient_name);
    put_str(ds, tags::PATIENT_ID, VR::LO, output_name);

    if let Some(rt) = rt {
        put_str(ds, tags::MODALITY, VR::CS, "RTSTRUCT");
        put_str(ds, tags::SOP_CLASS_UID, VR::UI, uids::RT_STRUCTURE_SET_STORAGE);
        put_str(ds, tags::SOP_INSTANCE_UID, VR::UI, rt.sop_instance_uid());
        put_str(ds, tags::SERIES_INSTANCE_UID, VR::UI, rt.series_instance_uid());
    }

    let path = output_dir.join(slice_file_name(output_name, index, rt.is_some()));
    let sop_class_uid = read_str(ds, tags::SOP_CLASS_UID)
        .ok_or(WriteSliceError::MissingAttribute("SOPClassUID"))?;
    let sop_instance_uid = read_str(ds, tags::SOP_INSTANCE_UID)
        .ok_or(WriteSliceError::MissingAttribute("SOPInstanceUID"))?;

    let file = ds.clone().with_meta(
        FileMetaTableBuilder::new()
            .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
            .media_storage_sop_class_uid(sop_class_uid)
            .media_storage_sop_instance_uid(sop_instance_uid),
    )?;
    file.write_to_file(&path)
        .map_err(|source| WriteSliceError::Write {
            path: path.clone(),
            source,
        })?;

    debug!(path = %path.display(), "wrote slice {}", index + 1);
    Ok(path)
}

/// Number of slices along the third axis of a 3D or 4D array.
fn slice_count(img: &ArrayD<f32>) -> Result<usize, WriteSliceError> {
    match img.ndim() {
        3 | 4 => Ok(img.len_of(Axis(2))),
        n => Err(WriteSliceError::UnsupportedDimensionality(n)),
    }
}

fn select_plane(img: &ArrayD<f32>, index: usize) -> Result<ArrayView2<'_, f32>, WriteSliceError> {
    let len = slice_count(img)?;
    let volume = if img.ndim() == 4 {
        img.index_axis(Axis(3), 0)
    } else {
        img.view()
    };
    if index >= len {
        return Err(WriteSliceError::SliceIndexOutOfRange { index, len });
    }
    Ok(volume
        .index_axis_move(Axis(2), index)
        .into_dimensionality::<Ix2>()?)
}

/// Encode a plane in row major order as little endian pixel data.
///
/// Values are rounded and saturated to the range of the stored type.
fn encode_plane(
    plane: ArrayView2<'_, f32>,
    bits_allocated: u16,
    pixel_representation: u16,
) -> Result<(VR, Vec<u8>), WriteSliceError> {
    match (bits_allocated, pixel_representation) {
        (8, _) => {
            let mut bytes: Vec<u8> = plane.iter().map(|&v| v.round() as u8).collect();
            // OB values have even length
            if bytes.len() % 2 == 1 {
                bytes.push(0);
            }
            Ok((VR::OB, bytes))
        }
        (16, 0) => Ok((
            VR::OW,
            plane
                .iter()
                .flat_map(|&v| (v.round() as u16).to_le_bytes())
                .collect(),
        )),
        (16, _) => Ok((
            VR::OW,
            plane
                .iter()
                .flat_map(|&v| (v.round() as i16).to_le_bytes())
                .collect(),
        )),
        (bits, _) => Err(WriteSliceError::UnsupportedBitsAllocated(bits)),
    }
}

/// Where and how a series is written.
#[derive(Debug, Clone)]
pub struct SeriesOutput<'a> {
    pub output_dir: &'a Path,
    pub output_name: &'a str,
    pub patient_name: &'a str,
    pub rt_structure: Option<&'a RtStructure>,
    pub parallel: bool,
}

/// Write every slice of `img` from copies of `template`.
///
/// Each slice gets its own copy of the template, its instance tags and its
/// own SOP Instance UID. Every slice along the third axis of `img` is
/// written. Returns the written paths in slice order.
///
/// # Errors
///
/// Stops at the first slice that fails, including a slice with no entry in
/// the per slice sequences of `params`. Files already written are left on
/// disk.
pub fn write_series(
    template: &SeriesTemplate,
    params: &NiftiParameters,
    img: &ArrayD<f32>,
    output: &SeriesOutput<'_>,
) -> Result<Vec<PathBuf>, SeriesWriteError> {
    let write_one = |index: usize| -> Result<PathBuf, SeriesWriteError> {
        let mut dcm = template.instance();
        transfer_nii_hdr_instance_tags(&mut dcm, params, index)?;
        Ok(write_slice(
            &mut dcm,
            img,
            index,
            output.output_dir,
            output.output_name,
            output.patient_name,
            output.rt_structure,
        )?)
    };

    let count = slice_count(img)?;
    if output.parallel {
        (0..count).into_par_iter().map(write_one).collect()
    } else {
        (0..count).map(write_one).collect()
    }
}
