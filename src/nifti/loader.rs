use std::{
    fs::{self, File},
    io::{BufReader, Read},
    path::Path,
};

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use flate2::bufread::MultiGzDecoder;
use ndarray::{ArrayD, IxDyn, ShapeBuilder};
use tracing::debug;

use super::{DataType, NiftiHeader, NiftiLoaderError};
use crate::parameters::NiftiParameters;

/// A decoded NIfTI volume with its DICOM geometry.
#[derive(Debug, Clone)]
pub struct NiftiVolume {
    pub header: NiftiHeader,
    /// Scaled voxel values, axes `[X, Y, Z]` or `[X, Y, Z, T]`.
    pub data: ArrayD<f32>,
    pub parameters: NiftiParameters,
}

pub struct NiftiLoader;

impl NiftiLoader {
    /// Load a volume from a `.nii` or `.nii.gz` file
    ///
    /// # Arguments
    ///
    /// * `path` - Path of the NIfTI file, gzip compressed if it ends in `.gz`
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, is not a single-file NIfTI-1
    /// image, or is not a non-empty 3D or 4D volume
    pub fn load(path: &Path) -> Result<NiftiVolume, NiftiLoaderError> {
        let bytes = Self::read_bytes(path)?;
        debug!(path = %path.display(), bytes = bytes.len(), "read NIfTI file");
        Self::from_bytes(&bytes)
    }

    /// Decode a volume from the uncompressed contents of a NIfTI file.
    ///
    /// # Errors
    ///
    /// See [`NiftiLoader::load`].
    pub fn from_bytes(bytes: &[u8]) -> Result<NiftiVolume, NiftiLoaderError> {
        let header = NiftiHeader::from_bytes(bytes)?;
        let data = Self::decode_voxels(&header, bytes)?;
        let parameters = Self::parameters(&header, &data)?;
        Ok(NiftiVolume {
            header,
            data,
            parameters,
        })
    }

    fn read_bytes(path: &Path) -> Result<Vec<u8>, NiftiLoaderError> {
        if path.extension().is_some_and(|e| e == "gz") {
            let mut decoder = MultiGzDecoder::new(BufReader::new(File::open(path)?));
            let mut bytes = Vec::new();
            decoder.read_to_end(&mut bytes)?;
            Ok(bytes)
        } else {
            Ok(fs::read(path)?)
        }
    }

    /// Decode the voxel data into an array indexed `[x, y, z(, t)]`, with
    /// `scl_slope` and `scl_inter` applied.
    ///
    /// # Errors
    ///
    /// Returns error if the volume is not 3D or 4D, is empty, or the data is
    /// shorter than the header declares
    pub fn decode_voxels(
        header: &NiftiHeader,
        bytes: &[u8],
    ) -> Result<ArrayD<f32>, NiftiLoaderError> {
        let shape = header.shape();
        if !(3..=4).contains(&shape.len()) {
            return Err(NiftiLoaderError::InvalidDimensions(format!(
                "expected a 3D or 4D volume, got {} dimensions",
                shape.len()
            )));
        }
        if shape.contains(&0) {
            return Err(NiftiLoaderError::InvalidDimensions(format!(
                "volume of shape {shape:?} is empty"
            )));
        }

        let start = header.vox_offset;
        let expected = header.data_size();
        let raw = bytes
            .get(start..start + expected)
            .ok_or(NiftiLoaderError::Truncated {
                expected,
                found: bytes.len().saturating_sub(start),
            })?;

        let values = if header.little_endian {
            decode::<LittleEndian>(raw, header.datatype)
        } else {
            decode::<BigEndian>(raw, header.datatype)
        };

        // voxel data is stored with the first axis varying fastest
        let mut data = ArrayD::from_shape_vec(IxDyn(&shape).f(), values)?;

        let (slope, inter) = (header.scl_slope, header.scl_inter);
        if slope != 0.0 && slope.is_finite() && (slope != 1.0 || inter != 0.0) {
            let (slope, inter) = (slope as f32, inter as f32);
            data.par_mapv_inplace(|v| v * slope + inter);
        }
        Ok(data)
    }

    /// Derive the DICOM geometry and intensity parameters of a volume.
    ///
    /// Rows span the X axis and columns the Y axis. Positions are expressed
    /// in DICOM patient coordinates (LPS).
    ///
    /// # Errors
    ///
    /// Returns error if the in-plane size does not fit a `US` value
    pub fn parameters(
        header: &NiftiHeader,
        data: &ArrayD<f32>,
    ) -> Result<NiftiParameters, NiftiLoaderError> {
        let to_u16 = |axis: usize| {
            u16::try_from(header.dim[axis - 1]).map_err(|_| NiftiLoaderError::DimensionTooLarge {
                axis,
                size: header.dim[axis - 1],
            })
        };
        let rows = to_u16(1)?;
        let columns = to_u16(2)?;
        let slices = header.dim[2];

        let mut affine = header.affine();
        // RAS to LPS
        for row in affine.iter_mut().take(2) {
            for value in row.iter_mut() {
                *value = -*value;
            }
        }
        let column = |i: usize| [affine[0][i], affine[1][i], affine[2][i]];

        let row_direction = normalize(column(1), [0.0, 1.0, 0.0]);
        let column_direction = normalize(column(0), [1.0, 0.0, 0.0]);
        let normal = cross(row_direction, column_direction);
        let origin = column(3);
        let step = column(2);

        let image_position_patient: Vec<[f64; 3]> = (0..slices)
            .map(|k| {
                let k = k as f64;
                [
                    origin[0] + k * step[0],
                    origin[1] + k * step[1],
                    origin[2] + k * step[2],
                ]
            })
            .collect();
        let slice_location = image_position_patient
            .iter()
            .map(|&position| dot(normal, position))
            .collect();

        let (min, max) = data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |range: Option<(f32, f32)>, v| match range {
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                None => Some((v, v)),
            })
            .map_or((0.0, 0.0), |(lo, hi)| (lo as f64, hi as f64));

        Ok(NiftiParameters {
            rows,
            columns,
            dim_x: header.pixdim[1],
            dim_y: header.pixdim[2],
            slice_thickness: header.pixdim[3],
            spacing_between_slices: header.pixdim[3],
            image_orientation_patient: [
                row_direction[0],
                row_direction[1],
                row_direction[2],
                column_direction[0],
                column_direction[1],
                column_direction[2],
            ],
            acquisition_matrix: [0, rows, columns, 0],
            smallest_image_pixel_value: min,
            largest_image_pixel_value: max,
            window_center: (max + min) / 2.0,
            window_width: max - min,
            // voxel values are already scaled
            rescale_slope: 1.0,
            rescale_intercept: 0.0,
            instance_number: (1..=slices as i32).collect(),
            slice_location,
            image_position_patient,
        })
    }
}

fn decode<E: ByteOrder>(raw: &[u8], datatype: DataType) -> Vec<f32> {
    match datatype {
        DataType::UInt8 => raw.iter().map(|&v| v as f32).collect(),
        DataType::Int8 => raw.iter().map(|&v| v as i8 as f32).collect(),
        DataType::Int16 => raw.chunks_exact(2).map(|c| E::read_i16(c) as f32).collect(),
        DataType::UInt16 => raw.chunks_exact(2).map(|c| E::read_u16(c) as f32).collect(),
        DataType::Int32 => raw.chunks_exact(4).map(|c| E::read_i32(c) as f32).collect(),
        DataType::UInt32 => raw.chunks_exact(4).map(|c| E::read_u32(c) as f32).collect(),
        DataType::Float32 => raw.chunks_exact(4).map(E::read_f32).collect(),
        DataType::Float64 => raw.chunks_exact(8).map(|c| E::read_f64(c) as f32).collect(),
    }
}

fn normalize(v: [f64; 3], fallback: [f64; 3]) -> [f64; 3] {
    let norm = dot(v, v).sqrt();
    if norm > f64::EPSILON {
        [v[0] / norm, v[1] / norm, v[2] / norm]
    } else {
        fallback
    }
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}
