//! NIfTI-1 header parsing.
use byteorder::{BigEndian, ByteOrder, LittleEndian};

use super::NiftiLoaderError;

/// NIfTI-1 header field byte offsets.
mod offsets {
    pub const SIZEOF_HDR: usize = 0;
    pub const DIM: usize = 40;
    pub const DATATYPE: usize = 70;
    pub const BITPIX: usize = 72;
    pub const PIXDIM: usize = 76;
    pub const VOX_OFFSET: usize = 108;
    pub const SCL_SLOPE: usize = 112;
    pub const SCL_INTER: usize = 116;
    pub const XYZT_UNITS: usize = 123;
    pub const QFORM_CODE: usize = 252;
    pub const SFORM_CODE: usize = 254;
    pub const QUATERN_B: usize = 256;
    pub const QOFFSET_X: usize = 268;
    pub const SROW_X: usize = 280;
    pub const SROW_Y: usize = 296;
    pub const SROW_Z: usize = 312;
    pub const MAGIC: usize = 344;
}

/// `NIfTI` data type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i16)]
pub enum DataType {
    UInt8 = 2,
    Int16 = 4,
    Int32 = 8,
    Float32 = 16,
    Float64 = 64,
    Int8 = 256,
    UInt16 = 512,
    UInt32 = 768,
}

impl DataType {
    /// Parse from `NIfTI` datatype code.
    pub fn from_code(code: i16) -> Result<Self, NiftiLoaderError> {
        match code {
            2 => Ok(Self::UInt8),
            4 => Ok(Self::Int16),
            8 => Ok(Self::Int32),
            16 => Ok(Self::Float32),
            64 => Ok(Self::Float64),
            256 => Ok(Self::Int8),
            512 => Ok(Self::UInt16),
            768 => Ok(Self::UInt32),
            _ => Err(NiftiLoaderError::UnsupportedDataType(code)),
        }
    }

    pub const fn code(self) -> i16 {
        self as i16
    }

    /// Size of each element in bytes.
    pub const fn byte_size(self) -> usize {
        match self {
            Self::UInt8 | Self::Int8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Float64 => 8,
        }
    }
}

/// The NIfTI-1 header fields needed to place a volume in patient space.
#[derive(Debug, Clone, PartialEq)]
pub struct NiftiHeader {
    /// Number of dimensions (1-7).
    pub ndim: u8,
    /// Size along each dimension.
    pub dim: [usize; 7],
    pub datatype: DataType,
    /// Voxel sizes at `pixdim[1..=ndim]`, qfac at index 0.
    pub pixdim: [f64; 8],
    /// Byte offset of the voxel data.
    pub vox_offset: usize,
    pub scl_slope: f64,
    pub scl_inter: f64,
    pub xyzt_units: u8,
    pub qform_code: i16,
    pub sform_code: i16,
    /// Quaternion parameters b, c, d of the qform.
    pub quatern: [f64; 3],
    /// Translation of the qform.
    pub qoffset: [f64; 3],
    pub srow_x: [f64; 4],
    pub srow_y: [f64; 4],
    pub srow_z: [f64; 4],
    /// File endianness.
    pub little_endian: bool,
}

impl Default for NiftiHeader {
    fn default() -> Self {
        Self {
            ndim: 3,
            dim: [1; 7],
            datatype: DataType::Float32,
            pixdim: [1.0; 8],
            vox_offset: 352,
            scl_slope: 1.0,
            scl_inter: 0.0,
            // millimetres
            xyzt_units: 2,
            qform_code: 0,
            sform_code: 1,
            quatern: [0.0; 3],
            qoffset: [0.0; 3],
            srow_x: [1.0, 0.0, 0.0, 0.0],
            srow_y: [0.0, 1.0, 0.0, 0.0],
            srow_z: [0.0, 0.0, 1.0, 0.0],
            little_endian: true,
        }
    }
}

impl NiftiHeader {
    /// Size of a NIfTI-1 header in bytes.
    pub const SIZE: usize = 348;

    /// Read a header, detecting endianness from the `sizeof_hdr` field.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, NiftiLoaderError> {
        if bytes.len() < Self::SIZE {
            return Err(NiftiLoaderError::HeaderTooShort(bytes.len()));
        }
        if LittleEndian::read_i32(&bytes[offsets::SIZEOF_HDR..]) == Self::SIZE as i32 {
            Self::parse::<LittleEndian>(bytes, true)
        } else if BigEndian::read_i32(&bytes[offsets::SIZEOF_HDR..]) == Self::SIZE as i32 {
            Self::parse::<BigEndian>(bytes, false)
        } else {
            Err(NiftiLoaderError::InvalidMagic([
                bytes[0], bytes[1], bytes[2], bytes[3],
            ]))
        }
    }

    #[allow(clippy::wildcard_imports)]
    fn parse<E: ByteOrder>(bytes: &[u8], little_endian: bool) -> Result<Self, NiftiLoaderError> {
        use offsets::*;

        let magic = &bytes[MAGIC..MAGIC + 4];
        if magic != b"n+1\0" {
            return Err(NiftiLoaderError::InvalidMagic([
                magic[0], magic[1], magic[2], magic[3],
            ]));
        }

        let ndim = E::read_i16(&bytes[DIM..]);
        if !(1..=7).contains(&ndim) {
            return Err(NiftiLoaderError::InvalidDimensions(format!(
                "ndim must be 1..=7, got {ndim}"
            )));
        }

        let mut dim = [1usize; 7];
        for (i, value) in dim.iter_mut().enumerate() {
            let raw = E::read_i16(&bytes[DIM + 2 + i * 2..]);
            if (i as i16) < ndim {
                *value = usize::try_from(raw).map_err(|_| {
                    NiftiLoaderError::InvalidDimensions(format!(
                        "dimension {} has negative value {raw}",
                        i + 1
                    ))
                })?;
            }
        }

        let datatype = DataType::from_code(E::read_i16(&bytes[DATATYPE..]))?;
        let bitpix = E::read_i16(&bytes[BITPIX..]);
        if bitpix as usize != datatype.byte_size() * 8 {
            return Err(NiftiLoaderError::InvalidDimensions(format!(
                "bitpix {bitpix} does not match datatype {datatype:?}"
            )));
        }

        let mut pixdim = [0.0f64; 8];
        for (i, value) in pixdim.iter_mut().enumerate() {
            *value = E::read_f32(&bytes[PIXDIM + i * 4..]) as f64;
        }

        let vox_offset = E::read_f32(&bytes[VOX_OFFSET..]);
        if !vox_offset.is_finite() || vox_offset < Self::SIZE as f32 || vox_offset.fract() != 0.0 {
            return Err(NiftiLoaderError::InvalidDimensions(format!(
                "invalid vox_offset {vox_offset}"
            )));
        }

        let read_f64s = |start: usize, out: &mut [f64]| {
            for (i, value) in out.iter_mut().enumerate() {
                *value = E::read_f32(&bytes[start + i * 4..]) as f64;
            }
        };
        let mut quatern = [0.0; 3];
        let mut qoffset = [0.0; 3];
        let mut srow_x = [0.0; 4];
        let mut srow_y = [0.0; 4];
        let mut srow_z = [0.0; 4];
        read_f64s(QUATERN_B, &mut quatern);
        read_f64s(QOFFSET_X, &mut qoffset);
        read_f64s(SROW_X, &mut srow_x);
        read_f64s(SROW_Y, &mut srow_y);
        read_f64s(SROW_Z, &mut srow_z);

        Ok(Self {
            ndim: ndim as u8,
            dim,
            datatype,
            pixdim,
            vox_offset: vox_offset as usize,
            scl_slope: E::read_f32(&bytes[SCL_SLOPE..]) as f64,
            scl_inter: E::read_f32(&bytes[SCL_INTER..]) as f64,
            xyzt_units: bytes[XYZT_UNITS],
            qform_code: E::read_i16(&bytes[QFORM_CODE..]),
            sform_code: E::read_i16(&bytes[SFORM_CODE..]),
            quatern,
            qoffset,
            srow_x,
            srow_y,
            srow_z,
            little_endian,
        })
    }

    /// Write a little endian single-file (`n+1`) header, padded to
    /// `vox_offset`.
    pub fn to_bytes(&self) -> Vec<u8> {
        use offsets::*;

        let mut buf = vec![0u8; self.vox_offset.max(Self::SIZE)];
        LittleEndian::write_i32(&mut buf[SIZEOF_HDR..], Self::SIZE as i32);
        LittleEndian::write_i16(&mut buf[DIM..], self.ndim as i16);
        for (i, &d) in self.dim.iter().enumerate() {
            LittleEndian::write_i16(&mut buf[DIM + 2 + i * 2..], d as i16);
        }
        LittleEndian::write_i16(&mut buf[DATATYPE..], self.datatype.code());
        LittleEndian::write_i16(&mut buf[BITPIX..], (self.datatype.byte_size() * 8) as i16);
        for (i, &p) in self.pixdim.iter().enumerate() {
            LittleEndian::write_f32(&mut buf[PIXDIM + i * 4..], p as f32);
        }
        LittleEndian::write_f32(&mut buf[VOX_OFFSET..], self.vox_offset as f32);
        LittleEndian::write_f32(&mut buf[SCL_SLOPE..], self.scl_slope as f32);
        LittleEndian::write_f32(&mut buf[SCL_INTER..], self.scl_inter as f32);
        buf[XYZT_UNITS] = self.xyzt_units;
        LittleEndian::write_i16(&mut buf[QFORM_CODE..], self.qform_code);
        LittleEndian::write_i16(&mut buf[SFORM_CODE..], self.sform_code);

        let fields: [(usize, &[f64]); 5] = [
            (QUATERN_B, &self.quatern),
            (QOFFSET_X, &self.qoffset),
            (SROW_X, &self.srow_x),
            (SROW_Y, &self.srow_y),
            (SROW_Z, &self.srow_z),
        ];
        for (start, values) in fields {
            for (i, &v) in values.iter().enumerate() {
                LittleEndian::write_f32(&mut buf[start + i * 4..], v as f32);
            }
        }
        buf[MAGIC..MAGIC + 4].copy_from_slice(b"n+1\0");
        buf
    }

    /// Voxel to RAS+ affine: sform if set, else qform, else pixdim scaling.
    pub fn affine(&self) -> [[f64; 4]; 4] {
        if self.sform_code > 0 {
            [self.srow_x, self.srow_y, self.srow_z, [0.0, 0.0, 0.0, 1.0]]
        } else if self.qform_code > 0 {
            self.qform_to_affine()
        } else {
            [
                [self.pixdim[1], 0.0, 0.0, 0.0],
                [0.0, self.pixdim[2], 0.0, 0.0],
                [0.0, 0.0, self.pixdim[3], 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ]
        }
    }

    fn qform_to_affine(&self) -> [[f64; 4]; 4] {
        let [b, c, d] = self.quatern;
        let a = (1.0 - b * b - c * c - d * d).max(0.0).sqrt();

        let qfac = if self.pixdim[0] < 0.0 { -1.0 } else { 1.0 };
        let [i, j, k] = [self.pixdim[1], self.pixdim[2], self.pixdim[3] * qfac];

        [
            [
                (a * a + b * b - c * c - d * d) * i,
                2.0 * (b * c - a * d) * j,
                2.0 * (b * d + a * c) * k,
                self.qoffset[0],
            ],
            [
                2.0 * (b * c + a * d) * i,
                (a * a - b * b + c * c - d * d) * j,
                2.0 * (c * d - a * b) * k,
                self.qoffset[1],
            ],
            [
                2.0 * (b * d - a * c) * i,
                2.0 * (c * d + a * b) * j,
                (a * a - b * b - c * c + d * d) * k,
                self.qoffset[2],
            ],
            [0.0, 0.0, 0.0, 1.0],
        ]
    }

    /// Image shape, `dim[1..=ndim]`.
    pub fn shape(&self) -> Vec<usize> {
        self.dim[..self.ndim as usize].to_vec()
    }

    pub fn num_voxels(&self) -> usize {
        self.shape().iter().product()
    }

    /// Size of the voxel data in bytes.
    pub fn data_size(&self) -> usize {
        self.num_voxels() * self.datatype.byte_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_survives_write_and_parse() {
        let header = NiftiHeader {
            ndim: 4,
            dim: [64, 48, 30, 2, 1, 1, 1],
            datatype: DataType::Int16,
            pixdim: [1.0, 0.9765625, 0.9765625, 2.5, 1.0, 0.0, 0.0, 0.0],
            srow_x: [-0.9765625, 0.0, 0.0, 90.0],
            ..NiftiHeader::default()
        };
        let parsed = NiftiHeader::from_bytes(&header.to_bytes()).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(parsed.shape(), vec![64, 48, 30, 2]);
        assert_eq!(parsed.data_size(), 64 * 48 * 30 * 2 * 2);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = NiftiHeader::default().to_bytes();
        bytes[344..348].copy_from_slice(b"ni1\0");
        assert!(matches!(
            NiftiHeader::from_bytes(&bytes),
            Err(NiftiLoaderError::InvalidMagic(_))
        ));
        assert!(matches!(
            NiftiHeader::from_bytes(&bytes[..100]),
            Err(NiftiLoaderError::HeaderTooShort(100))
        ));
    }

    #[test]
    fn reads_big_endian_headers() {
        let mut bytes = vec![0u8; 352];
        BigEndian::write_i32(&mut bytes[0..], 348);
        BigEndian::write_i16(&mut bytes[40..], 3);
        for (i, d) in [4i16, 5, 6].into_iter().enumerate() {
            BigEndian::write_i16(&mut bytes[42 + i * 2..], d);
        }
        BigEndian::write_i16(&mut bytes[70..], 2);
        BigEndian::write_i16(&mut bytes[72..], 8);
        BigEndian::write_f32(&mut bytes[108..], 352.0);
        bytes[344..348].copy_from_slice(b"n+1\0");

        let header = NiftiHeader::from_bytes(&bytes).unwrap();
        assert!(!header.little_endian);
        assert_eq!(header.shape(), vec![4, 5, 6]);
        assert_eq!(header.datatype, DataType::UInt8);
    }

    #[test]
    fn affine_falls_back_from_sform_to_qform_to_pixdim() {
        let mut header = NiftiHeader {
            pixdim: [1.0, 2.0, 3.0, 4.0, 1.0, 1.0, 1.0, 1.0],
            sform_code: 0,
            qform_code: 0,
            ..NiftiHeader::default()
        };
        let affine = header.affine();
        assert_eq!([affine[0][0], affine[1][1], affine[2][2]], [2.0, 3.0, 4.0]);

        // identity quaternion with a translation
        header.qform_code = 1;
        header.qoffset = [10.0, 20.0, 30.0];
        let affine = header.affine();
        assert_eq!([affine[0][0], affine[1][1], affine[2][2]], [2.0, 3.0, 4.0]);
        assert_eq!([affine[0][3], affine[1][3], affine[2][3]], [10.0, 20.0, 30.0]);

        // qfac flips the third axis
        header.pixdim[0] = -1.0;
        assert_eq!(header.affine()[2][2], -4.0);

        header.sform_code = 1;
        assert_eq!(header.affine()[0], header.srow_x);
    }
}
