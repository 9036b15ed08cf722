use std::{fmt, str::FromStr};

use dicom_dictionary_std::uids;
use thiserror::Error;

/// Modality of the generated DICOM series.
///
/// Selects the stage list used to compose the dataset
/// (see [`crate::modules::stages`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DicomType {
    #[default]
    Mr,
    Ct,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown DICOM type `{0}` (expected one of: MR, CT)")]
pub struct UnknownDicomType(pub String);

impl DicomType {
    /// Value of the _Modality_ attribute.
    pub fn modality(self) -> &'static str {
        match self {
            DicomType::Mr => "MR",
            DicomType::Ct => "CT",
        }
    }

    /// Storage SOP class of the generated images.
    pub fn sop_class_uid(self) -> &'static str {
        match self {
            DicomType::Mr => uids::MR_IMAGE_STORAGE,
            DicomType::Ct => uids::CT_IMAGE_STORAGE,
        }
    }

    /// Whether pixel samples are stored as signed integers.
    pub fn signed_pixels(self) -> bool {
        matches!(self, DicomType::Ct)
    }
}

impl FromStr for DicomType {
    type Err = UnknownDicomType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MR" => Ok(DicomType::Mr),
            "CT" => Ok(DicomType::Ct),
            _ => Err(UnknownDicomType(s.to_string())),
        }
    }
}

impl fmt::Display for DicomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.modality())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhotometricInterpretation {
    Monochrome1,
    #[default]
    Monochrome2,
}

impl PhotometricInterpretation {
    pub fn as_str(self) -> &'static str {
        match self {
            PhotometricInterpretation::Monochrome1 => "MONOCHROME1",
            PhotometricInterpretation::Monochrome2 => "MONOCHROME2",
        }
    }

    /// _Presentation LUT Shape_ implied by this interpretation.
    pub fn presentation_lut_shape(self) -> &'static str {
        match self {
            PhotometricInterpretation::Monochrome1 => "INVERSE",
            PhotometricInterpretation::Monochrome2 => "IDENTITY",
        }
    }
}

/// How RT-structure outputs obtain their Series and SOP Instance UIDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RtUidPolicy {
    /// One new Series Instance UID per run and a new SOP Instance UID per slice.
    #[default]
    Fresh,
    /// Fixed identifiers shared by every RT output ever written.
    Legacy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dicom_type_case_insensitively() {
        assert_eq!("MR".parse::<DicomType>(), Ok(DicomType::Mr));
        assert_eq!("ct".parse::<DicomType>(), Ok(DicomType::Ct));
        assert_eq!(" Ct ".parse::<DicomType>(), Ok(DicomType::Ct));
        assert_eq!(
            "PET".parse::<DicomType>(),
            Err(UnknownDicomType("PET".to_string()))
        );
    }

    #[test]
    fn lut_shape_follows_photometric_interpretation() {
        assert_eq!(
            PhotometricInterpretation::Monochrome2.presentation_lut_shape(),
            "IDENTITY"
        );
        assert_eq!(
            PhotometricInterpretation::Monochrome1.presentation_lut_shape(),
            "INVERSE"
        );
    }
}
