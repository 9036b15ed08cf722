//! CT Image module (PS3.3 C.8.2.1).
//!
//! Bits Allocated and Bits Stored are fixed at 16 for CT images.
use dicom::core::{Tag, VR};
use dicom::object::InMemDicomObject;
use dicom_dictionary_std::tags;

use super::CompositionContext;
use super::image_pixel::put_grayscale_layout;
use crate::attributes::put_empty;

// Enhanced CT attributes addressed by number.
const DATA_COLLECTION_CENTER_PATIENT: Tag = Tag(0x0018, 0x9313);
const RECONSTRUCTION_TARGET_CENTER_PATIENT: Tag = Tag(0x0018, 0x9318);
const REVOLUTION_TIME: Tag = Tag(0x0018, 0x9305);
const SINGLE_COLLIMATION_WIDTH: Tag = Tag(0x0018, 0x9306);
const TOTAL_COLLIMATION_WIDTH: Tag = Tag(0x0018, 0x9307);
const TABLE_SPEED: Tag = Tag(0x0018, 0x9309);
const TABLE_FEED_PER_ROTATION: Tag = Tag(0x0018, 0x9310);
const SPIRAL_PITCH_FACTOR: Tag = Tag(0x0018, 0x9311);
const EXPOSURE_MODULATION_TYPE: Tag = Tag(0x0018, 0x9323);
const ESTIMATED_DOSE_SAVING: Tag = Tag(0x0018, 0x9324);
const CTDI_VOL: Tag = Tag(0x0018, 0x9345);
const CTDI_PHANTOM_TYPE_CODE_SEQUENCE: Tag = Tag(0x0018, 0x9346);
const WATER_EQUIVALENT_DIAMETER: Tag = Tag(0x0018, 0x1271);
const WATER_EQUIVALENT_DIAMETER_CALCULATION_METHOD_CODE_SEQUENCE: Tag = Tag(0x0018, 0x1272);
const CALCIUM_SCORING_MASS_FACTOR_PATIENT: Tag = Tag(0x0018, 0x9351);
const CALCIUM_SCORING_MASS_FACTOR_DEVICE: Tag = Tag(0x0018, 0x9352);
const ENERGY_WEIGHTING_FACTOR: Tag = Tag(0x0018, 0x9353);
const CT_ADDITIONAL_X_RAY_SOURCE_SEQUENCE: Tag = Tag(0x0018, 0x9360);

/// Acquisition and dose parameters that a NIfTI header cannot supply.
const PLACEHOLDERS: &[(Tag, VR)] = &[
    (tags::KVP, VR::DS),
    (tags::ACQUISITION_NUMBER, VR::IS),
    (tags::SCAN_OPTIONS, VR::CS),
    (tags::DATA_COLLECTION_DIAMETER, VR::DS),
    (DATA_COLLECTION_CENTER_PATIENT, VR::FD),
    (tags::RECONSTRUCTION_DIAMETER, VR::DS),
    (RECONSTRUCTION_TARGET_CENTER_PATIENT, VR::FD),
    (tags::DISTANCE_SOURCE_TO_DETECTOR, VR::DS),
    (tags::DISTANCE_SOURCE_TO_PATIENT, VR::DS),
    (tags::GANTRY_DETECTOR_TILT, VR::DS),
    (tags::TABLE_HEIGHT, VR::DS),
    (tags::ROTATION_DIRECTION, VR::CS),
    (tags::EXPOSURE_TIME, VR::IS),
    (tags::X_RAY_TUBE_CURRENT, VR::IS),
    (tags::EXPOSURE, VR::IS),
    (tags::EXPOSURE_INU_AS, VR::IS),
    (tags::FILTER_TYPE, VR::SH),
    (tags::GENERATOR_POWER, VR::IS),
    (tags::FOCAL_SPOTS, VR::DS),
    (tags::CONVOLUTION_KERNEL, VR::SH),
    (REVOLUTION_TIME, VR::FD),
    (SINGLE_COLLIMATION_WIDTH, VR::FD),
    (TOTAL_COLLIMATION_WIDTH, VR::FD),
    (TABLE_SPEED, VR::FD),
    (TABLE_FEED_PER_ROTATION, VR::FD),
    (SPIRAL_PITCH_FACTOR, VR::FD),
    (EXPOSURE_MODULATION_TYPE, VR::CS),
    (ESTIMATED_DOSE_SAVING, VR::FD),
    (CTDI_VOL, VR::FD),
    (CTDI_PHANTOM_TYPE_CODE_SEQUENCE, VR::SQ),
    (WATER_EQUIVALENT_DIAMETER, VR::FD),
    (WATER_EQUIVALENT_DIAMETER_CALCULATION_METHOD_CODE_SEQUENCE, VR::SQ),
    (tags::IMAGE_AND_FLUOROSCOPY_AREA_DOSE_PRODUCT, VR::DS),
    (CALCIUM_SCORING_MASS_FACTOR_PATIENT, VR::FL),
    (CALCIUM_SCORING_MASS_FACTOR_DEVICE, VR::FL),
    (ENERGY_WEIGHTING_FACTOR, VR::FL),
    (CT_ADDITIONAL_X_RAY_SOURCE_SEQUENCE, VR::SQ),
    (tags::ISOCENTER_POSITION, VR::DS),
];

pub(super) const ATTRIBUTES: &[Tag] = &[
    tags::SAMPLES_PER_PIXEL,
    tags::PHOTOMETRIC_INTERPRETATION,
    tags::PRESENTATION_LUT_SHAPE,
    tags::BITS_ALLOCATED,
    tags::BITS_STORED,
    tags::HIGH_BIT,
    tags::KVP,
    tags::ACQUISITION_NUMBER,
    tags::CONVOLUTION_KERNEL,
    CTDI_VOL,
];

pub(super) fn apply(ds: &mut InMemDicomObject, _ctx: &CompositionContext) {
    put_grayscale_layout(ds);
    for &(tag, vr) in PLACEHOLDERS {
        put_empty(ds, tag, vr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::read_str;
    use crate::enums::DicomType;

    #[test]
    fn placeholders_are_present_and_empty() {
        let mut ds = InMemDicomObject::new_empty();
        apply(&mut ds, &CompositionContext::new(DicomType::Ct));
        for &(tag, vr) in PLACEHOLDERS {
            let element = ds.element(tag).unwrap();
            assert_eq!(element.vr(), vr, "{tag}");
            assert_eq!(element.value().multiplicity(), 0, "{tag}");
        }
    }

    #[test]
    fn lut_shape_matches_photometric_interpretation() {
        let mut ds = InMemDicomObject::new_empty();
        apply(&mut ds, &CompositionContext::new(DicomType::Ct));
        assert_eq!(
            read_str(&ds, tags::PHOTOMETRIC_INTERPRETATION).as_deref(),
            Some("MONOCHROME2")
        );
        assert_eq!(
            read_str(&ds, tags::PRESENTATION_LUT_SHAPE).as_deref(),
            Some("IDENTITY")
        );
    }
}
