//! MR Image module (PS3.3 C.8.3.1).
use dicom::core::{Tag, VR};
use dicom::object::InMemDicomObject;
use dicom_dictionary_std::tags;

use super::CompositionContext;
use super::image_pixel::put_grayscale_layout;
use crate::attributes::put_empty;

/// Acquisition parameters that a NIfTI header cannot supply.
const PLACEHOLDERS: &[(Tag, VR)] = &[
    (tags::SCANNING_SEQUENCE, VR::CS),
    (tags::SEQUENCE_VARIANT, VR::CS),
    (tags::SCAN_OPTIONS, VR::CS),
    (tags::MR_ACQUISITION_TYPE, VR::CS),
    (tags::REPETITION_TIME, VR::DS),
    (tags::ECHO_TIME, VR::DS),
    (tags::ECHO_TRAIN_LENGTH, VR::IS),
    (tags::INVERSION_TIME, VR::DS),
    (tags::TRIGGER_TIME, VR::DS),
    (tags::SEQUENCE_NAME, VR::SH),
    (tags::ANGIO_FLAG, VR::CS),
    (tags::NUMBER_OF_AVERAGES, VR::DS),
    (tags::IMAGING_FREQUENCY, VR::DS),
    (tags::IMAGED_NUCLEUS, VR::SH),
    (tags::ECHO_NUMBERS, VR::IS),
    (tags::MAGNETIC_FIELD_STRENGTH, VR::DS),
    (tags::NUMBER_OF_PHASE_ENCODING_STEPS, VR::IS),
    (tags::PERCENT_SAMPLING, VR::DS),
    (tags::PERCENT_PHASE_FIELD_OF_VIEW, VR::DS),
    (tags::PIXEL_BANDWIDTH, VR::DS),
    (tags::RECEIVE_COIL_NAME, VR::SH),
    (tags::TRANSMIT_COIL_NAME, VR::SH),
    (tags::ACQUISITION_MATRIX, VR::US),
    (tags::IN_PLANE_PHASE_ENCODING_DIRECTION, VR::CS),
    (tags::FLIP_ANGLE, VR::DS),
    (tags::VARIABLE_FLIP_ANGLE_FLAG, VR::CS),
    (tags::SAR, VR::DS),
    (tags::D_BDT, VR::FD),
    (tags::B1RMS, VR::FL),
];

pub(super) const ATTRIBUTES: &[Tag] = &[
    tags::SAMPLES_PER_PIXEL,
    tags::PHOTOMETRIC_INTERPRETATION,
    tags::PRESENTATION_LUT_SHAPE,
    tags::BITS_ALLOCATED,
    tags::BITS_STORED,
    tags::HIGH_BIT,
    tags::SCANNING_SEQUENCE,
    tags::SEQUENCE_VARIANT,
    tags::MR_ACQUISITION_TYPE,
    tags::REPETITION_TIME,
    tags::ECHO_TIME,
    tags::ECHO_TRAIN_LENGTH,
    tags::ACQUISITION_MATRIX,
    tags::FLIP_ANGLE,
];

pub(super) fn apply(ds: &mut InMemDicomObject, _ctx: &CompositionContext) {
    put_grayscale_layout(ds);
    for &(tag, vr) in PLACEHOLDERS {
        put_empty(ds, tag, vr);
    }
}
