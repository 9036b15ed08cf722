//! Image Pixel module (PS3.3 C.7.6.3).
use dicom::core::{Tag, VR};
use dicom::object::InMemDicomObject;
use dicom_dictionary_std::tags;

use super::CompositionContext;
use crate::attributes::{put_empty, put_str, put_u16};
use crate::enums::PhotometricInterpretation;

pub(super) const ATTRIBUTES: &[Tag] = &[
    tags::SAMPLES_PER_PIXEL,
    tags::PHOTOMETRIC_INTERPRETATION,
    tags::ROWS,
    tags::COLUMNS,
    tags::BITS_ALLOCATED,
    tags::BITS_STORED,
    tags::HIGH_BIT,
    tags::PIXEL_REPRESENTATION,
    tags::SMALLEST_IMAGE_PIXEL_VALUE,
    tags::LARGEST_IMAGE_PIXEL_VALUE,
];

pub(super) fn apply(ds: &mut InMemDicomObject, _ctx: &CompositionContext) {
    put_u16(ds, tags::SAMPLES_PER_PIXEL, 1);
    put_str(
        ds,
        tags::PHOTOMETRIC_INTERPRETATION,
        VR::CS,
        PhotometricInterpretation::default().as_str(),
    );
    put_empty(ds, tags::ROWS, VR::US);
    put_empty(ds, tags::COLUMNS, VR::US);
    put_u16(ds, tags::BITS_ALLOCATED, 16);
    put_u16(ds, tags::BITS_STORED, 16);
    put_u16(ds, tags::HIGH_BIT, 15);
    put_u16(ds, tags::PIXEL_REPRESENTATION, 0);
    put_empty(ds, tags::SMALLEST_IMAGE_PIXEL_VALUE, VR::US);
    put_empty(ds, tags::LARGEST_IMAGE_PIXEL_VALUE, VR::US);
}

/// Single-sample grayscale pixel layout shared by the MR and CT image
/// modules. The presentation LUT shape follows the photometric
/// interpretation written just before it.
pub(super) fn put_grayscale_layout(ds: &mut InMemDicomObject) {
    let photometric = PhotometricInterpretation::default();
    put_u16(ds, tags::SAMPLES_PER_PIXEL, 1);
    put_str(ds, tags::PHOTOMETRIC_INTERPRETATION, VR::CS, photometric.as_str());
    put_str(
        ds,
        tags::PRESENTATION_LUT_SHAPE,
        VR::CS,
        photometric.presentation_lut_shape(),
    );
    put_u16(ds, tags::BITS_ALLOCATED, 16);
    put_u16(ds, tags::BITS_STORED, 16);
    put_u16(ds, tags::HIGH_BIT, 15);
}
