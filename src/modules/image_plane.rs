//! Image Plane module (PS3.3 C.7.6.2).
//!
//! Geometry is unknown at composition time; every attribute starts as a
//! placeholder and is filled in by the series and instance transfers.
use dicom::core::{Tag, VR};
use dicom::object::InMemDicomObject;
use dicom_dictionary_std::tags;

use super::CompositionContext;
use crate::attributes::put_empty;

pub(super) const ATTRIBUTES: &[Tag] = &[
    tags::PIXEL_SPACING,
    tags::IMAGE_ORIENTATION_PATIENT,
    tags::IMAGE_POSITION_PATIENT,
    tags::SLICE_THICKNESS,
    tags::SPACING_BETWEEN_SLICES,
    tags::SLICE_LOCATION,
];

pub(super) fn apply(ds: &mut InMemDicomObject, _ctx: &CompositionContext) {
    put_empty(ds, tags::PIXEL_SPACING, VR::DS);
    put_empty(ds, tags::IMAGE_ORIENTATION_PATIENT, VR::DS);
    put_empty(ds, tags::IMAGE_POSITION_PATIENT, VR::DS);
    put_empty(ds, tags::SLICE_THICKNESS, VR::DS);
    put_empty(ds, tags::SPACING_BETWEEN_SLICES, VR::DS);
    put_empty(ds, tags::SLICE_LOCATION, VR::DS);
}
