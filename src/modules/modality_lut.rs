//! Modality LUT module (PS3.3 C.11.1), rescale form only.
use dicom::core::{Tag, VR};
use dicom::object::InMemDicomObject;
use dicom_dictionary_std::tags;

use super::CompositionContext;
use crate::attributes::{put_ds, put_empty};

pub(super) const ATTRIBUTES: &[Tag] = &[
    tags::RESCALE_INTERCEPT,
    tags::RESCALE_SLOPE,
    tags::RESCALE_TYPE,
];

pub(super) fn apply(ds: &mut InMemDicomObject, _ctx: &CompositionContext) {
    put_ds(ds, tags::RESCALE_INTERCEPT, 0.0);
    put_ds(ds, tags::RESCALE_SLOPE, 1.0);
    put_empty(ds, tags::RESCALE_TYPE, VR::LO);
}
