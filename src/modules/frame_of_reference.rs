//! Frame of Reference module (PS3.3 C.7.4.1).
use dicom::core::{Tag, VR};
use dicom::object::InMemDicomObject;
use dicom_dictionary_std::tags;

use super::CompositionContext;
use crate::attributes::{put_empty, put_str};

pub(super) const ATTRIBUTES: &[Tag] = &[
    tags::FRAME_OF_REFERENCE_UID,
    tags::POSITION_REFERENCE_INDICATOR,
];

pub(super) fn apply(ds: &mut InMemDicomObject, ctx: &CompositionContext) {
    put_str(ds, tags::FRAME_OF_REFERENCE_UID, VR::UI, &ctx.frame_of_reference_uid);
    put_empty(ds, tags::POSITION_REFERENCE_INDICATOR, VR::LO);
}
