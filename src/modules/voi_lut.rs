//! VOI LUT module (PS3.3 C.11.2), window form only.
use dicom::core::{Tag, VR};
use dicom::object::InMemDicomObject;
use dicom_dictionary_std::tags;

use super::CompositionContext;
use crate::attributes::put_empty;

pub(super) const ATTRIBUTES: &[Tag] = &[tags::WINDOW_CENTER, tags::WINDOW_WIDTH];

pub(super) fn apply(ds: &mut InMemDicomObject, _ctx: &CompositionContext) {
    put_empty(ds, tags::WINDOW_CENTER, VR::DS);
    put_empty(ds, tags::WINDOW_WIDTH, VR::DS);
}
