//! Patient Study module (PS3.3 C.7.2.2).
use dicom::core::{Tag, VR};
use dicom::object::InMemDicomObject;
use dicom_dictionary_std::tags;

use super::CompositionContext;
use crate::attributes::put_empty;

pub(super) const ATTRIBUTES: &[Tag] = &[tags::PATIENT_AGE, tags::PATIENT_SIZE, tags::PATIENT_WEIGHT];

pub(super) fn apply(ds: &mut InMemDicomObject, _ctx: &CompositionContext) {
    put_empty(ds, tags::PATIENT_AGE, VR::AS);
    put_empty(ds, tags::PATIENT_SIZE, VR::DS);
    put_empty(ds, tags::PATIENT_WEIGHT, VR::DS);
}
