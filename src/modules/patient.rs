//! Patient module (PS3.3 C.7.1.1).
use dicom::core::{Tag, VR};
use dicom::object::InMemDicomObject;
use dicom_dictionary_std::tags;

use super::CompositionContext;
use crate::attributes::put_empty;

pub(super) const ATTRIBUTES: &[Tag] = &[
    tags::PATIENT_NAME,
    tags::PATIENT_ID,
    tags::PATIENT_BIRTH_DATE,
    tags::PATIENT_SEX,
];

pub(super) fn apply(ds: &mut InMemDicomObject, _ctx: &CompositionContext) {
    put_empty(ds, tags::PATIENT_NAME, VR::PN);
    put_empty(ds, tags::PATIENT_ID, VR::LO);
    put_empty(ds, tags::PATIENT_BIRTH_DATE, VR::DA);
    put_empty(ds, tags::PATIENT_SEX, VR::CS);
}
