//! General Series module (PS3.3 C.7.3.1).
use dicom::core::{Tag, VR};
use dicom::object::InMemDicomObject;
use dicom_dictionary_std::tags;

use super::CompositionContext;
use crate::attributes::{put_empty, put_is, put_str};

pub(super) const ATTRIBUTES: &[Tag] = &[
    tags::MODALITY,
    tags::SERIES_INSTANCE_UID,
    tags::SERIES_NUMBER,
    tags::LATERALITY,
    tags::SERIES_DATE,
    tags::SERIES_TIME,
    tags::PROTOCOL_NAME,
    tags::SERIES_DESCRIPTION,
    tags::BODY_PART_EXAMINED,
    tags::PATIENT_POSITION,
];

pub(super) fn apply(ds: &mut InMemDicomObject, ctx: &CompositionContext) {
    put_str(ds, tags::MODALITY, VR::CS, ctx.dicom_type.modality());
    put_str(ds, tags::SERIES_INSTANCE_UID, VR::UI, &ctx.series_instance_uid);
    put_is(ds, tags::SERIES_NUMBER, 1);
    put_empty(ds, tags::LATERALITY, VR::CS);
    put_str(ds, tags::SERIES_DATE, VR::DA, ctx.date());
    put_str(ds, tags::SERIES_TIME, VR::TM, ctx.time());
    put_empty(ds, tags::PROTOCOL_NAME, VR::LO);
    put_empty(ds, tags::SERIES_DESCRIPTION, VR::LO);
    put_empty(ds, tags::BODY_PART_EXAMINED, VR::CS);
    put_empty(ds, tags::PATIENT_POSITION, VR::CS);
}
