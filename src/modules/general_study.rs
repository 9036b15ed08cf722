//! General Study module (PS3.3 C.7.2.1).
use dicom::core::{Tag, VR};
use dicom::object::InMemDicomObject;
use dicom_dictionary_std::tags;

use super::CompositionContext;
use crate::attributes::{put_empty, put_str};

pub(super) const ATTRIBUTES: &[Tag] = &[
    tags::STUDY_INSTANCE_UID,
    tags::STUDY_DATE,
    tags::STUDY_TIME,
    tags::REFERRING_PHYSICIAN_NAME,
    tags::STUDY_ID,
    tags::ACCESSION_NUMBER,
    tags::STUDY_DESCRIPTION,
];

pub(super) fn apply(ds: &mut InMemDicomObject, ctx: &CompositionContext) {
    put_str(ds, tags::STUDY_INSTANCE_UID, VR::UI, &ctx.study_instance_uid);
    put_str(ds, tags::STUDY_DATE, VR::DA, ctx.date());
    put_str(ds, tags::STUDY_TIME, VR::TM, ctx.time());
    put_empty(ds, tags::REFERRING_PHYSICIAN_NAME, VR::PN);
    put_empty(ds, tags::STUDY_ID, VR::SH);
    put_empty(ds, tags::ACCESSION_NUMBER, VR::SH);
    put_empty(ds, tags::STUDY_DESCRIPTION, VR::LO);
}
