//! SOP Common module (PS3.3 C.12.1).
//!
//! The SOP Instance UID stays a placeholder here:
//! each written slice receives its own.
use dicom::core::{Tag, VR};
use dicom::object::InMemDicomObject;
use dicom_dictionary_std::tags;

use super::CompositionContext;
use crate::attributes::{put_empty, put_str};

pub(super) const ATTRIBUTES: &[Tag] = &[
    tags::SPECIFIC_CHARACTER_SET,
    tags::SOP_CLASS_UID,
    tags::SOP_INSTANCE_UID,
    tags::INSTANCE_CREATION_DATE,
    tags::INSTANCE_CREATION_TIME,
];

pub(super) fn apply(ds: &mut InMemDicomObject, ctx: &CompositionContext) {
    put_str(ds, tags::SPECIFIC_CHARACTER_SET, VR::CS, "ISO_IR 100");
    put_str(ds, tags::SOP_CLASS_UID, VR::UI, ctx.dicom_type.sop_class_uid());
    put_empty(ds, tags::SOP_INSTANCE_UID, VR::UI);
    put_str(ds, tags::INSTANCE_CREATION_DATE, VR::DA, ctx.date());
    put_str(ds, tags::INSTANCE_CREATION_TIME, VR::TM, ctx.time());
}
