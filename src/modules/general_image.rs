//! General Image module (PS3.3 C.7.6.1).
use dicom::core::{Tag, VR};
use dicom::object::InMemDicomObject;
use dicom_dictionary_std::tags;

use super::CompositionContext;
use crate::attributes::{put_empty, put_str, put_strs};

pub(super) const ATTRIBUTES: &[Tag] = &[
    tags::INSTANCE_NUMBER,
    tags::PATIENT_ORIENTATION,
    tags::CONTENT_DATE,
    tags::CONTENT_TIME,
    tags::IMAGE_TYPE,
    tags::BURNED_IN_ANNOTATION,
    tags::LOSSY_IMAGE_COMPRESSION,
];

pub(super) fn apply(ds: &mut InMemDicomObject, ctx: &CompositionContext) {
    put_empty(ds, tags::INSTANCE_NUMBER, VR::IS);
    put_empty(ds, tags::PATIENT_ORIENTATION, VR::CS);
    put_str(ds, tags::CONTENT_DATE, VR::DA, ctx.date());
    put_str(ds, tags::CONTENT_TIME, VR::TM, ctx.time());
    put_strs(ds, tags::IMAGE_TYPE, VR::CS, ["DERIVED", "SECONDARY"]);
    put_str(ds, tags::BURNED_IN_ANNOTATION, VR::CS, "NO");
    put_str(ds, tags::LOSSY_IMAGE_COMPRESSION, VR::CS, "00");
}
