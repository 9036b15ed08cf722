//! General Acquisition module (PS3.3 C.7.10.1).
use dicom::core::{Tag, VR};
use dicom::object::InMemDicomObject;
use dicom_dictionary_std::tags;

use super::CompositionContext;
use crate::attributes::{put_empty, put_str};

pub(super) const ATTRIBUTES: &[Tag] = &[
    tags::ACQUISITION_NUMBER,
    tags::ACQUISITION_DATE,
    tags::ACQUISITION_TIME,
];

pub(super) fn apply(ds: &mut InMemDicomObject, ctx: &CompositionContext) {
    put_empty(ds, tags::ACQUISITION_NUMBER, VR::IS);
    put_str(ds, tags::ACQUISITION_DATE, VR::DA, ctx.date());
    put_str(ds, tags::ACQUISITION_TIME, VR::TM, ctx.time());
}
