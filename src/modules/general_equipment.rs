//! General Equipment module (PS3.3 C.7.5.1).
use dicom::core::{Tag, VR};
use dicom::object::InMemDicomObject;
use dicom_dictionary_std::tags;

use super::CompositionContext;
use crate::attributes::{put_empty, put_str};

pub(super) const ATTRIBUTES: &[Tag] = &[
    tags::MANUFACTURER,
    tags::INSTITUTION_NAME,
    tags::STATION_NAME,
    tags::MANUFACTURER_MODEL_NAME,
    tags::DEVICE_SERIAL_NUMBER,
    tags::SOFTWARE_VERSIONS,
];

pub(super) fn apply(ds: &mut InMemDicomObject, _ctx: &CompositionContext) {
    put_empty(ds, tags::MANUFACTURER, VR::LO);
    put_empty(ds, tags::INSTITUTION_NAME, VR::LO);
    put_empty(ds, tags::STATION_NAME, VR::SH);
    put_empty(ds, tags::MANUFACTURER_MODEL_NAME, VR::LO);
    put_empty(ds, tags::DEVICE_SERIAL_NUMBER, VR::LO);
    put_str(
        ds,
        tags::SOFTWARE_VERSIONS,
        VR::LO,
        concat!("nii2dcm ", env!("CARGO_PKG_VERSION")),
    );
}
