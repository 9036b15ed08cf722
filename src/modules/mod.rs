//! IOD modules and their composition into a single data set.
//!
//! Each [`IodModule`] is one attribute group of a DICOM Information Object
//! Definition (PS3.3 C.7/C.8). A module is applied as a stage onto the
//! working data set; a modality selects the ordered list of stages
//! ([`stages`]) from generic to modality-specific, so that a later stage's
//! assignment of an attribute replaces an earlier one.
//!
//! Stages read all run-dependent values (UIDs, timestamps) from the
//! [`CompositionContext`], which makes every stage a pure function of the
//! data set and the context.
use chrono::{Local, NaiveDateTime};
use dicom::core::Tag;
use dicom::object::InMemDicomObject;
use tracing::trace;

use crate::enums::DicomType;
use crate::uid::generate_uid;

mod ct_image;
mod frame_of_reference;
mod general_acquisition;
mod general_equipment;
mod general_image;
mod general_series;
mod general_study;
mod image_pixel;
mod image_plane;
mod modality_lut;
mod mr_image;
mod patient;
mod patient_study;
mod sop_common;
mod voi_lut;

/// Run-wide values shared by every module stage.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionContext {
    pub dicom_type: DicomType,
    pub study_instance_uid: String,
    pub series_instance_uid: String,
    pub frame_of_reference_uid: String,
    pub timestamp: NaiveDateTime,
}

impl CompositionContext {
    /// Context for a new conversion run, with freshly generated UIDs.
    pub fn new(dicom_type: DicomType) -> Self {
        Self {
            dicom_type,
            study_instance_uid: generate_uid(),
            series_instance_uid: generate_uid(),
            frame_of_reference_uid: generate_uid(),
            timestamp: Local::now().naive_local(),
        }
    }

    /// Run date, formatted as a DA value.
    pub fn date(&self) -> String {
        self.timestamp.format("%Y%m%d").to_string()
    }

    /// Run time, formatted as a TM value.
    pub fn time(&self) -> String {
        self.timestamp.format("%H%M%S%.6f").to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IodModule {
    Patient,
    GeneralStudy,
    PatientStudy,
    GeneralSeries,
    FrameOfReference,
    GeneralEquipment,
    GeneralAcquisition,
    GeneralImage,
    ImagePlane,
    ImagePixel,
    ModalityLut,
    VoiLut,
    SopCommon,
    MrImage,
    CtImage,
}

const MR_STAGES: &[IodModule] = &[
    IodModule::Patient,
    IodModule::GeneralStudy,
    IodModule::PatientStudy,
    IodModule::GeneralSeries,
    IodModule::FrameOfReference,
    IodModule::GeneralEquipment,
    IodModule::GeneralAcquisition,
    IodModule::GeneralImage,
    IodModule::ImagePlane,
    IodModule::ImagePixel,
    IodModule::ModalityLut,
    IodModule::VoiLut,
    IodModule::SopCommon,
    IodModule::MrImage,
];

const CT_STAGES: &[IodModule] = &[
    IodModule::Patient,
    IodModule::GeneralStudy,
    IodModule::PatientStudy,
    IodModule::GeneralSeries,
    IodModule::FrameOfReference,
    IodModule::GeneralEquipment,
    IodModule::GeneralAcquisition,
    IodModule::GeneralImage,
    IodModule::ImagePlane,
    IodModule::ImagePixel,
    IodModule::ModalityLut,
    IodModule::VoiLut,
    IodModule::SopCommon,
    IodModule::CtImage,
];

/// Ordered module stages for a modality, least specific first.
pub fn stages(dicom_type: DicomType) -> &'static [IodModule] {
    match dicom_type {
        DicomType::Mr => MR_STAGES,
        DicomType::Ct => CT_STAGES,
    }
}

impl IodModule {
    /// Name of the IOD module kind.
    pub fn module_type(self) -> &'static str {
        match self {
            IodModule::Patient => "Patient",
            IodModule::GeneralStudy => "GeneralStudy",
            IodModule::PatientStudy => "PatientStudy",
            IodModule::GeneralSeries => "GeneralSeries",
            IodModule::FrameOfReference => "FrameOfReference",
            IodModule::GeneralEquipment => "GeneralEquipment",
            IodModule::GeneralAcquisition => "GeneralAcquisition",
            IodModule::GeneralImage => "GeneralImage",
            IodModule::ImagePlane => "ImagePlane",
            IodModule::ImagePixel => "ImagePixel",
            IodModule::ModalityLut => "ModalityLUT",
            IodModule::VoiLut => "VOILUT",
            IodModule::SopCommon => "SOPCommon",
            IodModule::MrImage => "MRImage",
            IodModule::CtImage => "CTImage",
        }
    }

    /// Apply this module's attributes onto the working data set.
    pub fn apply(self, ds: &mut InMemDicomObject, ctx: &CompositionContext) {
        trace!(module = self.module_type(), "applying IOD module");
        match self {
            IodModule::Patient => patient::apply(ds, ctx),
            IodModule::GeneralStudy => general_study::apply(ds, ctx),
            IodModule::PatientStudy => patient_study::apply(ds, ctx),
            IodModule::GeneralSeries => general_series::apply(ds, ctx),
            IodModule::FrameOfReference => frame_of_reference::apply(ds, ctx),
            IodModule::GeneralEquipment => general_equipment::apply(ds, ctx),
            IodModule::GeneralAcquisition => general_acquisition::apply(ds, ctx),
            IodModule::GeneralImage => general_image::apply(ds, ctx),
            IodModule::ImagePlane => image_plane::apply(ds, ctx),
            IodModule::ImagePixel => image_pixel::apply(ds, ctx),
            IodModule::ModalityLut => modality_lut::apply(ds, ctx),
            IodModule::VoiLut => voi_lut::apply(ds, ctx),
            IodModule::SopCommon => sop_common::apply(ds, ctx),
            IodModule::MrImage => mr_image::apply(ds, ctx),
            IodModule::CtImage => ct_image::apply(ds, ctx),
        }
    }

    /// Attributes this module guarantees to be present after it is applied.
    pub fn attributes(self) -> &'static [Tag] {
        match self {
            IodModule::Patient => patient::ATTRIBUTES,
            IodModule::GeneralStudy => general_study::ATTRIBUTES,
            IodModule::PatientStudy => patient_study::ATTRIBUTES,
            IodModule::GeneralSeries => general_series::ATTRIBUTES,
            IodModule::FrameOfReference => frame_of_reference::ATTRIBUTES,
            IodModule::GeneralEquipment => general_equipment::ATTRIBUTES,
            IodModule::GeneralAcquisition => general_acquisition::ATTRIBUTES,
            IodModule::GeneralImage => general_image::ATTRIBUTES,
            IodModule::ImagePlane => image_plane::ATTRIBUTES,
            IodModule::ImagePixel => image_pixel::ATTRIBUTES,
            IodModule::ModalityLut => modality_lut::ATTRIBUTES,
            IodModule::VoiLut => voi_lut::ATTRIBUTES,
            IodModule::SopCommon => sop_common::ATTRIBUTES,
            IodModule::MrImage => mr_image::ATTRIBUTES,
            IodModule::CtImage => ct_image::ATTRIBUTES,
        }
    }
}

/// Apply a list of stages in order onto an existing data set.
pub fn apply_stages(ds: &mut InMemDicomObject, modules: &[IodModule], ctx: &CompositionContext) {
    for module in modules {
        module.apply(ds, ctx);
    }
}

/// Compose a new data set for the context's modality.
pub fn compose(ctx: &CompositionContext) -> InMemDicomObject {
    let mut ds = InMemDicomObject::new_empty();
    apply_stages(&mut ds, stages(ctx.dicom_type), ctx);
    ds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{read_str, read_u16};
    use dicom_dictionary_std::{tags, uids};

    fn elements(ds: &InMemDicomObject) -> Vec<(Tag, String)> {
        ds.iter()
            .map(|e| (e.header().tag, format!("{:?}", e.value())))
            .collect()
    }

    #[test]
    fn composed_data_set_contains_every_module_attribute() {
        for dicom_type in [DicomType::Mr, DicomType::Ct] {
            let ctx = CompositionContext::new(dicom_type);
            let ds = compose(&ctx);
            for module in stages(dicom_type) {
                for &tag in module.attributes() {
                    assert!(
                        ds.element(tag).is_ok(),
                        "{} is missing {} for {}",
                        module.module_type(),
                        tag,
                        dicom_type
                    );
                }
            }
        }
    }

    #[test]
    fn modality_module_comes_last() {
        assert_eq!(stages(DicomType::Mr).last(), Some(&IodModule::MrImage));
        assert_eq!(stages(DicomType::Ct).last(), Some(&IodModule::CtImage));
        assert!(!stages(DicomType::Mr).contains(&IodModule::CtImage));
        assert!(!stages(DicomType::Ct).contains(&IodModule::MrImage));
    }

    #[test]
    fn applying_stages_twice_changes_nothing() {
        for dicom_type in [DicomType::Mr, DicomType::Ct] {
            let ctx = CompositionContext::new(dicom_type);
            let once = compose(&ctx);
            let mut twice = once.clone();
            apply_stages(&mut twice, stages(dicom_type), &ctx);
            assert_eq!(elements(&once), elements(&twice));
        }
    }

    #[test]
    fn identity_follows_modality() {
        let ct = compose(&CompositionContext::new(DicomType::Ct));
        assert_eq!(read_str(&ct, tags::MODALITY).as_deref(), Some("CT"));
        assert_eq!(
            read_str(&ct, tags::SOP_CLASS_UID).as_deref(),
            Some(uids::CT_IMAGE_STORAGE)
        );

        let mr = compose(&CompositionContext::new(DicomType::Mr));
        assert_eq!(read_str(&mr, tags::MODALITY).as_deref(), Some("MR"));
        assert_eq!(
            read_str(&mr, tags::SOP_CLASS_UID).as_deref(),
            Some(uids::MR_IMAGE_STORAGE)
        );
    }

    #[test]
    fn run_uids_come_from_context() {
        let ctx = CompositionContext::new(DicomType::Mr);
        let ds = compose(&ctx);
        assert_eq!(
            read_str(&ds, tags::STUDY_INSTANCE_UID),
            Some(ctx.study_instance_uid.clone())
        );
        assert_eq!(
            read_str(&ds, tags::SERIES_INSTANCE_UID),
            Some(ctx.series_instance_uid.clone())
        );
        assert_eq!(
            read_str(&ds, tags::FRAME_OF_REFERENCE_UID),
            Some(ctx.frame_of_reference_uid.clone())
        );
    }

    #[test]
    fn ct_module_overrides_generic_pixel_defaults() {
        let ds = compose(&CompositionContext::new(DicomType::Ct));
        assert_eq!(read_u16(&ds, tags::BITS_ALLOCATED), Some(16));
        assert_eq!(read_u16(&ds, tags::BITS_STORED), Some(16));
        assert_eq!(read_u16(&ds, tags::HIGH_BIT), Some(15));
        assert_eq!(
            read_str(&ds, tags::PRESENTATION_LUT_SHAPE).as_deref(),
            Some("IDENTITY")
        );
    }
}
