//! The composed DICOM object and the immutable series template built from it.
use dicom::core::Tag;
use dicom::object::InMemDicomObject;
use dicom_dictionary_std::tags;

use crate::enums::DicomType;
use crate::modules::{CompositionContext, compose};

/// An attribute that may be copied from a reference DICOM file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferableAttribute {
    pub name: &'static str,
    pub tag: Tag,
}

const fn transferable(name: &'static str, tag: Tag) -> TransferableAttribute {
    TransferableAttribute { name, tag }
}

/// Series level attributes copied from a reference DICOM file.
///
/// They describe the patient, the study and the acquiring equipment, and so
/// apply unchanged to any modality.
pub const ATTRIBUTES_TO_TRANSFER: &[TransferableAttribute] = &[
    transferable("PatientBirthDate", tags::PATIENT_BIRTH_DATE),
    transferable("PatientSex", tags::PATIENT_SEX),
    transferable("PatientAge", tags::PATIENT_AGE),
    transferable("PatientSize", tags::PATIENT_SIZE),
    transferable("PatientWeight", tags::PATIENT_WEIGHT),
    transferable("StudyInstanceUID", tags::STUDY_INSTANCE_UID),
    transferable("StudyID", tags::STUDY_ID),
    transferable("StudyDate", tags::STUDY_DATE),
    transferable("StudyTime", tags::STUDY_TIME),
    transferable("StudyDescription", tags::STUDY_DESCRIPTION),
    transferable("AccessionNumber", tags::ACCESSION_NUMBER),
    transferable("ReferringPhysicianName", tags::REFERRING_PHYSICIAN_NAME),
    transferable("Manufacturer", tags::MANUFACTURER),
    transferable("ManufacturerModelName", tags::MANUFACTURER_MODEL_NAME),
    transferable("InstitutionName", tags::INSTITUTION_NAME),
    transferable("StationName", tags::STATION_NAME),
    transferable("DeviceSerialNumber", tags::DEVICE_SERIAL_NUMBER),
    transferable("BodyPartExamined", tags::BODY_PART_EXAMINED),
    transferable("PatientPosition", tags::PATIENT_POSITION),
    transferable("ProtocolName", tags::PROTOCOL_NAME),
];

/// Working data set of one conversion run.
///
/// Built by composing the IOD modules of a modality, then mutated by the
/// series and reference transfers before being frozen into a
/// [`SeriesTemplate`].
#[derive(Debug, Clone)]
pub struct DicomObject {
    ds: InMemDicomObject,
    dicom_type: DicomType,
    attributes_to_transfer: &'static [TransferableAttribute],
}

impl DicomObject {
    /// Compose a new object for `dicom_type` with fresh run identifiers.
    pub fn new(dicom_type: DicomType) -> Self {
        Self::with_context(&CompositionContext::new(dicom_type))
    }

    /// Compose a new object from an existing composition context.
    pub fn with_context(ctx: &CompositionContext) -> Self {
        Self {
            ds: compose(ctx),
            dicom_type: ctx.dicom_type,
            attributes_to_transfer: ATTRIBUTES_TO_TRANSFER,
        }
    }

    pub fn dataset(&self) -> &InMemDicomObject {
        &self.ds
    }

    pub fn dataset_mut(&mut self) -> &mut InMemDicomObject {
        &mut self.ds
    }

    pub fn dicom_type(&self) -> DicomType {
        self.dicom_type
    }

    /// Attributes eligible for transfer from a reference DICOM file.
    pub fn attributes_to_transfer(&self) -> &'static [TransferableAttribute] {
        self.attributes_to_transfer
    }

    /// Freeze the series level state; slices are written from copies of it.
    pub fn into_template(self) -> SeriesTemplate {
        SeriesTemplate { object: self }
    }
}

/// Series level data set, immutable once built.
#[derive(Debug, Clone)]
pub struct SeriesTemplate {
    object: DicomObject,
}

impl SeriesTemplate {
    /// A private copy for one slice.
    pub fn instance(&self) -> DicomObject {
        self.object.clone()
    }

    pub fn dataset(&self) -> &InMemDicomObject {
        self.object.dataset()
    }

    pub fn dicom_type(&self) -> DicomType {
        self.object.dicom_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{put_is, read_str};
    use std::collections::HashSet;

    #[test]
    fn allow_list_has_unique_tags() {
        let tags: HashSet<_> = ATTRIBUTES_TO_TRANSFER.iter().map(|a| a.tag).collect();
        assert_eq!(tags.len(), ATTRIBUTES_TO_TRANSFER.len());
    }

    #[test]
    fn allow_list_attributes_exist_after_composition() {
        for dicom_type in [DicomType::Mr, DicomType::Ct] {
            let object = DicomObject::new(dicom_type);
            for attribute in object.attributes_to_transfer() {
                assert!(
                    object.dataset().element(attribute.tag).is_ok(),
                    "{} missing",
                    attribute.name
                );
            }
        }
    }

    #[test]
    fn template_instances_are_independent() {
        let template = DicomObject::new(DicomType::Mr).into_template();
        let mut first = template.instance();
        put_is(first.dataset_mut(), tags::INSTANCE_NUMBER, 1);
        let second = template.instance();

        assert_eq!(read_str(first.dataset(), tags::INSTANCE_NUMBER).as_deref(), Some("1"));
        assert_eq!(read_str(second.dataset(), tags::INSTANCE_NUMBER).as_deref(), Some(""));
        assert_eq!(
            read_str(template.dataset(), tags::INSTANCE_NUMBER).as_deref(),
            Some("")
        );
    }
}
