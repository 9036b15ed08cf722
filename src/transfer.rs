//! Transfer of NIfTI derived and reference DICOM attributes onto a
//! [`DicomObject`].
//!
//! Series level transfers run once per conversion, before the series
//! template is frozen. The instance transfer runs once per slice on that
//! slice's own copy.
use dicom::core::{Tag, VR};
use dicom::object::InMemDicomObject;
use dicom_dictionary_std::tags;
use thiserror::Error;
use tracing::{debug, warn};

use crate::attributes::{
    put_ds, put_i16, put_is, put_multi_ds, put_str, put_u16, put_u16s, round_to,
};
use crate::enums::DicomType;
use crate::object::DicomObject;
use crate::parameters::NiftiParameters;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("slice index {index} is out of range for {len} slices")]
    SliceIndexOutOfRange { index: usize, len: usize },
}

/// Outcome of a reference transfer, by attribute keyword.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceTransferReport {
    pub transferred: Vec<&'static str>,
    pub missing: Vec<&'static str>,
}

impl ReferenceTransferReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Copy the parameters shared by every slice of the series.
///
/// Pixel spacing and spacing between slices are rounded to two decimals.
/// The smallest pixel value is floored at 0. For CT the rescale type is set
/// to Hounsfield units and pixels are stored as signed 16 bit integers.
///
/// Calling this twice with the same parameters leaves the same state.
pub fn transfer_nii_hdr_series_tags(dcm: &mut DicomObject, params: &NiftiParameters) {
    let dicom_type = dcm.dicom_type();
    let ds = dcm.dataset_mut();

    put_u16(ds, tags::ROWS, params.rows);
    put_u16(ds, tags::COLUMNS, params.columns);
    put_multi_ds(
        ds,
        tags::PIXEL_SPACING,
        &[round_to(params.dim_x, 2), round_to(params.dim_y, 2)],
    );
    put_ds(ds, tags::SLICE_THICKNESS, params.slice_thickness);
    put_ds(
        ds,
        tags::SPACING_BETWEEN_SLICES,
        round_to(params.spacing_between_slices, 2),
    );
    put_multi_ds(
        ds,
        tags::IMAGE_ORIENTATION_PATIENT,
        &params.image_orientation_patient,
    );
    put_u16s(ds, tags::ACQUISITION_MATRIX, &params.acquisition_matrix);

    let smallest = params.smallest_image_pixel_value.trunc().max(0.0);
    let largest = params.largest_image_pixel_value.trunc();
    put_pixel_value(ds, tags::SMALLEST_IMAGE_PIXEL_VALUE, smallest, dicom_type);
    put_pixel_value(ds, tags::LARGEST_IMAGE_PIXEL_VALUE, largest, dicom_type);

    put_ds(ds, tags::WINDOW_CENTER, params.window_center);
    put_ds(ds, tags::WINDOW_WIDTH, params.window_width);
    put_ds(ds, tags::RESCALE_SLOPE, params.rescale_slope);
    put_ds(ds, tags::RESCALE_INTERCEPT, params.rescale_intercept);

    if dicom_type == DicomType::Ct {
        put_str(ds, tags::RESCALE_TYPE, VR::LO, "HU");
        put_u16(ds, tags::PIXEL_REPRESENTATION, 1);
        put_u16(ds, tags::HIGH_BIT, 15);
    }
}

// The VR of the smallest/largest pixel value follows the pixel representation.
fn put_pixel_value(
    ds: &mut InMemDicomObject,
    tag: Tag,
    value: f64,
    dicom_type: DicomType,
) {
    if dicom_type.signed_pixels() {
        put_i16(ds, tag, value.clamp(i16::MIN as f64, i16::MAX as f64) as i16);
    } else {
        put_u16(ds, tag, value.clamp(0.0, u16::MAX as f64) as u16);
    }
}

/// Copy the position dependent attributes of slice `index`.
///
/// # Errors
///
/// Returns [`TransferError::SliceIndexOutOfRange`] if `index` is past the end
/// of any per slice sequence in `params`.
pub fn transfer_nii_hdr_instance_tags(
    dcm: &mut DicomObject,
    params: &NiftiParameters,
    index: usize,
) -> Result<(), TransferError> {
    let out_of_range = || TransferError::SliceIndexOutOfRange {
        index,
        len: params.number_of_instances(),
    };
    let instance_number = *params.instance_number.get(index).ok_or_else(out_of_range)?;
    let slice_location = *params.slice_location.get(index).ok_or_else(out_of_range)?;
    let position = params
        .image_position_patient
        .get(index)
        .ok_or_else(out_of_range)?;

    let ds = dcm.dataset_mut();
    put_is(ds, tags::INSTANCE_NUMBER, instance_number.into());
    put_ds(ds, tags::SLICE_LOCATION, slice_location);
    put_multi_ds(ds, tags::IMAGE_POSITION_PATIENT, position);
    Ok(())
}

/// Copy the allow-listed series attributes from a reference data set.
///
/// Attributes absent from the reference are logged and skipped; the
/// transfer never fails.
pub fn transfer_ref_dicom_series_tags(
    dcm: &mut DicomObject,
    reference: &InMemDicomObject,
) -> ReferenceTransferReport {
    let mut report = ReferenceTransferReport::default();
    for attribute in dcm.attributes_to_transfer() {
        match reference.element(attribute.tag) {
            Ok(element) => {
                dcm.dataset_mut().put(element.clone());
                report.transferred.push(attribute.name);
            }
            Err(_) => {
                warn!(
                    attribute = attribute.name,
                    tag = %attribute.tag,
                    "reference DICOM has no such attribute, not transferred"
                );
                report.missing.push(attribute.name);
            }
        }
    }
    debug!(
        transferred = report.transferred.len(),
        missing = report.missing.len(),
        "reference transfer finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{read_str, read_u16};
    use crate::parameters::sample;
    use dicom::core::{DataElement, PrimitiveValue};

    fn element_f64s(ds: &InMemDicomObject, tag: Tag) -> Vec<f64> {
        ds.element(tag).unwrap().to_multi_float64().unwrap()
    }

    #[test]
    fn series_transfer_rounds_spacing() {
        let mut dcm = DicomObject::new(DicomType::Mr);
        let mut params = sample(64, 48, 3);
        params.spacing_between_slices = 2.4567;
        transfer_nii_hdr_series_tags(&mut dcm, &params);

        let ds = dcm.dataset();
        assert_eq!(element_f64s(ds, tags::PIXEL_SPACING), vec![0.98, 0.98]);
        assert_eq!(element_f64s(ds, tags::SPACING_BETWEEN_SLICES), vec![2.46]);
        assert_eq!(element_f64s(ds, tags::SLICE_THICKNESS), vec![2.5]);
        assert_eq!(read_u16(ds, tags::ROWS), Some(64));
        assert_eq!(read_u16(ds, tags::COLUMNS), Some(48));
        assert_eq!(
            ds.element(tags::ACQUISITION_MATRIX)
                .unwrap()
                .to_multi_int::<u16>()
                .unwrap(),
            vec![0, 64, 48, 0]
        );
    }

    #[test]
    fn smallest_pixel_value_is_floored_at_zero() {
        let mut dcm = DicomObject::new(DicomType::Mr);
        let mut params = sample(4, 4, 1);
        params.smallest_image_pixel_value = -5.0;
        transfer_nii_hdr_series_tags(&mut dcm, &params);
        assert_eq!(read_u16(dcm.dataset(), tags::SMALLEST_IMAGE_PIXEL_VALUE), Some(0));

        params.smallest_image_pixel_value = 3.0;
        transfer_nii_hdr_series_tags(&mut dcm, &params);
        assert_eq!(read_u16(dcm.dataset(), tags::SMALLEST_IMAGE_PIXEL_VALUE), Some(3));
    }

    #[test]
    fn ct_smallest_pixel_value_is_floored_at_zero() {
        let mut dcm = DicomObject::new(DicomType::Ct);
        let mut params = sample(4, 4, 1);
        params.smallest_image_pixel_value = -5.0;
        transfer_nii_hdr_series_tags(&mut dcm, &params);
        let smallest = dcm
            .dataset()
            .element(tags::SMALLEST_IMAGE_PIXEL_VALUE)
            .unwrap();
        assert_eq!(smallest.vr(), VR::SS);
        assert_eq!(smallest.to_int::<i16>().unwrap(), 0);

        params.smallest_image_pixel_value = 3.0;
        transfer_nii_hdr_series_tags(&mut dcm, &params);
        let smallest = dcm
            .dataset()
            .element(tags::SMALLEST_IMAGE_PIXEL_VALUE)
            .unwrap();
        assert_eq!(smallest.vr(), VR::SS);
        assert_eq!(smallest.to_int::<i16>().unwrap(), 3);
    }

    #[test]
    fn ct_series_uses_signed_hounsfield_storage() {
        let mut dcm = DicomObject::new(DicomType::Ct);
        let mut params = sample(4, 4, 1);
        params.largest_image_pixel_value = 1500.7;
        transfer_nii_hdr_series_tags(&mut dcm, &params);

        let ds = dcm.dataset();
        assert_eq!(read_str(ds, tags::RESCALE_TYPE).as_deref(), Some("HU"));
        assert_eq!(read_u16(ds, tags::PIXEL_REPRESENTATION), Some(1));
        assert_eq!(read_u16(ds, tags::HIGH_BIT), Some(15));
        let largest = ds.element(tags::LARGEST_IMAGE_PIXEL_VALUE).unwrap();
        assert_eq!(largest.vr(), VR::SS);
        assert_eq!(largest.to_int::<i16>().unwrap(), 1500);
    }

    #[test]
    fn series_transfer_is_idempotent() {
        let mut dcm = DicomObject::new(DicomType::Ct);
        let params = sample(8, 8, 2);
        transfer_nii_hdr_series_tags(&mut dcm, &params);
        let once = format!("{:?}", dcm.dataset());
        transfer_nii_hdr_series_tags(&mut dcm, &params);
        assert_eq!(once, format!("{:?}", dcm.dataset()));
    }

    #[test]
    fn instance_transfer_sets_position() {
        let mut dcm = DicomObject::new(DicomType::Mr);
        let params = sample(4, 4, 3);
        transfer_nii_hdr_instance_tags(&mut dcm, &params, 2).unwrap();

        let ds = dcm.dataset();
        assert_eq!(read_str(ds, tags::INSTANCE_NUMBER).as_deref(), Some("3"));
        assert_eq!(element_f64s(ds, tags::SLICE_LOCATION), vec![5.0]);
        assert_eq!(
            element_f64s(ds, tags::IMAGE_POSITION_PATIENT),
            vec![-120.0, 95.5, 5.0]
        );
    }

    #[test]
    fn instance_transfer_rejects_index_past_end() {
        let mut dcm = DicomObject::new(DicomType::Mr);
        let params = sample(4, 4, 3);
        let err = transfer_nii_hdr_instance_tags(&mut dcm, &params, 3).unwrap_err();
        assert!(matches!(
            err,
            TransferError::SliceIndexOutOfRange { index: 3, len: 3 }
        ));
    }

    #[test]
    fn reference_transfer_skips_missing_attributes() {
        let mut reference = InMemDicomObject::new_empty();
        reference.put(DataElement::new(
            tags::PATIENT_BIRTH_DATE,
            VR::DA,
            PrimitiveValue::from("19700101"),
        ));
        reference.put(DataElement::new(
            tags::MANUFACTURER,
            VR::LO,
            PrimitiveValue::from("ACME"),
        ));

        let mut dcm = DicomObject::new(DicomType::Mr);
        let report = transfer_ref_dicom_series_tags(&mut dcm, &reference);

        assert_eq!(report.transferred, vec!["PatientBirthDate", "Manufacturer"]);
        assert!(report.missing.contains(&"PatientSex"));
        assert!(!report.is_complete());
        assert_eq!(
            read_str(dcm.dataset(), tags::PATIENT_BIRTH_DATE).as_deref(),
            Some("19700101")
        );
        assert_eq!(read_str(dcm.dataset(), tags::MANUFACTURER).as_deref(), Some("ACME"));
        // missing attributes keep their placeholder
        assert!(dcm.dataset().element(tags::PATIENT_SEX).is_ok());
    }
}
