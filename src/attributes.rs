//! Helpers for reading and writing attributes of an in-memory data set
//! with the value representation each attribute requires.
use dicom::core::{DataElement, PrimitiveValue, Tag, VR, value::DataSetSequence};
use dicom::object::InMemDicomObject;

/// Longest text accepted by a DS (decimal string) value.
const MAX_DS_LENGTH: usize = 16;

/// Format a number as a DS value of at most 16 characters.
pub fn format_ds(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let value = if value == 0.0 { 0.0 } else { value };

    let plain = value.to_string();
    if plain.len() <= MAX_DS_LENGTH {
        return plain;
    }

    for precision in (0..MAX_DS_LENGTH).rev() {
        let text = trim_fraction(format!("{value:.precision$}"));
        if text.len() <= MAX_DS_LENGTH {
            return text;
        }
    }

    for precision in (0..10).rev() {
        let text = format!("{value:.precision$e}");
        if text.len() <= MAX_DS_LENGTH {
            return text;
        }
    }
    format!("{value:e}")
}

fn trim_fraction(text: String) -> String {
    if !text.contains('.') {
        return text;
    }
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "" | "-" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Round to a fixed number of decimal places, ties to even.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

pub(crate) fn put_str(ds: &mut InMemDicomObject, tag: Tag, vr: VR, value: impl Into<String>) {
    ds.put(DataElement::new(tag, vr, PrimitiveValue::from(value.into())));
}

pub(crate) fn put_strs<I, S>(ds: &mut InMemDicomObject, tag: Tag, vr: VR, values: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let values = values.into_iter().map(Into::into).collect();
    ds.put(DataElement::new(tag, vr, PrimitiveValue::Strs(values)));
}

/// Put a zero-length placeholder, for type 2 attributes with no known value.
pub(crate) fn put_empty(ds: &mut InMemDicomObject, tag: Tag, vr: VR) {
    if vr == VR::SQ {
        ds.put(DataElement::new(
            tag,
            VR::SQ,
            DataSetSequence::<InMemDicomObject>::empty(),
        ));
    } else {
        ds.put(DataElement::new(tag, vr, PrimitiveValue::Empty));
    }
}

pub(crate) fn put_u16(ds: &mut InMemDicomObject, tag: Tag, value: u16) {
    ds.put(DataElement::new(tag, VR::US, PrimitiveValue::from(value)));
}

pub(crate) fn put_u16s(ds: &mut InMemDicomObject, tag: Tag, values: &[u16]) {
    ds.put(DataElement::new(
        tag,
        VR::US,
        PrimitiveValue::U16(values.iter().copied().collect()),
    ));
}

pub(crate) fn put_i16(ds: &mut InMemDicomObject, tag: Tag, value: i16) {
    ds.put(DataElement::new(tag, VR::SS, PrimitiveValue::from(value)));
}

pub(crate) fn put_ds(ds: &mut InMemDicomObject, tag: Tag, value: f64) {
    put_str(ds, tag, VR::DS, format_ds(value));
}

pub(crate) fn put_multi_ds(ds: &mut InMemDicomObject, tag: Tag, values: &[f64]) {
    put_strs(ds, tag, VR::DS, values.iter().map(|&v| format_ds(v)));
}

pub(crate) fn put_is(ds: &mut InMemDicomObject, tag: Tag, value: i64) {
    put_str(ds, tag, VR::IS, value.to_string());
}

/// Read an integer attribute, `None` when absent or empty.
pub fn read_u16(ds: &InMemDicomObject, tag: Tag) -> Option<u16> {
    let element = ds.element(tag).ok()?;
    if element.value().primitive().is_some_and(|v| v.multiplicity() == 0) {
        return None;
    }
    element.to_int::<u16>().ok()
}

/// Read a text attribute, trimmed of padding, `None` when absent.
pub fn read_str(ds: &InMemDicomObject, tag: Tag) -> Option<String> {
    let element = ds.element(tag).ok()?;
    element
        .to_str()
        .ok()
        .map(|s| s.trim_end_matches(['\0', ' ']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_dictionary_std::tags;

    #[test]
    fn ds_keeps_short_values() {
        assert_eq!(format_ds(0.98), "0.98");
        assert_eq!(format_ds(-12.5), "-12.5");
        assert_eq!(format_ds(3.0), "3");
        assert_eq!(format_ds(-0.0), "0");
    }

    #[test]
    fn ds_shortens_long_values() {
        let text = format_ds(-123.456789012345678);
        assert!(text.len() <= MAX_DS_LENGTH, "{text}");
        assert!((text.parse::<f64>().unwrap() + 123.456789012345678).abs() < 1e-9);

        let text = format_ds(1.0e20);
        assert!(text.len() <= MAX_DS_LENGTH, "{text}");
        assert_eq!(text.parse::<f64>().unwrap(), 1.0e20);
    }

    #[test]
    fn ds_handles_non_finite() {
        assert_eq!(format_ds(f64::NAN), "0");
        assert_eq!(format_ds(f64::INFINITY), "0");
    }

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(round_to(0.9765625, 2), 0.98);
        assert_eq!(round_to(2.0, 2), 2.0);
        assert_eq!(round_to(1.234, 2), 1.23);
        assert_eq!(round_to(0.625, 2), 0.62);
        assert_eq!(round_to(1.125, 2), 1.12);
        assert_eq!(round_to(2.125, 2), 2.12);
    }

    #[test]
    fn empty_placeholders_read_as_absent_values() {
        let mut ds = InMemDicomObject::new_empty();
        put_empty(&mut ds, tags::ROWS, VR::US);
        assert!(ds.element(tags::ROWS).is_ok());
        assert_eq!(read_u16(&ds, tags::ROWS), None);

        put_u16(&mut ds, tags::ROWS, 64);
        assert_eq!(read_u16(&ds, tags::ROWS), Some(64));
    }

    #[test]
    fn multi_valued_decimal_strings() {
        let mut ds = InMemDicomObject::new_empty();
        put_multi_ds(&mut ds, tags::PIXEL_SPACING, &[0.98, 1.5]);
        let values = ds
            .element(tags::PIXEL_SPACING)
            .unwrap()
            .to_multi_float64()
            .unwrap();
        assert_eq!(values, vec![0.98, 1.5]);
    }
}
