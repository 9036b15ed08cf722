//! Geometry and intensity parameters derived from a NIfTI header.

/// Parameters consumed by the series and instance tag transfers.
///
/// Series level values apply to every slice; the per slice sequences hold
/// one entry per slice index.
#[derive(Debug, Clone, PartialEq)]
pub struct NiftiParameters {
    pub rows: u16,
    pub columns: u16,
    /// Spacing between rows (mm).
    pub dim_x: f64,
    /// Spacing between columns (mm).
    pub dim_y: f64,
    pub slice_thickness: f64,
    pub spacing_between_slices: f64,
    pub image_orientation_patient: [f64; 6],
    pub acquisition_matrix: [u16; 4],
    pub smallest_image_pixel_value: f64,
    pub largest_image_pixel_value: f64,
    pub window_center: f64,
    pub window_width: f64,
    pub rescale_slope: f64,
    pub rescale_intercept: f64,
    pub instance_number: Vec<i32>,
    pub slice_location: Vec<f64>,
    pub image_position_patient: Vec<[f64; 3]>,
}

impl NiftiParameters {
    /// Number of slices described by the per slice sequences.
    ///
    /// The sequences are expected to have equal lengths; the shortest one
    /// bounds the valid slice indices.
    pub fn number_of_instances(&self) -> usize {
        self.instance_number
            .len()
            .min(self.slice_location.len())
            .min(self.image_position_patient.len())
    }
}

#[cfg(test)]
pub(crate) fn sample(rows: u16, columns: u16, slices: usize) -> NiftiParameters {
    NiftiParameters {
        rows,
        columns,
        dim_x: 0.9765625,
        dim_y: 0.9765625,
        slice_thickness: 2.5,
        spacing_between_slices: 2.5,
        image_orientation_patient: [0.0, 1.0, 0.0, 1.0, 0.0, 0.0],
        acquisition_matrix: [0, rows, columns, 0],
        smallest_image_pixel_value: -5.0,
        largest_image_pixel_value: 1000.0,
        window_center: 497.5,
        window_width: 1005.0,
        rescale_slope: 1.0,
        rescale_intercept: 0.0,
        instance_number: (1..=slices as i32).collect(),
        slice_location: (0..slices).map(|k| k as f64 * 2.5).collect(),
        image_position_patient: (0..slices).map(|k| [-120.0, 95.5, k as f64 * 2.5]).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_count_is_bounded_by_shortest_sequence() {
        let mut params = sample(4, 4, 10);
        assert_eq!(params.number_of_instances(), 10);
        params.slice_location.truncate(7);
        assert_eq!(params.number_of_instances(), 7);
    }
}
