//! A CLI tool for converting NIfTI files into DICOM series.
use std::path::PathBuf;

use clap::Parser;
use nii2dcm::{
    ConversionOptions, DicomType, RtUidPolicy, conversion::collect_inputs, run_nii2dcm,
};
use tracing::{Level, error, info};

/// Convert NIfTI volumes into DICOM series
#[derive(Debug, Parser)]
struct App {
    /// Path to a `.nii`/`.nii.gz` file, or a directory of them
    input: PathBuf,

    /// Output directory
    /// (default is the input path without its `.nii` suffix)
    #[arg(short = 'o', long = "output-dir")]
    output_dir: Option<PathBuf>,

    /// Type of DICOM series to write (MR or CT)
    #[arg(short = 'd', long = "dicom-type", default_value = "MR")]
    dicom_type: DicomType,

    /// Tag the slices as an RT Structure Set
    #[arg(long = "rt-structure")]
    rt_structure: bool,

    /// Use the fixed legacy RT Structure Set UIDs instead of fresh ones
    #[arg(long = "rt-legacy-uids", requires = "rt_structure")]
    rt_legacy_uids: bool,

    /// Patient Name
    /// (default is the output directory name)
    #[arg(short = 'p', long = "patient-name")]
    patient_name: Option<String>,

    /// Reference DICOM file to copy patient, study and equipment attributes from
    #[arg(short = 'r', long = "ref-dicom")]
    ref_dicom: Option<PathBuf>,

    /// Write slices in parallel
    #[arg(long = "parallel")]
    parallel: bool,

    /// Print more information about the conversion
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() {
    let App {
        input,
        output_dir,
        dicom_type,
        rt_structure,
        rt_legacy_uids,
        patient_name,
        ref_dicom,
        parallel,
        verbose,
    } = App::parse();

    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
            .finish(),
    )
    .unwrap_or_else(|e| {
        eprintln!("[ERROR] Could not set up global logging subscriber: {e}");
    });

    let inputs = collect_inputs(&input).unwrap_or_else(|e| {
        error!("{e}");
        std::process::exit(-1);
    });

    let options = ConversionOptions {
        output_dir,
        dicom_type,
        patient_name,
        reference_dicom: ref_dicom,
        rt_structure,
        rt_uid_policy: if rt_legacy_uids {
            RtUidPolicy::Legacy
        } else {
            RtUidPolicy::Fresh
        },
        parallel,
    };

    let mut failed = 0;
    for file in &inputs {
        match run_nii2dcm(file, &options) {
            Ok(summary) => {
                if let Some(report) = summary.reference.filter(|r| !r.is_complete()) {
                    info!(
                        "reference DICOM lacked {} of the transferable attributes",
                        report.missing.len()
                    );
                }
            }
            Err(e) => {
                error!("{}: {e}", file.display());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        error!("{failed} of {} conversions failed", inputs.len());
        std::process::exit(-2);
    }
}

#[cfg(test)]
mod tests {
    use crate::App;
    use clap::{CommandFactory, Parser};
    use nii2dcm::DicomType;

    #[test]
    fn verify_cli() {
        App::command().debug_assert();
    }

    #[test]
    fn dicom_type_is_case_insensitive() {
        let app = App::try_parse_from(["nii2dcm", "in.nii.gz", "-d", "ct"]).unwrap();
        assert_eq!(app.dicom_type, DicomType::Ct);
        let app = App::try_parse_from(["nii2dcm", "in.nii.gz"]).unwrap();
        assert_eq!(app.dicom_type, DicomType::Mr);
        assert!(App::try_parse_from(["nii2dcm", "in.nii.gz", "-d", "PET"]).is_err());
    }

    #[test]
    fn legacy_uids_require_rt_structure() {
        assert!(App::try_parse_from(["nii2dcm", "in.nii", "--rt-legacy-uids"]).is_err());
        assert!(
            App::try_parse_from(["nii2dcm", "in.nii", "--rt-structure", "--rt-legacy-uids"])
                .is_ok()
        );
    }
}
