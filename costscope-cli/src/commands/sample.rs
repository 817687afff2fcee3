//! Sample command - the template CSV and the bundled dataset

use std::path::PathBuf;

use anyhow::{Context, Result};

use super::print_json;
use crate::output::success;
use costscope_core::adapters::sample::{
    sample_records, DATASET_FILENAME, TEMPLATE_CSV, TEMPLATE_FILENAME,
};
use costscope_core::services::export::{records_csv, resolve_target, write_atomic};

/// File name used when `--output` is a directory
fn default_filename(dataset: bool) -> &'static str {
    if dataset {
        DATASET_FILENAME
    } else {
        TEMPLATE_FILENAME
    }
}

pub fn run(output: Option<PathBuf>, dataset: bool, json: bool) -> Result<()> {
    if json {
        return print_json(&sample_records());
    }

    let content = if dataset {
        records_csv(&sample_records())?
    } else {
        TEMPLATE_CSV.as_bytes().to_vec()
    };

    match output {
        Some(output) => {
            let path = resolve_target(&output, default_filename(dataset));
            write_atomic(&path, &content)
                .with_context(|| format!("Failed to write sample to {}", path.display()))?;
            success(&format!("Sample data written to {}", path.display()));
        }
        None => print!("{}", String::from_utf8_lossy(&content)),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_and_template_get_distinct_names() {
        let dir = std::env::temp_dir();
        assert!(resolve_target(&dir, default_filename(true)).ends_with("sample-aws-cost-dataset.csv"));
        assert!(resolve_target(&dir, default_filename(false)).ends_with("sample-aws-cost-data.csv"));
    }
}
