use anyhow::Context;
use std::io::Write;
use std::path::Path;

use crate::util::text_io::create_output;

/// Saves any serializable struct as pretty-printed JSON.
/// # Arguments
/// * `data` - the data in memory
/// * `out_filename` - path to write to; gzipped if it ends in .gz, "-" for stdout
/// # Errors
/// * if the output cannot be created or written
/// * if JSON serialization fails
pub fn save_json<T: serde::Serialize>(data: &T, out_filename: &Path) -> anyhow::Result<()> {
    let mut writer = create_output(out_filename)?;
    serde_json::to_writer_pretty(&mut writer, data)
        .with_context(|| format!("Error while serializing {out_filename:?}:"))?;
    writer.flush()
        .with_context(|| format!("Error while flushing output to {out_filename:?}:"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::index_entry::IndexEntry;

    #[test]
    fn test_save_json() {
        let tmp_dir = tempfile::tempdir().unwrap();
        let out_fn = tmp_dir.path().join("entry.json");
        save_json(&IndexEntry::new("1".to_string(), 3), &out_fn).unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&out_fn).unwrap()).unwrap();
        assert_eq!(value["chrom"], "1");
        assert_eq!(value["record_count"], 3);
    }

    #[test]
    fn test_save_json_gz() {
        let tmp_dir = tempfile::tempdir().unwrap();
        let out_fn = tmp_dir.path().join("entry.json.gz");
        save_json(&IndexEntry::new("X".to_string(), 7), &out_fn).unwrap();

        let reader = crate::util::text_io::open_input(&out_fn).unwrap();
        let value: serde_json::Value = serde_json::from_reader(reader).unwrap();
        assert_eq!(value["chrom"], "X");
        assert_eq!(value["record_count"], 7);
    }
}
