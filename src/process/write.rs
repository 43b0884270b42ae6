use anyhow::{Context, Result};
use arrow::csv::WriterBuilder;
use arrow::record_batch::RecordBatch;
use std::{fs, path::Path};
use tempfile::NamedTempFile;
use tracing::debug;

/// Write `batch` as a headed, comma-delimited UTF-8 CSV at `path`.
///
/// Parent directories are created as needed. The data goes to a temporary
/// sibling first and is renamed over `path`, so a failed run never leaves a
/// truncated file behind.
pub fn write_csv(batch: &RecordBatch, path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).with_context(|| format!("creating output directory {:?}", dir))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temporary file in {:?}", dir))?;
    {
        let mut writer = WriterBuilder::new()
            .with_header(true)
            .build(tmp.as_file_mut());
        writer
            .write(batch)
            .with_context(|| format!("writing CSV for {:?}", path))?;
    }
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("flushing {:?}", tmp.path()))?;

    debug!(tmp = %tmp.path().display(), dest = %path.display(), "renaming into place");
    tmp.persist(path)
        .with_context(|| format!("renaming temporary file onto {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::convert::{to_record_batch, TrafficRecord};
    use tempfile::tempdir;

    fn sample() -> Vec<TrafficRecord> {
        vec![
            TrafficRecord {
                estacion: "Station A".into(),
                anio: 2021,
                mes: Some(3),
                codigo_estacion: "E1".into(),
                departamento: "Lima".into(),
                trafico_total: 1500.0,
            },
            TrafficRecord {
                estacion: "Pozo, Norte".into(),
                anio: 2021,
                mes: None,
                codigo_estacion: "E2".into(),
                departamento: "Piura".into(),
                trafico_total: 0.0,
            },
        ]
    }

    #[test]
    fn writes_header_and_rows_in_nested_dir() -> Result<()> {
        let tmp = tempdir()?;
        let out = tmp.path().join("a").join("b").join("out.csv");
        write_csv(&to_record_batch(&sample())?, &out)?;

        let text = fs::read_to_string(&out)?;
        assert_eq!(
            text,
            "estacion,anio,mes,codigo_estacion,departamento,trafico_total\n\
             Station A,2021,3,E1,Lima,1500.0\n\
             \"Pozo, Norte\",2021,,E2,Piura,0.0\n"
        );
        Ok(())
    }

    #[test]
    fn float_rendering_of_totals() -> Result<()> {
        let tmp = tempdir()?;
        let out = tmp.path().join("floats.csv");
        let recs: Vec<TrafficRecord> = [0.0, 12.5, 1_500_000.0, 1e20]
            .into_iter()
            .map(|t| TrafficRecord {
                estacion: "A".into(),
                anio: 2021,
                mes: Some(1),
                codigo_estacion: "E1".into(),
                departamento: "Lima".into(),
                trafico_total: t,
            })
            .collect();
        write_csv(&to_record_batch(&recs)?, &out)?;

        let totals: Vec<String> = fs::read_to_string(&out)?
            .lines()
            .skip(1)
            .map(|l| l.rsplit(',').next().unwrap_or_default().to_string())
            .collect();
        assert_eq!(totals, ["0.0", "12.5", "1500000.0", "1e20"]);
        Ok(())
    }

    #[test]
    fn empty_batch_still_has_header() -> Result<()> {
        let tmp = tempdir()?;
        let out = tmp.path().join("empty.csv");
        write_csv(&to_record_batch(&[])?, &out)?;
        assert_eq!(
            fs::read_to_string(&out)?,
            "estacion,anio,mes,codigo_estacion,departamento,trafico_total\n"
        );
        Ok(())
    }

    #[test]
    fn overwrites_previous_output() -> Result<()> {
        let tmp = tempdir()?;
        let out = tmp.path().join("out.csv");
        fs::write(&out, "stale contents that are much longer than the header\n")?;
        write_csv(&to_record_batch(&[])?, &out)?;
        assert!(!fs::read_to_string(&out)?.contains("stale"));
        // only the output itself is left behind
        assert_eq!(fs::read_dir(tmp.path())?.count(), 1);
        Ok(())
    }
}
