use crate::strand::Strand;
use anyhow::{ensure, Context, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const FQ1_COLUMN: &str = "fq1";
pub const FQ2_COLUMN: &str = "fq2";
pub const STRAND_COLUMN: &str = "strand";

#[derive(Error, Debug)]
pub enum SampleSheetError {
    #[error("the sample sheet {path} has no `{column}` column")]
    MissingColumn { path: String, column: &'static str },
}

/// A sample sheet held in memory. All columns are kept as-is so that the sheet can be
/// written back out with only the `strand` column changed.
pub struct SampleSheet {
    headers: StringRecord,
    rows: Vec<StringRecord>,
    fq1: usize,
    fq2: usize,
}

/// The read files of a single sample.
#[derive(Debug, PartialEq, Eq)]
pub struct Sample<'a> {
    pub fq1: &'a str,
    pub fq2: &'a str,
}

impl SampleSheet {
    pub fn from_path(path: &str) -> Result<Self> {
        let rdr = ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .with_context(|| format!("Unable to open sample sheet {path}"))?;

        Self::from_reader(rdr, path)
    }

    fn from_reader<R: std::io::Read>(mut rdr: csv::Reader<R>, path: &str) -> Result<Self> {
        let headers = rdr.headers()?.clone();

        let column = |column: &'static str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h.trim() == column)
                .ok_or_else(|| {
                    SampleSheetError::MissingColumn {
                        path: path.to_string(),
                        column,
                    }
                    .into()
                })
        };
        let fq1 = column(FQ1_COLUMN)?;
        let fq2 = column(FQ2_COLUMN)?;

        let rows = rdr
            .records()
            .collect::<csv::Result<Vec<_>>>()
            .with_context(|| format!("Unable to parse sample sheet {path}"))?;

        Ok(SampleSheet {
            headers,
            rows,
            fq1,
            fq2,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Iterates over the samples in the order they appear in the sheet.
    pub fn samples(&self) -> impl Iterator<Item = Sample<'_>> + '_ {
        self.rows.iter().map(|row| Sample {
            fq1: row.get(self.fq1).unwrap_or_default(),
            fq2: row.get(self.fq2).unwrap_or_default(),
        })
    }

    /// Writes the sheet with a `strand` column holding one label per sample. An existing
    /// `strand` column is overwritten in place; otherwise the column is appended.
    pub fn write_with_strands<W: std::io::Write>(&self, writer: W, strands: &[Strand]) -> Result<()> {
        ensure!(
            strands.len() == self.rows.len(),
            "Expected {} strand labels, got {}",
            self.rows.len(),
            strands.len()
        );

        let existing = self.headers.iter().position(|h| h.trim() == STRAND_COLUMN);
        let mut wtr = WriterBuilder::new().from_writer(writer);

        let with_strand = |record: &StringRecord, value: &str| -> StringRecord {
            let mut fields: Vec<&str> = record.iter().collect();
            match existing {
                Some(i) => fields[i] = value,
                None => fields.push(value),
            }
            StringRecord::from(fields)
        };

        wtr.write_record(&with_strand(&self.headers, STRAND_COLUMN))?;
        for (row, strand) in self.rows.iter().zip(strands) {
            wtr.write_record(&with_strand(row, &strand.to_string()))?;
        }

        wtr.flush()?;
        Ok(())
    }
}

/// Derives the default output path: `samples.csv` becomes `samples.stranded.csv`, and a
/// sheet without a `.csv` extension simply gains the `.stranded.csv` suffix.
pub fn default_output_path(samples: &str) -> PathBuf {
    let path = Path::new(samples);
    let is_csv = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    if is_csv {
        path.with_extension("stranded.csv")
    } else {
        PathBuf::from(format!("{samples}.stranded.csv"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn sheet(text: &str) -> Result<SampleSheet> {
        let rdr = ReaderBuilder::new()
            .has_headers(true)
            .from_reader(text.as_bytes());
        SampleSheet::from_reader(rdr, "test.csv")
    }

    fn written(sheet: &SampleSheet, strands: &[Strand]) -> String {
        let mut out = Vec::new();
        sheet.write_with_strands(&mut out, strands).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn reads_samples_in_order() {
        let s = sheet(indoc! {"
            name,fq1,fq2
            a,a_1.fq.gz,a_2.fq.gz
            b,b_1.fq,b_2.fq
        "})
        .unwrap();

        assert_eq!(s.len(), 2);
        let samples: Vec<_> = s.samples().collect();
        assert_eq!(
            samples,
            [
                Sample { fq1: "a_1.fq.gz", fq2: "a_2.fq.gz" },
                Sample { fq1: "b_1.fq", fq2: "b_2.fq" },
            ]
        );
    }

    #[test]
    fn missing_fq2() {
        let err = sheet("name,fq1\na,a_1.fq\n").err().unwrap();
        match err.downcast_ref::<SampleSheetError>() {
            Some(SampleSheetError::MissingColumn { column, .. }) => assert_eq!(*column, "fq2"),
            None => panic!("unexpected error: {err}"),
        }
    }

    #[test]
    fn appends_strand_column() {
        let s = sheet("name,fq1,fq2\na,a_1.fq,a_2.fq\nb,b_1.fq,b_2.fq\n").unwrap();
        assert_eq!(
            written(&s, &[Strand::Stranded, Strand::Unstranded]),
            "name,fq1,fq2,strand\na,a_1.fq,a_2.fq,stranded\nb,b_1.fq,b_2.fq,unstranded\n"
        );
    }

    #[test]
    fn overwrites_existing_strand_column() {
        let s = sheet("fq1,strand,fq2\na_1.fq,old,a_2.fq\n").unwrap();
        assert_eq!(
            written(&s, &[Strand::Reverse]),
            "fq1,strand,fq2\na_1.fq,reverse,a_2.fq\n"
        );
    }

    #[test]
    fn ragged_rows_are_rejected() {
        assert!(sheet("fq1,fq2,strand\na_1.fq,a_2.fq\n").is_err());
    }

    #[test]
    fn label_count_must_match() {
        let s = sheet("fq1,fq2\na_1.fq,a_2.fq\n").unwrap();
        assert!(s.write_with_strands(Vec::new(), &[]).is_err());
    }

    #[test]
    fn output_paths() {
        assert_eq!(default_output_path("samples.csv"), PathBuf::from("samples.stranded.csv"));
        assert_eq!(
            default_output_path("runs/batch.1.csv"),
            PathBuf::from("runs/batch.1.stranded.csv")
        );
        assert_eq!(default_output_path("samples.txt"), PathBuf::from("samples.txt.stranded.csv"));
    }
}
