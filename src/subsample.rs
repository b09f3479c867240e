use anyhow::{bail, Context, Result};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Every FASTQ record is exactly four lines: header, sequence, separator and quality.
pub const LINES_PER_RECORD: usize = 4;

#[derive(Error, Debug)]
pub enum SubsampleError {
    #[error("{path} has only {found} lines, but {required} are needed for the requested reads")]
    TooFewLines {
        path: PathBuf,
        required: usize,
        found: usize,
    },
    #[error("{num_reads} reads is more lines than can be counted")]
    TooManyReads { num_reads: usize },
}

/// Opens a FASTQ file for buffered reading. Files whose name ends in `gz` are
/// decompressed on the fly, including multi-member archives.
pub fn open_fastq(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).with_context(|| format!("Unable to open {}", path.display()))?;

    let is_gzip = path
        .file_name()
        .map(|name| name.to_string_lossy().ends_with("gz"))
        .unwrap_or(false);

    if is_gzip {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Copies the first `num_reads` records of `input` into the plain-text file `output`.
///
/// Lines are copied byte-for-byte without any parsing, so the output is a prefix of the
/// (decompressed) input.
///
/// # Errors
///
/// This function will return an error if:
/// * either file cannot be opened or written
/// * the input ends before `num_reads * 4` lines have been read, as a `SubsampleError`
/// * `num_reads * 4` does not fit in a `usize`, as a `SubsampleError`
pub fn subsample_reads(input: &Path, output: &Path, num_reads: usize) -> Result<()> {
    let required = num_reads
        .checked_mul(LINES_PER_RECORD)
        .ok_or(SubsampleError::TooManyReads { num_reads })?;

    let mut reader = open_fastq(input)?;
    let file = File::create(output)
        .with_context(|| format!("Unable to create {}", output.display()))?;
    let mut writer = BufWriter::new(file);

    let found = copy_lines(&mut reader, &mut writer, required)
        .with_context(|| format!("Unable to copy reads from {}", input.display()))?;

    if found < required {
        bail!(SubsampleError::TooFewLines {
            path: input.to_path_buf(),
            required,
            found,
        });
    }

    writer.flush()?;
    Ok(())
}

/// Copies up to `lines` lines from `reader` to `writer`, returning how many were copied.
/// Fewer than `lines` are copied only if the reader runs dry.
fn copy_lines(
    reader: &mut impl BufRead,
    writer: &mut impl Write,
    lines: usize,
) -> std::io::Result<usize> {
    let mut line = Vec::new();

    for copied in 0..lines {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(copied);
        }
        writer.write_all(&line)?;
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Cursor;

    fn fastq(records: usize) -> String {
        (0..records)
            .map(|i| format!("@read{i}\nACGTACGT\n+\nIIIIIIII\n"))
            .collect()
    }

    #[test]
    fn copies_exact_prefix() {
        let input = fastq(10);
        let mut out = Vec::new();
        let n = copy_lines(&mut Cursor::new(input.as_bytes()), &mut out, 12).unwrap();
        assert_eq!(n, 12);
        assert_eq!(String::from_utf8(out).unwrap(), fastq(3));
    }

    #[test]
    fn final_line_without_newline_counts() {
        let input = "@r\nAC\n+\nII";
        let mut out = Vec::new();
        assert_eq!(copy_lines(&mut Cursor::new(input.as_bytes()), &mut out, 4).unwrap(), 4);
        assert_eq!(out, input.as_bytes());
    }

    #[test]
    fn whole_file_is_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("reads.fq");
        let output = dir.path().join("sub.fq");
        std::fs::write(&input, fastq(10)).unwrap();

        subsample_reads(&input, &output, 10).unwrap();

        assert_eq!(std::fs::read(&input).unwrap(), std::fs::read(&output).unwrap());
    }

    #[test]
    fn output_parses_as_fastq() {
        use needletail::FastxReader;

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("reads.fastq");
        let output = dir.path().join("sub.fq");
        std::fs::write(&input, fastq(10)).unwrap();

        subsample_reads(&input, &output, 5).unwrap();

        let mut reader = needletail::parse_fastx_file(&output).unwrap();
        let mut records = 0;
        while let Some(rec) = reader.next() {
            let rec = rec.unwrap();
            assert_eq!(rec.id(), format!("read{records}").as_bytes());
            records += 1;
        }
        assert_eq!(records, 5);
    }

    #[test]
    fn too_few_reads() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("reads.fq");
        let output = dir.path().join("sub.fq");
        std::fs::write(&input, fastq(10)).unwrap();

        let err = subsample_reads(&input, &output, 20).unwrap_err();
        match err.downcast_ref::<SubsampleError>() {
            Some(SubsampleError::TooFewLines { required, found, .. }) => {
                assert_eq!(*required, 80);
                assert_eq!(*found, 40);
            }
            _ => panic!("unexpected error: {err}"),
        }
    }

    #[test]
    fn line_count_overflow_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("reads.fq");
        let output = dir.path().join("sub.fq");
        std::fs::write(&input, fastq(1)).unwrap();

        // 4 * 2^62 wraps to zero lines on 64-bit targets
        let num_reads = usize::MAX / LINES_PER_RECORD + 1;
        let err = subsample_reads(&input, &output, num_reads).unwrap_err();
        match err.downcast_ref::<SubsampleError>() {
            Some(SubsampleError::TooManyReads { num_reads: n }) => assert_eq!(*n, num_reads),
            _ => panic!("unexpected error: {err}"),
        }
        assert!(!output.exists());
    }

    #[test]
    fn gzip_matches_plain() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("reads.fq");
        let gz = dir.path().join("reads.fq.gz");
        std::fs::write(&plain, fastq(25)).unwrap();

        let mut encoder = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
        encoder.write_all(fastq(25).as_bytes()).unwrap();
        encoder.finish().unwrap();

        let from_plain = dir.path().join("plain.fq");
        let from_gz = dir.path().join("gz.fq");
        subsample_reads(&plain, &from_plain, 12).unwrap();
        subsample_reads(&gz, &from_gz, 12).unwrap();

        let expected = std::fs::read(&from_plain).unwrap();
        assert_eq!(expected, std::fs::read(&from_gz).unwrap());
        assert_eq!(expected, fastq(12).as_bytes());
    }

    #[test]
    fn missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = subsample_reads(
            &dir.path().join("absent.fq"),
            &dir.path().join("sub.fq"),
            1,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Unable to open"));
    }
}
