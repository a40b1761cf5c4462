use crate::loading::error::LoadError;
use log::info;
use polars::frame::DataFrame;
use polars::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::{Path, PathBuf};

/// A finite, forward-only sequence of row batches read from a CSV file.
///
/// The header line is read once when the iterator is opened; each call to
/// `next` reads up to `batch_size` data lines and parses them (header
/// re-applied) into a `DataFrame`. Batches are emitted in file order and
/// preserve row order within themselves. The underlying reader is consumed
/// as batches are produced, so the sequence can be exhausted exactly once.
///
/// Rows within a batch are parsed independently of other batches; numeric
/// consumers cast columns at the point of use, so a batch whose numeric
/// column happens to be all-missing still aggregates correctly.
#[derive(Debug)]
pub struct RowBatches {
    reader: BufReader<File>,
    header: String,
    batch_size: usize,
    path: PathBuf,
    done: bool,
}

impl RowBatches {
    pub(crate) fn open(path: &Path, batch_size: usize) -> Result<RowBatches, LoadError> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                log::error!("File error: '{}' not found", path.display());
                LoadError::FileNotFound(path.to_path_buf())
            } else {
                LoadError::Io {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        let mut reader = BufReader::new(file);
        let mut header = String::new();
        reader.read_line(&mut header).map_err(|e| LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        if !header.contains(',') {
            log::error!(
                "CSV parsing error: header of '{}' has no delimiter",
                path.display()
            );
            return Err(LoadError::NotDelimited(path.to_path_buf()));
        }
        if !header.ends_with('\n') {
            header.push('\n');
        }

        Ok(RowBatches {
            reader,
            header,
            batch_size: batch_size.max(1),
            path: path.to_path_buf(),
            done: false,
        })
    }

    fn read_batch(&mut self) -> Result<Option<DataFrame>, LoadError> {
        if self.done {
            return Ok(None);
        }
        let mut buf = self.header.clone();
        let mut rows = 0;

        while rows < self.batch_size {
            let mut line = String::new();
            let read = self.reader.read_line(&mut line).map_err(|e| LoadError::Io {
                path: self.path.clone(),
                source: e,
            })?;
            if read == 0 {
                self.done = true;
                break;
            }
            if line.trim().is_empty() {
                continue;
            }
            if !line.ends_with('\n') {
                line.push('\n');
            }
            buf.push_str(&line);
            rows += 1;
        }

        if rows == 0 {
            return Ok(None);
        }

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .into_reader_with_file_handle(Cursor::new(buf.into_bytes()))
            .finish()
            .map_err(|e| LoadError::CsvParse {
                path: self.path.clone(),
                source: e,
            })?;

        info!("Yielding {} rows from '{}'", df.height(), self.path.display());
        Ok(Some(df))
    }
}

impl Iterator for RowBatches {
    type Item = Result<DataFrame, LoadError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_batch() {
            Ok(Some(df)) => Some(Ok(df)),
            Ok(None) => None,
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loading::loader::WeatherLoader;
    use std::io::Write;

    fn sample_csv(dir: &Path, rows: usize) -> PathBuf {
        let path = dir.join("batched.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "Location,Rainfall").unwrap();
        for i in 0..rows {
            writeln!(file, "Station{},{}.0", i % 3, i).unwrap();
        }
        path
    }

    #[test]
    fn batches_come_in_file_order_with_fixed_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = sample_csv(dir.path(), 10);

        let batches: Vec<DataFrame> = WeatherLoader::new(path)
            .batched(4)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(
            batches.iter().map(|b| b.height()).collect::<Vec<_>>(),
            [4, 4, 2]
        );

        // First row of the first batch is the first row of the file.
        let first = batches[0].column("Rainfall").unwrap();
        assert_eq!(first.f64().unwrap().get(0), Some(0.0));
        // First row of the last batch continues where the previous left off.
        let last = batches[2].column("Rainfall").unwrap();
        assert_eq!(last.f64().unwrap().get(0), Some(8.0));
    }

    #[test]
    fn exhausted_iterator_stays_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = sample_csv(dir.path(), 3);

        let mut batches = WeatherLoader::new(path).batched(10).unwrap();
        assert!(batches.next().is_some());
        assert!(batches.next().is_none());
        assert!(batches.next().is_none());
    }

    #[test]
    fn missing_file_fails_at_open() {
        let err = WeatherLoader::new("data/fake.csv").batched(100).unwrap_err();
        assert!(matches!(err, LoadError::FileNotFound(_)));
    }

    #[test]
    fn undelimited_header_fails_at_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.csv");
        std::fs::write(&path, "justoneword\nanother\n").unwrap();

        let err = WeatherLoader::new(path).batched(100).unwrap_err();
        assert!(matches!(err, LoadError::NotDelimited(_)));
    }
}
