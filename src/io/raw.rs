/// Read / write float arrays as raw little-endian binary

use std::fs::File;
use std::io::{Write, Read, BufWriter, BufReader};
use std::path::Path;

use crate::{Error, Result};

pub fn write(data: impl Iterator<Item = f32>, path: &Path) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() { std::fs::create_dir_all(dir)?; }
    }
    let file = File::create(path)?;
    let mut buf = BufWriter::new(file);
    for datum in data {
        buf.write_all(&datum.to_le_bytes())?;
    }
    buf.flush()
}

type IORes<T> = std::io::Result<T>;

pub fn read(path: &Path) -> IORes<impl Iterator<Item = IORes<f32>>> {
    let file = File::open(path)?;
    let mut buf = BufReader::new(file);
    let mut buffer = [0; 4];

    Ok(std::iter::from_fn(move || {
        use std::io::ErrorKind::UnexpectedEof;
        match buf.read_exact(&mut buffer) {
            Ok(()) => Some(Ok(f32::from_le_bytes(buffer))),
            Err(e) if e.kind() == UnexpectedEof => None,
            Err(e) => Some(Err(e)),
        }
    }))
}

/// Read the whole file, attaching the path to any failure
pub fn read_all(path: &Path) -> Result<Vec<f32>> {
    let with_path = |source: std::io::Error| Error::ReadFile { path: path.to_path_buf(), source };
    read(path).map_err(with_path)?
        .collect::<IORes<_>>()
        .map_err(with_path)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn raw_io_roundtrip() -> Result<()> {
        use tempfile::tempdir;
        #[allow(unused)] use pretty_assertions::{assert_eq, assert_ne};

        let dir = tempdir()?;
        // Missing parent directories get created
        let file_path = dir.path().join("nested/test.raw");

        let original_data = vec![1.23, -4.56, 7.89, 0.0];
        write(original_data.iter().copied(), &file_path)?;

        assert_eq!(std::fs::metadata(&file_path)?.len(), 16);
        assert_eq!(read_all(&file_path)?, original_data);
        Ok(())
    }

    #[test]
    fn missing_file_reports_its_path() {
        let path = Path::new("/definitely/not/here.raw");
        match read_all(path) {
            Err(Error::ReadFile { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected {other:?}"),
        }
    }
}
