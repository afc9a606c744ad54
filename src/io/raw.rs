/// Read / write voxel buffers as raw little-endian `f32`s

use std::fs::File;
use std::io::{Write, Read, BufWriter, BufReader};
use std::path::Path;

use units::todo::Intensityf32;

pub fn write(data: impl Iterator<Item = Intensityf32>, path: &Path) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut buf = BufWriter::new(file);
    for datum in data {
        buf.write_all(&datum.to_le_bytes())?;
    }
    buf.flush()
}

type IORes<T> = std::io::Result<T>;

pub fn read<'a>(path: &Path) -> IORes<impl Iterator<Item = IORes<Intensityf32>> + 'a> {
    let file = File::open(path)?;
    let mut buf = BufReader::new(file);
    let mut buffer = [0; 4];

    Ok(std::iter::from_fn(move || {
        use std::io::ErrorKind::UnexpectedEof;
        match buf.read_exact(&mut buffer) {
            Ok(()) => Some(Ok(Intensityf32::from_le_bytes(buffer))),
            Err(e) if e.kind() == UnexpectedEof => None,
            Err(e) => Some(Err(e)),
        }
    }))
}

/// The whole buffer at once
pub fn read_all(path: &Path) -> IORes<Vec<Intensityf32>> {
    read(path)?.collect()
}
