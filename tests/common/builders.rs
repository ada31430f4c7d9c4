//! Test data builders for archive fixtures

use framescope_rs::archive::npy_text::encode_bytes_scalar;
use ndarray::{Array1, Array2, Array3};
use ndarray_npy::WriteNpyExt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;

/// Builder for `.npz` archives
pub struct NpzBuilder {
    entries: Vec<(String, Vec<u8>)>,
}

fn npy<A: WriteNpyExt>(array: &A) -> Vec<u8> {
    let mut buf = Vec::new();
    array.write_npy(&mut buf).expect("failed to encode npy");
    buf
}

impl NpzBuilder {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn array<A: WriteNpyExt>(mut self, name: &str, array: &A) -> Self {
        self.entries.push((name.to_string(), npy(array)));
        self
    }

    /// A complete `frame_/channels_/tickinfo_` triple.
    pub fn frame(self, tag: &str, index: u64, samples: Array2<f32>, tickinfo: [f64; 3]) -> Self {
        let ids = Array1::from_iter(0..samples.nrows() as i32);
        self.array(&format!("frame_{}_{}", tag, index), &samples)
            .array(&format!("channels_{}_{}", tag, index), &ids)
            .array(&format!("tickinfo_{}_{}", tag, index), &Array1::from(tickinfo.to_vec()))
    }

    pub fn tensor(self, index: u64, plane: u64, samples: Array2<f32>) -> Self {
        self.array(&format!("tensor_{}_{}_array", index, plane), &samples)
    }

    pub fn volume(self, index: u64, plane: u64, samples: Array3<f32>) -> Self {
        self.array(&format!("tensor_{}_{}_array", index, plane), &samples)
    }

    /// JSON sidecar stored as a NumPy byte string.
    pub fn metadata(self, index: u64, plane: u64, json: &str) -> Self {
        self.text(&format!("tensor_{}_{}_metadata.json", index, plane), json)
    }

    /// Byte-string entry under an arbitrary name.
    pub fn text(mut self, name: &str, text: &str) -> Self {
        self.entries.push((name.to_string(), encode_bytes_scalar(text)));
        self
    }

    pub fn write(self, path: &Path) -> PathBuf {
        let file = File::create(path).expect("failed to create archive");
        let mut zip = zip::ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, bytes) in self.entries {
            zip.start_file(format!("{}.npy", name), options)
                .expect("failed to start entry");
            zip.write_all(&bytes).expect("failed to write entry");
        }
        zip.finish().expect("failed to finish archive");
        path.to_path_buf()
    }
}

/// A `rows x cols` frame whose value encodes its position: `row * 100 + col`.
pub fn ramp(rows: usize, cols: usize) -> Array2<f32> {
    Array2::from_shape_fn((rows, cols), |(r, c)| (r * 100 + c) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp() {
        let frame = ramp(2, 3);
        assert_eq!(frame[[1, 2]], 102.0);
    }
}
