//! Gzip-transparent file streams
//!
//! Files with a `.gz` extension are decompressed on read and compressed on
//! write; everything else passes through buffered as-is.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use mwex_core::{PipelineError, PipelineResult};

fn is_gzip(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "gz")
}

/// Open a file for line-oriented reading, decompressing `.gz` transparently
pub fn open_input(path: &Path) -> PipelineResult<Box<dyn BufRead>> {
    let file = File::open(path)
        .map_err(|e| PipelineError::io(format!("open {}", path.display()), e))?;
    if is_gzip(path) {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Open a file for writing, compressing to gzip when the path ends in `.gz`
pub fn open_output(path: &Path) -> PipelineResult<Box<dyn Write>> {
    let file = File::create(path)
        .map_err(|e| PipelineError::io(format!("create {}", path.display()), e))?;
    if is_gzip(path) {
        Ok(Box::new(BufWriter::new(GzEncoder::new(
            file,
            Compression::default(),
        ))))
    } else {
        Ok(Box::new(BufWriter::new(file)))
    }
}
