//! Package writer seam: named parts go in, a container comes out.

use std::fs::File;
use std::io::{self, Seek, Write};
use std::path::Path;

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;

/// Sink for the parts of a package.
pub trait PackageArchive {
    /// Add a part whose bytes are already in memory.
    fn add_bytes(&mut self, name: &str, bytes: &[u8]) -> Result<()>;

    /// Add a part by streaming the contents of a file.
    fn add_file(&mut self, name: &str, path: &Path) -> Result<()>;
}

/// Deflate-compressed zip container.
pub struct ZipPackageArchive<W: Write + Seek> {
    zip: ZipWriter<W>,
    options: FileOptions<'static, ()>,
}

impl<W: Write + Seek> ZipPackageArchive<W> {
    pub fn new(output: W) -> Self {
        Self {
            zip: ZipWriter::new(output),
            options: FileOptions::<()>::default().compression_method(CompressionMethod::Deflated),
        }
    }

    /// Write the central directory and hand back the underlying writer.
    pub fn finish(self) -> Result<W> {
        Ok(self.zip.finish()?)
    }
}

impl<W: Write + Seek> PackageArchive for ZipPackageArchive<W> {
    fn add_bytes(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        self.zip.start_file(name, self.options)?;
        self.zip.write_all(bytes)?;
        Ok(())
    }

    fn add_file(&mut self, name: &str, path: &Path) -> Result<()> {
        let mut file = File::open(path)?;
        self.zip.start_file(name, self.options)?;
        io::copy(&mut file, &mut self.zip)?;
        Ok(())
    }
}
