use crate::core::models::hierarchy::Hierarchy;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// A coordinate file format that reads into a [`Hierarchy`] and writes one
/// back out.
///
/// `Metadata` carries the non-atom records a round trip must keep. Its
/// default value means "atoms only".
pub trait StructureFile {
    type Metadata: Default;

    type Error: Error + From<io::Error>;

    /// Parses a whole file from `reader`.
    ///
    /// `source_info` names the input in error messages and log spans; pass
    /// an empty string for anonymous text.
    ///
    /// # Errors
    ///
    /// Returns an error if a record is malformed or the model and chain
    /// layout is inconsistent.
    fn read_from(
        reader: &mut impl BufRead,
        source_info: &str,
    ) -> Result<(Hierarchy, Self::Metadata), Self::Error>;

    /// Writes `hierarchy` together with the records kept in `metadata`.
    ///
    /// # Errors
    ///
    /// Returns an error if a field overflows its columns or writing fails.
    fn write_to(
        hierarchy: &Hierarchy,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error>;

    /// Writes the atom records only.
    fn write_hierarchy_to(hierarchy: &Hierarchy, writer: &mut impl Write) -> Result<(), Self::Error> {
        Self::write_to(hierarchy, &Self::Metadata::default(), writer)
    }

    /// Reads a file from disk, naming it by its path in errors.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<(Hierarchy, Self::Metadata), Self::Error> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        Self::read_from(&mut reader, &path.display().to_string())
    }

    fn write_to_path<P: AsRef<Path>>(
        hierarchy: &Hierarchy,
        metadata: &Self::Metadata,
        path: P,
    ) -> Result<(), Self::Error> {
        let mut writer = BufWriter::new(File::create(path)?);
        Self::write_to(hierarchy, metadata, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    fn write_hierarchy_to_path<P: AsRef<Path>>(
        hierarchy: &Hierarchy,
        path: P,
    ) -> Result<(), Self::Error> {
        Self::write_to_path(hierarchy, &Self::Metadata::default(), path)
    }
}
