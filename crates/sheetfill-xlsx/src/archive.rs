//! Container handling for XLSX workbooks
//!
//! An XLSX file is a ZIP archive of XML parts. The archive is unpacked into
//! memory so individual parts can be swapped out and the untouched ones
//! re-serialized byte-for-byte.

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek, Write};

use zip::read::ZipArchive;
use zip::write::ZipWriter;
use zip::CompressionMethod;

use crate::error::{Result, XlsxError};

/// Path of the workbook part every XLSX container must carry.
pub const WORKBOOK_PART: &str = "xl/workbook.xml";

/// Path of the shared-string table, when present.
pub const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

/// An unpacked XLSX workbook container
#[derive(Debug)]
pub struct XlsxArchive {
    /// All parts in the container, keyed by path
    parts: HashMap<String, Vec<u8>>,
}

impl XlsxArchive {
    /// Unpack a workbook from raw bytes.
    ///
    /// Fails when the bytes are not a ZIP archive carrying a workbook part;
    /// no further structural validation happens here.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Unpack from any reader that implements Read + Seek
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut parts = HashMap::new();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();

            // Skip directories
            if name.ends_with('/') {
                continue;
            }

            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            parts.insert(name, contents);
        }

        let archive = Self { parts };
        if !archive.contains(WORKBOOK_PART) {
            return Err(XlsxError::MissingPart(WORKBOOK_PART.to_string()));
        }
        Ok(archive)
    }

    /// Get a part's contents by path
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.parts.get(path).map(|v| v.as_slice())
    }

    /// Check if a part exists in the container
    pub fn contains(&self, path: &str) -> bool {
        self.parts.contains_key(path)
    }

    /// Set or replace a part's contents
    pub fn set(&mut self, path: impl Into<String>, contents: Vec<u8>) {
        self.parts.insert(path.into(), contents);
    }

    /// The workbook definition part (xl/workbook.xml)
    pub fn workbook_xml(&self) -> Result<&[u8]> {
        self.get(WORKBOOK_PART)
            .ok_or_else(|| XlsxError::MissingPart(WORKBOOK_PART.to_string()))
    }

    /// The shared-string table, if the workbook has one
    pub fn shared_strings_xml(&self) -> Option<&[u8]> {
        self.get(SHARED_STRINGS_PART)
    }

    /// Paths of all worksheet parts, in stable (sorted) order
    pub fn worksheet_parts(&self) -> Vec<String> {
        let mut sheets: Vec<String> = self
            .parts
            .keys()
            .filter(|k| k.starts_with("xl/worksheets/") && k.ends_with(".xml"))
            .cloned()
            .collect();
        sheets.sort();
        sheets
    }

    /// Serialize the container back to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.write_to(&mut buffer)?;
        Ok(buffer.into_inner())
    }

    /// Write the container to any writer
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated);

        // Sort keys for deterministic output
        let mut paths: Vec<_> = self.parts.keys().collect();
        paths.sort();

        for path in paths {
            let contents = &self.parts[path];
            zip.start_file(path, options)?;
            zip.write_all(contents)?;
        }

        zip.finish()?;
        Ok(())
    }
}
