//! Archive handling for PPTX files
//!
//! PPTX files are ZIP archives containing XML parts and media resources.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;

use zip::read::ZipArchive;
use zip::write::ZipWriter;
use zip::CompressionMethod;

use crate::error::{PptxError, Result};

/// Represents an unpacked PPTX document
#[derive(Debug)]
pub struct PptxArchive {
    /// All files in the archive, keyed by path
    files: HashMap<String, Vec<u8>>,
}

impl PptxArchive {
    /// Create an empty archive
    pub fn new() -> Self {
        Self {
            files: HashMap::new(),
        }
    }

    /// Open and unpack a PPTX file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Create from any reader that implements Read + Seek
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut files = HashMap::new();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();

            // Skip directories
            if name.ends_with('/') {
                continue;
            }

            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            files.insert(name, contents);
        }

        Ok(Self { files })
    }

    /// Get a file's contents by path
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(|v| v.as_slice())
    }

    /// Get a file's contents as a string
    pub fn get_string(&self, path: &str) -> Option<String> {
        self.files
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Get the presentation part (ppt/presentation.xml)
    pub fn presentation_xml(&self) -> Result<&[u8]> {
        self.get("ppt/presentation.xml")
            .ok_or_else(|| PptxError::MissingFile("ppt/presentation.xml".to_string()))
    }

    /// Get a slide part by one-based number (ppt/slides/slideN.xml)
    pub fn slide_xml(&self, number: u32) -> Option<&[u8]> {
        self.get(&format!("ppt/slides/slide{}.xml", number))
    }

    /// Get a slide's relationships part
    pub fn slide_rels_xml(&self, number: u32) -> Option<&[u8]> {
        self.get(&format!("ppt/slides/_rels/slide{}.xml.rels", number))
    }

    /// One-based numbers of all slide parts, sorted
    pub fn slide_numbers(&self) -> Vec<u32> {
        let mut numbers: Vec<u32> = self
            .files
            .keys()
            .filter_map(|path| {
                path.strip_prefix("ppt/slides/slide")?
                    .strip_suffix(".xml")?
                    .parse()
                    .ok()
            })
            .collect();
        numbers.sort_unstable();
        numbers
    }

    /// Paths of all media parts (ppt/media/*)
    pub fn media_paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self
            .files
            .keys()
            .filter(|k| k.starts_with("ppt/media/"))
            .map(|s| s.as_str())
            .collect();
        paths.sort_unstable();
        paths
    }

    /// Check if a file exists in the archive
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// List all files in the archive
    pub fn file_list(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(|s| s.as_str())
    }

    /// Set or update a file's contents
    pub fn set(&mut self, path: impl Into<String>, contents: Vec<u8>) {
        self.files.insert(path.into(), contents);
    }

    /// Set a file's contents from a string
    pub fn set_string(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into().into_bytes());
    }

    /// Remove a file from the archive
    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        self.files.remove(path)
    }

    /// Write the archive to a file
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(file)
    }

    /// Write the archive to any writer
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated);

        // Sort keys for deterministic output
        let mut paths: Vec<_> = self.files.keys().collect();
        paths.sort();

        for path in paths {
            let contents = &self.files[path];
            zip.start_file(path, options)?;
            zip.write_all(contents)?;
        }

        zip.finish()?;
        Ok(())
    }
}

impl Default for PptxArchive {
    fn default() -> Self {
        Self::new()
    }
}
