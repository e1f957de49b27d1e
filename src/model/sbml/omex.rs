//! COMBINE archive (OMEX) with the SBML documents.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use eyre::{Result, WrapErr};
use quick_xml::events::{BytesDecl, Event};
use quick_xml::Writer;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const MANIFEST_NS: &str = "http://identifiers.org/combine.specifications/omex-manifest";
const OMEX_FORMAT: &str = "http://identifiers.org/combine.specifications/omex";
const SBML_FORMAT: &str = "http://identifiers.org/combine.specifications/sbml.level-3.version-2";

/// Manifest listing the archive, itself and the documents; the first document is the master
pub fn manifest(documents: &[(String, String)]) -> io::Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer
        .create_element("omexManifest")
        .with_attribute(("xmlns", MANIFEST_NS))
        .write_inner_content(|w| {
            w.create_element("content")
                .with_attribute(("location", "."))
                .with_attribute(("format", OMEX_FORMAT))
                .write_empty()?;
            w.create_element("content")
                .with_attribute(("location", "./manifest.xml"))
                .with_attribute(("format", MANIFEST_NS))
                .write_empty()?;
            for (k, (file, _)) in documents.iter().enumerate() {
                let location = format!("./{file}");
                w.create_element("content")
                    .with_attribute(("location", location.as_str()))
                    .with_attribute(("format", SBML_FORMAT))
                    .with_attribute(("master", if k == 0 { "true" } else { "false" }))
                    .write_empty()?;
            }
            Ok(())
        })?;
    String::from_utf8(writer.into_inner()).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Writes `documents` (file name, content) with their manifest into the archive at `path`
pub fn write_omex(path: &Path, documents: &[(String, String)]) -> Result<()> {
    let file =
        File::create(path).wrap_err_with(|| format!("Could not create {}", path.display()))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let manifest = manifest(documents).wrap_err("Could not serialize the OMEX manifest")?;
    zip.start_file("manifest.xml", options)?;
    zip.write_all(manifest.as_bytes())?;
    for (name, content) in documents {
        zip.start_file(name.as_str(), options)?;
        zip.write_all(content.as_bytes())?;
    }
    zip.finish()
        .wrap_err_with(|| format!("Could not write {}", path.display()))?;
    tracing::debug!("Archive written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn archive_contains_manifest_and_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.omex");
        let documents = vec![
            ("a.xml".to_string(), "<a/>".to_string()),
            ("b.xml".to_string(), "<b/>".to_string()),
        ];
        write_omex(&path, &documents).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(archive.len(), 3);

        let mut manifest = String::new();
        archive
            .by_name("manifest.xml")
            .unwrap()
            .read_to_string(&mut manifest)
            .unwrap();
        assert!(manifest.contains("location=\"./a.xml\""));
        assert!(manifest.contains("master=\"true\""));
        assert_eq!(manifest.matches("sbml.level-3.version-2").count(), 2);

        let mut content = String::new();
        archive
            .by_name("b.xml")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "<b/>");
    }
}
