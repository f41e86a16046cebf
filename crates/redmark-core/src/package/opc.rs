use crate::error::{RedmarkError, Result};
use crate::xml::{builder, parser, XmlTree};
use std::collections::{BTreeMap, HashMap};
use std::io::{Cursor, Read, Write};
use zip::read::ZipArchive;
use zip::write::ZipWriter;
use zip::CompressionMethod;

use super::content_types::ContentTypes;
use super::relationships::{
    build_relationships_tree, next_relationship_id, parse_relationships, Relationship, TargetMode,
};
use super::uri;

const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// In-memory OPC package: raw parts plus typed views of the content-type
/// and relationship parts. Part lookup is case-insensitive; URIs are
/// stored without a leading slash. Saving is deterministic (sorted part
/// order) and never mutates the input buffer.
#[derive(Clone, Debug)]
pub struct OpcPackage {
    parts: BTreeMap<String, Vec<u8>>,
    lower_index: HashMap<String, String>,
    content_types: ContentTypes,
    relationships: BTreeMap<String, Vec<Relationship>>,
}

impl OpcPackage {
    pub fn open(bytes: &[u8]) -> Result<Self> {
        let cursor = Cursor::new(bytes);
        let mut archive = ZipArchive::new(cursor)
            .map_err(|e| RedmarkError::malformed(format!("not a ZIP archive: {e}")))?;

        let mut raw_parts: BTreeMap<String, Vec<u8>> = BTreeMap::new();
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| RedmarkError::malformed(format!("unreadable ZIP entry: {e}")))?;
            if file.is_dir() {
                continue;
            }
            let name = uri::normalize(file.name());
            let mut content = Vec::new();
            file.read_to_end(&mut content)?;
            raw_parts.insert(name, content);
        }

        let ct_bytes = raw_parts
            .remove(CONTENT_TYPES_PART)
            .ok_or_else(|| RedmarkError::malformed("missing [Content_Types].xml"))?;
        let content_types = ContentTypes::parse(&ct_bytes)?;

        let mut relationships = BTreeMap::new();
        let rels_names: Vec<String> = raw_parts
            .keys()
            .filter(|name| uri::source_for_rels(name).is_some())
            .cloned()
            .collect();
        for rels_name in rels_names {
            let source = uri::source_for_rels(&rels_name).unwrap();
            let bytes = raw_parts.remove(&rels_name).unwrap();
            relationships.insert(source, parse_relationships(&bytes)?);
        }

        let lower_index = raw_parts
            .keys()
            .map(|name| (name.to_ascii_lowercase(), name.clone()))
            .collect();

        Ok(Self {
            parts: raw_parts,
            lower_index,
            content_types,
            relationships,
        })
    }

    pub fn save(&self) -> Result<Vec<u8>> {
        let mut entries: BTreeMap<String, Vec<u8>> = self.parts.clone();
        for (source, rels) in &self.relationships {
            if rels.is_empty() {
                continue;
            }
            let tree = build_relationships_tree(rels);
            entries.insert(uri::rels_path_for(source), builder::serialize_bytes(&tree)?);
        }

        let mut buffer = Cursor::new(Vec::new());
        let mut writer = ZipWriter::new(&mut buffer);
        let options: zip::write::FileOptions<'_, ()> =
            zip::write::FileOptions::default().compression_method(CompressionMethod::Deflated);

        // [Content_Types].xml leads; remaining parts follow in sorted order.
        writer.start_file(CONTENT_TYPES_PART, options)?;
        writer.write_all(&builder::serialize_bytes(&self.content_types.to_tree())?)?;
        for (name, content) in &entries {
            writer.start_file(name, options)?;
            writer.write_all(content)?;
        }

        writer.finish()?;
        Ok(buffer.into_inner())
    }

    fn canonical_name(&self, part: &str) -> Option<String> {
        let normalized = uri::normalize(part);
        if self.parts.contains_key(&normalized) {
            return Some(normalized);
        }
        self.lower_index
            .get(&normalized.to_ascii_lowercase())
            .cloned()
    }

    pub fn has_part(&self, part: &str) -> bool {
        self.canonical_name(part).is_some()
    }

    pub fn part(&self, part: &str) -> Option<&[u8]> {
        let name = self.canonical_name(part)?;
        self.parts.get(&name).map(Vec::as_slice)
    }

    /// Parses a required XML part; absence or malformed XML is fatal.
    pub fn xml_part(&self, part: &str) -> Result<XmlTree> {
        let bytes = self
            .part(part)
            .ok_or_else(|| RedmarkError::malformed(format!("missing part '{part}'")))?;
        parser::parse_bytes(bytes)
    }

    /// Parses an optional XML part; absence is `Ok(None)`.
    pub fn try_xml_part(&self, part: &str) -> Result<Option<XmlTree>> {
        match self.part(part) {
            Some(bytes) => Ok(Some(parser::parse_bytes(bytes)?)),
            None => Ok(None),
        }
    }

    pub fn set_part(&mut self, part: &str, content: Vec<u8>) {
        let name = self
            .canonical_name(part)
            .unwrap_or_else(|| uri::normalize(part));
        self.lower_index
            .insert(name.to_ascii_lowercase(), name.clone());
        self.parts.insert(name, content);
    }

    pub fn set_xml_part(&mut self, part: &str, tree: &XmlTree) -> Result<()> {
        let bytes = builder::serialize_bytes(tree)?;
        self.set_part(part, bytes);
        Ok(())
    }

    pub fn remove_part(&mut self, part: &str) {
        if let Some(name) = self.canonical_name(part) {
            self.parts.remove(&name);
            self.lower_index.remove(&name.to_ascii_lowercase());
            self.relationships.remove(&name);
            self.content_types.remove_override(&name);
        }
    }

    pub fn part_names(&self) -> Vec<&str> {
        self.parts.keys().map(String::as_str).collect()
    }

    pub fn content_types(&self) -> &ContentTypes {
        &self.content_types
    }

    pub fn ensure_content_type(&mut self, part: &str, content_type: &str) {
        self.content_types.ensure(&uri::normalize(part), content_type);
    }

    /// Relationships declared by a part; pass `""` for the package root.
    pub fn relationships(&self, source_part: &str) -> &[Relationship] {
        self.relationships
            .get(&uri::normalize(source_part))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn relationship_by_id(&self, source_part: &str, r_id: &str) -> Option<&Relationship> {
        self.relationships(source_part).iter().find(|r| r.id == r_id)
    }

    pub fn relationship_of_type(&self, source_part: &str, rel_type: &str) -> Option<&Relationship> {
        self.relationships(source_part)
            .iter()
            .find(|r| r.rel_type == rel_type)
    }

    /// Resolves an internal relationship id to the target part URI.
    pub fn resolve_relationship(&self, source_part: &str, r_id: &str) -> Result<String> {
        let source = uri::normalize(source_part);
        let rel = self
            .relationship_by_id(&source, r_id)
            .ok_or_else(|| RedmarkError::BrokenReference {
                part: source.clone(),
                r_id: r_id.to_string(),
            })?;
        Ok(uri::resolve(&source, &rel.target))
    }

    pub fn add_relationship(
        &mut self,
        source_part: &str,
        rel_type: &str,
        target: &str,
        target_mode: TargetMode,
    ) -> String {
        let source = uri::normalize(source_part);
        let rels = self.relationships.entry(source).or_default();
        let id = next_relationship_id(rels);
        rels.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            target_mode,
        });
        id
    }

    /// Adds a part together with a relationship from `source_part` and a
    /// content-type registration. Returns the allocated relationship id.
    pub fn add_part_with_relationship(
        &mut self,
        source_part: &str,
        part: &str,
        content: Vec<u8>,
        rel_type: &str,
        content_type: &str,
    ) -> String {
        let part = uri::normalize(part);
        self.set_part(&part, content);
        self.ensure_content_type(&part, content_type);
        let target = uri::relative_target(&uri::normalize(source_part), &part);
        self.add_relationship(source_part, rel_type, &target, TargetMode::Internal)
    }

    /// The part the package root's officeDocument relationship points at.
    pub fn main_document_part(&self) -> Result<String> {
        let rel = self
            .relationship_of_type("", crate::xml::namespaces::rel_type::OFFICE_DOCUMENT)
            .ok_or_else(|| RedmarkError::malformed("package has no officeDocument relationship"))?;
        Ok(uri::resolve("", &rel.target))
    }
}
