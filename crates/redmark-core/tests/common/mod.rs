//! In-memory fixture builders: minimal but valid OPC packages assembled
//! from XML strings, so no binary fixtures live in the repository.
#![allow(dead_code)]

use std::io::{Cursor, Write};
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

pub fn build_package(parts: &[(&str, String)]) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    let mut writer = ZipWriter::new(&mut buffer);
    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, content) in parts {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
    buffer.into_inner()
}

pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub mod docx {
    use super::{build_package, escape_xml};

    pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

    /// One plain paragraph.
    pub fn para(text: &str) -> String {
        if text.is_empty() {
            return "<w:p/>".to_string();
        }
        format!(
            r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
            escape_xml(text)
        )
    }

    /// A table from rows of cell texts.
    pub fn table(rows: &[&[&str]]) -> String {
        let mut xml = String::from("<w:tbl><w:tblPr/><w:tblGrid/>");
        for row in rows {
            xml.push_str("<w:tr>");
            for cell in *row {
                xml.push_str("<w:tc><w:tcPr/>");
                xml.push_str(&para(cell));
                xml.push_str("</w:tc>");
            }
            xml.push_str("</w:tr>");
        }
        xml.push_str("</w:tbl>");
        xml
    }

    /// Assembles a minimal .docx whose body holds the given block XML.
    pub fn build(body_blocks: &str) -> Vec<u8> {
        let content_types = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#
            .to_string();

        let root_rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#
            .to_string();

        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{W_NS}"><w:body>{body_blocks}<w:sectPr/></w:body></w:document>"#
        );

        build_package(&[
            ("[Content_Types].xml", content_types),
            ("_rels/.rels", root_rels),
            ("word/document.xml", document),
        ])
    }

    /// Convenience: a document of plain paragraphs.
    pub fn from_paragraphs(texts: &[&str]) -> Vec<u8> {
        let body: String = texts.iter().map(|t| para(t)).collect();
        build(&body)
    }
}

pub mod xlsx {
    use super::{build_package, escape_xml};

    pub const S_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
    pub const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    /// A string-valued cell.
    pub fn cell(address: &str, value: &str) -> String {
        format!(
            r#"<c r="{address}" t="str"><v>{}</v></c>"#,
            escape_xml(value)
        )
    }

    /// A formula cell without a cached value.
    pub fn formula_cell(address: &str, formula: &str) -> String {
        format!(
            r#"<c r="{address}"><f>{}</f></c>"#,
            escape_xml(formula)
        )
    }

    pub fn row(number: u32, cells: &str) -> String {
        format!(r#"<row r="{number}">{cells}</row>"#)
    }

    /// Assembles a minimal .xlsx from (sheet name, sheetData inner XML)
    /// pairs.
    pub fn build(sheets: &[(&str, &str)]) -> Vec<u8> {
        let mut parts: Vec<(String, String)> = Vec::new();

        let mut overrides = String::from(
            r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
        );
        let mut sheet_entries = String::new();
        let mut workbook_rels = String::new();
        for (i, (name, sheet_data)) in sheets.iter().enumerate() {
            let n = i + 1;
            overrides.push_str(&format!(
                r#"<Override PartName="/xl/worksheets/sheet{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
            ));
            sheet_entries.push_str(&format!(
                r#"<sheet name="{}" sheetId="{n}" r:id="rId{n}"/>"#,
                escape_xml(name)
            ));
            workbook_rels.push_str(&format!(
                r#"<Relationship Id="rId{n}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{n}.xml"/>"#
            ));
            parts.push((
                format!("xl/worksheets/sheet{n}.xml"),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="{S_NS}"><sheetData>{sheet_data}</sheetData></worksheet>"#
                ),
            ));
        }

        let content_types = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  {overrides}
</Types>"#
        );

        let root_rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#
            .to_string();

        let workbook = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="{S_NS}" xmlns:r="{R_NS}"><sheets>{sheet_entries}</sheets></workbook>"#
        );

        let workbook_rels = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{workbook_rels}</Relationships>"#
        );

        let mut all: Vec<(&str, String)> = vec![
            ("[Content_Types].xml", content_types),
            ("_rels/.rels", root_rels),
            ("xl/workbook.xml", workbook),
            ("xl/_rels/workbook.xml.rels", workbook_rels),
        ];
        for (name, content) in &parts {
            all.push((name.as_str(), content.clone()));
        }
        build_package(&all)
    }
}

pub mod pptx {
    use super::{build_package, escape_xml};

    pub const P_NS: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
    pub const A_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
    pub const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    /// A text box shape at the given EMU position/size. A `ph_type` turns
    /// it into a placeholder (e.g. "title").
    pub fn textbox(
        id: u32,
        name: &str,
        text: &str,
        x: i64,
        y: i64,
        cx: i64,
        cy: i64,
        ph_type: Option<&str>,
    ) -> String {
        let ph = match ph_type {
            Some(t) => format!(r#"<p:nvPr><p:ph type="{t}"/></p:nvPr>"#),
            None => "<p:nvPr/>".to_string(),
        };
        format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{}"/><p:cNvSpPr/>{ph}</p:nvSpPr><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>"#,
            escape_xml(name),
            escape_xml(text)
        )
    }

    /// Assembles a minimal .pptx from per-slide shape XML.
    pub fn build(slides: &[&str]) -> Vec<u8> {
        let mut parts: Vec<(String, String)> = Vec::new();

        let mut overrides = String::from(
            r#"<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>"#,
        );
        let mut sld_ids = String::new();
        let mut pres_rels = String::new();
        for (i, shapes) in slides.iter().enumerate() {
            let n = i + 1;
            overrides.push_str(&format!(
                r#"<Override PartName="/ppt/slides/slide{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#
            ));
            sld_ids.push_str(&format!(r#"<p:sldId id="{}" r:id="rId{n}"/>"#, 255 + n));
            pres_rels.push_str(&format!(
                r#"<Relationship Id="rId{n}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{n}.xml"/>"#
            ));
            parts.push((
                format!("ppt/slides/slide{n}.xml"),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="{A_NS}" xmlns:r="{R_NS}" xmlns:p="{P_NS}"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{shapes}</p:spTree></p:cSld></p:sld>"#
                ),
            ));
        }

        let content_types = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  {overrides}
</Types>"#
        );

        let root_rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
</Relationships>"#
            .to_string();

        let presentation = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="{A_NS}" xmlns:r="{R_NS}" xmlns:p="{P_NS}"><p:sldIdLst>{sld_ids}</p:sldIdLst><p:sldSz cx="9144000" cy="6858000"/></p:presentation>"#
        );

        let pres_rels = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{pres_rels}</Relationships>"#
        );

        let mut all: Vec<(&str, String)> = vec![
            ("[Content_Types].xml", content_types),
            ("_rels/.rels", root_rels),
            ("ppt/presentation.xml", presentation),
            ("ppt/_rels/presentation.xml.rels", pres_rels),
        ];
        for (name, content) in &parts {
            all.push((name.as_str(), content.clone()));
        }
        build_package(&all)
    }
}
