//! Presentation canonicalization: walks `sldIdLst`, resolves slide,
//! layout, notes, image and chart relationships, and builds slide/shape
//! signatures.

use super::document::PmlDocument;
use super::settings::PmlComparerSettings;
use super::signatures::{
    ParagraphSignature, Placeholder, PresentationSignature, RunProperties, RunSignature,
    ShapeKind, ShapeSignature, SlideSignature, TextBodySignature, Transform,
};
use crate::cancel::CancelToken;
use crate::error::{RedmarkError, Result};
use crate::hash::{sha256_hex, sha256_hex_str};
use crate::package::OpcPackage;
use crate::xml::namespaces::{a, c, p, r, rel_type};
use crate::xml::{builder, XmlTree};
use indextree::NodeId;

pub struct PmlCanonicalizer;

impl PmlCanonicalizer {
    pub fn canonicalize(
        document: &PmlDocument,
        settings: &PmlComparerSettings,
        cancel: &CancelToken,
        warnings: &mut Vec<String>,
    ) -> Result<PresentationSignature> {
        let package = document.package();
        let pres_uri = document.presentation_uri();
        let pres = package.xml_part(&pres_uri)?;
        let pres_root = pres
            .root()
            .ok_or_else(|| RedmarkError::malformed("empty presentation part"))?;

        let mut signature = PresentationSignature::default();

        if let Some(sld_sz) = pres.find_child(pres_root, &p::sld_sz()) {
            signature.slide_cx = pres.attr_i64(sld_sz, "cx").unwrap_or(0);
            signature.slide_cy = pres.attr_i64(sld_sz, "cy").unwrap_or(0);
        }

        let Some(sld_id_lst) = pres.find_child(pres_root, &p::sld_id_lst()) else {
            return Ok(signature);
        };

        let mut index = 0usize;
        for sld_id in pres.find_children(sld_id_lst, &p::sld_id()) {
            cancel.check()?;
            let Some(r_id) = pres.attr(sld_id, &r::id()) else {
                continue;
            };
            index += 1;
            let slide_uri = match package.resolve_relationship(&pres_uri, r_id) {
                Ok(uri) => uri,
                Err(_) => {
                    warnings.push(format!(
                        "slide {index} references missing relationship '{r_id}'"
                    ));
                    continue;
                }
            };
            let slide = canonicalize_slide(package, &slide_uri, index, settings)?;
            signature.slides.push(slide);
        }

        Ok(signature)
    }
}

fn canonicalize_slide(
    package: &OpcPackage,
    slide_uri: &str,
    index: usize,
    settings: &PmlComparerSettings,
) -> Result<SlideSignature> {
    let tree = package.xml_part(slide_uri)?;
    let root = tree
        .root()
        .ok_or_else(|| RedmarkError::malformed(format!("empty slide part '{slide_uri}'")))?;

    let mut slide = SlideSignature {
        index,
        part_uri: slide_uri.to_string(),
        layout_hash: None,
        background_hash: None,
        transition_hash: None,
        title_text: None,
        notes_text: None,
        content_hash: String::new(),
        shapes: Vec::new(),
    };

    // Canonical layout name: the layout part's `type` attribute, hashed.
    if let Some(rel) = package.relationship_of_type(slide_uri, rel_type::SLIDE_LAYOUT) {
        let layout_uri = crate::package::uri::resolve(slide_uri, &rel.target);
        if let Ok(Some(layout)) = package.try_xml_part(&layout_uri) {
            if let Some(layout_root) = layout.root() {
                let layout_type = layout.attr_local(layout_root, "type").unwrap_or("custom");
                slide.layout_hash = Some(sha256_hex_str(layout_type));
            }
        }
    }

    let c_sld = tree
        .find_child(root, &p::c_sld())
        .ok_or_else(|| RedmarkError::malformed(format!("slide '{slide_uri}' has no cSld")))?;

    if let Some(bg) = tree.find_child(c_sld, &p::bg()) {
        if let Ok(fragment) = builder::serialize_fragment(&tree, bg) {
            slide.background_hash = Some(sha256_hex_str(&fragment));
        }
    }

    if settings.compare_transitions {
        if let Some(transition) = tree.find_child(root, &p::transition()) {
            if let Ok(fragment) = builder::serialize_fragment(&tree, transition) {
                slide.transition_hash = Some(sha256_hex_str(&fragment));
            }
        }
    }

    let sp_tree = tree
        .find_child(c_sld, &p::sp_tree())
        .ok_or_else(|| RedmarkError::malformed(format!("slide '{slide_uri}' has no spTree")))?;

    let mut z_order = 0usize;
    for element in tree.child_elements(sp_tree) {
        if !is_shape_element(&tree, element) {
            continue;
        }
        let shape = canonicalize_shape(&tree, package, slide_uri, element, z_order, settings)?;
        if let Some(ph) = &shape.placeholder {
            if matches!(ph.ph_type.as_str(), "title" | "ctrTitle") && slide.title_text.is_none() {
                slide.title_text = shape
                    .text_body
                    .as_ref()
                    .map(|tb| tb.plain_text.clone());
            }
        }
        slide.shapes.push(shape);
        z_order += 1;
    }

    if settings.compare_notes {
        if let Some(rel) = package.relationship_of_type(slide_uri, rel_type::NOTES_SLIDE) {
            let notes_uri = crate::package::uri::resolve(slide_uri, &rel.target);
            slide.notes_text = extract_notes_text(package, &notes_uri).ok();
        }
    }

    slide.content_hash = slide_content_hash(&slide);
    Ok(slide)
}

fn is_shape_element(tree: &XmlTree, element: NodeId) -> bool {
    let Some(name) = tree.name(element) else {
        return false;
    };
    name == &p::sp()
        || name == &p::pic()
        || name == &p::graphic_frame()
        || name == &p::grp_sp()
        || name == &p::cxn_sp()
}

/// Hash over title plus per-shape `name:kind:text`, in z-order.
fn slide_content_hash(slide: &SlideSignature) -> String {
    let mut content = String::new();
    content.push_str(slide.title_text.as_deref().unwrap_or(""));
    for shape in &slide.shapes {
        content.push('|');
        content.push_str(&shape.name);
        content.push(':');
        content.push_str(&shape.kind.to_string());
        content.push(':');
        content.push_str(shape.plain_text());
    }
    sha256_hex_str(&content)
}

fn canonicalize_shape(
    tree: &XmlTree,
    package: &OpcPackage,
    slide_uri: &str,
    element: NodeId,
    z_order: usize,
    settings: &PmlComparerSettings,
) -> Result<ShapeSignature> {
    let name = tree
        .name(element)
        .ok_or_else(|| RedmarkError::internal("shape-node", "not an element"))?
        .clone();

    let mut shape = ShapeSignature {
        id: 0,
        name: String::new(),
        kind: shape_kind_of(tree, element, &name),
        placeholder: None,
        z_order,
        transform: None,
        geometry_hash: None,
        text_body: None,
        image_hash: None,
        table_hash: None,
        chart_hash: None,
        style_hash: None,
        children: None,
        content_hash: String::new(),
    };

    // Non-visual properties: id, name, placeholder.
    let nv_pr_container = tree
        .find_child(element, &p::nv_sp_pr())
        .or_else(|| tree.find_child(element, &p::nv_pic_pr()))
        .or_else(|| tree.find_child(element, &p::nv_graphic_frame_pr()))
        .or_else(|| tree.find_child(element, &p::nv_grp_sp_pr()))
        .or_else(|| tree.find_child(element, &p::nv_cxn_sp_pr()));
    if let Some(container) = nv_pr_container {
        if let Some(c_nv_pr) = tree.find_child(container, &p::c_nv_pr()) {
            shape.name = tree.attr_local(c_nv_pr, "name").unwrap_or("").to_string();
            shape.id = tree.attr_u32(c_nv_pr, "id").unwrap_or(0);
        }
        if let Some(nv_pr) = tree.find_child(container, &p::nv_pr()) {
            if let Some(ph) = tree.find_child(nv_pr, &p::ph()) {
                shape.placeholder = Some(Placeholder {
                    ph_type: tree.attr_local(ph, "type").unwrap_or("body").to_string(),
                    index: tree.attr_u32(ph, "idx"),
                });
            }
        }
    }

    // Transform and geometry.
    let sp_pr = tree
        .find_child(element, &p::sp_pr())
        .or_else(|| tree.find_child(element, &p::grp_sp_pr()));
    if let Some(sp_pr) = sp_pr {
        if let Some(xfrm) = tree.find_child(sp_pr, &a::xfrm()) {
            shape.transform = Some(extract_transform(tree, xfrm));
        }
        if let Some(prst) = tree.find_child(sp_pr, &a::prst_geom()) {
            shape.geometry_hash = tree.attr_local(prst, "prst").map(str::to_string);
        } else if let Some(cust) = tree.find_child(sp_pr, &a::cust_geom()) {
            if let Ok(fragment) = builder::serialize_fragment(tree, cust) {
                shape.geometry_hash = Some(sha256_hex_str(&fragment));
            }
        }
        if settings.compare_shape_styles {
            if let Ok(fragment) = builder::serialize_fragment(tree, sp_pr) {
                shape.style_hash = Some(sha256_hex_str(&fragment));
            }
        }
    }

    if let Some(tx_body) = tree.find_child(element, &p::tx_body()) {
        let body = extract_text_body(tree, tx_body);
        if shape.kind == ShapeKind::AutoShape && !body.plain_text.is_empty() {
            shape.kind = ShapeKind::TextBox;
        }
        shape.text_body = Some(body);
    }

    match shape.kind {
        ShapeKind::Picture => {
            shape.image_hash = extract_image_hash(tree, package, slide_uri, element);
        }
        ShapeKind::Table => {
            shape.table_hash = extract_table_hash(tree, element);
        }
        ShapeKind::Chart => {
            shape.chart_hash = extract_chart_hash(tree, package, slide_uri, element);
        }
        ShapeKind::Group => {
            let mut children = Vec::new();
            let mut child_z = 0usize;
            for child in tree.child_elements(element) {
                if is_shape_element(tree, child) {
                    children.push(canonicalize_shape(
                        tree, package, slide_uri, child, child_z, settings,
                    )?);
                    child_z += 1;
                }
            }
            shape.children = Some(children);
        }
        _ => {}
    }

    shape.content_hash = shape_content_hash(&shape);
    Ok(shape)
}

fn shape_kind_of(tree: &XmlTree, element: NodeId, name: &crate::xml::QName) -> ShapeKind {
    if name == &p::sp() {
        ShapeKind::AutoShape
    } else if name == &p::pic() {
        ShapeKind::Picture
    } else if name == &p::grp_sp() {
        ShapeKind::Group
    } else if name == &p::cxn_sp() {
        ShapeKind::Connector
    } else if name == &p::graphic_frame() {
        let uri = tree
            .find_child(element, &a::graphic())
            .and_then(|g| tree.find_child(g, &a::graphic_data()))
            .and_then(|gd| tree.attr_local(gd, "uri"))
            .unwrap_or("");
        match uri {
            "http://schemas.openxmlformats.org/drawingml/2006/table" => ShapeKind::Table,
            "http://schemas.openxmlformats.org/drawingml/2006/chart" => ShapeKind::Chart,
            "http://schemas.openxmlformats.org/drawingml/2006/diagram" => ShapeKind::SmartArt,
            _ => ShapeKind::OleObject,
        }
    } else {
        ShapeKind::AutoShape
    }
}

fn extract_transform(tree: &XmlTree, xfrm: NodeId) -> Transform {
    let mut transform = Transform {
        rotation: tree.attr_i64(xfrm, "rot").unwrap_or(0) as i32,
        flip_h: tree.attr_bool(xfrm, "flipH").unwrap_or(false),
        flip_v: tree.attr_bool(xfrm, "flipV").unwrap_or(false),
        ..Transform::default()
    };
    if let Some(off) = tree.find_child(xfrm, &a::off()) {
        transform.x = tree.attr_i64(off, "x").unwrap_or(0);
        transform.y = tree.attr_i64(off, "y").unwrap_or(0);
    }
    if let Some(ext) = tree.find_child(xfrm, &a::ext()) {
        transform.cx = tree.attr_i64(ext, "cx").unwrap_or(0);
        transform.cy = tree.attr_i64(ext, "cy").unwrap_or(0);
    }
    transform
}

pub(crate) fn extract_text_body(tree: &XmlTree, tx_body: NodeId) -> TextBodySignature {
    let mut body = TextBodySignature::default();
    let mut plain = String::new();

    for paragraph in tree.find_children(tx_body, &a::p()) {
        let mut para = ParagraphSignature {
            runs: Vec::new(),
            plain_text: String::new(),
            alignment: None,
            has_bullet: false,
        };

        if let Some(p_pr) = tree.find_child(paragraph, &a::p_pr()) {
            para.alignment = tree.attr_local(p_pr, "algn").map(str::to_string);
            para.has_bullet = tree.find_child(p_pr, &a::bu_char()).is_some()
                || tree.find_child(p_pr, &a::bu_auto_num()).is_some();
        }

        let mut para_text = String::new();
        for child in tree.child_elements(paragraph) {
            let Some(name) = tree.name(child) else { continue };
            if name == &a::r() {
                let text = tree
                    .find_child(child, &a::t())
                    .map(|t| tree.direct_text(t))
                    .unwrap_or_default();
                para_text.push_str(&text);
                let properties = tree
                    .find_child(child, &a::r_pr())
                    .map(|r_pr| extract_run_properties(tree, r_pr));
                para.runs.push(RunSignature { text, properties });
            } else if name == &a::fld() {
                let text = tree
                    .find_child(child, &a::t())
                    .map(|t| tree.direct_text(t))
                    .unwrap_or_default();
                para_text.push_str(&text);
                para.runs.push(RunSignature {
                    text,
                    properties: None,
                });
            }
        }

        para.plain_text = para_text;
        if !plain.is_empty() {
            plain.push('\n');
        }
        plain.push_str(&para.plain_text);
        body.paragraphs.push(para);
    }

    body.plain_text = plain;
    body
}

fn extract_run_properties(tree: &XmlTree, r_pr: NodeId) -> RunProperties {
    let mut props = RunProperties {
        bold: tree.attr_bool(r_pr, "b").unwrap_or(false),
        italic: tree.attr_bool(r_pr, "i").unwrap_or(false),
        ..RunProperties::default()
    };
    if let Some(u) = tree.attr_local(r_pr, "u") {
        props.underline = !u.is_empty() && u != "none";
    }
    if let Some(strike) = tree.attr_local(r_pr, "strike") {
        props.strikethrough = !strike.is_empty() && strike != "noStrike";
    }
    props.font_size = tree.attr_local(r_pr, "sz").and_then(|v| v.parse().ok());
    if let Some(latin) = tree.find_child(r_pr, &a::latin()) {
        props.font_name = tree.attr_local(latin, "typeface").map(str::to_string);
    }
    if let Some(solid_fill) = tree.find_child(r_pr, &a::solid_fill()) {
        if let Some(srgb) = tree.find_child(solid_fill, &a::srgb_clr()) {
            props.font_color = tree.attr_local(srgb, "val").map(str::to_string);
        }
    }
    props
}

/// Image identity: hash of the embedded binary bytes.
fn extract_image_hash(
    tree: &XmlTree,
    package: &OpcPackage,
    slide_uri: &str,
    element: NodeId,
) -> Option<String> {
    let blip_fill = tree.find_child(element, &p::blip_fill())?;
    let blip = tree.find_child(blip_fill, &a::blip())?;
    let embed = tree.attr(blip, &r::embed())?;
    let image_uri = package.resolve_relationship(slide_uri, embed).ok()?;
    let bytes = package.part(&image_uri)?;
    Some(sha256_hex(bytes))
}

/// Table identity: cell texts joined row by row.
fn extract_table_hash(tree: &XmlTree, element: NodeId) -> Option<String> {
    let graphic = tree.find_child(element, &a::graphic())?;
    let graphic_data = tree.find_child(graphic, &a::graphic_data())?;
    let tbl = tree.find_child(graphic_data, &a::tbl())?;

    let mut content = String::new();
    for row in tree.find_children(tbl, &a::tr()) {
        for cell in tree.find_children(row, &a::tc()) {
            if let Some(tx_body) = tree.find_child(cell, &a::tx_body()) {
                content.push_str(&extract_text_body(tree, tx_body).plain_text);
            }
            content.push('|');
        }
        content.push_str("||");
    }
    Some(sha256_hex_str(&content))
}

/// Chart identity: the referenced chart part's XML, hashed.
fn extract_chart_hash(
    tree: &XmlTree,
    package: &OpcPackage,
    slide_uri: &str,
    element: NodeId,
) -> Option<String> {
    let graphic = tree.find_child(element, &a::graphic())?;
    let graphic_data = tree.find_child(graphic, &a::graphic_data())?;
    let chart_ref = tree.find_child(graphic_data, &c::chart())?;
    let r_id = tree.attr(chart_ref, &r::id())?;
    let chart_uri = package.resolve_relationship(slide_uri, r_id).ok()?;
    let chart_bytes = package.part(&chart_uri)?;
    Some(sha256_hex(chart_bytes))
}

fn extract_notes_text(package: &OpcPackage, notes_uri: &str) -> Result<String> {
    let tree = package.xml_part(notes_uri)?;
    let root = tree
        .root()
        .ok_or_else(|| RedmarkError::malformed("empty notes slide"))?;
    let c_sld = tree
        .find_child(root, &p::c_sld())
        .ok_or_else(|| RedmarkError::malformed("notes slide has no cSld"))?;
    let sp_tree = tree
        .find_child(c_sld, &p::sp_tree())
        .ok_or_else(|| RedmarkError::malformed("notes slide has no spTree"))?;

    let mut text = String::new();
    for sp in tree.find_children(sp_tree, &p::sp()) {
        if let Some(tx_body) = tree.find_child(sp, &p::tx_body()) {
            let body = extract_text_body(&tree, tx_body);
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(&body.plain_text);
        }
    }
    Ok(text)
}

fn shape_content_hash(shape: &ShapeSignature) -> String {
    let mut content = String::new();
    content.push_str(&shape.kind.to_string());
    content.push('|');
    content.push_str(shape.plain_text());
    content.push('|');
    content.push_str(shape.image_hash.as_deref().unwrap_or(""));
    content.push('|');
    content.push_str(shape.table_hash.as_deref().unwrap_or(""));
    content.push('|');
    content.push_str(shape.chart_hash.as_deref().unwrap_or(""));
    sha256_hex_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parser;

    const SLIDE_NS: &str = r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main""#;

    fn parse_shape(xml: &str) -> (XmlTree, NodeId) {
        let tree = parser::parse(xml).unwrap();
        let root = tree.root().unwrap();
        (tree, root)
    }

    #[test]
    fn text_body_extraction_joins_paragraphs() {
        let xml = format!(
            r#"<p:txBody {SLIDE_NS}><a:bodyPr/><a:p><a:r><a:t>line one</a:t></a:r></a:p><a:p><a:r><a:t>line two</a:t></a:r></a:p></p:txBody>"#
        );
        let (tree, root) = parse_shape(&xml);
        let body = extract_text_body(&tree, root);
        assert_eq!(body.plain_text, "line one\nline two");
        assert_eq!(body.paragraphs.len(), 2);
    }

    #[test]
    fn run_properties_capture_emphasis() {
        let xml = format!(
            r#"<a:rPr {SLIDE_NS} b="1" i="0" u="sng" sz="2400"><a:latin typeface="Arial"/><a:solidFill><a:srgbClr val="FF0000"/></a:solidFill></a:rPr>"#
        );
        let (tree, root) = parse_shape(&xml);
        let props = extract_run_properties(&tree, root);
        assert!(props.bold);
        assert!(!props.italic);
        assert!(props.underline);
        assert_eq!(props.font_size, Some(2400));
        assert_eq!(props.font_name.as_deref(), Some("Arial"));
        assert_eq!(props.font_color.as_deref(), Some("FF0000"));
    }

    #[test]
    fn transform_extraction_reads_offset_and_extent() {
        let xml = format!(
            r#"<a:xfrm {SLIDE_NS} rot="120000" flipH="1"><a:off x="1000" y="2000"/><a:ext cx="5000" cy="6000"/></a:xfrm>"#
        );
        let (tree, root) = parse_shape(&xml);
        let transform = extract_transform(&tree, root);
        assert_eq!(transform.x, 1000);
        assert_eq!(transform.y, 2000);
        assert_eq!(transform.cx, 5000);
        assert_eq!(transform.cy, 6000);
        assert_eq!(transform.rotation, 120000);
        assert!(transform.flip_h);
        assert!(!transform.flip_v);
    }

    #[test]
    fn table_hash_tracks_cell_text() {
        let xml_a = format!(
            r#"<p:graphicFrame {SLIDE_NS}><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/table"><a:tbl><a:tr><a:tc><a:txBody><a:p><a:r><a:t>cell</a:t></a:r></a:p></a:txBody></a:tc></a:tr></a:tbl></a:graphicData></a:graphic></p:graphicFrame>"#
        );
        let xml_b = xml_a.replace("cell", "other");
        let (tree_a, root_a) = parse_shape(&xml_a);
        let (tree_b, root_b) = parse_shape(&xml_b);
        let hash_a = extract_table_hash(&tree_a, root_a).unwrap();
        let hash_b = extract_table_hash(&tree_b, root_b).unwrap();
        assert_ne!(hash_a, hash_b);
    }

    #[test]
    fn graphic_frame_kind_derives_from_uri() {
        let xml = format!(
            r#"<p:graphicFrame {SLIDE_NS}><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/chart"/></a:graphic></p:graphicFrame>"#
        );
        let (tree, root) = parse_shape(&xml);
        let name = tree.name(root).unwrap().clone();
        assert_eq!(shape_kind_of(&tree, root, &name), ShapeKind::Chart);
    }
}
