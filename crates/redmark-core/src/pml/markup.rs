//! Marked-presentation rendering: colored overlay rectangles near each
//! changed shape, optional notes-slide annotations, and an optional
//! summary slide with statistics.

use super::document::PmlDocument;
use super::settings::PmlComparerSettings;
use super::signatures::PresentationSignature;
use super::types::{PmlChange, PmlChangeType};
use crate::error::{RedmarkError, Result};
use crate::package::OpcPackage;
use crate::xml::namespaces::{a, content_type, p, r, rel_type};
use crate::xml::{builder, parser, Attr, QName, XmlData, XmlTree};
use indextree::NodeId;
use std::collections::HashMap;

const DEFAULT_OVERLAY_CX: i64 = 1828800; // 2 inches
const DEFAULT_OVERLAY_CY: i64 = 457200; // 0.5 inch

pub fn render_marked_presentation(
    newer: &PmlDocument,
    sig2: &PresentationSignature,
    changes: &[PmlChange],
    settings: &PmlComparerSettings,
) -> Result<PmlDocument> {
    let mut pkg = newer.package().clone();
    let pres_uri = newer.presentation_uri();

    let slide_uris: HashMap<usize, &str> = sig2
        .slides
        .iter()
        .map(|s| (s.index, s.part_uri.as_str()))
        .collect();

    let mut by_slide: HashMap<usize, Vec<&PmlChange>> = HashMap::new();
    for change in changes {
        if let Some(index) = change.slide_index {
            by_slide.entry(index).or_default().push(change);
        }
    }

    let mut slide_indices: Vec<&usize> = by_slide.keys().collect();
    slide_indices.sort();
    for index in slide_indices {
        let Some(slide_uri) = slide_uris.get(index) else {
            continue;
        };
        let slide_changes = &by_slide[index];

        let mut tree = pkg.xml_part(slide_uri)?;
        add_overlays(&mut tree, slide_changes, settings)?;
        pkg.set_xml_part(slide_uri, &tree)?;

        if settings.add_notes_annotations {
            annotate_notes(&mut pkg, slide_uri, slide_changes)?;
        }
    }

    if settings.add_summary_slide {
        add_summary_slide(&mut pkg, &pres_uri, changes, settings)?;
    }

    Ok(PmlDocument::from_package(pkg))
}

fn color_for(kind: PmlChangeType, settings: &PmlComparerSettings) -> &str {
    match kind {
        PmlChangeType::SlideInserted | PmlChangeType::ShapeInserted => &settings.inserted_color,
        PmlChangeType::SlideDeleted | PmlChangeType::ShapeDeleted => &settings.deleted_color,
        PmlChangeType::SlideMoved | PmlChangeType::ShapeMoved => &settings.moved_color,
        PmlChangeType::TextFormattingChanged | PmlChangeType::ShapeStyleChanged => {
            &settings.formatting_color
        }
        _ => &settings.modified_color,
    }
}

fn find_sp_tree(tree: &XmlTree) -> Result<NodeId> {
    let root = tree
        .root()
        .ok_or_else(|| RedmarkError::malformed("empty slide part"))?;
    let c_sld = tree
        .find_child(root, &p::c_sld())
        .ok_or_else(|| RedmarkError::malformed("slide has no cSld"))?;
    tree.find_child(c_sld, &p::sp_tree())
        .ok_or_else(|| RedmarkError::malformed("slide has no spTree"))
}

fn max_shape_id(tree: &XmlTree, scope: NodeId) -> u32 {
    tree.find_descendants(scope, &p::c_nv_pr())
        .into_iter()
        .filter_map(|n| tree.attr_u32(n, "id"))
        .max()
        .unwrap_or(1)
}

fn add_overlays(
    tree: &mut XmlTree,
    changes: &[&PmlChange],
    settings: &PmlComparerSettings,
) -> Result<()> {
    let sp_tree = find_sp_tree(tree)?;
    let mut next_id = max_shape_id(tree, sp_tree) + 1;

    for change in changes {
        let x = change.new_x.or(change.old_x).unwrap_or(0);
        let y = change.new_y.or(change.old_y).unwrap_or(0);
        let cx = change.new_cx.or(change.old_cx).unwrap_or(DEFAULT_OVERLAY_CX);
        let cy = change.new_cy.or(change.old_cy).unwrap_or(DEFAULT_OVERLAY_CY);
        let color = color_for(change.kind(), settings);
        let label = change.describe();

        append_overlay_shape(tree, sp_tree, next_id, x, y, cx, cy, color, &label);
        next_id += 1;
    }
    Ok(())
}

/// A labeled, unfilled rectangle with a colored outline anchored near the
/// changed shape's position.
#[allow(clippy::too_many_arguments)]
fn append_overlay_shape(
    tree: &mut XmlTree,
    sp_tree: NodeId,
    id: u32,
    x: i64,
    y: i64,
    cx: i64,
    cy: i64,
    color: &str,
    label: &str,
) {
    let sp = tree.add_child(sp_tree, XmlData::element(p::sp()));

    let nv_sp_pr = tree.add_child(sp, XmlData::element(p::nv_sp_pr()));
    tree.add_child(
        nv_sp_pr,
        XmlData::element_with_attrs(
            p::c_nv_pr(),
            vec![
                Attr::new(QName::local("id"), &id.to_string()),
                Attr::new(QName::local("name"), &format!("Redmark overlay {id}")),
            ],
        ),
    );
    tree.add_child(nv_sp_pr, XmlData::element(p::c_nv_sp_pr()));
    tree.add_child(nv_sp_pr, XmlData::element(p::nv_pr()));

    let sp_pr = tree.add_child(sp, XmlData::element(p::sp_pr()));
    let xfrm = tree.add_child(sp_pr, XmlData::element(a::xfrm()));
    tree.add_child(
        xfrm,
        XmlData::element_with_attrs(
            a::off(),
            vec![
                Attr::new(QName::local("x"), &x.to_string()),
                Attr::new(QName::local("y"), &y.to_string()),
            ],
        ),
    );
    tree.add_child(
        xfrm,
        XmlData::element_with_attrs(
            a::ext(),
            vec![
                Attr::new(QName::local("cx"), &cx.to_string()),
                Attr::new(QName::local("cy"), &cy.to_string()),
            ],
        ),
    );
    let geom = tree.add_child(
        sp_pr,
        XmlData::element_with_attrs(
            a::prst_geom(),
            vec![Attr::new(QName::local("prst"), "rect")],
        ),
    );
    tree.add_child(geom, XmlData::element(a::av_lst()));
    tree.add_child(sp_pr, XmlData::element(a::no_fill()));
    let ln = tree.add_child(
        sp_pr,
        XmlData::element_with_attrs(a::ln(), vec![Attr::new(QName::local("w"), "28575")]),
    );
    let ln_fill = tree.add_child(ln, XmlData::element(a::solid_fill()));
    tree.add_child(
        ln_fill,
        XmlData::element_with_attrs(
            a::srgb_clr(),
            vec![Attr::new(QName::local("val"), color)],
        ),
    );

    let tx_body = tree.add_child(sp, XmlData::element(p::tx_body()));
    tree.add_child(tx_body, XmlData::element(a::body_pr()));
    tree.add_child(tx_body, XmlData::element(a::lst_style()));
    let para = tree.add_child(tx_body, XmlData::element(a::p()));
    let run = tree.add_child(para, XmlData::element(a::r()));
    let r_pr = tree.add_child(
        run,
        XmlData::element_with_attrs(
            a::r_pr(),
            vec![
                Attr::new(QName::local("lang"), "en-US"),
                Attr::new(QName::local("sz"), "1000"),
            ],
        ),
    );
    let run_fill = tree.add_child(r_pr, XmlData::element(a::solid_fill()));
    tree.add_child(
        run_fill,
        XmlData::element_with_attrs(
            a::srgb_clr(),
            vec![Attr::new(QName::local("val"), color)],
        ),
    );
    let t = tree.add_child(run, XmlData::element(a::t()));
    tree.add_child(t, XmlData::Text(label.to_string()));
}

const PML_NS_DECLS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

fn empty_notes_tree() -> Result<XmlTree> {
    parser::parse(&format!(
        r#"<p:notes {PML_NS_DECLS}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld></p:notes>"#
    ))
}

fn empty_slide_tree() -> Result<XmlTree> {
    parser::parse(&format!(
        r#"<p:sld {PML_NS_DECLS}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld></p:sld>"#
    ))
}

/// Appends a bulleted change list to the slide's notes slide, creating
/// the notes part (relationship and content type included) when absent.
fn annotate_notes(pkg: &mut OpcPackage, slide_uri: &str, changes: &[&PmlChange]) -> Result<()> {
    let existing = pkg
        .relationship_of_type(slide_uri, rel_type::NOTES_SLIDE)
        .map(|rel| crate::package::uri::resolve(slide_uri, &rel.target));

    let (notes_uri, mut tree, is_new) = match existing {
        Some(uri) => match pkg.try_xml_part(&uri)? {
            Some(tree) => (uri, tree, false),
            None => (uri, empty_notes_tree()?, false),
        },
        None => {
            let mut n = 1;
            let uri = loop {
                let candidate = format!("ppt/notesSlides/notesSlide_rm{n}.xml");
                if !pkg.has_part(&candidate) {
                    break candidate;
                }
                n += 1;
            };
            (uri, empty_notes_tree()?, true)
        }
    };

    let sp_tree = find_sp_tree(&tree)?;
    let id = max_shape_id(&tree, sp_tree) + 1;
    append_notes_text_shape(&mut tree, sp_tree, id, changes);

    let bytes = builder::serialize_bytes(&tree)?;
    if is_new {
        pkg.add_part_with_relationship(
            slide_uri,
            &notes_uri,
            bytes,
            rel_type::NOTES_SLIDE,
            content_type::NOTES_SLIDE,
        );
    } else {
        pkg.set_part(&notes_uri, bytes);
    }
    Ok(())
}

fn append_notes_text_shape(
    tree: &mut XmlTree,
    sp_tree: NodeId,
    id: u32,
    changes: &[&PmlChange],
) {
    let sp = tree.add_child(sp_tree, XmlData::element(p::sp()));
    let nv_sp_pr = tree.add_child(sp, XmlData::element(p::nv_sp_pr()));
    tree.add_child(
        nv_sp_pr,
        XmlData::element_with_attrs(
            p::c_nv_pr(),
            vec![
                Attr::new(QName::local("id"), &id.to_string()),
                Attr::new(QName::local("name"), "Redmark changes"),
            ],
        ),
    );
    tree.add_child(nv_sp_pr, XmlData::element(p::c_nv_sp_pr()));
    tree.add_child(nv_sp_pr, XmlData::element(p::nv_pr()));
    tree.add_child(sp, XmlData::element(p::sp_pr()));

    let tx_body = tree.add_child(sp, XmlData::element(p::tx_body()));
    tree.add_child(tx_body, XmlData::element(a::body_pr()));
    tree.add_child(tx_body, XmlData::element(a::lst_style()));

    append_text_paragraph(tree, tx_body, "Changes on this slide:", false);
    for change in changes {
        append_text_paragraph(tree, tx_body, &change.describe(), true);
    }
}

fn append_text_paragraph(tree: &mut XmlTree, tx_body: NodeId, text: &str, bullet: bool) {
    let para = tree.add_child(tx_body, XmlData::element(a::p()));
    if bullet {
        let p_pr = tree.add_child(para, XmlData::element(a::p_pr()));
        tree.add_child(
            p_pr,
            XmlData::element_with_attrs(
                a::bu_char(),
                vec![Attr::new(QName::local("char"), "\u{2022}")],
            ),
        );
    }
    let run = tree.add_child(para, XmlData::element(a::r()));
    let t = tree.add_child(run, XmlData::element(a::t()));
    tree.add_child(t, XmlData::Text(text.to_string()));
}

/// Appends a summary slide with aggregate statistics and registers it in
/// `sldIdLst`, the relationship set and the content types.
fn add_summary_slide(
    pkg: &mut OpcPackage,
    pres_uri: &str,
    changes: &[PmlChange],
    settings: &PmlComparerSettings,
) -> Result<()> {
    let mut tree = empty_slide_tree()?;
    let sp_tree = find_sp_tree(&tree)?;

    let sp = tree.add_child(sp_tree, XmlData::element(p::sp()));
    let nv_sp_pr = tree.add_child(sp, XmlData::element(p::nv_sp_pr()));
    tree.add_child(
        nv_sp_pr,
        XmlData::element_with_attrs(
            p::c_nv_pr(),
            vec![
                Attr::new(QName::local("id"), "2"),
                Attr::new(QName::local("name"), "Comparison summary"),
            ],
        ),
    );
    tree.add_child(nv_sp_pr, XmlData::element(p::c_nv_sp_pr()));
    tree.add_child(nv_sp_pr, XmlData::element(p::nv_pr()));
    let sp_pr = tree.add_child(sp, XmlData::element(p::sp_pr()));
    let xfrm = tree.add_child(sp_pr, XmlData::element(a::xfrm()));
    tree.add_child(
        xfrm,
        XmlData::element_with_attrs(
            a::off(),
            vec![
                Attr::new(QName::local("x"), "457200"),
                Attr::new(QName::local("y"), "457200"),
            ],
        ),
    );
    tree.add_child(
        xfrm,
        XmlData::element_with_attrs(
            a::ext(),
            vec![
                Attr::new(QName::local("cx"), "8229600"),
                Attr::new(QName::local("cy"), "5943600"),
            ],
        ),
    );

    let tx_body = tree.add_child(sp, XmlData::element(p::tx_body()));
    tree.add_child(tx_body, XmlData::element(a::body_pr()));
    tree.add_child(tx_body, XmlData::element(a::lst_style()));
    append_text_paragraph(&mut tree, tx_body, "Comparison summary", false);
    append_text_paragraph(
        &mut tree,
        tx_body,
        &format!("Author: {}", settings.author),
        false,
    );
    append_text_paragraph(
        &mut tree,
        tx_body,
        &format!("Total changes: {}", changes.len()),
        false,
    );

    let mut counts: Vec<(PmlChangeType, usize)> = Vec::new();
    for change in changes {
        match counts.iter_mut().find(|(kind, _)| *kind == change.kind()) {
            Some((_, count)) => *count += 1,
            None => counts.push((change.kind(), 1)),
        }
    }
    for (kind, count) in counts {
        append_text_paragraph(&mut tree, tx_body, &format!("{kind:?}: {count}"), true);
    }

    // Register the part, then the sldIdLst entry.
    let mut n = 1;
    let slide_part = loop {
        let candidate = format!("ppt/slides/slideSummary{n}.xml");
        if !pkg.has_part(&candidate) {
            break candidate;
        }
        n += 1;
    };
    let bytes = builder::serialize_bytes(&tree)?;
    let r_id = pkg.add_part_with_relationship(
        pres_uri,
        &slide_part,
        bytes,
        rel_type::SLIDE,
        content_type::SLIDE,
    );

    // A slide part needs a layout to open cleanly; borrow the first
    // slide's layout when one resolves.
    if let Some(first_slide) = pkg
        .relationships(pres_uri)
        .iter()
        .find(|rel| rel.rel_type == rel_type::SLIDE && rel.id != r_id)
        .map(|rel| crate::package::uri::resolve(pres_uri, &rel.target))
    {
        if let Some(layout_rel) = pkg
            .relationship_of_type(&first_slide, rel_type::SLIDE_LAYOUT)
            .cloned()
        {
            let layout_uri = crate::package::uri::resolve(&first_slide, &layout_rel.target);
            let target = crate::package::uri::relative_target(&slide_part, &layout_uri);
            pkg.add_relationship(
                &slide_part,
                rel_type::SLIDE_LAYOUT,
                &target,
                crate::package::TargetMode::Internal,
            );
        }
    }

    let mut pres = pkg.xml_part(pres_uri)?;
    let pres_root = pres
        .root()
        .ok_or_else(|| RedmarkError::malformed("empty presentation part"))?;
    let sld_id_lst = match pres.find_child(pres_root, &p::sld_id_lst()) {
        Some(lst) => lst,
        None => pres.add_child(pres_root, XmlData::element(p::sld_id_lst())),
    };
    let max_id = pres
        .find_children(sld_id_lst, &p::sld_id())
        .into_iter()
        .filter_map(|sld| pres.attr_u32(sld, "id"))
        .max()
        .unwrap_or(255);
    pres.add_child(
        sld_id_lst,
        XmlData::element_with_attrs(
            p::sld_id(),
            vec![
                Attr::new(QName::local("id"), &(max_id + 1).to_string()),
                Attr::new(r::id(), &r_id),
            ],
        ),
    );
    pkg.set_xml_part(pres_uri, &pres)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_shape_is_appended_with_label_and_color() {
        let mut tree = empty_slide_tree().unwrap();
        let sp_tree = find_sp_tree(&tree).unwrap();

        let mut change = PmlChange::of(PmlChangeType::ShapeMoved);
        change.slide_index = Some(1);
        change.shape_name = Some("Box".to_string());
        change.new_x = Some(100);
        change.new_y = Some(200);
        let settings = PmlComparerSettings::default();
        add_overlays(&mut tree, &[&change], &settings).unwrap();

        let shapes = tree.find_children(sp_tree, &p::sp());
        assert_eq!(shapes.len(), 1);
        let text = tree.text_content(shapes[0]);
        assert!(text.contains("moved"));

        let srgb = tree.find_descendant(shapes[0], &a::srgb_clr()).unwrap();
        assert_eq!(tree.attr_local(srgb, "val"), Some(settings.moved_color.as_str()));
    }

    #[test]
    fn overlay_ids_continue_from_existing_shapes() {
        let mut tree = empty_slide_tree().unwrap();
        let sp_tree = find_sp_tree(&tree).unwrap();
        let change = PmlChange::of(PmlChangeType::TextChanged);
        add_overlays(&mut tree, &[&change], &PmlComparerSettings::default()).unwrap();

        let c_nv_prs = tree.find_descendants(sp_tree, &p::c_nv_pr());
        let ids: Vec<u32> = c_nv_prs
            .into_iter()
            .filter_map(|n| tree.attr_u32(n, "id"))
            .collect();
        // Group shape has id 1; overlay continues at 2.
        assert!(ids.contains(&2));
    }

    #[test]
    fn notes_template_has_a_shape_tree() {
        let tree = empty_notes_tree().unwrap();
        assert!(find_sp_tree(&tree).is_ok());
    }
}
