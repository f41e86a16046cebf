//! Namespace constants and `QName` constructors for the OOXML vocabularies
//! the comparers touch. Grouped by conventional prefix.

use super::xname::QName;

/// WordprocessingML main namespace (`w:`).
pub mod w {
    use super::QName;
    pub const NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

    fn q(local: &str) -> QName {
        QName::new(NS, local)
    }

    pub fn document() -> QName { q("document") }
    pub fn body() -> QName { q("body") }
    pub fn p() -> QName { q("p") }
    pub fn r() -> QName { q("r") }
    pub fn t() -> QName { q("t") }
    pub fn p_pr() -> QName { q("pPr") }
    pub fn r_pr() -> QName { q("rPr") }
    pub fn sect_pr() -> QName { q("sectPr") }
    pub fn tbl() -> QName { q("tbl") }
    pub fn tr() -> QName { q("tr") }
    pub fn tr_pr() -> QName { q("trPr") }
    pub fn tc() -> QName { q("tc") }
    pub fn tc_pr() -> QName { q("tcPr") }
    pub fn ins() -> QName { q("ins") }
    pub fn del() -> QName { q("del") }
    pub fn del_text() -> QName { q("delText") }
    pub fn del_instr_text() -> QName { q("delInstrText") }
    pub fn move_from() -> QName { q("moveFrom") }
    pub fn move_to() -> QName { q("moveTo") }
    pub fn footnotes() -> QName { q("footnotes") }
    pub fn footnote() -> QName { q("footnote") }
    pub fn endnotes() -> QName { q("endnotes") }
    pub fn endnote() -> QName { q("endnote") }
    pub fn footnote_reference() -> QName { q("footnoteReference") }
    pub fn endnote_reference() -> QName { q("endnoteReference") }
    pub fn txbx_content() -> QName { q("txbxContent") }
    pub fn drawing() -> QName { q("drawing") }
    pub fn pict() -> QName { q("pict") }
    pub fn br() -> QName { q("br") }
    pub fn cr() -> QName { q("cr") }
    pub fn tab() -> QName { q("tab") }
    pub fn no_break_hyphen() -> QName { q("noBreakHyphen") }
    pub fn hyperlink() -> QName { q("hyperlink") }
    pub fn id() -> QName { q("id") }
    pub fn author() -> QName { q("author") }
    pub fn date() -> QName { q("date") }
    pub fn type_attr() -> QName { q("type") }
    pub fn val() -> QName { q("val") }

    /// Local names of elements that carry a `w:id` revision attribute and
    /// are renumbered by the final fix-up pass.
    pub const REVISION_TAGS: &[&str] = &[
        "ins",
        "del",
        "rPrChange",
        "pPrChange",
        "sectPrChange",
        "tblPrChange",
        "tblGridChange",
        "trPrChange",
        "tcPrChange",
        "tblPrExChange",
        "numberingChange",
        "cellIns",
        "cellDel",
        "cellMerge",
        "customXmlInsRangeStart",
        "customXmlDelRangeStart",
        "customXmlMoveFromRangeStart",
        "customXmlMoveToRangeStart",
        "moveFrom",
        "moveTo",
        "moveFromRangeStart",
        "moveToRangeStart",
    ];

    /// Property-change and range-marker elements removed when accepting
    /// prior revisions.
    pub const ACCEPT_REMOVE_TAGS: &[&str] = &[
        "pPrChange",
        "rPrChange",
        "tblPrChange",
        "tblGridChange",
        "tcPrChange",
        "trPrChange",
        "tblPrExChange",
        "sectPrChange",
        "numberingChange",
        "cellIns",
        "customXmlInsRangeStart",
        "customXmlInsRangeEnd",
        "customXmlDelRangeStart",
        "customXmlDelRangeEnd",
        "customXmlMoveFromRangeStart",
        "customXmlMoveFromRangeEnd",
        "customXmlMoveToRangeStart",
        "customXmlMoveToRangeEnd",
        "moveFromRangeStart",
        "moveFromRangeEnd",
        "moveToRangeStart",
        "moveToRangeEnd",
    ];
}

/// SpreadsheetML main namespace (`x:`, usually the default namespace).
pub mod s {
    use super::QName;
    pub const NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

    fn q(local: &str) -> QName {
        QName::new(NS, local)
    }

    pub fn workbook() -> QName { q("workbook") }
    pub fn sheets() -> QName { q("sheets") }
    pub fn sheet() -> QName { q("sheet") }
    pub fn defined_names() -> QName { q("definedNames") }
    pub fn defined_name() -> QName { q("definedName") }
    pub fn sst() -> QName { q("sst") }
    pub fn si() -> QName { q("si") }
    pub fn t() -> QName { q("t") }
    pub fn r() -> QName { q("r") }
    pub fn is_() -> QName { q("is") }
    pub fn worksheet() -> QName { q("worksheet") }
    pub fn sheet_data() -> QName { q("sheetData") }
    pub fn row() -> QName { q("row") }
    pub fn c() -> QName { q("c") }
    pub fn v() -> QName { q("v") }
    pub fn f() -> QName { q("f") }
    pub fn merge_cells() -> QName { q("mergeCells") }
    pub fn merge_cell() -> QName { q("mergeCell") }
    pub fn hyperlinks() -> QName { q("hyperlinks") }
    pub fn hyperlink() -> QName { q("hyperlink") }
    pub fn data_validations() -> QName { q("dataValidations") }
    pub fn data_validation() -> QName { q("dataValidation") }
    pub fn formula1() -> QName { q("formula1") }
    pub fn formula2() -> QName { q("formula2") }
    pub fn conditional_formatting() -> QName { q("conditionalFormatting") }
    pub fn cf_rule() -> QName { q("cfRule") }
    pub fn style_sheet() -> QName { q("styleSheet") }
    pub fn num_fmts() -> QName { q("numFmts") }
    pub fn num_fmt() -> QName { q("numFmt") }
    pub fn fonts() -> QName { q("fonts") }
    pub fn font() -> QName { q("font") }
    pub fn sz() -> QName { q("sz") }
    pub fn name() -> QName { q("name") }
    pub fn b() -> QName { q("b") }
    pub fn i() -> QName { q("i") }
    pub fn u() -> QName { q("u") }
    pub fn strike() -> QName { q("strike") }
    pub fn color() -> QName { q("color") }
    pub fn fills() -> QName { q("fills") }
    pub fn fill() -> QName { q("fill") }
    pub fn pattern_fill() -> QName { q("patternFill") }
    pub fn fg_color() -> QName { q("fgColor") }
    pub fn bg_color() -> QName { q("bgColor") }
    pub fn borders() -> QName { q("borders") }
    pub fn border() -> QName { q("border") }
    pub fn left() -> QName { q("left") }
    pub fn right() -> QName { q("right") }
    pub fn top() -> QName { q("top") }
    pub fn bottom() -> QName { q("bottom") }
    pub fn cell_xfs() -> QName { q("cellXfs") }
    pub fn xf() -> QName { q("xf") }
    pub fn alignment() -> QName { q("alignment") }
    pub fn comments() -> QName { q("comments") }
    pub fn authors() -> QName { q("authors") }
    pub fn author() -> QName { q("author") }
    pub fn comment_list() -> QName { q("commentList") }
    pub fn comment() -> QName { q("comment") }
    pub fn text() -> QName { q("text") }
}

/// PresentationML main namespace (`p:`).
pub mod p {
    use super::QName;
    pub const NS: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

    fn q(local: &str) -> QName {
        QName::new(NS, local)
    }

    pub fn presentation() -> QName { q("presentation") }
    pub fn sld_id_lst() -> QName { q("sldIdLst") }
    pub fn sld_id() -> QName { q("sldId") }
    pub fn sld_sz() -> QName { q("sldSz") }
    pub fn sld() -> QName { q("sld") }
    pub fn notes() -> QName { q("notes") }
    pub fn c_sld() -> QName { q("cSld") }
    pub fn sp_tree() -> QName { q("spTree") }
    pub fn sp() -> QName { q("sp") }
    pub fn pic() -> QName { q("pic") }
    pub fn graphic_frame() -> QName { q("graphicFrame") }
    pub fn grp_sp() -> QName { q("grpSp") }
    pub fn cxn_sp() -> QName { q("cxnSp") }
    pub fn nv_sp_pr() -> QName { q("nvSpPr") }
    pub fn nv_pic_pr() -> QName { q("nvPicPr") }
    pub fn nv_graphic_frame_pr() -> QName { q("nvGraphicFramePr") }
    pub fn nv_grp_sp_pr() -> QName { q("nvGrpSpPr") }
    pub fn nv_cxn_sp_pr() -> QName { q("nvCxnSpPr") }
    pub fn c_nv_pr() -> QName { q("cNvPr") }
    pub fn c_nv_sp_pr() -> QName { q("cNvSpPr") }
    pub fn nv_pr() -> QName { q("nvPr") }
    pub fn ph() -> QName { q("ph") }
    pub fn sp_pr() -> QName { q("spPr") }
    pub fn grp_sp_pr() -> QName { q("grpSpPr") }
    pub fn tx_body() -> QName { q("txBody") }
    pub fn blip_fill() -> QName { q("blipFill") }
    pub fn bg() -> QName { q("bg") }
    pub fn transition() -> QName { q("transition") }
    pub fn style() -> QName { q("style") }
}

/// DrawingML main namespace (`a:`).
pub mod a {
    use super::QName;
    pub const NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

    fn q(local: &str) -> QName {
        QName::new(NS, local)
    }

    pub fn graphic() -> QName { q("graphic") }
    pub fn graphic_data() -> QName { q("graphicData") }
    pub fn tbl() -> QName { q("tbl") }
    pub fn tr() -> QName { q("tr") }
    pub fn tc() -> QName { q("tc") }
    pub fn tx_body() -> QName { q("txBody") }
    pub fn body_pr() -> QName { q("bodyPr") }
    pub fn lst_style() -> QName { q("lstStyle") }
    pub fn p() -> QName { q("p") }
    pub fn p_pr() -> QName { q("pPr") }
    pub fn r() -> QName { q("r") }
    pub fn r_pr() -> QName { q("rPr") }
    pub fn t() -> QName { q("t") }
    pub fn fld() -> QName { q("fld") }
    pub fn xfrm() -> QName { q("xfrm") }
    pub fn off() -> QName { q("off") }
    pub fn ext() -> QName { q("ext") }
    pub fn prst_geom() -> QName { q("prstGeom") }
    pub fn cust_geom() -> QName { q("custGeom") }
    pub fn av_lst() -> QName { q("avLst") }
    pub fn blip() -> QName { q("blip") }
    pub fn latin() -> QName { q("latin") }
    pub fn solid_fill() -> QName { q("solidFill") }
    pub fn no_fill() -> QName { q("noFill") }
    pub fn srgb_clr() -> QName { q("srgbClr") }
    pub fn alpha() -> QName { q("alpha") }
    pub fn ln() -> QName { q("ln") }
    pub fn bu_char() -> QName { q("buChar") }
    pub fn bu_auto_num() -> QName { q("buAutoNum") }
    pub fn bu_none() -> QName { q("buNone") }
}

/// DrawingML chart namespace (`c:`).
pub mod c {
    use super::QName;
    pub const NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";

    pub fn chart() -> QName {
        QName::new(NS, "chart")
    }
}

/// Office relationships namespace (`r:`), used for attributes.
pub mod r {
    use super::QName;
    pub const NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    pub fn id() -> QName {
        QName::new(NS, "id")
    }

    pub fn embed() -> QName {
        QName::new(NS, "embed")
    }
}

/// Markup-compatibility namespace (`mc:`).
pub mod mc {
    use super::QName;
    pub const NS: &str = "http://schemas.openxmlformats.org/markup-compatibility/2006";

    fn q(local: &str) -> QName {
        QName::new(NS, local)
    }

    pub fn alternate_content() -> QName { q("AlternateContent") }
    pub fn choice() -> QName { q("Choice") }
    pub fn fallback() -> QName { q("Fallback") }
}

/// Office Math namespace (`m:`).
pub mod m {
    use super::QName;
    pub const NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/math";

    fn q(local: &str) -> QName {
        QName::new(NS, local)
    }

    pub fn f() -> QName { q("f") }
    pub fn f_pr() -> QName { q("fPr") }
    pub fn ctrl_pr() -> QName { q("ctrlPr") }
}

/// Transitional WordprocessingML 2010 namespace carrying the `paraId` and
/// `textId` attributes stripped during revision acceptance.
pub mod w14 {
    pub const NS: &str = "http://schemas.microsoft.com/office/word/2010/wordml";
}

/// OPC package namespaces.
pub mod pkg {
    pub const CONTENT_TYPES_NS: &str =
        "http://schemas.openxmlformats.org/package/2006/content-types";
    pub const RELATIONSHIPS_NS: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships";
}

/// Relationship type URIs resolved by the comparers and renderers.
pub mod rel_type {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const FOOTNOTES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footnotes";
    pub const ENDNOTES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/endnotes";
    pub const WORKSHEET: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
    pub const SHARED_STRINGS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings";
    pub const STYLES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
    pub const COMMENTS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/comments";
    pub const HYPERLINK: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
    pub const IMAGE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    pub const SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
    pub const SLIDE_LAYOUT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
    pub const NOTES_SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide";
    pub const CHART: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart";
}

/// MIME content types registered by the renderers.
pub mod content_type {
    pub const WORKSHEET: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
    pub const SPREADSHEET_COMMENTS: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.comments+xml";
    pub const SLIDE: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
    pub const NOTES_SLIDE: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.notesSlide+xml";
}
