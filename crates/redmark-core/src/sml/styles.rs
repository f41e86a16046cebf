//! Stylesheet resolution: expands `xl/styles.xml` indices into concrete
//! cell format signatures so formatting comparison never depends on index
//! stability between the two workbooks.

use super::signatures::CellFormatSignature;
use crate::xml::namespaces::s;
use crate::xml::XmlTree;
use indextree::NodeId;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Built-in number formats of SpreadsheetML (ids 0-49 are implicit and
/// never serialized into `numFmts`). Unlisted ids map to `General`.
static BUILTIN_NUM_FMTS: Lazy<HashMap<u32, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (0, "General"),
        (1, "0"),
        (2, "0.00"),
        (3, "#,##0"),
        (4, "#,##0.00"),
        (9, "0%"),
        (10, "0.00%"),
        (11, "0.00E+00"),
        (12, "# ?/?"),
        (13, "# ??/??"),
        (14, "mm-dd-yy"),
        (15, "d-mmm-yy"),
        (16, "d-mmm"),
        (17, "mmm-yy"),
        (18, "h:mm AM/PM"),
        (19, "h:mm:ss AM/PM"),
        (20, "h:mm"),
        (21, "h:mm:ss"),
        (22, "m/d/yy h:mm"),
        (37, "#,##0 ;(#,##0)"),
        (38, "#,##0 ;[Red](#,##0)"),
        (39, "#,##0.00;(#,##0.00)"),
        (40, "#,##0.00;[Red](#,##0.00)"),
        (45, "mm:ss"),
        (46, "[h]:mm:ss"),
        (47, "mmss.0"),
        (48, "##0.0E+0"),
        (49, "@"),
    ])
});

pub fn builtin_number_format(id: u32) -> &'static str {
    BUILTIN_NUM_FMTS.get(&id).copied().unwrap_or("General")
}

#[derive(Debug, Clone, Default)]
struct FontInfo {
    bold: bool,
    italic: bool,
    underline: bool,
    strikethrough: bool,
    name: Option<String>,
    size: Option<f64>,
    color: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct FillInfo {
    pattern: Option<String>,
    fg_color: Option<String>,
    bg_color: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct BorderInfo {
    left_style: Option<String>,
    left_color: Option<String>,
    right_style: Option<String>,
    right_color: Option<String>,
    top_style: Option<String>,
    top_color: Option<String>,
    bottom_style: Option<String>,
    bottom_color: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct XfInfo {
    num_fmt_id: u32,
    font_id: usize,
    fill_id: usize,
    border_id: usize,
    horizontal: Option<String>,
    vertical: Option<String>,
    wrap_text: bool,
    indent: Option<u32>,
}

/// Parsed stylesheet with every table the cell-format expansion needs.
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    num_fmts: HashMap<u32, String>,
    fonts: Vec<FontInfo>,
    fills: Vec<FillInfo>,
    borders: Vec<BorderInfo>,
    cell_xfs: Vec<XfInfo>,
}

impl Stylesheet {
    pub fn parse(tree: &XmlTree) -> Self {
        let mut sheet = Self::default();
        let Some(root) = tree.root() else {
            return sheet;
        };

        if let Some(num_fmts) = tree.find_child(root, &s::num_fmts()) {
            for nf in tree.find_children(num_fmts, &s::num_fmt()) {
                if let (Some(id), Some(code)) = (
                    tree.attr_u32(nf, "numFmtId"),
                    tree.attr_local(nf, "formatCode"),
                ) {
                    sheet.num_fmts.insert(id, code.to_string());
                }
            }
        }

        if let Some(fonts) = tree.find_child(root, &s::fonts()) {
            for font in tree.find_children(fonts, &s::font()) {
                sheet.fonts.push(parse_font(tree, font));
            }
        }

        if let Some(fills) = tree.find_child(root, &s::fills()) {
            for fill in tree.find_children(fills, &s::fill()) {
                sheet.fills.push(parse_fill(tree, fill));
            }
        }

        if let Some(borders) = tree.find_child(root, &s::borders()) {
            for border in tree.find_children(borders, &s::border()) {
                sheet.borders.push(parse_border(tree, border));
            }
        }

        if let Some(cell_xfs) = tree.find_child(root, &s::cell_xfs()) {
            for xf in tree.find_children(cell_xfs, &s::xf()) {
                sheet.cell_xfs.push(parse_xf(tree, xf));
            }
        }

        sheet
    }

    /// Expands a `c/@s` style index to a fully resolved format signature.
    /// Out-of-range indices resolve to the default format.
    pub fn resolve(&self, style_index: usize) -> CellFormatSignature {
        let Some(xf) = self.cell_xfs.get(style_index) else {
            return CellFormatSignature::standard();
        };

        let mut format = CellFormatSignature::standard();

        format.number_format = Some(
            self.num_fmts
                .get(&xf.num_fmt_id)
                .cloned()
                .unwrap_or_else(|| builtin_number_format(xf.num_fmt_id).to_string()),
        );

        if let Some(font) = self.fonts.get(xf.font_id) {
            format.bold = font.bold;
            format.italic = font.italic;
            format.underline = font.underline;
            format.strikethrough = font.strikethrough;
            if font.name.is_some() {
                format.font_name = font.name.clone();
            }
            if font.size.is_some() {
                format.font_size = font.size;
            }
            format.font_color = font.color.clone();
        }

        if let Some(fill) = self.fills.get(xf.fill_id) {
            format.fill_pattern = fill.pattern.clone();
            format.fill_foreground = fill.fg_color.clone();
            format.fill_background = fill.bg_color.clone();
        }

        if let Some(border) = self.borders.get(xf.border_id) {
            format.border_left_style = border.left_style.clone();
            format.border_left_color = border.left_color.clone();
            format.border_right_style = border.right_style.clone();
            format.border_right_color = border.right_color.clone();
            format.border_top_style = border.top_style.clone();
            format.border_top_color = border.top_color.clone();
            format.border_bottom_style = border.bottom_style.clone();
            format.border_bottom_color = border.bottom_color.clone();
        }

        if xf.horizontal.is_some() {
            format.horizontal_alignment = xf.horizontal.clone();
        }
        if xf.vertical.is_some() {
            format.vertical_alignment = xf.vertical.clone();
        }
        format.wrap_text = xf.wrap_text;
        format.indent = xf.indent;

        format
    }
}

fn parse_font(tree: &XmlTree, font: NodeId) -> FontInfo {
    let mut info = FontInfo {
        bold: tree.find_child(font, &s::b()).is_some(),
        italic: tree.find_child(font, &s::i()).is_some(),
        underline: tree.find_child(font, &s::u()).is_some(),
        strikethrough: tree.find_child(font, &s::strike()).is_some(),
        ..FontInfo::default()
    };
    if let Some(name) = tree.find_child(font, &s::name()) {
        info.name = tree.attr_local(name, "val").map(str::to_string);
    }
    if let Some(sz) = tree.find_child(font, &s::sz()) {
        info.size = tree.attr_local(sz, "val").and_then(|v| v.parse().ok());
    }
    if let Some(color) = tree.find_child(font, &s::color()) {
        info.color = tree.attr_local(color, "rgb").map(str::to_string);
    }
    info
}

fn parse_fill(tree: &XmlTree, fill: NodeId) -> FillInfo {
    let mut info = FillInfo::default();
    if let Some(pattern) = tree.find_child(fill, &s::pattern_fill()) {
        info.pattern = tree.attr_local(pattern, "patternType").map(str::to_string);
        if let Some(fg) = tree.find_child(pattern, &s::fg_color()) {
            info.fg_color = tree.attr_local(fg, "rgb").map(str::to_string);
        }
        if let Some(bg) = tree.find_child(pattern, &s::bg_color()) {
            info.bg_color = tree.attr_local(bg, "rgb").map(str::to_string);
        }
    }
    info
}

fn parse_border(tree: &XmlTree, border: NodeId) -> BorderInfo {
    let mut info = BorderInfo::default();
    let side = |name: &crate::xml::QName| -> (Option<String>, Option<String>) {
        match tree.find_child(border, name) {
            Some(el) => {
                let style = tree.attr_local(el, "style").map(str::to_string);
                let color = tree
                    .find_child(el, &s::color())
                    .and_then(|c| tree.attr_local(c, "rgb"))
                    .map(str::to_string);
                (style, color)
            }
            None => (None, None),
        }
    };
    (info.left_style, info.left_color) = side(&s::left());
    (info.right_style, info.right_color) = side(&s::right());
    (info.top_style, info.top_color) = side(&s::top());
    (info.bottom_style, info.bottom_color) = side(&s::bottom());
    info
}

fn parse_xf(tree: &XmlTree, xf: NodeId) -> XfInfo {
    let mut info = XfInfo {
        num_fmt_id: tree.attr_u32(xf, "numFmtId").unwrap_or(0),
        font_id: tree.attr_u32(xf, "fontId").unwrap_or(0) as usize,
        fill_id: tree.attr_u32(xf, "fillId").unwrap_or(0) as usize,
        border_id: tree.attr_u32(xf, "borderId").unwrap_or(0) as usize,
        ..XfInfo::default()
    };
    if let Some(alignment) = tree.find_child(xf, &s::alignment()) {
        info.horizontal = tree.attr_local(alignment, "horizontal").map(str::to_string);
        info.vertical = tree.attr_local(alignment, "vertical").map(str::to_string);
        info.wrap_text = tree.attr_bool(alignment, "wrapText").unwrap_or(false);
        info.indent = tree.attr_u32(alignment, "indent");
    }
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parser;

    const STYLES: &str = r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <numFmts count="1"><numFmt numFmtId="164" formatCode="0.000"/></numFmts>
  <fonts count="2">
    <font><sz val="11"/><name val="Calibri"/></font>
    <font><b/><i/><sz val="14"/><name val="Arial"/><color rgb="FFFF0000"/></font>
  </fonts>
  <fills count="3">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
    <fill><patternFill patternType="solid"><fgColor rgb="FF90EE90"/></patternFill></fill>
  </fills>
  <borders count="2">
    <border><left/><right/><top/><bottom/></border>
    <border><left style="thin"><color rgb="FF000000"/></left><right/><top/><bottom/></border>
  </borders>
  <cellXfs count="3">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
    <xf numFmtId="164" fontId="1" fillId="2" borderId="1"><alignment horizontal="center" wrapText="1"/></xf>
    <xf numFmtId="9" fontId="0" fillId="0" borderId="0"/>
  </cellXfs>
</styleSheet>"#;

    #[test]
    fn resolve_expands_all_referenced_tables() {
        let tree = parser::parse(STYLES).unwrap();
        let styles = Stylesheet::parse(&tree);

        let format = styles.resolve(1);
        assert_eq!(format.number_format.as_deref(), Some("0.000"));
        assert!(format.bold);
        assert!(format.italic);
        assert_eq!(format.font_name.as_deref(), Some("Arial"));
        assert_eq!(format.font_size, Some(14.0));
        assert_eq!(format.font_color.as_deref(), Some("FFFF0000"));
        assert_eq!(format.fill_pattern.as_deref(), Some("solid"));
        assert_eq!(format.fill_foreground.as_deref(), Some("FF90EE90"));
        assert_eq!(format.border_left_style.as_deref(), Some("thin"));
        assert_eq!(format.horizontal_alignment.as_deref(), Some("center"));
        assert!(format.wrap_text);
    }

    #[test]
    fn builtin_formats_cover_percent_and_general() {
        let tree = parser::parse(STYLES).unwrap();
        let styles = Stylesheet::parse(&tree);

        assert_eq!(styles.resolve(0).number_format.as_deref(), Some("General"));
        assert_eq!(styles.resolve(2).number_format.as_deref(), Some("0%"));
    }

    #[test]
    fn out_of_range_index_resolves_to_default() {
        let tree = parser::parse(STYLES).unwrap();
        let styles = Stylesheet::parse(&tree);
        assert_eq!(styles.resolve(99), CellFormatSignature::standard());
    }

    #[test]
    fn unknown_builtin_ids_map_to_general() {
        assert_eq!(builtin_number_format(5), "General");
        assert_eq!(builtin_number_format(23), "General");
        assert_eq!(builtin_number_format(49), "@");
    }
}
