//! Part-URI helpers: normalization, relative-target resolution and the
//! part <-> `.rels` path mapping of the OPC convention.

/// Normalizes a part URI to its storage form (no leading slash).
pub fn normalize(uri: &str) -> String {
    uri.trim_start_matches('/').to_string()
}

/// Resolves a relationship target against the part that declares it.
/// Absolute targets (`/ppt/slides/slide1.xml`) are taken as-is; relative
/// targets are resolved against the source part's directory with `.` and
/// `..` segments collapsed.
pub fn resolve(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let base_dir = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir,
        None => "",
    };

    let mut segments: Vec<&str> = if base_dir.is_empty() {
        Vec::new()
    } else {
        base_dir.split('/').collect()
    };

    for segment in target.split('/') {
        match segment {
            ".." => {
                segments.pop();
            }
            "." | "" => {}
            other => segments.push(other),
        }
    }

    segments.join("/")
}

/// Relationship part for a given source part. The package root (`""`)
/// maps to `_rels/.rels`.
pub fn rels_path_for(source_part: &str) -> String {
    if source_part.is_empty() {
        return "_rels/.rels".to_string();
    }
    match source_part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", source_part),
    }
}

/// Inverse of [`rels_path_for`]; `None` when the path is not a `.rels` part.
pub fn source_for_rels(rels_path: &str) -> Option<String> {
    let file = rels_path.strip_suffix(".rels")?;
    match file.rsplit_once("/_rels/") {
        Some((dir, name)) => Some(format!("{}/{}", dir, name)),
        None => {
            let name = file.strip_prefix("_rels/")?;
            if name == "." {
                Some(String::new())
            } else {
                Some(name.to_string())
            }
        }
    }
}

/// Target string for a relationship from `source_part` to `target_part`,
/// expressed relative to the source's directory when possible.
pub fn relative_target(source_part: &str, target_part: &str) -> String {
    let base_dir = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir,
        None => "",
    };
    if base_dir.is_empty() {
        return target_part.to_string();
    }
    match target_part.strip_prefix(&format!("{}/", base_dir)) {
        Some(rest) => rest.to_string(),
        None => format!("/{}", target_part),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_relative_sibling() {
        assert_eq!(
            resolve("ppt/presentation.xml", "slides/slide1.xml"),
            "ppt/slides/slide1.xml"
        );
    }

    #[test]
    fn resolve_parent_traversal() {
        assert_eq!(
            resolve("ppt/slides/slide1.xml", "../slideLayouts/slideLayout1.xml"),
            "ppt/slideLayouts/slideLayout1.xml"
        );
    }

    #[test]
    fn resolve_absolute_target() {
        assert_eq!(
            resolve("ppt/slides/slide1.xml", "/ppt/media/image1.png"),
            "ppt/media/image1.png"
        );
    }

    #[test]
    fn resolve_collapses_single_dots() {
        assert_eq!(resolve("xl/workbook.xml", "./worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
    }

    #[test]
    fn rels_path_roundtrip() {
        assert_eq!(rels_path_for(""), "_rels/.rels");
        assert_eq!(
            rels_path_for("word/document.xml"),
            "word/_rels/document.xml.rels"
        );
        assert_eq!(
            source_for_rels("word/_rels/document.xml.rels"),
            Some("word/document.xml".to_string())
        );
        assert_eq!(source_for_rels("_rels/.rels"), Some(String::new()));
        assert_eq!(source_for_rels("word/document.xml"), None);
    }

    #[test]
    fn relative_target_prefers_same_directory() {
        assert_eq!(
            relative_target("xl/workbook.xml", "xl/worksheets/sheet1.xml"),
            "worksheets/sheet1.xml"
        );
        assert_eq!(
            relative_target("xl/worksheets/sheet1.xml", "xl/comments1.xml"),
            "/xl/comments1.xml"
        );
    }
}
