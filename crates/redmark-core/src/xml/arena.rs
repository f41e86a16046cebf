use super::node::XmlData;
use super::xname::{Attr, QName};
use indextree::{Arena, NodeId};

/// Order-preserving XML tree backed by an arena.
///
/// Element order, attribute order, mixed content and whitespace-only text
/// nodes survive a parse/serialize round trip. Namespace prefixes are kept
/// verbatim; declarations are ordinary attributes in the `xmlns` namespace.
#[derive(Clone)]
pub struct XmlTree {
    arena: Arena<XmlData>,
    root: Option<NodeId>,
}

impl XmlTree {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&XmlData> {
        self.arena.get(id).map(|node| node.get())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut XmlData> {
        self.arena.get_mut(id).map(|node| node.get_mut())
    }

    pub fn add_root(&mut self, data: XmlData) -> NodeId {
        let id = self.arena.new_node(data);
        self.root = Some(id);
        id
    }

    pub fn add_child(&mut self, parent: NodeId, data: XmlData) -> NodeId {
        let child = self.arena.new_node(data);
        parent.append(child, &mut self.arena);
        child
    }

    pub fn insert_before(&mut self, sibling: NodeId, data: XmlData) -> NodeId {
        let node = self.arena.new_node(data);
        sibling.insert_before(node, &mut self.arena);
        node
    }

    pub fn insert_after(&mut self, sibling: NodeId, data: XmlData) -> NodeId {
        let node = self.arena.new_node(data);
        sibling.insert_after(node, &mut self.arena);
        node
    }

    /// Unlinks the node (and its subtree) from the tree.
    pub fn detach(&mut self, node: NodeId) {
        node.detach(&mut self.arena);
    }

    /// Moves an existing node (with its subtree) under a new parent.
    pub fn reattach(&mut self, node: NodeId, new_parent: NodeId) {
        node.detach(&mut self.arena);
        new_parent.append(node, &mut self.arena);
    }

    /// Replaces a node with its own children, preserving order.
    pub fn unwrap_node(&mut self, node: NodeId) {
        let children = self.children(node);
        for child in children {
            child.detach(&mut self.arena);
            node.insert_before(child, &mut self.arena);
        }
        node.detach(&mut self.arena);
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node)?.parent()
    }

    pub fn children(&self, parent: NodeId) -> Vec<NodeId> {
        parent.children(&self.arena).collect()
    }

    pub fn child_elements(&self, parent: NodeId) -> Vec<NodeId> {
        parent
            .children(&self.arena)
            .filter(|&id| self.get(id).map(XmlData::is_element).unwrap_or(false))
            .collect()
    }

    /// All nodes of the subtree, including `node` itself, in document order.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        node.descendants(&self.arena).collect()
    }

    pub fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        node.ancestors(&self.arena).collect()
    }

    pub fn name(&self, node: NodeId) -> Option<&QName> {
        self.get(node).and_then(XmlData::name)
    }

    pub fn is_named(&self, node: NodeId, name: &QName) -> bool {
        self.name(node) == Some(name)
    }

    pub fn find_child(&self, parent: NodeId, name: &QName) -> Option<NodeId> {
        parent
            .children(&self.arena)
            .find(|&id| self.is_named(id, name))
    }

    pub fn find_children(&self, parent: NodeId, name: &QName) -> Vec<NodeId> {
        parent
            .children(&self.arena)
            .filter(|&id| self.is_named(id, name))
            .collect()
    }

    pub fn find_descendant(&self, node: NodeId, name: &QName) -> Option<NodeId> {
        node.descendants(&self.arena)
            .find(|&id| self.is_named(id, name))
    }

    pub fn find_descendants(&self, node: NodeId, name: &QName) -> Vec<NodeId> {
        node.descendants(&self.arena)
            .filter(|&id| self.is_named(id, name))
            .collect()
    }

    pub fn has_ancestor_named(&self, node: NodeId, name: &QName) -> bool {
        node.ancestors(&self.arena)
            .skip(1)
            .any(|id| self.is_named(id, name))
    }

    pub fn attr(&self, node: NodeId, name: &QName) -> Option<&str> {
        self.get(node)?
            .attrs()?
            .iter()
            .find(|a| &a.name == name)
            .map(|a| a.value.as_str())
    }

    /// First attribute whose local name matches, regardless of namespace.
    pub fn attr_local(&self, node: NodeId, local: &str) -> Option<&str> {
        self.get(node)?
            .attrs()?
            .iter()
            .find(|a| a.name.local == local)
            .map(|a| a.value.as_str())
    }

    pub fn attr_i64(&self, node: NodeId, local: &str) -> Option<i64> {
        self.attr_local(node, local)?.parse().ok()
    }

    pub fn attr_u32(&self, node: NodeId, local: &str) -> Option<u32> {
        self.attr_local(node, local)?.parse().ok()
    }

    pub fn attr_bool(&self, node: NodeId, local: &str) -> Option<bool> {
        match self.attr_local(node, local)? {
            "1" | "true" | "on" => Some(true),
            "0" | "false" | "off" => Some(false),
            _ => None,
        }
    }

    pub fn set_attr(&mut self, node: NodeId, name: &QName, value: &str) {
        if let Some(data) = self.get_mut(node) {
            if let Some(attrs) = data.attrs_mut() {
                if let Some(attr) = attrs.iter_mut().find(|a| &a.name == name) {
                    attr.value = value.to_string();
                } else {
                    attrs.push(Attr::new(name.clone(), value));
                }
            }
        }
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &QName) {
        if let Some(data) = self.get_mut(node) {
            if let Some(attrs) = data.attrs_mut() {
                attrs.retain(|a| &a.name != name);
            }
        }
    }

    pub fn retain_attrs<F>(&mut self, node: NodeId, keep: F)
    where
        F: Fn(&Attr) -> bool,
    {
        if let Some(data) = self.get_mut(node) {
            if let Some(attrs) = data.attrs_mut() {
                attrs.retain(|a| keep(a));
            }
        }
    }

    /// Concatenation of all text/CData descendants of `node`.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        for id in node.descendants(&self.arena) {
            if let Some(text) = self.get(id).and_then(XmlData::text_value) {
                out.push_str(text);
            }
        }
        out
    }

    /// Text content of the node's direct text children only.
    pub fn direct_text(&self, node: NodeId) -> String {
        let mut out = String::new();
        for id in node.children(&self.arena) {
            if let Some(text) = self.get(id).and_then(XmlData::text_value) {
                out.push_str(text);
            }
        }
        out
    }

    /// Deep-copies a subtree within this tree, appending it under `parent`.
    pub fn clone_subtree(&mut self, src: NodeId, parent: NodeId) -> NodeId {
        let data = self
            .get(src)
            .expect("source node must exist in this tree")
            .clone();
        let dst = self.add_child(parent, data);
        for child in self.children(src) {
            self.clone_subtree(child, dst);
        }
        dst
    }
}

impl Default for XmlTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Deep-copies a subtree from one tree into another, under `dst_parent`
/// (or as the destination root when `dst_parent` is `None`).
pub fn copy_subtree(
    src: &XmlTree,
    src_node: NodeId,
    dst: &mut XmlTree,
    dst_parent: Option<NodeId>,
) -> NodeId {
    let data = src
        .get(src_node)
        .expect("source node must exist in source tree")
        .clone();
    let dst_node = match dst_parent {
        Some(parent) => dst.add_child(parent, data),
        None => dst.add_root(data),
    };
    for child in src.children(src_node) {
        copy_subtree(src, child, dst, Some(dst_node));
    }
    dst_node
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (XmlTree, NodeId) {
        let mut tree = XmlTree::new();
        let root = tree.add_root(XmlData::element(QName::local("root")));
        (tree, root)
    }

    #[test]
    fn children_preserve_insertion_order() {
        let (mut tree, root) = sample();
        let a = tree.add_child(root, XmlData::element(QName::local("a")));
        let b = tree.add_child(root, XmlData::element(QName::local("b")));
        assert_eq!(tree.children(root), vec![a, b]);
    }

    #[test]
    fn set_attr_updates_in_place() {
        let (mut tree, root) = sample();
        let name = QName::local("id");
        tree.set_attr(root, &name, "1");
        tree.set_attr(root, &name, "2");
        assert_eq!(tree.attr(root, &name), Some("2"));
        assert_eq!(tree.get(root).unwrap().attrs().unwrap().len(), 1);
    }

    #[test]
    fn unwrap_node_hoists_children_in_order() {
        let (mut tree, root) = sample();
        let wrapper = tree.add_child(root, XmlData::element(QName::local("wrap")));
        tree.add_child(wrapper, XmlData::element(QName::local("x")));
        tree.add_child(wrapper, XmlData::element(QName::local("y")));
        tree.unwrap_node(wrapper);

        let names: Vec<String> = tree
            .children(root)
            .iter()
            .map(|&id| tree.name(id).unwrap().local.clone())
            .collect();
        assert_eq!(names, vec!["x", "y"]);
    }

    #[test]
    fn text_content_accumulates_descendants() {
        let (mut tree, root) = sample();
        let child = tree.add_child(root, XmlData::element(QName::local("t")));
        tree.add_child(child, XmlData::text("Hello "));
        let child2 = tree.add_child(root, XmlData::element(QName::local("t")));
        tree.add_child(child2, XmlData::text("World"));
        assert_eq!(tree.text_content(root), "Hello World");
    }

    #[test]
    fn copy_subtree_across_trees() {
        let (mut src, root) = sample();
        let p = src.add_child(root, XmlData::element(QName::local("p")));
        src.add_child(p, XmlData::text("content"));

        let mut dst = XmlTree::new();
        let dst_root = dst.add_root(XmlData::element(QName::local("body")));
        let copied = copy_subtree(&src, p, &mut dst, Some(dst_root));

        assert_eq!(dst.name(copied).unwrap().local, "p");
        assert_eq!(dst.text_content(copied), "content");
    }
}
