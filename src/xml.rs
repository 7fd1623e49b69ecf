//! The XML seam: parsing, XPath evaluation, node inspection, annotation
//! and serialisation of the archive.
//!
//! Everything the rest of the engine needs from the tree lives behind
//! `Archive`; no other module touches `xot` or `xee_xpath` directly.
//! XPath *evaluation* failures are folded into empty results here, since
//! at every call site absence is semantically meaningful.

use crate::error::EngineError;
use xee_xpath::{Documents, Queries, Query};
use xot::Node;

pub struct Archive {
    documents: Documents,
    queries: Queries<'static>,
    root: Node,
}

impl Archive {
    /// Parse an archive from its textual form. Parse failures are fatal.
    pub fn parse(xml: &str) -> Result<Archive, EngineError> {
        let mut documents = Documents::new();
        let handle = documents
            .add_string_without_uri(xml)
            .map_err(|e| EngineError::MalformedArchive(format!("{e:?}")))?;

        let queries = Queries::default();
        let root = {
            let query = queries
                .sequence("/*")
                .map_err(|e| EngineError::MalformedArchive(format!("{e:?}")))?;
            let sequence = query
                .execute(&mut documents, handle)
                .map_err(|e| EngineError::MalformedArchive(format!("{e:?}")))?;
            let mut nodes = Vec::new();
            for item in sequence.iter() {
                if let Ok(node) = item.to_node() {
                    nodes.push(node);
                }
            }
            nodes
                .into_iter()
                .next()
                .ok_or_else(|| EngineError::MalformedArchive("document has no root element".into()))?
        };

        Ok(Archive {
            documents,
            queries,
            root,
        })
    }

    pub fn root_element(&self) -> Node {
        self.root
    }

    fn xot(&self) -> &xot::Xot {
        self.documents.xot()
    }

    /// Evaluate an XPath with `context` as the context item and collect the
    /// resulting nodes in document order. Compilation or evaluation errors
    /// yield an empty result.
    pub fn nodes(&mut self, xpath: &str, context: Node) -> Vec<Node> {
        let query = match self.queries.sequence(xpath) {
            Ok(query) => query,
            Err(e) => {
                log::debug!("xpath '{xpath}' failed to compile: {e:?}");
                return Vec::new();
            }
        };
        let sequence = match query.execute(&mut self.documents, context) {
            Ok(sequence) => sequence,
            Err(e) => {
                log::debug!("xpath '{xpath}' failed to evaluate: {e:?}");
                return Vec::new();
            }
        };
        let mut nodes = Vec::new();
        for item in sequence.iter() {
            if let Ok(node) = item.to_node() {
                nodes.push(node);
            }
        }
        nodes
    }

    pub fn first_node(&mut self, xpath: &str, context: Node) -> Option<Node> {
        self.nodes(xpath, context).into_iter().next()
    }

    /// Evaluate an XPath and return the text content of each resulting node.
    pub fn strings(&mut self, xpath: &str, context: Node) -> Vec<String> {
        self.nodes(xpath, context)
            .into_iter()
            .map(|node| self.text(node))
            .collect()
    }

    pub fn first_string(&mut self, xpath: &str, context: Node) -> Option<String> {
        self.first_node(xpath, context).map(|node| self.text(node))
    }

    /// Concatenated descendant text of a node.
    pub fn text(&self, node: Node) -> String {
        let xot = self.xot();
        let mut out = String::new();
        for descendant in xot.descendants(node) {
            if let Some(text) = xot.text_str(descendant) {
                out.push_str(text);
            }
        }
        out
    }

    /// Local name of an element node; empty for non-elements.
    pub fn element_name(&self, node: Node) -> String {
        let xot = self.xot();
        match xot.element(node) {
            Some(element) => {
                let (local, _uri) = xot.name_ns_str(element.name());
                local.to_string()
            }
            None => String::new(),
        }
    }

    pub fn attribute(&self, node: Node, name: &str) -> Option<String> {
        let xot = self.xot();
        let name_id = xot.name(name)?;
        xot.attributes(node).get(name_id).map(|v| v.to_string())
    }

    pub fn set_attribute(&mut self, node: Node, name: &str, value: &str) {
        let xot = self.documents.xot_mut();
        let name_id = xot.add_name(name);
        xot.attributes_mut(node).insert(name_id, value.to_string());
    }

    /// Element children of a node, in document order.
    pub fn child_elements(&self, node: Node) -> Vec<Node> {
        let xot = self.xot();
        xot.children(node)
            .filter(|child| xot.element(*child).is_some())
            .collect()
    }

    pub fn parent(&self, node: Node) -> Option<Node> {
        self.xot().parent(node)
    }

    pub fn is_element(&self, node: Node) -> bool {
        self.xot().element(node).is_some()
    }

    /// Direct text content of a node's own text children (no descent).
    pub fn own_text(&self, node: Node) -> String {
        let xot = self.xot();
        let mut out = String::new();
        for child in xot.children(node) {
            if let Some(text) = xot.text_str(child) {
                out.push_str(text);
            }
        }
        out
    }

    /// Positional XPath of an element, rooted at the document element:
    /// `/unit[1]/class[2]/block[1]/function[3]`. Stable across runs for an
    /// unchanged document; used as the annotation map key.
    pub fn node_xpath(&self, node: Node) -> String {
        let mut segments = Vec::new();
        let mut current = node;
        loop {
            if !self.is_element(current) {
                break;
            }
            let name = self.element_name(current);
            let position = self.sibling_position(current, &name);
            segments.push(format!("{name}[{position}]"));
            match self.parent(current) {
                Some(parent) if self.is_element(parent) => current = parent,
                _ => break,
            }
        }
        segments.reverse();
        format!("/{}", segments.join("/"))
    }

    fn sibling_position(&self, node: Node, name: &str) -> usize {
        let Some(parent) = self.parent(node) else {
            return 1;
        };
        let mut position = 0;
        for sibling in self.xot().children(parent) {
            if self.element_name(sibling) == name {
                position += 1;
            }
            if sibling == node {
                break;
            }
        }
        position.max(1)
    }

    /// Serialise the whole (possibly annotated) document.
    pub fn to_xml(&self) -> Result<String, EngineError> {
        let xot = self.xot();
        let document = xot.root(self.root);
        xot.to_string(document)
            .map_err(|e| EngineError::Serialise(format!("{e:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Archive {
        Archive::parse(
            "<unit language=\"Java\"><class><name>A</name><block>\
             <function><name>f</name></function>\
             <function><name>g</name></function>\
             </block></class></unit>",
        )
        .unwrap()
    }

    #[test]
    fn parse_rejects_malformed_xml() {
        assert!(matches!(
            Archive::parse("<unit><unclosed></unit>"),
            Err(EngineError::MalformedArchive(_))
        ));
    }

    #[test]
    fn nodes_and_text_walk_the_tree() {
        let mut archive = sample();
        let root = archive.root_element();
        let names = archive.strings(".//function/name", root);
        assert_eq!(names, vec!["f".to_string(), "g".to_string()]);
    }

    #[test]
    fn bad_xpath_yields_no_results() {
        let mut archive = sample();
        let root = archive.root_element();
        assert!(archive.nodes("./]]broken", root).is_empty());
    }

    #[test]
    fn attributes_read_and_write() {
        let mut archive = sample();
        let root = archive.root_element();
        assert_eq!(archive.attribute(root, "language").as_deref(), Some("Java"));
        assert_eq!(archive.attribute(root, "filename"), None);

        let class = archive.first_node("./class", root).unwrap();
        archive.set_attribute(class, "stereotype", "data-class");
        let serialised = archive.to_xml().unwrap();
        assert!(serialised.contains("stereotype=\"data-class\""));
    }

    #[test]
    fn positional_xpaths_disambiguate_siblings() {
        let mut archive = sample();
        let root = archive.root_element();
        let functions = archive.nodes(".//function", root);
        assert_eq!(functions.len(), 2);
        assert_eq!(
            archive.node_xpath(functions[0]),
            "/unit[1]/class[1]/block[1]/function[1]"
        );
        assert_eq!(
            archive.node_xpath(functions[1]),
            "/unit[1]/class[1]/block[1]/function[2]"
        );
    }

    #[test]
    fn own_text_does_not_descend() {
        let archive = Archive::parse("<a>x<b>y</b>z</a>").unwrap();
        let root = archive.root_element();
        assert_eq!(archive.own_text(root), "xz");
        assert_eq!(archive.text(root), "xyz");
    }
}
