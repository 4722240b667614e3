//! Pagination
//!
//! Splits the top-level body sequence into page objects per section
//! breaks, manual breaks, and the rendered-break heuristic. This is a
//! structural pass: it never measures content. Where a true break point
//! needs rendered height (tables, table-of-contents paragraphs), the page
//! is marked not split-completed and the rendering collaborator re-splits
//! after measuring overflow.
//!
//! Splitting a paragraph synthesizes fragment nodes in the arena and
//! leaves the original node untouched, so pagination recomputes
//! idempotently: flattening the pages (collapsing fragments onto their
//! source) reconstructs the original body sequence node-for-node.

use doc_model::{BreakKind, DocumentTree, Node, NodeId, NodeKind, SectionProperties};
use serde::{Deserialize, Serialize};

/// Reserved anchor-name fragment marking table-of-contents hyperlinks.
const TOC_ANCHOR_MARKER: &str = "_Toc";

/// A rendered-break marker that would close a page holding no more than
/// this many top-level nodes is page-leading noise, not a real break.
const TRIVIAL_PAGE_PREFIX: usize = 2;

/// Pagination configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationOptions {
    /// Disabled, the whole document is returned as one page.
    pub break_pages: bool,
    /// Disable the rendered-break heuristic.
    pub ignore_last_rendered_page_break: bool,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            break_pages: true,
            ignore_last_rendered_page_break: false,
        }
    }
}

/// One top-level entry of a page: either a shared reference into the
/// tree, or a synthesized split fragment tagged with its source node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageItem {
    pub node: NodeId,
    /// The body node this fragment was split from, for fragments only.
    pub source: Option<NodeId>,
}

impl PageItem {
    fn shared(node: NodeId) -> Self {
        Self { node, source: None }
    }

    fn fragment(node: NodeId, source: NodeId) -> Self {
        Self {
            node,
            source: Some(source),
        }
    }

    /// The body node this item stands for.
    pub fn origin(&self) -> NodeId {
        self.source.unwrap_or(self.node)
    }
}

/// One page of content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub items: Vec<PageItem>,
    /// Governing section properties. Possibly borrowed from a later page:
    /// a section's properties live only on the paragraph terminating it,
    /// so earlier pages of the section receive them in the backward fill.
    pub section: Option<SectionProperties>,
    /// False when the true break point needs rendered-height measurement
    /// (a table or TOC paragraph sat on this page, or the page was never
    /// closed by a definite boundary); the renderer may then re-split.
    pub split_completed: bool,
    pub is_first: bool,
    pub is_last: bool,
}

/// Accumulates one page while walking the body.
#[derive(Debug, Default)]
struct PageBuilder {
    items: Vec<PageItem>,
    section: Option<SectionProperties>,
    deferred: bool,
}

impl PageBuilder {
    fn close(&mut self, closed_by_break: bool) -> Page {
        Page {
            items: std::mem::take(&mut self.items),
            section: self.section.take(),
            split_completed: closed_by_break && !self.deferred,
            is_first: false,
            is_last: false,
        }
    }
}

/// Paginate the tree. Takes `&mut` because split fragments are appended
/// to the arena; original nodes and the body sequence are never modified,
/// so repeated calls on the same tree produce structurally identical
/// results. Never fails: a document with no section properties anywhere
/// yields pages with `section: None` for the renderer to default.
pub fn paginate(tree: &mut DocumentTree, options: &PaginationOptions) -> Vec<Page> {
    let body: Vec<NodeId> = tree.body().to_vec();

    if !options.break_pages {
        return vec![single_page(tree, &body)];
    }

    let mut pages: Vec<Page> = Vec::new();
    let mut current = PageBuilder::default();

    for &id in &body {
        current.items.push(PageItem::shared(id));
        let node = tree.node(id);
        if node.is_table() {
            current.deferred = true;
            continue;
        }
        if !node.is_paragraph() {
            continue;
        }
        let section = node.as_paragraph().and_then(|bag| bag.section.clone());

        if has_toc_hyperlink(tree, id) {
            current.deferred = true;
        }

        // Style-declared page-break-before moves the whole paragraph onto
        // a fresh page, unless it already leads one.
        if style_breaks_before(tree, id) && current.items.len() > 1 {
            if let Some(moved) = current.items.pop() {
                pages.push(current.close(true));
                current.items.push(moved);
            }
        }

        if let Some((run_idx, child_idx)) = find_break(tree, id, options, current.items.len()) {
            match split_paragraph(tree, id, run_idx, child_idx) {
                Some(split) => {
                    // The head replaces the original on this page; the
                    // tail opens the next one.
                    if let Some(last) = current.items.last_mut() {
                        *last = PageItem::fragment(split.head, id);
                    }
                    pages.push(current.close(true));
                    current.items.push(PageItem::fragment(split.tail, id));
                }
                None => {
                    // Nothing follows the break; the page simply ends
                    // after this paragraph.
                    pages.push(current.close(true));
                }
            }
        }

        if let Some(section) = section {
            let inline_flow = section
                .section_type
                .map(|t| t.flows_inline())
                .unwrap_or(false);
            current.section = Some(section);
            if !inline_flow {
                pages.push(current.close(true));
            }
        }
    }
    if !current.items.is_empty() || pages.is_empty() {
        pages.push(current.close(false));
    }

    finish_pages(tree, &mut pages);
    pages
}

/// The degenerate single-page result for `break_pages == false`.
fn single_page(tree: &DocumentTree, body: &[NodeId]) -> Page {
    let mut section = None;
    for &id in body {
        if let NodeKind::Paragraph(bag) = &tree.node(id).kind {
            if let Some(terminal) = &bag.section {
                section = Some(terminal.clone());
            }
        }
    }
    let mut page = Page {
        items: body.iter().map(|&id| PageItem::shared(id)).collect(),
        section,
        split_completed: false,
        is_first: true,
        is_last: true,
    };
    if page.section.is_none() {
        page.section = document_section(tree);
    }
    page
}

/// Backward propagation and page flags. The final section's properties
/// attach to the document root, not a paragraph, so they seed the last
/// page before the backward fill borrows properties forward.
fn finish_pages(tree: &DocumentTree, pages: &mut [Page]) {
    if let Some(last) = pages.last_mut() {
        if last.section.is_none() {
            last.section = document_section(tree);
        }
    }
    let mut following: Option<SectionProperties> = None;
    for page in pages.iter_mut().rev() {
        match &page.section {
            Some(section) => following = Some(section.clone()),
            None => page.section = following.clone(),
        }
    }
    if let Some(first) = pages.first_mut() {
        first.is_first = true;
    }
    if let Some(last) = pages.last_mut() {
        last.is_last = true;
    }
}

fn document_section(tree: &DocumentTree) -> Option<SectionProperties> {
    match &tree.node(tree.root()).kind {
        NodeKind::Document(props) => props.section.clone(),
        _ => None,
    }
}

/// Whether the paragraph's resolved style declares page-break-before.
fn style_breaks_before(tree: &DocumentTree, para_id: NodeId) -> bool {
    tree.node(para_id)
        .style_id
        .as_deref()
        .and_then(|id| tree.styles.get(id))
        .and_then(|style| style.paragraph.page_break_before)
        .unwrap_or(false)
}

/// Whether the paragraph contains a table-of-contents hyperlink.
fn has_toc_hyperlink(tree: &DocumentTree, para_id: NodeId) -> bool {
    tree.descendants(para_id).iter().any(|&id| {
        matches!(
            &tree.node(id).kind,
            NodeKind::Hyperlink(props)
                if props.anchor.as_deref().is_some_and(|a| a.contains(TOC_ANCHOR_MARKER))
        )
    })
}

/// First (run index, child index) where a qualifying break occurs. Run
/// indexes address the paragraph's children; only runs are searched.
fn find_break(
    tree: &DocumentTree,
    para_id: NodeId,
    options: &PaginationOptions,
    current_page_len: usize,
) -> Option<(usize, usize)> {
    for (run_idx, &child_id) in tree.children(para_id).iter().enumerate() {
        if !tree.node(child_id).is_run() {
            continue;
        }
        for (child_idx, &grandchild) in tree.children(child_id).iter().enumerate() {
            if let NodeKind::Break(kind) = tree.node(grandchild).kind {
                let qualifies = match kind {
                    BreakKind::Page => true,
                    BreakKind::LastRendered => {
                        !options.ignore_last_rendered_page_break
                            && current_page_len > TRIVIAL_PAGE_PREFIX
                    }
                    BreakKind::Column | BreakKind::TextWrapping => false,
                };
                if qualifies {
                    return Some((run_idx, child_idx));
                }
            }
        }
    }
    None
}

struct SplitFragments {
    head: NodeId,
    tail: NodeId,
}

/// Synthesize the two halves of a paragraph straddling a break at
/// (run_idx, child_idx). The head holds content before the break point,
/// the tail carries the break node onward. When the break is not the
/// last child of its run, the run is partitioned into a before-run
/// (head) and an after-run (tail); otherwise the whole run moves.
/// Returns `None` when nothing would move - the break closes the page
/// without splitting anything.
fn split_paragraph(
    tree: &mut DocumentTree,
    para_id: NodeId,
    run_idx: usize,
    child_idx: usize,
) -> Option<SplitFragments> {
    let children = tree.children(para_id).to_vec();
    let break_run_id = children[run_idx];
    let run_children = tree.children(break_run_id).to_vec();
    let split_run = child_idx + 1 < run_children.len();
    if run_idx + 1 >= children.len() && !split_run {
        return None;
    }

    let mut head_children = children[..run_idx].to_vec();
    let mut tail_children: Vec<NodeId> = Vec::new();
    if split_run {
        if child_idx > 0 {
            let before = clone_shell(tree.node(break_run_id), run_children[..child_idx].to_vec());
            head_children.push(tree.push(before));
        }
        let after = clone_shell(tree.node(break_run_id), run_children[child_idx..].to_vec());
        tail_children.push(tree.push(after));
        tail_children.extend_from_slice(&children[run_idx + 1..]);
    } else {
        tail_children.extend_from_slice(&children[run_idx..]);
    }

    let head = clone_shell(tree.node(para_id), head_children);
    let head = tree.push(head);
    let tail = clone_shell(tree.node(para_id), tail_children);
    let tail = tree.push(tail);
    Some(SplitFragments { head, tail })
}

/// Shallow copy of a node with replacement children. Declarations, style
/// reference and the kind bag are cloned; the children are shared
/// references into the tree.
fn clone_shell(node: &Node, children: Vec<NodeId>) -> Node {
    Node {
        kind: node.kind.clone(),
        children,
        declarations: node.declarations.clone(),
        style_id: node.style_id.clone(),
        class_list: node.class_list.clone(),
    }
}

/// Reconstruct the original top-level sequence from a page list by
/// collapsing split fragments onto their source nodes. Inverse of the
/// intentional splits; used to state the round-trip guarantee.
pub fn flatten_pages(pages: &[Page]) -> Vec<NodeId> {
    let mut out: Vec<NodeId> = Vec::new();
    for item in pages.iter().flat_map(|page| &page.items) {
        let origin = item.origin();
        if out.last() != Some(&origin) {
            out.push(origin);
        }
    }
    out
}

// =============================================================================
// Tests
// =============================================================================


#[cfg(test)]
mod end_to_end {
    use super::*;
    use wml_parser::{DocumentParser, NoRelationships, PackageParts, ParseOptions, XmlElement};

    const NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    #[test]
    fn test_xml_to_pages() -> anyhow::Result<()> {
        let styles_xml = format!(
            r#"<w:styles {NS}>
                 <w:style w:type="paragraph" w:styleId="Normal" w:default="1"/>
                 <w:style w:type="paragraph" w:styleId="ChapterTitle">
                   <w:basedOn w:val="Normal"/>
                   <w:pPr><w:pageBreakBefore/></w:pPr>
                 </w:style>
               </w:styles>"#
        );
        let document_xml = format!(
            r#"<w:document {NS}>
                 <w:body>
                   <w:p><w:r><w:t>first page intro</w:t></w:r></w:p>
                   <w:p>
                     <w:pPr>
                       <w:sectPr>
                         <w:pgSz w:w="12240" w:h="15840"/>
                         <w:type w:val="nextPage"/>
                       </w:sectPr>
                     </w:pPr>
                     <w:r><w:t>end of the letter section</w:t></w:r>
                   </w:p>
                   <w:p w:rsidR="0"><w:pPr><w:pStyle w:val="ChapterTitle"/></w:pPr><w:r><w:t>chapter</w:t></w:r></w:p>
                   <w:p><w:r><w:t>text </w:t><w:br w:type="page"/><w:t>overflow</w:t></w:r></w:p>
                   <w:sectPr>
                     <w:pgSz w:w="11906" w:h="16838"/>
                   </w:sectPr>
                 </w:body>
               </w:document>"#
        );

        let parser = DocumentParser::new(ParseOptions::default());
        let document = XmlElement::parse(&document_xml)?;
        let styles = XmlElement::parse(&styles_xml)?;
        let mut tree = parser.parse_package(
            PackageParts {
                document: Some(&document),
                styles: Some(&styles),
                ..Default::default()
            },
            &NoRelationships,
        );

        let pages = paginate(&mut tree, &PaginationOptions::default());

        // Letter section page, chapter page (style break), overflow page.
        assert_eq!(pages.len(), 3);
        assert_eq!(
            pages
                .iter()
                .map(|p| p
                    .items
                    .iter()
                    .map(|item| tree.text_of(item.node))
                    .collect::<String>())
                .collect::<Vec<_>>(),
            vec![
                "firstpageintroendofthelettersection".to_string(),
                "chaptertext".to_string(),
                "overflow".to_string(),
            ]
        );

        // Every page has resolved section properties; the chapter page
        // borrows the body-terminal A4 section from the page after it.
        let ids: Vec<_> = pages
            .iter()
            .map(|p| p.section.as_ref().map(|s| s.id))
            .collect();
        assert!(ids.iter().all(Option::is_some));
        assert_ne!(ids[0], ids[1]);
        assert_eq!(ids[1], ids[2]);
        let letter = pages[0].section.as_ref().map(|s| s.page_size.width);
        assert_eq!(letter, Some(612.0));
        let a4 = pages[1].section.as_ref().map(|s| s.page_size.width);
        assert!((a4.unwrap_or_default() - 595.3).abs() < 0.1);

        assert_eq!(flatten_pages(&pages), tree.body().to_vec());
        Ok(())
    }
}
