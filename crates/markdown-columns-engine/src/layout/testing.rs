//! Test doubles with declared heights.

use std::cell::Cell;
use std::rc::Rc;

use crate::layout::{
    ColumnStyle, ColumnSurface, RenderTarget, Renderer, StructuralClassifier, TaskListFixup,
};
use crate::models::{BlockTag, ContentBlock, Height};

#[derive(Debug, Clone, PartialEq)]
pub struct FakeNode {
    pub label: String,
    pub height: Height,
    /// Height once placed as a display copy, if it differs (narrower column).
    pub placed_height: Option<Height>,
    pub heading: bool,
    pub task_list: bool,
    pub is_copy: bool,
    pub fixed_up: bool,
}

impl FakeNode {
    pub fn text(label: &str, height: Height) -> Self {
        Self {
            label: label.to_string(),
            height,
            placed_height: None,
            heading: false,
            task_list: false,
            is_copy: false,
            fixed_up: false,
        }
    }

    pub fn heading(label: &str, height: Height) -> Self {
        Self {
            heading: true,
            ..Self::text(label, height)
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeHost {
    pub duplicates: usize,
    pub fixups: usize,
}

impl Renderer for FakeHost {
    type Node = FakeNode;

    fn render(&mut self, source: &str) -> FakeNode {
        FakeNode::text(source, source.lines().count() as Height)
    }

    fn duplicate(&mut self, node: &FakeNode) -> FakeNode {
        self.duplicates += 1;
        FakeNode {
            is_copy: true,
            ..node.clone()
        }
    }
}

impl StructuralClassifier for FakeHost {
    fn is_heading(&self, node: &FakeNode) -> bool {
        node.heading
    }

    fn is_task_list(&self, node: &FakeNode) -> bool {
        node.task_list
    }
}

impl TaskListFixup for FakeHost {
    fn fixup(&mut self, node: &mut FakeNode, for_display_copy: bool) {
        self.fixups += 1;
        node.fixed_up = for_display_copy;
    }
}

#[derive(Debug, Default)]
pub struct FakeColumn {
    pub children: Vec<FakeNode>,
    attaches: usize,
    /// Shared counter bumped on every clear and added to the column height,
    /// so heights never settle.
    jitter: Option<Rc<Cell<Height>>>,
}

impl FakeColumn {
    pub fn attach_count(&self) -> usize {
        self.attaches
    }

    pub fn labels(&self) -> Vec<&str> {
        self.children.iter().map(|n| n.label.as_str()).collect()
    }
}

impl ColumnSurface for FakeColumn {
    type Node = FakeNode;

    fn attach(&mut self, node: FakeNode) -> Height {
        self.attaches += 1;
        let height = match (node.is_copy, node.placed_height) {
            (true, Some(placed)) => placed,
            _ => node.height,
        };
        self.children.push(node);
        height
    }

    fn detach_last(&mut self) -> Option<FakeNode> {
        self.children.pop()
    }

    fn clear(&mut self) {
        self.children.clear();
        if let Some(jitter) = &self.jitter {
            jitter.set(jitter.get() + 1);
        }
    }

    fn len(&self) -> usize {
        self.children.len()
    }

    fn height(&self) -> Height {
        let content: Height = self
            .children
            .iter()
            .map(|n| n.placed_height.filter(|_| n.is_copy).unwrap_or(n.height))
            .sum();
        content + self.jitter.as_ref().map_or(0, |j| j.get())
    }
}

#[derive(Debug, Default)]
pub struct FakeTarget {
    pub columns: Vec<FakeColumn>,
    pub recreated: usize,
    pub style: Option<ColumnStyle>,
    pub jitter: Option<Rc<Cell<Height>>>,
}

impl FakeTarget {
    /// A target whose column heights change on every pass.
    pub fn unsettled() -> Self {
        Self {
            jitter: Some(Rc::new(Cell::new(0))),
            ..Self::default()
        }
    }

    pub fn labels(&self) -> Vec<Vec<&str>> {
        self.columns.iter().map(FakeColumn::labels).collect()
    }
}

impl RenderTarget for FakeTarget {
    type Column = FakeColumn;

    fn recreate_columns(&mut self, count: usize, style: &ColumnStyle) {
        self.recreated += 1;
        self.style = Some(style.clone());
        self.columns = (0..count)
            .map(|_| FakeColumn {
                jitter: self.jitter.clone(),
                ..FakeColumn::default()
            })
            .collect();
    }

    fn columns(&self) -> &[FakeColumn] {
        &self.columns
    }

    fn columns_mut(&mut self) -> &mut [FakeColumn] {
        &mut self.columns
    }
}

pub fn content(label: &str, height: Height) -> ContentBlock<FakeNode> {
    ContentBlock::new(FakeNode::text(label, height), vec![label.to_string()])
}

pub fn heading(label: &str, height: Height) -> ContentBlock<FakeNode> {
    ContentBlock::new(FakeNode::heading(label, height), vec![format!("# {label}")])
}

pub fn marker(label: &str, tag: BlockTag) -> ContentBlock<FakeNode> {
    ContentBlock::new(FakeNode::text(label, 1), vec![label.to_string()]).with_tag(tag)
}
