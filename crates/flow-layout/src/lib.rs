//! Flow Layout
//!
//! Sankey layout for weighted, acyclic flow graphs. Nodes get a rectangle whose
//! height is proportional to the flow through them, links get a breadth
//! proportional to their value and a horizontal Bézier path between the facing
//! node edges.
//!
//! ```
//! use flow_layout::{Extent, LinkSpec, NodeSpec, Sankey, SankeyGraph};
//!
//! let graph = SankeyGraph {
//!     nodes: vec![NodeSpec::new("a"), NodeSpec::new("b")],
//!     links: vec![LinkSpec::new(0, 1, 5.0)],
//! };
//! let layout = Sankey::new()
//!     .extent(Extent::new([0.0, 0.0], [200.0, 100.0]))
//!     .layout(&graph)
//!     .unwrap();
//! assert_eq!(layout.nodes.len(), 2);
//! ```

mod error;
mod path;
mod sankey;

pub use error::{LayoutError, Result};
pub use path::LinkPath;

/// Rectangle the diagram is fitted into, `[[x0, y0], [x1, y1]]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Extent {
    pub fn new(top_left: [f64; 2], bottom_right: [f64; 2]) -> Self {
        Self {
            x0: top_left[0],
            y0: top_left[1],
            x1: bottom_right[0],
            y1: bottom_right[1],
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

impl Default for Extent {
    fn default() -> Self {
        Self::new([0.0, 0.0], [1.0, 1.0])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    pub name: String,
}

impl NodeSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Link between two nodes, addressed by their position in [`SankeyGraph::nodes`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkSpec {
    pub source: usize,
    pub target: usize,
    pub value: f64,
}

impl LinkSpec {
    pub fn new(source: usize, target: usize, value: f64) -> Self {
        Self {
            source,
            target,
            value,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SankeyGraph {
    pub nodes: Vec<NodeSpec>,
    pub links: Vec<LinkSpec>,
}

/// Column assignment strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NodeAlign {
    Left,
    Right,
    /// Like `Left`, but sinks are pushed to the last column.
    #[default]
    Justify,
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SankeyNode {
    pub index: usize,
    pub name: String,
    /// `max(sum of outgoing, sum of incoming)` link values.
    pub value: f64,
    pub depth: usize,
    pub height: usize,
    pub layer: usize,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    /// Outgoing link indices, ordered top to bottom.
    pub source_links: Vec<usize>,
    /// Incoming link indices, ordered top to bottom.
    pub target_links: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SankeyLink {
    pub index: usize,
    pub source: usize,
    pub target: usize,
    pub value: f64,
    pub width: f64,
    /// Vertical centre of the link where it leaves the source node.
    pub y0: f64,
    /// Vertical centre of the link where it enters the target node.
    pub y1: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SankeyLayout {
    pub extent: Extent,
    pub node_width: f64,
    /// Effective vertical padding; may be smaller than requested when columns are crowded.
    pub node_padding: f64,
    pub nodes: Vec<SankeyNode>,
    pub links: Vec<SankeyLink>,
}

impl SankeyLayout {
    pub fn link_path(&self, link: &SankeyLink) -> LinkPath {
        LinkPath {
            source: (self.nodes[link.source].x1, link.y0),
            target: (self.nodes[link.target].x0, link.y1),
        }
    }
}

/// Layout generator. Defaults: node width 24, padding 8, extent `[[0, 0], [1, 1]]`,
/// justify alignment, 6 relaxation iterations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sankey {
    extent: Extent,
    node_width: f64,
    node_padding: f64,
    align: NodeAlign,
    iterations: usize,
}

impl Default for Sankey {
    fn default() -> Self {
        Self {
            extent: Extent::default(),
            node_width: 24.0,
            node_padding: 8.0,
            align: NodeAlign::Justify,
            iterations: 6,
        }
    }
}

impl Sankey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extent(mut self, extent: Extent) -> Self {
        self.extent = extent;
        self
    }

    pub fn node_width(mut self, width: f64) -> Self {
        self.node_width = width;
        self
    }

    pub fn node_padding(mut self, padding: f64) -> Self {
        self.node_padding = padding;
        self
    }

    pub fn align(mut self, align: NodeAlign) -> Self {
        self.align = align;
        self
    }

    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn layout(&self, graph: &SankeyGraph) -> Result<SankeyLayout> {
        sankey::compute(self, graph)
    }
}
