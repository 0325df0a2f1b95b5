//! Chart Scene
//!
//! Turns a flow graph into plain drawing primitives (rects, paths, labels) so the
//! SVG component only has to map them to elements.

use flow_layout::{Extent, Sankey, SankeyGraph, SankeyLayout};

use crate::numeric::format_number;

/// d3 `schemeCategory10`
pub const CATEGORY10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22",
    "#17becf",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartConfig {
    pub height: f64,
    pub node_width: f64,
    pub node_padding: f64,
    /// Layout extent is `[[left, top], [width - right, height - bottom]]`
    pub inset_left: f64,
    pub inset_top: f64,
    pub inset_right: f64,
    pub inset_bottom: f64,
    pub link_color: &'static str,
    pub link_opacity: f64,
    pub node_opacity: f64,
    pub label_gap: f64,
    pub palette: &'static [&'static str],
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            height: 700.0,
            node_width: 10.0,
            node_padding: 20.0,
            inset_left: 1.0,
            inset_top: 1.0,
            inset_right: 1.0,
            inset_bottom: 6.0,
            link_color: "#007bff",
            link_opacity: 0.4,
            node_opacity: 0.8,
            label_gap: 6.0,
            palette: &CATEGORY10,
        }
    }
}

impl ChartConfig {
    pub fn extent(&self, width: f64) -> Extent {
        Extent::new(
            [self.inset_left, self.inset_top],
            [width - self.inset_right, self.height - self.inset_bottom],
        )
    }

    fn node_fill(&self, index: usize) -> &'static str {
        if self.palette.is_empty() {
            return "#000";
        }
        self.palette[index % self.palette.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    End,
}

impl TextAnchor {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::End => "end",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkStroke {
    pub d: String,
    pub stroke_width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeLabel {
    pub x: f64,
    pub y: f64,
    pub anchor: TextAnchor,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartScene {
    pub width: f64,
    pub height: f64,
    pub rects: Vec<NodeRect>,
    pub links: Vec<LinkStroke>,
    pub labels: Vec<NodeLabel>,
}

impl ChartScene {
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty() && self.links.is_empty()
    }
}

/// Lay out `graph` on a canvas `width` wide. A graph that cannot be laid out
/// yields an empty scene.
pub fn build_scene(config: &ChartConfig, width: f64, graph: &SankeyGraph) -> ChartScene {
    let empty = ChartScene {
        width: width.max(0.0),
        height: config.height,
        ..Default::default()
    };
    if !width.is_finite() || width <= config.inset_left + config.inset_right {
        return empty;
    }

    let layout = Sankey::new()
        .extent(config.extent(width))
        .node_width(config.node_width)
        .node_padding(config.node_padding)
        .layout(graph);
    match layout {
        Ok(layout) => scene_from_layout(config, width, &layout),
        Err(e) => {
            log::warn!("[CHART] layout failed: {}", e);
            empty
        }
    }
}

fn scene_from_layout(config: &ChartConfig, width: f64, layout: &SankeyLayout) -> ChartScene {
    let rects = layout
        .nodes
        .iter()
        .map(|node| NodeRect {
            x: node.x0,
            y: node.y0,
            width: node.x1 - node.x0,
            height: node.y1 - node.y0,
            fill: config.node_fill(node.index),
        })
        .collect();

    let links = layout
        .links
        .iter()
        .map(|link| LinkStroke {
            d: layout.link_path(link).to_svg_d(),
            stroke_width: link.width.max(1.0),
        })
        .collect();

    let labels = layout
        .nodes
        .iter()
        .map(|node| {
            let (x, anchor) = if node.x0 < width / 2.0 {
                (node.x1 + config.label_gap, TextAnchor::Start)
            } else {
                (node.x0 - config.label_gap, TextAnchor::End)
            };
            NodeLabel {
                x,
                y: (node.y0 + node.y1) / 2.0,
                anchor,
                text: format!("{}: ${}", node.name, format_number(node.value)),
            }
        })
        .collect();

    ChartScene {
        width,
        height: config.height,
        rects,
        links,
        labels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::flow_graph;
    use crate::models::{BillItem, BudgetState, ItemId};
    use flow_layout::LinkSpec;

    fn scene_for(state: &BudgetState) -> ChartScene {
        build_scene(&ChartConfig::default(), 800.0, &flow_graph(state))
    }

    #[test]
    fn test_default_budget_scene() {
        let scene = scene_for(&BudgetState::default());

        assert_eq!(scene.rects.len(), 5);
        assert_eq!(scene.links.len(), 4);
        assert_eq!(scene.labels.len(), 5);
        assert_eq!(scene.labels[0].text, "Income: $1100");
        assert_eq!(scene.labels[1].text, "Bills: $100");
        assert_eq!(scene.labels[3].text, "Phone Bill: $100");
        assert_eq!(scene.labels[4].text, "Unnamed: $0");
        assert_eq!(scene.rects[0].fill, "#1f77b4");
        assert_eq!(scene.rects[3].fill, "#d62728");
        for rect in &scene.rects {
            assert!((rect.width - 10.0).abs() < 1e-9);
            assert!(rect.x >= 1.0 && rect.x + rect.width <= 799.0 + 1e-9);
        }
    }

    #[test]
    fn test_zero_width_links_still_visible() {
        let scene = scene_for(&BudgetState::default());
        // Bills -> Unnamed carries 0
        assert_eq!(scene.links[3].stroke_width, 1.0);
        assert!(scene.links.iter().all(|l| l.stroke_width >= 1.0));
        assert!(scene.links.iter().all(|l| l.d.starts_with('M')));
    }

    #[test]
    fn test_label_anchor_follows_side() {
        let scene = scene_for(&BudgetState {
            savings: 1000.0,
            bill_items: vec![BillItem::new(ItemId(1), "Rent", 500.0)],
            next_item_id: 2,
        });

        let income = &scene.labels[0];
        assert_eq!(income.anchor, TextAnchor::Start);
        assert!((income.x - (1.0 + 10.0 + 6.0)).abs() < 1e-9);

        let rent = &scene.labels[3];
        assert_eq!(rent.anchor, TextAnchor::End);
        assert!((rent.x - (799.0 - 10.0 - 6.0)).abs() < 1e-9);
        assert_eq!(rent.text, "Rent: $500");
    }

    #[test]
    fn test_all_zero_budget_renders() {
        let scene = scene_for(&BudgetState::new(0.0));
        assert_eq!(scene.rects.len(), 3);
        assert!(scene
            .rects
            .iter()
            .all(|r| r.y.is_finite() && r.height.is_finite()));
    }

    #[test]
    fn test_bad_graph_gives_empty_scene() {
        let mut graph = flow_graph(&BudgetState::default());
        graph.links.push(LinkSpec::new(1, 42, 5.0));

        let scene = build_scene(&ChartConfig::default(), 800.0, &graph);
        assert!(scene.is_empty());
        assert_eq!(scene.height, 700.0);
    }

    #[test]
    fn test_unmeasured_canvas_gives_empty_scene() {
        let graph = flow_graph(&BudgetState::default());
        assert!(build_scene(&ChartConfig::default(), 0.0, &graph).is_empty());
        assert!(build_scene(&ChartConfig::default(), f64::NAN, &graph).is_empty());
    }
}
