//! Layout passes of the d3-sankey algorithm (Mike Bostock, ISC licensed), also
//! followed by the Mermaid sankey renderer.

use std::cmp::Ordering;

use crate::{
    LayoutError, NodeAlign, Result, Sankey, SankeyGraph, SankeyLayout, SankeyLink, SankeyNode,
};

fn f64_cmp(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

pub(crate) fn compute(config: &Sankey, graph: &SankeyGraph) -> Result<SankeyLayout> {
    let extent = config.extent;
    let dx = config.node_width;
    let dy = config.node_padding;

    let mut nodes: Vec<SankeyNode> = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(i, n)| SankeyNode {
            index: i,
            name: n.name.clone(),
            value: 0.0,
            depth: 0,
            height: 0,
            layer: 0,
            x0: 0.0,
            x1: 0.0,
            y0: 0.0,
            y1: 0.0,
            source_links: Vec::new(),
            target_links: Vec::new(),
        })
        .collect();

    let mut links: Vec<SankeyLink> = Vec::with_capacity(graph.links.len());
    for (i, l) in graph.links.iter().enumerate() {
        for endpoint in [l.source, l.target] {
            if endpoint >= nodes.len() {
                return Err(LayoutError::MissingNode {
                    link: i,
                    node: endpoint,
                    node_count: nodes.len(),
                });
            }
        }
        if !l.value.is_finite() {
            return Err(LayoutError::NonFiniteValue { link: i });
        }
        links.push(SankeyLink {
            index: i,
            source: l.source,
            target: l.target,
            value: l.value,
            width: 0.0,
            y0: 0.0,
            y1: 0.0,
        });
        nodes[l.source].source_links.push(i);
        nodes[l.target].target_links.push(i);
    }

    compute_node_values(&mut nodes, &links);
    compute_node_depths(&mut nodes, &links)?;
    compute_node_heights(&mut nodes, &links)?;

    let mut columns = compute_node_layers(&mut nodes, &links, config);

    let max_len = columns.iter().map(|c| c.len()).max().unwrap_or(0);
    let py = if max_len <= 1 {
        dy
    } else {
        dy.min(extent.height() / (max_len as f64 - 1.0))
    };

    initialize_node_breadths(&mut nodes, &mut links, &columns, py, config);

    let iterations = config.iterations;
    for i in 0..iterations {
        let alpha = 0.99_f64.powi(i as i32);
        let beta = (1.0 - alpha).max((i as f64 + 1.0) / iterations as f64);
        let relax = Relax {
            py,
            alpha,
            beta,
            y0: extent.y0,
            y1: extent.y1,
        };
        relax.right_to_left(&mut nodes, &links, &mut columns);
        relax.left_to_right(&mut nodes, &links, &mut columns);
    }

    compute_link_breadths(&nodes, &mut links);

    Ok(SankeyLayout {
        extent,
        node_width: dx,
        node_padding: py,
        nodes,
        links,
    })
}

fn compute_node_values(nodes: &mut [SankeyNode], links: &[SankeyLink]) {
    for n in nodes.iter_mut() {
        let out_sum = n.source_links.iter().fold(0.0, |acc, &li| acc + links[li].value);
        let in_sum = n.target_links.iter().fold(0.0, |acc, &li| acc + links[li].value);
        n.value = out_sum.max(in_sum);
    }
}

fn compute_node_depths(nodes: &mut [SankeyNode], links: &[SankeyLink]) -> Result<()> {
    let n = nodes.len();
    let mut current: Vec<usize> = (0..n).collect();
    let mut next_seen = vec![false; n];
    let mut x = 0usize;
    while !current.is_empty() {
        let mut next = Vec::new();
        for &node_idx in &current {
            nodes[node_idx].depth = x;
            for &li in &nodes[node_idx].source_links {
                let t = links[li].target;
                if !next_seen[t] {
                    next_seen[t] = true;
                    next.push(t);
                }
            }
        }
        x += 1;
        if x > n {
            return Err(LayoutError::CircularLink);
        }
        current = next;
        next_seen.fill(false);
    }
    Ok(())
}

fn compute_node_heights(nodes: &mut [SankeyNode], links: &[SankeyLink]) -> Result<()> {
    let n = nodes.len();
    let mut current: Vec<usize> = (0..n).collect();
    let mut next_seen = vec![false; n];
    let mut x = 0usize;
    while !current.is_empty() {
        let mut next = Vec::new();
        for &node_idx in &current {
            nodes[node_idx].height = x;
            for &li in &nodes[node_idx].target_links {
                let s = links[li].source;
                if !next_seen[s] {
                    next_seen[s] = true;
                    next.push(s);
                }
            }
        }
        x += 1;
        if x > n {
            return Err(LayoutError::CircularLink);
        }
        current = next;
        next_seen.fill(false);
    }
    Ok(())
}

fn compute_node_layers(
    nodes: &mut [SankeyNode],
    links: &[SankeyLink],
    config: &Sankey,
) -> Vec<Vec<usize>> {
    let extent = config.extent;
    let column_count = nodes.iter().map(|n| n.depth).max().map_or(1, |d| d + 1);
    let kx = if column_count <= 1 {
        0.0
    } else {
        (extent.width() - config.node_width) / (column_count as f64 - 1.0)
    };

    let mut columns: Vec<Vec<usize>> = vec![Vec::new(); column_count];
    for i in 0..nodes.len() {
        let x = column_count as i64;
        let node = &nodes[i];
        let raw_layer = match config.align {
            NodeAlign::Left => node.depth as i64,
            NodeAlign::Right => x - 1 - node.height as i64,
            NodeAlign::Justify => {
                if node.source_links.is_empty() {
                    x - 1
                } else {
                    node.depth as i64
                }
            }
            NodeAlign::Center => {
                if !node.target_links.is_empty() {
                    node.depth as i64
                } else if !node.source_links.is_empty() {
                    let min_target_depth = node
                        .source_links
                        .iter()
                        .map(|&li| nodes[links[li].target].depth)
                        .min()
                        .unwrap_or(0);
                    min_target_depth as i64 - 1
                } else {
                    0
                }
            }
        };
        let layer = raw_layer.clamp(0, x - 1) as usize;
        let node = &mut nodes[i];
        node.layer = layer;
        node.x0 = extent.x0 + layer as f64 * kx;
        node.x1 = node.x0 + config.node_width;
        columns[layer].push(i);
    }
    columns
}

fn initialize_node_breadths(
    nodes: &mut [SankeyNode],
    links: &mut [SankeyLink],
    columns: &[Vec<usize>],
    py: f64,
    config: &Sankey,
) {
    let extent = config.extent;

    // Columns without positive flow cannot constrain the scale.
    let mut ky = f64::INFINITY;
    for col in columns {
        let sum_values = col.iter().fold(0.0, |acc, &ni| acc + nodes[ni].value);
        if sum_values <= 0.0 {
            continue;
        }
        let denom = extent.height() - (col.len() as f64 - 1.0) * py;
        ky = ky.min(denom / sum_values);
    }
    if !ky.is_finite() {
        ky = 0.0;
    }

    for col in columns {
        let mut y = extent.y0;
        for &ni in col {
            nodes[ni].y0 = y;
            nodes[ni].y1 = y + nodes[ni].value * ky;
            y = nodes[ni].y1 + py;
            for &li in &nodes[ni].source_links {
                links[li].width = links[li].value * ky;
            }
        }
        let n = col.len();
        if n > 0 {
            let offset = (extent.y1 - y + py) / (n as f64 + 1.0);
            for (i, &ni) in col.iter().enumerate() {
                let adj = offset * (i as f64 + 1.0);
                nodes[ni].y0 += adj;
                nodes[ni].y1 += adj;
            }
            reorder_links(nodes, links, col);
        }
    }
}

fn sort_source_links_by_target_y0(node_y0: &[f64], links: &[SankeyLink], indices: &mut [usize]) {
    indices.sort_by(|&a, &b| {
        f64_cmp(node_y0[links[a].target], node_y0[links[b].target])
            .then_with(|| links[a].index.cmp(&links[b].index))
    });
}

fn sort_target_links_by_source_y0(node_y0: &[f64], links: &[SankeyLink], indices: &mut [usize]) {
    indices.sort_by(|&a, &b| {
        f64_cmp(node_y0[links[a].source], node_y0[links[b].source])
            .then_with(|| links[a].index.cmp(&links[b].index))
    });
}

fn reorder_links(nodes: &mut [SankeyNode], links: &[SankeyLink], column: &[usize]) {
    let node_y0: Vec<f64> = nodes.iter().map(|n| n.y0).collect();
    for &ni in column {
        sort_source_links_by_target_y0(&node_y0, links, &mut nodes[ni].source_links);
        sort_target_links_by_source_y0(&node_y0, links, &mut nodes[ni].target_links);
    }
}

fn reorder_node_links(nodes: &mut [SankeyNode], links: &[SankeyLink], node_idx: usize) {
    let node_y0: Vec<f64> = nodes.iter().map(|n| n.y0).collect();

    let target_links = nodes[node_idx].target_links.clone();
    for li in target_links {
        let source = links[li].source;
        sort_source_links_by_target_y0(&node_y0, links, &mut nodes[source].source_links);
    }

    let source_links = nodes[node_idx].source_links.clone();
    for li in source_links {
        let target = links[li].target;
        sort_target_links_by_source_y0(&node_y0, links, &mut nodes[target].target_links);
    }
}

/// Top of the link from `source` to `target` as seen from the target column.
fn target_top(nodes: &[SankeyNode], links: &[SankeyLink], py: f64, source: usize, target: usize) -> f64 {
    let count = nodes[source].source_links.len() as f64;
    let mut y = nodes[source].y0 - (count - 1.0) * py / 2.0;
    for &li in &nodes[source].source_links {
        if links[li].target == target {
            break;
        }
        y += links[li].width + py;
    }
    for &li in &nodes[target].target_links {
        if links[li].source == source {
            break;
        }
        y -= links[li].width;
    }
    y
}

/// Top of the link from `source` to `target` as seen from the source column.
fn source_top(nodes: &[SankeyNode], links: &[SankeyLink], py: f64, source: usize, target: usize) -> f64 {
    let count = nodes[target].target_links.len() as f64;
    let mut y = nodes[target].y0 - (count - 1.0) * py / 2.0;
    for &li in &nodes[target].target_links {
        if links[li].source == source {
            break;
        }
        y += links[li].width + py;
    }
    for &li in &nodes[source].source_links {
        if links[li].target == target {
            break;
        }
        y -= links[li].width;
    }
    y
}

struct Relax {
    py: f64,
    alpha: f64,
    beta: f64,
    y0: f64,
    y1: f64,
}

impl Relax {
    fn left_to_right(&self, nodes: &mut [SankeyNode], links: &[SankeyLink], columns: &mut [Vec<usize>]) {
        for column in columns.iter_mut().skip(1) {
            for &target in column.iter() {
                let mut y = 0.0;
                let mut w = 0.0;
                for &li in &nodes[target].target_links {
                    let source = links[li].source;
                    let v = links[li].value * (nodes[target].layer as f64 - nodes[source].layer as f64);
                    y += target_top(nodes, links, self.py, source, target) * v;
                    w += v;
                }
                if !(w > 0.0) {
                    continue;
                }
                let dy = (y / w - nodes[target].y0) * self.alpha;
                nodes[target].y0 += dy;
                nodes[target].y1 += dy;
                reorder_node_links(nodes, links, target);
            }
            column.sort_by(|&a, &b| f64_cmp(nodes[a].y0, nodes[b].y0));
            self.resolve_collisions(nodes, column);
        }
    }

    fn right_to_left(&self, nodes: &mut [SankeyNode], links: &[SankeyLink], columns: &mut [Vec<usize>]) {
        if columns.len() < 2 {
            return;
        }
        let last = columns.len() - 1;
        for column in columns[..last].iter_mut().rev() {
            for &source in column.iter() {
                let mut y = 0.0;
                let mut w = 0.0;
                for &li in &nodes[source].source_links {
                    let target = links[li].target;
                    let v = links[li].value * (nodes[target].layer as f64 - nodes[source].layer as f64);
                    y += source_top(nodes, links, self.py, source, target) * v;
                    w += v;
                }
                if !(w > 0.0) {
                    continue;
                }
                let dy = (y / w - nodes[source].y0) * self.alpha;
                nodes[source].y0 += dy;
                nodes[source].y1 += dy;
                reorder_node_links(nodes, links, source);
            }
            column.sort_by(|&a, &b| f64_cmp(nodes[a].y0, nodes[b].y0));
            self.resolve_collisions(nodes, column);
        }
    }

    fn resolve_collisions(&self, nodes: &mut [SankeyNode], column: &[usize]) {
        if column.is_empty() {
            return;
        }
        let i = column.len() >> 1;
        let subject = column[i];
        let (above, below) = (nodes[subject].y0 - self.py, nodes[subject].y1 + self.py);
        self.bottom_to_top(nodes, column, above, i as isize - 1);
        self.top_to_bottom(nodes, column, below, i as isize + 1);
        self.bottom_to_top(nodes, column, self.y1, column.len() as isize - 1);
        self.top_to_bottom(nodes, column, self.y0, 0);
    }

    // Push nodes down until they clear `y`.
    fn top_to_bottom(&self, nodes: &mut [SankeyNode], column: &[usize], mut y: f64, mut i: isize) {
        while i < column.len() as isize {
            let ni = column[i as usize];
            let dy = (y - nodes[ni].y0) * self.beta;
            if dy > 1e-6 {
                nodes[ni].y0 += dy;
                nodes[ni].y1 += dy;
            }
            y = nodes[ni].y1 + self.py;
            i += 1;
        }
    }

    // Push nodes up until they clear `y`.
    fn bottom_to_top(&self, nodes: &mut [SankeyNode], column: &[usize], mut y: f64, mut i: isize) {
        while i >= 0 {
            let ni = column[i as usize];
            let dy = (nodes[ni].y1 - y) * self.beta;
            if dy > 1e-6 {
                nodes[ni].y0 -= dy;
                nodes[ni].y1 -= dy;
            }
            y = nodes[ni].y0 - self.py;
            i -= 1;
        }
    }
}

fn compute_link_breadths(nodes: &[SankeyNode], links: &mut [SankeyLink]) {
    for node in nodes {
        let mut y0 = node.y0;
        let mut y1 = node.y0;
        for &li in &node.source_links {
            links[li].y0 = y0 + links[li].width / 2.0;
            y0 += links[li].width;
        }
        for &li in &node.target_links {
            links[li].y1 = y1 + links[li].width / 2.0;
            y1 += links[li].width;
        }
    }
}
