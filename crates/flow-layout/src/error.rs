#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("link {link} references missing node {node} (graph has {node_count} nodes)")]
    MissingNode {
        link: usize,
        node: usize,
        node_count: usize,
    },
    #[error("link {link} has a non-finite value")]
    NonFiniteValue { link: usize },
    #[error("circular link")]
    CircularLink,
}

pub type Result<T> = std::result::Result<T, LayoutError>;
