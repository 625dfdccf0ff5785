use std::{fmt, result};

use crate::rbt::Depth;

/// Statistic type, for [Index] type.
///
/// `blacks` and `depths` are computed only by [Index::validate], they are
/// `None` when stats are obtained via [Index::to_stats].
///
/// [Index]: crate::rbt::Index
/// [Index::validate]: crate::rbt::Index::validate
/// [Index::to_stats]: crate::rbt::Index::to_stats
#[derive(Clone, Debug)]
pub struct Stats {
    pub name: String,
    pub node_size: usize,
    pub n_count: usize,
    pub n_nodes: usize,
    pub height: Option<usize>,
    pub blacks: Option<usize>,
    pub depths: Option<Depth>,
}

impl Stats {
    pub(crate) fn new(name: &str) -> Stats {
        Stats {
            name: name.to_string(),
            node_size: Default::default(),
            n_count: Default::default(),
            n_nodes: Default::default(),
            height: None,
            blacks: None,
            depths: None,
        }
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        let none = "none".to_string();
        let h = self.height.as_ref().map_or(none.clone(), |x| x.to_string());
        let b = self.blacks.as_ref().map_or(none.clone(), |x| x.to_string());
        let d = self.depths.as_ref().map_or(none, |x| x.to_string());
        writeln!(f, "rbt.name = {}", self.name)?;
        writeln!(
            f,
            "rbt = {{ n_count={}, n_nodes={}, node_size={}, height={}, blacks={} }}",
            self.n_count, self.n_nodes, self.node_size, h, b,
        )?;
        writeln!(f, "rbt.depths = {}", d)
    }
}
