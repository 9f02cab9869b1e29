//! Plain-text road map format.
//!
//! Format:
//! ```text
//! x1,y1,type1        node table, one node per line
//! x2,y2,type2
//! -,-                sentinel
//! 1,2                1-based node index pairs, smaller index first
//! ```
//!
//! Blank lines and surrounding whitespace are ignored. Duplicate edges and
//! self-loops are dropped on load.

use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use thiserror::Error;

use crate::core::WorldPoint;
use crate::graph::{NodeType, RoadMap};

/// Line separating nodes from edges.
const SENTINEL: &str = "-,-";

/// Errors reading or writing a road map file.
#[derive(Error, Debug)]
pub enum RoadMapError {
    /// File could not be read or written.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Line does not have the expected fields.
    #[error("Parse error on line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What was wrong.
        message: String,
    },

    /// Edge references a node that does not exist.
    #[error("Invalid node index {index} on line {line}")]
    InvalidIndex {
        /// 1-based line number.
        line: usize,
        /// 1-based index found.
        index: usize,
    },

    /// No `-,-` line separating nodes from edges.
    #[error("Missing '-,-' separator between nodes and edges")]
    MissingSentinel,

    /// Node type tag is not one of the persisted tags.
    #[error("Unknown node type '{tag}' on line {line}")]
    UnknownNodeType {
        /// 1-based line number.
        line: usize,
        /// Tag found.
        tag: String,
    },
}

/// Save a road map to a file.
pub fn save_road_map(map: &RoadMap, path: &Path) -> Result<(), RoadMapError> {
    let mut file = std::fs::File::create(path)?;
    write_road_map(map, &mut file)
}

/// Write a road map in text format.
pub fn write_road_map<W: Write>(map: &RoadMap, writer: &mut W) -> Result<(), RoadMapError> {
    for node in &map.nodes {
        writeln!(writer, "{},{},{}", node.position.x, node.position.y, node.node_type.tag())?;
    }
    writeln!(writer, "{}", SENTINEL)?;
    for &(a, b) in &map.edges {
        writeln!(writer, "{},{}", a.min(b) + 1, a.max(b) + 1)?;
    }
    Ok(())
}

/// Load a road map from a file.
pub fn load_road_map(path: &Path) -> Result<RoadMap, RoadMapError> {
    let file = std::fs::File::open(path)?;
    read_road_map(BufReader::new(file))
}

/// Parse a road map from a string.
pub fn parse_road_map(text: &str) -> Result<RoadMap, RoadMapError> {
    read_road_map(text.as_bytes())
}

/// Read a road map in text format.
pub fn read_road_map<R: BufRead>(reader: R) -> Result<RoadMap, RoadMapError> {
    let mut map = RoadMap::new();
    let mut in_edges = false;

    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == SENTINEL {
            in_edges = true;
            continue;
        }

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if in_edges {
            let [a, b] = fields[..] else {
                return Err(parse_error(line_no, "expected 'i,j'"));
            };
            let a = parse_index(a, line_no, map.node_count())?;
            let b = parse_index(b, line_no, map.node_count())?;
            map.push_edge(a, b);
        } else {
            let [x, y, tag] = fields[..] else {
                return Err(parse_error(line_no, "expected 'x,y,type'"));
            };
            let node_type = NodeType::from_tag(tag).ok_or_else(|| RoadMapError::UnknownNodeType {
                line: line_no,
                tag: tag.to_string(),
            })?;
            let position = WorldPoint::new(parse_coord(x, line_no)?, parse_coord(y, line_no)?);
            map.push_node(position, node_type);
        }
    }

    if !in_edges {
        return Err(RoadMapError::MissingSentinel);
    }
    Ok(map)
}

fn parse_error(line: usize, message: &str) -> RoadMapError {
    RoadMapError::Parse {
        line,
        message: message.to_string(),
    }
}

fn parse_coord(field: &str, line: usize) -> Result<f32, RoadMapError> {
    field
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| parse_error(line, &format!("invalid coordinate '{}'", field)))
}

/// 1-based index to 0-based, checked against the node count.
fn parse_index(field: &str, line: usize, node_count: usize) -> Result<usize, RoadMapError> {
    let index: usize = field
        .parse()
        .map_err(|_| parse_error(line, &format!("invalid index '{}'", field)))?;
    if index == 0 || index > node_count {
        return Err(RoadMapError::InvalidIndex { line, index });
    }
    Ok(index - 1)
}
