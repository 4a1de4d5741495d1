//! Route tree: slotmap-backed path resolver with a cursor.

pub mod node;
pub mod tree;

pub use node::{RouteNode, RouteNodeId};
pub use tree::RouteTree;
