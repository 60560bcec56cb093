/// Core value types shared by all path finders
///
/// This module defines:
/// - Path: node sequence, edge sequence and total cost of a shortest path
/// - GeoCoords / Vda5050Position: node positions with distance helpers

pub mod path;
pub mod position;

pub use path::{path_from_node_list, Path, PathError};
pub use position::{GeoCoords, Vda5050Position, EARTH_RADIUS_M};
