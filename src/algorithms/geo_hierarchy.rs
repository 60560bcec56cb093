/// Geo-hierarchy adapter over the Geo-Hierarchy Form

use super::{AlgorithmResult, PathFinder};
use crate::engine::{CoordinateRoutingEngine, GeoArc, GeoRouter, GeoRoutingEngine, Route};
use crate::formats::GeoHierarchyForm;
use crate::types::{GeoCoords, Path};
use tracing::debug;

/// Radius in meters within which a node matches a query coordinate
pub const DEFAULT_MATCHING_RADIUS_M: f64 = 100.0;

/// Routes between coordinates; the search always optimizes travel time
///
/// Path nodes are the route geometry, edges are the route arcs. Cost is the
/// duration in seconds, or the distance in meters when `return_time_cost` is off.
pub struct GeoHierarchy<'a, G = CoordinateRoutingEngine> {
    form: &'a GeoHierarchyForm,
    engine: G,
    matching_radius_m: f64,
    return_time_cost: bool,
}

impl<'a> GeoHierarchy<'a, CoordinateRoutingEngine> {
    pub fn new(form: &'a GeoHierarchyForm) -> Self {
        Self::with_engine(form, CoordinateRoutingEngine::new())
    }
}

impl<'a, G> GeoHierarchy<'a, G>
where
    G: GeoRoutingEngine,
{
    pub fn with_engine(form: &'a GeoHierarchyForm, engine: G) -> Self {
        Self {
            form,
            engine,
            matching_radius_m: DEFAULT_MATCHING_RADIUS_M,
            return_time_cost: true,
        }
    }

    pub fn with_matching_radius(mut self, radius_m: f64) -> Self {
        self.matching_radius_m = radius_m;
        self
    }

    /// Report duration (`true`) or distance (`false`) as the path cost
    pub fn with_time_cost(mut self, return_time_cost: bool) -> Self {
        self.return_time_cost = return_time_cost;
        self
    }

    fn route_to_path(&self, route: Route, origin: GeoCoords) -> AlgorithmResult<Path<GeoCoords, GeoArc>> {
        let cost = if self.return_time_cost {
            route.duration
        } else {
            route.distance
        };

        // the last point of each arc is the first point of the next one
        let mut nodes = Vec::new();
        for arc in &route.arcs {
            if let Some((_, body)) = arc.geometry.split_last() {
                nodes.extend_from_slice(body);
            }
        }
        match route.arcs.last().and_then(|arc| arc.geometry.last()) {
            Some(end) => nodes.push(*end),
            None => nodes.push(origin),
        }

        Ok(Path::from_polyline(nodes, route.arcs, cost)?)
    }
}

impl<'a, G> PathFinder for GeoHierarchy<'a, G>
where
    G: GeoRoutingEngine,
{
    type Node = GeoCoords;
    type Edge = GeoArc;

    fn find_shortest_path(
        &self,
        source: &GeoCoords,
        destination: &GeoCoords,
    ) -> AlgorithmResult<Option<Path<GeoCoords, GeoArc>>> {
        let router = self.engine.open(
            self.form.graph_file(),
            self.form.hierarchy_file(),
            self.matching_radius_m,
        )?;

        let Some(route) = router.route(*source, *destination)? else {
            debug!(%source, %destination, "No route");
            return Ok(None);
        };

        Ok(Some(self.route_to_path(route, *source)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineResult;
    use std::path::Path as FsPath;

    /// Engine returning a fixed route, ignoring the files
    struct FixedRoute(Option<Route>);

    struct FixedRouter(Option<Route>);

    impl GeoRouter for FixedRouter {
        fn route(&self, _: GeoCoords, _: GeoCoords) -> EngineResult<Option<Route>> {
            Ok(self.0.clone())
        }
    }

    impl GeoRoutingEngine for FixedRoute {
        type Router = FixedRouter;

        fn open(&self, _: &FsPath, _: &FsPath, _: f64) -> EngineResult<FixedRouter> {
            Ok(FixedRouter(self.0.clone()))
        }
    }

    fn p(lat: f64) -> GeoCoords {
        GeoCoords::new(lat, 8.0)
    }

    fn arc(points: &[f64], way_id: u64) -> GeoArc {
        GeoArc {
            way_id,
            start_node_id: 0,
            end_node_id: 1,
            geometry: points.iter().map(|&lat| p(lat)).collect(),
            distance: 100.0,
            duration: 10.0,
        }
    }

    fn route() -> Route {
        Route {
            arcs: vec![arc(&[1.0, 1.5, 2.0], 1), arc(&[2.0, 3.0], 2)],
            duration: 20.0,
            distance: 200.0,
        }
    }

    #[test]
    fn test_geometry_concatenation() {
        let form = GeoHierarchyForm::new("g.bin", "g.ch");
        let finder = GeoHierarchy::with_engine(&form, FixedRoute(Some(route())));

        let path = finder.find_shortest_path(&p(1.0), &p(3.0)).unwrap().unwrap();
        assert_eq!(path.nodes, vec![p(1.0), p(1.5), p(2.0), p(3.0)]);
        assert_eq!(path.edges.len(), 2);
        assert_eq!(path.cost, 20.0);
    }

    #[test]
    fn test_distance_cost() {
        let form = GeoHierarchyForm::new("g.bin", "g.ch");
        let finder = GeoHierarchy::with_engine(&form, FixedRoute(Some(route()))).with_time_cost(false);
        let path = finder.find_shortest_path(&p(1.0), &p(3.0)).unwrap().unwrap();
        assert_eq!(path.cost, 200.0);
    }

    #[test]
    fn test_unreachable_and_empty_routes() {
        let form = GeoHierarchyForm::new("g.bin", "g.ch");
        let finder = GeoHierarchy::with_engine(&form, FixedRoute(None));
        assert!(finder.find_shortest_path(&p(1.0), &p(3.0)).unwrap().is_none());

        let empty = Route {
            arcs: vec![],
            duration: 0.0,
            distance: 0.0,
        };
        let finder = GeoHierarchy::with_engine(&form, FixedRoute(Some(empty)));
        let path = finder.find_shortest_path(&p(1.0), &p(1.0)).unwrap().unwrap();
        assert_eq!(path, Path::single(p(1.0)));
    }

    #[test]
    fn test_missing_files_propagate_engine_error() {
        let form = GeoHierarchyForm::new("/nonexistent/g.bin", "/nonexistent/g.ch");
        let result = GeoHierarchy::new(&form).find_shortest_path(&p(1.0), &p(2.0));
        assert!(matches!(result, Err(crate::algorithms::AlgorithmError::Engine(_))));
    }
}
