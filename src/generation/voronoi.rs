//! Voronoi dual of a Delaunay triangulation
//!
//! Circumcenters become Voronoi vertices and every interior Delaunay edge becomes
//! the Voronoi edge joining the circumcenters of its two triangles. Cells are
//! indexed like the Delaunay sites they surround.

use std::time::Instant;

use crate::cell::Cell;
use crate::error::Result;
use crate::generation::delaunay::{next_half_edge, triangle_of_half_edge, Delaunay, EMPTY};
use crate::graph::{CellId, Graph, VertexId};

/// Voronoi diagram: a graph of circumcenters plus one [`Cell`] per site
#[derive(Debug, Clone)]
pub struct Voronoi {
    graph: Graph,
    cells: Vec<Cell>,
}

impl Voronoi {
    /// Derive the dual of a triangulation
    ///
    /// Cells of boundary sites are unbounded: they keep their (open) sides but
    /// are marked `bounded = false` with an area of zero.
    ///
    /// # Errors
    ///
    /// Returns `DegenerateGeometry` when a triangle has no circumcenter.
    pub fn from_delaunay(delaunay: &Delaunay) -> Result<Self> {
        let start = Instant::now();
        let sites = delaunay.graph();

        let mut cells: Vec<Cell> = sites
            .vertices()
            .iter()
            .map(|v| {
                let neighbors = v.neighborhood.iter().map(|n| CellId(n.0)).collect();
                Cell::new(v.id, v.position, neighbors)
            })
            .collect();

        let mut graph = Graph::with_capacity(delaunay.triangles().len(), sites.edge_count());
        let mut corner_of: Vec<Option<VertexId>> = vec![None; delaunay.triangles().len()];
        let mut corner = |graph: &mut Graph, t: usize| -> Result<VertexId> {
            if let Some(id) = corner_of[t] {
                return Ok(id);
            }
            let id = graph.add_vertex(delaunay.triangles()[t].circumcenter(sites)?);
            corner_of[t] = Some(id);
            Ok(id)
        };

        let triangle_indices = delaunay.triangle_indices();
        for (e, &opposite) in delaunay.halfedges().iter().enumerate() {
            if opposite == EMPTY || e > opposite {
                continue;
            }

            let p = corner(&mut graph, triangle_of_half_edge(e))?;
            let q = corner(&mut graph, triangle_of_half_edge(opposite))?;
            // co-circular neighbours share a circumcenter
            let Some(edge) = graph.connect(p, q) else {
                continue;
            };

            for site in [triangle_indices[e], triangle_indices[next_half_edge(e)]] {
                let cell = &mut cells[site];
                cell.polygon.add_side(edge);
                let borders = &mut graph[edge].cells;
                if !borders.contains(&cell.id) {
                    borders.push(cell.id);
                }
            }
        }

        for cell in &mut cells {
            cell.polygon.set_vertices_from_sides(&graph);
            cell.polygon.order_counter_clockwise(&graph, cell.center);
            if delaunay.is_on_boundary(cell.site) {
                cell.bounded = false;
                cell.area = 0.0;
            } else {
                cell.area = cell.polygon.area(&graph);
            }
        }

        tracing::debug!(
            cells = cells.len(),
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            elapsed = ?start.elapsed(),
            "voronoi dual built"
        );

        Ok(Self { graph, cells })
    }

    /// The circumcenter graph
    #[inline]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id.0)
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Split borrow for stages that flag edges while updating cells
    pub fn parts_mut(&mut self) -> (&mut Graph, &mut [Cell]) {
        (&mut self.graph, &mut self.cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::PoissonSampler;
    use approx::assert_relative_eq;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn grid_with_jitter() -> Vec<Vec2> {
        // 5x5 lattice, nudged so no four points are co-circular
        let mut points = Vec::new();
        for row in 0..5 {
            for col in 0..5 {
                let jitter = ((row * 5 + col) as f32 * 0.37).sin() * 0.3;
                points.push(Vec2::new(col as f32 * 10.0 + jitter, row as f32 * 10.0 - jitter));
            }
        }
        points
    }

    #[test]
    fn test_one_cell_per_site() {
        let mut delaunay = Delaunay::from_points(&grid_with_jitter()).unwrap();
        let voronoi = delaunay.make_voronoi().unwrap();

        assert_eq!(voronoi.cell_count(), 25);
        for (i, cell) in voronoi.cells().iter().enumerate() {
            assert_eq!(cell.id, CellId(i));
            assert_eq!(delaunay.graph()[VertexId(i)].cell, Some(CellId(i)));
        }
    }

    #[test]
    fn test_interior_cells_are_closed_with_area() {
        let mut delaunay = Delaunay::from_points(&grid_with_jitter()).unwrap();
        let voronoi = delaunay.make_voronoi().unwrap();

        // the centre site of the lattice is interior
        let center = voronoi.cell(CellId(12)).unwrap();
        assert!(center.bounded);
        assert!(center.is_closed(voronoi.graph()));
        assert_relative_eq!(center.area, 100.0, max_relative = 0.15);

        for cell in voronoi.cells() {
            if !cell.bounded {
                assert_eq!(cell.area, 0.0);
                assert!(delaunay.is_on_boundary(cell.site));
            }
        }
    }

    #[test]
    fn test_neighbors_are_symmetric() {
        let points = PoissonSampler::new(4.0, 60.0, 60.0)
            .unwrap()
            .sample(&mut ChaCha8Rng::seed_from_u64(2));
        let mut delaunay = Delaunay::from_points(&points).unwrap();
        let voronoi = delaunay.make_voronoi().unwrap();

        for cell in voronoi.cells() {
            for &neighbor in &cell.neighbors {
                assert!(voronoi.cell(neighbor).unwrap().is_neighbor_of(cell.id));
            }
        }
    }

    #[test]
    fn test_edges_border_at_most_two_cells() {
        let points = PoissonSampler::new(4.0, 60.0, 60.0)
            .unwrap()
            .sample(&mut ChaCha8Rng::seed_from_u64(17));
        let mut delaunay = Delaunay::from_points(&points).unwrap();
        let voronoi = delaunay.make_voronoi().unwrap();

        for edge in voronoi.graph().edges() {
            assert!(!edge.cells.is_empty() && edge.cells.len() <= 2);
            for cell in &edge.cells {
                assert!(voronoi.cell(*cell).unwrap().polygon.contains_side(edge.id));
            }
        }
    }

    #[test]
    fn test_bounded_areas_sum_below_domain() {
        let points = PoissonSampler::new(4.0, 60.0, 60.0)
            .unwrap()
            .sample(&mut ChaCha8Rng::seed_from_u64(9));
        let mut delaunay = Delaunay::from_points(&points).unwrap();
        let voronoi = delaunay.make_voronoi().unwrap();

        let total: f64 = voronoi.cells().iter().map(|c| c.area).sum();
        assert!(total > 0.0);
        assert!(total < 60.0 * 60.0);
    }
}
