//! Page nesting of seam-allowance shapes.
//!
//! Shapes are placed largest first. The first shape on a fresh page is
//! aligned with the printable area's minimum corner; every later shape is
//! tried at eight rotations against each page in creation order, with
//! candidate translations taken where the no-fit boundary of the pieces
//! already on the page crosses the page's inner-fit region. The candidate
//! keeping the page's convex hull smallest wins.

use crate::geometry::Polygon2D;
use crate::nfp::{clip_segment_to_convex, inner_fit_polygon, no_fit_polygon, NfpCache, NfpKey};
use crate::offset::{offset_convex, JoinStyle};
use crate::overlay::{intersection_area, union_boundary_rings};
use crate::spatial_index::SpatialIndex2D;
use fpp_core::transform::{Transform2D, AABB2D};
use fpp_core::{Config, Error, LayoutResult, Page, Placement, Result};
use std::time::Instant;

/// Canonical rotations tried for the first shape on a fresh page.
const FIRST_ROTATIONS: [f64; 4] = [0.0, 90.0, 45.0, 135.0];

/// Rotations tried for every later shape.
const NEXT_ROTATIONS: [f64; 8] = [0.0, 45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0];

/// Overlap below this fraction of the smaller area counts as touching.
const OVERLAP_RATIO: f64 = 1e-6;

/// A shape after pre-rotation, ready to be placed.
#[derive(Debug, Clone)]
struct PreparedShape {
    group_index: usize,
    /// Rigid transform from the source ring to the pre-rotated pose.
    pre_transform: Transform2D,
    /// Pre-rotated shape grown by half the inter-piece spacing.
    footprint: Polygon2D,
    area: f64,
}

/// A footprint fixed on a page.
#[derive(Debug, Clone)]
struct PlacedPiece {
    shape: usize,
    rotation_deg: f64,
    translation: (f64, f64),
    /// Footprint rotated about the origin, before translation.
    base: Polygon2D,
    /// Footprint in page coordinates.
    placed: Polygon2D,
}

#[derive(Debug, Default)]
struct PageState {
    pieces: Vec<PlacedPiece>,
    index: SpatialIndex2D,
}

impl PageState {
    fn push(&mut self, piece: PlacedPiece) {
        self.index.insert(self.pieces.len(), piece.placed.aabb());
        self.pieces.push(piece);
    }
}

/// A candidate pose for one shape.
#[derive(Debug, Clone)]
struct Candidate {
    rotation_deg: f64,
    translation: (f64, f64),
    base: Polygon2D,
    placed: Polygon2D,
    score: f64,
}

/// Greedy NFP page nester.
#[derive(Debug)]
pub struct PageNester {
    config: Config,
    nfp_cache: NfpCache,
}

impl PageNester {
    /// Creates a nester with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            nfp_cache: NfpCache::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Places every shape on as many pages as needed.
    ///
    /// `shapes[i]` is the seam-allowance shape of group `i`. Fails with
    /// [`Error::UnplaceablePieces`] listing every group that does not fit
    /// on an empty page; nothing is returned for a failed pass.
    pub fn nest(&mut self, shapes: &[Polygon2D]) -> Result<LayoutResult> {
        self.config.validate()?;
        let start = Instant::now();
        // Keys index into this call's shape order.
        self.nfp_cache.clear();

        let printable = self.config.printable_area();
        let fit_area = AABB2D::new(
            printable.min_x - self.config.fit_tolerance,
            printable.min_y - self.config.fit_tolerance,
            printable.max_x + self.config.fit_tolerance,
            printable.max_y + self.config.fit_tolerance,
        );

        let mut prepared = shapes
            .iter()
            .enumerate()
            .map(|(i, s)| self.prepare(i, s))
            .collect::<Result<Vec<_>>>()?;
        // Stable: equal areas keep group order.
        prepared.sort_by(|a, b| b.area.total_cmp(&a.area));

        let mut pages: Vec<PageState> = Vec::new();
        let mut unplaceable = Vec::new();

        for (order, shape) in prepared.iter().enumerate() {
            let mut placed_on = None;
            for (page_index, page) in pages.iter().enumerate() {
                if let Some(candidate) = self.place_next(order, shape, page, &fit_area)? {
                    placed_on = Some((page_index, candidate));
                    break;
                }
            }

            let (page_index, candidate) = match placed_on {
                Some(found) => found,
                None => match self.place_first(shape, &printable, &fit_area) {
                    Some(candidate) => {
                        pages.push(PageState::default());
                        (pages.len() - 1, candidate)
                    }
                    None => {
                        log::warn!("group {} does not fit on an empty page", shape.group_index);
                        unplaceable.push(shape.group_index);
                        continue;
                    }
                },
            };

            log::debug!(
                "group {} -> page {page_index} at ({:.3}, {:.3}), {}°",
                shape.group_index,
                candidate.translation.0,
                candidate.translation.1,
                candidate.rotation_deg
            );
            pages[page_index].push(PlacedPiece {
                shape: order,
                rotation_deg: candidate.rotation_deg,
                translation: candidate.translation,
                base: candidate.base,
                placed: candidate.placed,
            });
        }

        if !unplaceable.is_empty() {
            return Err(Error::UnplaceablePieces { groups: unplaceable });
        }

        let mut result = LayoutResult::new();
        result.pages = pages
            .iter()
            .map(|page| Page {
                placements: page
                    .pieces
                    .iter()
                    .map(|piece| {
                        let shape = &prepared[piece.shape];
                        let transform = shape
                            .pre_transform
                            .then(&Transform2D::rotation(piece.rotation_deg.to_radians()))
                            .then(&Transform2D::translation(piece.translation.0, piece.translation.1));
                        Placement::from_transform(
                            shape.group_index,
                            shapes[shape.group_index].vertices(),
                            &transform,
                        )
                    })
                    .collect(),
            })
            .collect();

        let placed_area: f64 = shapes.iter().map(Polygon2D::area).sum();
        let page_area = printable.area() * result.pages.len() as f64;
        result.utilization = if page_area > 0.0 { placed_area / page_area } else { 0.0 };
        result.computation_time_ms = start.elapsed().as_millis() as u64;

        let (hits, misses) = self.nfp_cache.stats();
        log::info!(
            "nested {} shapes on {} pages, utilization {} ({} NFP cache hits, {} misses)",
            shapes.len(),
            result.page_count(),
            result.utilization_percent(),
            hits,
            misses
        );
        Ok(result)
    }

    /// Pre-rotates a shape to its smallest bounding box and grows it by
    /// half the spacing.
    fn prepare(&self, group_index: usize, shape: &Polygon2D) -> Result<PreparedShape> {
        let pivot = shape.centroid();
        let mut best_angle = 0.0;
        let mut best_area = shape.aabb().area();

        if self.config.allow_rotation {
            let step = self.config.rotation_step_deg;
            let mut angle = step;
            while angle < 180.0 - 1e-9 {
                let area = shape.rotated_about(angle.to_radians(), pivot).aabb().area();
                if area < best_area - 1e-9 * best_area.max(1.0) {
                    best_area = area;
                    best_angle = angle;
                }
                angle += step;
            }
        }

        let pre_transform = Transform2D::rotation_about(f64::to_radians(best_angle), pivot);
        let rotated = shape.transformed(&pre_transform);
        let join = JoinStyle::Mitre {
            limit: self.config.mitre_limit,
        };
        let footprint = offset_convex(&rotated.convex_hull(), self.config.spacing_units() / 2.0, join)?;

        log::trace!("group {group_index}: pre-rotation {best_angle}°, bbox area {best_area:.3}");
        Ok(PreparedShape {
            group_index,
            pre_transform,
            footprint,
            area: shape.area(),
        })
    }

    fn rotations<'a>(&self, all: &'a [f64]) -> &'a [f64] {
        if self.config.allow_rotation {
            all
        } else {
            &all[..1]
        }
    }

    /// First shape on an empty page: the first canonical rotation whose
    /// bounding box, aligned to the printable origin, stays inside.
    fn place_first(&self, shape: &PreparedShape, printable: &AABB2D, fit_area: &AABB2D) -> Option<Candidate> {
        self.rotations(&FIRST_ROTATIONS).iter().find_map(|&deg| {
            let base = shape.footprint.transformed(&Transform2D::rotation(deg.to_radians()));
            let bb = base.aabb();
            let translation = (printable.min_x - bb.min_x, printable.min_y - bb.min_y);
            let placed = base.translated(translation.0, translation.1);

            fit_area.contains(&placed.aabb()).then(|| Candidate {
                rotation_deg: deg,
                translation,
                base,
                placed,
                score: 0.0,
            })
        })
    }

    /// Best NFP-derived pose for `shape` on a page that already holds pieces.
    fn place_next(
        &mut self,
        order: usize,
        shape: &PreparedShape,
        page: &PageState,
        fit_area: &AABB2D,
    ) -> Result<Option<Candidate>> {
        let mut best: Option<Candidate> = None;
        let existing: Vec<(f64, f64)> = page
            .pieces
            .iter()
            .flat_map(|p| p.placed.vertices().iter().copied())
            .collect();

        for &deg in self.rotations(&NEXT_ROTATIONS) {
            let base = shape.footprint.transformed(&Transform2D::rotation(deg.to_radians()));

            let Some(ifp) = inner_fit_polygon(fit_area, &base)? else {
                continue;
            };

            let mut parts = Vec::new();
            for piece in &page.pieces {
                let key = NfpKey::new(piece.shape, piece.rotation_deg, order, deg);
                let stationary = &piece.base;
                let nfp = self
                    .nfp_cache
                    .get_or_compute(key, || no_fit_polygon(stationary, &base))?;
                parts.extend(
                    nfp.parts()
                        .iter()
                        .map(|p| p.translated(piece.translation.0, piece.translation.1)),
                );
            }
            // Hole rings bound pockets enclosed by the placed pieces.
            for ring in union_boundary_rings(&parts) {
                let edges = ring.iter().copied().zip(ring.iter().copied().cycle().skip(1));
                for (a, b) in edges {
                    let Some((s, e)) = clip_segment_to_convex(a, b, &ifp) else {
                        continue;
                    };
                    for t in [s, e] {
                        let placed = base.translated(t.0, t.1);
                        if !is_valid(&placed, page, fit_area) {
                            continue;
                        }
                        let score = hull_area(&existing, &placed);
                        if best.as_ref().map_or(true, |b| score < b.score) {
                            best = Some(Candidate {
                                rotation_deg: deg,
                                translation: t,
                                base: base.clone(),
                                placed,
                                score,
                            });
                        }
                    }
                }
            }
        }

        Ok(best)
    }
}

/// Inside the page and not overlapping any placed footprint.
fn is_valid(placed: &Polygon2D, page: &PageState, fit_area: &AABB2D) -> bool {
    let bb = placed.aabb();
    if !fit_area.contains(&bb) {
        return false;
    }
    let area = placed.area();
    page.index.query_aabb(&bb).into_iter().all(|j| {
        let other = &page.pieces[j].placed;
        intersection_area(placed, other) <= OVERLAP_RATIO * area.min(other.area())
    })
}

fn hull_area(existing: &[(f64, f64)], placed: &Polygon2D) -> f64 {
    let mut points = existing.to_vec();
    points.extend_from_slice(placed.vertices());
    Polygon2D::hull_of_points(&points).map_or(f64::INFINITY, |h| h.area())
}
