//! Headless force-directed layout for the note graph.
//!
//! # Responsibility
//! - Rebuild the graph from the activity list on every `update`.
//! - Step a velocity-Verlet simulation with link, repulsion, collision and
//!   centring forces.
//! - Support pinning nodes while dragged and re-centring on resize.
//!
//! # Invariants
//! - Positions and velocities are transient; nothing here is persisted.
//! - A pinned node sits exactly at its pin after every tick.

use super::builder::{build, Graph, NodeGroup};
use crate::model::note::NoteRecord;
use serde::Serialize;
use std::collections::HashMap;
use std::f64::consts::PI;

const NOTE_RADIUS: f64 = 8.0;
const CATEGORY_RADIUS: f64 = 12.0;
const INITIAL_RADIUS: f64 = 10.0;
const DRAG_ALPHA_TARGET: f64 = 0.3;
const RESIZE_ALPHA: f64 = 0.3;
// Deterministic nudge for coincident nodes.
const JIGGLE: f64 = 1e-6;

/// Force parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub link_distance: f64,
    /// Negative values repel.
    pub charge_strength: f64,
    pub collision_radius: f64,
    /// Fraction of velocity lost per tick.
    pub velocity_decay: f64,
    pub alpha_min: f64,
    pub alpha_decay: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let alpha_min = 0.001;
        Self {
            link_distance: 100.0,
            charge_strength: -200.0,
            collision_radius: 40.0,
            velocity_decay: 0.4,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
        }
    }
}

/// Laid-out node, ready for rendering or export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodePosition {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

#[derive(Debug, Clone)]
struct Body {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    pin: Option<(f64, f64)>,
}

struct Link {
    source: usize,
    target: usize,
    strength: f64,
    bias: f64,
}

/// Interactive simulation state for one graph view.
pub struct ForceLayout {
    config: LayoutConfig,
    width: f64,
    height: f64,
    graph: Graph,
    bodies: Vec<Body>,
    index: HashMap<String, usize>,
    links: Vec<Link>,
    alpha: f64,
    alpha_target: f64,
}

impl ForceLayout {
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_config(width, height, LayoutConfig::default())
    }

    pub fn with_config(width: f64, height: f64, config: LayoutConfig) -> Self {
        Self {
            config,
            width,
            height,
            graph: Graph::default(),
            bodies: Vec::new(),
            index: HashMap::new(),
            links: Vec::new(),
            alpha: 1.0,
            alpha_target: 0.0,
        }
    }

    /// Replaces the graph with one built from `records` and restarts the
    /// simulation from a fresh spiral seed.
    pub fn update(&mut self, records: &[NoteRecord]) {
        self.graph = build(records);
        self.index = self
            .graph
            .nodes
            .iter()
            .enumerate()
            .map(|(position, node)| (node.id.clone(), position))
            .collect();

        let (cx, cy) = self.center();
        let golden_angle = PI * (3.0 - 5f64.sqrt());
        self.bodies = (0..self.graph.nodes.len())
            .map(|i| {
                let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
                let angle = i as f64 * golden_angle;
                Body {
                    x: cx + radius * angle.cos(),
                    y: cy + radius * angle.sin(),
                    vx: 0.0,
                    vy: 0.0,
                    pin: None,
                }
            })
            .collect();

        let mut degree = vec![0usize; self.bodies.len()];
        let endpoints: Vec<(usize, usize)> = self
            .graph
            .edges
            .iter()
            .filter_map(|edge| {
                let source = *self.index.get(&edge.source)?;
                let target = *self.index.get(&edge.target)?;
                Some((source, target))
            })
            .collect();
        for &(source, target) in &endpoints {
            degree[source] += 1;
            degree[target] += 1;
        }
        self.links = endpoints
            .into_iter()
            .map(|(source, target)| Link {
                source,
                target,
                strength: 1.0 / degree[source].min(degree[target]) as f64,
                bias: degree[source] as f64 / (degree[source] + degree[target]) as f64,
            })
            .collect();

        self.alpha = 1.0;
        self.alpha_target = 0.0;
    }

    /// Advances the simulation by one step.
    pub fn tick(&mut self) {
        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
        self.apply_links();
        self.apply_charge();
        self.apply_collision();
        self.apply_center();

        let keep = 1.0 - self.config.velocity_decay;
        for body in &mut self.bodies {
            match body.pin {
                Some((x, y)) => {
                    body.x = x;
                    body.y = y;
                    body.vx = 0.0;
                    body.vy = 0.0;
                }
                None => {
                    body.vx *= keep;
                    body.vy *= keep;
                    body.x += body.vx;
                    body.y += body.vy;
                }
            }
        }
    }

    /// Ticks until the simulation cools below `alpha_min` or `max_ticks`
    /// is reached. Returns the number of ticks performed.
    pub fn run(&mut self, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while ticks < max_ticks && !self.is_settled() {
            self.tick();
            ticks += 1;
        }
        ticks
    }

    pub fn is_settled(&self) -> bool {
        self.alpha < self.config.alpha_min && self.alpha_target < self.config.alpha_min
    }

    /// Re-centres the layout on a new container size and reheats it.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.alpha = RESIZE_ALPHA;
    }

    /// Pins `id` at its current position. Returns `false` for unknown ids.
    pub fn drag_start(&mut self, id: &str) -> bool {
        let Some(body) = self.body_mut(id) else {
            return false;
        };
        body.pin = Some((body.x, body.y));
        self.alpha_target = DRAG_ALPHA_TARGET;
        true
    }

    /// Moves the pin of a dragged node.
    pub fn drag_to(&mut self, id: &str, x: f64, y: f64) -> bool {
        match self.body_mut(id) {
            Some(body) if body.pin.is_some() => {
                body.pin = Some((x, y));
                true
            }
            _ => false,
        }
    }

    /// Releases the pin and lets the simulation cool again.
    pub fn drag_end(&mut self, id: &str) -> bool {
        let Some(body) = self.body_mut(id) else {
            return false;
        };
        body.pin = None;
        self.alpha_target = 0.0;
        true
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn positions(&self) -> Vec<NodePosition> {
        self.graph
            .nodes
            .iter()
            .zip(&self.bodies)
            .map(|(node, body)| NodePosition {
                id: node.id.clone(),
                x: body.x,
                y: body.y,
                radius: match node.group {
                    NodeGroup::Category => CATEGORY_RADIUS,
                    NodeGroup::Note => NOTE_RADIUS,
                },
            })
            .collect()
    }

    pub fn position(&self, id: &str) -> Option<(f64, f64)> {
        let body = &self.bodies[*self.index.get(id)?];
        Some((body.x, body.y))
    }

    fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }

    fn body_mut(&mut self, id: &str) -> Option<&mut Body> {
        let position = *self.index.get(id)?;
        self.bodies.get_mut(position)
    }

    fn apply_links(&mut self) {
        for link in &self.links {
            let (source, target) = (&self.bodies[link.source], &self.bodies[link.target]);
            let mut dx = target.x + target.vx - source.x - source.vx;
            let mut dy = target.y + target.vy - source.y - source.vy;
            if dx == 0.0 && dy == 0.0 {
                dx = JIGGLE;
                dy = JIGGLE;
            }
            let distance = (dx * dx + dy * dy).sqrt();
            let pull = (distance - self.config.link_distance) / distance
                * self.alpha
                * link.strength;
            dx *= pull;
            dy *= pull;

            let target = &mut self.bodies[link.target];
            target.vx -= dx * link.bias;
            target.vy -= dy * link.bias;
            let source = &mut self.bodies[link.source];
            source.vx += dx * (1.0 - link.bias);
            source.vy += dy * (1.0 - link.bias);
        }
    }

    fn apply_charge(&mut self) {
        let strength = self.config.charge_strength * self.alpha;
        let count = self.bodies.len();
        for i in 0..count {
            let (mut ax, mut ay) = (0.0, 0.0);
            for j in (0..count).filter(|&j| j != i) {
                let mut dx = self.bodies[j].x - self.bodies[i].x;
                let mut dy = self.bodies[j].y - self.bodies[i].y;
                if dx == 0.0 && dy == 0.0 {
                    dx = JIGGLE * (j as f64 - i as f64);
                    dy = JIGGLE;
                }
                let distance_sq = (dx * dx + dy * dy).max(1.0);
                ax += dx * strength / distance_sq;
                ay += dy * strength / distance_sq;
            }
            self.bodies[i].vx += ax;
            self.bodies[i].vy += ay;
        }
    }

    fn apply_collision(&mut self) {
        let min_distance = self.config.collision_radius * 2.0;
        let count = self.bodies.len();
        for i in 0..count {
            for j in (i + 1)..count {
                let (a, b) = (&self.bodies[i], &self.bodies[j]);
                let mut dx = (b.x + b.vx) - (a.x + a.vx);
                let mut dy = (b.y + b.vy) - (a.y + a.vy);
                let mut distance_sq = dx * dx + dy * dy;
                if distance_sq >= min_distance * min_distance {
                    continue;
                }
                if distance_sq == 0.0 {
                    dx = JIGGLE;
                    dy = JIGGLE;
                    distance_sq = dx * dx + dy * dy;
                }
                let distance = distance_sq.sqrt();
                let push = (min_distance - distance) / distance * 0.5;
                dx *= push;
                dy *= push;
                self.bodies[i].vx -= dx * 0.5;
                self.bodies[i].vy -= dy * 0.5;
                self.bodies[j].vx += dx * 0.5;
                self.bodies[j].vy += dy * 0.5;
            }
        }
    }

    fn apply_center(&mut self) {
        if self.bodies.is_empty() {
            return;
        }
        let count = self.bodies.len() as f64;
        let (cx, cy) = self.center();
        let mean_x = self.bodies.iter().map(|b| b.x).sum::<f64>() / count;
        let mean_y = self.bodies.iter().map(|b| b.y).sum::<f64>() / count;
        for body in &mut self.bodies {
            body.x -= mean_x - cx;
            body.y -= mean_y - cy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ForceLayout, LayoutConfig, NodePosition};
    use crate::model::note::{NoteDraft, NoteRecord, NoteType};

    fn records() -> Vec<NoteRecord> {
        [("A", "X", "[[B]]"), ("B", "X", "b"), ("C", "Y", "[[A]]")]
            .into_iter()
            .map(|(title, category, content)| {
                let draft = NoteDraft::new(NoteType::Text, content)
                    .with_title(title)
                    .with_category(category);
                NoteRecord::from_draft(&draft, "k").expect("valid draft")
            })
            .collect()
    }

    fn mean(positions: &[NodePosition]) -> (f64, f64) {
        let n = positions.len() as f64;
        (
            positions.iter().map(|p| p.x).sum::<f64>() / n,
            positions.iter().map(|p| p.y).sum::<f64>() / n,
        )
    }

    #[test]
    fn settles_around_the_center_without_overlap() {
        let mut layout = ForceLayout::new(800.0, 600.0);
        layout.update(&records());
        let ticks = layout.run(1_000);
        assert!(ticks < 1_000, "simulation should cool down");
        assert!(layout.is_settled());

        let positions = layout.positions();
        assert_eq!(positions.len(), 5);
        assert!(positions.iter().all(|p| p.x.is_finite() && p.y.is_finite()));

        let (mx, my) = mean(&positions);
        assert!((mx - 400.0).abs() < 10.0);
        assert!((my - 300.0).abs() < 10.0);

        for (i, a) in positions.iter().enumerate() {
            for b in &positions[i + 1..] {
                let distance = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
                assert!(distance > 20.0, "{} and {} overlap", a.id, b.id);
            }
        }
    }

    #[test]
    fn dragged_node_stays_pinned_until_released() {
        let mut layout = ForceLayout::new(800.0, 600.0);
        layout.update(&records());
        layout.run(50);

        assert!(layout.drag_start("note-0"));
        assert!(layout.drag_to("note-0", 10.0, 20.0));
        for _ in 0..30 {
            layout.tick();
        }
        assert_eq!(layout.position("note-0"), Some((10.0, 20.0)));
        assert!(!layout.is_settled());

        assert!(layout.drag_end("note-0"));
        layout.tick();
        assert_ne!(layout.position("note-0"), Some((10.0, 20.0)));
    }

    #[test]
    fn unknown_nodes_cannot_be_dragged() {
        let mut layout = ForceLayout::new(100.0, 100.0);
        layout.update(&records());
        assert!(!layout.drag_start("note-99"));
        assert!(!layout.drag_to("note-1", 1.0, 1.0));
    }

    #[test]
    fn resize_moves_the_center_force() {
        let mut layout = ForceLayout::new(800.0, 600.0);
        layout.update(&records());
        layout.run(1_000);

        layout.resize(200.0, 100.0);
        assert!(!layout.is_settled());
        layout.run(1_000);
        let (mx, my) = mean(&layout.positions());
        assert!((mx - 100.0).abs() < 10.0);
        assert!((my - 50.0).abs() < 10.0);
    }

    #[test]
    fn category_hubs_are_larger() {
        let mut layout = ForceLayout::new(100.0, 100.0);
        layout.update(&records());
        let positions = layout.positions();
        let hub = positions.iter().find(|p| p.id == "cat-X").expect("hub");
        let note = positions.iter().find(|p| p.id == "note-0").expect("note");
        assert!(hub.radius > note.radius);
    }

    #[test]
    fn higher_alpha_min_cools_down_sooner() {
        let mut default_layout = ForceLayout::new(800.0, 600.0);
        default_layout.update(&records());
        let default_ticks = default_layout.run(1_000);

        let config = LayoutConfig {
            alpha_min: 0.1,
            ..LayoutConfig::default()
        };
        let mut quick = ForceLayout::with_config(800.0, 600.0, config);
        quick.update(&records());
        let quick_ticks = quick.run(1_000);

        assert!(quick.is_settled());
        assert!(quick_ticks < default_ticks);
    }
}
