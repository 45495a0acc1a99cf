//! Research projects and the per-faction tech tree.
//!
//! Projects are derived from a faction's ship roster: one project per ship
//! of tier 1 or higher. The dependency structure is stored as an explicit
//! graph even though the derived trees are currently a single chain, so a
//! reordered roster cannot silently break prerequisite checks.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use super::faction_data::FactionData;
use super::ship_data::ShipCategory;
use crate::config::ResearchConfig;
use crate::error::{GameError, Result};

/// Up-front cost of starting a research project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResearchCost {
    /// Credits required.
    pub credits: u64,
    /// Fuel required.
    pub fuel: u64,
}

/// A research project unlocking one ship design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchProject {
    /// Unique identifier (`research_<ship id>`).
    pub id: String,
    /// Display name (the unlocked ship's name).
    pub name: String,
    /// Short description.
    pub description: String,
    /// Ship design this project unlocks.
    pub ship_id: String,
    /// Category of the unlocked ship.
    pub category: ShipCategory,
    /// Cost paid when the project starts.
    pub cost: ResearchCost,
    /// Progress needed to complete.
    pub research_time: u32,
    /// Minimum research lab level on at least one owned planet.
    pub required_lab: u32,
    /// Projects that must be completed first.
    pub prerequisites: Vec<String>,
}

/// Research project identifier for a ship design.
#[must_use]
pub fn project_id_for_ship(ship_id: &str) -> String {
    format!("research_{ship_id}")
}

/// Directed prerequisite graph of research projects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechTree {
    projects: Vec<ResearchProject>,
    index: BTreeMap<String, usize>,
}

impl TechTree {
    /// Derive the tech tree for a faction's roster.
    ///
    /// Projects are ordered by (category, roster order); each depends on its
    /// immediate predecessor in that ordering.
    #[must_use]
    pub fn for_faction(faction: &FactionData, config: &ResearchConfig) -> Self {
        let mut projects = Vec::new();
        let mut previous: Option<String> = None;

        for (index, (category, ship)) in faction
            .ships()
            .filter(|(_, ship)| !ship.is_starter())
            .enumerate()
        {
            let index = index as u32;
            let id = project_id_for_ship(&ship.id);
            projects.push(ResearchProject {
                id: id.clone(),
                name: ship.name.clone(),
                description: format!("Unlock the {} {}", ship.name, category.label()),
                ship_id: ship.id.clone(),
                category,
                cost: ResearchCost {
                    credits: (ship.cost.credits as f64 * config.credit_cost_factor).floor() as u64,
                    fuel: (ship.cost.metal as f64 * config.fuel_cost_factor).floor() as u64,
                },
                research_time: config.time_base + index * config.time_step,
                required_lab: (index / config.projects_per_lab_level.max(1) + 1)
                    .min(config.max_required_lab),
                prerequisites: previous.take().into_iter().collect(),
            });
            previous = Some(id);
        }

        let index = projects
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.clone(), i))
            .collect();
        Self { projects, index }
    }

    /// Build a tree from explicit projects, validating the graph.
    ///
    /// Fails on duplicate ids, unknown prerequisites or cycles.
    pub fn from_projects(projects: Vec<ResearchProject>) -> Result<Self> {
        let mut index = BTreeMap::new();
        for (i, project) in projects.iter().enumerate() {
            if index.insert(project.id.clone(), i).is_some() {
                return Err(invalid_tree(format!("duplicate project '{}'", project.id)));
            }
        }

        let tree = Self { projects, index };
        for project in &tree.projects {
            for prereq in &project.prerequisites {
                if !tree.index.contains_key(prereq) {
                    return Err(invalid_tree(format!(
                        "project '{}' has unknown prerequisite '{prereq}'",
                        project.id
                    )));
                }
            }
        }

        if tree.topological_order().len() != tree.projects.len() {
            return Err(invalid_tree("prerequisite cycle".to_string()));
        }
        Ok(tree)
    }

    /// Look up a project by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ResearchProject> {
        self.index.get(id).map(|&i| &self.projects[i])
    }

    /// All projects in derivation order.
    pub fn projects(&self) -> impl Iterator<Item = &ResearchProject> {
        self.projects.iter()
    }

    /// Number of projects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    /// Whether the tree has no projects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// The project that unlocks a ship, if any.
    #[must_use]
    pub fn project_for_ship(&self, ship_id: &str) -> Option<&ResearchProject> {
        self.get(&project_id_for_ship(ship_id))
    }

    /// Whether every prerequisite of `id` is in `completed`.
    #[must_use]
    pub fn prerequisites_met(&self, id: &str, completed: &BTreeSet<String>) -> bool {
        self.get(id).is_some_and(|project| {
            project
                .prerequisites
                .iter()
                .all(|prereq| completed.contains(prereq))
        })
    }

    /// Projects that could be started now, ignoring lab and cost checks.
    pub fn available<'a>(
        &'a self,
        completed: &'a BTreeSet<String>,
    ) -> impl Iterator<Item = &'a ResearchProject> + 'a {
        self.projects.iter().filter(move |p| {
            !completed.contains(&p.id) && p.prerequisites.iter().all(|q| completed.contains(q))
        })
    }

    /// Project ids in dependency order (Kahn's algorithm).
    ///
    /// Shorter than the project list if the graph has a cycle.
    #[must_use]
    pub fn topological_order(&self) -> Vec<&str> {
        let mut in_degree: Vec<usize> = self
            .projects
            .iter()
            .map(|p| p.prerequisites.len())
            .collect();
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.projects.len()];
        for (i, project) in self.projects.iter().enumerate() {
            for prereq in &project.prerequisites {
                if let Some(&p) = self.index.get(prereq) {
                    dependents[p].push(i);
                }
            }
        }

        let mut queue: VecDeque<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &d)| d == 0)
            .map(|(i, _)| i)
            .collect();
        let mut order = Vec::with_capacity(self.projects.len());
        while let Some(i) = queue.pop_front() {
            order.push(self.projects[i].id.as_str());
            for &next in &dependents[i] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    queue.push_back(next);
                }
            }
        }
        order
    }
}

fn invalid_tree(message: String) -> GameError {
    GameError::DataParseError {
        what: "tech tree".to_string(),
        message,
    }
}
