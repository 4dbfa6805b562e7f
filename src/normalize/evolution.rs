//! Evolution chain flattening.
//!
//! The upstream chain is a tree of `{species, evolution_details, evolves_to}`
//! nodes. It is parsed into [`EvolutionNode`] first and then walked once in
//! depth-first preorder.

use crate::normalize::fields::{list_field, named_resource, object};
use crate::types::{EvolutionStage, RawRecord};
use tracing::debug;

/// Typed view of one chain node
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionNode {
    pub species_name: String,
    pub species_url: String,
    pub evolution_details: Vec<RawRecord>,
    pub evolves_to: Vec<EvolutionNode>,
}

impl EvolutionNode {
    /// Returns `None` when the node carries no usable species link.
    /// Children without species are dropped along with their subtrees.
    pub fn parse(raw: &RawRecord) -> Option<Self> {
        let data = object(raw, "chain node").ok()?;
        let (species_name, species_url) = match named_resource(data, "species") {
            Ok(species) => species,
            Err(reason) => {
                debug!(%reason, "Dropping chain node without species");
                return None;
            }
        };

        let evolution_details = list_field(data, "evolution_details")
            .map(<[RawRecord]>::to_vec)
            .unwrap_or_default();
        let evolves_to = list_field(data, "evolves_to")
            .unwrap_or_default()
            .iter()
            .filter_map(EvolutionNode::parse)
            .collect();

        Some(Self {
            species_name,
            species_url,
            evolution_details,
            evolves_to,
        })
    }

    pub fn is_leaf(&self) -> bool {
        self.evolves_to.is_empty()
    }
}

/// Flattens a chain root into stages, parent before children, children in
/// source order. A root without species data yields an empty list.
pub fn flatten(chain_root: &RawRecord) -> Vec<EvolutionStage> {
    let mut stages = Vec::new();
    if let Some(root) = EvolutionNode::parse(chain_root) {
        walk(&root, 0, &mut stages);
    }
    stages
}

fn walk(node: &EvolutionNode, depth: usize, stages: &mut Vec<EvolutionStage>) {
    stages.push(EvolutionStage {
        species_name: node.species_name.clone(),
        species_url: node.species_url.clone(),
        trigger_details: node.evolution_details.clone(),
        position: stages.len(),
        depth,
    });
    for child in &node.evolves_to {
        walk(child, depth + 1, stages);
    }
}
