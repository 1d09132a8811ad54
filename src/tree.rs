//! Recipe expansion into a resource tree
//!
//! Craftable materials named in the expansion set are replaced by their
//! recipe ingredients, recursively. Everything else stays a leaf.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::aggregate::RawResources;
use crate::catalog::{name_key, Catalog};
use crate::config::DEFAULT_MAX_RECIPE_DEPTH;
use crate::error::CalcError;
use crate::models::Rarity;

/// Material names the user chose to break down into their ingredients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpansionSet(BTreeSet<String>);

impl ExpansionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expand(&mut self, name: &str) {
        self.0.insert(name.to_string());
    }

    pub fn collapse(&mut self, name: &str) {
        self.0.remove(name);
    }

    /// Flip a node's state; returns whether it is now expanded.
    pub fn toggle(&mut self, name: &str) -> bool {
        if self.0.remove(name) {
            false
        } else {
            self.0.insert(name.to_string());
            true
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ExpansionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceNode {
    pub name: String,
    pub quantity: u64,
    pub rarity: Option<Rarity>,
    pub image: Option<String>,
    pub can_craft: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ResourceNode>,
}

impl ResourceNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// The same subtree with every quantity multiplied by `factor`,
    /// saturating at `u64::MAX`.
    pub fn scaled(&self, factor: u64) -> ResourceNode {
        ResourceNode {
            quantity: self.quantity.saturating_mul(factor),
            children: self.children.iter().map(|c| c.scaled(factor)).collect(),
            ..self.clone()
        }
    }
}

/// Rarity rank first, then case-insensitive name.
fn display_order(a: &ResourceNode, b: &ResourceNode) -> Ordering {
    Rarity::rank(a.rarity)
        .cmp(&Rarity::rank(b.rarity))
        .then_with(|| name_key(&a.name).cmp(&name_key(&b.name)))
        .then_with(|| a.name.cmp(&b.name))
}

pub struct TreeBuilder<'a> {
    catalog: &'a Catalog,
    expanded: &'a ExpansionSet,
    max_depth: usize,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(catalog: &'a Catalog, expanded: &'a ExpansionSet) -> Self {
        Self {
            catalog,
            expanded,
            max_depth: DEFAULT_MAX_RECIPE_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn build(&self, resources: &RawResources) -> Result<Vec<ResourceNode>, CalcError> {
        let mut path = Vec::new();
        self.build_level(resources, &mut path)
    }

    /// `path` holds the materials being expanded above this level.
    fn build_level(
        &self,
        resources: &RawResources,
        path: &mut Vec<String>,
    ) -> Result<Vec<ResourceNode>, CalcError> {
        let mut nodes = Vec::with_capacity(resources.len());

        for (name, quantity) in resources.iter() {
            let material = self.catalog.material_by_name(name);
            let mut node = ResourceNode {
                name: name.to_string(),
                quantity,
                rarity: material.and_then(|m| m.rarity),
                image: material.and_then(|m| m.image.clone()),
                can_craft: self.catalog.is_craftable(name),
                children: Vec::new(),
            };

            if node.can_craft && self.expanded.contains(name) {
                node.children = self.expand(name, quantity, path)?;
            }
            nodes.push(node);
        }

        nodes.sort_by(display_order);
        Ok(nodes)
    }

    fn expand(
        &self,
        name: &str,
        quantity: u64,
        path: &mut Vec<String>,
    ) -> Result<Vec<ResourceNode>, CalcError> {
        let key = name_key(name);
        if let Some(pos) = path.iter().position(|p| name_key(p) == key) {
            let mut cycle = path[pos..].to_vec();
            cycle.push(name.to_string());
            return Err(CalcError::RecipeCycle { path: cycle });
        }
        if path.len() >= self.max_depth {
            return Err(CalcError::DepthExceeded {
                material: name.to_string(),
                max_depth: self.max_depth,
            });
        }

        let Some(recipe) = self.catalog.recipe(name) else {
            return Ok(Vec::new());
        };
        let crafts = recipe.crafts_needed(quantity);

        let mut ingredients = RawResources::new();
        for ingredient in &recipe.ingredients {
            ingredients.add(&ingredient.material, u64::from(ingredient.quantity) * crafts);
        }

        path.push(name.to_string());
        let children = self.build_level(&ingredients, path);
        path.pop();
        children
    }
}

/// Build the tree with the default depth limit.
pub fn build_tree(
    resources: &RawResources,
    expanded: &ExpansionSet,
    catalog: &Catalog,
) -> Result<Vec<ResourceNode>, CalcError> {
    TreeBuilder::new(catalog, expanded).build(resources)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalMaterial {
    pub quantity: u64,
    pub rarity: Option<Rarity>,
    pub image: Option<String>,
}

/// Leaf materials of a tree, summed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FinalMaterials(BTreeMap<String, FinalMaterial>);

impl FinalMaterials {
    pub fn get(&self, name: &str) -> Option<&FinalMaterial> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FinalMaterial)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Quantities only, as a raw resource mapping.
    pub fn to_resources(&self) -> RawResources {
        self.iter().map(|(name, m)| (name, m.quantity)).collect()
    }

    /// Entries in tree display order.
    pub fn sorted(&self) -> Vec<(&str, &FinalMaterial)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|(a_name, a), (b_name, b)| {
            Rarity::rank(a.rarity)
                .cmp(&Rarity::rank(b.rarity))
                .then_with(|| name_key(a_name).cmp(&name_key(b_name)))
        });
        entries
    }
}

/// Sum every leaf by name. The first occurrence of a name supplies its
/// rarity and image.
pub fn collect_leaves(tree: &[ResourceNode]) -> FinalMaterials {
    let mut result = BTreeMap::new();
    collect_into(tree, &mut result);
    FinalMaterials(result)
}

fn collect_into(nodes: &[ResourceNode], result: &mut BTreeMap<String, FinalMaterial>) {
    for node in nodes {
        if !node.is_leaf() {
            collect_into(&node.children, result);
            continue;
        }
        result
            .entry(node.name.clone())
            .or_insert_with(|| FinalMaterial {
                quantity: 0,
                rarity: node.rarity,
                image: node.image.clone(),
            })
            .quantity += node.quantity;
    }
}

/// Format a resource tree as an indented listing
pub fn format_tree(nodes: &[ResourceNode], indent: usize) -> String {
    let mut output = String::new();
    let prefix = "  ".repeat(indent);

    for node in nodes {
        let marker = match (node.can_craft, node.is_leaf()) {
            (true, false) => "-",
            (true, true) => "+",
            (false, _) => " ",
        };
        let rarity = node.rarity.map(|r| r.as_str()).unwrap_or("Unknown");
        output.push_str(&format!(
            "{}{} {:>6} x {} [{}]\n",
            prefix, marker, node.quantity, node.name, rarity
        ));
        if !node.is_leaf() {
            output.push_str(&format_tree(&node.children, indent + 1));
        }
    }

    output
}
