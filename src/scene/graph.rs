//! Ordered, wholesale-replaceable scene graph

use super::{HemisphereLight, SceneFragment};

#[derive(Debug, Clone, PartialEq)]
pub enum SceneNode {
    Light(HemisphereLight),
    Fragment(SceneFragment),
}

/// Ordered collection of scene nodes.
///
/// `revision` changes on every mutation so GPU-side copies can tell when
/// their buffers are stale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    revision: u64,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn light(&self) -> Option<&HemisphereLight> {
        self.nodes.iter().find_map(|node| match node {
            SceneNode::Light(light) => Some(light),
            _ => None,
        })
    }

    pub fn fragments(&self) -> impl Iterator<Item = &SceneFragment> {
        self.nodes.iter().filter_map(|node| match node {
            SceneNode::Fragment(fragment) => Some(fragment),
            _ => None,
        })
    }

    pub fn add_light(&mut self, light: HemisphereLight) {
        self.nodes.push(SceneNode::Light(light));
        self.revision += 1;
    }

    /// Append a fragment. The light must already be present.
    pub fn add_fragment(&mut self, fragment: SceneFragment) {
        debug_assert!(self.light().is_some(), "fragment added to an unlit scene");
        self.nodes.push(SceneNode::Fragment(fragment));
        self.revision += 1;
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.revision += 1;
    }

    /// Clear, re-add `light`, then add `fragment`, as one mutation.
    ///
    /// Takes `&mut self` for the whole sequence, so no reader can observe the
    /// cleared intermediate state.
    pub fn replace_contents(&mut self, light: HemisphereLight, fragment: SceneFragment) {
        self.nodes.clear();
        self.nodes.push(SceneNode::Light(light));
        self.nodes.push(SceneNode::Fragment(fragment));
        self.revision += 1;
    }

    /// Holds when the light is present in every non-empty scene, exactly once
    pub fn is_consistent(&self) -> bool {
        let lights = self
            .nodes
            .iter()
            .filter(|n| matches!(n, SceneNode::Light(_)))
            .count();
        self.nodes.is_empty() || lights == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_keeps_light_drops_old_fragments() {
        let light = HemisphereLight::default();
        let mut scene = SceneGraph::new();
        scene.add_light(light);
        scene.add_fragment(SceneFragment::new("planet", Vec::new()));
        scene.add_fragment(SceneFragment::new("moon", Vec::new()));
        let before = scene.revision();

        scene.replace_contents(light, SceneFragment::new("rock", Vec::new()));

        assert_eq!(scene.len(), 2);
        assert_eq!(scene.light(), Some(&light));
        let names: Vec<_> = scene.fragments().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["rock"]);
        assert!(scene.is_consistent());
        assert_eq!(scene.revision(), before + 1);
    }

    #[test]
    fn test_consistency() {
        let mut scene = SceneGraph::new();
        assert!(scene.is_consistent());
        scene.add_light(HemisphereLight::default());
        assert!(scene.is_consistent());
        scene.add_light(HemisphereLight::default());
        assert!(!scene.is_consistent());
        scene.clear();
        assert!(scene.is_empty());
        assert!(scene.is_consistent());
    }
}
