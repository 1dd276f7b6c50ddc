use super::Animation;

/// Ordered collection of editable animation presets
///
/// Selection follows the picker row: one preset is current at a time
/// and field edits go through `selected_mut`. Indices are the caller's
/// contract; an out-of-bounds index panics like any slice access.
#[derive(Debug, Default)]
pub struct Catalog {
    animations: Vec<Animation>,
    selected: usize,
}

impl Catalog {
    pub fn new(animations: Vec<Animation>) -> Self {
        Self {
            animations,
            selected: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }

    pub fn push(&mut self, animation: Animation) {
        self.animations.push(animation);
    }

    /// Display titles in picker order
    pub fn tags(&self) -> Vec<&str> {
        self.animations
            .iter()
            .map(|animation| animation.tag.as_str())
            .collect()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn select(&mut self, index: usize) {
        assert!(
            index < self.animations.len(),
            "selected index {index} out of bounds for {} presets",
            self.animations.len()
        );
        self.selected = index;
    }

    /// Select by tag; returns false and keeps the selection when no
    /// preset carries the tag
    pub fn select_tag(&mut self, tag: &str) -> bool {
        match self.animations.iter().position(|a| a.tag == tag) {
            Some(index) => {
                self.selected = index;
                true
            }
            None => false,
        }
    }

    pub fn selected(&self) -> &Animation {
        &self.animations[self.selected]
    }

    pub fn selected_mut(&mut self) -> &mut Animation {
        &mut self.animations[self.selected]
    }

    pub fn get(&self, index: usize) -> Option<&Animation> {
        self.animations.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Animation> {
        self.animations.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Animation> {
        self.animations.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Animation> {
        self.animations.iter_mut()
    }
}
