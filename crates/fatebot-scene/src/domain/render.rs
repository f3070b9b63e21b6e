//! Text rendering of a scene for the display surface.
//!
//! The output is a pure function of scene state, so re-rendering an unchanged
//! scene always produces the same text and reconciliation is idempotent.

use std::fmt::{self, Write as _};

use super::aggregates::{Aspect, Scene};

/// Title shown when a scene has no description.
pub const UNTITLED_SCENE: &str = "Untitled scene";

/// Line shown when a scene has no aspects.
pub const NO_ASPECTS: &str = "No aspects in this scene.";

/// Tags for an aspect, omitting default values.
fn tags(aspect: &Aspect) -> Vec<String> {
    let mut tags = Vec::new();
    if aspect.is_boost() {
        tags.push("boost".to_owned());
    }
    if aspect.invokes() > 0 {
        tags.push(format!("invokes={}", aspect.invokes()));
    }
    tags
}

/// Renders the scene as display text: a title line followed by one line per
/// aspect in insertion order.
#[must_use]
pub fn render(scene: &Scene) -> String {
    let mut out = String::from(scene.description().unwrap_or(UNTITLED_SCENE));
    let mut any = false;
    for (id, aspect) in scene.aspects() {
        any = true;
        let _ = write!(out, "\n[{id}] {}", aspect.name());
        let tags = tags(aspect);
        if !tags.is_empty() {
            let _ = write!(out, " ({})", tags.join(", "));
        }
    }
    if !any {
        out.push('\n');
        out.push_str(NO_ASPECTS);
    }
    out
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self))
    }
}

#[cfg(test)]
mod tests {
    use fatebot_core::channel::ChannelId;

    use super::*;
    use crate::domain::aggregates::Aspect;

    #[test]
    fn test_render_empty_scene_uses_placeholders() {
        let scene = Scene::new(ChannelId(1), None);

        assert_eq!(render(&scene), "Untitled scene\nNo aspects in this scene.");
    }

    #[test]
    fn test_render_lists_aspects_with_non_default_tags() {
        // Arrange
        let mut scene = Scene::new(ChannelId(1), Some("Rooftop chase"));
        scene.add_aspect(Aspect::new("Slick Tiles").unwrap()).unwrap();
        let boost = scene.add_aspect(Aspect::new_boost("Winded").unwrap()).unwrap();
        let dark = scene.add_aspect(Aspect::new("Moonless Night").unwrap()).unwrap();
        scene.adjust_invokes(dark, 2).unwrap();
        scene.invoke_aspect(boost).unwrap();

        // Act
        let text = render(&scene);

        // Assert
        assert_eq!(
            text,
            "Rooftop chase\n[1] Slick Tiles\n[2] Winded (boost)\n[3] Moonless Night (invokes=2)"
        );
    }

    #[test]
    fn test_render_is_idempotent_and_matches_display() {
        let mut scene = Scene::new(ChannelId(1), Some("Docks\nat dusk"));
        scene.add_aspect(Aspect::new_boost("Fog").unwrap()).unwrap();

        let first = render(&scene);
        let second = render(&scene);

        assert_eq!(first, second);
        assert_eq!(scene.to_string(), first);
        assert!(first.ends_with("[1] Fog (boost, invokes=1)"));
    }
}
