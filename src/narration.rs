use std::path::PathBuf;

use crate::content::Content;
use crate::error::SlidecastResult;

/// Audible pause marker between narration segments.
const PAUSE: &str = " ... ";

/// Collaborator boundary: turns content into one continuous speech track and
/// returns the path to an MP3-compatible audio file.
pub trait NarrationSource {
    fn synthesize(&self, content: &Content) -> SlidecastResult<PathBuf>;
}

/// Assemble the full narration script: welcome + overview, each slide's
/// narration prefixed with its ordinal, then the conclusion, separated by
/// pause markers. Empty fields are skipped rather than emitted, so partial
/// content never fails narration.
pub fn narration_script(content: &Content) -> String {
    let mut parts = Vec::new();

    match (content.title.trim(), content.overview.trim()) {
        ("", "") => {}
        (title, "") => parts.push(format!("Welcome to this presentation about {title}.")),
        ("", overview) => parts.push(overview.to_string()),
        (title, overview) => {
            parts.push(format!(
                "Welcome to this presentation about {title}. {overview}"
            ));
        }
    }

    for (i, slide) in content.slides.iter().enumerate() {
        let narration = slide.narration.trim();
        if narration.is_empty() {
            continue;
        }
        parts.push(format!("Slide {}: {narration}", i + 1));
    }

    let conclusion = content.conclusion.trim();
    if !conclusion.is_empty() {
        parts.push(format!("In conclusion, {conclusion}"));
    }

    parts.join(PAUSE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Slide;

    fn slide(narration: &str) -> Slide {
        Slide {
            narration: narration.to_string(),
            ..Slide::default()
        }
    }

    #[test]
    fn full_script_orders_segments_with_pauses() {
        let content = Content {
            title: "Water Cycle".to_string(),
            overview: "How water moves.".to_string(),
            slides: vec![slide("Evaporation happens."), slide("Then condensation.")],
            conclusion: "water always moves.".to_string(),
        };

        let script = narration_script(&content);
        assert_eq!(
            script,
            "Welcome to this presentation about Water Cycle. How water moves. ... \
             Slide 1: Evaporation happens. ... Slide 2: Then condensation. ... \
             In conclusion, water always moves."
        );
    }

    #[test]
    fn empty_fields_skip_their_segments() {
        let content = Content {
            slides: vec![slide(""), slide("Only this one speaks.")],
            ..Content::default()
        };

        // Slide ordinals reflect slide position, not speaking order.
        assert_eq!(narration_script(&content), "Slide 2: Only this one speaks.");
    }

    #[test]
    fn title_without_overview_still_welcomes() {
        let content = Content {
            title: "Gravity".to_string(),
            ..Content::default()
        };
        assert_eq!(
            narration_script(&content),
            "Welcome to this presentation about Gravity."
        );
    }

    #[test]
    fn fully_empty_content_yields_empty_script() {
        assert_eq!(narration_script(&Content::default()), "");
    }
}
