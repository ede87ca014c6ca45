//! Box styles and inheritance resolution
//!
//! Styles form a directed graph through `inherits`. A property resolves to
//! the style's own value when set; otherwise every inherited style is
//! resolved in order and the last one with a value wins. Cycles are cut by
//! tracking the styles on the current lookup path, so a cyclic chain gives
//! the same answer as the chain without its closing edge.

use std::collections::BTreeMap;

use crate::geometry::Color;

/// A resolvable style property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleProperty {
    BackgroundColor,
    TextColor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxStyle {
    pub id: String,
    pub inherits: Vec<String>,
    pub background_color: Option<Color>,
    pub text_color: Option<Color>,
}

impl BoxStyle {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            inherits: Vec::new(),
            background_color: None,
            text_color: None,
        }
    }

    pub fn inheriting(mut self, parent: impl Into<String>) -> Self {
        self.inherits.push(parent.into());
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = Some(color);
        self
    }

    pub fn with_text_color(mut self, color: Color) -> Self {
        self.text_color = Some(color);
        self
    }

    fn own(&self, property: StyleProperty) -> Option<Color> {
        match property {
            StyleProperty::BackgroundColor => self.background_color,
            StyleProperty::TextColor => self.text_color,
        }
    }
}

/// Fully resolved colours of a style
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResolvedStyle {
    pub background_color: Option<Color>,
    pub text_color: Option<Color>,
}

/// All styles of a diagram, keyed by id
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    styles: BTreeMap<String, BoxStyle>,
}

/// Partially resolved style during a lookup
struct Frame<'a> {
    style: &'a BoxStyle,
    /// Index of the next parent to visit
    next: usize,
    resolved: Option<Color>,
}

impl<'a> Frame<'a> {
    fn new(style: &'a BoxStyle) -> Self {
        Self {
            style,
            next: 0,
            resolved: None,
        }
    }
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a style, returning the previous style with the same id
    pub fn insert(&mut self, style: BoxStyle) -> Option<BoxStyle> {
        self.styles.insert(style.id.clone(), style)
    }

    pub fn get(&self, id: &str) -> Option<&BoxStyle> {
        self.styles.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.styles.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoxStyle> {
        self.styles.values()
    }

    /// Resolve one property of the style `id`
    ///
    /// Unknown ids (including unknown parents) resolve to `None`.
    pub fn resolve(&self, id: &str, property: StyleProperty) -> Option<Color> {
        let root = self.styles.get(id)?;
        if let Some(value) = root.own(property) {
            return Some(value);
        }

        // One frame per style on the current lookup path
        let mut on_path: Vec<&str> = vec![id];
        let mut stack = vec![Frame::new(root)];
        let mut finished: Option<Option<Color>> = None;

        while let Some(frame) = stack.last_mut() {
            if let Some(Some(value)) = finished.take() {
                frame.resolved = Some(value);
            }
            let style = frame.style;
            let Some(parent) = style.inherits.get(frame.next) else {
                finished = stack.pop().map(|f| f.resolved);
                on_path.pop();
                continue;
            };
            frame.next += 1;

            if on_path.contains(&parent.as_str()) {
                continue;
            }
            let Some(parent_style) = self.styles.get(parent.as_str()) else {
                continue;
            };
            match parent_style.own(property) {
                Some(value) => finished = Some(Some(value)),
                None => {
                    on_path.push(parent.as_str());
                    stack.push(Frame::new(parent_style));
                }
            }
        }
        finished.flatten()
    }

    /// Resolve every property of `id`; `None` gives the empty style
    pub fn resolved(&self, id: Option<&str>) -> ResolvedStyle {
        match id {
            Some(id) => ResolvedStyle {
                background_color: self.resolve(id, StyleProperty::BackgroundColor),
                text_color: self.resolve(id, StyleProperty::TextColor),
            },
            None => ResolvedStyle::default(),
        }
    }
}
