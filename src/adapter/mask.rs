//! Masked-image groups and vector path extraction
//!
//! Both adapters collapse a two-child `{shape, image}` group into a single
//! `Svg` node. Detection only looks at child roles, never at their order.

use scraper::{ElementRef, Html, Selector};

/// What a child contributes to a potential masked-image group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildRole {
    /// Vector, rectangle or ellipse without an image paint
    Shape,
    /// Rectangle carrying an image paint
    Image,
    Other,
}

pub trait MaskCandidate {
    fn role(&self) -> ChildRole;
}

/// Returns `(shape, image)` when `children` is exactly one shape plus one image.
pub fn masked_pair<T: MaskCandidate>(children: &[T]) -> Option<(&T, &T)> {
    let [a, b] = children else {
        return None;
    };
    match (a.role(), b.role()) {
        (ChildRole::Shape, ChildRole::Image) => Some((a, b)),
        (ChildRole::Image, ChildRole::Shape) => Some((b, a)),
        _ => None,
    }
}

pub(crate) const SHAPE_TAGS: [&str; 6] = ["path", "circle", "ellipse", "rect", "polygon", "polyline"];

fn number(el: &ElementRef<'_>, attr: &str) -> f32 {
    el.value()
        .attr(attr)
        .map(|v| v.trim().trim_end_matches("px"))
        .and_then(|v| v.parse().ok())
        .unwrap_or(0.0)
}

fn ellipse_at(cx: f32, cy: f32, rx: f32, ry: f32) -> String {
    format!(
        "M{} {}A{} {} 0 1 0 {} {}A{} {} 0 1 0 {} {}Z",
        cx - rx,
        cy,
        rx,
        ry,
        cx + rx,
        cy,
        rx,
        ry,
        cx - rx,
        cy
    )
}

/// Ellipse inscribed in a `width` x `height` box, as path data.
pub fn ellipse_path(width: f32, height: f32) -> String {
    ellipse_at(width / 2.0, height / 2.0, width / 2.0, height / 2.0)
}

/// Path data for one vector primitive element.
pub fn element_path(el: &ElementRef<'_>) -> Option<String> {
    match el.value().name() {
        "path" => el.value().attr("d").map(|d| d.trim().to_string()).filter(|d| !d.is_empty()),
        "circle" => {
            let r = number(el, "r");
            (r > 0.0).then(|| ellipse_at(number(el, "cx"), number(el, "cy"), r, r))
        }
        "ellipse" => {
            let (rx, ry) = (number(el, "rx"), number(el, "ry"));
            (rx > 0.0 && ry > 0.0).then(|| ellipse_at(number(el, "cx"), number(el, "cy"), rx, ry))
        }
        "rect" => {
            let (x, y, w, h) = (number(el, "x"), number(el, "y"), number(el, "width"), number(el, "height"));
            (w > 0.0 && h > 0.0).then(|| format!("M{} {}H{}V{}H{}Z", x, y, x + w, y + h, x))
        }
        "polygon" | "polyline" => {
            let points: Vec<&str> = el
                .value()
                .attr("points")?
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|p| !p.is_empty())
                .collect();
            if points.len() < 4 {
                return None;
            }
            let mut d = format!("M{} {}", points[0], points[1]);
            for pair in points[2..].chunks(2) {
                if let [x, y] = pair {
                    d.push_str(&format!("L{} {}", x, y));
                }
            }
            if el.value().name() == "polygon" {
                d.push('Z');
            }
            Some(d)
        }
        _ => None,
    }
}

fn has_ancestor(el: &ElementRef<'_>, names: &[&str]) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| names.iter().any(|n| a.value().name().eq_ignore_ascii_case(n)))
}

fn is_image_fill(el: &ElementRef<'_>) -> bool {
    el.value()
        .attr("fill")
        .map(|f| f.trim_start().starts_with("url("))
        .unwrap_or(false)
}

/// Shape elements under `root` that describe a clip outline.
///
/// Shapes inside a `<mask>` or `<clipPath>` win; otherwise every shape not
/// painted with a pattern. Pattern contents are never outlines.
pub fn outline_elements<'a>(root: ElementRef<'a>) -> Vec<ElementRef<'a>> {
    let shapes: Vec<ElementRef<'a>> = root
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| SHAPE_TAGS.contains(&el.value().name()))
        .filter(|el| !has_ancestor(el, &["pattern"]))
        .collect();
    let clipped: Vec<ElementRef<'a>> = shapes
        .iter()
        .copied()
        .filter(|el| has_ancestor(el, &["mask", "clippath"]))
        .collect();
    if !clipped.is_empty() {
        return clipped;
    }
    shapes.into_iter().filter(|el| !is_image_fill(el)).collect()
}

/// Combined outline path of a standalone vector document, if it has one.
pub fn path_from_svg(markup: &str) -> Option<String> {
    let doc = Html::parse_fragment(markup);
    let svg = Selector::parse("svg").ok()?;
    let root = doc.select(&svg).next().unwrap_or_else(|| doc.root_element());
    let d: Vec<String> = outline_elements(root).iter().filter_map(element_path).collect();
    if d.is_empty() {
        None
    } else {
        Some(d.join(" "))
    }
}

/// The `viewBox` declared on the outermost `<svg>` element.
pub fn view_box_of(markup: &str) -> Option<String> {
    let doc = Html::parse_fragment(markup);
    let svg = Selector::parse("svg").ok()?;
    let root = doc.select(&svg).next()?;
    root.value()
        .attrs()
        .find(|(name, _)| name.eq_ignore_ascii_case("viewbox"))
        .map(|(_, v)| v.to_string())
}

/// Width/height of a `min-x min-y width height` viewBox.
pub(crate) fn view_box_size(view_box: &str) -> Option<(f32, f32)> {
    let parts: Vec<f32> = view_box
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .map(|p| p.parse().ok())
        .collect::<Option<Vec<_>>>()?;
    match parts.as_slice() {
        [_, _, w, h] => Some((*w, *h)),
        _ => None,
    }
}
