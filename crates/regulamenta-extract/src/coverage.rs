//! Text-coverage heuristic.
//!
//! A PDF produced by a word processor has text blocks over a sizeable share
//! of its pages; a scanned gazette has images and, at best, a few stray
//! glyphs. The ratio of text-block area to page area, summed over the whole
//! document, separates the two.

/// Axis-aligned rectangle in PDF user space (points).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    /// Normalising constructor: corners may be given in any order.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let r = Rect {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        };
        (r.x1 > r.x0 && r.y1 > r.y0).then_some(r)
    }
}

/// Geometry of one page: its media box and the text blocks drawn on it.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub media_box: Rect,
    pub text_blocks: Vec<Rect>,
}

impl PageLayout {
    pub fn area(&self) -> f64 {
        self.media_box.area()
    }

    /// Text-block area that falls inside the page.
    pub fn text_area(&self) -> f64 {
        self.text_blocks
            .iter()
            .filter_map(|b| b.intersect(&self.media_box))
            .map(|b| b.area())
            .sum()
    }
}

/// Σ text-block area / Σ page area, capped at 1.0.
///
/// Zero pages or zero total area give 0.0.
pub fn coverage_ratio(pages: &[PageLayout]) -> f64 {
    let total: f64 = pages.iter().map(|p| p.area()).sum();
    if total <= 0.0 {
        return 0.0;
    }
    let text: f64 = pages.iter().map(|p| p.text_area()).sum();
    (text / total).min(1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionDecision {
    /// Embedded text is authoritative.
    Embedded,
    /// Too little embedded text; rasterise and OCR.
    NeedsOcr,
}

pub fn decide(ratio: f64, min_coverage: f64) -> ExtractionDecision {
    if ratio >= min_coverage {
        ExtractionDecision::Embedded
    } else {
        ExtractionDecision::NeedsOcr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A4: Rect = Rect {
        x0: 0.0,
        y0: 0.0,
        x1: 595.0,
        y1: 842.0,
    };

    fn page(blocks: Vec<Rect>) -> PageLayout {
        PageLayout {
            media_box: A4,
            text_blocks: blocks,
        }
    }

    #[test]
    fn no_pages_forces_ocr() {
        let ratio = coverage_ratio(&[]);
        assert_eq!(ratio, 0.0);
        assert_eq!(decide(ratio, 0.1), ExtractionDecision::NeedsOcr);
    }

    #[test]
    fn zero_area_pages_force_ocr() {
        let flat = PageLayout {
            media_box: Rect::new(0.0, 0.0, 0.0, 0.0),
            text_blocks: vec![Rect::new(0.0, 0.0, 10.0, 10.0)],
        };
        assert_eq!(coverage_ratio(&[flat]), 0.0);
    }

    #[test]
    fn ratio_sums_across_pages() {
        let half = Rect::new(0.0, 0.0, 595.0, 421.0);
        let ratio = coverage_ratio(&[page(vec![half]), page(vec![])]);
        assert!((ratio - 0.25).abs() < 1e-9);
    }

    #[test]
    fn blocks_clipped_to_page_and_capped() {
        let huge = Rect::new(-1000.0, -1000.0, 2000.0, 2000.0);
        assert_eq!(coverage_ratio(&[page(vec![huge])]), 1.0);
        let overlapping = vec![A4, A4];
        assert_eq!(coverage_ratio(&[page(overlapping)]), 1.0);
    }

    #[test]
    fn threshold_is_inclusive() {
        assert_eq!(decide(0.1, 0.1), ExtractionDecision::Embedded);
        assert_eq!(decide(0.0999, 0.1), ExtractionDecision::NeedsOcr);
        assert_eq!(decide(0.0, 0.0), ExtractionDecision::Embedded);
    }

    #[test]
    fn rect_normalises_and_intersects() {
        let r = Rect::new(10.0, 20.0, 0.0, 0.0);
        assert_eq!(r.area(), 200.0);
        assert!(r.intersect(&Rect::new(20.0, 20.0, 30.0, 30.0)).is_none());
        assert_eq!(r.union(&Rect::new(5.0, 5.0, 15.0, 25.0)).area(), 375.0);
    }
}
