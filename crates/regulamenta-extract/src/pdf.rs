//! PDF reading via `lopdf`: page geometry, text-block layout, embedded text.
//!
//! Text blocks are recovered from each page's content stream. Every glyph run
//! (`Tj`, `TJ`, `'`, `"`) becomes a rectangle positioned by the text matrix
//! composed with the CTM; its width is estimated from the glyph count at an
//! average advance of half the font size. Runs inside one `BT`..`ET` object
//! that sit on adjacent lines are merged into a block.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId};
use tracing::{debug, warn};

use crate::ExtractError;
use crate::coverage::{PageLayout, Rect};

/// US Letter, used when no `MediaBox` is found up the page tree.
const DEFAULT_MEDIA_BOX: Rect = Rect {
    x0: 0.0,
    y0: 0.0,
    x1: 612.0,
    y1: 792.0,
};

const AVG_GLYPH_ADVANCE: f64 = 0.5;
const MAX_TREE_DEPTH: usize = 32;
const PAGE_BREAK: char = '\x0c';

pub struct PdfDocument {
    path: PathBuf,
    doc: Document,
}

impl PdfDocument {
    pub fn load(path: &Path) -> Result<Self, ExtractError> {
        let doc = Document::load(path).map_err(|e| ExtractError::DocumentRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            doc,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn pages(&self) -> BTreeMap<u32, ObjectId> {
        self.doc.get_pages()
    }

    pub fn page_count(&self) -> usize {
        self.pages().len()
    }

    /// 1-based page numbers in document order.
    pub fn page_numbers(&self) -> Vec<u32> {
        self.pages().keys().copied().collect()
    }

    /// Geometry of every page. Pages whose content cannot be decoded are
    /// reported with no text blocks.
    pub fn page_layouts(&self) -> Vec<PageLayout> {
        self.pages()
            .into_iter()
            .map(|(number, id)| {
                let media_box = media_box(&self.doc, id).unwrap_or(DEFAULT_MEDIA_BOX);
                let text_blocks = match self.page_operations(id) {
                    Ok(ops) => text_blocks(&ops),
                    Err(message) => {
                        warn!(path = %self.path.display(), page = number, %message, "unreadable page content");
                        Vec::new()
                    }
                };
                debug!(page = number, blocks = text_blocks.len(), "page layout");
                PageLayout {
                    media_box,
                    text_blocks,
                }
            })
            .collect()
    }

    fn page_operations(&self, id: ObjectId) -> Result<Vec<Operation>, String> {
        let data = self.doc.get_page_content(id).map_err(|e| e.to_string())?;
        let content = Content::decode(&data).map_err(|e| e.to_string())?;
        Ok(content.operations)
    }

    /// Embedded text of every page, each followed by a form feed.
    pub fn embedded_text(&self) -> String {
        let mut out = String::new();
        for number in self.page_numbers() {
            match self.doc.extract_text(&[number]) {
                Ok(text) => out.push_str(&text),
                Err(e) => {
                    warn!(path = %self.path.display(), page = number, error = %e, "no embedded text on page")
                }
            }
            out.push(PAGE_BREAK);
        }
        out
    }
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        other => other,
    }
}

/// `MediaBox` of a page, inherited from ancestors when absent.
fn media_box(doc: &Document, page_id: ObjectId) -> Option<Rect> {
    let mut dict = doc.get_object(page_id).ok()?.as_dict().ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(obj) = dict.get(b"MediaBox")
            && let Object::Array(values) = resolve(doc, obj)
        {
            let v: Vec<f64> = values.iter().filter_map(|o| number(resolve(doc, o))).collect();
            if v.len() == 4 {
                return Some(Rect::new(v[0], v[1], v[2], v[3]));
            }
        }
        let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
        dict = doc.get_object(parent).ok()?.as_dict().ok()?;
    }
    None
}

/// Affine matrix `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f64; 6]);

impl Matrix {
    const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn translate(tx: f64, ty: f64) -> Self {
        Matrix([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    fn from_operands(operands: &[Object]) -> Option<Self> {
        let v: Vec<f64> = operands.iter().filter_map(number).collect();
        (v.len() == 6).then(|| Matrix([v[0], v[1], v[2], v[3], v[4], v[5]]))
    }

    /// `self × other`: apply `self` first.
    fn then(&self, other: &Matrix) -> Matrix {
        let [a1, b1, c1, d1, e1, f1] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Matrix([
            a1 * a2 + b1 * c2,
            a1 * b2 + b1 * d2,
            c1 * a2 + d1 * c2,
            c1 * b2 + d1 * d2,
            e1 * a2 + f1 * c2 + e2,
            e1 * b2 + f1 * d2 + f2,
        ])
    }

    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let [a, b, c, d, e, f] = self.0;
        (a * x + c * y + e, b * x + d * y + f)
    }
}

struct TextState {
    tm: Matrix,
    tlm: Matrix,
    font_size: f64,
    char_spacing: f64,
    h_scale: f64,
    leading: f64,
    rise: f64,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            tm: Matrix::IDENTITY,
            tlm: Matrix::IDENTITY,
            font_size: 12.0,
            char_spacing: 0.0,
            h_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

impl TextState {
    fn move_line(&mut self, tx: f64, ty: f64) {
        self.tlm = Matrix::translate(tx, ty).then(&self.tlm);
        self.tm = self.tlm;
    }

    fn advance(&mut self, tx: f64) {
        self.tm = Matrix::translate(tx, 0.0).then(&self.tm);
    }

    /// Bounding box in user space of `glyphs` glyphs shown at the current
    /// position; advances the text matrix past them.
    fn show(&mut self, glyphs: usize, ctm: &Matrix) -> Option<Rect> {
        if glyphs == 0 {
            return None;
        }
        let width =
            glyphs as f64 * (AVG_GLYPH_ADVANCE * self.font_size + self.char_spacing) * self.h_scale;
        let trm = self.tm.then(ctm);
        let (y0, y1) = (self.rise, self.rise + self.font_size);
        let corners = [
            trm.apply(0.0, y0),
            trm.apply(width, y0),
            trm.apply(0.0, y1),
            trm.apply(width, y1),
        ];
        self.advance(width);

        let (mut x_min, mut y_min) = corners[0];
        let (mut x_max, mut y_max) = corners[0];
        for (x, y) in &corners[1..] {
            x_min = x_min.min(*x);
            x_max = x_max.max(*x);
            y_min = y_min.min(*y);
            y_max = y_max.max(*y);
        }
        let rect = Rect::new(x_min, y_min, x_max, y_max);
        (rect.area() > 0.0).then_some(rect)
    }
}

fn glyph_count(obj: &Object) -> usize {
    match obj {
        Object::String(bytes, _) => bytes.len(),
        _ => 0,
    }
}

/// Runs on adjacent lines (or the same line) belong to one block.
fn adjacent(block: &Rect, run: &Rect) -> bool {
    let line = run.height().max(1.0);
    let v_gap = (run.y0 - block.y1).max(block.y0 - run.y1).max(0.0);
    let h_gap = (run.x0 - block.x1).max(block.x0 - run.x1).max(0.0);
    v_gap <= 0.5 * line && h_gap <= 2.0 * line
}

#[derive(Default)]
struct BlockCollector {
    blocks: Vec<Rect>,
    current: Option<Rect>,
}

impl BlockCollector {
    fn add(&mut self, run: Rect) {
        self.current = Some(match self.current.take() {
            Some(block) if adjacent(&block, &run) => block.union(&run),
            Some(block) => {
                self.blocks.push(block);
                run
            }
            None => run,
        });
    }

    fn close(&mut self) {
        if let Some(block) = self.current.take() {
            self.blocks.push(block);
        }
    }
}

/// Text blocks drawn by a content stream, in user space.
fn text_blocks(ops: &[Operation]) -> Vec<Rect> {
    let mut ctm = Matrix::IDENTITY;
    let mut saved = Vec::new();
    let mut ts = TextState::default();
    let mut blocks = BlockCollector::default();

    for op in ops {
        let arg = |i: usize| op.operands.get(i).and_then(number);
        match op.operator.as_str() {
            "q" => saved.push(ctm),
            "Q" => ctm = saved.pop().unwrap_or(Matrix::IDENTITY),
            "cm" => {
                if let Some(m) = Matrix::from_operands(&op.operands) {
                    ctm = m.then(&ctm);
                }
            }
            "BT" => {
                ts.tm = Matrix::IDENTITY;
                ts.tlm = Matrix::IDENTITY;
            }
            "ET" => blocks.close(),
            "Tf" => {
                if let Some(size) = arg(1) {
                    ts.font_size = size.abs();
                }
            }
            "Tc" => ts.char_spacing = arg(0).unwrap_or(0.0),
            "Tz" => ts.h_scale = arg(0).unwrap_or(100.0) / 100.0,
            "TL" => ts.leading = arg(0).unwrap_or(0.0),
            "Ts" => ts.rise = arg(0).unwrap_or(0.0),
            "Td" => ts.move_line(arg(0).unwrap_or(0.0), arg(1).unwrap_or(0.0)),
            "TD" => {
                let ty = arg(1).unwrap_or(0.0);
                ts.leading = -ty;
                ts.move_line(arg(0).unwrap_or(0.0), ty);
            }
            "Tm" => {
                if let Some(m) = Matrix::from_operands(&op.operands) {
                    ts.tm = m;
                    ts.tlm = m;
                }
            }
            "T*" => ts.move_line(0.0, -ts.leading),
            "Tj" => {
                let glyphs = op.operands.first().map(glyph_count).unwrap_or(0);
                if let Some(run) = ts.show(glyphs, &ctm) {
                    blocks.add(run);
                }
            }
            "'" => {
                ts.move_line(0.0, -ts.leading);
                let glyphs = op.operands.first().map(glyph_count).unwrap_or(0);
                if let Some(run) = ts.show(glyphs, &ctm) {
                    blocks.add(run);
                }
            }
            "\"" => {
                ts.char_spacing = arg(1).unwrap_or(ts.char_spacing);
                ts.move_line(0.0, -ts.leading);
                let glyphs = op.operands.get(2).map(glyph_count).unwrap_or(0);
                if let Some(run) = ts.show(glyphs, &ctm) {
                    blocks.add(run);
                }
            }
            "TJ" => {
                let Some(Object::Array(items)) = op.operands.first() else {
                    continue;
                };
                for item in items {
                    match item {
                        Object::String(..) => {
                            if let Some(run) = ts.show(glyph_count(item), &ctm) {
                                blocks.add(run);
                            }
                        }
                        other => {
                            if let Some(adj) = number(other) {
                                ts.advance(-adj / 1000.0 * ts.font_size * ts.h_scale);
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }
    blocks.close();
    blocks.blocks
}
