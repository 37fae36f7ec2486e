use crate::annotate::domain::frame_annotator::FrameAnnotator;
use crate::detection::domain::detection::Detection;
use crate::detection::infrastructure::coco_labels;
use crate::shared::frame::Frame;

/// Outline thickness in pixels.
const BOX_THICKNESS: i32 = 2;

/// Glyph cell geometry: 5x7 pixels plus one column of spacing.
const GLYPH_WIDTH: usize = 5;
const GLYPH_HEIGHT: usize = 7;
const GLYPH_ADVANCE: usize = GLYPH_WIDTH + 1;

/// Padding inside the label tag, around the text.
const TAG_PADDING: usize = 2;

/// Distinct colors cycled by class id, RGB.
const PALETTE: &[[u8; 3]] = &[
    [230, 57, 70],
    [46, 160, 67],
    [31, 119, 180],
    [255, 159, 28],
    [144, 103, 198],
    [0, 181, 173],
    [214, 93, 177],
    [140, 110, 60],
];

/// CPU annotator: box outlines in a per-class color with an optional filled
/// label tag ("person 87%") drawn with an embedded 5x7 bitmap font.
///
/// All drawing is clamped to the frame, so boxes sliding off an edge render
/// partially instead of wrapping or panicking.
pub struct BoxAnnotator {
    draw_labels: bool,
}

impl BoxAnnotator {
    pub fn new(draw_labels: bool) -> Self {
        Self { draw_labels }
    }
}

impl FrameAnnotator for BoxAnnotator {
    fn annotate(&self, frame: &mut Frame, detections: &[Detection]) {
        for det in detections {
            let color = PALETTE[det.class_id % PALETTE.len()];
            draw_box_outline(frame, det, color);
            if self.draw_labels {
                let text = format!(
                    "{} {:.0}%",
                    coco_labels::label(det.class_id),
                    det.score * 100.0
                );
                draw_label_tag(frame, det, &text, color);
            }
        }
    }
}

fn set_pixel(frame: &mut Frame, x: i32, y: i32, color: [u8; 3]) {
    if x < 0 || y < 0 || x >= frame.width() as i32 || y >= frame.height() as i32 {
        return;
    }
    let mut pixels = frame.as_ndarray_mut();
    for (c, &v) in color.iter().enumerate() {
        pixels[[y as usize, x as usize, c]] = v;
    }
}

fn fill_rect(frame: &mut Frame, x1: i32, y1: i32, x2: i32, y2: i32, color: [u8; 3]) {
    let fw = frame.width() as i32;
    let fh = frame.height() as i32;
    let x1 = x1.max(0);
    let y1 = y1.max(0);
    let x2 = x2.min(fw);
    let y2 = y2.min(fh);
    if x1 >= x2 || y1 >= y2 {
        return;
    }
    let mut pixels = frame.as_ndarray_mut();
    for y in y1..y2 {
        for x in x1..x2 {
            for (c, &v) in color.iter().enumerate() {
                pixels[[y as usize, x as usize, c]] = v;
            }
        }
    }
}

fn draw_box_outline(frame: &mut Frame, det: &Detection, color: [u8; 3]) {
    let x1 = det.x;
    let y1 = det.y;
    let x2 = det.x + det.width;
    let y2 = det.y + det.height;
    let t = BOX_THICKNESS;

    fill_rect(frame, x1, y1, x2, y1 + t, color); // top
    fill_rect(frame, x1, y2 - t, x2, y2, color); // bottom
    fill_rect(frame, x1, y1, x1 + t, y2, color); // left
    fill_rect(frame, x2 - t, y1, x2, y2, color); // right
}

fn draw_label_tag(frame: &mut Frame, det: &Detection, text: &str, color: [u8; 3]) {
    let tag_w = (text.chars().count() * GLYPH_ADVANCE + 2 * TAG_PADDING) as i32;
    let tag_h = (GLYPH_HEIGHT + 2 * TAG_PADDING) as i32;

    // Above the box when there's room, inside its top edge otherwise.
    let tag_x = det.x;
    let tag_y = if det.y >= tag_h { det.y - tag_h } else { det.y };

    fill_rect(frame, tag_x, tag_y, tag_x + tag_w, tag_y + tag_h, color);
    draw_text(
        frame,
        text,
        tag_x + TAG_PADDING as i32,
        tag_y + TAG_PADDING as i32,
        [255, 255, 255],
    );
}

fn draw_text(frame: &mut Frame, text: &str, x: i32, y: i32, color: [u8; 3]) {
    let mut cursor = x;
    for ch in text.chars() {
        let pattern = glyph(ch.to_ascii_uppercase());
        for (row, bits) in pattern.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if (bits >> (GLYPH_WIDTH - 1 - col)) & 1 == 1 {
                    set_pixel(frame, cursor + col as i32, y + row as i32, color);
                }
            }
        }
        cursor += GLYPH_ADVANCE as i32;
    }
}

/// 5x7 glyphs, one byte per row, low 5 bits used, MSB-of-5 is the left
/// column. Unknown characters render as blanks.
fn glyph(ch: char) -> [u8; 7] {
    match ch {
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x1B, 0x11],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '%' => [0x18, 0x19, 0x02, 0x04, 0x08, 0x13, 0x03],
        _ => [0; 7],
    }
}
