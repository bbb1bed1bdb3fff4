use kurbo::{BezPath, Point, Vec2};
use rustybuzz::ttf_parser::{GlyphId, OutlineBuilder};
use rustybuzz::{GlyphBuffer, UnicodeBuffer};

struct Builder {
	path: BezPath,
	pos: Point,
	offset: Vec2,
	scale: f64,
}

impl Builder {
	/// Font units grow upward, pixels grow downward.
	fn point(&self, x: f32, y: f32) -> Point {
		self.pos + self.offset + Vec2::new(x as f64, -y as f64) * self.scale
	}
}

impl OutlineBuilder for Builder {
	fn move_to(&mut self, x: f32, y: f32) {
		self.path.move_to(self.point(x, y));
	}

	fn line_to(&mut self, x: f32, y: f32) {
		self.path.line_to(self.point(x, y));
	}

	fn quad_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
		self.path.quad_to(self.point(x1, y1), self.point(x2, y2));
	}

	fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) {
		self.path.curve_to(self.point(x1, y1), self.point(x2, y2), self.point(x3, y3));
	}

	fn close(&mut self) {
		self.path.close_path();
	}
}

fn scale(buzz_face: &rustybuzz::Face, font_size: f64) -> f64 {
	(buzz_face.units_per_em() as f64).recip() * font_size
}

fn shape(str: &str, buzz_face: &rustybuzz::Face) -> GlyphBuffer {
	let mut buffer = UnicodeBuffer::new();
	buffer.push_str(str);
	rustybuzz::shape(buzz_face, &[], buffer)
}

/// Width of the shaped string as a single line, in pixels.
pub fn advance_width(str: &str, buzz_face: &rustybuzz::Face, font_size: f64) -> f64 {
	let scale = scale(buzz_face, font_size);
	shape(str, buzz_face).glyph_positions().iter().map(|pos| pos.x_advance as f64 * scale).sum()
}

/// Outlines the string as a single line starting at `x = 0` with its baseline at `baseline`.
pub fn to_kurbo(str: &str, buzz_face: &rustybuzz::Face, font_size: f64, baseline: f64) -> BezPath {
	let scale = scale(buzz_face, font_size);
	let glyph_buffer = shape(str, buzz_face);

	let mut builder = Builder {
		path: BezPath::new(),
		pos: Point::new(0., baseline),
		offset: Vec2::ZERO,
		scale,
	};

	for (pos, info) in glyph_buffer.glyph_positions().iter().zip(glyph_buffer.glyph_infos()) {
		builder.offset = Vec2::new(pos.x_offset as f64, -pos.y_offset as f64) * scale;
		buzz_face.outline_glyph(GlyphId(info.glyph_id as u16), &mut builder);
		builder.pos += Vec2::new(pos.x_advance as f64, -pos.y_advance as f64) * scale;
	}
	builder.path
}
