//! Visual theming for the idea graph.
//!
//! Provides the level hues, edge colours and size scales used when the
//! graph is projected into renderer records.

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Alpha in `0.0..=1.0`.
	pub a: f64,
}

impl Color {
	/// Opaque colour.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Colour with alpha.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// `#rrggbb` when opaque, `rgba(..)` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Node hues by hierarchy depth.
#[derive(Clone, Debug)]
pub struct LevelPalette {
	/// Level 0: top-level ideas.
	pub root: Color,
	/// Level 1.
	pub branch: Color,
	/// Level 2 and deeper: details.
	pub leaf: Color,
}

impl LevelPalette {
	/// Hue for a node at `level`.
	pub fn color_for(&self, level: usize) -> Color {
		match level {
			0 => self.root,
			1 => self.branch,
			_ => self.leaf,
		}
	}
}

/// Edge colours.
#[derive(Clone, Debug)]
pub struct EdgeStyle {
	/// Every relation except contradictions.
	pub neutral: Color,
	/// Contradicting ideas.
	pub conflict: Color,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Name accepted by [`Theme::by_name`].
	pub name: &'static str,
	/// Node hues.
	pub levels: LevelPalette,
	/// Edge colours.
	pub edge: EdgeStyle,
	/// Rendered node size per priority point.
	pub node_size_per_priority: f64,
	/// Rendered line width per unit of edge strength.
	pub edge_width_per_strength: f64,
}

impl Theme {
	/// Green, blue and purple on a light canvas (default)
	pub fn default_theme() -> Self {
		Self {
			name: "default",
			levels: LevelPalette {
				root: Color::rgb(76, 175, 80),
				branch: Color::rgb(33, 150, 243),
				leaf: Color::rgb(156, 39, 176),
			},
			edge: EdgeStyle {
				neutral: Color::rgb(153, 153, 153),
				conflict: Color::rgb(255, 0, 0),
			},
			node_size_per_priority: 5.0,
			edge_width_per_strength: 1.0,
		}
	}

	/// Muted teals and purples for dark canvases
	pub fn midnight() -> Self {
		Self {
			name: "midnight",
			levels: LevelPalette {
				root: Color::rgb(100, 145, 135), // Eucalyptus
				branch: Color::rgb(115, 135, 155), // Slate
				leaf: Color::rgb(130, 120, 150), // Wisteria
			},
			edge: EdgeStyle {
				neutral: Color::rgba(100, 120, 150, 0.45),
				conflict: Color::rgb(200, 90, 90),
			},
			node_size_per_priority: 5.0,
			edge_width_per_strength: 1.0,
		}
	}

	/// Warm earth tones
	pub fn ember() -> Self {
		Self {
			name: "ember",
			levels: LevelPalette {
				root: Color::rgb(180, 136, 100), // Tan
				branch: Color::rgb(170, 145, 115), // Khaki
				leaf: Color::rgb(145, 120, 95), // Umber
			},
			edge: EdgeStyle {
				neutral: Color::rgba(160, 130, 110, 0.45),
				conflict: Color::rgb(190, 70, 50),
			},
			node_size_per_priority: 5.0,
			edge_width_per_strength: 1.5,
		}
	}

	/// Look up a built-in theme by name.
	pub fn by_name(name: &str) -> Option<Self> {
		match name {
			"default" => Some(Self::default_theme()),
			"midnight" => Some(Self::midnight()),
			"ember" => Some(Self::ember()),
			_ => None,
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::default_theme()
	}
}
