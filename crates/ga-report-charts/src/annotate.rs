//! Value labels drawn above bars.

use plotters::element::Text;
use plotters::prelude::SegmentValue;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::TextStyle;

/// A drawn bar in data coordinates.
///
/// `bottom` and `top` are the lower and upper edges. For a bar starting at
/// zero one of them is zero, so their sum is the bar's value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarGeometry {
    /// Category slot
    pub index: usize,
    /// Lower edge
    pub bottom: f64,
    /// Upper edge
    pub top: f64,
}

impl BarGeometry {
    /// Geometry of a bar from zero to `value`
    pub fn from_value(index: usize, value: f64) -> Self {
        Self {
            index,
            bottom: value.min(0.0),
            top: value.max(0.0),
        }
    }

    /// Signed value the bar represents
    pub fn value(&self) -> f64 {
        self.bottom + self.top
    }

    /// Label text: signed, two decimals
    pub fn label(&self) -> String {
        format!("{:+.2}", self.value())
    }

    /// Label anchor: horizontal center of the slot, `offset` above the top
    /// edge (or above zero for a negative bar)
    pub fn anchor(&self, offset: f64) -> (SegmentValue<usize>, f64) {
        (SegmentValue::CenterOf(self.index), self.top.max(0.0) + offset)
    }
}

/// Offset between a bar's top edge and its label, relative to the axis span
pub fn label_offset((min, max): (f64, f64)) -> f64 {
    (max - min) * 0.01
}

/// One centered text element per bar
pub fn bar_labels<'a>(
    bars: &'a [BarGeometry],
    offset: f64,
    style: TextStyle<'a>,
) -> impl Iterator<Item = Text<'a, (SegmentValue<usize>, f64), String>> + 'a {
    let style = style.pos(Pos::new(HPos::Center, VPos::Bottom));
    bars.iter()
        .map(move |bar| Text::new(bar.label(), bar.anchor(offset), style.clone()))
}
