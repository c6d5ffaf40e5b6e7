//! Channel identities and the set of matrices a role holds

use std::fmt;

use crate::image_pipeline::matrix::types::ChannelMatrix;

/// The four input channels, in producer role order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Green,
    Blue,
    Red,
    Luminance,
}

impl ChannelKind {
    /// Role `i` owns `ALL[i]`.
    pub const ALL: [ChannelKind; 4] = [
        ChannelKind::Green,
        ChannelKind::Blue,
        ChannelKind::Red,
        ChannelKind::Luminance,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Red => "red",
            Self::Luminance => "luminance",
        }
    }

    /// Whether the channel is rendered into the output image.
    pub fn is_color(self) -> bool {
        !matches!(self, Self::Luminance)
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Matrices held by one role. Slots stay empty until a matrix is loaded or received,
/// so a producer only pays for the channel it owns.
#[derive(Debug, Default, Clone)]
pub struct ChannelSet {
    green: Option<ChannelMatrix>,
    blue: Option<ChannelMatrix>,
    red: Option<ChannelMatrix>,
    luminance: Option<ChannelMatrix>,
}

impl ChannelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `matrix` under `kind`, returning whatever was there before.
    pub fn insert(&mut self, kind: ChannelKind, matrix: ChannelMatrix) -> Option<ChannelMatrix> {
        self.slot_mut(kind).replace(matrix)
    }

    pub fn get(&self, kind: ChannelKind) -> Option<&ChannelMatrix> {
        match kind {
            ChannelKind::Green => self.green.as_ref(),
            ChannelKind::Blue => self.blue.as_ref(),
            ChannelKind::Red => self.red.as_ref(),
            ChannelKind::Luminance => self.luminance.as_ref(),
        }
    }

    pub fn take(&mut self, kind: ChannelKind) -> Option<ChannelMatrix> {
        self.slot_mut(kind).take()
    }

    pub fn is_complete(&self) -> bool {
        ChannelKind::ALL.iter().all(|&kind| self.get(kind).is_some())
    }

    /// Mutable access to all four matrices at once, if every slot is filled.
    pub fn all_mut(
        &mut self,
    ) -> Option<(
        &mut ChannelMatrix,
        &mut ChannelMatrix,
        &mut ChannelMatrix,
        &ChannelMatrix,
    )> {
        match (&mut self.green, &mut self.blue, &mut self.red, &self.luminance) {
            (Some(green), Some(blue), Some(red), Some(luminance)) => {
                Some((green, blue, red, luminance))
            }
            _ => None,
        }
    }

    fn slot_mut(&mut self, kind: ChannelKind) -> &mut Option<ChannelMatrix> {
        match kind {
            ChannelKind::Green => &mut self.green,
            ChannelKind::Blue => &mut self.blue,
            ChannelKind::Red => &mut self.red,
            ChannelKind::Luminance => &mut self.luminance,
        }
    }
}
