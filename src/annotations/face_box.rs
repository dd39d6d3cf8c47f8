/// A struct representing a detected face's bounding box.
///
/// The box is axis-aligned, expressed in whole pixels with the standard
/// convention of the left side of the image being x=0 and the top of the
/// image being y=0. Coordinates always refer to the frame the detector ran
/// on, which for the neural backend is a downscaled copy of the input; boxes
/// are never rescaled back to the original frame.
///
/// Both constructors clamp to the frame bounds and refuse to produce a box
/// with zero width or height, so a `FaceBox` that exists is always croppable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceBox {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

impl FaceBox {
    /// Builds a box from pixel coordinates, clamping it into the frame.
    ///
    /// The inputs are signed because cascade detectors can report regions
    /// that start slightly outside the image. Returns `None` when nothing of
    /// the box remains inside the frame.
    pub fn from_pixels(
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        frame_width: u32,
        frame_height: u32,
    ) -> Option<Self> {
        if width <= 0 || height <= 0 {
            return None;
        }
        let left = x.clamp(0, frame_width as i64);
        let top = y.clamp(0, frame_height as i64);
        let right = (x + width).clamp(0, frame_width as i64);
        let bottom = (y + height).clamp(0, frame_height as i64);
        if left >= right || top >= bottom {
            return None;
        }
        Some(FaceBox {
            x: left as u32,
            y: top as u32,
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        })
    }

    /// Builds a box from relative corner coordinates in `[0,1]`.
    ///
    /// Single-shot detectors emit corners as fractions of the frame; the
    /// corners are clamped into `[0,1]` before scaling by the frame
    /// dimensions. Returns `None` when the scaled box degenerates to zero
    /// area.
    pub fn from_relative_corners(
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        frame_width: u32,
        frame_height: u32,
    ) -> Option<Self> {
        let left = x1.clamp(0.0, 1.0);
        let top = y1.clamp(0.0, 1.0);
        let rel_width = (x2 - left).clamp(0.0, 1.0 - left);
        let rel_height = (y2 - top).clamp(0.0, 1.0 - top);

        let x = (left * frame_width as f32).floor() as i64;
        let y = (top * frame_height as f32).floor() as i64;
        let width = (rel_width * frame_width as f32).round() as i64;
        let height = (rel_height * frame_height as f32).round() as i64;
        FaceBox::from_pixels(x, y, width, height, frame_width, frame_height)
    }

    pub fn x(&self) -> u32 {
        self.x
    }

    pub fn y(&self) -> u32 {
        self.y
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }
}
