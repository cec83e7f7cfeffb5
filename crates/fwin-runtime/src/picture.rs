#![forbid(unsafe_code)]

//! Per-window picture slots holding decoded bitmaps.

use fwin_core::error::{Error, Result};
use fwin_core::geometry::{Point, Size};
use fwin_render::canvas::Canvas;
use fwin_render::color::PackedRgba;

/// Picture slots per window, numbered from 1.
pub const MAX_PICTURES: usize = 50;

#[derive(Debug, Clone)]
pub struct PictureCache {
    slots: Vec<Option<Canvas>>,
}

impl Default for PictureCache {
    fn default() -> Self {
        Self {
            slots: vec![None; MAX_PICTURES],
        }
    }
}

impl PictureCache {
    fn index(slot: usize) -> Result<usize> {
        if (1..=MAX_PICTURES).contains(&slot) {
            Ok(slot - 1)
        } else {
            Err(Error::invalid(format!("picture slot {slot}")))
        }
    }

    /// Store a `width` x `height` bitmap given row-major pixels.
    pub fn load(&mut self, slot: usize, width: i32, height: i32, pixels: &[PackedRgba]) -> Result<()> {
        let i = Self::index(slot)?;
        if width <= 0 || height <= 0 {
            return Err(Error::invalid(format!("picture size {width}x{height}")));
        }
        if pixels.len() != width as usize * height as usize {
            return Err(Error::invalid(format!(
                "picture {width}x{height} given {} pixels",
                pixels.len()
            )));
        }
        let mut canvas = Canvas::new(Size::new(width, height), PackedRgba::TRANSPARENT);
        for (n, &color) in pixels.iter().enumerate() {
            let n = n as i32;
            canvas.set_pixel(Point::new(n % width, n / width), color);
        }
        self.slots[i] = Some(canvas);
        Ok(())
    }

    pub fn get(&self, slot: usize) -> Result<&Canvas> {
        let i = Self::index(slot)?;
        self.slots[i]
            .as_ref()
            .ok_or_else(|| Error::invalid(format!("picture slot {slot} is empty")))
    }

    pub fn delete(&mut self, slot: usize) -> Result<()> {
        let i = Self::index(slot)?;
        match self.slots[i].take() {
            Some(_) => Ok(()),
            None => Err(Error::invalid(format!("picture slot {slot} is empty"))),
        }
    }

    pub fn size(&self, slot: usize) -> Result<Size> {
        self.get(slot).map(Canvas::size)
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwin_core::error::ErrorKind;

    #[test]
    fn load_and_query() {
        let mut cache = PictureCache::default();
        let px = [PackedRgba::BLACK, PackedRgba::WHITE, PackedRgba::WHITE, PackedRgba::BLACK];
        cache.load(1, 2, 2, &px).unwrap();
        assert_eq!(cache.size(1).unwrap(), Size::new(2, 2));
        assert_eq!(cache.get(1).unwrap().color_at(1, 0), Some(PackedRgba::WHITE));
        assert_eq!(cache.get(1).unwrap().color_at(1, 1), Some(PackedRgba::BLACK));
    }

    #[test]
    fn slot_bounds() {
        let mut cache = PictureCache::default();
        assert_eq!(cache.load(0, 1, 1, &[PackedRgba::BLACK]).unwrap_err().kind(), ErrorKind::InvalidParameter);
        assert!(cache.load(MAX_PICTURES + 1, 1, 1, &[PackedRgba::BLACK]).is_err());
        assert!(cache.load(MAX_PICTURES, 1, 1, &[PackedRgba::BLACK]).is_ok());
    }

    #[test]
    fn pixel_count_must_match() {
        let mut cache = PictureCache::default();
        assert!(cache.load(1, 2, 2, &[PackedRgba::BLACK]).is_err());
    }

    #[test]
    fn delete_empties_slot() {
        let mut cache = PictureCache::default();
        cache.load(3, 1, 1, &[PackedRgba::BLACK]).unwrap();
        cache.delete(3).unwrap();
        assert!(cache.get(3).is_err());
        assert!(cache.delete(3).is_err());
    }
}
