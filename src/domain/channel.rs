// Channel buffer - append-only point store for one signal
use super::error::ControllerError;
use std::cmp::Ordering;

/// Position of a channel in the configured channel list.
pub type ChannelId = usize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataPoint {
    pub x: f64,
    pub y: f64,
}

impl DataPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A named, colored signal with its buffered points and the renderer handle
/// that draws it.
#[derive(Debug, Clone)]
pub struct Channel<H> {
    id: ChannelId,
    name: String,
    color: String,
    visible: bool,
    handle: H,
    points: Vec<DataPoint>,
}

impl<H> Channel<H> {
    pub fn new(id: ChannelId, name: String, color: String, visible: bool, handle: H) -> Self {
        Self {
            id,
            name,
            color,
            visible,
            handle,
            points: Vec::new(),
        }
    }

    /// Append a batch whose x values strictly increase and follow the last
    /// stored point. A rejected batch leaves the buffer untouched.
    pub fn append(&mut self, batch: &[DataPoint]) -> Result<(), ControllerError> {
        let mut previous = self.last_time();
        for point in batch {
            if let Some(prev) = previous {
                if point.x.partial_cmp(&prev) != Some(Ordering::Greater) {
                    return Err(ControllerError::OrderingViolation {
                        channel: self.id,
                        previous: prev,
                        next: point.x,
                    });
                }
            }
            previous = Some(point.x);
        }

        self.points.extend_from_slice(batch);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn id(&self) -> ChannelId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last_time(&self) -> Option<f64> {
        self.points.last().map(|p| p.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> Channel<u32> {
        Channel::new(0, "Pressure".to_string(), "#1a237e".to_string(), true, 7)
    }

    fn batch(xs: &[f64]) -> Vec<DataPoint> {
        xs.iter().map(|&x| DataPoint::new(x, x * 2.0)).collect()
    }

    #[test]
    fn test_append_keeps_order() {
        let mut ch = channel();
        ch.append(&batch(&[0.0, 0.5, 1.0])).unwrap();
        ch.append(&batch(&[1.5, 2.0])).unwrap();

        assert_eq!(ch.len(), 5);
        assert_eq!(ch.last_time(), Some(2.0));
        assert_eq!(ch.points()[3], DataPoint::new(1.5, 3.0));
    }

    #[test]
    fn test_append_rejects_out_of_order_batch() {
        let mut ch = channel();
        ch.append(&batch(&[0.0, 1.0])).unwrap();

        let err = ch.append(&batch(&[2.0, 1.0])).unwrap_err();
        assert_eq!(
            err,
            ControllerError::OrderingViolation {
                channel: 0,
                previous: 2.0,
                next: 1.0
            }
        );
        assert!(err.is_fatal());
        // Nothing from the rejected batch is stored
        assert_eq!(ch.len(), 2);
    }

    #[test]
    fn test_append_rejects_repeated_and_nan_time() {
        let mut ch = channel();
        ch.append(&batch(&[1.0])).unwrap();

        assert!(ch.append(&batch(&[1.0])).is_err());
        assert!(ch.append(&[DataPoint::new(f64::NAN, 0.0)]).is_err());
        assert_eq!(ch.len(), 1);
    }

    #[test]
    fn test_clear_and_visibility_are_independent() {
        let mut ch = channel();
        ch.append(&batch(&[0.0, 1.0, 2.0])).unwrap();

        ch.set_visible(false);
        assert_eq!(ch.len(), 3);
        assert!(!ch.is_visible());

        ch.clear();
        assert!(ch.is_empty());
        assert!(!ch.is_visible());

        // A fresh epoch may start again from an earlier time
        ch.append(&batch(&[0.0])).unwrap();
        assert_eq!(ch.len(), 1);
    }
}
