//! Left/right volume coupling.

/// Gains to push to the tone graph after a slider move. `None` = unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VolumeUpdate {
    pub left: Option<f32>,
    pub right: Option<f32>,
}

/// Tracks both ear volumes and whether they move together.
///
/// While linked the left slider is authoritative: its moves are mirrored to
/// the right ear and moves of the right slider are ignored.
#[derive(Clone, Debug, PartialEq)]
pub struct VolumeLink {
    linked: bool,
    left: f32,
    right: f32,
}

impl VolumeLink {
    pub fn new(left: f32, right: f32) -> Self {
        Self {
            linked: false,
            left: left.clamp(0.0, 1.0),
            right: right.clamp(0.0, 1.0),
        }
    }

    /// Turning the link on snaps the right ear to the left one right away.
    pub fn set_linked(&mut self, linked: bool) -> VolumeUpdate {
        self.linked = linked;
        if linked && self.right != self.left {
            self.right = self.left;
            return VolumeUpdate { left: None, right: Some(self.right) };
        }
        VolumeUpdate::default()
    }

    pub fn on_left_volume_changed(&mut self, value: f32) -> VolumeUpdate {
        let Some(value) = sanitize(value) else {
            return VolumeUpdate::default();
        };
        self.left = value;
        if self.linked {
            self.right = value;
            VolumeUpdate { left: Some(value), right: Some(value) }
        } else {
            VolumeUpdate { left: Some(value), right: None }
        }
    }

    pub fn on_right_volume_changed(&mut self, value: f32) -> VolumeUpdate {
        if self.linked {
            return VolumeUpdate::default();
        }
        let Some(value) = sanitize(value) else {
            return VolumeUpdate::default();
        };
        self.right = value;
        VolumeUpdate { left: None, right: Some(value) }
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    pub fn left(&self) -> f32 {
        self.left
    }

    pub fn right(&self) -> f32 {
        self.right
    }
}

/// Slider values are clamped to `[0, 1]`; NaN and infinities are dropped.
pub(crate) fn sanitize(value: f32) -> Option<f32> {
    value.is_finite().then(|| value.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linked_left_drives_right() {
        let mut link = VolumeLink::new(0.5, 0.5);
        link.set_linked(true);

        let update = link.on_left_volume_changed(0.8);
        assert_eq!(update, VolumeUpdate { left: Some(0.8), right: Some(0.8) });
        assert_eq!(link.right(), 0.8);
    }

    #[test]
    fn unlinked_left_leaves_right_alone() {
        let mut link = VolumeLink::new(0.5, 0.5);

        let update = link.on_left_volume_changed(0.8);
        assert_eq!(update.right, None);
        assert_eq!(link.right(), 0.5);
    }

    #[test]
    fn linked_right_moves_are_ignored() {
        let mut link = VolumeLink::new(0.4, 0.4);
        link.set_linked(true);

        assert_eq!(link.on_right_volume_changed(0.9), VolumeUpdate::default());
        assert_eq!(link.right(), 0.4);
    }

    #[test]
    fn linking_snaps_right_to_left_once() {
        let mut link = VolumeLink::new(0.7, 0.2);

        let update = link.set_linked(true);
        assert_eq!(update.right, Some(0.7));
        assert_eq!(link.right(), 0.7);

        // Already equal, nothing to push
        assert_eq!(link.set_linked(true), VolumeUpdate::default());

        link.set_linked(false);
        link.on_right_volume_changed(0.1);
        assert_eq!(link.left(), 0.7);
        assert_eq!(link.right(), 0.1);
    }

    #[test]
    fn out_of_range_and_nan_inputs() {
        let mut link = VolumeLink::new(0.5, 0.5);
        assert_eq!(link.on_left_volume_changed(1.7).left, Some(1.0));
        assert_eq!(link.on_right_volume_changed(-0.2).right, Some(0.0));
        assert_eq!(link.on_left_volume_changed(f32::NAN), VolumeUpdate::default());
        assert_eq!(link.left(), 1.0);
    }
}
