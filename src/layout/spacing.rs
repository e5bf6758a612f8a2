//! Size-tiered spacing presets.

/// Node size and gaps (in world units) used by every layout calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpacingProfile {
    pub node_width: f64,
    pub node_height: f64,
    /// Vertical distance between generation rows.
    pub level_height: f64,
    pub sibling_gap: f64,
    pub couple_gap: f64,
    /// Gap between neighbouring root families.
    pub branch_gap: f64,
}

const SMALL: SpacingProfile = SpacingProfile {
    node_width: 160.0,
    node_height: 60.0,
    level_height: 140.0,
    sibling_gap: 30.0,
    couple_gap: 40.0,
    branch_gap: 80.0,
};

const MEDIUM: SpacingProfile = SpacingProfile {
    node_width: 140.0,
    node_height: 50.0,
    level_height: 120.0,
    sibling_gap: 20.0,
    couple_gap: 30.0,
    branch_gap: 60.0,
};

const LARGE: SpacingProfile = SpacingProfile {
    node_width: 120.0,
    node_height: 44.0,
    level_height: 100.0,
    sibling_gap: 14.0,
    couple_gap: 20.0,
    branch_gap: 40.0,
};

const HUGE: SpacingProfile = SpacingProfile {
    node_width: 100.0,
    node_height: 36.0,
    level_height: 80.0,
    sibling_gap: 10.0,
    couple_gap: 14.0,
    branch_gap: 30.0,
};

impl SpacingProfile {
    /// Pick the preset for a graph of `count` nodes (`<100`, `<500`, `<1500`, more).
    #[must_use]
    pub fn for_node_count(count: usize) -> Self {
        match count {
            0..100 => SMALL,
            100..500 => MEDIUM,
            500..1500 => LARGE,
            _ => HUGE,
        }
    }

    /// Width of a couple row with `parents` people (0, 1 or 2).
    #[must_use]
    pub fn couple_width(&self, parents: usize) -> f64 {
        match parents {
            0 => 0.0,
            1 => self.node_width,
            _ => 2.0 * self.node_width + self.couple_gap,
        }
    }
}
