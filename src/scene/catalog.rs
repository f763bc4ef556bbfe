//! Shape kinds and random appearance
//!
//! Everything here is pure: randomness comes from the caller's RNG so a
//! seeded scene is reproducible.

use std::fmt;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// The closed set of shapes the spawner can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Box,
    Sphere,
    Cylinder,
    Tetrahedron,
}

impl ShapeKind {
    /// Every kind, in catalog order
    pub const ALL: [ShapeKind; 4] = [
        ShapeKind::Box,
        ShapeKind::Sphere,
        ShapeKind::Cylinder,
        ShapeKind::Tetrahedron,
    ];

    /// Lowercase name
    pub const fn name(self) -> &'static str {
        match self {
            ShapeKind::Box => "box",
            ShapeKind::Sphere => "sphere",
            ShapeKind::Cylinder => "cylinder",
            ShapeKind::Tetrahedron => "tetrahedron",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A color in hue/saturation/lightness space
///
/// Hue is in degrees, saturation and lightness in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl Hsl {
    pub const fn new(hue: f32, saturation: f32, lightness: f32) -> Self {
        Self {
            hue,
            saturation,
            lightness,
        }
    }

    /// Convert to sRGB components in 0..1
    pub fn to_srgb(&self) -> Vec3 {
        let s = (self.saturation / 100.0).clamp(0.0, 1.0);
        let l = (self.lightness / 100.0).clamp(0.0, 1.0);
        let h = self.hue.rem_euclid(360.0) / 60.0;

        let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = l - chroma / 2.0;

        Vec3::new(r + m, g + m, b + m)
    }

    /// Convert to linear RGB for shading
    pub fn to_linear_rgb(&self) -> Vec3 {
        srgb_to_linear(self.to_srgb())
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({:.1}, {:.1}%, {:.1}%)",
            self.hue, self.saturation, self.lightness
        )
    }
}

/// sRGB transfer function, inverted
pub fn srgb_to_linear(color: Vec3) -> Vec3 {
    let channel = |c: f32| {
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    Vec3::new(channel(color.x), channel(color.y), channel(color.z))
}

/// Uniformly pick one of the catalog kinds
pub fn pick_random_kind<R: Rng>(rng: &mut R) -> ShapeKind {
    ShapeKind::ALL[rng.gen_range(0..ShapeKind::ALL.len())]
}

/// A saturated, medium-dark color
///
/// Hue in [0, 360), saturation in [50, 100), lightness in [20, 50).
pub fn pick_random_color<R: Rng>(rng: &mut R) -> Hsl {
    Hsl {
        hue: rng.gen_range(0.0..360.0),
        saturation: rng.gen_range(50.0..100.0),
        lightness: rng.gen_range(20.0..50.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn assert_vec3_near(a: Vec3, b: Vec3) {
        assert!((a - b).abs().max_element() < 1e-3, "{a} != {b}");
    }

    #[test]
    fn test_kind_distribution_is_uniform() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut counts = [0usize; 4];
        let draws = 40_000;

        for _ in 0..draws {
            let kind = pick_random_kind(&mut rng);
            let index = ShapeKind::ALL.iter().position(|&k| k == kind).unwrap();
            counts[index] += 1;
        }

        // Expected 10_000 each, standard deviation ~87
        for (kind, count) in ShapeKind::ALL.iter().zip(counts) {
            assert!(
                count.abs_diff(draws / 4) < 500,
                "{kind} drawn {count} times"
            );
        }
    }

    #[test]
    fn test_color_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..10_000 {
            let color = pick_random_color(&mut rng);
            assert!((0.0..360.0).contains(&color.hue), "{color}");
            assert!((50.0..100.0).contains(&color.saturation), "{color}");
            assert!((20.0..50.0).contains(&color.lightness), "{color}");
        }
    }

    #[test]
    fn test_hsl_primaries() {
        assert_vec3_near(Hsl::new(0.0, 100.0, 50.0).to_srgb(), Vec3::X);
        assert_vec3_near(Hsl::new(120.0, 100.0, 50.0).to_srgb(), Vec3::Y);
        assert_vec3_near(Hsl::new(240.0, 100.0, 50.0).to_srgb(), Vec3::Z);
        assert_vec3_near(Hsl::new(60.0, 100.0, 50.0).to_srgb(), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_hsl_grays_and_wraparound() {
        assert_vec3_near(Hsl::new(200.0, 0.0, 50.0).to_srgb(), Vec3::splat(0.5));
        assert_vec3_near(Hsl::new(360.0, 100.0, 50.0).to_srgb(), Vec3::X);
        assert_vec3_near(Hsl::new(300.0, 100.0, 25.0).to_srgb(), Vec3::new(0.5, 0.0, 0.5));
    }

    #[test]
    fn test_srgb_to_linear() {
        assert_vec3_near(srgb_to_linear(Vec3::ZERO), Vec3::ZERO);
        assert_vec3_near(srgb_to_linear(Vec3::ONE), Vec3::ONE);
        assert!((srgb_to_linear(Vec3::splat(0.5)).x - 0.2140).abs() < 1e-3);
    }

    #[test]
    fn test_display() {
        assert_eq!(ShapeKind::Tetrahedron.to_string(), "tetrahedron");
        assert_eq!(Hsl::new(10.0, 60.0, 30.0).to_string(), "hsl(10.0, 60.0%, 30.0%)");
    }
}
