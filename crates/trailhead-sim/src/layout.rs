//! Fixed scene layout: the name spelled in block letters, scattered rocks, platforms

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;
use trailhead_core::config::LayoutSettings;
use trailhead_core::Result;

use crate::platform::Platform;
use crate::props::Prop;

/// Edge length of one letter block
pub const BLOCK_SIZE: f32 = 1.0;
/// Horizontal distance between neighbouring letter origins
pub const LETTER_SPACING: f32 = 4.5;
/// Mass of one letter cluster
pub const LETTER_MASS: f32 = 1.0;
/// Collision radius of one letter cluster
pub const LETTER_RADIUS: f32 = 2.5;

/// 3x5 glyph bitmaps, top row first
const GLYPHS: &[(char, [&str; 5])] = &[
    ('A', [".#.", "#.#", "###", "#.#", "#.#"]),
    ('B', ["##.", "#.#", "##.", "#.#", "##."]),
    ('C', [".##", "#..", "#..", "#..", ".##"]),
    ('D', ["##.", "#.#", "#.#", "#.#", "##."]),
    ('E', ["###", "#..", "##.", "#..", "###"]),
    ('F', ["###", "#..", "##.", "#..", "#.."]),
    ('G', [".##", "#..", "#.#", "#.#", ".##"]),
    ('H', ["#.#", "#.#", "###", "#.#", "#.#"]),
    ('I', ["###", ".#.", ".#.", ".#.", "###"]),
    ('J', ["..#", "..#", "..#", "#.#", ".#."]),
    ('K', ["#.#", "#.#", "##.", "#.#", "#.#"]),
    ('L', ["#..", "#..", "#..", "#..", "###"]),
    ('M', ["#.#", "###", "###", "#.#", "#.#"]),
    ('N', ["##.", "#.#", "#.#", "#.#", "#.#"]),
    ('O', [".#.", "#.#", "#.#", "#.#", ".#."]),
    ('P', ["##.", "#.#", "##.", "#..", "#.."]),
    ('Q', [".#.", "#.#", "#.#", "##.", ".##"]),
    ('R', ["##.", "#.#", "##.", "#.#", "#.#"]),
    ('S', [".##", "#..", ".#.", "..#", "##."]),
    ('T', ["###", ".#.", ".#.", ".#.", ".#."]),
    ('U', ["#.#", "#.#", "#.#", "#.#", "###"]),
    ('V', ["#.#", "#.#", "#.#", "#.#", ".#."]),
    ('W', ["#.#", "#.#", "###", "###", "#.#"]),
    ('X', ["#.#", "#.#", ".#.", "#.#", "#.#"]),
    ('Y', ["#.#", "#.#", ".#.", ".#.", ".#."]),
    ('Z', ["###", "..#", ".#.", "#..", "###"]),
];

/// Block centers of `glyph` relative to the cluster origin (bottom center),
/// or `None` if the letter is not in the alphabet.
pub fn glyph_blocks(glyph: char) -> Option<Vec<Vec3>> {
    let upper = glyph.to_ascii_uppercase();
    let (_, rows) = GLYPHS.iter().find(|(c, _)| *c == upper)?;

    let mut blocks = Vec::new();
    for (row, line) in rows.iter().enumerate() {
        for (col, cell) in line.chars().enumerate() {
            if cell == '#' {
                blocks.push(Vec3::new(
                    (col as f32 - 1.0) * BLOCK_SIZE,
                    (4 - row) as f32 * BLOCK_SIZE + BLOCK_SIZE * 0.5,
                    0.0,
                ));
            }
        }
    }
    Some(blocks)
}

/// One prop per letter of `settings.name`, centered on `name_origin`.
/// Spaces and unknown characters leave a gap.
pub fn name_props(settings: &LayoutSettings) -> Result<Vec<Prop>> {
    let letters: Vec<char> = settings.name.chars().collect();
    let width = letters.len().saturating_sub(1) as f32 * LETTER_SPACING;
    let [origin_x, origin_z] = settings.name_origin;

    let mut props = Vec::new();
    for (i, &glyph) in letters.iter().enumerate() {
        if glyph.is_whitespace() {
            continue;
        }
        let Some(blocks) = glyph_blocks(glyph) else {
            log::warn!("Layout: no block shape for '{glyph}', leaving a gap");
            continue;
        };
        let x = origin_x - width * 0.5 + i as f32 * LETTER_SPACING;
        let position = Vec3::new(x, 0.0, origin_z);
        props.push(Prop::name_block(
            glyph.to_ascii_uppercase(),
            blocks,
            position,
            LETTER_MASS,
            LETTER_RADIUS,
        )?);
    }
    Ok(props)
}

/// Rocks scattered on a ring around the origin with random size and tumble
pub fn rock_props<R: Rng + ?Sized>(settings: &LayoutSettings, rng: &mut R) -> Result<Vec<Prop>> {
    let mut rocks = Vec::with_capacity(settings.rock_count);
    for _ in 0..settings.rock_count {
        let angle = rng.gen_range(0.0..TAU);
        let distance = rng.gen_range(settings.rock_min_distance..=settings.rock_max_distance);
        let size = rng.gen_range(settings.rock_min_size..=settings.rock_max_size);

        let position = Vec3::new(distance * angle.cos(), 0.0, distance * angle.sin());
        let mut rock = Prop::rock(size, position)?;
        rock.rotation = Vec3::new(
            rng.gen_range(0.0..TAU),
            rng.gen_range(0.0..TAU),
            rng.gen_range(0.0..TAU),
        );
        rocks.push(rock);
    }
    Ok(rocks)
}

/// Every prop in the scene: letters first, then rocks
pub fn build_props<R: Rng + ?Sized>(settings: &LayoutSettings, rng: &mut R) -> Result<Vec<Prop>> {
    let mut props = name_props(settings)?;
    props.extend(rock_props(settings, rng)?);
    log::info!("Layout: {} props ({} letters)", props.len(), props.iter().filter(|p| p.is_name_block()).count());
    Ok(props)
}

pub fn build_platforms(settings: &LayoutSettings) -> Vec<Platform> {
    settings.platforms.iter().map(Platform::from_settings).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn every_glyph_is_three_by_five() {
        for (c, rows) in GLYPHS {
            assert!(rows.iter().all(|r| r.len() == 3), "glyph {c}");
            assert!(!glyph_blocks(*c).unwrap().is_empty());
        }
    }

    #[test]
    fn glyph_blocks_sit_above_origin() {
        let t = glyph_blocks('t').unwrap();
        assert_eq!(t.len(), 7);
        assert!(t.iter().all(|b| b.y >= 0.5 && b.y <= 4.5));
        assert!(t.iter().all(|b| b.x >= -1.0 && b.x <= 1.0));
        assert_eq!(glyph_blocks('?'), None);
    }

    #[test]
    fn name_is_centered_with_gaps() {
        let settings = LayoutSettings {
            name: "A B".into(),
            name_origin: [0.0, -25.0],
            ..LayoutSettings::default()
        };
        let props = name_props(&settings).unwrap();
        assert_eq!(props.len(), 2);
        assert!((props[0].position.x + LETTER_SPACING).abs() < 1e-6);
        assert!((props[1].position.x - LETTER_SPACING).abs() < 1e-6);
        assert!(props.iter().all(|p| p.position.z == -25.0));
        assert!(props.iter().all(|p| p.rest_position() == Some(p.position)));
    }

    #[test]
    fn unknown_letters_are_skipped() {
        let settings = LayoutSettings {
            name: "A#".into(),
            ..LayoutSettings::default()
        };
        assert_eq!(name_props(&settings).unwrap().len(), 1);
    }

    #[test]
    fn rocks_respect_ranges_and_seed() {
        let settings = LayoutSettings::default();
        let a = rock_props(&settings, &mut StdRng::seed_from_u64(11)).unwrap();
        let b = rock_props(&settings, &mut StdRng::seed_from_u64(11)).unwrap();
        assert_eq!(a.len(), settings.rock_count);

        for (ra, rb) in a.iter().zip(&b) {
            assert_eq!(ra.position, rb.position);
            let d = Vec3::new(ra.position.x, 0.0, ra.position.z).length();
            assert!(d >= settings.rock_min_distance - 1e-3);
            assert!(d <= settings.rock_max_distance + 1e-3);
            assert!(ra.mass() >= settings.rock_min_size && ra.mass() <= settings.rock_max_size);
            assert!(ra.rest_position().is_none());
        }
    }

    #[test]
    fn default_scene_has_about_sixty_props() {
        let props = build_props(&LayoutSettings::default(), &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(props.len(), 9 + 49);
        assert_eq!(build_platforms(&LayoutSettings::default()).len(), 3);
    }
}
