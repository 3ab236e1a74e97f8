use super::*;

#[test]
fn premultiply_matches_rounded_product() {
    let mut px = [100u8, 50, 200, 128];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(
        px,
        [
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128
        ]
    );
}

#[test]
fn fully_transparent_pixels_lose_color() {
    let mut px = [9u8, 9, 9, 0];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(px, [0, 0, 0, 0]);
}

#[test]
fn unpremultiply_leaves_opaque_pixels_alone() {
    let mut px = [1u8, 2, 3, 255, 0, 0, 0, 0];
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(px, [1, 2, 3, 255, 0, 0, 0, 0]);
}

#[test]
fn unpremultiply_approximately_inverts() {
    let mut px = [200u8, 100, 40, 128];
    premultiply_rgba8_in_place(&mut px);
    unpremultiply_rgba8_in_place(&mut px);
    assert!((i32::from(px[0]) - 200).abs() <= 2);
    assert!((i32::from(px[1]) - 100).abs() <= 2);
    assert!((i32::from(px[2]) - 40).abs() <= 2);
    assert_eq!(px[3], 128);
}

#[test]
fn premul_rgba8_opaque_is_identity() {
    assert_eq!(premul_rgba8(10, 20, 30, 255), [10, 20, 30, 255]);
    assert_eq!(premul_rgba8(10, 20, 30, 0), [0, 0, 0, 0]);
}
